#![forbid(unsafe_code)]

/// Errors produced while resolving credentials or dispatching a transaction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid certificate configuration: {0}")]
    Configuration(String),

    #[error("certificate parse error: {0}")]
    CertificateParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("base64 decode error: {0}")]
    Base64(String),

    #[error("PEM encoding error: {0}")]
    Pem(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("transaction declined with reason code {code}")]
    Declined { code: u32 },

    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`], for callers that surface an error
/// kind next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    CertificateParse,
    Io,
    Transport,
    Declined,
    Other,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) | Self::Base64(_) => ErrorKind::Configuration,
            Self::CertificateParse(_) | Self::Pem(_) => ErrorKind::CertificateParse,
            Self::Io(_) => ErrorKind::Io,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Declined { .. } => ErrorKind::Declined,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
