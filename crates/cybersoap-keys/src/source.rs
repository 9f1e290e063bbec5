#![forbid(unsafe_code)]

//! Field-level material providers.
//!
//! Each material (P12 container, private key, public certificate) has an
//! ordered list of providers built from an options bag. The first provider
//! whose field is set wins; its load error, if any, is final.

use std::path::Path;

use base64::Engine;
use cybersoap_core::{Error, Result};

use crate::options::CertificateOptions;

/// One place a byte buffer can come from.
#[derive(Clone, Copy)]
pub enum Provider<'a> {
    /// Base64 text, decoded on load.
    Base64 { field: &'static str, value: &'a str },
    /// Bytes supplied inline.
    Inline { field: &'static str, value: &'a [u8] },
    /// A local file, read on load.
    File { field: &'static str, path: &'a Path },
}

impl Provider<'_> {
    /// Name of the option field backing this provider, for diagnostics.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Base64 { field, .. } | Self::Inline { field, .. } | Self::File { field, .. } => {
                *field
            }
        }
    }

    pub fn load(&self) -> Result<Vec<u8>> {
        match self {
            Self::Base64 { field, value } => decode_base64(value)
                .map_err(|e| Error::Base64(format!("{field}: {e}"))),
            Self::Inline { value, .. } => Ok(value.to_vec()),
            Self::File { path, .. } => Ok(std::fs::read(path)?),
        }
    }
}

impl std::fmt::Debug for Provider<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File { field, path } => write!(f, "{field} ({})", path.display()),
            other => f.write_str(other.field()),
        }
    }
}

/// Standard base64, ignoring embedded whitespace and line breaks.
pub fn decode_base64(text: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD.decode(cleaned)
}

/// P12 container providers: inline base64 first, then the file path.
pub fn p12_providers(options: &CertificateOptions) -> Vec<Provider<'_>> {
    let mut out = Vec::new();
    if let Some(value) = nonempty(&options.p12_base64) {
        out.push(Provider::Base64 { field: "p12_base64", value });
    }
    if let Some(path) = options.p12_path.as_deref().filter(|p| !p.as_os_str().is_empty()) {
        out.push(Provider::File { field: "p12_path", path });
    }
    out
}

/// Private key providers: base64 PEM, then inline PEM, then file path.
pub fn private_key_providers(options: &CertificateOptions) -> Vec<Provider<'_>> {
    pem_providers(
        ("private_key_pem_base64", &options.private_key_pem_base64),
        ("private_key_pem", &options.private_key_pem),
        ("private_key_path", options.private_key_path.as_deref()),
    )
}

/// Public certificate providers: base64 PEM, then inline PEM, then file path.
pub fn public_cert_providers(options: &CertificateOptions) -> Vec<Provider<'_>> {
    pem_providers(
        ("public_cert_pem_base64", &options.public_cert_pem_base64),
        ("public_cert_pem", &options.public_cert_pem),
        ("public_cert_path", options.public_cert_path.as_deref()),
    )
}

fn pem_providers<'a>(
    base64: (&'static str, &'a Option<String>),
    inline: (&'static str, &'a Option<Vec<u8>>),
    file: (&'static str, Option<&'a Path>),
) -> Vec<Provider<'a>> {
    let mut out = Vec::with_capacity(3);
    if let Some(value) = nonempty(base64.1) {
        out.push(Provider::Base64 { field: base64.0, value });
    }
    if let Some(value) = inline.1.as_deref().filter(|v| !v.is_empty()) {
        out.push(Provider::Inline { field: inline.0, value });
    }
    if let Some(path) = file.1.filter(|p| !p.as_os_str().is_empty()) {
        out.push(Provider::File { field: file.0, path });
    }
    out
}

fn nonempty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Load from the first provider in the list. `Ok(None)` when the list is
/// empty; an error from the winning provider is not retried elsewhere.
pub fn load_first(providers: &[Provider<'_>]) -> Result<Option<Vec<u8>>> {
    let Some(provider) = providers.first() else {
        return Ok(None);
    };
    tracing::debug!(source = ?provider, "loading credential material");
    provider.load().map(Some)
}
