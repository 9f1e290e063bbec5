#![forbid(unsafe_code)]

//! Request dispatch and reply classification.

use cybersoap_core::{Error, Result};
use cybersoap_keys::{EnvironmentView, ProcessEnv};

use crate::config::Configuration;
use crate::transport::{SoapTransport, TransactionReply};

/// Reason code of an accepted transaction.
pub const SUCCESS_REASON_CODE: u32 = 100;

/// An accepted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<R> {
    pub code: u32,
    pub request_id: Option<String>,
    pub reply: R,
}

/// Dispatches requests for one merchant configuration.
#[derive(Debug)]
pub struct Gateway<T, E = ProcessEnv> {
    config: Configuration,
    transport: T,
    env: E,
}

impl<T: SoapTransport> Gateway<T, ProcessEnv> {
    /// A gateway reading credentials from the process environment.
    pub fn new(config: Configuration, transport: T) -> Self {
        Self::with_env(config, transport, ProcessEnv)
    }
}

impl<T: SoapTransport, E: EnvironmentView> Gateway<T, E> {
    pub fn with_env(config: Configuration, transport: T, env: E) -> Self {
        Self { config, transport, env }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build fresh credentials, send `request`, and classify the reply.
    ///
    /// Credential failures are returned before the transport is touched.
    pub fn run_transaction(&self, request: &T::Request) -> Result<Outcome<T::Reply>> {
        let security = self.config.security_descriptor(&self.env)?;
        let endpoint = self.config.endpoint();
        tracing::debug!(%endpoint, auth = security.kind(), "dispatching transaction");

        let reply = self
            .transport
            .run_transaction(&endpoint, request, &security)
            .map_err(|e| match e {
                Error::Transport(_) => e,
                other => Error::Transport(other.to_string()),
            })?;

        let code = reply.reason_code();
        if code != SUCCESS_REASON_CODE {
            tracing::warn!(code, request_id = reply.request_id(), "transaction declined");
            return Err(Error::Declined { code });
        }

        tracing::debug!(request_id = reply.request_id(), "transaction accepted");
        Ok(Outcome {
            code,
            request_id: reply.request_id().map(str::to_owned),
            reply,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cybersoap_core::ErrorKind;
    use cybersoap_keys::{CertificateOptions, Environment, MapEnv};
    use cybersoap_wssec::SecurityDescriptor;
    use std::cell::Cell;

    #[derive(Debug)]
    struct Reply(u32);

    impl TransactionReply for Reply {
        fn reason_code(&self) -> u32 {
            self.0
        }
    }

    struct Fixed {
        result: fn() -> Result<Reply>,
        calls: Cell<usize>,
    }

    impl SoapTransport for Fixed {
        type Request = ();
        type Reply = Reply;

        fn run_transaction(&self, _: &str, _: &(), _: &SecurityDescriptor) -> Result<Reply> {
            self.calls.set(self.calls.get() + 1);
            (self.result)()
        }
    }

    fn gateway(result: fn() -> Result<Reply>) -> Gateway<Fixed, MapEnv> {
        let config = Configuration::new("m", "p", Environment::Development, "1.219");
        Gateway::with_env(config, Fixed { result, calls: Cell::new(0) }, MapEnv::new())
    }

    #[test]
    fn test_reason_100_is_success() {
        let outcome = gateway(|| Ok(Reply(100))).run_transaction(&()).unwrap();
        assert_eq!(outcome.code, 100);
        assert_eq!(outcome.request_id, None);
    }

    #[test]
    fn test_other_codes_are_declined() {
        let err = gateway(|| Ok(Reply(203))).run_transaction(&()).unwrap_err();
        assert!(matches!(err, Error::Declined { code: 203 }));
        assert_eq!(err.kind(), ErrorKind::Declined);
    }

    #[test]
    fn test_transport_errors_are_classified() {
        let err = gateway(|| Err(Error::Other("connection reset".into())))
            .run_transaction(&())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_credential_errors_skip_transport() {
        let config = Configuration::new("m", "p", Environment::Development, "1.219")
            .with_cert_options(CertificateOptions::new().with_private_key_pem(b"k".to_vec()));
        let gw = Gateway::with_env(
            config,
            Fixed { result: || Ok(Reply(100)), calls: Cell::new(0) },
            MapEnv::new(),
        );
        let err = gw.run_transaction(&()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(gw.transport().calls.get(), 0);
    }
}
