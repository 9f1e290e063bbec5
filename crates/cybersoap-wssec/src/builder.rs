#![forbid(unsafe_code)]

//! Turns resolved certificate options into a [`SecurityDescriptor`].
//!
//! Material is read fresh on every call: credentials may rotate between
//! requests and different merchants may share a process.

use std::sync::Arc;

use cybersoap_core::{Error, Result};
use cybersoap_keys::pem::{self, CERTIFICATE_TYPES, PRIVATE_KEY_TYPES};
use cybersoap_keys::source;
use cybersoap_keys::CertificateOptions;

use crate::cache::Pkcs12Cache;
use crate::descriptor::{CertificateSigning, SecurityDescriptor, UsernameToken, UsernameTokenOptions};

/// Key pair bytes ready for the signer. Request-scoped; never persisted.
#[derive(Clone)]
pub struct ResolvedKeyMaterial {
    pub private_key: Vec<u8>,
    pub public_cert: Vec<u8>,
    /// Empty when none was configured.
    pub passphrase: String,
}

impl std::fmt::Debug for ResolvedKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedKeyMaterial")
            .field("private_key", &format_args!("<{} bytes>", self.private_key.len()))
            .field("public_cert", &format_args!("<{} bytes>", self.public_cert.len()))
            .field("passphrase", &if self.passphrase.is_empty() { "<empty>" } else { "<set>" })
            .finish()
    }
}

/// Builds descriptors, optionally sharing a P12 cache across calls.
#[derive(Debug, Clone, Default)]
pub struct SecurityBuilder {
    cache: Option<Arc<Pkcs12Cache>>,
    username_options: UsernameTokenOptions,
}

impl SecurityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(mut self, cache: Arc<Pkcs12Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_username_options(mut self, options: UsernameTokenOptions) -> Self {
        self.username_options = options;
        self
    }

    /// Username token when `options` is `None`, otherwise certificate signing.
    ///
    /// Once certificate options are present there is no downgrade to the
    /// username token: incomplete or unreadable material is an error.
    pub fn build(
        &self,
        merchant_id: &str,
        password: &str,
        options: Option<&CertificateOptions>,
    ) -> Result<SecurityDescriptor> {
        let Some(options) = options else {
            tracing::debug!(merchant_id, "using UsernameToken authentication");
            return Ok(SecurityDescriptor::UsernameToken(UsernameToken {
                merchant_id: merchant_id.to_owned(),
                password: password.to_owned(),
                options: self.username_options,
            }));
        };

        let material = resolve_material(options, self.cache.as_deref())?;
        tracing::debug!(merchant_id, "using X.509 certificate signing");
        Ok(SecurityDescriptor::CertificateSigning(CertificateSigning::new(
            material.private_key,
            material.public_cert,
            material.passphrase,
        )))
    }
}

/// [`SecurityBuilder::build`] without a cache.
pub fn build_security_descriptor(
    merchant_id: &str,
    password: &str,
    options: Option<&CertificateOptions>,
) -> Result<SecurityDescriptor> {
    SecurityBuilder::new().build(merchant_id, password, options)
}

/// Load and sanitize the key pair named by `options`.
///
/// A configured P12 is authoritative: if it cannot be read or extracted the
/// error is returned as-is and the PEM fields are not consulted.
pub fn resolve_material(
    options: &CertificateOptions,
    cache: Option<&Pkcs12Cache>,
) -> Result<ResolvedKeyMaterial> {
    let (key, cert) = if options.has_p12() {
        let (key, cert) = extract_p12(options, cache)?;
        (Some(key), Some(cert))
    } else {
        (
            source::load_first(&source::private_key_providers(options))?,
            source::load_first(&source::public_cert_providers(options))?,
        )
    };

    let key = key.map(|k| pem::sanitize(k, PRIVATE_KEY_TYPES));
    let cert = cert.map(|c| pem::sanitize(c, CERTIFICATE_TYPES));

    match (key, cert) {
        (Some(private_key), Some(public_cert)) => Ok(ResolvedKeyMaterial {
            private_key,
            public_cert,
            passphrase: options.passphrase.clone().unwrap_or_default(),
        }),
        (key, cert) => {
            let missing = match (key.is_none(), cert.is_none()) {
                (true, true) => "private key and public certificate",
                (true, false) => "private key",
                _ => "public certificate",
            };
            Err(Error::Configuration(format!(
                "could not parse key/cert PEMs: no {missing} configured"
            )))
        }
    }
}

fn extract_p12(
    options: &CertificateOptions,
    cache: Option<&Pkcs12Cache>,
) -> Result<(Vec<u8>, Vec<u8>)> {
    let providers = source::p12_providers(options);
    let bytes = source::load_first(&providers)?.unwrap_or_default();
    let passphrase = options.p12_passphrase.as_deref().unwrap_or("");

    let extracted = match cache {
        Some(cache) => cache.get_or_extract(&bytes, passphrase),
        None => cybersoap_pkcs12::extract_pem(&bytes, passphrase),
    }
    .map_err(|e| {
        tracing::warn!(source = ?providers.first(), error = %e, "P12 extraction failed");
        e
    })?;

    Ok((extracted.private_key_pem, extracted.cert_pem))
}
