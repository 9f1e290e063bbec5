#![forbid(unsafe_code)]

//! Picks the single active certificate option bag.
//!
//! Explicit options and environment variables are never blended: if the
//! caller passed anything, the environment is not read at all.

use std::path::PathBuf;

use crate::env::{var, var_name, Environment, EnvironmentView};
use crate::options::CertificateOptions;

/// Where the active options came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsSource {
    Explicit,
    Environment,
}

/// Resolve the active options, or `None` when username/password
/// authentication should be used.
pub fn resolve(
    explicit: Option<&CertificateOptions>,
    environment: Environment,
    env: &dyn EnvironmentView,
) -> Option<CertificateOptions> {
    resolve_with_source(explicit, environment, env).map(|(_, options)| options)
}

/// Like [`resolve`], also reporting which source won.
pub fn resolve_with_source(
    explicit: Option<&CertificateOptions>,
    environment: Environment,
    env: &dyn EnvironmentView,
) -> Option<(OptionsSource, CertificateOptions)> {
    if let Some(options) = explicit.filter(|o| !o.is_empty()) {
        tracing::debug!("using explicitly supplied certificate options");
        return Some((OptionsSource::Explicit, options.clone()));
    }

    let from_env = from_environment(environment, env);
    if from_env.is_empty() {
        tracing::debug!(
            prefix = environment.prefix(),
            "no certificate options configured; username token applies"
        );
        return None;
    }

    tracing::debug!(
        prefix = environment.prefix(),
        "using certificate options from environment variables"
    );
    Some((OptionsSource::Environment, from_env))
}

/// Read every tier-prefixed certificate variable into an options bag.
/// Values are taken verbatim; nothing is read from disk or decoded here.
fn from_environment(environment: Environment, env: &dyn EnvironmentView) -> CertificateOptions {
    let get = |suffix: &str| env.var(&var_name(environment, suffix));

    CertificateOptions {
        p12_path: get(var::P12_PATH).map(PathBuf::from),
        p12_base64: get(var::P12_BASE64),
        p12_passphrase: get(var::P12_PASSPHRASE),
        private_key_path: get(var::PRIVATE_KEY_PATH).map(PathBuf::from),
        private_key_pem_base64: get(var::PRIVATE_KEY_PEM_BASE64),
        private_key_pem: get(var::PRIVATE_KEY_PEM).map(String::into_bytes),
        public_cert_path: get(var::PUBLIC_CERT_PATH).map(PathBuf::from),
        public_cert_pem_base64: get(var::PUBLIC_CERT_PEM_BASE64),
        public_cert_pem: get(var::PUBLIC_CERT_PEM).map(String::into_bytes),
        passphrase: get(var::CERT_PASSPHRASE),
    }
}
