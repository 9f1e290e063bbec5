#![forbid(unsafe_code)]

//! The security configuration handed to the SOAP transport.

use cybersoap_core::{algorithm, ns};

/// How the signer marks the elements it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMode {
    /// `wsu:Id` attributes, as the gateway's SOAP binding requires on `Body`.
    WsSecurity,
}

impl IdMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WsSecurity => "wssecurity",
        }
    }
}

/// Settings carried alongside a UsernameToken header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsernameTokenOptions {
    pub has_nonce: bool,
}

impl Default for UsernameTokenOptions {
    fn default() -> Self {
        Self { has_nonce: true }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct UsernameToken {
    pub merchant_id: String,
    pub password: String,
    pub options: UsernameTokenOptions,
}

/// X.509 signing configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateSigning {
    pub private_key_pem: Vec<u8>,
    pub cert_pem: Vec<u8>,
    /// Empty when the key is not encrypted.
    pub passphrase: String,
    pub signature_algorithm: &'static str,
    pub digest_algorithm: &'static str,
    pub canonicalization_algorithm: &'static str,
    pub id_mode: IdMode,
    /// Prefixes kept during exclusive C14N; without them the gateway
    /// recomputes a different digest and rejects the signature.
    pub inclusive_namespace_prefixes: Vec<&'static str>,
    /// Prefix used for the `Signature` element.
    pub signature_prefix: &'static str,
    /// Prefixes already bound in the envelope, so the signer reuses them.
    pub existing_prefixes: Vec<(&'static str, &'static str)>,
    pub has_timestamp: bool,
}

impl CertificateSigning {
    /// Signing configuration with the gateway's fixed algorithm set.
    pub fn new(private_key_pem: Vec<u8>, cert_pem: Vec<u8>, passphrase: String) -> Self {
        Self {
            private_key_pem,
            cert_pem,
            passphrase,
            signature_algorithm: algorithm::RSA_SHA1,
            digest_algorithm: algorithm::SHA1,
            canonicalization_algorithm: algorithm::EXC_C14N,
            id_mode: IdMode::WsSecurity,
            inclusive_namespace_prefixes: vec![ns::prefix::SOAP, ns::prefix::SOAPENV, ns::prefix::URN],
            signature_prefix: ns::prefix::DS,
            existing_prefixes: vec![
                (ns::prefix::WSSE, ns::WSSE),
                (ns::prefix::WSU, ns::WSU),
                (ns::prefix::SOAP, ns::SOAP_ENVELOPE),
            ],
            has_timestamp: false,
        }
    }

    /// Space-separated form of the inclusive prefixes, as written into the
    /// `InclusiveNamespaces/@PrefixList` attribute.
    pub fn inclusive_prefix_list(&self) -> String {
        self.inclusive_namespace_prefixes.join(" ")
    }
}

/// Exactly one authentication mode per request.
#[derive(Clone, PartialEq, Eq)]
pub enum SecurityDescriptor {
    UsernameToken(UsernameToken),
    CertificateSigning(CertificateSigning),
}

impl SecurityDescriptor {
    pub fn username_token(merchant_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self::UsernameToken(UsernameToken {
            merchant_id: merchant_id.into(),
            password: password.into(),
            options: UsernameTokenOptions::default(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::UsernameToken(_) => "UsernameToken",
            Self::CertificateSigning(_) => "CertificateSigning",
        }
    }
}

impl std::fmt::Debug for UsernameToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsernameToken")
            .field("merchant_id", &self.merchant_id)
            .field("password", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl std::fmt::Debug for CertificateSigning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateSigning")
            .field("private_key_pem", &format_args!("<{} bytes>", self.private_key_pem.len()))
            .field("cert_pem", &format_args!("<{} bytes>", self.cert_pem.len()))
            .field("passphrase", &"<redacted>")
            .field("signature_algorithm", &self.signature_algorithm)
            .field("digest_algorithm", &self.digest_algorithm)
            .field("canonicalization_algorithm", &self.canonicalization_algorithm)
            .field("id_mode", &self.id_mode)
            .field("inclusive_namespace_prefixes", &self.inclusive_namespace_prefixes)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for SecurityDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsernameToken(t) => t.fmt(f),
            Self::CertificateSigning(s) => s.fmt(f),
        }
    }
}
