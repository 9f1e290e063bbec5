#![forbid(unsafe_code)]

//! PKCS#12 (.p12/.pfx) extraction for gateway request signing.
//!
//! The gateway hands merchants a password-protected P12 bundle; the signer
//! downstream wants PEM. [`extract_pem`] bridges the two: it verifies the
//! container MAC, decrypts every bag, and returns the first private key and
//! first certificate re-encoded as PEM.
//!
//! Supports legacy PBE (SHA-1 + 3DES-CBC) and PBES2 (PBKDF2 + AES-256-CBC).

mod kdf;
mod parse;

use cybersoap_core::{Error, Result};
use pem_rfc7468::LineEnding;

/// PEM label for a PKCS#8 `PrivateKeyInfo`.
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
/// PEM label for an X.509 certificate.
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Every key and certificate found in a PKCS#12 file, in bag order.
#[derive(Debug, Default)]
pub struct Pkcs12Contents {
    /// PKCS#8 DER-encoded private keys, already decrypted.
    pub private_keys: Vec<Vec<u8>>,
    /// DER-encoded X.509 certificates.
    pub certificates: Vec<Vec<u8>>,
}

/// The key pair pulled out of a P12 container, PEM-encoded.
#[derive(Clone)]
pub struct ExtractedPem {
    pub private_key_pem: Vec<u8>,
    pub cert_pem: Vec<u8>,
}

impl std::fmt::Debug for ExtractedPem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractedPem")
            .field("private_key_pem", &format_args!("<{} bytes>", self.private_key_pem.len()))
            .field("cert_pem", &format_args!("<{} bytes>", self.cert_pem.len()))
            .finish()
    }
}

/// Parse a PKCS#12 file, decrypting with the given passphrase.
pub fn parse_pkcs12(data: &[u8], passphrase: &str) -> Result<Pkcs12Contents> {
    parse::parse_pfx(data, passphrase)
}

/// Extract the first private key and first certificate as PEM.
///
/// Containers holding several keys or a certificate chain are not
/// disambiguated: whichever bag comes first wins, even when the certificate
/// bag precedes the key bag.
pub fn extract_pem(p12: &[u8], passphrase: &str) -> Result<ExtractedPem> {
    let contents = parse_pkcs12(p12, passphrase)?;
    tracing::debug!(
        keys = contents.private_keys.len(),
        certs = contents.certificates.len(),
        "scanned PKCS#12 safe bags"
    );

    let key_der = contents
        .private_keys
        .first()
        .ok_or_else(|| Error::CertificateParse("PKCS#12 contains no private key bag".into()))?;
    let cert_der = contents
        .certificates
        .first()
        .ok_or_else(|| Error::CertificateParse("PKCS#12 contains no certificate bag".into()))?;

    Ok(ExtractedPem {
        private_key_pem: to_pem(PRIVATE_KEY_LABEL, key_der)?,
        cert_pem: to_pem(CERTIFICATE_LABEL, cert_der)?,
    })
}

fn to_pem(label: &'static str, der: &[u8]) -> Result<Vec<u8>> {
    pem_rfc7468::encode_string(label, LineEnding::LF, der)
        .map(String::into_bytes)
        .map_err(|e| Error::Pem(format!("failed to encode {label}: {e}")))
}
