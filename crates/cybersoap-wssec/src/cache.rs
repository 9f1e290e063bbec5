#![forbid(unsafe_code)]

//! Content-addressed cache of extracted P12 material.
//!
//! Keys are a SHA-256 over the passphrase and container bytes, so a rotated
//! certificate or passphrase is simply a different entry. Failed extractions
//! are never stored.

use cybersoap_core::Result;
use cybersoap_pkcs12::ExtractedPem;
use dashmap::DashMap;
use sha2::{Digest, Sha256};

#[derive(Debug, Default)]
pub struct Pkcs12Cache {
    entries: DashMap<[u8; 32], ExtractedPem>,
}

impl Pkcs12Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached extraction for this container and passphrase, or
    /// extract and remember it.
    pub fn get_or_extract(&self, p12: &[u8], passphrase: &str) -> Result<ExtractedPem> {
        let key = cache_key(p12, passphrase);
        if let Some(hit) = self.entries.get(&key) {
            tracing::debug!("PKCS#12 cache hit");
            return Ok(hit.value().clone());
        }

        let extracted = cybersoap_pkcs12::extract_pem(p12, passphrase)?;
        // Racing extractions of the same content produce identical values.
        self.entries.insert(key, extracted.clone());
        Ok(extracted)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

fn cache_key(p12: &[u8], passphrase: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    // Length prefix keeps (passphrase, p12) boundaries unambiguous.
    hasher.update((passphrase.len() as u64).to_be_bytes());
    hasher.update(passphrase.as_bytes());
    hasher.update(p12);
    hasher.finalize().into()
}
