#![forbid(unsafe_code)]

//! Key derivation, decryption and MAC helpers for PKCS#12.
//!
//! Two encryption families show up in the containers the gateway hands out:
//! legacy pbeWithSHAAnd3-KeyTripleDES-CBC (RFC 7292 Appendix B KDF) and
//! PBES2 with PBKDF2 + AES-256-CBC, the OpenSSL 3.x default.

use cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use cybersoap_core::{Error, Result};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type TdesCbcDec = cbc::Decryptor<des::TdesEde3>;

/// Diversifier byte selecting what the PKCS#12 KDF derives (RFC 7292 B.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Key = 1,
    Iv = 2,
    Mac = 3,
}

/// Hash driving the PKCS#12 KDF, HMAC, or PBKDF2 PRF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlg {
    Sha1,
    Sha256,
}

impl HashAlg {
    fn output_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }
}

/// PKCS#12 KDF. `password` must already be BMP-encoded (see [`bmp_password`]).
pub fn derive(
    hash: HashAlg,
    purpose: Purpose,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    output_len: usize,
) -> Vec<u8> {
    match hash {
        HashAlg::Sha1 => derive_with::<Sha1>(purpose, password, salt, iterations, output_len),
        HashAlg::Sha256 => derive_with::<Sha256>(purpose, password, salt, iterations, output_len),
    }
}

fn derive_with<D>(
    purpose: Purpose,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    output_len: usize,
) -> Vec<u8>
where
    D: Digest + sha2::digest::FixedOutputReset,
{
    // Both SHA-1 and SHA-256 use a 64-byte block.
    const V: usize = 64;
    let u = <D as Digest>::output_size();

    let diversifier = [purpose as u8; V];
    let mut input = repeat_to_block(salt, V);
    input.extend(repeat_to_block(password, V));

    let rounds = output_len.div_ceil(u);
    let mut out = Vec::with_capacity(rounds * u);

    for round in 0..rounds {
        let mut hasher = D::new();
        Digest::update(&mut hasher, diversifier);
        Digest::update(&mut hasher, &input);
        let mut a = hasher.finalize_reset();
        for _ in 1..iterations {
            Digest::update(&mut hasher, &a);
            a = hasher.finalize_reset();
        }
        out.extend_from_slice(&a);

        if round + 1 < rounds {
            let b = repeat_to_block(&a, V);
            for chunk in input.chunks_mut(V) {
                add_with_carry(chunk, &b);
            }
        }
    }

    out.truncate(output_len);
    out
}

/// Repeat `data` until its length is a multiple of `block` (empty stays empty).
fn repeat_to_block(data: &[u8], block: usize) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }
    let len = data.len().div_ceil(block) * block;
    data.iter().copied().cycle().take(len).collect()
}

/// `chunk = (chunk + b + 1) mod 2^(8 * chunk.len())`, big-endian.
fn add_with_carry(chunk: &mut [u8], b: &[u8]) {
    let mut carry = 1u16;
    for (x, y) in chunk.iter_mut().zip(b).rev() {
        let sum = u16::from(*x) + u16::from(*y) + carry;
        *x = sum as u8;
        carry = sum >> 8;
    }
}

/// UTF-16BE encoding of the passphrase plus a two-byte NUL terminator.
pub fn bmp_password(password: &str) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }
    let mut bmp: Vec<u8> = password.encode_utf16().flat_map(u16::to_be_bytes).collect();
    bmp.extend_from_slice(&[0, 0]);
    bmp
}

/// pbeWithSHAAnd3-KeyTripleDES-CBC.
pub fn decrypt_pbe_sha1_3des(
    ciphertext: &[u8],
    bmp_password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<Vec<u8>> {
    let key = derive(HashAlg::Sha1, Purpose::Key, bmp_password, salt, iterations, 24);
    let iv = derive(HashAlg::Sha1, Purpose::Iv, bmp_password, salt, iterations, 8);

    let decryptor = TdesCbcDec::new_from_slices(&key, &iv)
        .map_err(|e| Error::CertificateParse(format!("3DES-CBC init failed: {e}")))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| Error::CertificateParse(format!("3DES-CBC decrypt failed (wrong passphrase?): {e}")))
}

/// PBES2: PBKDF2 with the given PRF, then AES-256-CBC. PBES2 feeds the
/// passphrase to PBKDF2 as UTF-8, not BMP.
pub fn decrypt_pbes2_aes256(
    ciphertext: &[u8],
    password: &str,
    prf: HashAlg,
    salt: &[u8],
    iterations: u32,
    iv: &[u8],
) -> Result<Vec<u8>> {
    let mut key = [0u8; 32];
    match prf {
        HashAlg::Sha1 => pbkdf2::pbkdf2_hmac::<Sha1>(password.as_bytes(), salt, iterations, &mut key),
        HashAlg::Sha256 => {
            pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key)
        }
    }

    let decryptor = Aes256CbcDec::new_from_slices(&key, iv)
        .map_err(|e| Error::CertificateParse(format!("AES-256-CBC init failed: {e}")))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| Error::CertificateParse(format!("AES-256-CBC decrypt failed (wrong passphrase?): {e}")))
}

/// HMAC over the authSafe bytes, keyed via the PKCS#12 KDF.
pub fn mac(hash: HashAlg, bmp_password: &[u8], salt: &[u8], iterations: u32, data: &[u8]) -> Result<Vec<u8>> {
    let key = derive(hash, Purpose::Mac, bmp_password, salt, iterations, hash.output_len());
    let tag = match hash {
        HashAlg::Sha1 => {
            let mut m = Hmac::<Sha1>::new_from_slice(&key)
                .map_err(|e| Error::CertificateParse(format!("HMAC-SHA1 init failed: {e}")))?;
            m.update(data);
            m.finalize().into_bytes().to_vec()
        }
        HashAlg::Sha256 => {
            let mut m = Hmac::<Sha256>::new_from_slice(&key)
                .map_err(|e| Error::CertificateParse(format!("HMAC-SHA256 init failed: {e}")))?;
            m.update(data);
            m.finalize().into_bytes().to_vec()
        }
    };
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic_and_purpose_separated() {
        let password = bmp_password("test123");
        let salt = b"saltsalt";
        let key = derive(HashAlg::Sha1, Purpose::Key, &password, salt, 2048, 24);
        assert_eq!(key.len(), 24);
        assert_eq!(key, derive(HashAlg::Sha1, Purpose::Key, &password, salt, 2048, 24));

        let iv = derive(HashAlg::Sha1, Purpose::Iv, &password, salt, 2048, 8);
        assert_eq!(iv.len(), 8);
        assert_ne!(&key[..8], &iv[..]);
    }

    #[test]
    fn test_derive_sha256_spans_multiple_rounds() {
        let password = bmp_password("test123");
        let out = derive(HashAlg::Sha256, Purpose::Key, &password, b"salt", 10, 40);
        assert_eq!(out.len(), 40);
    }

    #[test]
    fn test_bmp_password() {
        assert!(bmp_password("").is_empty());
        assert_eq!(bmp_password("A"), vec![0x00, 0x41, 0x00, 0x00]);
        assert_eq!(bmp_password("ab"), vec![0x00, 0x61, 0x00, 0x62, 0x00, 0x00]);
    }

    #[test]
    fn test_add_with_carry_wraps() {
        let mut chunk = [0xff, 0xff];
        add_with_carry(&mut chunk, &[0x00, 0x00]);
        assert_eq!(chunk, [0x00, 0x00]);
    }

    #[test]
    fn test_decrypt_rejects_garbage() {
        let err = decrypt_pbes2_aes256(&[0u8; 17], "pw", HashAlg::Sha256, b"salt", 1, &[0u8; 16])
            .unwrap_err();
        assert!(matches!(err, Error::CertificateParse(_)));
    }
}
