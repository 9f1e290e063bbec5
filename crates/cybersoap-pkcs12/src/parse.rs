#![forbid(unsafe_code)]

//! BER parsing of PKCS#12 (PFX) structures (RFC 7292).
//!
//! PFX files are BER, not strict DER, so everything goes through
//! `yasna::parse_ber`. Bags keep the order in which they appear across all
//! SafeContents collections.

use cybersoap_core::{Error, Result};
use yasna::models::ObjectIdentifier;
use yasna::{ASN1Error, ASN1ErrorKind, BERReader, Tag};

use crate::kdf::{self, HashAlg};
use crate::Pkcs12Contents;

// ── OIDs ───────────────────────────────────────────────────────────────────

const OID_DATA: &[u64] = &[1, 2, 840, 113549, 1, 7, 1];
const OID_ENCRYPTED_DATA: &[u64] = &[1, 2, 840, 113549, 1, 7, 6];

const OID_SHROUDED_KEY_BAG: &[u64] = &[1, 2, 840, 113549, 1, 12, 10, 1, 2];
const OID_CERT_BAG: &[u64] = &[1, 2, 840, 113549, 1, 12, 10, 1, 3];
const OID_X509_CERT: &[u64] = &[1, 2, 840, 113549, 1, 9, 22, 1];

const OID_PBE_SHA1_3DES: &[u64] = &[1, 2, 840, 113549, 1, 12, 1, 3];
const OID_PBES2: &[u64] = &[1, 2, 840, 113549, 1, 5, 13];
const OID_PBKDF2: &[u64] = &[1, 2, 840, 113549, 1, 5, 12];
const OID_AES_256_CBC: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 42];

const OID_SHA1: &[u64] = &[1, 3, 14, 3, 2, 26];
const OID_SHA256: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 2, 1];
const OID_HMAC_SHA1: &[u64] = &[1, 2, 840, 113549, 2, 7];
const OID_HMAC_SHA256: &[u64] = &[1, 2, 840, 113549, 2, 9];

fn is(oid: &ObjectIdentifier, components: &[u64]) -> bool {
    oid.components().as_slice() == components
}

fn invalid() -> ASN1Error {
    ASN1Error::new(ASN1ErrorKind::Invalid)
}

// ── Parsed structures ──────────────────────────────────────────────────────

#[derive(Debug)]
enum Encryption {
    PbeSha1TripleDes { salt: Vec<u8>, iterations: u32 },
    Pbes2 { salt: Vec<u8>, iterations: u32, prf: HashAlg, iv: Vec<u8> },
}

struct MacData {
    hash: HashAlg,
    digest: Vec<u8>,
    salt: Vec<u8>,
    iterations: u32,
}

enum AuthSafeEntry {
    Plain(Vec<u8>),
    Encrypted { encryption: Encryption, ciphertext: Vec<u8> },
}

enum Bag {
    ShroudedKey { encryption: Encryption, ciphertext: Vec<u8> },
    Cert(Vec<u8>),
    Other,
}

// ── Entry point ────────────────────────────────────────────────────────────

pub fn parse_pfx(data: &[u8], passphrase: &str) -> Result<Pkcs12Contents> {
    let (auth_safe, mac) = yasna::parse_ber(data, |r| {
        r.read_sequence(|r| {
            if r.next().read_u32()? != 3 {
                return Err(invalid());
            }
            let auth_safe = read_data_content_info(r.next())?;
            let mac = r.read_optional(read_mac_data)?;
            Ok((auth_safe, mac))
        })
    })
    .map_err(|e| Error::CertificateParse(format!("malformed PKCS#12 container: {e}")))?;

    let mut bmp = kdf::bmp_password(passphrase);

    match mac {
        Some(mac) => {
            let verify = |bmp: &[u8]| -> Result<bool> {
                Ok(kdf::mac(mac.hash, bmp, &mac.salt, mac.iterations, &auth_safe)? == mac.digest)
            };
            let mut verified = verify(&bmp)?;
            if !verified && passphrase.is_empty() {
                // OpenSSL encodes "" as a lone BMP terminator.
                bmp = vec![0, 0];
                verified = verify(&bmp)?;
            }
            if !verified {
                return Err(Error::CertificateParse(
                    "MAC verification failed (wrong passphrase?)".into(),
                ));
            }
        }
        None => tracing::debug!("PKCS#12 container has no MAC; skipping integrity check"),
    }

    let entries = yasna::parse_ber(&auth_safe, |r| r.collect_sequence_of(read_auth_safe_entry))
        .map_err(|e| Error::CertificateParse(format!("malformed authSafe contents: {e}")))?;

    let mut contents = Pkcs12Contents::default();
    for entry in entries {
        let safe_contents = match entry {
            AuthSafeEntry::Plain(bytes) => bytes,
            AuthSafeEntry::Encrypted { encryption, ciphertext } => {
                decrypt(&encryption, &ciphertext, passphrase, &bmp)?
            }
        };

        let bags = yasna::parse_ber(&safe_contents, |r| r.collect_sequence_of(read_bag))
            .map_err(|e| Error::CertificateParse(format!("malformed SafeContents: {e}")))?;

        for bag in bags {
            match bag {
                Bag::ShroudedKey { encryption, ciphertext } => {
                    contents
                        .private_keys
                        .push(decrypt(&encryption, &ciphertext, passphrase, &bmp)?);
                }
                Bag::Cert(der) => contents.certificates.push(der),
                Bag::Other => {}
            }
        }
    }

    Ok(contents)
}

// ── ContentInfo ────────────────────────────────────────────────────────────

/// Outer ContentInfo wrapping the authSafe: must be `data`.
fn read_data_content_info(r: BERReader) -> std::result::Result<Vec<u8>, ASN1Error> {
    r.read_sequence(|r| {
        let content_type = r.next().read_oid()?;
        if !is(&content_type, OID_DATA) {
            return Err(invalid());
        }
        r.next().read_tagged(Tag::context(0), |r| r.read_bytes())
    })
}

fn read_auth_safe_entry(r: BERReader) -> std::result::Result<AuthSafeEntry, ASN1Error> {
    r.read_sequence(|r| {
        let content_type = r.next().read_oid()?;
        if is(&content_type, OID_DATA) {
            let bytes = r.next().read_tagged(Tag::context(0), |r| r.read_bytes())?;
            return Ok(AuthSafeEntry::Plain(bytes));
        }
        if !is(&content_type, OID_ENCRYPTED_DATA) {
            return Err(invalid());
        }
        // [0] EXPLICIT EncryptedData { version, EncryptedContentInfo }
        r.next().read_tagged(Tag::context(0), |r| {
            r.read_sequence(|r| {
                let _version = r.next().read_u32()?;
                r.next().read_sequence(|r| {
                    let _content_type = r.next().read_oid()?;
                    let encryption = read_encryption(r.next())?;
                    let ciphertext = r
                        .next()
                        .read_tagged_implicit(Tag::context(0), |r| r.read_bytes())?;
                    Ok(AuthSafeEntry::Encrypted { encryption, ciphertext })
                })
            })
        })
    })
}

// ── SafeBag ────────────────────────────────────────────────────────────────

fn read_bag(r: BERReader) -> std::result::Result<Bag, ASN1Error> {
    r.read_sequence(|r| {
        let bag_type = r.next().read_oid()?;

        let bag = if is(&bag_type, OID_SHROUDED_KEY_BAG) {
            // [0] EXPLICIT EncryptedPrivateKeyInfo
            r.next().read_tagged(Tag::context(0), |r| {
                r.read_sequence(|r| {
                    let encryption = read_encryption(r.next())?;
                    let ciphertext = r.next().read_bytes()?;
                    Ok(Bag::ShroudedKey { encryption, ciphertext })
                })
            })?
        } else if is(&bag_type, OID_CERT_BAG) {
            // [0] EXPLICIT CertBag { certId, [0] EXPLICIT OCTET STRING }
            r.next().read_tagged(Tag::context(0), |r| {
                r.read_sequence(|r| {
                    let cert_type = r.next().read_oid()?;
                    if !is(&cert_type, OID_X509_CERT) {
                        return Err(invalid());
                    }
                    let der = r.next().read_tagged(Tag::context(0), |r| r.read_bytes())?;
                    Ok(Bag::Cert(der))
                })
            })?
        } else {
            r.next().read_tagged(Tag::context(0), |r| r.read_der())?;
            Bag::Other
        };

        skip_bag_attributes(r)?;
        Ok(bag)
    })
}

/// friendlyName / localKeyID and friends; nothing downstream uses them.
fn skip_bag_attributes(r: &mut yasna::BERReaderSeq) -> std::result::Result<(), ASN1Error> {
    r.read_optional(|r| {
        r.read_set_of(|r| {
            r.read_sequence(|r| {
                r.next().read_oid()?;
                r.next().read_set_of(|r| r.read_der().map(|_| ()))
            })
        })
    })?;
    Ok(())
}

// ── AlgorithmIdentifier ────────────────────────────────────────────────────

fn read_encryption(r: BERReader) -> std::result::Result<Encryption, ASN1Error> {
    r.read_sequence(|r| {
        let alg = r.next().read_oid()?;

        if is(&alg, OID_PBE_SHA1_3DES) {
            return r.next().read_sequence(|r| {
                let salt = r.next().read_bytes()?;
                let iterations = r.next().read_u32()?;
                Ok(Encryption::PbeSha1TripleDes { salt, iterations })
            });
        }
        if !is(&alg, OID_PBES2) {
            return Err(invalid());
        }

        // PBES2-params { keyDerivationFunc, encryptionScheme }
        r.next().read_sequence(|r| {
            let (salt, iterations, prf) = r.next().read_sequence(|r| {
                if !is(&r.next().read_oid()?, OID_PBKDF2) {
                    return Err(invalid());
                }
                read_pbkdf2_params(r.next())
            })?;

            let iv = r.next().read_sequence(|r| {
                if !is(&r.next().read_oid()?, OID_AES_256_CBC) {
                    return Err(invalid());
                }
                r.next().read_bytes()
            })?;

            Ok(Encryption::Pbes2 { salt, iterations, prf, iv })
        })
    })
}

/// PBKDF2-params { salt, iterationCount, keyLength OPTIONAL, prf DEFAULT hmacWithSHA1 }
fn read_pbkdf2_params(r: BERReader) -> std::result::Result<(Vec<u8>, u32, HashAlg), ASN1Error> {
    r.read_sequence(|r| {
        let salt = r.next().read_bytes()?;
        let iterations = r.next().read_u32()?;

        let mut prf = HashAlg::Sha1;
        if let Some(der) = r.read_optional(|r| r.read_der())? {
            // 0x30 is the PRF SEQUENCE; anything else was keyLength.
            let prf_der = if der.first() == Some(&0x30) {
                Some(der)
            } else {
                r.read_optional(|r| r.read_der())?
            };
            if let Some(prf_der) = prf_der {
                prf = read_prf(&prf_der)?;
            }
        }
        Ok((salt, iterations, prf))
    })
}

fn read_prf(der: &[u8]) -> std::result::Result<HashAlg, ASN1Error> {
    yasna::parse_der(der, |r| {
        r.read_sequence(|r| {
            let oid = r.next().read_oid()?;
            r.read_optional(|r| r.read_null())?;
            if is(&oid, OID_HMAC_SHA256) {
                Ok(HashAlg::Sha256)
            } else if is(&oid, OID_HMAC_SHA1) {
                Ok(HashAlg::Sha1)
            } else {
                Err(invalid())
            }
        })
    })
}

// ── MacData ────────────────────────────────────────────────────────────────

fn read_mac_data(r: BERReader) -> std::result::Result<MacData, ASN1Error> {
    r.read_sequence(|r| {
        let (hash, digest) = r.next().read_sequence(|r| {
            let hash = r.next().read_sequence(|r| {
                let oid = r.next().read_oid()?;
                r.read_optional(|r| r.read_null())?;
                if is(&oid, OID_SHA256) {
                    Ok(HashAlg::Sha256)
                } else if is(&oid, OID_SHA1) {
                    Ok(HashAlg::Sha1)
                } else {
                    Err(invalid())
                }
            })?;
            let digest = r.next().read_bytes()?;
            Ok((hash, digest))
        })?;
        let salt = r.next().read_bytes()?;
        let iterations = r.read_optional(|r| r.read_u32())?.unwrap_or(1);
        Ok(MacData { hash, digest, salt, iterations })
    })
}

// ── Decryption ─────────────────────────────────────────────────────────────

fn decrypt(encryption: &Encryption, ciphertext: &[u8], passphrase: &str, bmp: &[u8]) -> Result<Vec<u8>> {
    match encryption {
        Encryption::PbeSha1TripleDes { salt, iterations } => {
            kdf::decrypt_pbe_sha1_3des(ciphertext, bmp, salt, *iterations)
        }
        Encryption::Pbes2 { salt, iterations, prf, iv } => {
            kdf::decrypt_pbes2_aes256(ciphertext, passphrase, *prf, salt, *iterations, iv)
        }
    }
}
