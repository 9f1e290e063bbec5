#![forbid(unsafe_code)]

//! WS-Security configuration for outgoing gateway requests.
//!
//! Produces a [`SecurityDescriptor`] that a SOAP transport applies to each
//! request: either a UsernameToken or an X.509 signing configuration with the
//! exact algorithm URIs and canonicalization settings the gateway validates.

pub mod builder;
pub mod cache;
pub mod descriptor;

pub use builder::{build_security_descriptor, resolve_material, ResolvedKeyMaterial, SecurityBuilder};
pub use cache::Pkcs12Cache;
pub use descriptor::{CertificateSigning, IdMode, SecurityDescriptor, UsernameToken, UsernameTokenOptions};
