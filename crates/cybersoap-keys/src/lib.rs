#![forbid(unsafe_code)]

//! Credential inputs for gateway request signing.
//!
//! Decides which certificate option bag is active (explicit options or
//! tier-prefixed environment variables), loads raw key/certificate bytes from
//! the fields of that bag in a fixed order, and strips vendor noise from PEM
//! buffers before they reach the signer.

pub mod env;
pub mod options;
pub mod pem;
pub mod resolver;
pub mod source;

pub use env::{Environment, EnvironmentView, MapEnv, ProcessEnv};
pub use options::CertificateOptions;
pub use resolver::{resolve, resolve_with_source, OptionsSource};
