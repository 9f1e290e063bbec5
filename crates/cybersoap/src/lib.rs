#![forbid(unsafe_code)]

pub use cybersoap_client as client;
pub use cybersoap_core as core;
pub use cybersoap_keys as keys;
pub use cybersoap_pkcs12 as pkcs12;
pub use cybersoap_wssec as wssec;

pub use cybersoap_client::{format_amount, Configuration, Gateway, Outcome, SoapTransport, TransactionReply};
pub use cybersoap_core::{Error, ErrorKind, Result};
pub use cybersoap_keys::{CertificateOptions, Environment, EnvironmentView, MapEnv, ProcessEnv};
pub use cybersoap_wssec::{build_security_descriptor, Pkcs12Cache, SecurityBuilder, SecurityDescriptor};
