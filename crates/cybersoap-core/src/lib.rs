#![forbid(unsafe_code)]

//! Core types shared by every cybersoap crate: the error taxonomy and the
//! algorithm / namespace URIs the gateway's WS-Security binding expects.

pub mod algorithm;
pub mod error;
pub mod ns;

pub use error::{Error, ErrorKind, Result};
