#![forbid(unsafe_code)]

//! Gateway client plumbing.
//!
//! [`Configuration`] knows the merchant, the tier and the credentials;
//! [`Gateway`] turns it into a security descriptor for each request and
//! hands both to a [`SoapTransport`].

pub mod config;
pub mod gateway;
pub mod transport;

pub use config::{format_amount, Configuration};
pub use gateway::{Gateway, Outcome, SUCCESS_REASON_CODE};
pub use transport::{SoapTransport, TransactionReply};
