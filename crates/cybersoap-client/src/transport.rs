#![forbid(unsafe_code)]

//! The seam to whatever actually speaks SOAP.
//!
//! Envelope construction, signing and HTTP live behind [`SoapTransport`];
//! this workspace only decides which credentials the transport must apply.

use cybersoap_core::Result;
use cybersoap_wssec::SecurityDescriptor;

/// Fields of a gateway reply the dispatcher inspects.
pub trait TransactionReply {
    /// Gateway reason code; `100` means accepted.
    fn reason_code(&self) -> u32;

    fn request_id(&self) -> Option<&str> {
        None
    }
}

/// Sends one `runTransaction` call.
///
/// Implementations must apply `security` exactly as described: a
/// UsernameToken header, or an X.509 signature over the body with the
/// descriptor's algorithms and prefixes.
pub trait SoapTransport {
    type Request;
    type Reply: TransactionReply;

    fn run_transaction(
        &self,
        endpoint: &str,
        request: &Self::Request,
        security: &SecurityDescriptor,
    ) -> Result<Self::Reply>;
}

impl<T: SoapTransport + ?Sized> SoapTransport for &T {
    type Request = T::Request;
    type Reply = T::Reply;

    fn run_transaction(
        &self,
        endpoint: &str,
        request: &Self::Request,
        security: &SecurityDescriptor,
    ) -> Result<Self::Reply> {
        (**self).run_transaction(endpoint, request, security)
    }
}
