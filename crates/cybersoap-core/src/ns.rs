#![forbid(unsafe_code)]

//! Namespace constants for the SOAP envelope and its WS-Security header.

/// WS-Security extension namespace (`wsse`)
pub const WSSE: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";

/// WS-Security utility namespace (`wsu`)
pub const WSU: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";

/// SOAP 1.1 envelope namespace (bound to both `soap` and `soapenv`)
pub const SOAP_ENVELOPE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Gateway transaction-data namespace for an API version, e.g. `1.151`.
pub fn transaction_data(version: &str) -> String {
    format!("urn:schemas-cybersource-com:transaction-data-{version}")
}

// ── Prefixes ─────────────────────────────────────────────────────────

pub mod prefix {
    pub const DS: &str = "ds";
    pub const WSSE: &str = "wsse";
    pub const WSU: &str = "wsu";
    pub const SOAP: &str = "soap";
    pub const SOAPENV: &str = "soapenv";
    pub const URN: &str = "urn";
}
