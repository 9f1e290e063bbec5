#![forbid(unsafe_code)]

//! Merchant configuration.

use cybersoap_core::{ns, Result};
use cybersoap_keys::{CertificateOptions, Environment, EnvironmentView};
use cybersoap_wssec::{SecurityBuilder, SecurityDescriptor, UsernameTokenOptions};

const PRODUCTION_HOST: &str = "ics2wsa.ic3.com";
const DEVELOPMENT_HOST: &str = "ics2wstesta.ic3.com";

#[derive(Clone)]
pub struct Configuration {
    pub merchant_id: String,
    pub password: String,
    pub environment: Environment,
    /// Language for reason-code messages, e.g. `"en"`.
    pub language: String,
    /// SOAP API version, e.g. `"1.219"`.
    pub version: String,
    pub currency: String,
    /// Explicit certificate options. When absent or empty the tier-prefixed
    /// environment variables are consulted instead.
    pub cert_options: Option<CertificateOptions>,
    pub username_options: UsernameTokenOptions,
    builder: SecurityBuilder,
}

impl Configuration {
    pub fn new(
        merchant_id: impl Into<String>,
        password: impl Into<String>,
        environment: Environment,
        version: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            password: password.into(),
            environment,
            language: "en".into(),
            version: version.into(),
            currency: "USD".into(),
            cert_options: None,
            username_options: UsernameTokenOptions::default(),
            builder: SecurityBuilder::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_cert_options(mut self, options: CertificateOptions) -> Self {
        self.cert_options = Some(options);
        self
    }

    /// Use a shared builder, typically one carrying a P12 cache.
    pub fn with_builder(mut self, builder: SecurityBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// WSDL location for the configured tier and API version.
    pub fn endpoint(&self) -> String {
        let host = match self.environment {
            Environment::Production => PRODUCTION_HOST,
            Environment::Development => DEVELOPMENT_HOST,
        };
        format!(
            "https://{host}/commerce/1.x/transactionProcessor/CyberSourceTransaction_{}.wsdl",
            self.version
        )
    }

    /// Namespace of the transaction-data payload.
    pub fn xmlns(&self) -> String {
        ns::transaction_data(&self.version)
    }

    /// Resolve credentials and build the descriptor for one request.
    ///
    /// Nothing is memoized here: a rotated file or variable is picked up
    /// on the next call.
    pub fn security_descriptor(&self, env: &dyn EnvironmentView) -> Result<SecurityDescriptor> {
        let options = cybersoap_keys::resolve(self.cert_options.as_ref(), self.environment, env);
        self.builder
            .clone()
            .with_username_options(self.username_options)
            .build(&self.merchant_id, &self.password, options.as_ref())
    }
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("merchant_id", &self.merchant_id)
            .field("password", &"<redacted>")
            .field("environment", &self.environment)
            .field("language", &self.language)
            .field("version", &self.version)
            .field("currency", &self.currency)
            .field("cert_options", &self.cert_options)
            .finish_non_exhaustive()
    }
}

/// Render an amount with exactly two decimals, as the gateway expects in
/// purchase totals.
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}
