#![forbid(unsafe_code)]

//! Deployment tier and environment-variable access.

use std::collections::HashMap;
use std::str::FromStr;

use cybersoap_core::Error;

/// Gateway deployment tier. Selects both the endpoint and the prefix of the
/// credential environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    /// Variable prefix for this tier, without the trailing underscore.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Production => "PROD",
            Self::Development => "DEV",
        }
    }

    /// `"production"` selects production; every other label is development.
    pub fn from_label(label: &str) -> Self {
        if label == "production" {
            Self::Production
        } else {
            Self::Development
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" | "sandbox" | "test" => Ok(Self::Development),
            other => Err(Error::Other(format!("unknown environment: {other}"))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of named variables.
///
/// An empty value still counts as set; only a missing variable is `None`.
pub trait EnvironmentView {
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment. Non-UTF-8 values are treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvironmentView for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory variables, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl EnvironmentView for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl<T: EnvironmentView + ?Sized> EnvironmentView for &T {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// Variable name suffixes, appended to `{PREFIX}_`.
pub mod var {
    pub const P12_PATH: &str = "CYBERSOURCE_P12_PATH";
    pub const P12_BASE64: &str = "CYBERSOURCE_P12_BASE64";
    pub const P12_PASSPHRASE: &str = "CYBERSOURCE_P12_PASSPHRASE";
    pub const PRIVATE_KEY_PATH: &str = "CYBERSOURCE_PRIVATE_KEY_PATH";
    pub const PRIVATE_KEY_PEM_BASE64: &str = "CYBERSOURCE_PRIVATE_KEY_PEM_BASE64";
    pub const PRIVATE_KEY_PEM: &str = "CYBERSOURCE_PRIVATE_KEY_PEM";
    pub const PUBLIC_CERT_PATH: &str = "CYBERSOURCE_PUBLIC_CERT_PATH";
    pub const PUBLIC_CERT_PEM_BASE64: &str = "CYBERSOURCE_PUBLIC_CERT_PEM_BASE64";
    pub const PUBLIC_CERT_PEM: &str = "CYBERSOURCE_PUBLIC_CERT_PEM";
    pub const CERT_PASSPHRASE: &str = "CYBERSOURCE_CERT_PASSPHRASE";
}

/// Full variable name for a tier, e.g. `DEV_CYBERSOURCE_P12_PATH`.
pub fn var_name(environment: Environment, suffix: &str) -> String {
    format!("{}_{suffix}", environment.prefix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_follows_label() {
        assert_eq!(Environment::from_label("production").prefix(), "PROD");
        assert_eq!(Environment::from_label("development").prefix(), "DEV");
        assert_eq!(Environment::from_label("staging").prefix(), "DEV");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("sandbox".parse::<Environment>().unwrap(), Environment::Development);
        assert!("moon".parse::<Environment>().is_err());
    }

    #[test]
    fn test_var_name() {
        assert_eq!(
            var_name(Environment::Production, var::P12_PATH),
            "PROD_CYBERSOURCE_P12_PATH"
        );
    }

    #[test]
    fn test_map_env_keeps_empty_values() {
        let env: MapEnv = [("A", ""), ("B", "x")].into_iter().collect();
        assert_eq!(env.var("A").as_deref(), Some(""));
        assert_eq!(env.var("B").as_deref(), Some("x"));
        assert_eq!(env.var("C"), None);
    }
}
