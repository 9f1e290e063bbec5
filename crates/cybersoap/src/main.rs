#![forbid(unsafe_code)]

//! cybersoap CLI: prepare and inspect gateway signing credentials.

use clap::{Parser, Subcommand, ValueEnum};
use cybersoap_core::Error;
use cybersoap_keys::pem::{self, CERTIFICATE_TYPES, PRIVATE_KEY_TYPES};
use cybersoap_keys::{CertificateOptions, Environment, ProcessEnv};
use cybersoap_client::Configuration;
use cybersoap_wssec::SecurityDescriptor;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(
    name = "cybersoap",
    about = "Prepare and inspect WS-Security credentials for the gateway SOAP API",
    version
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a PKCS#12 container into PEM key and certificate
    ConvertP12 {
        /// Input .p12 / .pfx file
        file: PathBuf,

        /// Container passphrase (default: empty)
        #[arg(short, long)]
        passphrase: Option<String>,

        /// Write the private key here
        #[arg(long = "key-out")]
        key_out: Option<PathBuf>,

        /// Write the certificate here
        #[arg(long = "cert-out")]
        cert_out: Option<PathBuf>,
    },

    /// Decode a base64 export, cleaning up PEM content
    DecodeBase64 {
        /// File holding base64 text
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the key or certificate block from a PEM file
    ExtractPem {
        /// Input PEM file
        file: PathBuf,

        #[arg(long, value_enum)]
        kind: PemKind,
    },

    /// Show which authentication mode would be used
    Describe {
        /// Deployment tier (production, development)
        #[arg(short, long, default_value = "development")]
        environment: Environment,

        #[arg(short, long = "merchant-id", default_value = "")]
        merchant_id: String,

        /// SOAP API version used in the endpoint and namespace
        #[arg(long = "api-version", default_value = "1.219")]
        api_version: String,

        /// Language for reason-code messages
        #[arg(long, default_value = "en")]
        language: String,

        /// Default currency for purchase totals
        #[arg(long, default_value = "USD")]
        currency: String,

        /// PKCS#12 container
        #[arg(long)]
        p12: Option<PathBuf>,

        /// Passphrase for --p12
        #[arg(long = "p12-passphrase")]
        p12_passphrase: Option<String>,

        /// PEM private key
        #[arg(short = 'k', long)]
        key: Option<PathBuf>,

        /// PEM certificate
        #[arg(long)]
        cert: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PemKind {
    Key,
    Cert,
}

impl PemKind {
    fn accepted(self) -> &'static [&'static str] {
        match self {
            Self::Key => PRIVATE_KEY_TYPES,
            Self::Cert => CERTIFICATE_TYPES,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::ConvertP12 {
            file,
            passphrase,
            key_out,
            cert_out,
        } => cmd_convert_p12(file, passphrase, key_out, cert_out),

        Commands::DecodeBase64 { file, output } => cmd_decode_base64(file, output),

        Commands::ExtractPem { file, kind } => cmd_extract_pem(file, kind),

        Commands::Describe {
            environment,
            merchant_id,
            api_version,
            language,
            currency,
            p12,
            p12_passphrase,
            key,
            cert,
        } => {
            let config = Configuration::new(merchant_id, "", environment, api_version)
                .with_language(language)
                .with_currency(currency);
            cmd_describe(config, p12, p12_passphrase, key, cert)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn cmd_convert_p12(
    file: PathBuf,
    passphrase: Option<String>,
    key_out: Option<PathBuf>,
    cert_out: Option<PathBuf>,
) -> Result<(), Error> {
    let data = read_file(&file)?;
    let extracted = cybersoap_pkcs12::extract_pem(&data, passphrase.as_deref().unwrap_or(""))?;

    if key_out.is_none() && cert_out.is_none() {
        write_output(None, &extracted.private_key_pem)?;
        return write_output(None, &extracted.cert_pem);
    }
    if let Some(path) = key_out {
        write_output(Some(path), &extracted.private_key_pem)?;
    }
    if let Some(path) = cert_out {
        write_output(Some(path), &extracted.cert_pem)?;
    }
    Ok(())
}

fn cmd_decode_base64(file: PathBuf, output: Option<PathBuf>) -> Result<(), Error> {
    let text = String::from_utf8_lossy(&read_file(&file)?).into_owned();
    let decoded = cybersoap_keys::source::decode_base64(&text)
        .map_err(|e| Error::Base64(format!("{}: {e}", file.display())))?;

    // Binary content (a P12) passes through untouched.
    let cleaned = pem::extract_block(&decoded, PRIVATE_KEY_TYPES)
        .or_else(|| pem::extract_block(&decoded, CERTIFICATE_TYPES))
        .map(|mut block| {
            block.push(b'\n');
            block
        })
        .unwrap_or(decoded);
    write_output(output, &cleaned)
}

fn cmd_extract_pem(file: PathBuf, kind: PemKind) -> Result<(), Error> {
    let data = read_file(&file)?;
    let mut block = pem::extract_block(&data, kind.accepted()).ok_or_else(|| {
        Error::Pem(format!("{}: no {:?} block found", file.display(), kind.accepted()))
    })?;
    block.push(b'\n');
    write_output(None, &block)
}

fn cmd_describe(
    config: Configuration,
    p12: Option<PathBuf>,
    p12_passphrase: Option<String>,
    key: Option<PathBuf>,
    cert: Option<PathBuf>,
) -> Result<(), Error> {
    let explicit = CertificateOptions {
        p12_path: p12,
        p12_passphrase,
        private_key_path: key,
        public_cert_path: cert,
        ..CertificateOptions::default()
    };
    let config = if explicit.is_empty() { config } else { config.with_cert_options(explicit) };

    let source = cybersoap_keys::resolve_with_source(
        config.cert_options.as_ref(),
        config.environment,
        &ProcessEnv,
    )
    .map_or("none".to_owned(), |(source, _)| format!("{source:?}").to_lowercase());
    let descriptor = config.security_descriptor(&ProcessEnv)?;

    println!("environment: {}", config.environment);
    println!("endpoint:    {}", config.endpoint());
    println!("namespace:   {}", config.xmlns());
    println!("language:    {}", config.language);
    println!("currency:    {}", config.currency);
    println!("credentials: {source}");
    println!("mode:        {}", descriptor.kind());
    if let SecurityDescriptor::CertificateSigning(s) = &descriptor {
        println!("signature:   {}", s.signature_algorithm);
        println!("digest:      {}", s.digest_algorithm);
        println!("c14n:        {}", s.canonicalization_algorithm);
        println!("prefixes:    {}", s.inclusive_prefix_list());
        println!("key:         {} bytes", s.private_key_pem.len());
        println!("cert:        {} bytes", s.cert_pem.len());
    }
    Ok(())
}

/// Keep the failing path in the message; the kind stays `Io`.
fn io_error(path: &Path, e: std::io::Error) -> Error {
    Error::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display())))
}

fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|e| io_error(path, e))
}

fn write_output(path: Option<PathBuf>, data: &[u8]) -> Result<(), Error> {
    match path {
        Some(p) => std::fs::write(&p, data).map_err(|e| io_error(&p, e)),
        None => {
            use std::io::Write;
            std::io::stdout()
                .write_all(data)
                .map_err(|e| io_error(Path::new("<stdout>"), e))
        }
    }
}
