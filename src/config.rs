//! Configuration for the toolkit adapter and the gateway client.
//!
//! The library types are plain records; [`Args`] builds them from command
//! line flags and environment variables.

use crate::error::GatewayError;
use clap::{Args as ClapArgs, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

pub const DEFAULT_BIN_DIR: &str = "/opt/cprocsp/bin/amd64";
pub const DEFAULT_PROVIDER_TYPE: u32 = 80;
pub const DEFAULT_SIGN_ALGORITHM: &str = "GOST12_256";

pub const TEST_URL: &str = "https://rest-api-test.tinkoff.ru/e2c/";
pub const PRODUCTION_URL: &str = "https://securepay.tinkoff.ru/e2c/";

/// Settings of the external cryptographic toolkit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoProConfig {
    /// Fully qualified key container name, e.g. `\\.\HDIMAGE\my-key`.
    pub container_name: String,
    /// Certificate store holding the container's certificate, e.g. `uMy`.
    pub store_name: String,
    pub provider_type: u32,
    pub sign_algorithm: String,
    /// Directory holding the `csptest` and `certmgr` executables.
    pub bin_dir: PathBuf,
}

impl CryptoProConfig {
    pub fn new(container_name: impl Into<String>, store_name: impl Into<String>) -> Self {
        Self {
            container_name: container_name.into(),
            store_name: store_name.into(),
            provider_type: DEFAULT_PROVIDER_TYPE,
            sign_algorithm: DEFAULT_SIGN_ALGORITHM.to_string(),
            bin_dir: PathBuf::from(DEFAULT_BIN_DIR),
        }
    }

    pub fn with_bin_dir(mut self, bin_dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = bin_dir.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Test,
    #[default]
    Production,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Test => TEST_URL,
            Self::Production => PRODUCTION_URL,
        }
    }
}

/// Merchant settings for the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Merchant terminal identifier issued by the bank.
    pub terminal_key: String,
    /// Endpoint prefix every operation path is appended to; ends with `/`.
    pub base_url: String,
}

impl GatewayConfig {
    pub fn new(terminal_key: impl Into<String>, environment: Environment) -> Result<Self, GatewayError> {
        let terminal_key = terminal_key.into();
        if terminal_key.is_empty() {
            return Err(GatewayError::Validation(
                "Terminal key must be defined".to_string(),
            ));
        }
        Ok(Self {
            terminal_key,
            base_url: environment.base_url().to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }
}

/// Payouts to cards through the bank's E2C gateway, signed with CryptoPro.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub cryptopro: CryptoProArgs,

    #[command(flatten)]
    pub gateway: GatewayArgs,

    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CryptoProArgs {
    /// Key container used for signing
    #[arg(long, env = "CRYPTOPRO_CONTAINER", global = true)]
    pub container: Option<String>,

    /// Certificate store holding the container's certificate
    #[arg(long, env = "CRYPTOPRO_STORE", default_value = "uMy", global = true)]
    pub store: String,

    /// Cryptographic provider type
    #[arg(long, env = "CRYPTOPRO_PROVIDER_TYPE", default_value_t = DEFAULT_PROVIDER_TYPE, global = true)]
    pub provider_type: u32,

    /// Hash and signature algorithm
    #[arg(long, env = "CRYPTOPRO_ALGORITHM", default_value = DEFAULT_SIGN_ALGORITHM, global = true)]
    pub algorithm: String,

    /// Directory holding the toolkit executables
    #[arg(long, env = "CRYPTOPRO_BIN_DIR", default_value = DEFAULT_BIN_DIR, global = true)]
    pub bin_dir: PathBuf,
}

impl CryptoProArgs {
    pub fn to_config(&self) -> CryptoProConfig {
        CryptoProConfig {
            container_name: self.container.clone().unwrap_or_default(),
            store_name: self.store.clone(),
            provider_type: self.provider_type,
            sign_algorithm: self.algorithm.clone(),
            bin_dir: self.bin_dir.clone(),
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GatewayArgs {
    /// Terminal key issued by the bank
    #[arg(long, env = "E2C_TERMINAL_KEY", global = true)]
    pub terminal_key: Option<String>,

    /// Use the bank's test endpoint
    #[arg(long, env = "E2C_TEST", global = true)]
    pub test: bool,

    /// Override the endpoint prefix
    #[arg(long, env = "E2C_BASE_URL", global = true)]
    pub base_url: Option<String>,
}

impl GatewayArgs {
    pub fn to_config(&self) -> Result<GatewayConfig, GatewayError> {
        let environment = if self.test {
            Environment::Test
        } else {
            Environment::Production
        };
        let config = GatewayConfig::new(self.terminal_key.clone().unwrap_or_default(), environment)?;
        Ok(match &self.base_url {
            Some(base_url) => config.with_base_url(base_url),
            None => config,
        })
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List key containers known to the provider
    Containers,
    /// List certificates in the configured store
    Certificates,
    /// Print the serial of the container's certificate
    Serial,
    /// List the available card check types
    CheckTypes,
    /// Register a payout
    CreatePayment {
        #[arg(long)]
        order_id: String,
        #[arg(long)]
        card_id: i64,
        /// Amount in major units, e.g. 100.50
        #[arg(long)]
        amount: Decimal,
        /// Known to break the bank's signature check
        #[arg(long)]
        client_id: Option<String>,
        /// Metadata entries as key=value
        #[arg(long = "data", value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,
    },
    /// Execute a registered payout
    AdvancePayment {
        #[arg(long)]
        payment_id: String,
    },
    /// Fetch the state of a payout
    FetchPayment {
        #[arg(long)]
        payment_id: String,
    },
    /// Register a customer
    CreateClient {
        #[arg(long)]
        client_id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Delete a customer
    DeleteClient {
        #[arg(long)]
        client_id: String,
    },
    /// Fetch a customer
    FetchClient {
        #[arg(long)]
        client_id: String,
    },
    /// Start binding a card to a customer
    CreateCard {
        #[arg(long)]
        client_id: String,
        #[arg(long)]
        check_type: Option<String>,
        /// Known to break the bank's signature check
        #[arg(long)]
        comment: Option<String>,
        /// Known to break the bank's signature check
        #[arg(long)]
        form_type: Option<String>,
    },
    /// Delete a customer's card
    DeleteCard {
        #[arg(long)]
        card_id: i64,
        #[arg(long)]
        client_id: String,
    },
    /// List a customer's cards
    ListCards {
        #[arg(long)]
        client_id: String,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}
