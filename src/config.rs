//! Command line and environment configuration for the `sweetshop` binary.
//!
//! Every option can also be set through a `SWEETSHOP_*` variable, and a `.env`
//! file in the working directory is loaded before parsing.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::inventory::{RetryPolicy, StoreConfig, DEFAULT_INVENTORY_KEY, DEFAULT_STORE_NAME};
use crate::orders::DEFAULT_DEDUP_CAPACITY;

/// Default bind address of the warehouse service.
pub const WAREHOUSE_BIND_DEFAULT: &str = "127.0.0.1:3000";

/// Default bind address of the billing service.
pub const BILLING_BIND_DEFAULT: &str = "127.0.0.1:3001";

/// Default sidecar HTTP endpoint.
pub const SIDECAR_URL_DEFAULT: &str = "http://127.0.0.1:3500";

/// Sweet shop services
#[derive(Parser, Debug)]
#[command(name = "sweetshop")]
#[command(about = "Warehouse inventory and order billing services")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging (repeat for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the inventory over HTTP
    Warehouse(WarehouseArgs),
    /// Receive and bill placed orders
    Billing(BillingArgs),
}

/// Where the inventory record lives.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Process-local store, lost on exit
    Memory,
    /// State API of a sidecar
    Sidecar,
}

#[derive(Args, Debug, Clone)]
pub struct WarehouseArgs {
    /// HTTP bind address
    #[arg(short, long, env = "SWEETSHOP_BIND", default_value = WAREHOUSE_BIND_DEFAULT)]
    pub bind: String,

    /// State backend
    #[arg(long, env = "SWEETSHOP_BACKEND", value_enum, default_value_t = Backend::Memory)]
    pub backend: Backend,

    /// Sidecar HTTP endpoint, used with `--backend sidecar`
    #[arg(long, env = "SWEETSHOP_SIDECAR_URL", default_value = SIDECAR_URL_DEFAULT)]
    pub sidecar_url: String,

    /// State store holding the inventory
    #[arg(long, env = "SWEETSHOP_STORE", default_value = DEFAULT_STORE_NAME)]
    pub store: String,

    /// Key of the inventory record
    #[arg(long, env = "SWEETSHOP_KEY", default_value = DEFAULT_INVENTORY_KEY)]
    pub key: String,

    /// Timeout of a single backend call, in milliseconds
    #[arg(long, env = "SWEETSHOP_TIMEOUT_MS", default_value_t = 2000)]
    pub timeout_ms: u64,

    /// Attempts per update before giving up on conflicts
    #[arg(long, env = "SWEETSHOP_RETRY_ATTEMPTS", default_value_t = 5)]
    pub retry_attempts: u32,

    /// Backoff step between conflicting attempts, in milliseconds
    #[arg(long, env = "SWEETSHOP_RETRY_BACKOFF_MS", default_value_t = 10)]
    pub retry_backoff_ms: u64,

    /// Write the default inventory back when the record is missing
    #[arg(
        long,
        env = "SWEETSHOP_PERSIST_SEED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub persist_seed: bool,
}

impl WarehouseArgs {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            store_name: self.store.clone(),
            key: self.key.clone(),
            call_timeout: self.call_timeout(),
            retry: RetryPolicy {
                max_attempts: self.retry_attempts,
                backoff: Duration::from_millis(self.retry_backoff_ms),
            },
            persist_seed: self.persist_seed,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct BillingArgs {
    /// HTTP bind address
    #[arg(short, long, env = "SWEETSHOP_BILLING_BIND", default_value = BILLING_BIND_DEFAULT)]
    pub bind: String,

    /// Recent order event ids remembered to skip redeliveries
    #[arg(long, env = "SWEETSHOP_DEDUP_CAPACITY", default_value_t = DEFAULT_DEDUP_CAPACITY)]
    pub dedup_capacity: usize,
}

impl Cli {
    /// Load `.env` if present, then parse the process arguments.
    pub fn load() -> Self {
        // A missing .env is the normal case.
        let _ = dotenvy::dotenv();
        Self::parse()
    }

    /// Default log filter for the verbosity flag; `RUST_LOG` wins when set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
