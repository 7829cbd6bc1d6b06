//! sweetshop - warehouse and billing services.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use sweetshop::config::{Backend, BillingArgs, Cli, Command, WarehouseArgs};
use sweetshop::inventory::{self, InventoryStore};
use sweetshop::kv::{InMemoryKvStore, KvStore, SidecarKvStore};
use sweetshop::orders::{self, BillingHandler};
use sweetshop::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::load();
    telemetry::init(cli.log_filter())?;

    tracing::info!("sweetshop v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Warehouse(args) => run_warehouse(args).await,
        Command::Billing(args) => run_billing(args).await,
    }
}

async fn run_warehouse(args: WarehouseArgs) -> anyhow::Result<()> {
    let config = args.to_store_config();
    tracing::info!(
        backend = ?args.backend,
        store = %config.store_name,
        key = %config.key,
        "starting warehouse"
    );

    let app = match args.backend {
        Backend::Memory => warehouse_router(InMemoryKvStore::new(), config),
        Backend::Sidecar => {
            let kv = SidecarKvStore::new(args.sidecar_url.as_str(), args.call_timeout())
                .context("failed to build sidecar client")?;
            warehouse_router(kv, config)
        }
    };

    serve(&args.bind, app).await
}

fn warehouse_router<S: KvStore + 'static>(kv: S, config: inventory::StoreConfig) -> Router {
    inventory::router(Arc::new(InventoryStore::with_config(kv, config)))
}

async fn run_billing(args: BillingArgs) -> anyhow::Result<()> {
    tracing::info!(
        pubsub = orders::PUBSUB_NAME,
        topic = orders::ORDERS_TOPIC,
        dedup_capacity = args.dedup_capacity,
        "starting billing"
    );
    let app = orders::router(Arc::new(BillingHandler::with_capacity(args.dedup_capacity)));
    serve(&args.bind, app).await
}

async fn serve(bind: &str, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
