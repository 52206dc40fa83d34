//! Store selection and engine wiring.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use ledgerd_core::{Account, AccountId};
use ledgerd_engine::LedgerEngine;
use ledgerd_infra::{AccountStore, InMemoryAccountStore, PostgresAccountStore};

/// Shared handles available to every request handler.
#[derive(Clone)]
pub struct AppServices {
    pub engine: LedgerEngine,
}

impl AppServices {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self {
            engine: LedgerEngine::new(store),
        }
    }
}

/// Build services from the environment.
///
/// `DATABASE_URL` selects the Postgres store; without it the process runs on
/// an in-memory store seeded with the provisioning accounts (dev/test only —
/// nothing survives a restart).
pub async fn build_services() -> anyhow::Result<AppServices> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let max_connections = std::env::var("DB_POOL_SIZE")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(30);

            let pool = PgPoolOptions::new()
                .max_connections(max_connections)
                .connect(&url)
                .await
                .context("failed to connect to Postgres")?;

            tracing::info!(max_connections, "connected to Postgres");
            Ok(AppServices::new(Arc::new(PostgresAccountStore::new(pool))))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory account store");
            let store = InMemoryAccountStore::new();
            seed_dev_accounts(&store);
            Ok(AppServices::new(Arc::new(store)))
        }
    }
}

/// Same accounts `db/schema.sql` provisions for the Postgres store.
fn seed_dev_accounts(store: &InMemoryAccountStore) {
    for (id, limit) in [
        (1, 100_000),
        (2, 80_000),
        (3, 1_000_000),
        (4, 10_000_000),
        (5, 500_000),
    ] {
        store.seed(Account {
            id: AccountId::new(id),
            balance: 0,
            limit,
            recent_transactions: Vec::new(),
        });
    }
}
