//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::RepositoryError;
use crate::db::accounts::AccountRepository;
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::seed;
use crate::services::auth::{self, AuthError, TokenStore};
use crate::services::checkout::Pricing;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("catalog: {0}")]
    Catalog(#[from] RepositoryError),
    #[error("demo accounts: {0}")]
    Accounts(#[from] AuthError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// in-memory repositories and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    products: ProductRepository,
    accounts: AccountRepository,
    orders: OrderRepository,
    tokens: TokenStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Loads the catalog from `config.catalog_path` when set, otherwise the
    /// built-in demo catalog, and seeds the demo accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be loaded or the demo
    /// accounts cannot be created.
    pub async fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let products = match &config.catalog_path {
            Some(path) => seed::from_json_file(path)?,
            None => seed::demo_products(),
        };

        let accounts = AccountRepository::new();
        auth::seed_demo_accounts(&accounts, config.admin_password.as_ref()).await?;

        let tokens = TokenStore::new(config.token_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                products: ProductRepository::new(products),
                accounts,
                orders: OrderRepository::new(),
                tokens,
                config,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Product catalog and stock.
    #[must_use]
    pub fn products(&self) -> &ProductRepository {
        &self.inner.products
    }

    /// Users and address books.
    #[must_use]
    pub fn accounts(&self) -> &AccountRepository {
        &self.inner.accounts
    }

    /// Placed orders.
    #[must_use]
    pub fn orders(&self) -> &OrderRepository {
        &self.inner.orders
    }

    /// Login tokens.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Fees, tax and currency from the configuration.
    #[must_use]
    pub fn pricing(&self) -> Pricing {
        Pricing::from(&self.inner.config)
    }
}
