//! Application state shared across handlers.

use std::sync::Arc;

use crate::authn::IdentityProvider;
use crate::config::AdminConfig;
use crate::services::{IdentityGateway, OrderRegistry, PersonnelRegistry};
use crate::store::DocumentStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the configuration and the three
/// services; the store and identity provider behind them are chosen at
/// startup from `STORE_BACKEND`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    identity: IdentityGateway,
    personnel: PersonnelRegistry,
    orders: OrderRegistry,
}

impl AppState {
    /// Create a new application state over the given backends.
    #[must_use]
    pub fn new(
        config: AdminConfig,
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        let identity = IdentityGateway::new(provider, Arc::clone(&store));
        let personnel = PersonnelRegistry::new(Arc::clone(&store));
        let orders = OrderRegistry::new(store, personnel.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                identity,
                personnel,
                orders,
            }),
        }
    }

    /// Get a reference to the console configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the identity gateway.
    #[must_use]
    pub fn identity(&self) -> &IdentityGateway {
        &self.inner.identity
    }

    /// Get a reference to the personnel registry.
    #[must_use]
    pub fn personnel(&self) -> &PersonnelRegistry {
        &self.inner.personnel
    }

    /// Get a reference to the order registry.
    #[must_use]
    pub fn orders(&self) -> &OrderRegistry {
        &self.inner.orders
    }
}
