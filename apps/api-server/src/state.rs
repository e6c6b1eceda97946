//! # Application State
//!
//! Shared by every handler through axum's `State`.
//!
//! ## Carts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartStore                                                              │
//! │  Arc<Mutex<HashMap<session id, Arc<AsyncMutex<Cart>>>>>                 │
//! │                                                                         │
//! │  outer Mutex   held only to find or create an entry                     │
//! │  inner Mutex   held for a whole cart operation, including the           │
//! │                checkout commit, so one session's requests serialize     │
//! │                while other sessions proceed                             │
//! │                                                                         │
//! │  logout / DELETE /cart ──► discard(session id)                          │
//! │  sweep (periodic, employee delete) ──► retain active sessions only     │
//! │  GET /cart, GET /cart/receipt ──► existing(): never creates            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::auth::JwtManager;
use crate::config::ServerConfig;
use medicare_core::Cart;
use medicare_db::{Database, DbResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
    pub jwt: Arc<JwtManager>,
    pub carts: CartStore,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let jwt = JwtManager::new(&config.jwt_secret);
        AppState {
            db,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            carts: CartStore::default(),
        }
    }

    /// Drops every cart whose session is no longer active at `now`.
    ///
    /// ## Returns
    /// Number of carts dropped.
    pub async fn sweep_carts(&self, now: DateTime<Utc>) -> DbResult<usize> {
        let active = self.db.sessions().active_ids(now).await?;
        let dropped = self.carts.retain_sessions(&active);
        if dropped > 0 {
            debug!(dropped, "Dropped carts of inactive sessions");
        }
        Ok(dropped)
    }

    /// Purges inactive sessions, then their carts.
    pub async fn housekeeping(&self, now: DateTime<Utc>) -> DbResult<(u64, usize)> {
        let purged = self.db.sessions().purge_inactive(now).await?;
        let dropped = self.sweep_carts(now).await?;
        Ok((purged, dropped))
    }
}

/// In-memory carts, one per session.
#[derive(Clone, Default)]
pub struct CartStore {
    carts: Arc<Mutex<HashMap<String, Arc<AsyncMutex<Cart>>>>>,
}

impl CartStore {
    fn map(&self) -> MutexGuard<'_, HashMap<String, Arc<AsyncMutex<Cart>>>> {
        // The map holds no invariant a panicking holder could break
        self.carts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The cart of `session_id`, created empty on first use.
    pub fn cart(&self, session_id: &str) -> Arc<AsyncMutex<Cart>> {
        self.map()
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(Cart::new())))
            .clone()
    }

    /// The cart of `session_id` if one exists. Read-only paths use this so
    /// they never add entries.
    pub fn existing(&self, session_id: &str) -> Option<Arc<AsyncMutex<Cart>>> {
        self.map().get(session_id).cloned()
    }

    /// Keeps only the carts of `active` sessions.
    ///
    /// ## Returns
    /// Number of carts dropped.
    pub fn retain_sessions(&self, active: &HashSet<String>) -> usize {
        let mut map = self.map();
        let before = map.len();
        map.retain(|session_id, _| active.contains(session_id));
        before - map.len()
    }

    /// Drops the cart of `session_id`.
    ///
    /// ## Returns
    /// `true` if the session had a cart.
    pub fn discard(&self, session_id: &str) -> bool {
        self.map().remove(session_id).is_some()
    }

    /// Number of sessions holding a cart.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
