//! # confportal-web
//!
//! Axum transport adapter for the configuration portal.
//!
//! This crate provides:
//! - `GET /config` — streams the portal page through the bounded-memory
//!   engine with chunked (content-length unknown) semantics
//! - `POST /config` — applies a submitted form and answers with the
//!   single-shot, known-length acknowledgement page
//! - A streaming `Body` that drives the engine's pull contract
//!
//! Each request gets its own engine instance, so the core's
//! at-most-one-active-render precondition holds by construction; a client
//! disconnect simply drops the body and the engine cleans up after itself.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use confportal_web::{create_router, PortalConfig, PortalState};
//!
//! let state = Arc::new(PortalState::new(PortalConfig::default(), system, custom));
//! let app = create_router(state);
//!
//! let listener = TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod body;
pub mod routes;

// Re-exports
pub use routes::create_router;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use confportal_core::EngineConfig;
use confportal_html::ParameterGroup;

/// Portal-wide settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Page title, shown in the browser tab.
    pub title: String,
    /// Version string rendered in the page footer; empty hides it.
    pub config_version: String,
    /// Path of the firmware-update page, when one exists.
    pub update_path: Option<String>,
    /// Streaming engine configuration used for every render pass.
    pub engine: EngineConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            title: "Device configuration".to_string(),
            config_version: "init".to_string(),
            update_path: None,
            engine: EngineConfig::default(),
        }
    }
}

/// Shared portal state for all route handlers.
///
/// This is wrapped in Arc and shared across all Axum handlers.
pub struct PortalState {
    pub config: PortalConfig,
    /// Parameter groups owned by the portal itself.
    pub system: RwLock<Vec<ParameterGroup>>,
    /// Parameter groups contributed by the embedding application.
    pub custom: RwLock<Vec<ParameterGroup>>,
    render_seq: AtomicU64,
}

impl PortalState {
    pub fn new(
        config: PortalConfig,
        system: Vec<ParameterGroup>,
        custom: Vec<ParameterGroup>,
    ) -> Self {
        Self {
            config,
            system: RwLock::new(system),
            custom: RwLock::new(custom),
            render_seq: AtomicU64::new(0),
        }
    }

    /// Monotonic id distinguishing concurrent render passes, used to give
    /// each pass its own scratch file in spill mode.
    pub(crate) fn next_render_id(&self) -> u64 {
        self.render_seq.fetch_add(1, Ordering::Relaxed)
    }
}

/// Type alias for shared state in Axum handlers.
pub type AppState = Arc<PortalState>;
