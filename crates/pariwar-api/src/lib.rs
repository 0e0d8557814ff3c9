//! JSON REST API for Pariwar.
//!
//! Exposes an axum [`Router`] backed by any [`pariwar_core::store::RecordStore`].
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", pariwar_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod records;
pub mod snapshots;

use std::sync::Arc;

use axum::{Router, routing::get};
use pariwar_core::store::RecordStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    .route("/records", get(records::list::<S>).post(records::create::<S>))
    .route(
      "/records/{id}",
      get(records::get_one::<S>)
        .put(records::update_one::<S>)
        .delete(records::delete_one::<S>),
    )
    .route("/snapshots", get(snapshots::stream::<S>))
    .with_state(store)
}
