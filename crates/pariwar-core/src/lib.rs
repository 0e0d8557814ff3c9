//! Core types and trait definitions for the Pariwar family register.
//!
//! No HTTP or database code lives here; every other crate depends on this one.

// Native `async fn` in trait impls; the trait itself spells out `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod feed;
pub mod record;
pub mod snapshot;
pub mod store;
pub mod subscription;

pub use error::{Error, Result};
