//! # Global Attributes
//!
//! A **global attribute** (GA) is a named, typed attribute schema shared by
//! many attribute views. Each GA keeps one value per content block, so the
//! same block shows the same value in every view column bound to the GA.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - GaApi facade, typed requests in, typed results out       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Catalog, column marking, forward and reverse sync        │
//! │  - Block binding and inline attribute mutation              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┴───────────────┐
//!               ▼                              ▼
//! ┌───────────────────────────┐  ┌──────────────────────────────┐
//! │  Storage (store/)         │  │  Hosts (host.rs)             │
//! │  - GaStore over GaBackend │  │  - Views, block attributes,  │
//! │  - FsBackend, MemBackend  │  │    block index, notifier     │
//! └───────────────────────────┘  └──────────────────────────────┘
//! ```
//!
//! ## Two Directions of Sync
//!
//! - **Forward**: an edited view cell is pushed into the bound GA, keyed by the
//!   row's content block. For custom-attribute GAs the value is also mirrored
//!   onto the block as `custom-<name>`.
//! - **Reverse**: an edited `custom-<name>` inline attribute is parsed back into
//!   the GA value for that block, guarded by last-writer-wins on `updated`.
//!
//! Builtin GAs (`memo`, `tag`, `hash`, block fields) are computed from the
//! block index and never stored. See [`builtin`].
//!
//! ## Soft Failures
//!
//! Secondary writes (mirroring, flag saves) never fail the primary call. They
//! are returned as [`commands::SoftFailure`] entries next to the result and
//! logged with `tracing`.

pub mod api;
pub mod attributes;
pub mod builtin;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod ids;
pub mod init;
pub mod model;
pub mod store;
pub mod view;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use api::GaApi;
pub use error::{GaError, Result};
pub use model::{GlobalAttrMeta, GlobalAttribute};
