//! # beets-core
//!
//! Backend library for the beets workstation. Reconciles a locally edited
//! workstation snapshot with a remote store: diffing, dependency-ordered
//! persistence, and resolution of placeholder ids into store-assigned ones.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beets_core::config::Config;
//! use beets_core::persistence::SqliteStore;
//! use beets_core::sync::Synchronizer;
//! use beets_core::workstation::Workstation;
//!
//! let config = Config::load();
//! let store = SqliteStore::from_config(&config)?;
//! let synchronizer = Synchronizer::with_options(&store, config.sync_options());
//!
//! let mut workstation = Workstation::open(&store, &project_id).await?;
//! workstation.edit(|state| state.with_track(Track::new(project_id.clone(), "Drums")));
//! workstation.sync(&synchronizer).await?;
//! ```
//!
//! ## Module Overview
//!
//! - [`store`]: the `RemoteStore` trait every backend implements, plus an
//!   in-memory implementation
//! - [`persistence`]: `SqliteStore`, a relational `RemoteStore` on SQLite
//! - [`sync`]: the sync orchestrator and the initial workstation load
//! - [`workstation`]: `Workstation`, the initial/current snapshot pair
//! - [`config`]: TOML configuration (embedded defaults + user override)
//! - [`error`]: `SyncError` and `ValidationError`

pub mod config;
pub mod error;
pub mod persistence;
pub mod store;
pub mod sync;
pub mod workstation;

pub use beets_types as types;
pub use error::{SyncError, SyncResult, ValidationError};
pub use store::{RemoteStore, StoreError};
pub use sync::{load_workstation, sync, SyncOptions, Synchronizer};
pub use workstation::Workstation;
