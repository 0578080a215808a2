//! Quickmarks - named, ordered bookmark lists for editors.
//!
//! The crate keeps user-curated lists of marks (files with a cursor position,
//! or any other item type with a [`Codec`](codec::Codec)), lets the host
//! navigate between them, reconciles them against externally observed
//! orderings, notifies listeners of every change, and persists them per
//! session.
//!
//! # Modules
//!
//! - `list`: the ordered list engine and reconciliation
//! - `events`: the listener bus
//! - `codec`: item codecs and the editor collaborator trait
//! - `config`: settings and per-list configuration
//! - `registry`: lists per session key, lifecycle hooks, sync
//! - `store`: persistence backends
//!
//! # Example
//!
//! ```
//! use quickmarks::codec::PlainCodec;
//! use quickmarks::config::Config;
//! use quickmarks::store::MemoryStore;
//! use quickmarks::Registry;
//! use std::rc::Rc;
//!
//! let config: Config<String> = Config::new(Rc::new(PlainCodec));
//! let store = Box::new(MemoryStore::default());
//! let mut registry = Registry::new(config, store, || "demo".to_string()).unwrap();
//!
//! registry
//!     .list(Some("commands"))
//!     .append(Some("cargo test".to_string()))
//!     .append(Some("cargo fmt".to_string()));
//! assert_eq!(registry.list(Some("commands")).length(), 2);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod list;
pub mod registry;
pub mod store;

pub use error::{Error, Result};
pub use list::{MarkList, NavOptions, SelectOptions};
pub use registry::{Lifecycle, Registry};

/// Name of the list used when no name is given.
pub const DEFAULT_LIST: &str = "__quickmarks_files";
