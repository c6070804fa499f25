//! Filesystem layer for the dispatcher converter
//!
//! Provides normalized paths for reporting, the line store used by every
//! rewrite ([`Fragment`]), safe whole-file I/O, directory walking and the
//! audited file operations (delete, rename, copy) used by conversion rules.

pub mod config;
pub mod constants;
pub mod error;
pub mod fragment;
pub mod io;
pub mod ops;
pub mod path;
pub mod tree;

pub use config::ConfigStore;
pub use constants::DispatcherPath;
pub use error::{Error, Result};
pub use fragment::Fragment;
pub use path::NormalizedPath;
