//! # composer-lock
//!
//! Lazy, read-only access to Composer's `composer.lock` files.
//!
//! ## Overview
//!
//! A lockfile records the exact set of PHP packages a project resolved to.
//! This crate reads one and exposes it through three types:
//!
//! - **`LockfileReader`**: owns a path, parses on first use, answers
//!   metadata queries (`content-hash`, `minimum-stability`, ...) and builds
//!   package indexes
//! - **`PackageIndex`**: ordered package sequence with lookup by name and by
//!   derived PHP namespace
//! - **`PackageRecord`**: one immutable package entry
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   is_readable / metadata / read_file
//! │  LockfileReader  │──────────────────────────────────▶ Runtime
//! │  OnceCell<Doc>   │                                     (Native | Memory)
//! └────────┬─────────┘
//!          │ packages(selector)
//!          ▼
//! ┌──────────────────┐   by_name / by_namespace
//! │   PackageIndex   │──────────────────────────▶ lazily built lookup maps
//! └────────┬─────────┘
//!          │
//!          ▼
//!   PackageRecord × N
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use composer_lock::{LockfileReader, PackageSelector};
//!
//! # fn main() -> composer_lock::Result<()> {
//! let reader = LockfileReader::new("composer.lock");
//!
//! println!("hash: {:?}", reader.hash()?);
//!
//! let packages = reader.packages(PackageSelector::All)?;
//! let monolog = packages.by_name("monolog/monolog")?;
//! println!("{} {}", monolog.name(), monolog.version());
//!
//! for package in &packages {
//!     println!("{} -> {}", package.name(), package.namespace());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Threading
//!
//! The reader and the index cache their work in `once_cell::unsync` cells and
//! are therefore `!Sync`. Parse once per thread, or move the built
//! `PackageIndex` where it is needed.

pub mod decode;
mod error;
mod index;
pub mod options;
mod package;
mod reader;
mod runtime;

pub use decode::JsonError;
pub use error::{LockError, Result};
pub use index::PackageIndex;
pub use options::ReaderOptions;
pub use package::{
    Author, AutoloadPaths, AutoloadRule, Dist, PackageBuilder, PackageRecord, Source,
    parse_release_time,
};
pub use reader::{LockfileReader, PackageSelector};
pub use runtime::{FileMetadata, MemoryRuntime, NativeRuntime, Runtime, RuntimeError, RuntimeResult};
