//! SR Common Library
//!
//! Shared error handling and logging for the SR import workspace.
//!
//! - **Error Handling**: [`SrError`] and the [`Result`] alias used by every crate
//! - **Logging**: [`logging::LogConfig`] and [`logging::init_logging`]
//!
//! # Example
//!
//! ```no_run
//! use sr_common::logging::{init_logging, LogConfig};
//! use sr_common::{Result, SrError};
//!
//! fn start() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::from_env()?)?;
//!     Ok(())
//! }
//!
//! fn require_release(release: &str) -> Result<()> {
//!     if release.is_empty() {
//!         return Err(SrError::config("release must not be empty"));
//!     }
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;

pub use error::{Result, SrError};
