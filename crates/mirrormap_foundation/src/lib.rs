//! Generational map handles and error types for Mirrormap.
//!
//! This crate provides:
//! - [`MapId`] - Generational handles naming map slots in a registry
//! - [`Error`] - Error types for the linkage and mirroring protocol
//! - [`Result`] - Convenient result alias

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod id;

pub use error::{Error, ErrorKind, Result};
pub use id::MapId;
