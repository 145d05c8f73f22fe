//! Paired map storage, linkage, and mirrored mutation for Mirrormap.
//!
//! This crate provides:
//! - [`PairMap`] - Insertion-ordered key-value container
//! - [`Bijective`] - Capability trait for the mirroring protocol
//! - [`MapStore`] - Registry of map slots with the partnership protocol
//! - [`UpdateBatch`] - Batched insertion request for [`MapStore::update`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod batch;
mod bijection;
mod pairmap;
mod store;

pub use batch::UpdateBatch;
pub use bijection::{Bijective, reconcile};
pub use pairmap::PairMap;
pub use store::MapStore;
