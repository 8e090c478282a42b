//! # Shared Types Crate
//!
//! Types and format helpers used by every subsystem of the request ledger.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identities, currencies and the wire formats
//!   of hashes, addresses and amounts are defined here once.
//! - **Pure**: no I/O, no async, no logging. Everything here is a value or a
//!   total function over values.

pub mod entities;
pub mod formats;

pub use entities::*;
pub use formats::*;
