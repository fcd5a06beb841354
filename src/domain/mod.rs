//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the optional EMSC background (`Background`) and how it is orthogonalized
//! - configuration sections (`EmscSettings`, `WhittakerSettings`, `PretreatConfig`)

pub mod types;

pub use types::*;
