//! Core domain model and contracts for Matchday.
//!
//! Everything in this crate is pure: fence stripping, JSON extraction, payload
//! normalization, rendering and the wire/contract types shared by the function
//! side and the client side.

pub mod classify;
pub mod fence;
pub mod markup;
pub mod parse;
pub mod payload;
pub mod protocol;
pub mod render;
pub mod summary;

pub use protocol::*;
