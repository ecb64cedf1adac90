//! Core type definitions shared across the crate.
//!
//! This module provides the primitives every other layer builds on:
//! - `encoding`: CBOR heads, byte strings and the `Encode`/`Decode` traits
//! - `hash`: typed 28/32-byte identifiers and SHA-256 hashing
//! - `asset`: bounded native asset names
//! - `wrapper_types`: common aliases for async trait seams

pub mod asset;
pub mod encoding;
pub mod hash;
pub mod wrapper_types;
