//! Core data structures modeling stored macromolecular structures.
//!
//! This module defines the columnar structure record, the deduplicated group
//! schema catalogue, entity records, and the bioassembly transform
//! specifications. These types are pure data; the algorithms that consume
//! and produce them live under `ops`.

pub mod assembly;
pub mod entity;
pub mod group;
pub mod header;
pub mod structure;
