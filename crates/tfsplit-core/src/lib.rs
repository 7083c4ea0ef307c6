//! Core vocabulary for tfsplit.
//!
//! Every dependency-graph node and every source declaration is identified by
//! a [`CanonicalAddress`]. This crate turns raw graph labels into canonical
//! addresses ([`normalize`]), maps addresses onto the declaration slot they
//! refer to ([`classify`]), and describes the layers a module is split into
//! ([`LayerSpec`], [`LayerClosure`]).
//!
//! It performs no I/O.

pub mod address;
pub mod layer;
pub mod normalize;

pub use address::{BlockKey, CanonicalAddress, Kind, META_ADDRESS, classify};
pub use layer::{LayerClosure, LayerSpec};
pub use normalize::normalize;
