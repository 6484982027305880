//! This module contains the variant database: an in-memory hierarchy
//!
//! [`PopulationDB`] → [`GenomeDB`] → [`ContigDB`] → [`OffsetDB`] → [`Variant`]
//!
//! Every level is an ordered map (genome, contig and offset keys iterate in
//! ascending order) except the offset, which keeps its calls in insertion
//! order.
//!
//! Calls are immutable and held behind [`Arc`](std::sync::Arc), so any number
//! of containers can share them. Deriving a new population never mutates
//! its source:
//!
//! - a *view* (filtering, [`ContigDB::subset`], merging) allocates a new
//!   container skeleton and shares the calls of its source;
//! - a *deep copy* ([`PopulationDB::deep_copy`]) allocates every call anew,
//!   so nothing is shared with the source.
//!
//! Because sharing is reference counted, a view stays valid after its
//! source has been dropped; chains of views need no explicit copy to be
//! returned. A deep copy is only needed when the result must not share
//! allocations with its source.
//!
//! - [`typedef`]: identifier and coordinate aliases.
//! - [`Phase`], [`VariantType`], [`SnpType`], [`DataSource`]: common
//!   enumerations.

mod contig;
mod enums;
mod genome;
mod offset;
mod population;
pub mod typedef;
pub mod variant;

#[cfg(test)]
mod tests;

pub use contig::ContigDB;
pub use enums::{
    DataSource,
    Phase,
    SnpType,
    VariantType,
};
pub use genome::GenomeDB;
pub use offset::OffsetDB;
pub use population::PopulationDB;
pub use variant::{
    InfoData,
    InfoValue,
    Variant,
    VariantEvidence,
};
