//! # varpopdb
//!
//! `varpopdb` is an in-memory store for variant calls of a population of
//! genomes, built for population-genetics analysis of sequencing cohorts
//! (e.g. malaria parasite collections such as Pf3k/Pf7 or human panels).
//!
//! Calls are organised as a strict hierarchy keyed by identifier and
//! coordinate:
//!
//! ```text
//! PopulationDB ─ genome id → GenomeDB ─ contig id → ContigDB ─ offset → OffsetDB ─ [Variant]
//! ```
//!
//! Analyses rarely mutate data. Instead they derive new populations from
//! existing ones: [`PopulationDB::view_filter`] builds a filtered *view* that
//! shares the calls of its source, and [`PopulationDB::deep_copy`] builds an
//! independent copy. Calls are immutable and reference counted, so views are
//! cheap and remain valid for as long as they are held.
//!
//! ## Key Features
//!
//! * **Hierarchical containers**: ordered maps at every level, with
//!   `add_variant` creating intermediate containers on demand and every
//!   genome of a population holding the same contig set.
//! * **Composable filters**: predicates over calls, sites, contigs and
//!   genomes combined with `&`, `|` and `!` into a [`Filter`] that is
//!   evaluated top-down, pruning whole genomes or contigs when a decision
//!   can be made early.
//! * **Traversal**: [`PopulationDB::process_all`] visits every call in a
//!   fixed order, feeding accumulators such as [`stats::PopulationStats`].
//! * **Parallel indexing**: lookups by external code or variant identifier,
//!   built per genome on a rayon pool and merged deterministically.
//!
//! Number of threads used for parallel index builds can be configured with
//! the `VARPOP_NUM_THREADS` environment variable.
//!
//! ## Structure
//!
//! * [`data_structs`]: calls, call evidence and the container hierarchy.
//! * [`filter`]: predicate traits, concrete filters and the view engine.
//! * [`traversal`]: the visitor interface.
//! * [`index`]: external-code and identifier indices, parallel build.
//! * [`resource`]: genome-keyed lookups consulted by filters.
//! * [`stats`]: traversal-driven statistics.
//! * [`utils`]: thread pool, logging setup and helper macros.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use varpopdb::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     varpopdb::utils::init_logger(false);
//!
//!     let mut population = PopulationDB::new("cohort", DataSource::Pf7);
//!     let variant = Variant::new("Pf3D7_01_v3", 100, Phase::Haploid, "A", "G")?;
//!     population.add_variant(&GenomeId::from("PA0001-C"), Arc::new(variant));
//!
//!     let snps = population.view_filter(&Filter::variant(SnpFilter));
//!     let stats = PopulationStats::collect(&snps);
//!     println!("{}", stats.to_json()?);
//!     Ok(())
//! }
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod data_structs;
pub mod exports;
pub mod filter;
pub mod index;
pub mod prelude;
pub mod resource;
pub mod stats;
pub mod traversal;
pub mod utils;

pub use data_structs::{
    ContigDB,
    GenomeDB,
    OffsetDB,
    PopulationDB,
    Variant,
};
pub use filter::Filter;
