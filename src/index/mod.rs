//! Auxiliary lookup structures built over a population without mutating it.
//!
//! - [`ExternalIdIndex`]: external code (e.g. a gene identifier taken from
//!   the INFO block) to every call annotated with it.
//! - [`VariantIdIndex`]: external variant identifier (e.g. `rs` numbers) to
//!   call, one index per genome.
//!
//! Genome-partitioned builds go through [`par_index_genomes`]: genomes are
//! handed to a fixed-size rayon pool, each worker builds a private result for
//! its genome, and the calling thread merges the results in genome order once
//! every worker has finished. The population is only read during the build,
//! so no locking is involved.

mod external;
mod ident;


use std::collections::BTreeMap;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};

use log::{
    debug,
    warn,
};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

pub use external::ExternalIdIndex;
pub use ident::{
    PopulationVariantIdIndex,
    VariantIdIndex,
};

use crate::data_structs::typedef::GenomeId;
use crate::data_structs::{
    GenomeDB,
    PopulationDB,
};
use crate::utils::{
    MAX_THREADS,
    THREAD_POOL,
};
use crate::with_field_fn;

/// Options for genome-partitioned index builds.
#[derive(Debug, Clone, Default)]
pub struct IndexConfig {
    /// Dedicated pool size (capped at [`MAX_THREADS`]). `None` uses the
    /// shared [`THREAD_POOL`].
    pub n_threads: Option<usize>,
    /// Abort the build on the first failing genome instead of substituting
    /// an empty result.
    pub fail_fast: bool,
}

impl IndexConfig {
    with_field_fn!(n_threads, Option<usize>);
    with_field_fn!(fail_fast, bool);
}

enum WorkerOutcome<T> {
    Built(T),
    Failed(anyhow::Error),
    Skipped,
}

/// Runs `builder` once per genome on a worker pool and collects the results
/// keyed by genome.
///
/// A failing genome is logged and contributes `T::default()`. With
/// [`IndexConfig::fail_fast`] set, workers that have not started yet skip
/// their genome once a failure is seen, and the first failure in genome
/// order is returned.
pub fn par_index_genomes<T, F>(
    population: &PopulationDB,
    config: &IndexConfig,
    builder: F,
) -> anyhow::Result<BTreeMap<GenomeId, T>>
where
    T: Default + Send,
    F: Fn(&GenomeDB) -> anyhow::Result<T> + Sync, {
    let genomes = population.get_map().values().collect::<Vec<_>>();
    let abort = AtomicBool::new(false);
    let fail_fast = config.fail_fast;

    let run = || {
        genomes
            .par_iter()
            .map(|genome| {
                if fail_fast && abort.load(Ordering::Relaxed) {
                    return WorkerOutcome::Skipped;
                }
                match builder(genome) {
                    Ok(result) => WorkerOutcome::Built(result),
                    Err(e) => {
                        if fail_fast {
                            abort.store(true, Ordering::Relaxed);
                        }
                        WorkerOutcome::Failed(e)
                    },
                }
            })
            .collect::<Vec<_>>()
    };

    let outcomes = match config.n_threads {
        Some(n) => {
            let n = n.clamp(1, MAX_THREADS);
            debug!("Building genome index on a dedicated pool of {} threads", n);
            ThreadPoolBuilder::new()
                .num_threads(n)
                .build()?
                .install(run)
        },
        None => THREAD_POOL.install(run),
    };

    let mut merged = BTreeMap::new();
    for (genome, outcome) in genomes.iter().zip(outcomes) {
        match outcome {
            WorkerOutcome::Built(result) => {
                merged.insert(genome.genome_id().clone(), result);
            },
            WorkerOutcome::Failed(e) if fail_fast => {
                return Err(e.context(format!(
                    "index build failed for genome '{}'",
                    genome.genome_id()
                )));
            },
            WorkerOutcome::Failed(e) => {
                warn!(
                    "Index build failed for genome '{}', using an empty result: {}",
                    genome.genome_id(),
                    e
                );
                merged.insert(genome.genome_id().clone(), T::default());
            },
            WorkerOutcome::Skipped => {},
        }
    }
    debug!(
        "Merged genome index results for {} of {} genomes",
        merged.len(),
        genomes.len()
    );
    Ok(merged)
}
