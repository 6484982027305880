use std::borrow::Cow;

use anyhow::anyhow;
use log::{
    debug,
    log_enabled,
    Level,
};

use super::{
    settle,
    Filter,
    FilterLevel,
};
use crate::data_structs::{
    ContigDB,
    GenomeDB,
    PopulationDB,
};

impl PopulationDB {
    /// Applies `filter` top-down and returns a view sharing the selected
    /// calls with `self`.
    ///
    /// Genomes rejected at genome level are dropped. Every other genome
    /// keeps an entry for each of its contigs, empty if nothing was
    /// selected, so the view has the same contig set as the source.
    ///
    /// A filter mixing levels is re-applied to its own result until no
    /// genome or call is removed, so applying it to the view again changes
    /// nothing.
    pub fn view_filter(
        &self,
        filter: &Filter,
    ) -> PopulationDB {
        let view = until_stable(
            filter,
            self.filter_pass(filter),
            |view| view.filter_pass(filter),
            |view| (view.genome_count(), view.variant_count()),
        );

        if log_enabled!(Level::Debug) {
            debug!(
                "Filter '{}' on population '{}': {} -> {} genomes, {} -> {} calls",
                filter.name(),
                self.population_id(),
                self.genome_count(),
                view.genome_count(),
                self.variant_count(),
                view.variant_count()
            );
        }
        view
    }

    fn filter_pass(
        &self,
        filter: &Filter,
    ) -> PopulationDB {
        let mut view = self.empty_like();
        for genome in self.get_map().values() {
            let residual = filter.reduce_genome(genome);
            match residual.constant() {
                Some(false) => continue,
                Some(true) => view.insert_genome_unchecked(genome.clone()),
                None => {
                    view.insert_genome_unchecked(genome.filter_reduced(&residual))
                },
            }
        }
        view.square_contigs();
        view
    }
}

impl GenomeDB {
    /// Applies `filter` to this genome and returns a view. A genome-level
    /// rejection yields the genome with every contig emptied.
    pub fn view_filter(
        &self,
        filter: &Filter,
    ) -> GenomeDB {
        until_stable(
            filter,
            self.filter_pass(filter),
            |view| view.filter_pass(filter),
            GenomeDB::variant_count,
        )
    }

    fn filter_pass(
        &self,
        filter: &Filter,
    ) -> GenomeDB {
        let residual = filter.reduce_genome(self);
        match residual.constant() {
            Some(false) => self.empty_like(),
            Some(true) => self.clone(),
            None => self.filter_reduced(&residual),
        }
    }

    fn filter_reduced(
        &self,
        filter: &Filter,
    ) -> GenomeDB {
        let mut view = GenomeDB::new(self.genome_id().clone());
        for contig in self.contigs().values() {
            view.insert_contig_unchecked(contig.filter_reduced(filter));
        }
        view
    }
}

impl ContigDB {
    /// Applies `filter` to this contig and returns a view.
    ///
    /// Genome-level leaves cannot be evaluated without a genome and are
    /// treated as failed evaluations (excluded).
    pub fn view_filter(
        &self,
        filter: &Filter,
    ) -> ContigDB {
        let residual = filter.reduce_with(FilterLevel::Genome, &|leaf| {
            match leaf {
                Filter::Genome(p) => {
                    Some(settle(
                        p.kind(),
                        &p.name(),
                        Err(anyhow!(
                            "genome-level predicate applied to contig '{}'",
                            self.contig_id()
                        )),
                    ))
                },
                _ => None,
            }
        });
        until_stable(
            &residual,
            self.filter_reduced(&residual),
            |view| view.filter_reduced(&residual),
            ContigDB::variant_count,
        )
    }

    fn filter_reduced(
        &self,
        filter: &Filter,
    ) -> ContigDB {
        let residual = filter.reduce_contig(self);
        match residual.constant() {
            Some(false) => self.empty_like(),
            Some(true) => self.clone(),
            None => {
                let mut view = self.empty_like();
                for (offset, offset_db) in self.offsets().iter() {
                    let reduced: Cow<'_, Filter> = residual.reduce_offset(offset_db);
                    let kept = match reduced.constant() {
                        Some(false) => continue,
                        Some(true) => offset_db.clone(),
                        None => {
                            offset_db.retain_view(|variant| {
                                reduced.select_variant(variant)
                            })
                        },
                    };
                    view.insert_offset(*offset, kept);
                }
                view
            },
        }
    }
}

/// Re-applies `pass` to its own output until `size` stops changing.
///
/// Every pass returns a subset of its input, so equal sizes mean equal
/// content. Filters with leaves at a single level are stable after the
/// first pass and are returned as is.
fn until_stable<T, K: PartialEq>(
    filter: &Filter,
    first: T,
    pass: impl Fn(&T) -> T,
    size: impl Fn(&T) -> K,
) -> T {
    if !filter.mixes_levels() {
        return first;
    }
    let mut current = first;
    let mut passes = 1;
    loop {
        let next = pass(&current);
        passes += 1;
        if size(&next) == size(&current) {
            break;
        }
        current = next;
    }
    debug!("Filter '{}' stable after {} passes", filter.name(), passes);
    current
}
