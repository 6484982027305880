//! Visiting every call of a population in a fixed order.
//!
//! Calls are visited by ascending genome identifier, then ascending contig
//! identifier, then ascending offset, then insertion order within the
//! offset. A visitor returning `false` stops the walk, and the entry point
//! reports `false`.
//!
//! Any `FnMut(&GenomeId, &Arc<Variant>) -> bool` closure is a visitor, so
//! accumulators can either implement [`VariantVisitor`] or be captured by
//! reference in a closure.

use std::sync::Arc;

use crate::data_structs::typedef::GenomeId;
use crate::data_structs::{
    ContigDB,
    GenomeDB,
    PopulationDB,
    Variant,
};

pub trait VariantVisitor {
    fn visit(
        &mut self,
        genome_id: &GenomeId,
        variant: &Arc<Variant>,
    ) -> bool;
}

impl<F> VariantVisitor for F
where
    F: FnMut(&GenomeId, &Arc<Variant>) -> bool,
{
    fn visit(
        &mut self,
        genome_id: &GenomeId,
        variant: &Arc<Variant>,
    ) -> bool {
        self(genome_id, variant)
    }
}

impl PopulationDB {
    pub fn process_all<V: VariantVisitor + ?Sized>(
        &self,
        visitor: &mut V,
    ) -> bool {
        self.get_map()
            .values()
            .all(|genome| genome.process_all(visitor))
    }
}

impl GenomeDB {
    pub fn process_all<V: VariantVisitor + ?Sized>(
        &self,
        visitor: &mut V,
    ) -> bool {
        let genome_id = self.genome_id();
        self.contigs()
            .values()
            .all(|contig| contig.process_all(genome_id, visitor))
    }
}

impl ContigDB {
    /// Visits the calls of this contig, reporting them under `genome_id`.
    pub fn process_all<V: VariantVisitor + ?Sized>(
        &self,
        genome_id: &GenomeId,
        visitor: &mut V,
    ) -> bool {
        self.offsets()
            .values()
            .flat_map(|offset_db| offset_db.iter())
            .all(|variant| visitor.visit(genome_id, variant))
    }
}
