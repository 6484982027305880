use std::sync::Arc;

use arcstr::ArcStr;
use hashbrown::HashSet;
use log::debug;
use multimap::MultiMap;

use super::{
    par_index_genomes,
    IndexConfig,
};
use crate::data_structs::typedef::{
    CountType,
    GenomeId,
};
use crate::data_structs::{
    GenomeDB,
    PopulationDB,
    Variant,
};

/// Maps external codes found in an INFO field (e.g. gene identifiers) to
/// every call annotated with them.
///
/// Codes are read with [`InfoValue::as_strings`](crate::data_structs::InfoValue::as_strings),
/// so both scalar and array fields are indexed. Calls without the field are
/// skipped. When an allow-list is set, codes outside of it are ignored.
#[derive(Debug, Clone, Default)]
pub struct ExternalIdIndex {
    field:   ArcStr,
    allowed: Option<Arc<HashSet<ArcStr>>>,
    entries: MultiMap<ArcStr, Arc<Variant>>,
}

impl ExternalIdIndex {
    pub fn new(field: impl Into<ArcStr>) -> Self {
        Self {
            field: field.into(),
            ..Default::default()
        }
    }

    /// Restricts the index to the given codes.
    pub fn with_allowed<I, S>(
        mut self,
        codes: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ArcStr>, {
        self.allowed = Some(Arc::new(codes.into_iter().map(Into::into).collect()));
        self
    }

    pub fn field(&self) -> &ArcStr {
        &self.field
    }

    /// Empty index with the same field and allow-list.
    fn empty_like(&self) -> Self {
        Self {
            field:   self.field.clone(),
            allowed: self.allowed.clone(),
            entries: MultiMap::new(),
        }
    }

    /// Indexes the calls of one genome. Returns the number of entries added.
    pub fn index_genome(
        &mut self,
        genome: &GenomeDB,
    ) -> CountType {
        let field = &self.field;
        let allowed = self.allowed.as_deref();
        let entries = &mut self.entries;
        let mut added = 0;
        genome.process_all(&mut |_: &GenomeId, variant: &Arc<Variant>| {
            let codes = match variant.evidence().info_value(field) {
                Some(value) => value.as_strings(),
                None => return true,
            };
            for code in codes {
                if allowed.map_or(true, |allowed| allowed.contains(&code)) {
                    entries.insert(code, Arc::clone(variant));
                    added += 1;
                }
            }
            true
        });
        added
    }

    /// Sequential build over every genome of `population`.
    pub fn build(
        &mut self,
        population: &PopulationDB,
    ) -> CountType {
        let added: CountType = population
            .get_map()
            .values()
            .map(|genome| self.index_genome(genome))
            .sum();
        debug!(
            "Indexed {} calls by INFO field '{}' ({} codes)",
            added,
            self.field,
            self.len()
        );
        added
    }

    /// Genome-partitioned build: each genome is indexed by a worker into a
    /// private index and the results are merged in genome order, so the
    /// outcome equals [`ExternalIdIndex::build`] on an empty index.
    pub fn par_build(
        &self,
        population: &PopulationDB,
        config: &IndexConfig,
    ) -> anyhow::Result<Self> {
        let partial = par_index_genomes(population, config, |genome| {
            let mut index = self.empty_like();
            index.index_genome(genome);
            Ok(index)
        })?;
        let mut merged = self.empty_like();
        for index in partial.into_values() {
            merged.merge(index);
        }
        debug!(
            "Indexed {} calls by INFO field '{}' ({} codes) in parallel",
            merged.variant_count(),
            merged.field,
            merged.len()
        );
        Ok(merged)
    }

    /// Appends the entries of `other`, keeping per-code insertion order.
    pub fn merge(
        &mut self,
        other: ExternalIdIndex,
    ) {
        for (code, variants) in other.entries.into_iter() {
            self.entries.insert_many(code, variants);
        }
    }

    pub fn get(
        &self,
        code: &str,
    ) -> Option<&Vec<Arc<Variant>>> {
        self.entries.get_vec(code)
    }

    pub fn contains(
        &self,
        code: &str,
    ) -> bool {
        self.entries.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &ArcStr> {
        self.entries.keys()
    }

    /// Number of distinct codes.
    pub fn len(&self) -> CountType {
        self.entries.len()
    }

    /// Number of (code, call) entries.
    pub fn variant_count(&self) -> CountType {
        self.entries.iter_all().map(|(_, variants)| variants.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
