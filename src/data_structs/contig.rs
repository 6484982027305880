use std::collections::BTreeMap;
use std::sync::Arc;

use log::warn;

use super::offset::OffsetDB;
use super::typedef::{
    ContigId,
    CountType,
    OffsetType,
};
use super::variant::Variant;

/// Variant calls of one genome on one contig, keyed by ascending offset.
///
/// Every stored [`OffsetDB`] is non-empty.
#[derive(Debug, Clone)]
pub struct ContigDB {
    contig_id: ContigId,
    offsets:   BTreeMap<OffsetType, OffsetDB>,
}

impl ContigDB {
    pub fn new(contig_id: impl Into<ContigId>) -> Self {
        Self {
            contig_id: contig_id.into(),
            offsets:   BTreeMap::new(),
        }
    }

    pub fn contig_id(&self) -> &ContigId {
        &self.contig_id
    }

    /// Offset map in ascending order.
    pub fn offsets(&self) -> &BTreeMap<OffsetType, OffsetDB> {
        &self.offsets
    }

    pub fn find_offset(
        &self,
        offset: OffsetType,
    ) -> Option<&OffsetDB> {
        self.offsets.get(&offset)
    }

    /// Adds a call at its own offset. Fails (logged) when the variant
    /// belongs to another contig.
    pub fn add_variant(
        &mut self,
        variant: Arc<Variant>,
    ) -> bool {
        if !self.accepts(&variant) {
            return false;
        }
        self.offsets
            .entry(variant.offset())
            .or_default()
            .add(variant);
        true
    }

    /// As [`ContigDB::add_variant`], but an equivalent call already present
    /// at the offset is not duplicated.
    pub fn add_unique_variant(
        &mut self,
        variant: Arc<Variant>,
    ) -> bool {
        if !self.accepts(&variant) {
            return false;
        }
        self.offsets
            .entry(variant.offset())
            .or_default()
            .add_unique(variant)
    }

    fn accepts(
        &self,
        variant: &Variant,
    ) -> bool {
        if variant.contig() != &self.contig_id {
            warn!(
                "Variant {} rejected by contig '{}'",
                variant, self.contig_id
            );
            false
        }
        else {
            true
        }
    }

    /// Stores a whole offset. Empty offsets are dropped.
    pub(crate) fn insert_offset(
        &mut self,
        offset: OffsetType,
        offset_db: OffsetDB,
    ) {
        if !offset_db.is_empty() {
            self.offsets.insert(offset, offset_db);
        }
    }

    pub fn variant_count(&self) -> CountType {
        self.offsets.values().map(OffsetDB::len).sum()
    }

    pub fn offset_count(&self) -> CountType {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Calls with `begin <= offset < end`, in ascending offset order.
    pub fn variants_in_range(
        &self,
        begin: OffsetType,
        end: OffsetType,
    ) -> impl Iterator<Item = &Arc<Variant>> {
        self.range(begin, end)
            .flat_map(|(_, offset_db)| offset_db.iter())
    }

    fn range(
        &self,
        begin: OffsetType,
        end: OffsetType,
    ) -> std::collections::btree_map::Range<'_, OffsetType, OffsetDB> {
        if begin >= end {
            return self.offsets.range(begin..begin);
        }
        self.offsets.range(begin..end)
    }

    /// View restricted to the half-open interval `[begin, end)`.
    pub fn subset(
        &self,
        begin: OffsetType,
        end: OffsetType,
    ) -> ContigDB {
        Self {
            contig_id: self.contig_id.clone(),
            offsets:   self
                .range(begin, end)
                .map(|(offset, offset_db)| (*offset, offset_db.clone()))
                .collect(),
        }
    }

    /// Offset-level union with `other`. A call already present (same
    /// allocation, or equivalent on the same homologue) is not duplicated.
    ///
    /// Returns the number of calls added, or `None` (logged) if `other`
    /// describes a different contig.
    pub fn merge(
        &mut self,
        other: &ContigDB,
    ) -> Option<CountType> {
        if other.contig_id != self.contig_id {
            warn!(
                "Cannot merge contig '{}' into contig '{}'",
                other.contig_id, self.contig_id
            );
            return None;
        }
        let mut added = 0;
        for (offset, offset_db) in other.offsets.iter() {
            let target = self.offsets.entry(*offset).or_default();
            for variant in offset_db.iter() {
                if target.merge_variant(variant) {
                    added += 1;
                }
            }
        }
        Some(added)
    }

    /// View with equivalent calls at each offset collapsed.
    pub fn unique(&self) -> ContigDB {
        Self {
            contig_id: self.contig_id.clone(),
            offsets:   self
                .offsets
                .iter()
                .map(|(offset, offset_db)| (*offset, offset_db.unique()))
                .collect(),
        }
    }

    pub fn deep_copy(&self) -> ContigDB {
        Self {
            contig_id: self.contig_id.clone(),
            offsets:   self
                .offsets
                .iter()
                .map(|(offset, offset_db)| (*offset, offset_db.deep_copy()))
                .collect(),
        }
    }

    /// Empty contig with the same identifier.
    pub(crate) fn empty_like(&self) -> ContigDB {
        ContigDB::new(self.contig_id.clone())
    }
}
