use std::sync::Arc;

use super::variant::Variant;
use super::typedef::CountType;

/// Variant calls observed at one `(contig, offset)` site, in insertion order.
///
/// Several calls at one site are normal: both homologues of a diploid
/// genome, or several alternates of a multi-allelic record.
#[derive(Debug, Clone, Default)]
pub struct OffsetDB {
    variants: Vec<Arc<Variant>>,
}

impl OffsetDB {
    /// Empty placeholder. Containers never store an empty offset.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_variants(variants: Vec<Arc<Variant>>) -> Self {
        Self { variants }
    }

    pub fn add(
        &mut self,
        variant: Arc<Variant>,
    ) {
        self.variants.push(variant);
    }

    /// Adds `variant` unless an equivalent call is already present.
    pub fn add_unique(
        &mut self,
        variant: Arc<Variant>,
    ) -> bool {
        if self.contains(&variant) {
            false
        }
        else {
            self.variants.push(variant);
            true
        }
    }

    /// Union used when merging views: skips the same allocation or an
    /// equivalent call on the same homologue, so homozygous pairs survive.
    pub(crate) fn merge_variant(
        &mut self,
        variant: &Arc<Variant>,
    ) -> bool {
        let present = self.variants.iter().any(|v| {
            Arc::ptr_eq(v, variant)
                || (v.equivalent(variant) && v.phase() == variant.phase())
        });
        if present {
            false
        }
        else {
            self.variants.push(Arc::clone(variant));
            true
        }
    }

    pub fn variants(&self) -> &[Arc<Variant>] {
        &self.variants
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Variant>> {
        self.variants.iter()
    }

    pub fn len(&self) -> CountType {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn contains(
        &self,
        variant: &Variant,
    ) -> bool {
        self.variants.iter().any(|v| v.equivalent(variant))
    }

    /// Exactly two equivalent calls.
    pub fn is_homozygous(&self) -> bool {
        match self.variants.as_slice() {
            [a, b] => a.equivalent(b),
            _ => false,
        }
    }

    /// One call (the other allele being the reference) or two different
    /// calls.
    pub fn is_heterozygous(&self) -> bool {
        match self.variants.as_slice() {
            [_] => true,
            [a, b] => !a.equivalent(b),
            _ => false,
        }
    }

    /// View holding the calls for which `keep` returns `true`.
    pub fn retain_view<F>(
        &self,
        mut keep: F,
    ) -> OffsetDB
    where
        F: FnMut(&Variant) -> bool, {
        Self {
            variants: self
                .variants
                .iter()
                .filter(|v| keep(v))
                .cloned()
                .collect(),
        }
    }

    /// View with equivalent calls collapsed to the first occurrence.
    pub fn unique(&self) -> OffsetDB {
        let mut unique = OffsetDB::new();
        for variant in self.variants.iter() {
            unique.add_unique(Arc::clone(variant));
        }
        unique
    }

    pub fn deep_copy(&self) -> OffsetDB {
        Self {
            variants: self
                .variants
                .iter()
                .map(|v| Arc::new(v.deep_clone()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a OffsetDB {
    type IntoIter = std::slice::Iter<'a, Arc<Variant>>;
    type Item = &'a Arc<Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.iter()
    }
}
