//! Composable predicates and the view engine that applies them.
//!
//! Leaf predicates are written against one level of the hierarchy
//! ([`VariantPredicate`], [`OffsetPredicate`], [`ContigPredicate`],
//! [`GenomePredicate`]) and combined into a [`Filter`] tree with
//! [`Filter::and`], [`Filter::or`] and `!`. Levels can be mixed freely:
//! `Filter::genome(qc_pass) & Filter::variant(SnpFilter)` keeps the SNPs of
//! genomes passing QC.
//!
//! [`PopulationDB::view_filter`](crate::PopulationDB::view_filter) walks the
//! population top-down. At each level the leaves of that level are evaluated
//! once and folded into the tree; a subtree that is already decided prunes
//! or keeps the whole container without descending further. Coarser leaves
//! judge a container before finer leaves prune it, so a filter mixing
//! levels is re-applied to its own result until nothing more is removed.
//!
//! A leaf that cannot be evaluated (for example a missing INFO field)
//! returns `Err`; the engine treats it as `false` and logs one warning per
//! predicate kind.

mod aggregate;
mod engine;
mod variant;

#[cfg(test)]
mod tests;

use std::borrow::Cow;
use std::fmt::Debug;
use std::sync::Arc;

pub use aggregate::{
    ContigCountFilter,
    ContigIdFilter,
    DiploidFilter,
    FwsFilter,
    GenomeListFilter,
    HeterozygousFilter,
    HomozygousFilter,
    MinVariantGenomeFilter,
};
pub use variant::{
    Comparison,
    DepthFilter,
    IdentifierFilter,
    InfoFlagFilter,
    InfoNumericFilter,
    OffsetRangeFilter,
    PassFilter,
    PhaseFilter,
    QualityFilter,
    RegionFilter,
    SnpFilter,
    VariantTypeFilter,
};

use crate::data_structs::{
    ContigDB,
    GenomeDB,
    OffsetDB,
    Variant,
};
use crate::utils::warn_once;

pub trait VariantPredicate: Send + Sync + Debug {
    fn name(&self) -> String;

    /// Predicate kind used to rate-limit evaluation warnings.
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn select(
        &self,
        variant: &Variant,
    ) -> anyhow::Result<bool>;
}

/// Predicate over all calls at one site.
///
/// Within one pass it sees the site as stored in the container being
/// filtered. Filters mixing levels are re-applied until the view stops
/// shrinking, so a site kept in the final view also satisfies the filter
/// with only its kept calls.
pub trait OffsetPredicate: Send + Sync + Debug {
    fn name(&self) -> String;

    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn select(
        &self,
        offset: &OffsetDB,
    ) -> anyhow::Result<bool>;
}

pub trait ContigPredicate: Send + Sync + Debug {
    fn name(&self) -> String;

    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn select(
        &self,
        contig: &ContigDB,
    ) -> anyhow::Result<bool>;
}

pub trait GenomePredicate: Send + Sync + Debug {
    fn name(&self) -> String;

    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn select(
        &self,
        genome: &GenomeDB,
    ) -> anyhow::Result<bool>;
}

/// Granularity at which a leaf predicate is evaluated.
#[derive(Eq, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Hash)]
pub enum FilterLevel {
    Genome,
    Contig,
    Offset,
    Variant,
}

#[derive(Clone, Debug)]
pub enum Filter {
    True,
    False,
    Variant(Arc<dyn VariantPredicate>),
    Offset(Arc<dyn OffsetPredicate>),
    Contig(Arc<dyn ContigPredicate>),
    Genome(Arc<dyn GenomePredicate>),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn variant<P: VariantPredicate + 'static>(predicate: P) -> Self {
        Filter::Variant(Arc::new(predicate))
    }

    pub fn offset<P: OffsetPredicate + 'static>(predicate: P) -> Self {
        Filter::Offset(Arc::new(predicate))
    }

    pub fn contig<P: ContigPredicate + 'static>(predicate: P) -> Self {
        Filter::Contig(Arc::new(predicate))
    }

    pub fn genome<P: GenomePredicate + 'static>(predicate: P) -> Self {
        Filter::Genome(Arc::new(predicate))
    }

    pub fn and(
        self,
        other: Filter,
    ) -> Self {
        Filter::And(Box::new(self), Box::new(other))
    }

    pub fn or(
        self,
        other: Filter,
    ) -> Self {
        Filter::Or(Box::new(self), Box::new(other))
    }

    /// Human-readable description of the tree.
    pub fn name(&self) -> String {
        match self {
            Filter::True => "True".to_string(),
            Filter::False => "False".to_string(),
            Filter::Variant(p) => p.name(),
            Filter::Offset(p) => p.name(),
            Filter::Contig(p) => p.name(),
            Filter::Genome(p) => p.name(),
            Filter::And(a, b) => format!("And({}, {})", a.name(), b.name()),
            Filter::Or(a, b) => format!("Or({}, {})", a.name(), b.name()),
            Filter::Not(a) => format!("Not({})", a.name()),
        }
    }

    /// Whether the tree contains a leaf of `level`.
    pub fn depends_on(
        &self,
        level: FilterLevel,
    ) -> bool {
        match self {
            Filter::True | Filter::False => false,
            Filter::Variant(_) => level == FilterLevel::Variant,
            Filter::Offset(_) => level == FilterLevel::Offset,
            Filter::Contig(_) => level == FilterLevel::Contig,
            Filter::Genome(_) => level == FilterLevel::Genome,
            Filter::And(a, b) | Filter::Or(a, b) => {
                a.depends_on(level) || b.depends_on(level)
            },
            Filter::Not(a) => a.depends_on(level),
        }
    }

    /// Whether the tree has leaves at more than one level. Such filters can
    /// change the containers their coarser leaves judge.
    pub fn mixes_levels(&self) -> bool {
        [
            FilterLevel::Genome,
            FilterLevel::Contig,
            FilterLevel::Offset,
            FilterLevel::Variant,
        ]
        .into_iter()
        .filter(|level| self.depends_on(*level))
        .count()
            > 1
    }

    /// Decided value, if the tree has been reduced to a constant.
    pub fn constant(&self) -> Option<bool> {
        match self {
            Filter::True => Some(true),
            Filter::False => Some(false),
            _ => None,
        }
    }

    /// Folds the leaves `decide` can answer into constants and simplifies
    /// the result. Trees without such leaves are borrowed unchanged.
    fn reduce_with<'a, D>(
        &'a self,
        level: FilterLevel,
        decide: &D,
    ) -> Cow<'a, Filter>
    where
        D: Fn(&Filter) -> Option<bool>, {
        if !self.depends_on(level) {
            return Cow::Borrowed(self);
        }
        Cow::Owned(self.reduce(decide))
    }

    fn reduce<D>(
        &self,
        decide: &D,
    ) -> Filter
    where
        D: Fn(&Filter) -> Option<bool>, {
        match self {
            Filter::And(a, b) => {
                match (a.reduce(decide), b.reduce(decide)) {
                    (Filter::False, _) | (_, Filter::False) => Filter::False,
                    (Filter::True, other) | (other, Filter::True) => other,
                    (a, b) => a.and(b),
                }
            },
            Filter::Or(a, b) => {
                match (a.reduce(decide), b.reduce(decide)) {
                    (Filter::True, _) | (_, Filter::True) => Filter::True,
                    (Filter::False, other) | (other, Filter::False) => other,
                    (a, b) => a.or(b),
                }
            },
            Filter::Not(a) => {
                match a.reduce(decide) {
                    Filter::True => Filter::False,
                    Filter::False => Filter::True,
                    other => !other,
                }
            },
            leaf => {
                match decide(leaf) {
                    Some(true) => Filter::True,
                    Some(false) => Filter::False,
                    None => leaf.clone(),
                }
            },
        }
    }

    pub(crate) fn reduce_genome(
        &self,
        genome: &GenomeDB,
    ) -> Cow<'_, Filter> {
        self.reduce_with(FilterLevel::Genome, &|leaf| {
            match leaf {
                Filter::Genome(p) => {
                    Some(settle(p.kind(), &p.name(), p.select(genome)))
                },
                _ => None,
            }
        })
    }

    pub(crate) fn reduce_contig(
        &self,
        contig: &ContigDB,
    ) -> Cow<'_, Filter> {
        self.reduce_with(FilterLevel::Contig, &|leaf| {
            match leaf {
                Filter::Contig(p) => {
                    Some(settle(p.kind(), &p.name(), p.select(contig)))
                },
                _ => None,
            }
        })
    }

    pub(crate) fn reduce_offset(
        &self,
        offset: &OffsetDB,
    ) -> Cow<'_, Filter> {
        self.reduce_with(FilterLevel::Offset, &|leaf| {
            match leaf {
                Filter::Offset(p) => {
                    Some(settle(p.kind(), &p.name(), p.select(offset)))
                },
                _ => None,
            }
        })
    }

    /// Evaluates a tree whose coarser leaves have already been reduced.
    ///
    /// # Panics
    ///
    /// If a genome, contig or offset leaf is still present: the engine
    /// always reduces those levels before reaching a variant.
    pub(crate) fn select_variant(
        &self,
        variant: &Variant,
    ) -> bool {
        match self {
            Filter::True => true,
            Filter::False => false,
            Filter::Variant(p) => settle(p.kind(), &p.name(), p.select(variant)),
            Filter::And(a, b) => {
                a.select_variant(variant) && b.select_variant(variant)
            },
            Filter::Or(a, b) => {
                a.select_variant(variant) || b.select_variant(variant)
            },
            Filter::Not(a) => !a.select_variant(variant),
            other => {
                panic!(
                    "Filter reduction invariant violated: '{}' reached variant level unevaluated",
                    other.name()
                )
            },
        }
    }
}

impl std::ops::Not for Filter {
    type Output = Filter;

    fn not(self) -> Self::Output {
        Filter::Not(Box::new(self))
    }
}

impl std::ops::BitAnd for Filter {
    type Output = Filter;

    fn bitand(
        self,
        rhs: Self,
    ) -> Self::Output {
        self.and(rhs)
    }
}

impl std::ops::BitOr for Filter {
    type Output = Filter;

    fn bitor(
        self,
        rhs: Self,
    ) -> Self::Output {
        self.or(rhs)
    }
}

/// Converts a leaf result into a decision; a failed evaluation excludes.
/// Warnings are logged once per predicate kind.
fn settle(
    kind: &str,
    name: &str,
    result: anyhow::Result<bool>,
) -> bool {
    match result {
        Ok(selected) => selected,
        Err(e) => {
            warn_once(
                &format!("filter:{}", kind),
                format!(
                    "Filter '{}' could not be evaluated, excluding: {}",
                    name, e
                ),
            );
            false
        },
    }
}
