use std::fmt::Display;

use anyhow::anyhow;
use arcstr::ArcStr;

use super::VariantPredicate;
use crate::data_structs::typedef::{
    ContigId,
    OffsetType,
};
use crate::data_structs::{
    InfoValue,
    Phase,
    Variant,
    VariantType,
};

/// Keeps single nucleotide substitutions (after canonicalisation).
#[derive(Debug, Clone, Copy, Default)]
pub struct SnpFilter;

impl VariantPredicate for SnpFilter {
    fn name(&self) -> String {
        "SNP".to_string()
    }

    fn select(
        &self,
        variant: &Variant,
    ) -> anyhow::Result<bool> {
        Ok(variant.is_snp())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VariantTypeFilter {
    variant_type: VariantType,
}

impl VariantTypeFilter {
    pub fn new(variant_type: VariantType) -> Self {
        Self { variant_type }
    }
}

impl VariantPredicate for VariantTypeFilter {
    fn name(&self) -> String {
        format!("Type={}", self.variant_type)
    }

    fn select(
        &self,
        variant: &Variant,
    ) -> anyhow::Result<bool> {
        Ok(variant.variant_type() == self.variant_type)
    }
}

/// Keeps calls with `begin <= offset < end` on any contig.
#[derive(Debug, Clone, Copy)]
pub struct OffsetRangeFilter {
    begin: OffsetType,
    end:   OffsetType,
}

impl OffsetRangeFilter {
    pub fn new(
        begin: OffsetType,
        end: OffsetType,
    ) -> Self {
        Self { begin, end }
    }
}

impl VariantPredicate for OffsetRangeFilter {
    fn name(&self) -> String {
        format!("OffsetRange[{}, {})", self.begin, self.end)
    }

    fn select(
        &self,
        variant: &Variant,
    ) -> anyhow::Result<bool> {
        Ok(variant.offset() >= self.begin && variant.offset() < self.end)
    }
}

/// Keeps calls on `contig` with `begin <= offset < end`.
#[derive(Debug, Clone)]
pub struct RegionFilter {
    contig: ContigId,
    begin:  OffsetType,
    end:    OffsetType,
}

impl RegionFilter {
    pub fn new(
        contig: impl Into<ContigId>,
        begin: OffsetType,
        end: OffsetType,
    ) -> Self {
        Self {
            contig: contig.into(),
            begin,
            end,
        }
    }
}

impl VariantPredicate for RegionFilter {
    fn name(&self) -> String {
        format!("Region {}:[{}, {})", self.contig, self.begin, self.end)
    }

    fn select(
        &self,
        variant: &Variant,
    ) -> anyhow::Result<bool> {
        Ok(variant.contig() == &self.contig
            && variant.offset() >= self.begin
            && variant.offset() < self.end)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhaseFilter {
    phase: Phase,
}

impl PhaseFilter {
    pub fn new(phase: Phase) -> Self {
        Self { phase }
    }
}

impl VariantPredicate for PhaseFilter {
    fn name(&self) -> String {
        format!("Phase={}", self.phase)
    }

    fn select(
        &self,
        variant: &Variant,
    ) -> anyhow::Result<bool> {
        Ok(variant.phase() == self.phase)
    }
}

/// Keeps calls whose VCF FILTER column was `PASS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassFilter;

impl VariantPredicate for PassFilter {
    fn name(&self) -> String {
        "PASS".to_string()
    }

    fn select(
        &self,
        variant: &Variant,
    ) -> anyhow::Result<bool> {
        Ok(variant.evidence().pass())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QualityFilter {
    min_quality: f64,
}

impl QualityFilter {
    pub fn new(min_quality: f64) -> Self {
        Self { min_quality }
    }
}

impl VariantPredicate for QualityFilter {
    fn name(&self) -> String {
        format!("Quality>={}", self.min_quality)
    }

    fn select(
        &self,
        variant: &Variant,
    ) -> anyhow::Result<bool> {
        let quality = variant
            .evidence()
            .quality()
            .ok_or_else(|| anyhow!("call {} has no quality", variant))?;
        Ok(quality >= self.min_quality)
    }
}

/// Keeps calls with at least `min_depth` total reads and, optionally, a
/// minimum alternate allele read count.
#[derive(Debug, Clone, Copy)]
pub struct DepthFilter {
    min_depth:     u32,
    min_alt_depth: Option<u32>,
}

impl DepthFilter {
    pub fn new(
        min_depth: u32,
        min_alt_depth: Option<u32>,
    ) -> Self {
        Self {
            min_depth,
            min_alt_depth,
        }
    }
}

impl VariantPredicate for DepthFilter {
    fn name(&self) -> String {
        match self.min_alt_depth {
            Some(alt) => format!("Depth>={},AltDepth>={}", self.min_depth, alt),
            None => format!("Depth>={}", self.min_depth),
        }
    }

    fn select(
        &self,
        variant: &Variant,
    ) -> anyhow::Result<bool> {
        let evidence = variant.evidence();
        let depth = evidence
            .total_depth()
            .ok_or_else(|| anyhow!("call {} has no read depth", variant))?;
        if depth < self.min_depth {
            return Ok(false);
        }
        match self.min_alt_depth {
            None => Ok(true),
            Some(min_alt) => {
                let alt = evidence.alt_depth().ok_or_else(|| {
                    anyhow!("call {} has no alternate read depth", variant)
                })?;
                Ok(alt >= min_alt)
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Comparison {
    pub fn apply(
        &self,
        lhs: f64,
        rhs: f64,
    ) -> bool {
        match self {
            Comparison::Less => lhs < rhs,
            Comparison::LessEqual => lhs <= rhs,
            Comparison::Greater => lhs > rhs,
            Comparison::GreaterEqual => lhs >= rhs,
        }
    }
}

impl Display for Comparison {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Comparison::Less => write!(f, "<"),
            Comparison::LessEqual => write!(f, "<="),
            Comparison::Greater => write!(f, ">"),
            Comparison::GreaterEqual => write!(f, ">="),
        }
    }
}

/// Compares a numeric INFO field (per-allele for array fields) against a
/// threshold, e.g. `AF >= 0.05`.
#[derive(Debug, Clone)]
pub struct InfoNumericFilter {
    field:      ArcStr,
    comparison: Comparison,
    threshold:  f64,
}

impl InfoNumericFilter {
    pub fn new(
        field: impl Into<ArcStr>,
        comparison: Comparison,
        threshold: f64,
    ) -> Self {
        Self {
            field: field.into(),
            comparison,
            threshold,
        }
    }
}

impl VariantPredicate for InfoNumericFilter {
    fn name(&self) -> String {
        format!("INFO:{}{}{}", self.field, self.comparison, self.threshold)
    }

    fn select(
        &self,
        variant: &Variant,
    ) -> anyhow::Result<bool> {
        let value = variant.evidence().info_numeric(&self.field)?;
        Ok(self.comparison.apply(value, self.threshold))
    }
}

/// Keeps calls whose INFO block sets the flag `field`.
#[derive(Debug, Clone)]
pub struct InfoFlagFilter {
    field: ArcStr,
}

impl InfoFlagFilter {
    pub fn new(field: impl Into<ArcStr>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl VariantPredicate for InfoFlagFilter {
    fn name(&self) -> String {
        format!("INFO:{}", self.field)
    }

    fn select(
        &self,
        variant: &Variant,
    ) -> anyhow::Result<bool> {
        let info = variant
            .evidence()
            .info()
            .as_ref()
            .ok_or_else(|| anyhow!("call {} has no INFO block", variant))?;
        Ok(matches!(info.get(&self.field), Some(InfoValue::Flag)))
    }
}

/// Keeps calls carrying an external identifier, or one of a given set.
#[derive(Debug, Clone, Default)]
pub struct IdentifierFilter {
    identifiers: Option<hashbrown::HashSet<ArcStr>>,
}

impl IdentifierFilter {
    /// Any identifier.
    pub fn any() -> Self {
        Self { identifiers: None }
    }

    pub fn from_ids<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ArcStr>, {
        Self {
            identifiers: Some(identifiers.into_iter().map(Into::into).collect()),
        }
    }
}

impl VariantPredicate for IdentifierFilter {
    fn name(&self) -> String {
        match &self.identifiers {
            None => "HasIdentifier".to_string(),
            Some(ids) => format!("Identifier in {} ids", ids.len()),
        }
    }

    fn select(
        &self,
        variant: &Variant,
    ) -> anyhow::Result<bool> {
        Ok(match (variant.identifier(), &self.identifiers) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(id), Some(ids)) => ids.contains(id),
        })
    }
}
