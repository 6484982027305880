//! Immutable single-allele variant calls.
//!
//! A [`Variant`] is created once by the ingestion layer and afterwards only
//! ever shared behind an [`Arc`](std::sync::Arc). Containers, filtered views
//! and indices all point at the same allocation, so the type exposes no
//! mutating methods once constructed; the `with_*` builders consume `self`.
//!
//! Two notions of equality are provided:
//!
//! - [`Variant::equivalent`] (also `PartialEq`): same contig, offset,
//!   reference and alternate sequence, as written.
//! - [`Variant::analogous`]: same [canonical](Variant::canonical) form, so
//!   that `AT>A` at offset 10 equals `T>` at offset 11.

mod evidence;

use std::fmt::Display;

use anyhow::bail;
use arcstr::ArcStr;
use bio::alphabets::Alphabet;
use once_cell::sync::Lazy;

pub use evidence::{
    InfoData,
    InfoValue,
    VariantEvidence,
};

use super::enums::{
    Phase,
    SnpType,
    VariantType,
};
use super::typedef::{
    ContigId,
    OffsetType,
};

static DNA_ALPHABET: Lazy<Alphabet> =
    Lazy::new(bio::alphabets::dna::n_alphabet);

#[derive(Debug, Clone)]
pub struct Variant {
    contig:     ContigId,
    offset:     OffsetType,
    phase:      Phase,
    reference:  Box<[u8]>,
    alternate:  Box<[u8]>,
    identifier: Option<ArcStr>,
    evidence:   VariantEvidence,
}

impl Variant {
    /// Creates a variant with default evidence.
    ///
    /// Sequences are upper-cased and must consist of `ACGTN`. Either
    /// sequence may be empty (pure insertion or deletion), but not both,
    /// and they must differ.
    pub fn new(
        contig: impl Into<ContigId>,
        offset: OffsetType,
        phase: Phase,
        reference: impl AsRef<[u8]>,
        alternate: impl AsRef<[u8]>,
    ) -> anyhow::Result<Self> {
        let reference = reference.as_ref().to_ascii_uppercase();
        let alternate = alternate.as_ref().to_ascii_uppercase();

        if !DNA_ALPHABET.is_word(&reference) {
            bail!(
                "reference '{}' is not a DNA sequence",
                String::from_utf8_lossy(&reference)
            );
        }
        if !DNA_ALPHABET.is_word(&alternate) {
            bail!(
                "alternate '{}' is not a DNA sequence",
                String::from_utf8_lossy(&alternate)
            );
        }
        if reference == alternate {
            bail!(
                "reference and alternate are identical ('{}')",
                String::from_utf8_lossy(&reference)
            );
        }

        Ok(Self {
            contig: contig.into(),
            offset,
            phase,
            reference: reference.into_boxed_slice(),
            alternate: alternate.into_boxed_slice(),
            identifier: None,
            evidence: VariantEvidence::default(),
        })
    }

    pub fn with_identifier(
        mut self,
        identifier: impl Into<ArcStr>,
    ) -> Self {
        let identifier = identifier.into();
        self.identifier = if identifier.is_empty() || identifier == "." {
            None
        }
        else {
            Some(identifier)
        };
        self
    }

    pub fn with_evidence(
        mut self,
        evidence: VariantEvidence,
    ) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn contig(&self) -> &ContigId {
        &self.contig
    }

    pub fn offset(&self) -> OffsetType {
        self.offset
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn reference(&self) -> &[u8] {
        &self.reference
    }

    pub fn alternate(&self) -> &[u8] {
        &self.alternate
    }

    /// External identifier such as a dbSNP `rs` number.
    pub fn identifier(&self) -> Option<&ArcStr> {
        self.identifier.as_ref()
    }

    pub fn evidence(&self) -> &VariantEvidence {
        &self.evidence
    }

    /// Minimal representation: the common suffix and then the common prefix
    /// of reference and alternate are removed, advancing the offset past the
    /// removed prefix. Pure insertions end with an empty reference and pure
    /// deletions with an empty alternate.
    ///
    /// Trimming the suffix first places an indel inside a repeat at the
    /// leftmost position the written padding allows.
    pub fn canonical(&self) -> Variant {
        let (offset, reference, alternate) = self.canonical_parts();
        if offset == self.offset
            && reference.len() == self.reference.len()
            && alternate.len() == self.alternate.len()
        {
            return self.clone();
        }
        Self {
            offset,
            reference: reference.into(),
            alternate: alternate.into(),
            ..self.clone()
        }
    }

    pub fn is_canonical(&self) -> bool {
        let (offset, reference, alternate) = self.canonical_parts();
        offset == self.offset
            && reference.len() == self.reference.len()
            && alternate.len() == self.alternate.len()
    }

    fn canonical_parts(&self) -> (OffsetType, &[u8], &[u8]) {
        let mut reference: &[u8] = &self.reference;
        let mut alternate: &[u8] = &self.alternate;
        let mut offset = self.offset;

        while let (Some(r), Some(a)) = (reference.last(), alternate.last()) {
            if r != a {
                break;
            }
            reference = &reference[..reference.len() - 1];
            alternate = &alternate[..alternate.len() - 1];
        }
        while let (Some(r), Some(a)) = (reference.first(), alternate.first()) {
            if r != a {
                break;
            }
            reference = &reference[1..];
            alternate = &alternate[1..];
            offset += 1;
        }
        (offset, reference, alternate)
    }

    pub fn variant_type(&self) -> VariantType {
        let (_, reference, alternate) = self.canonical_parts();
        match (reference.len(), alternate.len()) {
            (1, 1) => VariantType::Snp,
            (0, _) => VariantType::Insertion,
            (_, 0) => VariantType::Deletion,
            _ => VariantType::Complex,
        }
    }

    pub fn is_snp(&self) -> bool {
        self.variant_type() == VariantType::Snp
    }

    /// Transition/transversion class, `None` for non-SNPs and ambiguous bases.
    pub fn snp_type(&self) -> Option<SnpType> {
        let (_, reference, alternate) = self.canonical_parts();
        match (reference, alternate) {
            ([r], [a]) => SnpType::classify(*r, *a),
            _ => None,
        }
    }

    /// Reference span `(offset, length)` of the canonical form. Insertions
    /// have zero length.
    pub fn extent(&self) -> (OffsetType, OffsetType) {
        let (offset, reference, _) = self.canonical_parts();
        (offset, reference.len() as OffsetType)
    }

    /// Same contig, offset, reference and alternate as written.
    pub fn equivalent(
        &self,
        other: &Variant,
    ) -> bool {
        self.offset == other.offset
            && self.contig == other.contig
            && self.reference == other.reference
            && self.alternate == other.alternate
    }

    /// Same canonical form, regardless of padding.
    pub fn analogous(
        &self,
        other: &Variant,
    ) -> bool {
        if self.contig != other.contig {
            return false;
        }
        self.canonical_parts() == other.canonical_parts()
    }

    /// Equivalent calls on opposite homologues.
    pub fn homozygous_pair(
        &self,
        other: &Variant,
    ) -> bool {
        self.equivalent(other) && self.phase.opposite() == Some(other.phase)
    }

    /// `contig:offset:REF>ALT`, unique per allele at a site.
    pub fn hash_key(&self) -> String {
        format!(
            "{}:{}:{}>{}",
            self.contig,
            self.offset,
            String::from_utf8_lossy(&self.reference),
            String::from_utf8_lossy(&self.alternate)
        )
    }

    /// Copy whose evidence shares no allocation with `self`.
    pub fn deep_clone(&self) -> Variant {
        Self {
            evidence: self.evidence.deep_clone(),
            ..self.clone()
        }
    }
}

impl PartialEq for Variant {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.equivalent(other)
    }
}

impl Eq for Variant {}

impl Display for Variant {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}:{} {}>{} ({})",
            self.contig,
            self.offset,
            String::from_utf8_lossy(&self.reference),
            String::from_utf8_lossy(&self.alternate),
            self.phase
        )?;
        if let Some(id) = &self.identifier {
            write!(f, " {}", id)?;
        }
        Ok(())
    }
}
