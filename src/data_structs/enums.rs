use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

/// Homologue a variant call was phased to.
#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Phase {
    /// Diploid call without phasing information.
    Unphased,
    /// Single-copy organism or haploid stage.
    Haploid,
    /// First homologue of a diploid genome.
    A,
    /// Second homologue of a diploid genome.
    B,
}

impl Phase {
    /// The other homologue, if this is a phased diploid call.
    pub fn opposite(&self) -> Option<Phase> {
        match self {
            Phase::A => Some(Phase::B),
            Phase::B => Some(Phase::A),
            Phase::Unphased | Phase::Haploid => None,
        }
    }
}

impl Display for Phase {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Phase::Unphased => write!(f, "unphased"),
            Phase::Haploid => write!(f, "haploid"),
            Phase::A => write!(f, "A"),
            Phase::B => write!(f, "B"),
        }
    }
}

impl FromStr for Phase {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" | "0" => Ok(Phase::A),
            "B" | "1" => Ok(Phase::B),
            "HAPLOID" => Ok(Phase::Haploid),
            _ => Ok(Phase::Unphased),
        }
    }
}

/// Structural class of a variant, determined from its canonical form.
#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum VariantType {
    /// Single nucleotide substitution.
    Snp,
    /// Bases present in the alternate but not in the reference.
    Insertion,
    /// Bases present in the reference but not in the alternate.
    Deletion,
    /// Multi-base substitution or combined indel.
    Complex,
}

impl Display for VariantType {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            VariantType::Snp => write!(f, "SNP"),
            VariantType::Insertion => write!(f, "INSERTION"),
            VariantType::Deletion => write!(f, "DELETION"),
            VariantType::Complex => write!(f, "COMPLEX"),
        }
    }
}

/// Substitution class of a SNP.
#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SnpType {
    /// Purine to purine or pyrimidine to pyrimidine.
    Transition,
    /// Purine to pyrimidine or the reverse.
    Transversion,
}

impl SnpType {
    /// Classifies a single base substitution. Returns `None` for ambiguous
    /// bases or when `reference == alternate`.
    pub fn classify(
        reference: u8,
        alternate: u8,
    ) -> Option<SnpType> {
        let purine = |b: u8| matches!(b, b'A' | b'G');
        let pyrimidine = |b: u8| matches!(b, b'C' | b'T');
        let (r, a) = (
            reference.to_ascii_uppercase(),
            alternate.to_ascii_uppercase(),
        );
        if r == a {
            return None;
        }
        if (purine(r) && purine(a)) || (pyrimidine(r) && pyrimidine(a)) {
            Some(SnpType::Transition)
        }
        else if (purine(r) && pyrimidine(a)) || (pyrimidine(r) && purine(a)) {
            Some(SnpType::Transversion)
        }
        else {
            None
        }
    }
}

/// Origin of the data a population was ingested from.
#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Default,
)]
pub enum DataSource {
    Pf3k,
    Pf7,
    Genome1000,
    Gnomad,
    Clinvar,
    #[default]
    Unknown,
}

impl Display for DataSource {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            DataSource::Pf3k => write!(f, "Pf3k"),
            DataSource::Pf7 => write!(f, "Pf7"),
            DataSource::Genome1000 => write!(f, "Genome1000"),
            DataSource::Gnomad => write!(f, "Gnomad"),
            DataSource::Clinvar => write!(f, "Clinvar"),
            DataSource::Unknown => write!(f, "Unknown"),
        }
    }
}

impl FromStr for DataSource {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pf3k" => Ok(DataSource::Pf3k),
            "pf7" => Ok(DataSource::Pf7),
            "genome1000" | "1000genomes" => Ok(DataSource::Genome1000),
            "gnomad" => Ok(DataSource::Gnomad),
            "clinvar" => Ok(DataSource::Clinvar),
            _ => Ok(DataSource::Unknown),
        }
    }
}

impl Serialize for DataSource {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DataSource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}
