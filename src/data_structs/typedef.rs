use arcstr::ArcStr;

/// Genome (sample) identifier.
pub type GenomeId = ArcStr;
/// Contig (chromosome) identifier.
pub type ContigId = ArcStr;
/// Zero-based coordinate within a contig.
pub type OffsetType = u64;
/// Count of variants held by a container.
pub type CountType = usize;
