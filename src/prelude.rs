pub use crate::data_structs::typedef::{
    ContigId,
    CountType,
    GenomeId,
    OffsetType,
};
pub use crate::data_structs::{
    ContigDB,
    DataSource,
    GenomeDB,
    InfoData,
    InfoValue,
    OffsetDB,
    Phase,
    PopulationDB,
    SnpType,
    Variant,
    VariantEvidence,
    VariantType,
};
pub use crate::filter::{
    Comparison,
    ContigCountFilter,
    ContigIdFilter,
    ContigPredicate,
    DepthFilter,
    DiploidFilter,
    Filter,
    FilterLevel,
    FwsFilter,
    GenomeListFilter,
    GenomePredicate,
    HeterozygousFilter,
    HomozygousFilter,
    IdentifierFilter,
    InfoFlagFilter,
    InfoNumericFilter,
    MinVariantGenomeFilter,
    OffsetPredicate,
    OffsetRangeFilter,
    PassFilter,
    PhaseFilter,
    QualityFilter,
    RegionFilter,
    SnpFilter,
    VariantPredicate,
    VariantTypeFilter,
};
pub use crate::index::{
    par_index_genomes,
    ExternalIdIndex,
    IndexConfig,
    PopulationVariantIdIndex,
    VariantIdIndex,
};
pub use crate::resource::{
    GenomeLookup,
    GenomeSet,
};
pub use crate::stats::{
    PopulationStats,
    VariantTypeCounts,
};
pub use crate::traversal::VariantVisitor;
