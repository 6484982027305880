use std::sync::Arc;

use arcstr::ArcStr;
use hashbrown::HashMap;
use rstest::*;

use super::*;
use crate::data_structs::typedef::GenomeId;
use crate::data_structs::{
    DataSource,
    InfoData,
    InfoValue,
    Phase,
    PopulationDB,
    VariantEvidence,
    VariantType,
};
use crate::resource::{
    GenomeLookup,
    GenomeSet,
};
use crate::utils::warn_once;

#[derive(Debug)]
struct MinCalls(usize);

impl OffsetPredicate for MinCalls {
    fn name(&self) -> String {
        format!("MinCalls({})", self.0)
    }

    fn select(
        &self,
        offset: &OffsetDB,
    ) -> anyhow::Result<bool> {
        Ok(offset.len() >= self.0)
    }
}

fn snp(
    contig: &str,
    offset: u64,
    reference: &str,
    alternate: &str,
) -> Arc<Variant> {
    Arc::new(Variant::new(contig, offset, Phase::Haploid, reference, alternate).unwrap())
}

/// G1: C1 {100: [A>T]}; G2: C1 {100: [A>T], 200: [C>G]}.
#[fixture]
fn two_genomes() -> PopulationDB {
    let mut population = PopulationDB::new("scenario", DataSource::Unknown);
    population.add_variant(&GenomeId::from("G1"), snp("C1", 100, "A", "T"));
    population.add_variant(&GenomeId::from("G2"), snp("C1", 100, "A", "T"));
    population.add_variant(&GenomeId::from("G2"), snp("C1", 200, "C", "G"));
    population
}

/// Three genomes with SNPs, indels, diploid sites and INFO blocks.
#[fixture]
fn mixed() -> PopulationDB {
    let mut population = PopulationDB::new("mixed", DataSource::Pf3k);
    let info = Arc::new(
        InfoData::new()
            .with_field("AF", InfoValue::FloatArray(vec![0.02, 0.4]))
            .with_field("DB", InfoValue::Flag),
    );
    let with_info = |variant: Variant, alt_index: usize| {
        let evidence = VariantEvidence::new()
            .with_alternate_index(alt_index)
            .with_alternate_count(2)
            .with_quality(Some(50.0))
            .with_info(Some(Arc::clone(&info)));
        Arc::new(variant.with_evidence(evidence))
    };

    let s1 = GenomeId::from("S1");
    let s2 = GenomeId::from("S2");
    let s3 = GenomeId::from("S3");
    // S1: homozygous SNP site, a deletion and a low-AF SNP.
    population.add_variant(&s1, snp("chr1", 10, "A", "G"));
    population.add_variant(&s1, snp("chr1", 10, "A", "G"));
    population.add_variant(&s1, snp("chr1", 20, "ATT", "A"));
    population.add_variant(
        &s1,
        with_info(Variant::new("chr2", 5, Phase::Haploid, "C", "T").unwrap(), 0),
    );
    // S2: SNP and deletion at one site, and a high-AF SNP.
    population.add_variant(&s2, snp("chr1", 10, "A", "G"));
    population.add_variant(&s2, snp("chr1", 10, "AT", "A"));
    population.add_variant(
        &s2,
        with_info(Variant::new("chr2", 5, Phase::Haploid, "C", "A").unwrap(), 1),
    );
    // S3: single insertion without evidence.
    population.add_variant(&s3, snp("chr2", 30, "G", "GAA"));
    population
}

/// `mixed` plus S4, holding a homozygous A/B pair and a single phased call.
#[fixture]
fn with_diploid(mixed: PopulationDB) -> PopulationDB {
    let mut population = mixed;
    let s4 = GenomeId::from("S4");
    let phased = |offset: u64, phase: Phase, reference: &str, alternate: &str| {
        Arc::new(Variant::new("chr1", offset, phase, reference, alternate).unwrap())
    };
    population.add_variant(&s4, phased(40, Phase::A, "A", "G"));
    population.add_variant(&s4, phased(40, Phase::B, "A", "G"));
    population.add_variant(&s4, phased(70, Phase::A, "C", "T"));
    population
}

#[rstest]
fn test_snp_filter_keeps_all_snps(two_genomes: PopulationDB) {
    assert_eq!(two_genomes.variant_count(), 3);
    let view = two_genomes.view_filter(&Filter::variant(SnpFilter));
    assert_eq!(view.variant_count(), 3);
    assert_eq!(view.genome_count(), 2);
    view.check_invariants();
}

#[rstest]
fn test_offset_range_keeps_empty_contig(two_genomes: PopulationDB) {
    let mut view = two_genomes.view_filter(&Filter::variant(OffsetRangeFilter::new(150, 9999)));
    assert_eq!(view.variant_count(), 1);
    let g2 = view.get_genome("G2").unwrap();
    assert!(g2.get_contig("C1").unwrap().find_offset(200).is_some());
    assert!(g2.get_contig("C1").unwrap().find_offset(100).is_none());

    assert_eq!(view.square_contigs(), 0);
    let g1 = view.get_genome("G1").unwrap();
    assert!(g1.get_contig("C1").unwrap().is_empty());
    assert!(view.is_square());
}

#[rstest]
fn test_view_aliases_source(mixed: PopulationDB) {
    let view = mixed.view_filter(&Filter::variant(SnpFilter));
    let mut seen = 0;
    view.process_all(&mut |genome_id: &GenomeId, variant: &Arc<Variant>| {
        let source = mixed
            .get_genome(genome_id)
            .and_then(|genome| genome.get_contig(variant.contig()))
            .and_then(|contig| contig.find_offset(variant.offset()))
            .unwrap();
        assert!(source.iter().any(|v| Arc::ptr_eq(v, variant)));
        seen += 1;
        true
    });
    assert_eq!(seen, 5);
}

#[rstest]
#[case::snp(Filter::variant(SnpFilter))]
#[case::homozygous(Filter::offset(HomozygousFilter))]
#[case::type_or_genome(
    Filter::variant(VariantTypeFilter::new(VariantType::Insertion))
        | Filter::genome(MinVariantGenomeFilter::new(4))
)]
#[case::negated(!Filter::contig(ContigIdFilter::new(["chr2"])))]
#[case::homozygous_phase(
    Filter::offset(HomozygousFilter) & Filter::variant(PhaseFilter::new(Phase::A))
)]
#[case::min_calls_snp(Filter::offset(MinCalls(2)) & Filter::variant(SnpFilter))]
#[case::contig_count_snp(
    Filter::contig(ContigCountFilter::new(2)) & Filter::variant(SnpFilter)
)]
fn test_filter_is_idempotent(
    with_diploid: PopulationDB,
    #[case] filter: Filter,
) {
    let once = with_diploid.view_filter(&filter);
    let twice = once.view_filter(&filter);
    assert_eq!(once.variant_count(), twice.variant_count());

    let mut first = Vec::new();
    once.process_all(&mut |genome_id: &GenomeId, variant: &Arc<Variant>| {
        first.push((genome_id.clone(), Arc::as_ptr(variant)));
        true
    });
    let mut second = Vec::new();
    twice.process_all(&mut |genome_id: &GenomeId, variant: &Arc<Variant>| {
        second.push((genome_id.clone(), Arc::as_ptr(variant)));
        true
    });
    assert_eq!(first, second);
}

#[rstest]
fn test_offset_filters(mixed: PopulationDB) {
    let homozygous = mixed.view_filter(&Filter::offset(HomozygousFilter));
    assert_eq!(homozygous.variant_count(), 2);
    assert_eq!(homozygous.get_genome("S1").unwrap().variant_count(), 2);

    let heterozygous = mixed.view_filter(&Filter::offset(HeterozygousFilter));
    // Every single-call site plus the two-call site of S2.
    assert_eq!(heterozygous.variant_count(), 6);
    assert!(heterozygous.is_square());
}

#[rstest]
fn test_mixed_level_filter_is_stable(mixed: PopulationDB) {
    // The deletion of S2 is dropped at variant level, which leaves its site
    // with a single call; the site then fails MinCalls(2) as well.
    let filter = Filter::offset(MinCalls(2)) & Filter::variant(SnpFilter);
    let view = mixed.view_filter(&filter);
    assert_eq!(view.variant_count(), 2);
    let s2 = view.get_genome("S2").unwrap();
    assert!(s2.get_contig("chr1").unwrap().find_offset(10).is_none());
    assert_eq!(view.get_genome("S1").unwrap().variant_count(), 2);
    view.check_invariants();
}

#[rstest]
fn test_homozygous_pair_split_by_phase(with_diploid: PopulationDB) {
    let filter = Filter::offset(HomozygousFilter) & Filter::variant(PhaseFilter::new(Phase::A));
    let s4 = with_diploid.get_genome("S4").unwrap();

    // Keeping phase A leaves a single call, which is no longer homozygous.
    let view = with_diploid.view_filter(&filter);
    assert_eq!(view.get_genome("S4").unwrap().variant_count(), 0);
    assert_eq!(view.view_filter(&filter).variant_count(), view.variant_count());

    assert_eq!(s4.view_filter(&filter).variant_count(), 0);
    let chr1 = s4.get_contig("chr1").unwrap();
    let contig_view = chr1.view_filter(&filter);
    assert!(contig_view.is_empty());
    assert!(chr1.view_filter(&Filter::offset(HomozygousFilter)).find_offset(40).is_some());
}

#[rstest]
fn test_mixed_levels(mixed: PopulationDB) {
    let qc: Arc<GenomeSet> = Arc::new(["S1", "S3"].into_iter().collect());
    let filter = Filter::genome(GenomeListFilter::new(qc)) & Filter::variant(SnpFilter);
    let view = mixed.view_filter(&filter);
    assert_eq!(view.genome_count(), 2);
    assert!(view.get_genome("S2").is_none());
    assert_eq!(view.variant_count(), 3);
    // S3 is kept with emptied contigs.
    assert!(view.get_genome("S3").unwrap().is_empty());
    view.check_invariants();

    let either = Filter::contig(ContigIdFilter::new(["chr1"])) | Filter::variant(PassFilter);
    assert_eq!(mixed.view_filter(&either).variant_count(), mixed.variant_count());

    let none = Filter::contig(ContigIdFilter::new(["chr1"])) & !Filter::contig(ContigIdFilter::new(["chr1"]));
    assert_eq!(mixed.view_filter(&none).variant_count(), 0);
}

#[rstest]
fn test_missing_field_is_excluded(mixed: PopulationDB) {
    let af = Filter::variant(InfoNumericFilter::new("AF", Comparison::GreaterEqual, 0.05));
    let view = mixed.view_filter(&af);
    // Only S2's call reads AF index 1 (0.4); calls without INFO are excluded.
    assert_eq!(view.variant_count(), 1);
    assert_eq!(view.get_genome("S2").unwrap().variant_count(), 1);

    let quality = mixed.view_filter(&Filter::variant(QualityFilter::new(10.0)));
    assert_eq!(quality.variant_count(), 2);

    let flagged = mixed.view_filter(&Filter::variant(InfoFlagFilter::new("DB")));
    assert_eq!(flagged.variant_count(), 2);
}

#[rstest]
fn test_fws_filter(mixed: PopulationDB) {
    let mut fws: HashMap<GenomeId, f64> = HashMap::new();
    fws.insert(ArcStr::from("S1"), 0.98);
    fws.insert(ArcStr::from("S2"), 0.60);
    let lookup: Arc<dyn GenomeLookup<f64>> = Arc::new(fws);

    let monoclonal = mixed.view_filter(&Filter::genome(FwsFilter::new(Arc::clone(&lookup), 0.95, true)));
    // S3 has no FWS value and cannot be classified.
    assert_eq!(monoclonal.genome_count(), 1);
    assert!(monoclonal.get_genome("S1").is_some());

    let mixed_infections = mixed.view_filter(&Filter::genome(FwsFilter::new(lookup, 0.95, false)));
    assert_eq!(mixed_infections.genome_count(), 1);
    assert!(mixed_infections.get_genome("S2").is_some());
}

#[rstest]
fn test_region_and_depth(mixed: PopulationDB) {
    let region = mixed.view_filter(&Filter::variant(RegionFilter::new("chr2", 0, 10)));
    assert_eq!(region.variant_count(), 2);

    let depth = mixed.view_filter(&Filter::variant(DepthFilter::new(1, None)));
    assert_eq!(depth.variant_count(), 0);
}

#[test]
fn test_depth_overflow_is_excluded() {
    let mut population = PopulationDB::new("deep", DataSource::Unknown);
    let evidence = VariantEvidence::new()
        .with_ref_depth(Some(u32::MAX))
        .with_alt_depth(Some(u32::MAX));
    let variant = Variant::new("chr1", 3, Phase::Haploid, "A", "C")
        .unwrap()
        .with_evidence(evidence);
    population.add_variant(&GenomeId::from("G"), Arc::new(variant));

    let view = population.view_filter(&Filter::variant(DepthFilter::new(1, None)));
    assert_eq!(view.variant_count(), 0);
}

#[rstest]
fn test_genome_and_contig_views(mixed: PopulationDB) {
    let s1 = mixed.get_genome("S1").unwrap();
    let rejected = s1.view_filter(&Filter::genome(MinVariantGenomeFilter::new(100)));
    assert!(rejected.is_empty());
    assert_eq!(rejected.contig_count(), s1.contig_count());

    let chr1 = s1.get_contig("chr1").unwrap();
    let snps = chr1.view_filter(&Filter::variant(SnpFilter));
    assert_eq!(snps.variant_count(), 2);
    let counted = chr1.view_filter(&Filter::contig(ContigCountFilter::new(3)));
    assert_eq!(counted.variant_count(), 3);
    // Genome leaves have no genome to look at from a contig.
    let genome_leaf = chr1.view_filter(&Filter::genome(MinVariantGenomeFilter::new(0)));
    assert!(genome_leaf.is_empty());
}

#[rstest]
fn test_identifier_and_phase() {
    let mut population = PopulationDB::new("ids", DataSource::Genome1000);
    let g = GenomeId::from("HG00096");
    let named = Variant::new("chr1", 5, Phase::A, "G", "A")
        .unwrap()
        .with_identifier("rs123");
    population.add_variant(&g, Arc::new(named));
    population.add_variant(
        &g,
        Arc::new(Variant::new("chr1", 9, Phase::B, "G", "A").unwrap()),
    );

    let any_id = population.view_filter(&Filter::variant(IdentifierFilter::any()));
    assert_eq!(any_id.variant_count(), 1);
    let listed = population.view_filter(&Filter::variant(IdentifierFilter::from_ids(["rs999"])));
    assert_eq!(listed.variant_count(), 0);
    let phase_b = population.view_filter(&Filter::variant(PhaseFilter::new(Phase::B)));
    assert_eq!(phase_b.variant_count(), 1);
    let diploid = population.view_filter(&Filter::offset(DiploidFilter));
    assert_eq!(diploid.variant_count(), 2);
}

#[test]
fn test_filter_names_and_levels() {
    let filter = Filter::genome(MinVariantGenomeFilter::new(2)) & !Filter::variant(SnpFilter);
    assert_eq!(filter.name(), "And(GenomeVariants>=2, Not(SNP))");
    assert!(filter.depends_on(FilterLevel::Genome));
    assert!(filter.depends_on(FilterLevel::Variant));
    assert!(!filter.depends_on(FilterLevel::Offset));
    assert_eq!(Filter::True.constant(), Some(true));
    assert_eq!(filter.constant(), None);
    assert!(filter.mixes_levels());
    assert!(!(Filter::variant(SnpFilter) | !Filter::variant(PassFilter)).mixes_levels());
}

#[test]
fn test_warnings_are_keyed_by_predicate_kind() {
    let af = InfoNumericFilter::new("AF", Comparison::GreaterEqual, 0.05);
    let dp = InfoNumericFilter::new("DP", Comparison::Less, 10.0);
    assert_ne!(af.name(), dp.name());
    assert_eq!(VariantPredicate::kind(&af), VariantPredicate::kind(&dp));
    assert_ne!(
        VariantPredicate::kind(&af),
        VariantPredicate::kind(&SnpFilter)
    );
    assert!(OffsetPredicate::kind(&HomozygousFilter).ends_with("HomozygousFilter"));

    let kind = "filter::tests::warning_kind";
    assert!(!settle(kind, "first", Err(anyhow::anyhow!("missing"))));
    assert!(!settle(kind, "second", Err(anyhow::anyhow!("missing"))));
    assert!(!warn_once(&format!("filter:{}", kind), "already reported"));
}
