use std::sync::Arc;

use rstest::*;

use super::typedef::GenomeId;
use super::*;

fn call(
    contig: &str,
    offset: u64,
    phase: Phase,
    reference: &str,
    alternate: &str,
) -> Arc<Variant> {
    Arc::new(Variant::new(contig, offset, phase, reference, alternate).unwrap())
}

fn manual_count(population: &PopulationDB) -> usize {
    let mut count = 0;
    for genome in population.get_map().values() {
        for contig in genome.contigs().values() {
            for offset_db in contig.offsets().values() {
                count += offset_db.len();
            }
        }
    }
    count
}

#[fixture]
fn population() -> PopulationDB {
    let mut population = PopulationDB::new("pop", DataSource::Pf7);
    let g1 = GenomeId::from("G1");
    let g2 = GenomeId::from("G2");
    population.add_variant(&g1, call("chr1", 100, Phase::Haploid, "A", "T"));
    population.add_variant(&g1, call("chr1", 300, Phase::Haploid, "G", "C"));
    population.add_variant(&g2, call("chr1", 100, Phase::Haploid, "A", "T"));
    population.add_variant(&g2, call("chr2", 200, Phase::Haploid, "C", "G"));
    population
}

#[test]
fn test_duplicate_add_keeps_both() {
    let mut population = PopulationDB::new("dup", DataSource::Unknown);
    let g = GenomeId::from("G");
    population.add_variant(&g, call("C1", 7, Phase::A, "A", "G"));
    population.add_variant(&g, call("C1", 7, Phase::A, "A", "G"));
    let site = population.get_genome("G").unwrap().get_contig("C1").unwrap().find_offset(7).unwrap();
    assert_eq!(site.len(), 2);

    let mut unique = PopulationDB::new("dup", DataSource::Unknown);
    assert!(unique.add_unique_variant(&g, call("C1", 7, Phase::A, "A", "G")));
    assert!(!unique.add_unique_variant(&g, call("C1", 7, Phase::A, "A", "G")));
    let site = unique.get_genome("G").unwrap().get_contig("C1").unwrap().find_offset(7).unwrap();
    assert_eq!(site.len(), 1);
}

#[rstest]
fn test_add_genome_rejects_duplicate(mut population: PopulationDB) {
    assert!(!population.add_genome(GenomeDB::new("G1")));
    assert_eq!(population.genome_count(), 2);

    let mut g3 = GenomeDB::new("G3");
    g3.add_variant(call("chr3", 1, Phase::Haploid, "T", "A"));
    assert!(g3.add_contig(ContigDB::new("chrM")));
    assert!(!g3.add_contig(ContigDB::new("chrM")));
    assert!(population.add_genome(g3));
    assert!(population.is_square());
    assert_eq!(population.contig_ids().len(), 4);
    population.check_invariants();
}

#[rstest]
fn test_counts_are_consistent(population: PopulationDB) {
    assert_eq!(population.variant_count(), 4);
    assert_eq!(population.variant_count(), manual_count(&population));

    let subset = population.get_genome("G1").unwrap().subset("chr1", 100, 300).unwrap();
    assert_eq!(subset.variant_count(), 1);
    assert!(population.get_genome("G1").unwrap().subset("chrX", 0, 10).is_none());

    let mut merged = population.clone();
    let added = merged.merge(&population);
    assert_eq!(added, 0);
    assert_eq!(merged.variant_count(), manual_count(&merged));
}

#[rstest]
fn test_uniformity_after_add(population: PopulationDB) {
    // G1 never saw chr2 but holds an empty entry for it.
    let g1 = population.get_genome("G1").unwrap();
    assert!(g1.get_contig("chr2").unwrap().is_empty());
    assert!(population.is_square());
}

#[rstest]
fn test_subset_is_half_open(population: PopulationDB) {
    let chr1 = population.get_genome("G1").unwrap().get_contig("chr1").unwrap();
    assert_eq!(chr1.subset(100, 301).variant_count(), 2);
    assert_eq!(chr1.subset(101, 300).variant_count(), 0);
    assert_eq!(chr1.subset(300, 100).variant_count(), 0);
    let in_range = chr1.variants_in_range(0, 1000).map(|v| v.offset()).collect::<Vec<_>>();
    assert_eq!(in_range, vec![100, 300]);
}

#[rstest]
fn test_merge_populations(population: PopulationDB) {
    let mut other = PopulationDB::new("other", DataSource::Pf7);
    other.add_variant(&GenomeId::from("G1"), call("chr1", 100, Phase::Haploid, "A", "T"));
    other.add_variant(&GenomeId::from("G1"), call("chr1", 500, Phase::Haploid, "T", "C"));
    other.add_variant(&GenomeId::from("G3"), call("chr9", 5, Phase::Haploid, "T", "C"));

    let mut merged = population.clone();
    assert_eq!(merged.merge(&other), 2);
    assert_eq!(merged.genome_count(), 3);
    assert_eq!(merged.variant_count(), 6);
    assert!(merged.is_square());
    merged.check_invariants();
    // The source is untouched.
    assert_eq!(population.variant_count(), 4);
}

#[test]
fn test_contig_merge_keeps_homozygous_pair() {
    let mut contig = ContigDB::new("chr1");
    contig.add_variant(call("chr1", 10, Phase::A, "A", "G"));
    let mut other = ContigDB::new("chr1");
    other.add_variant(call("chr1", 10, Phase::B, "A", "G"));
    other.add_variant(call("chr1", 10, Phase::A, "A", "G"));
    assert_eq!(contig.merge(&other), Some(1));
    assert!(contig.find_offset(10).unwrap().is_homozygous());

    assert_eq!(contig.merge(&ContigDB::new("chr2")), None);
    assert!(!contig.add_variant(call("chr2", 1, Phase::A, "A", "G")));
}

#[rstest]
fn test_deep_copy_is_independent(population: PopulationDB) {
    let copy = population.deep_copy();
    let mut source = population;
    source.remove_genome("G2");
    assert_eq!(source.variant_count(), 2);
    assert_eq!(copy.variant_count(), 4);

    let original = source.get_genome("G1").unwrap().get_contig("chr1").unwrap().find_offset(100).unwrap();
    let copied = copy.get_genome("G1").unwrap().get_contig("chr1").unwrap().find_offset(100).unwrap();
    assert!(!Arc::ptr_eq(&original.variants()[0], &copied.variants()[0]));
    assert_eq!(original.variants()[0], copied.variants()[0]);
}

#[rstest]
fn test_compress(population: PopulationDB) {
    let compressed = population.compress("all");
    assert_eq!(compressed.genome_id(), "all");
    // chr1:100 A>T appears in both genomes and is kept once.
    assert_eq!(compressed.variant_count(), 3);
    assert_eq!(compressed.contig_count(), 2);
}

#[rstest]
fn test_trim_empty(mut population: PopulationDB) {
    population.add_genome(GenomeDB::new("G3"));
    let mut empty_contig = GenomeDB::new("G4");
    empty_contig.add_contig(ContigDB::new("chrM"));
    population.add_genome(empty_contig);
    assert_eq!(population.genome_count(), 4);
    assert!(population.contig_ids().contains("chrM"));

    assert_eq!(population.trim_empty(), (2, 1));
    assert_eq!(population.genome_count(), 2);
    assert!(!population.contig_ids().contains("chrM"));
    population.check_invariants();
}

#[test]
fn test_square_contigs_is_idempotent() {
    let mut population = PopulationDB::new("sq", DataSource::Unknown);
    population.add_variant(&GenomeId::from("A"), call("c1", 1, Phase::Haploid, "A", "C"));
    population.add_variant(&GenomeId::from("B"), call("c2", 1, Phase::Haploid, "A", "C"));
    population.add_variant(&GenomeId::from("C"), call("c3", 1, Phase::Haploid, "A", "C"));
    assert!(population.is_square());
    assert_eq!(population.square_contigs(), 0);
    for genome in population.get_map().values() {
        assert_eq!(genome.contig_ids().map(|id| id.to_string()).collect::<Vec<_>>(), vec!["c1", "c2", "c3"]);
    }
}

#[test]
fn test_offset_zygosity() {
    let mut offset = OffsetDB::new();
    assert!(!offset.is_heterozygous());
    offset.add(call("c", 1, Phase::A, "A", "G"));
    assert!(offset.is_heterozygous());
    offset.add(call("c", 1, Phase::B, "A", "G"));
    assert!(offset.is_homozygous());
    assert_eq!(offset.unique().len(), 1);
    let view = offset.retain_view(|v| v.phase() == Phase::B);
    assert_eq!(view.len(), 1);
    assert!(Arc::ptr_eq(&view.variants()[0], &offset.variants()[1]));
}

#[test]
#[should_panic(expected = "Contig uniformity invariant violated")]
fn test_check_invariants_panics_on_ragged_population() {
    let mut population = PopulationDB::new("ragged", DataSource::Unknown);
    let mut g1 = GenomeDB::new("G1");
    g1.add_variant(call("chr1", 1, Phase::Haploid, "A", "C"));
    population.insert_genome_unchecked(g1);
    let mut g2 = GenomeDB::new("G2");
    g2.add_variant(call("chr2", 1, Phase::Haploid, "A", "C"));
    population.insert_genome_unchecked(g2);
    population.check_invariants();
}
