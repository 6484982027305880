#![allow(dead_code)]

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{
    Rng,
    SeedableRng,
};
use varpopdb::data_structs::typedef::GenomeId;
use varpopdb::prelude::*;

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

pub const GENES: [&str; 6] = [
    "PF3D7_0102200",
    "PF3D7_0304600",
    "PF3D7_0417200",
    "PF3D7_0709000",
    "PF3D7_1133400",
    "PF3D7_1343700",
];

fn random_base<R: Rng>(
    rng: &mut R,
    other_than: Option<u8>,
) -> u8 {
    loop {
        let base = BASES[rng.gen_range(0..BASES.len())];
        if Some(base) != other_than {
            return base;
        }
    }
}

fn random_alleles<R: Rng>(rng: &mut R) -> (Vec<u8>, Vec<u8>) {
    let anchor = random_base(rng, None);
    match rng.gen_range(0..10) {
        // Insertion.
        0 => {
            let inserted = (0..rng.gen_range(1..4)).map(|_| random_base(rng, None));
            (vec![anchor], std::iter::once(anchor).chain(inserted).collect())
        },
        // Deletion.
        1 => {
            let deleted = (0..rng.gen_range(1..4)).map(|_| random_base(rng, None));
            (std::iter::once(anchor).chain(deleted).collect(), vec![anchor])
        },
        _ => (vec![anchor], vec![random_base(rng, Some(anchor))]),
    }
}

/// Builds a reproducible random population.
pub struct DemoPopulationBuilder {
    genomes:       usize,
    contigs:       usize,
    contig_length: u64,
    max_variants:  usize,
    seed:          u64,
}

impl Default for DemoPopulationBuilder {
    fn default() -> Self {
        Self {
            genomes:       20,
            contigs:       3,
            contig_length: 10_000,
            max_variants:  40,
            seed:          42,
        }
    }
}

impl DemoPopulationBuilder {
    pub fn with_genomes(
        mut self,
        genomes: usize,
    ) -> Self {
        self.genomes = genomes;
        self
    }

    pub fn with_seed(
        mut self,
        seed: u64,
    ) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(&self) -> PopulationDB {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut population = PopulationDB::new("demo", DataSource::Pf7);
        for g in 0..self.genomes {
            let genome_id = GenomeId::from(format!("PA{:04}-C", g));
            let n_variants = rng.gen_range(1..=self.max_variants);
            for _ in 0..n_variants {
                let contig = format!("Pf3D7_{:02}_v3", rng.gen_range(1..=self.contigs));
                let offset = rng.gen_range(0..self.contig_length);
                let (reference, alternate) = random_alleles(&mut rng);

                let gene = GENES[rng.gen_range(0..GENES.len())];
                let info = InfoData::new()
                    .with_field("GENE", InfoValue::String(gene.into()))
                    .with_field("AF", InfoValue::Float(rng.gen_range(0.0..1.0)));
                let depth = rng.gen_range(0..100);
                let evidence = VariantEvidence::new()
                    .with_pass(rng.gen_bool(0.8))
                    .with_quality(rng.gen_bool(0.9).then(|| rng.gen_range(0.0..100.0)))
                    .with_total_depth(Some(depth))
                    .with_info(Some(Arc::new(info)));
                let phase = if rng.gen_bool(0.5) { Phase::A } else { Phase::B };

                let mut variant = Variant::new(contig.as_str(), offset, phase, &reference, &alternate)
                    .expect("generated alleles are valid")
                    .with_evidence(evidence.clone());
                if rng.gen_bool(0.3) {
                    variant = variant.with_identifier(format!("rs{}", rng.gen_range(0..1_000_000)));
                }
                population.add_variant(&genome_id, Arc::new(variant));

                // Some sites get the same call on the other homologue.
                if rng.gen_bool(0.15) {
                    let other = if phase == Phase::A { Phase::B } else { Phase::A };
                    let mate = Variant::new(contig.as_str(), offset, other, reference, alternate)
                        .expect("generated alleles are valid")
                        .with_evidence(evidence);
                    population.add_variant(&genome_id, Arc::new(mate));
                }
            }
        }
        population
    }
}

/// Every (genome, call address) pair of a population in traversal order.
pub fn call_addresses(population: &PopulationDB) -> Vec<(GenomeId, usize)> {
    let mut calls = Vec::new();
    population.process_all(&mut |genome_id: &GenomeId, variant: &Arc<Variant>| {
        calls.push((genome_id.clone(), Arc::as_ptr(variant) as usize));
        true
    });
    calls
}
