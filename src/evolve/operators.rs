//! Selection, recombination, and mutation.
//!
//! Every operator draws from the caller's RNG in a fixed order so a run is
//! reproducible from its seed.

use rand::Rng;

use super::{Individual, GENE_MAX, GENE_MIN};

/// Uniform genome in `[low, high]`.
pub fn random_genome<R: Rng + ?Sized>(rng: &mut R, len: usize, low: f64, high: f64) -> Vec<f64> {
    (0..len).map(|_| rng.gen_range(low..=high)).collect()
}

/// Tournament selection with replacement.
///
/// Draws `size` individuals uniformly and keeps the fittest. Ties keep the
/// earliest draw.
pub fn tournament<'p, R: Rng + ?Sized>(
    population: &'p [Individual],
    size: usize,
    rng: &mut R,
) -> &'p Individual {
    let n = population.len();
    let mut best = &population[rng.gen_range(0..n)];
    for _ in 1..size {
        let candidate = &population[rng.gen_range(0..n)];
        if candidate.fitness > best.fitness {
            best = candidate;
        }
    }
    best
}

/// Rate-gated uniform crossover.
///
/// One coin decides whether the pair recombines at all; if it does, each
/// gene is swapped between the children with probability 0.5. Children
/// are fresh copies and start unevaluated.
pub fn crossover<R: Rng + ?Sized>(
    a: &Individual,
    b: &Individual,
    rate: f64,
    rng: &mut R,
) -> (Individual, Individual) {
    let mut first = a.genome.clone();
    let mut second = b.genome.clone();
    if rng.gen::<f64>() < rate {
        for (x, y) in first.iter_mut().zip(second.iter_mut()) {
            if rng.gen::<f64>() < 0.5 {
                std::mem::swap(x, y);
            }
        }
    }
    (Individual::new(first), Individual::new(second))
}

/// Per-gene mutation with uniform noise in `[-strength, strength]`.
///
/// Historically called Gaussian mutation; the noise is uniform. Mutated
/// genes are clamped into `[GENE_MIN, GENE_MAX]`; untouched genes are not.
pub fn mutate<R: Rng + ?Sized>(genome: &mut [f64], rate: f64, strength: f64, rng: &mut R) {
    for gene in genome.iter_mut() {
        if rng.gen::<f64>() < rate {
            let noise = rng.gen_range(-strength..=strength);
            *gene = (*gene + noise).clamp(GENE_MIN, GENE_MAX);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scored(genome: Vec<f64>, fitness: f64) -> Individual {
        Individual { genome, fitness }
    }

    #[test]
    fn random_genome_in_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let g = random_genome(&mut rng, 500, -1.0, 1.0);
        assert_eq!(g.len(), 500);
        assert!(g.iter().all(|x| (-1.0..=1.0).contains(x)));
    }

    #[test]
    fn tournament_of_one_is_a_uniform_draw() {
        let pop: Vec<Individual> = (0..4).map(|i| scored(vec![i as f64], i as f64)).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let w = tournament(&pop, 1, &mut rng);
            seen[w.genome[0] as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "every individual should win sometimes");
    }

    #[test]
    fn large_tournament_finds_the_best() {
        let pop: Vec<Individual> = (0..5).map(|i| scored(vec![i as f64], i as f64 / 10.0)).collect();
        let mut rng = StdRng::seed_from_u64(9);
        let w = tournament(&pop, 200, &mut rng);
        assert_eq!(w.fitness, 0.4);
    }

    #[test]
    fn tournament_ties_keep_first_draw() {
        // All equal fitness: the winner must be the first draw, which we
        // reproduce by replaying the same RNG.
        let pop: Vec<Individual> = (0..6).map(|i| scored(vec![i as f64], 0.5)).collect();
        let mut rng = StdRng::seed_from_u64(21);
        let mut replay = StdRng::seed_from_u64(21);
        let w = tournament(&pop, 4, &mut rng);
        let first = replay.gen_range(0..pop.len());
        assert_eq!(w.genome[0], first as f64);
    }

    #[test]
    fn zero_rate_crossover_copies_parents() {
        let a = scored(vec![1.0; 50], 0.9);
        let b = scored(vec![-1.0; 50], 0.1);
        let mut rng = StdRng::seed_from_u64(4);
        let (c1, c2) = crossover(&a, &b, 0.0, &mut rng);
        assert_eq!(c1.genome, a.genome);
        assert_eq!(c2.genome, b.genome);
        assert!(!c1.is_evaluated() && !c2.is_evaluated());
    }

    #[test]
    fn full_rate_crossover_mixes_and_conserves_genes() {
        let a = scored(vec![1.0; 100], 0.0);
        let b = scored(vec![-1.0; 100], 0.0);
        let mut rng = StdRng::seed_from_u64(42);
        let (c1, c2) = crossover(&a, &b, 1.0, &mut rng);
        let pos = c1.genome.iter().filter(|&&x| x > 0.0).count();
        assert!(pos > 0 && pos < 100, "crossover should mix parents");
        for i in 0..100 {
            assert_eq!(c1.genome[i] + c2.genome[i], 0.0, "gene {} not swapped pairwise", i);
        }
    }

    #[test]
    fn zero_rate_mutation_is_identity() {
        let mut g = vec![0.25; 64];
        mutate(&mut g, 0.0, 1.0, &mut StdRng::seed_from_u64(2));
        assert!(g.iter().all(|&x| x == 0.25));
    }

    #[test]
    fn mutation_noise_is_bounded_by_strength() {
        let mut g = vec![0.0; 1000];
        mutate(&mut g, 1.0, 0.3, &mut StdRng::seed_from_u64(8));
        assert!(g.iter().all(|&x| x.abs() <= 0.3));
        let changed = g.iter().filter(|&&x| x != 0.0).count();
        assert!(changed > 900);
    }

    #[test]
    fn mutation_clamps_to_gene_range() {
        let mut g = vec![4.9; 200];
        mutate(&mut g, 1.0, 3.0, &mut StdRng::seed_from_u64(13));
        assert!(g.iter().all(|&x| (GENE_MIN..=GENE_MAX).contains(&x)));
        assert!(g.iter().any(|&x| x == GENE_MAX));
    }

    #[test]
    fn mutation_leaves_untouched_genes_unclamped() {
        let mut g = vec![7.0; 10];
        mutate(&mut g, 0.0, 1.0, &mut StdRng::seed_from_u64(0));
        assert!(g.iter().all(|&x| x == 7.0));
    }
}
