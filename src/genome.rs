use crate::config::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Round to the two-decimal precision genes and energy are kept at
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// The evolvable traits a creature carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gene {
    Size,
    Speed,
    Appetite,
}

impl Gene {
    pub const ALL: [Gene; 3] = [Gene::Size, Gene::Speed, Gene::Appetite];

    /// Inclusive valid range of this gene
    pub fn range(self) -> (f32, f32) {
        match self {
            Gene::Size => SIZE_RANGE,
            Gene::Speed => SPEED_RANGE,
            Gene::Appetite => APPETITE_RANGE,
        }
    }

    pub fn clamp(self, value: f32) -> f32 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gene::Size => write!(f, "size"),
            Gene::Speed => write!(f, "speed"),
            Gene::Appetite => write!(f, "appetite"),
        }
    }
}

/// Per-gene mutation settings, both in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationParams {
    pub rate: f32,
    pub strength: f32,
}

impl MutationParams {
    pub fn new(rate: f32, strength: f32) -> Self {
        Self {
            rate: rate.clamp(0.0, 100.0),
            strength: strength.clamp(0.0, 100.0),
        }
    }
}

/// The heritable traits of a creature.
///
/// Larger size means more energy storage and a bigger body, but a slower
/// top speed and a higher drain. Appetite biases the creature between
/// foraging (low appetite) and mating (high appetite).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub size: f32,
    pub speed: f32,
    pub appetite: f32,
}

impl Default for Genome {
    fn default() -> Self {
        Self {
            size: DEFAULT_GENE_VALUE,
            speed: DEFAULT_GENE_VALUE,
            appetite: DEFAULT_GENE_VALUE,
        }
    }
}

impl Genome {
    /// Build a genome, rounding and clamping each gene into its range
    pub fn new(size: f32, speed: f32, appetite: f32) -> Self {
        Self {
            size: Gene::Size.clamp(round2(size)),
            speed: Gene::Speed.clamp(round2(speed)),
            appetite: Gene::Appetite.clamp(round2(appetite)),
        }
    }

    pub fn get(&self, gene: Gene) -> f32 {
        match gene {
            Gene::Size => self.size,
            Gene::Speed => self.speed,
            Gene::Appetite => self.appetite,
        }
    }

    fn slot(&mut self, gene: Gene) -> &mut f32 {
        match gene {
            Gene::Size => &mut self.size,
            Gene::Speed => &mut self.speed,
            Gene::Appetite => &mut self.appetite,
        }
    }

    /// Child genome where each gene is the mean of both parents
    pub fn crossover(&self, other: &Genome) -> Genome {
        Genome {
            size: round2((self.size + other.size) / 2.0),
            speed: round2((self.speed + other.speed) / 2.0),
            appetite: round2((self.appetite + other.appetite) / 2.0),
        }
    }

    /// Mutate each gene independently.
    /// Returns true if at least one gene was hit.
    pub fn mutate<R: Rng + ?Sized>(&mut self, params: MutationParams, rng: &mut R) -> bool {
        let mut mutated = false;
        for gene in Gene::ALL {
            mutated |= self.mutate_gene(gene, params, rng);
        }
        mutated
    }

    /// Roll for a single gene. A hit scales the gene by a factor drawn from
    /// `1 ± strength%`, then rounds and clamps it.
    pub fn mutate_gene<R: Rng + ?Sized>(
        &mut self,
        gene: Gene,
        params: MutationParams,
        rng: &mut R,
    ) -> bool {
        let should_mutate = rng.gen_range(0.0..100.0) < params.rate;
        if !should_mutate {
            return false;
        }

        let spread = params.strength / 100.0;
        let factor = rng.gen_range((1.0 - spread)..=(1.0 + spread));
        let value = self.slot(gene);
        *value = gene.clamp(round2(*value * factor));
        true
    }

    /// True when every gene lies in its valid range
    pub fn is_valid(&self) -> bool {
        Gene::ALL.iter().all(|&gene| {
            let (min, max) = gene.range();
            let value = self.get(gene);
            (min..=max).contains(&value)
        })
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size {:.2} | speed {:.2} | appetite {:.2}",
            self.size, self.speed, self.appetite
        )
    }
}
