//! SMOTE (Synthetic Minority Over-sampling Technique).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::rngs::StdRng;
use rand::Rng;

use super::{class_indices, deficits, Oversampler, Resampled, SamplingError};

pub(crate) const DEFAULT_K_NEIGHBORS: usize = 5;

/// Ordered float for BinaryHeap-based partial sort
#[derive(Debug, Clone, Copy)]
struct DistIdx(f64, usize);

impl PartialEq for DistIdx {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for DistIdx {}
impl PartialOrd for DistIdx {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DistIdx {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0).then(self.1.cmp(&other.1))
    }
}

/// SMOTE sampler.
///
/// For every synthetic row: pick a random sample of the class, pick one of its `k` nearest
/// same-class neighbours, and place the new point at a random position on the segment between
/// them. `k` is capped at `class size - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Smote {
    k_neighbors: usize,
}

impl Smote {
    /// SMOTE with the default 5 neighbours.
    pub fn new() -> Self {
        Self {
            k_neighbors: DEFAULT_K_NEIGHBORS,
        }
    }

    /// Set number of neighbors (at least 1).
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k.max(1);
        self
    }

    /// Configured neighbour count.
    pub fn k_neighbors(&self) -> usize {
        self.k_neighbors
    }
}

impl Default for Smote {
    fn default() -> Self {
        Self::new()
    }
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(ai, bi)| (ai - bi).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// The `k` nearest members of `candidates` to `candidates[of]`, nearest first.
///
/// The point itself is excluded by position, so exact duplicates still count as neighbours.
fn nearest(of: usize, candidates: &[&[f64]], k: usize) -> Vec<usize> {
    let point = candidates[of];
    let mut heap: BinaryHeap<DistIdx> = BinaryHeap::with_capacity(k + 1);
    for (i, c) in candidates.iter().enumerate() {
        if i == of {
            continue;
        }
        let d = DistIdx(distance(point, c), i);
        if heap.len() < k {
            heap.push(d);
        } else if heap.peek().is_some_and(|max| d < *max) {
            heap.pop();
            heap.push(d);
        }
    }
    heap.into_sorted_vec().into_iter().map(|DistIdx(_, i)| i).collect()
}

impl Oversampler for Smote {
    fn resample(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        rng: &mut StdRng,
    ) -> Result<Resampled, SamplingError> {
        let indices = class_indices(labels);
        let needed = deficits(&indices)?;

        let mut out_x = features.to_vec();
        let mut out_y = labels.to_vec();
        let mut n_synthetic = vec![0; indices.len()];

        for (class, rows) in indices.iter().enumerate() {
            let n_to_generate = needed[class];
            if n_to_generate == 0 || rows.is_empty() {
                continue;
            }
            if rows.len() < 2 {
                return Err(SamplingError::TooFewSamples {
                    class,
                    count: rows.len(),
                    required: 2,
                });
            }

            let samples: Vec<&[f64]> = rows.iter().map(|&r| features[r].as_slice()).collect();
            let k = self.k_neighbors.min(samples.len() - 1);
            let neighbours: Vec<Vec<usize>> =
                (0..samples.len()).map(|i| nearest(i, &samples, k)).collect();

            for _ in 0..n_to_generate {
                let i = rng.gen_range(0..samples.len());
                let nn = neighbours[i][rng.gen_range(0..neighbours[i].len())];
                let gap: f64 = rng.gen_range(0.0..1.0);
                let point = samples[i];
                let other = samples[nn];
                out_x.push(
                    point
                        .iter()
                        .zip(other)
                        .map(|(&p, &n)| p + gap * (n - p))
                        .collect(),
                );
                out_y.push(class);
            }
            n_synthetic[class] = n_to_generate;
        }

        Ok(Resampled {
            features: out_x,
            labels: out_y,
            n_synthetic,
        })
    }
}
