//! Isolation forest over a single numeric feature.
//!
//! Follows Liu, Ting & Zhou (2008): random axis splits on subsamples, an
//! anomaly score of `2^(-E[h(x)] / c(psi))`, and an outlier threshold taken
//! from the training score distribution at the contamination percentile.

use crate::anomaly::OutlierDetector;
use crate::config::AnomalyConfig;
use crate::constants::anomaly::{EULER_GAMMA, MAX_CONTAMINATION};
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Parameters for fitting an isolation forest.
#[derive(Debug, Clone, PartialEq)]
pub struct IsolationForestParams {
    /// Number of trees.
    pub trees: usize,
    /// Maximum subsample size per tree.
    pub max_samples: usize,
    /// Expected fraction of outliers in the training data.
    pub contamination: f64,
    /// Seed for subsampling and split selection.
    pub seed: u64,
}

impl From<&AnomalyConfig> for IsolationForestParams {
    fn from(config: &AnomalyConfig) -> Self {
        Self {
            trees: config.trees,
            max_samples: config.max_samples,
            contamination: config.contamination,
            seed: config.seed,
        }
    }
}

impl Default for IsolationForestParams {
    fn default() -> Self {
        Self::from(&AnomalyConfig::default())
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf { size: usize },
    Split { threshold: f64, left: usize, right: usize },
}

/// One isolation tree stored as an arena of nodes; index 0 is the root.
#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow(sample: &mut [f64], max_depth: usize, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.build(sample, 0, max_depth, rng);
        tree
    }

    fn build(
        &mut self,
        values: &mut [f64],
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: values.len() });

        if depth >= max_depth || values.len() <= 1 {
            return id;
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if max <= min {
            return id;
        }

        let threshold = rng.gen_range(min..max);
        let split = partition(values, threshold);
        let (lower, upper) = values.split_at_mut(split);

        let left = self.build(lower, depth + 1, max_depth, rng);
        let right = self.build(upper, depth + 1, max_depth, rng);
        self.nodes[id] = Node::Split {
            threshold,
            left,
            right,
        };
        id
    }

    fn path_length(&self, value: f64) -> f64 {
        let mut id = 0;
        let mut depth = 0.0;
        loop {
            match self.nodes[id] {
                Node::Leaf { size } => return depth + average_path_length(size),
                Node::Split {
                    threshold,
                    left,
                    right,
                } => {
                    id = if value <= threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Move values `<= threshold` to the front; returns the count moved.
fn partition(values: &mut [f64], threshold: f64) -> usize {
    let mut split = 0;
    for i in 0..values.len() {
        if values[i] <= threshold {
            values.swap(i, split);
            split += 1;
        }
    }
    split
}

/// Average path length of an unsuccessful BST search over `n` points.
#[allow(clippy::cast_precision_loss)]
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolated percentile of sorted data, `q` in `[0, 100]`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// A fitted isolation forest.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    normaliser: f64,
    offset: f64,
    sample_size: usize,
}

impl IsolationForest {
    /// Fit on the full feature column.
    pub fn fit(values: &[f64], params: &IsolationForestParams) -> Result<Self> {
        validate(values, params)?;

        let sample_size = params.max_samples.min(values.len());
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;

        let mut seeder = StdRng::seed_from_u64(params.seed);
        let mut buffer = vec![0.0; sample_size];
        let trees = (0..params.trees)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(seeder.r#gen::<u64>());
                let picked = rand::seq::index::sample(&mut rng, values.len(), sample_size);
                for (slot, idx) in buffer.iter_mut().zip(picked.iter()) {
                    *slot = values[idx];
                }
                IsolationTree::grow(&mut buffer, max_depth, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            normaliser: average_path_length(sample_size),
            offset: 0.0,
            sample_size,
        };

        let mut negated: Vec<f64> = values.iter().map(|&v| -forest.score(v)).collect();
        negated.sort_by(f64::total_cmp);
        forest.offset = percentile(&negated, 100.0 * params.contamination);

        debug!(
            "Fitted isolation forest: {} trees, {} samples/tree, depth <= {}, offset {:.6}",
            forest.trees.len(),
            sample_size,
            max_depth,
            forest.offset
        );

        Ok(forest)
    }

    /// Mean path length over all trees.
    #[allow(clippy::cast_precision_loss)]
    fn mean_path_length(&self, value: f64) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.path_length(value)).sum();
        total / self.trees.len() as f64
    }

    /// Signed distance to the outlier boundary; negative means outlier.
    pub fn decision_function(&self, value: f64) -> f64 {
        -self.score(value) - self.offset
    }

    /// Threshold on the negated score below which values are outliers.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Subsample size each tree was grown on.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }
}

impl OutlierDetector for IsolationForest {
    fn score(&self, value: f64) -> f64 {
        if self.normaliser > 0.0 {
            (-self.mean_path_length(value) / self.normaliser).exp2()
        } else {
            1.0
        }
    }

    fn is_outlier(&self, value: f64) -> bool {
        self.decision_function(value) < 0.0
    }
}

fn validate(values: &[f64], params: &IsolationForestParams) -> Result<()> {
    let invalid = |reason: String| Error::InvalidModelParameters { reason };

    if values.is_empty() {
        return Err(invalid("cannot fit on an empty column".to_string()));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(invalid(format!("feature column contains {bad}")));
    }
    if !(params.contamination > 0.0 && params.contamination <= MAX_CONTAMINATION) {
        return Err(invalid(format!(
            "contamination must be in (0, {MAX_CONTAMINATION}], got {}",
            params.contamination
        )));
    }
    if params.trees == 0 {
        return Err(invalid("trees must be at least 1".to_string()));
    }
    if params.max_samples == 0 {
        return Err(invalid("max_samples must be at least 1".to_string()));
    }
    Ok(())
}
