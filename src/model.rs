//! Item-item similarity model construction.
//!
//! The builder consumes one batch snapshot of rating observations and
//! produces an immutable [`ItemItemModel`]: per-item mean ratings plus a
//! sparse item-to-item cosine similarity matrix over mean-centered rating
//! vectors. The model is built once and then queried read-only by
//! arbitrarily many concurrent scoring calls.
//!
//! # Algorithm
//!
//! 1. Group observations by item into per-item user -> rating vectors
//! 2. Compute each item's mean rating (optionally Bayesian-damped)
//! 3. Mean-center each item vector in place
//! 4. For every ordered pair of distinct items, compute cosine similarity
//!    over the intersection of raters; keep only strictly positive values
//!
//! # Examples
//!
//! ```
//! use vecino::data::Rating;
//! use vecino::model::ItemItemModelBuilder;
//!
//! let ratings = vec![
//!     Rating::new(1, 10, 4.0),
//!     Rating::new(1, 20, 3.0),
//!     Rating::new(2, 10, 2.0),
//!     Rating::new(2, 20, 5.0),
//!     Rating::new(3, 10, 5.0),
//!     Rating::new(3, 20, 1.0),
//! ];
//!
//! let model = ItemItemModelBuilder::new().fit(&ratings).unwrap();
//! assert_eq!(model.n_items(), 2);
//! assert!((model.item_mean(10).unwrap() - 11.0 / 3.0).abs() < 1e-12);
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::Rating;
use crate::error::{Result, VecinoError};

/// Immutable item-item similarity model.
///
/// Holds the item mean table and, per item, a sparse map of neighbor item
/// to similarity score. Invariants:
///
/// - Only items with at least one observation appear in either table.
/// - No self-pair is ever stored.
/// - Only strictly positive similarities are retained; nonpositive or
///   undefined (zero-norm) pairs are dropped, not stored as zero.
/// - Storage is asymmetric: both directions of a pair are computed
///   independently and never deduplicated.
///
/// The model never changes after [`ItemItemModelBuilder::fit`] returns, so
/// sharing it across threads for concurrent scoring needs no locking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemItemModel {
    item_means: BTreeMap<u64, f64>,
    neighbors: BTreeMap<u64, BTreeMap<u64, f64>>,
}

impl ItemItemModel {
    /// The mean rating of an item, if the item was observed at fit time.
    #[must_use]
    pub fn item_mean(&self, item: u64) -> Option<f64> {
        self.item_means.get(&item).copied()
    }

    /// The full item mean table.
    #[must_use]
    pub fn item_means(&self) -> &BTreeMap<u64, f64> {
        &self.item_means
    }

    /// An item's neighbor map (neighbor item -> similarity), if any
    /// strictly positive similarity was found for it.
    #[must_use]
    pub fn neighbors(&self, item: u64) -> Option<&BTreeMap<u64, f64>> {
        self.neighbors.get(&item)
    }

    /// Number of distinct items observed at fit time.
    #[must_use]
    pub fn n_items(&self) -> usize {
        self.item_means.len()
    }

    /// Whether the model was fit on an empty batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.item_means.is_empty()
    }

    /// Save the model as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(self)
            .map_err(|e| VecinoError::Serialization(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a model previously written by [`ItemItemModel::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid model.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| VecinoError::Serialization(e.to_string()))
    }
}

/// Builder for [`ItemItemModel`].
///
/// # Parameters
///
/// - `damping`: Bayesian mean damping factor, the number of fake
///   global-mean ratings assumed per item. `0.0` (the default) yields the
///   plain arithmetic mean.
///
/// # Examples
///
/// ```
/// use vecino::data::Rating;
/// use vecino::model::ItemItemModelBuilder;
///
/// let ratings = vec![Rating::new(1, 10, 4.0), Rating::new(2, 10, 2.0)];
/// let model = ItemItemModelBuilder::new()
///     .with_damping(5.0)
///     .fit(&ratings)
///     .unwrap();
/// // Damped toward the global mean of 3.0: (6 + 5*3) / (2 + 5)
/// assert!((model.item_mean(10).unwrap() - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct ItemItemModelBuilder {
    damping: f64,
}

impl Default for ItemItemModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemItemModelBuilder {
    /// Create a builder with default parameters (no damping).
    #[must_use]
    pub fn new() -> Self {
        Self { damping: 0.0 }
    }

    /// Set the Bayesian mean damping factor.
    ///
    /// Interpreted as the number of fake global-mean ratings assumed per
    /// item; must be nonnegative.
    #[must_use]
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Fit an [`ItemItemModel`] on a batch of rating observations.
    ///
    /// When a user rated the same item more than once, the last observation
    /// in batch order wins. An empty batch produces an empty model.
    ///
    /// # Errors
    ///
    /// Returns [`VecinoError::InvalidHyperparameter`] if the damping factor
    /// is negative or not finite.
    pub fn fit(&self, ratings: &[Rating]) -> Result<ItemItemModel> {
        if !self.damping.is_finite() || self.damping < 0.0 {
            return Err(VecinoError::InvalidHyperparameter {
                param: "damping".to_string(),
                value: format!("{}", self.damping),
                constraint: "finite and >= 0".to_string(),
            });
        }

        // Group observations by item into user -> value vectors.
        let mut item_vectors: BTreeMap<u64, BTreeMap<u64, f64>> = BTreeMap::new();
        for r in ratings {
            item_vectors.entry(r.item).or_default().insert(r.user, r.value);
        }

        let item_means = self.compute_means(&item_vectors);

        // Mean-center each item vector in place.
        for (item, vector) in &mut item_vectors {
            let mean = item_means[item];
            for value in vector.values_mut() {
                *value -= mean;
            }
        }

        // Euclidean norm over each item's full centered vector. An item
        // with a single rating centers to zero and gets norm 0, which
        // suppresses every pair involving it.
        let norms: BTreeMap<u64, f64> = item_vectors
            .iter()
            .map(|(&item, vector)| (item, euclidean_norm(vector)))
            .collect();

        let neighbors = similarity_matrix(&item_vectors, &norms);

        Ok(ItemItemModel {
            item_means,
            neighbors,
        })
    }

    fn compute_means(&self, item_vectors: &BTreeMap<u64, BTreeMap<u64, f64>>) -> BTreeMap<u64, f64> {
        let mut global_sum = 0.0;
        let mut global_count = 0usize;
        for vector in item_vectors.values() {
            global_sum += vector.values().sum::<f64>();
            global_count += vector.len();
        }

        let global_mean = if global_count > 0 {
            global_sum / global_count as f64
        } else {
            0.0
        };

        item_vectors
            .iter()
            .map(|(&item, vector)| {
                let sum: f64 = vector.values().sum();
                let count = vector.len() as f64;
                let mean = (sum + self.damping * global_mean) / (count + self.damping);
                (item, mean)
            })
            .collect()
    }
}

/// Dot product of two sparse vectors over the intersection of their keys.
///
/// Iterates the smaller vector and probes the larger, so the cost is
/// proportional to the smaller rater set.
fn sparse_dot(a: &BTreeMap<u64, f64>, b: &BTreeMap<u64, f64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut dot = 0.0;
    for (key, &va) in small {
        if let Some(&vb) = large.get(key) {
            dot += va * vb;
        }
    }
    dot
}

/// Euclidean norm of a sparse vector over all of its entries.
fn euclidean_norm(v: &BTreeMap<u64, f64>) -> f64 {
    v.values().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine similarities from one row item to every other item.
///
/// Nonpositive dot products are skipped before the norms are even
/// consulted, so zero-norm items can never feed a division by zero.
fn similarity_row(
    row: u64,
    row_vector: &BTreeMap<u64, f64>,
    row_norm: f64,
    item_vectors: &BTreeMap<u64, BTreeMap<u64, f64>>,
    norms: &BTreeMap<u64, f64>,
) -> BTreeMap<u64, f64> {
    let mut similarities = BTreeMap::new();
    for (&other, other_vector) in item_vectors {
        if other == row {
            continue;
        }
        let dot = sparse_dot(row_vector, other_vector);
        if dot <= 0.0 {
            continue;
        }
        let denom = row_norm * norms[&other];
        if denom <= 0.0 {
            continue;
        }
        similarities.insert(other, dot / denom);
    }
    similarities
}

#[cfg(not(feature = "parallel"))]
fn similarity_matrix(
    item_vectors: &BTreeMap<u64, BTreeMap<u64, f64>>,
    norms: &BTreeMap<u64, f64>,
) -> BTreeMap<u64, BTreeMap<u64, f64>> {
    let mut matrix = BTreeMap::new();
    for (&row, row_vector) in item_vectors {
        let similarities = similarity_row(row, row_vector, norms[&row], item_vectors, norms);
        if !similarities.is_empty() {
            matrix.insert(row, similarities);
        }
    }
    matrix
}

/// Parallel variant: partitions the outer loop by row item. Each row's
/// output keys are disjoint, so the merge needs no synchronization and the
/// result is bit-identical to the serial path.
#[cfg(feature = "parallel")]
fn similarity_matrix(
    item_vectors: &BTreeMap<u64, BTreeMap<u64, f64>>,
    norms: &BTreeMap<u64, f64>,
) -> BTreeMap<u64, BTreeMap<u64, f64>> {
    item_vectors
        .par_iter()
        .map(|(&row, row_vector)| {
            let similarities = similarity_row(row, row_vector, norms[&row], item_vectors, norms);
            (row, similarities)
        })
        .filter(|(_, similarities)| !similarities.is_empty())
        .collect()
}
