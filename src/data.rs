//! Rating observations and the data-access seam.
//!
//! The engine never fetches or persists raw observations itself: callers
//! hand a batch of [`Rating`]s to the model builder, and scoring pulls one
//! user's history on demand through the [`RatingSource`] trait. Any store
//! (database, file, in-memory fixture) can sit behind that trait.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VecinoError};

/// A single immutable rating observation: one user's rating of one item.
///
/// # Examples
///
/// ```
/// use vecino::data::Rating;
///
/// let r = Rating::new(1, 100, 4.5);
/// assert_eq!(r.user, 1);
/// assert_eq!(r.item, 100);
/// assert_eq!(r.value, 4.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// User identifier
    pub user: u64,
    /// Item identifier
    pub item: u64,
    /// Observed rating value
    pub value: f64,
}

impl Rating {
    /// Create a new rating observation.
    #[must_use]
    pub fn new(user: u64, item: u64, value: f64) -> Self {
        Self { user, item, value }
    }

    /// Build a batch of ratings from parallel slices.
    ///
    /// All three slices must have the same length; a mismatch is rejected
    /// before any observation is constructed.
    ///
    /// # Errors
    ///
    /// Returns [`VecinoError::LengthMismatch`] if the slices differ in length.
    ///
    /// # Examples
    ///
    /// ```
    /// use vecino::data::Rating;
    ///
    /// let ratings = Rating::from_parallel(&[1, 2], &[10, 10], &[3.0, 5.0]).unwrap();
    /// assert_eq!(ratings.len(), 2);
    ///
    /// assert!(Rating::from_parallel(&[1, 2], &[10], &[3.0, 5.0]).is_err());
    /// ```
    pub fn from_parallel(users: &[u64], items: &[u64], values: &[f64]) -> Result<Vec<Rating>> {
        if items.len() != users.len() {
            return Err(VecinoError::length_mismatch(users.len(), items.len()));
        }
        if values.len() != users.len() {
            return Err(VecinoError::length_mismatch(users.len(), values.len()));
        }
        Ok(users
            .iter()
            .zip(items.iter())
            .zip(values.iter())
            .map(|((&user, &item), &value)| Rating::new(user, item, value))
            .collect())
    }
}

/// Supplier of rating data: the external data collaborator.
///
/// Model construction consumes a bulk batch of observations; scoring needs
/// one user's history fetched fresh per call. Implementations make no
/// ordering guarantee over the bulk batch.
pub trait RatingSource {
    /// All rating observations, as one batch snapshot.
    fn all_ratings(&self) -> Vec<Rating>;

    /// One user's rating history as an item -> value map.
    ///
    /// A user with no history yields an empty map, never an error. When a
    /// user rated the same item more than once, the last observation in
    /// batch order wins.
    fn user_ratings(&self, user: u64) -> BTreeMap<u64, f64>;
}

/// In-memory [`RatingSource`] backed by a plain vector of observations.
///
/// Useful for tests and for callers that already hold all ratings in memory.
///
/// # Examples
///
/// ```
/// use vecino::data::{MemoryRatingSource, Rating, RatingSource};
///
/// let source = MemoryRatingSource::new(vec![
///     Rating::new(1, 100, 4.0),
///     Rating::new(1, 200, 2.0),
///     Rating::new(2, 100, 5.0),
/// ]);
///
/// let history = source.user_ratings(1);
/// assert_eq!(history.len(), 2);
/// assert_eq!(history[&100], 4.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRatingSource {
    ratings: Vec<Rating>,
}

impl MemoryRatingSource {
    /// Create a source over a batch of observations.
    #[must_use]
    pub fn new(ratings: Vec<Rating>) -> Self {
        Self { ratings }
    }

    /// Number of observations held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    /// Whether the source holds no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

impl RatingSource for MemoryRatingSource {
    fn all_ratings(&self) -> Vec<Rating> {
        self.ratings.clone()
    }

    fn user_ratings(&self, user: u64) -> BTreeMap<u64, f64> {
        let mut vector = BTreeMap::new();
        for r in &self.ratings {
            if r.user == user {
                vector.insert(r.item, r.value);
            }
        }
        vector
    }
}
