//! Neighborhood-based rating prediction.
//!
//! The scorer is stateless: each call reads an immutable [`ItemItemModel`]
//! plus one user's request-scoped rating vector, and predicts a score per
//! candidate item as the item's mean plus a similarity-weighted average of
//! the user's mean-centered ratings over the candidate's most similar
//! overlapping neighbors.
//!
//! Candidates that cannot be scored (no overlapping neighbors, or a zero
//! similarity-magnitude sum) are omitted from the result rather than given
//! a placeholder. Candidates the user has already rated are *not* excluded;
//! that filtering, if wanted, belongs to the caller.
//!
//! # Examples
//!
//! ```
//! use vecino::data::{MemoryRatingSource, Rating};
//! use vecino::model::ItemItemModelBuilder;
//! use vecino::scorer::ItemItemScorer;
//!
//! let ratings = vec![
//!     Rating::new(1, 10, 5.0),
//!     Rating::new(1, 20, 5.0),
//!     Rating::new(2, 10, 1.0),
//!     Rating::new(2, 20, 1.0),
//!     Rating::new(3, 10, 4.0),
//! ];
//! let source = MemoryRatingSource::new(ratings.clone());
//! let model = ItemItemModelBuilder::new().fit(&ratings).unwrap();
//!
//! let scorer = ItemItemScorer::new();
//! let scores = scorer.score_for_user(&model, &source, 3, &[20]).unwrap();
//! assert!(scores.contains_key(&20));
//! ```

use std::collections::BTreeMap;

use crate::data::RatingSource;
use crate::error::{Result, VecinoError};
use crate::model::ItemItemModel;

/// Default neighborhood cap: at most this many of the most similar
/// overlapping neighbors feed each prediction.
pub const DEFAULT_NEIGHBORHOOD_SIZE: usize = 20;

/// Item-item neighborhood scorer.
///
/// # Parameters
///
/// - `neighborhood_size`: cap on the number of neighbors per prediction
///   (default [`DEFAULT_NEIGHBORHOOD_SIZE`]). When more overlapping
///   neighbors exist, the top ones by similarity are kept; ties are broken
///   by lowest item identifier first (ascending-key iteration order under
///   a stable sort), which makes selection fully deterministic.
#[derive(Debug, Clone)]
pub struct ItemItemScorer {
    neighborhood_size: usize,
}

impl Default for ItemItemScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemItemScorer {
    /// Create a scorer with the default neighborhood cap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            neighborhood_size: DEFAULT_NEIGHBORHOOD_SIZE,
        }
    }

    /// Set the neighborhood cap.
    #[must_use]
    pub fn with_neighborhood_size(mut self, neighborhood_size: usize) -> Self {
        self.neighborhood_size = neighborhood_size;
        self
    }

    /// The configured neighborhood cap.
    #[must_use]
    pub fn neighborhood_size(&self) -> usize {
        self.neighborhood_size
    }

    /// Fetch `user`'s history from the data collaborator and score the
    /// candidate items against it.
    ///
    /// A user with no history yields an empty result map (every candidate
    /// fails the overlapping-neighbor requirement), never an error.
    ///
    /// # Errors
    ///
    /// Returns [`VecinoError::UnknownItem`] if any candidate or historical
    /// item is absent from the model's mean table.
    pub fn score_for_user<S: RatingSource>(
        &self,
        model: &ItemItemModel,
        source: &S,
        user: u64,
        candidates: &[u64],
    ) -> Result<BTreeMap<u64, f64>> {
        let history = source.user_ratings(user);
        self.score(model, &history, candidates)
    }

    /// Score candidate items for a user given their raw rating vector
    /// (item -> observed rating).
    ///
    /// The vector is mean-centered against the model's item means, then
    /// each candidate is predicted as
    /// `mean(t) + Σ(sim(t, n) × centered(n)) / Σ|sim(t, n)|` over the
    /// selected neighbor set. Candidates with no scoreable neighborhood are
    /// omitted from the result.
    ///
    /// # Errors
    ///
    /// Returns [`VecinoError::UnknownItem`] if any candidate or historical
    /// item is absent from the model's mean table.
    pub fn score(
        &self,
        model: &ItemItemModel,
        user_ratings: &BTreeMap<u64, f64>,
        candidates: &[u64],
    ) -> Result<BTreeMap<u64, f64>> {
        // Mean-center the user's ratings. A historical item the model has
        // never seen means the model is stale for this request.
        let mut centered = BTreeMap::new();
        for (&item, &value) in user_ratings {
            let mean = model
                .item_mean(item)
                .ok_or(VecinoError::UnknownItem { item })?;
            centered.insert(item, value - mean);
        }

        let mut scores = BTreeMap::new();
        for &target in candidates {
            let target_mean = model
                .item_mean(target)
                .ok_or(VecinoError::UnknownItem { item: target })?;

            let Some(neighbors) = model.neighbors(target) else {
                continue;
            };

            // Overlap of the target's neighbors with the items the user
            // has rated, in ascending item order.
            let mut overlap: Vec<(u64, f64)> = neighbors
                .iter()
                .filter(|(item, _)| centered.contains_key(item))
                .map(|(&item, &sim)| (item, sim))
                .collect();

            if overlap.len() > self.neighborhood_size {
                // Stable sort keeps the ascending-id encounter order for
                // equal similarities.
                overlap.sort_by(|a, b| b.1.total_cmp(&a.1));
                overlap.truncate(self.neighborhood_size);
            }

            let mut numerator = 0.0;
            let mut denominator = 0.0;
            for (item, sim) in &overlap {
                numerator += sim * centered[item];
                denominator += sim.abs();
            }

            if denominator > 0.0 {
                scores.insert(target, target_mean + numerator / denominator);
            }
        }

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MemoryRatingSource, Rating};
    use crate::model::ItemItemModelBuilder;

    /// Four items, three users, chosen so items 10/20/30 correlate
    /// positively and user 3 overlaps several neighborhoods.
    fn fixture() -> Vec<Rating> {
        vec![
            Rating::new(1, 10, 5.0),
            Rating::new(1, 20, 4.0),
            Rating::new(1, 30, 5.0),
            Rating::new(2, 10, 1.0),
            Rating::new(2, 20, 2.0),
            Rating::new(2, 30, 1.0),
            Rating::new(3, 10, 4.0),
            Rating::new(3, 20, 3.0),
            Rating::new(4, 40, 3.0),
            Rating::new(5, 40, 5.0),
        ]
    }

    fn fitted() -> crate::model::ItemItemModel {
        ItemItemModelBuilder::new().fit(&fixture()).expect("valid batch")
    }

    #[test]
    fn test_empty_history_yields_empty_result() {
        let model = fitted();
        let scorer = ItemItemScorer::new();
        let scores = scorer
            .score(&model, &BTreeMap::new(), &[10, 20, 30])
            .expect("empty history is not an error");
        assert!(scores.is_empty());
    }

    #[test]
    fn test_unknown_candidate_is_error() {
        let model = fitted();
        let scorer = ItemItemScorer::new();
        let err = scorer.score(&model, &BTreeMap::new(), &[999]).unwrap_err();
        assert!(matches!(err, VecinoError::UnknownItem { item: 999 }));
    }

    #[test]
    fn test_unknown_historical_item_is_error() {
        let model = fitted();
        let scorer = ItemItemScorer::new();
        let mut history = BTreeMap::new();
        history.insert(999u64, 4.0);
        let err = scorer.score(&model, &history, &[10]).unwrap_err();
        assert!(matches!(err, VecinoError::UnknownItem { item: 999 }));
    }

    #[test]
    fn test_single_neighbor_prediction_is_mean_plus_centered() {
        // User 9 rated only item 10. For a candidate whose only overlapping
        // neighbor is item 10 with similarity s, the prediction collapses to
        // mean(target) + (s * r) / |s| = mean(target) + r.
        let model = fitted();
        let scorer = ItemItemScorer::new();
        let mut history = BTreeMap::new();
        history.insert(10u64, 5.0);
        let scores = scorer.score(&model, &history, &[30]).expect("scoreable");
        let mean_10 = model.item_mean(10).unwrap();
        let mean_30 = model.item_mean(30).unwrap();
        let expected = mean_30 + (5.0 - mean_10);
        assert!((scores[&30] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unscoreable_candidate_omitted() {
        // Item 40 is rated by users with no other items: it has no
        // neighbors at all, so it is silently absent from the result.
        let model = fitted();
        let scorer = ItemItemScorer::new();
        let mut history = BTreeMap::new();
        history.insert(10u64, 5.0);
        let scores = scorer.score(&model, &history, &[30, 40]).expect("scoreable");
        assert!(scores.contains_key(&30));
        assert!(!scores.contains_key(&40));
    }

    #[test]
    fn test_already_rated_candidate_still_scored() {
        let model = fitted();
        let scorer = ItemItemScorer::new();
        let mut history = BTreeMap::new();
        history.insert(10u64, 5.0);
        history.insert(30u64, 4.0);
        let scores = scorer.score(&model, &history, &[30]).expect("scoreable");
        assert!(scores.contains_key(&30));
    }

    #[test]
    fn test_score_for_user_fetches_history() {
        let ratings = fixture();
        let source = MemoryRatingSource::new(ratings);
        let model = fitted();
        let scorer = ItemItemScorer::new();
        // User 3 rated items 10 and 20; item 30 is scoreable from them.
        let via_source = scorer
            .score_for_user(&model, &source, 3, &[30])
            .expect("scoreable");
        let direct = scorer
            .score(&model, &source.user_ratings(3), &[30])
            .expect("scoreable");
        assert_eq!(via_source, direct);
        assert!(via_source.contains_key(&30));
    }

    #[test]
    fn test_score_for_user_unknown_user_empty() {
        let source = MemoryRatingSource::new(fixture());
        let model = fitted();
        let scorer = ItemItemScorer::new();
        let scores = scorer
            .score_for_user(&model, &source, 777, &[10, 20, 30])
            .expect("no history is not an error");
        assert!(scores.is_empty());
    }

    #[test]
    fn test_cap_selects_top_by_similarity() {
        // Many neighbor items, each perfectly correlated with the target
        // through shared raters, then capped to 1: only the most similar
        // neighbor may contribute.
        let mut ratings = Vec::new();
        // Target item 1 and neighbors 2, 3 rated by users 1-3.
        for (user, values) in [(1u64, [5.0, 5.0, 4.0]), (2, [1.0, 1.0, 2.0]), (3, [3.0, 3.0, 5.0])]
        {
            ratings.push(Rating::new(user, 1, values[0]));
            ratings.push(Rating::new(user, 2, values[1]));
            ratings.push(Rating::new(user, 3, values[2]));
        }
        let model = ItemItemModelBuilder::new().fit(&ratings).expect("valid batch");
        let neighbors = model.neighbors(1).expect("has neighbors");
        assert!(neighbors.len() >= 2);

        let mut history = BTreeMap::new();
        history.insert(2u64, 5.0);
        history.insert(3u64, 1.0);

        let capped = ItemItemScorer::new().with_neighborhood_size(1);
        let scores = capped.score(&model, &history, &[1]).expect("scoreable");

        // Item 2 mirrors the target exactly (cosine 1); item 3 does not
        // (cosine < 1). The capped prediction uses item 2 alone.
        let expected = model.item_mean(1).unwrap() + (5.0 - model.item_mean(2).unwrap());
        assert!((scores[&1] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_cap_tie_break_prefers_lowest_item_id() {
        // Items 1, 2, 3 share one rating profile, so every pairwise cosine
        // is exactly 1.0. Capped to a single neighbor, the tie must resolve
        // to the lowest item id: item 2, never item 3.
        let mut ratings = Vec::new();
        for (user, value) in [(1u64, 5.0), (2, 1.0), (3, 3.0)] {
            for item in [1u64, 2, 3] {
                ratings.push(Rating::new(user, item, value));
            }
        }
        let model = ItemItemModelBuilder::new().fit(&ratings).expect("valid batch");
        let neighbors = model.neighbors(1).expect("has neighbors");
        assert_eq!(neighbors[&2].to_bits(), neighbors[&3].to_bits());

        // All items share mean 3. Item 2 centered +2, item 3 centered -2:
        // the two possible picks predict 5.0 and 1.0 respectively.
        let mut history = BTreeMap::new();
        history.insert(2u64, 5.0);
        history.insert(3u64, 1.0);
        let capped = ItemItemScorer::new().with_neighborhood_size(1);
        let scores = capped.score(&model, &history, &[1]).expect("scoreable");
        assert!((scores[&1] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_cap_keeps_twenty_lowest_ids_on_ties() {
        // 25 neighbor items plus target 100, all with the same rating
        // profile: every similarity to the target is exactly 1.0, so the
        // default cap of 20 must keep items 1..=20 (ascending-id encounter
        // order under the stable sort) and drop 21..=25.
        let mut ratings = Vec::new();
        for (user, value) in [(1u64, 5.0), (2, 1.0), (3, 3.0)] {
            for item in (1u64..=25).chain([100]) {
                ratings.push(Rating::new(user, item, value));
            }
        }
        let model = ItemItemModelBuilder::new().fit(&ratings).expect("valid batch");
        assert_eq!(model.neighbors(100).expect("has neighbors").len(), 25);

        // Every item's mean is 3. Items 1..=20 centered +1, items 21..=25
        // centered -2: only the lowest-20 selection predicts 3 + 20/20.
        let mut history = BTreeMap::new();
        for item in 1u64..=20 {
            history.insert(item, 4.0);
        }
        for item in 21u64..=25 {
            history.insert(item, 1.0);
        }
        let scores = ItemItemScorer::new()
            .score(&model, &history, &[100])
            .expect("scoreable");
        assert!((scores[&100] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_cap_no_effect_on_small_neighborhood() {
        let model = fitted();
        let mut history = BTreeMap::new();
        history.insert(10u64, 5.0);
        history.insert(20u64, 4.0);

        let capped = ItemItemScorer::new();
        let uncapped = ItemItemScorer::new().with_neighborhood_size(usize::MAX);
        let a = capped.score(&model, &history, &[30]).expect("scoreable");
        let b = uncapped.score(&model, &history, &[30]).expect("scoreable");
        assert_eq!(a, b);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let model = fitted();
        let scorer = ItemItemScorer::new();
        let mut history = BTreeMap::new();
        history.insert(10u64, 5.0);
        history.insert(20u64, 4.0);
        let a = scorer.score(&model, &history, &[30, 40]).expect("scoreable");
        let b = scorer.score(&model, &history, &[30, 40]).expect("scoreable");
        // Bit-identical, not merely approximately equal.
        for (item, value) in &a {
            assert_eq!(value.to_bits(), b[item].to_bits());
        }
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn test_no_nan_in_results() {
        let model = fitted();
        let scorer = ItemItemScorer::new();
        let mut history = BTreeMap::new();
        history.insert(10u64, 5.0);
        let scores = scorer
            .score(&model, &history, &[10, 20, 30, 40])
            .expect("scoreable");
        for value in scores.values() {
            assert!(value.is_finite());
        }
    }
}
