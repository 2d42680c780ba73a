//! Vecino: neighbor-based collaborative filtering in pure Rust.
//!
//! Vecino builds an immutable item-item similarity model from a batch of
//! (user, item, rating) observations, then predicts how a target user would
//! rate candidate items by a similarity-weighted average over each
//! candidate's most similar neighbors.
//!
//! # Quick Start
//!
//! ```
//! use vecino::prelude::*;
//!
//! let source = MemoryRatingSource::new(vec![
//!     Rating::new(1, 10, 5.0),
//!     Rating::new(1, 20, 5.0),
//!     Rating::new(2, 10, 1.0),
//!     Rating::new(2, 20, 1.0),
//!     Rating::new(3, 10, 4.0),
//! ]);
//!
//! // Build the model once, from the source's batch snapshot.
//! let model = ItemItemModelBuilder::new().fit(&source.all_ratings()).unwrap();
//!
//! // Score candidates for user 3, who has only rated item 10.
//! let scorer = ItemItemScorer::new();
//! let scores = scorer.score_for_user(&model, &source, 3, &[20]).unwrap();
//! // User 3 rated item 10 above its mean, so item 20 predicts above its own.
//! assert!(scores[&20] > 3.0);
//! ```
//!
//! # Modules
//!
//! - [`data`]: Rating observations and the [`data::RatingSource`] seam to
//!   external rating stores
//! - [`model`]: Item-item similarity model and its builder
//! - [`scorer`]: Neighborhood scorer (weighted-average prediction)
//! - [`error`]: Error types
//!
//! # Design
//!
//! The model is built once from a snapshot and is safe to share read-only
//! across concurrent scoring calls; scoring is stateless and allocates only
//! request-scoped state. All maps are ordered, so identical inputs always
//! produce bit-identical outputs. With the `parallel` feature the all-pairs
//! similarity loop fans out across row items via rayon without changing any
//! result.

pub mod data;
pub mod error;
pub mod model;
pub mod prelude;
pub mod scorer;

pub use data::{MemoryRatingSource, Rating, RatingSource};
pub use error::{Result, VecinoError};
pub use model::{ItemItemModel, ItemItemModelBuilder};
pub use scorer::ItemItemScorer;
