//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use vecino::prelude::*;
//! ```

pub use crate::data::{MemoryRatingSource, Rating, RatingSource};
pub use crate::error::{Result, VecinoError};
pub use crate::model::{ItemItemModel, ItemItemModelBuilder};
pub use crate::scorer::{ItemItemScorer, DEFAULT_NEIGHBORHOOD_SIZE};
