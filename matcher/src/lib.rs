//! Face matching decision engine.
//!
//! [`Matcher::identify`] scans every active gallery record once, tracking the
//! best and second-best cosine distance, and accepts the best candidate only
//! if all of the following hold:
//!
//! 1. `best <= threshold`
//! 2. `best <= strict_ceiling`
//! 3. `second - best > min_margin` (when a second candidate exists)
//!
//! Rejections are ordinary [`Decision`]s carrying a [`MatchReason`]; only a
//! malformed query is an error. The matcher never writes anywhere.

mod config;
mod cosine;
mod decision;
mod error;
mod matcher;

pub use config::MatcherConfig;
pub use cosine::{cosine_distance, NORM_EPSILON};
pub use decision::{Decision, MatchReason};
pub use error::MatchError;
pub use matcher::Matcher;
