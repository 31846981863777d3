//! # piq-diff
//!
//! **Tier 1 (Comparison)**
//!
//! Structural comparison of two [`NormalizedReport`]s: which product
//! factors, measures, findings and diagnostics differ, which are missing on
//! the other side, and what the other side's values are.
//!
//! Comparison is directional and pure. Scores compare with a fixed absolute
//! tolerance of [`SCORE_TOLERANCE`].
//!
//! ## What belongs here
//! * Entity matching and field comparison
//! * Diff result contracts
//!
//! ## What does NOT belong here
//! * Document traversal (use piq-extract)
//! * Rendering or highlighting of differences
//!
//! [`NormalizedReport`]: piq_types::NormalizedReport

mod reconcile;
mod tolerance;
mod types;

pub use reconcile::{reconcile, reconcile_json, reconcile_pair};
pub use tolerance::{SCORE_TOLERANCE, approx_eq};
pub use types::{
    DiffError, DiffResult, FindingField, FindingPeer, MeasureField, MeasurePeer, PairDiff,
    ProductFactorField, ProductFactorPeer, Side,
};
