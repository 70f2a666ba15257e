//! Presentation-facing derivations of evaluations.

pub mod view;

pub use view::{AssessmentVariant, AssessmentView, DimensionScore, ReadinessVerdict, ViewHeader};
