//! Corporate-action normalization: ratio payloads to numeric adjustments.

mod corporate_action_model;
mod normalizer;

pub use corporate_action_model::*;
pub use normalizer::*;
