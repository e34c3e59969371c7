mod flow_classifier;
pub mod performance_model;
pub mod xirr;

pub use flow_classifier::{
    classify_flow_for_scope, include_in_xirr, xirr_cashflows, FlowType, PerformanceScope,
};
pub use performance_model::*;
pub use xirr::*;
