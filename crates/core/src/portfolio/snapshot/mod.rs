//! Portfolio snapshot module - transaction replay and lot state.

pub mod holdings_calculator;
mod positions_model;
pub mod replay_order;
mod snapshot_model;
pub mod transfer_pairing;

pub use holdings_calculator::*;
pub use positions_model::*;
pub use snapshot_model::*;
pub use transfer_pairing::TransferPairs;
