//! Risk engine
//!
//! Pure position sizing and invariant validation. Stateless and safe to
//! call from any task without synchronization.

mod sizing;
mod types;

pub use sizing::{position_size, risk_reward, validate_direction};
pub use types::{RiskError, RiskReward};
