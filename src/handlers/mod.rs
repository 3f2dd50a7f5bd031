pub mod health;
pub mod metrics;
pub mod pages;
pub mod types;

pub use health::health_check;
pub use metrics::get_metrics;
pub use pages::{embed, index, profile_status};
pub use types::*;
