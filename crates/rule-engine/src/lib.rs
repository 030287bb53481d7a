pub mod engine;
pub mod types;

pub use engine::RulePolicy;
pub use types::RuleThresholds;
