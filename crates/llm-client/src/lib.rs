pub mod client;
pub mod policy;
pub mod types;

pub use client::LlmClient;
pub use policy::RemotePolicy;
pub use types::{DecisionError, DecisionRequest, RemoteAction, RemoteDecision};
