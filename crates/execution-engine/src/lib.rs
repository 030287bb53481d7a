pub mod audit;
pub mod workflow;

pub use audit::AuditLog;
pub use workflow::{PricingWorkflow, WorkflowError, WorkflowState};
