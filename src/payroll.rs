pub mod actor;
pub mod engine;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod model;
pub mod period;
pub mod workflow;

pub use actor::Actor;
pub use error::WorkflowError;
pub use period::Period;
pub use workflow::ApprovalWorkflow;
