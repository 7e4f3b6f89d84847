pub mod plan;
pub mod port_killer;
pub mod report;
pub mod sequence;

pub use crate::domain::model::{
    CommandOutcome, FailureMode, Invocation, StdioMode, Step, StepKind, StepResult, StepStatus,
};
pub use crate::domain::ports::CommandRunner;
pub use crate::utils::error::Result;
