//! Plan execution: the action interpreter, the executor and its report.

mod executor;
mod interpreter;
mod report;

pub use executor::PlanExecutor;
pub use interpreter::{ActionInterpreter, StepChange};
pub use report::{
    ExecutionReport, ExecutionStatus, OutlierFlag, StepFailure, StepRecord, StepState,
};
