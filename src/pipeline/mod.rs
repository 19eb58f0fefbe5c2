//! Monitoring pipeline components.

mod coordinator;
mod processor;
pub mod supervisor;

pub use coordinator::{PassInputs, SpillModelSlot, run_monitor, run_pass};
pub use processor::{PassSummary, ProcessContext, process_records, visualization_path_for};
pub use supervisor::{RetryPolicy, SupervisorReport, supervise};
