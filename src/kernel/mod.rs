pub mod capability;
pub mod execution;
pub mod process;
pub mod reactor;
pub mod risk;
pub mod telemetry;

pub use capability::{Capability, CapabilityRegistry, LookupError};
pub use execution::{BrowserLauncher, ExecutionController, ExecutionResult, FailureKind};
pub use process::{ProcessError, ProcessOutput, ProcessRunner, SystemRunner};
pub use reactor::{Reactor, TurnOutcome, TurnReport};
pub use risk::RiskLevel;
