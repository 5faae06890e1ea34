mod executor;
mod reporter;
mod runner;

pub use executor::{ComponentExecutor, SharedExecutor, SimulatedExecutor};
pub use reporter::Reporter;
pub use runner::{Operation, run_deployment};
