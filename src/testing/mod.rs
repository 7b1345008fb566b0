// ABOUTME: Test declarations, adapters and result aggregation
// ABOUTME: Runs declared tests through the adapter registered for their superclass

pub mod adapter;
pub mod declaration;
pub mod error;
pub mod status;

pub use adapter::{run_declared, AdapterRegistry, CommandAdapter, TestAdapter};
pub use declaration::TestDeclaration;
pub use error::TestingError;
pub use status::{TestResult, TestStatus, TestSummary};
