// ABOUTME: Outcome substrate converting faults into typed success/failure values
// ABOUTME: Every graph action and I/O entry point funnels through these traps

pub mod failure;
pub mod trap;

pub use failure::{Failure, Outcome};
pub use trap::{attempt, attempt_unit, attempt_with_cleanup, install_panic_hook};
