pub mod reconcile;
pub mod snapshot;
pub mod verify;

/// Command result: the process exit code on success.
pub type CommandResult = Result<i32, Box<dyn std::error::Error>>;
