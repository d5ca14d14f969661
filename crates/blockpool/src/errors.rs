//! Error handling and exit codes.

use blockpool_core::PoolError;

/// Process exit codes.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// A pool invariant or canary check failed.
    pub const ERROR_CORRUPTION: i32 = 3;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// The pool could not provision memory.
    pub const ERROR_OUT_OF_MEMORY: i32 = 5;
}

/// Map a pool error to its exit code.
pub fn handle_error(err: &PoolError) -> i32 {
    match err {
        PoolError::OutOfMemory { .. } => exit_codes::ERROR_OUT_OF_MEMORY,
        PoolError::Config(_) => exit_codes::ERROR_CONFIG,
        PoolError::Corrupted { .. } | PoolError::InvariantViolation(_) => {
            exit_codes::ERROR_CORRUPTION
        }
        PoolError::ForeignBlock | PoolError::OutOfBounds { .. } => exit_codes::ERROR_GENERIC,
    }
}

/// Exit code for an application error, looking through to a `PoolError` cause.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PoolError>())
        .map_or(exit_codes::ERROR_GENERIC, handle_error)
}
