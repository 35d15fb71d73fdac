//! CLI errors and their exit codes.
//!
//! Engine errors are routed by [`ErrorCategory`]: a rejected configuration is
//! the user's input, a rejected transition or a destroyed stage is an engine
//! failure, and I/O stays I/O.
//!
//! | code | meaning                                               |
//! |------|-------------------------------------------------------|
//! | 2    | clap argument error (raised before `run`)             |
//! | 10   | engine failure (rejected transition, destroyed stage) |
//! | 11   | snapshot write failed                                 |
//! | 12   | bad input (count, mode, color, `--params`, scene)     |
//! | 13   | JSON output failed                                    |

use thiserror::Error;
use tidemark_core::{EngineError, ErrorCategory};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(EngineError),
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    Input(String),
    #[error("cannot serialize output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e.category() {
            ErrorCategory::Config => CliError::Input(e.to_string()),
            ErrorCategory::Io => CliError::Io(e.to_string()),
            ErrorCategory::Validation | ErrorCategory::Lifecycle => CliError::Engine(e),
        }
    }
}
