pub(crate) mod bootstrap;
pub(crate) mod loop_runner;
pub(crate) mod script;

use std::env;
use std::io;
use std::path::PathBuf;

use brawl_engine::SimError;
use thiserror::Error;

use self::script::ScriptError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("{var} must be {expected}, got '{value}'")]
    InvalidEnvValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path} at {at}: {source}")]
    ConfigParse {
        path: PathBuf,
        at: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid script {origin}: {source}")]
    Script {
        origin: String,
        #[source]
        source: ScriptError,
    },
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error("failed to encode snapshot json: {0}")]
    EncodeSnapshot(#[source] serde_json::Error),
}
