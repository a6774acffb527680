use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a padding run.
#[derive(Debug, Error)]
pub enum PadError {
    /// An external executable could not be started.
    #[error("required tool '{}' was not found", .program.display())]
    ToolNotFound { program: PathBuf },

    /// The output directory already exists and appending was not requested.
    #[error("output directory already exists: {}", .0.display())]
    OutputConflict(PathBuf),

    /// A cached coords dump exists but holds no data.
    #[error("coords file is empty: {}", .0.display())]
    EmptyDump(PathBuf),

    /// A region line inside a captured block could not be read.
    #[error("line {line_number}: {reason}: {line:?}")]
    Parse {
        line_number: usize,
        line: String,
        reason: LineError,
    },

    /// The metadata extraction tool exited unsuccessfully.
    #[error("'{}' failed with {status}: {stderr}", .program.display())]
    ExtractionFailed {
        program: PathBuf,
        status: String,
        stderr: String,
    },

    /// The padding tool failed on one operation; later operations were not attempted.
    #[error(
        "padding operation {} failed for '{}' -> '{}': {failure}",
        .index + 1,
        .input.display(),
        .output.display()
    )]
    OperationFailed {
        index: usize,
        input: PathBuf,
        output: PathBuf,
        failure: ToolFailure,
    },

    /// The session file handed to the configuration does not exist.
    #[error("session file does not exist: {}", .0.display())]
    MissingSession(PathBuf),

    /// The audio source path is not a directory.
    #[error("audio directory does not exist: {}", .0.display())]
    MissingAudioDir(PathBuf),

    /// Wrapper around IO errors encountered while reading or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why a single region line was rejected by the parser.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("missing {0}")]
    MissingDelimiter(&'static str),

    #[error("{field} is not an integer ('{token}')")]
    NotAnInteger { field: &'static str, token: String },

    #[error("{0} is empty")]
    EmptyField(&'static str),

    #[error("unexpected text after the source file ('{0}')")]
    TrailingText(String),
}

/// Failure reported by one invocation of an external padding tool.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{status}: {stderr}")]
pub struct ToolFailure {
    /// Human readable exit status (`exit status: 2`, `signal: 9`, ...).
    pub status: String,
    /// Captured standard error, trimmed.
    pub stderr: String,
}
