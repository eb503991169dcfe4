use std::{fmt, io, path::PathBuf};

/// The error kinds a simulation run can stop with.
///
/// Functions return `eyre::Result`, callers can get the kind back with
/// `report.downcast_ref::<SimError>()`.
#[derive(Debug)]
pub enum SimError {
    /// bad cache geometry or a missing required option
    Config(String),
    /// the trace file is missing or cannot be opened
    File { path: PathBuf, source: io::Error },
    /// a trace record whose flag is not one of `I`, `L`, `S`, `M`
    InvalidAccessFlag,
    /// a known flag followed by an address or size that does not parse
    Parse { line: String, reason: &'static str },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Config(msg) => write!(f, "invalid configuration: {msg}"),
            SimError::File { path, .. } => {
                write!(f, "unable to open trace file {}", path.display())
            }
            SimError::InvalidAccessFlag => write!(f, "invalid or missing access flag"),
            SimError::Parse { line, reason } => write!(f, "malformed record {line:?}: {reason}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::File { source, .. } => Some(source),
            _ => None,
        }
    }
}
