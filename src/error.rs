use thiserror::Error;

/// Error type for every fallible operation on the analyzer.
///
/// Validation errors (`OutOfRange`, `InvalidEnum`, `InvalidType`) are raised
/// before anything is sent, so a rejected request leaves the instrument
/// untouched. Transport faults propagate unchanged and are never retried:
/// the instrument's state after a failed command is unknown, and blindly
/// resending a command like a file delete could repeat its side effect.
#[derive(Debug, Error)]
pub enum InstrumentError {
    /// A numeric parameter lies outside the instrument's documented range.
    #[error("{parameter} {value} is out of range, must be within [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A value is not a member of the allowed discrete set.
    #[error("invalid {parameter} {value:?}, allowed values: {allowed}")]
    InvalidEnum {
        parameter: &'static str,
        value: String,
        allowed: &'static str,
    },

    /// A parameter has the wrong numeric type, e.g. a fractional attenuation.
    #[error("{parameter} {value} must be an integer")]
    InvalidType { parameter: &'static str, value: f64 },

    /// Transport timeout or I/O failure, propagated from the link layer.
    #[error("communication fault: {0}")]
    Communication(String),

    /// A query reply could not be parsed into the expected type.
    #[error("malformed response to {command:?}: expected {expected}, got {response:?}")]
    MalformedResponse {
        command: String,
        response: String,
        expected: &'static str,
    },

    /// The trace payload could not be parsed or its length did not match
    /// the instrument's reported point count.
    #[error("malformed trace data: {0}")]
    MalformedTraceData(String),

    /// The instrument reported that a referenced file does not exist.
    #[error("file {path:?} not found on instrument")]
    FileNotFound { path: String },

    /// The sweep-done status bit never cleared within the poll budget.
    #[error("sweep did not complete within {polls} status polls")]
    Timeout { polls: usize },

    /// The session has been closed (or was never opened).
    #[error("not connected to the instrument")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, InstrumentError>;
