use serde::Serialize;
use thiserror::Error;

/// Top-level error type for relay characteristic calculations.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Errors related to time-current curve selection.
#[derive(Debug, Error)]
pub enum CurveError {
    #[error("unrecognized curve type: {0}")]
    UnknownCurve(String),
}

/// Errors related to user-supplied settings and measurements.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("missing required input: {0}")]
    Missing(&'static str),

    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid input: {0}")]
    Invalid(String),
}

/// Geometric degeneracy.
///
/// Region solvers never return this as an `Err`; it is attached to results as
/// a warning so that one degenerate zone does not stop the others.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Convenience type alias for results using [`RelayError`].
pub type Result<T> = std::result::Result<T, RelayError>;
