//! Error types raised while decoding, discretizing and resolving alignments.

/// Failures of the alignment engine.
///
/// Everything except [`AlignmentError::StationOutOfRange`] is recovered
/// locally: the offending record or curve is skipped and the error is
/// collected next to the partial result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlignmentError {
    #[error("record {index}: field `{field}` has non-numeric value {value:?}")]
    DataConversion {
        index: usize,
        field: String,
        value: String,
    },

    #[error("record {index}: {reason}")]
    IncompletePosition { index: usize, reason: String },

    #[error("record {index}: {reason}")]
    IncompleteCurveDefinition { index: usize, reason: String },

    #[error("record {index}: {reason}")]
    InvalidCurveDefinition { index: usize, reason: String },

    #[error("element {index}: invalid subdivision policy: {reason}")]
    InvalidSubdivisionPolicy { index: usize, reason: String },

    #[error("element {index}: spiral of length {spiral_length} leaves no central arc on radius {radius}")]
    DegenerateSpiralCurve {
        index: usize,
        radius: f64,
        spiral_length: f64,
    },

    #[error("station {station} resolves to distance {distance}, outside 0..={length}")]
    StationOutOfRange {
        station: f64,
        distance: f64,
        length: f64,
    },

    #[error("invalid vertical profile: {reason}")]
    InvalidProfile { reason: String },
}

impl AlignmentError {
    /// Re-labels a discretization error with the element it occurred on.
    pub fn at_element(self, element: usize) -> Self {
        match self {
            AlignmentError::InvalidSubdivisionPolicy { reason, .. } => {
                AlignmentError::InvalidSubdivisionPolicy {
                    index: element,
                    reason,
                }
            }
            AlignmentError::DegenerateSpiralCurve {
                radius,
                spiral_length,
                ..
            } => AlignmentError::DegenerateSpiralCurve {
                index: element,
                radius,
                spiral_length,
            },
            other => other,
        }
    }
}

pub type Result<T, E = AlignmentError> = std::result::Result<T, E>;
