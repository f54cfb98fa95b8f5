use thiserror::Error;

/// Result alias for `hai-sweep`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the sweep, hierarchy and agreement primitives.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed or empty numeric input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Two matrices of incompatible shape were compared.
    #[error("dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        /// Expected shape (rows, cols).
        expected: (usize, usize),
        /// Found shape (rows, cols).
        found: (usize, usize),
    },

    /// Runs of one batch disagree on the number of samples.
    #[error(
        "inconsistent sample count: parameter {param} produced {found} samples, expected {expected}"
    )]
    InconsistentSampleCount {
        /// Parameter value of the offending run.
        param: usize,
        /// Sample count inferred from the first run.
        expected: usize,
        /// Sample count of the offending run.
        found: usize,
    },

    /// No successful run reached meta-analysis.
    #[error("no valid hierarchies: every parameter run failed or the sweep was empty")]
    NoValidHierarchies,

    /// The hierarchy-construction collaborator failed for one parameter value.
    #[error("clustering failed for parameter {param}: {reason}")]
    UpstreamClustering {
        /// Parameter value that failed.
        param: usize,
        /// Failure reason reported by the collaborator.
        reason: String,
    },
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let e = Error::DimensionMismatch {
            expected: (4, 4),
            found: (3, 3),
        };
        let s = e.to_string();
        assert!(s.contains("(4, 4)"));
        assert!(s.contains("(3, 3)"));

        let e = Error::InconsistentSampleCount {
            param: 7,
            expected: 60,
            found: 59,
        };
        let s = e.to_string();
        assert!(s.contains('7') && s.contains("60") && s.contains("59"));
    }
}
