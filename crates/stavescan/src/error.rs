//! Structural failures of a sheet-processing step.
//!
//! Rejected candidates are not errors: they carry a [`crate::Failure`] tag
//! and processing goes on. The variants below abort the whole step for the
//! sheet at hand.

/// Errors that abort bar-line processing for one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarsError {
    /// The sheet has no staff at all.
    NoStaves,
    /// No part-defining bar covers this staff, so it belongs to no system.
    NoSystemForStaff {
        /// Index of the orphan staff.
        staff: usize,
    },
}

impl std::fmt::Display for BarsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoStaves => write!(f, "sheet has no staves"),
            Self::NoSystemForStaff { staff } => {
                write!(f, "no system found for staff #{}", staff)
            }
        }
    }
}

impl std::error::Error for BarsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_staff() {
        let err = BarsError::NoSystemForStaff { staff: 3 };
        assert_eq!(err.to_string(), "no system found for staff #3");
        assert_eq!(BarsError::NoStaves.to_string(), "sheet has no staves");
    }
}
