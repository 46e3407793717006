//! Error types for ddfloat.
//!
//! Inputs outside a function's mathematical domain are not errors: those
//! functions return NaN. The variants below are reserved for structural
//! problems the caller has to fix (unsupported table sizes, malformed
//! literals, numerically unhealthy approximations).

use thiserror::Error;

/// Result type alias using ddfloat's Error.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur when parsing or evaluating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A structural parameter exceeds the bound supported by a table or a
    /// recurrence.
    #[error("parameter `{name}` = {value} exceeds the supported bound {bound}")]
    Range {
        /// The name of the offending parameter.
        name: &'static str,
        /// The value that was passed.
        value: u64,
        /// The largest supported value.
        bound: u64,
    },

    /// The input string is not a number literal.
    #[error("cannot parse {input:?} as a number: {kind}")]
    Parse {
        /// The rejected input.
        input: String,
        /// What went wrong.
        kind: ParseErrorKind,
    },

    /// A rational approximation was evaluated where its denominator is too
    /// close to zero to be trusted.
    #[error(
        "{function}: denominator magnitude {magnitude:e} is below the minimum {minimum:e}"
    )]
    Computation {
        /// The approximation that failed.
        function: &'static str,
        /// The magnitude of the denominator that was observed.
        magnitude: f64,
        /// The documented minimum magnitude.
        minimum: f64,
    },
}

/// The reasons a number literal can be rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("the input is empty")]
    Empty,
    #[error("expected a decimal digit")]
    InvalidDigit,
    #[error("malformed exponent")]
    InvalidExponent,
}

impl Error {
    /// Returns a range error unless `value <= bound`.
    pub(crate) fn check_range(
        name: &'static str,
        value: u64,
        bound: u64,
    ) -> Result<()> {
        if value > bound {
            return Err(Error::Range { name, value, bound });
        }
        Ok(())
    }

    pub(crate) fn parse(input: &str, kind: ParseErrorKind) -> Self {
        Error::Parse {
            input: input.to_string(),
            kind,
        }
    }
}

#[test]
fn test_error_messages() {
    let err = Error::check_range("degree", 65, 64).unwrap_err();
    assert_eq!(
        err.to_string(),
        "parameter `degree` = 65 exceeds the supported bound 64"
    );
    assert!(Error::check_range("degree", 64, 64).is_ok());

    let err = Error::parse("1.2.3", ParseErrorKind::InvalidDigit);
    assert_eq!(
        err.to_string(),
        "cannot parse \"1.2.3\" as a number: expected a decimal digit"
    );
}
