//! Literal containment check of the advisory text against captured output.

use thiserror::Error;

/// An invocation violated its warning expectation.
#[derive(Error, Debug)]
pub enum AssertionError {
    #[error("\"{invocation}\" expected to show the npm version warning, but it was absent")]
    MissingWarning { invocation: String },
    #[error("\"{invocation}\" expected to not show the npm version warning, but it was present")]
    UnexpectedWarning { invocation: String },
}

/// Check the captured output of `invocation` against its expectation.
///
/// Exact substring match only: no regular expressions, no normalization.
/// `captured` is the invocation's stderr, or its failure message for
/// invocations that were expected to fail outright.
///
/// # Errors
/// Returns an `AssertionError` naming the invocation when the warning is
/// absent but expected, or present but not expected.
pub fn check_warning(
    captured: &str,
    warning_text: &str,
    expect_warning: bool,
    invocation: &str,
) -> Result<(), AssertionError> {
    let present = captured.contains(warning_text);
    match (expect_warning, present) {
        (true, false) => Err(AssertionError::MissingWarning {
            invocation: invocation.to_string(),
        }),
        (false, true) => Err(AssertionError::UnexpectedWarning {
            invocation: invocation.to_string(),
        }),
        _ => Ok(()),
    }
}
