//! Everything that can go wrong while configuring or running a property.
//!
//! Configuration errors (bad arguments, unknown types, malformed patterns)
//! surface immediately. Failures *inside* a trial never appear here directly:
//! they are captured per trial and only surface, boxed, as [`Error::Check`].

use crate::{outcome::CheckError, value::Kind};

/// Anything that stops a property from being declared or run.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A type tag was used without any generator registered for it.
    #[error("no generator registered for type `{tag}`")]
    UnknownGenerator {
        /// The unregistered tag.
        tag: String,
    },

    /// Something that cannot be turned into a generator was used as one.
    #[error("`{found}` is not a valid generator")]
    InvalidGenerator {
        /// What was passed instead.
        found: String,
    },

    /// A validated generator produced a value of the wrong shape.
    #[error("expected {expected}, but a generator produced the {found} `{value}`")]
    TypeMismatch {
        /// What the validator accepts.
        expected: String,
        /// The shape actually produced.
        found: Kind,
        /// The offending value, rendered.
        value: String,
    },

    /// The pattern is well-formed but uses a feature that cannot be generated from.
    #[error("pattern `{pattern}` uses an unsupported construct: {construct}")]
    UnsupportedPattern {
        /// The whole pattern.
        pattern: String,
        /// The construct that was refused.
        construct: String,
    },

    /// The pattern is not a well-formed regular expression.
    #[error("invalid pattern `{pattern}` at offset {offset}: {reason}")]
    InvalidPattern {
        /// The whole pattern.
        pattern: String,
        /// Byte offset of the problem.
        offset: usize,
        /// What is wrong there.
        reason: String,
    },

    /// Two mutually exclusive ways of calling the same combinator were mixed.
    #[error("ambiguous invocation: {0}")]
    AmbiguousInvocation(String),

    /// An argument has the right type but an unusable value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An iterative producer ran out of values.
    #[error("generator `{label}` is exhausted")]
    Exhausted {
        /// Label of the exhausted generator.
        label: String,
    },

    /// A body asked for a binding that the trial does not have.
    #[error("no value bound to `{name}`")]
    MissingBinding {
        /// The requested name.
        name: String,
    },

    /// A binding exists but cannot be converted to the requested Rust type.
    #[error("`{name}` is a {found}, which cannot be read as {expected}")]
    Extract {
        /// The binding's name.
        name: String,
        /// The requested Rust type, in words.
        expected: &'static str,
        /// The shape the binding actually has.
        found: Kind,
    },

    /// A property failed at least one trial.
    #[error(transparent)]
    Check(Box<CheckError>),
}

impl From<CheckError> for Error {
    #[inline]
    fn from(e: CheckError) -> Self {
        Self::Check(Box::new(e))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        let () = pretty_assertions::assert_eq!(
            Error::UnknownGenerator {
                tag: "widget".to_owned()
            }
            .to_string(),
            "no generator registered for type `widget`",
        );
        let () = pretty_assertions::assert_eq!(
            Error::InvalidPattern {
                pattern: "(a".to_owned(),
                offset: 2,
                reason: "unbalanced parenthesis".to_owned(),
            }
            .to_string(),
            "invalid pattern `(a` at offset 2: unbalanced parenthesis",
        );
    }

    #[test]
    fn is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        let () = assert_send_sync::<Error>();
    }
}
