//! What one trial did, and what a failing property reports.

use {
    crate::{tag::Tag, value::Bindings},
    core::{any::Any, fmt},
    std::{
        backtrace::Backtrace,
        panic,
        sync::{Mutex, PoisonError},
    },
};

/// The record of one trial: its inputs, its tags, and how it ended.
#[derive(Debug)]
pub struct TrialResult {
    bindings: Bindings,
    tags: Vec<Tag>,
    outcome: Outcome,
}

/// How a trial ended.
#[derive(Debug)]
#[non_exhaustive]
pub enum Outcome {
    /// The body ran to completion.
    Completed,
    /// The body returned an error or panicked.
    Failed(Failure),
}

/// Why a trial failed, with the original cause kept intact.
pub struct Failure {
    kind: String,
    message: String,
    location: Option<Location>,
    cause: Cause,
}

/// Where a panic originated.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Location {
    /// Source file.
    pub file: String,
    /// One-based line.
    pub line: u32,
    /// One-based column.
    pub column: u32,
}

/// The original failure, ready to be re-raised.
enum Cause {
    /// Behind a `Mutex` only so that `Failure` is `Sync`; taken once, on re-raise.
    Panic(Mutex<Option<Box<dyn Any + Send>>>),
    Error(anyhow::Error),
}

/// A property failed: which one, on which inputs, and why.
#[derive(Debug)]
pub struct CheckError {
    property: String,
    trial: usize,
    bindings: Bindings,
    failure: Failure,
}

impl TrialResult {
    /// A trial that ran to completion.
    #[inline]
    #[must_use]
    pub fn completed(bindings: Bindings, tags: Vec<Tag>) -> Self {
        Self::new(bindings, tags, Outcome::Completed)
    }

    /// A trial that failed, keeping the tags emitted before the failure.
    #[inline]
    #[must_use]
    pub fn failed(bindings: Bindings, tags: Vec<Tag>, failure: Failure) -> Self {
        Self::new(bindings, tags, Outcome::Failed(failure))
    }

    /// Duplicate tags are kept once, in order of first emission.
    fn new(bindings: Bindings, mut tags: Vec<Tag>, outcome: Outcome) -> Self {
        let mut seen = Vec::with_capacity(tags.len());
        let () = tags.retain(|tag| {
            if seen.contains(tag) {
                false
            } else {
                let () = seen.push(tag.clone());
                true
            }
        });
        Self {
            bindings,
            tags,
            outcome,
        }
    }

    /// Whether the body ran to completion.
    #[inline]
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Completed)
    }

    /// Why the trial failed, if it did.
    #[inline]
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self.outcome {
            Outcome::Completed => None,
            Outcome::Failed(ref failure) => Some(failure),
        }
    }

    /// The inputs this trial ran with.
    #[inline]
    #[must_use]
    pub const fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Tags emitted during the trial, each once.
    #[inline]
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// How the trial ended.
    #[inline]
    #[must_use]
    pub const fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Turn a failed trial into the error a property reports.
    #[inline]
    #[must_use]
    pub fn into_check_error(self, property: &str, trial: usize) -> Option<CheckError> {
        match self.outcome {
            Outcome::Completed => None,
            Outcome::Failed(failure) => Some(CheckError {
                property: property.to_owned(),
                trial,
                bindings: self.bindings,
                failure,
            }),
        }
    }
}

impl Failure {
    /// A failure carrying a returned error.
    ///
    /// The kind is the error's Rust type. An `anyhow::Error` is only a carrier,
    /// so it reports its root cause's type (or variant) instead, when that
    /// cause names one.
    #[inline]
    #[must_use]
    pub fn from_error<E: Into<anyhow::Error>>(error: E) -> Self {
        let declared = core::any::type_name::<E>();
        let error = error.into();
        let kind = if declared == core::any::type_name::<anyhow::Error>() {
            root_kind(&error).unwrap_or_else(|| declared.to_owned())
        } else {
            declared.to_owned()
        };
        Self {
            kind,
            message: error.to_string(),
            location: None,
            cause: Cause::Error(error),
        }
    }

    /// A failure carrying a caught panic payload.
    #[inline]
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>, location: Option<Location>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|&s| s.to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "Box<dyn Any>".to_owned());
        Self {
            kind: "panic".to_owned(),
            message,
            location,
            cause: Cause::Panic(Mutex::new(Some(payload))),
        }
    }

    /// The panic kind (`"panic"`) or the returned error's type name.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The panic message or the error's display text.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where a panic was raised.
    #[inline]
    #[must_use]
    pub const fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Whether the body panicked rather than returned an error.
    #[inline]
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self.cause, Cause::Panic(_))
    }

    /// The returned error, if this was not a panic.
    #[inline]
    #[must_use]
    pub const fn error(&self) -> Option<&anyhow::Error> {
        match self.cause {
            Cause::Error(ref e) => Some(e),
            Cause::Panic(_) => None,
        }
    }

    /// Where the returned error was created, if backtraces were enabled
    /// (`RUST_BACKTRACE` or `RUST_LIB_BACKTRACE`) when it was.
    #[inline]
    #[must_use]
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.error().map(anyhow::Error::backtrace)
    }

    /// Re-raise the original failure:
    /// a panic resumes unwinding with its original payload,
    /// and an error panics with `context` as the message.
    #[inline]
    pub fn resume(self, context: &str) -> ! {
        let payload = match self.cause {
            Cause::Panic(payload) => payload.into_inner().unwrap_or_else(PoisonError::into_inner),
            Cause::Error(_) => None,
        };
        match payload {
            Some(payload) => panic::resume_unwind(payload),
            None => panic!("{context}"),
        }
    }
}

/// The leading type or variant name of `error`'s root cause, read off its `Debug` output.
fn root_kind(error: &anyhow::Error) -> Option<String> {
    let debug = format!("{:?}", error.root_cause());
    let head: String = debug
        .chars()
        .take_while(|&c| c.is_alphanumeric() || c == '_')
        .collect();
    let rest = debug.get(head.len()..)?;
    let named = head.starts_with(char::is_uppercase)
        && (rest.is_empty() || rest.starts_with([' ', '(', '{']));
    named.then_some(head)
}

impl fmt::Display for Failure {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(ref location) = self.location {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Failure {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Location {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

impl From<&panic::Location<'_>> for Location {
    #[inline]
    fn from(location: &panic::Location<'_>) -> Self {
        Self {
            file: location.file().to_owned(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl CheckError {
    /// Name of the failing property.
    #[inline]
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Zero-based index of the failing trial.
    #[inline]
    #[must_use]
    pub const fn trial(&self) -> usize {
        self.trial
    }

    /// The inputs of the failing trial.
    #[inline]
    #[must_use]
    pub const fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Why the trial failed.
    #[inline]
    #[must_use]
    pub const fn failure(&self) -> &Failure {
        &self.failure
    }

    /// Print the diagnostic, then re-raise the original failure as if it had never been caught.
    #[inline]
    #[expect(clippy::print_stderr, reason = "the diagnostic must reach the test output")]
    pub fn raise(self) -> ! {
        let diagnostic = self.to_string();
        eprintln!("{diagnostic}");
        self.failure.resume(&diagnostic)
    }
}

impl fmt::Display for CheckError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "property `{}` failed on trial {} due to {}",
            self.property,
            self.trial.saturating_add(1),
            self.failure,
        )?;
        write!(f, "Failure encountered for data:")?;
        for (name, value) in self.bindings.iter() {
            write!(f, "\n  {name} = {value}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CheckError {
    #[inline]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failure.error().map(|e| {
            let source: &(dyn std::error::Error + 'static) = e.as_ref();
            source
        })
    }
}

#[cfg(test)]
mod test {
    use {super::*, crate::value::Value};

    fn failing(failure: Failure) -> CheckError {
        let bindings: crate::value::Bindings = [("x", Value::Int(1)), ("y", Value::from("a"))]
            .into_iter()
            .collect();
        TrialResult::failed(bindings, vec![], failure)
            .into_check_error("prop", 4)
            .unwrap()
    }

    #[test]
    fn tags_are_deduplicated_in_order() {
        let result = TrialResult::completed(
            Bindings::new(),
            vec![Tag::new("b"), Tag::new("a"), Tag::new("b")],
        );
        let () = pretty_assertions::assert_eq!(result.tags(), &[Tag::new("b"), Tag::new("a")]);
        assert!(result.succeeded());
        assert!(result.failure().is_none());
    }

    #[test]
    fn panic_payload_becomes_message() {
        let failure = Failure::from_panic(Box::new("boom"), None);
        let () = pretty_assertions::assert_eq!(failure.kind(), "panic");
        let () = pretty_assertions::assert_eq!(failure.message(), "boom");
        let failure = Failure::from_panic(Box::new(String::from("bang")), None);
        let () = pretty_assertions::assert_eq!(failure.message(), "bang");
        let failure = Failure::from_panic(Box::new(42_u8), None);
        let () = pretty_assertions::assert_eq!(failure.message(), "Box<dyn Any>");
    }

    #[test]
    fn error_kind_is_its_type() {
        let e = "x".parse::<i32>().unwrap_err();
        let failure = Failure::from_error(e);
        assert!(failure.kind().ends_with("ParseIntError"), "{}", failure.kind());
        assert!(!failure.is_panic());
        assert!(failure.error().is_some());
    }

    #[test]
    fn anyhow_reports_the_root_cause_type() {
        let parse = "x".parse::<i32>().unwrap_err();
        let failure = Failure::from_error(anyhow::Error::from(parse).context("reading the count"));
        let () = pretty_assertions::assert_eq!(failure.kind(), "ParseIntError");
        let () = pretty_assertions::assert_eq!(failure.message(), "reading the count");
        assert!(failure.backtrace().is_some());
        let adhoc = Failure::from_error(anyhow::anyhow!("plain message"));
        let () = pretty_assertions::assert_eq!(adhoc.kind(), "anyhow::Error");
        assert!(Failure::from_panic(Box::new("boom"), None).backtrace().is_none());
    }

    #[test]
    fn diagnostic_lists_the_data() {
        let e = failing(Failure::from_error(anyhow::anyhow!("nope")));
        let () = pretty_assertions::assert_eq!(
            e.to_string(),
            "property `prop` failed on trial 5 due to anyhow::Error: nope\n\
             Failure encountered for data:\n  x = 1\n  y = \"a\"",
        );
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn raise_resumes_the_original_payload() {
        let e = failing(Failure::from_panic(Box::new(17_u32), None));
        let payload = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            e.raise();
        }))
        .unwrap_err();
        let () = pretty_assertions::assert_eq!(payload.downcast_ref::<u32>(), Some(&17));
    }

    #[test]
    fn raise_turns_errors_into_panics() {
        let e = failing(Failure::from_error(anyhow::anyhow!("nope")));
        let payload = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            e.raise();
        }))
        .unwrap_err();
        let message = payload.downcast_ref::<String>().unwrap();
        assert!(message.contains("Failure encountered for data"), "{message}");
    }
}
