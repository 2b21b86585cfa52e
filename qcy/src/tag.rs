//! Labels a trial can emit, and statistics over them.

use {
    crate::{outcome::TrialResult, value::Value},
    core::fmt,
    std::collections::HashMap,
};

/// An immutable, hashable label attached to a trial.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Tag(Value);

impl Tag {
    /// A tag carrying `value`.
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// What the tag carries.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for Tag {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            // Labels read better without quotes.
            Value::Str(ref s) => f.write_str(s),
            ref other => write!(f, "{other}"),
        }
    }
}

/// Group trials that share `value`.
/// ```
/// let tag = qcy::collect(3_i64);
/// assert_eq!(tag.map(|t| t.to_string()), Some("3".to_owned()));
/// ```
#[inline]
#[must_use]
pub fn collect(value: impl Into<Value>) -> Option<Tag> {
    Some(Tag::new(value))
}

/// Stamp a trial with `label` if (and only if) `condition` holds.
/// ```
/// assert!(qcy::classify(false, "empty").is_none());
/// assert!(qcy::classify(true, "empty").is_some());
/// ```
#[inline]
#[must_use]
pub fn classify(condition: bool, label: impl Into<Value>) -> Option<Tag> {
    condition.then(|| Tag::new(label))
}

/// How many trials carried each tag.
#[inline]
#[must_use]
pub fn tally(results: &[TrialResult]) -> HashMap<Tag, usize> {
    let mut acc: HashMap<Tag, usize> = HashMap::new();
    for tag in results.iter().flat_map(TrialResult::tags) {
        let count = acc.entry(tag.clone()).or_default();
        *count = count.saturating_add(1);
    }
    acc
}
