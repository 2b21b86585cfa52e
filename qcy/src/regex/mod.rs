//! Reverse-executing regular expressions: strings that *match* a pattern.
//!
//! ```
//! let re = qcy::regex::Regex::new(r"[a-f]{2}-\d+").unwrap();
//! let mut seed = qcy::Seed::default();
//! let s = re.produce(&mut seed);
//! assert!(s.len() >= 4);
//! ```

pub mod ast;
pub mod charset;
pub mod parser;

use {
    crate::{error::Error, generator::Generator, seed::Seed, value::Value},
    ast::{Category, Node},
    core::fmt,
    std::rc::Rc,
};

/// Upper bound on repetitions for `*`, `+` and `{n,}`.
pub const UNBOUNDED_REPEAT_CAP: usize = 64;

/// A parsed pattern, ready to produce matching strings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Regex {
    pattern: String,
    root: Node,
}

impl Regex {
    /// Parse `pattern` once.
    /// # Errors
    /// If the pattern is malformed or uses an unsupported construct.
    #[inline]
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let root = parser::parse(pattern)?;
        tracing::trace!(pattern, ?root, "parsed pattern");
        Ok(Self {
            pattern: pattern.to_owned(),
            root,
        })
    }

    /// Wrap an already-built tree. `pattern` is only used for display.
    #[inline]
    #[must_use]
    pub fn from_ast(pattern: impl Into<String>, root: Node) -> Self {
        Self {
            pattern: pattern.into(),
            root,
        }
    }

    /// The source text.
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The parsed form.
    #[inline]
    #[must_use]
    pub const fn ast(&self) -> &Node {
        &self.root
    }

    /// Produce one string matching the whole pattern.
    #[inline]
    #[must_use]
    pub fn produce(&self, seed: &mut Seed) -> String {
        let mut out = String::new();
        let () = emit(&self.root, seed, &mut out);
        out
    }

    /// An endless generator of matching strings.
    #[inline]
    #[must_use]
    pub fn generator(self) -> Generator {
        let label = format!("regex {}", self.pattern);
        let re = Rc::new(self);
        Generator::from_fn(label, move |seed| Value::Str(re.produce(seed)))
    }
}

impl fmt::Display for Regex {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// `\w{1,16}`, built directly.
#[inline]
#[must_use]
pub fn word() -> Regex {
    Regex::from_ast(
        r"\w{1,16}",
        Node::Group(vec![Node::Repeat {
            min: 1,
            max: Some(16),
            child: Box::new(Node::category(Category::Word, false)),
        }]),
    )
}

/// Depth-first evaluation, appending to `out`.
fn emit(node: &Node, seed: &mut Seed, out: &mut String) {
    match *node {
        Node::Literal(c) => out.push(c),
        Node::AnyChar => {
            let universe: Vec<char> = charset::universe().collect();
            let () = out.extend(charset::pick(seed, &universe));
        }
        Node::CharClass {
            ref members,
            negated: false,
        } => {
            if let Some(member) = seed.index(members.len()).and_then(|i| members.get(i)) {
                let () = out.push(member.draw(seed));
            }
        }
        Node::CharClass {
            ref members,
            negated: true,
        } => {
            let () = out.extend(charset::pick(seed, &charset::complement(members)));
        }
        Node::Repeat { min, max, ref child } => {
            let cap = max.map_or(UNBOUNDED_REPEAT_CAP, |max| max.min(UNBOUNDED_REPEAT_CAP));
            let count = seed.usize_in(min, cap.max(min));
            for _ in 0..count {
                let () = emit(child, seed, out);
            }
        }
        Node::Alternation(ref branches) => {
            if let Some(branch) = seed.index(branches.len()).and_then(|i| branches.get(i)) {
                let () = emit(branch, seed, out);
            }
        }
        Node::Group(ref children) => {
            for child in children {
                let () = emit(child, seed, out);
            }
        }
        Node::Anchor => {}
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Every production must be matched, in full, by an independent engine.
    fn round_trip(pattern: &str) {
        let re = Regex::new(pattern).unwrap();
        let oracle = ::regex::Regex::new(&format!("^(?:{pattern})$")).unwrap();
        let mut seed = Seed::new(u64::try_from(pattern.len()).unwrap());
        for _ in 0..1_000 {
            let s = re.produce(&mut seed);
            assert!(oracle.is_match(&s), "{s:?} does not match {pattern:?}");
        }
    }

    #[test]
    fn round_trips() {
        for pattern in [
            "",
            "abc",
            "a|b|cd",
            "a*b+c?",
            "x{3}y{2,5}z{0,}",
            r"\d\D\w\W\s\S",
            "[a-z0-9_]+",
            "[^a-z]{4}",
            r"[^\d\s]",
            "[x-]",
            ".{0,10}",
            "(ab|cd)*e",
            "(?:foo|bar){1,3}",
            "(?P<year>\\d{4})-(?P<month>\\d{2})",
            r"^\A[\x41-\x5A]{2}\.\\$",
            r"\t\n\r\f\v",
            "[\u{e9}-\u{ff}]{5}",
            r"(a|(b|(c|d)))+",
        ] {
            let () = round_trip(pattern);
        }
    }

    #[test]
    fn unbounded_repeats_are_capped() {
        let re = Regex::new("a*").unwrap();
        let mut seed = Seed::default();
        let longest = (0..1_000).map(|_| re.produce(&mut seed).len()).max().unwrap();
        assert!(longest <= UNBOUNDED_REPEAT_CAP);
        assert!(longest > 32, "longest was only {longest}");
    }

    #[test]
    fn large_minimum_is_honored() {
        let re = Regex::new("a{100}").unwrap();
        let mut seed = Seed::default();
        let () = pretty_assertions::assert_eq!(re.produce(&mut seed).len(), 100);
    }

    #[test]
    fn hand_built_word_matches_parsed() {
        let () = pretty_assertions::assert_eq!(word().ast(), Regex::new(r"\w{1,16}").unwrap().ast());
    }

    #[test]
    fn any_char_is_never_newline() {
        let re = Regex::new(".{64}").unwrap();
        let mut seed = Seed::default();
        for _ in 0..100 {
            assert!(!re.produce(&mut seed).contains('\n'));
        }
    }

    #[test]
    fn generator_produces_strings() {
        let g = Regex::new("[01]{8}").unwrap().generator();
        let mut seed = Seed::default();
        let v = g.produce(&mut seed).unwrap();
        let () = pretty_assertions::assert_eq!(v.as_str().map(str::len), Some(8));
    }
}
