//! Parsed form of a pattern: built once, walked on every production.

/// One node of a parsed pattern.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Node {
    /// Exactly this character.
    Literal(char),
    /// `.`: any printable character except newline.
    AnyChar,
    /// `[...]`, or a bare category such as `\d`.
    CharClass {
        /// Alternatives, each drawn with equal probability.
        members: Vec<ClassMember>,
        /// `[^...]`: draw from everything the members exclude.
        negated: bool,
    },
    /// `max == None` means unbounded.
    Repeat {
        /// Fewest repetitions.
        min: usize,
        /// Most repetitions, if bounded.
        max: Option<usize>,
        /// What is repeated.
        child: Box<Node>,
    },
    /// `a|b`: exactly one branch.
    Alternation(Vec<Node>),
    /// A sequence, evaluated in order.
    Group(Vec<Node>),
    /// `^`, `$`, `\A`, `\z`: matches the empty string.
    Anchor,
}

/// One entry of a character class.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ClassMember {
    /// A single character.
    Char(char),
    /// Inclusive on both ends.
    Range(char, char),
    /// `\d`, `\w`, `\s`, or (if negated) `\D`, `\W`, `\S`.
    Category(Category, bool),
}

/// A predefined character set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Category {
    /// `\d`: `0-9`.
    Digit,
    /// `\w`: `[A-Za-z0-9_]`.
    Word,
    /// `\s`: space, tab, and line/page breaks.
    Space,
}

impl Node {
    /// A class consisting of exactly one category, as `\d` outside brackets.
    #[inline]
    #[must_use]
    pub fn category(category: Category, negated: bool) -> Self {
        Self::CharClass {
            members: vec![ClassMember::Category(category, negated)],
            negated: false,
        }
    }
}
