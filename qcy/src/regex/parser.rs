//! Recursive-descent parser from pattern text to [`Node`]s.
//!
//! Anything that cannot be generated from faithfully
//! (backreferences, lookaround, boundaries, inline flags, lazy quantifiers, ...)
//! is rejected with [`Error::UnsupportedPattern`] rather than approximated.

use {
    super::ast::{Category, ClassMember, Node},
    crate::error::Error,
};

/// Parse a whole pattern.
/// # Errors
/// If the pattern is malformed or uses an unsupported construct.
#[inline]
pub fn parse(pattern: &str) -> Result<Node, Error> {
    let mut parser = Parser {
        pattern,
        chars: pattern.char_indices().collect(),
        pos: 0,
    };
    let root = parser.alternation()?;
    if parser.peek().is_some() {
        return Err(parser.invalid("unbalanced parenthesis"));
    }
    Ok(root)
}

struct Parser<'p> {
    pattern: &'p str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

/// A quantifier, before it is attached to what it repeats.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Quantifier {
    min: usize,
    max: Option<usize>,
    /// Characters the quantifier spans.
    width: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos.saturating_add(ahead)).map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos = self.pos.saturating_add(1);
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos = self.pos.saturating_add(1);
            true
        } else {
            false
        }
    }

    fn looking_at(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
    }

    /// Byte offset of the character at `pos`.
    fn offset_of(&self, pos: usize) -> usize {
        self.chars.get(pos).map_or(self.pattern.len(), |&(offset, _)| offset)
    }

    fn invalid_at(&self, pos: usize, reason: &str) -> Error {
        Error::InvalidPattern {
            pattern: self.pattern.to_owned(),
            offset: self.offset_of(pos),
            reason: reason.to_owned(),
        }
    }

    fn invalid(&self, reason: &str) -> Error {
        self.invalid_at(self.pos, reason)
    }

    fn unsupported(&self, construct: &str) -> Error {
        Error::UnsupportedPattern {
            pattern: self.pattern.to_owned(),
            construct: construct.to_owned(),
        }
    }

    /// `branch ( '|' branch )*`
    fn alternation(&mut self) -> Result<Node, Error> {
        let mut branches = vec![self.sequence()?];
        while self.eat('|') {
            let () = branches.push(self.sequence()?);
        }
        Ok(if branches.len() == 1 {
            branches.pop().unwrap_or(Node::Group(vec![]))
        } else {
            Node::Alternation(branches)
        })
    }

    /// `( atom quantifier? )*`, up to `|`, `)` or the end.
    fn sequence(&mut self) -> Result<Node, Error> {
        let mut children = vec![];
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            let atom = self.atom()?;
            let () = children.push(self.quantified(atom)?);
        }
        Ok(Node::Group(children))
    }

    fn quantified(&mut self, atom: Node) -> Result<Node, Error> {
        let start = self.pos;
        let Some(quantifier) = self.quantifier()? else {
            return Ok(atom);
        };
        if atom == Node::Anchor {
            return Err(self.invalid_at(start, "nothing to repeat"));
        }
        self.pos = self.pos.saturating_add(quantifier.width);
        match self.peek() {
            Some('?') => return Err(self.unsupported("lazy quantifier")),
            Some('+') => return Err(self.unsupported("possessive quantifier")),
            _ => {}
        }
        if self.quantifier()?.is_some() {
            return Err(self.invalid("multiple repeat"));
        }
        Ok(Node::Repeat {
            min: quantifier.min,
            max: quantifier.max,
            child: Box::new(atom),
        })
    }

    /// Recognize (without consuming) a quantifier at the current position.
    /// A `{` that does not form a valid quantifier is not one.
    fn quantifier(&self) -> Result<Option<Quantifier>, Error> {
        Ok(match self.peek() {
            Some('*') => Some(Quantifier { min: 0, max: None, width: 1 }),
            Some('+') => Some(Quantifier { min: 1, max: None, width: 1 }),
            Some('?') => Some(Quantifier { min: 0, max: Some(1), width: 1 }),
            Some('{') => self.braces()?,
            _ => None,
        })
    }

    /// `{n}`, `{n,}`, `{n,m}` or `{,m}`.
    fn braces(&self) -> Result<Option<Quantifier>, Error> {
        let mut ahead = 1;
        let min = self.digits(&mut ahead)?;
        let max = if self.peek_at(ahead) == Some(',') {
            ahead = ahead.saturating_add(1);
            self.digits(&mut ahead)?
        } else if min.is_some() {
            min
        } else {
            return Ok(None);
        };
        if self.peek_at(ahead) != Some('}') || (min.is_none() && max.is_none() && ahead == 2) {
            return Ok(None);
        }
        let min = min.unwrap_or(0);
        if max.is_some_and(|max| max < min) {
            return Err(self.invalid("min repeat greater than max repeat"));
        }
        Ok(Some(Quantifier {
            min,
            max,
            width: ahead.saturating_add(1),
        }))
    }

    /// Decimal digits starting `ahead` characters from here, advancing `ahead` past them.
    fn digits(&self, ahead: &mut usize) -> Result<Option<usize>, Error> {
        let mut acc: Option<usize> = None;
        while let Some(d) = self.peek_at(*ahead).and_then(|c| c.to_digit(10)) {
            let d = usize::try_from(d).map_err(|_| self.invalid("repeat count too large"))?;
            acc = Some(
                acc.unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(d))
                    .ok_or_else(|| self.invalid("repeat count too large"))?,
            );
            *ahead = ahead.saturating_add(1);
        }
        Ok(acc)
    }

    fn atom(&mut self) -> Result<Node, Error> {
        let start = self.pos;
        let Some(c) = self.bump() else {
            return Err(self.invalid("unexpected end of pattern"));
        };
        match c {
            '(' => self.group(start),
            '[' => self.class(start),
            '.' => Ok(Node::AnyChar),
            '^' | '$' => Ok(Node::Anchor),
            '\\' => self.escape(),
            '*' | '+' | '?' => Err(self.invalid_at(start, "nothing to repeat")),
            '{' => {
                self.pos = start;
                if self.braces()?.is_some() {
                    Err(self.invalid_at(start, "nothing to repeat"))
                } else {
                    self.pos = start.saturating_add(1);
                    Ok(Node::Literal('{'))
                }
            }
            other => Ok(Node::Literal(other)),
        }
    }

    /// After `(`.
    fn group(&mut self, start: usize) -> Result<Node, Error> {
        if self.eat('?') {
            if self.eat(':') {
                // non-capturing
            } else if self.looking_at("P<") || (self.peek() == Some('<') && !self.looking_at("<=") && !self.looking_at("<!")) {
                let _: bool = self.eat('P');
                let _: bool = self.eat('<');
                self.group_name()?;
            } else if self.looking_at("P=") {
                return Err(self.unsupported("named backreference"));
            } else if self.looking_at("=") || self.looking_at("!") {
                return Err(self.unsupported("lookahead"));
            } else if self.looking_at("<=") || self.looking_at("<!") {
                return Err(self.unsupported("lookbehind"));
            } else if self.looking_at("#") {
                return Err(self.unsupported("comment group"));
            } else if self.peek().is_some_and(|c| "aiLmsux-".contains(c)) {
                return Err(self.unsupported("inline flags"));
            } else {
                return Err(self.invalid("unknown extension"));
            }
        }
        let inner = self.alternation()?;
        if !self.eat(')') {
            return Err(self.invalid_at(start, "missing ), unterminated subpattern"));
        }
        Ok(inner)
    }

    /// Skip `name>`.
    fn group_name(&mut self) -> Result<(), Error> {
        let start = self.pos;
        while let Some(c) = self.bump() {
            if c == '>' {
                return if self.pos.saturating_sub(start) > 1 {
                    Ok(())
                } else {
                    Err(self.invalid_at(start, "missing group name"))
                };
            }
            if !(c.is_alphanumeric() || c == '_') {
                return Err(self.invalid_at(start, "bad character in group name"));
            }
        }
        Err(self.invalid_at(start, "missing >, unterminated name"))
    }

    /// After `\` outside brackets.
    fn escape(&mut self) -> Result<Node, Error> {
        let start = self.pos.saturating_sub(1);
        let Some(c) = self.bump() else {
            return Err(self.invalid_at(start, "bad escape (end of pattern)"));
        };
        match c {
            'A' | 'z' | 'Z' => Ok(Node::Anchor),
            'b' | 'B' => Err(self.unsupported("word boundary")),
            _ => Ok(match self.escaped_member(c, start)? {
                ClassMember::Category(category, negated) => Node::category(category, negated),
                ClassMember::Char(c) | ClassMember::Range(c, _) => Node::Literal(c),
            }),
        }
    }

    /// Escapes valid both inside and outside brackets, after `\c`.
    fn escaped_member(&mut self, c: char, start: usize) -> Result<ClassMember, Error> {
        Ok(ClassMember::Char(match c {
            'd' => return Ok(ClassMember::Category(Category::Digit, false)),
            'D' => return Ok(ClassMember::Category(Category::Digit, true)),
            'w' => return Ok(ClassMember::Category(Category::Word, false)),
            'W' => return Ok(ClassMember::Category(Category::Word, true)),
            's' => return Ok(ClassMember::Category(Category::Space, false)),
            'S' => return Ok(ClassMember::Category(Category::Space, true)),
            '1'..='9' => return Err(self.unsupported("backreference")),
            '0' => return Err(self.unsupported("octal escape")),
            'p' | 'P' => return Err(self.unsupported("unicode property class")),
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'f' => '\x0C',
            'v' => '\x0B',
            'a' => '\x07',
            'x' => self.hex(start, 2)?,
            'u' => self.hex(start, 4)?,
            other if other.is_ascii_alphanumeric() => {
                return Err(self.invalid_at(start, &format!("bad escape \\{other}")));
            }
            other => other,
        }))
    }

    /// Either `{hex digits}` or exactly `width` hex digits.
    fn hex(&mut self, start: usize, width: usize) -> Result<char, Error> {
        let digits: String = if self.eat('{') {
            let mut acc = String::new();
            loop {
                match self.bump() {
                    Some('}') => break acc,
                    Some(c) if c.is_ascii_hexdigit() => acc.push(c),
                    _ => return Err(self.invalid_at(start, "bad hex escape")),
                }
            }
        } else {
            let mut acc = String::new();
            for _ in 0..width {
                match self.bump() {
                    Some(c) if c.is_ascii_hexdigit() => acc.push(c),
                    _ => return Err(self.invalid_at(start, "bad hex escape")),
                }
            }
            acc
        };
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.invalid_at(start, "escape is not a valid codepoint"))
    }

    /// After `[`.
    fn class(&mut self, start: usize) -> Result<Node, Error> {
        let negated = self.eat('^');
        let mut members = vec![];
        // A leading `]` is a literal.
        if self.eat(']') {
            let () = members.push(ClassMember::Char(']'));
        }
        loop {
            let member_start = self.pos;
            let Some(c) = self.bump() else {
                return Err(self.invalid_at(start, "unterminated character set"));
            };
            let member = match c {
                ']' => break,
                '[' if self.peek() == Some(':') => return Err(self.unsupported("POSIX class")),
                '[' => return Err(self.unsupported("nested set")),
                '&' | '-' | '~' if self.peek() == Some(c) => {
                    return Err(self.unsupported("set operation"));
                }
                '\\' => self.class_escape(member_start)?,
                other => ClassMember::Char(other),
            };
            if self.peek() == Some('-') && self.peek_at(1).is_some_and(|next| next != ']') {
                if self.peek_at(1) == Some('-') {
                    return Err(self.unsupported("set operation"));
                }
                self.pos = self.pos.saturating_add(1);
                let hi_start = self.pos;
                let hi = match self.bump() {
                    Some('\\') => self.class_escape(hi_start)?,
                    Some('[') => return Err(self.unsupported("nested set")),
                    Some(other) => ClassMember::Char(other),
                    None => return Err(self.invalid_at(start, "unterminated character set")),
                };
                let (ClassMember::Char(lo), ClassMember::Char(hi)) = (member, hi) else {
                    return Err(self.invalid_at(member_start, "bad character range"));
                };
                if hi < lo {
                    return Err(self.invalid_at(member_start, "bad character range"));
                }
                let () = members.push(ClassMember::Range(lo, hi));
            } else {
                let () = members.push(member);
            }
        }
        if negated && super::charset::complement(&members).is_empty() {
            return Err(self.unsupported("negated class excluding every printable character"));
        }
        Ok(Node::CharClass { members, negated })
    }

    /// After `\` inside brackets.
    fn class_escape(&mut self, start: usize) -> Result<ClassMember, Error> {
        let Some(c) = self.bump() else {
            return Err(self.invalid_at(start, "unterminated character set"));
        };
        match c {
            'b' => Err(self.unsupported("backspace escape in class")),
            'A' | 'z' | 'Z' | 'B' => Err(self.invalid_at(start, &format!("bad escape \\{c}"))),
            _ => self.escaped_member(c, start),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lit(s: &str) -> Vec<Node> {
        s.chars().map(Node::Literal).collect()
    }

    #[test]
    fn sequence_of_literals() {
        let () = pretty_assertions::assert_eq!(parse("abc").unwrap(), Node::Group(lit("abc")));
    }

    #[test]
    fn alternation_of_groups() {
        let () = pretty_assertions::assert_eq!(
            parse("ab|c").unwrap(),
            Node::Alternation(vec![Node::Group(lit("ab")), Node::Group(lit("c"))]),
        );
    }

    #[test]
    fn quantifiers() {
        let () = pretty_assertions::assert_eq!(
            parse("a{2,5}b*c{3}d{2,}").unwrap(),
            Node::Group(vec![
                Node::Repeat { min: 2, max: Some(5), child: Box::new(Node::Literal('a')) },
                Node::Repeat { min: 0, max: None, child: Box::new(Node::Literal('b')) },
                Node::Repeat { min: 3, max: Some(3), child: Box::new(Node::Literal('c')) },
                Node::Repeat { min: 2, max: None, child: Box::new(Node::Literal('d')) },
            ]),
        );
    }

    #[test]
    fn brace_without_quantifier_is_literal() {
        let () = pretty_assertions::assert_eq!(parse("a{x").unwrap(), Node::Group(lit("a{x")));
        let () = pretty_assertions::assert_eq!(parse("{").unwrap(), Node::Group(lit("{")));
    }

    #[test]
    fn classes() {
        let () = pretty_assertions::assert_eq!(
            parse(r"[^a-c\d_]").unwrap(),
            Node::Group(vec![Node::CharClass {
                members: vec![
                    ClassMember::Range('a', 'c'),
                    ClassMember::Category(Category::Digit, false),
                    ClassMember::Char('_'),
                ],
                negated: true,
            }]),
        );
        let () = pretty_assertions::assert_eq!(
            parse("[]-]").unwrap(),
            Node::Group(vec![Node::CharClass {
                members: vec![ClassMember::Char(']'), ClassMember::Char('-')],
                negated: false,
            }]),
        );
    }

    #[test]
    fn named_groups_are_plain_groups() {
        let () = pretty_assertions::assert_eq!(parse("(?P<x>ab)").unwrap(), parse("(ab)").unwrap());
        let () = pretty_assertions::assert_eq!(parse("(?<x>ab)").unwrap(), parse("(?:ab)").unwrap());
    }

    #[test]
    fn escapes() {
        let () = pretty_assertions::assert_eq!(
            parse(r"\.\\\n\x41\u{263A}").unwrap(),
            Node::Group(lit(".\\\nA\u{263A}")),
        );
    }

    #[test]
    fn unsupported_constructs() {
        for pattern in [
            r"(a)\1", "(?=a)", "(?!a)", "(?<=a)b", "(?<!a)b", r"\bword", r"\B", "(?i)a", "a*?",
            "a+?", "a??", "a{2}?", "a*+", "(?P=x)", r"\p{L}", "[[:alpha:]]", "[a&&b]", "(?#c)",
        ] {
            assert!(
                matches!(parse(pattern), Err(Error::UnsupportedPattern { .. })),
                "{pattern:?} should be unsupported",
            );
        }
    }

    #[test]
    fn invalid_patterns() {
        for (pattern, offset) in [
            ("(a", 0),
            ("a)", 1),
            ("*a", 0),
            ("a**", 2),
            ("a{3,2}", 1),
            ("[z-a]", 1),
            (r"[\d-z]", 1),
            ("[abc", 0),
            (r"\q", 0),
            ("a\\", 1),
        ] {
            match parse(pattern) {
                Err(Error::InvalidPattern { offset: found, .. }) => {
                    let () = pretty_assertions::assert_eq!(found, offset, "offset in {pattern:?}");
                }
                other => panic!("{pattern:?} should be invalid, got {other:?}"),
            }
        }
    }
}
