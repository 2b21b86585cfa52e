//! Fixed character sets the interpreter draws from.
//!
//! Everything is drawn from a printable universe (ASCII `0x20..=0x7E` plus tab)
//! so that `.` and negated classes never produce a newline.

use {
    super::ast::{Category, ClassMember},
    crate::seed::Seed,
};

const SPACE: [char; 6] = [' ', '\t', '\n', '\r', '\x0B', '\x0C'];

/// The printable universe, in a fixed order.
#[inline]
pub fn universe() -> impl Iterator<Item = char> {
    ['\t'].into_iter().chain(' '..='~')
}

impl Category {
    /// Whether `c` belongs to this category.
    #[inline]
    #[must_use]
    pub fn contains(self, c: char) -> bool {
        match self {
            Self::Digit => c.is_ascii_digit(),
            Self::Word => c.is_ascii_alphanumeric() || c == '_',
            Self::Space => SPACE.contains(&c),
        }
    }

    /// Every member, in a fixed order.
    #[inline]
    #[must_use]
    pub fn members(self) -> Vec<char> {
        match self {
            Self::Digit => ('0'..='9').collect(),
            Self::Word => ('0'..='9')
                .chain('A'..='Z')
                .chain(['_'])
                .chain('a'..='z')
                .collect(),
            Self::Space => SPACE.to_vec(),
        }
    }
}

impl ClassMember {
    /// Whether `c` is matched by this class member.
    #[inline]
    #[must_use]
    pub fn matches(self, c: char) -> bool {
        match self {
            Self::Char(m) => m == c,
            Self::Range(lo, hi) => (lo..=hi).contains(&c),
            Self::Category(category, negated) => category.contains(c) != negated,
        }
    }

    /// Draw one character this member matches.
    #[inline]
    pub fn draw(self, seed: &mut Seed) -> char {
        match self {
            Self::Char(c) => c,
            Self::Range(lo, hi) => in_range(seed, lo, hi),
            Self::Category(category, false) => pick(seed, &category.members()).unwrap_or(' '),
            Self::Category(category, true) => {
                pick(seed, &complement(&[Self::Category(category, false)])).unwrap_or(' ')
            }
        }
    }
}

/// The printable characters matched by none of `members`.
#[inline]
#[must_use]
pub fn complement(members: &[ClassMember]) -> Vec<char> {
    universe()
        .filter(|&c| !members.iter().any(|m| m.matches(c)))
        .collect()
}

/// Uniform choice, or `None` if there is nothing to choose from.
#[inline]
pub fn pick(seed: &mut Seed, chars: &[char]) -> Option<char> {
    seed.index(chars.len()).and_then(|i| chars.get(i).copied())
}

/// Uniform codepoint in `lo..=hi`, skipping the surrogate gap.
#[inline]
pub fn in_range(seed: &mut Seed, lo: char, hi: char) -> char {
    const GAP_START: u32 = 0xD800;
    const GAP_LEN: u32 = 0x800;
    let (lo_u, hi_u) = (u32::from(lo), u32::from(hi));
    let gap = if lo_u < GAP_START && hi_u >= GAP_START { GAP_LEN } else { 0 };
    let drawn = seed.int_in(i64::from(lo_u), i64::from(hi_u.saturating_sub(gap)));
    u32::try_from(drawn)
        .ok()
        .map(|cp| if cp >= GAP_START { cp.saturating_add(gap) } else { cp })
        .and_then(char::from_u32)
        .unwrap_or(lo)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn universe_is_printable_without_newline() {
        let all: Vec<char> = universe().collect();
        let () = pretty_assertions::assert_eq!(all.len(), 96);
        assert!(!all.contains(&'\n'));
        assert!(all.contains(&'\t'));
        assert!(all.contains(&'~'));
    }

    #[test]
    fn categories_agree_with_their_members() {
        for category in [Category::Digit, Category::Word, Category::Space] {
            for c in category.members() {
                assert!(category.contains(c), "{c:?} not in {category:?}");
            }
        }
        let () = pretty_assertions::assert_eq!(Category::Word.members().len(), 63);
    }

    #[test]
    fn complement_of_word_is_punctuation_and_space() {
        let rest = complement(&[ClassMember::Category(Category::Word, false)]);
        let () = pretty_assertions::assert_eq!(rest.len(), 96 - 63);
        assert!(rest.iter().all(|&c| !Category::Word.contains(c)));
    }

    #[test]
    fn ranges_skip_surrogates() {
        let mut seed = Seed::default();
        for _ in 0..1_000 {
            let c = in_range(&mut seed, '\u{D7FF}', '\u{E000}');
            assert!(c == '\u{D7FF}' || c == '\u{E000}');
        }
    }
}
