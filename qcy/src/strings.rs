//! String-domain generators, each a fixed pattern fed through [`Regex`].

use crate::{error::Error, generator::Generator, regex::Regex};

const EMAIL: &str = r"[a-z0-9._%+-]{1,16}@[a-z0-9-]{1,12}(\.[a-z0-9-]{1,8}){0,2}\.[a-z]{2,6}";
const OCTET: &str = r"(25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)";
const PATH: &str = r"(/[\w.-]{1,16}){1,8}";
const UUID: &str = "[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}";

/// Strings matching `pattern` in full.
/// # Errors
/// If `pattern` is malformed or unsupported.
#[inline]
pub fn regex(pattern: &str) -> Result<Generator, Error> {
    Regex::new(pattern).map(Regex::generator)
}

/// Plausible e-mail addresses.
#[inline]
#[must_use]
pub fn email() -> Generator {
    fixed(EMAIL, "email")
}

/// Dotted-quad IPv4 addresses, each octet in `0..=255` without leading zeros.
#[inline]
#[must_use]
pub fn ipv4() -> Generator {
    fixed(&format!(r"{OCTET}(\.{OCTET}){{3}}"), "ipv4")
}

/// Absolute Unix-style paths.
#[inline]
#[must_use]
pub fn path() -> Generator {
    fixed(PATH, "path")
}

/// Lowercase version-4 UUIDs.
#[inline]
#[must_use]
pub fn uuid() -> Generator {
    fixed(UUID, "uuid")
}

/// A generator from a pattern known to parse.
fn fixed(pattern: &str, label: &'static str) -> Generator {
    match Regex::new(pattern) {
        Ok(re) => re.generator().labelled(label),
        // Unreachable for the patterns above, which the tests parse.
        Err(e) => Generator::new(label, move |_| {
            Err(Error::InvalidArgument(format!("`{label}` pattern is broken: {e}")))
        }),
    }
}

#[cfg(test)]
mod test {
    use {super::*, crate::seed::Seed};

    fn all_match(generator: &Generator, oracle: &str) {
        let oracle = ::regex::Regex::new(&format!("^(?:{oracle})$")).unwrap();
        let mut seed = Seed::default();
        for v in generator.samples(&mut seed, 1_000).unwrap() {
            let s = v.as_str().unwrap();
            assert!(oracle.is_match(s), "{s:?} does not match {oracle}");
        }
    }

    #[test]
    fn emails_look_like_emails() {
        let () = all_match(&email(), EMAIL);
        let mut seed = Seed::default();
        let s = email().produce(&mut seed).unwrap();
        let () = pretty_assertions::assert_eq!(s.as_str().map(|s| s.matches('@').count()), Some(1));
    }

    #[test]
    fn ipv4_octets_are_bytes() {
        let mut seed = Seed::default();
        for v in ipv4().samples(&mut seed, 1_000).unwrap() {
            let s = v.as_str().unwrap();
            let octets: Vec<&str> = s.split('.').collect();
            let () = pretty_assertions::assert_eq!(octets.len(), 4, "{s}");
            for octet in octets {
                assert!(octet.parse::<u8>().is_ok(), "{octet} in {s} is not a byte");
                assert!(octet == "0" || !octet.starts_with('0'), "{octet} has a leading zero");
            }
        }
    }

    #[test]
    fn paths_are_absolute() {
        let () = all_match(&path(), PATH);
        let mut seed = Seed::default();
        for v in path().samples(&mut seed, 100).unwrap() {
            assert!(v.as_str().unwrap().starts_with('/'));
        }
    }

    #[test]
    fn uuids_are_version_four() {
        let () = all_match(&uuid(), UUID);
        let mut seed = Seed::default();
        let v = uuid().produce(&mut seed).unwrap();
        let () = pretty_assertions::assert_eq!(v.as_str().and_then(|s| s.chars().nth(14)), Some('4'));
    }

    #[test]
    fn custom_patterns() {
        let () = all_match(&regex("[A-Z]{3}-[0-9]{2,4}").unwrap(), "[A-Z]{3}-[0-9]{2,4}");
        assert!(matches!(regex("(?=x)"), Err(Error::UnsupportedPattern { .. })));
    }
}
