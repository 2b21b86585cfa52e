//! Default generators for scalar and collection types,
//! and the registrations behind [`Registry::with_standard`].

use {
    crate::{
        arg::Arg,
        combinators,
        error::Error,
        generator::Generator,
        registry::{Registry, TypeTag},
        regex,
        seed::Seed,
        value::{Kind, Mapping, Value},
    },
    core::ops::RangeInclusive,
};

/// Default range of the registered `int` generator.
/// Kept within `i32` so sums and products of a few draws cannot overflow an `i64`.
#[expect(clippy::as_conversions, reason = "widening, and `From` is not `const`")]
pub const DEFAULT_INT: RangeInclusive<i64> = (i32::MIN as i64)..=(i32::MAX as i64);

/// Default magnitude bound of the registered `float` generator.
pub const DEFAULT_FLOAT: f64 = 2_147_483_648.0;

/// Default string length bounds.
pub const DEFAULT_STR_LENGTH: RangeInclusive<usize> = 1..=64;

/// Default collection length bounds.
pub const DEFAULT_COLLECTION_LENGTH: RangeInclusive<usize> = 0..=64;

/// Uniform integers in `min..=max`.
/// # Errors
/// If `min > max`.
#[inline]
pub fn int(min: i64, max: i64) -> Result<Generator, Error> {
    if min > max {
        return Err(Error::InvalidArgument(format!(
            "`int` bounds are reversed: {min} > {max}"
        )));
    }
    Ok(Generator::from_fn(format!("int {min}..={max}"), move |seed| {
        Value::Int(seed.int_in(min, max))
    }))
}

/// Uniform floats in `min..max` (or exactly `min` if the bounds coincide).
/// # Errors
/// If either bound is not finite or `min > max`.
#[inline]
pub fn float(min: f64, max: f64) -> Result<Generator, Error> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(Error::InvalidArgument(format!(
            "`float` needs finite, ordered bounds, but got {min:?} and {max:?}"
        )));
    }
    Ok(Generator::from_fn(format!("float {min:?}..{max:?}"), move |seed| {
        Value::Float(seed.unit().mul_add(max - min, min))
    }))
}

/// Fair booleans.
#[inline]
#[must_use]
pub fn boolean() -> Generator {
    Generator::from_fn("bool", |seed| Value::Bool(seed.prng_bool()))
}

/// Printable ASCII characters.
#[inline]
#[must_use]
pub fn character() -> Generator {
    Generator::from_fn("char", |seed| {
        let printable: Vec<char> = (' '..='~').collect();
        Value::Char(regex::charset::pick(seed, &printable).unwrap_or(' '))
    })
}

/// Always `()`.
#[inline]
#[must_use]
pub fn unit() -> Generator {
    Generator::constant(Value::Unit).labelled("unit")
}

fn check_lengths(what: &str, min_length: usize, max_length: usize) -> Result<(), Error> {
    if min_length > max_length {
        return Err(Error::InvalidArgument(format!(
            "`{what}` length bounds are reversed: {min_length} > {max_length}"
        )));
    }
    Ok(())
}

/// Strings whose characters come from `of`:
/// a generator of characters, codepoints or strings,
/// or a literal alphabet sampled uniformly.
/// Without `of`, characters are codepoints `0..=255`.
/// # Errors
/// If the length bounds are reversed, or `of` is an empty alphabet.
#[inline]
pub fn str_(
    registry: &Registry,
    of: Option<Arg>,
    min_length: usize,
    max_length: usize,
) -> Result<Generator, Error> {
    let () = check_lengths("str", min_length, max_length)?;
    let of = match of {
        None => int(0, 255)?,
        Some(arg) if registry.classify(&arg) => registry.resolve(&arg)?,
        Some(alphabet) => combinators::elements(registry, vec![alphabet])?,
    };
    Ok(Generator::new("str", move |seed| {
        let length = seed.usize_in(min_length, max_length);
        let mut acc = String::with_capacity(length);
        for _ in 0..length {
            let () = push_piece(&mut acc, of.produce(seed)?)?;
        }
        Ok(Value::Str(acc))
    }))
}

/// Append one drawn piece of a string.
fn push_piece(acc: &mut String, piece: Value) -> Result<(), Error> {
    match piece {
        Value::Char(c) => acc.push(c),
        Value::Str(ref s) => acc.push_str(s),
        Value::Int(i) => {
            let c = u32::try_from(i).ok().and_then(char::from_u32).ok_or_else(|| {
                Error::TypeMismatch {
                    expected: "a Unicode codepoint".to_owned(),
                    found: Kind::Int,
                    value: i.to_string(),
                }
            })?;
            let () = acc.push(c);
        }
        other @ (Value::Unit
        | Value::Bool(_)
        | Value::Float(_)
        | Value::List(_)
        | Value::Tuple(_)
        | Value::Map(_)) => {
            return Err(Error::TypeMismatch {
                expected: "a char, codepoint or str".to_owned(),
                found: other.kind(),
                value: other.to_string(),
            });
        }
    }
    Ok(())
}

/// Strings of arbitrary Unicode scalar values.
/// # Errors
/// If the length bounds are reversed.
#[inline]
pub fn unicode(min_length: usize, max_length: usize) -> Result<Generator, Error> {
    let () = check_lengths("unicode", min_length, max_length)?;
    Ok(Generator::from_fn("unicode", move |seed| {
        let length = seed.usize_in(min_length, max_length);
        Value::Str(
            (0..length)
                .map(|_| regex::charset::in_range(seed, '\0', char::MAX))
                .collect(),
        )
    }))
}

/// Fixed-arity tuples:
/// one element per positional generator,
/// or `n` elements from a single generator (positional or `of`).
/// # Errors
/// If `of` is given without `n`, if `of` and positionals are both given with `n`,
/// if `n` is given with no `of` and not exactly one positional,
/// or if any argument is not generator-like.
#[inline]
pub fn tuple_(
    registry: &Registry,
    args: Vec<Arg>,
    n: Option<usize>,
    of: Option<Arg>,
) -> Result<Generator, Error> {
    let Some(n) = n else {
        if of.is_some() {
            return Err(Error::InvalidArgument(
                "`tuple_` takes `of` only together with `n`".to_owned(),
            ));
        }
        let elements: Vec<Generator> = args
            .iter()
            .map(|a| registry.resolve(a))
            .collect::<Result<_, _>>()?;
        return Ok(Generator::new("tuple", move |seed| {
            elements
                .iter()
                .map(|g| g.produce(seed))
                .collect::<Result<_, _>>()
                .map(Value::Tuple)
        }));
    };
    let of = match (of, <[Arg; 1]>::try_from(args)) {
        (Some(_), Ok(_)) => {
            return Err(Error::AmbiguousInvocation(
                "more than one possible type for tuple elements".to_owned(),
            ));
        }
        (Some(_), Err(args)) if !args.is_empty() => {
            return Err(Error::AmbiguousInvocation(
                "more than one possible type for tuple elements".to_owned(),
            ));
        }
        (Some(of), Err(_)) | (None, Ok([of])) => registry.resolve(&of)?,
        (None, Err(_)) => {
            return Err(Error::InvalidArgument(
                "no/invalid type of tuple elements: give exactly one generator or `of`".to_owned(),
            ));
        }
    };
    Ok(Generator::new(format!("tuple of {n}"), move |seed| {
        of.samples(seed, n).map(Value::Tuple)
    }))
}

/// Pairs drawn from one generator.
/// # Errors
/// See [`tuple_`].
#[inline]
pub fn two(registry: &Registry, of: Arg) -> Result<Generator, Error> {
    tuple_(registry, vec![of], Some(2), None)
}

/// Triples drawn from one generator.
/// # Errors
/// See [`tuple_`].
#[inline]
pub fn three(registry: &Registry, of: Arg) -> Result<Generator, Error> {
    tuple_(registry, vec![of], Some(3), None)
}

/// Quadruples drawn from one generator.
/// # Errors
/// See [`tuple_`].
#[inline]
pub fn four(registry: &Registry, of: Arg) -> Result<Generator, Error> {
    tuple_(registry, vec![of], Some(4), None)
}

/// Lists whose elements come from a generator,
/// or are sampled uniformly from a literal collection.
/// # Errors
/// If the length bounds are reversed, or `of` is an empty or mixed collection.
#[inline]
pub fn list_(
    registry: &Registry,
    of: Arg,
    min_length: usize,
    max_length: usize,
) -> Result<Generator, Error> {
    let () = check_lengths("list", min_length, max_length)?;
    let of = if registry.classify(&of) {
        registry.resolve(&of)?
    } else {
        combinators::elements(registry, vec![of])?
    };
    Ok(Generator::new("list", move |seed| {
        let length = seed.usize_in(min_length, max_length);
        of.samples(seed, length).map(Value::List)
    }))
}

/// How [`dict_`] draws its entries.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct DictSpec {
    /// Draws each key.
    pub keys: Option<Arg>,
    /// Draws each value.
    pub values: Option<Arg>,
    /// Draws whole `(key, value)` pairs.
    pub items: Option<Arg>,
    /// Fewest entries drawn.
    pub min_length: usize,
    /// Most entries drawn.
    pub max_length: usize,
}

impl DictSpec {
    /// Keys and values drawn separately.
    #[inline]
    #[must_use]
    pub fn keys_values(keys: impl Into<Arg>, values: impl Into<Arg>) -> Self {
        Self {
            keys: Some(keys.into()),
            values: Some(values.into()),
            ..Self::default()
        }
    }

    /// Whole `(key, value)` pairs drawn together.
    #[inline]
    #[must_use]
    pub fn items(items: impl Into<Arg>) -> Self {
        Self {
            items: Some(items.into()),
            ..Self::default()
        }
    }

    /// Bound the number of entries drawn.
    #[inline]
    #[must_use]
    pub fn lengths(self, min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length,
            ..self
        }
    }
}

impl Default for DictSpec {
    #[inline]
    fn default() -> Self {
        Self {
            keys: None,
            values: None,
            items: None,
            min_length: *DEFAULT_COLLECTION_LENGTH.start(),
            max_length: *DEFAULT_COLLECTION_LENGTH.end(),
        }
    }
}

/// Source of one mapping entry.
enum Entries {
    Split(Generator, Generator),
    Paired(Generator),
}

impl Entries {
    fn draw(&self, seed: &mut Seed) -> Result<(Value, Value), Error> {
        match *self {
            Self::Split(ref keys, ref values) => Ok((keys.produce(seed)?, values.produce(seed)?)),
            Self::Paired(ref items) => {
                let item = items.produce(seed)?;
                let found = item.kind();
                let shown = item.to_string();
                match item {
                    Value::Tuple(pair) | Value::List(pair) => match <[Value; 2]>::try_from(pair) {
                        Ok([k, v]) => Ok((k, v)),
                        Err(_) => Err(not_a_pair(found, shown)),
                    },
                    Value::Unit
                    | Value::Bool(_)
                    | Value::Int(_)
                    | Value::Float(_)
                    | Value::Char(_)
                    | Value::Str(_)
                    | Value::Map(_) => Err(not_a_pair(found, shown)),
                }
            }
        }
    }
}

fn not_a_pair(found: Kind, value: String) -> Error {
    Error::TypeMismatch {
        expected: "a (key, value) pair".to_owned(),
        found,
        value,
    }
}

/// Mappings built from `keys` and `values` generators, or from an `items` generator of pairs.
/// Keys drawn twice keep their first position and their last value,
/// so a mapping may come out shorter than the drawn length.
/// # Errors
/// If both or neither forms are given, the length bounds are reversed,
/// or any argument is not generator-like.
#[inline]
pub fn dict_(registry: &Registry, spec: DictSpec) -> Result<Generator, Error> {
    let () = check_lengths("dict", spec.min_length, spec.max_length)?;
    let entries = match (spec.keys, spec.values, spec.items) {
        (Some(_), Some(_), Some(_)) => {
            return Err(Error::AmbiguousInvocation(
                "provide either keys and values, or items".to_owned(),
            ));
        }
        (Some(keys), Some(values), None) => {
            Entries::Split(registry.resolve(&keys)?, registry.resolve(&values)?)
        }
        (_, _, Some(items)) => Entries::Paired(registry.resolve(&items)?),
        (_, _, None) => {
            return Err(Error::InvalidArgument(
                "no generators for dictionary items provided".to_owned(),
            ));
        }
    };
    let (min_length, max_length) = (spec.min_length, spec.max_length);
    Ok(Generator::new("dict", move |seed| {
        let length = seed.usize_in(min_length, max_length);
        let mut acc = Mapping::new();
        for _ in 0..length {
            let (k, v) = entries.draw(seed)?;
            let _: Option<Value> = acc.insert(k, v);
        }
        Ok(Value::Map(acc))
    }))
}

/// Register a default generator for every standard type tag.
#[inline]
pub(crate) fn install(registry: &mut Registry) {
    let () = registry.register(TypeTag::UNIT, unit);
    let () = registry.register(TypeTag::BOOL, boolean);
    let () = registry.register(TypeTag::INT, || {
        Generator::from_fn("int", |seed| {
            Value::Int(seed.int_in(*DEFAULT_INT.start(), *DEFAULT_INT.end()))
        })
    });
    let () = registry.register(TypeTag::FLOAT, || {
        Generator::from_fn("float", |seed| {
            Value::Float(seed.unit().mul_add(2.0 * DEFAULT_FLOAT, -DEFAULT_FLOAT))
        })
    });
    let () = registry.register(TypeTag::CHAR, character);
    let () = registry.register(TypeTag::STR, || {
        Generator::from_fn("str", |seed| {
            let length = seed.usize_in(*DEFAULT_STR_LENGTH.start(), *DEFAULT_STR_LENGTH.end());
            Value::Str(
                (0..length)
                    .map(|_| regex::charset::in_range(seed, '\0', '\u{FF}'))
                    .collect(),
            )
        })
    });
    let () = registry.register(TypeTag::STR, || regex::word().generator());
    let () = registry.register(TypeTag::LIST, || {
        Generator::from_fn("list", |seed| {
            let length = seed.usize_in(
                *DEFAULT_COLLECTION_LENGTH.start(),
                *DEFAULT_COLLECTION_LENGTH.end(),
            );
            Value::List(
                (0..length)
                    .map(|_| Value::Int(seed.int_in(*DEFAULT_INT.start(), *DEFAULT_INT.end())))
                    .collect(),
            )
        })
    });
}

#[cfg(test)]
mod test {
    use {super::*, crate::args};

    #[test]
    fn ints_stay_in_bounds() {
        let g = int(-5, 5).unwrap();
        let mut seed = Seed::default();
        for v in g.samples(&mut seed, 1_000).unwrap() {
            assert!((-5..=5).contains(&v.as_int().unwrap()));
        }
        assert!(matches!(int(1, 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn floats_stay_in_bounds() {
        let g = float(-1.5, 2.5).unwrap();
        let mut seed = Seed::default();
        for v in g.samples(&mut seed, 1_000).unwrap() {
            let f = v.as_float().unwrap();
            assert!((-1.5..2.5).contains(&f), "{f}");
        }
        assert!(float(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn str_from_alphabet() {
        let registry = Registry::new();
        let g = str_(&registry, Some(Arg::from("ab")), 3, 3).unwrap();
        let mut seed = Seed::default();
        for v in g.samples(&mut seed, 100).unwrap() {
            let s = v.as_str().unwrap();
            let () = pretty_assertions::assert_eq!(s.chars().count(), 3);
            assert!(s.chars().all(|c| c == 'a' || c == 'b'), "{s}");
        }
    }

    #[test]
    fn str_from_codepoints_and_chars() {
        let registry = Registry::with_standard();
        let mut seed = Seed::default();
        let g = str_(&registry, Some(Arg::from(int(0x41, 0x43).unwrap())), 1, 8).unwrap();
        for v in g.samples(&mut seed, 100).unwrap() {
            assert!(v.as_str().unwrap().chars().all(|c| ('A'..='C').contains(&c)));
        }
        let g = str_(&registry, Some(Arg::Type(TypeTag::CHAR)), 0, 4).unwrap();
        for v in g.samples(&mut seed, 100).unwrap() {
            assert!(v.as_str().unwrap().chars().count() <= 4);
        }
        let default = str_(&registry, None, 1, 64).unwrap();
        for v in default.samples(&mut seed, 100).unwrap() {
            let s = v.as_str().unwrap();
            assert!((1..=64).contains(&s.chars().count()));
            assert!(s.chars().all(|c| u32::from(c) <= 255));
        }
    }

    #[test]
    fn str_rejects_bad_pieces() {
        let registry = Registry::with_standard();
        let g = str_(&registry, Some(Arg::Type(TypeTag::BOOL)), 1, 1).unwrap();
        let mut seed = Seed::default();
        assert!(matches!(g.produce(&mut seed), Err(Error::TypeMismatch { .. })));
        assert!(matches!(
            str_(&registry, Some(Arg::from("")), 1, 1),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn unicode_has_no_surrogates() {
        let g = unicode(0, 32).unwrap();
        let mut seed = Seed::default();
        for v in g.samples(&mut seed, 100).unwrap() {
            assert!(v.as_str().unwrap().chars().count() <= 32);
        }
    }

    #[test]
    fn tuples_keep_their_arity() {
        let registry = Registry::with_standard();
        let mut seed = Seed::default();
        let g = tuple_(&registry, args![TypeTag::INT, TypeTag::STR], None, None).unwrap();
        let v = g.produce(&mut seed).unwrap();
        let items = v.as_seq().unwrap();
        let () = pretty_assertions::assert_eq!(v.kind(), Kind::Tuple);
        let () = pretty_assertions::assert_eq!(items[0].kind(), Kind::Int);
        let () = pretty_assertions::assert_eq!(items[1].kind(), Kind::Str);
        for (g, arity) in [
            (two(&registry, Arg::Type(TypeTag::BOOL)).unwrap(), 2),
            (three(&registry, Arg::Type(TypeTag::BOOL)).unwrap(), 3),
            (four(&registry, Arg::Type(TypeTag::BOOL)).unwrap(), 4),
            (
                tuple_(&registry, vec![], Some(5), Some(Arg::Type(TypeTag::INT))).unwrap(),
                5,
            ),
        ] {
            let () = pretty_assertions::assert_eq!(g.produce(&mut seed).unwrap().as_seq().unwrap().len(), arity);
        }
    }

    #[test]
    fn tuple_invocation_errors() {
        let registry = Registry::with_standard();
        assert!(matches!(
            tuple_(&registry, args![TypeTag::INT], Some(2), Some(Arg::Type(TypeTag::STR))),
            Err(Error::AmbiguousInvocation(_))
        ));
        assert!(matches!(
            tuple_(&registry, args![TypeTag::INT, TypeTag::STR], Some(2), None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            tuple_(&registry, vec![], Some(2), None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            tuple_(&registry, vec![], None, Some(Arg::Type(TypeTag::STR))),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn lists_respect_length_bounds() {
        let registry = Registry::with_standard();
        let mut seed = Seed::default();
        let g = list_(&registry, Arg::Type(TypeTag::INT), 2, 5).unwrap();
        for v in g.samples(&mut seed, 200).unwrap() {
            assert!((2..=5).contains(&v.as_seq().unwrap().len()));
        }
        let literal = list_(&registry, Arg::from(vec![7, 8]), 3, 3).unwrap();
        for v in literal.samples(&mut seed, 100).unwrap() {
            assert!(v.as_seq().unwrap().iter().all(|x| *x == Value::Int(7) || *x == Value::Int(8)));
        }
        assert!(list_(&registry, Arg::Type(TypeTag::INT), 3, 2).is_err());
    }

    #[test]
    fn dicts_from_keys_and_values() {
        let registry = Registry::with_standard();
        let spec = DictSpec::keys_values(TypeTag::STR, TypeTag::BOOL).lengths(1, 8);
        let g = dict_(&registry, spec).unwrap();
        let mut seed = Seed::default();
        for v in g.samples(&mut seed, 100).unwrap() {
            let m = v.as_map().unwrap();
            assert!((1..=8).contains(&m.len()));
            assert!(m.iter().all(|&(ref k, ref v)| k.kind() == Kind::Str && v.kind() == Kind::Bool));
        }
    }

    #[test]
    fn dicts_from_items() {
        let registry = Registry::with_standard();
        let items = two(&registry, Arg::Type(TypeTag::INT)).unwrap();
        let g = dict_(&registry, DictSpec::items(items).lengths(0, 4)).unwrap();
        let mut seed = Seed::default();
        for v in g.samples(&mut seed, 100).unwrap() {
            assert!(v.as_map().unwrap().len() <= 4);
        }
        let bad = dict_(&registry, DictSpec::items(TypeTag::INT).lengths(1, 1)).unwrap();
        assert!(matches!(bad.produce(&mut seed), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn dict_invocation_errors() {
        let registry = Registry::with_standard();
        let mut both = DictSpec::keys_values(TypeTag::INT, TypeTag::INT);
        both.items = Some(Arg::Type(TypeTag::INT));
        assert!(matches!(dict_(&registry, both), Err(Error::AmbiguousInvocation(_))));
        assert!(matches!(
            dict_(&registry, DictSpec::default()),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn secondary_str_factory_is_word_regex() {
        let registry = Registry::with_standard();
        let factories = registry.factories(&TypeTag::STR);
        let () = pretty_assertions::assert_eq!(factories.len(), 2);
        let oracle = ::regex::Regex::new(r"^\w{1,16}$").unwrap();
        let secondary = factories[1]();
        let mut seed = Seed::default();
        for v in secondary.samples(&mut seed, 100).unwrap() {
            assert!(oracle.is_match(v.as_str().unwrap()));
        }
    }
}
