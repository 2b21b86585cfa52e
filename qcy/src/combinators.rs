//! Generators built out of other generators and values.
//!
//! `elements`, `one_of` and `frequency` accept either several positional
//! arguments or one collection holding them (see [`normalize`]).

use {
    crate::{
        arg::{Arg, normalize},
        error::Error,
        generator::Generator,
        registry::Registry,
        seed::Seed,
        value::{Bindings, Mapping, Value},
    },
    core::num::NonZero,
    std::rc::Rc,
};

/// Pick uniformly among literal values.
/// # Errors
/// If there are none, or any of them is a generator.
#[inline]
pub fn elements(registry: &Registry, args: Vec<Arg>) -> Result<Generator, Error> {
    let values: Vec<Value> = normalize(registry, args)?
        .into_iter()
        .map(|a| a.into_literal(registry))
        .collect::<Result<_, _>>()?;
    let len = NonZero::new(values.len())
        .ok_or_else(|| Error::InvalidArgument("`elements` needs at least one value".to_owned()))?;
    Ok(Generator::new("elements", move |seed| {
        let i = seed.below(len);
        values
            .get(i)
            .cloned()
            .ok_or_else(|| Error::InvalidArgument(format!("`elements` index {i} out of range")))
    }))
}

/// Pick a generator uniformly, then draw once from it.
/// # Errors
/// If there are none, or any argument is not generator-like.
#[inline]
pub fn one_of(registry: &Registry, args: Vec<Arg>) -> Result<Generator, Error> {
    let generators: Vec<Generator> = normalize(registry, args)?
        .iter()
        .map(|a| registry.resolve(a))
        .collect::<Result<_, _>>()?;
    let len = NonZero::new(generators.len())
        .ok_or_else(|| Error::InvalidArgument("`one_of` needs at least one generator".to_owned()))?;
    Ok(Generator::new("one_of", move |seed| {
        let i = seed.below(len);
        generators
            .get(i)
            .ok_or_else(|| Error::InvalidArgument(format!("`one_of` index {i} out of range")))?
            .produce(seed)
    }))
}

/// Pick a generator with probability proportional to its weight, then draw once from it.
/// Every argument is a `(weight, generator)` pair.
/// # Errors
/// If there are no pairs, a pair is malformed, a weight is negative,
/// or all weights are zero.
#[inline]
pub fn frequency(registry: &Registry, args: Vec<Arg>) -> Result<Generator, Error> {
    // A lone pair is one weighted option; a lone collection of pairs is spread.
    let args = match <[Arg; 1]>::try_from(args) {
        Ok([pair]) if is_pair(&pair) => vec![pair],
        Ok([lone]) => normalize(registry, vec![lone])?,
        Err(args) => normalize(registry, args)?,
    };
    if args.is_empty() {
        return Err(Error::InvalidArgument(
            "`frequency` needs at least one weighted generator".to_owned(),
        ));
    }
    let mut total: u64 = 0;
    let mut buckets: Vec<(u64, Generator)> = Vec::with_capacity(args.len());
    for arg in args {
        let (weight, generator) = weighted(registry, arg)?;
        total = total
            .checked_add(weight)
            .ok_or_else(|| Error::InvalidArgument("`frequency` weights overflow".to_owned()))?;
        let () = buckets.push((total, generator));
    }
    if total == 0 {
        return Err(Error::InvalidArgument(
            "`frequency` weights sum to zero".to_owned(),
        ));
    }
    Ok(Generator::new("frequency", move |seed| {
        let threshold = pick(seed, total);
        buckets
            .iter()
            .find(|&&(cumulative, _)| threshold < cumulative)
            .or_else(|| buckets.last())
            .ok_or_else(|| Error::InvalidArgument("`frequency` has no buckets".to_owned()))?
            .1
            .produce(seed)
    }))
}

/// A tuple led by an integer weight.
fn is_pair(arg: &Arg) -> bool {
    match *arg {
        Arg::Tuple(ref items) => matches!(items.first(), Some(&Arg::Literal(Value::Int(_)))),
        Arg::Generator(_)
        | Arg::Producer(_)
        | Arg::Type(_)
        | Arg::Literal(_)
        | Arg::List(_)
        | Arg::Map(_) => false,
    }
}

/// `floor(unit * total)`, clamped into `0..total`.
#[expect(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    reason = "the product lies in `0..total`"
)]
fn pick(seed: &mut Seed, total: u64) -> u64 {
    let scaled = (seed.unit() * total as f64).floor() as u64;
    scaled.min(total.saturating_sub(1))
}

/// Split one `frequency` argument into its weight and generator.
fn weighted(registry: &Registry, arg: Arg) -> Result<(u64, Generator), Error> {
    let shown = arg.to_string();
    let (Arg::Tuple(pair) | Arg::List(pair)) = arg else {
        return Err(Error::InvalidArgument(format!(
            "`frequency` expects `(weight, generator)` pairs, but got {shown}"
        )));
    };
    let Ok([weight, generator]) = <[Arg; 2]>::try_from(pair) else {
        return Err(Error::InvalidArgument(format!(
            "`frequency` expects `(weight, generator)` pairs, but got {shown}"
        )));
    };
    let weight = match weight {
        Arg::Literal(Value::Int(weight)) => weight,
        other @ (Arg::Generator(_)
        | Arg::Producer(_)
        | Arg::Type(_)
        | Arg::Literal(_)
        | Arg::List(_)
        | Arg::Tuple(_)
        | Arg::Map(_)) => {
            return Err(Error::InvalidArgument(format!(
                "`frequency` weight must be an integer, but got {other}"
            )));
        }
    };
    let weight = u64::try_from(weight).map_err(|_| {
        Error::InvalidArgument(format!("`frequency` weight must be non-negative, but got {weight}"))
    })?;
    Ok((weight, registry.resolve(&generator)?))
}

/// Apply `func` to fresh draws from every argument generator.
/// Every production redraws every argument.
/// # Errors
/// If any argument is not generator-like.
#[inline]
pub fn apply<F: Fn(&[Value], &Bindings) -> Value + 'static>(
    registry: &Registry,
    func: F,
    args: Vec<Arg>,
    kwargs: Vec<(String, Arg)>,
) -> Result<Generator, Error> {
    let positional: Vec<Generator> = args
        .iter()
        .map(|a| registry.resolve(a))
        .collect::<Result<_, _>>()?;
    let keyword: Vec<(String, Generator)> = kwargs
        .into_iter()
        .map(|(name, a)| Ok((name, registry.resolve(&a)?)))
        .collect::<Result<_, Error>>()?;
    Ok(Generator::new("apply", move |seed| {
        let values: Vec<Value> = positional
            .iter()
            .map(|g| g.produce(seed))
            .collect::<Result<_, _>>()?;
        let mut named = Bindings::new();
        for &(ref name, ref g) in &keyword {
            let _: Option<Value> = named.insert(name.as_str(), g.produce(seed)?);
        }
        Ok(func(&values, &named))
    }))
}

/// A schema compiled once: generators resolved, literals frozen.
#[derive(Debug)]
enum Template {
    Draw(Generator),
    Verbatim(Value),
    List(Vec<Template>),
    Tuple(Vec<Template>),
    Map(Vec<(Value, Template)>),
}

impl Template {
    fn compile(registry: &Registry, arg: Arg) -> Result<Self, Error> {
        if registry.classify(&arg) {
            return registry.resolve(&arg).map(Self::Draw);
        }
        Ok(match arg {
            Arg::List(v) => Self::List(Self::compile_all(registry, v)?),
            Arg::Tuple(v) => Self::Tuple(Self::compile_all(registry, v)?),
            Arg::Map(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, a)| Ok((k, Self::compile(registry, a)?)))
                    .collect::<Result<_, Error>>()?,
            ),
            Arg::Literal(v) => Self::Verbatim(v),
            // Only an unregistered type gets here.
            other @ (Arg::Generator(_) | Arg::Producer(_) | Arg::Type(_)) => {
                return registry.resolve(&other).map(Self::Draw);
            }
        })
    }

    fn compile_all(registry: &Registry, args: Vec<Arg>) -> Result<Vec<Self>, Error> {
        args.into_iter().map(|a| Self::compile(registry, a)).collect()
    }

    fn instantiate(&self, seed: &mut Seed) -> Result<Value, Error> {
        Ok(match *self {
            Self::Draw(ref g) => g.produce(seed)?,
            Self::Verbatim(ref v) => v.clone(),
            Self::List(ref v) => Value::List(Self::instantiate_all(v, seed)?),
            Self::Tuple(ref v) => Value::Tuple(Self::instantiate_all(v, seed)?),
            Self::Map(ref entries) => {
                let mut acc = Mapping::new();
                for &(ref k, ref t) in entries {
                    let _: Option<Value> = acc.insert(k.clone(), t.instantiate(seed)?);
                }
                Value::Map(acc)
            }
        })
    }

    fn instantiate_all(templates: &[Self], seed: &mut Seed) -> Result<Vec<Value>, Error> {
        templates.iter().map(|t| t.instantiate(seed)).collect()
    }
}

/// Instantiate a structured schema, drawing a fresh value for every generator in it.
/// Lists stay lists, tuples stay tuples, and mappings keep their key order.
/// # Errors
/// If the schema is not a collection, or any leaf fails to resolve.
#[inline]
pub fn data(registry: &Registry, schema: Arg) -> Result<Generator, Error> {
    if !matches!(schema, Arg::List(_) | Arg::Tuple(_) | Arg::Map(_)) {
        return Err(Error::InvalidArgument(format!(
            "`data` expects a list, tuple or mapping schema, but got {schema}"
        )));
    }
    let template = Rc::new(Template::compile(registry, schema)?);
    Ok(Generator::new("data", move |seed| template.instantiate(seed)))
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{args, generator::Producer, registry::TypeTag, value::Kind},
    };

    #[test]
    fn elements_stays_in_the_set() {
        let registry = Registry::new();
        let g = elements(&registry, args![1, 2, 3]).unwrap();
        let mut seed = Seed::default();
        let mut seen = [false; 3];
        for v in g.samples(&mut seed, 1_000).unwrap() {
            let i = v.as_int().unwrap();
            assert!((1..=3).contains(&i), "{i} is not an element");
            seen[usize::try_from(i - 1).unwrap()] = true;
        }
        let () = pretty_assertions::assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn elements_never_fails_to_draw() {
        let registry = Registry::new();
        let g = elements(&registry, args![vec!['q']]).unwrap();
        let mut seed = Seed::new(5);
        for _ in 0..5_000 {
            let () = pretty_assertions::assert_eq!(g.produce(&mut seed).unwrap(), Value::Char('q'));
        }
    }

    #[test]
    fn elements_of_a_lone_collection() {
        let registry = Registry::new();
        let g = elements(&registry, args![vec!["x", "y"]]).unwrap();
        let mut seed = Seed::default();
        for v in g.samples(&mut seed, 100).unwrap() {
            assert!(v == Value::from("x") || v == Value::from("y"));
        }
        let chars = elements(&registry, args!["xy"]).unwrap();
        for v in chars.samples(&mut seed, 100).unwrap() {
            assert!(v == Value::Char('x') || v == Value::Char('y'));
        }
    }

    #[test]
    fn elements_rejects_nothing_and_generators() {
        let registry = Registry::with_standard();
        assert!(matches!(elements(&registry, vec![]), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            elements(&registry, args![Vec::<Value>::new()]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            elements(&registry, args![1, TypeTag::INT]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn one_of_draws_from_each() {
        let registry = Registry::with_standard();
        let g = one_of(&registry, args![TypeTag::BOOL, TypeTag::STR]).unwrap();
        let mut seed = Seed::default();
        let kinds: Vec<Kind> = g
            .samples(&mut seed, 200)
            .unwrap()
            .iter()
            .map(Value::kind)
            .collect();
        assert!(kinds.contains(&Kind::Bool));
        assert!(kinds.contains(&Kind::Str));
        assert!(kinds.iter().all(|&k| k == Kind::Bool || k == Kind::Str));
    }

    #[test]
    fn one_of_rejects_literals_and_nothing() {
        let registry = Registry::with_standard();
        assert!(matches!(one_of(&registry, vec![]), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            one_of(&registry, args![TypeTag::INT, 5]),
            Err(Error::InvalidGenerator { .. })
        ));
    }

    #[test]
    fn frequency_respects_weights() {
        let registry = Registry::new();
        let g = frequency(
            &registry,
            args![
                (1, Generator::constant(Value::from("a"))),
                (3, Generator::constant(Value::from("b"))),
            ],
        )
        .unwrap();
        let mut seed = Seed::default();
        let n = 20_000;
        let bs = g
            .samples(&mut seed, n)
            .unwrap()
            .into_iter()
            .filter(|v| *v == Value::from("b"))
            .count();
        let ratio = f64::from(u32::try_from(bs).unwrap()) / f64::from(u32::try_from(n - bs).unwrap());
        assert!((2.7..3.3).contains(&ratio), "ratio {ratio} is not about 3");
    }

    #[test]
    fn frequency_never_picks_zero_weight() {
        let registry = Registry::new();
        let g = frequency(
            &registry,
            args![
                (0, Generator::constant(Value::Int(0))),
                (5, Generator::constant(Value::Int(1))),
            ],
        )
        .unwrap();
        let mut seed = Seed::default();
        assert!(g.samples(&mut seed, 1_000).unwrap().iter().all(|v| *v == Value::Int(1)));
    }

    #[test]
    fn frequency_of_a_lone_pair() {
        let registry = Registry::with_standard();
        let g = frequency(&registry, args![(2, TypeTag::BOOL)]).unwrap();
        let mut seed = Seed::default();
        let () = pretty_assertions::assert_eq!(g.produce(&mut seed).unwrap().kind(), Kind::Bool);
    }

    #[test]
    fn frequency_spreads_a_lone_collection_of_pairs() {
        let registry = Registry::with_standard();
        let g = frequency(
            &registry,
            args![((1, TypeTag::BOOL), (1, Generator::constant(Value::Int(7))))],
        )
        .unwrap();
        let mut seed = Seed::default();
        let kinds: Vec<Kind> = g
            .samples(&mut seed, 200)
            .unwrap()
            .iter()
            .map(Value::kind)
            .collect();
        assert!(kinds.contains(&Kind::Bool));
        assert!(kinds.contains(&Kind::Int));
        assert!(matches!(
            frequency(&registry, args![(TypeTag::INT, TypeTag::BOOL)]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn frequency_rejects_bad_weights() {
        let registry = Registry::with_standard();
        assert!(matches!(frequency(&registry, vec![]), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            frequency(&registry, args![(-1, TypeTag::INT), (2, TypeTag::INT)]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            frequency(&registry, args![(0, TypeTag::INT), (0, TypeTag::BOOL)]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            frequency(&registry, args![TypeTag::INT, TypeTag::BOOL]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn apply_redraws_every_time() {
        let registry = Registry::new();
        let counter = Producer::iterative(|| (0_i64..).map(Value::Int));
        let g = apply(
            &registry,
            |args, kwargs| {
                let offset = kwargs.get("offset").and_then(Value::as_int).unwrap_or(0);
                Value::Int(args.iter().filter_map(Value::as_int).sum::<i64>() + offset)
            },
            args![counter],
            vec![("offset".to_owned(), Arg::from(Generator::constant(Value::Int(100))))],
        )
        .unwrap();
        let mut seed = Seed::default();
        let () = pretty_assertions::assert_eq!(
            g.samples(&mut seed, 3).unwrap(),
            vec![Value::Int(100), Value::Int(101), Value::Int(102)],
        );
    }

    #[test]
    fn apply_rejects_literal_arguments() {
        let registry = Registry::new();
        assert!(matches!(
            apply(&registry, |_, _| Value::Unit, args![1], vec![]),
            Err(Error::InvalidGenerator { .. })
        ));
    }

    #[test]
    fn data_keeps_the_schema_shape() {
        let registry = Registry::with_standard();
        let schema = Arg::map([
            ("a", Arg::Type(TypeTag::INT)),
            ("b", Arg::List(vec![Arg::Type(TypeTag::STR), Arg::Type(TypeTag::STR)])),
            ("c", Arg::from("verbatim")),
        ]);
        let g = data(&registry, schema).unwrap();
        let mut seed = Seed::default();
        for v in g.samples(&mut seed, 200).unwrap() {
            let m = v.as_map().unwrap();
            let keys: Vec<&Value> = m.keys().collect();
            let () = pretty_assertions::assert_eq!(
                keys,
                vec![&Value::from("a"), &Value::from("b"), &Value::from("c")],
            );
            let () = pretty_assertions::assert_eq!(m.get(&"a".into()).unwrap().kind(), Kind::Int);
            let b = m.get(&"b".into()).unwrap();
            let () = pretty_assertions::assert_eq!(b.kind(), Kind::List);
            let b = b.as_seq().unwrap();
            let () = pretty_assertions::assert_eq!(b.len(), 2);
            assert!(b.iter().all(|s| s.kind() == Kind::Str));
            let () = pretty_assertions::assert_eq!(m.get(&"c".into()), Some(&Value::from("verbatim")));
        }
    }

    #[test]
    fn data_keeps_tuples_fixed() {
        let registry = Registry::with_standard();
        let g = data(&registry, Arg::from((TypeTag::BOOL, 7))).unwrap();
        let mut seed = Seed::default();
        let v = g.produce(&mut seed).unwrap();
        let () = pretty_assertions::assert_eq!(v.kind(), Kind::Tuple);
        let () = pretty_assertions::assert_eq!(v.as_seq().unwrap()[1], Value::Int(7));
    }

    #[test]
    fn data_rejects_scalar_schemas() {
        let registry = Registry::with_standard();
        assert!(matches!(data(&registry, Arg::from(1)), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            data(&registry, Arg::Type(TypeTag::INT)),
            Err(Error::InvalidArgument(_))
        ));
    }
}
