//! Inputs accepted by combinators, and how they are normalized.

use {
    crate::{
        error::Error,
        generator::{Generator, Producer},
        registry::{Registry, TypeTag},
        value::{Mapping, Value},
    },
    core::fmt,
};

/// Anything a combinator (or a property parameter) can be handed.
/// Collections nest, so schemas can mix generators with literals.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Arg {
    /// A concrete generator.
    Generator(Generator),
    /// A raw producer, wrapped on use.
    Producer(Producer),
    /// Resolved through the registry.
    Type(TypeTag),
    /// A fixed value.
    Literal(Value),
    /// A list whose entries are themselves arguments.
    List(Vec<Arg>),
    /// A fixed-arity tuple whose entries are themselves arguments.
    Tuple(Vec<Arg>),
    /// Keys are always literal; values may be anything.
    Map(Vec<(Value, Arg)>),
}

/// Build a `Vec<Arg>` from heterogeneous expressions.
/// ```
/// let args = qcy::args![1, "two", qcy::TypeTag::INT];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::Arg::from($arg)),*]
    };
}

impl Arg {
    /// A mapping schema with keys in the order given.
    #[inline]
    #[must_use]
    pub fn map<K: Into<Value>, A: Into<Self>, I: IntoIterator<Item = (K, A)>>(entries: I) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, a)| (k.into(), a.into()))
                .collect(),
        )
    }

    /// Whether this argument holds (or, as a literal, is) something iterable.
    #[inline]
    #[must_use]
    pub const fn is_iterable(&self) -> bool {
        match *self {
            Self::List(_) | Self::Tuple(_) | Self::Map(_) => true,
            Self::Literal(ref v) => v.is_iterable(),
            Self::Generator(_) | Self::Producer(_) | Self::Type(_) => false,
        }
    }

    /// Spread an iterable argument into its elements:
    /// a string into its characters, a mapping into its keys.
    #[inline]
    #[must_use]
    pub fn spread(self) -> Vec<Self> {
        match self {
            Self::List(v) | Self::Tuple(v) => v,
            Self::Map(entries) => entries.into_iter().map(|(k, _)| Self::Literal(k)).collect(),
            Self::Literal(v) => v.into_elements().into_iter().map(Self::Literal).collect(),
            Self::Generator(_) | Self::Producer(_) | Self::Type(_) => vec![self],
        }
    }

    /// Recursively convert into a plain value.
    /// # Errors
    /// If anything generator-like is found: there is no value to copy.
    #[inline]
    pub fn into_literal(self, registry: &Registry) -> Result<Value, Error> {
        match self {
            Self::Literal(v) => Ok(v),
            Self::List(v) => v
                .into_iter()
                .map(|a| a.into_literal(registry))
                .collect::<Result<_, _>>()
                .map(Value::List),
            Self::Tuple(v) => v
                .into_iter()
                .map(|a| a.into_literal(registry))
                .collect::<Result<_, _>>()
                .map(Value::Tuple),
            Self::Map(entries) => entries
                .into_iter()
                .map(|(k, a)| Ok((k, a.into_literal(registry)?)))
                .collect::<Result<Mapping, Error>>()
                .map(Value::Map),
            Self::Type(ref tag) if !registry.contains(tag) => Err(Error::UnknownGenerator {
                tag: tag.to_string(),
            }),
            Self::Generator(_) | Self::Producer(_) | Self::Type(_) => Err(Error::InvalidArgument(
                format!("expected a literal value, but found the generator {self}"),
            )),
        }
    }
}

/// Normalize a variadic argument list:
/// a lone non-generator collection is spread into positional arguments,
/// then every generator-like leaf (at any depth) is resolved once.
/// # Errors
/// If resolving a leaf fails.
#[inline]
pub fn normalize(registry: &Registry, args: Vec<Arg>) -> Result<Vec<Arg>, Error> {
    let args = match <[Arg; 1]>::try_from(args) {
        Ok([lone]) if !registry.classify(&lone) && lone.is_iterable() => lone.spread(),
        Ok([lone]) => vec![lone],
        Err(args) => args,
    };
    args.into_iter().map(|a| coerce(registry, a)).collect()
}

/// Resolve generator-like leaves, recursing into collections.
fn coerce(registry: &Registry, arg: Arg) -> Result<Arg, Error> {
    if registry.classify(&arg) {
        return registry.resolve(&arg).map(Arg::Generator);
    }
    Ok(match arg {
        Arg::List(v) => Arg::List(v.into_iter().map(|a| coerce(registry, a)).collect::<Result<_, _>>()?),
        Arg::Tuple(v) => Arg::Tuple(v.into_iter().map(|a| coerce(registry, a)).collect::<Result<_, _>>()?),
        Arg::Map(entries) => Arg::Map(
            entries
                .into_iter()
                .map(|(k, a)| Ok((k, coerce(registry, a)?)))
                .collect::<Result<_, Error>>()?,
        ),
        leaf @ (Arg::Generator(_) | Arg::Producer(_) | Arg::Type(_) | Arg::Literal(_)) => leaf,
    })
}

impl fmt::Display for Arg {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Generator(ref g) => write!(f, "<{}>", g.label()),
            Self::Producer(_) => write!(f, "<producer>"),
            Self::Type(ref tag) => write!(f, "<type {tag}>"),
            Self::Literal(ref v) => write!(f, "{v}"),
            Self::List(ref v) => {
                write!(f, "[")?;
                write_joined(f, v)?;
                write!(f, "]")
            }
            Self::Tuple(ref v) => {
                write!(f, "(")?;
                write_joined(f, v)?;
                write!(f, ")")
            }
            Self::Map(ref entries) => {
                write!(f, "{{")?;
                for (i, &(ref k, ref a)) in entries.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {a}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, args: &[Arg]) -> fmt::Result {
    for (i, a) in args.iter().enumerate() {
        if i != 0 {
            write!(f, ", ")?;
        }
        write!(f, "{a}")?;
    }
    Ok(())
}

/// Literal conversions for everything that already converts into a [`Value`].
macro_rules! impl_literal {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Arg {
                #[inline]
                fn from(x: $t) -> Self {
                    Self::Literal(Value::from(x))
                }
            }
        )*
    };
}

impl_literal!((), bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, char, &str, String, Mapping);

impl From<Value> for Arg {
    #[inline]
    fn from(v: Value) -> Self {
        Self::Literal(v)
    }
}

impl From<Generator> for Arg {
    #[inline]
    fn from(g: Generator) -> Self {
        Self::Generator(g)
    }
}

impl From<Producer> for Arg {
    #[inline]
    fn from(p: Producer) -> Self {
        Self::Producer(p)
    }
}

impl From<TypeTag> for Arg {
    #[inline]
    fn from(tag: TypeTag) -> Self {
        Self::Type(tag)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Arg {
    #[inline]
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Self>, B: Into<Self>> From<(A, B)> for Arg {
    #[inline]
    fn from((a, b): (A, B)) -> Self {
        Self::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Self>, B: Into<Self>, C: Into<Self>> From<(A, B, C)> for Arg {
    #[inline]
    fn from((a, b, c): (A, B, C)) -> Self {
        Self::Tuple(vec![a.into(), b.into(), c.into()])
    }
}
