//! Dynamically-shaped values produced by every generator.
//!
//! A [`Value`] is either a scalar, an ordered sequence
//! (a growable [`Value::List`] or a fixed-arity [`Value::Tuple`]),
//! or an insertion-ordered [`Mapping`].
//! Equality and hashing are total (floats compare by bit pattern)
//! so that any value can label a trial as a [`Tag`](crate::tag::Tag).

use {
    crate::error::Error,
    core::{
        fmt,
        hash::{Hash, Hasher},
        mem,
    },
};

/// An arbitrary value.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Value {
    /// `()`.
    Unit,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A float, compared by bit pattern.
    Float(f64),
    /// A single character.
    Char(char),
    /// A string.
    Str(String),
    /// A variable-length sequence.
    List(Vec<Value>),
    /// Fixed-arity sequence: stays fixed-arity through every combinator.
    Tuple(Vec<Value>),
    /// An insertion-ordered mapping.
    Map(Mapping),
}

/// The shape of a [`Value`], without its contents.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum Kind {
    /// See [`Value::Unit`].
    Unit,
    /// See [`Value::Bool`].
    Bool,
    /// See [`Value::Int`].
    Int,
    /// See [`Value::Float`].
    Float,
    /// See [`Value::Char`].
    Char,
    /// See [`Value::Str`].
    Str,
    /// See [`Value::List`].
    List,
    /// See [`Value::Tuple`].
    Tuple,
    /// See [`Value::Map`].
    Map,
}

/// Insertion-ordered association list with unique keys.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Mapping(Vec<(Value, Value)>);

/// Parameter names bound to concrete values, in declaration order.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Bindings(Vec<(String, Value)>);

/// Conversion out of a dynamically-shaped [`Value`].
pub trait FromValue: Sized {
    /// Human-readable name of the expected shape, for error messages.
    const EXPECTED: &'static str;

    /// Convert, or give back `None` if the value has the wrong shape.
    #[must_use]
    fn from_value(value: Value) -> Option<Self>;
}

impl Value {
    /// The shape of this value.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match *self {
            Self::Unit => Kind::Unit,
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Char(_) => Kind::Char,
            Self::Str(_) => Kind::Str,
            Self::List(_) => Kind::List,
            Self::Tuple(_) => Kind::Tuple,
            Self::Map(_) => Kind::Map,
        }
    }

    /// The integer, if this is one.
    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        if let Self::Int(i) = *self { Some(i) } else { None }
    }

    /// The float, if this is one.
    #[inline]
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        if let Self::Float(f) = *self { Some(f) } else { None }
    }

    /// The string, if this is one.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if let Self::Str(ref s) = *self { Some(s) } else { None }
    }

    /// Elements of a `List` or a `Tuple`.
    #[inline]
    #[must_use]
    pub fn as_seq(&self) -> Option<&[Self]> {
        match *self {
            Self::List(ref v) | Self::Tuple(ref v) => Some(v),
            Self::Unit
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Float(_)
            | Self::Char(_)
            | Self::Str(_)
            | Self::Map(_) => None,
        }
    }

    /// The mapping, if this is one.
    #[inline]
    #[must_use]
    pub const fn as_map(&self) -> Option<&Mapping> {
        if let Self::Map(ref m) = *self { Some(m) } else { None }
    }

    /// Whether iterating this value is meaningful:
    /// strings iterate over characters, mappings over keys.
    #[inline]
    #[must_use]
    pub const fn is_iterable(&self) -> bool {
        matches!(
            *self,
            Self::Str(_) | Self::List(_) | Self::Tuple(_) | Self::Map(_)
        )
    }

    /// Spread an iterable value into its elements
    /// (characters of a string, items of a sequence, keys of a mapping).
    /// A scalar spreads into itself.
    #[inline]
    #[must_use]
    pub fn into_elements(self) -> Vec<Self> {
        match self {
            Self::Str(s) => s.chars().map(Self::Char).collect(),
            Self::List(v) | Self::Tuple(v) => v,
            Self::Map(m) => m.into_iter().map(|(k, _)| k).collect(),
            scalar @ (Self::Unit
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Float(_)
            | Self::Char(_)) => vec![scalar],
        }
    }
}

impl PartialEq for Value {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (&Self::Unit, &Self::Unit) => true,
            (&Self::Bool(a), &Self::Bool(b)) => a == b,
            (&Self::Int(a), &Self::Int(b)) => a == b,
            (&Self::Float(a), &Self::Float(b)) => a.to_bits() == b.to_bits(),
            (&Self::Char(a), &Self::Char(b)) => a == b,
            (&Self::Str(ref a), &Self::Str(ref b)) => a == b,
            (&Self::List(ref a), &Self::List(ref b)) | (&Self::Tuple(ref a), &Self::Tuple(ref b)) => {
                a == b
            }
            (&Self::Map(ref a), &Self::Map(ref b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        let () = mem::discriminant(self).hash(state);
        match *self {
            Self::Unit => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Char(c) => c.hash(state),
            Self::Str(ref s) => s.hash(state),
            Self::List(ref v) | Self::Tuple(ref v) => v.hash(state),
            Self::Map(ref m) => m.hash(state),
        }
    }
}

impl fmt::Display for Value {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unit => write!(f, "()"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Char(c) => write!(f, "{c:?}"),
            Self::Str(ref s) => write!(f, "{s:?}"),
            Self::List(ref v) => {
                write!(f, "[")?;
                write_joined(f, v)?;
                write!(f, "]")
            }
            Self::Tuple(ref v) => {
                write!(f, "(")?;
                write_joined(f, v)?;
                if v.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Self::Map(ref m) => write!(f, "{m}"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    for (i, v) in values.iter().enumerate() {
        if i != 0 {
            write!(f, ", ")?;
        }
        write!(f, "{v}")?;
    }
    Ok(())
}

impl fmt::Display for Kind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Self::Unit => "unit",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Char => "char",
            Self::Str => "str",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Map => "map",
        })
    }
}

impl Mapping {
    /// An empty mapping.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a key, replacing (in place) any previous value under it.
    #[inline]
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        if let Some(slot) = self.0.iter_mut().find(|&&mut (ref k, _)| *k == key) {
            Some(mem::replace(&mut slot.1, value))
        } else {
            let () = self.0.push((key, value));
            None
        }
    }

    /// The value under `key`.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0.iter().find(|&&(ref k, _)| k == key).map(|&(_, ref v)| v)
    }

    /// Whether `key` is present.
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    /// Keys in insertion order.
    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|&(ref k, _)| k)
    }

    /// Entries in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.0.iter()
    }

    /// Number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Value, Value)> for Mapping {
    #[inline]
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut acc = Self::new();
        for (k, v) in iter {
            let _: Option<Value> = acc.insert(k, v);
        }
        acc
    }
}

impl IntoIterator for Mapping {
    type Item = (Value, Value);
    type IntoIter = alloc::vec::IntoIter<(Value, Value)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Mapping {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, &(ref k, ref v)) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        write!(f, "}}")
    }
}

impl Bindings {
    /// No bindings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Bind a name, replacing (in place) any previous value under it.
    #[inline]
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|&&mut (ref n, _)| *n == name) {
            Some(mem::replace(&mut slot.1, value))
        } else {
            let () = self.0.push((name, value));
            None
        }
    }

    /// The value bound to `name`.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|&&(ref n, _)| n == name).map(|&(_, ref v)| v)
    }

    /// Take a binding out as a concrete Rust type.
    /// # Errors
    /// If there is no such binding, or it has the wrong shape.
    #[inline]
    pub fn extract<T: FromValue>(&self, name: &str) -> Result<T, Error> {
        let value = self.get(name).ok_or_else(|| Error::MissingBinding {
            name: name.to_owned(),
        })?;
        let found = value.kind();
        T::from_value(value.clone()).ok_or_else(|| Error::Extract {
            name: name.to_owned(),
            expected: T::EXPECTED,
            found,
        })
    }

    /// Whether `name` is bound.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Bound names, in binding order.
    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|&(ref n, _)| n.as_str())
    }

    /// Name-value pairs, in binding order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|&(ref n, ref v)| (n.as_str(), v))
    }

    /// Number of bindings.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is bound.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Bindings {
    #[inline]
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Bindings {
    #[inline]
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            let _: Option<Value> = self.insert(k, v);
        }
    }
}

impl IntoIterator for Bindings {
    type Item = (String, Value);
    type IntoIter = alloc::vec::IntoIter<(String, Value)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Bindings {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &(ref n, ref v)) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{n} = {v}")?;
        }
        Ok(())
    }
}

/// Lossless conversions of Rust integers into `Value::Int` (and back, checked).
macro_rules! impl_int {
    ($($i:ident),*) => {
        $(
            impl From<$i> for Value {
                #[inline]
                fn from(i: $i) -> Self {
                    Self::Int(i64::from(i))
                }
            }

            impl FromValue for $i {
                const EXPECTED: &'static str = stringify!($i);

                #[inline]
                fn from_value(value: Value) -> Option<Self> {
                    value.as_int().and_then(|i| $i::try_from(i).ok())
                }
            }
        )*
    };
}

impl_int!(i8, i16, i32, i64, u8, u16, u32);

impl FromValue for u64 {
    const EXPECTED: &'static str = "u64";

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        value.as_int().and_then(|i| Self::try_from(i).ok())
    }
}

impl FromValue for usize {
    const EXPECTED: &'static str = "usize";

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        value.as_int().and_then(|i| Self::try_from(i).ok())
    }
}

impl From<()> for Value {
    #[inline]
    fn from((): ()) -> Self {
        Self::Unit
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(f: f32) -> Self {
        Self::Float(f64::from(f))
    }
}

impl From<char> for Value {
    #[inline]
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Mapping> for Value {
    #[inline]
    fn from(m: Mapping) -> Self {
        Self::Map(m)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    #[inline]
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Self>, B: Into<Self>> From<(A, B)> for Value {
    #[inline]
    fn from((a, b): (A, B)) -> Self {
        Self::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Self>, B: Into<Self>, C: Into<Self>> From<(A, B, C)> for Value {
    #[inline]
    fn from((a, b, c): (A, B, C)) -> Self {
        Self::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any value";

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for () {
    const EXPECTED: &'static str = "unit";

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        matches!(value, Value::Unit).then_some(())
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        if let Value::Bool(b) = value { Some(b) } else { None }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "float";

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        value.as_float()
    }
}

impl FromValue for char {
    const EXPECTED: &'static str = "char";

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        if let Value::Char(c) = value { Some(c) } else { None }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "str";

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            Value::Char(c) => Some(c.to_string()),
            Value::Unit
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::List(_)
            | Value::Tuple(_)
            | Value::Map(_) => None,
        }
    }
}

impl FromValue for Mapping {
    const EXPECTED: &'static str = "map";

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        if let Value::Map(m) = value { Some(m) } else { None }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "list";

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(v) | Value::Tuple(v) => v.into_iter().map(T::from_value).collect(),
            Value::Unit
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Char(_)
            | Value::Str(_)
            | Value::Map(_) => None,
        }
    }
}

impl<A: FromValue, B: FromValue> FromValue for (A, B) {
    const EXPECTED: &'static str = "pair";

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        let (Value::Tuple(v) | Value::List(v)) = value else {
            return None;
        };
        let mut iter = v.into_iter();
        let a = A::from_value(iter.next()?)?;
        let b = B::from_value(iter.next()?)?;
        iter.next().is_none().then_some((a, b))
    }
}

impl<A: FromValue, B: FromValue, C: FromValue> FromValue for (A, B, C) {
    const EXPECTED: &'static str = "triple";

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        let (Value::Tuple(v) | Value::List(v)) = value else {
            return None;
        };
        let mut iter = v.into_iter();
        let a = A::from_value(iter.next()?)?;
        let b = B::from_value(iter.next()?)?;
        let c = C::from_value(iter.next()?)?;
        iter.next().is_none().then_some((a, b, c))
    }
}
