//! Type tags and the injectable type-to-generator registry.

use {
    crate::{
        arg::Arg,
        error::Error,
        generator::{Generator, Validator, wrap},
        standard,
    },
    core::fmt,
    std::{borrow::Cow, collections::HashMap, rc::Rc},
};

/// A registry key naming a semantic type.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TypeTag(Cow<'static, str>);

/// Builds a fresh generator each time a type is resolved.
pub type Factory = Rc<dyn Fn() -> Generator>;

/// Maps each type tag to an ordered list of generator factories.
/// The first factory registered for a tag is its default.
#[derive(Clone, Default)]
pub struct Registry {
    factories: HashMap<TypeTag, Vec<Factory>>,
}

impl TypeTag {
    /// `()`.
    pub const UNIT: Self = Self::builtin("unit");
    /// Booleans.
    pub const BOOL: Self = Self::builtin("bool");
    /// Integers, by default within the `i32` range.
    pub const INT: Self = Self::builtin("int");
    /// Finite floats.
    pub const FLOAT: Self = Self::builtin("float");
    /// Printable ASCII characters.
    pub const CHAR: Self = Self::builtin("char");
    /// Strings.
    pub const STR: Self = Self::builtin("str");
    /// Lists of integers.
    pub const LIST: Self = Self::builtin("list");

    #[inline]
    #[must_use]
    const fn builtin(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// A user-defined type.
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The tag's name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Registry {
    /// An empty registry: every type tag is unknown.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding a default generator for every standard type tag.
    #[inline]
    #[must_use]
    pub fn with_standard() -> Self {
        let mut registry = Self::new();
        let () = standard::install(&mut registry);
        registry
    }

    /// Append a factory for `tag`. Earlier registrations stay the default.
    #[inline]
    pub fn register<F: Fn() -> Generator + 'static>(&mut self, tag: TypeTag, factory: F) {
        tracing::debug!(%tag, "registering generator factory");
        let () = self.factories.entry(tag).or_default().push(Rc::new(factory));
    }

    /// Append a factory for `tag`, validating everything it produces if asked.
    #[inline]
    pub fn register_generator<F: Fn() -> Generator + 'static>(
        &mut self,
        tag: TypeTag,
        factory: F,
        validator: Option<Validator>,
    ) {
        match validator {
            None => self.register(tag, factory),
            Some(v) => self.register(tag, move || factory().validated(v.clone())),
        }
    }

    /// Every factory registered for `tag`, in registration order.
    #[inline]
    #[must_use]
    pub fn factories(&self, tag: &TypeTag) -> &[Factory] {
        self.factories.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Whether any factory is registered for `tag`.
    #[inline]
    #[must_use]
    pub fn contains(&self, tag: &TypeTag) -> bool {
        !self.factories(tag).is_empty()
    }

    /// Instantiate the default generator for `tag`.
    /// # Errors
    /// If nothing is registered for `tag`.
    #[inline]
    pub fn default_for(&self, tag: &TypeTag) -> Result<Generator, Error> {
        self.factories(tag)
            .first()
            .map(|factory| factory())
            .ok_or_else(|| Error::UnknownGenerator {
                tag: tag.to_string(),
            })
    }

    /// Whether `arg` can stand in for a generator:
    /// a generator, a producer, or a *registered* type tag.
    #[inline]
    #[must_use]
    pub fn classify(&self, arg: &Arg) -> bool {
        match *arg {
            Arg::Generator(_) | Arg::Producer(_) => true,
            Arg::Type(ref tag) => self.contains(tag),
            Arg::Literal(_) | Arg::List(_) | Arg::Tuple(_) | Arg::Map(_) => false,
        }
    }

    /// Turn `arg` into a concrete generator.
    /// # Errors
    /// If `arg` is an unregistered type tag or not generator-like at all.
    #[inline]
    pub fn resolve(&self, arg: &Arg) -> Result<Generator, Error> {
        match *arg {
            Arg::Generator(ref g) => Ok(g.clone()),
            Arg::Producer(ref p) => Ok(wrap(p.clone(), None)),
            Arg::Type(ref tag) => self.default_for(tag),
            Arg::Literal(_) | Arg::List(_) | Arg::Tuple(_) | Arg::Map(_) => {
                Err(Error::InvalidGenerator {
                    found: arg.to_string(),
                })
            }
        }
    }
}

impl fmt::Debug for Registry {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<(&TypeTag, usize)> =
            self.factories.iter().map(|(k, v)| (k, v.len())).collect();
        let () = tags.sort();
        f.debug_map().entries(tags).finish()
    }
}
