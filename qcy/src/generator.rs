//! The uniform "how to produce an arbitrary value" abstraction.

use {
    crate::{
        error::Error,
        seed::Seed,
        value::{Kind, Value},
    },
    core::{cell::RefCell, fmt},
    std::rc::Rc,
};

/// A restartable, infinite, lazily-evaluated source of arbitrary values.
/// Cloning is cheap and shares the underlying producer.
#[derive(Clone)]
pub struct Generator {
    draw: Rc<dyn Fn(&mut Seed) -> Result<Value, Error>>,
    label: Rc<str>,
}

/// Something that can be *turned into* a generator with [`wrap`].
#[derive(Clone)]
#[non_exhaustive]
pub enum Producer {
    /// Returns one fresh value per call.
    Single(Rc<dyn Fn(&mut Seed) -> Value>),
    /// Is itself iterative: called once per wrapped generator,
    /// after which values are pulled from the iterator it returned.
    Iterative(Rc<dyn Fn() -> Box<dyn Iterator<Item = Value>>>),
}

/// A check applied to every value a generator produces.
#[derive(Clone)]
pub struct Validator {
    expected: Rc<str>,
    check: Rc<dyn Fn(&Value) -> bool>,
}

/// Turn a producer into a generator, optionally validating every value.
#[inline]
#[must_use]
pub fn wrap(producer: Producer, validator: Option<Validator>) -> Generator {
    let generator = match producer {
        Producer::Single(f) => Generator::from_fn("producer", move |seed| f(seed)),
        Producer::Iterative(f) => {
            let iter = RefCell::new(f());
            Generator::new("iterative producer", move |_| {
                iter.borrow_mut().next().ok_or_else(|| Error::Exhausted {
                    label: "iterative producer".to_owned(),
                })
            })
        }
    };
    match validator {
        Some(v) => generator.validated(v),
        None => generator,
    }
}

impl Generator {
    /// A generator whose draws may fail.
    #[inline]
    #[must_use]
    pub fn new<F: Fn(&mut Seed) -> Result<Value, Error> + 'static>(
        label: impl Into<Rc<str>>,
        draw: F,
    ) -> Self {
        Self {
            draw: Rc::new(draw),
            label: label.into(),
        }
    }

    /// A generator whose draws always succeed.
    #[inline]
    #[must_use]
    pub fn from_fn<F: Fn(&mut Seed) -> Value + 'static>(label: impl Into<Rc<str>>, f: F) -> Self {
        Self::new(label, move |seed| Ok(f(seed)))
    }

    /// Always the same value.
    #[inline]
    #[must_use]
    pub fn constant(value: Value) -> Self {
        let label = format!("constant {value}");
        Self::from_fn(label, move |_| value.clone())
    }

    /// Produce the next value.
    /// # Errors
    /// If validation fails or an iterative producer is exhausted.
    #[inline]
    pub fn produce(&self, seed: &mut Seed) -> Result<Value, Error> {
        (self.draw)(seed)
    }

    /// Short name used in logs and errors.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Rename this generator (e.g. for error messages) without changing what it produces.
    #[inline]
    #[must_use]
    pub fn labelled(self, label: impl Into<Rc<str>>) -> Self {
        Self {
            label: label.into(),
            ..self
        }
    }

    /// Post-process every value.
    #[inline]
    #[must_use]
    pub fn map<F: Fn(Value) -> Value + 'static>(self, f: F) -> Self {
        let label = Rc::clone(&self.label);
        Self::new(label, move |seed| self.produce(seed).map(&f))
    }

    /// Check every value, failing with [`Error::TypeMismatch`] on the first bad one.
    #[inline]
    #[must_use]
    pub fn validated(self, validator: Validator) -> Self {
        let label = Rc::clone(&self.label);
        Self::new(label, move |seed| {
            let value = self.produce(seed)?;
            validator.validate(value)
        })
    }

    /// Produce `n` values in a row.
    /// # Errors
    /// See [`Generator::produce`].
    #[inline]
    pub fn samples(&self, seed: &mut Seed, n: usize) -> Result<Vec<Value>, Error> {
        (0..n).map(|_| self.produce(seed)).collect()
    }
}

impl fmt::Debug for Generator {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Generator({})", self.label)
    }
}

impl Producer {
    /// A producer that draws one value per call.
    #[inline]
    #[must_use]
    pub fn single<F: Fn(&mut Seed) -> Value + 'static>(f: F) -> Self {
        Self::Single(Rc::new(f))
    }

    /// A producer whose values come from an iterator, created afresh on every wrap.
    #[inline]
    #[must_use]
    pub fn iterative<I: Iterator<Item = Value> + 'static, F: Fn() -> I + 'static>(f: F) -> Self {
        Self::Iterative(Rc::new(move || Box::new(f())))
    }
}

impl fmt::Debug for Producer {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Self::Single(_) => "Producer::Single(..)",
            Self::Iterative(_) => "Producer::Iterative(..)",
        })
    }
}

impl Validator {
    /// Accept values passing `check`; `expected` describes them in errors.
    #[inline]
    #[must_use]
    pub fn new<F: Fn(&Value) -> bool + 'static>(expected: impl Into<Rc<str>>, check: F) -> Self {
        Self {
            expected: expected.into(),
            check: Rc::new(check),
        }
    }

    /// Accept exactly the values of one kind.
    #[inline]
    #[must_use]
    pub fn kind(kind: Kind) -> Self {
        Self::new(kind.to_string(), move |v| v.kind() == kind)
    }

    /// Pass the value through if it is acceptable.
    /// # Errors
    /// If it isn't.
    #[inline]
    pub fn validate(&self, value: Value) -> Result<Value, Error> {
        if (self.check)(&value) {
            Ok(value)
        } else {
            Err(Error::TypeMismatch {
                expected: self.expected.to_string(),
                found: value.kind(),
                value: value.to_string(),
            })
        }
    }
}

impl fmt::Debug for Validator {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator({})", self.expected)
    }
}
