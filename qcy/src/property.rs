//! Properties: parametrized bodies run against freshly generated inputs.
//!
//! A body is stepped cooperatively: each step either emits an optional
//! [`Tag`], finishes, or raises a [`Failure`]. Plain predicates are
//! normalized into a body that finishes (or raises) on its first step.

use {
    crate::{
        arg::Arg,
        config::Config,
        error::Error,
        generator::Generator,
        outcome::{Failure, TrialResult},
        panic,
        registry::Registry,
        seed::Seed,
        tag::Tag,
        value::{Bindings, Value},
    },
    core::fmt,
    std::rc::Rc,
};

/// What one step of a running body produced.
#[derive(Debug)]
#[non_exhaustive]
pub enum Step {
    /// The body emitted a tag, or an empty emission.
    Emitted(Option<Tag>),
    /// The body finished normally.
    Done,
    /// The body failed.
    Raised(Failure),
}

/// A body in the middle of running.
pub trait Coroutine {
    /// Run until the next emission, completion, or failure.
    fn advance(&mut self) -> Step;
}

/// Anything a body may return.
pub trait IntoCoroutine {
    /// Start running.
    #[must_use]
    fn into_coroutine(self) -> Box<dyn Coroutine>;
}

/// One item an emitting body yields.
pub trait Emission {
    /// The step this item stands for.
    #[must_use]
    fn into_step(self) -> Step;
}

/// Marks a body's return value as a stream of emissions.
#[derive(Clone, Debug)]
pub struct Emit<I>(pub I);

/// A `bool` body returned `false`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, thiserror::Error)]
#[error("property was falsified")]
pub struct Falsified;

/// Already finished, one way or the other.
struct Settled(Option<Step>);

/// Steps through an iterator of emissions, catching panics inside it.
struct Emitting<I>(I);

impl Coroutine for Settled {
    #[inline]
    fn advance(&mut self) -> Step {
        self.0.take().unwrap_or(Step::Done)
    }
}

impl<I: Iterator<Item = T>, T: Emission> Coroutine for Emitting<I> {
    #[inline]
    fn advance(&mut self) -> Step {
        match panic::catch(|| self.0.next()) {
            Ok(Some(item)) => item.into_step(),
            Ok(None) => Step::Done,
            Err(failure) => Step::Raised(failure),
        }
    }
}

impl IntoCoroutine for Box<dyn Coroutine> {
    #[inline]
    fn into_coroutine(self) -> Box<dyn Coroutine> {
        self
    }
}

impl IntoCoroutine for () {
    #[inline]
    fn into_coroutine(self) -> Box<dyn Coroutine> {
        Box::new(Settled(None))
    }
}

impl IntoCoroutine for bool {
    #[inline]
    fn into_coroutine(self) -> Box<dyn Coroutine> {
        Box::new(Settled((!self).then(|| Step::Raised(Failure::from_error(Falsified)))))
    }
}

impl<E: Into<anyhow::Error>> IntoCoroutine for Result<(), E> {
    #[inline]
    fn into_coroutine(self) -> Box<dyn Coroutine> {
        Box::new(Settled(
            self.err().map(|e| Step::Raised(Failure::from_error(e))),
        ))
    }
}

impl<I: IntoIterator<Item = T>, T: Emission> IntoCoroutine for Emit<I>
where
    I::IntoIter: 'static,
{
    #[inline]
    fn into_coroutine(self) -> Box<dyn Coroutine> {
        Box::new(Emitting(self.0.into_iter()))
    }
}

impl Emission for Option<Tag> {
    #[inline]
    fn into_step(self) -> Step {
        Step::Emitted(self)
    }
}

impl Emission for Tag {
    #[inline]
    fn into_step(self) -> Step {
        Step::Emitted(Some(self))
    }
}

impl<E: Into<anyhow::Error>> Emission for Result<Option<Tag>, E> {
    #[inline]
    fn into_step(self) -> Step {
        match self {
            Ok(tag) => Step::Emitted(tag),
            Err(e) => Step::Raised(Failure::from_error(e)),
        }
    }
}

/// Creates a fresh running body from each trial's bindings.
#[derive(Clone)]
pub struct Body(Rc<dyn Fn(&Bindings) -> Box<dyn Coroutine>>);

impl Body {
    /// A body returning `()`, `bool`, `Result<(), E>`, [`Emit`], or a boxed [`Coroutine`].
    #[inline]
    #[must_use]
    pub fn new<R: IntoCoroutine, F: Fn(&Bindings) -> R + 'static>(f: F) -> Self {
        Self(Rc::new(move |bindings| f(bindings).into_coroutine()))
    }

    /// A body yielding tags (or failures) as it goes.
    #[inline]
    #[must_use]
    pub fn emitting<I, F>(f: F) -> Self
    where
        I: IntoIterator,
        I::IntoIter: 'static,
        I::Item: Emission,
        F: Fn(&Bindings) -> I + 'static,
    {
        Self::new(move |bindings| Emit(f(bindings)))
    }

    fn start(&self, bindings: &Bindings) -> Box<dyn Coroutine> {
        (self.0)(bindings)
    }
}

impl fmt::Debug for Body {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Body(..)")
    }
}

/// Where a parameter's value comes from on each trial.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Param {
    /// Drawn afresh on every trial.
    Draw(Generator),
    /// The same value on every trial.
    Fixed(Value),
}

/// A body together with how to generate its inputs.
#[derive(Clone, Debug)]
pub struct Property {
    name: String,
    params: Vec<(String, Param)>,
    /// Values fixed by [`Property::bind`], passed alongside the parameters.
    bound: Bindings,
    body: Body,
    trials: usize,
    seed: u64,
}

/// Step-by-step construction of a [`Property`].
#[derive(Debug)]
#[must_use]
pub struct Builder {
    name: String,
    params: Vec<(String, Arg)>,
    body: Option<Body>,
    config: Config,
}

impl Builder {
    /// Replace the trial count and seed together.
    #[inline]
    pub fn config(self, config: Config) -> Self {
        Self { config, ..self }
    }

    /// Run this many trials by default.
    #[inline]
    pub const fn trials(mut self, trials: usize) -> Self {
        self.config.trials = trials;
        self
    }

    /// Start the pseudorandom stream from `seed`.
    #[inline]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Declare a parameter: a generator, a type tag, or a fixed literal.
    #[inline]
    pub fn param(mut self, name: impl Into<String>, arg: impl Into<Arg>) -> Self {
        let () = self.params.push((name.into(), arg.into()));
        self
    }

    /// What each trial runs.
    #[inline]
    pub fn body(self, body: Body) -> Self {
        Self {
            body: Some(body),
            ..self
        }
    }

    /// Resolve every parameter.
    /// # Errors
    /// If there is no body, the trial count is zero,
    /// a name is declared twice, or a parameter fails to resolve.
    #[inline]
    pub fn build(self, registry: &Registry) -> Result<Property, Error> {
        let Some(body) = self.body else {
            return Err(Error::InvalidArgument(format!(
                "property `{}` has no body",
                self.name
            )));
        };
        if self.config.trials == 0 {
            return Err(Error::InvalidArgument(format!(
                "property `{}` must run at least one trial",
                self.name
            )));
        }
        let mut params: Vec<(String, Param)> = Vec::with_capacity(self.params.len());
        for (name, arg) in self.params {
            if params.iter().any(|&(ref n, _)| *n == name) {
                return Err(Error::InvalidArgument(format!(
                    "property `{}` declares `{name}` twice",
                    self.name
                )));
            }
            let param = if registry.classify(&arg) {
                Param::Draw(registry.resolve(&arg)?)
            } else {
                Param::Fixed(arg.into_literal(registry)?)
            };
            let () = params.push((name, param));
        }
        tracing::debug!(property = %self.name, params = params.len(), "declared property");
        Ok(Property {
            name: self.name,
            params,
            bound: Bindings::new(),
            body,
            trials: self.config.trials,
            seed: self.config.seed,
        })
    }
}

/// Declare a property in one call.
/// # Errors
/// See [`Builder::build`].
#[inline]
pub fn declare_property<N: Into<String>, I: IntoIterator<Item = (N, Arg)>>(
    registry: &Registry,
    name: &str,
    body: Body,
    params: I,
    trials: Option<usize>,
) -> Result<Property, Error> {
    let mut builder = Property::builder(name).body(body);
    if let Some(trials) = trials {
        builder = builder.trials(trials);
    }
    params
        .into_iter()
        .fold(builder, |builder, (n, arg)| builder.param(n, arg))
        .build(registry)
}

impl Property {
    /// Start declaring a property called `name`.
    #[inline]
    pub fn builder(name: impl Into<String>) -> Builder {
        Builder {
            name: name.into(),
            params: vec![],
            body: None,
            config: Config::default(),
        }
    }

    /// The declared name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default number of trials.
    #[inline]
    #[must_use]
    pub const fn trials(&self) -> usize {
        self.trials
    }

    /// Seed of the root stream each run splits its trials from.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Names of the parameters still to be supplied, in declaration order.
    #[inline]
    pub fn params(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.params.iter().map(|&(ref n, ref p)| (n.as_str(), p))
    }

    /// Whether any parameter is a fixed literal rather than generated.
    #[inline]
    #[must_use]
    pub fn parametrized(&self) -> bool {
        self.params
            .iter()
            .any(|&(_, ref p)| matches!(*p, Param::Fixed(_)))
    }

    /// Run one trial. Failures inside the body are captured, not returned.
    /// # Errors
    /// If generating an input fails.
    #[inline]
    pub fn test_one(&self, seed: &mut Seed) -> Result<TrialResult, Error> {
        let mut bindings = self.bound.clone();
        for &(ref name, ref param) in &self.params {
            let value = match *param {
                Param::Draw(ref g) => g.produce(seed)?,
                Param::Fixed(ref v) => v.clone(),
            };
            let _: Option<Value> = bindings.insert(name.as_str(), value);
        }
        tracing::trace!(property = %self.name, %bindings, "running trial");
        let mut tags = vec![];
        let failure = match panic::catch(|| self.body.start(&bindings)) {
            Ok(mut coroutine) => loop {
                match panic::catch(|| coroutine.advance()) {
                    Ok(Step::Emitted(tag)) => tags.extend(tag),
                    Ok(Step::Done) => break None,
                    Ok(Step::Raised(failure)) | Err(failure) => break Some(failure),
                }
            },
            Err(failure) => Some(failure),
        };
        Ok(match failure {
            None => TrialResult::completed(bindings, tags),
            Some(failure) => {
                tracing::debug!(property = %self.name, %bindings, %failure, "trial failed");
                TrialResult::failed(bindings, tags, failure)
            }
        })
    }

    /// Run the default number of trials.
    /// # Errors
    /// See [`Property::test_with`].
    #[inline]
    pub fn test(&self) -> Result<Vec<TrialResult>, Error> {
        self.test_with(self.trials)
    }

    /// Run `count` trials in order, each from its own seed split off this property's seed.
    /// # Errors
    /// If `count` is zero or generating an input fails.
    #[inline]
    pub fn test_with(&self, count: usize) -> Result<Vec<TrialResult>, Error> {
        if count == 0 {
            return Err(Error::InvalidArgument(format!(
                "property `{}` must run at least one trial",
                self.name
            )));
        }
        tracing::debug!(property = %self.name, count, seed = self.seed, "testing property");
        let mut root = Seed::new(self.seed);
        (0..count)
            .map(|_| self.test_one(&mut root.split()))
            .collect()
    }

    /// Run the default number of trials and report the first failure.
    /// # Errors
    /// [`Error::Check`] if any trial failed, or see [`Property::test_with`].
    #[inline]
    pub fn check(&self) -> Result<(), Error> {
        self.check_with(self.trials)
    }

    /// Run `count` trials and report the first failure.
    /// # Errors
    /// [`Error::Check`] if any trial failed, or see [`Property::test_with`].
    #[inline]
    pub fn check_with(&self, count: usize) -> Result<(), Error> {
        let results = self.test_with(count)?;
        match results
            .into_iter()
            .enumerate()
            .find_map(|(i, result)| result.into_check_error(&self.name, i))
        {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Check this property, re-raising the first failure as it originally happened.
    /// For use inside `#[test]` functions.
    /// # Panics
    /// If any trial fails, or the property cannot run at all.
    #[inline]
    #[expect(clippy::panic, reason = "for use inside tests")]
    pub fn assert_holds(&self) {
        match self.check() {
            Ok(()) => {}
            Err(Error::Check(e)) => e.raise(),
            Err(e) => panic!("property `{}` could not run: {e}", self.name),
        }
    }

    /// Fix some parameters, giving a property over the rest.
    /// # Errors
    /// If a name is not a parameter of this property.
    #[inline]
    pub fn bind<N: Into<String>, V: Into<Value>, I: IntoIterator<Item = (N, V)>>(
        &self,
        values: I,
    ) -> Result<Self, Error> {
        let mut curried = self.clone();
        for (name, value) in values {
            let name = name.into();
            let Some(i) = curried.params.iter().position(|&(ref n, _)| *n == name) else {
                return Err(Error::InvalidArgument(format!(
                    "property `{}` has no parameter `{name}` to bind",
                    self.name
                )));
            };
            let _: (String, Param) = curried.params.remove(i);
            let _: Option<Value> = curried.bound.insert(name, value);
        }
        Ok(curried)
    }
}
