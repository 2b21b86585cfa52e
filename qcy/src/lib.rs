//! Property-based testing with composable generators,
//! regex-driven strings, and re-raisable failures.
//!
//! ```
//! use qcy::{Body, Property, Registry, TypeTag};
//!
//! let registry = Registry::with_standard();
//! let reversible = Property::builder("reverse twice")
//!     .param("xs", TypeTag::LIST)
//!     .body(Body::new(|bindings: &qcy::Bindings| -> Result<(), qcy::Error> {
//!         let xs: Vec<i64> = bindings.extract("xs")?;
//!         let mut ys = xs.clone();
//!         ys.reverse();
//!         ys.reverse();
//!         assert_eq!(xs, ys);
//!         Ok(())
//!     }))
//!     .build(&registry)
//!     .unwrap();
//! reversible.assert_holds();
//! ```

extern crate alloc;

pub mod arg;
pub mod combinators;
pub mod config;
pub mod error;
pub mod generator;
pub mod outcome;
pub mod panic;
pub mod property;
pub mod regex;
pub mod registry;
pub mod seed;
pub mod standard;
pub mod strings;
pub mod tag;
pub mod value;

pub use {
    ::qcy_macros::qc,
    arg::Arg,
    combinators::{apply, data, elements, frequency, one_of},
    config::Config,
    error::Error,
    generator::{Generator, Producer, Validator, wrap},
    outcome::{CheckError, Failure, TrialResult},
    property::{Body, Coroutine, Emit, IntoCoroutine, Property, Step, declare_property},
    registry::{Registry, TypeTag},
    seed::Seed,
    tag::{Tag, classify, collect, tally},
    value::{Bindings, FromValue, Mapping, Value},
};

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sum_is_commutative() {
        let registry = Registry::with_standard();
        let p = Property::builder("commutative")
            .param("a", TypeTag::INT)
            .param("b", TypeTag::INT)
            .body(Body::new(|b: &Bindings| -> Result<(), Error> {
                let (x, y): (i64, i64) = (b.extract("a")?, b.extract("b")?);
                assert_eq!(x + y, y + x);
                Ok(())
            }))
            .build(&registry)
            .unwrap();
        let () = p.assert_holds();
    }

    #[test]
    fn regex_strings_feed_properties() {
        let registry = Registry::with_standard();
        let p = Property::builder("ipv4 has three dots")
            .param("ip", strings::ipv4())
            .body(Body::new(|b: &Bindings| {
                b.extract::<String>("ip")
                    .is_ok_and(|ip| ip.matches('.').count() == 3)
            }))
            .build(&registry)
            .unwrap();
        let () = p.assert_holds();
    }

    #[test]
    fn combinators_compose() {
        let registry = Registry::with_standard();
        let small = standard::int(0, 9).unwrap();
        let letter = elements(&registry, args!["x", "y"]).unwrap();
        let pair = data(&registry, Arg::from((small, letter))).unwrap();
        let either = one_of(&registry, args![pair, TypeTag::BOOL]).unwrap();
        let mut seed = Seed::default();
        for v in either.samples(&mut seed, 200).unwrap() {
            match v {
                Value::Bool(_) => {}
                Value::Tuple(ref items) => {
                    assert!((0..=9).contains(&items[0].as_int().unwrap()));
                    assert!(items[1] == Value::from("x") || items[1] == Value::from("y"));
                }
                ref other => panic!("unexpected {other}"),
            }
        }
    }
}
