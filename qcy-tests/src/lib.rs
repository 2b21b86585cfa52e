#![allow(
    clippy::missing_panics_doc,
    clippy::tests_outside_test_module,
    clippy::unwrap_used,
    reason = "testing-only module"
)]

use qcy::{
    Arg, Emit, Error, Registry, Tag, TypeTag, Value, args, classify, collect, combinators, qc,
    standard, strings,
};

#[qc(xs = TypeTag::LIST)]
pub fn reverse_twice(xs: Vec<i64>) -> bool {
    let mut ys = xs.clone();
    ys.reverse();
    ys.reverse();
    xs == ys
}

#[qc(address = strings::email(), trials = 50)]
pub fn emails_have_one_at(address: String) -> bool {
    address.matches('@').count() == 1
}

#[qc(x = standard::int(0, 100).unwrap(), seed = 3)]
pub fn everything_is_small(x: i64) -> bool {
    x < 10
}

#[qc(s = strings::regex(r"[0-9]{1,9}").unwrap())]
pub fn digits_parse(s: String) -> anyhow::Result<()> {
    let n: u32 = s.parse()?;
    anyhow::ensure!(n.to_string().len() <= s.len(), "{n} grew from {s:?}");
    Ok(())
}

#[qc(s = "twelve")]
pub fn spelled_out_numbers_parse(s: String) -> anyhow::Result<()> {
    let _: u8 = s.parse()?;
    Ok(())
}

#[qc(x = TypeTag::INT, step = 2_i64, trials = 40)]
pub fn parity(x: i64, step: i64) -> Emit<Vec<Option<Tag>>> {
    Emit(vec![
        classify(x < 0, "negative"),
        collect((x + step).rem_euclid(2) == x.rem_euclid(2)),
    ])
}

#[qc(flag = TypeTag::BOOL)]
pub fn explodes_on_true(flag: bool) {
    assert!(!flag, "flag was set");
}

#[test]
fn list_reversal_holds() {
    let registry = Registry::with_standard();
    let () = reverse_twice(&registry).unwrap().assert_holds();
}

#[test]
fn regex_backed_parameters() {
    let registry = Registry::with_standard();
    let p = emails_have_one_at(&registry).unwrap();
    let () = pretty_assertions::assert_eq!(p.trials(), 50);
    let () = p.assert_holds();
    let () = digits_parse(&registry).unwrap().assert_holds();
}

#[test]
fn failure_reports_the_data() {
    let registry = Registry::with_standard();
    let p = everything_is_small(&registry).unwrap();
    let Err(Error::Check(e)) = p.check() else {
        panic!("expected a failing check");
    };
    let () = pretty_assertions::assert_eq!(e.property(), "everything_is_small");
    let () = pretty_assertions::assert_eq!(e.failure().message(), "property was falsified");
    let x = e.bindings().get("x").and_then(Value::as_int).unwrap();
    assert!(x >= 10, "{x}");
    let diagnostic = e.to_string();
    assert!(diagnostic.contains(&format!("  x = {x}")), "{diagnostic}");
}

#[test]
fn returned_errors_keep_their_type() {
    let registry = Registry::with_standard();
    let results = spelled_out_numbers_parse(&registry).unwrap().test_with(1).unwrap();
    let failure = results[0].failure().unwrap();
    assert!(failure.kind().ends_with("ParseIntError"), "{}", failure.kind());
    let () = pretty_assertions::assert_eq!(failure.message(), "invalid digit found in string");
    assert!(!failure.is_panic());
}

#[test]
fn failures_are_reproducible() {
    let registry = Registry::with_standard();
    let first = everything_is_small(&registry).unwrap().check();
    let second = everything_is_small(&registry).unwrap().check();
    let (Err(Error::Check(a)), Err(Error::Check(b))) = (first, second) else {
        panic!("expected both checks to fail");
    };
    let () = pretty_assertions::assert_eq!(a.trial(), b.trial());
    let () = pretty_assertions::assert_eq!(a.bindings(), b.bindings());
}

#[test]
fn tags_are_tallied() {
    let registry = Registry::with_standard();
    let results = parity(&registry).unwrap().test().unwrap();
    let () = pretty_assertions::assert_eq!(results.len(), 40);
    let counts = qcy::tally(&results);
    let () = pretty_assertions::assert_eq!(counts.get(&Tag::new(true)), Some(&40));
    assert!(counts.get(&Tag::new(false)).is_none());
    assert!(results.iter().all(|r| r.bindings().get("step") == Some(&Value::Int(2))));
}

#[test]
#[should_panic(expected = "flag was set")]
fn panics_are_reraised() {
    let registry = Registry::with_standard();
    let () = explodes_on_true(&registry).unwrap().assert_holds();
}

#[test]
fn bound_parameters_stay_fixed() {
    let registry = Registry::with_standard();
    let p = explodes_on_true(&registry)
        .unwrap()
        .bind([("flag", false)])
        .unwrap();
    assert!(!p.parametrized());
    let () = p.assert_holds();
}

#[test]
fn combinators_feed_properties() {
    let registry = Registry::with_standard();
    let heads = qcy::Generator::constant(Value::from("heads"));
    let tails = qcy::Generator::constant(Value::from("tails"));
    let coin = combinators::frequency(&registry, args![(9_i64, heads), (1_i64, tails)]).unwrap();
    let shape = combinators::data(
        &registry,
        Arg::map([("side", Arg::from(coin)), ("n", Arg::from(TypeTag::INT))]),
    )
    .unwrap();
    let p = qcy::Property::builder("sides")
        .param("record", shape)
        .body(qcy::Body::new(|b: &qcy::Bindings| -> Result<(), Error> {
            let record: qcy::Mapping = b.extract("record")?;
            let side = record.get(&Value::from("side")).and_then(Value::as_str);
            assert!(matches!(side, Some("heads" | "tails")), "{record}");
            Ok(())
        }))
        .build(&registry)
        .unwrap();
    let () = p.assert_holds();
}

#[test]
fn applied_functions_see_fresh_draws() {
    let registry = Registry::with_standard();
    let sum = combinators::apply(
        &registry,
        |xs: &[Value], _: &qcy::Bindings| Value::Int(xs.iter().filter_map(Value::as_int).sum()),
        args![standard::int(1, 3).unwrap(), standard::int(10, 30).unwrap()],
        vec![],
    )
    .unwrap();
    let mut seed = qcy::Seed::new(11);
    for v in sum.samples(&mut seed, 500).unwrap() {
        let n = v.as_int().unwrap();
        assert!((11..=33).contains(&n), "{n}");
    }
}

#[test]
fn unknown_types_are_rejected_at_build() {
    let registry = Registry::new();
    let built = qcy::Property::builder("needs ints")
        .param("x", TypeTag::INT)
        .body(qcy::Body::new(|_| ()))
        .build(&registry);
    assert!(matches!(built, Err(Error::UnknownGenerator { .. })));
}
