//! Without a registered slot in the target, decoding is exactly the generic
//! decoder.

use std::collections::BTreeMap;

use jsonface::{BoxError, RawJson, Reflect, Registry, Shape, Value, de, decode_value, from_str};
use jsonface_testhelpers::IPanic;
use serde::Deserialize;

pub trait Unused {}
jsonface::interface!(dyn Unused);

pub trait Elsewhere {}
jsonface::interface!(dyn Elsewhere);

struct Nothing;
impl Elsewhere for Nothing {}

jsonface::reflect_struct! {
    #[derive(Debug, PartialEq, Deserialize)]
    pub struct Station {
        pub name: String,
        pub platforms: Vec<u16>,
        pub coords: [f64; 2],
        pub staffed: bool,
        pub lines: BTreeMap<String, Option<i32>>,
    }
}

jsonface::reflect_struct! {
    pub struct WithNullSlot {
        pub label: String,
        pub unused: Option<Box<dyn Unused>>,
    }
}

jsonface::reflect_struct! {
    #[derive(Debug, PartialEq, Deserialize)]
    pub struct Link {
        pub value: i32,
        pub next: Option<Box<Link>>,
    }
}

const CHAIN: &str = r#"{"value": 1, "next": {"value": 2, "next": {"value": 3, "next": null}}}"#;

const STATION: &str = r#"{
    "name": "Central",
    "platforms": [1, 2, 9],
    "coords": [52.37, 4.9],
    "staffed": true,
    "lines": {"red": 3, "blue": null}
}"#;

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_for(|_raw: &RawJson| -> Result<Box<dyn Elsewhere>, BoxError> {
        Ok(Box::new(Nothing))
    });
    registry
}

fn both_ways(input: &str, shape: &'static Shape) -> (String, String) {
    let mut value = Value::zero(shape);
    decode_value(input.as_bytes(), shape, &mut value, &registry()).unwrap();
    let direct = de::decode_shape(input.as_bytes(), shape).unwrap();
    (format!("{value:?}"), format!("{direct:?}"))
}

#[test]
fn same_values_as_the_generic_decoder() {
    jsonface_testhelpers::setup();

    let cases: &[(&str, &'static Shape)] = &[
        (STATION, Station::SHAPE),
        ("[1, -2, 3]", <Vec<i64>>::SHAPE),
        ("[[true], [], null]", <Vec<Vec<bool>>>::SHAPE),
        (r#"{"7": "seven", "8": ""}"#, <BTreeMap<u8, String>>::SHAPE),
        ("[0.5, 1]", <[f32; 3]>::SHAPE),
        (r#"{"label": "x", "unused": null}"#, WithNullSlot::SHAPE),
        ("null", <Option<String>>::SHAPE),
        (CHAIN, Link::SHAPE),
    ];
    for &(input, shape) in cases {
        let (fast, direct) = both_ways(input, shape);
        assert_eq!(fast, direct, "decoding {input} into {shape}");
    }
}

#[test]
fn same_values_as_serde() -> Result<(), IPanic> {
    jsonface_testhelpers::setup();

    let ours: Station = from_str(STATION, &registry())?;
    let theirs: Station = serde_json::from_str(STATION)?;
    assert_eq!(ours, theirs);
    assert_eq!(ours.lines.get("blue"), Some(&None));
    Ok(())
}

#[test]
fn fast_path_builds_no_shadow() {
    jsonface_testhelpers::setup();

    let registry = registry();
    for shape in [
        Station::SHAPE,
        WithNullSlot::SHAPE,
        Link::SHAPE,
        <Vec<Option<Box<dyn Unused>>>>::SHAPE,
    ] {
        let shadow = jsonface::derive(shape, &registry).unwrap();
        assert!(!shadow.needs_shadow(), "{shape} should not need a shadow");
    }
}

#[test]
fn recursive_links_decode_directly() -> Result<(), IPanic> {
    jsonface_testhelpers::setup();

    let ours: Link = from_str(CHAIN, &registry())?;
    let theirs: Link = serde_json::from_str(CHAIN)?;
    assert_eq!(ours, theirs);

    let mut values = Vec::new();
    let mut link = Some(&ours);
    while let Some(current) = link {
        values.push(current.value);
        link = current.next.as_deref();
    }
    assert_eq!(values, [1, 2, 3]);

    let Err(err) = from_str::<Link>(r#"{"value": 1, "next": {"value": "two"}}"#, &registry())
    else {
        panic!("a string is not an i32");
    };
    assert_eq!(err.code(), "jsonface::syntax");
    assert!(err.to_string().contains("at next*.value"));
    Ok(())
}
