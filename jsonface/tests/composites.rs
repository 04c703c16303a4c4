//! Foods nest in arbitrary composites: struct fields, lists, maps of lists,
//! and foods that ate other foods. The resolver decodes nested foods by
//! calling back into the global entry points.

use std::collections::BTreeMap;
use std::fmt::Debug;

use jsonface::{BoxError, RawJson, from_slice_global, from_str_global, register_global_for};
use jsonface_testhelpers::IPanic;
use serde::{Deserialize, Serialize};

pub trait Food: Debug {
    fn encode(&self) -> serde_json::Value;
}
jsonface::interface!(dyn Food);

impl Serialize for dyn Food {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode().serialize(serializer)
    }
}

jsonface::reflect_struct! {
    #[derive(Debug, Serialize)]
    #[serde(tag = "type")]
    pub struct Water {}
}

jsonface::reflect_struct! {
    #[derive(Debug, Serialize)]
    #[serde(tag = "type")]
    pub struct Ice {}
}

jsonface::reflect_struct! {
    #[derive(Debug, Serialize)]
    #[serde(tag = "type")]
    pub struct Grass {
        pub w: Water,
    }
}

jsonface::reflect_struct! {
    #[derive(Debug, Serialize)]
    #[serde(tag = "type")]
    pub struct Corn {
        pub ws: Vec<Water>,
    }
}

jsonface::reflect_struct! {
    #[derive(Debug, Serialize)]
    #[serde(tag = "type")]
    pub struct Cornflakes {
        pub c: Corn,
    }
}

jsonface::reflect_struct! {
    /// A food that also eats foods.
    #[derive(Debug, Serialize)]
    #[serde(tag = "type")]
    pub struct Cow {
        pub name: String,
        pub ate: Vec<Box<dyn Food>>,
    }
}

jsonface::reflect_struct! {
    #[derive(Debug, Serialize)]
    #[serde(tag = "type")]
    pub struct Milk {}
}

jsonface::reflect_struct! {
    #[derive(Debug, Serialize)]
    #[serde(tag = "type")]
    pub struct Cream {}
}

jsonface::reflect_struct! {
    #[derive(Debug, Serialize)]
    #[serde(tag = "type")]
    pub struct IceCream {
        pub i: Ice,
        pub c: Cream,
    }
}

jsonface::reflect_struct! {
    #[derive(Debug, Serialize)]
    pub struct Girl {
        pub name: String,
        pub meals: BTreeMap<String, Vec<Box<dyn Food>>>,
    }
}

macro_rules! food {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Food for $ty {
                fn encode(&self) -> serde_json::Value {
                    serde_json::to_value(self).expect("foods always encode")
                }
            }
        )*
    };
}

food!(Water, Ice, Grass, Corn, Cornflakes, Cow, Milk, Cream, IceCream);

fn resolve_food(raw: &RawJson) -> Result<Box<dyn Food>, BoxError> {
    #[derive(Deserialize)]
    struct Tag {
        #[serde(rename = "type")]
        kind: String,
    }

    let tag: Tag = raw.parse()?;
    let bytes = raw.as_bytes();
    let food: Box<dyn Food> = match tag.kind.as_str() {
        "Water" => Box::new(Water {}),
        "Ice" => Box::new(Ice {}),
        "Grass" => Box::new(from_slice_global::<Grass>(bytes)?),
        "Corn" => Box::new(from_slice_global::<Corn>(bytes)?),
        "Cornflakes" => Box::new(from_slice_global::<Cornflakes>(bytes)?),
        // Cow holds foods of its own; decoding it resolves them too.
        "Cow" => Box::new(from_slice_global::<Cow>(bytes)?),
        "Milk" => Box::new(Milk {}),
        "Cream" => Box::new(Cream {}),
        "IceCream" => Box::new(from_slice_global::<IceCream>(bytes)?),
        other => return Err(format!("unknown food type: {other}").into()),
    };
    Ok(food)
}

fn gabriella() -> Girl {
    let grass = Grass { w: Water {} };
    let corn1 = Corn {
        ws: vec![Water {}, Water {}],
    };
    let corn2 = Corn {
        ws: vec![Water {}, Water {}, Water {}],
    };
    let cornflakes = Cornflakes { c: corn1 };
    let cow = Cow {
        name: "Bessie".into(),
        ate: vec![Box::new(grass), Box::new(corn2), Box::new(Water {})],
    };
    let icecream = IceCream { i: Ice {}, c: Cream {} };

    let mut meals: BTreeMap<String, Vec<Box<dyn Food>>> = BTreeMap::new();
    meals.insert(
        "Breakfast".into(),
        vec![Box::new(cornflakes), Box::new(Milk {})],
    );
    meals.insert("Lunch".into(), vec![Box::new(icecream)]);
    meals.insert("Dinner".into(), vec![Box::new(cow)]);
    Girl {
        name: "Gabriella".into(),
        meals,
    }
}

#[test]
fn round_trip_through_nested_composites() -> Result<(), IPanic> {
    jsonface_testhelpers::setup();
    // This is the only test in this binary, so the registry is filled once.
    register_global_for(resolve_food);

    let before = gabriella();
    let encoded = serde_json::to_string(&before)?;
    let tree: serde_json::Value = serde_json::from_str(&encoded)?;
    assert_eq!(tree["meals"]["Dinner"][0]["type"], "Cow");
    assert_eq!(tree["meals"]["Dinner"][0]["ate"][1]["ws"].as_array().map(Vec::len), Some(3));

    let after: Girl = from_str_global(&encoded)?;
    assert_eq!(format!("{after:#?}"), format!("{before:#?}"));
    assert_eq!(serde_json::to_string(&after)?, encoded);
    Ok(())
}
