use std::sync::mpsc::Receiver;

use jsonface::{
    BoxError, DecodeError, DeriveErrorKind, Object, RawJson, Reflect, Registry, RegistryError,
    Value, decode_value, from_str,
};
use jsonface_testhelpers::IPanic;

pub trait Sound {
    fn noise(&self) -> &'static str;
}
jsonface::interface!(dyn Sound);

struct Moo;

impl Sound for Moo {
    fn noise(&self) -> &'static str {
        "moo"
    }
}

fn moo(_raw: &RawJson) -> Result<Box<dyn Sound>, BoxError> {
    Ok(Box::new(Moo))
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_for(moo);
    registry
}

#[test]
fn unregistered_slot_accepts_null() -> Result<(), IPanic> {
    jsonface_testhelpers::setup();

    let sound: Option<Box<dyn Sound>> = from_str("null", &Registry::new())?;
    assert!(sound.is_none());

    let mut value = Value::zero(<Box<dyn Sound>>::SHAPE);
    decode_value(b"null", <Box<dyn Sound>>::SHAPE, &mut value, &Registry::new())?;
    assert!(matches!(value, Value::Interface(None)));

    let sounds: Vec<Option<Box<dyn Sound>>> = from_str("[null, null]", &Registry::new())?;
    assert_eq!(sounds.len(), 2);
    Ok(())
}

#[test]
fn unregistered_slot_rejects_values() {
    jsonface_testhelpers::setup();

    let Err(err) = from_str::<Vec<Box<dyn Sound>>>(r#"[{"noise": "moo"}]"#, &Registry::new())
    else {
        panic!("nothing can resolve an unregistered slot");
    };
    assert!(matches!(err, DecodeError::Syntax(_)));
    assert!(!err.is_resolver());
    assert!(err.to_string().starts_with(
        "syntax error: cannot decode into unregistered polymorphic type errors::Sound at [0]"
    ));
}

#[test]
fn null_into_a_required_slot() {
    jsonface_testhelpers::setup();

    // With a resolver, `null` is the resolver's to judge.
    let mut picky = Registry::new();
    picky.register_for(|raw: &RawJson| -> Result<Box<dyn Sound>, BoxError> {
        if raw.is_null() {
            return Err("silence is not a sound".into());
        }
        moo(raw)
    });
    let Err(err) = from_str::<Box<dyn Sound>>("null", &picky) else {
        panic!("the resolver rejects null");
    };
    assert!(err.is_resolver());
    assert_eq!(err.to_string(), "silence is not a sound");

    // Without one, the slot decodes to nothing and `Box<dyn Sound>` cannot
    // hold that.
    let Err(err) = from_str::<Box<dyn Sound>>("null", &Registry::new()) else {
        panic!("`Box<dyn Sound>` cannot be null");
    };
    assert_eq!(err.code(), "jsonface::value::null");
}

#[test]
#[should_panic(expected = "a resolver for errors::Sound is already registered")]
fn duplicate_registration_panics() {
    let mut registry = registry();
    registry.register_for(moo);
}

#[test]
fn duplicate_registration_can_be_checked() {
    jsonface_testhelpers::setup();

    let mut registry = registry();
    let err = registry.try_register_for(moo).unwrap_err();
    assert!(matches!(&err, RegistryError::Duplicate { name } if name == "errors::Sound"));
    assert_eq!(err.code(), "jsonface::registry::duplicate");

    let err = registry
        .try_register("errors::Sound", |raw: &RawJson| moo(raw).map(Object::new))
        .unwrap_err();
    insta::assert_snapshot!(err, @"a resolver for errors::Sound is already registered");
    assert_eq!(registry.len(), 1);
}

#[test]
fn typed_registration_needs_an_interface() {
    jsonface_testhelpers::setup();

    let err = Registry::new()
        .try_register_for(|_raw: &RawJson| -> Result<Vec<String>, BoxError> { Ok(Vec::new()) })
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotAnInterface { .. }));
    assert_eq!(err.code(), "jsonface::registry::not_an_interface");
}

#[test]
fn invalid_destination() {
    jsonface_testhelpers::setup();

    let mut dest = Value::String("not a list".into());
    let err = decode_value(b"[]", <Vec<u8>>::SHAPE, &mut dest, &registry()).unwrap_err();
    assert_eq!(err.code(), "jsonface::invalid_destination");
    insta::assert_snapshot!(err, @"invalid destination: cannot decode Vec<u8> into a string value");
    assert!(err.help().is_some());
    assert!(matches!(dest, Value::String(ref s) if s == "not a list"));

    let mut dest = Value::Array(vec![Value::Null]);
    let err = decode_value(b"[1, 2]", <[u8; 2]>::SHAPE, &mut dest, &registry()).unwrap_err();
    assert_eq!(err.code(), "jsonface::invalid_destination");
}

#[test]
fn channels_are_not_decoded() {
    jsonface_testhelpers::setup();

    let Err(err) = from_str::<Receiver<u8>>("[1]", &registry()) else {
        panic!("channels cannot be decoded");
    };
    assert_eq!(err.code(), "jsonface::derive::channel");
    insta::assert_snapshot!(err, @"channel decoding is not implemented: Receiver<u8> at <root>");

    jsonface::reflect_struct! {
        pub struct Pipe {
            pub name: String,
            pub queue: Option<Receiver<String>>,
        }
    }
    let Err(err) = from_str::<Pipe>(r#"{"name": "p"}"#, &Registry::new()) else {
        panic!("channels cannot be decoded, even when absent");
    };
    assert!(
        matches!(&err, DecodeError::Derive(e) if matches!(e.kind, DeriveErrorKind::ChannelUnsupported { .. }))
    );
    insta::assert_snapshot!(
        err,
        @"channel decoding is not implemented: Receiver<String> at queue*"
    );
}

#[test]
fn private_slot_is_a_configuration_error() {
    jsonface_testhelpers::setup();

    jsonface::reflect_struct! {
        pub struct Barn {
            pub name: String,
            sounds: Vec<Box<dyn Sound>>,
        }
    }

    let Err(err) = from_str::<Barn>(r#"{"name": "red", "sounds": [1]}"#, &registry()) else {
        panic!("a private slot cannot be filled");
    };
    assert_eq!(err.code(), "jsonface::derive::private_field");
    assert_eq!(err.help(), Some("declare the field `pub`"));

    // With nothing to resolve, the private field decodes as usual.
    let barn: Barn = from_str(r#"{"name": "red", "sounds": []}"#, &Registry::new()).unwrap();
    assert_eq!(barn.name, "red");
    assert!(barn.sounds.is_empty());
}

jsonface::reflect_struct! {
    pub struct Herd {
        pub leader: Option<Box<dyn Sound>>,
        pub followers: Vec<Herd>,
    }
}

#[test]
fn recursive_shapes_with_slots_are_rejected() {
    jsonface_testhelpers::setup();

    let Err(err) = from_str::<Herd>(r#"{"leader": 1}"#, &registry()) else {
        panic!("a recursive shape holding a registered slot cannot be shadowed");
    };
    assert_eq!(err.code(), "jsonface::derive::recursive_shape");

    // Without a resolver the same shape decodes directly.
    let herd: Herd = from_str(
        r#"{"leader": null, "followers": [{"followers": []}, {}]}"#,
        &Registry::new(),
    )
    .unwrap();
    assert_eq!(herd.followers.len(), 2);
}

#[test]
fn numbers_are_range_checked() {
    jsonface_testhelpers::setup();

    jsonface::reflect_struct! {
        pub struct Cow {
            pub sound: Box<dyn Sound>,
            pub age: u8,
        }
    }

    let Err(err) = from_str::<Cow>(r#"{"sound": "moo", "age": 300}"#, &registry()) else {
        panic!("300 does not fit in a u8");
    };
    assert_eq!(err.code(), "jsonface::syntax");
    assert!(err.to_string().contains("number 300 out of range for u8 at age"));

    let cow: Cow = from_str(r#"{"sound": "moo", "age": 3}"#, &registry()).unwrap();
    assert_eq!(cow.sound.noise(), "moo");
    assert_eq!(cow.age, 3);
}

#[test]
fn resolved_objects_must_fit_their_slot() {
    jsonface_testhelpers::setup();

    let mut registry = Registry::new();
    registry.register("errors::Sound", |_raw: &RawJson| Ok(Object::new(42u32)));

    let Err(err) = from_str::<Vec<Box<dyn Sound>>>("[1]", &registry) else {
        panic!("a u32 is not a sound");
    };
    assert_eq!(err.code(), "jsonface::reconcile::not_assignable");
    insta::assert_snapshot!(err, @"u32 is not assignable to errors::Sound at [0]");
}

#[test]
fn opaque_types_need_a_decode_hook() {
    jsonface_testhelpers::setup();

    struct Handle;
    impl Reflect for Handle {
        const SHAPE: &'static jsonface::Shape =
            &const { jsonface::Shape::new::<Handle>("Handle", jsonface::Def::Opaque) };

        fn from_value(_value: Value) -> Result<Self, jsonface::ValueError> {
            Ok(Handle)
        }
    }

    let Err(err) = from_str::<Vec<Handle>>("[]", &Registry::new()) else {
        panic!("an opaque type without a hook cannot be decoded");
    };
    assert_eq!(err.code(), "jsonface::derive::unsupported_kind");
    insta::assert_snapshot!(err, @"unsupported kind: Handle (opaque) at [0]");
}
