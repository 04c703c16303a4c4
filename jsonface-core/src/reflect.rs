use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::mpsc::Receiver;

use serde::de::DeserializeOwned;

use crate::{
    ArrayDef, BoxError, ChannelDef, Def, ListDef, MapDef, Object, PathStep, PointerDef, RawJson,
    ScalarType, Shape, Value, ValueError, ValueErrorKind,
};

/// Types that describe themselves with a [`Shape`] and can be rebuilt from a
/// decoded [`Value`].
///
/// Implement it for your own types with [`reflect_struct!`](crate::reflect_struct),
/// [`interface!`](crate::interface) or [`reflect_via_serde!`](crate::reflect_via_serde).
pub trait Reflect: Sized + 'static {
    /// The shape of this type.
    const SHAPE: &'static Shape;

    /// Convert a decoded value into this type.
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

/// Canonical qualified name of an interface-shaped type, the key its
/// resolver is registered under.
pub fn interface_name<T: Reflect>() -> Option<&'static str> {
    T::SHAPE.interface_name()
}

/// Rust-like rendering of a type's shape, e.g. `HashMap<String, my_app::Food>`.
pub fn type_name<T: Reflect>() -> String {
    T::SHAPE.to_string()
}

fn out_of_range(value: impl ToString, target: &'static str) -> ValueError {
    ValueError::new(ValueErrorKind::NumberOutOfRange {
        value: value.to_string(),
        target,
    })
}

macro_rules! impl_reflect_int {
    ($($ty:ty => $scalar:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                const SHAPE: &'static Shape = &const {
                    Shape::new::<$ty>(stringify!($ty), Def::Scalar(ScalarType::$scalar))
                };

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::I64(n) => <$ty>::try_from(n).map_err(|_| out_of_range(n, stringify!($ty))),
                        Value::U64(n) => <$ty>::try_from(n).map_err(|_| out_of_range(n, stringify!($ty))),
                        other => Err(ValueError::mismatch(stringify!($ty), other.kind_name())),
                    }
                }
            }
        )*
    };
}

impl_reflect_int! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => ISize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => USize,
}

macro_rules! impl_reflect_float {
    ($($ty:ty => $scalar:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                const SHAPE: &'static Shape = &const {
                    Shape::new::<$ty>(stringify!($ty), Def::Scalar(ScalarType::$scalar))
                };

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::F64(n) => Ok(n as $ty),
                        Value::I64(n) => Ok(n as $ty),
                        Value::U64(n) => Ok(n as $ty),
                        other => Err(ValueError::mismatch(stringify!($ty), other.kind_name())),
                    }
                }
            }
        )*
    };
}

impl_reflect_float! {
    f32 => F32,
    f64 => F64,
}

impl Reflect for bool {
    const SHAPE: &'static Shape = &const { Shape::new::<bool>("bool", Def::Scalar(ScalarType::Bool)) };

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(ValueError::mismatch("bool", other.kind_name())),
        }
    }
}

impl Reflect for String {
    const SHAPE: &'static Shape =
        &const { Shape::new::<String>("String", Def::Scalar(ScalarType::String)) };

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(ValueError::mismatch("String", other.kind_name())),
        }
    }
}

impl<T: Reflect> Reflect for Option<T> {
    const SHAPE: &'static Shape = &const {
        Shape::new::<Self>("Option", Def::Pointer(PointerDef { pointee: T::SHAPE }))
    };

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Pointer(None) | Value::Null => Ok(None),
            Value::Pointer(Some(inner)) => T::from_value(*inner)
                .map(Some)
                .map_err(|e| e.within(PathStep::Deref)),
            other => Err(ValueError::mismatch("Option", other.kind_name())),
        }
    }
}

/// `Box<T>` is plain indirection: it shares `T`'s shape, so the JSON for a
/// `Box<T>` is the JSON for a `T`. Pair it with `Option` for nullable links
/// such as `Option<Box<Node>>`.
impl<T: Reflect> Reflect for Box<T> {
    const SHAPE: &'static Shape = T::SHAPE;

    fn from_value(value: Value) -> Result<Self, ValueError> {
        T::from_value(value).map(Box::new)
    }
}

fn collect_elements<T: Reflect>(items: Vec<Value>) -> Result<Vec<T>, ValueError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| T::from_value(item).map_err(|e| e.within(PathStep::Index(i))))
        .collect()
}

impl<T: Reflect> Reflect for Vec<T> {
    const SHAPE: &'static Shape =
        &const { Shape::new::<Self>("Vec", Def::List(ListDef { elem: T::SHAPE })) };

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) => collect_elements(items),
            other => Err(ValueError::mismatch("Vec", other.kind_name())),
        }
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    const SHAPE: &'static Shape = &const {
        Shape::new::<Self>("Array", Def::Array(ArrayDef { elem: T::SHAPE, len: N }))
    };

    fn from_value(value: Value) -> Result<Self, ValueError> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(ValueError::mismatch("array", other.kind_name())),
        };
        let got = items.len();
        let elements = collect_elements::<T>(items)?;
        <[T; N]>::try_from(elements).map_err(|_| {
            ValueError::new(ValueErrorKind::LengthMismatch { expected: N, got })
        })
    }
}

fn collect_entries<K: Reflect, V: Reflect>(
    value: Value,
    expected: &'static str,
    mut insert: impl FnMut(K, V),
) -> Result<(), ValueError> {
    let entries = match value {
        Value::Map(entries) => entries,
        other => return Err(ValueError::mismatch(expected, other.kind_name())),
    };
    for (i, (key, value)) in entries.into_iter().enumerate() {
        let key = K::from_value(key).map_err(|e| e.within(PathStep::MapKey(i)))?;
        let value = V::from_value(value).map_err(|e| e.within(PathStep::MapValue(i)))?;
        insert(key, value);
    }
    Ok(())
}

impl<K, V> Reflect for HashMap<K, V>
where
    K: Reflect + Eq + Hash,
    V: Reflect,
{
    const SHAPE: &'static Shape = &const {
        Shape::new::<Self>(
            "HashMap",
            Def::Map(MapDef {
                key: K::SHAPE,
                value: V::SHAPE,
            }),
        )
    };

    fn from_value(value: Value) -> Result<Self, ValueError> {
        let mut map = HashMap::new();
        collect_entries::<K, V>(value, "HashMap", |k, v| {
            map.insert(k, v);
        })?;
        Ok(map)
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Reflect + Ord,
    V: Reflect,
{
    const SHAPE: &'static Shape = &const {
        Shape::new::<Self>(
            "BTreeMap",
            Def::Map(MapDef {
                key: K::SHAPE,
                value: V::SHAPE,
            }),
        )
    };

    fn from_value(value: Value) -> Result<Self, ValueError> {
        let mut map = BTreeMap::new();
        collect_entries::<K, V>(value, "BTreeMap", |k, v| {
            map.insert(k, v);
        })?;
        Ok(map)
    }
}

fn capture_raw(raw: &RawJson) -> Result<Value, BoxError> {
    Ok(Value::Capture(raw.clone()))
}

impl Reflect for RawJson {
    const SHAPE: &'static Shape =
        &const { Shape::new::<RawJson>("RawJson", Def::Opaque).with_decode_hook(capture_raw) };

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Capture(raw) => Ok(raw),
            Value::Null => Ok(RawJson::default()),
            other => Err(ValueError::mismatch("RawJson", other.kind_name())),
        }
    }
}

impl<T: Reflect> Reflect for Receiver<T> {
    const SHAPE: &'static Shape =
        &const { Shape::new::<Self>("Receiver", Def::Channel(ChannelDef { elem: T::SHAPE })) };

    fn from_value(_value: Value) -> Result<Self, ValueError> {
        Err(ValueError::new(ValueErrorKind::Unsupported {
            target: "Receiver",
        }))
    }
}

/// Take fields out of a decoded struct by name. Used by
/// [`reflect_struct!`](crate::reflect_struct).
pub struct StructFields {
    fields: Vec<(&'static str, Value)>,
}

impl StructFields {
    /// Unpack a struct value.
    pub fn new(value: Value, expected: &'static str) -> Result<Self, ValueError> {
        match value {
            Value::Struct(fields) => Ok(StructFields { fields }),
            other => Err(ValueError::mismatch(expected, other.kind_name())),
        }
    }

    /// Convert the named field. A field that is absent from the value
    /// converts from its zero value.
    pub fn take<T: Reflect>(&mut self, name: &'static str) -> Result<T, ValueError> {
        let value = match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, value)) => core::mem::replace(value, Value::Null),
            None => Value::zero(T::SHAPE),
        };
        T::from_value(value).map_err(|e| e.within(PathStep::Field(name)))
    }
}

/// Pull a `T` out of a filled interface slot.
pub fn interface_from_value<T: 'static>(
    value: Value,
    name: &'static str,
) -> Result<T, ValueError> {
    match value {
        Value::Interface(Some(object)) => downcast_object(object, name),
        Value::Interface(None) | Value::Null => {
            Err(ValueError::new(ValueErrorKind::NullValue { expected: name }))
        }
        other => Err(ValueError::mismatch(name, other.kind_name())),
    }
}

/// Pull a `T` out of a value produced by a decode hook.
pub fn object_from_value<T: 'static>(value: Value, name: &'static str) -> Result<T, ValueError> {
    match value {
        Value::Object(object) => downcast_object(object, name),
        Value::Null => Err(ValueError::new(ValueErrorKind::NullValue { expected: name })),
        other => Err(ValueError::mismatch(name, other.kind_name())),
    }
}

/// Like [`object_from_value`], but a missing value is given to serde as
/// `null`, so types such as `Option` or unit structs still convert.
pub fn serde_from_value<T: DeserializeOwned + 'static>(
    value: Value,
    name: &'static str,
) -> Result<T, ValueError> {
    match value {
        Value::Null => serde_json::from_value(serde_json::Value::Null)
            .map_err(|_| ValueError::new(ValueErrorKind::NullValue { expected: name })),
        other => object_from_value(other, name),
    }
}

fn downcast_object<T: 'static>(object: Object, name: &'static str) -> Result<T, ValueError> {
    object.downcast::<T>().map_err(|object| {
        ValueError::new(ValueErrorKind::WrongObject {
            expected: name,
            got: object.type_name(),
        })
    })
}

/// Decode hook that hands the raw text to serde.
pub fn decode_with_serde<T: DeserializeOwned + 'static>(raw: &RawJson) -> Result<Value, BoxError> {
    let value: T = raw.parse()?;
    Ok(Value::Object(Object::new(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Path;

    #[test]
    fn integers_are_range_checked() {
        assert_eq!(u8::from_value(Value::U64(255)).unwrap(), 255);
        let err = u8::from_value(Value::U64(256)).unwrap_err();
        assert_eq!(err.code(), "jsonface::value::out_of_range");
        assert_eq!(i64::from_value(Value::I64(-3)).unwrap(), -3);
        assert!(u32::from_value(Value::I64(-1)).is_err());
    }

    #[test]
    fn errors_carry_the_path() {
        let value = Value::List(vec![
            Value::Pointer(Some(Box::new(Value::I64(1)))),
            Value::Pointer(Some(Box::new(Value::String("two".into())))),
        ]);
        let err = <Vec<Option<i32>>>::from_value(value).unwrap_err();
        assert_eq!(
            err.path,
            Path::from(vec![PathStep::Index(1), PathStep::Deref])
        );
        insta::assert_snapshot!(err, @"type mismatch: expected i32, got string at [1]*");
    }

    #[test]
    fn arrays_check_length() {
        let ok = <[u8; 2]>::from_value(Value::Array(vec![Value::U64(1), Value::U64(2)])).unwrap();
        assert_eq!(ok, [1, 2]);
        let err = <[u8; 2]>::from_value(Value::Array(vec![Value::U64(1)])).unwrap_err();
        assert_eq!(
            err.kind,
            ValueErrorKind::LengthMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn maps_take_the_last_duplicate() {
        let value = Value::Map(vec![
            (Value::String("a".into()), Value::I64(1)),
            (Value::String("a".into()), Value::I64(2)),
        ]);
        let map = <BTreeMap<String, i32>>::from_value(value).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], 2);
    }

    #[test]
    fn raw_json_keeps_its_text() {
        let hook = RawJson::SHAPE.decode_hook.unwrap();
        let value = hook(&RawJson::new("[1, 2]")).unwrap();
        assert_eq!(RawJson::from_value(value).unwrap().as_str(), "[1, 2]");
    }

    #[test]
    fn boxes_share_the_pointee_shape() {
        assert_eq!(<Box<u16>>::SHAPE.id, u16::SHAPE.id);
        assert_eq!(<Option<Box<String>>>::SHAPE.to_string(), "Option<String>");

        let boxed = <Vec<Box<u16>>>::from_value(Value::List(vec![Value::U64(7)])).unwrap();
        assert_eq!(boxed, vec![Box::new(7)]);
        let err = <Box<u16>>::from_value(Value::Bool(true)).unwrap_err();
        assert_eq!(err.code(), "jsonface::value::type_mismatch");
    }

    #[test]
    fn channels_never_convert() {
        let err = <Receiver<i32>>::from_value(Value::Null).unwrap_err();
        assert_eq!(err.code(), "jsonface::value::unsupported");
    }
}
