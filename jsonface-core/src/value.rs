//! The dynamic value tree decodes produce.
//!
//! Decoding never materializes Rust types at runtime. Instead it builds a
//! [`Value`] tree that mirrors a [`Shape`], and the typed layer converts the
//! finished tree with [`Reflect::from_value`](crate::Reflect::from_value).

use core::any::Any;
use core::fmt;

use crate::{Def, RawJson, ScalarType, Shape};

/// An owned, type-erased concrete value, as returned by a resolver.
pub struct Object {
    type_name: &'static str,
    inner: Box<dyn Any>,
}

impl Object {
    /// Erase a concrete value.
    pub fn new<T: 'static>(value: T) -> Self {
        Object {
            type_name: core::any::type_name::<T>(),
            inner: Box::new(value),
        }
    }

    /// The Rust type name the object was created from.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the object holds a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrow the object as a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Take the `T` out, or get the object back if it holds something else.
    pub fn downcast<T: 'static>(self) -> Result<T, Object> {
        let Object { type_name, inner } = self;
        match inner.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(inner) => Err(Object { type_name, inner }),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.type_name)
    }
}

/// A decoded value, tagged by kind.
#[derive(Debug)]
pub enum Value {
    /// JSON `null`, or the zero value of a handle.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    I64(i64),
    /// An unsigned integer.
    U64(u64),
    /// A floating point number.
    F64(f64),
    /// A string.
    String(String),
    /// A nullable pointer.
    Pointer(Option<Box<Value>>),
    /// A polymorphic slot, filled or null.
    Interface(Option<Object>),
    /// A fixed-size sequence.
    Array(Vec<Value>),
    /// A variable-size sequence.
    List(Vec<Value>),
    /// Struct fields in declaration order.
    Struct(Vec<(&'static str, Value)>),
    /// Map entries. Keys can be objects, so this is a list of pairs.
    Map(Vec<(Value, Value)>),
    /// Raw JSON text kept for later.
    Capture(RawJson),
    /// A value produced by a decode hook.
    Object(Object),
}

impl Value {
    /// The zero value of a shape.
    pub fn zero(shape: &'static Shape) -> Value {
        match shape.def {
            Def::Scalar(scalar) => match scalar {
                ScalarType::Bool => Value::Bool(false),
                ScalarType::String => Value::String(String::new()),
                ScalarType::F32 | ScalarType::F64 => Value::F64(0.0),
                ScalarType::Handle => Value::Null,
                s if s.is_unsigned() => Value::U64(0),
                _ => Value::I64(0),
            },
            Def::Pointer(_) => Value::Pointer(None),
            Def::Interface(_) => Value::Interface(None),
            Def::Array(adef) => Value::Array((0..adef.len).map(|_| Value::zero(adef.elem)).collect()),
            Def::List(_) => Value::List(Vec::new()),
            Def::Struct(sdef) => Value::Struct(
                sdef.fields
                    .iter()
                    .map(|field| (field.name, Value::zero(field.shape())))
                    .collect(),
            ),
            Def::Map(_) => Value::Map(Vec::new()),
            Def::Channel(_) | Def::Opaque => Value::Null,
        }
    }

    /// Whether this value's top-level kind can live at a location of `shape`.
    pub fn fits(&self, shape: &'static Shape) -> bool {
        if shape.decode_hook.is_some() {
            return true;
        }
        match shape.def {
            Def::Scalar(ScalarType::Bool) => matches!(self, Value::Bool(_)),
            Def::Scalar(ScalarType::String) => matches!(self, Value::String(_)),
            Def::Scalar(ScalarType::Handle) => matches!(self, Value::Null),
            Def::Scalar(s) if s.is_float() => {
                matches!(self, Value::F64(_) | Value::I64(_) | Value::U64(_))
            }
            Def::Scalar(_) => matches!(self, Value::I64(_) | Value::U64(_)),
            Def::Pointer(_) => matches!(self, Value::Pointer(_) | Value::Null),
            Def::Interface(_) => matches!(self, Value::Interface(_) | Value::Null),
            Def::Array(adef) => matches!(self, Value::Array(items) if items.len() == adef.len),
            Def::List(_) => matches!(self, Value::List(_)),
            Def::Struct(_) => matches!(self, Value::Struct(_)),
            Def::Map(_) => matches!(self, Value::Map(_)),
            Def::Channel(_) | Def::Opaque => matches!(self, Value::Null),
        }
    }

    /// Short name of the value's kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Pointer(_) => "pointer",
            Value::Interface(_) => "interface",
            Value::Array(_) => "array",
            Value::List(_) => "list",
            Value::Struct(_) => "struct",
            Value::Map(_) => "map",
            Value::Capture(_) => "capture",
            Value::Object(_) => "object",
        }
    }

    /// Whether this is a null value, a null pointer or a null interface.
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Pointer(None) | Value::Interface(None)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reflect;

    #[test]
    fn zero_values() {
        assert!(matches!(Value::zero(bool::SHAPE), Value::Bool(false)));
        assert!(matches!(Value::zero(u16::SHAPE), Value::U64(0)));
        assert!(matches!(Value::zero(i8::SHAPE), Value::I64(0)));
        assert!(matches!(Value::zero(String::SHAPE), Value::String(s) if s.is_empty()));
        assert!(matches!(Value::zero(<Option<i32>>::SHAPE), Value::Pointer(None)));

        let Value::Array(items) = Value::zero(<[f32; 3]>::SHAPE) else {
            panic!("expected an array");
        };
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|v| matches!(v, Value::F64(f) if *f == 0.0)));
    }

    #[test]
    fn fits_checks_top_level_kind() {
        assert!(Value::List(vec![Value::Bool(true)]).fits(<Vec<i32>>::SHAPE));
        assert!(!Value::Map(Vec::new()).fits(<Vec<i32>>::SHAPE));
        assert!(!Value::Array(vec![Value::I64(1)]).fits(<[i32; 2]>::SHAPE));
        assert!(Value::I64(3).fits(f64::SHAPE));
        assert!(!Value::F64(3.0).fits(u8::SHAPE));
    }

    #[test]
    fn objects_downcast() {
        let object = Object::new(42_u32);
        assert!(object.is::<u32>());
        assert_eq!(object.downcast_ref::<u32>(), Some(&42));
        let object = object.downcast::<String>().unwrap_err();
        assert_eq!(object.downcast::<u32>().unwrap(), 42);
    }
}
