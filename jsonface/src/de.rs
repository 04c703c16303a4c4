//! Shape-driven JSON decoding on top of `serde_json`.
//!
//! The decoder walks a [`Shape`] (or a [`ShadowShape`]) alongside the JSON
//! input and builds a [`Value`] tree. It never consults a registry: captured
//! slots are kept as [`RawJson`], and slots of unregistered interfaces only
//! accept `null`.
//!
//! Decoding follows the usual JSON-to-struct conventions:
//!
//! - `null` leaves scalars, arrays, lists, structs and maps at their zero
//!   value, and makes pointers and interfaces null.
//! - Unknown struct keys are skipped, missing ones keep their zero value.
//! - Fixed arrays zero-fill missing trailing elements and skip extra ones.
//! - Map keys come from JSON object keys, parsed for numeric and boolean key
//!   types.

use core::fmt;

use jsonface_core::{DecodeHook, Def, Field, Path, PathStep, RawJson, ScalarType, Shape, Value};
use serde::Deserialize;
use serde::de::{
    self, DeserializeSeed, Deserializer, Error as _, IgnoredAny, MapAccess, SeqAccess, Unexpected,
    Visitor,
};

use crate::shadow::{ShadowField, ShadowShape};

/// Decode `input` against a real shape.
pub fn decode_shape(input: &[u8], shape: &'static Shape) -> Result<Value, serde_json::Error> {
    decode_node(input, Node::Real(shape))
}

/// Decode `input` against a shadow shape. Captured slots come back as
/// [`Value::Capture`].
pub fn decode_shadow(input: &[u8], shadow: &ShadowShape) -> Result<Value, serde_json::Error> {
    decode_node(input, Node::Shadow(shadow))
}

fn decode_node(input: &[u8], node: Node<'_>) -> Result<Value, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_slice(input);
    let mut path = Path::new();
    let value = NodeSeed {
        node,
        path: &mut path,
    }
    .deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

/// A location being decoded: either plain, or part of a shadow.
#[derive(Clone, Copy)]
enum Node<'s> {
    Real(&'static Shape),
    Shadow(&'s ShadowShape),
}

/// What a node asks of the decoder.
enum View<'s> {
    Hook(&'static Shape, DecodeHook),
    Capture,
    Scalar(&'static Shape, ScalarType),
    Pointer(Node<'s>),
    Interface(&'static Shape),
    Array(Node<'s>, usize),
    List(Node<'s>),
    Struct(Fields<'s>),
    Map(Node<'s>, Node<'s>),
    Unsupported(&'static Shape),
}

#[derive(Clone, Copy)]
enum Fields<'s> {
    Real(&'static [Field]),
    Shadow(&'s [ShadowField]),
}

impl<'s> Fields<'s> {
    fn len(self) -> usize {
        match self {
            Fields::Real(fields) => fields.len(),
            Fields::Shadow(fields) => fields.len(),
        }
    }

    fn get(self, index: usize) -> (&'static str, Node<'s>) {
        match self {
            Fields::Real(fields) => (fields[index].name, Node::Real(fields[index].shape())),
            Fields::Shadow(fields) => (fields[index].name, Node::Shadow(&fields[index].shadow)),
        }
    }

    fn position(self, name: &str) -> Option<usize> {
        match self {
            Fields::Real(fields) => fields.iter().position(|f| f.name == name),
            Fields::Shadow(fields) => fields.iter().position(|f| f.name == name),
        }
    }
}

impl<'s> Node<'s> {
    fn shape(self) -> &'static Shape {
        match self {
            Node::Real(shape) => shape,
            Node::Shadow(shadow) => shadow.real_shape(),
        }
    }

    fn zero(self) -> Value {
        match self {
            Node::Real(shape) => Value::zero(shape),
            Node::Shadow(shadow) => shadow.zero(),
        }
    }

    fn view(self) -> View<'s> {
        let shape = match self {
            Node::Real(shape) => shape,
            Node::Shadow(shadow) => {
                return match shadow {
                    ShadowShape::Same(shape) => Node::Real(*shape).view(),
                    ShadowShape::Capture(_) => View::Capture,
                    ShadowShape::Pointer { pointee, .. } => View::Pointer(Node::Shadow(&**pointee)),
                    ShadowShape::Array { elem, len, .. } => View::Array(Node::Shadow(&**elem), *len),
                    ShadowShape::List { elem, .. } => View::List(Node::Shadow(&**elem)),
                    ShadowShape::Struct { fields, .. } => {
                        View::Struct(Fields::Shadow(fields.as_slice()))
                    }
                    ShadowShape::Map { key, value, .. } => {
                        View::Map(Node::Shadow(&**key), Node::Shadow(&**value))
                    }
                };
            }
        };

        if let Some(hook) = shape.decode_hook {
            return View::Hook(shape, hook);
        }
        match shape.def {
            Def::Scalar(scalar) => View::Scalar(shape, scalar),
            Def::Pointer(pdef) => View::Pointer(Node::Real(pdef.pointee)),
            Def::Interface(_) => View::Interface(shape),
            Def::Array(adef) => View::Array(Node::Real(adef.elem), adef.len),
            Def::List(ldef) => View::List(Node::Real(ldef.elem)),
            Def::Struct(sdef) => View::Struct(Fields::Real(sdef.fields)),
            Def::Map(mdef) => View::Map(Node::Real(mdef.key), Node::Real(mdef.value)),
            Def::Channel(_) | Def::Opaque => View::Unsupported(shape),
        }
    }
}

/// Integer value for `n`, if `scalar` is an integer type that can hold it.
fn int_value(n: i128, scalar: ScalarType) -> Option<Value> {
    let (lo, hi) = scalar.int_bounds()?;
    if n < lo || n > hi {
        return None;
    }
    Some(if scalar.is_unsigned() {
        Value::U64(n as u64)
    } else {
        Value::I64(n as i64)
    })
}

struct NodeSeed<'s, 'p> {
    node: Node<'s>,
    path: &'p mut Path,
}

impl<'de> DeserializeSeed<'de> for NodeSeed<'_, '_> {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        let NodeSeed { node, path } = self;
        match node.view() {
            View::Hook(shape, hook) => {
                let raw = RawJson::deserialize(deserializer)?;
                hook(&raw).map_err(|e| D::Error::custom(format_args!("{shape}: {e} at {path}")))
            }
            View::Capture => Ok(Value::Capture(RawJson::deserialize(deserializer)?)),
            View::Scalar(shape, scalar) => deserializer.deserialize_any(ScalarVisitor {
                shape,
                scalar,
                path,
            }),
            View::Pointer(pointee) => {
                deserializer.deserialize_option(PointerVisitor { pointee, path })
            }
            View::Interface(shape) => {
                deserializer.deserialize_option(UnregisteredVisitor { shape, path })
            }
            View::Array(elem, len) => deserializer.deserialize_any(SeqVisitor {
                node,
                elem,
                len: Some(len),
                path,
            }),
            View::List(elem) => deserializer.deserialize_any(SeqVisitor {
                node,
                elem,
                len: None,
                path,
            }),
            View::Struct(fields) => {
                deserializer.deserialize_any(StructVisitor { node, fields, path })
            }
            View::Map(key, value) => deserializer.deserialize_any(MapVisitor {
                node,
                key,
                value,
                path,
            }),
            View::Unsupported(shape) => Err(match shape.def {
                Def::Channel(_) => D::Error::custom(format_args!(
                    "channel decoding is not implemented: {shape} at {path}"
                )),
                _ => D::Error::custom(format_args!("unsupported kind: {shape} at {path}")),
            }),
        }
    }
}

struct ScalarVisitor<'p> {
    shape: &'static Shape,
    scalar: ScalarType,
    path: &'p mut Path,
}

impl ScalarVisitor<'_> {
    fn number<E: de::Error>(self, n: i128, unexpected: Unexpected<'_>) -> Result<Value, E> {
        if self.scalar.is_float() {
            return Ok(Value::F64(n as f64));
        }
        if self.scalar.int_bounds().is_none() {
            return Err(E::invalid_type(unexpected, &self));
        }
        int_value(n, self.scalar).ok_or_else(|| {
            E::custom(format_args!(
                "number {n} out of range for {} at {}",
                self.shape, self.path
            ))
        })
    }
}

impl<'de> Visitor<'de> for ScalarVisitor<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.shape, self.path)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        match self.scalar {
            ScalarType::Bool => Ok(Value::Bool(v)),
            _ => Err(E::invalid_type(Unexpected::Bool(v), &self)),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        self.number(i128::from(v), Unexpected::Signed(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        self.number(i128::from(v), Unexpected::Unsigned(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        if self.scalar.is_float() {
            Ok(Value::F64(v))
        } else {
            Err(E::invalid_type(Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        match self.scalar {
            ScalarType::String => Ok(Value::String(v.to_owned())),
            _ => Err(E::invalid_type(Unexpected::Str(v), &self)),
        }
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        match self.scalar {
            ScalarType::String => Ok(Value::String(v)),
            _ => Err(E::invalid_type(Unexpected::Str(&v), &self)),
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::zero(self.shape))
    }
}

struct PointerVisitor<'s, 'p> {
    pointee: Node<'s>,
    path: &'p mut Path,
}

impl<'de> Visitor<'de> for PointerVisitor<'_, '_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} or null at {}", self.pointee.shape(), self.path)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Pointer(None))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Pointer(None))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        let PointerVisitor { pointee, path } = self;
        path.push(PathStep::Deref);
        let inner = NodeSeed {
            node: pointee,
            path: &mut *path,
        }
        .deserialize(deserializer);
        path.pop();
        Ok(Value::Pointer(Some(Box::new(inner?))))
    }
}

struct UnregisteredVisitor<'p> {
    shape: &'static Shape,
    path: &'p mut Path,
}

impl<'de> Visitor<'de> for UnregisteredVisitor<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "null for unregistered {} at {}", self.shape, self.path)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Interface(None))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Interface(None))
    }

    fn visit_some<D>(self, _deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Err(D::Error::custom(format_args!(
            "cannot decode into unregistered polymorphic type {} at {}",
            self.shape, self.path
        )))
    }
}

struct SeqVisitor<'s, 'p> {
    node: Node<'s>,
    elem: Node<'s>,
    /// `Some` for fixed arrays.
    len: Option<usize>,
    path: &'p mut Path,
}

impl<'de> Visitor<'de> for SeqVisitor<'_, '_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.node.shape(), self.path)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(self.node.zero())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let SeqVisitor { elem, len, path, .. } = self;
        let mut items = Vec::new();
        loop {
            if len == Some(items.len()) {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                break;
            }
            path.push(PathStep::Index(items.len()));
            let next = seq.next_element_seed(NodeSeed {
                node: elem,
                path: &mut *path,
            });
            path.pop();
            match next? {
                Some(item) => items.push(item),
                None => break,
            }
        }

        match len {
            Some(len) => {
                items.resize_with(len, || elem.zero());
                Ok(Value::Array(items))
            }
            None => Ok(Value::List(items)),
        }
    }
}

struct StructVisitor<'s, 'p> {
    node: Node<'s>,
    fields: Fields<'s>,
    path: &'p mut Path,
}

impl<'de> Visitor<'de> for StructVisitor<'_, '_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "struct {} at {}", self.node.shape(), self.path)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(self.node.zero())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let StructVisitor { fields, path, .. } = self;
        let mut values: Vec<Option<Value>> = Vec::new();
        values.resize_with(fields.len(), || None);

        while let Some(key) = map.next_key::<String>()? {
            match fields.position(&key) {
                Some(index) => {
                    let (name, node) = fields.get(index);
                    path.push(PathStep::Field(name));
                    let value = map.next_value_seed(NodeSeed {
                        node,
                        path: &mut *path,
                    });
                    path.pop();
                    values[index] = Some(value?);
                }
                None => {
                    trace!(key = %key, path = %path, "skipping unknown field");
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        let entries = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let (name, node) = fields.get(index);
                (name, value.unwrap_or_else(|| node.zero()))
            })
            .collect();
        Ok(Value::Struct(entries))
    }
}

struct MapVisitor<'s, 'p> {
    node: Node<'s>,
    key: Node<'s>,
    value: Node<'s>,
    path: &'p mut Path,
}

impl<'de> Visitor<'de> for MapVisitor<'_, '_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map {} at {}", self.node.shape(), self.path)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(self.node.zero())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let MapVisitor {
            key, value, path, ..
        } = self;
        let mut entries = Vec::new();

        while let Some(text) = map.next_key::<String>()? {
            let index = entries.len();
            path.push(PathStep::MapKey(index));
            let k = decode_key(&text, key, path);
            path.pop();
            let k = k.map_err(A::Error::custom)?;

            path.push(PathStep::MapValue(index));
            let v = map.next_value_seed(NodeSeed {
                node: value,
                path: &mut *path,
            });
            path.pop();
            entries.push((k, v?));
        }

        Ok(Value::Map(entries))
    }
}

/// Build a map key from the text of a JSON object key.
///
/// Captured and hooked keys receive the key as a JSON string literal, quotes
/// included, so they always see valid JSON.
fn decode_key(text: &str, node: Node<'_>, path: &Path) -> Result<Value, String> {
    match node.view() {
        View::Capture => {
            let quoted = serde_json::to_string(text).map_err(|e| e.to_string())?;
            Ok(Value::Capture(RawJson::new(quoted)))
        }
        View::Hook(shape, hook) => {
            let quoted = serde_json::to_string(text).map_err(|e| e.to_string())?;
            hook(&RawJson::new(quoted)).map_err(|e| format!("{shape}: {e} at {path}"))
        }
        View::Scalar(shape, scalar) => {
            let value = match scalar {
                ScalarType::String => Some(Value::String(text.to_owned())),
                ScalarType::Bool => text.parse().ok().map(Value::Bool),
                ScalarType::Handle => None,
                s if s.is_float() => text.parse().ok().map(Value::F64),
                s => text.parse::<i128>().ok().and_then(|n| int_value(n, s)),
            };
            value.ok_or_else(|| format!("invalid map key {text:?} for {shape} at {path}"))
        }
        _ => Err(format!("unsupported map key type {} at {path}", node.shape())),
    }
}
