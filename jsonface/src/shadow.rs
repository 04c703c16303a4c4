//! Shadow shapes: a target shape with every registered polymorphic slot
//! swapped for a raw JSON capture.
//!
//! A shadow shape mirrors its real shape node for node. Struct fields keep
//! their names and order, arrays keep their length. Subtrees that contain no
//! registered slot collapse into [`ShadowShape::Same`], so a shape that needs
//! no substitution at all derives to `Same(shape)`.

use core::fmt;

use jsonface_core::{ConstTypeId, Def, Path, PathStep, RawJson, Shape, StructDef, Value, Visibility};

use crate::{DeriveError, DeriveErrorKind, Registry};

/// The shadow of a [`Shape`].
#[derive(Debug, Clone)]
pub enum ShadowShape {
    /// No registered slot below this point: decode against the real shape.
    Same(&'static Shape),

    /// A registered polymorphic slot: capture its raw JSON.
    Capture(&'static Shape),

    /// Pointer to a shadowed pointee.
    Pointer {
        /// The real pointer shape.
        shape: &'static Shape,
        /// Shadow of the pointee.
        pointee: Box<ShadowShape>,
    },

    /// Fixed-size array of shadowed elements.
    Array {
        /// The real array shape.
        shape: &'static Shape,
        /// Shadow of every element.
        elem: Box<ShadowShape>,
        /// Fixed number of elements.
        len: usize,
    },

    /// List of shadowed elements.
    List {
        /// The real list shape.
        shape: &'static Shape,
        /// Shadow of every element.
        elem: Box<ShadowShape>,
    },

    /// Struct with at least one shadowed field.
    Struct {
        /// The real struct shape.
        shape: &'static Shape,
        /// Every field, in declaration order.
        fields: Vec<ShadowField>,
    },

    /// Map with a shadowed key, value, or both.
    Map {
        /// The real map shape.
        shape: &'static Shape,
        /// Shadow of the keys.
        key: Box<ShadowShape>,
        /// Shadow of the values.
        value: Box<ShadowShape>,
    },
}

/// A field of a [`ShadowShape::Struct`].
#[derive(Debug, Clone)]
pub struct ShadowField {
    /// Field name, same as the real field's.
    pub name: &'static str,
    /// Shadow of the field's shape.
    pub shadow: ShadowShape,
}

impl ShadowShape {
    /// Whether any slot was substituted.
    pub fn needs_shadow(&self) -> bool {
        !matches!(self, ShadowShape::Same(_))
    }

    /// The real shape this node mirrors.
    pub fn real_shape(&self) -> &'static Shape {
        match self {
            ShadowShape::Same(shape) | ShadowShape::Capture(shape) => *shape,
            ShadowShape::Pointer { shape, .. }
            | ShadowShape::Array { shape, .. }
            | ShadowShape::List { shape, .. }
            | ShadowShape::Struct { shape, .. }
            | ShadowShape::Map { shape, .. } => *shape,
        }
    }

    /// Zero value of the shadow. A capture's zero is the JSON literal `null`.
    pub fn zero(&self) -> Value {
        match self {
            ShadowShape::Same(shape) => Value::zero(*shape),
            ShadowShape::Capture(_) => Value::Capture(RawJson::null()),
            ShadowShape::Pointer { .. } => Value::Pointer(None),
            ShadowShape::Array { elem, len, .. } => {
                Value::Array((0..*len).map(|_| elem.zero()).collect())
            }
            ShadowShape::List { .. } => Value::List(Vec::new()),
            ShadowShape::Struct { fields, .. } => Value::Struct(
                fields
                    .iter()
                    .map(|field| (field.name, field.shadow.zero()))
                    .collect(),
            ),
            ShadowShape::Map { .. } => Value::Map(Vec::new()),
        }
    }
}

impl fmt::Display for ShadowShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadowShape::Same(shape) => fmt::Display::fmt(shape, f),
            ShadowShape::Capture(_) => f.write_str("RawJson"),
            ShadowShape::Pointer { shape, pointee } => {
                write!(f, "{}<{pointee}>", shape.type_identifier)
            }
            ShadowShape::Array { elem, len, .. } => write!(f, "[{elem}; {len}]"),
            ShadowShape::List { shape, elem } => write!(f, "{}<{elem}>", shape.type_identifier),
            ShadowShape::Struct { shape, fields } => {
                write!(f, "{} {{ ", shape.type_identifier)?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.shadow)?;
                }
                f.write_str(" }")
            }
            ShadowShape::Map { shape, key, value } => {
                write!(f, "{}<{key}, {value}>", shape.type_identifier)
            }
        }
    }
}

/// Compute the shadow of `shape`: every polymorphic slot whose interface is
/// in `registry` becomes a capture.
///
/// Slots whose interface is not registered stay as they are; decoding a
/// non-null value into one fails later.
pub fn derive(shape: &'static Shape, registry: &Registry) -> Result<ShadowShape, DeriveError> {
    let mut deriver = Deriver {
        registry,
        path: Path::new(),
        ancestors: Vec::new(),
        back_edges: Vec::new(),
    };
    deriver.derive(shape)
}

struct Deriver<'r> {
    registry: &'r Registry,
    path: Path,
    /// Structs currently being derived, outermost first.
    ancestors: Vec<ConstTypeId>,
    /// Structs that were reached again while being derived.
    back_edges: Vec<ConstTypeId>,
}

impl Deriver<'_> {
    fn derive(&mut self, shape: &'static Shape) -> Result<ShadowShape, DeriveError> {
        if shape.decode_hook.is_some() {
            trace!(shape = %shape, path = %self.path, "custom decode routine, leaving as is");
            return Ok(ShadowShape::Same(shape));
        }

        match shape.def {
            Def::Scalar(_) => Ok(ShadowShape::Same(shape)),
            Def::Pointer(pdef) => {
                let pointee = self.nested(PathStep::Deref, |d| d.derive(pdef.pointee))?;
                Ok(if pointee.needs_shadow() {
                    ShadowShape::Pointer {
                        shape,
                        pointee: Box::new(pointee),
                    }
                } else {
                    ShadowShape::Same(shape)
                })
            }
            Def::Interface(idef) => {
                if self.registry.contains(idef.name) {
                    trace!(name = idef.name, path = %self.path, "registered slot, capturing");
                    Ok(ShadowShape::Capture(shape))
                } else {
                    trace!(name = idef.name, path = %self.path, "unregistered slot");
                    Ok(ShadowShape::Same(shape))
                }
            }
            Def::Array(adef) => {
                let elem = self.nested(PathStep::Index(0), |d| d.derive(adef.elem))?;
                Ok(if elem.needs_shadow() {
                    ShadowShape::Array {
                        shape,
                        elem: Box::new(elem),
                        len: adef.len,
                    }
                } else {
                    ShadowShape::Same(shape)
                })
            }
            Def::List(ldef) => {
                let elem = self.nested(PathStep::Index(0), |d| d.derive(ldef.elem))?;
                Ok(if elem.needs_shadow() {
                    ShadowShape::List {
                        shape,
                        elem: Box::new(elem),
                    }
                } else {
                    ShadowShape::Same(shape)
                })
            }
            Def::Struct(sdef) => self.derive_struct(shape, sdef),
            Def::Map(mdef) => {
                let key = self.nested(PathStep::MapKey(0), |d| d.derive(mdef.key))?;
                let value = self.nested(PathStep::MapValue(0), |d| d.derive(mdef.value))?;
                Ok(if key.needs_shadow() || value.needs_shadow() {
                    ShadowShape::Map {
                        shape,
                        key: Box::new(key),
                        value: Box::new(value),
                    }
                } else {
                    ShadowShape::Same(shape)
                })
            }
            Def::Channel(_) => Err(self.error(DeriveErrorKind::ChannelUnsupported { shape })),
            Def::Opaque => Err(self.error(DeriveErrorKind::UnsupportedKind { shape })),
        }
    }

    fn derive_struct(
        &mut self,
        shape: &'static Shape,
        sdef: StructDef,
    ) -> Result<ShadowShape, DeriveError> {
        if self.ancestors.contains(&shape.id) {
            trace!(shape = %shape, path = %self.path, "recursive type, assuming unchanged");
            if !self.back_edges.contains(&shape.id) {
                self.back_edges.push(shape.id);
            }
            return Ok(ShadowShape::Same(shape));
        }

        self.ancestors.push(shape.id);
        let fields = self.derive_fields(shape, sdef);
        self.ancestors.pop();
        let fields = fields?;

        if !fields.iter().any(|field| field.shadow.needs_shadow()) {
            return Ok(ShadowShape::Same(shape));
        }
        if self.back_edges.contains(&shape.id) {
            return Err(self.error(DeriveErrorKind::RecursiveShape { shape }));
        }
        Ok(ShadowShape::Struct { shape, fields })
    }

    fn derive_fields(
        &mut self,
        owner: &'static Shape,
        sdef: StructDef,
    ) -> Result<Vec<ShadowField>, DeriveError> {
        let mut fields = Vec::with_capacity(sdef.fields.len());
        for field in sdef.fields {
            let shadow = self.nested(PathStep::Field(field.name), |d| {
                let shadow = d.derive(field.shape())?;
                if shadow.needs_shadow() && field.visibility == Visibility::Private {
                    return Err(d.error(DeriveErrorKind::PrivateField {
                        owner,
                        field: field.name,
                    }));
                }
                Ok(shadow)
            })?;
            fields.push(ShadowField {
                name: field.name,
                shadow,
            });
        }
        Ok(fields)
    }

    fn nested<T>(
        &mut self,
        step: PathStep,
        f: impl FnOnce(&mut Self) -> Result<T, DeriveError>,
    ) -> Result<T, DeriveError> {
        self.path.push(step);
        let result = f(self);
        self.path.pop();
        result
    }

    fn error(&self, kind: DeriveErrorKind) -> DeriveError {
        DeriveError {
            kind,
            path: self.path.clone(),
        }
    }
}
