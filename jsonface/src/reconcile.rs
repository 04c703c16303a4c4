//! Move a decoded shadow tree into the real tree, resolving captures on the
//! way.

use jsonface_core::{Def, Path, PathStep, RawJson, Shape, Value};

use crate::shadow::{ShadowField, ShadowShape};
use crate::{DecodeError, ReconcileError, ReconcileErrorKind, Registry};

/// Walk `shadow_value` (decoded against `shadow`) and `real` in lock-step,
/// filling `real` and calling a resolver for every captured slot.
///
/// Resolver failures are returned as [`DecodeError::Resolver`], untouched.
pub(crate) fn reconcile(
    shadow_value: Value,
    shadow: &ShadowShape,
    real: &mut Value,
    registry: &Registry,
) -> Result<(), DecodeError> {
    let mut reconciler = Reconciler {
        registry,
        path: Path::new(),
    };
    reconciler.node(shadow_value, shadow, real)
}

struct Reconciler<'r> {
    registry: &'r Registry,
    path: Path,
}

impl Reconciler<'_> {
    fn node(&mut self, value: Value, shadow: &ShadowShape, real: &mut Value) -> Result<(), DecodeError> {
        match shadow {
            ShadowShape::Same(shape) => self.same(value, *shape, real),
            ShadowShape::Capture(shape) => self.capture(value, *shape, real),
            ShadowShape::Pointer { shape, pointee } => self.pointer(value, *shape, pointee, real),
            ShadowShape::Array { shape, elem, len } => {
                self.array(value, *shape, elem, *len, real)
            }
            ShadowShape::List { shape, elem } => self.list(value, *shape, elem, real),
            ShadowShape::Struct { shape, fields } => self.structure(value, *shape, fields, real),
            ShadowShape::Map {
                shape,
                key,
                value: val,
            } => self.map(value, *shape, key, val, real),
        }
    }

    /// Subtrees without captures are moved over as they are.
    fn same(&mut self, value: Value, shape: &'static Shape, real: &mut Value) -> Result<(), DecodeError> {
        if shape.decode_hook.is_none() && matches!(shape.def, Def::Channel(_) | Def::Opaque) {
            return Err(self.error(ReconcileErrorKind::Unsupported { shape }));
        }
        if !value.fits(shape) {
            return Err(self.mismatch(shape, &value));
        }
        if let (Def::Interface(idef), Value::Interface(Some(object))) = (shape.def, &value) {
            if !(idef.accepts)(object) {
                return Err(self.error(ReconcileErrorKind::NotAssignable {
                    expected: shape,
                    got: object.type_name(),
                }));
            }
        }
        *real = value;
        Ok(())
    }

    /// The resolver sees the slot's text as is, a literal `null` included.
    fn capture(&mut self, value: Value, shape: &'static Shape, real: &mut Value) -> Result<(), DecodeError> {
        let Def::Interface(idef) = shape.def else {
            return Err(self.mismatch(shape, &value));
        };
        let raw: RawJson = match value {
            Value::Capture(raw) => raw,
            other => return Err(self.mismatch(shape, &other)),
        };

        let Some(resolver) = self.registry.get(idef.name) else {
            return Err(self.error(ReconcileErrorKind::MissingResolver { name: idef.name }));
        };
        trace!(name = idef.name, path = %self.path, "calling resolver");
        let object = resolver.resolve(&raw).map_err(DecodeError::Resolver)?;

        if !(idef.accepts)(&object) {
            return Err(self.error(ReconcileErrorKind::NotAssignable {
                expected: shape,
                got: object.type_name(),
            }));
        }
        *real = Value::Interface(Some(object));
        Ok(())
    }

    fn pointer(
        &mut self,
        value: Value,
        shape: &'static Shape,
        pointee: &ShadowShape,
        real: &mut Value,
    ) -> Result<(), DecodeError> {
        let inner = match value {
            Value::Pointer(None) | Value::Null => {
                *real = Value::Pointer(None);
                return Ok(());
            }
            Value::Pointer(Some(inner)) => *inner,
            other => return Err(self.mismatch(shape, &other)),
        };

        if !matches!(real, Value::Pointer(Some(_))) {
            *real = Value::Pointer(Some(Box::new(Value::zero(pointee.real_shape()))));
        }
        match real {
            Value::Pointer(Some(slot)) => {
                self.nested(PathStep::Deref, |r| r.node(inner, pointee, slot))
            }
            other => Err(self.mismatch(shape, other)),
        }
    }

    fn array(
        &mut self,
        value: Value,
        shape: &'static Shape,
        elem: &ShadowShape,
        len: usize,
        real: &mut Value,
    ) -> Result<(), DecodeError> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(self.mismatch(shape, &other)),
        };
        let slots = match real {
            Value::Array(slots) => slots,
            other => return Err(self.mismatch(shape, other)),
        };
        if items.len() != len || slots.len() != len {
            return Err(self.error(ReconcileErrorKind::LengthMismatch {
                expected: slots.len(),
                got: items.len(),
            }));
        }
        for (index, (item, slot)) in items.into_iter().zip(slots.iter_mut()).enumerate() {
            self.nested(PathStep::Index(index), |r| r.node(item, elem, slot))?;
        }
        Ok(())
    }

    /// Every element is resolved on its own, so a list may hold different
    /// concrete types.
    fn list(
        &mut self,
        value: Value,
        shape: &'static Shape,
        elem: &ShadowShape,
        real: &mut Value,
    ) -> Result<(), DecodeError> {
        let items = match value {
            Value::List(items) => items,
            other => return Err(self.mismatch(shape, &other)),
        };
        let mut slots = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let mut slot = Value::zero(elem.real_shape());
            self.nested(PathStep::Index(index), |r| r.node(item, elem, &mut slot))?;
            slots.push(slot);
        }
        *real = Value::List(slots);
        Ok(())
    }

    fn structure(
        &mut self,
        value: Value,
        shape: &'static Shape,
        fields: &[ShadowField],
        real: &mut Value,
    ) -> Result<(), DecodeError> {
        let values = match value {
            Value::Struct(values) => values,
            other => return Err(self.mismatch(shape, &other)),
        };
        let slots = match real {
            Value::Struct(slots) => slots,
            other => return Err(self.mismatch(shape, other)),
        };
        if values.len() != fields.len() || slots.len() != fields.len() {
            return Err(self.error(ReconcileErrorKind::LengthMismatch {
                expected: fields.len(),
                got: values.len(),
            }));
        }

        for ((field, (name, item)), (slot_name, slot)) in
            fields.iter().zip(values).zip(slots.iter_mut())
        {
            for found in [name, *slot_name] {
                if found != field.name {
                    return Err(self.error(ReconcileErrorKind::FieldMismatch {
                        expected: field.name,
                        got: found,
                    }));
                }
            }
            self.nested(PathStep::Field(field.name), |r| r.node(item, &field.shadow, slot))?;
        }
        Ok(())
    }

    fn map(
        &mut self,
        value: Value,
        shape: &'static Shape,
        key: &ShadowShape,
        val: &ShadowShape,
        real: &mut Value,
    ) -> Result<(), DecodeError> {
        let entries = match value {
            Value::Map(entries) => entries,
            other => return Err(self.mismatch(shape, &other)),
        };
        let mut slots = Vec::with_capacity(entries.len());
        for (index, (k, v)) in entries.into_iter().enumerate() {
            let mut key_slot = Value::zero(key.real_shape());
            self.nested(PathStep::MapKey(index), |r| r.node(k, key, &mut key_slot))?;
            let mut value_slot = Value::zero(val.real_shape());
            self.nested(PathStep::MapValue(index), |r| r.node(v, val, &mut value_slot))?;
            slots.push((key_slot, value_slot));
        }
        *real = Value::Map(slots);
        Ok(())
    }

    fn nested(
        &mut self,
        step: PathStep,
        f: impl FnOnce(&mut Self) -> Result<(), DecodeError>,
    ) -> Result<(), DecodeError> {
        self.path.push(step);
        let result = f(self);
        self.path.pop();
        result
    }

    fn error(&self, kind: ReconcileErrorKind) -> DecodeError {
        DecodeError::Reconcile(ReconcileError {
            kind,
            path: self.path.clone(),
        })
    }

    fn mismatch(&self, expected: &'static Shape, got: &Value) -> DecodeError {
        self.error(ReconcileErrorKind::ShapeMismatch {
            expected,
            got: got.kind_name(),
        })
    }
}
