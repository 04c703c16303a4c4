use core::any::TypeId;
use core::fmt;

use crate::{ConstTypeId, Def, RawJson, Value};

/// Error type returned by resolvers and decode hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A type's own decode routine. Receives the raw JSON text of the slot and
/// produces the value that lives there.
pub type DecodeHook = fn(&RawJson) -> Result<Value, BoxError>;

/// Schema for reflection of a type
#[derive(Clone, Copy)]
pub struct Shape {
    /// Unique type identifier, provided by the compiler.
    pub id: ConstTypeId,

    /// The type identifier without generic parameters, e.g. `Vec` or
    /// `BandMember`. For interfaces this is the qualified interface name.
    pub type_identifier: &'static str,

    /// What kind of value this is and how its parts are shaped.
    pub def: Def,

    /// Custom decode routine. When present, the type decodes itself and the
    /// shape is never looked into.
    pub decode_hook: Option<DecodeHook>,
}

impl Shape {
    /// Build a shape for `T` with no decode hook.
    pub const fn new<T: ?Sized + 'static>(type_identifier: &'static str, def: Def) -> Self {
        Shape {
            id: ConstTypeId::of::<T>(),
            type_identifier,
            def,
            decode_hook: None,
        }
    }

    /// Attach a custom decode routine.
    pub const fn with_decode_hook(mut self, hook: DecodeHook) -> Self {
        self.decode_hook = Some(hook);
        self
    }

    /// Check if this shape is of the given type
    #[inline]
    pub fn is_type<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Qualified interface name, if this shape is a polymorphic slot.
    pub fn interface_name(&self) -> Option<&'static str> {
        match self.def {
            Def::Interface(idef) => Some(idef.name),
            _ => None,
        }
    }

    /// Whether the type carries its own decode routine.
    #[inline]
    pub fn has_decode_hook(&self) -> bool {
        self.decode_hook.is_some()
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shape {}

impl core::hash::Hash for Shape {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("type", &format_args!("{self}"))
            .field("kind", &self.def.kind_name())
            .field("decode_hook", &self.decode_hook.is_some())
            .finish()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.def {
            Def::Pointer(pdef) => write!(f, "{}<{}>", self.type_identifier, pdef.pointee),
            Def::List(ldef) => write!(f, "{}<{}>", self.type_identifier, ldef.elem),
            Def::Channel(cdef) => write!(f, "{}<{}>", self.type_identifier, cdef.elem),
            Def::Array(adef) => write!(f, "[{}; {}]", adef.elem, adef.len),
            Def::Map(mdef) => write!(
                f,
                "{}<{}, {}>",
                self.type_identifier, mdef.key, mdef.value
            ),
            Def::Scalar(_) | Def::Interface(_) | Def::Struct(_) | Def::Opaque => {
                f.write_str(self.type_identifier)
            }
        }
    }
}
