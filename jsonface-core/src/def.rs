use core::fmt;

use crate::{Object, Shape};

/// The semantic definition of a shape: is it a scalar, a sequence, a
/// polymorphic slot?
#[derive(Clone, Copy, Debug)]
pub enum Def {
    /// Leaf values: booleans, numbers, strings, opaque handles.
    Scalar(ScalarType),

    /// Nullable indirection.
    ///
    /// e.g. `Option<T>`
    Pointer(PointerDef),

    /// Polymorphic slot: an abstract capability type whose concrete variant
    /// is chosen by a resolver.
    ///
    /// e.g. `Box<dyn Instrument>`
    Interface(InterfaceDef),

    /// Fixed-size sequence.
    ///
    /// e.g. `[T; 4]`
    Array(ArrayDef),

    /// Variable-size sequence.
    ///
    /// e.g. `Vec<T>`
    List(ListDef),

    /// Record with named fields, in declaration order.
    Struct(StructDef),

    /// Associative map. Keys and values are independently shaped.
    ///
    /// e.g. `HashMap<K, V>`
    Map(MapDef),

    /// Channel-like stream of values. Never decodable.
    ///
    /// e.g. `std::sync::mpsc::Receiver<T>`
    Channel(ChannelDef),

    /// Anything else. Only decodable through a decode hook.
    Opaque,
}

impl Def {
    /// Short, stable name of the kind, used in diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Def::Scalar(_) => "scalar",
            Def::Pointer(_) => "pointer",
            Def::Interface(_) => "interface",
            Def::Array(_) => "array",
            Def::List(_) => "list",
            Def::Struct(_) => "struct",
            Def::Map(_) => "map",
            Def::Channel(_) => "channel",
            Def::Opaque => "opaque",
        }
    }
}

/// The primitive kinds a [`Def::Scalar`] can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `isize`
    ISize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `usize`
    USize,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `String`
    String,
    /// Function pointers and other handles: only `null` decodes into them.
    Handle,
}

impl ScalarType {
    /// Inclusive bounds for integer types, `None` for everything else.
    pub const fn int_bounds(self) -> Option<(i128, i128)> {
        Some(match self {
            ScalarType::I8 => (i8::MIN as i128, i8::MAX as i128),
            ScalarType::I16 => (i16::MIN as i128, i16::MAX as i128),
            ScalarType::I32 => (i32::MIN as i128, i32::MAX as i128),
            ScalarType::I64 => (i64::MIN as i128, i64::MAX as i128),
            ScalarType::ISize => (isize::MIN as i128, isize::MAX as i128),
            ScalarType::U8 => (0, u8::MAX as i128),
            ScalarType::U16 => (0, u16::MAX as i128),
            ScalarType::U32 => (0, u32::MAX as i128),
            ScalarType::U64 => (0, u64::MAX as i128),
            ScalarType::USize => (0, usize::MAX as i128),
            _ => return None,
        })
    }

    /// Whether this is one of the unsigned integer types.
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            ScalarType::U8 | ScalarType::U16 | ScalarType::U32 | ScalarType::U64 | ScalarType::USize
        )
    }

    /// Whether this is `f32` or `f64`.
    pub const fn is_float(self) -> bool {
        matches!(self, ScalarType::F32 | ScalarType::F64)
    }
}

/// Pointee of a [`Def::Pointer`].
#[derive(Clone, Copy, Debug)]
pub struct PointerDef {
    /// Shape of the value behind the pointer.
    pub pointee: &'static Shape,
}

/// Describes a polymorphic slot.
#[derive(Clone, Copy)]
pub struct InterfaceDef {
    /// Canonical qualified name. Registries are keyed by this exact string.
    pub name: &'static str,

    /// Assignability check: does a resolved object belong in this slot?
    pub accepts: fn(&Object) -> bool,
}

impl fmt::Debug for InterfaceDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceDef")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Element and length of a [`Def::Array`].
#[derive(Clone, Copy, Debug)]
pub struct ArrayDef {
    /// Shape of every element.
    pub elem: &'static Shape,
    /// Fixed number of elements.
    pub len: usize,
}

/// Element of a [`Def::List`].
#[derive(Clone, Copy, Debug)]
pub struct ListDef {
    /// Shape of every element.
    pub elem: &'static Shape,
}

/// Fields of a [`Def::Struct`].
#[derive(Clone, Copy, Debug)]
pub struct StructDef {
    /// Fields in declaration order.
    pub fields: &'static [Field],
}

impl StructDef {
    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<(usize, &'static Field)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }
}

/// Describes a field in a struct.
#[derive(Clone, Copy)]
pub struct Field {
    /// Field name, also used as the JSON object key.
    pub name: &'static str,

    /// Shape of the field's type.
    ///
    /// The layer of indirection allows for recursive type definitions.
    pub shape: fn() -> &'static Shape,

    /// Whether callers outside the defining module can see the field.
    pub visibility: Visibility,
}

impl Field {
    /// Shape of the field's type.
    #[inline]
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("shape", &format_args!("{}", self.shape()))
            .field("visibility", &self.visibility)
            .finish()
    }
}

/// Visibility of a struct field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Declared `pub`.
    Public,
    /// Anything narrower than `pub`, including `pub(crate)`.
    Private,
}

impl Visibility {
    /// Map a stringified visibility token to a [`Visibility`].
    ///
    /// Only a bare `pub` counts as public.
    pub const fn from_keyword(keyword: &str) -> Self {
        match keyword.as_bytes() {
            b"pub" => Visibility::Public,
            _ => Visibility::Private,
        }
    }
}

/// Key and value of a [`Def::Map`].
#[derive(Clone, Copy, Debug)]
pub struct MapDef {
    /// Shape of the keys.
    pub key: &'static Shape,
    /// Shape of the values.
    pub value: &'static Shape,
}

/// Element of a [`Def::Channel`].
#[derive(Clone, Copy, Debug)]
pub struct ChannelDef {
    /// Shape of the values carried by the channel.
    pub elem: &'static Shape,
}
