//! Error types for decoding into polymorphic slots.

use core::fmt::{self, Display};

use jsonface_core::{BoxError, Path, Shape, ValueError};

/// Error type for [`decode`](crate::decode) and friends.
#[derive(Debug)]
pub enum DecodeError {
    /// The destination cannot hold a value of the requested shape.
    InvalidDestination {
        /// The shape being decoded.
        expected: &'static Shape,
        /// Kind of value found in the destination.
        got: &'static str,
    },
    /// The shape cannot be decoded with the current registry.
    Derive(DeriveError),
    /// The input is not valid JSON, or does not match the shape.
    Syntax(serde_json::Error),
    /// The decoded tree did not line up with the shape.
    Reconcile(ReconcileError),
    /// The decoded tree could not be converted to the Rust type.
    Value(ValueError),
    /// A resolver rejected its input. Holds the resolver's own error.
    Resolver(BoxError),
}

impl DecodeError {
    /// Get an error code for this kind of error.
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::InvalidDestination { .. } => "jsonface::invalid_destination",
            DecodeError::Derive(e) => e.kind.code(),
            DecodeError::Syntax(_) => "jsonface::syntax",
            DecodeError::Reconcile(e) => e.kind.code(),
            DecodeError::Value(e) => e.code(),
            DecodeError::Resolver(_) => "jsonface::resolver",
        }
    }

    /// Whether a resolver produced this error.
    pub fn is_resolver(&self) -> bool {
        matches!(self, DecodeError::Resolver(_))
    }

    /// The resolver's error, if a resolver produced this error.
    pub fn resolver_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            DecodeError::Resolver(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    /// Take the resolver's error out, or get `self` back.
    pub fn into_resolver_error(self) -> Result<BoxError, Self> {
        match self {
            DecodeError::Resolver(e) => Ok(e),
            other => Err(other),
        }
    }

    /// A hint on how to fix configuration errors.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            DecodeError::InvalidDestination { .. } => {
                Some("start from `Value::zero(shape)` or pass a value of the same kind")
            }
            DecodeError::Derive(e) => e.kind.help(),
            DecodeError::Reconcile(e) if matches!(e.kind, ReconcileErrorKind::MissingResolver { .. }) => {
                Some("register a resolver under the slot's interface name")
            }
            _ => None,
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidDestination { expected, got } => {
                write!(f, "invalid destination: cannot decode {expected} into a {got} value")
            }
            DecodeError::Derive(e) => Display::fmt(e, f),
            DecodeError::Syntax(e) => write!(f, "syntax error: {e}"),
            DecodeError::Reconcile(e) => Display::fmt(e, f),
            DecodeError::Value(e) => Display::fmt(e, f),
            DecodeError::Resolver(e) => Display::fmt(e, f),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Derive(e) => Some(e),
            DecodeError::Syntax(e) => Some(e),
            DecodeError::Reconcile(e) => Some(e),
            DecodeError::Value(e) => Some(e),
            DecodeError::Resolver(e) => e.source(),
            DecodeError::InvalidDestination { .. } => None,
        }
    }
}

impl From<DeriveError> for DecodeError {
    fn from(e: DeriveError) -> Self {
        DecodeError::Derive(e)
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        DecodeError::Syntax(e)
    }
}

impl From<ReconcileError> for DecodeError {
    fn from(e: ReconcileError) -> Self {
        DecodeError::Reconcile(e)
    }
}

impl From<ValueError> for DecodeError {
    fn from(e: ValueError) -> Self {
        DecodeError::Value(e)
    }
}

#[cfg(feature = "miette")]
impl miette::Diagnostic for DecodeError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(DecodeError::code(self)))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        DecodeError::help(self).map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }
}

/// A shape that cannot be turned into a shadow shape.
#[derive(Debug, Clone)]
pub struct DeriveError {
    /// What went wrong.
    pub kind: DeriveErrorKind,
    /// Where in the shape it went wrong.
    pub path: Path,
}

/// Specific reasons a shadow shape cannot be derived.
#[derive(Debug, Clone)]
pub enum DeriveErrorKind {
    /// The shape has no structure to decode into and no decode hook.
    UnsupportedKind {
        /// The offending shape.
        shape: &'static Shape,
    },
    /// Channels are never decoded.
    ChannelUnsupported {
        /// The offending shape.
        shape: &'static Shape,
    },
    /// A private field holds a registered polymorphic slot.
    PrivateField {
        /// The struct owning the field.
        owner: &'static Shape,
        /// The field's name.
        field: &'static str,
    },
    /// A recursive type holds a registered polymorphic slot.
    RecursiveShape {
        /// The struct that refers back to itself.
        shape: &'static Shape,
    },
}

impl DeriveErrorKind {
    /// Get an error code for this kind of error.
    pub const fn code(&self) -> &'static str {
        match self {
            DeriveErrorKind::UnsupportedKind { .. } => "jsonface::derive::unsupported_kind",
            DeriveErrorKind::ChannelUnsupported { .. } => "jsonface::derive::channel",
            DeriveErrorKind::PrivateField { .. } => "jsonface::derive::private_field",
            DeriveErrorKind::RecursiveShape { .. } => "jsonface::derive::recursive_shape",
        }
    }

    fn help(&self) -> Option<&'static str> {
        match self {
            DeriveErrorKind::UnsupportedKind { .. } => {
                Some("give the type a decode hook, e.g. with `reflect_via_serde!`")
            }
            DeriveErrorKind::PrivateField { .. } => Some("declare the field `pub`"),
            DeriveErrorKind::RecursiveShape { .. } => {
                Some("resolve the recursive part inside a resolver instead")
            }
            DeriveErrorKind::ChannelUnsupported { .. } => None,
        }
    }
}

impl Display for DeriveErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeriveErrorKind::UnsupportedKind { shape } => {
                write!(f, "unsupported kind: {shape} ({})", shape.def.kind_name())
            }
            DeriveErrorKind::ChannelUnsupported { shape } => {
                write!(f, "channel decoding is not implemented: {shape}")
            }
            DeriveErrorKind::PrivateField { owner, field } => {
                write!(f, "private field `{field}` of {owner} holds a registered polymorphic slot")
            }
            DeriveErrorKind::RecursiveShape { shape } => {
                write!(f, "recursive type {shape} holds a registered polymorphic slot")
            }
        }
    }
}

impl Display for DeriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.path)
    }
}

impl std::error::Error for DeriveError {}

/// The decoded shadow tree and the real tree disagree.
///
/// Outside of misbehaving decode hooks this indicates a bug.
#[derive(Debug, Clone)]
pub struct ReconcileError {
    /// What went wrong.
    pub kind: ReconcileErrorKind,
    /// Where in the value tree it went wrong.
    pub path: Path,
}

/// Specific reconciliation failures.
#[derive(Debug, Clone)]
pub enum ReconcileErrorKind {
    /// A value of the wrong kind sits at a location.
    ShapeMismatch {
        /// Shape of the location.
        expected: &'static Shape,
        /// Kind of value found.
        got: &'static str,
    },
    /// A resolved object does not belong in its slot.
    NotAssignable {
        /// Shape of the slot.
        expected: &'static Shape,
        /// Type the object was created from.
        got: &'static str,
    },
    /// Shadow and real arrays have different lengths.
    LengthMismatch {
        /// Length of the real array.
        expected: usize,
        /// Length of the shadow array.
        got: usize,
    },
    /// Shadow and real structs have different fields.
    FieldMismatch {
        /// Field expected at this position.
        expected: &'static str,
        /// Field found at this position.
        got: &'static str,
    },
    /// No resolver is registered for a slot that was captured.
    MissingResolver {
        /// The slot's interface name.
        name: &'static str,
    },
    /// The location's shape cannot hold decoded values.
    Unsupported {
        /// Shape of the location.
        shape: &'static Shape,
    },
}

impl ReconcileErrorKind {
    /// Get an error code for this kind of error.
    pub const fn code(&self) -> &'static str {
        match self {
            ReconcileErrorKind::ShapeMismatch { .. } => "jsonface::reconcile::shape_mismatch",
            ReconcileErrorKind::NotAssignable { .. } => "jsonface::reconcile::not_assignable",
            ReconcileErrorKind::LengthMismatch { .. } => "jsonface::reconcile::length_mismatch",
            ReconcileErrorKind::FieldMismatch { .. } => "jsonface::reconcile::field_mismatch",
            ReconcileErrorKind::MissingResolver { .. } => "jsonface::reconcile::missing_resolver",
            ReconcileErrorKind::Unsupported { .. } => "jsonface::reconcile::unsupported",
        }
    }
}

impl Display for ReconcileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileErrorKind::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {expected}, got {got}")
            }
            ReconcileErrorKind::NotAssignable { expected, got } => {
                write!(f, "{got} is not assignable to {expected}")
            }
            ReconcileErrorKind::LengthMismatch { expected, got } => {
                write!(f, "length mismatch: expected {expected}, got {got}")
            }
            ReconcileErrorKind::FieldMismatch { expected, got } => {
                write!(f, "field mismatch: expected `{expected}`, got `{got}`")
            }
            ReconcileErrorKind::MissingResolver { name } => {
                write!(f, "no resolver registered for {name}")
            }
            ReconcileErrorKind::Unsupported { shape } => {
                write!(f, "not implemented: decoding into {shape}")
            }
        }
    }
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.path)
    }
}

impl std::error::Error for ReconcileError {}

/// Error returned by the non-panicking registration functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A resolver is already registered under this name.
    Duplicate {
        /// The interface name.
        name: String,
    },
    /// The type is not a polymorphic slot, so it has no interface name.
    NotAnInterface {
        /// Rendered type name.
        type_name: String,
    },
}

impl RegistryError {
    /// Get an error code for this kind of error.
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::Duplicate { .. } => "jsonface::registry::duplicate",
            RegistryError::NotAnInterface { .. } => "jsonface::registry::not_an_interface",
        }
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Duplicate { name } => {
                write!(f, "a resolver for {name} is already registered")
            }
            RegistryError::NotAnInterface { type_name } => {
                write!(f, "{type_name} is not a polymorphic slot")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

#[cfg(feature = "miette")]
impl miette::Diagnostic for RegistryError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(RegistryError::code(self)))
    }
}
