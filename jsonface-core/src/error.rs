use core::fmt;

use crate::{Path, PathStep};

/// Error converting a [`Value`](crate::Value) into a typed Rust value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueError {
    /// What went wrong.
    pub kind: ValueErrorKind,
    /// Where it went wrong, relative to the value being converted.
    pub path: Path,
}

/// The kinds of conversion failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueErrorKind {
    /// The value is of a different kind than the target type.
    TypeMismatch {
        /// Target type.
        expected: &'static str,
        /// Kind of the value found.
        got: &'static str,
    },
    /// A null was found where the target type cannot be null.
    NullValue {
        /// Target type.
        expected: &'static str,
    },
    /// A resolved object has a different concrete type than the slot.
    WrongObject {
        /// Target type.
        expected: &'static str,
        /// Type the object was created from.
        got: &'static str,
    },
    /// A number does not fit the target type.
    NumberOutOfRange {
        /// The number, rendered.
        value: String,
        /// Target type.
        target: &'static str,
    },
    /// A fixed-size array received the wrong number of elements.
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },
    /// The target type can never be produced from a value.
    Unsupported {
        /// Target type.
        target: &'static str,
    },
}

impl ValueError {
    /// Create an error at the root.
    pub fn new(kind: ValueErrorKind) -> Self {
        Self {
            kind,
            path: Path::new(),
        }
    }

    /// Shorthand for [`ValueErrorKind::TypeMismatch`].
    pub fn mismatch(expected: &'static str, got: &'static str) -> Self {
        Self::new(ValueErrorKind::TypeMismatch { expected, got })
    }

    /// Record that the error happened one step further down.
    pub fn within(mut self, step: PathStep) -> Self {
        self.path.prepend(step);
        self
    }

    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self.kind {
            ValueErrorKind::TypeMismatch { .. } => "jsonface::value::type_mismatch",
            ValueErrorKind::NullValue { .. } => "jsonface::value::null",
            ValueErrorKind::WrongObject { .. } => "jsonface::value::wrong_object",
            ValueErrorKind::NumberOutOfRange { .. } => "jsonface::value::out_of_range",
            ValueErrorKind::LengthMismatch { .. } => "jsonface::value::length_mismatch",
            ValueErrorKind::Unsupported { .. } => "jsonface::value::unsupported",
        }
    }
}

impl fmt::Display for ValueErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueErrorKind::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            ValueErrorKind::NullValue { expected } => {
                write!(f, "null found where {expected} is required")
            }
            ValueErrorKind::WrongObject { expected, got } => {
                write!(f, "object of type {got} cannot be used as {expected}")
            }
            ValueErrorKind::NumberOutOfRange { value, target } => {
                write!(f, "number {value} out of range for {target}")
            }
            ValueErrorKind::LengthMismatch { expected, got } => {
                write!(f, "expected {expected} elements, got {got}")
            }
            ValueErrorKind::Unsupported { target } => {
                write!(f, "{target} cannot be built from a decoded value")
            }
        }
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.path)
    }
}

impl std::error::Error for ValueError {}
