#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

/// Trace-level logging macro that forwards to `tracing::trace!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Trace-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Debug-level logging macro that forwards to `tracing::debug!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Debug-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

/// Warn-level logging macro that forwards to `tracing::warn!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! warn {
    ($($arg:tt)*) => {
        ::tracing::warn!($($arg)*)
    };
}

/// Warn-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

mod error;
mod registry;
mod global;
pub mod shadow;
pub mod de;
mod reconcile;

pub use error::{
    DecodeError, DeriveError, DeriveErrorKind, ReconcileError, ReconcileErrorKind, RegistryError,
};
pub use global::{
    decode_global, decode_value_global, from_slice_global, from_str_global, register_global,
    register_global_for, reset_global_registry, try_register_global, with_global_registry,
};
pub use registry::{Registry, Resolver};
pub use shadow::{ShadowShape, derive};

pub use jsonface_core::*;

/// Decode `input` into `dest`, a value of shape `shape`, resolving
/// polymorphic slots with `registry`.
///
/// `dest` must already hold a value that fits `shape`, such as
/// `Value::zero(shape)`. When no slot of `shape` has a resolver in
/// `registry`, the input is decoded directly; otherwise it goes through a
/// shadow shape whose captured slots are handed to the resolvers.
pub fn decode_value(
    input: &[u8],
    shape: &'static Shape,
    dest: &mut Value,
    registry: &Registry,
) -> Result<(), DecodeError> {
    if !dest.fits(shape) {
        return Err(DecodeError::InvalidDestination {
            expected: shape,
            got: dest.kind_name(),
        });
    }

    let shadow = derive(shape, registry)?;
    if !shadow.needs_shadow() {
        debug!(shape = %shape, "no registered slots, decoding directly");
        *dest = de::decode_shape(input, shape)?;
        return Ok(());
    }

    debug!(shape = %shape, shadow = %shadow, "decoding through shadow");
    let shadow_value = de::decode_shadow(input, &shadow)?;
    let mut real = Value::zero(shape);
    reconcile::reconcile(shadow_value, &shadow, &mut real, registry)?;
    *dest = real;
    Ok(())
}

/// Decode `input` into `dest`, resolving polymorphic slots with `registry`.
///
/// `dest` is only written when the whole decode succeeds.
pub fn decode<T: Reflect>(input: &[u8], dest: &mut T, registry: &Registry) -> Result<(), DecodeError> {
    *dest = from_slice(input, registry)?;
    Ok(())
}

/// Decode a `T` from JSON bytes, resolving polymorphic slots with `registry`.
pub fn from_slice<T: Reflect>(input: &[u8], registry: &Registry) -> Result<T, DecodeError> {
    let mut value = Value::zero(T::SHAPE);
    decode_value(input, T::SHAPE, &mut value, registry)?;
    Ok(T::from_value(value)?)
}

/// Decode a `T` from a JSON string, resolving polymorphic slots with `registry`.
pub fn from_str<T: Reflect>(input: &str, registry: &Registry) -> Result<T, DecodeError> {
    from_slice(input.as_bytes(), registry)
}
