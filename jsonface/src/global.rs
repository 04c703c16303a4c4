//! The process-wide registry.
//!
//! Register resolvers once at start-up, then decode from anywhere. Every
//! global decode holds the read lock for its whole duration, so registration
//! waits for in-flight decodes and decodes never see a half-built registry.

use std::sync::LazyLock;

use jsonface_core::{BoxError, Object, RawJson, Reflect, Shape, Value};
use parking_lot::RwLock;

use crate::{DecodeError, Registry, RegistryError};

static GLOBAL: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(Registry::new()));

/// Register a resolver in the process-wide registry.
///
/// # Panics
///
/// Panics if a resolver is already registered under `name`.
#[track_caller]
pub fn register_global<F>(name: impl Into<String>, resolver: F)
where
    F: Fn(&RawJson) -> Result<Object, BoxError> + Send + Sync + 'static,
{
    GLOBAL.write().register(name, resolver);
}

/// Register a resolver in the process-wide registry, failing on duplicates.
pub fn try_register_global<F>(name: impl Into<String>, resolver: F) -> Result<(), RegistryError>
where
    F: Fn(&RawJson) -> Result<Object, BoxError> + Send + Sync + 'static,
{
    GLOBAL.write().try_register(name, resolver)
}

/// Register a typed resolver for the polymorphic slot `T` in the
/// process-wide registry. See [`Registry::register_for`].
#[track_caller]
pub fn register_global_for<T, F>(resolver: F)
where
    T: Reflect,
    F: Fn(&RawJson) -> Result<T, BoxError> + Send + Sync + 'static,
{
    GLOBAL.write().register_for(resolver);
}

/// Remove every resolver from the process-wide registry.
///
/// Meant for tests. Must not be called from inside a resolver.
pub fn reset_global_registry() {
    warn!("resetting the global resolver registry");
    GLOBAL.write().clear();
}

/// Run `f` with the process-wide registry locked for reading.
///
/// The lock is taken recursively: a resolver running under it may decode
/// through the global entry points again, even while a writer is waiting.
pub fn with_global_registry<R>(f: impl FnOnce(&Registry) -> R) -> R {
    let registry = GLOBAL.read_recursive();
    f(&registry)
}

/// [`decode`](crate::decode) with the process-wide registry.
pub fn decode_global<T: Reflect>(input: &[u8], dest: &mut T) -> Result<(), DecodeError> {
    with_global_registry(|registry| crate::decode(input, dest, registry))
}

/// [`decode_value`](crate::decode_value) with the process-wide registry.
pub fn decode_value_global(
    input: &[u8],
    shape: &'static Shape,
    dest: &mut Value,
) -> Result<(), DecodeError> {
    with_global_registry(|registry| crate::decode_value(input, shape, dest, registry))
}

/// [`from_slice`](crate::from_slice) with the process-wide registry.
pub fn from_slice_global<T: Reflect>(input: &[u8]) -> Result<T, DecodeError> {
    with_global_registry(|registry| crate::from_slice(input, registry))
}

/// [`from_str`](crate::from_str) with the process-wide registry.
pub fn from_str_global<T: Reflect>(input: &str) -> Result<T, DecodeError> {
    from_slice_global(input.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    pub trait Lamp {
        fn lit(&self) -> bool;
    }
    jsonface_core::interface!(dyn Lamp as "tests::Lamp");

    struct On;

    impl Lamp for On {
        fn lit(&self) -> bool {
            true
        }
    }

    // The only unit test touching the process-wide registry, so it needs no
    // lock of its own.
    #[test]
    fn global_round_trip() {
        reset_global_registry();
        register_global_for(|_raw: &RawJson| -> Result<Box<dyn Lamp>, BoxError> { Ok(Box::new(On)) });
        with_global_registry(|registry| assert!(registry.contains("tests::Lamp")));

        let err = try_register_global("tests::Lamp", |_raw: &RawJson| Ok(Object::new(On)))
            .unwrap_err();
        assert_eq!(err.code(), "jsonface::registry::duplicate");

        let lamps: Vec<Box<dyn Lamp>> = from_str_global("[1, null]").unwrap();
        assert!(lamps.iter().all(|lamp| lamp.lit()));

        let mut lamp: Box<dyn Lamp> = from_slice_global(b"{}").unwrap();
        decode_global(b"0", &mut lamp).unwrap();
        assert!(lamp.lit());

        reset_global_registry();
        with_global_registry(|registry| assert!(registry.is_empty()));
        assert!(from_str_global::<Vec<Box<dyn Lamp>>>("[1]").is_err());
    }
}
