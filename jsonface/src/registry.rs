//! Mapping from interface names to resolvers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jsonface_core::{BoxError, Object, RawJson, Reflect};

use crate::RegistryError;

/// A caller-supplied function that looks at the raw JSON of a polymorphic
/// slot and builds the concrete value that goes there.
#[derive(Clone)]
pub struct Resolver(Arc<dyn Fn(&RawJson) -> Result<Object, BoxError> + Send + Sync>);

impl Resolver {
    /// Wrap a resolver function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&RawJson) -> Result<Object, BoxError> + Send + Sync + 'static,
    {
        Resolver(Arc::new(f))
    }

    /// Run the resolver on captured JSON.
    #[inline]
    pub fn resolve(&self, raw: &RawJson) -> Result<Object, BoxError> {
        (self.0)(raw)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

/// A set of resolvers, keyed by the qualified name of the interface they
/// resolve.
///
/// A registry owned by the caller needs no locking: pass it to
/// [`decode`](crate::decode) by reference. For a process-wide registry see
/// [`register_global`](crate::register_global).
///
/// ```
/// use jsonface::{Registry, RawJson};
///
/// pub trait Shape {
///     fn area(&self) -> f64;
/// }
/// jsonface::interface!(dyn Shape as "geometry::Shape");
///
/// struct Unit;
/// impl Shape for Unit {
///     fn area(&self) -> f64 { 1.0 }
/// }
///
/// let mut registry = Registry::new();
/// registry.register_for(|_raw: &RawJson| Ok(Box::new(Unit) as Box<dyn Shape>));
/// assert!(registry.contains("geometry::Shape"));
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    resolvers: HashMap<String, Resolver>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver under an interface name.
    ///
    /// # Panics
    ///
    /// Panics if a resolver is already registered under `name`, even if it
    /// is the same function. Two resolvers for one interface is a
    /// configuration error.
    #[track_caller]
    pub fn register<F>(&mut self, name: impl Into<String>, resolver: F) -> &mut Self
    where
        F: Fn(&RawJson) -> Result<Object, BoxError> + Send + Sync + 'static,
    {
        if let Err(e) = self.try_register(name, resolver) {
            panic!("{e}");
        }
        self
    }

    /// Register a resolver under an interface name, failing on duplicates.
    pub fn try_register<F>(&mut self, name: impl Into<String>, resolver: F) -> Result<(), RegistryError>
    where
        F: Fn(&RawJson) -> Result<Object, BoxError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.resolvers.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        debug!(name = %name, "registering resolver");
        self.resolvers.insert(name, Resolver::new(resolver));
        Ok(())
    }

    /// Register a typed resolver for the polymorphic slot `T`, usually a
    /// `Box<dyn Trait>` made into a slot with [`interface!`](crate::interface).
    ///
    /// # Panics
    ///
    /// Panics on duplicates, and if `T` is not a polymorphic slot.
    #[track_caller]
    pub fn register_for<T, F>(&mut self, resolver: F) -> &mut Self
    where
        T: Reflect,
        F: Fn(&RawJson) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        if let Err(e) = self.try_register_for(resolver) {
            panic!("{e}");
        }
        self
    }

    /// Non-panicking version of [`Registry::register_for`].
    pub fn try_register_for<T, F>(&mut self, resolver: F) -> Result<(), RegistryError>
    where
        T: Reflect,
        F: Fn(&RawJson) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let name = T::SHAPE
            .interface_name()
            .ok_or_else(|| RegistryError::NotAnInterface {
                type_name: T::SHAPE.to_string(),
            })?;
        self.try_register(name, move |raw: &RawJson| resolver(raw).map(Object::new))
    }

    /// Look up the resolver for an interface name.
    pub fn get(&self, name: &str) -> Option<&Resolver> {
        self.resolvers.get(name)
    }

    /// Whether a resolver is registered for an interface name.
    pub fn contains(&self, name: &str) -> bool {
        self.resolvers.contains_key(name)
    }

    /// Number of registered resolvers.
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Whether no resolver is registered.
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Registered interface names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Drop every resolver.
    pub fn clear(&mut self) {
        self.resolvers.clear();
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}
