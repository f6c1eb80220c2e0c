//! Registry of user-defined extension types.
//!
//! Descriptors must be registered before any encode/decode that references
//! their id; the engine performs no implicit registration.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::RegistryError;
use crate::value::Value;

/// Turns the logical payload of an extension value into wire bytes.
pub type SerializeFn = dyn Fn(&Value) -> Vec<u8> + Send + Sync;

/// Rebuilds a value from extension payload bytes and the decoded id.
pub type DeserializeFn = dyn Fn(&[u8], i8) -> Value + Send + Sync;

/// A registered extension type: an id plus its serialize/deserialize hooks.
#[derive(Clone)]
pub struct ExtensionDescriptor {
    id: i8,
    serialize: Arc<SerializeFn>,
    deserialize: Arc<DeserializeFn>,
}

impl ExtensionDescriptor {
    pub fn new<S, D>(id: i8, serialize: S, deserialize: D) -> Self
    where
        S: Fn(&Value) -> Vec<u8> + Send + Sync + 'static,
        D: Fn(&[u8], i8) -> Value + Send + Sync + 'static,
    {
        Self {
            id,
            serialize: Arc::new(serialize),
            deserialize: Arc::new(deserialize),
        }
    }

    pub fn id(&self) -> i8 {
        self.id
    }

    pub fn serialize(&self, value: &Value) -> Vec<u8> {
        (self.serialize)(value)
    }

    pub fn deserialize(&self, payload: &[u8]) -> Value {
        (self.deserialize)(payload, self.id)
    }
}

impl fmt::Debug for ExtensionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionDescriptor")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Mapping from extension ids to descriptors.
///
/// The registry is the only shared mutable state in the engine. Lookups
/// during encode/decode take the read lock; `register`/`unregister` take
/// the write lock. Share one across encoders/decoders (and threads) via
/// [`Arc`].
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: RwLock<HashMap<i8, ExtensionDescriptor>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock still guards a structurally valid map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<i8, ExtensionDescriptor>> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<i8, ExtensionDescriptor>> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Adds a descriptor. Ids are unique: a second registration for the
    /// same id fails and leaves the first in place.
    pub fn register(&self, descriptor: ExtensionDescriptor) -> Result<(), RegistryError> {
        match self.write().entry(descriptor.id) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateId(descriptor.id)),
            Entry::Vacant(slot) => {
                slot.insert(descriptor);
                Ok(())
            }
        }
    }

    /// Removes and returns the descriptor for `id`.
    pub fn unregister(&self, id: i8) -> Result<ExtensionDescriptor, RegistryError> {
        self.write().remove(&id).ok_or(RegistryError::UnknownId(id))
    }

    pub fn get(&self, id: i8) -> Option<ExtensionDescriptor> {
        self.read().get(&id).cloned()
    }

    pub fn is_registered(&self, id: i8) -> bool {
        self.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
