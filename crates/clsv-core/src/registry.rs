//! # Bag Registry
//!
//! Resolves, composes, and memoizes the [`ValidatorBag`] of every validator
//! class.
//!
//! ## Resolution
//!
//! 1. [`Target::Plain`] resolves to the empty bag. Nothing is cached.
//! 2. A cached bag for the class's [`ClassId`] is returned as is.
//! 3. Otherwise the parent is resolved through the same path (a root class
//!    inherits from the empty bag), its schema and messages are copied into
//!    a new bag keyed `"<nonce>.<ClassName>"`, the class's own declarations
//!    run against it, and the result is stored in the class's slot.
//!
//! Each class owns exactly one slot. A subclass never writes into its
//! parent's slot, and a parent changed after a subclass was resolved is not
//! propagated to the subclass.
//!
//! ## Locking
//!
//! Slots live behind a `parking_lot::RwLock`. The lock is released before
//! parent resolution and before any declaration code runs, so declarations
//! may resolve other classes. If two threads race on a first resolution,
//! the first bag stored wins and both callers receive it.
//!
//! ## Recursive references
//!
//! A class whose declarations reach itself again (a `Tree` nesting
//! `Tree`s, or a cycle through `parent`) is detected per thread. The inner
//! reference receives the bag as it stood before the class's own
//! declarations ran: its inherited fields, or nothing while the parent chain
//! is still being walked. A warning is logged.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, RwLock};

use crate::bag::ValidatorBag;
use crate::class::{ClassId, Target, Validatable, ValidatorClass};
use crate::config::RegistryConfig;
use crate::declare::FieldDeclarations;
use crate::error::ConfigError;
use crate::messages::Messages;
use crate::node::SchemaNode;
use crate::nonce::KeyGenerator;

/// Re-draws after which a disambiguating suffix is appended to a key.
const MAX_KEY_REDRAWS: usize = 8;

#[derive(Debug, Default)]
struct Slots {
    bags: HashMap<ClassId, Arc<ValidatorBag>>,
    keys: HashSet<String>,
}

type InFlight = HashMap<(ThreadId, ClassId), Arc<ValidatorBag>>;

/// Per-class bag cache.
#[derive(Debug)]
pub struct BagRegistry {
    keys: Arc<KeyGenerator>,
    slots: RwLock<Slots>,
    in_flight: Mutex<InFlight>,
}

/// Marks a class as being resolved on the current thread until dropped.
struct ResolutionGuard<'a> {
    in_flight: &'a Mutex<InFlight>,
    slot: (ThreadId, ClassId),
}

impl<'a> ResolutionGuard<'a> {
    fn enter(in_flight: &'a Mutex<InFlight>, id: ClassId) -> Self {
        let slot = (thread::current().id(), id);
        in_flight.lock().insert(slot, Arc::new(ValidatorBag::empty()));
        Self { in_flight, slot }
    }

    /// Publish the bag inner references to this class will receive.
    fn publish(&self, partial: &ValidatorBag) {
        self.in_flight
            .lock()
            .insert(self.slot, Arc::new(partial.clone()));
    }
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.slot);
    }
}

impl BagRegistry {
    /// Registry drawing bag keys from `keys`.
    pub fn new(keys: Arc<KeyGenerator>) -> Self {
        Self {
            keys,
            slots: RwLock::new(Slots::default()),
            in_flight: Mutex::new(InFlight::new()),
        }
    }

    /// Registry with a system-clock key generator configured from `config`.
    pub fn with_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Arc::new(KeyGenerator::from_config(config)?)))
    }

    /// The process-wide registry, configured from the environment on first use.
    ///
    /// An invalid environment falls back to the default configuration.
    pub fn global() -> Arc<BagRegistry> {
        static GLOBAL: OnceLock<Arc<BagRegistry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| {
                let config = RegistryConfig::from_env().unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "invalid registry configuration; using defaults");
                    RegistryConfig::default()
                });
                let keys = KeyGenerator::from_config(&config).unwrap_or_default();
                Arc::new(BagRegistry::new(Arc::new(keys)))
            })
            .clone()
    }

    /// Resolve the bag of `T`.
    pub fn resolve<T: Validatable>(&self) -> Arc<ValidatorBag> {
        self.resolve_class(&ValidatorClass::of::<T>())
    }

    /// Resolve the bag of any target. Plain targets receive the empty bag.
    pub fn resolve_target(&self, target: Target) -> Arc<ValidatorBag> {
        match target {
            Target::Plain => Arc::new(ValidatorBag::empty()),
            Target::Class(class) => self.resolve_class(&class),
        }
    }

    /// Resolve the bag of `class`, composing it from its ancestry on first use.
    pub fn resolve_class(&self, class: &ValidatorClass) -> Arc<ValidatorBag> {
        if let Some(bag) = self.slots.read().bags.get(&class.id()) {
            return Arc::clone(bag);
        }

        let pending = self
            .in_flight
            .lock()
            .get(&(thread::current().id(), class.id()))
            .cloned();
        if let Some(partial) = pending {
            tracing::warn!(
                class = class.name(),
                fields = partial.schema.len(),
                "recursive validator class reference; using the partially resolved bag"
            );
            return partial;
        }

        let guard = ResolutionGuard::enter(&self.in_flight, class.id());
        let parent = match class.parent() {
            Some(parent) => self.resolve_class(&parent),
            None => Arc::new(ValidatorBag::empty()),
        };

        let mut bag = ValidatorBag::inherit(&parent, String::new());
        guard.publish(&bag);
        class.declare(&mut FieldDeclarations::new(self, &mut bag));
        drop(guard);

        let mut slots = self.slots.write();
        if let Some(existing) = slots.bags.get(&class.id()) {
            return Arc::clone(existing);
        }
        bag.key = self.fresh_key(&slots.keys, class.name());
        slots.keys.insert(bag.key.clone());

        tracing::debug!(
            class = class.name(),
            metadata = %class.metadata_key(),
            key = %bag.key,
            fields = bag.schema.len(),
            "resolved validator bag"
        );

        let bag = Arc::new(bag);
        slots.bags.insert(class.id(), Arc::clone(&bag));
        bag
    }

    /// Apply further declarations to `class`'s own bag.
    ///
    /// The bag is resolved first if needed. Only the class's slot is
    /// replaced; the parent and already-resolved subclasses are untouched,
    /// as are `Arc`s previously handed out for this class. The key is kept.
    ///
    /// Concurrent updates of the same class must be serialized by the caller.
    pub fn update<R>(
        &self,
        class: &ValidatorClass,
        f: impl FnOnce(&mut FieldDeclarations<'_>) -> R,
    ) -> R {
        let current = self.resolve_class(class);
        let mut bag = ValidatorBag::clone(&current);
        let out = f(&mut FieldDeclarations::new(self, &mut bag));
        self.slots.write().bags.insert(class.id(), Arc::new(bag));
        out
    }

    /// Register one field with its messages on `class`.
    pub fn declare_field(
        &self,
        class: &ValidatorClass,
        name: &str,
        node: SchemaNode,
        messages: &Messages,
    ) {
        self.update(class, |fields| {
            fields.field_with_messages(name, node, messages);
        });
    }

    /// An object node validated by `T`'s schema.
    pub fn nested<T: Validatable>(&self) -> SchemaNode {
        SchemaNode::object(self.resolve::<T>().schema.clone())
    }

    /// Whether `id` has a cached bag.
    pub fn contains(&self, id: &ClassId) -> bool {
        self.slots.read().bags.contains_key(id)
    }

    /// Number of cached bags.
    pub fn len(&self) -> usize {
        self.slots.read().bags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fresh_key(&self, issued: &HashSet<String>, name: &str) -> String {
        let mut key = format!("{}.{name}", self.keys.next());
        let mut attempt = 0usize;
        while issued.contains(&key) {
            attempt += 1;
            tracing::warn!(key = %key, attempt, "validator bag key collision; drawing a new nonce");
            key = if attempt < MAX_KEY_REDRAWS {
                format!("{}.{name}", self.keys.next())
            } else {
                format!("{}.{name}#{attempt}", self.keys.next())
            };
        }
        key
    }
}

impl Default for BagRegistry {
    fn default() -> Self {
        Self::new(Arc::new(KeyGenerator::new()))
    }
}
