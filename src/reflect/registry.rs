//! Stores canonical type descriptors and hands out identity-comparable `Type` handles.

use std::any::TypeId as RustTypeId;
use std::sync::LazyLock;

use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::builder::{ClassBuilder, EnumBuilder};
use super::descriptor::{Type, TypeDescriptor, TypeIndex, TypeTraits};
use super::enumeration::ReflectEnum;
use super::error::{ReflectError, ReflectResult};
use super::reflect::{Reflect, TypeInfo};
use super::structure::ReflectClass;

/// Phase-one registration function run by [`TypeRegistry::install`].
pub type Registration = fn(&TypeRegistry) -> ReflectResult<()>;

#[derive(Clone, Debug)]
pub struct RegistryOptions {
    /// Emit a debug event whenever `invoke` finds no matching method.
    pub log_invoke_misses: bool,
    /// Emit a warning when a visit meets an unregistered enum discriminant.
    pub warn_unknown_enums: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            log_invoke_misses: true,
            warn_unknown_enums: true,
        }
    }
}

impl RegistryOptions {
    pub fn with_invoke_miss_logging(mut self, enabled: bool) -> Self {
        self.log_invoke_misses = enabled;
        self
    }

    pub fn with_unknown_enum_warnings(mut self, enabled: bool) -> Self {
        self.warn_unknown_enums = enabled;
        self
    }
}

/// The fingerprint two descriptors must share to be the same type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct IdentityKey {
    name: Box<str>,
    size: usize,
    pointer_depth: usize,
    traits: TypeTraits,
}

impl IdentityKey {
    fn of(info: &TypeInfo) -> Self {
        Self {
            name: info.name.as_str().into(),
            size: info.size,
            pointer_depth: info.pointer_depth,
            traits: info.traits,
        }
    }
}

#[derive(Default)]
struct RegistryStore {
    types: Vec<Type>,
    by_rust_id: AHashMap<RustTypeId, Type>,
    by_identity: AHashMap<IdentityKey, Type>,
    by_name: AHashMap<Box<str>, Type>,
}

/// Owner of every descriptor it creates.
///
/// Descriptors are leaked so [`Type`] handles and the structures behind them stay valid for
/// the rest of the process. Dropping a registry frees its indices but not its descriptors,
/// so registries are meant to be few and long-lived; [`TypeRegistry::global`] is the usual one.
pub struct TypeRegistry {
    store: Mutex<RegistryStore>,
    options: RegistryOptions,
}

static GLOBAL: LazyLock<TypeRegistry> = LazyLock::new(TypeRegistry::new);

impl TypeRegistry {
    /// An empty registry. Every descriptor it creates is leaked; see [`TypeRegistry`].
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            store: Mutex::new(RegistryStore::default()),
            options,
        }
    }

    /// Process-wide registry; initialized on first use and never torn down.
    pub fn global() -> &'static TypeRegistry {
        &GLOBAL
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Returns the canonical descriptor for `T`, creating it on first request.
    ///
    /// The draft is built without holding the lock because container types request their
    /// element types recursively. Two threads racing on the same `T` both build a draft; the
    /// first insert wins and the loser's draft is dropped.
    ///
    /// # Panics
    /// When a different Rust type already produced a descriptor with the same name, size,
    /// pointer depth and traits.
    pub fn get<T: Reflect>(&self) -> Type {
        let rust_id = RustTypeId::of::<T>();
        if let Some(ty) = self.store.lock().by_rust_id.get(&rust_id) {
            return *ty;
        }

        let info = T::type_info(self);
        let key = IdentityKey::of(&info);

        let mut store = self.store.lock();
        if let Some(ty) = store.by_rust_id.get(&rust_id) {
            return *ty;
        }
        if let Some(existing) = store.by_identity.get(&key) {
            panic!(
                "type identity `{}` is claimed by two Rust types ({})",
                existing.name(),
                std::any::type_name::<T>()
            );
        }

        let index = TypeIndex::from_index(store.types.len());
        let descriptor: &'static TypeDescriptor =
            Box::leak(Box::new(TypeDescriptor::from_info(index, rust_id, info)));
        let ty = Type::new(descriptor);
        store.types.push(ty);
        store.by_rust_id.insert(rust_id, ty);
        store.by_identity.insert(key, ty);
        store.by_name.entry(ty.name().into()).or_insert(ty);
        trace!(target: "reflect::registry", name = ty.name(), index = index.index(), "registered type");
        ty
    }

    /// Never creates; `None` for names nothing has registered yet.
    pub fn get_by_name(&self, name: &str) -> Option<Type> {
        self.store.lock().by_name.get(name).copied()
    }

    pub fn lookup_rust_type(&self, id: RustTypeId) -> Option<Type> {
        self.store.lock().by_rust_id.get(&id).copied()
    }

    /// Snapshot of every descriptor in registration order.
    pub fn types(&self) -> Vec<Type> {
        self.store.lock().types.clone()
    }

    /// Runs `visit` over a snapshot, so the callback may itself register types.
    pub fn for_each(&self, mut visit: impl FnMut(Type)) {
        for ty in self.types() {
            visit(ty);
        }
    }

    pub fn len(&self) -> usize {
        self.store.lock().types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_derived_from(&self, derived: Type, base: Type) -> bool {
        derived.derived_from(base)
    }

    pub fn class<T: ReflectClass>(&self) -> ClassBuilder<'_, T> {
        ClassBuilder::new(self)
    }

    pub fn enumeration<E: ReflectEnum>(&self) -> EnumBuilder<'_, E> {
        EnumBuilder::new(self)
    }

    /// Phase two: links every declared parent and checks nested structures resolve.
    pub fn finalize(&self) -> ReflectResult<()> {
        let mut linked = 0usize;
        let mut structures = 0usize;
        for ty in self.types() {
            let Some(structure) = ty.structure() else {
                continue;
            };
            structures += 1;
            if let Some(parent) = structure.declared_parent() {
                if parent.ty.structure().is_none() {
                    return Err(ReflectError::UnregisteredParent {
                        ty: ty.name().to_string(),
                        parent: parent.ty.name().to_string(),
                    });
                }
                structure.link_parent(parent);
                linked += 1;
            }
            for property in structure.properties() {
                if let Some(missing) = property.unresolved_structure() {
                    return Err(ReflectError::UnresolvedNestedStruct {
                        ty: ty.name().to_string(),
                        property: property.name().to_string(),
                        field: missing.name().to_string(),
                    });
                }
            }
        }
        debug!(target: "reflect::registry", structures, linked, "finalized registry");
        Ok(())
    }

    /// Runs every registration function in order, then [`TypeRegistry::finalize`].
    pub fn install(&self, registrations: &[Registration]) -> ReflectResult<()> {
        for register in registrations {
            register(self)?;
        }
        self.finalize()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
