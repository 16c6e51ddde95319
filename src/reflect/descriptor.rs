//! Canonical per-type records owned by the registry plus the copyable `Type` handle.

use std::any::TypeId as RustTypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroU32;
use std::ops::Deref;
use std::ptr;
use std::sync::OnceLock;

use bitflags::bitflags;

use super::enumeration::EnumTable;
use super::error::{ReflectError, ReflectResult};
use super::manipulator::{ArrayManipulator, WrapManipulator};
use super::object::Object;
use super::reflect::TypeInfo;
use super::scalar::{IntRepr, NumericKind};
use super::structure::StructureDescriptor;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TypeTraits: u32 {
        const CLASS = 1 << 0;
        const ENUM = 1 << 1;
        const ARRAY = 1 << 2;
        const POINTER = 1 << 3;
        const REFERENCE = 1 << 4;
        const CONST = 1 << 5;
        const ARITHMETIC = 1 << 6;
        const INTEGRAL = 1 << 7;
        const FLOATING = 1 << 8;
        const SIGNED = 1 << 9;
        const BOOLEAN = 1 << 10;
        const STRING = 1 << 11;
        const WRAPPER = 1 << 12;
        const OBJECT = 1 << 13;
        const VOID = 1 << 14;
    }
}

/// Dense registration-order index of a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIndex(NonZeroU32);

impl TypeIndex {
    pub fn from_index(index: usize) -> Self {
        let raw = NonZeroU32::new((index as u32) + 1).expect("type index overflow");
        Self(raw)
    }

    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Closed classification of what a type looks like in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeShape {
    Void,
    Numeric(NumericKind),
    String,
    Enum(IntRepr),
    Array { element: Type },
    Wrap { inner: Type },
    Struct,
    /// `Box<dyn Object>`: the pointee reports its own type at runtime.
    Object,
    Pointer { pointee: Type },
    Reference { referent: Type },
    Opaque,
}

/// Default-construction capability attached to a descriptor.
#[derive(Clone, Copy)]
pub struct Factory(fn() -> Box<dyn Object>);

impl Factory {
    pub fn new(create: fn() -> Box<dyn Object>) -> Self {
        Self(create)
    }

    pub fn of<T: Object + Default>() -> Self {
        fn create<T: Object + Default>() -> Box<dyn Object> {
            Box::new(T::default())
        }
        Self(create::<T>)
    }

    pub fn create(&self) -> Box<dyn Object> {
        (self.0)()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Factory")
    }
}

pub struct TypeDescriptor {
    index: TypeIndex,
    rust_id: RustTypeId,
    name: Box<str>,
    size: usize,
    align: usize,
    pointer_depth: usize,
    traits: TypeTraits,
    shape: TypeShape,
    raw: Option<Type>,
    array: Option<Box<dyn ArrayManipulator>>,
    wrap: Option<Box<dyn WrapManipulator>>,
    enum_table: OnceLock<EnumTable>,
    factory: OnceLock<Factory>,
    structure: OnceLock<StructureDescriptor>,
}

impl TypeDescriptor {
    pub(crate) fn from_info(index: TypeIndex, rust_id: RustTypeId, info: TypeInfo) -> Self {
        let factory = OnceLock::new();
        if let Some(create) = info.factory {
            let _ = factory.set(create);
        }
        Self {
            index,
            rust_id,
            name: info.name.into_boxed_str(),
            size: info.size,
            align: info.align,
            pointer_depth: info.pointer_depth,
            traits: info.traits,
            shape: info.shape,
            raw: info.raw,
            array: info.array,
            wrap: info.wrap,
            enum_table: OnceLock::new(),
            factory,
            structure: OnceLock::new(),
        }
    }

    pub fn index(&self) -> TypeIndex {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn align(&self) -> usize {
        self.align
    }

    pub fn pointer_depth(&self) -> usize {
        self.pointer_depth
    }

    pub fn traits(&self) -> TypeTraits {
        self.traits
    }

    pub fn shape(&self) -> TypeShape {
        self.shape
    }

    /// Qualifier and reference stripped form, when it differs from this type.
    pub fn raw(&self) -> Option<Type> {
        self.raw
    }

    /// Rust type that first produced this descriptor.
    pub fn rust_type_id(&self) -> RustTypeId {
        self.rust_id
    }

    pub fn is_class(&self) -> bool {
        self.traits.contains(TypeTraits::CLASS)
    }

    pub fn is_pointer(&self) -> bool {
        self.traits.contains(TypeTraits::POINTER)
    }

    pub fn is_void(&self) -> bool {
        self.traits.contains(TypeTraits::VOID)
    }

    pub fn has_array_manipulator(&self) -> bool {
        self.array.is_some()
    }

    pub fn has_wrap_manipulator(&self) -> bool {
        self.wrap.is_some()
    }

    /// Panics when the type is not array-shaped; property kinds are fixed at registration so
    /// a miss here means the metadata is corrupt.
    pub fn array_manipulator(&self) -> &dyn ArrayManipulator {
        match &self.array {
            Some(manipulator) => manipulator.as_ref(),
            None => panic!("type `{}` has no array manipulator", self.name),
        }
    }

    pub fn wrap_manipulator(&self) -> &dyn WrapManipulator {
        match &self.wrap {
            Some(manipulator) => manipulator.as_ref(),
            None => panic!("type `{}` has no wrap manipulator", self.name),
        }
    }

    pub fn enum_table(&self) -> Option<&EnumTable> {
        self.enum_table.get()
    }

    pub fn factory(&self) -> Option<Factory> {
        self.factory.get().copied()
    }

    pub fn create_default(&self) -> Option<Box<dyn Object>> {
        self.factory.get().map(Factory::create)
    }

    pub fn structure(&self) -> Option<&StructureDescriptor> {
        self.structure.get()
    }

    pub fn require_structure(&self) -> ReflectResult<&StructureDescriptor> {
        self.structure
            .get()
            .ok_or_else(|| ReflectError::MissingStructure {
                ty: self.name.to_string(),
            })
    }

    pub(crate) fn seal_structure(&self, structure: StructureDescriptor) -> ReflectResult<()> {
        self.structure
            .set(structure)
            .map_err(|_| ReflectError::AlreadySealed {
                ty: self.name.to_string(),
            })
    }

    pub(crate) fn attach_enum_table(&self, table: EnumTable) -> ReflectResult<()> {
        self.enum_table
            .set(table)
            .map_err(|_| ReflectError::EnumAlreadyRegistered {
                ty: self.name.to_string(),
            })
    }

    /// First factory wins; later installs are ignored.
    pub(crate) fn install_factory(&self, factory: Factory) {
        let _ = self.factory.set(factory);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("index", &self.index.index())
            .field("name", &self.name)
            .field("size", &self.size)
            .field("pointer_depth", &self.pointer_depth)
            .field("traits", &self.traits)
            .field("shape", &self.shape)
            .field("sealed", &self.structure.get().is_some())
            .finish()
    }
}

/// How an argument of one type is passed to a parameter of another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conversion {
    Identity,
    /// The argument is a reference to the parameter type and is read through.
    Dereference,
    /// Both are pointers; the argument pointee embeds the parameter pointee at `offset`.
    Upcast { offset: usize },
}

/// Identity handle to a registry-owned descriptor; equality is descriptor identity.
#[derive(Clone, Copy)]
pub struct Type(&'static TypeDescriptor);

impl Type {
    pub(crate) fn new(descriptor: &'static TypeDescriptor) -> Self {
        Self(descriptor)
    }

    pub fn descriptor(self) -> &'static TypeDescriptor {
        self.0
    }

    // By-value forwards so borrows outlive a temporary handle; `Deref` covers the rest.

    pub fn name(self) -> &'static str {
        self.0.name()
    }

    pub fn structure(self) -> Option<&'static StructureDescriptor> {
        self.0.structure()
    }

    pub fn require_structure(self) -> ReflectResult<&'static StructureDescriptor> {
        self.0.require_structure()
    }

    pub fn enum_table(self) -> Option<&'static EnumTable> {
        self.0.enum_table()
    }

    /// Byte offset of `base` inside this type when this type is, or derives from, `base`.
    pub fn base_offset(self, base: Type) -> Option<usize> {
        if self == base {
            return Some(0);
        }
        let structure = self.0.structure()?;
        structure
            .lineage()
            .find(|(level, _)| level.owner() == base)
            .map(|(_, offset)| offset)
    }

    pub fn derived_from(self, base: Type) -> bool {
        self.base_offset(base).is_some()
    }

    /// [`Type::base_offset`] for an instance of this type viewed as `base`.
    ///
    /// The same Rust type described by two registries is reported as a foreign registry
    /// rather than an unrelated type.
    pub(crate) fn instance_offset(self, base: Type) -> ReflectResult<usize> {
        if let Some(offset) = self.base_offset(base) {
            return Ok(offset);
        }
        if self.rust_type_id() == base.rust_type_id() {
            return Err(ReflectError::ForeignRegistry {
                ty: self.name().to_string(),
            });
        }
        Err(ReflectError::InstanceMismatch {
            expected: base.name().to_string(),
            actual: self.name().to_string(),
        })
    }

    pub fn conversion_to(self, target: Type) -> Option<Conversion> {
        if self == target {
            return Some(Conversion::Identity);
        }
        match (self.shape(), target.shape()) {
            (TypeShape::Pointer { pointee: from }, TypeShape::Pointer { pointee: to }) => {
                if self.traits().contains(TypeTraits::CONST)
                    && !target.traits().contains(TypeTraits::CONST)
                {
                    return None;
                }
                from.base_offset(to)
                    .map(|offset| Conversion::Upcast { offset })
            }
            (TypeShape::Reference { .. }, _) if self.raw() == Some(target) => {
                Some(Conversion::Dereference)
            }
            _ => None,
        }
    }
}

impl Deref for Type {
    type Target = TypeDescriptor;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.0, other.0)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(self.0, state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.0.name)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}
