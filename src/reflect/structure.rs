//! Class metadata: properties, methods and constructors plus the parent chain.

use std::any::Any;
use std::sync::OnceLock;

use smallvec::SmallVec;
use tracing::{debug, info};

use super::argument::{ArgumentList, ConvertedArguments, ReturnSlot};
use super::descriptor::Type;
use super::dump::DumpVisitor;
use super::error::{ReflectError, ReflectResult};
use super::instance::{Instance, InstanceMut};
use super::method::MethodDescriptor;
use super::property::{PropertyDescriptor, PropertyKind};
use super::reflect::Reflect;
use super::registry::TypeRegistry;
use super::visitor::PropertyVisitor;

/// A parent class embedded by value at `offset` bytes into the child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParentLink {
    pub ty: Type,
    pub offset: usize,
}

impl ParentLink {
    pub fn new(ty: Type, offset: usize) -> Self {
        Self { ty, offset }
    }
}

/// Types registered through [`TypeRegistry::class`].
///
/// # Safety
/// A returned [`ParentLink`] must name the type of a field of `Self` and that field's
/// `offset_of!`. Inherited properties and methods are reached through it.
pub unsafe trait ReflectClass: Reflect {
    fn parent(registry: &TypeRegistry) -> Option<ParentLink> {
        let _ = registry;
        None
    }
}

pub struct StructureDescriptor {
    name: Box<str>,
    owner: Type,
    declared_parent: Option<ParentLink>,
    parent: OnceLock<ParentLink>,
    properties: Vec<PropertyDescriptor>,
    methods: Vec<MethodDescriptor>,
    constructors: Vec<MethodDescriptor>,
}

impl StructureDescriptor {
    pub(crate) fn new(owner: Type, declared_parent: Option<ParentLink>) -> Self {
        Self {
            name: owner.name().into(),
            owner,
            declared_parent,
            parent: OnceLock::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub(crate) fn push_property(&mut self, property: PropertyDescriptor) {
        self.properties.push(property);
    }

    pub(crate) fn push_method(&mut self, method: MethodDescriptor) {
        self.methods.push(method);
    }

    pub(crate) fn push_constructor(&mut self, constructor: MethodDescriptor) {
        self.constructors.push(constructor);
    }

    /// One-time link made by `finalize`; later calls keep the first link.
    pub(crate) fn link_parent(&self, link: ParentLink) {
        let _ = self.parent.set(link);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Type {
        self.owner
    }

    /// Parent named at registration, linked or not.
    pub fn declared_parent(&self) -> Option<ParentLink> {
        self.declared_parent
    }

    /// Parent resolved by `finalize`.
    pub fn parent(&self) -> Option<ParentLink> {
        self.parent.get().copied()
    }

    pub fn parent_structure(&self) -> Option<&StructureDescriptor> {
        self.parent()
            .and_then(|link| link.ty.descriptor().structure())
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn constructors(&self) -> &[MethodDescriptor] {
        &self.constructors
    }

    /// This structure then each resolved ancestor, with its cumulative offset.
    pub fn lineage(&self) -> Lineage<'_> {
        Lineage {
            next: Some((self, 0)),
        }
    }

    pub fn base_offset(&self, base: Type) -> Option<usize> {
        self.lineage()
            .find(|(level, _)| level.owner == base)
            .map(|(_, offset)| offset)
    }

    /// Reflexive and transitive along resolved parents.
    pub fn derived_from(&self, base: Type) -> bool {
        self.base_offset(base).is_some()
    }

    /// First property named `name`, searching derived before base.
    pub fn find_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.lineage()
            .flat_map(|(level, _)| level.properties.iter())
            .find(|property| property.name() == name)
    }

    pub fn find_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.lineage()
            .flat_map(|(level, _)| level.methods.iter())
            .find(|method| method.name() == name)
    }

    /// Resolves a dotted path such as `stats.health` through nested structures.
    pub fn property_at_path(&self, path: &str) -> ReflectResult<FieldRef<'_>> {
        let mut structure = self;
        let mut base = 0usize;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let (owner_offset, property) = structure
                .lineage()
                .find_map(|(level, offset)| {
                    level
                        .properties
                        .iter()
                        .find(|property| property.name() == segment)
                        .map(|property| (offset, property))
                })
                .ok_or_else(|| ReflectError::MissingProperty {
                    ty: structure.name.to_string(),
                    name: segment.to_string(),
                })?;
            let owner_offset = base + owner_offset;
            if segments.peek().is_none() {
                return Ok(FieldRef {
                    root: self.owner,
                    property,
                    owner_offset,
                });
            }
            if !matches!(property.kind(), PropertyKind::NestedStruct) || property.is_computed() {
                return Err(ReflectError::WrongPropertyKind {
                    property: property.name().to_string(),
                    expected: "struct",
                });
            }
            structure = property.ty().descriptor().require_structure()?;
            base = owner_offset + property.offset();
        }
        Err(ReflectError::MissingProperty {
            ty: self.name.to_string(),
            name: path.to_string(),
        })
    }

    fn root_offset(&self, instance_ty: Type) -> ReflectResult<usize> {
        instance_ty.instance_offset(self.owner)
    }

    /// Visits every property, derived levels before their parents.
    pub fn visit(&self, instance: Instance<'_>, visitor: &mut dyn PropertyVisitor) -> ReflectResult<()> {
        let root = self.root_offset(instance.ty())?;
        for (level, offset) in self.lineage() {
            // SAFETY: each ancestor is embedded at its cumulative offset.
            let view = unsafe { instance.field(root + offset, level.owner) };
            for property in &level.properties {
                visitor.begin_property(property);
                property.visit(view, visitor)?;
                visitor.end_property(property);
            }
        }
        Ok(())
    }

    pub fn dump(&self, instance: Instance<'_>, indent: usize) -> ReflectResult<String> {
        let mut dump = DumpVisitor::new(indent);
        self.visit(instance, &mut dump)?;
        Ok(dump.finish())
    }

    /// Emits the dump through `tracing`, one event per line.
    pub fn log_out(&self, instance: Instance<'_>, indent: usize) -> ReflectResult<()> {
        let mut dump = DumpVisitor::new(indent);
        self.visit(instance, &mut dump)?;
        for line in dump.into_lines() {
            info!(target: "reflect::dump", ty = self.name(), "{line}");
        }
        Ok(())
    }

    /// Calls the first method named `name` whose signature accepts `args` and returns `R`.
    ///
    /// Requesting `()` accepts any return type and discards the value. `instance` must be
    /// built on the registry this structure was sealed in; otherwise the call fails with
    /// [`ReflectError::ForeignRegistry`] before any signature is compared.
    pub fn try_invoke<R, A>(&self, mut instance: InstanceMut<'_>, name: &str, args: &A) -> ReflectResult<R>
    where
        R: Reflect,
        A: ArgumentList + ?Sized,
    {
        let registry = instance.registry();
        let requested = registry.get::<R>();
        let unit = registry.get::<()>();
        let arguments = args.arguments(registry);
        let root = self.root_offset(instance.ty())?;

        for (level, offset) in self.lineage() {
            for method in level.methods.iter().filter(|method| method.name() == name) {
                let Some(conversions) = method.accepts(requested, unit, &arguments) else {
                    continue;
                };
                let mut result: Option<R> = None;
                let mut scratch = SmallVec::new();
                // SAFETY: conversions were matched against this method's parameters.
                let converted = unsafe {
                    ConvertedArguments::new(method.params(), &arguments, &conversions, &mut scratch)
                };
                {
                    let mut slot = ReturnSlot::new(registry, &mut result);
                    // SAFETY: each ancestor is embedded at its cumulative offset.
                    let target = unsafe { instance.reborrow().field(root + offset, level.owner) };
                    // SAFETY: arguments are converted and the target is the method's owner.
                    unsafe { method.call(Some(target), &mut slot, converted.as_slice()) };
                }
                return Self::take_result(result, self, name);
            }
        }

        if registry.options().log_invoke_misses {
            debug!(
                target: "reflect::invoke",
                ty = self.name(),
                method = name,
                args = arguments.len(),
                "no matching method"
            );
        }
        Err(ReflectError::NoMatchingMethod {
            ty: self.name.to_string(),
            name: name.to_string(),
        })
    }

    /// Like [`StructureDescriptor::try_invoke`], but a miss yields `R::default()`.
    pub fn invoke<R, A>(&self, instance: InstanceMut<'_>, name: &str, args: &A) -> R
    where
        R: Reflect + Default,
        A: ArgumentList + ?Sized,
    {
        self.try_invoke(instance, name, args).unwrap_or_default()
    }

    /// Builds a new instance through the first constructor accepting `args`.
    ///
    /// Constructors return `Box<T>`, so `R` is normally `Box<Self's type>`.
    pub fn try_invoke_constructor<R, A>(&self, registry: &TypeRegistry, args: &A) -> ReflectResult<R>
    where
        R: Reflect,
        A: ArgumentList + ?Sized,
    {
        let requested = registry.get::<R>();
        let unit = registry.get::<()>();
        let arguments = args.arguments(registry);

        for (level, _) in self.lineage() {
            for constructor in &level.constructors {
                let Some(conversions) = constructor.accepts(requested, unit, &arguments) else {
                    continue;
                };
                let mut result: Option<R> = None;
                let mut scratch = SmallVec::new();
                // SAFETY: conversions were matched against this constructor's parameters.
                let converted = unsafe {
                    ConvertedArguments::new(
                        constructor.params(),
                        &arguments,
                        &conversions,
                        &mut scratch,
                    )
                };
                {
                    let mut slot = ReturnSlot::new(registry, &mut result);
                    // SAFETY: arguments are converted; constructors take no instance.
                    unsafe { constructor.call(None, &mut slot, converted.as_slice()) };
                }
                return Self::take_result(result, self, constructor.name());
            }
        }

        if registry.options().log_invoke_misses {
            debug!(
                target: "reflect::invoke",
                ty = self.name(),
                args = arguments.len(),
                "no matching constructor"
            );
        }
        Err(ReflectError::NoMatchingConstructor {
            ty: self.name.to_string(),
        })
    }

    pub fn invoke_constructor<R, A>(&self, registry: &TypeRegistry, args: &A) -> Option<R>
    where
        R: Reflect,
        A: ArgumentList + ?Sized,
    {
        self.try_invoke_constructor(registry, args).ok()
    }

    fn take_result<R: Reflect>(mut result: Option<R>, structure: &Self, name: &str) -> ReflectResult<R> {
        // a unit request leaves the slot empty when the method returned something else
        if result.is_none() {
            if let Some(unit) = (&mut result as &mut dyn Any).downcast_mut::<Option<()>>() {
                *unit = Some(());
            }
        }
        result.ok_or_else(|| ReflectError::NoMatchingMethod {
            ty: structure.name.to_string(),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Debug for StructureDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructureDescriptor")
            .field("name", &self.name)
            .field("parent", &self.parent().map(|link| link.ty))
            .field("properties", &self.properties.len())
            .field("methods", &self.methods.len())
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

pub struct Lineage<'s> {
    next: Option<(&'s StructureDescriptor, usize)>,
}

impl<'s> Iterator for Lineage<'s> {
    type Item = (&'s StructureDescriptor, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (current, offset) = self.next.take()?;
        self.next = current.parent().and_then(|link| {
            link.ty
                .descriptor()
                .structure()
                .map(|parent| (parent, offset + link.offset))
        });
        Some((current, offset))
    }
}

/// A property found by path, with the offset of its owner inside the root instance.
#[derive(Clone, Copy, Debug)]
pub struct FieldRef<'s> {
    /// Class the path was resolved from.
    pub root: Type,
    pub property: &'s PropertyDescriptor,
    pub owner_offset: usize,
}

impl FieldRef<'_> {
    /// Owner type and its offset inside an instance of `ty`.
    fn locate(&self, ty: Type) -> ReflectResult<(Type, usize)> {
        let base = ty.instance_offset(self.root)?;
        let owner = self.property.owner().unwrap_or(self.root);
        Ok((owner, base + self.owner_offset))
    }

    pub fn value<'a, F: Reflect>(&self, root: Instance<'a>) -> ReflectResult<&'a F> {
        let (owner, offset) = self.locate(root.ty())?;
        // SAFETY: `owner_offset` was accumulated from the root's own structure.
        let view = unsafe { root.field(offset, owner) };
        self.property.value::<F>(view)
    }

    pub fn set<F: Reflect>(&self, root: InstanceMut<'_>, value: F) -> ReflectResult<()> {
        let (owner, offset) = self.locate(root.ty())?;
        // SAFETY: see `FieldRef::value`.
        let view = unsafe { root.field(offset, owner) };
        self.property.set(view, value)
    }
}
