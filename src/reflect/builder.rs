//! Fluent registration builders that seal structures and enum tables into the registry.

use std::marker::PhantomData;

use tracing::debug;

use super::descriptor::{Factory, Type};
use super::enumeration::{EnumTable, EnumVariant, ReflectEnum};
use super::error::{ReflectError, ReflectResult};
use super::instance::Instance;
use super::method::{ConstructorFn, MethodDescriptor, MethodFn};
use super::property::{NumericAccessor, PropertyDescriptor};
use super::reflect::Reflect;
use super::registry::TypeRegistry;
use super::scalar::Numeric;
use super::structure::{ReflectClass, StructureDescriptor};

/// Typed byte offset of a field of type `F` inside `Owner`; built by [`field!`](crate::field).
pub struct Field<Owner, F> {
    offset: usize,
    _marker: PhantomData<fn(&Owner) -> &F>,
}

impl<Owner, F> Field<Owner, F> {
    /// `_witness` only pins the field type for inference.
    ///
    /// # Safety
    /// A value of type `F` must live at `offset` bytes into every `Owner`.
    pub unsafe fn new(offset: usize, _witness: fn(&Owner) -> &F) -> Self {
        Self {
            offset,
            _marker: PhantomData,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Collects properties, methods and constructors for `T`, then seals them with `finish`.
///
/// The first failed step is remembered and reported by `finish`; later steps still run so
/// the chain reads top to bottom.
pub struct ClassBuilder<'r, T> {
    registry: &'r TypeRegistry,
    owner: Type,
    structure: StructureDescriptor,
    factory: Option<Factory>,
    error: Option<ReflectError>,
    _marker: PhantomData<fn() -> T>,
}

impl<'r, T: ReflectClass> ClassBuilder<'r, T> {
    pub(crate) fn new(registry: &'r TypeRegistry) -> Self {
        let owner = registry.get::<T>();
        let parent = T::parent(registry);
        Self {
            registry,
            owner,
            structure: StructureDescriptor::new(owner, parent),
            factory: None,
            error: None,
            _marker: PhantomData,
        }
    }

    fn push_property(&mut self, property: ReflectResult<PropertyDescriptor>) {
        match property {
            Ok(property) => self.structure.push_property(property),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
    }

    pub fn property<F: Reflect>(mut self, name: &str, field: Field<T, F>) -> Self {
        let ty = self.registry.get::<F>();
        let property = PropertyDescriptor::classify(name, field.offset(), ty, Some(self.owner));
        self.push_property(property);
        self
    }

    /// A computed numeric property read through `getter` instead of an offset.
    pub fn accessor<N, G>(mut self, name: &str, getter: G) -> Self
    where
        N: Numeric,
        G: Fn(&T) -> N + Send + Sync + 'static,
    {
        let accessor: NumericAccessor = Box::new(move |instance: Instance<'_>| {
            let Some(target) = instance.downcast_ref::<T>() else {
                panic!("accessor called on `{}`", instance.ty());
            };
            getter(target).into_value()
        });
        let ty = self.registry.get::<N>();
        let property = PropertyDescriptor::computed(name, ty, self.owner, accessor);
        self.push_property(property);
        self
    }

    pub fn method<M, F>(mut self, name: &str, callable: F) -> Self
    where
        M: 'static,
        F: MethodFn<T, M>,
    {
        let method = MethodDescriptor::method::<T, M, F>(self.registry, name, callable);
        self.structure.push_method(method);
        self
    }

    pub fn constructor<M, F>(mut self, callable: F) -> Self
    where
        M: 'static,
        F: ConstructorFn<T, M>,
    {
        let constructor = MethodDescriptor::constructor::<T, M, F>(self.registry, callable);
        self.structure.push_constructor(constructor);
        self
    }

    /// Lets containers and tooling default-construct `T`.
    pub fn default_factory(mut self) -> Self
    where
        T: Default,
    {
        self.factory = Some(Factory::of::<T>());
        self
    }

    /// Seals the structure into `T`'s descriptor.
    pub fn finish(self) -> ReflectResult<Type> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let properties = self.structure.properties().len();
        let methods = self.structure.methods().len();
        self.owner.seal_structure(self.structure)?;
        if let Some(factory) = self.factory {
            self.owner.install_factory(factory);
        }
        debug!(
            target: "reflect::registry",
            ty = self.owner.name(),
            properties,
            methods,
            "sealed structure"
        );
        Ok(self.owner)
    }
}

pub struct EnumBuilder<'r, E> {
    ty: Type,
    table: EnumTable,
    _marker: PhantomData<(&'r TypeRegistry, fn() -> E)>,
}

impl<'r, E: ReflectEnum> EnumBuilder<'r, E> {
    pub(crate) fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            ty: registry.get::<E>(),
            table: EnumTable::new(),
            _marker: PhantomData,
        }
    }

    pub fn value(mut self, value: E, label: &str) -> Self {
        self.table.push_variant(EnumVariant {
            label: label.into(),
            value: value.to_raw(),
        });
        self
    }

    pub fn finish(self) -> ReflectResult<Type> {
        let variants = self.table.variants().len();
        self.ty.attach_enum_table(self.table)?;
        debug!(target: "reflect::registry", ty = self.ty.name(), variants, "registered enum");
        Ok(self.ty)
    }
}
