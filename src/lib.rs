//! `reflectrs` describes Rust types at runtime.
//!
//! Types are registered once into a [`TypeRegistry`], which hands out canonical
//! [`Type`] handles. Classes add a [`StructureDescriptor`] listing their properties,
//! methods and constructors, which can then be visited, dumped, walked and invoked on
//! live instances without knowing the concrete type at compile time.
//!
//! ```
//! use reflectrs::{Instance, InstanceMut, TypeRegistry, field, reflect_struct};
//!
//! #[derive(Default)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! reflect_struct!(Point);
//!
//! let registry = TypeRegistry::new();
//! registry
//!     .class::<Point>()
//!     .property("x", field!(Point, x))
//!     .property("y", field!(Point, y))
//!     .method("shift", |point: &mut Point, by: i32| {
//!         point.x += by;
//!         point.x
//!     })
//!     .finish()
//!     .unwrap();
//! registry.finalize().unwrap();
//!
//! let mut point = Point { x: 1, y: 2 };
//! let structure = registry.get::<Point>().require_structure().unwrap();
//! let moved: i32 = structure.invoke(InstanceMut::new(&registry, &mut point), "shift", &(3i32,));
//! assert_eq!(moved, 4);
//! let y = structure.find_property("y").unwrap();
//! assert_eq!(y.value::<i32>(Instance::new(&registry, &point)), Ok(&2));
//! ```

pub mod reflect;

pub use reflect::*;
