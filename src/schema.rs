//! Schema: registry assigning dense indices and byte-sizes to registered
//! component, array-element, and tag types.
//!
//! Populated once, before any [`crate::world::World`] creates entities;
//! growing the Schema afterwards is permitted and never invalidates
//! existing archetype masks, since a mask only ever names indices that
//! already existed when it was built.

use std::any::TypeId;

use rustc_hash::FxHashMap;

use crate::bitmask::{BitMask, CAPACITY};
use crate::error::{EcsError, Result};

/// The three kinds of registrable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Component,
    Array,
    Tag,
}

/// A dense index within one kind (component / array / tag). Distinct kinds
/// use disjoint index spaces — a component index `3` and an array index
/// `3` name unrelated registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentIndex(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrayIndex(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagIndex(pub u16);

#[derive(Debug, Clone, Copy)]
struct TypeEntry {
    index: u16,
    size: usize,
}

/// Registry mapping component/array/tag type identities to small dense
/// integer indices and their byte sizes. Immutable in practice once a
/// [`crate::world::World`] is using it, but growable.
#[derive(Debug, Default)]
pub struct Schema {
    components: FxHashMap<TypeId, TypeEntry>,
    component_order: Vec<(TypeId, usize)>,
    arrays: FxHashMap<TypeId, TypeEntry>,
    array_order: Vec<(TypeId, usize)>,
    tags: FxHashMap<TypeId, TypeEntry>,
    tag_order: Vec<TypeId>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plain-old-data component type, idempotently. Returns the
    /// same index on repeated calls for the same `T`.
    pub fn register_component<T: 'static>(&mut self) -> Result<ComponentIndex> {
        if let Some(entry) = self.components.get(&TypeId::of::<T>()) {
            return Ok(ComponentIndex(entry.index));
        }
        if self.components.len() >= CAPACITY {
            return Err(EcsError::SchemaFull);
        }
        let index = self.components.len() as u16;
        let size = std::mem::size_of::<T>();
        self.components
            .insert(TypeId::of::<T>(), TypeEntry { index, size });
        self.component_order.push((TypeId::of::<T>(), size));
        Ok(ComponentIndex(index))
    }

    /// Register an array-element type, idempotently.
    pub fn register_array<T: 'static>(&mut self) -> Result<ArrayIndex> {
        if let Some(entry) = self.arrays.get(&TypeId::of::<T>()) {
            return Ok(ArrayIndex(entry.index));
        }
        if self.arrays.len() >= CAPACITY {
            return Err(EcsError::SchemaFull);
        }
        let index = self.arrays.len() as u16;
        let size = std::mem::size_of::<T>();
        self.arrays
            .insert(TypeId::of::<T>(), TypeEntry { index, size });
        self.array_order.push((TypeId::of::<T>(), size));
        Ok(ArrayIndex(index))
    }

    /// Register a zero-size tag type, idempotently.
    pub fn register_tag<T: 'static>(&mut self) -> Result<TagIndex> {
        if let Some(entry) = self.tags.get(&TypeId::of::<T>()) {
            return Ok(TagIndex(entry.index));
        }
        if self.tags.len() >= CAPACITY {
            return Err(EcsError::SchemaFull);
        }
        let index = self.tags.len() as u16;
        self.tags
            .insert(TypeId::of::<T>(), TypeEntry { index, size: 0 });
        self.tag_order.push(TypeId::of::<T>());
        Ok(TagIndex(index))
    }

    pub fn component_index<T: 'static>(&self) -> Option<ComponentIndex> {
        self.components
            .get(&TypeId::of::<T>())
            .map(|e| ComponentIndex(e.index))
    }

    pub fn array_index<T: 'static>(&self) -> Option<ArrayIndex> {
        self.arrays
            .get(&TypeId::of::<T>())
            .map(|e| ArrayIndex(e.index))
    }

    pub fn tag_index<T: 'static>(&self) -> Option<TagIndex> {
        self.tags.get(&TypeId::of::<T>()).map(|e| TagIndex(e.index))
    }

    /// Byte size of a registered component.
    pub fn size_of(&self, index: ComponentIndex) -> usize {
        self.component_order
            .get(index.0 as usize)
            .map(|(_, size)| *size)
            .unwrap_or(0)
    }

    /// Byte size of a single element of a registered array type.
    pub fn size_of_array(&self, index: ArrayIndex) -> usize {
        self.array_order
            .get(index.0 as usize)
            .map(|(_, size)| *size)
            .unwrap_or(0)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn array_count(&self) -> usize {
        self.arrays.len()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Which kind `T` was registered under, if any.
    pub fn kind_of<T: 'static>(&self) -> Option<TypeKind> {
        let id = TypeId::of::<T>();
        if self.components.contains_key(&id) {
            Some(TypeKind::Component)
        } else if self.arrays.contains_key(&id) {
            Some(TypeKind::Array)
        } else if self.tags.contains_key(&id) {
            Some(TypeKind::Tag)
        } else {
            None
        }
    }

    /// Build a [`BitMask`] naming exactly the component indices of `T1..Tn`.
    /// Callers register the types beforehand; an unregistered type
    /// contributes nothing (the mask silently omits it rather than
    /// panicking, matching the value-type nature of `BitMask`).
    pub fn mask_of<T: ComponentList>(&self) -> BitMask {
        T::mask(self)
    }
}

/// Helper trait implemented for tuples of component types, backing
/// [`Schema::mask_of`].
pub trait ComponentList {
    fn mask(schema: &Schema) -> BitMask;
}

macro_rules! impl_component_list {
    ($($T:ident),*) => {
        impl<$($T: 'static),*> ComponentList for ($($T,)*) {
            #[allow(non_snake_case)]
            fn mask(schema: &Schema) -> BitMask {
                let mut m = BitMask::new();
                $(
                    if let Some(idx) = schema.component_index::<$T>() {
                        m.set(idx.0 as usize);
                    }
                )*
                m
            }
        }
    };
}

impl_component_list!(A);
impl_component_list!(A, B);
impl_component_list!(A, B, C);
impl_component_list!(A, B, C, D);
impl_component_list!(A, B, C, D, E);
impl_component_list!(A, B, C, D, E, F);
impl_component_list!(A, B, C, D, E, F, G);
impl_component_list!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent() {
        let mut s = Schema::new();
        let a = s.register_component::<u32>().unwrap();
        let b = s.register_component::<u32>().unwrap();
        assert_eq!(a, b);
        assert_eq!(s.component_count(), 1);
    }

    #[test]
    fn kinds_have_disjoint_index_spaces() {
        let mut s = Schema::new();
        let c = s.register_component::<u32>().unwrap();
        let a = s.register_array::<u32>().unwrap();
        assert_eq!(c.0, 0);
        assert_eq!(a.0, 0);
    }

    #[test]
    fn mask_of_builds_from_tuple() {
        struct Position;
        struct Velocity;
        let mut s = Schema::new();
        s.register_component::<Position>().unwrap();
        s.register_component::<Velocity>().unwrap();
        let mask = s.mask_of::<(Position, Velocity)>();
        assert_eq!(mask.popcount(), 2);
    }

    #[test]
    fn schema_full_on_capacity_exhaustion() {
        // `Tag<N>` is a distinct zero-sized type per const parameter, so
        // this macro drives 256 real `register_tag` calls against 256
        // real, compile-time-distinct `TypeId`s.
        struct Tag<const N: u16>;

        macro_rules! register_all {
            ($schema:expr, $($n:literal),* $(,)?) => {
                $( $schema.register_tag::<Tag<$n>>().unwrap(); )*
            };
        }

        let mut s = Schema::new();
        register_all!(
            s, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22,
            23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43,
            44, 45, 46, 47, 48, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63, 64,
            65, 66, 67, 68, 69, 70, 71, 72, 73, 74, 75, 76, 77, 78, 79, 80, 81, 82, 83, 84, 85,
            86, 87, 88, 89, 90, 91, 92, 93, 94, 95, 96, 97, 98, 99, 100, 101, 102, 103, 104, 105,
            106, 107, 108, 109, 110, 111, 112, 113, 114, 115, 116, 117, 118, 119, 120, 121, 122,
            123, 124, 125, 126, 127, 128, 129, 130, 131, 132, 133, 134, 135, 136, 137, 138, 139,
            140, 141, 142, 143, 144, 145, 146, 147, 148, 149, 150, 151, 152, 153, 154, 155, 156,
            157, 158, 159, 160, 161, 162, 163, 164, 165, 166, 167, 168, 169, 170, 171, 172, 173,
            174, 175, 176, 177, 178, 179, 180, 181, 182, 183, 184, 185, 186, 187, 188, 189, 190,
            191, 192, 193, 194, 195, 196, 197, 198, 199, 200, 201, 202, 203, 204, 205, 206, 207,
            208, 209, 210, 211, 212, 213, 214, 215, 216, 217, 218, 219, 220, 221, 222, 223, 224,
            225, 226, 227, 228, 229, 230, 231, 232, 233, 234, 235, 236, 237, 238, 239, 240, 241,
            242, 243, 244, 245, 246, 247, 248, 249, 250, 251, 252, 253, 254, 255,
        );
        assert_eq!(s.tag_count(), CAPACITY);

        struct OneMoreTag;
        assert!(matches!(
            s.register_tag::<OneMoreTag>(),
            Err(EcsError::SchemaFull)
        ));
    }
}
