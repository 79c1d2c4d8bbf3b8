// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Query engine: a dynamic, mask-only path for exploratory or tooling code,
//! and a typed path (`World::query::<(C1, .., Cn)>()`) yielding
//! `(Entity, &mut C1, .., &mut Cn)` for the common "iterate all entities
//! with these components" case.
//!
//! Both paths are single-threaded: an iterator borrows `World` exclusively
//! for its own lifetime, so there is no concurrent mutation to detect by
//! construction. Parallel query execution is an explicit non-goal.

use smallvec::SmallVec;

use crate::bitmask::BitMask;
use crate::chunk::Chunk;
use crate::component::Component;
use crate::entity::Entity;
use crate::schema::{ArrayIndex, ComponentIndex, Schema};
use crate::world::World;

/// Maximum number of components a single typed query may request at once.
pub const MAX_QUERY_COMPONENTS: usize = 8;

/// Mask-level filter over a Chunk's component mask and tag mask, plus a
/// per-entity array-ownership requirement, for the dynamic query path.
/// `required_*` bits must all be set; `excluded_*` bits must all be clear.
///
/// Arrays live on the [`crate::entity::EntitySlot`], not the Chunk (they do
/// not affect the archetype), so `required_arrays` cannot be checked from
/// the chunk mask alone -- [`entities_matching`] re-validates it per
/// candidate entity against the slot table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    pub required_components: BitMask,
    pub required_tags: BitMask,
    pub required_arrays: BitMask,
    pub excluded_components: BitMask,
    pub excluded_tags: BitMask,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_component(mut self, index: ComponentIndex) -> Self {
        self.required_components.set(index.0 as usize);
        self
    }

    pub fn exclude_component(mut self, index: ComponentIndex) -> Self {
        self.excluded_components.set(index.0 as usize);
        self
    }

    pub fn require_tag(mut self, index: crate::schema::TagIndex) -> Self {
        self.required_tags.set(index.0 as usize);
        self
    }

    pub fn exclude_tag(mut self, index: crate::schema::TagIndex) -> Self {
        self.excluded_tags.set(index.0 as usize);
        self
    }

    /// Restrict matches to entities that currently own an array at `index`
    /// (checked per-entity against the slot table, not the chunk mask).
    pub fn require_array(mut self, index: ArrayIndex) -> Self {
        self.required_arrays.set(index.0 as usize);
        self
    }

    fn matches(&self, mask: &BitMask, tags: &BitMask) -> bool {
        mask.contains_all(&self.required_components)
            && tags.contains_all(&self.required_tags)
            && !mask.intersects(&self.excluded_components)
            && !tags.intersects(&self.excluded_tags)
    }
}

/// `true` if `entity`'s slot has a populated array at every index set in
/// `required`. An entity with no slot (shouldn't happen for entities drawn
/// from `world.chunks()`) conservatively fails the check.
fn has_required_arrays(world: &World, entity: Entity, required: &BitMask) -> bool {
    if required.popcount() == 0 {
        return true;
    }
    let Ok(slot) = world.slot(entity) else {
        return false;
    };
    required
        .iter_set_indices()
        .all(|idx| slot.arrays.get(idx).map(|blob| blob.is_some()).unwrap_or(false))
}

/// Entities in every Chunk matching `filter`'s component/tag masks and, for
/// any bit set in `required_arrays`, owning that array. Row order within a
/// chunk is not stable across structural mutation (swap-removal), so callers
/// that need a stable iteration order must not mutate between calls.
pub fn entities_matching(world: &World, filter: &QueryFilter) -> Vec<Entity> {
    let mut out = Vec::new();
    for chunk in world.chunks() {
        if !filter.matches(chunk.mask(), chunk.tags()) {
            continue;
        }
        for &entity in chunk.entities() {
            if has_required_arrays(world, entity, &filter.required_arrays) {
                out.push(entity);
            }
        }
    }
    out
}

/// Backs `World::query::<(C1, .., Cn)>()`: resolves a tuple of component
/// types to their Schema indices and fetches `&mut` references to them out
/// of a Chunk row.
///
/// Known asymmetry: this path filters on component mask only. It has no
/// way to require or exclude a tag, so `query::<Position>()` visits tagged
/// and untagged entities alike -- there is no typed escape hatch to exclude
/// a tag. Use the dynamic [`QueryFilter`]/[`entities_matching`] path when a
/// query needs to be tag-aware.
pub trait QueryFetch: 'static {
    type ItemMut<'a>;

    /// BitMask naming every component this query requires.
    fn mask(schema: &Schema) -> BitMask;

    /// Schema indices for each component, in tuple order. `None` if any
    /// component in the tuple has never been registered (nothing can match).
    fn indices(schema: &Schema) -> Option<SmallVec<[ComponentIndex; MAX_QUERY_COMPONENTS]>>;

    /// Fetch this tuple's components from `row` of `chunk`.
    ///
    /// # Safety
    /// Caller must ensure `indices` are exactly the values `Self::indices`
    /// returned for the Schema `chunk` was built against, that
    /// `row < chunk.len()`, and must not call this twice for the same
    /// `(chunk, row)` while either result is still live (no aliased `&mut`).
    unsafe fn fetch_mut<'a>(chunk: &'a Chunk, row: usize, indices: &[ComponentIndex]) -> Self::ItemMut<'a>;
}

macro_rules! impl_query_fetch {
    ($($T:ident => $idx:tt),+) => {
        impl<$($T: Component),+> QueryFetch for ($($T,)+) {
            type ItemMut<'a> = ($(&'a mut $T,)+);

            fn mask(schema: &Schema) -> BitMask {
                let mut m = BitMask::new();
                $(
                    if let Some(idx) = schema.component_index::<$T>() {
                        m.set(idx.0 as usize);
                    }
                )+
                m
            }

            fn indices(schema: &Schema) -> Option<SmallVec<[ComponentIndex; MAX_QUERY_COMPONENTS]>> {
                let mut out = SmallVec::new();
                $(
                    out.push(schema.component_index::<$T>()?);
                )+
                let _ = ($($idx,)+);
                Some(out)
            }

            #[allow(non_snake_case)]
            unsafe fn fetch_mut<'a>(chunk: &'a Chunk, row: usize, indices: &[ComponentIndex]) -> Self::ItemMut<'a> {
                $(
                    let ptr = chunk
                        .component_ptr_mut::<$T>(indices[$idx])
                        .expect("component present by mask filtering");
                    let $T = &mut *ptr.add(row);
                )+
                ($($T,)+)
            }
        }
    };
}

impl_query_fetch!(A => 0);
impl_query_fetch!(A => 0, B => 1);
impl_query_fetch!(A => 0, B => 1, C => 2);
impl_query_fetch!(A => 0, B => 1, C => 2, D => 3);
impl_query_fetch!(A => 0, B => 1, C => 2, D => 3, E => 4);
impl_query_fetch!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_query_fetch!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_query_fetch!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);

/// Iterator over every `(Entity, Q::ItemMut)` across every Chunk whose mask
/// contains `Q`'s components and excludes `excluded`. Built once up front
/// from the chunk list at the moment the query starts; it borrows `World`
/// exclusively for its own lifetime, so nothing else can mutate in between.
///
/// Tag- and array-blind: unlike the dynamic [`QueryFilter`] path, this
/// iterator has no way to require/exclude a tag or require an array, so it
/// yields every entity whose component mask matches, tagged or not.
pub struct QueryIter<'w, Q: QueryFetch> {
    chunks: std::vec::IntoIter<&'w Chunk>,
    indices: SmallVec<[ComponentIndex; MAX_QUERY_COMPONENTS]>,
    current: Option<(&'w Chunk, usize)>,
    row: usize,
    _marker: std::marker::PhantomData<Q>,
}

impl<'w, Q: QueryFetch> QueryIter<'w, Q> {
    pub(crate) fn new(world: &'w World, excluded: BitMask) -> Self {
        let schema = world.schema();
        let required = Q::mask(schema);
        let indices = Q::indices(schema).unwrap_or_default();
        let chunks: Vec<&Chunk> = if indices.is_empty() {
            Vec::new()
        } else {
            world
                .chunks()
                .filter(|c| c.mask().contains_all(&required) && !c.mask().intersects(&excluded))
                .collect()
        };
        Self {
            chunks: chunks.into_iter(),
            indices,
            current: None,
            row: 0,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<'w, Q: QueryFetch> Iterator for QueryIter<'w, Q> {
    type Item = (Entity, Q::ItemMut<'w>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                let chunk = self.chunks.next()?;
                self.current = Some((chunk, chunk.len()));
                self.row = 0;
            }
            let (chunk, len) = self.current.unwrap();
            if self.row >= len {
                self.current = None;
                continue;
            }
            let row = self.row;
            self.row += 1;
            let entity = chunk.entities()[row];
            let item = unsafe { Q::fetch_mut(chunk, row, &self.indices) };
            return Some((entity, item));
        }
    }
}
