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

//! World: entity-slot table, the archetype-mask -> Chunk map, and the
//! public lifecycle, archetype-transition, array, hierarchy, reference and
//! query operations that compose around them.

use ahash::AHashMap;
#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::bitmask::BitMask;
use crate::chunk::{self, Chunk};
use crate::component::{Bundle, Component};
use crate::entity::{ArrayBlob, Entity, EntitySlot, SlotState};
use crate::error::{EcsError, Result};
use crate::event::Message;
use crate::event_bus::EventBus;
use crate::query::{QueryFetch, QueryIter};
use crate::schema::{ArrayIndex, Schema};

/// Central ECS store. Owns every Chunk and every EntitySlot; a Schema is
/// typically shared across one or more Worlds but this one holds its own
/// to keep the crate's public surface self-contained.
pub struct World {
    schema: Schema,
    slots: Vec<EntitySlot>,
    free_list: Vec<u32>,
    chunks: AHashMap<u64, Chunk>,
    events: EventBus,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self::with_schema(Schema::new())
    }

    /// Build a World against an already-populated Schema, e.g. one shared
    /// with other Worlds on the same thread.
    pub fn with_schema(schema: Schema) -> Self {
        let mut world = Self {
            schema,
            slots: Vec::new(),
            free_list: Vec::new(),
            chunks: AHashMap::default(),
            events: EventBus::new(),
        };
        // Bootstrap the no-components, no-tags archetype so entities with
        // nothing attached always have somewhere to live.
        world.ensure_chunk(BitMask::new(), BitMask::new());
        world
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn entity_count(&self) -> usize {
        self.slots.iter().filter(|s| s.state().is_live()).count()
    }

    pub(crate) fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Per-Chunk archetype summary: `(archetype key, component mask, tag
    /// mask, entities in the chunk, entity ids in the chunk)`. For tests
    /// and debug tooling; not part of the steady-state hot path.
    pub fn chunk_summary(&self) -> Vec<(u64, BitMask, BitMask, Vec<Entity>)> {
        self.chunks
            .values()
            .map(|c| (c.archetype_key(), *c.mask(), *c.tags(), c.entities().to_vec()))
            .collect()
    }

    fn ensure_chunk(&mut self, mask: BitMask, tags: BitMask) -> u64 {
        let key = chunk::archetype_key(&mask, &tags);
        if !self.chunks.contains_key(&key) {
            let chunk = Chunk::with_tags(mask, tags, &self.schema);
            self.chunks.insert(key, chunk);
        }
        key
    }

    fn check_live(&self, entity: Entity) -> Result<usize> {
        let idx = entity
            .slot_index()
            .ok_or(EcsError::UnknownEntity(entity))?;
        let slot = self.slots.get(idx).ok_or(EcsError::UnknownEntity(entity))?;
        if slot.entity() != entity || !slot.state().is_live() {
            return Err(EcsError::UnknownEntity(entity));
        }
        Ok(idx)
    }

    pub fn is_live(&self, entity: Entity) -> bool {
        self.check_live(entity).is_ok()
    }

    pub fn slot(&self, entity: Entity) -> Result<&EntitySlot> {
        let idx = self.check_live(entity)?;
        Ok(&self.slots[idx])
    }

    /// The id `create` would hand out next: the head of the free list, or
    /// one past the current high-water mark.
    pub fn next_entity(&self) -> Entity {
        if let Some(&idx) = self.free_list.last() {
            Entity::new(idx, self.slots[idx as usize].generation)
        } else {
            Entity::new(self.slots.len() as u32, 0)
        }
    }

    fn allocate_slot(&mut self) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(EntitySlot::vacant(0));
            idx
        }
    }

    fn write_created_slot(&mut self, slot_idx: u32, mask: BitMask, tags: BitMask, key: u64) -> Entity {
        let generation = self.slots[slot_idx as usize].generation;
        let entity = Entity::new(slot_idx, generation);
        let slot = &mut self.slots[slot_idx as usize];
        slot.entity = entity;
        slot.state = SlotState::Enabled;
        slot.own_enabled = true;
        slot.parent = Entity::NONE;
        slot.components_key = key;
        slot.mask = mask;
        slot.tags = tags;

        self.chunks
            .get_mut(&key)
            .expect("chunk for a freshly ensured key must exist")
            .add(entity);

        #[cfg(feature = "tracing")]
        trace!(entity = entity.index(), "entity created");

        self.events.publish(Message::EntityCreated { entity });
        entity
    }

    /// Create an entity whose archetype is exactly `mask` (no tags).
    pub fn create(&mut self, mask: BitMask) -> Entity {
        self.create_with_tags(mask, BitMask::new())
    }

    /// Create an entity whose archetype is `mask` components plus `tags`.
    pub fn create_with_tags(&mut self, mask: BitMask, tags: BitMask) -> Entity {
        let key = self.ensure_chunk(mask, tags);
        let slot_idx = self.allocate_slot();
        self.write_created_slot(slot_idx, mask, tags, key)
    }

    /// Create at a caller-chosen slot index (e.g. deterministic replay),
    /// backfilling any gap between the current high-water mark and
    /// `target_index` with vacant, already-destroyed placeholder slots.
    pub fn create_at(&mut self, target_index: u32, mask: BitMask, tags: BitMask) -> Entity {
        while self.slots.len() <= target_index as usize {
            let idx = self.slots.len() as u32;
            self.slots.push(EntitySlot::vacant(0));
            self.free_list.push(idx);
        }
        self.free_list.retain(|&i| i != target_index);
        let key = self.ensure_chunk(mask, tags);
        self.write_created_slot(target_index, mask, tags, key)
    }

    /// Register and write every component of `bundle` onto a freshly
    /// created entity in one call.
    pub fn create_with<B: Bundle>(&mut self, bundle: B) -> Result<Entity> {
        let indices = B::register(&mut self.schema)?;
        let mut mask = BitMask::new();
        for idx in &indices {
            mask.set(idx.0 as usize);
        }
        let entity = self.create(mask);
        let idx = entity.slot_index().expect("just created");
        let key = self.slots[idx].components_key;
        let row = {
            let chunk = self.chunks.get(&key).expect("chunk just populated");
            chunk
                .entities()
                .iter()
                .position(|&e| e == entity)
                .expect("entity just added to this chunk")
        };
        let chunk = self.chunks.get_mut(&key).expect("chunk just populated");
        unsafe {
            bundle.write(chunk, row, &indices);
        }
        Ok(entity)
    }

    /// Destroy a live entity. If `destroy_children`, every descendant is
    /// destroyed first (depth-first); otherwise each direct child's parent
    /// is reset to [`Entity::NONE`].
    pub fn destroy(&mut self, entity: Entity, destroy_children: bool) -> Result<()> {
        let idx = self.check_live(entity)?;
        let parent = self.slots[idx].parent;
        let children = self.slots[idx].children.clone();

        if destroy_children {
            for child in children {
                if self.is_live(child) {
                    let _ = self.destroy(child, true);
                }
            }
        } else {
            for child in &children {
                if let Some(cidx) = child.slot_index() {
                    if self.slots[cidx].entity() == *child {
                        self.slots[cidx].parent = Entity::NONE;
                    }
                }
            }
            for child in &children {
                self.recompute_subtree(*child);
            }
        }

        if !parent.is_none() {
            if let Some(pidx) = parent.slot_index() {
                if self.slots[pidx].entity() == parent {
                    self.slots[pidx].children.retain(|&c| c != entity);
                }
            }
        }

        let key = self.slots[idx].components_key;
        if let Some(chunk) = self.chunks.get_mut(&key) {
            chunk.remove(entity)?;
        }

        self.slots[idx].clear_for_destroy();
        self.free_list.push(idx as u32);

        #[cfg(feature = "tracing")]
        debug!(entity = entity.index(), "entity destroyed");

        self.events.publish(Message::EntityDestroyed { entity, parent });
        Ok(())
    }

    fn row_of(&self, chunk: &Chunk, entity: Entity) -> Result<usize> {
        chunk
            .entities()
            .iter()
            .position(|&e| e == entity)
            .ok_or(EcsError::UnknownEntity(entity))
    }

    /// Pull both chunks for `old_key`/`new_key` out of the map so both can
    /// be mutably borrowed at once, run `f`, then put them back. Mirrors
    /// the teacher's split-borrow trick for two archetypes, adapted to a
    /// hash map rather than a `Vec` of archetypes.
    fn with_two_chunks<R>(
        &mut self,
        old_key: u64,
        new_key: u64,
        f: impl FnOnce(&mut Chunk, &mut Chunk) -> R,
    ) -> R {
        let mut src = self
            .chunks
            .remove(&old_key)
            .expect("source chunk for a live entity must exist");
        let mut dst = self
            .chunks
            .remove(&new_key)
            .expect("destination chunk must have been ensured before the move");
        let result = f(&mut src, &mut dst);
        self.chunks.insert(old_key, src);
        self.chunks.insert(new_key, dst);
        result
    }

    /// Register `T` if needed, then move `entity` into the archetype with
    /// `T` added and write `value` into the new row.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<()> {
        let idx = self.check_live(entity)?;
        let comp_idx = self.schema.register_component::<T>()?;
        let old_mask = self.slots[idx].mask;
        if old_mask.contains(comp_idx.0 as usize) {
            return Err(EcsError::ComponentAlreadyPresent);
        }
        let mut new_mask = old_mask;
        new_mask.set(comp_idx.0 as usize);
        let tags = self.slots[idx].tags;

        let old_key = self.slots[idx].components_key;
        let new_key = self.ensure_chunk(new_mask, tags);
        let new_row = if old_key == new_key {
            self.row_of(self.chunks.get(&old_key).unwrap(), entity)?
        } else {
            let (row, _) =
                self.with_two_chunks(old_key, new_key, |src, dst| src.move_entity(entity, dst))?;
            row
        };

        self.slots[idx].mask = new_mask;
        self.slots[idx].components_key = new_key;

        unsafe {
            let chunk = self.chunks.get_mut(&new_key).expect("destination chunk exists");
            *chunk.component_mut::<T>(new_row, comp_idx)? = value;
        }

        #[cfg(feature = "tracing")]
        trace!(entity = entity.index(), "component added, archetype transition");

        Ok(())
    }

    /// Move `entity` into the archetype with `T` removed, dropping its
    /// value, and publish `ComponentRemoved`.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<()> {
        let idx = self.check_live(entity)?;
        let comp_idx = self
            .schema
            .component_index::<T>()
            .ok_or(EcsError::ComponentMissing)?;
        let old_mask = self.slots[idx].mask;
        if !old_mask.contains(comp_idx.0 as usize) {
            return Err(EcsError::ComponentMissing);
        }
        let mut new_mask = old_mask;
        new_mask.clear(comp_idx.0 as usize);
        let tags = self.slots[idx].tags;

        let old_key = self.slots[idx].components_key;
        let new_key = self.ensure_chunk(new_mask, tags);
        if old_key != new_key {
            self.with_two_chunks(old_key, new_key, |src, dst| src.move_entity(entity, dst))?;
        }

        self.slots[idx].mask = new_mask;
        self.slots[idx].components_key = new_key;

        self.events.publish(Message::ComponentRemoved {
            entity,
            component: comp_idx,
        });
        Ok(())
    }

    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        let Some(ci) = self.schema.component_index::<T>() else {
            return false;
        };
        self.check_live(entity)
            .map(|idx| self.slots[idx].mask.contains(ci.0 as usize))
            .unwrap_or(false)
    }

    pub fn get_component<T: Component>(&self, entity: Entity) -> Result<&T> {
        let idx = self.check_live(entity)?;
        let comp_idx = self
            .schema
            .component_index::<T>()
            .ok_or(EcsError::ComponentMissing)?;
        if !self.slots[idx].mask.contains(comp_idx.0 as usize) {
            return Err(EcsError::ComponentMissing);
        }
        let key = self.slots[idx].components_key;
        let chunk = self.chunks.get(&key).expect("chunk for a live entity must exist");
        let row = self.row_of(chunk, entity)?;
        unsafe { chunk.component_ref::<T>(row, comp_idx) }
    }

    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T> {
        let idx = self.check_live(entity)?;
        let comp_idx = self
            .schema
            .component_index::<T>()
            .ok_or(EcsError::ComponentMissing)?;
        if !self.slots[idx].mask.contains(comp_idx.0 as usize) {
            return Err(EcsError::ComponentMissing);
        }
        let key = self.slots[idx].components_key;
        let row = {
            let chunk = self.chunks.get(&key).expect("chunk for a live entity must exist");
            self.row_of(chunk, entity)?
        };
        let chunk = self.chunks.get_mut(&key).expect("chunk for a live entity must exist");
        unsafe { chunk.component_mut::<T>(row, comp_idx) }
    }

    // --- Tags ---------------------------------------------------------

    /// Add a tag to a live entity's archetype, re-homing it into (or
    /// creating) the Chunk for the resulting mask/tag pair.
    pub fn add_tag<T: 'static>(&mut self, entity: Entity) -> Result<()> {
        let idx = self.check_live(entity)?;
        let tag_idx = self.schema.register_tag::<T>()?;
        let old_tags = self.slots[idx].tags;
        if old_tags.contains(tag_idx.0 as usize) {
            return Err(EcsError::ComponentAlreadyPresent);
        }
        let mut new_tags = old_tags;
        new_tags.set(tag_idx.0 as usize);
        self.retag(idx, entity, new_tags)
    }

    pub fn remove_tag<T: 'static>(&mut self, entity: Entity) -> Result<()> {
        let idx = self.check_live(entity)?;
        let tag_idx = self
            .schema
            .tag_index::<T>()
            .ok_or(EcsError::ComponentMissing)?;
        let old_tags = self.slots[idx].tags;
        if !old_tags.contains(tag_idx.0 as usize) {
            return Err(EcsError::ComponentMissing);
        }
        let mut new_tags = old_tags;
        new_tags.clear(tag_idx.0 as usize);
        self.retag(idx, entity, new_tags)
    }

    pub fn has_tag<T: 'static>(&self, entity: Entity) -> bool {
        let Some(ti) = self.schema.tag_index::<T>() else {
            return false;
        };
        self.check_live(entity)
            .map(|idx| self.slots[idx].tags.contains(ti.0 as usize))
            .unwrap_or(false)
    }

    fn retag(&mut self, idx: usize, entity: Entity, new_tags: BitMask) -> Result<()> {
        let mask = self.slots[idx].mask;
        let old_key = self.slots[idx].components_key;
        let new_key = self.ensure_chunk(mask, new_tags);
        if old_key != new_key {
            self.with_two_chunks(old_key, new_key, |src, dst| src.move_entity(entity, dst))?;
        }
        self.slots[idx].tags = new_tags;
        self.slots[idx].components_key = new_key;
        Ok(())
    }

    // --- Arrays ---------------------------------------------------------

    fn array_blob_mut(&mut self, entity: Entity, index: ArrayIndex) -> Result<&mut ArrayBlob> {
        let idx = self.check_live(entity)?;
        self.slots[idx]
            .arrays
            .get_mut(index.0 as usize)
            .and_then(|o| o.as_mut())
            .ok_or(EcsError::ArrayMissing)
    }

    fn array_blob(&self, entity: Entity, index: ArrayIndex) -> Result<&ArrayBlob> {
        let idx = self.check_live(entity)?;
        self.slots[idx]
            .arrays
            .get(index.0 as usize)
            .and_then(|o| o.as_ref())
            .ok_or(EcsError::ArrayMissing)
    }

    pub fn create_array<T: Component>(&mut self, entity: Entity, len: usize) -> Result<()> {
        let array_idx = self.schema.register_array::<T>()?;
        let idx = self.check_live(entity)?;
        let slot = &mut self.slots[idx];
        if slot.arrays.len() <= array_idx.0 as usize {
            slot.arrays.resize_with(array_idx.0 as usize + 1, || None);
        }
        if slot.arrays[array_idx.0 as usize].is_some() {
            return Err(EcsError::ArrayAlreadyPresent);
        }
        slot.arrays[array_idx.0 as usize] = Some(ArrayBlob::new(std::mem::size_of::<T>(), len));
        Ok(())
    }

    pub fn resize_array<T: Component>(&mut self, entity: Entity, new_len: usize) -> Result<()> {
        let array_idx = self
            .schema
            .array_index::<T>()
            .ok_or(EcsError::ArrayMissing)?;
        self.array_blob_mut(entity, array_idx)?.resize(new_len);
        Ok(())
    }

    pub fn get_array<T: Component>(&self, entity: Entity) -> Result<&[T]> {
        let array_idx = self
            .schema
            .array_index::<T>()
            .ok_or(EcsError::ArrayMissing)?;
        let blob = self.array_blob(entity, array_idx)?;
        debug_assert_eq!(blob.element_size, std::mem::size_of::<T>());
        Ok(unsafe { std::slice::from_raw_parts(blob.as_slice().as_ptr() as *const T, blob.len()) })
    }

    pub fn get_array_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut [T]> {
        let array_idx = self
            .schema
            .array_index::<T>()
            .ok_or(EcsError::ArrayMissing)?;
        let blob = self.array_blob_mut(entity, array_idx)?;
        debug_assert_eq!(blob.element_size, std::mem::size_of::<T>());
        Ok(unsafe {
            std::slice::from_raw_parts_mut(blob.as_mut_slice().as_mut_ptr() as *mut T, blob.len())
        })
    }

    pub fn destroy_array<T: Component>(&mut self, entity: Entity) -> Result<()> {
        let array_idx = self
            .schema
            .array_index::<T>()
            .ok_or(EcsError::ArrayMissing)?;
        let idx = self.check_live(entity)?;
        let entry = self.slots[idx]
            .arrays
            .get_mut(array_idx.0 as usize)
            .ok_or(EcsError::ArrayMissing)?;
        if entry.take().is_none() {
            return Err(EcsError::ArrayMissing);
        }
        Ok(())
    }

    pub fn contains_array<T: Component>(&self, entity: Entity) -> bool {
        let Some(array_idx) = self.schema.array_index::<T>() else {
            return false;
        };
        self.array_blob(entity, array_idx).is_ok()
    }

    // --- Parent / child / references ------------------------------------

    /// Reparent `entity` under `parent`. Rejects self-parenting and any
    /// attempt that would create an ancestor cycle with `InvalidParent`.
    /// If `parent` is not live, the entity's parent is reset to
    /// [`Entity::NONE`] and this returns `Ok(false)`.
    pub fn set_parent(&mut self, entity: Entity, parent: Entity) -> Result<bool> {
        let idx = self.check_live(entity)?;
        if entity == parent {
            return Err(EcsError::InvalidParent);
        }

        let parent_live = !parent.is_none() && self.is_live(parent);
        if parent_live {
            let mut cursor = parent;
            loop {
                if cursor == entity {
                    return Err(EcsError::InvalidParent);
                }
                let next = self.slots[cursor.slot_index().expect("live entity has a slot")].parent;
                if next.is_none() {
                    break;
                }
                cursor = next;
            }
        }

        let old_parent = self.slots[idx].parent;
        if !old_parent.is_none() {
            if let Some(pidx) = old_parent.slot_index() {
                if self.slots[pidx].entity() == old_parent {
                    self.slots[pidx].children.retain(|&c| c != entity);
                }
            }
        }

        if !parent_live {
            self.slots[idx].parent = Entity::NONE;
            self.recompute_subtree(entity);
            return Ok(false);
        }

        let pidx = parent.slot_index().expect("live entity has a slot");
        self.slots[pidx].children.push(entity);
        self.slots[idx].parent = parent;
        self.recompute_subtree(entity);
        Ok(true)
    }

    pub fn parent(&self, entity: Entity) -> Result<Entity> {
        let idx = self.check_live(entity)?;
        Ok(self.slots[idx].parent)
    }

    pub fn children(&self, entity: Entity) -> Result<&[Entity]> {
        let idx = self.check_live(entity)?;
        Ok(self.slots[idx].children())
    }

    /// Record a weak reference from `owner` to `target`. Returns the
    /// 1-based local index of this reference, stable for `owner`'s
    /// lifetime.
    pub fn add_reference(&mut self, owner: Entity, target: Entity) -> Result<usize> {
        let idx = self.check_live(owner)?;
        self.slots[idx].references.push(target);
        Ok(self.slots[idx].references.len())
    }

    /// Resolved references: a since-destroyed target surfaces as
    /// [`Entity::NONE`] rather than its stale id.
    pub fn references(&self, owner: Entity) -> Result<impl Iterator<Item = Entity> + '_> {
        let idx = self.check_live(owner)?;
        Ok(self.slots[idx]
            .references
            .iter()
            .map(move |&target| if self.is_live(target) { target } else { Entity::NONE }))
    }

    // --- Enable / disable -----------------------------------------------

    /// Derive `idx`'s state from scratch: `own_enabled` plus its immediate
    /// parent's already-derived state. Leaves `Destroyed` slots alone --
    /// callers only reach this for slots already confirmed live.
    fn compute_effective_state(&self, idx: usize) -> SlotState {
        if !self.slots[idx].own_enabled {
            return SlotState::Disabled;
        }
        let parent = self.slots[idx].parent;
        if !parent.is_none() {
            if let Some(pidx) = parent.slot_index() {
                if self.slots[pidx].entity() == parent && self.slots[pidx].state != SlotState::Enabled {
                    return SlotState::DisabledDueToAncestor;
                }
            }
        }
        SlotState::Enabled
    }

    /// Recompute `entity`'s derived state, then every live descendant's,
    /// depth-first -- mirrors the children walk in `destroy`. Each child's
    /// recomputation reads its parent's just-updated state, so a disable at
    /// the root propagates `DisabledDueToAncestor` down the whole subtree in
    /// one pass, and a re-enable un-propagates it the same way.
    fn recompute_subtree(&mut self, entity: Entity) {
        let Some(idx) = entity.slot_index() else {
            return;
        };
        if self.slots[idx].entity() != entity || !self.slots[idx].state.is_live() {
            return;
        }
        self.slots[idx].state = self.compute_effective_state(idx);
        let children = self.slots[idx].children.clone();
        for child in children {
            self.recompute_subtree(child);
        }
    }

    /// Directly disable `entity` (`own_enabled = false`). Every live
    /// descendant is recomputed: one whose own toggle is still enabled
    /// becomes `DisabledDueToAncestor`, one already directly disabled stays
    /// `Disabled`.
    pub fn disable(&mut self, entity: Entity) -> Result<()> {
        let idx = self.check_live(entity)?;
        self.slots[idx].own_enabled = false;
        self.recompute_subtree(entity);

        #[cfg(feature = "tracing")]
        trace!(entity = entity.index(), "entity disabled");

        Ok(())
    }

    /// Directly enable `entity` (`own_enabled = true`). Its effective state
    /// becomes `Enabled` unless an ancestor is itself not effectively
    /// enabled, in which case it becomes `DisabledDueToAncestor`; every live
    /// descendant is recomputed the same way.
    pub fn enable(&mut self, entity: Entity) -> Result<()> {
        let idx = self.check_live(entity)?;
        self.slots[idx].own_enabled = true;
        self.recompute_subtree(entity);

        #[cfg(feature = "tracing")]
        trace!(entity = entity.index(), "entity enabled");

        Ok(())
    }

    /// Effective-enabled per the state machine: `(own == Enabled) && (no
    /// ancestor disabled)`. A `DisabledDueToAncestor` or directly `Disabled`
    /// entity is live (queryable, destroyable) but not effective-enabled.
    pub fn is_enabled(&self, entity: Entity) -> Result<bool> {
        let idx = self.check_live(entity)?;
        Ok(self.slots[idx].state == SlotState::Enabled)
    }

    // --- Queries ---------------------------------------------------------

    /// Iterate every `(Entity, &mut C1, .., &mut Cn)` whose archetype
    /// contains every component in `Q`. Component mask only -- tagged and
    /// untagged matching entities are both visited; use
    /// [`crate::query::entities_matching`] with a [`crate::query::QueryFilter`]
    /// for a tag- or array-aware query.
    pub fn query<Q: QueryFetch>(&mut self) -> QueryIter<'_, Q> {
        QueryIter::new(self, BitMask::new())
    }

    /// As [`World::query`], additionally excluding any archetype whose
    /// component mask intersects `excluded`. Still component-mask-only;
    /// see [`World::query`]'s note on tag/array blindness.
    pub fn query_excluding<Q: QueryFetch>(&mut self, excluded: BitMask) -> QueryIter<'_, Q> {
        QueryIter::new(self, excluded)
    }
}
