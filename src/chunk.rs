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

//! Chunk: column-oriented storage for every entity sharing one archetype
//! mask. Swap-removal keeps columns dense at the cost of per-Chunk
//! iteration-order stability; queries never assume row order survives a
//! mutation.

use rustc_hash::FxHashMap;

use crate::bitmask::BitMask;
use crate::entity::Entity;
use crate::error::{EcsError, Result};
use crate::schema::{ComponentIndex, Schema};

/// One component type's values for every entity in a Chunk, stored as a
/// flat byte buffer sized by the registered component's byte size.
pub struct Column {
    data: Vec<u8>,
    item_size: usize,
}

impl Column {
    fn new(item_size: usize) -> Self {
        Self {
            data: Vec::new(),
            item_size,
        }
    }

    fn len(&self) -> usize {
        if self.item_size == 0 {
            0
        } else {
            self.data.len() / self.item_size
        }
    }

    fn push_zeroed(&mut self) {
        self.data.resize(self.data.len() + self.item_size, 0);
    }

    fn swap_remove(&mut self, row: usize) {
        let last = self.len() - 1;
        if row != last {
            let (row_off, last_off) = (row * self.item_size, last * self.item_size);
            for i in 0..self.item_size {
                self.data.swap(row_off + i, last_off + i);
            }
        }
        self.data.truncate(last * self.item_size);
    }

    fn bytes(&self, row: usize) -> &[u8] {
        let off = row * self.item_size;
        &self.data[off..off + self.item_size]
    }

    fn bytes_mut(&mut self, row: usize) -> &mut [u8] {
        let off = row * self.item_size;
        &mut self.data[off..off + self.item_size]
    }
}

/// Combine a component mask and a tag mask into the 64-bit key the World's
/// Chunk map is keyed by. Tags carry no column storage, but two entities
/// with identical components and different tags belong to different
/// archetypes, so chunk identity must account for both; rotating the tag
/// hash keeps a component-only mask and a tag-only mask with the same bit
/// pattern from hashing identically.
pub fn archetype_key(components: &BitMask, tags: &BitMask) -> u64 {
    components.hash() ^ tags.hash().rotate_left(1)
}

/// Storage for every entity whose current component set equals `mask` and
/// whose tag set equals `tags`. Only `mask` allocates columns; `tags` is
/// carried for archetype identity and query filtering.
pub struct Chunk {
    mask: BitMask,
    tags: BitMask,
    entities: Vec<Entity>,
    columns: Vec<Column>,
    /// Component schema index -> position in `columns`.
    column_positions: FxHashMap<u16, usize>,
    /// Bumped on every structural mutation (add/remove/move); checked
    /// builds use this to detect `ConcurrentModification` during query
    /// iteration.
    mutation_tick: u64,
}

impl Chunk {
    /// Create an (initially empty) Chunk for `mask` with an empty tag set,
    /// allocating one column per component type the mask names.
    pub fn new(mask: BitMask, schema: &Schema) -> Self {
        Self::with_tags(mask, BitMask::new(), schema)
    }

    /// Create an (initially empty) Chunk for `mask` and `tags`, allocating
    /// one column per component type `mask` names. `tags` contributes no
    /// columns; it only affects this Chunk's archetype identity.
    pub fn with_tags(mask: BitMask, tags: BitMask, schema: &Schema) -> Self {
        let mut columns = Vec::new();
        let mut column_positions = FxHashMap::default();
        for idx in mask.iter_set_indices() {
            if (idx as u16 as usize) != idx {
                continue;
            }
            let comp = ComponentIndex(idx as u16);
            let size = schema.size_of(comp);
            column_positions.insert(comp.0, columns.len());
            columns.push(Column::new(size));
        }
        Self {
            mask,
            tags,
            entities: Vec::new(),
            columns,
            column_positions,
            mutation_tick: 0,
        }
    }

    pub fn mask(&self) -> &BitMask {
        &self.mask
    }

    pub fn tags(&self) -> &BitMask {
        &self.tags
    }

    /// This Chunk's key in the World's archetype map.
    pub fn archetype_key(&self) -> u64 {
        archetype_key(&self.mask, &self.tags)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn mutation_tick(&self) -> u64 {
        self.mutation_tick
    }

    fn row_of(&self, entity: Entity) -> Option<usize> {
        self.entities.iter().position(|&e| e == entity)
    }

    /// Append `entity` with a zero-initialised row in every column.
    /// Returns the new row index.
    pub fn add(&mut self, entity: Entity) -> usize {
        let row = self.entities.len();
        self.entities.push(entity);
        for col in &mut self.columns {
            col.push_zeroed();
        }
        self.mutation_tick += 1;
        row
    }

    /// Remove the row holding `entity` by swapping with the last row in
    /// every column. Returns the entity that was swapped into `entity`'s
    /// old row, if any (the caller must fix up that entity's recorded row).
    pub fn remove(&mut self, entity: Entity) -> Result<Option<Entity>> {
        let row = self
            .row_of(entity)
            .ok_or(EcsError::UnknownEntity(entity))?;
        let last = self.entities.len() - 1;
        self.entities.swap_remove(row);
        for col in &mut self.columns {
            col.swap_remove(row);
        }
        self.mutation_tick += 1;
        if row != last {
            Ok(Some(self.entities[row]))
        } else {
            Ok(None)
        }
    }

    /// Move `entity` from `self` into `destination`, copying bytes for
    /// every component type present in both masks; types only in
    /// `destination` stay zero-initialised, types only in `self` are
    /// discarded. Returns `(new_row, swapped_entity)` where `swapped_entity`
    /// is whoever was swapped into `entity`'s old row in `self`, if any.
    pub fn move_entity(
        &mut self,
        entity: Entity,
        destination: &mut Chunk,
    ) -> Result<(usize, Option<Entity>)> {
        let row = self
            .row_of(entity)
            .ok_or(EcsError::UnknownEntity(entity))?;

        let new_row = destination.add(entity);
        for (&comp_idx, &dst_pos) in &destination.column_positions {
            if let Some(&src_pos) = self.column_positions.get(&comp_idx) {
                let src_bytes = self.columns[src_pos].bytes(row).to_vec();
                destination.columns[dst_pos]
                    .bytes_mut(new_row)
                    .copy_from_slice(&src_bytes);
            }
        }

        let swapped = self.remove(entity)?;
        Ok((new_row, swapped))
    }

    /// Raw bytes for one component on one row.
    pub fn component_bytes(&self, row: usize, component: ComponentIndex) -> Result<&[u8]> {
        let pos = self
            .column_positions
            .get(&component.0)
            .ok_or(EcsError::ComponentMissing)?;
        Ok(self.columns[*pos].bytes(row))
    }

    pub fn component_bytes_mut(
        &mut self,
        row: usize,
        component: ComponentIndex,
    ) -> Result<&mut [u8]> {
        let pos = self
            .column_positions
            .get(&component.0)
            .copied()
            .ok_or(EcsError::ComponentMissing)?;
        Ok(self.columns[pos].bytes_mut(row))
    }

    /// Typed reference into a component column, asserting the caller's `T`
    /// matches the column's element size at the boundary.
    ///
    /// # Safety
    /// Caller must ensure `T` is the type registered at `component`.
    pub unsafe fn component_ref<T>(&self, row: usize, component: ComponentIndex) -> Result<&T> {
        let bytes = self.component_bytes(row, component)?;
        debug_assert_eq!(bytes.len(), std::mem::size_of::<T>());
        Ok(&*(bytes.as_ptr() as *const T))
    }

    /// # Safety
    /// Caller must ensure `T` is the type registered at `component`.
    pub unsafe fn component_mut<T>(
        &mut self,
        row: usize,
        component: ComponentIndex,
    ) -> Result<&mut T> {
        let bytes = self.component_bytes_mut(row, component)?;
        debug_assert_eq!(bytes.len(), std::mem::size_of::<T>());
        Ok(&mut *(bytes.as_mut_ptr() as *mut T))
    }

    /// Raw pointer to the start of a column's backing buffer, for query
    /// machinery that must hold several columns of the same Chunk mutably
    /// at once (safe `&mut self` accessors can only ever lend one).
    ///
    /// # Safety
    /// Caller must ensure `T` is the type registered at `component`, that
    /// `row < self.len()` before dereferencing `ptr.add(row)`, and must not
    /// alias the resulting pointer with any other live reference into the
    /// same column.
    pub unsafe fn component_ptr_mut<T>(&self, component: ComponentIndex) -> Result<*mut T> {
        let pos = self
            .column_positions
            .get(&component.0)
            .copied()
            .ok_or(EcsError::ComponentMissing)?;
        let col = &self.columns[pos];
        debug_assert_eq!(col.item_size, std::mem::size_of::<T>());
        Ok(col.data.as_ptr() as *mut T)
    }

    /// Whole column as `&[T]`, row-ordered, for a typed query.
    ///
    /// # Safety
    /// Caller must ensure `T` is the type registered at `component`.
    pub unsafe fn column_slice<T>(&self, component: ComponentIndex) -> Result<&[T]> {
        let pos = self
            .column_positions
            .get(&component.0)
            .ok_or(EcsError::ComponentMissing)?;
        let col = &self.columns[*pos];
        debug_assert_eq!(col.item_size, std::mem::size_of::<T>());
        Ok(std::slice::from_raw_parts(
            col.data.as_ptr() as *const T,
            col.len(),
        ))
    }

    /// # Safety
    /// Caller must ensure `T` is the type registered at `component`.
    pub unsafe fn column_slice_mut<T>(&mut self, component: ComponentIndex) -> Result<&mut [T]> {
        let pos = self
            .column_positions
            .get(&component.0)
            .copied()
            .ok_or(EcsError::ComponentMissing)?;
        let col = &mut self.columns[pos];
        debug_assert_eq!(col.item_size, std::mem::size_of::<T>());
        Ok(std::slice::from_raw_parts_mut(
            col.data.as_mut_ptr() as *mut T,
            col.len(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn entity(n: u32) -> Entity {
        Entity::new(n, 0)
    }

    #[test]
    fn add_and_remove_keep_columns_dense() {
        let mut schema = Schema::new();
        let ci = schema.register_component::<u32>().unwrap();
        let mut mask = BitMask::new();
        mask.set(ci.0 as usize);
        let mut chunk = Chunk::new(mask, &schema);

        let row0 = chunk.add(entity(0));
        let row1 = chunk.add(entity(1));
        assert_eq!((row0, row1), (0, 1));
        assert_eq!(chunk.len(), 2);

        unsafe {
            *chunk.component_mut::<u32>(row0, ci).unwrap() = 10;
            *chunk.component_mut::<u32>(row1, ci).unwrap() = 20;
        }

        let swapped = chunk.remove(entity(0)).unwrap();
        assert_eq!(swapped, Some(entity(1)));
        assert_eq!(chunk.len(), 1);
        unsafe {
            assert_eq!(*chunk.component_ref::<u32>(0, ci).unwrap(), 20);
        }
    }

    #[test]
    fn move_entity_copies_shared_components_and_drops_the_rest() {
        let mut schema = Schema::new();
        let pos = schema.register_component::<u32>().unwrap();
        let vel = schema.register_component::<u16>().unwrap();

        let mut mask_pv = BitMask::new();
        mask_pv.set(pos.0 as usize);
        mask_pv.set(vel.0 as usize);
        let mut mask_p = BitMask::new();
        mask_p.set(pos.0 as usize);

        let mut src = Chunk::new(mask_pv, &schema);
        let mut dst = Chunk::new(mask_p, &schema);

        let row = src.add(entity(5));
        unsafe {
            *src.component_mut::<u32>(row, pos).unwrap() = 42;
            *src.component_mut::<u16>(row, vel).unwrap() = 7;
        }

        let (new_row, swapped) = src.move_entity(entity(5), &mut dst).unwrap();
        assert!(swapped.is_none());
        assert_eq!(src.len(), 0);
        assert_eq!(dst.len(), 1);
        unsafe {
            assert_eq!(*dst.component_ref::<u32>(new_row, pos).unwrap(), 42);
        }
        assert!(dst.component_bytes(new_row, vel).is_err());
    }

    #[test]
    fn missing_component_is_an_error() {
        let schema = Schema::new();
        let chunk = Chunk::new(BitMask::new(), &schema);
        assert!(matches!(
            chunk.component_bytes(0, ComponentIndex(0)),
            Err(EcsError::ComponentMissing)
        ));
    }
}
