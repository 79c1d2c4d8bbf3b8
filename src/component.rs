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

//! Component trait and ergonomic multi-component spawn bundles.
//!
//! Components are plain-old-data values attached to an entity. Bundles
//! group several of them so `World::create_with` can register, mask, and
//! write them in one call instead of a `create` followed by N
//! `add_component` calls.

use smallvec::SmallVec;

use crate::bitmask::BitMask;
use crate::chunk::Chunk;
use crate::error::Result;
use crate::schema::{ComponentIndex, Schema};

/// Maximum number of components supported by a single `Bundle`.
pub const MAX_BUNDLE_COMPONENTS: usize = 8;

/// Marker trait for components. Components must be `'static` (no borrowed
/// data) and plain-old-data in spirit, though nothing here enforces
/// `Copy` since a component may still own a heap allocation.
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// A tuple of components that can be registered and written into a Chunk
/// row in one shot.
pub trait Bundle: 'static {
    /// Indices of all components in the bundle, registering each with
    /// `schema` if it has not been seen before.
    fn register(schema: &mut Schema) -> Result<SmallVec<[ComponentIndex; MAX_BUNDLE_COMPONENTS]>>;

    /// Build the BitMask naming exactly this bundle's components.
    fn mask(schema: &mut Schema) -> Result<BitMask> {
        let mut mask = BitMask::new();
        for idx in Self::register(schema)? {
            mask.set(idx.0 as usize);
        }
        Ok(mask)
    }

    /// Write every component's bytes into `chunk`'s row `row`.
    ///
    /// # Safety
    /// Caller must ensure `row` is a valid, freshly-allocated row in
    /// `chunk` and that `chunk`'s mask contains every index `Self::register`
    /// returns.
    unsafe fn write(self, chunk: &mut Chunk, row: usize, indices: &[ComponentIndex]);
}

macro_rules! impl_bundle {
    ($count:literal; $($T:ident => $idx:tt),*) => {
        impl<$($T: Component),*> Bundle for ($($T,)*) {
            fn register(schema: &mut Schema) -> Result<SmallVec<[ComponentIndex; MAX_BUNDLE_COMPONENTS]>> {
                let mut out = SmallVec::new();
                $(out.push(schema.register_component::<$T>()?);)*
                let _ = $count;
                Ok(out)
            }

            #[allow(non_snake_case)]
            unsafe fn write(self, chunk: &mut Chunk, row: usize, indices: &[ComponentIndex]) {
                let ($($T,)*) = self;
                $(
                    let ptr = chunk
                        .component_bytes_mut(row, indices[$idx])
                        .expect("bundle index present by construction")
                        .as_mut_ptr();
                    std::ptr::write(ptr as *mut $T, $T);
                )*
            }
        }
    };
}

impl_bundle!(1; A => 0);
impl_bundle!(2; A => 0, B => 1);
impl_bundle!(3; A => 0, B => 1, C => 2);
impl_bundle!(4; A => 0, B => 1, C => 2, D => 3);
impl_bundle!(5; A => 0, B => 1, C => 2, D => 3, E => 4);
impl_bundle!(6; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_bundle!(7; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_bundle!(8; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);
