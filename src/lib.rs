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

//! Archetype ECS core - entity/component/archetype storage and query engine.
//!
//! `World` owns every entity slot and every archetype `Chunk`; components
//! are grouped into archetypes by `Schema`-assigned dense indices and
//! addressed through a 256-bit `BitMask`.

pub mod bitmask;
pub mod chunk;
pub mod component;
pub mod entity;
pub mod error;
pub mod event;
pub mod event_bus;
pub mod prelude;
pub mod query;
pub mod schema;
pub mod world;

pub use bitmask::BitMask;
pub use component::{Bundle, Component};
pub use entity::Entity;
pub use error::{EcsError, Result};
pub use event::Message;
pub use event_bus::{EventBus, ListenerId};
pub use query::{QueryFetch, QueryFilter, QueryIter};
pub use schema::{ArrayIndex, ComponentIndex, Schema, TagIndex};
pub use world::World;
