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

//! Error types

use std::fmt;

use crate::entity::Entity;

/// ECS error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Operation refers to an id that is not in the Enabled/Disabled/
    /// DisabledDueToAncestor states.
    UnknownEntity(Entity),

    /// Archetype-transition precondition: the component is not present.
    ComponentMissing,

    /// Archetype-transition precondition: the component is already present.
    ComponentAlreadyPresent,

    /// Per-entity array precondition: no array of that type exists.
    ArrayMissing,

    /// Per-entity array precondition: an array of that type already exists.
    ArrayAlreadyPresent,

    /// Self-parent or ancestor-cycle attempt.
    InvalidParent,

    /// A Schema kind (component / array / tag) has reached its capacity.
    SchemaFull,

    /// Structural mutation was observed during query iteration over the
    /// same Chunk (checked builds only).
    ConcurrentModification,
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::UnknownEntity(e) => write!(f, "unknown entity: {e:?}"),
            EcsError::ComponentMissing => write!(f, "component not present on entity"),
            EcsError::ComponentAlreadyPresent => write!(f, "component already present on entity"),
            EcsError::ArrayMissing => write!(f, "no array of that type on entity"),
            EcsError::ArrayAlreadyPresent => write!(f, "array of that type already present"),
            EcsError::InvalidParent => write!(f, "self-parent or parent cycle rejected"),
            EcsError::SchemaFull => write!(f, "schema capacity exhausted for this kind"),
            EcsError::ConcurrentModification => {
                write!(f, "structural mutation during query iteration")
            }
        }
    }
}

impl std::error::Error for EcsError {}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
