//! Lifecycle messages dispatched by the World's event bus.

use crate::entity::Entity;
use crate::schema::ComponentIndex;

/// Messages the World publishes synchronously from inside the
/// corresponding operation, before it returns. Listeners observe these
/// during the next [`crate::event_bus::EventBus::poll`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    EntityCreated {
        entity: Entity,
    },
    EntityDestroyed {
        entity: Entity,
        parent: Entity,
    },
    ComponentRemoved {
        entity: Entity,
        component: ComponentIndex,
    },
}

impl Message {
    pub fn entity(&self) -> Entity {
        match self {
            Message::EntityCreated { entity } => *entity,
            Message::EntityDestroyed { entity, .. } => *entity,
            Message::ComponentRemoved { entity, .. } => *entity,
        }
    }

    /// Debug-friendly discriminant name.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::EntityCreated { .. } => "EntityCreated",
            Message::EntityDestroyed { .. } => "EntityDestroyed",
            Message::ComponentRemoved { .. } => "ComponentRemoved",
        }
    }
}
