//! Simulation events - notifications produced by systems for the caller
//!
//! Systems push events into an [`EventQueue`]; the engine hands them out in
//! the order they were produced via `SimulationEngine::drain_events`.

use hecs::Entity;
use mo56_logic::inspection::InspectionEvent;
use mo56_logic::station::CraftEvent;

/// Something a caller may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Displayed vitals of this survivor moved past the notification
    /// tolerance. Read the new values with `SimulationEngine::vitals`.
    VitalsChanged(Entity),
    /// Craft lifecycle step for this survivor.
    Craft { entity: Entity, event: CraftEvent },
    /// Inspection lifecycle step for this survivor.
    Inspection {
        entity: Entity,
        event: InspectionEvent,
    },
}

impl SimEvent {
    pub fn entity(&self) -> Entity {
        match self {
            SimEvent::VitalsChanged(entity) => *entity,
            SimEvent::Craft { entity, .. } => *entity,
            SimEvent::Inspection { entity, .. } => *entity,
        }
    }
}

/// Ordered buffer of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: Vec<SimEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        self.pending.push(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    #[test]
    fn drain_empties_queue_in_order() {
        let mut world = World::new();
        let a = world.spawn(());
        let b = world.spawn(());

        let mut queue = EventQueue::new();
        queue.push(SimEvent::VitalsChanged(a));
        queue.push(SimEvent::Craft {
            entity: b,
            event: CraftEvent::Cancelled {
                recipe_id: "x".into(),
                reason: "test".into(),
            },
        });
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained[0].entity(), a);
        assert_eq!(drained[1].entity(), b);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }
}
