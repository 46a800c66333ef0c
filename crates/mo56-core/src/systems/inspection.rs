//! Inspection system - completes inspections whose timer has run out

use crate::components::{Inspections, Skills};
use crate::systems::{EventQueue, SimEvent};
use hecs::World;

/// Complete every inspection due by `now` (simulation seconds), paying
/// knowledge and skill XP into the survivor's skills.
pub fn inspection_system(world: &mut World, now: f64, events: &mut EventQueue) {
    for (entity, (inspections, skills)) in world.query_mut::<(&mut Inspections, &mut Skills)>() {
        if inspections.0.is_empty() {
            continue;
        }
        for event in inspections.0.advance(now, &mut skills.0) {
            events.push(SimEvent::Inspection { entity, event });
        }
    }
}
