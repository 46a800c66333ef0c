//! Metabolism system - advances every survivor's body by the elapsed time

use crate::components::{Activity, Exposure, MetabolicSimulator};
use crate::systems::{EventQueue, SimEvent};
use hecs::World;

/// Run one metabolic tick of `elapsed_seconds` for every survivor, queueing
/// a [`SimEvent::VitalsChanged`] for each whose vitals moved noticeably.
pub fn metabolism_system(world: &mut World, elapsed_seconds: f32, events: &mut EventQueue) {
    for (entity, (sim, activity, exposure)) in
        world.query_mut::<(&mut MetabolicSimulator, &Activity, &Exposure)>()
    {
        sim.update(elapsed_seconds, &activity.0, &exposure.0);
        if sim.take_vitals_changed() {
            events.push(SimEvent::VitalsChanged(entity));
        }
    }
}
