//! Crafting system - finishes crafts whose duration has elapsed

use crate::components::{Crafter, Inventory, Skills};
use crate::systems::{EventQueue, SimEvent};
use hecs::World;
use mo56_logic::crafting::CraftingOutcomeModel;
use rand::Rng;

/// Advance every active craft to `now` (simulation seconds). Finished
/// crafts roll for success with `rng` and pay out into the survivor's
/// inventory and skills.
pub fn crafting_system<R: Rng + ?Sized>(
    world: &mut World,
    now: f64,
    model: &CraftingOutcomeModel,
    rng: &mut R,
    events: &mut EventQueue,
) {
    for (entity, (crafter, skills, inventory)) in
        world.query_mut::<(&mut Crafter, &mut Skills, &mut Inventory)>()
    {
        if !crafter.0.is_crafting() {
            continue;
        }
        if let Some(event) = crafter.0.advance(now, &mut skills.0, &mut inventory.0, model, rng) {
            events.push(SimEvent::Craft { entity, event });
        }
    }
}

/// Survivors with a craft in progress.
pub fn active_crafters(world: &World) -> Vec<hecs::Entity> {
    world
        .query::<&Crafter>()
        .iter()
        .filter(|(_, crafter)| crafter.0.is_crafting())
        .map(|(entity, _)| entity)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mo56_logic::inventory::{ItemBag, ItemStore};
    use mo56_logic::recipes::Recipe;
    use mo56_logic::skills::SkillBook;
    use mo56_logic::station::{CraftEvent, CraftingStation};
    use rand::rngs::mock::StepRng;

    fn spawn_crafter(world: &mut World, recipe: &Recipe, start: f64) -> hecs::Entity {
        let model = CraftingOutcomeModel::default();
        let skills = SkillBook::new();
        let items = ItemBag::new().with("Reed", 2);
        let mut station = CraftingStation::with_known([recipe.id.as_str()]);
        station
            .try_start(recipe, start, &skills, &items, &model)
            .unwrap();
        world.spawn((Crafter(station), Skills(skills), Inventory(items)))
    }

    fn basket() -> Recipe {
        let mut recipe = Recipe::new("basket", "Basket");
        recipe.inputs.insert("Reed".into(), 2);
        recipe.outputs.insert("Basket".into(), 1);
        recipe
    }

    #[test]
    fn test_craft_finishes_after_duration() {
        let mut world = World::new();
        let entity = spawn_crafter(&mut world, &basket(), 0.0);
        let model = CraftingOutcomeModel::default();
        let mut rng = StepRng::new(0, 0);
        let mut events = EventQueue::new();

        crafting_system(&mut world, 3.0, &model, &mut rng, &mut events);
        assert!(events.is_empty());
        assert_eq!(active_crafters(&world), vec![entity]);

        crafting_system(&mut world, 6.5, &model, &mut rng, &mut events);
        let drained = events.drain();
        assert_eq!(drained.len(), 1);
        assert!(matches!(
            &drained[0],
            SimEvent::Craft { event: CraftEvent::Finished { success: true, .. }, .. }
        ));
        assert!(active_crafters(&world).is_empty());

        let inventory = world.get::<&Inventory>(entity).unwrap();
        assert_eq!(inventory.0.count("Basket"), 1);
        assert_eq!(inventory.0.count("Reed"), 0);
    }

    #[test]
    fn test_idle_crafters_are_ignored() {
        let mut world = World::new();
        world.spawn((Crafter::default(), Skills::default(), Inventory::default()));
        let model = CraftingOutcomeModel::default();
        let mut events = EventQueue::new();
        crafting_system(&mut world, 100.0, &model, &mut StepRng::new(0, 0), &mut events);
        assert!(events.is_empty());
    }
}
