//! Per-frame component hooks

use super::BEHAVIOUR_SYSTEM;
use crate::ecs::{EntitySet, System, SystemError, World};
use crate::foundation::collections::NodeId;
use std::any::Any;

/// Calls `on_update` on every component of each subscribed host
#[derive(Debug, Default)]
pub struct BehaviourSystem {
    entities: EntitySet,
}

impl BehaviourSystem {
    /// System with no entities
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for BehaviourSystem {
    fn name(&self) -> &str {
        BEHAVIOUR_SYSTEM
    }

    fn entities(&self) -> &EntitySet {
        &self.entities
    }

    fn entities_mut(&mut self) -> &mut EntitySet {
        &mut self.entities
    }

    fn update(&mut self, entity: NodeId, world: &mut World) -> Result<(), SystemError> {
        let attached = world.components_of(entity).to_vec();
        for id in attached {
            // An earlier hook may have detached it
            if world.components.host(id) != Some(entity) {
                continue;
            }
            world.with_component(id, entity, |component, ctx| component.on_update(ctx));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Behaviour;
    use crate::ecs::{Context, SystemRegistry};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_behaviour_runs_each_frame_until_removed() {
        let mut world = World::new();
        let mut systems = SystemRegistry::new();
        systems.register(Box::new(BehaviourSystem::new()));
        let node = world.create_node("spinner");

        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        let behaviour = Behaviour::new("spin", move |ctx| {
            counter.set(counter.get() + 1);
            if let Some(node) = ctx.node_mut() {
                node.rotation += 0.5;
            }
            if counter.get() == 2 {
                ctx.remove_self();
            }
        });
        Context::new(&mut world, &mut systems)
            .attach(node, Box::new(behaviour))
            .unwrap();

        for _ in 0..4 {
            systems.update(&mut world);
        }
        assert_eq!(runs.get(), 2);
        assert!(world.components_of(node).is_empty());
        assert!(!systems.has_entity(BEHAVIOUR_SYSTEM, node));
    }

    #[test]
    fn test_entity_destroying_itself_mid_update() {
        let mut world = World::new();
        let mut systems = SystemRegistry::new();
        systems.register(Box::new(BehaviourSystem::new()));
        let doomed = world.create_node("doomed");
        let survivor = world.create_node("survivor");

        let survivor_runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&survivor_runs);
        let mut ctx = Context::new(&mut world, &mut systems);
        ctx.attach(doomed, Box::new(Behaviour::new("boom", |ctx| ctx.destroy_host())))
            .unwrap();
        ctx.attach(
            survivor,
            Box::new(Behaviour::new("tick", move |_| counter.set(counter.get() + 1))),
        )
        .unwrap();

        systems.update(&mut world);
        systems.update(&mut world);
        assert!(!world.tree.contains(doomed));
        assert_eq!(survivor_runs.get(), 2);
        assert_eq!(systems.get(BEHAVIOUR_SYSTEM).unwrap().entities().len(), 1);
    }
}
