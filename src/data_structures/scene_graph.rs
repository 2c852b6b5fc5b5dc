//! The scene graph store.
//!
//! Owns every entity of the scene under a stable [`EntityId`]. Insertion is a
//! single hash map write, so an entity attached between two ticks is visible
//! to the very next tick. Entities are never removed.

use std::collections::HashMap;

use crate::data_structures::entity::Entity;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    Sphere,
    Light,
    Bird,
    Camera,
}

impl EntityId {
    pub const ALL: [EntityId; 4] = [
        EntityId::Sphere,
        EntityId::Light,
        EntityId::Bird,
        EntityId::Camera,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityId::Sphere => "sphere",
            EntityId::Light => "light",
            EntityId::Bird => "bird",
            EntityId::Camera => "camera",
        }
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    entities: HashMap<EntityId, Entity>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `entity` under `id`, returning the entity it replaced.
    pub fn insert(&mut self, id: EntityId, entity: Entity) -> Option<Entity> {
        let previous = self.entities.insert(id, entity);
        if previous.is_some() {
            log::warn!("entity {} was attached twice, keeping the newer one", id);
        }
        previous
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in identity order, which keeps draw order stable across frames.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        EntityId::ALL
            .into_iter()
            .filter_map(|id| self.entities.get(&id).map(|entity| (id, entity)))
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;

    #[test]
    fn inserted_entity_is_immediately_readable() {
        let mut scene = SceneGraph::new();
        assert!(!scene.contains(EntityId::Bird));
        scene.insert(EntityId::Bird, Entity::from(Vector3::new(0.0, 0.0, 24.0)));
        assert_eq!(scene.get(EntityId::Bird).map(|e| e.position.z), Some(24.0));
    }

    #[test]
    fn reinsert_replaces_and_returns_previous() {
        let mut scene = SceneGraph::new();
        scene.insert(EntityId::Camera, Entity::from(Vector3::new(0.0, 0.0, 1.0)));
        let previous = scene.insert(EntityId::Camera, Entity::from(Vector3::new(0.0, 0.0, 2.0)));
        assert_eq!(previous.map(|e| e.position.z), Some(1.0));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn iteration_follows_identity_order() {
        let mut scene = SceneGraph::new();
        scene.insert(EntityId::Camera, Entity::new());
        scene.insert(EntityId::Sphere, Entity::new());
        scene.insert(EntityId::Bird, Entity::new());
        let ids: Vec<_> = scene.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![EntityId::Sphere, EntityId::Bird, EntityId::Camera]);
    }
}
