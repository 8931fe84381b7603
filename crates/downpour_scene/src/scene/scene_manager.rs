//! Scene Manager - registry of scenes and the entities bound to them
//!
//! The manager owns every [`Scene`] and every entity by name and tracks
//! which scene is active. It is an ordinary value: construct one and pass it
//! where it is needed.

use crate::scene::{Scene, SceneEntity};
use std::collections::HashMap;

/// Owner of named scenes and entities
#[derive(Default)]
pub struct SceneManager {
    scenes: HashMap<String, Scene>,
    entities: HashMap<String, Box<dyn SceneEntity>>,
    active_scene: Option<String>,
}

impl std::fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneManager")
            .field("scenes", &self.scene_names())
            .field("entities", &self.entities.len())
            .field("active_scene", &self.active_scene)
            .finish()
    }
}

impl SceneManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Scenes ----

    /// Create a scene, or return the existing one with this name
    ///
    /// The first scene created becomes active.
    pub fn create_scene(&mut self, name: &str) -> &mut Scene {
        if self.active_scene.is_none() {
            self.active_scene = Some(name.to_string());
        }
        self.scenes.entry(name.to_string()).or_insert_with(|| {
            log::info!("Created scene '{name}'");
            Scene::new(name)
        })
    }

    /// Look up a scene
    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    /// Look up a scene mutably
    pub fn scene_mut(&mut self, name: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(name)
    }

    /// True if a scene with this name exists
    pub fn has_scene(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    /// Destroy a scene together with every entity registered to it
    ///
    /// Returns false if no such scene exists.
    pub fn destroy_scene(&mut self, name: &str) -> bool {
        if !self.scenes.contains_key(name) {
            return false;
        }

        let before = self.entities.len();
        self.entities.retain(|_, entity| entity.entity().scene_name() != name);
        self.scenes.remove(name);

        if self.active_scene.as_deref() == Some(name) {
            self.active_scene = None;
        }
        log::info!(
            "Destroyed scene '{}' and {} entit(ies)",
            name,
            before - self.entities.len()
        );
        true
    }

    /// Make a scene active; unknown names are ignored
    pub fn set_active_scene(&mut self, name: &str) {
        if self.scenes.contains_key(name) {
            self.active_scene = Some(name.to_string());
        } else {
            log::warn!("set_active_scene: no scene named '{name}'");
        }
    }

    /// The active scene
    pub fn active_scene(&self) -> Option<&Scene> {
        self.scenes.get(self.active_scene.as_deref()?)
    }

    /// The active scene, mutably
    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.scenes.get_mut(self.active_scene.as_deref()?)
    }

    /// Name of the active scene
    pub fn active_scene_name(&self) -> Option<&str> {
        self.active_scene.as_deref()
    }

    /// Scene names, sorted
    pub fn scene_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scenes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of scenes
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    // ---- Entities ----

    /// Create an entity of type `T` in `scene_name`, or return the existing one
    ///
    /// Returns `None` if the scene does not exist, or if an entity with this
    /// name exists but is not a `T`.
    pub fn create_entity<T: SceneEntity>(&mut self, name: &str, scene_name: &str) -> Option<&mut T> {
        if !self.scenes.contains_key(scene_name) {
            log::warn!("create_entity '{name}': no scene named '{scene_name}'");
            return None;
        }

        let entity = self.entities.entry(name.to_string()).or_insert_with(|| {
            log::info!("Created entity '{name}' in scene '{scene_name}'");
            Box::new(T::create(name, scene_name))
        });

        let kind = entity.kind();
        let typed = entity.as_any_mut().downcast_mut::<T>();
        if typed.is_none() {
            log::warn!("create_entity '{name}': existing entity is a {kind:?}");
        }
        typed
    }

    /// Look up an entity
    pub fn entity(&self, name: &str) -> Option<&dyn SceneEntity> {
        self.entities.get(name).map(|entity| &**entity)
    }

    /// Look up an entity mutably
    pub fn entity_mut(&mut self, name: &str) -> Option<&mut dyn SceneEntity> {
        let entity = self.entities.get_mut(name)?;
        Some(&mut **entity)
    }

    /// Look up an entity as its concrete type
    pub fn entity_as<T: SceneEntity>(&self, name: &str) -> Option<&T> {
        self.entities.get(name)?.as_any().downcast_ref::<T>()
    }

    /// Look up an entity mutably as its concrete type
    pub fn entity_as_mut<T: SceneEntity>(&mut self, name: &str) -> Option<&mut T> {
        self.entities.get_mut(name)?.as_any_mut().downcast_mut::<T>()
    }

    /// Name of the scene an entity is registered to
    pub fn entity_scene_name(&self, name: &str) -> Option<&str> {
        self.entities.get(name).map(|entity| entity.entity().scene_name())
    }

    /// Run `f` with an entity and its scene borrowed mutably at the same time
    ///
    /// Returns `None` if the entity is missing, is not a `T`, or its scene no
    /// longer exists.
    pub fn with_entity<T, R, F>(&mut self, name: &str, f: F) -> Option<R>
    where
        T: SceneEntity,
        F: FnOnce(&mut T, &mut Scene) -> R,
    {
        let entity = self.entities.get_mut(name)?;
        let scene = self.scenes.get_mut(entity.entity().scene_name())?;
        let typed = entity.as_any_mut().downcast_mut::<T>()?;
        Some(f(typed, scene))
    }

    /// Remove an entity; its nodes stay in the scene
    pub fn destroy_entity(&mut self, name: &str) -> bool {
        self.entities.remove(name).is_some()
    }

    /// Number of entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // ---- Frame ----

    /// Propagate transforms in the active scene; other scenes stay frozen
    pub fn update(&mut self, delta_time: f32) {
        if let Some(scene) = self.active_scene_mut() {
            log::trace!("Updating scene '{}' (dt = {delta_time})", scene.name());
            scene.update_transforms();
        }
    }

    /// Drop every entity and scene
    pub fn clear(&mut self) {
        self.entities.clear();
        self.scenes.clear();
        self.active_scene = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::{CameraEntity, CarEntity, Entity, EntityKind, RoadEntity};

    #[test]
    fn test_first_scene_becomes_active() {
        let mut manager = SceneManager::new();
        manager.create_scene("menu");
        manager.create_scene("driving");

        assert_eq!(manager.active_scene_name(), Some("menu"));
        manager.set_active_scene("driving");
        assert_eq!(manager.active_scene().map(Scene::name), Some("driving"));

        manager.set_active_scene("nowhere");
        assert_eq!(manager.active_scene_name(), Some("driving"));
        assert_eq!(manager.scene_names(), vec!["driving", "menu"]);
    }

    #[test]
    fn test_create_entity_requires_scene() {
        let mut manager = SceneManager::new();
        assert!(manager.create_entity::<CarEntity>("car", "driving").is_none());
        assert_eq!(manager.entity_count(), 0);
    }

    #[test]
    fn test_create_entity_of_other_kind_returns_none() {
        let mut manager = SceneManager::new();
        manager.create_scene("driving");
        manager.create_entity::<RoadEntity>("thing", "driving");

        assert!(manager.create_entity::<CarEntity>("thing", "driving").is_none());
        assert_eq!(manager.entity("thing").map(SceneEntity::kind), Some(EntityKind::Road));
        assert!(manager.entity_as::<RoadEntity>("thing").is_some());
        assert_eq!(manager.entity_count(), 1);
    }

    #[test]
    fn test_destroy_scene_takes_its_entities() {
        let mut manager = SceneManager::new();
        manager.create_scene("driving");
        manager.create_scene("garage");
        manager.create_entity::<CarEntity>("car", "driving");
        manager.create_entity::<CameraEntity>("cam", "driving");
        manager.create_entity::<Entity>("lift", "garage");

        assert!(manager.destroy_scene("driving"));
        assert!(!manager.destroy_scene("driving"));

        assert_eq!(manager.entity_count(), 1);
        assert_eq!(manager.entity_scene_name("lift"), Some("garage"));
        assert!(manager.active_scene().is_none());
        assert!(!manager.has_scene("driving"));
    }

    #[test]
    fn test_with_entity_borrows_scene_alongside() {
        let mut manager = SceneManager::new();
        manager.create_scene("driving");
        manager.create_entity::<Entity>("crate", "driving");

        let moved = manager.with_entity::<Entity, _, _>("crate", |entity, scene| {
            let node = scene.create_node("crate_root");
            entity.add_node(node, "");
            entity.set_position(scene, Vec3::new(0.0, 2.0, 0.0));
            node
        });
        manager.update(0.016);

        let node = moved.unwrap();
        let position = manager.scene("driving").and_then(|s| s.node(node)).map(|n| n.world_position());
        assert_eq!(position, Some(Vec3::new(0.0, 2.0, 0.0)));
        assert!(manager.with_entity::<CarEntity, _, _>("crate", |_, _| ()).is_none());
    }

    #[test]
    fn test_update_touches_only_active_scene() {
        let mut manager = SceneManager::new();
        let active = manager.create_scene("a").create_node("n");
        let frozen = manager.create_scene("b").create_node("n");

        manager.update(0.016);

        assert!(!manager.scene("a").unwrap().node(active).unwrap().is_dirty());
        assert!(manager.scene("b").unwrap().node(frozen).unwrap().is_dirty());
    }

    #[test]
    fn test_clear_and_destroy_entity() {
        let mut manager = SceneManager::new();
        manager.create_scene("driving");
        manager.create_entity::<Entity>("e", "driving");

        assert!(manager.destroy_entity("e"));
        assert!(!manager.destroy_entity("e"));

        manager.clear();
        assert_eq!(manager.scene_count(), 0);
        assert!(manager.active_scene_name().is_none());
    }
}
