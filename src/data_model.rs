use std::sync::Arc;

use glam::{Quat, Vec3};
use parking_lot::RwLock;

use crate::scene::{ObjectId, SceneObject};

/// Thread-safe container mirroring the mutable state of the scene graph.
#[derive(Debug, Default)]
pub struct DataModel {
    objects: Arc<RwLock<Vec<SceneObject>>>,
}

impl Clone for DataModel {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
        }
    }
}

impl DataModel {
    /// Creates an empty data model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a data model from an initial set of objects.
    pub fn from_objects(objects: Vec<SceneObject>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(objects)),
        }
    }

    /// Adds an object, assigning it the next free identity.
    pub fn insert(&self, mut object: SceneObject) -> ObjectId {
        let mut guard = self.objects.write();
        let next = guard
            .iter()
            .map(|existing| existing.id.0 + 1)
            .max()
            .unwrap_or(0);
        object.id = ObjectId(next);
        guard.push(object);
        ObjectId(next)
    }

    /// Replaces the stored objects with a new snapshot.
    pub fn replace_objects(&self, objects: Vec<SceneObject>) {
        *self.objects.write() = objects;
    }

    /// Returns a snapshot of all stored objects.
    pub fn all_objects(&self) -> Vec<SceneObject> {
        self.objects.read().clone()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Returns a clone of the requested object.
    pub fn get(&self, name: &str) -> Option<SceneObject> {
        self.objects
            .read()
            .iter()
            .find(|object| object.name == name)
            .cloned()
    }

    pub fn get_by_id(&self, id: ObjectId) -> Option<SceneObject> {
        self.objects
            .read()
            .iter()
            .find(|object| object.id == id)
            .cloned()
    }

    pub fn name_of(&self, id: ObjectId) -> Option<String> {
        self.objects
            .read()
            .iter()
            .find(|object| object.id == id)
            .map(|object| object.name.clone())
    }

    /// Applies a mutation to the requested object.
    pub fn update<F, R>(&self, name: &str, mut updater: F) -> Option<R>
    where
        F: FnMut(&mut SceneObject) -> R,
    {
        let mut guard = self.objects.write();
        let object = guard.iter_mut().find(|object| object.name == name)?;
        Some(updater(object))
    }

    pub fn update_by_id<F, R>(&self, id: ObjectId, mut updater: F) -> Option<R>
    where
        F: FnMut(&mut SceneObject) -> R,
    {
        let mut guard = self.objects.write();
        let object = guard.iter_mut().find(|object| object.id == id)?;
        Some(updater(object))
    }

    pub fn set_position(&self, name: &str, position: Vec3) -> bool {
        self.update(name, |obj| obj.position = position).is_some()
    }

    pub fn set_rotation(&self, name: &str, rotation: Quat) -> bool {
        self.update(name, |obj| obj.rotation = rotation).is_some()
    }

    pub fn set_center(&self, name: &str, center: Option<Vec3>) -> bool {
        self.update(name, |obj| obj.center = center).is_some()
    }

    pub fn set_size(&self, name: &str, size: Vec3) -> bool {
        self.update(name, |obj| obj.size = size).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneObject;

    fn make_object(id: u32, name: &str) -> SceneObject {
        SceneObject::new(ObjectId(id), name)
    }

    #[test]
    fn replace_and_get_object() {
        let model = DataModel::from_objects(vec![make_object(0, "Cube")]);
        assert!(model.get("Cube").is_some());
        model.replace_objects(vec![make_object(0, "Sphere")]);
        assert!(model.get("Cube").is_none());
        assert!(model.get("Sphere").is_some());
    }

    #[test]
    fn insert_assigns_fresh_ids() {
        let model = DataModel::from_objects(vec![make_object(4, "Cube")]);
        let id = model.insert(make_object(0, "Ball"));
        assert_eq!(id, ObjectId(5));
        assert_eq!(model.name_of(id).as_deref(), Some("Ball"));
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn update_by_id_modifies_object() {
        let model = DataModel::from_objects(vec![make_object(2, "Crate")]);
        let moved = model.update_by_id(ObjectId(2), |obj| obj.position = Vec3::Y);
        assert!(moved.is_some());
        assert_eq!(model.get_by_id(ObjectId(2)).unwrap().position, Vec3::Y);
    }

    #[test]
    fn update_returns_false_for_missing_object() {
        let model = DataModel::new();
        assert!(!model.set_position("Unknown", Vec3::ONE));
        assert!(model.update_by_id(ObjectId(9), |_| ()).is_none());
    }
}
