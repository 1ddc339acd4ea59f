use glam::Vec3;

use crate::data_model::DataModel;
use crate::scene::ObjectId;

/// Penetrating contact between two bodies, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub a: Vec3,
    pub b: Vec3,
    /// Signed separation, always negative for reported points.
    pub distance: f32,
}

/// Contact manifold between two bodies of a hit test's target set.
///
/// The order of `a` and `b` is whatever the engine reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub a: ObjectId,
    pub b: ObjectId,
    /// Only gathered when the hit test asks for points.
    pub points: Option<Vec<ContactPoint>>,
}

impl Hit {
    pub fn involves(&self, id: ObjectId) -> bool {
        self.a == id || self.b == id
    }

    /// The other participant, if `id` is part of this hit.
    pub fn other(&self, id: ObjectId) -> Option<ObjectId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Records every hit on both participants' `hits` lists.
pub fn annotate_hits(model: &DataModel, hits: &[Hit]) {
    for hit in hits {
        for (id, other) in [(hit.a, hit.b), (hit.b, hit.a)] {
            model.update_by_id(id, |object| {
                if !object.hits.contains(&other) {
                    object.hits.push(other);
                }
            });
        }
    }
}
