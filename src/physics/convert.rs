use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude::*;

pub(crate) fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

pub(crate) fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

pub(crate) fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub(crate) fn from_point(p: &Point<Real>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

pub(crate) fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    let rotation = UnitQuaternion::from_quaternion(Quaternion::new(
        rotation.w, rotation.x, rotation.y, rotation.z,
    ));
    Isometry::from_parts(Translation::from(to_vector(position)), rotation)
}

pub(crate) fn from_isometry(iso: &Isometry<Real>) -> (Vec3, Quat) {
    let rotation = iso.rotation;
    (
        from_vector(&iso.translation.vector),
        Quat::from_xyzw(rotation.i, rotation.j, rotation.k, rotation.w),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isometry_conversion_preserves_pose() {
        let position = Vec3::new(1.0, -2.0, 3.5);
        let rotation = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.3);
        let (back_position, back_rotation) = from_isometry(&to_isometry(position, rotation));
        assert!((back_position - position).length() < 1e-6);
        assert!(back_rotation.dot(rotation).abs() > 1.0 - 1e-6);
    }
}
