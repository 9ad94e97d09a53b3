//! Affine pose mapping a local frame into its parent frame.

use nalgebra::{Point3, Rotation3, Vector3};

/// Rotation plus translation. The rotation is orthonormal by construction,
/// so the inverse mapping is always defined.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    rotation: Rotation3<f32>,
    translation: Vector3<f32>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            rotation: Rotation3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn new(rotation: Rotation3<f32>, translation: Vector3<f32>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn rotation(&self) -> &Rotation3<f32> {
        &self.rotation
    }

    pub fn translation(&self) -> Vector3<f32> {
        self.translation
    }

    /// Set the rotation from Euler angles in radians, applied in Z, Y, X order.
    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Rotation3::from_euler_angles(x, y, z);
    }

    /// Compose an additional rotation by delta Euler angles (in radians).
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation = Rotation3::from_euler_angles(dx, dy, dz) * self.rotation;
    }

    pub fn set_translation(&mut self, translation: Vector3<f32>) {
        self.translation = translation;
    }

    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.translation += delta;
    }

    /// Map a point from the local frame to the parent frame.
    pub fn apply_to_point(&self, p: &Point3<f32>) -> Point3<f32> {
        self.rotation * p + self.translation
    }

    /// Map a point from the parent frame back to the local frame.
    pub fn apply_inverse_to_point(&self, p: &Point3<f32>) -> Point3<f32> {
        self.rotation.inverse() * (p - self.translation)
    }

    /// Map a direction from the local frame to the parent frame.
    /// Directions ignore the translation component.
    pub fn apply_to_normal(&self, n: &Vector3<f32>) -> Vector3<f32> {
        self.rotation * n
    }

    /// Map a direction from the parent frame back to the local frame.
    pub fn apply_inverse_to_normal(&self, n: &Vector3<f32>) -> Vector3<f32> {
        self.rotation.inverse() * n
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
