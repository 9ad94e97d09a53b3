//! Orthographic and perspective cameras for a right-handed, Z-up frame.
//!
//! Both cameras map camera-local coordinates into a symmetric normalized
//! cube. Depth runs along axis 1 in this convention: axis 0 is horizontal,
//! axis 2 is vertical, and the camera looks down +Y. The projection
//! matrices and their inverses are derived once at construction; changing
//! a view-volume parameter means constructing a new camera.

use nalgebra::{Matrix4, Point3, Vector3};
use thiserror::Error;

use crate::transform::Transform;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ProjectionError {
    /// The inverse perspective divide has no solution at this depth.
    #[error("inverse projection is undefined at screen depth {depth} (near {near}, far {far})")]
    SingularDepth { depth: f32, near: f32, far: f32 },
}

/// Orthographic view matrix for the (left, right, bottom, top, near, far)
/// volume. Axis 1 carries depth, so near/far land on row 1 and the
/// vertical bounds on row 2.
fn ortho_matrix(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Matrix4<f32> {
    Matrix4::new(
        2.0 / (right - left), 0.0, 0.0, -((right + left) / (right - left)),
        0.0, 2.0 / (far - near), 0.0, -((far + near) / (far - near)),
        0.0, 0.0, 2.0 / (top - bottom), -((top + bottom) / (top - bottom)),
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Analytic inverse of a diagonal-plus-translation matrix: reciprocal
/// scales, translation negated and rescaled. No general inversion needed.
fn inverse_ortho_matrix(m: &Matrix4<f32>) -> Matrix4<f32> {
    let sx = 1.0 / m[(0, 0)];
    let sy = 1.0 / m[(1, 1)];
    let sz = 1.0 / m[(2, 2)];
    Matrix4::new(
        sx, 0.0, 0.0, -sx * m[(0, 3)],
        0.0, sy, 0.0, -sy * m[(1, 3)],
        0.0, 0.0, sz, -sz * m[(2, 3)],
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Camera with a parallel projection: no foreshortening.
#[derive(Debug, Clone)]
pub struct OrthoCamera {
    pub transform: Transform,
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
    ortho: Matrix4<f32>,
    inverse_ortho: Matrix4<f32>,
}

impl OrthoCamera {
    pub fn new(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        debug_assert!(left != right, "degenerate view volume: left == right");
        debug_assert!(bottom != top, "degenerate view volume: bottom == top");
        debug_assert!(near != far, "degenerate view volume: near == far");

        let ortho = ortho_matrix(left, right, bottom, top, near, far);
        let inverse_ortho = inverse_ortho_matrix(&ortho);
        Self {
            transform: Transform::identity(),
            left,
            right,
            bottom,
            top,
            near,
            far,
            ortho,
            inverse_ortho,
        }
    }

    /// Width-to-height ratio of the view volume.
    pub fn ratio(&self) -> f32 {
        (self.right - self.left).abs() / (self.top - self.bottom).abs()
    }

    /// Project a world-space point into normalized screen space.
    pub fn project_point(&self, p_world: &Point3<f32>) -> Point3<f32> {
        let p_camera = self.transform.apply_inverse_to_point(p_world);
        let p_screen = self.ortho * p_camera.to_homogeneous();
        Point3::new(p_screen.x, p_screen.y, p_screen.z)
    }

    /// Map a normalized screen-space point back to world space.
    pub fn inverse_project_point(&self, p_screen: &Point3<f32>) -> Point3<f32> {
        let p_camera = self.inverse_ortho * p_screen.to_homogeneous();
        self.transform
            .apply_to_point(&Point3::new(p_camera.x, p_camera.y, p_camera.z))
    }
}

/// Camera adding a perspective transform on top of the orthographic frame.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    ortho: OrthoCamera,
    persp: Matrix4<f32>,
    inverse_persp: Matrix4<f32>,
}

impl PerspectiveCamera {
    pub fn new(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        debug_assert!(near != 0.0 && far != 0.0, "near and far must be non-zero");

        // After the perspective divide, the homogeneous component of a
        // transformed point equals its camera-local depth coordinate.
        let persp = Matrix4::new(
            near, 0.0, 0.0, 0.0,
            0.0, near + far, 0.0, -(far * near),
            0.0, 0.0, near, 0.0,
            0.0, 1.0, 0.0, 0.0,
        );
        let inverse_persp = Matrix4::new(
            1.0 / near, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
            0.0, 0.0, 1.0 / near, 0.0,
            0.0, -1.0 / (far * near), 0.0, (near + far) / (far * near),
        );
        Self {
            ortho: OrthoCamera::new(left, right, bottom, top, near, far),
            persp,
            inverse_persp,
        }
    }

    /// Derive the view-volume bounds from a field-of-view angle (radians),
    /// the near plane and the height-to-width ratio of the target surface.
    pub fn from_fov(fov: f32, near: f32, far: f32, ratio: f32) -> Self {
        let half_width = (fov / 2.0).tan() * near.abs();
        let left = half_width;
        let right = -left;
        let top = ratio * left;
        let bottom = -top;
        Self::new(left, right, bottom, top, near, far)
    }

    pub fn transform(&self) -> &Transform {
        &self.ortho.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.ortho.transform
    }

    pub fn ratio(&self) -> f32 {
        self.ortho.ratio()
    }

    /// Project a world-space point into normalized screen space, with the
    /// perspective divide in between. A point at zero camera-local depth
    /// divides by zero and yields non-finite components.
    pub fn project_point(&self, p_world: &Point3<f32>) -> Point3<f32> {
        let p_camera = self.ortho.transform.apply_inverse_to_point(p_world);
        let mut h = self.persp * p_camera.to_homogeneous();
        let w = h.w;
        h /= w;
        let p_screen = self.ortho.ortho * h;
        Point3::new(p_screen.x, p_screen.y, p_screen.z)
    }

    /// Map a normalized screen-space point back to world space by undoing
    /// the perspective divide algebraically.
    pub fn inverse_project_point(
        &self,
        p_screen: &Point3<f32>,
    ) -> Result<Point3<f32>, ProjectionError> {
        let h = self.ortho.inverse_ortho * p_screen.to_homogeneous();

        let near = self.ortho.near;
        let far = self.ortho.far;
        let denom = near + far - h.y;
        if denom == 0.0 {
            return Err(ProjectionError::SingularDepth {
                depth: h.y,
                near,
                far,
            });
        }
        let depth = (far * near) / denom;

        let p_camera = self.inverse_persp * (h * depth);
        Ok(self
            .ortho
            .transform
            .apply_to_point(&Point3::new(p_camera.x, p_camera.y, p_camera.z)))
    }
}

/// The closed set of camera kinds. Both expose the same projection
/// capability; the renderer never needs to know which one it holds.
#[derive(Debug, Clone)]
pub enum Camera {
    Orthographic(OrthoCamera),
    Perspective(PerspectiveCamera),
}

impl Camera {
    pub fn ratio(&self) -> f32 {
        match self {
            Camera::Orthographic(camera) => camera.ratio(),
            Camera::Perspective(camera) => camera.ratio(),
        }
    }

    pub fn project_point(&self, p_world: &Point3<f32>) -> Point3<f32> {
        match self {
            Camera::Orthographic(camera) => camera.project_point(p_world),
            Camera::Perspective(camera) => camera.project_point(p_world),
        }
    }

    pub fn inverse_project_point(
        &self,
        p_screen: &Point3<f32>,
    ) -> Result<Point3<f32>, ProjectionError> {
        match self {
            Camera::Orthographic(camera) => Ok(camera.inverse_project_point(p_screen)),
            Camera::Perspective(camera) => camera.inverse_project_point(p_screen),
        }
    }

    pub fn transform(&self) -> &Transform {
        match self {
            Camera::Orthographic(camera) => &camera.transform,
            Camera::Perspective(camera) => camera.transform(),
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            Camera::Orthographic(camera) => &mut camera.transform,
            Camera::Perspective(camera) => camera.transform_mut(),
        }
    }

    /// The camera's forward direction in world space. Forward is +Y in
    /// camera-local space in this convention.
    pub fn forward(&self) -> Vector3<f32> {
        self.transform().apply_to_normal(&Vector3::y())
    }
}

impl From<OrthoCamera> for Camera {
    fn from(camera: OrthoCamera) -> Self {
        Camera::Orthographic(camera)
    }
}

impl From<PerspectiveCamera> for Camera {
    fn from(camera: PerspectiveCamera) -> Self {
        Camera::Perspective(camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_symmetric_camera_ratio_is_one() {
        let camera = OrthoCamera::new(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        assert_eq!(camera.ratio(), 1.0);
    }

    #[test]
    fn test_symmetric_ortho_projection_is_identity() {
        let camera = OrthoCamera::new(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        let p = Point3::new(0.25, -0.5, 0.75);
        let projected = camera.project_point(&p);
        assert!((projected - p).norm() < 1e-6);
    }

    #[test]
    fn test_ortho_round_trip() {
        let mut camera = OrthoCamera::new(-4.0, 2.0, -1.5, 3.0, 1.0, 9.0);
        camera.transform.set_rotation(0.3, -0.2, 0.9);
        camera.transform.set_translation(Vector3::new(1.0, -2.0, 0.5));

        let p = Point3::new(-1.2, 4.0, 2.1);
        let round_trip = camera.inverse_project_point(&camera.project_point(&p));
        assert!((round_trip - p).norm() < 1e-4);
    }

    #[test]
    fn test_perspective_round_trip() {
        let mut camera = PerspectiveCamera::from_fov(std::f32::consts::FRAC_PI_2, 1.0, 10.0, 1.0);
        camera.transform_mut().set_rotation(0.0, 0.4, -0.3);
        camera
            .transform_mut()
            .set_translation(Vector3::new(0.5, -1.0, 2.0));

        let p = Point3::new(0.8, 4.0, -0.6);
        let projected = camera.project_point(&p);
        let round_trip = camera.inverse_project_point(&projected).unwrap();
        assert!((round_trip - p).norm() < 1e-4);
    }

    #[test]
    fn test_from_fov_bounds() {
        let camera = PerspectiveCamera::from_fov(std::f32::consts::FRAC_PI_2, 1.0, 10.0, 1.0);
        // tan(45 degrees) * |near| = 1, so the volume is the unit square.
        assert!((camera.ortho.left - 1.0).abs() < 1e-6);
        assert!((camera.ortho.right + 1.0).abs() < 1e-6);
        assert!((camera.ortho.top - 1.0).abs() < 1e-6);
        assert!((camera.ortho.bottom + 1.0).abs() < 1e-6);
        assert_eq!(camera.ratio(), 1.0);
    }

    #[test]
    fn test_from_fov_ratio_tracks_surface() {
        // A surface twice as wide as tall has a height-to-width ratio of
        // 0.5, and the camera's width-to-height ratio must come out as 2.
        let camera = PerspectiveCamera::from_fov(std::f32::consts::FRAC_PI_3, 1.0, 10.0, 0.5);
        assert!((camera.ratio() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_perspective_inverse_singular_depth() {
        let camera = PerspectiveCamera::new(-1.0, 1.0, -1.0, 1.0, 1.0, 2.0);
        // The inverse orthographic map sends this point to camera depth
        // near + far, where the depth recovery divides by zero.
        let singular = Point3::new(0.0, 3.0, 0.0);
        let result = camera.inverse_project_point(&singular);
        assert!(matches!(
            result,
            Err(ProjectionError::SingularDepth { .. })
        ));
    }

    #[test]
    fn test_perspective_foreshortening() {
        let camera = PerspectiveCamera::from_fov(std::f32::consts::FRAC_PI_2, 1.0, 100.0, 1.0);
        // The same lateral offset shrinks on screen as depth grows.
        let close = camera.project_point(&Point3::new(1.0, 2.0, 0.0));
        let distant = camera.project_point(&Point3::new(1.0, 20.0, 0.0));
        assert!(distant.x.abs() < close.x.abs());
    }

    #[test]
    fn test_camera_enum_delegates() {
        let camera = Camera::from(OrthoCamera::new(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0));
        let p = Point3::new(0.1, 0.2, 0.3);
        let projected = camera.project_point(&p);
        let round_trip = camera.inverse_project_point(&projected).unwrap();
        assert!((round_trip - p).norm() < 1e-6);
        assert_eq!(camera.forward(), Vector3::y());
    }
}
