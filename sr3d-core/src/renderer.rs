//! Barycentric scanning rasterizer.
//!
//! Projects every mesh vertex through the camera, culls faces pointing
//! away from the camera forward axis, and fills the remaining triangles
//! into an RGB buffer. Rasterization works on screen-space axes 0 and 2;
//! axis 1 carries depth and plays no part in the fill.

use log::debug;
use nalgebra::Point3;
use thiserror::Error;

use crate::camera::Camera;
use crate::geometry::Mesh;
use crate::screen::{FrameBuffer, Rgb, Screen, ScreenError};

/// Maximum allowed difference between the camera and surface aspect
/// ratios before a render is refused.
pub const RATIO_TOLERANCE: f32 = 0.001;

const FILL_COLOR: Rgb = [0, 0, 0];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("screen and camera are not the same ratio (screen {screen}, camera {camera})")]
    RatioMismatch { screen: f32, camera: f32 },
    #[error(transparent)]
    Screen(#[from] ScreenError),
}

/// 2D barycentric coordinates of `p` against the triangle (v0, v1, v2),
/// evaluated on the x and z axes only.
///
/// A triangle that is degenerate in the rasterization plane yields the
/// sentinel `(-1, -1, -1)`, which no containment test accepts.
pub fn barycentric_coordinates_2d(
    v0: &Point3<f32>,
    v1: &Point3<f32>,
    v2: &Point3<f32>,
    p: &Point3<f32>,
) -> (f32, f32, f32) {
    let numerator = (v0.z - v1.z) * p.x + (v1.x - v0.x) * p.z + v0.x * v1.z - v1.x * v0.z;
    let denominator = (v0.z - v1.z) * v2.x + (v1.x - v0.x) * v2.z + v0.x * v1.z - v1.x * v0.z;
    if denominator == 0.0 {
        return (-1.0, -1.0, -1.0);
    }
    let gamma = numerator / denominator;

    let numerator = (v0.z - v2.z) * p.x + (v2.x - v0.x) * p.z + v0.x * v2.z - v2.x * v0.z;
    let denominator = (v0.z - v2.z) * v1.x + (v2.x - v0.x) * v1.z + v0.x * v2.z - v2.x * v0.z;
    if denominator == 0.0 {
        return (-1.0, -1.0, -1.0);
    }
    let beta = numerator / denominator;

    let alpha = 1.0 - beta - gamma;

    (alpha, beta, gamma)
}

/// Turns a mesh plus a camera into filled pixels on a [`Screen`].
pub struct Renderer<'a> {
    camera: &'a Camera,
    mesh: &'a Mesh,
}

impl<'a> Renderer<'a> {
    pub fn new(camera: &'a Camera, mesh: &'a Mesh) -> Self {
        Self { camera, mesh }
    }

    /// Render the mesh as a flat silhouette over `bg_color` and hand the
    /// finished buffer to the screen.
    ///
    /// Refuses to touch any pixel when the camera and screen aspect
    /// ratios disagree beyond [`RATIO_TOLERANCE`].
    pub fn render<S: Screen>(&self, screen: &mut S, bg_color: Rgb) -> Result<(), RenderError> {
        let screen_ratio = screen.ratio();
        let camera_ratio = self.camera.ratio();
        if (screen_ratio - camera_ratio).abs() > RATIO_TOLERANCE {
            return Err(RenderError::RatioMismatch {
                screen: screen_ratio,
                camera: camera_ratio,
            });
        }

        let mut buffer = FrameBuffer::filled(screen.width(), screen.height(), bg_color);

        // Every vertex once: mesh-local -> world -> normalized screen.
        let verts: Vec<Point3<f32>> = self
            .mesh
            .verts
            .iter()
            .map(|p| self.camera.project_point(&self.mesh.transform.apply_to_point(p)))
            .collect();

        let camera_forward = self.camera.forward();

        let width = screen.width() as i32;
        let height = screen.height() as i32;
        let mut culled = 0;

        for (i, face) in self.mesh.faces.iter().enumerate() {
            // Skip faces pointing away from the camera forward axis. The
            // normal lookup is by face index; directions transform without
            // the translation component.
            let normal = self.mesh.transform.apply_to_normal(&self.mesh.normals[i]);
            if normal.dot(&camera_forward) < 0.0 {
                culled += 1;
                continue;
            }

            let v0 = verts[face[0]];
            let v1 = verts[face[1]];
            let v2 = verts[face[2]];

            // Screen-space bounds over the two rasterization axes.
            let min_x = v0.x.min(v1.x).min(v2.x);
            let max_x = v0.x.max(v1.x).max(v2.x);
            let min_z = v0.z.min(v1.z).min(v2.z);
            let max_z = v0.z.max(v1.z).max(v2.z);

            let (x_min, y_min) = screen.screen_to_pixel(min_x, min_z);
            let (x_max, y_max) = screen.screen_to_pixel(max_x, max_z);

            // Every pixel in the box, clamped to the surface.
            for x in x_min.max(0)..(x_max + 1).min(width) {
                for y in y_min.max(0)..(y_max + 1).min(height) {
                    let p = screen.pixel_to_screen(x as usize, y as usize);
                    let (alpha, beta, gamma) = barycentric_coordinates_2d(&v0, &v1, &v2, &p);
                    if (0.0..=1.0).contains(&alpha)
                        && (0.0..=1.0).contains(&beta)
                        && (0.0..=1.0).contains(&gamma)
                    {
                        buffer.set(x as usize, y as usize, FILL_COLOR);
                    }
                }
            }
        }

        debug!(
            "rendered {} faces ({} culled) from {} vertices",
            self.mesh.faces.len() - culled,
            culled,
            verts.len()
        );

        screen.draw(&buffer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrthoCamera;
    use nalgebra::Vector3;

    const WHITE: Rgb = [255, 255, 255];
    const BLACK: Rgb = [0, 0, 0];

    /// Screen that records the buffer handed to `draw`.
    struct TestScreen {
        width: usize,
        height: usize,
        drawn: Option<FrameBuffer>,
    }

    impl TestScreen {
        fn new(width: usize, height: usize) -> Self {
            Self {
                width,
                height,
                drawn: None,
            }
        }
    }

    impl Screen for TestScreen {
        fn width(&self) -> usize {
            self.width
        }

        fn height(&self) -> usize {
            self.height
        }

        fn draw(&mut self, buffer: &FrameBuffer) -> Result<(), ScreenError> {
            if buffer.width() != self.width || buffer.height() != self.height {
                return Err(ScreenError::DimensionMismatch {
                    buffer_width: buffer.width(),
                    buffer_height: buffer.height(),
                    screen_width: self.width,
                    screen_height: self.height,
                });
            }
            self.drawn = Some(buffer.clone());
            Ok(())
        }
    }

    /// Camera whose projection is the identity on the unit cube, so world
    /// coordinates read directly as normalized screen coordinates.
    fn identity_camera() -> Camera {
        Camera::from(OrthoCamera::new(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0))
    }

    /// One triangle whose corners sit on the centers of the given pixels
    /// of a 64x64 surface.
    fn pixel_triangle(screen: &TestScreen, corners: [(usize, usize); 3], normal: Vector3<f32>) -> Mesh {
        let mut mesh = Mesh::new();
        for (px, py) in corners {
            let p = screen.pixel_to_screen(px, py);
            mesh.add_vert(Point3::new(p.x, 0.0, p.z));
        }
        mesh.add_face([0, 1, 2], normal);
        mesh
    }

    #[test]
    fn test_barycentric_interior_point() {
        let v0 = Point3::new(0.0, 0.0, 0.0);
        let v1 = Point3::new(1.0, 0.0, 0.0);
        let v2 = Point3::new(0.0, 0.0, 1.0);
        let p = Point3::new(0.25, 0.0, 0.25);

        let (alpha, beta, gamma) = barycentric_coordinates_2d(&v0, &v1, &v2, &p);
        assert!((alpha - 0.5).abs() < 1e-6);
        assert!((beta - 0.25).abs() < 1e-6);
        assert!((gamma - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_barycentric_vertex() {
        let v0 = Point3::new(0.0, 0.0, 0.0);
        let v1 = Point3::new(1.0, 0.0, 0.0);
        let v2 = Point3::new(0.0, 0.0, 1.0);

        let (alpha, beta, gamma) = barycentric_coordinates_2d(&v0, &v1, &v2, &v0);
        assert!((alpha - 1.0).abs() < 1e-6);
        assert!(beta.abs() < 1e-6);
        assert!(gamma.abs() < 1e-6);
    }

    #[test]
    fn test_barycentric_outside_point() {
        let v0 = Point3::new(0.0, 0.0, 0.0);
        let v1 = Point3::new(1.0, 0.0, 0.0);
        let v2 = Point3::new(0.0, 0.0, 1.0);
        let p = Point3::new(2.0, 0.0, 2.0);

        let (alpha, _, _) = barycentric_coordinates_2d(&v0, &v1, &v2, &p);
        assert!(alpha < 0.0);
    }

    #[test]
    fn test_barycentric_colinear_sentinel() {
        let v0 = Point3::new(0.0, 0.0, 0.0);
        let v1 = Point3::new(1.0, 0.0, 0.0);
        let v2 = Point3::new(2.0, 0.0, 0.0);
        let p = Point3::new(0.5, 0.0, 0.5);

        let coords = barycentric_coordinates_2d(&v0, &v1, &v2, &p);
        assert_eq!(coords, (-1.0, -1.0, -1.0));
    }

    #[test]
    fn test_render_fills_triangle_interior() {
        let mut screen = TestScreen::new(64, 64);
        let camera = identity_camera();
        // Normal along the camera forward axis keeps the face.
        let mesh = pixel_triangle(&screen, [(10, 10), (50, 10), (30, 40)], Vector3::y());

        Renderer::new(&camera, &mesh)
            .render(&mut screen, WHITE)
            .unwrap();

        let buffer = screen.drawn.as_ref().unwrap();
        assert_eq!(buffer.get(30, 20), BLACK);
        for (x, y) in [(0, 0), (63, 0), (0, 63), (63, 63)] {
            assert_eq!(buffer.get(x, y), WHITE);
        }
    }

    #[test]
    fn test_render_culls_back_face() {
        let mut screen = TestScreen::new(64, 64);
        let camera = identity_camera();
        // Normal opposes the camera forward axis; nothing may be filled.
        let mesh = pixel_triangle(&screen, [(10, 10), (50, 10), (30, 40)], -Vector3::y());

        Renderer::new(&camera, &mesh)
            .render(&mut screen, WHITE)
            .unwrap();

        let buffer = screen.drawn.as_ref().unwrap();
        for y in 0..64 {
            for x in 0..64 {
                assert_eq!(buffer.get(x, y), WHITE);
            }
        }
    }

    #[test]
    fn test_render_degenerate_face_fills_nothing() {
        let mut screen = TestScreen::new(64, 64);
        let camera = identity_camera();
        // All three corners on one scanline: degenerate in the
        // rasterization plane.
        let mesh = pixel_triangle(&screen, [(10, 10), (30, 10), (50, 10)], Vector3::y());

        Renderer::new(&camera, &mesh)
            .render(&mut screen, WHITE)
            .unwrap();

        let buffer = screen.drawn.as_ref().unwrap();
        for y in 0..64 {
            for x in 0..64 {
                assert_eq!(buffer.get(x, y), WHITE);
            }
        }
    }

    #[test]
    fn test_render_refuses_ratio_mismatch() {
        let mut screen = TestScreen::new(64, 64);
        let camera = Camera::from(OrthoCamera::new(-2.0, 2.0, -1.0, 1.0, -1.0, 1.0));
        let mesh = Mesh::cube(1.0);

        let result = Renderer::new(&camera, &mesh).render(&mut screen, WHITE);
        assert!(matches!(result, Err(RenderError::RatioMismatch { .. })));
        // The screen must not have been drawn to at all.
        assert!(screen.drawn.is_none());
    }

    #[test]
    fn test_render_clamps_offscreen_bounds() {
        let mut screen = TestScreen::new(32, 32);
        let camera = identity_camera();
        // Triangle far larger than the surface; the fill must stay inside
        // the buffer and cover the whole of it.
        let mut mesh = Mesh::new();
        mesh.add_vert(Point3::new(-3.0, 0.0, -3.0));
        mesh.add_vert(Point3::new(3.0, 0.0, -3.0));
        mesh.add_vert(Point3::new(0.0, 0.0, 4.0));
        mesh.add_face([0, 1, 2], Vector3::y());

        Renderer::new(&camera, &mesh)
            .render(&mut screen, WHITE)
            .unwrap();

        let buffer = screen.drawn.as_ref().unwrap();
        assert_eq!(buffer.get(16, 16), BLACK);
    }
}
