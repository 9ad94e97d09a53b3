//! Indexed mesh data for rendering.

use nalgebra::{Point3, Vector3};

use crate::transform::Transform;

/// Face normal from the edge cross product, normalized.
pub fn face_normal(v0: &Point3<f32>, v1: &Point3<f32>, v2: &Point3<f32>) -> Vector3<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    edge1.cross(&edge2).normalize()
}

/// A triangle mesh: vertex positions, faces as vertex-index triples, and
/// one normal per face. `normals[i]` belongs to `faces[i]`; the two
/// sequences stay parallel.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub transform: Transform,
    pub verts: Vec<Point3<f32>>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Vec<Vector3<f32>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            transform: Transform::identity(),
            verts: Vec::new(),
            faces: Vec::new(),
            normals: Vec::new(),
        }
    }

    pub fn with_capacity(verts: usize, faces: usize) -> Self {
        Self {
            transform: Transform::identity(),
            verts: Vec::with_capacity(verts),
            faces: Vec::with_capacity(faces),
            normals: Vec::with_capacity(faces),
        }
    }

    /// Append a vertex and return its index.
    pub fn add_vert(&mut self, p: Point3<f32>) -> usize {
        self.verts.push(p);
        self.verts.len() - 1
    }

    /// Append a face with its normal.
    pub fn add_face(&mut self, face: [usize; 3], normal: Vector3<f32>) {
        debug_assert!(
            face.iter().all(|&i| i < self.verts.len()),
            "face references a vertex that does not exist"
        );
        self.faces.push(face);
        self.normals.push(normal);
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Axis-aligned cube centered on the origin, for demos and tests.
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(8, 12);

        for &z in &[-half, half] {
            mesh.add_vert(Point3::new(-half, -half, z));
            mesh.add_vert(Point3::new(half, -half, z));
            mesh.add_vert(Point3::new(half, half, z));
            mesh.add_vert(Point3::new(-half, half, z));
        }

        // Two triangles per side, normals pointing outward.
        let sides: [([usize; 3], [usize; 3], Vector3<f32>); 6] = [
            ([0, 1, 2], [0, 2, 3], Vector3::new(0.0, 0.0, -1.0)),
            ([4, 6, 5], [4, 7, 6], Vector3::new(0.0, 0.0, 1.0)),
            ([0, 5, 1], [0, 4, 5], Vector3::new(0.0, -1.0, 0.0)),
            ([3, 2, 6], [3, 6, 7], Vector3::new(0.0, 1.0, 0.0)),
            ([0, 3, 7], [0, 7, 4], Vector3::new(-1.0, 0.0, 0.0)),
            ([1, 6, 2], [1, 5, 6], Vector3::new(1.0, 0.0, 0.0)),
        ];
        for (a, b, normal) in sides {
            mesh.add_face(a, normal);
            mesh.add_face(b, normal);
        }

        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
