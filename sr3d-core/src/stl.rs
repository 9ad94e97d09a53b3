//! STL mesh loading, binary and ASCII.
//!
//! STL stores a normal and three corner positions per facet. Loading
//! deduplicates corner positions by exact bit pattern, so shared corners
//! become shared vertex indices and each facet contributes one face plus
//! one entry in the parallel normals sequence.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::float,
    sequence::preceded,
    IResult,
};
use thiserror::Error;

use crate::geometry::{face_normal, Mesh};

#[derive(Debug, Error)]
pub enum StlError {
    #[error("file too small to be a valid STL")]
    TooSmall,
    #[error("unexpected end of file")]
    UnexpectedEof,
    #[error("failed to parse ASCII STL: {0}")]
    Ascii(String),
}

/// Accumulates facets into an indexed mesh, deduplicating vertices.
struct MeshBuilder {
    mesh: Mesh,
    seen: HashMap<[u32; 3], usize>,
}

impl MeshBuilder {
    fn with_capacity(facets: usize) -> Self {
        Self {
            mesh: Mesh::with_capacity(facets * 3, facets),
            seen: HashMap::new(),
        }
    }

    fn vert_index(&mut self, p: Point3<f32>) -> usize {
        let key = [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
        match self.seen.get(&key) {
            Some(&index) => index,
            None => {
                let index = self.mesh.add_vert(p);
                self.seen.insert(key, index);
                index
            }
        }
    }

    fn add_facet(&mut self, corners: [Point3<f32>; 3], normal: Vector3<f32>) {
        // Some exporters write zero normals; recover them from the
        // winding.
        let normal = if normal == Vector3::zeros() {
            face_normal(&corners[0], &corners[1], &corners[2])
        } else {
            normal
        };
        let face = [
            self.vert_index(corners[0]),
            self.vert_index(corners[1]),
            self.vert_index(corners[2]),
        ];
        self.mesh.add_face(face, normal);
    }

    fn finish(self) -> Mesh {
        self.mesh
    }
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Parse a binary STL file.
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, StlError> {
    if data.len() < 84 {
        return Err(StlError::TooSmall);
    }

    // Skip the 80-byte header.
    let data = &data[80..];

    // Triangle count, little-endian.
    let facet_count = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

    let mut builder = MeshBuilder::with_capacity(facet_count);
    let mut offset = 4;

    for _ in 0..facet_count {
        if offset + 50 > data.len() {
            return Err(StlError::UnexpectedEof);
        }

        let normal = Vector3::new(
            read_f32(data, offset),
            read_f32(data, offset + 4),
            read_f32(data, offset + 8),
        );
        offset += 12;

        let mut corners = [Point3::origin(); 3];
        for corner in &mut corners {
            *corner = Point3::new(
                read_f32(data, offset),
                read_f32(data, offset + 4),
                read_f32(data, offset + 8),
            );
            offset += 12;
        }

        // Skip the attribute byte count.
        offset += 2;

        builder.add_facet(corners, normal);
    }

    Ok(builder.finish())
}

/// Parse an ASCII STL file.
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, StlError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(e) => Err(StlError::Ascii(format!("{e:?}"))),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    // Optional solid name, rest of the line.
    let (input, _) = not_line_ending(input)?;
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;

    let mut builder = MeshBuilder::with_capacity(facets.len());
    for (corners, normal) in facets {
        builder.add_facet(corners, normal);
    }

    Ok((input, builder.finish()))
}

fn parse_facet(input: &str) -> IResult<&str, ([Point3<f32>; 3], Vector3<f32>)> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, (nx, ny, nz)) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v0) = parse_vertex(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, ([v0, v1, v2], Vector3::new(nx, ny, nz))))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, (x, y, z)) = parse_vector3(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}

/// Detect the format and parse either kind of STL file.
pub fn parse_stl(data: &[u8]) -> Result<Mesh, StlError> {
    if data.len() > 5 && &data[0..5] == b"solid" {
        // Might be ASCII; binary files can also start with "solid".
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }

    parse_binary_stl(data)
}
