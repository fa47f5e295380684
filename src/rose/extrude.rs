//! Extrusion of a flat outline into a closed solid with optional bevel.
//!
//! Ring layout along +Z: front bevel rings, body rings, back bevel rings.
//! Side walls share ring vertices so they shade smoothly; the two caps get
//! their own vertices and are triangulated with lyon's fill tessellator.

use glam::{Vec2, Vec3};
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};

use crate::error::MeshError;
use crate::rose::mesh::TriangleMesh;
use crate::rose::shape::signed_area;

/// Upper bound for the miter length at sharp outline corners.
const MAX_MITER: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bevel {
    pub thickness: f32,
    pub size: f32,
    pub segments: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtrudeSettings {
    pub depth: f32,
    pub bevel: Option<Bevel>,
}

impl ExtrudeSettings {
    pub const PETAL: Self = Self {
        depth: 0.02,
        bevel: Some(Bevel {
            thickness: 0.01,
            size: 0.01,
            segments: 3,
        }),
    };

    pub const SEPAL: Self = Self {
        depth: 0.02,
        bevel: None,
    };

    /// (z, outward offset) for every ring, front to back.
    fn rings(&self) -> Vec<(f32, f32)> {
        match self.bevel {
            Some(bevel) => {
                let segments = bevel.segments.max(1);
                let mut rings = Vec::with_capacity(segments as usize * 2 + 2);

                for b in 0..segments {
                    let t = b as f32 / segments as f32 * std::f32::consts::FRAC_PI_2;
                    rings.push((-bevel.thickness * t.cos(), bevel.size * t.sin()));
                }
                rings.push((0.0, bevel.size));
                rings.push((self.depth, bevel.size));
                for b in (0..segments).rev() {
                    let t = b as f32 / segments as f32 * std::f32::consts::FRAC_PI_2;
                    rings.push((self.depth + bevel.thickness * t.cos(), bevel.size * t.sin()));
                }

                rings
            }
            None => vec![(0.0, 0.0), (self.depth, 0.0)],
        }
    }
}

pub fn extrude(outline: &[Vec2], settings: &ExtrudeSettings) -> Result<TriangleMesh, MeshError> {
    if outline.len() < 3 {
        return Err(MeshError::DegenerateOutline(outline.len()));
    }

    let mut contour = outline.to_vec();
    if signed_area(&contour) < 0.0 {
        contour.reverse();
    }

    let n = contour.len();
    let offsets = miter_offsets(&contour);
    let rings = settings.rings();
    let cap = triangulate(&contour)?;

    let mut mesh = TriangleMesh::with_capacity(
        n * rings.len() + cap.vertices.len() * 2,
        n * (rings.len() - 1) * 6 + cap.indices.len() * 2,
    );

    for &(z, offset) in &rings {
        for (p, dir) in contour.iter().zip(&offsets) {
            let q = *p + *dir * offset;
            mesh.push_vertex(Vec3::new(q.x, q.y, z), Vec3::ZERO);
        }
    }

    for r in 0..rings.len() - 1 {
        let front = (r * n) as u32;
        let back = ((r + 1) * n) as u32;
        for i in 0..n as u32 {
            let j = (i + 1) % n as u32;
            let (a, b, c, d) = (front + i, front + j, back + j, back + i);
            mesh.push_triangle(a, b, c);
            mesh.push_triangle(a, c, d);
        }
    }

    let front_z = rings[0].0;
    let back_z = rings[rings.len() - 1].0;

    // Front cap looks down -Z, so its triangles wind clockwise in XY.
    let base = mesh.vertex_count() as u32;
    for v in &cap.vertices {
        mesh.push_vertex(Vec3::new(v[0], v[1], front_z), Vec3::NEG_Z);
    }
    for tri in cap.indices.chunks_exact(3) {
        mesh.push_triangle(base + tri[0], base + tri[2], base + tri[1]);
    }

    let base = mesh.vertex_count() as u32;
    for v in &cap.vertices {
        mesh.push_vertex(Vec3::new(v[0], v[1], back_z), Vec3::Z);
    }
    for tri in cap.indices.chunks_exact(3) {
        mesh.push_triangle(base + tri[0], base + tri[1], base + tri[2]);
    }

    mesh.compute_vertex_normals();
    Ok(mesh)
}

/// Per-vertex outward offset directions, scaled so that every edge moves
/// out by the same distance.
fn miter_offsets(contour: &[Vec2]) -> Vec<Vec2> {
    let n = contour.len();

    (0..n)
        .map(|i| {
            let prev = contour[(i + n - 1) % n];
            let curr = contour[i];
            let next = contour[(i + 1) % n];

            let n_in = edge_normal(prev, curr);
            let n_out = edge_normal(curr, next);
            let bisector = (n_in + n_out).normalize_or_zero();
            if bisector == Vec2::ZERO {
                return n_out;
            }

            let cos_half = bisector.dot(n_out).max(1.0 / MAX_MITER);
            bisector / cos_half
        })
        .collect()
}

/// Right-hand normal of a counter-clockwise edge, pointing out of the shape.
fn edge_normal(a: Vec2, b: Vec2) -> Vec2 {
    let t = (b - a).normalize_or_zero();
    Vec2::new(t.y, -t.x)
}

/// Counter-clockwise triangulation of a simple polygon.
fn triangulate(contour: &[Vec2]) -> Result<VertexBuffers<[f32; 2], u32>, MeshError> {
    let mut builder = Path::builder();
    builder.begin(point(contour[0].x, contour[0].y));
    for p in &contour[1..] {
        builder.line_to(point(p.x, p.y));
    }
    builder.end(true);
    let path = builder.build();

    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();
    tessellator
        .tessellate_path(
            &path,
            &FillOptions::tolerance(1e-4),
            &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                vertex.position().to_array()
            }),
        )
        .map_err(|e| MeshError::Tessellation(format!("{e:?}")))?;

    for tri in buffers.indices.chunks_exact_mut(3) {
        let a = Vec2::from_array(buffers.vertices[tri[0] as usize]);
        let b = Vec2::from_array(buffers.vertices[tri[1] as usize]);
        let c = Vec2::from_array(buffers.vertices[tri[2] as usize]);
        if (b - a).perp_dot(c - a) < 0.0 {
            tri.swap(1, 2);
        }
    }

    Ok(buffers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rose::shape::{CURVE_SEGMENTS, ShapeCurve};

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]
    }

    fn z_range(mesh: &TriangleMesh) -> (f32, f32) {
        mesh.positions
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p[2]), hi.max(p[2])))
    }

    #[test]
    fn flat_extrusion_of_square() {
        let mesh = extrude(&square(), &ExtrudeSettings::SEPAL).unwrap();
        // 2 rings of 4 + 2 caps of 4
        assert_eq!(mesh.vertex_count(), 16);
        // 4 side quads + 2 triangles per cap
        assert_eq!(mesh.triangle_count(), 8 + 4);
        let (lo, hi) = z_range(&mesh);
        assert!(lo.abs() < 1e-6);
        assert!((hi - 0.02).abs() < 1e-6);
    }

    #[test]
    fn bevel_adds_rings_and_thickness() {
        let outline = ShapeCurve::petal(1.0).outline(CURVE_SEGMENTS);
        let mesh = extrude(&outline, &ExtrudeSettings::PETAL).unwrap();

        // 3 front bevel rings + 2 body rings + 3 back bevel rings
        let side_vertices = outline.len() * 8;
        assert!(mesh.vertex_count() > side_vertices);

        let (lo, hi) = z_range(&mesh);
        assert!((lo + 0.01).abs() < 1e-6);
        assert!((hi - 0.03).abs() < 1e-6);
    }

    #[test]
    fn bevel_widens_the_body() {
        let outline = square();
        let mesh = extrude(&outline, &ExtrudeSettings::PETAL).unwrap();
        let max_x = mesh.positions.iter().map(|p| p[0]).fold(f32::MIN, f32::max);
        assert!((max_x - 1.01).abs() < 1e-4);
    }

    #[test]
    fn caps_face_away_from_each_other() {
        let mesh = extrude(&square(), &ExtrudeSettings::SEPAL).unwrap();
        let front = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .filter(|(p, _)| p[2] == 0.0)
            .map(|(_, n)| n[2])
            .fold(0.0, |acc, z| acc + z);
        let back = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .filter(|(p, _)| (p[2] - 0.02).abs() < 1e-6)
            .map(|(_, n)| n[2])
            .fold(0.0, |acc, z| acc + z);
        assert!(front < 0.0);
        assert!(back > 0.0);
    }

    #[test]
    fn clockwise_input_is_accepted() {
        let mut outline = square();
        outline.reverse();
        let mesh = extrude(&outline, &ExtrudeSettings::SEPAL).unwrap();
        // Side ring vertices still get outward normals.
        for (p, n) in mesh.positions.iter().zip(&mesh.normals).take(8) {
            assert!((p[0] - 0.5) * n[0] > 0.0);
            assert!((p[1] - 0.5) * n[1] > 0.0);
        }
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn degenerate_outline_is_rejected() {
        let err = extrude(&[Vec2::ZERO, Vec2::X], &ExtrudeSettings::SEPAL).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateOutline(2)));
    }
}
