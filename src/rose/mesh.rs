use glam::{Mat3, Mat4, Vec3};

#[derive(Clone, Debug, Default)]
pub struct TriangleMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[cfg(test)]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Area-weighted vertex normals from the current triangle winding.
    pub fn compute_vertex_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let a = Vec3::from_array(self.positions[ia]);
            let b = Vec3::from_array(self.positions[ib]);
            let c = Vec3::from_array(self.positions[ic]);

            // Unnormalized cross product: its length is twice the face area.
            let face = (b - a).cross(c - a);
            accum[ia] += face;
            accum[ib] += face;
            accum[ic] += face;
        }

        self.normals = accum
            .into_iter()
            .map(|n| n.normalize_or_zero().to_array())
            .collect();
    }

    pub fn transformed(&self, matrix: Mat4) -> TriangleMesh {
        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();

        TriangleMesh {
            positions: self
                .positions
                .iter()
                .map(|p| matrix.transform_point3(Vec3::from_array(*p)).to_array())
                .collect(),
            normals: self
                .normals
                .iter()
                .map(|n| {
                    (normal_matrix * Vec3::from_array(*n))
                        .normalize_or_zero()
                        .to_array()
                })
                .collect(),
            indices: self.indices.clone(),
        }
    }
}

/// Capped cylinder along Y, centered on the origin, radius tapering from
/// `radius_bottom` at `-height/2` to `radius_top` at `+height/2`.
pub fn tapered_cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
) -> TriangleMesh {
    let segments = radial_segments.max(3);
    let half = height * 0.5;
    let slope = (radius_bottom - radius_top) / height;

    let ring = (segments + 1) as usize;
    let mut mesh = TriangleMesh::with_capacity(ring * 2 + ring * 2 + 2, segments as usize * 12);

    // Side wall. The seam column is duplicated so each ring is a closed strip.
    for (y, radius) in [(half, radius_top), (-half, radius_bottom)] {
        for s in 0..=segments {
            let theta = s as f32 / segments as f32 * std::f32::consts::TAU;
            let (sin, cos) = theta.sin_cos();
            let position = Vec3::new(radius * sin, y, radius * cos);
            let normal = Vec3::new(sin, slope, cos).normalize();
            mesh.push_vertex(position, normal);
        }
    }

    for s in 0..segments {
        let top_a = s;
        let top_b = s + 1;
        let bottom_a = s + segments + 1;
        let bottom_b = bottom_a + 1;
        mesh.push_triangle(top_a, bottom_a, top_b);
        mesh.push_triangle(bottom_a, bottom_b, top_b);
    }

    for (y, radius, up) in [(half, radius_top, 1.0_f32), (-half, radius_bottom, -1.0_f32)] {
        let normal = Vec3::new(0.0, up, 0.0);
        let center = mesh.push_vertex(Vec3::new(0.0, y, 0.0), normal);
        let first = mesh.vertex_count() as u32;

        for s in 0..=segments {
            let theta = s as f32 / segments as f32 * std::f32::consts::TAU;
            let (sin, cos) = theta.sin_cos();
            mesh.push_vertex(Vec3::new(radius * sin, y, radius * cos), normal);
        }

        for s in 0..segments {
            let a = first + s;
            let b = first + s + 1;
            if up > 0.0 {
                mesh.push_triangle(center, a, b);
            } else {
                mesh.push_triangle(center, b, a);
            }
        }
    }

    mesh
}
