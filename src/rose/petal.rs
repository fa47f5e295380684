use crate::error::MeshError;
use crate::rose::extrude::{ExtrudeSettings, extrude};
use crate::rose::mesh::TriangleMesh;
use crate::rose::shape::{CURVE_SEGMENTS, ShapeCurve};

/// Depth offset bending a petal at normalized height `t = y / height`.
///
/// Zero at the base and at the tip, `curve_intensity` at mid-height.
#[inline]
pub fn curvature(t: f32, curve_intensity: f32) -> f32 {
    (t * std::f32::consts::PI).sin() * curve_intensity
}

/// Pushes every vertex along Z by the curvature profile and rebuilds the
/// normals from the bent surface.
pub fn bend(mesh: &mut TriangleMesh, height: f32, curve_intensity: f32) {
    for p in &mut mesh.positions {
        p[2] += curvature(p[1] / height, curve_intensity);
    }
    mesh.compute_vertex_normals();
}

pub fn petal_geometry(scale: f32, curve_intensity: f32) -> Result<TriangleMesh, MeshError> {
    let shape = ShapeCurve::petal(scale);
    let mut mesh = extrude(&shape.outline(CURVE_SEGMENTS), &ExtrudeSettings::PETAL)?;
    bend(&mut mesh, shape.height, curve_intensity);
    Ok(mesh)
}

pub fn sepal_geometry() -> Result<TriangleMesh, MeshError> {
    extrude(
        &ShapeCurve::sepal().outline(CURVE_SEGMENTS),
        &ExtrudeSettings::SEPAL,
    )
}
