//! Layered assembly of the rose: petal rings, stem and sepals, all owned by
//! one group that the animator moves as a unit.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use rand::Rng;

use crate::error::MeshError;
use crate::rose::mesh::{TriangleMesh, tapered_cylinder};
use crate::rose::petal::{petal_geometry, sepal_geometry};

pub const LAYERS_PER_PASS: u32 = 3;
pub const SEPAL_COUNT: u32 = 5;
pub const BASE_PITCH: f32 = 0.3;
pub const BASE_HEIGHT: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Linear RGB.
    pub color: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
    pub double_sided: bool,
}

impl Material {
    /// #e63971
    pub const PETAL: Self = Self::new([0.791298, 0.040915, 0.165132], 0.4, 0.1, true);
    /// #c9184a
    pub const INNER_PETAL: Self = Self::new([0.584078, 0.009134, 0.068478], 0.3, 0.1, true);
    /// #228b22
    pub const STEM: Self = Self::new([0.015996, 0.258183, 0.015996], 0.6, 0.05, false);
    /// #2d5a27
    pub const SEPAL: Self = Self::new([0.026241, 0.102242, 0.020289], 0.5, 0.05, true);

    const fn new(color: [f32; 3], roughness: f32, metalness: f32, double_sided: bool) -> Self {
        Self {
            color,
            roughness,
            metalness,
            double_sided,
        }
    }
}

/// sRGB electro-optical transfer function, `c` in [0, 1].
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// `0xRRGGBB` sRGB to linear RGB.
pub fn hex_to_linear(rgb: u32) -> [f32; 3] {
    [
        srgb_to_linear(((rgb >> 16) & 0xff) as f32 / 255.0),
        srgb_to_linear(((rgb >> 8) & 0xff) as f32 / 255.0),
        srgb_to_linear((rgb & 0xff) as f32 / 255.0),
    ]
}

/// Position, XYZ Euler rotation and scale, composed as `T * R * S`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn quat(&self) -> Quat {
        Quat::from_rotation_x(self.rotation.x)
            * Quat::from_rotation_y(self.rotation.y)
            * Quat::from_rotation_z(self.rotation.z)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    Inner,
    Outer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Part {
    Petal { pass: Pass, layer: u32 },
    Sepal,
    Stem,
}

#[derive(Clone, Debug)]
pub struct MeshInstance {
    pub part: Part,
    pub mesh: Arc<TriangleMesh>,
    pub material: Material,
    pub transform: Transform,
}

/// One concentric ring of petals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PetalLayer {
    pub pass: Pass,
    pub layer: u32,
    pub count: u32,
    pub radius: f32,
    pub height: f32,
    pub pitch: f32,
    pub scale: f32,
    pub curve_intensity: f32,
    pub angle_offset: f32,
    pub roll_jitter: f32,
    pub material: Material,
}

impl PetalLayer {
    pub fn inner(layer: u32) -> Self {
        let l = layer as f32;
        Self {
            pass: Pass::Inner,
            layer,
            count: 5 + layer * 2,
            radius: 0.1 + l * 0.15,
            height: 0.3 - l * 0.1,
            pitch: -0.3 - l * 0.2,
            scale: 0.4 + l * 0.1,
            curve_intensity: 0.15 + l * 0.05,
            angle_offset: l * 0.3,
            roll_jitter: 0.1,
            material: if layer < 2 {
                Material::INNER_PETAL
            } else {
                Material::PETAL
            },
        }
    }

    pub fn outer(layer: u32) -> Self {
        let l = layer as f32;
        Self {
            pass: Pass::Outer,
            layer,
            count: 8 + layer * 2,
            radius: 0.5 + l * 0.3,
            height: -l * 0.15,
            pitch: -0.8 - l * 0.3,
            scale: 0.6 + l * 0.15,
            curve_intensity: 0.2 + l * 0.1,
            angle_offset: l * 0.2,
            roll_jitter: 0.15,
            material: Material::PETAL,
        }
    }

    /// Placement of petal `i`: even spacing around the ring, facing outward.
    pub fn transform<R: Rng + ?Sized>(&self, i: u32, rng: &mut R) -> Transform {
        let angle = i as f32 / self.count as f32 * TAU + self.angle_offset;
        Transform {
            position: Vec3::new(angle.cos() * self.radius, self.height, angle.sin() * self.radius),
            rotation: Vec3::new(
                self.pitch,
                -angle + FRAC_PI_2,
                rng.gen_range(-self.roll_jitter..self.roll_jitter),
            ),
            scale: Vec3::ONE,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RoseVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
    /// Roughness, metalness.
    pub surface: [f32; 2],
    /// 1.0 when back faces should be lit with a flipped normal.
    pub double_sided: f32,
}

/// The whole flower flattened into one buffer in group-local space.
#[derive(Clone, Debug, Default)]
pub struct BakedRose {
    pub vertices: Vec<RoseVertex>,
    pub indices: Vec<u32>,
    pub petals: usize,
    pub sepals: usize,
}

impl BakedRose {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Parts in group-local space. The group's own pose is driven per frame by
/// the animator, starting from [`BASE_PITCH`] and [`BASE_HEIGHT`].
#[derive(Clone, Debug)]
pub struct FlowerGroup {
    pub parts: Vec<MeshInstance>,
}

impl FlowerGroup {
    pub fn count(&self, pred: impl Fn(&Part) -> bool) -> usize {
        self.parts.iter().filter(|p| pred(&p.part)).count()
    }

    pub fn petal_count(&self) -> usize {
        self.count(|p| matches!(p, Part::Petal { .. }))
    }

    pub fn sepal_count(&self) -> usize {
        self.count(|p| *p == Part::Sepal)
    }

    pub fn bake(&self) -> BakedRose {
        let vertex_total: usize = self.parts.iter().map(|p| p.mesh.vertex_count()).sum();
        let index_total: usize = self.parts.iter().map(|p| p.mesh.indices.len()).sum();

        let mut baked = BakedRose {
            vertices: Vec::with_capacity(vertex_total),
            indices: Vec::with_capacity(index_total),
            petals: self.petal_count(),
            sepals: self.sepal_count(),
        };

        for part in &self.parts {
            let local = part.mesh.transformed(part.transform.matrix());
            let base = baked.vertices.len() as u32;

            baked
                .vertices
                .extend(local.positions.iter().zip(&local.normals).map(|(p, n)| RoseVertex {
                    position: *p,
                    normal: *n,
                    color: part.material.color,
                    surface: [part.material.roughness, part.material.metalness],
                    double_sided: if part.material.double_sided { 1.0 } else { 0.0 },
                }));
            baked.indices.extend(local.indices.iter().map(|i| base + i));
        }

        baked
    }
}

pub fn build_rose<R: Rng + ?Sized>(rng: &mut R) -> Result<FlowerGroup, MeshError> {
    let mut parts = Vec::with_capacity(64);

    let layers = (0..LAYERS_PER_PASS)
        .map(PetalLayer::inner)
        .chain((0..LAYERS_PER_PASS).map(PetalLayer::outer));

    for layer in layers {
        let mesh = Arc::new(petal_geometry(layer.scale, layer.curve_intensity)?);
        for i in 0..layer.count {
            parts.push(MeshInstance {
                part: Part::Petal {
                    pass: layer.pass,
                    layer: layer.layer,
                },
                mesh: Arc::clone(&mesh),
                material: layer.material,
                transform: layer.transform(i, rng),
            });
        }
    }

    parts.push(MeshInstance {
        part: Part::Stem,
        mesh: Arc::new(tapered_cylinder(0.05, 0.08, 2.0, 16)),
        material: Material::STEM,
        transform: Transform {
            position: Vec3::new(0.0, -1.2, 0.0),
            ..Default::default()
        },
    });

    let sepal = Arc::new(sepal_geometry()?);
    for i in 0..SEPAL_COUNT {
        let angle = i as f32 / SEPAL_COUNT as f32 * TAU;
        parts.push(MeshInstance {
            part: Part::Sepal,
            mesh: Arc::clone(&sepal),
            material: Material::SEPAL,
            transform: Transform {
                position: Vec3::new(angle.cos() * 0.15, -0.2, angle.sin() * 0.15),
                rotation: Vec3::new(-1.2, -angle, 0.0),
                scale: Vec3::ONE,
            },
        });
    }

    Ok(FlowerGroup { parts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rose() -> FlowerGroup {
        build_rose(&mut StdRng::seed_from_u64(7)).unwrap()
    }

    fn petals_in(group: &FlowerGroup, pass: Pass, layer: u32) -> usize {
        group.count(|p| *p == Part::Petal { pass, layer })
    }

    #[test]
    fn inner_pass_counts() {
        let group = rose();
        for layer in 0..3 {
            assert_eq!(petals_in(&group, Pass::Inner, layer), 5 + 2 * layer as usize);
        }
        assert_eq!(group.count(|p| matches!(p, Part::Petal { pass: Pass::Inner, .. })), 21);
    }

    #[test]
    fn outer_pass_counts() {
        let group = rose();
        for layer in 0..3 {
            assert_eq!(petals_in(&group, Pass::Outer, layer), 8 + 2 * layer as usize);
        }
        assert_eq!(group.count(|p| matches!(p, Part::Petal { pass: Pass::Outer, .. })), 30);
    }

    #[test]
    fn whole_flower_counts() {
        let group = rose();
        assert_eq!(group.petal_count(), 51);
        assert_eq!(group.sepal_count(), 5);
        assert_eq!(group.count(|p| *p == Part::Stem), 1);
        assert_eq!(group.parts.len(), 57);
    }

    #[test]
    fn inner_materials_darken_first_two_layers() {
        let group = rose();
        for part in &group.parts {
            if let Part::Petal { pass: Pass::Inner, layer } = part.part {
                let expected = if layer < 2 {
                    Material::INNER_PETAL
                } else {
                    Material::PETAL
                };
                assert_eq!(part.material, expected);
            }
        }
    }

    #[test]
    fn petals_face_outward_with_bounded_roll() {
        let group = rose();
        for part in &group.parts {
            let Part::Petal { pass, layer } = part.part else {
                continue;
            };
            let ring = match pass {
                Pass::Inner => PetalLayer::inner(layer),
                Pass::Outer => PetalLayer::outer(layer),
            };
            let t = part.transform;
            let angle = t.position.z.atan2(t.position.x);
            let radius = glam::Vec2::new(t.position.x, t.position.z).length();

            assert!((radius - ring.radius).abs() < 1e-5);
            assert!((t.position.y - ring.height).abs() < 1e-6);
            assert!((t.rotation.x - ring.pitch).abs() < 1e-6);
            assert!(t.rotation.z.abs() <= ring.roll_jitter);

            // yaw = -angle + pi/2, modulo a full turn
            let diff = (t.rotation.y + angle - FRAC_PI_2).rem_euclid(TAU);
            assert!(diff < 1e-4 || TAU - diff < 1e-4, "yaw off by {diff}");
        }
    }

    #[test]
    fn layer_offsets_stagger_rings() {
        let mut rng = StdRng::seed_from_u64(1);
        let first = PetalLayer::inner(1).transform(0, &mut rng);
        let angle = first.position.z.atan2(first.position.x);
        assert!((angle - 0.3).abs() < 1e-5);
    }

    #[test]
    fn petals_in_a_layer_share_geometry() {
        let group = rose();
        let layer: Vec<_> = group
            .parts
            .iter()
            .filter(|p| p.part == Part::Petal { pass: Pass::Outer, layer: 2 })
            .collect();
        assert!(layer.windows(2).all(|w| Arc::ptr_eq(&w[0].mesh, &w[1].mesh)));
    }

    #[test]
    fn stem_hangs_below_the_head() {
        let group = rose();
        let stem = group.parts.iter().find(|p| p.part == Part::Stem).unwrap();
        assert_eq!(stem.transform.position.y, -1.2);
        assert_eq!(stem.material, Material::STEM);
    }

    #[test]
    fn sepals_point_down_around_the_base() {
        let group = rose();
        for (i, sepal) in group.parts.iter().filter(|p| p.part == Part::Sepal).enumerate() {
            let angle = i as f32 / 5.0 * TAU;
            assert!((sepal.transform.rotation.x + 1.2).abs() < 1e-6);
            assert!((sepal.transform.rotation.y + angle).abs() < 1e-6);
            assert!((sepal.transform.position.y + 0.2).abs() < 1e-6);
        }
    }

    #[test]
    fn same_seed_same_rose() {
        let a = rose();
        let b = rose();
        for (x, y) in a.parts.iter().zip(&b.parts) {
            assert_eq!(x.transform, y.transform);
        }
    }

    #[test]
    fn bake_concatenates_all_parts() {
        let group = rose();
        let baked = group.bake();
        let vertices: usize = group.parts.iter().map(|p| p.mesh.vertex_count()).sum();
        let indices: usize = group.parts.iter().map(|p| p.mesh.indices.len()).sum();
        assert_eq!(baked.vertices.len(), vertices);
        assert_eq!(baked.indices.len(), indices);
        assert_eq!(baked.petals, 51);
        assert_eq!(baked.sepals, 5);
        assert!(baked.indices.iter().all(|&i| (i as usize) < baked.vertices.len()));
    }

    #[test]
    fn euler_order_is_xyz() {
        let t = Transform {
            rotation: Vec3::new(0.4, 0.7, -0.2),
            ..Default::default()
        };
        let expected = Mat4::from_rotation_x(0.4) * Mat4::from_rotation_y(0.7) * Mat4::from_rotation_z(-0.2);
        assert!(t.matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn material_palette_is_linear() {
        let close = |a: [f32; 3], b: [f32; 3]| a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-5);
        assert!(close(Material::PETAL.color, hex_to_linear(0xe63971)));
        assert!(close(Material::INNER_PETAL.color, hex_to_linear(0xc9184a)));
        assert!(close(Material::STEM.color, hex_to_linear(0x228b22)));
        assert!(close(Material::SEPAL.color, hex_to_linear(0x2d5a27)));
    }

    #[test]
    fn srgb_curve_is_exact() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.5) - 0.214041).abs() < 1e-5);
        // linear segment below the knee
        assert!((srgb_to_linear(0.04) - 0.04 / 12.92).abs() < 1e-7);
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<RoseVertex>(), 48);
    }
}
