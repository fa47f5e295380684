use glam::Vec3;

use crate::rose::flower::hex_to_linear as hex;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    /// Shines from `position` toward the origin.
    Directional,
    Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lights {
    pub ambient: [f32; 3],
    pub ambient_intensity: f32,
    pub lights: [Light; 3],
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient: hex(0xfce7f3),
            ambient_intensity: 0.6,
            lights: [
                Light {
                    kind: LightKind::Directional,
                    color: hex(0xffffff),
                    intensity: 1.0,
                    position: Vec3::new(5.0, 5.0, 5.0),
                },
                // fill
                Light {
                    kind: LightKind::Directional,
                    color: hex(0xffc0cb),
                    intensity: 0.4,
                    position: Vec3::new(-5.0, 3.0, -5.0),
                },
                // rim
                Light {
                    kind: LightKind::Point,
                    color: hex(0xff69b4),
                    intensity: 0.5,
                    position: Vec3::new(0.0, 5.0, -3.0),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rig() {
        let rig = Lights::default();
        assert_eq!(rig.ambient_intensity, 0.6);
        assert_eq!(rig.lights[0].color, [1.0, 1.0, 1.0]);
        assert_eq!(rig.lights[2].kind, LightKind::Point);
        assert_eq!(
            rig.lights.iter().filter(|l| l.kind == LightKind::Directional).count(),
            2
        );
    }
}
