use glam::Vec2;
use lyon::geom::CubicBezierSegment;
use lyon::math::point;

/// Divisions per bezier segment when flattening an outline.
pub const CURVE_SEGMENTS: u32 = 12;

/// Closed outline made of two cubic bezier segments: origin up to the tip,
/// then back down to the origin on the other side.
#[derive(Clone, Copy, Debug)]
pub struct ShapeCurve {
    pub rising: CubicBezierSegment<f32>,
    pub falling: CubicBezierSegment<f32>,
    pub height: f32,
}

impl ShapeCurve {
    /// Symmetric teardrop for a petal of the given scale.
    pub fn petal(scale: f32) -> Self {
        let width = 0.5 * scale;
        let height = 0.8 * scale;

        Self {
            rising: CubicBezierSegment {
                from: point(0.0, 0.0),
                ctrl1: point(width * 0.8, height * 0.3),
                ctrl2: point(width, height * 0.8),
                to: point(0.0, height),
            },
            falling: CubicBezierSegment {
                from: point(0.0, height),
                ctrl1: point(-width, height * 0.8),
                ctrl2: point(-width * 0.8, height * 0.3),
                to: point(0.0, 0.0),
            },
            height,
        }
    }

    /// Narrow leaf used for the sepals around the base of the bloom.
    pub fn sepal() -> Self {
        Self {
            rising: CubicBezierSegment {
                from: point(0.0, 0.0),
                ctrl1: point(0.1, 0.2),
                ctrl2: point(0.05, 0.4),
                to: point(0.0, 0.5),
            },
            falling: CubicBezierSegment {
                from: point(0.0, 0.5),
                ctrl1: point(-0.05, 0.4),
                ctrl2: point(-0.1, 0.2),
                to: point(0.0, 0.0),
            },
            height: 0.5,
        }
    }

    #[cfg(test)]
    pub fn width(&self) -> f32 {
        let (min, max) = self
            .outline(CURVE_SEGMENTS)
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
        max - min
    }

    /// Flattened outline, counter-clockwise, without the closing duplicate.
    pub fn outline(&self, segments_per_curve: u32) -> Vec<Vec2> {
        let divisions = segments_per_curve.max(1);
        let mut points = Vec::with_capacity(divisions as usize * 2);

        for curve in [&self.rising, &self.falling] {
            for i in 0..divisions {
                let p = curve.sample(i as f32 / divisions as f32);
                points.push(Vec2::new(p.x, p.y));
            }
        }

        if signed_area(&points) < 0.0 {
            points.reverse();
        }

        points
    }
}

/// Shoelace area; positive for counter-clockwise winding.
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}
