use super::Position;

const EPSILON: f64 = 1e-9;

/// Planar circle, elevation of the center is always zero
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Position,
    pub radius: f64,
}

impl Circle {
    fn around(point: &Position) -> Self {
        Self {
            center: Position::planar(point.x, point.y),
            radius: 0.0,
        }
    }

    fn from_diameter(a: &Position, b: &Position) -> Self {
        let center = Position::planar((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        Self {
            center,
            radius: a.distance_2d(b) / 2.0,
        }
    }

    /// Circumscribed circle; collinear points fall back to the widest pair
    fn from_triangle(a: &Position, b: &Position, c: &Position) -> Self {
        let (bx, by) = (b.x - a.x, b.y - a.y);
        let (cx, cy) = (c.x - a.x, c.y - a.y);
        let d = 2.0 * (bx * cy - by * cx);

        if d.abs() < EPSILON {
            let candidates = [
                Self::from_diameter(a, b),
                Self::from_diameter(a, c),
                Self::from_diameter(b, c),
            ];
            return candidates
                .into_iter()
                .max_by(|l, r| l.radius.total_cmp(&r.radius))
                .unwrap_or_else(|| Self::around(a));
        }

        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / d;
        let uy = (bx * c2 - cx * b2) / d;
        let center = Position::planar(a.x + ux, a.y + uy);
        Self {
            center,
            radius: ux.hypot(uy),
        }
    }

    pub fn contains(&self, point: &Position) -> bool {
        self.center.distance_2d(point) <= self.radius + EPSILON * self.radius.max(1.0)
    }

    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }
}

/// Smallest circle enclosing the planar projection of `points`.
///
/// Incremental construction: each point falling outside the current circle
/// must lie on the boundary of the circle enclosing it and its predecessors.
pub fn min_enclosing_circle(points: &[Position]) -> Option<Circle> {
    let first = points.first()?;
    let mut circle = Circle::around(first);

    for i in 1..points.len() {
        if circle.contains(&points[i]) {
            continue;
        }
        circle = Circle::around(&points[i]);
        for j in 0..i {
            if circle.contains(&points[j]) {
                continue;
            }
            circle = Circle::from_diameter(&points[i], &points[j]);
            for k in 0..j {
                if !circle.contains(&points[k]) {
                    circle = Circle::from_triangle(&points[i], &points[j], &points[k]);
                }
            }
        }
    }

    Some(circle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_single() {
        assert!(min_enclosing_circle(&[]).is_none());
        let circle = min_enclosing_circle(&[Position::new(1.0, 2.0, 3.0)]).unwrap();
        assert_eq!(circle.radius, 0.0);
        assert_eq!(circle.center, Position::planar(1.0, 2.0));
    }

    #[test]
    fn test_square() {
        let points = [
            Position::planar(0.0, 0.0),
            Position::planar(1.0, 0.0),
            Position::planar(1.0, 1.0),
            Position::planar(0.0, 1.0),
            Position::planar(0.5, 0.5),
        ];
        let circle = min_enclosing_circle(&points).unwrap();
        assert!((circle.radius - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
        assert!((circle.center.x - 0.5).abs() < 1e-9);
        assert!((circle.center.y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_collinear() {
        let points = [
            Position::planar(0.0, 0.0),
            Position::planar(2.0, 0.0),
            Position::planar(1.0, 0.0),
            Position::planar(4.0, 0.0),
        ];
        let circle = min_enclosing_circle(&points).unwrap();
        assert!((circle.radius - 2.0).abs() < 1e-9);
        assert!((circle.center.x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_obtuse_triangle_uses_longest_side() {
        let points = [
            Position::planar(0.0, 0.0),
            Position::planar(10.0, 0.0),
            Position::planar(5.0, 1.0),
        ];
        let circle = min_enclosing_circle(&points).unwrap();
        assert!((circle.radius - 5.0).abs() < 1e-9);
        assert!(points.iter().all(|p| circle.contains(p)));
    }
}
