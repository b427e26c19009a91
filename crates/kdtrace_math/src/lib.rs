//! kdtrace math types.
//!
//! Everything is double precision: the ray tracer offsets rays by `1e-6` to
//! step off surfaces, which single precision cannot resolve at scene scale.

mod aabb;
mod interval;
mod polygon;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use polygon::clip_polygon_to_box;
pub use ray::Ray;

pub use glam::{DVec2, DVec3, DVec4};

/// Points, directions and colors.
pub type Vec3 = DVec3;
/// Texture coordinates.
pub type Vec2 = DVec2;

/// Real roots of `a t^2 + b t + c = 0` in ascending order.
///
/// Uses the cancellation-free form of the quadratic formula. Returns `None`
/// when there are no real roots or the equation is not quadratic.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a == 0.0 {
        return None;
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let q = -0.5 * (b + b.signum() * root);
    let (t0, t1) = if q == 0.0 {
        // b == 0 and c == 0: double root at the origin
        (0.0, 0.0)
    } else {
        (q / a, c / q)
    };
    Some(if t0 <= t1 { (t0, t1) } else { (t1, t0) })
}

/// Coefficients this close to zero are treated as zero by the cubic and
/// quartic solvers.
const ROOT_EPSILON: f64 = 1.0e-12;

/// Real roots of the monic cubic `t^3 + a t^2 + b t + c = 0`, ascending.
/// Double roots are reported once.
pub fn solve_cubic(a: f64, b: f64, c: f64) -> Vec<f64> {
    // Depressed form y^3 + 3p y + 2q = 0 with t = y - a/3
    let a2 = a * a;
    let p = (b - a2 / 3.0) / 3.0;
    let q = (2.0 / 27.0 * a * a2 - a * b / 3.0 + c) / 2.0;
    let p3 = p * p * p;
    let discriminant = q * q + p3;

    let mut roots = if discriminant.abs() < ROOT_EPSILON {
        if q.abs() < ROOT_EPSILON {
            vec![0.0]
        } else {
            let u = (-q).cbrt();
            vec![2.0 * u, -u]
        }
    } else if discriminant < 0.0 {
        // Three distinct real roots
        let phi = (-q / (-p3).sqrt()).clamp(-1.0, 1.0).acos() / 3.0;
        let r = 2.0 * (-p).sqrt();
        vec![
            r * phi.cos(),
            -r * (phi + std::f64::consts::FRAC_PI_3).cos(),
            -r * (phi - std::f64::consts::FRAC_PI_3).cos(),
        ]
    } else {
        let root = discriminant.sqrt();
        vec![(root - q).cbrt() - (root + q).cbrt()]
    };

    for t in &mut roots {
        *t -= a / 3.0;
    }
    roots.sort_by(f64::total_cmp);
    roots
}

/// Real roots of the monic quartic `t^4 + a t^3 + b t^2 + c t + d = 0`,
/// ascending.
///
/// Solved by Ferrari's method through a resolvent cubic, then refined with
/// a few Newton steps on the original polynomial.
pub fn solve_quartic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    // Depressed form y^4 + p y^2 + q y + r = 0 with t = y - a/4
    let a2 = a * a;
    let p = b - 3.0 / 8.0 * a2;
    let q = c - a * b / 2.0 + a2 * a / 8.0;
    let r = d - a * c / 4.0 + a2 * b / 16.0 - 3.0 / 256.0 * a2 * a2;

    let mut roots = Vec::with_capacity(4);
    if r.abs() < ROOT_EPSILON {
        // y (y^3 + p y + q) = 0
        roots.push(0.0);
        roots.extend(solve_cubic(0.0, p, q));
    } else {
        let cubic = solve_cubic(-p / 2.0, -r, r * p / 2.0 - q * q / 8.0);
        let Some(&z) = cubic.last() else {
            return roots;
        };
        let u = z * z - r;
        let v = 2.0 * z - p;
        // Both are squares; small negative values are rounding error
        if u < -1.0e-9 * (z * z).max(1.0) || v < -1.0e-9 * z.abs().max(1.0) {
            return roots;
        }
        let u = u.max(0.0).sqrt();
        let v = if q < 0.0 { -v.max(0.0).sqrt() } else { v.max(0.0).sqrt() };
        for (b1, c1) in [(v, z - u), (-v, z + u)] {
            if let Some((y0, y1)) = solve_quadratic(1.0, b1, c1) {
                roots.push(y0);
                roots.push(y1);
            }
        }
    }

    for t in &mut roots {
        *t -= a / 4.0;
        for _ in 0..3 {
            let value = (((*t + a) * *t + b) * *t + c) * *t + d;
            let slope = ((4.0 * *t + 3.0 * a) * *t + 2.0 * b) * *t + c;
            if slope == 0.0 {
                break;
            }
            *t -= value / slope;
        }
    }
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|x, y| (*x - *y).abs() < 1.0e-9);
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(a.dot(b), 32.0);
    }

    #[test]
    fn test_solve_quadratic() {
        // (t - 1)(t - 3)
        let (t0, t1) = solve_quadratic(1.0, -4.0, 3.0).unwrap();
        assert!((t0 - 1.0).abs() < 1e-12);
        assert!((t1 - 3.0).abs() < 1e-12);

        // Negative leading coefficient keeps ascending order
        let (t0, t1) = solve_quadratic(-1.0, 4.0, -3.0).unwrap();
        assert!(t0 < t1);

        assert!(solve_quadratic(1.0, 0.0, 1.0).is_none());
        assert!(solve_quadratic(0.0, 1.0, 1.0).is_none());
        assert_eq!(solve_quadratic(1.0, 0.0, 0.0), Some((0.0, 0.0)));
    }

    fn assert_roots(found: &[f64], expected: &[f64]) {
        assert_eq!(found.len(), expected.len(), "{found:?} vs {expected:?}");
        for (f, e) in found.iter().zip(expected) {
            assert!((f - e).abs() < 1e-9, "{found:?} vs {expected:?}");
        }
    }

    #[test]
    fn test_solve_cubic() {
        // (t - 1)(t - 2)(t - 3)
        assert_roots(&solve_cubic(-6.0, 11.0, -6.0), &[1.0, 2.0, 3.0]);
        // t^3 - 8 has one real root
        assert_roots(&solve_cubic(0.0, 0.0, -8.0), &[2.0]);
        // (t - 1)^2 (t + 2)
        assert_roots(&solve_cubic(0.0, -3.0, 2.0), &[-2.0, 1.0]);
    }

    #[test]
    fn test_solve_quartic() {
        // (t - 1)(t - 2)(t - 3)(t - 4)
        assert_roots(&solve_quartic(-10.0, 35.0, -50.0, 24.0), &[1.0, 2.0, 3.0, 4.0]);
        // (t^2 - 1)(t^2 + 1)
        assert_roots(&solve_quartic(0.0, 0.0, 0.0, -1.0), &[-1.0, 1.0]);
        // t^4 + 1 has no real roots
        assert!(solve_quartic(0.0, 0.0, 0.0, 1.0).is_empty());
        // t (t - 1)(t + 2)(t - 5)
        assert_roots(&solve_quartic(-4.0, -7.0, 10.0, 0.0), &[-2.0, 0.0, 1.0, 5.0]);
    }

    #[test]
    fn test_solve_quadratic_small_root_precision() {
        // Roots at 1e-9 and 1e9; the naive formula loses the small one.
        let (t0, t1) = solve_quadratic(1.0, -(1e9 + 1e-9), 1.0).unwrap();
        assert!((t0 - 1e-9).abs() < 1e-18);
        assert!((t1 - 1e9).abs() < 1e-3);
    }
}
