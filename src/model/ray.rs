use glam::Vec3;

/// Nearest intersection reported by a ray query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin along the (unit) direction
    pub distance: f32,
    pub point: Vec3,
    /// Unit surface normal, flipped to face the ray origin
    pub normal: Vec3,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Slab test. Returns the entry distance (0 when the origin is inside) if
    /// the box is hit within `max_distance`.
    pub fn ray_entry(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        let mut t_min = 0.0f32;
        let mut t_max = max_distance;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1e-10 {
                // Parallel to this slab: must already be between its planes
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let t1 = (lo - o) * inv;
            let t2 = (hi - o) * inv;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

/// Möller–Trumbore ray/triangle test, double-sided.
/// Returns the hit distance along `dir` when it lies in `[0, max_distance]`.
pub fn ray_triangle(origin: Vec3, dir: Vec3, tri: [Vec3; 3], max_distance: f32) -> Option<f32> {
    const EPS: f32 = 1e-7;

    let e1 = tri[1] - tri[0];
    let e2 = tri[2] - tri[0];
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < EPS {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - tri[0];
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(e1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = e2.dot(q) * inv_det;
    (0.0..=max_distance).contains(&t).then_some(t)
}

/// Geometric normal of a triangle, oriented against `dir`
pub fn facing_normal(tri: [Vec3; 3], dir: Vec3) -> Vec3 {
    let n = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
    if n.dot(dir) > 0.0 { -n } else { n }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb { min: Vec3::splat(-1.0), max: Vec3::splat(1.0) }
    }

    #[test]
    fn ray_enters_box_from_front() {
        let t = unit_box().ray_entry(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 100.0);
        assert!((t.unwrap() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn ray_misses_box_beside_it() {
        assert!(unit_box().ray_entry(Vec3::new(0.0, 5.0, -5.0), Vec3::Z, 100.0).is_none());
    }

    #[test]
    fn ray_starting_inside_box_enters_at_zero() {
        assert_eq!(unit_box().ray_entry(Vec3::ZERO, Vec3::X, 0.1), Some(0.0));
    }

    #[test]
    fn box_beyond_max_distance_is_ignored() {
        assert!(unit_box().ray_entry(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 3.0).is_none());
    }

    #[test]
    fn empty_box_never_hits() {
        assert!(Aabb::empty().ray_entry(Vec3::ZERO, Vec3::X, 10.0).is_none());
    }

    #[test]
    fn triangle_hit_from_either_side() {
        let tri = [Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];

        let front = ray_triangle(Vec3::new(0.0, 0.0, -2.0), Vec3::Z, tri, 10.0);
        let back = ray_triangle(Vec3::new(0.0, 0.0, 2.0), -Vec3::Z, tri, 10.0);
        assert!((front.unwrap() - 2.0).abs() < 1e-5);
        assert!((back.unwrap() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn triangle_out_of_reach_or_behind_is_missed() {
        let tri = [Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];

        assert!(ray_triangle(Vec3::new(0.0, 0.0, -2.0), Vec3::Z, tri, 1.5).is_none());
        assert!(ray_triangle(Vec3::new(0.0, 0.0, 2.0), Vec3::Z, tri, 10.0).is_none());
        assert!(ray_triangle(Vec3::new(5.0, 0.0, -2.0), Vec3::Z, tri, 10.0).is_none());
    }

    #[test]
    fn normal_faces_the_ray() {
        let tri = [Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        assert_eq!(facing_normal(tri, Vec3::Z), -Vec3::Z);
        assert_eq!(facing_normal(tri, -Vec3::Z), Vec3::Z);
    }
}
