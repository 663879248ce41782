// Geometry value types shared by every layout engine and scene backend.
//
// `Vec3` is a plain f64 triple in metres. The world frame is right-handed
// with Z up: X runs along the building's width (east positive), Y along its
// depth (north positive). `Euler` holds XYZ rotations in radians and applies
// them extrinsically (X first, then Y, then Z), matching the convention used
// by the host scene. `Aabb` is the axis-aligned box returned by bounds
// queries; `Transform` composes location, rotation and scale the way scene
// nodes do.
//
// See also: `shape.rs` for the descriptors that carry these values,
// `memory.rs` for the arena scene that evaluates transforms.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

// ---------------------------------------------------------------------------
// Vec3
// ---------------------------------------------------------------------------

/// A point or direction in metres.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction. Returns the zero vector if the
    /// length is ~0.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 1e-12 { self * (1.0 / len) } else { Vec3::ZERO }
    }

    /// Component-wise product.
    pub fn scaled_by(self, s: Vec3) -> Vec3 {
        Vec3::new(self.x * s.x, self.y * s.y, self.z * s.z)
    }

    /// Projection onto the YZ plane (x dropped to 0).
    pub fn yz(self) -> Vec3 {
        Vec3::new(0.0, self.y, self.z)
    }

    pub fn get(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn with(mut self, axis: Axis, value: f64) -> Vec3 {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
        self
    }

    /// Rotate about the X axis by `angle` radians.
    pub fn rotated_x(self, angle: f64) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(self.x, self.y * c - self.z * s, self.y * s + self.z * c)
    }

    pub fn rotated_y(self, angle: f64) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(self.x * c + self.z * s, self.y, -self.x * s + self.z * c)
    }

    pub fn rotated_z(self, angle: f64) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(self.x * c - self.y * s, self.x * s + self.y * c, self.z)
    }

    /// Apply an XYZ Euler rotation.
    pub fn rotated(self, e: Euler) -> Vec3 {
        self.rotated_x(e.x).rotated_y(e.y).rotated_z(e.z)
    }

    pub fn approx_eq(self, other: Vec3, tol: f64) -> bool {
        (self.x - other.x).abs() <= tol
            && (self.y - other.y).abs() <= tol
            && (self.z - other.z).abs() <= tol
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, o: Vec3) {
        *self = *self + o;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Axes and rotations
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// XYZ Euler rotation in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Euler {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Euler {
    pub const IDENTITY: Euler = Euler::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Rotation about Z only.
    pub const fn about_z(angle: f64) -> Self {
        Self::new(0.0, 0.0, angle)
    }

    pub fn is_identity(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Recover the XYZ Euler angles of the rotation whose matrix columns are
    /// the basis vectors `bx`, `by`, `bz`.
    pub fn from_basis(bx: Vec3, by: Vec3, bz: Vec3) -> Euler {
        // Matrix entries m[row][col] with column 0 = bx.
        let m20 = bx.z;
        let cy = (bx.x * bx.x + bx.y * bx.y).sqrt();
        if cy > 1e-9 {
            Euler::new(by.z.atan2(bz.z), (-m20).atan2(cy), bx.y.atan2(bx.x))
        } else {
            // Gimbal lock: fold the X rotation into Z.
            Euler::new(0.0, (-m20).atan2(cy), (-by.x).atan2(by.y))
        }
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Node-local transform: scale, then rotate, then translate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub location: Vec3,
    pub rotation: Euler,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        location: Vec3::ZERO,
        rotation: Euler::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn at(location: Vec3, rotation: Euler) -> Self {
        Self { location, rotation, scale: Vec3::ONE }
    }

    pub fn apply(&self, p: Vec3) -> Vec3 {
        self.location + p.scaled_by(self.scale).rotated(self.rotation)
    }
}

// ---------------------------------------------------------------------------
// Aabb
// ---------------------------------------------------------------------------

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self { min: center - half, max: center + half }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = Aabb { min: first, max: first };
        for p in iter {
            b.include(p);
        }
        Some(b)
    }

    pub fn include(&mut self, p: Vec3) {
        self.min = Vec3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Vec3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn union(self, other: Aabb) -> Aabb {
        let mut b = self;
        b.include(other.min);
        b.include(other.max);
        b
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corners, used to carry a box through a transform.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// True if the box is mirror-symmetric about the plane `axis = c`.
    pub fn is_symmetric_about(&self, axis: Axis, c: f64, tol: f64) -> bool {
        ((self.max.get(axis) - c) - (c - self.min.get(axis))).abs() <= tol
    }

    pub fn approx_eq(&self, other: &Aabb, tol: f64) -> bool {
        self.min.approx_eq(other.min, tol) && self.max.approx_eq(other.max, tol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn rotate_about_z_quarter_turn() {
        let v = Vec3::new(1.0, 0.0, 0.0).rotated(Euler::about_z(FRAC_PI_2));
        assert!(v.approx_eq(Vec3::new(0.0, 1.0, 0.0), 1e-12));
    }

    #[test]
    fn negative_x_rotation_tilts_up_vector_toward_positive_y() {
        let v = Vec3::new(0.0, 0.0, 1.0).rotated_x(-0.3);
        assert!(v.y > 0.0);
        assert!((v.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn euler_from_basis_recovers_rotation() {
        let e = Euler::new(0.3, -0.2, 1.1);
        let bx = Vec3::new(1.0, 0.0, 0.0).rotated(e);
        let by = Vec3::new(0.0, 1.0, 0.0).rotated(e);
        let bz = Vec3::new(0.0, 0.0, 1.0).rotated(e);
        let back = Euler::from_basis(bx, by, bz);
        assert!((back.x - e.x).abs() < 1e-9);
        assert!((back.y - e.y).abs() < 1e-9);
        assert!((back.z - e.z).abs() < 1e-9);
    }

    #[test]
    fn transform_scales_before_rotating() {
        let t = Transform {
            location: Vec3::new(1.0, 0.0, 0.0),
            rotation: Euler::about_z(FRAC_PI_2),
            scale: Vec3::new(2.0, 1.0, 1.0),
        };
        let p = t.apply(Vec3::new(1.0, 0.0, 0.0));
        assert!(p.approx_eq(Vec3::new(1.0, 2.0, 0.0), 1e-12));
    }

    #[test]
    fn aabb_symmetry_check() {
        let b = Aabb::from_center_size(Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 2.0, 2.0));
        assert!(b.is_symmetric_about(Axis::X, 0.0, 1e-12));
        assert!(!b.is_symmetric_about(Axis::Y, 0.0, 1e-12));
        assert!(b.is_symmetric_about(Axis::Y, 1.0, 1e-12));
    }
}
