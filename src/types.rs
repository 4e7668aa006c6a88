//! Common types and traits for integer 3D geometry.
//!
//! All extents, coordinates and weights in a packing run are integers in a
//! shared unit, so comparisons here are exact and need no tolerance.

use std::ops::{Add, Sub};

/// Represents a 3D vector or point in ULD-local space.
///
/// Used for origins, extents and bounding box corners.
///
/// # Examples
/// ```ignore
/// let origin = Vec3::new(0, 10, 0);
/// let extents = Vec3::new(5, 5, 5);
/// let corner = origin + extents;
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vec3 {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Vec3 {
    /// Creates a new 3D vector.
    ///
    /// # Parameters
    /// * `x` - X component (length axis)
    /// * `y` - Y component (width axis)
    /// * `z` - Z component (height axis)
    #[inline]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Creates a zero vector (origin).
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Converts to tuple format for API compatibility.
    #[inline]
    pub const fn as_tuple(&self) -> (u32, u32, u32) {
        (self.x, self.y, self.z)
    }

    /// Creates from tuple format.
    #[inline]
    pub const fn from_tuple(tuple: (u32, u32, u32)) -> Self {
        Self::new(tuple.0, tuple.1, tuple.2)
    }

    /// Volume spanned by this vector, widened to avoid overflow.
    #[inline]
    pub fn volume(&self) -> u64 {
        u64::from(self.x) * u64::from(self.y) * u64::from(self.z)
    }

    /// Checks if the vector fits within another vector (component-wise <=).
    #[inline]
    pub fn fits_within(&self, outer: &Self) -> bool {
        self.x <= outer.x && self.y <= outer.y && self.z <= outer.z
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<(u32, u32, u32)> for Vec3 {
    #[inline]
    fn from(tuple: (u32, u32, u32)) -> Self {
        Self::from_tuple(tuple)
    }
}

impl From<Vec3> for (u32, u32, u32) {
    #[inline]
    fn from(vec: Vec3) -> Self {
        vec.as_tuple()
    }
}

/// Trait for objects with 3D extents.
pub trait Dimensional {
    /// Returns the extents of the object.
    fn dimensions(&self) -> Vec3;

    /// Calculates the volume.
    fn volume(&self) -> u64 {
        self.dimensions().volume()
    }
}

/// Represents an Axis-Aligned Bounding Box (AABB) with half-open extents.
///
/// Two boxes that merely touch along a face do not intersect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// Minimum corner (origin)
    pub min: Vec3,
    /// Maximum corner (origin + extents)
    pub max: Vec3,
}

impl BoundingBox {
    /// Creates a bounding box from an origin and extents.
    #[inline]
    pub fn from_origin_and_extents(origin: Vec3, extents: Vec3) -> Self {
        Self {
            min: origin,
            max: origin + extents,
        }
    }

    /// Checks if two bounding boxes intersect.
    ///
    /// Separating axis test for AABBs.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.max.x <= other.min.x
            || other.max.x <= self.min.x
            || self.max.y <= other.min.y
            || other.max.y <= self.min.y
            || self.max.z <= other.min.z
            || other.max.z <= self.min.z)
    }

    /// Checks if this box lies entirely inside `[0, bounds]` on every axis.
    #[inline]
    pub fn within(&self, bounds: &Vec3) -> bool {
        self.min.fits_within(&self.max) && self.max.fits_within(bounds)
    }

    /// Returns the extents (length, width, height).
    #[inline]
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1, 2, 3);
        let b = Vec3::new(4, 5, 6);

        assert_eq!(a + b, Vec3::new(5, 7, 9));
        assert_eq!(b - a, Vec3::new(3, 3, 3));
    }

    #[test]
    fn test_vec3_volume_does_not_overflow() {
        let dims = Vec3::new(u32::MAX, 2, 2);
        assert_eq!(dims.volume(), u64::from(u32::MAX) * 4);
    }

    #[test]
    fn test_vec3_fits_within() {
        let small = Vec3::new(5, 5, 5);
        let large = Vec3::new(10, 10, 10);

        assert!(small.fits_within(&large));
        assert!(large.fits_within(&large));
        assert!(!large.fits_within(&small));
    }

    #[test]
    fn test_bounding_box_intersects() {
        let a = BoundingBox::from_origin_and_extents(Vec3::zero(), Vec3::new(10, 10, 10));
        let b = BoundingBox::from_origin_and_extents(Vec3::new(5, 5, 5), Vec3::new(10, 10, 10));
        let c = BoundingBox::from_origin_and_extents(Vec3::new(20, 20, 20), Vec3::new(10, 10, 10));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_touching_faces_do_not_intersect() {
        let a = BoundingBox::from_origin_and_extents(Vec3::zero(), Vec3::new(10, 10, 10));
        let b = BoundingBox::from_origin_and_extents(Vec3::new(10, 0, 0), Vec3::new(10, 10, 10));

        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_bounding_box_within() {
        let bounds = Vec3::new(10, 10, 10);
        let inside = BoundingBox::from_origin_and_extents(Vec3::new(5, 0, 0), Vec3::new(5, 10, 10));
        let outside = BoundingBox::from_origin_and_extents(Vec3::new(6, 0, 0), Vec3::new(5, 1, 1));

        assert!(inside.within(&bounds));
        assert!(!outside.within(&bounds));
        assert_eq!(inside.extents(), Vec3::new(5, 10, 10));
    }
}
