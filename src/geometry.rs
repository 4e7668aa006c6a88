//! Geometric helpers for rotations, collision detection and origin search.
//!
//! The origin search only ever needs a handful of coordinates per axis: the
//! lexicographically first collision-free origin of a box is always made of
//! zeros and far faces of boxes already placed, so scanning those in
//! ascending order finds the same origin as a scan over every integer.

use crate::types::{BoundingBox, Vec3};

/// Axis permutations in enumeration order.
///
/// Each entry maps (length, width, height) of the package onto the ULD's
/// (x, y, z) axes.
const ORIENTATIONS: [(usize, usize, usize); 6] = [
    (0, 1, 2),
    (0, 2, 1),
    (1, 0, 2),
    (1, 2, 0),
    (2, 0, 1),
    (2, 1, 0),
];

/// Returns the six axis-aligned rotations of `dims` in enumeration order.
///
/// Packages with repeated extents yield repeated rotations; callers treat
/// them like any other rotation.
pub fn rotations(dims: Vec3) -> [Vec3; 6] {
    let axes = [dims.x, dims.y, dims.z];
    ORIENTATIONS.map(|(a, b, c)| Vec3::new(axes[a], axes[b], axes[c]))
}

/// Checks whether `candidate` collides with any already placed box.
pub fn collides_with_any(candidate: &BoundingBox, placed: &[BoundingBox]) -> bool {
    placed.iter().any(|p| p.intersects(candidate))
}

/// Candidate origin coordinates along one axis.
///
/// Collects zero and the far face of every placed box, keeps those leaving
/// room for `extent` before `limit`, and returns them sorted and unique.
fn axis_candidates(
    limit: u32,
    extent: u32,
    placed: &[BoundingBox],
    far_face: impl Fn(&BoundingBox) -> u32,
) -> Vec<u32> {
    let max_origin = limit - extent;
    let mut positions: Vec<u32> = placed
        .iter()
        .map(far_face)
        .filter(|&pos| pos <= max_origin)
        .collect();
    positions.push(0);
    positions.sort_unstable();
    positions.dedup();
    positions
}

/// Finds the first origin in ascending (x, y, z) order at which a box of
/// `extents` fits inside `bounds` without touching the interior of any
/// placed box.
///
/// Returns `None` if the rotated box exceeds `bounds` on some axis or every
/// candidate origin collides.
pub fn first_free_origin(bounds: Vec3, extents: Vec3, placed: &[BoundingBox]) -> Option<Vec3> {
    if !extents.fits_within(&bounds) {
        return None;
    }

    let xs = axis_candidates(bounds.x, extents.x, placed, |b| b.max.x);
    let ys = axis_candidates(bounds.y, extents.y, placed, |b| b.max.y);
    let zs = axis_candidates(bounds.z, extents.z, placed, |b| b.max.z);

    for &x in &xs {
        for &y in &ys {
            for &z in &zs {
                let origin = Vec3::new(x, y, z);
                let candidate = BoundingBox::from_origin_and_extents(origin, extents);
                if !collides_with_any(&candidate, placed) {
                    return Some(origin);
                }
            }
        }
    }
    None
}

/// Capacity-only origin: the corner of the ULD, if the rotation fits at all.
///
/// Reproduces the legacy behavior where previously placed boxes are never
/// consulted.
pub fn corner_origin(bounds: Vec3, extents: Vec3) -> Option<Vec3> {
    extents.fits_within(&bounds).then(Vec3::zero)
}
