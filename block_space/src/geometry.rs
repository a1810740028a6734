//! Ray and axis-aligned box math used by gaze and tap picking.

use bevy::math::Vec3;

use crate::error::GeometryError;

/// Axis-aligned box stored as centre + half extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingVolume {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl BoundingVolume {
    pub fn new(center: Vec3, half_extents: Vec3) -> Result<Self, GeometryError> {
        if !center.is_finite() || !half_extents.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        if half_extents.min_element() < 0.0 {
            return Err(GeometryError::NegativeExtents(half_extents.to_array()));
        }
        Ok(Self {
            center,
            half_extents,
        })
    }

    /// Cube of the given edge length centred on `center`.
    pub fn from_edge(center: Vec3, edge: f32) -> Result<Self, GeometryError> {
        Self::new(center, Vec3::splat(edge / 2.0))
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            center: self.center + offset,
            half_extents: self.half_extents,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let delta = (point - self.center).abs();
        delta.cmple(self.half_extents).all()
    }
}

/// A validated ray with a unit-length direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Result<Self, GeometryError> {
        if !origin.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        let direction = checked_direction(direction)?;
        Ok(Self {
            origin,
            direction: direction.normalize(),
        })
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance to the entry point of `volume`, or `None` on a miss.
    /// Negative when the origin is inside the box.
    pub fn intersect(&self, volume: &BoundingVolume) -> Option<f32> {
        slab_distance(self.origin, self.direction, volume.min(), volume.max())
    }
}

/// Slab test returning whether the ray hits the box at all.
pub fn intersect_ray_aabb(
    origin: Vec3,
    direction: Vec3,
    box_min: Vec3,
    box_max: Vec3,
) -> Result<bool, GeometryError> {
    ray_aabb_distance(origin, direction, box_min, box_max).map(|hit| hit.is_some())
}

/// Slab test returning `tNear` (in units of `direction`) on a hit.
pub fn ray_aabb_distance(
    origin: Vec3,
    direction: Vec3,
    box_min: Vec3,
    box_max: Vec3,
) -> Result<Option<f32>, GeometryError> {
    if !origin.is_finite() || !box_min.is_finite() || !box_max.is_finite() {
        return Err(GeometryError::NonFinite);
    }
    let direction = checked_direction(direction)?;
    Ok(slab_distance(origin, direction, box_min, box_max))
}

fn checked_direction(direction: Vec3) -> Result<Vec3, GeometryError> {
    if !direction.is_finite() {
        return Err(GeometryError::NonFinite);
    }
    if direction.length_squared() <= f32::EPSILON * f32::EPSILON {
        return Err(GeometryError::ZeroDirection);
    }
    Ok(direction)
}

fn slab_distance(origin: Vec3, direction: Vec3, box_min: Vec3, box_max: Vec3) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let (lo, hi) = (box_min[axis], box_max[axis]);

        // Parallel to this slab: 1/d would turn the comparisons into NaN.
        if d == 0.0 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let t1 = (lo - o) / d;
        let t2 = (hi - o) / d;
        t_near = t_near.max(t1.min(t2));
        t_far = t_far.min(t1.max(t2));
    }

    (t_near <= t_far && t_far >= 0.0).then_some(t_near)
}
