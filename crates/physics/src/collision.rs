use cubescene_math::Vector3;
use serde::{Deserialize, Serialize};

/// Whether a sphere overlaps an axis-aligned box.
///
/// Clamps the center into the box to find the closest point, then compares the
/// squared distance against `radius²` with a strict less-than: a sphere that
/// exactly touches a face does not intersect.
pub fn sphere_intersects_box(center: Vector3, radius: f32, box_min: Vector3, box_max: Vector3) -> bool {
    let closest = Vector3::new(
        center.x.clamp(box_min.x, box_max.x),
        center.y.clamp(box_min.y, box_max.y),
        center.z.clamp(box_min.z, box_max.z),
    );
    (center - closest).length_squared() < radius * radius
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vector3,
    pub max: Vector3,
}

impl Aabb {
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Box spanning `center ± half_extent` on every axis.
    pub fn from_center_half_extent(center: Vector3, half_extent: f32) -> Self {
        let h = Vector3::new(half_extent, half_extent, half_extent);
        Self {
            min: center - h,
            max: center + h,
        }
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains_point(&self, p: Vector3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn intersects_sphere(&self, center: Vector3, radius: f32) -> bool {
        sphere_intersects_box(center, radius, self.min, self.max)
    }
}
