use serde::Serialize;

use crate::math::Vec3;

/// Axis-aligned bounding box over point coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Aabb3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb3 {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Aabb3 { min, max }
    }

    /// Bounds of all finite points, or `None` when there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut out: Option<Self> = None;
        for p in points.into_iter().filter(|p| p.is_finite()) {
            let a = p.to_array();
            match &mut out {
                None => out = Some(Self::new(a, a)),
                Some(b) => {
                    for k in 0..3 {
                        b.min[k] = b.min[k].min(a[k]);
                        b.max[k] = b.max[k].max(a[k]);
                    }
                }
            }
        }
        out
    }
}
