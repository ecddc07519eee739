/// Position of a point inside one dataset view.
///
/// Points are never materialized; every per-point column is addressed by this index.
pub type PointIndex = usize;

/// Cluster label attached to every point.
///
/// Signed because some datasets mark noise with `-1` instead of `0`.
pub type LabelIndex = i32;

/// Label conventionally used for noise/unlabeled points.
pub const DEFAULT_NOISE_LABEL: LabelIndex = 0;
