use std::sync::Arc;

use foundation::math::Vec3;
use foundation::{LabelIndex, PointIndex};
use serde::{Deserialize, Serialize};

/// Per-point metadata, attached when the dataset is built and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointMetadata {
    pub label_index: LabelIndex,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PointMetadata {
    pub fn new(label_index: LabelIndex, label: impl Into<String>) -> Self {
        Self {
            label_index,
            label: label.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Every point of the dataset.
    Full,
    /// Every point whose label is not the noise label.
    Filtered,
}

impl ViewKind {
    pub fn for_noise_visibility(show_noise: bool) -> Self {
        if show_noise { ViewKind::Full } else { ViewKind::Filtered }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewKind::Full => "full",
            ViewKind::Filtered => "filtered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    LengthMismatch { points: usize, metadata: usize },
}

impl std::fmt::Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewError::LengthMismatch { points, metadata } => write!(
                f,
                "dataset has {points} points but {metadata} metadata entries"
            ),
        }
    }
}

impl std::error::Error for ViewError {}

/// An immutable, positionally addressed slice of the dataset.
///
/// `sprite_indices`, when present, maps each point of this view to its index in
/// the full view, which is the layout of the sprite atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetView {
    kind: ViewKind,
    points: Vec<Vec3>,
    metadata: Vec<PointMetadata>,
    sprite_indices: Option<Vec<PointIndex>>,
}

impl DatasetView {
    /// Builds the full view. Points and metadata must have the same length.
    pub fn full(points: Vec<Vec3>, metadata: Vec<PointMetadata>) -> Result<Self, ViewError> {
        if points.len() != metadata.len() {
            return Err(ViewError::LengthMismatch {
                points: points.len(),
                metadata: metadata.len(),
            });
        }
        Ok(Self {
            kind: ViewKind::Full,
            points,
            metadata,
            sprite_indices: None,
        })
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn metadata(&self) -> &[PointMetadata] {
        &self.metadata
    }

    pub fn sprite_indices(&self) -> Option<&[PointIndex]> {
        self.sprite_indices.as_deref()
    }

    pub fn point(&self, index: PointIndex) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    pub fn metadata_at(&self, index: PointIndex) -> Option<&PointMetadata> {
        self.metadata.get(index)
    }

    pub fn label_at(&self, index: PointIndex) -> Option<LabelIndex> {
        self.metadata.get(index).map(|m| m.label_index)
    }

    /// Index of `index`'s sprite in the full view's atlas layout.
    pub fn sprite_index(&self, index: PointIndex) -> Option<PointIndex> {
        if index >= self.len() {
            return None;
        }
        match &self.sprite_indices {
            Some(sprites) => sprites.get(index).copied(),
            None => Some(index),
        }
    }

    /// First point (in index order) carrying `label`.
    pub fn first_index_with_label(&self, label: LabelIndex) -> Option<PointIndex> {
        self.metadata.iter().position(|m| m.label_index == label)
    }

    /// Keeps every point whose label differs from `noise_label`, in one
    /// left-to-right scan, recording each kept point's full-view index.
    fn filter_noise(full: &DatasetView, noise_label: LabelIndex) -> Self {
        let mut points = Vec::new();
        let mut metadata = Vec::new();
        let mut sprite_indices = Vec::new();
        for (index, (point, meta)) in full.points.iter().zip(&full.metadata).enumerate() {
            if meta.label_index == noise_label {
                continue;
            }
            points.push(*point);
            metadata.push(meta.clone());
            sprite_indices.push(full.sprite_index(index).unwrap_or(index));
        }
        Self {
            kind: ViewKind::Filtered,
            points,
            metadata,
            sprite_indices: Some(sprite_indices),
        }
    }
}

/// The two views derived from one dataset. Both are built once and shared.
#[derive(Debug, Clone)]
pub struct DatasetViews {
    full: Arc<DatasetView>,
    filtered: Arc<DatasetView>,
    noise_label: LabelIndex,
}

impl DatasetViews {
    pub fn full(&self) -> &Arc<DatasetView> {
        &self.full
    }

    pub fn filtered(&self) -> &Arc<DatasetView> {
        &self.filtered
    }

    pub fn get(&self, kind: ViewKind) -> &Arc<DatasetView> {
        match kind {
            ViewKind::Full => &self.full,
            ViewKind::Filtered => &self.filtered,
        }
    }

    pub fn noise_label(&self) -> LabelIndex {
        self.noise_label
    }

    /// Number of points dropped by the filtered view.
    pub fn noise_count(&self) -> usize {
        self.full.len() - self.filtered.len()
    }
}

pub fn build_views(
    points: Vec<Vec3>,
    metadata: Vec<PointMetadata>,
    noise_label: LabelIndex,
) -> Result<DatasetViews, ViewError> {
    let full = DatasetView::full(points, metadata)?;
    let filtered = DatasetView::filter_noise(&full, noise_label);
    tracing::debug!(
        full = full.len(),
        filtered = filtered.len(),
        noise_label,
        "built dataset views"
    );
    Ok(DatasetViews {
        full: Arc::new(full),
        filtered: Arc::new(filtered),
        noise_label,
    })
}
