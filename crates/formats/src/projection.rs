//! Projection datasets: per-point labels, label names and 2D/3D coordinates.
//!
//! ```json
//! { "label": [0, 1, 1], "labelNames": ["noise", "cats"], "projection": [[0.1, 0.2], ...] }
//! ```
//!
//! `labels` is accepted as an alias of `label`. Two-component rows are lifted
//! onto `z = 0`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use catalog::{LabelCatalog, UNKNOWN_LABEL};
use foundation::LabelIndex;
use foundation::math::Vec3;
use scene::{DatasetViews, PointMetadata, ViewError, build_views};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectionData {
    #[serde(alias = "labels")]
    pub label: Vec<LabelIndex>,
    #[serde(rename = "labelNames", default)]
    pub label_names: Vec<String>,
    pub projection: Vec<Vec<f64>>,
}

#[derive(Debug)]
pub enum ProjectionError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    LengthMismatch {
        labels: usize,
        points: usize,
    },
    BadCoordinate {
        index: usize,
        dims: usize,
    },
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            ProjectionError::Parse(err) => write!(f, "projection parse error: {err}"),
            ProjectionError::LengthMismatch { labels, points } => {
                write!(f, "{labels} labels for {points} projected points")
            }
            ProjectionError::BadCoordinate { index, dims } => {
                write!(f, "point {index} has {dims} components, expected 2 or 3")
            }
        }
    }
}

impl std::error::Error for ProjectionError {}

/// A projection turned into per-point columns.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDataset {
    pub points: Vec<Vec3>,
    pub metadata: Vec<PointMetadata>,
    pub label_names: Vec<String>,
    /// blake3 over labels, names and coordinates.
    pub content_hash: String,
}

impl ProjectionData {
    pub fn from_json_str(payload: &str) -> Result<Self, ProjectionError> {
        serde_json::from_str(payload).map_err(ProjectionError::Parse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectionError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(|source| ProjectionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&payload)
    }

    fn label_name(&self, label: LabelIndex) -> &str {
        usize::try_from(label)
            .ok()
            .and_then(|i| self.label_names.get(i))
            .map(String::as_str)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.label.len() as u64).to_le_bytes());
        for l in &self.label {
            hasher.update(&l.to_le_bytes());
        }
        hasher.update(&(self.label_names.len() as u64).to_le_bytes());
        for n in &self.label_names {
            hasher.update(&(n.len() as u64).to_le_bytes());
            hasher.update(n.as_bytes());
        }
        for row in &self.projection {
            hasher.update(&(row.len() as u64).to_le_bytes());
            for c in row {
                hasher.update(&c.to_le_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Builds point coordinates and metadata.
    ///
    /// Each point is labelled with its label's name and described as
    /// `"<label index>: <name>"`.
    pub fn into_dataset(self) -> Result<LoadedDataset, ProjectionError> {
        if self.label.len() != self.projection.len() {
            return Err(ProjectionError::LengthMismatch {
                labels: self.label.len(),
                points: self.projection.len(),
            });
        }
        let content_hash = self.content_hash();

        let mut points = Vec::with_capacity(self.projection.len());
        for (index, row) in self.projection.iter().enumerate() {
            let p = Vec3::from_slice(row).ok_or(ProjectionError::BadCoordinate {
                index,
                dims: row.len(),
            })?;
            points.push(p);
        }

        let metadata = self
            .label
            .iter()
            .map(|&label| {
                let name = self.label_name(label);
                PointMetadata::new(label, name).with_description(format!("{label}: {name}"))
            })
            .collect();

        tracing::debug!(points = points.len(), hash = %content_hash, "loaded projection");
        Ok(LoadedDataset {
            points,
            metadata,
            label_names: self.label_names,
            content_hash,
        })
    }
}

impl LoadedDataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectionError> {
        ProjectionData::load(path)?.into_dataset()
    }

    pub fn catalog(&self, noise_label: LabelIndex) -> LabelCatalog {
        LabelCatalog::from_label_names(&self.label_names, noise_label)
    }

    pub fn into_views(self, noise_label: LabelIndex) -> Result<DatasetViews, ViewError> {
        build_views(self.points, self.metadata, noise_label)
    }
}
