//! Point color policy.
//!
//! With nothing selected every point takes its label's catalog color. With a
//! cluster selected, that cluster keeps its color and everything else is
//! dimmed to [`DIM_COLOR`].

use std::sync::Arc;

use catalog::LabelCatalog;
use foundation::{LabelIndex, PointIndex, Rgba};
use gpu::PointColors;
use scene::{DatasetView, SelectionState};
use serde::{Deserialize, Serialize};

/// Desaturated, low-opacity gray for points outside the selected cluster.
pub const DIM_COLOR: Rgba = Rgba::rgba(200, 200, 200, 77);

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColoringMode {
    /// No per-point override; the renderer uses its own coloring.
    #[serde(rename = "default")]
    Default,
    #[default]
    #[serde(rename = "label", alias = "by_label")]
    ByLabel,
}

impl ColoringMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ColoringMode::Default => "default",
            ColoringMode::ByLabel => "label",
        }
    }
}

impl std::str::FromStr for ColoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(ColoringMode::Default),
            "label" | "by_label" => Ok(ColoringMode::ByLabel),
            other => Err(format!("unknown coloring mode: {other}")),
        }
    }
}

/// Color of a point carrying `label` under `selection`.
pub fn label_color(label: LabelIndex, selection: SelectionState, catalog: &LabelCatalog) -> Rgba {
    match selection.selected_label() {
        Some(selected) if selected != label => DIM_COLOR,
        _ => catalog.color(label),
    }
}

/// Color of point `point` of `view`; `None` if the point is not in the view.
pub fn color_of(
    point: PointIndex,
    view: &DatasetView,
    selection: SelectionState,
    catalog: &LabelCatalog,
) -> Option<Rgba> {
    view.label_at(point)
        .map(|label| label_color(label, selection, catalog))
}

/// [`color_of`] bound to one view and one selection snapshot.
#[derive(Debug, Clone)]
pub struct LabelColorer {
    view: Arc<DatasetView>,
    selection: SelectionState,
    catalog: Arc<LabelCatalog>,
}

impl LabelColorer {
    pub fn new(view: Arc<DatasetView>, selection: SelectionState, catalog: Arc<LabelCatalog>) -> Self {
        Self {
            view,
            selection,
            catalog,
        }
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }
}

impl PointColors for LabelColorer {
    fn color(&self, point: PointIndex) -> Option<Rgba> {
        color_of(point, &self.view, self.selection, &self.catalog)
    }
}

/// The colorer to install for `mode`; `None` means default coloring.
pub fn colorer_for(
    mode: ColoringMode,
    view: &Arc<DatasetView>,
    selection: SelectionState,
    catalog: &Arc<LabelCatalog>,
) -> Option<Arc<dyn PointColors>> {
    match mode {
        ColoringMode::Default => None,
        ColoringMode::ByLabel => Some(Arc::new(LabelColorer::new(
            Arc::clone(view),
            selection,
            Arc::clone(catalog),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{DEFAULT_PALETTE, NOISE_COLOR};
    use foundation::math::Vec3;
    use scene::{DatasetViews, PointMetadata, build_views};

    fn views(labels: &[LabelIndex]) -> DatasetViews {
        let points = labels.iter().map(|_| Vec3::default()).collect();
        let metadata = labels.iter().map(|&l| PointMetadata::new(l, "x")).collect();
        build_views(points, metadata, 0).expect("views")
    }

    fn selected(label: LabelIndex) -> SelectionState {
        SelectionState::ClusterSelected {
            label,
            anchor: None,
        }
    }

    #[test]
    fn idle_uses_catalog_colors() {
        let v = views(&[0, 1, 2, 17]);
        let cat = LabelCatalog::default();
        let colors: Vec<_> = (0..4)
            .map(|i| color_of(i, v.full(), SelectionState::Idle, &cat))
            .collect();
        assert_eq!(
            colors,
            vec![
                Some(NOISE_COLOR),
                Some(DEFAULT_PALETTE[1]),
                Some(DEFAULT_PALETTE[2]),
                Some(DEFAULT_PALETTE[1])
            ]
        );
    }

    #[test]
    fn selection_keeps_cluster_and_dims_the_rest() {
        let v = views(&[0, 1, 2, 1]);
        let cat = LabelCatalog::default();
        let sel = selected(1);
        assert_eq!(color_of(0, v.full(), sel, &cat), Some(DIM_COLOR));
        assert_eq!(color_of(1, v.full(), sel, &cat), Some(DEFAULT_PALETTE[1]));
        assert_eq!(color_of(2, v.full(), sel, &cat), Some(DIM_COLOR));
        assert_eq!(color_of(3, v.full(), sel, &cat), Some(DEFAULT_PALETTE[1]));
    }

    #[test]
    fn color_of_is_idempotent() {
        let v = views(&[0, 3, 5]);
        let cat = LabelCatalog::default();
        for sel in [SelectionState::Idle, selected(3), selected(9)] {
            for i in 0..3 {
                assert_eq!(color_of(i, v.full(), sel, &cat), color_of(i, v.full(), sel, &cat));
            }
        }
    }

    #[test]
    fn out_of_view_point_has_no_color() {
        let v = views(&[1]);
        assert_eq!(
            color_of(1, v.full(), SelectionState::Idle, &LabelCatalog::default()),
            None
        );
    }

    #[test]
    fn default_mode_installs_no_colorer() {
        let v = views(&[0, 1]);
        let cat = Arc::new(LabelCatalog::default());
        assert!(colorer_for(ColoringMode::Default, v.full(), SelectionState::Idle, &cat).is_none());

        let colorer = colorer_for(ColoringMode::ByLabel, v.filtered(), selected(1), &cat)
            .expect("colorer");
        assert_eq!(colorer.color(0), Some(DEFAULT_PALETTE[1]));
        assert_eq!(colorer.color(1), None);
    }

    #[test]
    fn coloring_mode_parses_config_names() {
        assert_eq!("label".parse::<ColoringMode>(), Ok(ColoringMode::ByLabel));
        assert_eq!("default".parse::<ColoringMode>(), Ok(ColoringMode::Default));
        assert!("rainbow".parse::<ColoringMode>().is_err());
        assert_eq!(ColoringMode::default(), ColoringMode::ByLabel);
    }
}
