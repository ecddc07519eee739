use foundation::{LabelIndex, PointIndex};
use serde::Serialize;

use crate::view::DatasetView;

/// Cluster selection state.
///
/// `anchor` is the first point of the selected cluster in the view the
/// selection was made against. It is view-relative, which is why any view
/// switch must reset the selection.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    Idle,
    ClusterSelected {
        label: LabelIndex,
        anchor: Option<PointIndex>,
    },
}

impl SelectionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SelectionState::Idle)
    }

    pub fn selected_label(&self) -> Option<LabelIndex> {
        match self {
            SelectionState::Idle => None,
            SelectionState::ClusterSelected { label, .. } => Some(*label),
        }
    }

    pub fn selected_point(&self) -> Option<PointIndex> {
        match self {
            SelectionState::Idle => None,
            SelectionState::ClusterSelected { anchor, .. } => *anchor,
        }
    }
}

impl std::fmt::Display for SelectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionState::Idle => write!(f, "idle"),
            SelectionState::ClusterSelected { label, anchor: Some(a) } => {
                write!(f, "cluster {label} (anchor {a})")
            }
            SelectionState::ClusterSelected { label, anchor: None } => {
                write!(f, "cluster {label}")
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: SelectionState,
    pub to: SelectionState,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// At-most-one cluster selection.
///
/// Transitions:
/// - selecting the label that is already selected deselects it;
/// - selecting another label moves the selection there;
/// - selecting nothing (click on empty space) returns to idle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterSelection {
    state: SelectionState,
}

impl ClusterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Click on a rendered point, or on empty space when `point` is `None`.
    ///
    /// A point outside `view` counts as empty space.
    pub fn click(&mut self, view: &DatasetView, point: Option<PointIndex>) -> Transition {
        let label = point.and_then(|p| view.label_at(p));
        self.select(view, label)
    }

    /// Requests selection of `label`, e.g. from a legend button.
    pub fn select(&mut self, view: &DatasetView, label: Option<LabelIndex>) -> Transition {
        let from = self.state;
        self.state = match (from.selected_label(), label) {
            (_, None) => SelectionState::Idle,
            (Some(current), Some(l)) if current == l => SelectionState::Idle,
            (_, Some(l)) => SelectionState::ClusterSelected {
                label: l,
                anchor: view.first_index_with_label(l),
            },
        };
        Transition {
            from,
            to: self.state,
        }
    }

    pub fn reset(&mut self) -> Transition {
        let from = self.state;
        self.state = SelectionState::Idle;
        Transition {
            from,
            to: self.state,
        }
    }
}
