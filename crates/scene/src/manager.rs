use std::sync::Arc;

use foundation::{LabelIndex, PointIndex};

use crate::selection::{ClusterSelection, SelectionState, Transition};
use crate::view::{DatasetView, DatasetViews, ViewKind};

/// Outcome of an active-view switch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ViewSwitch {
    pub from: ViewKind,
    pub to: ViewKind,
    /// The reset applied to the selection as part of the switch.
    pub selection: Transition,
}

impl ViewSwitch {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Owns both dataset views, the active-view pointer and the cluster selection.
///
/// The selection lives next to the pointer so a view switch and the selection
/// reset happen in the same `&mut` call: no reader can observe a selection
/// computed against the other view's indices.
#[derive(Debug, Clone)]
pub struct ViewManager {
    views: DatasetViews,
    active: ViewKind,
    selection: ClusterSelection,
}

impl ViewManager {
    /// Starts on the full view with nothing selected.
    pub fn new(views: DatasetViews) -> Self {
        Self {
            views,
            active: ViewKind::Full,
            selection: ClusterSelection::new(),
        }
    }

    pub fn views(&self) -> &DatasetViews {
        &self.views
    }

    pub fn active_kind(&self) -> ViewKind {
        self.active
    }

    pub fn current_view(&self) -> &Arc<DatasetView> {
        self.views.get(self.active)
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.state()
    }

    /// Swaps the active view and resets the selection.
    pub fn set_active_view(&mut self, kind: ViewKind) -> ViewSwitch {
        let from = self.active;
        self.active = kind;
        let selection = self.selection.reset();
        if from != kind {
            tracing::info!(from = from.as_str(), to = kind.as_str(), "active view switched");
        }
        ViewSwitch {
            from,
            to: kind,
            selection,
        }
    }

    pub fn set_noise_visible(&mut self, show_noise: bool) -> ViewSwitch {
        self.set_active_view(ViewKind::for_noise_visibility(show_noise))
    }

    pub fn click(&mut self, point: Option<PointIndex>) -> Transition {
        let view = Arc::clone(self.views.get(self.active));
        self.selection.click(&view, point)
    }

    pub fn select_cluster(&mut self, label: Option<LabelIndex>) -> Transition {
        let view = Arc::clone(self.views.get(self.active));
        self.selection.select(&view, label)
    }

    pub fn reset_selection(&mut self) -> Transition {
        self.selection.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::ViewManager;
    use crate::selection::SelectionState;
    use crate::view::ViewKind;
    use crate::view::tests::views;

    #[test]
    fn starts_on_full_view_idle() {
        let m = ViewManager::new(views(&[0, 1], 0));
        assert_eq!(m.active_kind(), ViewKind::Full);
        assert_eq!(m.current_view().len(), 2);
        assert!(m.selection().is_idle());
    }

    #[test]
    fn view_switch_always_resets_selection() {
        let mut m = ViewManager::new(views(&[0, 1, 1, 2], 0));
        for target in [ViewKind::Filtered, ViewKind::Full, ViewKind::Full] {
            m.click(Some(2));
            assert!(!m.selection().is_idle());
            let switch = m.set_active_view(target);
            assert_eq!(switch.to, target);
            assert!(switch.selection.to.is_idle());
            assert!(m.selection().is_idle());
        }
    }

    #[test]
    fn noise_toggle_selects_view() {
        let mut m = ViewManager::new(views(&[0, 1, 1, 2], 0));
        let s = m.set_noise_visible(false);
        assert!(s.changed());
        assert_eq!(m.current_view().len(), 3);
        assert!(!m.set_noise_visible(false).changed());
        m.set_noise_visible(true);
        assert_eq!(m.current_view().len(), 4);
    }

    #[test]
    fn clicks_resolve_against_active_view() {
        let mut m = ViewManager::new(views(&[0, 1, 1, 2], 0));
        m.set_noise_visible(false);
        // Filtered index 0 is full index 1 (label 1).
        m.click(Some(0));
        assert_eq!(
            m.selection(),
            SelectionState::ClusterSelected {
                label: 1,
                anchor: Some(0)
            }
        );
        m.select_cluster(Some(1));
        assert!(m.selection().is_idle());
    }
}
