use std::collections::BTreeMap;

use catalog::LabelCatalog;
use foundation::{LabelIndex, Rgba};
use scene::{DatasetView, SelectionState};
use serde::Serialize;

/// One cluster button: `"<index>:"` prefix, catalog name and color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub label_index: LabelIndex,
    pub prefix: String,
    pub name: String,
    pub color: Rgba,
    pub point_count: usize,
    /// Whether this cluster is the current selection.
    pub active: bool,
}

/// Clusters present in `view`, ascending by label index.
pub fn cluster_legend(
    view: &DatasetView,
    catalog: &LabelCatalog,
    selection: SelectionState,
) -> Vec<LegendEntry> {
    let mut counts: BTreeMap<LabelIndex, usize> = BTreeMap::new();
    for meta in view.metadata() {
        *counts.entry(meta.label_index).or_default() += 1;
    }
    let selected = selection.selected_label();
    counts
        .into_iter()
        .map(|(label, point_count)| LegendEntry {
            label_index: label,
            prefix: format!("{label}:"),
            name: catalog.name(label).to_string(),
            color: catalog.color(label),
            point_count,
            active: selected == Some(label),
        })
        .collect()
}
