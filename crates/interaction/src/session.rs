use std::sync::Arc;

use catalog::LabelCatalog;
use foundation::{LabelIndex, PointIndex};
use formats::{ConfigError, LoadedDataset, ViewerConfig};
use gpu::{AtlasError, RenderMode, ScatterRenderer, SpriteAtlas};
use layers::{ColoringMode, LegendEntry, cluster_legend, colorer_for};
use runtime::{Deferred, EventBus, InputSeq};
use scene::{DatasetView, DatasetViews, SelectionState, Transition, ViewError, ViewKind, ViewManager};

use crate::bridge::{HoverInfo, resolve_hover, sprite_preview};
use crate::input::InputEvent;
use crate::panel::HoverPanel;

#[derive(Debug)]
pub enum SessionError {
    Config(ConfigError),
    View(ViewError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Config(e) => write!(f, "{e}"),
            SessionError::View(e) => write!(f, "dataset error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Session settings that are not part of the dataset.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub tile_size: u32,
    pub preview_size: u32,
    pub coloring: ColoringMode,
    pub render_mode: RenderMode,
    pub show_noise: bool,
}

impl From<&ViewerConfig> for SessionOptions {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            tile_size: config.tile_size,
            preview_size: config.preview_size,
            coloring: config.coloring,
            render_mode: config.render_mode,
            show_noise: config.show_noise,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

/// Sprite draw waiting for the sheet to finish decoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct PendingSprite {
    point: PointIndex,
    sprite_index: PointIndex,
}

/// Interactive state of one loaded dataset.
///
/// Every public mutator is one discrete input: it runs to completion, pushes
/// its consequences to the renderer and panel, and records a trace event.
pub struct Session<R, P> {
    manager: ViewManager,
    catalog: Arc<LabelCatalog>,
    options: SessionOptions,
    coloring: ColoringMode,
    render_mode: RenderMode,
    atlas: Option<SpriteAtlas>,
    sprite_gate: Deferred<PendingSprite>,
    seq: InputSeq,
    bus: EventBus,
    renderer: R,
    panel: P,
}

impl<R: ScatterRenderer, P: HoverPanel> Session<R, P> {
    /// Submits the initial view and coloring to `renderer`.
    pub fn new(
        views: DatasetViews,
        catalog: LabelCatalog,
        options: SessionOptions,
        renderer: R,
        panel: P,
    ) -> Self {
        let mut manager = ViewManager::new(views);
        if !options.show_noise {
            manager.set_noise_visible(false);
        }
        let mut session = Self {
            manager,
            catalog: Arc::new(catalog),
            options,
            coloring: options.coloring,
            render_mode: options.render_mode,
            atlas: None,
            sprite_gate: Deferred::new(),
            seq: InputSeq::default(),
            bus: EventBus::new(),
            renderer,
            panel,
        };
        session.submit_view();
        let view = session.manager.active_kind().as_str();
        session.bus.emit(session.seq, "init", format!("view {view}"));
        tracing::info!(
            view,
            points = session.current_view().len(),
            coloring = session.coloring.as_str(),
            noise_label = session.catalog.noise_label(),
            "session started"
        );
        session
    }

    pub fn from_config(
        dataset: LoadedDataset,
        config: &ViewerConfig,
        renderer: R,
        panel: P,
    ) -> Result<Self, SessionError> {
        config.validate().map_err(SessionError::Config)?;
        let catalog = config
            .build_catalog(&dataset.label_names)
            .map_err(SessionError::Config)?;
        let views = dataset
            .into_views(config.noise_label)
            .map_err(SessionError::View)?;
        Ok(Self::new(views, catalog, config.into(), renderer, panel))
    }

    pub fn current_view(&self) -> &Arc<DatasetView> {
        self.manager.current_view()
    }

    pub fn active_view(&self) -> ViewKind {
        self.manager.active_kind()
    }

    pub fn views(&self) -> &DatasetViews {
        self.manager.views()
    }

    pub fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> SelectionState {
        self.manager.selection()
    }

    pub fn coloring_mode(&self) -> ColoringMode {
        self.coloring
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn atlas(&self) -> Option<&SpriteAtlas> {
        self.atlas.as_ref()
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    /// Cluster buttons for the active view.
    pub fn legend(&self) -> Vec<LegendEntry> {
        cluster_legend(self.current_view(), &self.catalog, self.selection())
    }

    fn begin_input(&mut self) {
        self.seq = self.seq.next();
    }

    /// Installs the colorer for the current coloring mode and selection.
    fn apply_coloring(&mut self) {
        let colorer = colorer_for(
            self.coloring,
            self.manager.current_view(),
            self.manager.selection(),
            &self.catalog,
        );
        self.renderer.set_point_colorer(colorer);
    }

    /// Re-submits the active view, then re-applies render mode and coloring.
    fn submit_view(&mut self) {
        self.renderer.render(self.manager.current_view());
        self.renderer.set_render_mode(self.render_mode);
        self.apply_coloring();
    }

    fn record_selection(&mut self, t: Transition) {
        if t.changed() {
            tracing::debug!(
                from = %t.from,
                to = %t.to,
                anchor = ?t.to.selected_point(),
                "selection transition"
            );
            self.bus.emit(self.seq, "select", t.to.to_string());
        }
    }

    /// Shows or hides noise points by switching between the full and filtered views.
    ///
    /// The selection is reset in the same step, before anything is repainted.
    pub fn toggle_noise_visibility(&mut self, show_noise: bool) {
        self.begin_input();
        let switch = self.manager.set_noise_visible(show_noise);
        self.record_selection(switch.selection);
        self.bus.emit(self.seq, "view", switch.to.as_str());
        self.submit_view();
    }

    /// Selects `label`'s cluster, or deselects it if it is already selected.
    pub fn select_cluster(&mut self, label: Option<LabelIndex>) -> Transition {
        self.begin_input();
        let t = self.manager.select_cluster(label);
        self.record_selection(t);
        if self.coloring == ColoringMode::ByLabel {
            self.apply_coloring();
        }
        t
    }

    /// Switches between label coloring and the renderer's default coloring.
    ///
    /// Default coloring installs no colorer and clears the selection.
    pub fn set_coloring_mode(&mut self, mode: ColoringMode) {
        self.begin_input();
        self.coloring = mode;
        self.bus.emit(self.seq, "coloring", mode.as_str());
        tracing::info!(mode = mode.as_str(), "coloring mode");
        if mode == ColoringMode::Default && !self.manager.selection().is_idle() {
            let t = self.manager.reset_selection();
            self.record_selection(t);
        }
        self.apply_coloring();
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.begin_input();
        self.render_mode = mode;
        self.bus.emit(self.seq, "render_mode", mode.as_str());
        self.renderer.set_render_mode(mode);
        if mode == RenderMode::Sprites {
            // Sprites need the dataset re-submitted to show up.
            self.renderer.render(self.manager.current_view());
            self.apply_coloring();
        }
    }

    /// Renderer hover callback; `None` means nothing is under the cursor.
    pub fn on_hover(&mut self, point: Option<PointIndex>) -> HoverInfo {
        self.begin_input();
        let info = resolve_hover(self.manager.current_view(), &self.catalog, point);
        self.panel.show(&info);
        match &info {
            HoverInfo::Empty => {
                if self.sprite_gate.cancel().is_some() {
                    tracing::debug!("dropped deferred sprite draw");
                }
            }
            HoverInfo::Point {
                point,
                sprite_index,
                ..
            } => {
                let pending = PendingSprite {
                    point: *point,
                    sprite_index: *sprite_index,
                };
                match self.sprite_gate.run_or_park(pending) {
                    Some(p) => self.draw_sprite(p),
                    None => tracing::debug!(point, "sprite sheet not ready, deferring draw"),
                }
            }
        }
        info
    }

    /// Renderer click callback; `None` (or a stale index) means empty space.
    pub fn on_click(&mut self, point: Option<PointIndex>) -> Transition {
        self.begin_input();
        let t = self.manager.click(point);
        self.record_selection(t);
        if self.coloring == ColoringMode::ByLabel {
            self.apply_coloring();
        }
        t
    }

    /// The sprite sheet finished decoding.
    ///
    /// Builds the atlas and runs the deferred sprite draw, if any. A sheet
    /// narrower than one tile is a configuration error; previews stay disabled.
    pub fn sprite_sheet_ready(&mut self, width_px: u32, height_px: u32) -> Result<(), AtlasError> {
        self.begin_input();
        let atlas = match SpriteAtlas::new(self.options.tile_size, width_px) {
            Ok(a) => a.with_height(height_px),
            Err(e) => {
                tracing::error!(error = %e, "sprite atlas unusable");
                self.atlas = None;
                self.sprite_gate.cancel();
                self.bus.emit(self.seq, "atlas", format!("error: {e}"));
                return Err(e);
            }
        };
        self.atlas = Some(atlas);
        self.bus.emit(
            self.seq,
            "atlas",
            format!("{} tiles per row", atlas.tiles_per_row()),
        );
        tracing::info!(width_px, height_px, tiles_per_row = atlas.tiles_per_row(), "sprite sheet ready");
        if let Some(pending) = self.sprite_gate.mark_ready() {
            self.draw_sprite(pending);
        }
        Ok(())
    }

    fn draw_sprite(&mut self, pending: PendingSprite) {
        let Some(atlas) = self.atlas else {
            return;
        };
        let Some(preview) = sprite_preview(&atlas, pending.sprite_index, self.options.preview_size)
        else {
            tracing::warn!(sprite = pending.sprite_index, "sprite tile is not addressable");
            return;
        };
        if !atlas.covers(preview.address) {
            tracing::warn!(
                point = pending.point,
                sprite = pending.sprite_index,
                "sprite lies outside the decoded sheet"
            );
        }
        self.bus.emit(
            self.seq,
            "sprite",
            format!("sprite {} at ({}, {})", pending.sprite_index, preview.source.x, preview.source.y),
        );
        self.panel.draw_sprite(&preview);
    }

    /// Dispatches one input.
    pub fn handle(&mut self, event: InputEvent) -> Result<(), AtlasError> {
        match event {
            InputEvent::Hover { point } => {
                self.on_hover(point);
            }
            InputEvent::Click { point } => {
                self.on_click(point);
            }
            InputEvent::ToggleNoise { show } => self.toggle_noise_visibility(show),
            InputEvent::SelectCluster { label } => {
                self.select_cluster(label);
            }
            InputEvent::SetColoringMode { mode } => self.set_coloring_mode(mode),
            InputEvent::SetRenderMode { mode } => self.set_render_mode(mode),
            InputEvent::SpriteSheetReady {
                width_px,
                height_px,
            } => self.sprite_sheet_ready(width_px, height_px)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{DEFAULT_PALETTE, NOISE_COLOR};
    use foundation::math::Vec3;
    use gpu::{RecordingRenderer, RenderCommand};
    use layers::DIM_COLOR;
    use scene::{PointMetadata, build_views};

    use crate::panel::{PanelCommand, RecordingPanel};

    type TestSession = Session<RecordingRenderer, RecordingPanel>;

    // full: [0, 1, 1, 2, 0, 2]; filtered drops the two noise points.
    fn session(options: SessionOptions) -> TestSession {
        let labels = [0, 1, 1, 2, 0, 2];
        let metadata = labels
            .iter()
            .map(|&l| PointMetadata::new(l, format!("c{l}")).with_description(format!("{l}: c{l}")))
            .collect();
        let views = build_views(vec![Vec3::default(); labels.len()], metadata, 0).expect("views");
        Session::new(
            views,
            LabelCatalog::default(),
            options,
            RecordingRenderer::new(),
            RecordingPanel::new(),
        )
    }

    fn default_session() -> TestSession {
        session(SessionOptions::default())
    }

    #[test]
    fn init_submits_view_mode_and_coloring() {
        let s = default_session();
        let cmds = s.renderer().commands();
        assert!(matches!(
            cmds[0],
            RenderCommand::Render {
                view: ViewKind::Full,
                points: 6
            }
        ));
        assert!(matches!(cmds[1], RenderCommand::SetRenderMode { mode: RenderMode::Points }));
        assert!(s.renderer().has_colorer());
        assert_eq!(s.events().of_kind("init").count(), 1);
    }

    #[test]
    fn hidden_noise_at_start_uses_filtered_view() {
        let s = session(SessionOptions {
            show_noise: false,
            ..SessionOptions::default()
        });
        assert_eq!(s.active_view(), ViewKind::Filtered);
        assert_eq!(s.current_view().len(), 4);
    }

    #[test]
    fn click_sequence_selects_switches_and_clears() {
        let mut s = default_session();
        let t = s.on_click(Some(1));
        assert_eq!(
            t.to,
            SelectionState::ClusterSelected {
                label: 1,
                anchor: Some(1)
            }
        );
        let t = s.on_click(Some(3));
        assert_eq!(t.to.selected_label(), Some(2));
        let t = s.on_click(None);
        assert_eq!(t.to, SelectionState::Idle);
        assert_eq!(s.events().of_kind("select").count(), 3);
    }

    #[test]
    fn clicking_the_selected_cluster_again_deselects() {
        let mut s = default_session();
        s.on_click(Some(1));
        let t = s.on_click(Some(2));
        assert_eq!(t.to, SelectionState::Idle);
    }

    #[test]
    fn selection_dims_other_clusters_in_repaint() {
        let mut s = default_session();
        s.select_cluster(Some(2));
        let colors = s.renderer().repaint().expect("label coloring");
        assert_eq!(
            colors,
            vec![
                Some(DIM_COLOR),
                Some(DIM_COLOR),
                Some(DIM_COLOR),
                Some(DEFAULT_PALETTE[2]),
                Some(DIM_COLOR),
                Some(DEFAULT_PALETTE[2]),
            ]
        );

        s.select_cluster(None);
        let colors = s.renderer().repaint().expect("label coloring");
        assert_eq!(colors[0], Some(NOISE_COLOR));
        assert_eq!(colors[1], Some(DEFAULT_PALETTE[1]));
    }

    #[test]
    fn toggling_noise_resets_selection_and_rerenders() {
        let mut s = session(SessionOptions {
            render_mode: RenderMode::Sprites,
            ..SessionOptions::default()
        });
        s.on_click(Some(1));
        s.renderer_mut().drain();

        s.toggle_noise_visibility(false);
        assert!(s.selection().is_idle());
        assert_eq!(s.current_view().len(), 4);

        let cmds = s.renderer().commands();
        assert!(matches!(
            cmds[0],
            RenderCommand::Render {
                view: ViewKind::Filtered,
                points: 4
            }
        ));
        assert!(matches!(cmds[1], RenderCommand::SetRenderMode { mode: RenderMode::Sprites }));
        // Colorer sees the filtered view and an idle selection.
        let colors = s.renderer().repaint().expect("label coloring");
        assert_eq!(colors.len(), 4);
        assert!(colors.iter().all(|c| *c != Some(DIM_COLOR)));
    }

    #[test]
    fn default_coloring_removes_colorer_and_clears_selection() {
        let mut s = default_session();
        s.on_click(Some(3));
        s.set_coloring_mode(ColoringMode::Default);
        assert!(!s.renderer().has_colorer());
        assert!(s.selection().is_idle());

        // Selection changes no longer install a colorer.
        s.on_click(Some(3));
        assert!(!s.renderer().has_colorer());
        assert_eq!(s.selection().selected_label(), Some(2));

        s.set_coloring_mode(ColoringMode::ByLabel);
        let colors = s.renderer().repaint().expect("label coloring");
        assert_eq!(colors[1], Some(DIM_COLOR));
    }

    #[test]
    fn text_mode_survives_noise_toggle() {
        let mut s = default_session();
        s.set_render_mode(RenderMode::Text);
        s.renderer_mut().drain();
        s.toggle_noise_visibility(false);
        assert_eq!(s.renderer().mode(), RenderMode::Text);
        assert!(
            s.renderer()
                .commands()
                .iter()
                .any(|c| matches!(c, RenderCommand::SetRenderMode { mode: RenderMode::Text }))
        );
    }

    #[test]
    fn sprite_render_mode_resubmits_view() {
        let mut s = default_session();
        s.renderer_mut().drain();
        s.set_render_mode(RenderMode::Text);
        assert_eq!(s.renderer().commands().len(), 1);

        s.renderer_mut().drain();
        s.set_render_mode(RenderMode::Sprites);
        let cmds = s.renderer().commands();
        assert!(cmds.iter().any(|c| matches!(c, RenderCommand::Render { .. })));
        assert_eq!(s.renderer().mode(), RenderMode::Sprites);
    }

    #[test]
    fn hover_shows_panel_and_defers_sprite_until_ready() {
        let mut s = session(SessionOptions {
            show_noise: false,
            ..SessionOptions::default()
        });
        let info = s.on_hover(Some(1));
        match &info {
            HoverInfo::Point {
                label,
                description,
                sprite_index,
                ..
            } => {
                assert_eq!(label, "c1");
                assert_eq!(description, "1: c1");
                assert_eq!(*sprite_index, 2);
            }
            HoverInfo::Empty => panic!("expected a point"),
        }
        assert!(s.panel().last_sprite().is_none());

        s.sprite_sheet_ready(200, 100).expect("atlas");
        let sprite = s.panel().last_sprite().expect("deferred draw");
        assert_eq!(sprite.sprite_index, 2);
        assert_eq!((sprite.address.pixel_x, sprite.address.pixel_y), (100, 0));
        assert_eq!(sprite.preview_size, 150);

        // Once ready, hovers draw immediately.
        s.on_hover(Some(3));
        let sprite = s.panel().last_sprite().expect("draw");
        assert_eq!(sprite.sprite_index, 5);
        assert_eq!((sprite.address.column, sprite.address.row), (1, 1));
    }

    #[test]
    fn only_latest_parked_sprite_draws_and_empty_hover_cancels() {
        let mut s = default_session();
        s.on_hover(Some(1));
        s.on_hover(Some(3));
        s.sprite_sheet_ready(200, 100).expect("atlas");
        let draws: Vec<_> = s
            .panel()
            .commands()
            .iter()
            .filter_map(|c| match c {
                PanelCommand::DrawSprite { preview } => Some(preview.sprite_index),
                PanelCommand::Show { .. } => None,
            })
            .collect();
        assert_eq!(draws, vec![3]);

        let mut s = default_session();
        s.on_hover(Some(1));
        let info = s.on_hover(None);
        assert!(info.is_empty());
        s.sprite_sheet_ready(200, 100).expect("atlas");
        assert!(s.panel().last_sprite().is_none());
    }

    #[test]
    fn stale_hover_index_is_empty() {
        let mut s = session(SessionOptions {
            show_noise: false,
            ..SessionOptions::default()
        });
        let info = s.on_hover(Some(4));
        assert!(info.is_empty());
        assert_eq!(s.panel().last_info(), Some(&HoverInfo::Empty));
    }

    #[test]
    fn narrow_sheet_is_an_error_and_disables_previews() {
        let mut s = default_session();
        s.on_hover(Some(1));
        let err = s.sprite_sheet_ready(10, 10).expect_err("narrow sheet");
        assert!(matches!(err, AtlasError::Configuration { .. }));
        assert!(s.atlas().is_none());
        s.on_hover(Some(2));
        assert!(s.panel().last_sprite().is_none());
    }

    #[test]
    fn bad_sheet_after_good_one_disables_previews() {
        let mut s = default_session();
        s.sprite_sheet_ready(200, 100).expect("atlas");
        s.on_hover(Some(1));
        assert!(s.panel().last_sprite().is_some());

        s.panel_mut().drain();
        assert!(s.sprite_sheet_ready(10, 10).is_err());
        assert!(s.atlas().is_none());
        s.on_hover(Some(2));
        assert!(s.panel().last_sprite().is_none());
        assert!(s.panel().last_info().is_some_and(|i| !i.is_empty()));
    }

    #[test]
    fn legend_follows_active_view_and_selection() {
        let mut s = default_session();
        assert_eq!(s.legend().len(), 3);
        s.select_cluster(Some(1));
        s.toggle_noise_visibility(false);
        let legend = s.legend();
        assert_eq!(
            legend.iter().map(|e| e.label_index).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(legend.iter().all(|e| !e.active));
    }

    #[test]
    fn handle_dispatches_scripted_inputs() {
        let mut s = default_session();
        let script = crate::input::parse_script("click 1\nnoise off\nselect 2\nready 200 100\nhover 0\n")
            .expect("script");
        for event in script {
            s.handle(event).expect("handle");
        }
        assert_eq!(s.active_view(), ViewKind::Filtered);
        assert_eq!(s.selection().selected_label(), Some(2));
        assert_eq!(s.panel().last_sprite().map(|p| p.sprite_index), Some(1));
    }
}
