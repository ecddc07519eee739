//! Boundary to the scatter-plot rendering engine.
//!
//! The engine itself (camera, shaders, picking) lives outside this workspace;
//! the controller only talks to it through [`ScatterRenderer`].
//! [`RecordingRenderer`] is a headless implementation used by tests and the CLI.

use std::sync::Arc;

use foundation::{PointIndex, Rgba};
use scene::{DatasetView, ViewKind};
use serde::{Deserialize, Serialize};

/// Per-point color override installed into the renderer.
///
/// Called once per visible point on every repaint, so implementations must be
/// pure and cheap. `None` leaves the point at the renderer's default color.
pub trait PointColors: std::fmt::Debug + Send + Sync {
    fn color(&self, point: PointIndex) -> Option<Rgba>;
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Points,
    Sprites,
    Text,
}

impl RenderMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RenderMode::Points => "points",
            RenderMode::Sprites => "sprites",
            RenderMode::Text => "text",
        }
    }
}

impl std::str::FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "points" => Ok(RenderMode::Points),
            "sprites" => Ok(RenderMode::Sprites),
            "text" => Ok(RenderMode::Text),
            other => Err(format!("unknown render mode: {other}")),
        }
    }
}

pub trait ScatterRenderer {
    /// (Re)submits the dataset for drawing.
    fn render(&mut self, view: &Arc<DatasetView>);
    /// Installs a per-point colorer; `None` restores default coloring.
    fn set_point_colorer(&mut self, colorer: Option<Arc<dyn PointColors>>);
    fn set_render_mode(&mut self, mode: RenderMode);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    Render {
        view: ViewKind,
        points: usize,
    },
    /// `colors` is the repaint the colorer produced for the view on screen.
    SetPointColorer {
        colors: Option<Vec<Option<Rgba>>>,
    },
    SetRenderMode {
        mode: RenderMode,
    },
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<RenderCommand>,
    view: Option<Arc<DatasetView>>,
    colorer: Option<Arc<dyn PointColors>>,
    mode: RenderMode,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn drain(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn view(&self) -> Option<&Arc<DatasetView>> {
        self.view.as_ref()
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn has_colorer(&self) -> bool {
        self.colorer.is_some()
    }

    /// Colors for every point of the submitted view, as a repaint would see them.
    ///
    /// `None` when default coloring is active.
    pub fn repaint(&self) -> Option<Vec<Option<Rgba>>> {
        let colorer = self.colorer.as_ref()?;
        let len = self.view.as_ref().map_or(0, |v| v.len());
        Some((0..len).map(|i| colorer.color(i)).collect())
    }
}

impl ScatterRenderer for RecordingRenderer {
    fn render(&mut self, view: &Arc<DatasetView>) {
        tracing::debug!(view = view.kind().as_str(), points = view.len(), "render");
        self.view = Some(Arc::clone(view));
        self.commands.push(RenderCommand::Render {
            view: view.kind(),
            points: view.len(),
        });
    }

    fn set_point_colorer(&mut self, colorer: Option<Arc<dyn PointColors>>) {
        self.colorer = colorer;
        let colors = self.repaint();
        self.commands.push(RenderCommand::SetPointColorer { colors });
    }

    fn set_render_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
        self.commands.push(RenderCommand::SetRenderMode { mode });
    }
}
