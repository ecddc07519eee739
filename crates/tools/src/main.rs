use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use foundation::{Aabb3, LabelIndex, PointIndex, Rgba};
use formats::{LoadedDataset, ViewerConfig};
use gpu::{AtlasAddress, RecordingRenderer, RenderCommand};
use interaction::{PanelCommand, RecordingPanel, Session, parse_script};
use layers::{ColoringMode, LegendEntry, cluster_legend, colorer_for};
use scene::{ClusterSelection, SelectionState, ViewKind};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "scatter", about = "Inspect and replay labeled scatter-plot datasets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Dataset summary, identity and cluster legend.
    Inspect {
        #[command(flatten)]
        dataset: DatasetArgs,
    },
    /// Sprite-sheet address of a point in the active view.
    Resolve {
        #[command(flatten)]
        dataset: DatasetArgs,
        #[arg(long)]
        point: PointIndex,
        /// Decoded sprite-sheet width in pixels.
        #[arg(long)]
        sheet_width: u32,
    },
    /// Per-point colors, optionally with one cluster selected.
    Colors {
        #[command(flatten)]
        dataset: DatasetArgs,
        #[arg(long, allow_negative_numbers = true)]
        select: Option<LabelIndex>,
    },
    /// Feed an input script through a headless session and print the trace.
    Replay {
        #[command(flatten)]
        dataset: DatasetArgs,
        script: PathBuf,
    },
}

#[derive(Debug, Args)]
struct DatasetArgs {
    /// Projection JSON (`label`, `labelNames`, `projection`).
    projection: PathBuf,
    /// Viewer config JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, allow_negative_numbers = true)]
    noise_label: Option<LabelIndex>,
    #[arg(long)]
    tile_size: Option<u32>,
    /// Start on the view without noise points.
    #[arg(long)]
    hide_noise: bool,
    #[arg(long)]
    coloring: Option<ColoringMode>,
}

impl DatasetArgs {
    fn load(&self) -> Result<(LoadedDataset, ViewerConfig), String> {
        let mut config =
            ViewerConfig::load_or_default(self.config.as_deref()).map_err(|e| e.to_string())?;
        if let Some(noise_label) = self.noise_label {
            config.noise_label = noise_label;
        }
        if let Some(tile_size) = self.tile_size {
            config.tile_size = tile_size;
        }
        if self.hide_noise {
            config.show_noise = false;
        }
        if let Some(coloring) = self.coloring {
            config.coloring = coloring;
        }
        config.validate().map_err(|e| e.to_string())?;

        let dataset = LoadedDataset::load(&self.projection).map_err(|e| e.to_string())?;
        tracing::info!(
            path = %self.projection.display(),
            points = dataset.points.len(),
            id = %dataset.content_hash,
            "loaded projection"
        );
        Ok((dataset, config))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    match Cli::parse().command {
        Command::Inspect { dataset } => cmd_inspect(&dataset),
        Command::Resolve {
            dataset,
            point,
            sheet_width,
        } => cmd_resolve(&dataset, point, sheet_width),
        Command::Colors { dataset, select } => cmd_colors(&dataset, select),
        Command::Replay { dataset, script } => cmd_replay(&dataset, script),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}

#[derive(Serialize)]
struct InspectReport {
    dataset: String,
    points: usize,
    noise_label: LabelIndex,
    noise_points: usize,
    filtered_points: usize,
    active_view: &'static str,
    /// Sprite sheet the atlas is cut from; `ready W H` in a replay stands for its decode.
    sprite_image: String,
    tile_size: u32,
    palette: Vec<Rgba>,
    /// Extent of all finite points; `None` for an empty dataset.
    bounds: Option<Aabb3>,
    legend: Vec<LegendEntry>,
}

fn cmd_inspect(args: &DatasetArgs) -> Result<(), String> {
    let (dataset, config) = args.load()?;
    let catalog = config
        .build_catalog(&dataset.label_names)
        .map_err(|e| e.to_string())?;
    let id = dataset.content_hash.clone();
    let views = dataset
        .into_views(config.noise_label)
        .map_err(|e| e.to_string())?;
    let kind = ViewKind::for_noise_visibility(config.show_noise);

    print_json(&InspectReport {
        dataset: id,
        points: views.full().len(),
        noise_label: views.noise_label(),
        noise_points: views.noise_count(),
        filtered_points: views.filtered().len(),
        active_view: kind.as_str(),
        sprite_image: config.sprite_image.clone(),
        tile_size: config.tile_size,
        palette: catalog.palette().to_vec(),
        bounds: Aabb3::from_points(views.full().points()),
        legend: cluster_legend(views.get(kind), &catalog, SelectionState::Idle),
    })
}

#[derive(Serialize)]
struct ResolveReport {
    view: &'static str,
    point: PointIndex,
    sprite_index: PointIndex,
    tile_size: u32,
    address: AtlasAddress,
}

fn cmd_resolve(args: &DatasetArgs, point: PointIndex, sheet_width: u32) -> Result<(), String> {
    let (dataset, config) = args.load()?;
    let views = dataset
        .into_views(config.noise_label)
        .map_err(|e| e.to_string())?;
    let kind = ViewKind::for_noise_visibility(config.show_noise);
    let view = views.get(kind);

    let sprite_index = view.sprite_index(point).ok_or_else(|| {
        format!(
            "point {point} is outside the {} view ({} points)",
            kind.as_str(),
            view.len()
        )
    })?;
    let address = gpu::resolve(point, view, config.tile_size, sheet_width)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("sprite {sprite_index} has no addressable tile"))?;

    print_json(&ResolveReport {
        view: kind.as_str(),
        point,
        sprite_index,
        tile_size: config.tile_size,
        address,
    })
}

#[derive(Serialize)]
struct PointColor {
    point: PointIndex,
    label: LabelIndex,
    color: Option<Rgba>,
}

#[derive(Serialize)]
struct ColorsReport {
    view: &'static str,
    coloring: ColoringMode,
    selection: SelectionState,
    points: Vec<PointColor>,
}

fn cmd_colors(args: &DatasetArgs, select: Option<LabelIndex>) -> Result<(), String> {
    let (dataset, config) = args.load()?;
    let catalog = Arc::new(
        config
            .build_catalog(&dataset.label_names)
            .map_err(|e| e.to_string())?,
    );
    let views = dataset
        .into_views(config.noise_label)
        .map_err(|e| e.to_string())?;
    let kind = ViewKind::for_noise_visibility(config.show_noise);
    let view = views.get(kind);

    let mut selection = ClusterSelection::new();
    selection.select(view, select);
    let colorer = colorer_for(config.coloring, view, selection.state(), &catalog);

    let points = view
        .metadata()
        .iter()
        .enumerate()
        .map(|(point, meta)| PointColor {
            point,
            label: meta.label_index,
            color: colorer.as_ref().and_then(|c| c.color(point)),
        })
        .collect();

    print_json(&ColorsReport {
        view: kind.as_str(),
        coloring: config.coloring,
        selection: selection.state(),
        points,
    })
}

#[derive(Serialize)]
struct TraceEvent {
    seq: u64,
    kind: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ReplayReport {
    sprite_image: String,
    view: &'static str,
    selection: SelectionState,
    coloring: ColoringMode,
    trace: Vec<TraceEvent>,
    renderer: Vec<RenderCommand>,
    panel: Vec<PanelCommand>,
}

fn cmd_replay(args: &DatasetArgs, script: PathBuf) -> Result<(), String> {
    let (dataset, config) = args.load()?;
    let text = fs::read_to_string(&script).map_err(|e| format!("read {script:?}: {e}"))?;
    let inputs = parse_script(&text).map_err(|e| format!("{script:?}: {e}"))?;

    let mut session = Session::from_config(
        dataset,
        &config,
        RecordingRenderer::new(),
        RecordingPanel::new(),
    )
    .map_err(|e| e.to_string())?;

    for input in inputs {
        // Atlas errors are part of the trace; keep replaying.
        if let Err(e) = session.handle(input) {
            tracing::warn!(error = %e, "input failed");
        }
    }

    let trace = session
        .events_mut()
        .drain()
        .into_iter()
        .map(|e| TraceEvent {
            seq: e.seq,
            kind: e.kind,
            message: e.message,
        })
        .collect();

    print_json(&ReplayReport {
        sprite_image: config.sprite_image.clone(),
        view: session.active_view().as_str(),
        selection: session.selection(),
        coloring: session.coloring_mode(),
        trace,
        renderer: session.renderer_mut().drain(),
        panel: session.panel_mut().drain(),
    })
}
