mod app;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use knowledge_map::dataset::DatasetSource;
use knowledge_map::engine::Orientation;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use crate::app::{Theme, ViewOptions};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON dataset to show instead of the built-in robotics map.
    #[arg(long)]
    dataset: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OrientationArg::Horizontal)]
    orientation: OrientationArg,

    /// Start with the light palette.
    #[arg(long)]
    light: bool,

    /// Duration of expand/collapse transitions.
    #[arg(long, default_value_t = 500)]
    transition_ms: u64,

    /// Log verbosity, repeat up to three times.
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrientationArg {
    Horizontal,
    Vertical,
}

impl From<OrientationArg> for Orientation {
    fn from(value: OrientationArg) -> Self {
        match value {
            OrientationArg::Horizontal => Self::Horizontal,
            OrientationArg::Vertical => Self::Vertical,
        }
    }
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    setup_logging(args.debug);

    let source = args
        .dataset
        .map_or(DatasetSource::Builtin, DatasetSource::File);
    let options = ViewOptions {
        orientation: args.orientation.into(),
        theme: if args.light { Theme::Light } else { Theme::Dark },
        transition_secs: args.transition_ms as f64 / 1000.0,
    };
    tracing::info!(source = %source.label(), ?options, "starting");

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "knowledge-map",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::KnowledgeMapApp::new(cc, source, options)))),
    )
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // Windowing and GPU crates log every frame at debug level.
    let noisy_modules = ["winit", "wgpu", "naga", "eframe", "egui_glow", "calloop", "sctk"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter).with_filter(module_filter))
        .init();
}
