use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use knowledge_map::dataset::{Dataset, DatasetSource};
use knowledge_map::engine::{MapEngine, Orientation, ZoomCommand};

mod graph;
mod render_utils;
mod theme;
mod ui;

pub use theme::Theme;

/// Startup choices taken from the command line.
#[derive(Clone, Copy, Debug)]
pub struct ViewOptions {
    pub orientation: Orientation,
    pub theme: Theme,
    pub transition_secs: f64,
}

pub struct KnowledgeMapApp {
    source: DatasetSource,
    options: ViewOptions,
    state: AppState,
    reload_rx: Option<Receiver<Result<Dataset, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Dataset, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: MapEngine,
    source_label: String,
    theme: Theme,
    search: String,
    show_legend: bool,
    /// Zoom command issued by the chrome but not yet queued in the engine.
    queued_zoom: Option<ZoomCommand>,
    /// Cleared by the engine once it has handled the last command.
    zoom_in_flight: Rc<Cell<bool>>,
    /// Set by the engine when a node body is clicked.
    details_open: Rc<Cell<bool>>,
}

impl KnowledgeMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>, source: DatasetSource, options: ViewOptions) -> Self {
        options.theme.apply(&cc.egui_ctx);
        let state = Self::start_load(source.clone());
        Self {
            source,
            options,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: DatasetSource) -> Receiver<Result<Dataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = source.load().map_err(|error| format!("{error:#}"));
            if let Err(error) = &result {
                tracing::error!(%error, "dataset load failed");
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: DatasetSource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }
}

impl eframe::App for KnowledgeMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|input| input.time);
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(dataset) => AppState::Ready(Box::new(ViewModel::new(
                            dataset,
                            &self.source,
                            self.options,
                            now,
                        ))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading(format!("Loading {}...", self.source.label()));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the knowledge map");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.source.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, now, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(dataset)) => model.engine.reload(dataset, now),
                        Ok(Err(error)) => transition = Some(AppState::Error(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
