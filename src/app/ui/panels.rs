use std::cell::Cell;
use std::rc::Rc;

use eframe::egui::{self, Align2, Context, CornerRadius, RichText, Sense, Ui, vec2};
use knowledge_map::dataset::{Dataset, DatasetSource};
use knowledge_map::engine::{EngineConfig, MapEngine};
use tracing::debug;

use super::super::{ViewModel, ViewOptions};

impl ViewModel {
    pub(in crate::app) fn new(
        dataset: Dataset,
        source: &DatasetSource,
        options: ViewOptions,
        now: f64,
    ) -> Self {
        let config = EngineConfig {
            transition_secs: options.transition_secs,
            ..EngineConfig::default()
        };
        let mut engine = MapEngine::new(dataset, config, options.orientation, now);

        let zoom_in_flight = Rc::new(Cell::new(false));
        let in_flight = Rc::clone(&zoom_in_flight);
        engine.on_zoom_handled(move |command| {
            debug!(command = command.label(), "zoom acknowledged");
            in_flight.set(false);
        });

        let details_open = Rc::new(Cell::new(false));
        let open = Rc::clone(&details_open);
        engine.on_node_selected(move |id| open.set(id.is_some()));

        Self {
            engine,
            source_label: source.label(),
            theme: options.theme,
            search: String::new(),
            show_legend: false,
            queued_zoom: None,
            zoom_in_flight,
            details_open,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        now: f64,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        egui::TopBottomPanel::top("command_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_command_bar(ui, now, reload_requested, is_reloading));

        if self.engine.state().search().is_active() {
            egui::SidePanel::left("search_results")
                .resizable(true)
                .default_width(280.0)
                .show(ctx, |ui| self.draw_search_results(ui));
        }

        if self.details_open.get() && self.engine.selected().is_some() {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(360.0)
                .show(ctx, |ui| self.draw_details(ui));
        }

        let mut show_legend = self.show_legend;
        egui::Window::new("Legend")
            .open(&mut show_legend)
            .resizable(false)
            .anchor(Align2::RIGHT_BOTTOM, vec2(-16.0, -16.0))
            .show(ctx, |ui| self.draw_legend(ui));
        self.show_legend = show_legend;

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_map(ui, now));
    }

    /// Opens the detail panel on `key` without touching expansion.
    pub(in crate::app) fn focus_node(&mut self, key: &str) {
        if self.engine.tree().find(key).is_some() {
            self.engine.select_by_key(key);
            self.details_open.set(true);
        }
    }

    fn draw_legend(&self, ui: &mut Ui) {
        let tree = self.engine.tree();
        for (index, cluster) in self.engine.dataset().clusters.iter().enumerate() {
            let Some(node) = tree.find(&cluster.id).and_then(|id| tree.node(id)) else {
                continue;
            };

            ui.horizontal(|ui| {
                let (swatch, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
                ui.painter()
                    .rect_filled(swatch, CornerRadius::same(3), node.accent);
                ui.label(RichText::new(format!("{:02}", index + 1)).monospace());
                ui.label(&node.display_name);
            });
        }

        ui.separator();
        ui.small(format!("{} nodes", tree.len()));
    }
}
