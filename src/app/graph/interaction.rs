use eframe::egui::{self, CursorIcon, Rect, Ui};
use knowledge_map::engine::ZoomCommand;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn handle_map_zoom(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
        rect: Rect,
        now: f64,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let Some(pointer) = response.hover_pos() else {
            return;
        };
        self.engine.zoom_at(pointer, scroll, rect, now);
    }

    pub(in crate::app) fn handle_map_pan(&mut self, response: &egui::Response, now: f64) {
        if response.dragged() {
            self.engine.pan_by(response.drag_delta(), now);
        }
    }

    pub(in crate::app) fn handle_map_click(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
        rect: Rect,
        now: f64,
    ) {
        if let Some(pointer) = response.hover_pos()
            && self.engine.hit_test(pointer, rect).is_some()
        {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }

        if !response.clicked() {
            return;
        }
        let Some(pointer) = response.interact_pointer_pos() else {
            return;
        };
        if let Some(hit) = self.engine.hit_test(pointer, rect) {
            self.engine.activate(hit, now);
        }
    }

    /// Remembers a camera command until the engine can take it.
    pub(in crate::app) fn issue_zoom(&mut self, command: ZoomCommand) {
        self.queued_zoom = Some(command);
    }

    /// Hands the queued command over once the previous one was acknowledged.
    pub(in crate::app) fn flush_zoom_queue(&mut self) {
        if self.zoom_in_flight.get() {
            return;
        }
        let Some(command) = self.queued_zoom.take() else {
            return;
        };

        if self.engine.request_zoom(command) {
            self.zoom_in_flight.set(true);
        } else {
            self.queued_zoom = Some(command);
        }
    }
}
