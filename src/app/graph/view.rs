use eframe::egui::{
    self, Align2, CornerRadius, FontId, Rect, Sense, Shape, Stroke, StrokeKind, Ui, vec2,
};
use knowledge_map::engine::{NodeKind, NodeVisual, RenderFrame, ToggleState};

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, draw_background, polyline_visible, truncate, with_opacity,
};
use super::super::theme::Palette;

/// Opacity multiplier for nodes that do not match the search.
const DIMMED_OPACITY: f32 = 0.22;
/// Below this scale only boxes are drawn.
const TEXT_MIN_SCALE: f32 = 0.3;
const TOGGLE_RADIUS: f32 = 11.0;
const ACCENT_BAR_WIDTH: f32 = 5.0;

impl ViewModel {
    pub(in crate::app) fn draw_map(&mut self, ui: &mut Ui, now: f64) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;

        self.handle_map_pan(&response, now);
        self.handle_map_zoom(ui, &response, rect, now);
        self.flush_zoom_queue();

        let frame = self.engine.frame(now, rect);
        self.handle_map_click(ui, &response, rect, now);

        let palette = self.theme.palette();
        draw_background(&painter, rect, frame.transform, palette.background, palette.grid);

        let scale = frame.transform.scale;
        for edge in &frame.edges {
            let points = edge.points.map(|point| frame.to_screen(point));
            if !polyline_visible(rect, &points, 4.0) {
                continue;
            }
            let dimmed = self.engine.is_dimmed(edge.child);
            let opacity = edge.opacity * if dimmed { DIMMED_OPACITY } else { 1.0 };
            painter.add(Shape::line(
                points.to_vec(),
                Stroke::new((1.5 * scale).max(1.0), with_opacity(palette.edge, opacity)),
            ));
        }

        for node in &frame.nodes {
            let screen_rect = frame.rect_to_screen(node.rect);
            if !screen_rect.expand(TOGGLE_RADIUS * scale).intersects(rect) {
                continue;
            }
            self.draw_node(&painter, &frame, node, screen_rect, &palette);
        }

        if frame.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Nothing to show",
                FontId::proportional(16.0),
                palette.subtitle,
            );
        }

        if frame.animating {
            ui.ctx().request_repaint();
        }
    }

    fn draw_node(
        &self,
        painter: &egui::Painter,
        frame: &RenderFrame,
        node: &NodeVisual,
        screen_rect: Rect,
        palette: &Palette,
    ) {
        let Some(tree_node) = self.engine.tree().node(node.id) else {
            return;
        };
        let scale = frame.transform.scale;
        let opacity = node.opacity * if node.dimmed { DIMMED_OPACITY } else { 1.0 };
        let accent = tree_node.accent;
        let radius = CornerRadius::same((6.0 * scale).clamp(1.0, 12.0) as u8);

        if node.selected {
            painter.rect_filled(
                screen_rect.expand(6.0 * scale),
                radius,
                with_opacity(palette.selection, 0.25 * opacity),
            );
        }

        let fill = match node.kind {
            NodeKind::Root => blend_color(palette.card, palette.title, 0.08),
            NodeKind::Cluster => blend_color(palette.card, accent, 0.10),
            NodeKind::Leaf => palette.card,
        };
        let border = if node.selected {
            palette.selection
        } else {
            palette.card_border
        };
        painter.rect(
            screen_rect,
            radius,
            with_opacity(fill, opacity),
            Stroke::new(
                if node.selected { 2.0 } else { 1.0 },
                with_opacity(border, opacity),
            ),
            StrokeKind::Inside,
        );

        let bar = Rect::from_min_size(
            screen_rect.min,
            vec2(ACCENT_BAR_WIDTH * scale, screen_rect.height()),
        );
        painter.rect_filled(bar, CornerRadius::ZERO, with_opacity(accent, opacity));

        if scale >= TEXT_MIN_SCALE {
            let inset = screen_rect.min + vec2(18.0, 14.0) * scale;
            painter.text(
                inset,
                Align2::LEFT_TOP,
                truncate(&tree_node.key, 12),
                FontId::monospace(11.0 * scale),
                with_opacity(palette.id_tag, opacity),
            );
            painter.text(
                inset + vec2(0.0, 18.0 * scale),
                Align2::LEFT_TOP,
                truncate(&tree_node.display_name, 26),
                FontId::proportional(17.0 * scale),
                with_opacity(palette.title, opacity),
            );
            painter.text(
                inset + vec2(0.0, 44.0 * scale),
                Align2::LEFT_TOP,
                truncate(&tree_node.subtitle, 38),
                FontId::proportional(12.0 * scale),
                with_opacity(palette.subtitle, opacity),
            );
        }

        if let Some(toggle) = node.toggle {
            let center = frame.to_screen(node.toggle_center);
            let radius = TOGGLE_RADIUS * scale;
            painter.circle(
                center,
                radius,
                with_opacity(palette.toggle_fill, opacity),
                Stroke::new(1.5, with_opacity(accent, opacity)),
            );
            let glyph = match toggle {
                ToggleState::Expanded => "−",
                ToggleState::Collapsed => "+",
            };
            painter.text(
                center,
                Align2::CENTER_CENTER,
                glyph,
                FontId::monospace((14.0 * scale).max(6.0)),
                with_opacity(accent, opacity),
            );
        }
    }
}
