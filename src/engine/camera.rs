use eframe::egui::emath::easing;
use eframe::egui::{Pos2, Rect, Vec2, vec2};
use tracing::debug;

use super::config::CameraConfig;
use super::layout::Orientation;

const WHEEL_SENSITIVITY: f32 = 0.0018;
const WHEEL_STEP_MIN: f32 = 0.85;
const WHEEL_STEP_MAX: f32 = 1.15;

/// Translate plus uniform scale, relative to the viewport's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for CameraTransform {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl CameraTransform {
    pub fn world_to_screen(&self, world: Pos2, viewport: Rect) -> Pos2 {
        viewport.min + self.translate + world.to_vec2() * self.scale
    }

    pub fn screen_to_world(&self, screen: Pos2, viewport: Rect) -> Pos2 {
        ((screen - viewport.min - self.translate) / self.scale).to_pos2()
    }

    pub fn world_rect_to_screen(&self, world: Rect, viewport: Rect) -> Rect {
        Rect::from_min_max(
            self.world_to_screen(world.min, viewport),
            self.world_to_screen(world.max, viewport),
        )
    }

    pub fn lerp(&self, other: Self, t: f32) -> Self {
        Self {
            translate: self.translate + (other.translate - self.translate) * t,
            scale: self.scale + (other.scale - self.scale) * t,
        }
    }
}

/// Discrete camera commands issued by the surrounding chrome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoomCommand {
    In,
    Out,
    Fit,
}

impl ZoomCommand {
    pub fn label(self) -> &'static str {
        match self {
            Self::In => "zoom in",
            Self::Out => "zoom out",
            Self::Fit => "fit",
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Tween {
    from: CameraTransform,
    to: CameraTransform,
    start: f64,
    duration: f64,
}

impl Tween {
    fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0) as f32
    }
}

/// Pan/zoom state of the canvas. Never touched by layout or tree changes.
#[derive(Clone, Debug)]
pub struct Camera {
    config: CameraConfig,
    current: CameraTransform,
    tween: Option<Tween>,
    centered: bool,
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            current: CameraTransform {
                translate: Vec2::ZERO,
                scale: config.initial_scale,
            },
            tween: None,
            centered: false,
        }
    }

    /// The transform to draw with at `now`.
    pub fn transform(&self, now: f64) -> CameraTransform {
        match self.tween {
            Some(tween) => tween
                .from
                .lerp(tween.to, easing::cubic_in_out(tween.progress(now))),
            None => self.current,
        }
    }

    /// Where the camera will rest once any running command finishes.
    pub fn target(&self) -> CameraTransform {
        self.tween.map_or(self.current, |tween| tween.to)
    }

    pub fn is_animating(&self, now: f64) -> bool {
        self.tween.is_some_and(|tween| tween.progress(now) < 1.0)
    }

    /// Commits a finished command.
    pub fn tick(&mut self, now: f64) {
        if let Some(tween) = self.tween
            && tween.progress(now) >= 1.0
        {
            self.current = tween.to;
            self.tween = None;
        }
    }

    /// Drag gesture; interrupts a running command where it currently is.
    pub fn pan_by(&mut self, delta: Vec2, now: f64) {
        self.interrupt(now);
        self.current.translate += delta;
    }

    /// Wheel gesture: scales about `pointer` so the world point under it stays put.
    pub fn zoom_at(&mut self, pointer: Pos2, scroll: f32, viewport: Rect, now: f64) {
        if scroll.abs() <= f32::EPSILON {
            return;
        }
        self.interrupt(now);

        let step = (1.0 + scroll * WHEEL_SENSITIVITY).clamp(WHEEL_STEP_MIN, WHEEL_STEP_MAX);
        let anchor = pointer - viewport.min;
        self.current = self.scaled_about(self.current, self.current.scale * step, anchor);
    }

    /// Starts the animated transition for a discrete command.
    pub fn apply(&mut self, command: ZoomCommand, viewport: Rect, orientation: Orientation, now: f64) {
        let target = self.target();
        let (to, duration) = match command {
            ZoomCommand::In => (
                self.scaled_about(
                    target,
                    target.scale * self.config.zoom_in_factor,
                    viewport.size() / 2.0,
                ),
                self.config.zoom_secs,
            ),
            ZoomCommand::Out => (
                self.scaled_about(
                    target,
                    target.scale * self.config.zoom_out_factor,
                    viewport.size() / 2.0,
                ),
                self.config.zoom_secs,
            ),
            ZoomCommand::Fit => (self.fit_transform(viewport, orientation), self.config.fit_secs),
        };

        debug!(command = command.label(), scale = to.scale, "camera command");
        self.tween = Some(Tween {
            from: self.transform(now),
            to,
            start: now,
            duration,
        });
    }

    /// Puts the root near the middle of the viewport, once.
    pub fn center_initial(&mut self, viewport: Rect) -> bool {
        if self.centered || viewport.width() <= 0.0 || viewport.height() <= 0.0 {
            return false;
        }
        self.centered = true;
        self.current = CameraTransform {
            translate: viewport.size() / 2.0,
            scale: self.clamp_scale(self.config.initial_scale),
        };
        self.tween = None;
        true
    }

    /// Canonical resting transform for an orientation: the root sits
    /// `fit_offset` in from the edge it grows away from.
    pub fn fit_transform(&self, viewport: Rect, orientation: Orientation) -> CameraTransform {
        let size = viewport.size();
        match orientation {
            Orientation::Horizontal => CameraTransform {
                translate: vec2(self.config.fit_offset, size.y / 2.0),
                scale: self.config.fit_scale_horizontal,
            },
            Orientation::Vertical => CameraTransform {
                translate: vec2(size.x / 2.0, self.config.fit_offset),
                scale: self.config.fit_scale_vertical,
            },
        }
    }

    /// Jumps without animation; the scale is clamped.
    pub fn set_transform(&mut self, transform: CameraTransform) {
        self.tween = None;
        self.current = CameraTransform {
            translate: transform.translate,
            scale: self.clamp_scale(transform.scale),
        };
    }

    fn interrupt(&mut self, now: f64) {
        self.current = self.transform(now);
        self.tween = None;
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }

    fn scaled_about(&self, from: CameraTransform, scale: f32, anchor: Vec2) -> CameraTransform {
        let scale = self.clamp_scale(scale);
        let ratio = scale / from.scale;
        CameraTransform {
            translate: anchor - (anchor - from.translate) * ratio,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn viewport() -> Rect {
        Rect::from_min_size(pos2(0.0, 40.0), vec2(1000.0, 600.0))
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-2
    }

    #[test]
    fn repeated_zoom_in_clamps_at_max_scale() {
        let mut camera = Camera::new(CameraConfig::default());
        camera.set_transform(CameraTransform {
            translate: Vec2::ZERO,
            scale: 0.9,
        });

        for _ in 0..5 {
            camera.apply(ZoomCommand::In, viewport(), Orientation::Horizontal, 0.0);
        }
        assert_eq!(camera.target().scale, 3.0);

        camera.tick(1.0);
        assert_eq!(camera.transform(1.0).scale, 3.0);
    }

    #[test]
    fn zoom_out_clamps_at_min_scale() {
        let mut camera = Camera::new(CameraConfig::default());
        for step in 0..10 {
            camera.apply(ZoomCommand::Out, viewport(), Orientation::Vertical, step as f64);
            camera.tick(step as f64 + 0.5);
        }
        assert_eq!(camera.transform(20.0).scale, 0.1);
    }

    #[test]
    fn zoom_commands_keep_the_viewport_center_fixed() {
        let mut camera = Camera::new(CameraConfig::default());
        camera.center_initial(viewport());
        let center = viewport().center();
        let world = camera.transform(0.0).screen_to_world(center, viewport());

        camera.apply(ZoomCommand::In, viewport(), Orientation::Horizontal, 0.0);
        camera.tick(0.3);
        let after = camera.transform(0.3).world_to_screen(world, viewport());

        assert!(close(after.x, center.x) && close(after.y, center.y));
    }

    #[test]
    fn fit_depends_on_orientation() {
        let mut camera = Camera::new(CameraConfig::default());
        camera.apply(ZoomCommand::Fit, viewport(), Orientation::Horizontal, 0.0);
        assert!(camera.is_animating(0.5));
        camera.tick(0.75);
        assert_eq!(
            camera.transform(0.75),
            CameraTransform {
                translate: vec2(100.0, 300.0),
                scale: 0.85,
            }
        );

        let vertical = camera.fit_transform(viewport(), Orientation::Vertical);
        assert_eq!(vertical.translate, vec2(500.0, 100.0));
        assert_eq!(vertical.scale, 0.75);
    }

    #[test]
    fn initial_centering_happens_once() {
        let mut camera = Camera::new(CameraConfig::default());
        assert!(camera.center_initial(viewport()));
        assert_eq!(camera.transform(0.0).translate, vec2(500.0, 300.0));
        assert_eq!(camera.transform(0.0).scale, 0.8);

        camera.pan_by(vec2(10.0, -5.0), 0.0);
        assert!(!camera.center_initial(viewport()));
        assert_eq!(camera.transform(0.0).translate, vec2(510.0, 295.0));
    }

    #[test]
    fn panning_interrupts_a_running_command() {
        let mut camera = Camera::new(CameraConfig::default());
        camera.apply(ZoomCommand::Fit, viewport(), Orientation::Horizontal, 0.0);
        let midway = camera.transform(0.3);

        camera.pan_by(vec2(1.0, 1.0), 0.3);
        assert!(!camera.is_animating(0.3));
        assert_eq!(camera.transform(5.0).translate, midway.translate + vec2(1.0, 1.0));
        assert_eq!(camera.transform(5.0).scale, midway.scale);
    }

    #[test]
    fn wheel_zoom_keeps_the_point_under_the_pointer() {
        let mut camera = Camera::new(CameraConfig::default());
        camera.center_initial(viewport());
        let pointer = pos2(700.0, 200.0);
        let world = camera.transform(0.0).screen_to_world(pointer, viewport());

        camera.zoom_at(pointer, 120.0, viewport(), 0.0);
        let transform = camera.transform(0.0);
        let after = transform.world_to_screen(world, viewport());

        assert!(transform.scale > 0.8);
        assert!(close(after.x, pointer.x) && close(after.y, pointer.y));
    }
}
