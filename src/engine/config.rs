use eframe::egui::{Vec2, vec2};

use super::layout::Orientation;

/// Distances between neighbouring nodes, in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spacing {
    /// Between adjacent nodes on the lateral axis.
    pub sibling_gap: f32,
    /// Between successive depth tiers.
    pub level_gap: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    pub zoom_secs: f64,
    pub fit_secs: f64,
    pub initial_scale: f32,
    pub fit_scale_horizontal: f32,
    pub fit_scale_vertical: f32,
    /// Distance of the root from the viewport edge after a fit.
    pub fit_offset: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 3.0,
            zoom_in_factor: 1.4,
            zoom_out_factor: 0.6,
            zoom_secs: 0.3,
            fit_secs: 0.75,
            initial_scale: 0.8,
            fit_scale_horizontal: 0.85,
            fit_scale_vertical: 0.75,
            fit_offset: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    pub horizontal: Spacing,
    pub vertical: Spacing,
    pub node_size: Vec2,
    pub transition_secs: f64,
    pub camera: CameraConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizontal: Spacing {
                sibling_gap: 100.0,
                level_gap: 350.0,
            },
            vertical: Spacing {
                sibling_gap: 280.0,
                level_gap: 150.0,
            },
            node_size: vec2(260.0, 85.0),
            transition_secs: 0.5,
            camera: CameraConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn spacing(&self, orientation: Orientation) -> Spacing {
        match orientation {
            Orientation::Horizontal => self.horizontal,
            Orientation::Vertical => self.vertical,
        }
    }
}
