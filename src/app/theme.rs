use eframe::egui::{self, Color32, Context};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    pub(super) fn apply(self, ctx: &Context) {
        ctx.set_visuals(match self {
            Self::Dark => egui::Visuals::dark(),
            Self::Light => egui::Visuals::light(),
        });
    }

    pub(super) fn palette(self) -> Palette {
        match self {
            Self::Dark => Palette {
                background: Color32::from_rgb(11, 12, 16),
                grid: Color32::from_rgba_unmultiplied(102, 252, 241, 18),
                card: Color32::from_rgb(24, 28, 36),
                card_border: Color32::from_rgb(50, 58, 70),
                title: Color32::from_rgb(236, 240, 244),
                subtitle: Color32::from_rgb(146, 156, 168),
                id_tag: Color32::from_rgb(102, 252, 241),
                edge: Color32::from_rgb(69, 162, 158),
                toggle_fill: Color32::from_rgb(11, 12, 16),
                selection: Color32::from_rgb(102, 252, 241),
            },
            Self::Light => Palette {
                background: Color32::from_rgb(244, 246, 248),
                grid: Color32::from_rgba_unmultiplied(30, 41, 59, 16),
                card: Color32::WHITE,
                card_border: Color32::from_rgb(203, 213, 225),
                title: Color32::from_rgb(15, 23, 42),
                subtitle: Color32::from_rgb(100, 116, 139),
                id_tag: Color32::from_rgb(8, 145, 178),
                edge: Color32::from_rgb(148, 163, 184),
                toggle_fill: Color32::WHITE,
                selection: Color32::from_rgb(8, 145, 178),
            },
        }
    }
}

/// Resolved colors handed to the canvas and panels.
#[derive(Clone, Copy, Debug)]
pub(super) struct Palette {
    pub background: Color32,
    pub grid: Color32,
    pub card: Color32,
    pub card_border: Color32,
    pub title: Color32,
    pub subtitle: Color32,
    pub id_tag: Color32,
    pub edge: Color32,
    pub toggle_fill: Color32,
    pub selection: Color32,
}
