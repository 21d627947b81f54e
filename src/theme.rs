use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

#[derive(Debug, Clone)]
pub struct Theme {
    pub surface_0: Color32,
    pub surface_1: Color32,
    pub surface_2: Color32,
    pub surface_3: Color32,
    pub accent_primary: Color32,
    pub accent_muted: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub danger: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub border_subtle: Color32,
    pub spacing_8: f32,
    pub spacing_12: f32,
    pub radius_10: u8,
    pub radius_12: u8,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            surface_0: Color32::from_rgb(0x10, 0x13, 0x18),
            surface_1: Color32::from_rgb(0x17, 0x1B, 0x22),
            surface_2: Color32::from_rgb(0x1E, 0x24, 0x2E),
            surface_3: Color32::from_rgb(0x25, 0x2D, 0x39),
            accent_primary: Color32::from_rgb(0x38, 0xB2, 0xAC),
            accent_muted: Color32::from_rgb(0x2C, 0x8F, 0x8A),
            success: Color32::from_rgb(0x22, 0xC5, 0x5E),
            warning: Color32::from_rgb(0xF5, 0x9E, 0x0B),
            danger: Color32::from_rgb(0xEF, 0x44, 0x44),
            text_primary: Color32::from_rgb(0xE6, 0xED, 0xF3),
            text_muted: Color32::from_rgb(0x8B, 0x94, 0x9E),
            border_subtle: Color32::from_rgba_premultiplied(255, 255, 255, 13),
            spacing_8: 8.0,
            spacing_12: 12.0,
            radius_10: 10,
            radius_12: 12,
        }
    }
}

impl Theme {
    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.surface_1;
        visuals.extreme_bg_color = self.surface_0;
        visuals.override_text_color = Some(self.text_primary);
        visuals.widgets.noninteractive.fg_stroke.color = self.text_primary;
        visuals.widgets.noninteractive.bg_fill = self.surface_2;
        visuals.widgets.noninteractive.weak_bg_fill = self.surface_2;
        visuals.widgets.noninteractive.bg_stroke = Stroke::NONE;
        visuals.widgets.inactive.bg_fill = self.surface_2;
        visuals.widgets.inactive.fg_stroke.color = self.text_primary;
        visuals.widgets.inactive.bg_stroke = Stroke::NONE;
        visuals.widgets.hovered.bg_fill = self.surface_3;
        visuals.widgets.hovered.bg_stroke = Stroke::NONE;
        visuals.widgets.hovered.fg_stroke.color = self.text_primary;
        visuals.widgets.active.bg_fill = self.accent_muted;
        visuals.widgets.active.bg_stroke = Stroke::NONE;
        visuals.widgets.active.fg_stroke.color = self.text_primary;
        visuals.selection.bg_fill = self.accent_muted;
        visuals.hyperlink_color = self.accent_primary;
        visuals.window_fill = self.surface_1;
        visuals.window_stroke = Stroke::NONE;
        visuals.window_corner_radius = CornerRadius::same(self.radius_10);

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(10.0, 8.0);
        style.spacing.button_padding = egui::vec2(12.0, 6.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(17.0));
        style.text_styles.insert(TextStyle::Body, FontId::proportional(14.0));
        style.text_styles.insert(TextStyle::Monospace, FontId::monospace(13.0));
        style.text_styles.insert(TextStyle::Small, FontId::proportional(12.0));
        ctx.set_style(style);
    }

    pub fn card_frame(&self) -> Frame {
        Frame::new()
            .fill(self.surface_2)
            .inner_margin(Margin::same(self.spacing_12 as i8))
            .corner_radius(CornerRadius::same(self.radius_12))
            .stroke(Stroke::new(1.0, self.border_subtle))
    }

    pub fn banner_frame(&self) -> Frame {
        Frame::new()
            .fill(self.surface_3)
            .inner_margin(Margin::symmetric(self.spacing_12 as i8, self.spacing_8 as i8))
            .corner_radius(CornerRadius::same(self.radius_10))
            .stroke(Stroke::new(1.0, self.danger))
    }
}
