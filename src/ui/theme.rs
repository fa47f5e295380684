use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

pub const BG_BLUSH: Color32 = Color32::from_rgb(255, 240, 245);
pub const BG_PANEL: Color32 = Color32::from_rgb(252, 231, 243);
pub const BG_WIDGET: Color32 = Color32::from_rgb(249, 214, 230);
pub const BG_WIDGET_HOVER: Color32 = Color32::from_rgb(244, 194, 216);
pub const BG_WIDGET_ACTIVE: Color32 = Color32::from_rgb(236, 170, 199);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(89, 32, 52);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(150, 100, 118);

pub const ACCENT_ROSE: Color32 = Color32::from_rgb(230, 57, 113);
pub const ACCENT_CRIMSON: Color32 = Color32::from_rgb(201, 24, 74);
pub const ACCENT_LEAF: Color32 = Color32::from_rgb(45, 90, 39);
pub const ACCENT_ERROR: Color32 = Color32::from_rgb(190, 20, 30);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgba_premultiplied(230, 57, 113, 60);

fn widget(
    visuals: &mut egui::style::WidgetVisuals,
    fill: Color32,
    stroke: Stroke,
    text: Color32,
) {
    visuals.bg_fill = fill;
    visuals.weak_bg_fill = fill;
    visuals.bg_stroke = stroke;
    visuals.fg_stroke = Stroke::new(1.0, text);
    visuals.rounding = Rounding::same(8.0);
}

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::light();
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_BLUSH;
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.window_rounding = Rounding::same(10.0);
    visuals.faint_bg_color = BG_PANEL;
    visuals.extreme_bg_color = BG_BLUSH;
    visuals.error_fg_color = ACCENT_ERROR;
    visuals.selection.bg_fill = ACCENT_ROSE.gamma_multiply(0.35);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT_CRIMSON);

    let widgets = &mut visuals.widgets;
    widget(
        &mut widgets.noninteractive,
        BG_PANEL,
        Stroke::new(1.0, BORDER_SUBTLE),
        TEXT_MUTED,
    );
    widget(
        &mut widgets.inactive,
        BG_WIDGET,
        Stroke::new(1.0, BORDER_SUBTLE),
        TEXT_PRIMARY,
    );
    widget(
        &mut widgets.hovered,
        BG_WIDGET_HOVER,
        Stroke::new(1.0, ACCENT_ROSE),
        TEXT_PRIMARY,
    );
    widget(
        &mut widgets.active,
        BG_WIDGET_ACTIVE,
        Stroke::new(2.0, ACCENT_CRIMSON),
        TEXT_PRIMARY,
    );

    let mut style = (*ctx.style()).clone();
    style.visuals = visuals;
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 5.0);
    style.text_styles = [
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(22.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace)),
    ]
    .into();

    ctx.set_style(style);
}
