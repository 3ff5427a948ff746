use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke};
use jet_core::ColorModel;

const TITLE_SIZE: f32 = 18.0;
const TITLE_PADDING: f32 = 8.0;
const SWATCH_SIZE: f32 = 80.0;
const SWATCH_PADDING: f32 = 10.0;
const SWATCH_BORDER: f32 = 2.0;
const LABEL_SIZE: f32 = 22.0;
const LABEL_PADDING: f32 = 16.0;

pub const ROW_HEIGHT: f32 = SWATCH_SIZE + 2.0 * SWATCH_PADDING;

/// Row geometry of a rendered color list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickerLayout {
    pub origin: Pos2,
    pub width: f32,
    pub count: usize,
}

impl PickerLayout {
    pub fn row_rect(&self, index: usize) -> Rect {
        Rect::from_min_size(
            self.origin + egui::vec2(0.0, index as f32 * ROW_HEIGHT),
            egui::vec2(self.width, ROW_HEIGHT),
        )
    }

    /// Index of the row under `pos`, if any.
    pub fn hit_test(&self, pos: Pos2) -> Option<usize> {
        let local = pos - self.origin;
        if local.x < 0.0 || local.x >= self.width || local.y < 0.0 {
            return None;
        }
        let index = (local.y / ROW_HEIGHT) as usize;
        (index < self.count).then_some(index)
    }
}

fn swatch_rect(row: Rect) -> Rect {
    Rect::from_min_size(
        row.min + egui::vec2(SWATCH_PADDING, SWATCH_PADDING),
        egui::vec2(SWATCH_SIZE, SWATCH_SIZE),
    )
}

pub fn color32(color: &ColorModel) -> Color32 {
    match color.rgb() {
        Ok([r, g, b]) => Color32::from_rgb(r, g, b),
        Err(_) => Color32::TRANSPARENT,
    }
}

/// Titled, scrollable list of colors. Returns the geometry the rows were laid out with.
pub fn color_picker(
    ui: &mut egui::Ui,
    colors: &[ColorModel],
    mut on_color_select: impl FnMut(&ColorModel),
) -> PickerLayout {
    ui.add_space(TITLE_PADDING);
    ui.horizontal(|ui| {
        ui.add_space(TITLE_PADDING);
        ui.label(egui::RichText::new("Color Picker").size(TITLE_SIZE).strong());
    });
    ui.add_space(TITLE_PADDING);

    let mut layout = PickerLayout {
        origin: ui.cursor().min,
        width: ui.available_width(),
        count: colors.len(),
    };
    ui.scope(|ui| {
        ui.spacing_mut().item_spacing.y = 0.0;
        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .show_rows(ui, ROW_HEIGHT, colors.len(), |ui, rows| {
                layout.origin =
                    ui.cursor().min - egui::vec2(0.0, rows.start as f32 * ROW_HEIGHT);
                layout.width = ui.available_width();
                for color in &colors[rows] {
                    color_item(ui, color, &mut on_color_select);
                }
            });
    });
    layout
}

/// One full-width row: bordered swatch followed by the color name.
pub fn color_item(
    ui: &mut egui::Ui,
    color: &ColorModel,
    mut on_color_select: impl FnMut(&ColorModel),
) -> egui::Response {
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(ui.available_width(), ROW_HEIGHT), Sense::click());

    if ui.is_rect_visible(rect) {
        let visuals = ui.visuals();
        let painter = ui.painter();
        if response.hovered() {
            painter.rect_filled(rect, 0.0, visuals.widgets.hovered.weak_bg_fill);
        }
        let swatch = swatch_rect(rect);
        painter.circle(
            swatch.center(),
            SWATCH_SIZE / 2.0,
            color32(color),
            Stroke::new(SWATCH_BORDER, Color32::BLACK),
        );
        painter.text(
            egui::pos2(swatch.right() + SWATCH_PADDING + LABEL_PADDING, rect.center().y),
            Align2::LEFT_CENTER,
            &color.name,
            FontId::proportional(LABEL_SIZE),
            visuals.text_color(),
        );
    }

    if response.clicked() {
        on_color_select(color);
    }
    response.on_hover_text(color.hex.as_str())
}
