//! The toolkit panel: staged items, reorder drags, and lifts to the canvas.
//!
//! This is the toolkit-side drag coordinator. Dragging an entry over
//! another entry reorders the toolkit; releasing it anywhere else lifts the
//! item onto the canvas at the pointer's inverse-projected position. The
//! group-template control at the top creates a new group the same way.

use super::state::BoardApp;
use crate::drag::ToolkitDrag;
use crate::types::{Item, ItemKind};
use eframe::egui;
use eframe::epaint::StrokeKind;

/// Height of one toolkit entry card, in screen pixels.
const ENTRY_HEIGHT: f32 = 44.0;

impl BoardApp {
    /// Renders the toolkit list and drives the toolkit drag coordinator.
    pub fn draw_toolkit_panel(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        ui.heading("Toolkit");
        ui.label(
            egui::RichText::new("Drag items onto the canvas")
                .small()
                .weak(),
        );
        ui.add_space(6.0);

        // Group template control
        let (template_rect, template_response) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), ENTRY_HEIGHT),
            egui::Sense::click_and_drag(),
        );
        self.paint_template_card(ui, template_rect);
        if template_response.drag_started() {
            self.interaction.toolkit_drag.begin(ToolkitDrag::GroupTemplate);
        }

        ui.add_space(6.0);
        ui.separator();
        ui.add_space(6.0);

        let entries: Vec<Item> = self.store.toolkit().entries().to_vec();
        let mut entry_rects: Vec<egui::Rect> = Vec::with_capacity(entries.len());

        for (index, item) in entries.iter().enumerate() {
            let (rect, response) = ui.allocate_exact_size(
                egui::vec2(ui.available_width(), ENTRY_HEIGHT),
                egui::Sense::click_and_drag(),
            );
            entry_rects.push(rect);

            let dragging_this = matches!(
                self.interaction.toolkit_drag.payload(),
                Some(ToolkitDrag::Entry { item_id, .. }) if *item_id == item.id
            );
            self.paint_entry_card(ui, rect, item, dragging_this);

            if response.drag_started() {
                self.interaction.toolkit_drag.begin(ToolkitDrag::Entry {
                    item_id: item.id.clone(),
                    from_index: index,
                });
            }
            ui.add_space(4.0);
        }

        if entries.is_empty() {
            ui.label(egui::RichText::new("Everything is placed").weak().italics());
        }

        // Live insertion marker while reordering
        if matches!(
            self.interaction.toolkit_drag.payload(),
            Some(ToolkitDrag::Entry { .. })
        ) {
            let pointer = ui.ctx().pointer_latest_pos();
            self.interaction.toolkit_drop_index =
                pointer.and_then(|pos| entry_rects.iter().position(|r| r.contains(pos)));
            if let Some(target) = self.interaction.toolkit_drop_index {
                let marker = entry_rects[target].expand(2.0);
                ui.painter().rect_stroke(
                    marker,
                    4.0,
                    egui::Stroke::new(1.5, egui::Color32::from_rgb(100, 150, 255)),
                    StrokeKind::Outside,
                );
            }
        }

        // Release settles the gesture
        if self.interaction.toolkit_drag.is_dragging()
            && ui.input(|i| i.pointer.primary_released())
        {
            let pointer = ui.input(|i| i.pointer.interact_pos().or(i.pointer.latest_pos()));
            if let Some(payload) = self.interaction.toolkit_drag.finish() {
                if let Some(pointer) = pointer {
                    self.drop_toolkit_payload(payload, pointer, &entry_rects);
                }
            }
            self.interaction.toolkit_drop_index = None;
        }
    }

    /// Interprets a finished toolkit drag: over another entry it reorders,
    /// anywhere else it lifts onto the canvas.
    fn drop_toolkit_payload(
        &mut self,
        payload: ToolkitDrag,
        pointer: egui::Pos2,
        entry_rects: &[egui::Rect],
    ) {
        match payload {
            ToolkitDrag::Entry { item_id, from_index } => {
                if let Some(to_index) = entry_rects.iter().position(|r| r.contains(pointer)) {
                    self.store.reorder_toolkit(from_index, to_index);
                } else {
                    self.drop_toolkit_entry_on_canvas(&item_id, pointer);
                }
            }
            ToolkitDrag::GroupTemplate => {
                self.drop_group_template_on_canvas(pointer);
            }
        }
    }

    /// Lifts a toolkit entry onto the canvas at the pointer's
    /// inverse-projected position, centered under the cursor.
    ///
    /// Dropping before the canvas viewport has rendered is silently
    /// ignored: there is no projection to compute a position with yet.
    pub(crate) fn drop_toolkit_entry_on_canvas(&mut self, item_id: &str, screen_pos: egui::Pos2) {
        if self.interaction.canvas_rect.is_none() {
            return;
        }
        let world = self.screen_to_world(screen_pos);
        let position = (
            world.x - crate::constants::DROP_ANCHOR_X,
            world.y - crate::constants::DROP_ANCHOR_Y,
        );
        if let Some(node_id) = self.store.place_item(item_id, position) {
            self.interaction.selected_node = Some(node_id);
            self.interaction.selected_edge = None;
        }
    }

    /// Creates a fresh group on the canvas at the pointer, subject to the
    /// same viewport guard as item drops.
    pub(crate) fn drop_group_template_on_canvas(&mut self, screen_pos: egui::Pos2) {
        if self.interaction.canvas_rect.is_none() {
            return;
        }
        let world = self.screen_to_world(screen_pos);
        self.group_counter += 1;
        let node_id = self.store.create_group(
            format!("Group {}", self.group_counter),
            (
                world.x - crate::constants::DROP_ANCHOR_X,
                world.y - crate::constants::DROP_ANCHOR_Y,
            ),
        );
        self.interaction.selected_node = Some(node_id);
        self.interaction.selected_edge = None;
    }

    fn paint_template_card(&self, ui: &egui::Ui, rect: egui::Rect) {
        let painter = ui.painter();
        let stroke_color = if self.dark_mode {
            egui::Color32::from_gray(120)
        } else {
            egui::Color32::from_gray(140)
        };
        painter.rect_stroke(
            rect.shrink(1.0),
            crate::constants::NODE_CORNER_RADIUS,
            egui::Stroke::new(1.0, stroke_color),
            StrokeKind::Inside,
        );
        painter.text(
            egui::pos2(rect.min.x + 10.0, rect.center().y),
            egui::Align2::LEFT_CENTER,
            "+ New group",
            egui::FontId::proportional(13.0),
            ui.visuals().strong_text_color(),
        );
    }

    fn paint_entry_card(&self, ui: &egui::Ui, rect: egui::Rect, item: &Item, dragging: bool) {
        let painter = ui.painter();
        let fill = if dragging {
            ui.visuals().widgets.active.bg_fill
        } else {
            ui.visuals().widgets.inactive.bg_fill
        };
        painter.rect_filled(rect.shrink(1.0), crate::constants::NODE_CORNER_RADIUS, fill);
        painter.rect_stroke(
            rect.shrink(1.0),
            crate::constants::NODE_CORNER_RADIUS,
            egui::Stroke::new(1.0, kind_accent(item.kind)),
            StrokeKind::Inside,
        );

        painter.text(
            egui::pos2(rect.min.x + 10.0, rect.min.y + 12.0),
            egui::Align2::LEFT_CENTER,
            &item.display_name,
            egui::FontId::proportional(13.0),
            ui.visuals().strong_text_color(),
        );
        painter.text(
            egui::pos2(rect.min.x + 10.0, rect.max.y - 12.0),
            egui::Align2::LEFT_CENTER,
            item.kind.label(),
            egui::FontId::proportional(10.0),
            ui.visuals().weak_text_color(),
        );
        painter.circle_filled(
            egui::pos2(rect.max.x - 12.0, rect.center().y),
            3.5,
            status_color(&item.status),
        );
    }
}

/// Accent color for an item kind, shared by toolkit cards and canvas nodes.
pub(crate) fn kind_accent(kind: ItemKind) -> egui::Color32 {
    match kind {
        ItemKind::Storage => egui::Color32::from_rgb(214, 143, 63),
        ItemKind::Database => egui::Color32::from_rgb(94, 156, 226),
        ItemKind::Instance => egui::Color32::from_rgb(122, 187, 122),
    }
}

/// Dot color for an item's provisioning status.
pub(crate) fn status_color(status: &str) -> egui::Color32 {
    match status {
        "running" | "available" => egui::Color32::from_rgb(90, 190, 120),
        "stopped" => egui::Color32::from_gray(140),
        _ => egui::Color32::from_rgb(220, 180, 80),
    }
}
