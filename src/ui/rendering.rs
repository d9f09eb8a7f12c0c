//! Board rendering: grid background, group boxes, edges, and item cards.
//!
//! Elements are drawn in layers: grid first, then groups (background
//! hints), then edges, then item cards on top, ensuring proper visual
//! hierarchy. Paint order within a layer is sorted by id so overlapping
//! shapes render deterministically.

use super::state::BoardApp;
use super::toolkit_panel::{kind_accent, status_color};
use crate::types::{Edge, Node, NodeKind};
use eframe::egui;
use eframe::epaint::StrokeKind;

/// Translucent fill palette for group boxes, indexed by the group's stored
/// color. Must stay in sync with `GROUP_COLOR_COUNT`.
fn group_palette(index: usize) -> egui::Color32 {
    const PALETTE: [egui::Color32; crate::constants::GROUP_COLOR_COUNT] = [
        egui::Color32::from_rgb(94, 156, 226),
        egui::Color32::from_rgb(122, 187, 122),
        egui::Color32::from_rgb(214, 143, 63),
        egui::Color32::from_rgb(186, 122, 196),
        egui::Color32::from_rgb(220, 120, 120),
        egui::Color32::from_rgb(120, 190, 190),
    ];
    PALETTE[index % PALETTE.len()]
}

impl BoardApp {
    /// Renders all board elements onto the canvas painter.
    pub fn render_board(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        if self.canvas.show_grid {
            self.draw_grid(painter, canvas_rect);
        }

        let mut groups: Vec<&Node> = self
            .store
            .nodes()
            .values()
            .filter(|n| n.is_group())
            .collect();
        groups.sort_by(|a, b| a.id.cmp(&b.id));
        let mut items: Vec<&Node> = self
            .store
            .nodes()
            .values()
            .filter(|n| !n.is_group())
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));

        let hover_target = self
            .interaction
            .canvas_drag
            .payload()
            .and_then(|drag| drag.hover_target.clone());

        for node in &groups {
            let highlighted = hover_target.as_deref() == Some(node.id.as_str());
            self.draw_group_node(painter, node, highlighted);
        }

        for edge in self.store.edges() {
            let selected = self.interaction.selected_edge.as_deref() == Some(edge.id.as_str());
            self.draw_edge(painter, edge, selected);
        }

        if let (Some((from_id, from_handle)), Some(to_screen)) = (
            self.interaction.connecting_from.as_ref(),
            self.interaction.connect_pos,
        ) {
            if let Some(start_world) = self.handle_world_pos(from_id, from_handle) {
                let start = self.world_to_screen(start_world);
                painter.line_segment(
                    [start, to_screen],
                    egui::Stroke::new(1.5, egui::Color32::from_rgb(100, 150, 255)),
                );
            }
        }

        for node in &items {
            self.draw_item_node(painter, node);
        }
    }

    /// Draws a zoom-aware grid for visual reference, skipped when zoomed
    /// out far enough that the lines would smear together.
    pub fn draw_grid(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let grid_size = crate::constants::GRID_SIZE;
        let grid_color = egui::Color32::from_rgba_unmultiplied(128, 128, 128, 32);
        let stroke = egui::Stroke::new(1.0, grid_color);

        let screen_grid_size = grid_size * self.canvas.zoom_factor;
        if screen_grid_size < 4.0 {
            return;
        }

        let top_left_world = self.screen_to_world(canvas_rect.min);
        let bottom_right_world = self.screen_to_world(canvas_rect.max);

        let start_x = (top_left_world.x / grid_size).floor() * grid_size;
        let end_x = (bottom_right_world.x / grid_size).ceil() * grid_size;
        let start_y = (top_left_world.y / grid_size).floor() * grid_size;
        let end_y = (bottom_right_world.y / grid_size).ceil() * grid_size;

        let mut x = start_x;
        while x <= end_x {
            let top = self.world_to_screen(egui::pos2(x, start_y));
            let bottom = self.world_to_screen(egui::pos2(x, end_y));
            painter.line_segment([top, bottom], stroke);
            x += grid_size;
        }
        let mut y = start_y;
        while y <= end_y {
            let left = self.world_to_screen(egui::pos2(start_x, y));
            let right = self.world_to_screen(egui::pos2(end_x, y));
            painter.line_segment([left, right], stroke);
            y += grid_size;
        }
    }

    /// Screen-space rect of a node under the current projection.
    fn node_screen_rect(&self, node: &Node) -> egui::Rect {
        let (w, h) = node.size();
        let min = self.world_to_screen(egui::pos2(node.position.0, node.position.1));
        let max = self.world_to_screen(egui::pos2(node.position.0 + w, node.position.1 + h));
        egui::Rect::from_min_max(min, max)
    }

    /// Draws a group box with its title and live drop highlight.
    fn draw_group_node(&self, painter: &egui::Painter, node: &Node, highlighted: bool) {
        let NodeKind::Group { title, color, child_item_ids } = &node.kind else {
            return;
        };
        let rect = self.node_screen_rect(node);
        let accent = group_palette(*color);
        let selected = self.interaction.selected_node.as_deref() == Some(node.id.as_str());

        let fill_alpha = if highlighted { 56 } else { 28 };
        let fill = egui::Color32::from_rgba_unmultiplied(accent.r(), accent.g(), accent.b(), fill_alpha);
        let stroke_width = if selected || highlighted {
            crate::constants::GROUP_STROKE_WIDTH * 2.0
        } else {
            crate::constants::GROUP_STROKE_WIDTH
        };

        painter.rect_filled(rect, crate::constants::GROUP_CORNER_RADIUS, fill);
        painter.rect_stroke(
            rect,
            crate::constants::GROUP_CORNER_RADIUS,
            egui::Stroke::new(stroke_width, accent),
            StrokeKind::Inside,
        );

        let shown_title = if title.is_empty() { "Unnamed group" } else { title };
        let font_size = (12.0 * self.canvas.zoom_factor).clamp(8.0, 24.0);
        let text_color = if self.dark_mode {
            egui::Color32::from_gray(220)
        } else {
            egui::Color32::from_gray(40)
        };
        painter.text(
            egui::pos2(rect.min.x + 8.0, rect.min.y + 6.0),
            egui::Align2::LEFT_TOP,
            shown_title,
            egui::FontId::proportional(font_size),
            text_color,
        );
        if !child_item_ids.is_empty() {
            painter.text(
                egui::pos2(rect.max.x - 8.0, rect.min.y + 6.0),
                egui::Align2::RIGHT_TOP,
                format!("{}", child_item_ids.len()),
                egui::FontId::proportional(font_size * 0.85),
                text_color,
            );
        }
    }

    /// Draws an item card with its connector handles and status dot.
    fn draw_item_node(&self, painter: &egui::Painter, node: &Node) {
        let NodeKind::Item { item, .. } = &node.kind else {
            return;
        };
        let rect = self.node_screen_rect(node);
        let selected = self.interaction.selected_node.as_deref() == Some(node.id.as_str());

        let fill = if self.dark_mode {
            egui::Color32::from_gray(42)
        } else {
            egui::Color32::from_gray(245)
        };
        let stroke = if selected {
            egui::Stroke::new(2.0, egui::Color32::from_rgb(100, 150, 255))
        } else {
            egui::Stroke::new(1.0, kind_accent(item.kind))
        };

        painter.rect_filled(rect, crate::constants::NODE_CORNER_RADIUS, fill);
        painter.rect_stroke(rect, crate::constants::NODE_CORNER_RADIUS, stroke, StrokeKind::Inside);

        let text_color = if self.dark_mode {
            egui::Color32::from_gray(230)
        } else {
            egui::Color32::from_gray(30)
        };
        let name_size = (12.0 * self.canvas.zoom_factor).clamp(8.0, 22.0);
        painter.text(
            egui::pos2(rect.min.x + 8.0, rect.min.y + rect.height() * 0.32),
            egui::Align2::LEFT_CENTER,
            &item.display_name,
            egui::FontId::proportional(name_size),
            text_color,
        );
        painter.text(
            egui::pos2(rect.min.x + 8.0, rect.max.y - rect.height() * 0.25),
            egui::Align2::LEFT_CENTER,
            item.kind.label(),
            egui::FontId::proportional(name_size * 0.8),
            egui::Color32::from_gray(if self.dark_mode { 160 } else { 110 }),
        );
        painter.circle_filled(
            egui::pos2(rect.max.x - 10.0, rect.min.y + 10.0),
            3.5,
            status_color(&item.status),
        );

        // Connector handles on the card's vertical midline edges
        let handle_color = if self.dark_mode {
            egui::Color32::from_gray(150)
        } else {
            egui::Color32::from_gray(110)
        };
        for x in [rect.min.x, rect.max.x] {
            painter.circle_filled(
                egui::pos2(x, rect.center().y),
                crate::constants::HANDLE_RADIUS,
                handle_color,
            );
        }
    }

    /// Draws an edge as a line with an arrowhead at the target handle.
    fn draw_edge(&self, painter: &egui::Painter, edge: &Edge, selected: bool) {
        let (Some(start_world), Some(end_world)) = (
            self.handle_world_pos(&edge.source, &edge.source_handle),
            self.handle_world_pos(&edge.target, &edge.target_handle),
        ) else {
            return;
        };
        let start = self.world_to_screen(start_world);
        let end = self.world_to_screen(end_world);

        let color = if selected {
            egui::Color32::from_rgb(100, 150, 255)
        } else if self.dark_mode {
            egui::Color32::from_gray(150)
        } else {
            egui::Color32::from_gray(110)
        };
        let stroke = egui::Stroke::new(if selected { 2.0 } else { 1.5 }, color);
        painter.line_segment([start, end], stroke);

        // Arrowhead
        let dir = end - start;
        if dir.length() > 1.0 {
            let dir = dir.normalized();
            let normal = egui::vec2(-dir.y, dir.x);
            let tip = end;
            let size = 8.0;
            let left = tip - dir * size + normal * size * 0.5;
            let right = tip - dir * size - normal * size * 0.5;
            painter.line_segment([tip, left], stroke);
            painter.line_segment([tip, right], stroke);
        }
    }
}
