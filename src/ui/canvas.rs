//! Canvas interaction and navigation functionality.
//!
//! This module handles canvas panning, zooming, node dragging with live
//! group-target tracking, connection drawing between handles, and the
//! coordinate transformations between screen and world space.

use super::state::BoardApp;
use crate::drag::CanvasDrag;
use crate::types::{Connection, NodeChange, NodeId, NodeKind};
use eframe::egui;

/// Handle identifier for the outgoing connector on an item card.
pub const HANDLE_OUT: &str = "out";
/// Handle identifier for the incoming connector on an item card.
pub const HANDLE_IN: &str = "in";

/// World-space distance within which a press grabs a connector handle.
const HANDLE_GRAB_RADIUS: f32 = 8.0;

impl BoardApp {
    /// Converts screen coordinates to world coordinates accounting for zoom
    /// and pan.
    ///
    /// # Arguments
    ///
    /// * `screen_pos` - Position in screen space (pixels)
    ///
    /// # Returns
    ///
    /// The corresponding position in world space
    pub fn screen_to_world(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        (screen_pos - self.canvas.offset) / self.canvas.zoom_factor
    }

    /// Converts world coordinates to screen coordinates accounting for zoom
    /// and pan.
    pub fn world_to_screen(&self, world_pos: egui::Pos2) -> egui::Pos2 {
        world_pos * self.canvas.zoom_factor + self.canvas.offset
    }

    /// Handles middle-click or Cmd/Ctrl+left-click canvas panning.
    ///
    /// Uses Cmd on macOS and Ctrl on other platforms for modifier-based
    /// panning.
    pub fn handle_canvas_panning(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        // modifiers.command automatically uses Cmd on macOS and Ctrl elsewhere
        let should_pan = ui.input(|i| {
            i.pointer.middle_down() || (i.pointer.primary_down() && i.modifiers.command)
        });

        if should_pan {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if !self.interaction.is_panning {
                    self.interaction.is_panning = true;
                    self.interaction.last_pan_pos = Some(current_pos);
                } else if let Some(last_pos) = self.interaction.last_pan_pos {
                    let delta = current_pos - last_pos;
                    self.canvas.offset += delta;
                    self.interaction.last_pan_pos = Some(current_pos);
                }
            }
        } else {
            self.interaction.is_panning = false;
            self.interaction.last_pan_pos = None;
        }
    }

    /// Handles scroll wheel zooming.
    ///
    /// Zooms in/out while keeping the mouse cursor position fixed in world
    /// space. Only zooms if the cursor is over the canvas.
    pub fn handle_canvas_zoom(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);

        if scroll_delta != 0.0 {
            let mouse_pos = ui
                .input(|i| i.pointer.hover_pos())
                .or_else(|| response.interact_pointer_pos());

            if let Some(mouse_pos) = mouse_pos {
                if !response.rect.contains(mouse_pos) {
                    return;
                }

                let world_pos_before_zoom = self.screen_to_world(mouse_pos);

                let zoom_delta = if scroll_delta > 0.0 {
                    crate::constants::ZOOM_STEP
                } else {
                    -crate::constants::ZOOM_STEP
                };
                let old_zoom = self.canvas.zoom_factor;
                self.canvas.zoom_factor = (self.canvas.zoom_factor + zoom_delta)
                    .clamp(crate::constants::ZOOM_MIN, crate::constants::ZOOM_MAX);

                if (self.canvas.zoom_factor - old_zoom).abs() > f32::EPSILON {
                    // Keep the world position under the cursor fixed on screen
                    let world_pos_after_zoom = self.world_to_screen(world_pos_before_zoom);
                    let offset_adjustment = mouse_pos - world_pos_after_zoom;
                    self.canvas.offset += offset_adjustment;
                }
            }
        }
    }

    /// Finds the node at the given world position, if any.
    ///
    /// When boxes overlap (an item card inside its group), the smallest
    /// area wins so the card stays grabbable over the group background.
    pub fn find_node_at_position(&self, pos: egui::Pos2) -> Option<NodeId> {
        let mut best: Option<(NodeId, f32)> = None;
        for (id, node) in self.store.nodes() {
            let (w, h) = node.size();
            let rect = egui::Rect::from_min_size(
                egui::pos2(node.position.0, node.position.1),
                egui::vec2(w, h),
            );
            if rect.contains(pos) {
                let area = w * h;
                if best.as_ref().map_or(true, |(_, best_area)| area < *best_area) {
                    best = Some((id.clone(), area));
                }
            }
        }
        best.map(|(id, _)| id)
    }

    /// World position of a connector handle on a node's left or right edge.
    pub fn handle_world_pos(&self, node_id: &str, handle: &str) -> Option<egui::Pos2> {
        let node = self.store.node(node_id)?;
        let (w, h) = node.size();
        let y = node.position.1 + h / 2.0;
        let x = if handle == HANDLE_OUT {
            node.position.0 + w
        } else {
            node.position.0
        };
        Some(egui::pos2(x, y))
    }

    /// Finds a connector handle near the given world position.
    fn find_handle_at_position(&self, pos: egui::Pos2) -> Option<(NodeId, String)> {
        for (id, node) in self.store.nodes() {
            if matches!(node.kind, NodeKind::Group { .. }) {
                continue;
            }
            for handle in [HANDLE_OUT, HANDLE_IN] {
                if let Some(handle_pos) = self.handle_world_pos(id, handle) {
                    if handle_pos.distance(pos) <= HANDLE_GRAB_RADIUS {
                        return Some((id.clone(), handle.to_string()));
                    }
                }
            }
        }
        None
    }

    /// Handles node dragging and connection drawing with the left mouse
    /// button.
    ///
    /// A press on a handle starts a connection preview; a press on a node
    /// starts the canvas drag gesture. While dragging, the prospective
    /// group target under the node's center is recomputed every tick so
    /// rendering can highlight it live. Release settles the gesture through
    /// the store's drop-resolution algorithm.
    pub fn handle_node_dragging(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        if ui.input(|i| i.pointer.primary_down()) && !self.interaction.is_panning {
            if let Some(current_pos) = response.interact_pointer_pos() {
                let world_pos = self.screen_to_world(current_pos);

                if !self.interaction.canvas_drag.is_dragging()
                    && self.interaction.connecting_from.is_none()
                {
                    if let Some(grabbed) = self.find_handle_at_position(world_pos) {
                        self.interaction.connecting_from = Some(grabbed);
                        self.interaction.connect_pos = Some(current_pos);
                    } else if let Some(node_id) = self.find_node_at_position(world_pos) {
                        self.start_node_drag(node_id, world_pos);
                    }
                } else if self.interaction.canvas_drag.is_dragging() {
                    self.update_dragged_node(world_pos);
                } else if self.interaction.connecting_from.is_some() {
                    self.interaction.connect_pos = Some(current_pos);
                }
            }
        } else {
            // Mouse released: finalize a connection preview if one is active
            if self.interaction.connecting_from.is_some() {
                if let Some(current_pos) = response.interact_pointer_pos() {
                    let world_pos = self.screen_to_world(current_pos);
                    self.finalize_connection(world_pos);
                }
                self.interaction.connecting_from = None;
                self.interaction.connect_pos = None;
            }

            // Settle the drag through the group-membership transition
            if let Some(drag) = self.interaction.canvas_drag.finish() {
                if drag.moved {
                    self.store.resolve_drop(&drag.node_id);
                }
            }
        }
    }

    /// Starts dragging the specified node, selecting it.
    fn start_node_drag(&mut self, node_id: NodeId, world_pos: egui::Pos2) {
        let Some(node) = self.store.node(&node_id) else {
            return;
        };
        let origin = node.position;
        let grab_offset = (node.position.0 - world_pos.x, node.position.1 - world_pos.y);

        self.interaction.selected_node = Some(node_id.clone());
        self.interaction.selected_edge = None;
        self.interaction.canvas_drag.begin(CanvasDrag {
            node_id,
            origin,
            grab_offset,
            moved: false,
            hover_target: None,
        });
    }

    /// Moves the dragged node under the pointer and refreshes the live
    /// hover target.
    fn update_dragged_node(&mut self, world_pos: egui::Pos2) {
        let Some(drag) = self.interaction.canvas_drag.payload() else {
            return;
        };
        let node_id = drag.node_id.clone();
        let new_pos = (
            world_pos.x + drag.grab_offset.0,
            world_pos.y + drag.grab_offset.1,
        );
        let moved = (new_pos.0 - drag.origin.0).abs() > 0.5 || (new_pos.1 - drag.origin.1).abs() > 0.5;

        self.store.apply_node_changes(vec![NodeChange::Position {
            id: node_id.clone(),
            position: new_pos,
        }]);
        let hover_target = self.store.hover_target(&node_id);

        if let Some(drag) = self.interaction.canvas_drag.payload_mut() {
            drag.moved |= moved;
            drag.hover_target = hover_target;
        }
    }

    /// Creates an edge if the connection preview was released over another
    /// node. Accidental self-loops from a click on the handle are skipped
    /// here as UI policy; the store itself imposes no such rule.
    fn finalize_connection(&mut self, world_pos: egui::Pos2) {
        let Some((source, source_handle)) = self.interaction.connecting_from.clone() else {
            return;
        };
        let Some(target) = self.find_node_at_position(world_pos) else {
            return;
        };
        if target == source {
            return;
        }
        self.store.connect(Connection {
            source,
            target,
            source_handle,
            target_handle: HANDLE_IN.to_string(),
        });
    }

    /// Handles canvas click interactions for selection and group renaming.
    pub fn handle_canvas_interactions(&mut self, response: &egui::Response) {
        if response.double_clicked() && !self.interaction.is_panning {
            if let Some(pos) = response.interact_pointer_pos() {
                let world_pos = self.screen_to_world(pos);
                if let Some(node_id) = self.find_node_at_position(world_pos) {
                    if let Some(NodeKind::Group { title, .. }) =
                        self.store.node(&node_id).map(|n| &n.kind)
                    {
                        self.interaction.temp_group_title = title.clone();
                        self.interaction.editing_group_title = Some(node_id);
                        return;
                    }
                }
            }
        }

        if response.clicked() && !self.interaction.is_panning {
            if let Some(pos) = response.interact_pointer_pos() {
                let world_pos = self.screen_to_world(pos);
                if let Some(node_id) = self.find_node_at_position(world_pos) {
                    self.interaction.selected_node = Some(node_id);
                    self.interaction.selected_edge = None;
                } else if let Some(edge_id) = self.find_edge_at_position(world_pos) {
                    self.interaction.selected_edge = Some(edge_id);
                    self.interaction.selected_node = None;
                } else {
                    self.interaction.selected_node = None;
                    self.interaction.selected_edge = None;
                    self.interaction.editing_group_title = None;
                }
            }
        }
    }

    /// Finds the edge whose line passes near the given world position.
    pub fn find_edge_at_position(&self, pos: egui::Pos2) -> Option<crate::types::EdgeId> {
        for edge in self.store.edges() {
            let (Some(start), Some(end)) = (
                self.handle_world_pos(&edge.source, &edge.source_handle),
                self.handle_world_pos(&edge.target, &edge.target_handle),
            ) else {
                continue;
            };
            if point_to_line_distance(pos, start, end) < crate::constants::EDGE_CLICK_THRESHOLD {
                return Some(edge.id.clone());
            }
        }
        None
    }

    /// Escape cancels any active gesture with no net board mutation: the
    /// dragged node snaps back to its origin and previews are discarded.
    pub fn handle_cancel_key(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            return;
        }
        if let Some(drag) = self.interaction.canvas_drag.cancel() {
            if drag.moved {
                self.store.apply_node_changes(vec![NodeChange::Position {
                    id: drag.node_id,
                    position: drag.origin,
                }]);
            }
        }
        self.interaction.toolkit_drag.cancel();
        self.interaction.toolkit_drop_index = None;
        self.interaction.connecting_from = None;
        self.interaction.connect_pos = None;
        self.interaction.editing_group_title = None;
    }
}

/// Calculates the distance from a point to a line segment using vector
/// projection, clamped to the segment endpoints.
fn point_to_line_distance(point: egui::Pos2, line_start: egui::Pos2, line_end: egui::Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;
    let line_len_sq = line_vec.length_sq();

    if line_len_sq < 0.0001 {
        // Line segment is essentially a point
        return point_vec.length();
    }

    let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let projection = line_start + line_vec * t;

    (point - projection).length()
}
