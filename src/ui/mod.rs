//! User interface components and rendering logic for the board.
//!
//! This module contains all UI-related code including the main application
//! struct, the canvas, the toolkit panel, and user interaction handling.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main BoardApp
//! - `canvas` - Canvas navigation, zooming, panning, and node dragging
//! - `toolkit_panel` - The toolkit list with reorder and lift-to-canvas drags
//! - `rendering` - Drawing nodes, groups, edges, and the grid

mod canvas;
mod rendering;
mod state;
mod toolkit_panel;

pub use state::BoardApp;

use crate::types::{EdgeChange, NodeKind};
use eframe::egui;
#[cfg(target_arch = "wasm32")]
use eframe::wasm_bindgen::JsCast;

impl eframe::App for BoardApp {
    /// Persist UI preferences between restarts. Board state is not stored
    /// here; it lives at the persistence endpoint.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.to_json() {
            Ok(json) => {
                storage.set_string("app_state", json);
            }
            Err(err) => {
                log::warn!("failed to serialize app state: {err}");
            }
        }
    }

    /// Main update function called by egui for each frame.
    ///
    /// Drains completed persistence operations, drives the debounced write
    /// cycle, and lays out the toolbar, toolkit panel, and canvas.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        // Kick off the initial load exactly once
        if !self.load_requested {
            self.load_requested = true;
            let repaint_ctx = ctx.clone();
            self.sync.begin_load(move || repaint_ctx.request_repaint());
        }

        // Apply completed loads and settle finished writes
        if self.sync.pump(&mut self.store) {
            ctx.request_repaint();
        }

        // Drive the debounce window; schedule a wake-up so the collapsed
        // write fires even if the user goes idle
        let now = ctx.input(|i| i.time);
        let repaint_ctx = ctx.clone();
        self.sync
            .tick(&self.store, now, move || repaint_ctx.request_repaint());
        if self.sync.has_unsynced_changes() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        self.handle_delete_key(ctx);
        self.handle_cancel_key(ctx);

        #[cfg(target_arch = "wasm32")]
        Self::update_beforeunload(self.sync.has_unsynced_changes());

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        let clamped_width = self.toolkit_panel_width.clamp(180.0, 400.0);
        egui::SidePanel::left("toolkit_panel")
            .resizable(true)
            .default_width(clamped_width)
            .show(ctx, |ui| {
                self.toolkit_panel_width = ui.available_width().clamp(180.0, 400.0);
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_toolkit_panel(ui);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        self.draw_group_title_editor(ctx);
    }
}

impl BoardApp {
    /// Renders the toolbar with view options and the sync status readout.
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Stackboard").strong());
            ui.separator();

            ui.checkbox(&mut self.canvas.show_grid, "Grid");
            let theme_label = if self.dark_mode { "Light" } else { "Dark" };
            if ui.button(theme_label).clicked() {
                self.dark_mode = !self.dark_mode;
            }
            if ui.button("Reset view").clicked() {
                self.canvas.zoom_factor = 1.0;
                self.canvas.offset = self
                    .interaction
                    .canvas_rect
                    .map(|rect| rect.center().to_vec2())
                    .unwrap_or(egui::Vec2::ZERO);
            }
            ui.separator();

            // Group actions for the current selection
            let selected_group = self.interaction.selected_node.clone().filter(|id| {
                self.store.node(id).is_some_and(|n| n.is_group())
            });
            if let Some(group_id) = selected_group {
                if ui.button("Recolor group").clicked() {
                    self.store.cycle_group_color(&group_id);
                }
                if ui.button("Rename group").clicked() {
                    if let Some(NodeKind::Group { title, .. }) =
                        self.store.node(&group_id).map(|n| &n.kind)
                    {
                        self.interaction.temp_group_title = title.clone();
                        self.interaction.editing_group_title = Some(group_id);
                    }
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let status = if !self.sync.is_loaded() {
                    egui::RichText::new("loading…").weak()
                } else if self.sync.has_unsynced_changes() {
                    egui::RichText::new("● syncing").color(egui::Color32::from_rgb(220, 180, 80))
                } else {
                    egui::RichText::new("saved").weak()
                };
                ui.label(status);
                ui.label(
                    egui::RichText::new(format!("{:.0}%", self.canvas.zoom_factor * 100.0)).weak(),
                );
            });
        });
    }

    /// Renders the main canvas area and routes its interactions.
    fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        // Center the origin the first time the viewport renders; before
        // this frame, drops onto the canvas have no projection and are
        // ignored
        if self.interaction.canvas_rect.is_none() && self.canvas.offset == egui::Vec2::ZERO {
            self.canvas.offset = response.rect.center().to_vec2();
        }
        self.interaction.canvas_rect = Some(response.rect);

        self.handle_canvas_panning(ui, &response);
        self.handle_canvas_zoom(ui, &response);
        self.handle_canvas_interactions(&response);
        self.handle_node_dragging(ui, &response);

        self.render_board(&painter, response.rect);
    }

    /// Handles delete key presses to remove the selected node or edge.
    fn handle_delete_key(&mut self, ctx: &egui::Context) {
        // Don't swallow Delete while a text field is being edited
        if ctx.wants_keyboard_input() {
            return;
        }
        if !ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            return;
        }

        if let Some(node_id) = self.interaction.selected_node.take() {
            self.store.remove_node(&node_id);
            self.interaction.editing_group_title = None;
        } else if let Some(edge_id) = self.interaction.selected_edge.take() {
            self.store.apply_edge_changes(vec![EdgeChange::Remove(edge_id)]);
        }
    }

    /// Shows the inline rename window for the group being edited.
    fn draw_group_title_editor(&mut self, ctx: &egui::Context) {
        let Some(group_id) = self.interaction.editing_group_title.clone() else {
            return;
        };
        let Some(node) = self.store.node(&group_id) else {
            self.interaction.editing_group_title = None;
            return;
        };
        let anchor = self.world_to_screen(egui::pos2(node.position.0, node.position.1));

        let mut commit = false;
        let mut cancel = false;
        egui::Window::new("Rename group")
            .collapsible(false)
            .resizable(false)
            .fixed_pos(anchor)
            .show(ctx, |ui| {
                let response = ui.text_edit_singleline(&mut self.interaction.temp_group_title);
                response.request_focus();
                if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    commit = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        commit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if commit {
            let title = self.interaction.temp_group_title.clone();
            self.store.rename_group(&group_id, title);
            self.interaction.editing_group_title = None;
        } else if cancel {
            self.interaction.editing_group_title = None;
        }
    }

    /// Arms or clears the browser's unload confirmation depending on
    /// whether mutations are still waiting to land at the endpoint.
    #[cfg(target_arch = "wasm32")]
    fn update_beforeunload(has_unsynced_changes: bool) {
        if let Some(window) = web_sys::window() {
            if has_unsynced_changes {
                let closure = eframe::wasm_bindgen::closure::Closure::wrap(Box::new(
                    move |event: web_sys::Event| {
                        event.prevent_default();
                        // Set returnValue to trigger the confirmation dialog in some browsers
                        let _ = js_sys::Reflect::set(
                            event.as_ref(),
                            &eframe::wasm_bindgen::JsValue::from_str("returnValue"),
                            &eframe::wasm_bindgen::JsValue::from_str("unsynced"),
                        );
                    },
                )
                    as Box<dyn FnMut(_)>);
                window.set_onbeforeunload(Some(closure.as_ref().unchecked_ref()));
                closure.forget();
            } else {
                window.set_onbeforeunload(None);
            }
        }
    }
}

#[cfg(test)]
mod tests;
