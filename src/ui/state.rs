//! Application state management structures.
//!
//! This module contains the state structures that track the application's
//! current UI state: canvas navigation, active drag gestures, selection and
//! group-title editing, plus the board store and its persistence
//! synchronizer.

use std::sync::Arc;

use crate::drag::{CanvasDrag, DragGesture, ToolkitDrag};
use crate::graph::GraphStore;
use crate::registry::ItemRegistry;
use crate::samples::{InMemoryGraphEndpoint, StaticItemSource};
use crate::sync::{GraphEndpoint, ItemSource, PersistenceSync};
use crate::types::{EdgeId, NodeId};
use eframe::egui;
use serde::{Deserialize, Serialize};

/// State related to canvas navigation and display.
///
/// Tracks the current pan offset, zoom level, and display options.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasState {
    /// Current canvas pan offset for navigation (in screen space)
    #[serde(skip)]
    pub offset: egui::Vec2,
    /// Current zoom level (1.0 = normal, 2.0 = 2x zoom, 0.5 = 50% zoom)
    pub zoom_factor: f32,
    /// Whether the grid should be displayed on the canvas
    pub show_grid: bool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            zoom_factor: 1.0,
            show_grid: true,
        }
    }
}

/// State related to user interactions with the board.
///
/// Tracks selection, the two drag coordinators, panning, and connection
/// drawing. Everything here is transient and never persisted.
#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionState {
    /// Currently selected node, if any
    #[serde(skip)]
    pub selected_node: Option<NodeId>,
    /// Currently selected edge, if any
    #[serde(skip)]
    pub selected_edge: Option<EdgeId>,
    /// Active canvas drag gesture (node placement / group membership)
    #[serde(skip)]
    pub canvas_drag: DragGesture<CanvasDrag>,
    /// Active toolkit drag gesture (reorder / lift to canvas)
    #[serde(skip)]
    pub toolkit_drag: DragGesture<ToolkitDrag>,
    /// Insertion index under the pointer during a toolkit reorder drag
    #[serde(skip)]
    pub toolkit_drop_index: Option<usize>,
    /// Whether the user is currently panning the canvas
    #[serde(skip)]
    pub is_panning: bool,
    /// Last mouse position during panning operation
    #[serde(skip)]
    pub last_pan_pos: Option<egui::Pos2>,
    /// Node and handle a connection is being drawn from
    #[serde(skip)]
    pub connecting_from: Option<(NodeId, String)>,
    /// Current mouse position while drawing a connection (screen space)
    #[serde(skip)]
    pub connect_pos: Option<egui::Pos2>,
    /// Group currently being renamed
    #[serde(skip)]
    pub editing_group_title: Option<NodeId>,
    /// Temporary storage for the group title while editing
    #[serde(skip)]
    pub temp_group_title: String,
    /// Screen-space rect of the canvas area, set once the viewport has
    /// rendered. `None` means drops onto the canvas are silently ignored.
    #[serde(skip)]
    pub canvas_rect: Option<egui::Rect>,
}

fn default_sync() -> PersistenceSync {
    PersistenceSync::new(
        Arc::new(StaticItemSource::demo()),
        Arc::new(InMemoryGraphEndpoint::default()),
    )
}

/// The main application structure containing UI state and the board.
///
/// This struct implements the `eframe::App` trait and handles all user
/// interface rendering and interaction logic. Only UI preferences survive a
/// restart through `eframe` storage; the board itself lives at the
/// persistence endpoint.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct BoardApp {
    /// The single source of truth for board state
    #[serde(skip)]
    pub store: GraphStore,
    /// Debounced mirror of the store at the persistence endpoint
    #[serde(skip, default = "default_sync")]
    pub sync: PersistenceSync,
    /// Whether the initial load has been kicked off
    #[serde(skip)]
    pub load_requested: bool,
    /// Canvas navigation and display state
    pub canvas: CanvasState,
    /// User interaction state
    #[serde(skip)]
    pub interaction: InteractionState,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// Remembered width of the toolkit panel across sessions
    pub toolkit_panel_width: f32,
    /// Counter for generating default group titles
    pub group_counter: u32,
}

impl Default for BoardApp {
    fn default() -> Self {
        Self {
            store: GraphStore::new(ItemRegistry::default()),
            sync: default_sync(),
            load_requested: false,
            canvas: CanvasState::default(),
            interaction: InteractionState::default(),
            dark_mode: true,
            toolkit_panel_width: 240.0,
            group_counter: 0,
        }
    }
}

impl BoardApp {
    /// Creates an app wired to real external services instead of the
    /// built-in demo source and in-memory endpoint.
    pub fn with_endpoints(
        items: Arc<dyn ItemSource>,
        endpoint: Arc<dyn GraphEndpoint>,
    ) -> Self {
        Self {
            sync: PersistenceSync::new(items, endpoint),
            ..Default::default()
        }
    }

    /// Serializes the UI preferences to JSON.
    ///
    /// Board state is skipped: it lives at the persistence endpoint, not in
    /// `eframe` storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Restores UI preferences from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
