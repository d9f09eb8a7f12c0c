//! Shared application-wide constants.
//! Centralizes tweakable values used across the store, sync, and UI layers.

// Item node dimensions
/// Width of an item card on the canvas, in world units.
pub const ITEM_NODE_WIDTH: f32 = 180.0;
/// Height of an item card on the canvas, in world units.
pub const ITEM_NODE_HEIGHT: f32 = 48.0;

// Group geometry
/// Horizontal inset of the child column inside its group (world units).
pub const GROUP_CHILD_X_GAP: f32 = 20.0;
/// Vertical inset from the group's top edge to the child column (world units).
pub const GROUP_CHILD_Y_GAP: f32 = 30.0;
/// Extra inset below the group title row before the first child slot.
pub const GROUP_HEADER_INSET: f32 = 6.0;
/// Vertical spacing between stacked child slots (world units).
pub const GROUP_CHILD_GAP: f32 = 10.0;
/// Width of a group box; sized to fit one child column plus insets.
pub const GROUP_NODE_WIDTH: f32 = ITEM_NODE_WIDTH + 2.0 * GROUP_CHILD_X_GAP;
/// Corner radius for group rectangles (in screen pixels after transform).
pub const GROUP_CORNER_RADIUS: f32 = 8.0;
/// Stroke width for group rectangle outlines (in screen pixels).
pub const GROUP_STROKE_WIDTH: f32 = 1.5;
/// Number of entries in the group color palette; stored color indices wrap at this.
pub const GROUP_COLOR_COUNT: usize = 6;

// Item card rendering
/// Corner radius for item cards (in screen pixels after transform).
pub const NODE_CORNER_RADIUS: f32 = 6.0;
/// Radius of connector handle circles (in screen pixels).
pub const HANDLE_RADIUS: f32 = 5.0;

// Grid/drawing
/// Grid cell size in world units.
pub const GRID_SIZE: f32 = 20.0;

// Canvas interactions
/// Lower zoom clamp.
pub const ZOOM_MIN: f32 = 0.25;
/// Upper zoom clamp.
pub const ZOOM_MAX: f32 = 5.0;
/// Zoom change applied per scroll tick.
pub const ZOOM_STEP: f32 = 0.025;
/// Hit threshold in world units for clicking an edge line.
pub const EDGE_CLICK_THRESHOLD: f32 = 10.0;
/// Anchor offset subtracted from a toolkit drop point so the created node
/// lands centered under the cursor rather than hanging off its corner.
pub const DROP_ANCHOR_X: f32 = ITEM_NODE_WIDTH / 2.0;
/// Vertical half of the drop anchor offset.
pub const DROP_ANCHOR_Y: f32 = ITEM_NODE_HEIGHT / 2.0;

// Persistence
/// Quiet period after the last mutation before the graph document is pushed.
pub const PERSIST_DEBOUNCE_SECS: f64 = 0.5;
