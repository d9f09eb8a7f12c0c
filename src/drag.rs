//! Drag-gesture state machines.
//!
//! Both pointer coordinators (toolkit reorder/lift and canvas placement)
//! share one machine shape: `idle → dragging → (dropped | cancelled) → idle`.
//! The machine only tracks gesture state; interpreting a drop is the
//! caller's job, using the payload returned by the terminal transitions.

use crate::types::{ItemId, NodeId};

/// A single active-or-idle drag gesture parameterized by its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DragGesture<P> {
    /// No gesture in progress
    Idle,
    /// Pointer is down and tracking the payload
    Dragging(P),
}

impl<P> Default for DragGesture<P> {
    fn default() -> Self {
        DragGesture::Idle
    }
}

impl<P> DragGesture<P> {
    /// Starts a gesture, replacing any stale one.
    pub fn begin(&mut self, payload: P) {
        *self = DragGesture::Dragging(payload);
    }

    /// True while a gesture is active.
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragGesture::Dragging(_))
    }

    /// The active payload, if dragging.
    pub fn payload(&self) -> Option<&P> {
        match self {
            DragGesture::Dragging(payload) => Some(payload),
            DragGesture::Idle => None,
        }
    }

    /// Mutable access to the active payload, for per-tick updates such as
    /// the live hover target.
    pub fn payload_mut(&mut self) -> Option<&mut P> {
        match self {
            DragGesture::Dragging(payload) => Some(payload),
            DragGesture::Idle => None,
        }
    }

    /// The `dropped` transition: ends the gesture and hands the payload to
    /// the caller for drop interpretation.
    pub fn finish(&mut self) -> Option<P> {
        match std::mem::replace(self, DragGesture::Idle) {
            DragGesture::Dragging(payload) => Some(payload),
            DragGesture::Idle => None,
        }
    }

    /// The `cancelled` transition: ends the gesture. The payload is still
    /// returned so the caller can roll back transient mutations (e.g.
    /// restore the dragged node's origin position).
    pub fn cancel(&mut self) -> Option<P> {
        self.finish()
    }
}

/// Payload of an active canvas drag.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasDrag {
    /// The node being dragged
    pub node_id: NodeId,
    /// World position when the gesture started, for cancel rollback
    pub origin: (f32, f32),
    /// Offset from the pointer to the node's corner, so the node does not
    /// jump to the cursor on grab
    pub grab_offset: (f32, f32),
    /// Whether the pointer moved past the click threshold
    pub moved: bool,
    /// Prospective group target under the node's center, recomputed on
    /// every pointer-move tick for live highlighting
    pub hover_target: Option<NodeId>,
}

/// Payload of an active toolkit drag.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolkitDrag {
    /// Dragging a staged item, either to reorder it or to lift it onto the
    /// canvas
    Entry {
        /// The staged item
        item_id: ItemId,
        /// Its index in the toolkit when the gesture started
        from_index: usize,
    },
    /// Dragging the group-template control toward the canvas
    GroupTemplate,
}
