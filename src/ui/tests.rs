use super::*;
use crate::drag::CanvasDrag;
use crate::graph::{group_child_offset, GraphStore};
use crate::registry::ItemRegistry;
use crate::types::{Item, ItemKind, NodeChange, NodeKind};
use eframe::egui;
use serde_json::json;

fn item(id: &str) -> Item {
    Item {
        id: id.to_string(),
        kind: ItemKind::Database,
        display_name: id.to_uppercase(),
        status: "running".to_string(),
        provider_metadata: json!({"region": "eu-west-1"}),
    }
}

fn app_with_items(ids: &[&str]) -> BoardApp {
    let mut app = BoardApp::default();
    app.store = GraphStore::new(ItemRegistry::new(ids.iter().map(|id| item(id)).collect()));
    app
}

/// Marks the canvas viewport as rendered so drops have a projection.
fn with_rendered_viewport(app: &mut BoardApp) {
    app.interaction.canvas_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(1200.0, 800.0),
    ));
}

/// Run a single headless egui frame with the provided input events and closure.
fn run_ui_with(events: Vec<egui::Event>, mut f: impl FnMut(&egui::Context)) -> egui::FullOutput {
    let mut raw = egui::RawInput::default();
    raw.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(1200.0, 800.0),
    ));
    raw.events = events;

    let ctx = egui::Context::default();
    ctx.run(raw, |ctx| {
        ctx.set_visuals(egui::Visuals::dark());
        f(ctx);
    })
}

#[test]
fn lifting_a_toolkit_item_places_it_under_the_cursor() {
    let mut app = app_with_items(&["A", "B"]);
    with_rendered_viewport(&mut app);
    // zoom = 1, pan = (0, 0): screen space equals world space
    app.canvas.zoom_factor = 1.0;
    app.canvas.offset = egui::Vec2::ZERO;

    app.drop_toolkit_entry_on_canvas("A", egui::pos2(100.0, 100.0));

    let toolkit_ids: Vec<&str> = app
        .store
        .toolkit()
        .entries()
        .iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(toolkit_ids, ["B"]);
    let node = app.store.node("A").expect("node was created");
    assert_eq!(
        node.position,
        (
            100.0 - crate::constants::DROP_ANCHOR_X,
            100.0 - crate::constants::DROP_ANCHOR_Y
        )
    );
    assert_eq!(app.interaction.selected_node.as_deref(), Some("A"));
}

#[test]
fn toolkit_drop_inverse_projects_through_pan_and_zoom() {
    let mut app = app_with_items(&["A"]);
    with_rendered_viewport(&mut app);
    app.canvas.zoom_factor = 2.0;
    app.canvas.offset = egui::vec2(50.0, 50.0);

    app.drop_toolkit_entry_on_canvas("A", egui::pos2(250.0, 150.0));

    // world = (screen - pan) / zoom = (100, 50), then the anchor offset
    let node = app.store.node("A").expect("node was created");
    assert_eq!(
        node.position,
        (
            100.0 - crate::constants::DROP_ANCHOR_X,
            50.0 - crate::constants::DROP_ANCHOR_Y
        )
    );
}

#[test]
fn toolkit_drop_before_the_viewport_renders_is_ignored() {
    let mut app = app_with_items(&["A"]);
    assert!(app.interaction.canvas_rect.is_none());

    app.drop_toolkit_entry_on_canvas("A", egui::pos2(100.0, 100.0));

    // The drop is a silent no-op, not an error
    assert!(app.store.node("A").is_none());
    assert!(app.store.toolkit().contains("A"));
}

#[test]
fn group_template_drop_creates_a_named_empty_group() {
    let mut app = app_with_items(&[]);
    with_rendered_viewport(&mut app);

    app.drop_group_template_on_canvas(egui::pos2(300.0, 200.0));
    app.drop_group_template_on_canvas(egui::pos2(600.0, 200.0));

    let mut titles: Vec<String> = app
        .store
        .nodes()
        .values()
        .filter_map(|n| match &n.kind {
            NodeKind::Group { title, .. } => Some(title.clone()),
            _ => None,
        })
        .collect();
    titles.sort();
    assert_eq!(titles, ["Group 1", "Group 2"]);
}

#[test]
fn delete_key_returns_the_selected_item_to_the_toolkit() {
    let mut app = app_with_items(&["A"]);
    with_rendered_viewport(&mut app);
    app.drop_toolkit_entry_on_canvas("A", egui::pos2(100.0, 100.0));
    assert!(!app.store.toolkit().contains("A"));

    let _ = run_ui_with(
        vec![egui::Event::Key {
            key: egui::Key::Delete,
            physical_key: Some(egui::Key::Delete),
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }],
        |ctx| {
            app.handle_delete_key(ctx);
        },
    );

    assert!(app.store.node("A").is_none());
    assert!(app.store.toolkit().contains("A"));
    assert!(app.interaction.selected_node.is_none());
}

#[test]
fn escape_cancels_a_drag_with_no_net_mutation() {
    let mut app = app_with_items(&["A"]);
    with_rendered_viewport(&mut app);
    app.drop_toolkit_entry_on_canvas("A", egui::pos2(100.0, 100.0));
    let origin = app.store.node("A").unwrap().position;

    // Mid-gesture: the node has been dragged away from its origin
    app.interaction.canvas_drag.begin(CanvasDrag {
        node_id: "A".to_string(),
        origin,
        grab_offset: (0.0, 0.0),
        moved: true,
        hover_target: None,
    });
    app.store.apply_node_changes(vec![NodeChange::Position {
        id: "A".to_string(),
        position: (700.0, 700.0),
    }]);

    let _ = run_ui_with(
        vec![egui::Event::Key {
            key: egui::Key::Escape,
            physical_key: Some(egui::Key::Escape),
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }],
        |ctx| {
            app.handle_cancel_key(ctx);
        },
    );

    assert!(!app.interaction.canvas_drag.is_dragging());
    assert_eq!(app.store.node("A").unwrap().position, origin);
}

#[test]
fn clicking_the_canvas_selects_the_node_under_the_cursor() {
    let mut app = app_with_items(&["A"]);
    // Pre-mark the viewport so the first frame does not recenter the origin
    with_rendered_viewport(&mut app);
    app.canvas.offset = egui::Vec2::ZERO;
    app.canvas.zoom_factor = 1.0;
    app.drop_toolkit_entry_on_canvas("A", egui::pos2(300.0, 250.0));
    app.interaction.selected_node = None;

    let node_pos = app.store.node("A").unwrap().position;
    let click_pos = egui::pos2(node_pos.0 + 40.0, node_pos.1 + 20.0);

    // Drive multiple frames on the same egui Context so pointer state persists.
    let ctx = egui::Context::default();

    // First frame: move the cursor over the node to establish hover
    let mut raw0 = egui::RawInput::default();
    raw0.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(1200.0, 800.0),
    ));
    raw0.events = vec![egui::Event::PointerMoved(click_pos)];
    let _ = ctx.run(raw0, |ctx| {
        ctx.set_visuals(egui::Visuals::dark());
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_canvas(ui);
        });
    });

    // Second frame: press the primary button over the node; selection is
    // set when the drag gesture starts
    let mut raw1 = egui::RawInput::default();
    raw1.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(1200.0, 800.0),
    ));
    raw1.events = vec![
        egui::Event::PointerMoved(click_pos),
        egui::Event::PointerButton {
            pos: click_pos,
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        },
    ];
    let _ = ctx.run(raw1, |ctx| {
        ctx.set_visuals(egui::Visuals::dark());
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_canvas(ui);
        });
    });

    assert_eq!(app.interaction.selected_node.as_deref(), Some("A"));
}

#[test]
fn dragging_onto_a_group_highlights_it_and_joins_on_release() {
    let mut app = app_with_items(&["A"]);
    with_rendered_viewport(&mut app);
    app.canvas.offset = egui::Vec2::ZERO;
    app.canvas.zoom_factor = 1.0;

    let group_id = app.store.create_group("G".to_string(), (0.0, 0.0));
    app.drop_toolkit_entry_on_canvas("A", egui::pos2(700.0, 350.0));
    let node = app.store.node("A").unwrap();
    let press_pos = {
        let center = node.center();
        egui::pos2(center.0, center.1)
    };

    let ctx = egui::Context::default();
    let screen = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1200.0, 800.0));
    let frame = |ctx: &egui::Context, app: &mut BoardApp, events: Vec<egui::Event>| {
        let mut raw = egui::RawInput::default();
        raw.screen_rect = Some(screen);
        raw.events = events;
        let _ = ctx.run(raw.clone(), |ctx| {
            ctx.set_visuals(egui::Visuals::dark());
            egui::CentralPanel::default().show(ctx, |ui| {
                app.draw_canvas(ui);
            });
        });
    };

    // Hover, press on the item, drag its center into the group box
    frame(&ctx, &mut app, vec![egui::Event::PointerMoved(press_pos)]);
    frame(
        &ctx,
        &mut app,
        vec![egui::Event::PointerButton {
            pos: press_pos,
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        }],
    );
    let inside_group = egui::pos2(100.0, 50.0);
    frame(&ctx, &mut app, vec![egui::Event::PointerMoved(inside_group)]);

    let drag = app.interaction.canvas_drag.payload().expect("drag active");
    assert_eq!(drag.hover_target.as_ref(), Some(&group_id));

    frame(
        &ctx,
        &mut app,
        vec![egui::Event::PointerButton {
            pos: inside_group,
            button: egui::PointerButton::Primary,
            pressed: false,
            modifiers: egui::Modifiers::NONE,
        }],
    );

    assert!(!app.interaction.canvas_drag.is_dragging());
    match &app.store.node(&group_id).unwrap().kind {
        NodeKind::Group { child_item_ids, .. } => {
            assert_eq!(child_item_ids, &vec!["A".to_string()])
        }
        _ => panic!("expected a group"),
    }
    let expected = group_child_offset(0);
    assert_eq!(app.store.node("A").unwrap().position, expected);
}

#[test]
fn ui_preferences_serialize_without_board_state() {
    let mut app = app_with_items(&["A"]);
    with_rendered_viewport(&mut app);
    app.drop_toolkit_entry_on_canvas("A", egui::pos2(100.0, 100.0));
    app.dark_mode = false;
    app.toolkit_panel_width = 300.0;

    let json = app.to_json().unwrap();
    // The board itself lives at the persistence endpoint
    assert!(!json.contains("\"A\""));
    assert!(!json.contains("provider_metadata"));

    let restored = BoardApp::from_json(&json).unwrap();
    assert!(!restored.dark_mode);
    assert_eq!(restored.toolkit_panel_width, 300.0);
    assert!(restored.store.nodes().is_empty());
}
