use std::sync::Arc;

use lubankit_core::{
    AppEvent, EventBus, EventBusConfig, EventCategory, EventFilter, HeadType, HistoryEvent, ModelId,
};
use lubankit_editor::{Editor, FlipDirection, ModelSpec, Scene, SvgModel};
use lubankit_settings::Config;

fn editor_with_bus() -> (Editor, Arc<EventBus>) {
    let bus = Arc::new(EventBus::with_config(EventBusConfig {
        enable_history: true,
        ..EventBusConfig::default()
    }));
    (Editor::with_event_bus(Config::default(), bus.clone()), bus)
}

fn snapshot(scene: &Scene) -> (Vec<SvgModel>, Vec<lubankit_editor::scene::SvgElement>, Vec<(u64, Vec<ModelId>)>) {
    (
        scene.models.models().cloned().collect(),
        scene.svg.elements().to_vec(),
        scene
            .tool_paths
            .get_tool_paths()
            .iter()
            .map(|t| (t.id.get(), t.model_ids.clone()))
            .collect(),
    )
}

#[test]
fn test_add_model_is_undoable() {
    let (mut editor, bus) = editor_with_bus();
    let id = editor
        .add_model(HeadType::Laser, ModelSpec::vector("square", 20.0, 20.0))
        .unwrap();
    assert!(editor.can_undo(HeadType::Laser));
    assert!(!editor.can_undo(HeadType::Cnc));

    assert!(editor.undo(HeadType::Laser).unwrap());
    assert!(!editor.scene(HeadType::Laser).models.contains(id));
    assert!(editor.redo(HeadType::Laser).unwrap());
    assert!(editor.scene(HeadType::Laser).models.contains(id));

    let history = bus.history_matching(&EventFilter::Categories(vec![EventCategory::History]));
    assert!(matches!(
        history.first(),
        Some(AppEvent::History(HistoryEvent::Pushed { undo_depth: 1, .. }))
    ));
    assert!(history
        .iter()
        .any(|e| matches!(e, AppEvent::History(HistoryEvent::Undone { .. }))));
}

#[test]
fn test_hide_undo_redo_scenario() {
    let (mut editor, _) = editor_with_bus();
    let head = HeadType::Laser;
    let id = editor.add_model(head, ModelSpec::vector("a", 10.0, 10.0)).unwrap();
    editor.select_models(head, &[id]).unwrap();

    assert_eq!(editor.hide_selected_models(head).unwrap(), 1);
    assert!(!editor.scene(head).models.get(id).unwrap().visible);

    editor.undo(head).unwrap();
    assert!(editor.scene(head).models.get(id).unwrap().visible);

    editor.redo(head).unwrap();
    assert!(!editor.scene(head).models.get(id).unwrap().visible);

    // Hiding a hidden model records nothing.
    editor.select_models(head, &[id]).unwrap();
    let depth = editor.history(head).undo_depth();
    assert_eq!(editor.hide_selected_models(head).unwrap(), 0);
    assert_eq!(editor.history(head).undo_depth(), depth);
}

#[test]
fn test_remove_restores_tool_paths_on_undo() {
    let (mut editor, _) = editor_with_bus();
    let head = HeadType::Cnc;
    let a = editor.add_model(head, ModelSpec::vector("a", 10.0, 10.0)).unwrap();
    let b = editor.add_model(head, ModelSpec::vector("b", 10.0, 10.0)).unwrap();
    let only_a = editor.add_tool_path(head, "only a", &[a]).unwrap();
    let both = editor.add_tool_path(head, "both", &[a, b]).unwrap();
    let before = snapshot(editor.scene(head));

    editor.select_models(head, &[a]).unwrap();
    assert_eq!(editor.remove_selected_models(head).unwrap(), 1);
    let scene = editor.scene(head);
    assert!(scene.tool_paths.get(only_a).is_err());
    assert_eq!(scene.tool_paths.get(both).unwrap().model_ids, vec![b]);

    editor.undo(head).unwrap();
    assert_eq!(snapshot(editor.scene(head)), before);
}

#[test]
fn test_move_keeps_selection_and_round_trips() {
    let (mut editor, _) = editor_with_bus();
    let head = HeadType::Laser;
    let id = editor
        .add_model(head, ModelSpec::vector("a", 10.0, 10.0).at(5.0, 5.0))
        .unwrap();
    editor.select_models(head, &[id]).unwrap();

    editor.move_selected_models(head, 10.0, -5.0).unwrap();
    let scene = editor.scene(head);
    let t = scene.models.get(id).unwrap().transformation;
    assert_eq!((t.position_x, t.position_y), (15.0, 0.0));
    assert_eq!(scene.svg.element(id).unwrap().x, 15.0 + 400.0);
    assert_eq!(scene.models.selected_ids(), &[id]);

    editor.undo(head).unwrap();
    let t = editor.scene(head).models.get(id).unwrap().transformation;
    assert_eq!((t.position_x, t.position_y), (5.0, 5.0));
}

#[test]
fn test_rotate_and_flip() {
    let (mut editor, _) = editor_with_bus();
    let head = HeadType::Laser;
    let id = editor.add_model(head, ModelSpec::vector("a", 10.0, 10.0)).unwrap();
    editor.select_models(head, &[id]).unwrap();

    editor.rotate_selected_models(head, 90.0).unwrap();
    editor
        .flip_selected_models(head, FlipDirection::Vertical)
        .unwrap();
    let t = editor.scene(head).models.get(id).unwrap().transformation;
    assert_eq!(t.rotation_z, 90.0);
    assert_eq!(t.scale_y, -1.0);

    editor.undo(head).unwrap();
    editor.undo(head).unwrap();
    let t = editor.scene(head).models.get(id).unwrap().transformation;
    assert_eq!((t.rotation_z, t.scale_y), (0.0, 1.0));
}

#[test]
fn test_many_steps_round_trip() {
    let (mut editor, _) = editor_with_bus();
    let head = HeadType::Laser;
    let initial = snapshot(editor.scene(head));

    let a = editor.add_model(head, ModelSpec::vector("a", 10.0, 10.0)).unwrap();
    let b = editor.add_model(head, ModelSpec::vector("b", 4.0, 8.0)).unwrap();
    editor.add_tool_path(head, "tp", &[a, b]).unwrap();
    editor.select_models(head, &[a, b]).unwrap();
    editor.move_selected_models(head, 3.0, 4.0).unwrap();
    editor.hide_selected_models(head).unwrap();
    editor.select_models(head, &[b]).unwrap();
    editor.remove_selected_models(head).unwrap();
    let last = snapshot(editor.scene(head));
    let steps = editor.history(head).undo_depth();
    assert_eq!(steps, 5);

    for _ in 0..steps {
        assert!(editor.undo(head).unwrap());
    }
    // Undoing both adds also deleted the tool path they emptied.
    assert_eq!(snapshot(editor.scene(head)), initial);

    for _ in 0..steps {
        assert!(editor.redo(head).unwrap());
    }
    assert_eq!(snapshot(editor.scene(head)), last);
}

#[test]
fn test_new_action_clears_redo() {
    let (mut editor, _) = editor_with_bus();
    let head = HeadType::Laser;
    editor.add_model(head, ModelSpec::vector("a", 10.0, 10.0)).unwrap();
    editor.undo(head).unwrap();
    assert!(editor.can_redo(head));
    editor.add_model(head, ModelSpec::vector("b", 10.0, 10.0)).unwrap();
    assert!(!editor.can_redo(head));
}

#[test]
fn test_undo_of_destroyed_model_drops_entry() {
    let (mut editor, bus) = editor_with_bus();
    let head = HeadType::Laser;
    let id = editor.add_model(head, ModelSpec::vector("a", 10.0, 10.0)).unwrap();
    editor.select_models(head, &[id]).unwrap();
    editor.hide_selected_models(head).unwrap();

    editor.scene_mut(head).detach_model(id).unwrap();
    let err = editor.undo(head).unwrap_err();
    assert!(err.is_history_error());
    assert_eq!(editor.history(head).undo_depth(), 1);
    assert!(!editor.can_redo(head));
    assert!(bus
        .history()
        .iter()
        .any(|e| matches!(e, AppEvent::History(HistoryEvent::Failed { .. }))));
}

#[test]
fn test_failed_group_undo_keeps_other_models() {
    let (mut editor, _) = editor_with_bus();
    let head = HeadType::Laser;
    let x = editor.add_model(head, ModelSpec::vector("x", 10.0, 10.0)).unwrap();
    let a = editor.add_model(head, ModelSpec::vector("a", 10.0, 10.0)).unwrap();
    editor.select_models(head, &[x, a]).unwrap();
    assert_eq!(editor.hide_selected_models(head).unwrap(), 2);

    editor.scene_mut(head).detach_model(x).unwrap();
    assert!(editor.undo(head).is_err());
    let scene = editor.scene(head);
    assert!(!scene.models.get(a).unwrap().visible);
    assert_eq!(scene.svg.element(a).unwrap().display, lubankit_editor::Display::None);
}

#[test]
fn test_reset_surface_clears_history() {
    let (mut editor, _) = editor_with_bus();
    editor
        .add_model(HeadType::Laser, ModelSpec::vector("a", 10.0, 10.0))
        .unwrap();
    editor
        .add_model(HeadType::Cnc, ModelSpec::vector("b", 10.0, 10.0))
        .unwrap();
    editor.reset_surface(HeadType::Laser);
    assert!(!editor.can_undo(HeadType::Laser));
    assert!(editor.scene(HeadType::Laser).models.is_empty());
    assert!(editor.can_undo(HeadType::Cnc));
}

#[test]
fn test_empty_history_undo_is_noop() {
    let mut editor = Editor::new(Config::default());
    assert!(!editor.undo(HeadType::Cnc).unwrap());
    assert!(!editor.redo(HeadType::Cnc).unwrap());
}
