use lubankit_core::HeadType;
use lubankit_editor::{Editor, ModelSpec};
use lubankit_settings::Config;

const HEAD: HeadType = HeadType::Laser;

#[test]
fn test_draw_gesture_collapses_to_one_step() {
    let mut editor = Editor::new(Config::default());
    editor.start_draw(HEAD, None).unwrap();
    editor
        .draw_line(HEAD, vec![[380.0, 380.0], [420.0, 380.0]], false)
        .unwrap();
    let second = editor
        .draw_line(HEAD, vec![[420.0, 380.0], [420.0, 400.0]], false)
        .unwrap();
    assert_eq!(editor.history(HEAD).undo_depth(), 3);

    // Strokes are undoable one by one while drawing.
    editor.undo(HEAD).unwrap();
    assert!(editor
        .scene(HEAD)
        .svg
        .draw_group()
        .line(second)
        .is_none());
    editor.redo(HEAD).unwrap();

    let model_id = editor.draw_complete(HEAD).unwrap().unwrap();
    assert_eq!(editor.history(HEAD).undo_depth(), 1);
    assert!(!editor.scene(HEAD).svg.draw_group().is_drawing());

    let model = editor.scene(HEAD).models.get(model_id).unwrap();
    assert_eq!(model.transformation.width, 40.0);
    assert_eq!(model.transformation.height, 20.0);
    // Center (400, 390) on the canvas is (0, 10) in model space.
    assert_eq!(model.transformation.position_x, 0.0);
    assert_eq!(model.transformation.position_y, 10.0);

    editor.undo(HEAD).unwrap();
    assert!(editor.scene(HEAD).models.is_empty());
    assert!(!editor.can_undo(HEAD));
}

#[test]
fn test_duplicate_start_is_skipped() {
    let mut editor = Editor::new(Config::default());
    editor.start_draw(HEAD, None).unwrap();
    editor.start_draw(HEAD, None).unwrap();
    assert_eq!(editor.history(HEAD).undo_depth(), 1);
}

#[test]
fn test_editing_element_records_path_change() {
    let mut editor = Editor::new(Config::default());
    let id = editor
        .add_model(
            HEAD,
            ModelSpec::vector("path", 10.0, 10.0).with_path("M 395 395 L 405 405"),
        )
        .unwrap();
    let before = editor.scene(HEAD).svg.element(id).unwrap().path.clone();

    editor.start_draw(HEAD, Some(id)).unwrap();
    let fragments: Vec<_> = editor
        .scene(HEAD)
        .svg
        .draw_group()
        .lines()
        .iter()
        .map(|l| l.fragment_id)
        .collect();
    assert!(editor
        .transform_draw_lines(HEAD, &fragments, 10.0, 0.0)
        .unwrap());

    assert_eq!(editor.draw_complete(HEAD).unwrap(), Some(id));
    let scene = editor.scene(HEAD);
    assert_eq!(
        scene.svg.element(id).unwrap().path.as_deref(),
        Some("M 405 395 L 415 405")
    );
    assert_eq!(scene.models.get(id).unwrap().transformation.position_x, 10.0);
    // Add + edit; the gesture steps are gone.
    assert_eq!(editor.history(HEAD).undo_depth(), 2);

    editor.undo(HEAD).unwrap();
    assert_eq!(editor.scene(HEAD).svg.element(id).unwrap().path, before);
}

#[test]
fn test_deleting_every_line_deletes_element() {
    let mut editor = Editor::new(Config::default());
    let id = editor
        .add_model(
            HEAD,
            ModelSpec::vector("path", 10.0, 10.0).with_path("M 0 0 L 10 10"),
        )
        .unwrap();
    editor.start_draw(HEAD, Some(id)).unwrap();
    let fragments: Vec<_> = editor
        .scene(HEAD)
        .svg
        .draw_group()
        .lines()
        .iter()
        .map(|l| l.fragment_id)
        .collect();
    assert_eq!(editor.delete_draw_lines(HEAD, &fragments).unwrap(), 1);

    assert_eq!(editor.draw_complete(HEAD).unwrap(), None);
    assert!(!editor.scene(HEAD).models.contains(id));
    editor.undo(HEAD).unwrap();
    assert!(editor.scene(HEAD).models.contains(id));
}

#[test]
fn test_cancel_restores_selection_and_prunes() {
    let mut editor = Editor::new(Config::default());
    let id = editor
        .add_model(
            HEAD,
            ModelSpec::vector("path", 10.0, 10.0).with_path("M 0 0 L 10 10"),
        )
        .unwrap();
    editor.start_draw(HEAD, Some(id)).unwrap();
    editor
        .draw_line(HEAD, vec![[1.0, 1.0], [2.0, 2.0]], false)
        .unwrap();
    editor.draw_cancel(HEAD).unwrap();

    let scene = editor.scene(HEAD);
    assert!(!scene.svg.draw_group().is_drawing());
    assert_eq!(scene.svg.selection(), &[id]);
    assert_eq!(scene.svg.element(id).unwrap().path.as_deref(), Some("M 0 0 L 10 10"));
    assert_eq!(editor.history(HEAD).undo_depth(), 1);
}

#[test]
fn test_draw_line_outside_draw_mode_fails() {
    let mut editor = Editor::new(Config::default());
    assert!(editor
        .draw_line(HEAD, vec![[0.0, 0.0], [1.0, 1.0]], false)
        .is_err());
    assert_eq!(editor.draw_complete(HEAD).unwrap(), None);
}

#[test]
fn test_cancel_drops_undone_strokes() {
    let mut editor = Editor::new(Config::default());
    editor.start_draw(HEAD, None).unwrap();
    editor
        .draw_line(HEAD, vec![[0.0, 0.0], [10.0, 0.0]], false)
        .unwrap();
    editor.undo(HEAD).unwrap();
    assert!(editor.can_redo(HEAD));

    editor.draw_cancel(HEAD).unwrap();
    assert!(!editor.can_redo(HEAD));
    assert!(!editor.redo(HEAD).unwrap());
    assert!(editor.scene(HEAD).svg.draw_group().lines().is_empty());
}

#[test]
fn test_complete_with_every_stroke_undone() {
    let mut editor = Editor::new(Config::default());
    editor.start_draw(HEAD, None).unwrap();
    editor
        .draw_line(HEAD, vec![[0.0, 0.0], [10.0, 0.0]], false)
        .unwrap();
    editor.undo(HEAD).unwrap();

    assert_eq!(editor.draw_complete(HEAD).unwrap(), None);
    assert!(!editor.can_undo(HEAD));
    assert!(!editor.can_redo(HEAD));
    assert!(editor.scene(HEAD).models.is_empty());
}
