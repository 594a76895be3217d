use lubankit::{
    event_bus, init_event_bus, log_events, parse_script, AppEvent, Config, Editor, EventBusConfig,
    EventCategory, EventFilter, HeadType, HistoryEvent, Replayer, StepStage,
};
use tempfile::TempDir;

#[test]
fn test_replay_with_config_from_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "[history]\nmax_depth = 2\n").unwrap();
    let script_path = dir.path().join("script.json");
    std::fs::write(
        &script_path,
        r#"[
            {"action": "add_model", "head": "cnc", "name": "a", "width": 10, "height": 10},
            {"action": "add_model", "head": "cnc", "name": "b", "width": 10, "height": 10},
            {"action": "add_model", "head": "cnc", "name": "c", "width": 10, "height": 10},
            {"action": "undo", "head": "cnc"},
            {"action": "undo", "head": "cnc"},
            {"action": "undo", "head": "cnc"}
        ]"#,
    )
    .unwrap();

    let config = Config::load_or_default(&config_path).unwrap();
    assert_eq!(config.history.max_depth, 2);
    let steps = parse_script(&std::fs::read_to_string(&script_path).unwrap()).unwrap();

    let mut replayer = Replayer::new(Editor::new(config));
    let reports = replayer.run(steps).unwrap();
    let undo: Vec<_> = reports.iter().map(|r| r.undo_depth).collect();
    assert_eq!(undo, vec![1, 2, 2, 1, 0, 0]);
    // The oldest add fell off the bounded history and stays.
    assert_eq!(reports.last().unwrap().models, 1);
    assert!(replayer
        .editor()
        .scene(HeadType::Cnc)
        .models
        .contains(replayer.model_id(HeadType::Cnc, "a").unwrap()));
}

#[test]
fn test_replay_raster_resize_waits_for_reload() {
    let steps = parse_script(
        r#"[
            {"action": "add_model", "head": "laser", "name": "photo", "width": 20, "height": 10, "href": "photo.png"},
            {"action": "add_model", "head": "laser", "name": "outline", "width": 20, "height": 10},
            {"action": "select", "head": "laser", "models": ["photo", "outline"]},
            {"action": "resize", "head": "laser", "width": 40, "height": 20},
            {"action": "image_loaded", "head": "laser", "model": "photo"}
        ]"#,
    )
    .unwrap();
    let mut replayer = Replayer::new(Editor::new(Config::default()));
    let reports = replayer.run(steps).unwrap();

    let resizing = &reports[3];
    assert_eq!(resizing.stage, StepStage::ResizingImage);
    assert_eq!(resizing.undo_depth, 2);
    assert!((resizing.progress - 0.5).abs() < 1e-9);

    let done = &reports[4];
    assert_eq!(done.stage, StepStage::ResizeImageSuccess);
    assert_eq!(done.undo_depth, 3);
    assert_eq!(done.progress, 1.0);
}

#[test]
fn test_replay_stops_at_failing_step() {
    let steps = parse_script(
        r#"[
            {"action": "draw_line", "head": "laser", "points": [[0, 0], [1, 1]]},
            {"action": "add_model", "head": "laser", "name": "never", "width": 1, "height": 1}
        ]"#,
    )
    .unwrap();
    let mut replayer = Replayer::new(Editor::new(Config::default()));
    assert!(replayer.run(steps).is_err());
    assert!(replayer.editor().scene(HeadType::Laser).models.is_empty());
}

#[test]
fn test_replay_on_global_bus() {
    init_event_bus(EventBusConfig {
        enable_history: true,
        ..EventBusConfig::default()
    })
    .unwrap();
    let bus = event_bus();
    log_events(&bus);
    assert_eq!(bus.subscriber_count(), 1);

    let steps = parse_script(
        r#"[
            {"action": "add_model", "head": "laser", "name": "a", "width": 10, "height": 10},
            {"action": "undo", "head": "laser"}
        ]"#,
    )
    .unwrap();
    let mut replayer = Replayer::new(Editor::with_event_bus(Config::default(), event_bus()));
    replayer.run(steps).unwrap();

    let history = bus.history_matching(&EventFilter::Categories(vec![EventCategory::History]));
    assert!(matches!(
        history.as_slice(),
        [
            AppEvent::History(HistoryEvent::Pushed { .. }),
            AppEvent::History(HistoryEvent::Undone { .. })
        ]
    ));
}
