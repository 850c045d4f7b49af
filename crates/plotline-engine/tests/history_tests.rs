use plotline_engine::prelude::*;
use plotline_engine::{EngineConfig, DEFAULT_HISTORY_CAPACITY};
use plotline_test_utils::{heading, text_body, two_chapter_outline};
use pretty_assertions::assert_eq;

#[test]
fn test_undo_redo_round_trip() {
    let (mut engine, outline) = two_chapter_outline();
    let scene = outline.scene(0, 0).clone();

    let mut states = vec![engine.current_story().clone()];
    engine.create_text(&scene, &Placement::at_start(), text_body("new")).unwrap();
    states.push(engine.current_story().clone());
    engine.update_scene(&scene, HeadingPatch::default().title("Renamed")).unwrap();
    states.push(engine.current_story().clone());
    engine.move_node(&scene, Some(outline.chapter(1)), &Placement::append()).unwrap();
    states.push(engine.current_story().clone());
    engine.delete_chapter(outline.chapter(0)).unwrap();
    states.push(engine.current_story().clone());

    for expected in states.iter().rev().skip(1) {
        assert!(engine.undo());
        assert_eq!(engine.current_story(), expected);
    }
    for expected in states.iter().skip(1) {
        assert!(engine.redo());
        assert_eq!(engine.current_story(), expected);
    }
    assert!(!engine.redo());
}

#[test]
fn test_new_mutation_clears_redo() {
    let (mut engine, outline) = two_chapter_outline();
    engine.update_chapter(outline.chapter(0), HeadingPatch::default().title("X")).unwrap();
    assert!(engine.undo());
    assert!(engine.can_redo());

    engine.create_chapter(&Placement::append(), heading("Later")).unwrap();
    assert!(!engine.can_redo());
}

#[test]
fn test_history_capped_at_fifty() {
    let mut engine = OutlineEngine::default();
    for i in 0..60 {
        engine.set_title(format!("draft {i}"));
    }
    assert_eq!(engine.history().past_len(), DEFAULT_HISTORY_CAPACITY);

    let mut undone = 0;
    while engine.undo() {
        undone += 1;
    }
    assert_eq!(undone, 50);
    // the ten oldest states were evicted
    assert_eq!(engine.current_story().title(), "draft 9");
}

#[test]
fn test_configured_capacity() {
    let mut engine = OutlineEngine::new(EngineConfig::default().with_history_capacity(3));
    for i in 0..5 {
        engine.set_title(format!("v{i}"));
    }
    assert_eq!(engine.history().past_len(), 3);
}

#[test]
fn test_empty_history() {
    let mut engine = OutlineEngine::default();
    assert!(!engine.undo());
    assert!(!engine.redo());
    assert!(!engine.history().is_suppressed());
}

#[test]
fn test_undo_restores_images() {
    let mut engine = OutlineEngine::default();
    let chapter = engine.create_chapter(&Placement::append(), heading("A")).unwrap();
    let picture = engine.create_picture(&chapter, PictureBody::default(), None).unwrap();

    engine.set_image(&picture, vec![9u8; 16]).unwrap();
    assert!(engine.images().contains(&picture));

    assert!(engine.undo());
    assert!(!engine.images().contains(&picture));
    assert!(engine.redo());
    assert_eq!(engine.images().get(&picture).map(|b| b.len()), Some(16));
}
