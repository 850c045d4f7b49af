use plotline_engine::prelude::*;
use plotline_engine::ConnectAction;
use plotline_test_utils::{
    assert_story_consistent, build_outline, child_ids, heading, text_body, top_level,
    two_chapter_outline, y_of,
};
use pretty_assertions::assert_eq;

#[test]
fn test_build_chapter_scene_text_from_empty() {
    let mut engine = OutlineEngine::default();
    let a = engine.create_chapter(&Placement::append(), heading("A")).unwrap();
    let s1 = engine.create_scene(&a, &Placement::append(), heading("S1")).unwrap();
    let text = engine.create_text(&s1, &Placement::append(), text_body("first")).unwrap();

    let story = engine.current_story();
    assert_eq!(top_level(story), vec![a.clone()]);
    assert_eq!(child_ids(story, &a), vec![s1.clone()]);
    assert_eq!(child_ids(story, &s1), vec![text.clone()]);

    // default scene height 120: round(120 / 2) + 200
    assert_eq!(y_of(story, &text), y_of(story, &s1) + 260.0);
    assert_eq!(story.get_node(&text).unwrap().position.x, story.get_node(&s1).unwrap().position.x);
    assert_story_consistent(story);
}

#[test]
fn test_move_scene_to_start_of_other_chapter() {
    let (mut engine, outline) = two_chapter_outline();
    let scene = outline.scene(0, 0).clone();
    let chapter2 = outline.chapter(1).clone();

    engine.move_node(&scene, Some(&chapter2), &Placement::at_start()).unwrap();

    let story = engine.current_story();
    assert_eq!(child_ids(story, &chapter2)[0], scene);
    assert_eq!(story.get_node(&scene).unwrap().parent_id.as_ref(), Some(&chapter2));
    assert!(!child_ids(story, outline.chapter(0)).contains(&scene));
    assert_story_consistent(story);
}

#[test]
fn test_growing_first_text_shifts_only_what_follows() {
    let mut engine = OutlineEngine::default();
    let outline = build_outline(&mut engine, &[&[1, 1]]);
    let t1 = outline.text(0, 0, 0).clone();
    let before = engine.current_story().clone();

    assert_eq!(
        engine.report_size(&t1, Size::new(400.0, 160.0)),
        RemeasureOutcome::FirstMeasurement
    );
    let outcome = engine.report_size(&t1, Size::new(400.0, 235.0));
    assert_eq!(outcome, RemeasureOutcome::Shifted { delta: 75.0, moved: 2 });

    let after = engine.current_story();
    for id in [outline.scene(0, 1), outline.text(0, 1, 0)] {
        let old = before.get_node(id).unwrap().position;
        let new = after.get_node(id).unwrap().position;
        assert_eq!((new.x - old.x, new.y - old.y), (0.0, 75.0));
    }
    for id in [outline.chapter(0), outline.scene(0, 0), &t1] {
        assert_eq!(after.get_node(id).unwrap().position, before.get_node(id).unwrap().position);
    }
}

#[test]
fn test_remeasure_never_records_history() {
    let mut engine = OutlineEngine::default();
    let outline = build_outline(&mut engine, &[&[2]]);
    let t1 = outline.text(0, 0, 0).clone();
    let past = engine.history().past_len();

    engine.report_size(&t1, Size::new(400.0, 160.0));
    engine.report_size(&t1, Size::new(400.0, 300.0));
    engine.apply_layout_delta(&t1, 10.0).unwrap();

    assert_eq!(engine.history().past_len(), past);
}

#[test]
fn test_insert_after_and_at_start() {
    let mut engine = OutlineEngine::default();
    let outline = build_outline(&mut engine, &[&[2]]);
    let scene = outline.scene(0, 0).clone();
    let first = outline.text(0, 0, 0).clone();
    let second = outline.text(0, 0, 1).clone();

    let middle = engine
        .create_text(&scene, &Placement::after(first.clone()), text_body("middle"))
        .unwrap();
    assert_eq!(
        child_ids(engine.current_story(), &scene),
        vec![first.clone(), middle.clone(), second.clone()]
    );

    // at_start wins over insert_after
    let opening = engine
        .create_text(
            &scene,
            &Placement {
                insert_after: Some(second.clone()),
                at_start: true,
            },
            text_body("opening"),
        )
        .unwrap();
    assert_eq!(
        child_ids(engine.current_story(), &scene),
        vec![opening, first, middle, second]
    );
}

#[test]
fn test_insertion_gap_pushes_later_chapters_right() {
    let mut engine = OutlineEngine::default();
    let outline = build_outline(&mut engine, &[&[1], &[1]]);
    let c1 = outline.chapter(0).clone();
    let c2 = outline.chapter(1).clone();
    let c2_x = engine.current_story().get_node(&c2).unwrap().position.x;

    let inserted = engine.create_chapter(&Placement::after(c1), heading("Interlude")).unwrap();

    let story = engine.current_story();
    assert_eq!(top_level(story)[1], inserted);
    assert_eq!(story.get_node(&c2).unwrap().position.x, c2_x + 1600.0);
}

#[test]
fn test_cycle_rejection_leaves_state_untouched() {
    let (mut engine, outline) = two_chapter_outline();
    let before = engine.current_story().clone();
    let past = engine.history().past_len();

    let err = engine
        .move_node(outline.scene(0, 0), Some(outline.text(0, 0, 0)), &Placement::append())
        .unwrap_err();

    assert!(matches!(err, EngineError::CycleDetected { .. }));
    assert_eq!(engine.current_story(), &before);
    assert_eq!(engine.history().past_len(), past);
}

#[test]
fn test_type_rule_rejections() {
    let (mut engine, outline) = two_chapter_outline();

    let err = engine.create_text(outline.chapter(0), &Placement::append(), text_body("x")).unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidParent {
            child: NodeKind::Text,
            parent: Some(NodeKind::Chapter)
        }
    );

    let err = engine.move_node(outline.scene(0, 0), None, &Placement::append()).unwrap_err();
    assert!(err.is_structural());

    let err = engine.update_text(outline.scene(0, 0), TextPatch::default().text("x")).unwrap_err();
    assert!(matches!(err, EngineError::TypeMismatch { .. }));

    let err = engine.delete_scene(&NodeId::new("missing")).unwrap_err();
    assert_eq!(err, EngineError::NotFound(NodeId::new("missing")));
}

#[test]
fn test_connect_targets_feed_move() {
    let (mut engine, outline) = two_chapter_outline();
    let text = outline.text(1, 0, 0).clone();
    let targets = engine.connect_targets(&text);

    let after = targets.get(outline.text(0, 1, 0)).unwrap();
    assert_eq!(after.action, ConnectAction::AfterText);

    let spec = after.spec.clone();
    engine.apply_move(&text, &spec).unwrap();
    assert_eq!(
        child_ids(engine.current_story(), outline.scene(0, 1)),
        vec![outline.text(0, 1, 0).clone(), text]
    );
    assert_story_consistent(engine.current_story());
}

#[test]
fn test_reorder_chapters() {
    let (mut engine, outline) = two_chapter_outline();
    let swapped = vec![outline.chapter(1).clone(), outline.chapter(0).clone()];
    engine.reorder_chapters(&swapped).unwrap();
    assert_eq!(top_level(engine.current_story()), swapped);

    let err = engine.reorder_chapters(&[outline.chapter(0).clone()]).unwrap_err();
    assert!(matches!(err, EngineError::InvalidReorder(_)));
}

#[test]
fn test_media_attach_and_delete_cascade() {
    let (mut engine, outline) = two_chapter_outline();
    let text = outline.text(0, 0, 0).clone();
    let note = engine
        .create_annotation(&text, AnnotationBody::default())
        .unwrap();
    let event = engine
        .create_event(outline.scene(0, 0), EventBody::in_year(1888, "Harvest"))
        .unwrap();

    let removed = engine.delete_scene(outline.scene(0, 0)).unwrap();
    assert_eq!(removed.len(), 4);
    let story = engine.current_story();
    assert!(!story.contains(&note));
    assert!(!story.contains(&event));
    assert_story_consistent(story);
}

#[test]
fn test_non_finite_geometry_is_rejected() {
    let mut engine = OutlineEngine::default();
    let outline = build_outline(&mut engine, &[&[2]]);
    let t1 = outline.text(0, 0, 0).clone();
    engine.report_size(&t1, Size::new(400.0, 160.0));
    let before = engine.current_story().clone();

    for height in [f64::NAN, f64::INFINITY] {
        assert_eq!(engine.report_size(&t1, Size::new(400.0, height)), RemeasureOutcome::InvalidSize);
    }
    assert_eq!(engine.sizes().height(&t1), Some(160.0));

    let err = engine.apply_layout_delta(&t1, f64::NAN).unwrap_err();
    assert_eq!(err, EngineError::NonFinite { id: t1.clone(), field: "delta" });

    let past = engine.history().past_len();
    let err = engine
        .set_position(&t1, Position::new(f64::NAN, 0.0), HistoryMode::Record)
        .unwrap_err();
    assert!(matches!(err, EngineError::NonFinite { .. }));
    assert_eq!(engine.history().past_len(), past);

    engine.begin_drag(&t1).unwrap();
    assert!(engine.drag_to(Position::new(0.0, f64::NEG_INFINITY)).is_err());
    engine.end_drag().unwrap();

    assert_eq!(engine.current_story(), &before);
    let reloaded = Story::from_json(&engine.current_story().to_json().unwrap()).unwrap();
    assert_eq!(&reloaded, engine.current_story());

    let outcome = engine.report_size(&t1, Size::new(400.0, 200.0));
    assert_eq!(outcome, RemeasureOutcome::Shifted { delta: 40.0, moved: 1 });
}

#[test]
fn test_replace_story_drops_stale_sizes_and_images() {
    let mut engine = OutlineEngine::default();
    let outline = build_outline(&mut engine, &[&[2]]);
    let t1 = outline.text(0, 0, 0).clone();
    let t2 = outline.text(0, 0, 1).clone();
    engine.report_size(&t1, Size::new(400.0, 160.0));
    let saved = engine.current_story().clone();

    assert!(engine.report_size(&t1, Size::new(400.0, 400.0)).is_shift());
    let picture = engine
        .create_picture(outline.scene(0, 0), PictureBody::default(), Some(vec![1u8; 8].into()))
        .unwrap();
    assert!(engine.images().contains(&picture));

    engine.replace_story(saved.clone(), true).unwrap();
    assert!(engine.images().is_empty());
    assert_eq!(engine.sizes().height(&t1), None);

    assert_eq!(
        engine.report_size(&t1, Size::new(400.0, 160.0)),
        RemeasureOutcome::FirstMeasurement
    );
    assert_eq!(engine.current_story(), &saved);
    assert!(y_of(engine.current_story(), &t2) > y_of(engine.current_story(), &t1));
}

#[test]
fn test_undo_of_replace_story_brings_images_back() {
    let mut engine = OutlineEngine::default();
    let chapter = engine.create_chapter(&Placement::append(), heading("A")).unwrap();
    let saved = engine.current_story().clone();
    let picture = engine
        .create_picture(&chapter, PictureBody::default(), Some(vec![7u8; 4].into()))
        .unwrap();

    engine.replace_story(saved, false).unwrap();
    assert!(!engine.images().contains(&picture));

    assert!(engine.undo());
    assert!(engine.current_story().contains(&picture));
    assert_eq!(engine.images().get(&picture).map(|b| b.len()), Some(4));
}
