use plotline_engine::prelude::*;
use plotline_model::rules;
use plotline_test_utils::{assert_story_consistent, heading, text_body};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Chapter,
    Scene(usize),
    Text(usize),
    Annotation(usize),
    Delete(usize),
    Move(usize, usize, bool),
    Connect(usize, usize),
    Resize(usize, u16),
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Chapter),
        any::<usize>().prop_map(Op::Scene),
        any::<usize>().prop_map(Op::Text),
        any::<usize>().prop_map(Op::Annotation),
        any::<usize>().prop_map(Op::Delete),
        (any::<usize>(), any::<usize>(), any::<bool>()).prop_map(|(a, b, top)| Op::Move(a, b, top)),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Connect(a, b)),
        (any::<usize>(), 40u16..600).prop_map(|(a, h)| Op::Resize(a, h)),
        Just(Op::Undo),
        Just(Op::Redo),
    ]
}

fn pick(story: &Story, index: usize) -> Option<NodeId> {
    let ids = story.document_order();
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()].clone())
    }
}

/// Apply one op; failures are fine but must leave story and history alone
fn apply(engine: &mut OutlineEngine, op: &Op) {
    let before = engine.current_story().clone();
    let past = engine.history().past_len();

    let result = match op {
        Op::Chapter => engine.create_chapter(&Placement::append(), heading("c")).map(drop),
        Op::Scene(i) => match pick(&before, *i) {
            Some(parent) => engine.create_scene(&parent, &Placement::append(), heading("s")).map(drop),
            None => Ok(()),
        },
        Op::Text(i) => match pick(&before, *i) {
            Some(parent) => engine.create_text(&parent, &Placement::at_start(), text_body("t")).map(drop),
            None => Ok(()),
        },
        Op::Annotation(i) => match pick(&before, *i) {
            Some(parent) => engine.create_annotation(&parent, AnnotationBody::default()).map(drop),
            None => Ok(()),
        },
        Op::Delete(i) => match pick(&before, *i) {
            Some(id) => engine.delete(&id, None).map(drop),
            None => Ok(()),
        },
        Op::Move(a, b, top) => match (pick(&before, *a), pick(&before, *b)) {
            (Some(id), _) if *top => engine.move_node(&id, None, &Placement::append()),
            (Some(id), Some(target)) => engine.move_node(&id, Some(&target), &Placement::append()),
            _ => Ok(()),
        },
        Op::Connect(a, b) => {
            if let Some(source) = pick(&before, *a) {
                let targets = engine.connect_targets(&source);
                if !targets.is_empty() {
                    let (_, target) = targets.get_index(*b % targets.len()).unwrap();
                    let spec = target.spec.clone();
                    // every advertised target must be accepted
                    engine.apply_move(&source, &spec).unwrap();
                }
            }
            Ok(())
        }
        Op::Resize(i, h) => {
            if let Some(id) = pick(&before, *i) {
                engine.report_size(&id, Size::new(300.0, f64::from(*h)));
            }
            Ok(())
        }
        Op::Undo => {
            engine.undo();
            Ok(())
        }
        Op::Redo => {
            engine.redo();
            Ok(())
        }
    };

    if result.is_err() {
        assert_eq!(engine.current_story(), &before, "failed {op:?} changed the story");
        assert_eq!(engine.history().past_len(), past, "failed {op:?} pushed history");
    }
    engine.on_frame();
}

fn assert_type_rules(story: &Story) {
    for node in story.nodes() {
        let parent = node.parent_id.as_ref().and_then(|p| story.kind_of(p));
        assert!(
            rules::is_allowed(node.kind(), parent),
            "{} under {:?}",
            node.kind(),
            parent
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_invariants_hold_for_every_reachable_state(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut engine = OutlineEngine::default();
        for op in &ops {
            apply(&mut engine, op);
            assert_story_consistent(engine.current_story());
            assert_type_rules(engine.current_story());
        }
    }

    #[test]
    fn prop_undo_all_then_redo_all(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut engine = OutlineEngine::default();
        for op in ops.iter().filter(|op| !matches!(op, Op::Undo | Op::Redo)) {
            apply(&mut engine, op);
        }
        let end = engine.current_story().clone();
        let steps = engine.history().past_len();

        for _ in 0..steps {
            prop_assert!(engine.undo());
        }
        prop_assert!(!engine.can_undo());
        for _ in 0..steps {
            prop_assert!(engine.redo());
        }
        prop_assert_eq!(engine.current_story(), &end);
    }

    #[test]
    fn prop_history_never_exceeds_capacity(n in 0usize..120) {
        let mut engine = OutlineEngine::default();
        for i in 0..n {
            engine.set_title(format!("t{i}"));
        }
        prop_assert_eq!(engine.history().past_len(), n.min(50));
    }
}
