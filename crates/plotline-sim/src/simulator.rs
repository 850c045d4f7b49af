//! Plotline Simulator - seeded random edits against the outline engine
//!
//! Drives an [`OutlineEngine`] with random creates, edits, deletes, moves,
//! connects, reorders, resizes, drags and undo/redo, and checks after every
//! step:
//! - tree, type-rule and acyclicity invariants hold
//! - the engine accepts exactly what the parent/child rules allow
//! - rejected operations leave the story and the history untouched
//! - accepted edits record exactly one undo step; remeasure shifts record none
//!
//! A final phase undoes every recorded step and redoes them all, expecting
//! to land on the exact end state.

use plotline_engine::{EngineConfig, EngineError, OutlineEngine};
use plotline_model::{
    rules, AnnotationBody, EventBody, Heading, HeadingPatch, NodeBody, NodeId, NodeKind,
    PictureBody, Placement, Position, Size, Story, TextBody,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

/// Simulator configuration
#[derive(Debug, Clone, Serialize)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Total random operations to run
    pub total_operations: u64,
    /// Stop conditions
    pub stop_on_first_violation: bool,
    /// Engine under test
    pub engine: EngineConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            total_operations: 1000,
            stop_on_first_violation: true,
            engine: EngineConfig::default(),
        }
    }
}

/// Test operation types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SimulatedOperation {
    /// Create a node of `kind` under `parent` (`None` = top level)
    Create { kind: NodeKind, parent: Option<NodeId> },
    /// Retitle a chapter or scene
    Rename { node: NodeId },
    /// Delete a subtree
    Delete { node: NodeId },
    /// Reparent to an arbitrary (possibly invalid) destination
    Move { node: NodeId, new_parent: Option<NodeId> },
    /// Reparent through one of the advertised connect targets
    Connect { source: NodeId, pick: usize },
    /// Shuffle top-level chapters
    ReorderChapters { order: Vec<NodeId> },
    /// Report a rendered height
    Resize { node: NodeId, height: f64 },
    /// Drag a node through a few positions
    Drag { node: NodeId, steps: u8 },
    Undo,
    Redo,
}

/// Result classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedResult {
    ShouldSucceed,
    ShouldFail,
}

/// A violation detected during simulation
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum Violation {
    /// Engine accepted an operation the rules forbid
    UnexpectedAcceptance { step: u64, operation: SimulatedOperation },
    /// Engine rejected an operation the rules allow
    UnexpectedRejection {
        step: u64,
        operation: SimulatedOperation,
        error: String,
    },
    /// Story invariants broken after an operation
    InvariantBroken {
        step: u64,
        operation: SimulatedOperation,
        violations: Vec<String>,
    },
    /// Rejected operation still changed the story or history
    FailureChangedState { step: u64, operation: SimulatedOperation },
    /// Undo depth moved by the wrong amount
    HistoryMismatch {
        step: u64,
        operation: SimulatedOperation,
        expected: usize,
        actual: usize,
    },
    /// Undo-all then redo-all did not return to the end state
    RoundTripMismatch { undone: usize },
}

/// Statistics for simulation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulatorStats {
    pub operations_attempted: u64,
    pub operations_succeeded: u64,
    pub operations_rejected: u64,
    pub undos: u64,
    pub redos: u64,
    pub remeasure_shifts: u64,
    pub max_nodes: usize,
    pub final_nodes: usize,
}

/// Final report from simulator
#[derive(Debug, Clone, Serialize)]
pub struct SimulatorReport {
    pub config: SimulatorConfig,
    pub stats: SimulatorStats,
    pub violations: Vec<Violation>,
}

impl SimulatorReport {
    /// Check if simulation passed all criteria
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Generate text report
    #[must_use]
    pub fn generate_text(&self) -> String {
        use std::fmt::Write;

        let mut report = String::new();
        let _ = writeln!(report, "=== Plotline Simulator Report ===\n");
        let _ = writeln!(report, "Seed: {}", self.config.seed);
        let _ = writeln!(report, "Operations Attempted: {}", self.stats.operations_attempted);
        let _ = writeln!(report, "Operations Succeeded: {}", self.stats.operations_succeeded);
        let _ = writeln!(report, "Operations Rejected: {}", self.stats.operations_rejected);
        let _ = writeln!(report, "Undos / Redos: {} / {}", self.stats.undos, self.stats.redos);
        let _ = writeln!(report, "Remeasure Shifts: {}", self.stats.remeasure_shifts);
        let _ = writeln!(report, "Peak Nodes: {}", self.stats.max_nodes);
        let _ = writeln!(report, "Final Nodes: {}", self.stats.final_nodes);
        let _ = writeln!(report, "Violations: {}", self.violations.len());

        if !self.violations.is_empty() {
            report.push_str("\n=== Violations ===\n");
            for (i, v) in self.violations.iter().enumerate() {
                let _ = writeln!(report, "{}. {:?}", i + 1, v);
            }
        }

        let _ = writeln!(
            report,
            "\n=== Result: {} ===",
            if self.passed() { "PASS" } else { "FAIL" }
        );
        report
    }
}

/// Run the simulator
#[must_use]
pub fn run_simulator(config: SimulatorConfig) -> SimulatorReport {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut engine = OutlineEngine::new(config.engine.clone());
    let capacity = engine.history().capacity();

    let mut stats = SimulatorStats::default();
    let mut violations = Vec::new();

    for step in 0..config.total_operations {
        let operation = generate_operation(&mut rng, engine.current_story());
        let expected = classify_expected_result(engine.current_story(), &operation);

        let before = engine.current_story().clone();
        let past = engine.history().past_len();
        stats.operations_attempted += 1;

        let result = execute_operation(&mut engine, &operation, &mut stats);
        let found_before = violations.len();

        match (&result, expected) {
            (Ok(recorded), ExpectedResult::ShouldSucceed) => {
                stats.operations_succeeded += 1;
                if *recorded {
                    let expected_past = (past + 1).min(capacity);
                    let actual = engine.history().past_len();
                    if actual != expected_past {
                        violations.push(Violation::HistoryMismatch {
                            step,
                            operation: operation.clone(),
                            expected: expected_past,
                            actual,
                        });
                    }
                }
            }
            (Ok(_), ExpectedResult::ShouldFail) => {
                stats.operations_succeeded += 1;
                violations.push(Violation::UnexpectedAcceptance {
                    step,
                    operation: operation.clone(),
                });
            }
            (Err(err), expected) => {
                stats.operations_rejected += 1;
                if expected == ExpectedResult::ShouldSucceed {
                    violations.push(Violation::UnexpectedRejection {
                        step,
                        operation: operation.clone(),
                        error: err.to_string(),
                    });
                }
                if engine.current_story() != &before || engine.history().past_len() != past {
                    violations.push(Violation::FailureChangedState {
                        step,
                        operation: operation.clone(),
                    });
                }
            }
        }

        if let Err(broken) = engine.current_story().check_invariants() {
            violations.push(Violation::InvariantBroken {
                step,
                operation: operation.clone(),
                violations: broken.iter().map(ToString::to_string).collect(),
            });
        }

        stats.max_nodes = stats.max_nodes.max(engine.current_story().len());
        engine.on_frame();

        if violations.len() > found_before {
            tracing::warn!(step, ?operation, "simulation violation");
            if config.stop_on_first_violation {
                break;
            }
        }
    }

    if violations.is_empty() || !config.stop_on_first_violation {
        if let Some(violation) = check_round_trip(&mut engine) {
            violations.push(violation);
        }
    }

    stats.final_nodes = engine.current_story().len();
    SimulatorReport {
        config,
        stats,
        violations,
    }
}

/// Undo every recorded step, redo them all, compare with the end state
fn check_round_trip(engine: &mut OutlineEngine) -> Option<Violation> {
    let end = engine.current_story().clone();
    let mut undone = 0;
    while engine.undo() {
        undone += 1;
    }
    for _ in 0..undone {
        if !engine.redo() {
            break;
        }
    }
    engine.on_frame();
    (engine.current_story() != &end).then_some(Violation::RoundTripMismatch { undone })
}

fn pick_node(rng: &mut StdRng, story: &Story) -> Option<NodeId> {
    let ids = story.document_order();
    if ids.is_empty() {
        None
    } else {
        Some(ids[rng.gen_range(0..ids.len())].clone())
    }
}

fn pick_kind(rng: &mut StdRng) -> NodeKind {
    NodeKind::ALL[rng.gen_range(0..NodeKind::ALL.len())]
}

/// Generate a random operation
fn generate_operation(rng: &mut StdRng, story: &Story) -> SimulatedOperation {
    let Some(node) = pick_node(rng, story) else {
        return SimulatedOperation::Create {
            kind: NodeKind::Chapter,
            parent: None,
        };
    };

    match rng.gen_range(0..100) {
        0..=39 => {
            let kind = pick_kind(rng);
            // mostly aim at plausible parents so the tree actually grows
            let parent = match kind {
                NodeKind::Chapter if rng.gen_bool(0.9) => None,
                _ if rng.gen_bool(0.05) => None,
                _ => Some(node),
            };
            SimulatedOperation::Create { kind, parent }
        }
        40..=44 => SimulatedOperation::Rename { node },
        45..=51 => SimulatedOperation::Delete { node },
        52..=61 => {
            let new_parent = if rng.gen_bool(0.1) { None } else { pick_node(rng, story) };
            SimulatedOperation::Move { node, new_parent }
        }
        62..=69 => SimulatedOperation::Connect {
            source: node,
            pick: rng.gen_range(0..64),
        },
        70..=72 => {
            let mut order: Vec<NodeId> = story.order().iter().cloned().collect();
            for i in (1..order.len()).rev() {
                order.swap(i, rng.gen_range(0..=i));
            }
            if rng.gen_bool(0.1) {
                order.pop();
            }
            SimulatedOperation::ReorderChapters { order }
        }
        73..=84 => SimulatedOperation::Resize {
            node,
            height: f64::from(rng.gen_range(40u16..600)),
        },
        85..=88 => SimulatedOperation::Drag {
            node,
            steps: rng.gen_range(1..6),
        },
        89..=94 => SimulatedOperation::Undo,
        _ => SimulatedOperation::Redo,
    }
}

/// Classify expected result for an operation from the rules alone
fn classify_expected_result(story: &Story, operation: &SimulatedOperation) -> ExpectedResult {
    let ok = match operation {
        SimulatedOperation::Create { kind, parent } => match parent {
            Some(parent) => story
                .kind_of(parent)
                .is_some_and(|p| rules::is_allowed(*kind, Some(p))),
            None => rules::is_allowed(*kind, None),
        },
        SimulatedOperation::Rename { node } => story
            .kind_of(node)
            .is_some_and(|k| matches!(k, NodeKind::Chapter | NodeKind::Scene)),
        SimulatedOperation::Delete { node }
        | SimulatedOperation::Resize { node, .. }
        | SimulatedOperation::Drag { node, .. } => story.contains(node),
        SimulatedOperation::Move { node, new_parent } => {
            let cycle = new_parent
                .as_ref()
                .is_some_and(|target| story.is_in_subtree(node, target));
            let parent_kind = new_parent.as_ref().and_then(|p| story.kind_of(p));
            let parent_known = new_parent.is_none() || parent_kind.is_some();
            story.kind_of(node).is_some_and(|kind| {
                parent_known && !cycle && rules::is_allowed(kind, parent_kind)
            })
        }
        SimulatedOperation::Connect { .. }
        | SimulatedOperation::Undo
        | SimulatedOperation::Redo => true,
        SimulatedOperation::ReorderChapters { order } => {
            let mut sorted = order.clone();
            sorted.sort();
            let mut current: Vec<NodeId> = story.order().iter().cloned().collect();
            current.sort();
            sorted == current
        }
    };
    if ok {
        ExpectedResult::ShouldSucceed
    } else {
        ExpectedResult::ShouldFail
    }
}

fn body_for(kind: NodeKind) -> NodeBody {
    match kind {
        NodeKind::Chapter => NodeBody::Chapter(Heading::titled("Chapter")),
        NodeKind::Scene => NodeBody::Scene(Heading::titled("Scene")),
        NodeKind::Text => NodeBody::Text(TextBody::new("Lorem ipsum")),
        NodeKind::Picture => NodeBody::Picture(PictureBody::default()),
        NodeKind::Annotation => NodeBody::Annotation(AnnotationBody::default()),
        NodeKind::Event => NodeBody::Event(EventBody::in_year(1900, "Event")),
    }
}

/// Execute an operation against the engine
///
/// `Ok(true)` when the operation should have recorded one undo step.
fn execute_operation(
    engine: &mut OutlineEngine,
    operation: &SimulatedOperation,
    stats: &mut SimulatorStats,
) -> Result<bool, EngineError> {
    match operation {
        SimulatedOperation::Create { kind, parent } => engine
            .create(parent.as_ref(), &Placement::append(), body_for(*kind))
            .map(|_| true),
        SimulatedOperation::Rename { node } => {
            let patch = HeadingPatch::default().title("Renamed");
            let result = match engine.current_story().kind_of(node) {
                Some(NodeKind::Scene) => engine.update_scene(node, patch),
                _ => engine.update_chapter(node, patch),
            };
            result.map(|()| true)
        }
        SimulatedOperation::Delete { node } => engine.delete(node, None).map(|_| true),
        SimulatedOperation::Move { node, new_parent } => engine
            .move_node(node, new_parent.as_ref(), &Placement::append())
            .map(|()| true),
        SimulatedOperation::Connect { source, pick } => {
            let targets = engine.connect_targets(source);
            match targets.get_index(pick % targets.len().max(1)) {
                Some((_, target)) => {
                    let spec = target.spec.clone();
                    engine.apply_move(source, &spec).map(|()| true)
                }
                None => Ok(false),
            }
        }
        SimulatedOperation::ReorderChapters { order } => {
            engine.reorder_chapters(order).map(|()| true)
        }
        SimulatedOperation::Resize { node, height } => {
            let outcome = engine.report_size(node, Size::new(320.0, *height));
            if outcome.is_shift() {
                stats.remeasure_shifts += 1;
            }
            Ok(false)
        }
        SimulatedOperation::Drag { node, steps } => {
            engine.begin_drag(node)?;
            for i in 1..=*steps {
                let offset = f64::from(i) * 25.0;
                engine.drag_to(Position::new(offset, offset))?;
            }
            engine.end_drag().map(|_| true)
        }
        SimulatedOperation::Undo => {
            if engine.undo() {
                stats.undos += 1;
            }
            Ok(false)
        }
        SimulatedOperation::Redo => {
            if engine.redo() {
                stats.redos += 1;
            }
            Ok(false)
        }
    }
}
