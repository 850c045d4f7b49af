//! Testing utilities for the plotline workspace
//!
//! Shared outline builders and assertions.

#![allow(missing_docs)]

use plotline_engine::OutlineEngine;
use plotline_model::{Heading, NodeId, Placement, Story, TextBody};

/// Ids of one scene and its texts
#[derive(Debug, Clone)]
pub struct SceneIds {
    pub id: NodeId,
    pub texts: Vec<NodeId>,
}

/// Ids of one chapter and its scenes
#[derive(Debug, Clone)]
pub struct ChapterIds {
    pub id: NodeId,
    pub scenes: Vec<SceneIds>,
}

/// Ids of a built outline, in creation order
#[derive(Debug, Clone, Default)]
pub struct Outline {
    pub chapters: Vec<ChapterIds>,
}

impl Outline {
    pub fn chapter(&self, c: usize) -> &NodeId {
        &self.chapters[c].id
    }

    pub fn scene(&self, c: usize, s: usize) -> &NodeId {
        &self.chapters[c].scenes[s].id
    }

    pub fn text(&self, c: usize, s: usize, t: usize) -> &NodeId {
        &self.chapters[c].scenes[s].texts[t]
    }
}

pub fn heading(title: &str) -> Heading {
    Heading::titled(title)
}

pub fn text_body(text: &str) -> TextBody {
    TextBody::new(text)
}

/// Append chapters, scenes and texts through the engine
///
/// `shape[c][s]` is the number of texts in scene `s` of chapter `c`.
pub fn build_outline(engine: &mut OutlineEngine, shape: &[&[usize]]) -> Outline {
    let mut outline = Outline::default();
    for (c, scenes) in shape.iter().enumerate() {
        let chapter = engine
            .create_chapter(&Placement::append(), heading(&format!("Chapter {c}")))
            .unwrap();
        let mut chapter_ids = ChapterIds {
            id: chapter.clone(),
            scenes: Vec::new(),
        };
        for (s, texts) in scenes.iter().enumerate() {
            let scene = engine
                .create_scene(&chapter, &Placement::append(), heading(&format!("Scene {c}.{s}")))
                .unwrap();
            let texts = (0..*texts)
                .map(|t| {
                    engine
                        .create_text(&scene, &Placement::append(), text_body(&format!("text {c}.{s}.{t}")))
                        .unwrap()
                })
                .collect();
            chapter_ids.scenes.push(SceneIds { id: scene, texts });
        }
        outline.chapters.push(chapter_ids);
    }
    outline
}

/// Two chapters: the first with two single-text scenes, the second with one
pub fn two_chapter_outline() -> (OutlineEngine, Outline) {
    let mut engine = OutlineEngine::default();
    let outline = build_outline(&mut engine, &[&[1, 1], &[1]]);
    (engine, outline)
}

pub fn child_ids(story: &Story, id: &NodeId) -> Vec<NodeId> {
    story.children(id).cloned().collect()
}

pub fn top_level(story: &Story) -> Vec<NodeId> {
    story.order().iter().cloned().collect()
}

pub fn y_of(story: &Story, id: &NodeId) -> f64 {
    story.get_node(id).unwrap().position.y
}

/// Panic with every broken invariant listed
pub fn assert_story_consistent(story: &Story) {
    if let Err(violations) = story.check_invariants() {
        panic!("story invariants violated: {violations:#?}");
    }
}
