//! Matcher arena and reference resolution.
//!
//! Every matcher node from every merged configuration source lives in one
//! arena, addressed by [`NodeId`]. Definitions may reference each other by
//! string id in any order; parsing inserts an explicit `Reference` node and
//! looks nothing up. [`ArenaBuilder::resolve`] then runs exactly once:
//! every reference edge is rewritten to its target, unknown ids and
//! duplicate ids are rejected, and the whole graph is cycle-checked, so a
//! bad catalog fails before the first document is scanned and lookups during
//! scanning cannot fail.

use std::collections::HashMap;

use crate::copyright::CopyrightPattern;
use crate::error::ConfigError;
use crate::family::LicenseFamily;
use crate::spdx::SpdxTag;
use crate::spec::MatcherSpec;
use crate::text::{FullText, PhraseSet};

/// Handle to one node in an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) id: Option<String>,
    pub(crate) kind: NodeKind,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Text(FullText),
    Phrases(PhraseSet),
    Copyright(CopyrightPattern),
    Spdx(SpdxTag),
    And(Vec<NodeId>),
    Or(Vec<NodeId>),
    Not(NodeId),
    /// The family-bearing node a license contributes to the tree.
    Licensed {
        family: LicenseFamily,
        operand: NodeId,
    },
    /// Unresolved by-id reference; no edge points at one after resolution.
    Reference(String),
}

/// Collects definitions from all sources before the single resolve pass.
#[derive(Debug, Default)]
pub struct ArenaBuilder {
    nodes: Vec<Node>,
    by_id: HashMap<String, NodeId>,
}

impl ArenaBuilder {
    pub fn new() -> Self {
        ArenaBuilder::default()
    }

    /// Insert one definition tree, validating and compiling its leaves.
    /// Children are inserted before their parent.
    pub fn insert(&mut self, spec: &MatcherSpec) -> Result<NodeId, ConfigError> {
        let kind = match spec {
            MatcherSpec::Text { text, .. } => NodeKind::Text(FullText::new(text)?),
            MatcherSpec::Phrases { phrases, .. } => {
                NodeKind::Phrases(PhraseSet::new(phrases.clone())?)
            }
            MatcherSpec::Copyright {
                start, end, owner, ..
            } => NodeKind::Copyright(CopyrightPattern::new(
                start.as_deref(),
                end.as_deref(),
                owner.as_deref(),
            )?),
            MatcherSpec::Spdx { name, .. } => NodeKind::Spdx(SpdxTag::new(name)?),
            MatcherSpec::And { children, .. } => NodeKind::And(self.insert_children(children)?),
            MatcherSpec::Or { children, .. } => NodeKind::Or(self.insert_children(children)?),
            MatcherSpec::Not { child, .. } => NodeKind::Not(self.insert(child)?),
            MatcherSpec::Ref { target } => NodeKind::Reference(target.clone()),
        };
        self.push(spec.id(), kind)
    }

    /// Wrap an already-inserted node with a family for reporting.
    ///
    /// Registering the wrapper under the license id puts licenses in the
    /// same reference namespace as matchers, which is what lets one
    /// license's definition reuse another's matcher by id.
    pub fn insert_licensed(
        &mut self,
        id: Option<&str>,
        family: LicenseFamily,
        operand: NodeId,
    ) -> Result<NodeId, ConfigError> {
        self.push(id, NodeKind::Licensed { family, operand })
    }

    /// The node registered under `id`, if defined so far.
    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    fn insert_children(&mut self, children: &[MatcherSpec]) -> Result<Vec<NodeId>, ConfigError> {
        if children.is_empty() {
            return Err(ConfigError::InvalidMatcher(
                "combinator requires at least one child".into(),
            ));
        }
        children.iter().map(|child| self.insert(child)).collect()
    }

    fn push(&mut self, id: Option<&str>, kind: NodeKind) -> Result<NodeId, ConfigError> {
        let node_id = NodeId(self.nodes.len() as u32);
        if let Some(name) = id {
            if self.by_id.contains_key(name) {
                return Err(ConfigError::DuplicateId(name.to_string()));
            }
            self.by_id.insert(name.to_string(), node_id);
        }
        self.nodes.push(Node {
            id: id.map(str::to_string),
            kind,
        });
        Ok(node_id)
    }

    /// Resolve all references and freeze the arena.
    ///
    /// References are anonymous, so a reference can never point at another
    /// reference and one rewrite hop per edge suffices. Structural edges go
    /// parent-to-new-child and cannot close a cycle on their own; any cycle
    /// therefore closes over a rewritten reference edge and is reported
    /// against the named node it re-enters.
    pub fn resolve(self) -> Result<MatcherArena, ConfigError> {
        let ArenaBuilder { mut nodes, by_id } = self;

        let mut redirect: Vec<Option<NodeId>> = vec![None; nodes.len()];
        for (index, node) in nodes.iter().enumerate() {
            if let NodeKind::Reference(name) = &node.kind {
                let target = by_id
                    .get(name)
                    .copied()
                    .ok_or_else(|| ConfigError::UnknownReference(name.clone()))?;
                redirect[index] = Some(target);
            }
        }
        for node in &mut nodes {
            match &mut node.kind {
                NodeKind::And(children) | NodeKind::Or(children) => {
                    for child in children {
                        *child = redirect[child.index()].unwrap_or(*child);
                    }
                }
                NodeKind::Not(child) => *child = redirect[child.index()].unwrap_or(*child),
                NodeKind::Licensed { operand, .. } => {
                    *operand = redirect[operand.index()].unwrap_or(*operand)
                }
                _ => {}
            }
        }

        let mut color = vec![Color::White; nodes.len()];
        for index in 0..nodes.len() {
            check_cycles(&nodes, &mut color, NodeId(index as u32))?;
        }
        Ok(MatcherArena { nodes, by_id })
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

fn check_cycles(nodes: &[Node], color: &mut [Color], id: NodeId) -> Result<(), ConfigError> {
    match color[id.index()] {
        Color::Black => return Ok(()),
        Color::Gray => {
            let name = nodes[id.index()]
                .id
                .clone()
                .unwrap_or_else(|| format!("#{}", id.index()));
            return Err(ConfigError::CyclicReference(name));
        }
        Color::White => {}
    }
    color[id.index()] = Color::Gray;
    match &nodes[id.index()].kind {
        NodeKind::And(children) | NodeKind::Or(children) => {
            for child in children {
                check_cycles(nodes, color, *child)?;
            }
        }
        NodeKind::Not(child) => check_cycles(nodes, color, *child)?,
        NodeKind::Licensed { operand, .. } => check_cycles(nodes, color, *operand)?,
        _ => {}
    }
    color[id.index()] = Color::Black;
    Ok(())
}

/// A resolved, immutable matcher arena.
///
/// All match-time state lives in a separate [`crate::ScanState`]; the arena
/// itself is freely shared for the lifetime of a run.
#[derive(Debug)]
pub struct MatcherArena {
    pub(crate) nodes: Vec<Node>,
    by_id: HashMap<String, NodeId>,
}

impl MatcherArena {
    /// The node registered under `id`.
    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    /// The declared id of a node, if it has one.
    pub fn id_of(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.index()].id.as_deref()
    }

    /// The family of a family-bearing node.
    pub fn family_of(&self, node: NodeId) -> Option<&LicenseFamily> {
        match &self.nodes[node.index()].kind {
            NodeKind::Licensed { family, .. } => Some(family),
            _ => None,
        }
    }

    /// The operand of a family-bearing node.
    pub fn operand_of(&self, node: NodeId) -> Option<NodeId> {
        match &self.nodes[node.index()].kind {
            NodeKind::Licensed { operand, .. } => Some(*operand),
            _ => None,
        }
    }

    /// Push the family of every family-bearing descendant exactly once,
    /// regardless of match state. Combinators forward to every child.
    pub fn report_families(&self, root: NodeId, sink: &mut dyn FnMut(&LicenseFamily)) {
        let mut visited = vec![false; self.nodes.len()];
        self.walk_families(root, &mut visited, sink);
    }

    fn walk_families(
        &self,
        id: NodeId,
        visited: &mut [bool],
        sink: &mut dyn FnMut(&LicenseFamily),
    ) {
        if visited[id.index()] {
            return;
        }
        visited[id.index()] = true;
        match &self.nodes[id.index()].kind {
            NodeKind::Licensed { family, operand } => {
                sink(family);
                self.walk_families(*operand, visited, sink);
            }
            NodeKind::And(children) | NodeKind::Or(children) => {
                for child in children {
                    self.walk_families(*child, visited, sink);
                }
            }
            NodeKind::Not(child) => self.walk_families(*child, visited, sink),
            _ => {}
        }
    }

    /// Every family-bearing descendant whose family satisfies the predicate.
    /// All branches are visited, not only matching ones.
    pub fn extract<P>(&self, root: NodeId, mut predicate: P) -> Vec<NodeId>
    where
        P: FnMut(&LicenseFamily) -> bool,
    {
        let mut visited = vec![false; self.nodes.len()];
        let mut found = Vec::new();
        self.walk_extract(root, &mut visited, &mut predicate, &mut found);
        found
    }

    fn walk_extract<P>(
        &self,
        id: NodeId,
        visited: &mut [bool],
        predicate: &mut P,
        found: &mut Vec<NodeId>,
    ) where
        P: FnMut(&LicenseFamily) -> bool,
    {
        if visited[id.index()] {
            return;
        }
        visited[id.index()] = true;
        match &self.nodes[id.index()].kind {
            NodeKind::Licensed { family, operand } => {
                if predicate(family) {
                    found.push(id);
                }
                self.walk_extract(*operand, visited, predicate, found);
            }
            NodeKind::And(children) | NodeKind::Or(children) => {
                for child in children {
                    self.walk_extract(*child, visited, predicate, found);
                }
            }
            NodeKind::Not(child) => self.walk_extract(*child, visited, predicate, found),
            _ => {}
        }
    }

    /// Serialize a subtree back into its declarative form.
    ///
    /// Named descendants are emitted as `ref` so the output mirrors the
    /// source layout; only the requested root is expanded in place.
    pub fn to_spec(&self, root: NodeId) -> MatcherSpec {
        self.spec_of(root, true)
    }

    fn spec_of(&self, id: NodeId, is_root: bool) -> MatcherSpec {
        let node = &self.nodes[id.index()];
        if !is_root {
            if let Some(name) = &node.id {
                return MatcherSpec::reference(name);
            }
        }
        let spec = match &node.kind {
            NodeKind::Text(text) => MatcherSpec::text(text.raw()),
            NodeKind::Phrases(set) => MatcherSpec::phrases(set.phrases().iter().cloned()),
            NodeKind::Copyright(pattern) => {
                MatcherSpec::copyright(pattern.start(), pattern.end(), pattern.owner())
            }
            NodeKind::Spdx(tag) => MatcherSpec::spdx(tag.name()),
            NodeKind::And(children) => MatcherSpec::and(
                children
                    .iter()
                    .map(|child| self.spec_of(*child, false))
                    .collect(),
            ),
            NodeKind::Or(children) => MatcherSpec::or(
                children
                    .iter()
                    .map(|child| self.spec_of(*child, false))
                    .collect(),
            ),
            NodeKind::Not(child) => MatcherSpec::not(self.spec_of(*child, false)),
            NodeKind::Licensed { operand, .. } => return self.spec_of(*operand, is_root),
            // Unreachable from any root once resolved.
            NodeKind::Reference(name) => return MatcherSpec::reference(name),
        };
        match &node.id {
            Some(name) => spec.with_id(name),
            None => spec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(category: &str, name: &str) -> LicenseFamily {
        LicenseFamily::new(category, name)
    }

    #[test]
    fn forward_reference_resolves_after_all_sources_load() {
        let mut builder = ArenaBuilder::new();
        // The referencing definition arrives before its target.
        let outer = builder
            .insert(&MatcherSpec::not(MatcherSpec::reference("later")))
            .unwrap();
        builder
            .insert(&MatcherSpec::spdx("MIT").with_id("later"))
            .unwrap();
        let arena = builder.resolve().unwrap();
        // The edge now lands on the target node directly.
        let spec = arena.to_spec(outer);
        assert_eq!(spec, MatcherSpec::not(MatcherSpec::reference("later")));
        assert!(arena.lookup("later").is_some());
    }

    #[test]
    fn unknown_reference_fails_at_resolve() {
        let mut builder = ArenaBuilder::new();
        builder
            .insert(&MatcherSpec::not(MatcherSpec::reference("nowhere")))
            .unwrap();
        let err = builder.resolve().unwrap_err();
        match err {
            ConfigError::UnknownReference(name) => assert_eq!(name, "nowhere"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_id_rejected_at_insert() {
        let mut builder = ArenaBuilder::new();
        builder.insert(&MatcherSpec::spdx("MIT").with_id("twice")).unwrap();
        let err = builder
            .insert(&MatcherSpec::spdx("GPL-3.0").with_id("twice"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateId(name) if name == "twice"));
    }

    #[test]
    fn self_cycle_detected() {
        let mut builder = ArenaBuilder::new();
        builder
            .insert(
                &MatcherSpec::or(vec![
                    MatcherSpec::spdx("MIT"),
                    MatcherSpec::reference("loop"),
                ])
                .with_id("loop"),
            )
            .unwrap();
        let err = builder.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::CyclicReference(name) if name == "loop"));
    }

    #[test]
    fn mutual_cycle_detected() {
        let mut builder = ArenaBuilder::new();
        builder
            .insert(&MatcherSpec::not(MatcherSpec::reference("b")).with_id("a"))
            .unwrap();
        builder
            .insert(&MatcherSpec::not(MatcherSpec::reference("a")).with_id("b"))
            .unwrap();
        assert!(matches!(
            builder.resolve(),
            Err(ConfigError::CyclicReference(_))
        ));
    }

    /// An `or` over two licensed subtrees, built through the public API the
    /// way the catalog layer does it.
    fn two_license_or(builder: &mut ArenaBuilder) -> NodeId {
        let mit = builder.insert(&MatcherSpec::spdx("MIT")).unwrap();
        builder
            .insert_licensed(Some("mit"), family("MIT", "The MIT License"), mit)
            .unwrap();
        let apache = builder.insert(&MatcherSpec::spdx("Apache-2.0")).unwrap();
        builder
            .insert_licensed(
                Some("apache"),
                family("AL", "Apache License Version 2.0"),
                apache,
            )
            .unwrap();
        builder
            .insert(&MatcherSpec::or(vec![
                MatcherSpec::reference("mit"),
                MatcherSpec::reference("apache"),
            ]))
            .unwrap()
    }

    #[test]
    fn report_families_delivers_every_branch_exactly_once() {
        let mut builder = ArenaBuilder::new();
        let root = two_license_or(&mut builder);
        let arena = builder.resolve().unwrap();
        let mut seen = Vec::new();
        arena.report_families(root, &mut |fam| seen.push(fam.name().to_string()));
        assert_eq!(seen, ["The MIT License", "Apache License Version 2.0"]);
    }

    #[test]
    fn extract_visits_all_branches() {
        let mut builder = ArenaBuilder::new();
        let root = two_license_or(&mut builder);
        let arena = builder.resolve().unwrap();
        let mit_only = arena.extract(root, |fam| fam.category().trimmed() == "MIT");
        assert_eq!(mit_only.len(), 1);
        assert_eq!(arena.id_of(mit_only[0]), Some("mit"));
        let both = arena.extract(root, |_| true);
        assert_eq!(both.len(), 2);
        // Also reachable through negation.
        let mut negated = ArenaBuilder::new();
        let inner = negated.insert(&MatcherSpec::spdx("MIT")).unwrap();
        negated
            .insert_licensed(Some("mit"), family("MIT", "The MIT License"), inner)
            .unwrap();
        let not_root = negated
            .insert(&MatcherSpec::not(MatcherSpec::reference("mit")))
            .unwrap();
        let negated = negated.resolve().unwrap();
        assert_eq!(negated.extract(not_root, |_| true).len(), 1);
    }

    #[test]
    fn to_spec_round_trips_shape() {
        let source = MatcherSpec::or(vec![
            MatcherSpec::spdx("Apache-2.0"),
            MatcherSpec::and(vec![
                MatcherSpec::copyright(Some("2024"), None, Some("FooBar")),
                MatcherSpec::text("Licensed under the\nApache License Version 2.0"),
            ]),
        ])
        .with_id("apache-any");
        let mut builder = ArenaBuilder::new();
        let root = builder.insert(&source).unwrap();
        let arena = builder.resolve().unwrap();
        assert_eq!(arena.to_spec(root), source);
    }
}
