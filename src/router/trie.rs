//! Segment trie used for route matching.
//!
//! Every registered pattern is split into segments (see [`super::segments`])
//! and inserted one segment per level. A node has:
//!
//! - any number of **literal** children, keyed by their exact segment text;
//! - at most one **wild** child holding either a `:param` or a `*wildcard`
//!   segment. Parameters with different names at the same position share this
//!   slot; the most recently inserted name is the one stored on the node.
//!
//! Searching walks the request segments and backtracks: when a literal branch
//! dead-ends, the wild branch at the same level is tried. A wildcard node
//! matches as soon as it is reached, whatever is left of the path.
//!
//! ## Example
//!
//! ```text
//! /users/:id          root ─ users ─ :id*        (* = terminal)
//! /users/:id/posts                      └ posts*
//! /users/me                     └ me*
//! /files/*path             files ─ *path*
//! ```

use std::sync::Arc;

use super::segments::{is_catch_all, is_wild};

/// Order in which the candidate children of a node are tried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPrecedence {
    /// The literal child is always tried before the wild child.
    #[default]
    LiteralFirst,
    /// Children are tried in the order they were first inserted, so a wild
    /// child registered before a literal sibling shadows it.
    InsertionOrder,
}

impl MatchPrecedence {
    /// Parse from a config string, falling back to [`MatchPrecedence::LiteralFirst`].
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().replace('_', "-").as_str() {
            "insertion-order" | "insertion" => MatchPrecedence::InsertionOrder,
            _ => MatchPrecedence::LiteralFirst,
        }
    }
}

/// What an insert changed besides adding the new pattern.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Insertion {
    /// Pattern that previously terminated at the same node, if it differs.
    pub shadowed: Option<Arc<str>>,
    /// Wild slots that flipped between `:param` and `*wildcard`, as
    /// `(previous, new)` segment text.
    pub retyped: Vec<(String, String)>,
}

/// Node in the segment trie.
#[derive(Debug, Clone, Default)]
pub(crate) struct TrieNode {
    /// Segment this node was created for; empty for the root.
    segment: String,
    /// Pattern terminating at this node, if any.
    pattern: Option<Arc<str>>,
    /// Children in insertion order, literal and wild alike.
    children: Vec<TrieNode>,
    /// Index of the wild child in `children`.
    wild: Option<usize>,
}

impl TrieNode {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            ..Self::default()
        }
    }

    /// `true` if this node is a `*wildcard` node.
    #[inline]
    fn is_catch_all(&self) -> bool {
        is_catch_all(&self.segment)
    }

    fn literal_child(&self, segment: &str) -> Option<&TrieNode> {
        self.children
            .iter()
            .enumerate()
            .find(|(i, c)| Some(*i) != self.wild && c.segment == segment)
            .map(|(_, c)| c)
    }

    fn wild_child(&self) -> Option<&TrieNode> {
        self.wild.and_then(|i| self.children.get(i))
    }

    /// Insert `pattern` whose segments are `segments`, starting at `depth`.
    ///
    /// Reports a terminal pattern it replaced and any wild slot whose kind
    /// changed on the way down.
    pub(crate) fn insert(
        &mut self,
        pattern: &Arc<str>,
        segments: &[&str],
        depth: usize,
    ) -> Insertion {
        let Some(&segment) = segments.get(depth) else {
            let previous = self.pattern.replace(Arc::clone(pattern));
            return Insertion {
                shadowed: previous.filter(|p| p != pattern),
                retyped: Vec::new(),
            };
        };

        let mut retyped = None;
        let index = if is_wild(segment) {
            match self.wild {
                Some(i) => {
                    // One wild slot per position: the latest name wins.
                    let slot = &mut self.children[i];
                    if slot.segment != segment {
                        if is_catch_all(&slot.segment) != is_catch_all(segment) {
                            retyped = Some((slot.segment.clone(), segment.to_string()));
                        }
                        slot.segment = segment.to_string();
                    }
                    i
                }
                None => {
                    self.children.push(TrieNode::new(segment));
                    let i = self.children.len() - 1;
                    self.wild = Some(i);
                    i
                }
            }
        } else {
            let existing = self
                .children
                .iter()
                .enumerate()
                .position(|(i, c)| Some(i) != self.wild && c.segment == segment);
            match existing {
                Some(i) => i,
                None => {
                    self.children.push(TrieNode::new(segment));
                    self.children.len() - 1
                }
            }
        };

        let mut insertion = self.children[index].insert(pattern, segments, depth + 1);
        if let Some(change) = retyped {
            insertion.retyped.insert(0, change);
        }
        insertion
    }

    /// Search for the pattern matching `segments` from `depth` on.
    pub(crate) fn search(
        &self,
        segments: &[&str],
        depth: usize,
        precedence: MatchPrecedence,
    ) -> Option<&Arc<str>> {
        if depth == segments.len() || self.is_catch_all() {
            return self.pattern.as_ref();
        }

        let segment = segments[depth];
        match precedence {
            MatchPrecedence::LiteralFirst => self
                .literal_child(segment)
                .and_then(|child| child.search(segments, depth + 1, precedence))
                .or_else(|| {
                    self.wild_child()
                        .and_then(|child| child.search(segments, depth + 1, precedence))
                }),
            MatchPrecedence::InsertionOrder => self
                .children
                .iter()
                .enumerate()
                .filter(|(i, c)| Some(*i) == self.wild || c.segment == segment)
                .find_map(|(_, child)| child.search(segments, depth + 1, precedence)),
        }
    }

    /// Collect every terminal pattern below (and including) this node.
    pub(crate) fn collect_patterns<'a>(&'a self, out: &mut Vec<&'a Arc<str>>) {
        if let Some(pattern) = &self.pattern {
            out.push(pattern);
        }
        for child in &self.children {
            child.collect_patterns(out);
        }
    }
}
