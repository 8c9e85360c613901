//! Per-domain path index.
//!
//! # Responsibilities
//! - Store the endpoints of one domain in a trie keyed by path segment
//! - Answer longest-prefix lookups without scanning every endpoint
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc, no locks)
//! - A lookup walks at most one node per requested segment; candidates on
//!   the walk are confirmed with the exact prefix predicate, so `/a/`
//!   and `/a` keep their distinct literal semantics
//! - Ties resolve to the longest registered path string

use std::collections::HashMap;

use crate::model::Endpoint;
use crate::routing::matcher::{matches_path_prefix, segments};

#[derive(Debug, Default)]
struct Node {
    children: HashMap<String, Node>,
    endpoints: Vec<Endpoint>,
}

/// Segment trie over the registered paths of a single domain.
#[derive(Debug, Default)]
pub struct PathIndex {
    root: Node,
    len: usize,
}

impl PathIndex {
    pub fn build(endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        let mut index = Self::default();
        for endpoint in endpoints {
            index.insert(endpoint);
        }
        index
    }

    fn insert(&mut self, endpoint: Endpoint) {
        let mut node = &mut self.root;
        for segment in segments(&endpoint.path) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.endpoints.push(endpoint);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The endpoint whose registered path is the most specific prefix of
    /// `path`, if any.
    pub fn longest_match(&self, path: &str) -> Option<&Endpoint> {
        let mut node = &self.root;
        let mut best = pick(None, node, path);
        for segment in segments(path) {
            match node.children.get(segment) {
                Some(child) => {
                    node = child;
                    best = pick(best, node, path);
                }
                None => break,
            }
        }
        best
    }
}

fn pick<'a>(best: Option<&'a Endpoint>, node: &'a Node, path: &str) -> Option<&'a Endpoint> {
    node.endpoints
        .iter()
        .filter(|e| matches_path_prefix(&e.path, path))
        .fold(best, |best, candidate| match best {
            Some(current) if current.path.len() >= candidate.path.len() => Some(current),
            _ => Some(candidate),
        })
}
