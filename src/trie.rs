//! Segment trie.
//!
//! Every node holds one `/`-delimited segment of a registered pattern.
//! Literal children live in a map keyed by their text; the single `:name`
//! child and the single `*name` child are kept in their own slots, so a
//! lookup never has to inspect a child to learn what kind it is.
//!
//! ```text
//! /                       (root, pattern "/")
//! ├── users
//! │   └── :id             (pattern "/users/:id")
//! │       └── posts       (pattern "/users/:id/posts")
//! └── assets
//!     └── *filepath       (pattern "/assets/*filepath")
//! ```

use std::collections::HashMap;

use crate::error::RouteError;

/// Splits a path or pattern into its non-empty segments.
///
/// Empty segments are dropped, so `//a///b/` and `/a/b` are the same path.
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

enum Segment<'a> {
    Literal(&'a str),
    Param,
    CatchAll,
}

impl<'a> Segment<'a> {
    fn parse(part: &'a str) -> Result<Self, RouteError> {
        match part.as_bytes()[0] {
            b':' | b'*' if part.len() == 1 => Err(RouteError::UnnamedParam),
            b':' => Ok(Self::Param),
            b'*' => Ok(Self::CatchAll),
            _ => Ok(Self::Literal(part)),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Node {
    /// The segment as written in the pattern: `users`, `:id` or `*filepath`.
    part: String,
    /// The full registered pattern, present only on nodes that end one.
    pattern: Option<String>,
    children: HashMap<String, Node>,
    param: Option<Box<Node>>,
    catch_all: Option<Box<Node>>,
}

impl Node {
    fn new(part: &str) -> Self {
        Self { part: part.to_owned(), ..Self::default() }
    }

    /// The registered pattern ending at this node, if any.
    pub(crate) fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Parameter name of a wildcard node (`id` for `:id`).
    fn name(&self) -> &str {
        &self.part[1..]
    }

    /// Inserts `pattern`, already split into `parts`, below this node.
    ///
    /// Re-inserting an existing pattern creates no new nodes.
    pub(crate) fn insert(&mut self, pattern: &str, parts: &[&str]) -> Result<(), RouteError> {
        let segments = parts
            .iter()
            .map(|part| Segment::parse(part))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(pos) = segments.iter().position(|s| matches!(s, Segment::CatchAll)) {
            if pos + 1 != segments.len() {
                return Err(RouteError::CatchAllNotLast);
            }
        }

        let mut node = self;
        for (part, segment) in parts.iter().zip(segments) {
            node = match segment {
                Segment::Literal(lit) => node
                    .children
                    .entry(lit.to_owned())
                    .or_insert_with(|| Node::new(lit)),
                Segment::Param => {
                    check_conflict(node.param.as_deref(), part)?;
                    &mut **node.param.get_or_insert_with(|| Box::new(Node::new(part)))
                }
                Segment::CatchAll => {
                    check_conflict(node.catch_all.as_deref(), part)?;
                    &mut **node.catch_all.get_or_insert_with(|| Box::new(Node::new(part)))
                }
            };
        }
        node.pattern = Some(pattern.to_owned());
        Ok(())
    }

    /// Finds the node whose pattern matches `parts`, pushing wildcard
    /// bindings onto `params`.
    ///
    /// Each level tries the literal child, then the `:name` child, then the
    /// `*name` child, backtracking when a branch dead-ends. On failure
    /// `params` is left as it was found.
    pub(crate) fn search<'n>(
        &'n self,
        parts: &[&str],
        params: &mut Vec<(String, String)>,
    ) -> Option<&'n Node> {
        let Some((head, rest)) = parts.split_first() else {
            return self.pattern.is_some().then_some(self);
        };

        if let Some(found) = self.children.get(*head).and_then(|c| c.search(rest, params)) {
            return Some(found);
        }

        if let Some(child) = &self.param {
            params.push((child.name().to_owned(), (*head).to_owned()));
            if let Some(found) = child.search(rest, params) {
                return Some(found);
            }
            params.pop();
        }

        match &self.catch_all {
            Some(child) if child.pattern.is_some() => {
                params.push((child.name().to_owned(), parts.join("/")));
                Some(child)
            }
            _ => None,
        }
    }
}

fn check_conflict(existing: Option<&Node>, part: &str) -> Result<(), RouteError> {
    match existing {
        Some(node) if node.part != part => Err(RouteError::ParamConflict {
            existing: node.part.clone(),
            new: part.to_owned(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(patterns: &[&str]) -> Node {
        let mut root = Node::default();
        for pattern in patterns {
            root.insert(pattern, &split_path(pattern)).unwrap();
        }
        root
    }

    fn lookup<'n>(root: &'n Node, path: &str) -> Option<(&'n str, Vec<(String, String)>)> {
        let mut params = Vec::new();
        let node = root.search(&split_path(path), &mut params)?;
        Some((node.pattern().unwrap(), params))
    }

    #[test]
    fn split_drops_empty_segments() {
        assert_eq!(split_path("//a///b/"), vec!["a", "b"]);
        assert!(split_path("/").is_empty());
        assert!(split_path("").is_empty());
    }

    #[test]
    fn root_pattern_matches_slash() {
        let root = tree(&["/"]);
        assert_eq!(lookup(&root, "/").unwrap().0, "/");
        assert!(lookup(&root, "/a").is_none());
    }

    #[test]
    fn literal_beats_param_beats_catch_all() {
        let root = tree(&["/a/new", "/a/:id", "/a/*rest"]);
        assert_eq!(lookup(&root, "/a/new").unwrap().0, "/a/new");
        assert_eq!(lookup(&root, "/a/7").unwrap().0, "/a/:id");
        assert_eq!(lookup(&root, "/a/7/8").unwrap().0, "/a/*rest");
    }

    #[test]
    fn backtracks_out_of_literal_dead_end() {
        let root = tree(&["/a/b", "/a/:x/c"]);
        let (pattern, params) = lookup(&root, "/a/b/c").unwrap();
        assert_eq!(pattern, "/a/:x/c");
        assert_eq!(params, vec![("x".to_owned(), "b".to_owned())]);
    }

    #[test]
    fn failed_branch_leaves_no_bindings() {
        let root = tree(&["/a/:x/c", "/a/*rest"]);
        let (pattern, params) = lookup(&root, "/a/b/d").unwrap();
        assert_eq!(pattern, "/a/*rest");
        assert_eq!(params, vec![("rest".to_owned(), "b/d".to_owned())]);
    }

    #[test]
    fn intermediate_nodes_do_not_match() {
        let root = tree(&["/a/b/c"]);
        assert!(lookup(&root, "/a/b").is_none());
        assert!(lookup(&root, "/a").is_none());
    }

    #[test]
    fn catch_all_needs_a_segment() {
        let root = tree(&["/static/*filepath"]);
        assert!(lookup(&root, "/static/").is_none());
        assert!(lookup(&root, "/static").is_none());
    }

    #[test]
    fn reinsert_reuses_nodes() {
        let mut root = tree(&["/a/:id"]);
        root.insert("/a/:id", &split_path("/a/:id")).unwrap();
        assert_eq!(root.children.len(), 1);
        assert!(root.children["a"].children.is_empty());
        assert!(root.children["a"].param.is_some());
    }

    #[test]
    fn rejects_malformed_patterns() {
        let mut root = Node::default();
        let mut insert = |p: &str| root.insert(p, &split_path(p));

        assert_eq!(insert("/a/*rest/b"), Err(RouteError::CatchAllNotLast));
        assert_eq!(insert("/a/*x/*y"), Err(RouteError::CatchAllNotLast));
        assert_eq!(insert("/a/:"), Err(RouteError::UnnamedParam));
        assert_eq!(insert("/a/*"), Err(RouteError::UnnamedParam));
        insert("/u/:id").unwrap();
        assert_eq!(
            insert("/u/:name/posts"),
            Err(RouteError::ParamConflict { existing: ":id".into(), new: ":name".into() })
        );
    }
}
