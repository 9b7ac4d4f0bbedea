//! The import tree.
//!
//! Records the parent/child edges of every file reached through `import`
//! resolution. The tree backs two things: cycle detection (via the active
//! chain maintained by the preprocessor) and a renderable dependency view
//! for verbose runs.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// One file in the import tree.
#[derive(Debug, Clone)]
pub struct ImportNode {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Files this file imports, in encounter order
    pub children: Vec<ImportNode>,
}

impl ImportNode {
    /// Creates a leaf node.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), children: Vec::new() }
    }
}

/// The directed graph of files reachable from the root via `import`.
#[derive(Debug, Clone)]
pub struct ImportTree {
    root: ImportNode,
}

impl ImportTree {
    /// Creates a tree rooted at the main file.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: ImportNode::new(root) } }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> &ImportNode { &self.root }

    /// Inserts `child` under the node whose path matches `parent`.
    ///
    /// Returns false if the parent is not in the tree.
    pub fn insert(&mut self, parent: &Path, child: ImportNode) -> bool {
        fn find<'a>(node: &'a mut ImportNode, path: &Path) -> Option<&'a mut ImportNode> {
            if node.path == path {
                return Some(node);
            }

            node.children.iter_mut().find_map(|c| find(c, path))
        }

        match find(&mut self.root, parent) {
            Some(node) => {
                node.children.push(child);
                true
            }
            None => false,
        }
    }

    /// Renders the tree, one node per line, two spaces of indent per depth.
    #[must_use]
    pub fn render(&self) -> String {
        fn walk(node: &ImportNode, depth: usize, out: &mut String) {
            let _ = writeln!(out, "{}{}", "  ".repeat(depth), node.path.display());

            for child in &node.children {
                walk(child, depth + 1, out);
            }
        }

        let mut out = String::new();
        walk(&self.root, 0, &mut out);
        out
    }

    /// Collects every path in the tree, depth-first.
    #[must_use]
    pub fn paths(&self) -> Vec<&Path> {
        fn walk<'a>(node: &'a ImportNode, out: &mut Vec<&'a Path>) {
            out.push(node.path.as_path());

            for child in &node.children {
                walk(child, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_render() {
        let mut tree = ImportTree::new("/src/main.hlx");

        assert!(tree.insert(Path::new("/src/main.hlx"), ImportNode::new("/src/util.hlx")));
        assert!(tree.insert(Path::new("/src/util.hlx"), ImportNode::new("/src/math.hlx")));
        assert!(!tree.insert(Path::new("/src/other.hlx"), ImportNode::new("/src/x.hlx")));

        let rendered = tree.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "/src/main.hlx");
        assert_eq!(lines[1], "  /src/util.hlx");
        assert_eq!(lines[2], "    /src/math.hlx");
    }

    #[test]
    fn paths_lists_every_file_once() {
        let mut tree = ImportTree::new("/a.hlx");
        let _ = tree.insert(Path::new("/a.hlx"), ImportNode::new("/b.hlx"));
        let _ = tree.insert(Path::new("/a.hlx"), ImportNode::new("/c.hlx"));

        let paths = tree.paths();
        assert_eq!(paths.len(), 3);
    }
}
