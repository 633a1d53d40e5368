//! Filepath: src/core/tree.rs
//! Adjacency view over a flat, parent-linked node list.
//!
//! Consumers receive trees as `{id, parent, name}` records. This view
//! rebuilds the parent/child structure once and answers the questions a
//! renderer asks: how many leaves, how deep, and which nodes light up when
//! one node is hovered (its ancestors plus every descendant).
//!
//! Children keep emission order, so traversal and printing are deterministic.

use std::collections::HashMap;

use indexmap::IndexSet;
use owo_colors::OwoColorize;
use ptree::TreeBuilder;

use crate::core::builder::TreeNode;

/// Structural problems in a node list.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeShapeError
{
    #[error("tree has no nodes")]
    Empty,

    #[error("tree has no root node")]
    MissingRoot,

    #[error("tree has a second root `{0}`")]
    ExtraRoot(String),

    #[error("node id `{0}` appears more than once")]
    DuplicateId(String),

    #[error("node `{id}` references parent `{parent}` before it is emitted")]
    DanglingParent
    {
        id: String,
        parent: String,
    },
}

/// Read-only adjacency over one tree's nodes.
#[derive(Debug)]
pub struct TreeView<'t>
{
    nodes: &'t [TreeNode],
    index: HashMap<&'t str, usize>,
    children: Vec<Vec<usize>>,
    root: usize,
}

impl<'t> TreeView<'t>
{
    /// Validate `nodes` and build the view.
    ///
    /// Every parent must be emitted before its children, ids must be unique
    /// and exactly one node may lack a parent.
    pub fn new(nodes: &'t [TreeNode]) -> Result<Self, TreeShapeError>
    {
        if nodes.is_empty()
        {
            return Err(TreeShapeError::Empty);
        }

        let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut root = None;

        for (i, node) in nodes
            .iter()
            .enumerate()
        {
            match &node.parent
            {
                None if root.is_some() => return Err(TreeShapeError::ExtraRoot(node.id.clone())),
                None => root = Some(i),
                Some(parent) =>
                {
                    let Some(&p) = index.get(parent.as_str())
                    else
                    {
                        return Err(TreeShapeError::DanglingParent {
                            id: node.id.clone(),
                            parent: parent.clone(),
                        });
                    };
                    children[p].push(i);
                }
            }

            if index
                .insert(node.id.as_str(), i)
                .is_some()
            {
                return Err(TreeShapeError::DuplicateId(node.id.clone()));
            }
        }

        let root = root.ok_or(TreeShapeError::MissingRoot)?;
        Ok(Self { nodes, index, children, root })
    }

    pub fn root(&self) -> &'t TreeNode
    {
        &self.nodes[self.root]
    }

    pub fn len(&self) -> usize
    {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.nodes.is_empty()
    }

    /// Children of `id` in emission order; unknown ids have none.
    pub fn children_of(
        &self,
        id: &str,
    ) -> Vec<&'t TreeNode>
    {
        self.index
            .get(id)
            .map(|&i| {
                self.children[i]
                    .iter()
                    .map(|&c| &self.nodes[c])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nodes that are nobody's parent.
    pub fn leaf_count(&self) -> usize
    {
        self.children
            .iter()
            .filter(|c| c.is_empty())
            .count()
    }

    /// Longest root-to-leaf path counted in nodes; a lone root has depth 1.
    pub fn max_depth(&self) -> usize
    {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1)];

        while let Some((i, depth)) = stack.pop()
        {
            max_depth = max_depth.max(depth);
            for &c in &self.children[i]
            {
                stack.push((c, depth + 1));
            }
        }

        max_depth
    }

    /// Ids to highlight when `id` is hovered: the node, its ancestors up to
    /// the root, then all of its descendants depth-first.
    ///
    /// Unknown ids yield an empty set.
    pub fn branch(
        &self,
        id: &str,
    ) -> IndexSet<&'t str>
    {
        let mut out = IndexSet::new();
        let Some(&start) = self.index.get(id)
        else
        {
            return out;
        };

        // Up to the root
        let mut current = Some(start);
        while let Some(i) = current
        {
            let node = &self.nodes[i];
            out.insert(node.id.as_str());
            current = node
                .parent
                .as_deref()
                .and_then(|p| self.index.get(p).copied());
        }

        // Down through every descendant
        let mut stack = vec![start];
        while let Some(i) = stack.pop()
        {
            out.insert(self.nodes[i].id.as_str());
            for &c in self.children[i]
                .iter()
                .rev()
            {
                stack.push(c);
            }
        }

        out
    }

    /// Word path from the root to `id`, root word first.
    pub fn phrase_path(
        &self,
        id: &str,
    ) -> Vec<&'t str>
    {
        let mut path = Vec::new();
        let mut current = self.index.get(id).copied();
        while let Some(i) = current
        {
            let node = &self.nodes[i];
            path.push(node.name.as_str());
            current = node
                .parent
                .as_deref()
                .and_then(|p| self.index.get(p).copied());
        }
        path.reverse();
        path
    }

    /// Build a printable tree; nodes in `highlight` are colored.
    pub fn render(
        &self,
        highlight: Option<&IndexSet<&str>>,
        color: bool,
    ) -> ptree::item::StringItem
    {
        let mut builder = TreeBuilder::new(self.label(self.root, highlight, color));
        self.add_children_to_builder(&mut builder, self.root, highlight, color);
        builder.build()
    }

    fn add_children_to_builder(
        &self,
        builder: &mut TreeBuilder,
        parent: usize,
        highlight: Option<&IndexSet<&str>>,
        color: bool,
    )
    {
        for &c in &self.children[parent]
        {
            let label = self.label(c, highlight, color);
            if self.children[c].is_empty()
            {
                builder.add_empty_child(label);
            }
            else
            {
                builder.begin_child(label);
                self.add_children_to_builder(builder, c, highlight, color);
                builder.end_child();
            }
        }
    }

    fn label(
        &self,
        i: usize,
        highlight: Option<&IndexSet<&str>>,
        color: bool,
    ) -> String
    {
        let node = &self.nodes[i];
        let lit = highlight.is_some_and(|h| h.contains(node.id.as_str()));

        match (color, lit, i == self.root)
        {
            (false, _, _) => node.name.clone(),
            (true, true, _) => node.name.red().bold().to_string(),
            (true, false, true) => node.name.yellow().bold().to_string(),
            (true, false, false) => node.name.to_string(),
        }
    }
}

/// Print one tree to stdout.
pub fn print_tree(
    view: &TreeView<'_>,
    highlight: Option<&IndexSet<&str>>,
    color: bool,
) -> std::io::Result<()>
{
    ptree::print_tree(&view.render(highlight, color))
}
