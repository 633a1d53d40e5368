//! Recursive phrase-tree builder for one root.
//!
//! At every node the continuations that share the node's word path are
//! grouped by their next word. A branch-selection policy keeps the strong
//! (shared) groups, topping up with singletons when few strong groups exist.
//! Each selected branch is then compressed: runs where the following word is
//! unambiguous are absorbed into one multi-word phrase node. Nodes are emitted
//! flat, parent before children, siblings in selection order.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::core::params::FlowParams;
use crate::core::roots::{Continuation, ScoredRoot};

/// Id of the root node of every tree
pub const ROOT_ID: &str = "tree_root";

/// One emitted node; `parent` is `None` only for the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode
{
    pub id: String,
    pub parent: Option<String>,
    pub name: String,
}

/// Flat, pre-ordered node list of one tree, root first.
pub type FlowTree = Vec<TreeNode>;

/// Counters collected while building one tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats
{
    /// Branches cut off by the depth cap
    pub depth_cap_hits: usize,
    /// Branch ids skipped because they were already emitted
    pub duplicate_ids: usize,
}

/// A next-word group: the word and the continuations carrying it.
struct Group<'a>
{
    word: &'a str,
    members: Vec<Continuation<'a>>,
}

impl Group<'_>
{
    fn count(&self) -> usize
    {
        self.members.len()
    }
}

/// Group `matching` by the token at `level`, first-seen order.
fn group_next_words<'a>(
    matching: &[Continuation<'a>],
    level: usize,
) -> Vec<Group<'a>>
{
    let mut groups: IndexMap<&'a str, Vec<Continuation<'a>>> = IndexMap::new();
    for &words in matching
    {
        groups
            .entry(words[level].as_str())
            .or_default()
            .push(words);
    }

    groups
        .into_iter()
        .map(|(word, members)| Group { word, members })
        .collect()
}

/// Pick the branches to expand under one node.
///
/// With at least `strong_branch_min` strong groups only the strongest
/// `max_strong_branches` are kept. Otherwise every strong group is kept and
/// singletons are appended in first-seen order up to `fallback_branches`.
fn select_branches<'a>(
    mut groups: Vec<Group<'a>>,
    params: &FlowParams,
) -> Vec<Group<'a>>
{
    // Stable: equal counts stay in first-seen order
    groups.sort_by(|a, b| b.count().cmp(&a.count()));

    let (mut strong, singletons): (Vec<_>, Vec<_>) =
        groups
            .into_iter()
            .partition(|g| g.count() > 1);

    if strong.len() >= params.strong_branch_min
    {
        strong.truncate(params.max_strong_branches);
        return strong;
    }

    let needed = params
        .fallback_branches
        .saturating_sub(strong.len());
    strong.extend(
        singletons
            .into_iter()
            .take(needed),
    );
    strong
}

/// Extend `word` into the longest unambiguous phrase.
///
/// Returns the phrase and the level of its last word. Extension stops at a
/// sentence boundary, when two or more next words are each shared, or when
/// several distinct next words each occur once.
fn compress<'a>(
    word: &'a str,
    level: usize,
    members: Vec<Continuation<'a>>,
) -> (Vec<&'a str>, usize)
{
    let mut phrase = vec![word];
    let mut cur_level = level;
    let mut cur = members;

    loop
    {
        let next = cur_level + 1;
        if cur
            .iter()
            .any(|s| s.len() <= next)
        {
            break;
        }

        let mut counts: IndexMap<&'a str, usize> = IndexMap::new();
        for s in &cur
        {
            *counts
                .entry(s[next].as_str())
                .or_default() += 1;
        }

        let mut shared = counts
            .iter()
            .filter(|&(_, &c)| c > 1)
            .map(|(&w, _)| w);

        let absorbed = match (shared.next(), shared.next())
        {
            (Some(_), Some(_)) => break,
            (Some(w), None) => w,
            (None, _) if counts.len() == 1 =>
            {
                match counts.keys().next()
                {
                    Some(&w) => w,
                    None => break,
                }
            }
            (None, _) => break,
        };

        phrase.push(absorbed);
        cur_level = next;
        cur.retain(|s| s[next] == absorbed);
    }

    (phrase, cur_level)
}

/// Per-tree builder state; never shared between trees.
pub struct TreeBuilder<'r, 'a>
{
    continuations: &'r [Continuation<'a>],
    params: &'r FlowParams,
    seen: HashSet<String>,
    nodes: FlowTree,
    stats: BuildStats,
}

impl<'r, 'a> TreeBuilder<'r, 'a>
{
    pub fn new(
        continuations: &'r [Continuation<'a>],
        params: &'r FlowParams,
    ) -> Self
    {
        Self {
            continuations,
            params,
            seen: HashSet::new(),
            nodes: Vec::new(),
            stats: BuildStats::default(),
        }
    }

    /// Build the whole tree under `root`.
    #[instrument(level = "debug", skip(self), fields(continuations = self.continuations.len()))]
    pub fn build(
        mut self,
        root: &'a str,
    ) -> (FlowTree, BuildStats)
    {
        self.nodes.push(TreeNode { id: ROOT_ID.to_string(), parent: None, name: root.to_string() });
        self.seen.insert(ROOT_ID.to_string());

        self.build_level(ROOT_ID.to_string(), vec![root], 1);

        if self.stats.depth_cap_hits > 0
        {
            warn!(
                root,
                hits = self.stats.depth_cap_hits,
                max_depth = self.params.max_depth,
                "depth cap truncated branches"
            );
        }
        debug!(root, nodes = self.nodes.len(), "built tree");
        (self.nodes, self.stats)
    }

    fn build_level(
        &mut self,
        parent_id: String,
        parent_words: Vec<&'a str>,
        level: usize,
    )
    {
        if level > self.params.max_depth
        {
            self.stats.depth_cap_hits += 1;
            return;
        }

        let matching: Vec<Continuation<'a>> = self
            .continuations
            .iter()
            .copied()
            .filter(|words| {
                words.len() > level
                    && words
                        .iter()
                        .zip(&parent_words)
                        .all(|(w, p)| w == p)
            })
            .collect();

        if matching.is_empty()
        {
            return;
        }

        let branches = select_branches(group_next_words(&matching, level), self.params);
        trace!(%parent_id, level, branches = branches.len(), "selected branches");

        for Group { word, members } in branches
        {
            let (phrase, last_level) = compress(word, level, members);
            let name = phrase.join(" ");
            let node_id = format!("{parent_id}_{name}_{level}");

            if !self.seen.insert(node_id.clone())
            {
                self.stats.duplicate_ids += 1;
                continue;
            }

            self.nodes.push(TreeNode {
                id: node_id.clone(),
                parent: Some(parent_id.clone()),
                name,
            });

            let mut child_words = parent_words.clone();
            child_words.extend(phrase);
            self.build_level(node_id, child_words, last_level + 1);
        }
    }
}

/// Build the tree of one scored root.
pub fn build_tree(
    root: &ScoredRoot<'_>,
    params: &FlowParams,
) -> (FlowTree, BuildStats)
{
    TreeBuilder::new(&root.continuations, params).build(root.root)
}
