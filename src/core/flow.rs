//! Multi-tree aggregation and the `flow`, `roots` and `branch` commands.
//!
//! Pipeline: comments → sentences → root buckets → top scored roots →
//! one tree per root, in score order. Too little data yields an empty tree
//! list, which callers present as "no data" rather than a failure.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use moka::sync::Cache;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};
use tracing::{debug, info, instrument};
use xxhash_rust::xxh64::Xxh64;

use crate::cli::{AppContext, BranchArgs, FlowArgs, FlowFormat, RootsArgs, RootsFormat};
use crate::core::builder::{FlowTree, build_tree};
use crate::core::params::FlowParams;
use crate::core::roots::{index_roots, select_roots};
use crate::core::sentence::extract_sentences;
use crate::core::tree::{TreeView, print_tree};
use crate::infra::{config, io::read_input};
use crate::parsers::comments::{Comment, parse_comments};

/// Summary of one selected root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootSummary
{
    pub root: String,
    pub score: f64,
    pub continuations: usize,
}

/// Counters for one full run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlowStats
{
    /// Sentences that survived splitting
    pub sentences: usize,
    /// Distinct eligible roots indexed, before the threshold
    pub candidate_roots: usize,
    /// Branches truncated by the depth cap, over all trees
    pub depth_cap_hits: usize,
    /// Branch ids skipped as already emitted, over all trees
    pub duplicate_ids: usize,
}

/// Trees in root-score order, with the roots that produced them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowReport
{
    pub roots: Vec<RootSummary>,
    pub trees: Vec<FlowTree>,
    pub stats: FlowStats,
}

impl FlowReport
{
    pub fn is_empty(&self) -> bool
    {
        self.trees.is_empty()
    }
}

/// Run the whole pipeline over `comments`.
#[instrument(level = "debug", skip_all, fields(comments = comments.len()))]
pub fn build_flow_report(
    comments: &[Comment],
    params: &FlowParams,
) -> FlowReport
{
    let sentences = extract_sentences(comments, params);
    let mut stats = FlowStats { sentences: sentences.len(), ..FlowStats::default() };
    if sentences.is_empty()
    {
        return FlowReport { stats, ..FlowReport::default() };
    }

    let buckets = index_roots(&sentences, params);
    stats.candidate_roots = buckets.len();
    let scored = select_roots(buckets, params);

    let mut roots = Vec::with_capacity(scored.len());
    let mut trees = Vec::with_capacity(scored.len());
    for root in &scored
    {
        let (tree, build) = build_tree(root, params);
        stats.depth_cap_hits += build.depth_cap_hits;
        stats.duplicate_ids += build.duplicate_ids;

        roots.push(RootSummary {
            root: root.root.to_string(),
            score: root.score,
            continuations: root.continuations.len(),
        });
        trees.push(tree);
    }

    info!(
        sentences = stats.sentences,
        trees = trees.len(),
        depth_cap_hits = stats.depth_cap_hits,
        "built comment flow"
    );
    FlowReport { roots, trees, stats }
}

/// Trees only; empty when no root reaches the continuation threshold.
pub fn build_flow_trees(
    comments: &[Comment],
    params: &FlowParams,
) -> Vec<FlowTree>
{
    build_flow_report(comments, params).trees
}

/// Memoizes reports per corpus.
///
/// The key is an xxh64 fingerprint of every comment text (in order) and the
/// parameters, so an unchanged corpus returns the shared report untouched.
pub struct FlowEngine
{
    params: FlowParams,
    cache: Cache<u64, Arc<FlowReport>>,
}

impl FlowEngine
{
    pub fn new(params: FlowParams) -> Self
    {
        Self::with_capacity(params, 64)
    }

    pub fn with_capacity(
        params: FlowParams,
        capacity: u64,
    ) -> Self
    {
        Self { params, cache: Cache::new(capacity) }
    }

    pub fn params(&self) -> &FlowParams
    {
        &self.params
    }

    /// Report for `comments`, computed at most once per distinct corpus.
    pub fn report(
        &self,
        comments: &[Comment],
    ) -> Arc<FlowReport>
    {
        let key = fingerprint(comments, &self.params);
        self.cache
            .get_with(key, || {
                debug!(key, "flow cache miss");
                Arc::new(build_flow_report(comments, &self.params))
            })
    }
}

fn fingerprint(
    comments: &[Comment],
    params: &FlowParams,
) -> u64
{
    let mut hasher = Xxh64::new(0);
    hasher.update(params.fingerprint().as_bytes());
    for c in comments
    {
        // 0xFF never occurs in UTF-8, so texts cannot run together
        hasher.update(&[0xFF]);
        hasher.update(c.text().as_bytes());
    }
    hasher.digest()
}

/// Read and decode the comment export at `path` (`-` for stdin).
pub fn load_comments(path: &Path) -> Result<Vec<Comment>>
{
    let content = read_input(path)?;
    let text = content.as_str()?;
    let comments = parse_comments(text)
        .with_context(|| format!("Failed to decode comments from {}", path.display()))?;
    Ok(comments)
}

fn resolve_params(overrides: &crate::cli::ParamArgs) -> Result<FlowParams>
{
    let cfg = config::load_config()?;
    Ok(overrides.apply(cfg.flow))
}

/// Run the `flow` command end-to-end
pub fn run_flow(
    args: FlowArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let cfg = config::load_config()?;
    let params = args
        .params
        .apply(cfg.flow);
    let format = match args.format
    {
        Some(f) => f,
        None => parse_format(&cfg.output.format)?,
    };
    let pretty = args.pretty || cfg.output.pretty;

    let comments = load_comments(&args.input)?;
    let report = FlowEngine::new(params).report(&comments);

    match format
    {
        FlowFormat::Json =>
        {
            let out = if pretty
            {
                serde_json::to_string_pretty(&report.trees)?
            }
            else
            {
                serde_json::to_string(&report.trees)?
            };
            println!("{out}");
        }
        FlowFormat::Jsonl =>
        {
            for tree in &report.trees
            {
                println!("{}", serde_json::to_string(tree)?);
            }
        }
        FlowFormat::Tree =>
        {
            if report.is_empty()
            {
                if !ctx.quiet
                {
                    eprintln!("no sentence patterns found");
                }
                return Ok(());
            }

            let color = !ctx.no_color;
            for (i, (tree, root)) in report
                .trees
                .iter()
                .zip(&report.roots)
                .enumerate()
            {
                let view = TreeView::new(tree)?;
                if args.stats && !ctx.quiet
                {
                    let header = format!(
                        "#{} {} (score {:.2}, {} nodes, {} leaves, depth {})",
                        i + 1,
                        root.root,
                        root.score,
                        view.len(),
                        view.leaf_count(),
                        view.max_depth()
                    );
                    if color
                    {
                        println!("{}", header.dimmed());
                    }
                    else
                    {
                        println!("{header}");
                    }
                }
                print_tree(&view, None, color)?;
            }
        }
    }

    Ok(())
}

fn parse_format(name: &str) -> Result<FlowFormat>
{
    match name.to_ascii_lowercase().as_str()
    {
        "tree" => Ok(FlowFormat::Tree),
        "json" => Ok(FlowFormat::Json),
        "jsonl" => Ok(FlowFormat::Jsonl),
        other => bail!("Unknown output format `{other}` in config (expected tree, json or jsonl)"),
    }
}

#[derive(Tabled)]
struct RootRow
{
    #[tabled(rename = "#")]
    rank: usize,
    root: String,
    score: String,
    continuations: usize,
}

/// Run the `roots` command
pub fn run_roots(
    args: RootsArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let params = resolve_params(&args.params)?;
    let comments = load_comments(&args.input)?;
    let report = FlowEngine::new(params).report(&comments);

    match args.format
    {
        RootsFormat::Json => println!("{}", serde_json::to_string(&report.roots)?),
        RootsFormat::Table =>
        {
            if report.roots.is_empty()
            {
                if !ctx.quiet
                {
                    eprintln!("no root reached the continuation threshold");
                }
                return Ok(());
            }

            let rows: Vec<RootRow> = report
                .roots
                .iter()
                .enumerate()
                .map(|(i, r)| RootRow {
                    rank: i + 1,
                    root: r.root.clone(),
                    score: format!("{:.2}", r.score),
                    continuations: r.continuations,
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");
        }
    }

    Ok(())
}

/// Run the `branch` command
pub fn run_branch(
    args: BranchArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let params = resolve_params(&args.params)?;
    let comments = load_comments(&args.input)?;
    let report = FlowEngine::new(params).report(&comments);

    let Some(tree) = report.trees.get(args.tree)
    else
    {
        bail!("tree index {} out of range ({} trees)", args.tree, report.trees.len());
    };

    let view = TreeView::new(tree)?;
    let lit = view.branch(&args.node);
    if lit.is_empty()
    {
        bail!("node `{}` not found in tree {}", args.node, args.tree);
    }

    if args.json
    {
        let ids: Vec<&str> = lit
            .iter()
            .copied()
            .collect();
        println!("{}", serde_json::to_string(&ids)?);
    }
    else
    {
        if !ctx.quiet
        {
            println!("{}", view.phrase_path(&args.node).join(" "));
        }
        print_tree(&view, Some(&lit), !ctx.no_color)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn corpus(lines: &[&str]) -> Vec<Comment>
    {
        lines.iter().map(|&l| Comment::from(l)).collect()
    }

    #[test]
    fn empty_and_tiny_corpora_produce_no_trees()
    {
        assert!(build_flow_trees(&[], &FlowParams::default()).is_empty());

        let short = corpus(&["ok", "fine.", "sure!"]);
        let report = build_flow_report(&short, &FlowParams::default());
        assert!(report.is_empty());
        assert_eq!(report.stats.sentences, 0);
    }

    #[test]
    fn roots_and_trees_line_up()
    {
        let c = corpus(&[
            "I think this is right",
            "I think that is wrong",
            "I think we should wait",
            "I think so too honestly",
            "I think you are correct",
        ]);
        let report = build_flow_report(&c, &FlowParams::default());
        assert_eq!(report.roots.len(), report.trees.len());
        for (root, tree) in report.roots.iter().zip(&report.trees)
        {
            assert_eq!(tree[0].name, root.root);
            assert!(root.continuations >= 5);
        }
    }

    #[test]
    fn engine_reuses_report_for_same_corpus()
    {
        let c = corpus(&["we like long walks on the beach", "we like short walks in the park"]);
        let engine = FlowEngine::new(FlowParams { min_continuations: 2, ..FlowParams::default() });

        let a = engine.report(&c);
        let b = engine.report(&c);
        assert!(Arc::ptr_eq(&a, &b));

        let other = corpus(&["we like long walks on the beach"]);
        let d = engine.report(&other);
        assert!(!Arc::ptr_eq(&a, &d));
    }

    #[test]
    fn fingerprint_separates_comment_boundaries()
    {
        let p = FlowParams::default();
        let joined = corpus(&["ab"]);
        let split = corpus(&["a", "b"]);
        assert_ne!(fingerprint(&joined, &p), fingerprint(&split, &p));
    }

    #[test]
    fn config_format_names()
    {
        assert_eq!(parse_format("JSON").unwrap(), FlowFormat::Json);
        assert!(parse_format("xml").is_err());
    }
}
