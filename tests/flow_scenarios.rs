//! End-to-end tree extraction over small hand-checked corpora.

mod util;

use commentflow::core::build_flow_report;
use commentflow::core::tree::TreeView;
use commentflow::{FlowEngine, FlowParams, TreeNode, build_flow_trees};

use util::{FOOD, comments};

fn triples(tree: &[TreeNode]) -> Vec<(&str, Option<&str>, &str)>
{
    tree.iter()
        .map(|n| (n.id.as_str(), n.parent.as_deref(), n.name.as_str()))
        .collect()
}

#[test]
fn food_corpus_yields_i_and_love_trees()
{
    let trees = build_flow_trees(&comments(&FOOD), &FlowParams::default());
    assert_eq!(trees.len(), 2);

    // "i" and "love" tie on score; first-seen order wins
    assert_eq!(
        triples(&trees[0]),
        vec![
            ("tree_root", None, "i"),
            ("tree_root_love pizza_1", Some("tree_root"), "love pizza"),
            (
                "tree_root_love pizza_1_and i love tacos_3",
                Some("tree_root_love pizza_1"),
                "and i love tacos"
            ),
            ("tree_root_love pizza_1_with cheese_3", Some("tree_root_love pizza_1"), "with cheese"),
            ("tree_root_love pizza_1_always_3", Some("tree_root_love pizza_1"), "always"),
        ]
    );

    assert_eq!(
        triples(&trees[1]),
        vec![
            ("tree_root", None, "love"),
            ("tree_root_pizza_1", Some("tree_root"), "pizza"),
            ("tree_root_pizza_1_and i love tacos_2", Some("tree_root_pizza_1"), "and i love tacos"),
            ("tree_root_pizza_1_with cheese_2", Some("tree_root_pizza_1"), "with cheese"),
            ("tree_root_pizza_1_always_2", Some("tree_root_pizza_1"), "always"),
            ("tree_root_tacos_1", Some("tree_root"), "tacos"),
            ("tree_root_sushi too_1", Some("tree_root"), "sushi too"),
            ("tree_root_running daily_1", Some("tree_root"), "running daily"),
        ]
    );
}

#[test]
fn food_corpus_report_counts()
{
    let report = build_flow_report(&comments(&FOOD), &FlowParams::default());

    assert_eq!(report.stats.sentences, 5);
    assert_eq!(report.stats.depth_cap_hits, 0);
    assert_eq!(report.stats.duplicate_ids, 0);

    let roots: Vec<(&str, usize)> = report
        .roots
        .iter()
        .map(|r| (r.root.as_str(), r.continuations))
        .collect();
    assert_eq!(roots, vec![("i", 6), ("love", 6)]);
    assert_eq!(report.roots[0].score, report.roots[1].score);
    assert!((report.roots[0].score - 13.3).abs() < 1e-9);
}

#[test]
fn tree_metrics_on_love_tree()
{
    let trees = build_flow_trees(&comments(&FOOD), &FlowParams::default());
    let view = TreeView::new(&trees[1]).unwrap();

    assert_eq!(view.len(), 8);
    assert_eq!(view.leaf_count(), 6);
    assert_eq!(view.max_depth(), 3);

    let lit: Vec<&str> = view
        .branch("tree_root_pizza_1")
        .into_iter()
        .collect();
    assert_eq!(
        lit,
        vec![
            "tree_root_pizza_1",
            "tree_root",
            "tree_root_pizza_1_and i love tacos_2",
            "tree_root_pizza_1_with cheese_2",
            "tree_root_pizza_1_always_2",
        ]
    );
    assert_eq!(view.phrase_path("tree_root_pizza_1_with cheese_2"), vec!["love", "pizza", "with cheese"]);
}

#[test]
fn empty_input_yields_no_trees()
{
    assert!(build_flow_trees(&[], &FlowParams::default()).is_empty());
    assert!(build_flow_trees(&comments(&["", "   ", "ok."]), &FlowParams::default()).is_empty());
}

#[test]
fn single_token_sentences_yield_no_trees()
{
    let c = comments(&["Supercalifragilistic", "Extraordinarily!!!", "Unbelievable... Wonderfully?"]);
    let report = build_flow_report(&c, &FlowParams::default());

    assert!(report.stats.sentences > 0);
    assert!(report.trees.is_empty());
}

#[test]
fn root_needs_five_continuations()
{
    let c = comments(&[
        "zebra crossings are dangerous places",
        "zebra stripes look amazing today",
        "zebra herds travel very far",
        "zebra foals stand up quickly",
    ]);
    let trees = build_flow_trees(&c, &FlowParams::default());
    assert!(trees.is_empty());

    let mut five = c.clone();
    five.push("zebra sightings are rare here".into());
    let trees = build_flow_trees(&five, &FlowParams::default());
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0][0].name, "zebra");
}

#[test]
fn short_words_except_i_and_a_are_never_roots()
{
    let c = comments(&[
        "x marks the spot again",
        "x marks another place now",
        "x marks nothing at all",
        "x marks every single map",
        "x marks treasure on islands",
    ]);
    let trees = build_flow_trees(&c, &FlowParams::default());

    let names: Vec<&str> = trees
        .iter()
        .map(|t| t[0].name.as_str())
        .collect();
    assert_eq!(names, vec!["marks"]);
}

#[test]
fn repeated_runs_are_identical()
{
    let c = comments(&FOOD);
    let a = serde_json::to_string(&build_flow_trees(&c, &FlowParams::default())).unwrap();
    let b = serde_json::to_string(&build_flow_trees(&c, &FlowParams::default())).unwrap();
    assert_eq!(a, b);

    let engine = FlowEngine::new(FlowParams::default());
    let cached = serde_json::to_string(&engine.report(&c).trees).unwrap();
    assert_eq!(a, cached);
}
