use crate::{
    CategorialGrammar, Category, Chart, Coverage, CoverageScorer, Derivation, Edge, GrammarError, HypertagMode,
    Hypertagger, InsertOutcome, LexicalItem, Lf, PolicyRegistry, PruneDecision, PruningStrategy, RealizationStatus,
    Realizer, RealizerConfig, Sign, TaggedCategory, realize,
};
use std::sync::Arc;
use std::time::Duration;

fn lf(text: &str) -> Lf {
    text.parse().unwrap()
}

fn sleeper() -> CategorialGrammar {
    lexicon![
        "john" => "np" : "John",
        "sleep" => "s\\np" : "sleeps",
        "soundly" => "(s\\np)\\(s\\np)" : "soundly",
    ]
    .unwrap()
}

fn lexical(n_eps: usize, ep: usize, category: &str, words: &str) -> Edge {
    Edge::new(Sign::lexical(category.parse().unwrap(), words), Coverage::singleton(n_eps, ep), Derivation::Lexical {
        ep,
    })
    .scored(&CoverageScorer)
}

struct DropAll;

impl PruningStrategy for DropAll {
    fn evaluate(&self, _candidate: &Edge, _chart: &Chart) -> PruneDecision {
        PruneDecision::Drop
    }
}

/// Always votes for a category no grammar seeds.
struct Stubborn;

impl Hypertagger for Stubborn {
    fn candidate_categories(&self, _item: &LexicalItem<'_>, _chart: &Chart) -> Vec<TaggedCategory> {
        vec![TaggedCategory { category: Category::atom("nothing"), confidence: 1.0 }]
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn single_sign_covering_the_whole_lf() {
    let grammar = lexicon!["p1" + "p2" => "s" : "all at once"].unwrap();
    let out = Realizer::new(&grammar).realize(&lf("p1(x) p2(x,y)")).unwrap();

    assert_eq!(out.complete_edges(false).len(), 1);
    assert_eq!(out.best_edge().unwrap().surface(), "all at once");
    assert_eq!(out.best_edge().unwrap().coverage().len(), 2);
    assert!(out.best_joined_edge().is_none());
    assert_eq!(out.status(), RealizationStatus::COMPLETE);
}

#[test]
fn uncombinable_signs_are_joined_in_lf_order() {
    let grammar = lexicon!["p1" => "np" : "alpha", "p3" => "pp" : "beta"].unwrap();

    let out = Realizer::new(&grammar).realize(&lf("p1(x) p3(y)")).unwrap();
    assert!(out.best_edge().is_none());
    let joined = out.best_joined_edge().unwrap();
    assert_eq!(joined.surface(), "alpha beta");
    assert_eq!(joined.coverage(), &Coverage::full(2));
    assert_eq!(out.status(), RealizationStatus::JOINED);
    assert!(!out.is_failure());

    let Derivation::Joined { parts } = joined.derivation() else { panic!("expected a join") };
    assert_eq!(parts.len(), 2);
    assert_eq!(out.chart()[parts[0]].surface(), "alpha");

    let flipped = Realizer::new(&grammar).realize(&lf("p3(y) p1(x)")).unwrap();
    assert_eq!(flipped.best_joined_edge().unwrap().surface(), "beta alpha");
}

#[test]
fn zero_edge_budget_keeps_only_seeds() {
    let grammar = sleeper();
    let out = Realizer::new(&grammar).with_edge_budget(Some(0)).realize(&lf("sleep(e,x) john(x)")).unwrap();

    assert_eq!(out.chart().len(), 2);
    assert!(out.chart().live_edges().all(|(_, e)| e.is_lexical()));
    assert!(out.best_edge().is_none());
    assert!(out.is_partial());
    assert_eq!(out.metrics().created, 0);
    assert_eq!(out.best_joined_edge().unwrap().surface(), "sleeps John");

    let grammar = lexicon!["rain" => "s" : "it rains"].unwrap();
    let out = Realizer::new(&grammar).with_edge_budget(Some(0)).realize(&lf("rain(e)")).unwrap();
    assert_eq!(out.best_edge().unwrap().surface(), "it rains");
    assert_eq!(out.status(), RealizationStatus::COMPLETE | RealizationStatus::BUDGET_EXCEEDED);
}

// ---------------------------------------------------------------------------
// Chart behaviour
// ---------------------------------------------------------------------------

#[test]
fn dominance_keeps_the_better_of_equivalent_edges() {
    let lf = lf("dog(x)");
    let mut chart = Chart::new(&lf, Arc::new(CoverageScorer));

    let wordy = lexical(1, 0, "np", "the big dog");
    let terse = lexical(1, 0, "np", "the dog");
    assert!(terse.score() > wordy.score());

    assert_eq!(chart.insert(wordy.clone()), InsertOutcome::Accepted { id: 0, evicted: None });
    assert_eq!(chart.insert(terse.clone()), InsertOutcome::Accepted { id: 1, evicted: Some(0) });
    assert_eq!(chart.insert(wordy), InsertOutcome::Dominated { by: 1 });
    assert_eq!(chart.insert(terse), InsertOutcome::Dominated { by: 1 });

    assert_eq!(chart.len(), 1);
    assert_eq!(chart.arena_len(), 2);
    assert!(!chart.is_live(0));
    assert_eq!(chart.best_edge().unwrap().surface(), "the dog");

    // a different category is a different edge
    assert!(chart.insert(lexical(1, 0, "n", "dog")).accepted().is_some());
    assert_eq!(chart.len(), 2);
}

#[test]
fn scorer_decides_which_equivalent_edge_survives() {
    let grammar = lexicon!["dog" => "np" : "the dog", "dog" => "np" : "the old dog"].unwrap();
    let input = lf("dog(x)");

    let out = Realizer::new(&grammar).realize(&input).unwrap();
    assert_eq!(out.best_edge().unwrap().surface(), "the dog");
    assert_eq!(out.metrics().dominated, 1);

    let verbose = Realizer::new(&grammar).with_scorer(Arc::new(|e: &Edge| e.words().len() as f64));
    assert_eq!(verbose.realize(&input).unwrap().best_edge().unwrap().surface(), "the old dog");
}

#[test]
fn combination_requires_disjoint_coverage() {
    let grammar = sleeper();
    let lf = lf("sleep(e,x) john(x)");
    let mut chart = Chart::new(&lf, Arc::new(CoverageScorer));
    let sleep = chart.insert(lexical(2, 0, "s\\np", "sleeps")).accepted().unwrap();
    let john = chart.insert(lexical(2, 1, "np", "John")).accepted().unwrap();
    let other_sleep = chart.insert(lexical(2, 0, "np", "sleeper")).accepted().unwrap();

    assert!(chart.try_combine(&grammar, other_sleep, sleep).is_none());
    assert!(chart.combine(&grammar, sleep, john).is_none());

    let outcome = chart.combine(&grammar, john, sleep).unwrap();
    let id = outcome.accepted().unwrap();
    assert_eq!(chart[id].surface(), "John sleeps");
    assert_eq!(chart.complete_edge_ids(true), vec![id]);
    assert_eq!(chart.lexical_leaves(id), vec![john, sleep]);
}

#[test]
fn complete_edges_sort_by_score_then_insertion() {
    let lf = lf("rain(e)");
    let mut chart = Chart::new(&lf, Arc::new(CoverageScorer));
    let long = chart.insert(lexical(1, 0, "s", "it is raining")).accepted().unwrap();
    let short_a = chart.insert(lexical(1, 0, "s/adv", "rain")).accepted().unwrap();
    let short_b = chart.insert(lexical(1, 0, "s\\adv", "rain")).accepted().unwrap();

    assert_eq!(chart.complete_edge_ids(false), vec![long, short_a, short_b]);
    assert_eq!(chart.complete_edge_ids(true), vec![short_a, short_b, long]);
    assert_eq!(chart.best_edge_id(), Some(short_a));
}

// ---------------------------------------------------------------------------
// Joins
// ---------------------------------------------------------------------------

#[test]
fn join_is_an_exact_cover_and_ties_prefer_fewer_parts() {
    let grammar = lexicon![
        "rain" => "s" : "it rains",
        "now" => "s\\s" : "now",
        "here" => "loc" : "here",
    ]
    .unwrap();
    let out = Realizer::new(&grammar).realize(&lf("rain(e) now(e) here(e)")).unwrap();

    assert!(out.best_edge().is_none());
    let joined = out.best_joined_edge().unwrap();
    assert_eq!(joined.surface(), "it rains now here");

    let Derivation::Joined { parts } = joined.derivation() else { panic!("expected a join") };
    assert_eq!(parts.len(), 2);
    let mut union = Coverage::empty(3);
    for (i, &a) in parts.iter().enumerate() {
        for &b in &parts[i + 1..] {
            assert!(out.chart()[a].coverage().is_disjoint(out.chart()[b].coverage()));
        }
        union = union.union(out.chart()[a].coverage());
    }
    assert_eq!(union, Coverage::full(3));

    let tree = out.derivation(joined);
    assert_eq!(tree.rules(), vec!["join", "<", "lex", "lex", "lex"]);
    assert_eq!(tree.surface(), "it rains now here");
}

#[test]
fn join_prefers_the_higher_score_over_fewer_parts() {
    let grammar = lexicon![
        "a" + "b" => "np" : "w1 w2 w3 w4 w5 w6",
        "a" => "s" : "x",
        "b" => "pp" : "y",
        "c" => "loc" : "z",
    ]
    .unwrap();
    let out = Realizer::new(&grammar).realize(&lf("a(e) b(e) c(e)")).unwrap();

    assert!(out.best_edge().is_none());
    let joined = out.best_joined_edge().unwrap();
    assert_eq!(joined.surface(), "x y z");
    assert!((joined.score() - 2.97).abs() < 1e-9);
    let Derivation::Joined { parts } = joined.derivation() else { panic!("expected a join") };
    assert_eq!(parts.len(), 3);
}

#[test]
fn join_considers_edges_that_lose_on_their_own() {
    let grammar = lexicon![
        "a" => "np" : "a",
        "a" => "n" : "a a a",
        "b" => "pp" : "b",
    ]
    .unwrap();
    let by_length = |e: &Edge| match e.words().len() {
        1 => 0.0,
        4 => 10.0,
        _ => -5.0,
    };
    let out = Realizer::new(&grammar).with_scorer(Arc::new(by_length)).realize(&lf("a(x) b(y)")).unwrap();

    let joined = out.best_joined_edge().unwrap();
    assert_eq!(joined.surface(), "a a a b");
    assert_eq!(joined.score(), 10.0);
}

#[test]
fn no_join_when_a_complete_edge_exists() {
    let grammar = lexicon![
        "see" => "s\\np/np" : "sees",
        "dog" + "def" => "np" : "the dog",
        "cat" + "def" => "np" : "the cat",
    ]
    .unwrap();
    let out = Realizer::new(&grammar).realize(&lf("see(e,x,y) def(x) dog(x) def(y) cat(y)")).unwrap();

    assert!(out.best_edge().is_some());
    assert!(out.best_joined_edge().is_none());
    assert!(!out.status().contains(RealizationStatus::JOINED));
}

#[test]
fn missing_cover_means_no_join() {
    let grammar = lexicon!["p1" + "p2" => "np" : "both", "p3" => "pp" : "third", "p2" => "n" : "second"].unwrap();
    // p1 is only reachable together with p2, and nothing covers p4.
    let grammar_lf = lf("p1(x) p2(x) p3(y) p4(y)");
    let out = Realizer::new(&grammar).realize(&grammar_lf);
    assert_eq!(out.unwrap_err(), GrammarError::UnknownPredicate { pred: "p4".to_string() });

    let grammar = lexicon!["p2" + "p1" => "np" : "both", "p3" => "pp" : "third"].unwrap();
    let out = Realizer::new(&grammar).realize(&lf("p1(x) p2(z) p3(y)")).unwrap();
    assert!(out.best_edge().is_none());
    assert!(out.best_joined_edge().is_none());
    assert!(out.is_failure());
}

// ---------------------------------------------------------------------------
// Chunks
// ---------------------------------------------------------------------------

#[test]
fn obligatory_chunks_complete_before_attaching() {
    let grammar = sleeper();

    let free = Realizer::new(&grammar).realize(&lf("sleep(e,x) john(x) soundly(e)")).unwrap();
    assert_eq!(free.best_edge().unwrap().surface(), "John sleeps soundly");

    let chunked = Realizer::new(&grammar).realize(&lf("{ sleep(e,x) john(x) } soundly(e)")).unwrap();
    assert!(chunked.best_edge().is_none());
    assert!(chunked.chart().live_edges().all(|(_, e)| e.surface() != "sleeps soundly"));
    assert_eq!(chunked.best_joined_edge().unwrap().surface(), "John sleeps soundly");
}

#[test]
fn optional_chunks_are_all_or_nothing() {
    let grammar = sleeper();
    let out = Realizer::new(&grammar).realize(&lf("sleep(e,x) john(x) [ soundly(e) ]")).unwrap();

    let complete: Vec<String> = out.complete_edges(true).iter().map(|e| e.surface()).collect();
    assert_eq!(complete, vec!["John sleeps soundly", "John sleeps"]);
    assert_eq!(out.best_edge().unwrap().surface(), "John sleeps soundly");
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

#[test]
fn dropping_every_combination_is_a_failure_not_a_fault() {
    let grammar = sleeper();
    let out = Realizer::new(&grammar)
        .with_pruning_strategy(Arc::new(DropAll))
        .realize(&lf("sleep(e,x) john(x)"))
        .unwrap();

    assert!(out.complete_edges(false).is_empty());
    assert!(out.best_edge().is_none());
    assert!(!out.status().contains(RealizationStatus::COMPLETE));
    assert!(out.metrics().pruned > 0);
    assert_eq!(out.chart().len(), 2);
}

#[test]
fn beam_pruning_still_finds_the_realization() {
    let grammar = sleeper();
    let config = RealizerConfig { pruning_strategy: Some("n-best:1".into()), ..RealizerConfig::default() };
    let out = realize(&grammar, &lf("sleep(e,x) john(x) soundly(e)"), &config).unwrap();
    assert_eq!(out.best_edge().unwrap().surface(), "John sleeps soundly");
}

#[test]
fn hypertagger_restricts_seeded_categories() {
    let grammar = lexicon![
        "john" => "np" : "John",
        "sleep" => "s\\np/np" : "sleeps with",
        "sleep" => "s\\np" : "sleeps",
    ]
    .unwrap();
    let registry = PolicyRegistry::builtin();
    let config = RealizerConfig { hypertagger: Some("beta-best:1".into()), ..RealizerConfig::default() };
    let realizer = Realizer::from_config(&grammar, &config, &registry).unwrap();

    let out = realizer.realize(&lf("sleep(e,x) john(x)")).unwrap();
    let transitive: Category = "s\\np/np".parse().unwrap();
    assert!(out.chart().live_edges().all(|(_, e)| *e.category() != transitive));
    assert_eq!(out.best_edge().unwrap().surface(), "John sleeps");
}

#[test]
fn hypertagger_falls_back_when_it_keeps_nothing() {
    let grammar = sleeper();
    let out = Realizer::new(&grammar).with_hypertagger(Arc::new(Stubborn)).realize(&lf("sleep(e,x) john(x)")).unwrap();

    assert_eq!(out.metrics().seeds, 2);
    assert_eq!(out.best_edge().unwrap().surface(), "John sleeps");
}

#[test]
fn chart_aware_hypertagger_only_reorders() {
    let grammar = sleeper();
    let config = RealizerConfig { hypertagger: Some("argument-demand".into()), ..RealizerConfig::default() };
    let out = realize(&grammar, &lf("sleep(e,x) john(x) soundly(e)"), &config).unwrap();

    assert_eq!(PolicyRegistry::global().hypertagger("argument-demand").unwrap().mode(), HypertagMode::ChartAware);
    assert_eq!(out.best_edge().unwrap().surface(), "John sleeps soundly");
}

// ---------------------------------------------------------------------------
// Faults and budgets
// ---------------------------------------------------------------------------

#[test]
fn grammar_faults_abort_before_search() {
    let grammar = sleeper();
    let err = Realizer::new(&grammar).realize(&lf("sleep(e,x) mary(x)")).unwrap_err();
    assert_eq!(err, GrammarError::UnknownPredicate { pred: "mary".to_string() });
}

#[test]
fn zero_time_budget_stops_before_expanding() {
    let grammar = sleeper();
    let out = Realizer::new(&grammar)
        .with_time_budget(Some(Duration::ZERO))
        .realize(&lf("sleep(e,x) john(x)"))
        .unwrap();

    assert!(out.is_partial());
    assert_eq!(out.metrics().expansions, 0);
    assert_eq!(out.chart().len(), 2);
}

#[test]
fn evicted_leftovers_do_not_count_as_pending_work() {
    let grammar = lexicon![
        "john" => "np" : "the man John",
        "john" => "np" : "John",
        "sleep" => "s\\np" : "sleeps",
        "sleep" + "john" => "s" : "Zzz",
    ]
    .unwrap();
    let out = Realizer::new(&grammar).with_edge_budget(Some(1)).realize(&lf("john(x) sleep(e,x)")).unwrap();

    assert_eq!(out.metrics().created, 1);
    assert_eq!(out.metrics().dominated, 1);
    assert!(!out.is_partial());
    assert_eq!(out.status(), RealizationStatus::COMPLETE);
    assert_eq!(out.best_edge().unwrap().surface(), "Zzz");
}

#[test]
fn generous_budgets_change_nothing() {
    let grammar = sleeper();
    let input = lf("sleep(e,x) john(x) soundly(e)");
    let unbounded = Realizer::new(&grammar).realize(&input).unwrap();
    let bounded = Realizer::new(&grammar)
        .with_edge_budget(Some(1_000))
        .with_time_budget(Some(Duration::from_secs(60)))
        .realize(&input)
        .unwrap();

    assert!(!bounded.is_partial());
    assert_eq!(bounded.best_edge(), unbounded.best_edge());
    assert_eq!(bounded.metrics().created, unbounded.metrics().created);
}

#[test]
fn repeated_runs_are_identical() {
    let grammar = lexicon![
        "see" => "s\\np/np" : "sees",
        "see" => "s\\np/np" : "spots",
        "dog" + "def" => "np" : "the dog",
        "cat" + "def" => "np" : "the cat",
        "quickly" => "(s\\np)\\(s\\np)" : "quickly",
    ]
    .unwrap();
    let input = lf("see(e,x,y) def(x) dog(x) def(y) cat(y) quickly(e)");

    let first = Realizer::new(&grammar).realize(&input).unwrap();
    for _ in 0..5 {
        let again = Realizer::new(&grammar).realize(&input).unwrap();
        assert_eq!(again.best_edge(), first.best_edge());
        assert_eq!(again.best_joined_edge(), first.best_joined_edge());
        assert_eq!(again.chart().arena_len(), first.chart().arena_len());
        let a: Vec<String> = again.complete_edges(true).iter().map(|e| e.surface()).collect();
        let b: Vec<String> = first.complete_edges(true).iter().map(|e| e.surface()).collect();
        assert_eq!(a, b);
    }
}
