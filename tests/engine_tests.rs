/// End-to-end engine tests: build a document through the `Document` API, run
/// the engine, and assert on the expanded tree, the global store, and the
/// diagnostic sinks.
///
/// Directive elements that are consumed (`hs-var`, `hs-set`, loops, …) must
/// leave no trace in the output tree; observer elements (`hs-print`,
/// `hs-show`, `hs-hide`) stay and re-render on store writes.

use hscript::{Document, Engine, NodeId, Value, FOR_ITERATION_CAP, WHILE_PASS_CAP};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn el(doc: &mut Document, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let node = doc.create_element(tag);
    for (name, value) in attrs {
        doc.set_attr(node, name, value);
    }
    doc.append_child(parent, node);
    node
}

fn text(doc: &mut Document, parent: NodeId, content: &str) -> NodeId {
    let node = doc.create_text(content);
    doc.append_child(parent, node);
    node
}

fn run(doc: Document) -> Engine {
    let mut engine = Engine::new(doc);
    engine.seed_rng(42);
    engine.run();
    engine
}

fn find(engine: &Engine, selector: &str) -> NodeId {
    engine
        .doc
        .query_selector(engine.doc.root(), selector)
        .unwrap_or_else(|| panic!("no node matches {selector:?}"))
}

fn count(engine: &Engine, selector: &str) -> usize {
    engine
        .doc
        .query_selector_all(engine.doc.root(), selector)
        .len()
}

// ── Data directives ───────────────────────────────────────────────────────────

#[test]
fn var_declares_and_print_renders() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-var", &[("name", "x"), ("value", "5")]);
    el(&mut doc, root, "hs-print", &[("value", "x")]);

    let engine = run(doc);
    assert_eq!(engine.global("x"), Some(&Value::Int(5)));
    assert_eq!(count(&engine, "hs-var"), 0, "hs-var must be consumed");
    assert_eq!(engine.doc.text_content(find(&engine, "hs-print")), "5");
    assert!(engine.warnings.is_empty(), "{:?}", engine.warnings);
}

#[test]
fn var_coerces_attribute_text() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-var", &[("name", "n"), ("value", "2.5")]);
    el(&mut doc, root, "hs-var", &[("name", "s"), ("value", "hello")]);

    let engine = run(doc);
    assert_eq!(engine.global("n"), Some(&Value::Float(2.5)));
    assert_eq!(engine.global("s"), Some(&Value::Str("hello".into())));
}

#[test]
fn print_renders_zero_not_empty() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-var", &[("name", "x"), ("value", "0")]);
    el(&mut doc, root, "hs-print", &[("value", "x")]);

    let engine = run(doc);
    assert_eq!(engine.doc.text_content(find(&engine, "hs-print")), "0");
}

#[test]
fn failed_evaluation_prints_empty_and_warns() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-print", &[("value", "1/0")]);

    let engine = run(doc);
    assert_eq!(engine.doc.text_content(find(&engine, "hs-print")), "");
    assert_eq!(engine.warnings.len(), 1);
}

#[test]
fn set_and_math_evaluate_expressions() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-var", &[("name", "a"), ("value", "10")]);
    el(&mut doc, root, "hs-set", &[("name", "b"), ("value", "a + 1")]);
    el(&mut doc, root, "hs-math", &[("result", "c"), ("expr", "b * 2")]);

    let engine = run(doc);
    assert_eq!(engine.global("b"), Some(&Value::Int(11)));
    assert_eq!(engine.global("c"), Some(&Value::Int(22)));
    assert_eq!(count(&engine, "hs-set") + count(&engine, "hs-math"), 0);
}

#[test]
fn division_result_keeps_fraction() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-set", &[("name", "avg"), ("value", "10 / 3")]);
    el(&mut doc, root, "hs-set", &[("name", "half"), ("value", "10 / 2")]);

    let engine = run(doc);
    assert_eq!(engine.global("avg"), Some(&Value::Float(10.0 / 3.0)));
    assert_eq!(engine.global("half"), Some(&Value::Int(5)));
}

#[test]
fn math_division_by_zero_stores_undefined() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-math", &[("result", "q"), ("expr", "1 % 0")]);

    let engine = run(doc);
    assert_eq!(engine.global("q"), Some(&Value::Undefined));
    assert_eq!(engine.warnings.len(), 1);
}

#[test]
fn random_stays_in_range() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-random", &[("name", "r"), ("min", "1"), ("max", "6")]);

    let engine = run(doc);
    match engine.global("r") {
        Some(Value::Int(r)) => assert!((1..=6).contains(r), "out of range: {r}"),
        other => panic!("expected Int, got {other:?}"),
    }
}

// ── Scoping ───────────────────────────────────────────────────────────────────

#[test]
fn group_scope_does_not_leak() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let group = el(&mut doc, root, "hs-group", &[]);
    el(&mut doc, group, "hs-var", &[("name", "t"), ("value", "9")]);
    el(&mut doc, group, "hs-print", &[("value", "t")]);

    let engine = run(doc);
    assert_eq!(engine.global("t"), None, "group variable leaked");
    assert_eq!(engine.doc.text_content(find(&engine, "hs-print")), "9");
    assert_eq!(count(&engine, "hs-group"), 0, "hs-group must unwrap");
}

#[test]
fn group_reads_globals_but_shadows_writes() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-var", &[("name", "x"), ("value", "1")]);
    let group = el(&mut doc, root, "hs-group", &[]);
    el(&mut doc, group, "hs-set", &[("name", "x"), ("value", "x + 10")]);
    el(&mut doc, group, "hs-print", &[("value", "x")]);

    let engine = run(doc);
    assert_eq!(engine.doc.text_content(find(&engine, "hs-print")), "11");
    assert_eq!(engine.global("x"), Some(&Value::Int(1)), "global overwritten");
}

// ── Conditionals ──────────────────────────────────────────────────────────────

#[test]
fn if_true_keeps_main_branch() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let cond = el(&mut doc, root, "hs-if", &[("condition", "2 > 1")]);
    el(&mut doc, cond, "yes", &[]);
    let else_node = el(&mut doc, cond, "hs-else", &[]);
    el(&mut doc, else_node, "no", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "yes"), 1);
    assert_eq!(count(&engine, "no"), 0);
    assert_eq!(count(&engine, "hs-if") + count(&engine, "hs-else"), 0);
}

#[test]
fn if_false_takes_else_branch() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let cond = el(&mut doc, root, "hs-if", &[("condition", "0")]);
    el(&mut doc, cond, "yes", &[]);
    let else_node = el(&mut doc, cond, "hs-else", &[]);
    el(&mut doc, else_node, "no", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "yes"), 0);
    assert_eq!(count(&engine, "no"), 1);
}

#[test]
fn if_false_without_else_expands_to_nothing() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let cond = el(&mut doc, root, "hs-if", &[("condition", "false")]);
    el(&mut doc, cond, "yes", &[]);

    let engine = run(doc);
    assert!(engine.doc.children(engine.doc.root()).is_empty());
}

#[test]
fn else_nested_in_plain_element_is_found() {
    // hs-else wrapped in a plain element still splits the branches.
    let build = |condition: &str| {
        let mut doc = Document::new("body");
        let root = doc.root();
        let cond = el(&mut doc, root, "hs-if", &[("condition", condition)]);
        let wrapper = el(&mut doc, cond, "div", &[]);
        el(&mut doc, wrapper, "yes", &[]);
        let else_node = el(&mut doc, wrapper, "hs-else", &[]);
        el(&mut doc, else_node, "no", &[]);
        doc
    };

    let taken = run(build("1"));
    assert_eq!(count(&taken, "yes"), 1);
    assert_eq!(count(&taken, "no") + count(&taken, "hs-else"), 0);

    let skipped = run(build("0"));
    assert_eq!(count(&skipped, "no"), 1);
    assert_eq!(count(&skipped, "yes"), 0);
}

#[test]
fn string_zero_is_truthy() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let cond = el(&mut doc, root, "hs-if", &[("condition", "'0'")]);
    el(&mut doc, cond, "yes", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "yes"), 1);
}

#[test]
fn switch_picks_first_strict_match() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-var", &[("name", "hp"), ("value", "2")]);
    let switch = el(&mut doc, root, "hs-switch", &[("expr", "hp")]);
    let one = el(&mut doc, switch, "hs-case", &[("value", "1")]);
    el(&mut doc, one, "low", &[]);
    let two = el(&mut doc, switch, "hs-case", &[("value", "2")]);
    el(&mut doc, two, "mid", &[]);
    let dflt = el(&mut doc, switch, "hs-case", &[("default", "")]);
    el(&mut doc, dflt, "other", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "mid"), 1);
    assert_eq!(count(&engine, "low") + count(&engine, "other"), 0);
    assert_eq!(count(&engine, "hs-switch") + count(&engine, "hs-case"), 0);
}

#[test]
fn switch_falls_back_to_default() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let switch = el(&mut doc, root, "hs-switch", &[("expr", "3")]);
    let one = el(&mut doc, switch, "hs-case", &[("value", "1")]);
    el(&mut doc, one, "low", &[]);
    let two = el(&mut doc, switch, "hs-case", &[("value", "2")]);
    el(&mut doc, two, "mid", &[]);
    let dflt = el(&mut doc, switch, "hs-case", &[("default", "")]);
    el(&mut doc, dflt, "other", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "other"), 1);
}

#[test]
fn switch_strict_match_rejects_string_number() {
    // 2 === "2" is false, so only the default can fire.
    let mut doc = Document::new("body");
    let root = doc.root();
    let switch = el(&mut doc, root, "hs-switch", &[("expr", "2")]);
    let two = el(&mut doc, switch, "hs-case", &[("value", "'2'")]);
    el(&mut doc, two, "textual", &[]);
    let dflt = el(&mut doc, switch, "hs-case", &[("default", "")]);
    el(&mut doc, dflt, "other", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "textual"), 0);
    assert_eq!(count(&engine, "other"), 1);
}

#[test]
fn switch_case_can_reference_val() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let switch = el(&mut doc, root, "hs-switch", &[("expr", "7")]);
    let case = el(&mut doc, switch, "hs-case", &[("value", "val")]);
    el(&mut doc, case, "echoed", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "echoed"), 1);
}

// ── Loops ─────────────────────────────────────────────────────────────────────

#[test]
fn for_stamps_body_per_iteration() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let group = el(&mut doc, root, "hs-group", &[]);
    let f = el(
        &mut doc,
        group,
        "hs-for",
        &[("loop", "let i = 0; i < 4; i++"), ("var", "i")],
    );
    el(&mut doc, f, "hs-print", &[("value", "i")]);

    let engine = run(doc);
    let prints = engine.doc.query_selector_all(engine.doc.root(), "hs-print");
    let texts: Vec<String> = prints.iter().map(|&p| engine.doc.text_content(p)).collect();
    assert_eq!(texts, vec!["0", "1", "2", "3"]);
    assert_eq!(count(&engine, "hs-for"), 0);
    assert_eq!(engine.global("i"), None, "loop variable leaked");
    assert!(engine.warnings.is_empty(), "{:?}", engine.warnings);
}

#[test]
fn for_without_var_attr_falls_back_and_warns() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let group = el(&mut doc, root, "hs-group", &[]);
    let f = el(&mut doc, group, "hs-for", &[("loop", "let k = 1; k <= 2; k++")]);
    el(&mut doc, f, "hs-print", &[("value", "k")]);

    let engine = run(doc);
    let prints = engine.doc.query_selector_all(engine.doc.root(), "hs-print");
    let texts: Vec<String> = prints.iter().map(|&p| engine.doc.text_content(p)).collect();
    assert_eq!(texts, vec!["1", "2"]);
    assert!(
        engine.warnings.iter().any(|w| w.contains("deprecated")),
        "{:?}",
        engine.warnings
    );
}

#[test]
fn for_var_attribute_renames_header_counter() {
    // The header counter supplies the values even when `var` names the
    // binding something else.
    let mut doc = Document::new("body");
    let root = doc.root();
    let group = el(&mut doc, root, "hs-group", &[]);
    let f = el(
        &mut doc,
        group,
        "hs-for",
        &[("loop", "let i = 0; i < 3; i++"), ("var", "x")],
    );
    el(&mut doc, f, "hs-print", &[("value", "x")]);

    let engine = run(doc);
    let prints = engine.doc.query_selector_all(engine.doc.root(), "hs-print");
    let texts: Vec<String> = prints.iter().map(|&p| engine.doc.text_content(p)).collect();
    assert_eq!(texts, vec!["0", "1", "2"]);
    assert!(engine.warnings.is_empty(), "{:?}", engine.warnings);
}

#[test]
fn for_ending_exactly_at_cap_is_not_truncated() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let header = format!("let i = 0; i < {FOR_ITERATION_CAP}; i++");
    let f = el(&mut doc, root, "hs-for", &[("loop", &header), ("var", "i")]);
    el(&mut doc, f, "item", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "item"), FOR_ITERATION_CAP);
    assert!(engine.warnings.is_empty(), "{:?}", engine.warnings);
}

#[test]
fn for_header_scope_is_isolated_from_store() {
    // `limit` exists globally but the header cannot see it: the loop reads
    // it as 0 and runs zero times.
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-var", &[("name", "limit"), ("value", "3")]);
    let f = el(
        &mut doc,
        root,
        "hs-for",
        &[("loop", "let i = 0; i < limit; i++"), ("var", "i")],
    );
    el(&mut doc, f, "item", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "item"), 0);
}

#[test]
fn for_malformed_header_warns_and_expands_nothing() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let f = el(&mut doc, root, "hs-for", &[("loop", "i < 10"), ("var", "i")]);
    el(&mut doc, f, "item", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "item"), 0);
    assert_eq!(count(&engine, "hs-for"), 0);
    assert_eq!(engine.warnings.len(), 1);
}

#[test]
fn for_truncates_at_iteration_cap() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let f = el(
        &mut doc,
        root,
        "hs-for",
        &[("loop", "let i = 0; ; i++"), ("var", "i")],
    );
    el(&mut doc, f, "item", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "item"), FOR_ITERATION_CAP);
    assert!(
        engine.warnings.iter().any(|w| w.contains("truncated")),
        "{:?}",
        engine.warnings
    );
}

#[test]
fn repeat_binds_one_based_counter() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let group = el(&mut doc, root, "hs-group", &[]);
    let rep = el(&mut doc, group, "hs-repeat", &[("times", "3"), ("var", "k")]);
    el(&mut doc, rep, "hs-print", &[("value", "k")]);

    let engine = run(doc);
    let prints = engine.doc.query_selector_all(engine.doc.root(), "hs-print");
    let texts: Vec<String> = prints.iter().map(|&p| engine.doc.text_content(p)).collect();
    assert_eq!(texts, vec!["1", "2", "3"]);
}

#[test]
fn repeat_non_numeric_times_runs_zero() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let rep = el(&mut doc, root, "hs-repeat", &[("times", "'lots'")]);
    el(&mut doc, rep, "item", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "item"), 0);
}

#[test]
fn while_false_condition_expands_nothing() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let w = el(&mut doc, root, "hs-while", &[("condition", "0")]);
    el(&mut doc, w, "item", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "item"), 0);
    assert_eq!(count(&engine, "hs-while"), 0);
}

#[test]
fn while_reacts_to_body_writes() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-var", &[("name", "n"), ("value", "3")]);
    let w = el(&mut doc, root, "hs-while", &[("condition", "n > 0")]);
    el(&mut doc, w, "item", &[]);
    el(&mut doc, w, "hs-math", &[("result", "n"), ("expr", "n - 1")]);

    let engine = run(doc);
    assert_eq!(count(&engine, "item"), 3);
    assert_eq!(engine.global("n"), Some(&Value::Int(0)));
}

#[test]
fn while_truncates_at_pass_cap() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let w = el(&mut doc, root, "hs-while", &[("condition", "1")]);
    el(&mut doc, w, "item", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "item"), WHILE_PASS_CAP);
    assert!(
        engine.warnings.iter().any(|w| w.contains("truncated")),
        "{:?}",
        engine.warnings
    );
}

// ── Reactive store ────────────────────────────────────────────────────────────

#[test]
fn store_write_re_renders_print() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-print", &[("value", "score")]);

    let mut engine = run(doc);
    let print = find(&engine, "hs-print");
    assert_eq!(engine.doc.text_content(print), "0");

    engine.set_global("score", Value::Int(7));
    assert_eq!(engine.doc.text_content(print), "7");
}

#[test]
fn store_write_recomputes_visibility() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let shown = el(&mut doc, root, "hs-show", &[("condition", "score > 5")]);
    text(&mut doc, shown, "high score");
    let hidden = el(&mut doc, root, "hs-hide", &[("condition", "score > 5")]);
    text(&mut doc, hidden, "keep trying");

    let mut engine = run(doc);
    let shown = find(&engine, "hs-show");
    let hidden = find(&engine, "hs-hide");
    assert!(engine.doc.hidden(shown));
    assert!(!engine.doc.hidden(hidden));
    assert!(!engine.doc.has_attr(shown, "condition"), "condition must be stripped");

    engine.set_global("score", Value::Int(9));
    assert!(!engine.doc.hidden(shown));
    assert!(engine.doc.hidden(hidden));
}

#[test]
fn non_reactive_mode_renders_once() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-print", &[("value", "score")]);

    let mut engine = Engine::new(doc);
    engine.set_reactive(false);
    engine.run();
    let print = find(&engine, "hs-print");
    assert_eq!(engine.doc.text_content(print), "0");

    engine.set_global("score", Value::Int(7));
    assert_eq!(engine.doc.text_content(print), "0", "must not re-render");
}

#[test]
fn detached_observer_is_pruned_not_rendered() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-print", &[("value", "score")]);

    let mut engine = run(doc);
    let print = find(&engine, "hs-print");
    engine.doc.remove(print);
    engine.set_global("score", Value::Int(7));
    assert_eq!(engine.doc.text_content(print), "0", "detached node re-rendered");
}

// ── Host-tree mutation ────────────────────────────────────────────────────────

#[test]
fn addclass_and_removeclass_hit_target() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let box_node = el(&mut doc, root, "div", &[("id", "box")]);
    doc.add_class(box_node, "old");
    el(&mut doc, root, "hs-addclass", &[("target", "#box"), ("class", "lit")]);
    el(&mut doc, root, "hs-removeclass", &[("target", "#box"), ("class", "old")]);

    let engine = run(doc);
    let box_node = find(&engine, "#box");
    assert!(engine.doc.has_class(box_node, "lit"));
    assert!(!engine.doc.has_class(box_node, "old"));
    assert_eq!(count(&engine, "hs-addclass") + count(&engine, "hs-removeclass"), 0);
}

#[test]
fn attr_sets_evaluated_value() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "div", &[("id", "box")]);
    el(&mut doc, root, "hs-var", &[("name", "w"), ("value", "4")]);
    el(
        &mut doc,
        root,
        "hs-attr",
        &[("target", "#box"), ("name", "width"), ("value", "w * 10")],
    );

    let engine = run(doc);
    assert_eq!(engine.doc.attr(find(&engine, "#box"), "width"), Some("40"));
}

#[test]
fn attr_undefined_value_clears_attribute() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "div", &[("id", "box"), ("width", "40")]);
    el(
        &mut doc,
        root,
        "hs-attr",
        &[("target", "#box"), ("name", "width"), ("value", "undefined")],
    );

    let engine = run(doc);
    assert_eq!(engine.doc.attr(find(&engine, "#box"), "width"), None);
}

#[test]
fn missing_target_warns_and_consumes_directive() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-addclass", &[("target", "#nope"), ("class", "x")]);

    let engine = run(doc);
    assert_eq!(count(&engine, "hs-addclass"), 0);
    assert_eq!(engine.warnings.len(), 1);
}

// ── Logging ───────────────────────────────────────────────────────────────────

#[test]
fn log_directive_and_capability_share_the_sink() {
    let mut doc = Document::new("body");
    let root = doc.root();
    el(&mut doc, root, "hs-log", &[("value", "'boot'")]);
    el(&mut doc, root, "hs-math", &[("result", "z"), ("expr", "log('mid', 2), 5")]);

    let engine = run(doc);
    assert_eq!(engine.log, vec!["boot", "mid 2"]);
    assert_eq!(engine.global("z"), Some(&Value::Int(5)));
    assert_eq!(count(&engine, "hs-log"), 0);
}

// ── Event binding ─────────────────────────────────────────────────────────────

#[test]
fn on_dispatch_routes_output_to_target() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let button = el(&mut doc, root, "button", &[("id", "roll")]);
    el(&mut doc, root, "div", &[("id", "out")]);
    let on = el(&mut doc, root, "hs-on", &[("event", "click"), ("target", "#roll")]);
    let span = el(&mut doc, on, "span", &[("target", "#out")]);
    el(&mut doc, span, "hs-print", &[("value", "1 + 1")]);

    let mut engine = run(doc);
    assert_eq!(engine.binding_count(), 1);
    assert_eq!(count(&engine, "hs-on"), 0);
    let out = find(&engine, "#out");
    assert!(engine.doc.children(out).is_empty());

    engine.dispatch_event(button, "click");
    let kids = engine.doc.children(find(&engine, "#out")).to_vec();
    assert_eq!(kids.len(), 1);
    assert_eq!(engine.doc.text_content(kids[0]), "2");
}

#[test]
fn on_missing_target_registers_nothing() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let on = el(&mut doc, root, "hs-on", &[("event", "click"), ("target", "#ghost")]);
    el(&mut doc, on, "span", &[]);

    let engine = run(doc);
    assert_eq!(engine.binding_count(), 0);
    assert_eq!(count(&engine, "hs-on"), 0);
    assert_eq!(engine.warnings.len(), 1);
}

#[test]
fn dispatch_ignores_other_events_and_targets() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let button = el(&mut doc, root, "button", &[("id", "b")]);
    let other = el(&mut doc, root, "button", &[("id", "c")]);
    el(&mut doc, root, "div", &[("id", "out")]);
    let on = el(&mut doc, root, "hs-on", &[("event", "click"), ("target", "#b")]);
    let span = el(&mut doc, on, "span", &[("target", "#out")]);
    text(&mut doc, span, "fired");

    let mut engine = run(doc);
    engine.dispatch_event(button, "hover");
    engine.dispatch_event(other, "click");
    assert!(engine.doc.children(find(&engine, "#out")).is_empty());

    engine.dispatch_event(button, "click");
    assert_eq!(engine.doc.text_content(find(&engine, "#out")), "fired");
}

#[test]
fn dispatch_can_fire_repeatedly() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let button = el(&mut doc, root, "button", &[("id", "b")]);
    el(&mut doc, root, "div", &[("id", "out")]);
    let on = el(&mut doc, root, "hs-on", &[("event", "click"), ("target", "#b")]);
    el(&mut doc, on, "hs-math", &[("result", "clicks"), ("expr", "clicks + 1")]);

    let mut engine = run(doc);
    engine.dispatch_event(button, "click");
    engine.dispatch_event(button, "click");
    engine.dispatch_event(button, "click");
    assert_eq!(engine.global("clicks"), Some(&Value::Int(3)));
}

// ── Nesting ───────────────────────────────────────────────────────────────────

#[test]
fn directives_nest_inside_plain_elements() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let section = el(&mut doc, root, "section", &[]);
    let inner = el(&mut doc, section, "div", &[]);
    el(&mut doc, inner, "hs-var", &[("name", "deep"), ("value", "1")]);

    let engine = run(doc);
    assert_eq!(engine.global("deep"), Some(&Value::Int(1)));
    assert_eq!(count(&engine, "hs-var"), 0);
}

#[test]
fn loops_nest_inside_loops() {
    let mut doc = Document::new("body");
    let root = doc.root();
    let group = el(&mut doc, root, "hs-group", &[]);
    let outer = el(&mut doc, group, "hs-repeat", &[("times", "2"), ("var", "a")]);
    let inner = el(&mut doc, outer, "hs-repeat", &[("times", "3"), ("var", "b")]);
    el(&mut doc, inner, "cell", &[]);

    let engine = run(doc);
    assert_eq!(count(&engine, "cell"), 6);
}
