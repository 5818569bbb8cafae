//! Directive interpreter.
//!
//! The [`Engine`] owns the document, the reactive store, and the diagnostic
//! sinks, and executes the expansion walk: every node is visited in document
//! order, depth-first; directive nodes are dispatched through
//! [`Directive::from_tag`] and replaced or consumed in place; anything else
//! is recursed into and left alone.
//!
//! No directive failure is fatal: evaluation errors, malformed loop headers,
//! and missing selector targets are recovered locally, reported on the
//! `warnings` sink, and the walk continues with the next sibling.

use std::collections::HashMap;

use crate::builtins::{call_builtin, Lcg};
use crate::directive::Directive;
use crate::events::Binding;
use crate::expr::{eval_str, EvalContext};
use crate::loop_header::{parse_header, LoopHeader};
use crate::scope::Scope;
use crate::store::Store;
use crate::tree::{Document, NodeId};
use crate::value::{coerce_attr, Value};

/// Hard cap on collected `hs-for` iterations.
pub const FOR_ITERATION_CAP: usize = 2000;
/// Hard cap on `hs-while` passes.
pub const WHILE_PASS_CAP: usize = 1000;

// ── Observer registry ─────────────────────────────────────────────────────────

/// A processed `hs-print` / `hs-show` / `hs-hide` node, re-evaluated against
/// the global store on every store write.  The registry outlives the
/// `condition` attribute that `hs-show` / `hs-hide` strip at first expansion.
#[derive(Debug, Clone)]
struct Observer {
    node: NodeId,
    kind: Directive,
    expr: String,
}

// ── EvalCtx ───────────────────────────────────────────────────────────────────

/// Per-evaluation context: the merged scope copy plus the capability
/// whitelist.  Writes made by an expression land on `merged` and die with it;
/// only directive-level assignment reaches a live scope.
struct EvalCtx<'a> {
    merged: HashMap<String, Value>,
    rng: &'a mut Lcg,
    log: &'a mut Vec<String>,
}

impl EvalContext for EvalCtx<'_> {
    fn get_var(&self, name: &str) -> Option<Value> {
        self.merged.get(name).cloned()
    }

    fn set_var(&mut self, name: &str, value: Value) {
        self.merged.insert(name.to_owned(), value);
    }

    fn call_fn(&mut self, name: &str, args: Vec<Value>) -> Result<Value, String> {
        if name == "log" {
            let line = args
                .iter()
                .map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            self.log.push(line);
            return Ok(Value::Undefined);
        }
        call_builtin(name, args, self.rng)
            .unwrap_or_else(|| Err(format!("{name} is not a whitelisted capability")))
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// The directive engine: document + store + interpreter state.
pub struct Engine {
    pub doc: Document,
    store: Store,
    rng: Lcg,
    /// Output of `hs-log` and the `log(...)` capability.
    pub log: Vec<String>,
    /// Recovered errors: failed evaluations, malformed loop headers,
    /// truncated loops, missing selector targets.
    pub warnings: Vec<String>,
    observers: Vec<Observer>,
    pub(crate) bindings: Vec<Binding>,
    reactive: bool,
}

impl Engine {
    pub fn new(doc: Document) -> Self {
        Engine {
            doc,
            store: Store::new(),
            rng: Lcg::new(),
            log: Vec::new(),
            warnings: Vec::new(),
            observers: Vec::new(),
            bindings: Vec::new(),
            reactive: true,
        }
    }

    /// Pin the RNG sequence (`hs-random`, `random()`); used by tests.
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = Lcg::seeded(seed);
    }

    /// Toggle the reactive re-scan.  Off gives the historical one-shot
    /// behavior: observers render once during the walk and never update.
    pub fn set_reactive(&mut self, reactive: bool) {
        self.reactive = reactive;
    }

    /// Read-only view of the global store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Read a global variable.
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.store.get(name)
    }

    /// Write a global variable.  The observer re-scan completes before this
    /// returns.
    pub fn set_global(&mut self, name: impl Into<String>, value: Value) {
        self.store.set(name, value);
        if self.reactive {
            self.refresh_observers();
        }
    }

    /// Expand every directive in the document, walking from the root in the
    /// global scope.
    pub fn run(&mut self) {
        let mut scope = Scope::global();
        self.process_children(self.doc.root(), &mut scope);
    }

    /// Evaluate an expression against the global scope.
    pub fn eval(&mut self, src: &str) -> Value {
        self.evaluate(src, &Scope::global())
    }

    // ── Evaluation ────────────────────────────────────────────────────────────

    pub(crate) fn evaluate(&mut self, src: &str, scope: &Scope) -> Value {
        self.evaluate_with(src, scope, &[])
    }

    fn evaluate_with(&mut self, src: &str, scope: &Scope, extra: &[(&str, Value)]) -> Value {
        let mut merged = scope.merged(&self.store);
        for (k, v) in extra {
            merged.insert((*k).to_owned(), v.clone());
        }
        let mut ctx = EvalCtx {
            merged,
            rng: &mut self.rng,
            log: &mut self.log,
        };
        match eval_str(src, &mut ctx) {
            Ok(v) => v,
            Err(e) => {
                self.warnings.push(format!("eval error in {src:?}: {e}"));
                Value::Undefined
            }
        }
    }

    // ── Scope plumbing ────────────────────────────────────────────────────────

    /// Assign into the current scope: the local overlay when one is active,
    /// otherwise the global store (triggering the reactive re-scan).
    fn assign(&mut self, scope: &mut Scope, name: &str, value: Value) {
        if !scope.set_local(name, value.clone()) {
            self.set_global(name, value);
        }
    }

    /// Delete from the current scope (loop-variable cleanup).
    fn unassign(&mut self, scope: &mut Scope, name: &str) {
        if !scope.remove_local(name) && self.store.remove(name) && self.reactive {
            self.refresh_observers();
        }
    }

    // ── Walk ──────────────────────────────────────────────────────────────────

    pub(crate) fn process_children(&mut self, container: NodeId, scope: &mut Scope) {
        let snapshot = self.doc.children(container).to_vec();
        for child in snapshot {
            // An earlier sibling may have removed or relocated this node.
            if self.doc.parent(child) != Some(container) {
                continue;
            }
            self.process_node(child, scope);
        }
    }

    fn process_node(&mut self, node: NodeId, scope: &mut Scope) {
        if self.doc.is_text(node) {
            return;
        }
        let Some(kind) = Directive::from_tag(self.doc.tag(node)) else {
            self.process_children(node, scope);
            return;
        };

        match kind {
            Directive::Var => self.handle_var(node, scope),
            Directive::Set => self.handle_set(node, scope, "name", "value"),
            Directive::Math => self.handle_set(node, scope, "result", "expr"),
            Directive::Random => self.handle_random(node, scope),
            Directive::Group => self.handle_group(node),
            Directive::If => self.handle_if(node, scope),
            Directive::For => self.handle_for(node, scope),
            Directive::Repeat => self.handle_repeat(node, scope),
            Directive::While => self.handle_while(node, scope),
            Directive::Switch => self.handle_switch(node, scope),
            Directive::Print => self.handle_print(node, scope),
            Directive::Log => self.handle_log(node, scope),
            Directive::Show => self.handle_visibility(node, scope, Directive::Show),
            Directive::Hide => self.handle_visibility(node, scope, Directive::Hide),
            Directive::AddClass | Directive::RemoveClass => {
                self.handle_class(node, kind == Directive::AddClass)
            }
            Directive::Attr => self.handle_attr(node, scope),
            Directive::On => self.handle_on(node),
            // Markers only have meaning inside hs-if / hs-switch; a stray
            // one is treated like an unknown tag.
            Directive::Else | Directive::Case => self.process_children(node, scope),
        }
    }

    // ── Data directives ───────────────────────────────────────────────────────

    fn handle_var(&mut self, node: NodeId, scope: &mut Scope) {
        let name = self.doc.attr(node, "name").map(str::to_owned);
        let raw = self.doc.attr(node, "value").unwrap_or_default().to_owned();
        if let Some(name) = name {
            self.assign(scope, &name, coerce_attr(&raw));
        }
        self.doc.remove(node);
    }

    /// Shared body of `hs-set` (name/value) and `hs-math` (result/expr).
    fn handle_set(&mut self, node: NodeId, scope: &mut Scope, name_attr: &str, expr_attr: &str) {
        let name = self.doc.attr(node, name_attr).map(str::to_owned);
        let expr = self.doc.attr(node, expr_attr).unwrap_or_default().to_owned();
        if let Some(name) = name {
            let value = self.evaluate(&expr, scope);
            self.assign(scope, &name, value);
        }
        self.doc.remove(node);
    }

    fn handle_random(&mut self, node: NodeId, scope: &mut Scope) {
        let name = self.doc.attr(node, "name").map(str::to_owned);
        let min = self.attr_int(node, "min");
        let max = self.attr_int(node, "max");
        if let Some(name) = name {
            let value = Value::Int(self.rng.next_range(min, max));
            self.assign(scope, &name, value);
        }
        self.doc.remove(node);
    }

    fn attr_int(&self, node: NodeId, name: &str) -> i64 {
        self.doc
            .attr(node, name)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0)
    }

    // ── Structure directives ──────────────────────────────────────────────────

    fn handle_group(&mut self, node: NodeId) {
        let mut inner = Scope::local();
        self.process_children(node, &mut inner);
        let kids = self.doc.children(node).to_vec();
        self.doc.replace_with(node, &kids);
    }

    fn handle_if(&mut self, node: NodeId, scope: &mut Scope) {
        let cond = self
            .doc
            .attr(node, "condition")
            .unwrap_or_default()
            .to_owned();
        // First hs-else in document order, at any depth.
        let else_node = self.doc.query_selector(node, Directive::Else.tag());

        let taken = self.evaluate(&cond, scope).as_bool();
        let branch: Vec<NodeId> = if taken {
            if let Some(e) = else_node {
                self.doc.remove(e);
            }
            self.doc.children(node).to_vec()
        } else {
            match else_node {
                Some(e) => self.doc.children(e).to_vec(),
                None => Vec::new(),
            }
        };

        self.expand_into_place(node, &branch, scope);
    }

    fn handle_switch(&mut self, node: NodeId, scope: &mut Scope) {
        let expr = self.doc.attr(node, "expr").unwrap_or_default().to_owned();
        let switch_val = self.evaluate(&expr, scope);

        let cases = self.doc.query_selector_all(node, Directive::Case.tag());
        let mut chosen: Option<NodeId> = None;
        let mut fallback: Option<NodeId> = None;
        for case in cases {
            if self.doc.has_attr(case, "default") {
                fallback = Some(case);
                continue;
            }
            let case_expr = self.doc.attr(case, "value").unwrap_or_default().to_owned();
            let case_val = self.evaluate_with(&case_expr, scope, &[("val", switch_val.clone())]);
            if case_val.strict_eq(&switch_val) {
                chosen = Some(case);
                break;
            }
        }

        let branch: Vec<NodeId> = match chosen.or(fallback) {
            Some(case) => self.doc.children(case).to_vec(),
            None => Vec::new(),
        };
        self.expand_into_place(node, &branch, scope);
    }

    /// Move `branch` into a scratch container, expand it under `scope`, and
    /// replace `node` with the result.
    fn expand_into_place(&mut self, node: NodeId, branch: &[NodeId], scope: &mut Scope) {
        let scratch = self.doc.create_element("#scratch");
        for &b in branch {
            self.doc.append_child(scratch, b);
        }
        self.process_children(scratch, scope);
        let out = self.doc.children(scratch).to_vec();
        self.doc.replace_with(node, &out);
    }

    // ── Loop directives ───────────────────────────────────────────────────────

    fn handle_for(&mut self, node: NodeId, scope: &mut Scope) {
        let loop_src = self.doc.attr(node, "loop").unwrap_or_default().to_owned();
        let var_attr = self.doc.attr(node, "var").map(str::to_owned);

        let header = match parse_header(&loop_src) {
            Ok(h) => h,
            Err(e) => {
                self.warnings.push(format!("hs-for: {e}"));
                self.doc.remove(node);
                return;
            }
        };

        // The header's own counter supplies each iteration's value; the
        // `var` attribute only renames the binding the body sees.
        let bind_var = match (&var_attr, &header.var_hint) {
            (Some(v), _) => Some(v.clone()),
            (None, Some(hint)) => {
                self.warnings.push(format!(
                    "hs-for: no var attribute, falling back to header variable {hint:?} (deprecated)"
                ));
                Some(hint.clone())
            }
            (None, None) => None,
        };
        let collect_var = header.var_hint.clone().or_else(|| var_attr.clone());

        let (values, truncated) = match collect_for_iterations(
            &header,
            collect_var.as_deref(),
            &mut self.rng,
            &mut self.log,
        ) {
            Ok(collected) => collected,
            Err(e) => {
                self.warnings.push(format!("hs-for: loop aborted: {e}"));
                (Vec::new(), false)
            }
        };
        if truncated {
            self.warnings
                .push(format!("hs-for: truncated at {FOR_ITERATION_CAP} iterations"));
        }

        let template = self.doc.children(node).to_vec();
        let scratch = self.doc.create_element("#scratch");
        for value in values {
            if let Some(name) = &bind_var {
                self.assign(scope, name, value);
            }
            self.expand_template_into(&template, scratch, scope);
        }
        if let Some(name) = &bind_var {
            self.unassign(scope, name);
        }
        let out = self.doc.children(scratch).to_vec();
        self.doc.replace_with(node, &out);
    }

    fn handle_repeat(&mut self, node: NodeId, scope: &mut Scope) {
        let times_expr = self.doc.attr(node, "times").unwrap_or_default().to_owned();
        let var_name = self.doc.attr(node, "var").map(str::to_owned);
        // Evaluation failure or a non-numeric result counts as zero.
        let times = self.evaluate(&times_expr, scope).as_int();

        let template = self.doc.children(node).to_vec();
        let scratch = self.doc.create_element("#scratch");
        for i in 1..=times.max(0) {
            if let Some(name) = &var_name {
                self.assign(scope, name, Value::Int(i));
            }
            self.expand_template_into(&template, scratch, scope);
        }
        if let Some(name) = &var_name {
            self.unassign(scope, name);
        }
        let out = self.doc.children(scratch).to_vec();
        self.doc.replace_with(node, &out);
    }

    fn handle_while(&mut self, node: NodeId, scope: &mut Scope) {
        let cond = self
            .doc
            .attr(node, "condition")
            .unwrap_or_default()
            .to_owned();

        let template = self.doc.children(node).to_vec();
        let scratch = self.doc.create_element("#scratch");
        let mut passes = 0usize;
        while self.evaluate(&cond, scope).as_bool() {
            passes += 1;
            if passes > WHILE_PASS_CAP {
                self.warnings
                    .push(format!("hs-while: truncated after {WHILE_PASS_CAP} passes"));
                break;
            }
            self.expand_template_into(&template, scratch, scope);
        }
        let out = self.doc.children(scratch).to_vec();
        self.doc.replace_with(node, &out);
    }

    /// Clone the template nodes, expand the clones under `scope`, and append
    /// the results to `dest`.  One call per loop iteration.
    fn expand_template_into(&mut self, template: &[NodeId], dest: NodeId, scope: &mut Scope) {
        let wrapper = self.doc.create_element("#scratch");
        for &t in template {
            let copy = self.doc.clone_subtree(t);
            self.doc.append_child(wrapper, copy);
        }
        self.process_children(wrapper, scope);
        for child in self.doc.children(wrapper).to_vec() {
            self.doc.append_child(dest, child);
        }
    }

    // ── Observer directives ───────────────────────────────────────────────────

    fn handle_print(&mut self, node: NodeId, scope: &mut Scope) {
        let expr = self.doc.attr(node, "value").unwrap_or_default().to_owned();
        let value = self.evaluate(&expr, scope);
        self.doc.set_text_content(node, &value.render());
        self.register_observer(node, Directive::Print, expr);
    }

    fn handle_visibility(&mut self, node: NodeId, scope: &mut Scope, kind: Directive) {
        let cond = self
            .doc
            .attr(node, "condition")
            .unwrap_or_default()
            .to_owned();
        let truthy = self.evaluate(&cond, scope).as_bool();
        let hidden = if kind == Directive::Show { !truthy } else { truthy };
        self.doc.set_hidden(node, hidden);
        self.doc.remove_attr(node, "condition");
        self.register_observer(node, kind, cond);
        self.process_children(node, scope);
    }

    fn handle_log(&mut self, node: NodeId, scope: &mut Scope) {
        let expr = self.doc.attr(node, "value").unwrap_or_default().to_owned();
        let value = self.evaluate(&expr, scope);
        self.log.push(value.as_str());
        self.doc.remove(node);
    }

    fn register_observer(&mut self, node: NodeId, kind: Directive, expr: String) {
        match self.observers.iter_mut().find(|o| o.node == node) {
            Some(existing) => {
                existing.kind = kind;
                existing.expr = expr;
            }
            None => self.observers.push(Observer { node, kind, expr }),
        }
    }

    /// Re-evaluate every live observer against the current global store.
    /// Whole-registry, no dependency tracking, no batching: cost is
    /// O(observers) per store write.
    fn refresh_observers(&mut self) {
        self.observers
            .retain(|o| self.doc.is_attached(o.node));
        let live = self.observers.clone();
        for o in live {
            match o.kind {
                Directive::Print => {
                    let value = self.evaluate(&o.expr, &Scope::global());
                    self.doc.set_text_content(o.node, &value.render());
                }
                Directive::Show => {
                    let truthy = self.evaluate(&o.expr, &Scope::global()).as_bool();
                    self.doc.set_hidden(o.node, !truthy);
                }
                Directive::Hide => {
                    let truthy = self.evaluate(&o.expr, &Scope::global()).as_bool();
                    self.doc.set_hidden(o.node, truthy);
                }
                _ => {}
            }
        }
    }

    // ── Host-tree mutation directives ─────────────────────────────────────────

    fn handle_class(&mut self, node: NodeId, add: bool) {
        let selector = self.doc.attr(node, "target").map(str::to_owned);
        let class = self.doc.attr(node, "class").map(str::to_owned);
        match self.resolve_target(selector.as_deref()) {
            Some(target) => {
                if let Some(class) = class {
                    if add {
                        self.doc.add_class(target, &class);
                    } else {
                        self.doc.remove_class(target, &class);
                    }
                }
            }
            None => self.warn_missing_target(if add { "hs-addclass" } else { "hs-removeclass" }, &selector),
        }
        self.doc.remove(node);
    }

    fn handle_attr(&mut self, node: NodeId, scope: &mut Scope) {
        let selector = self.doc.attr(node, "target").map(str::to_owned);
        let name = self.doc.attr(node, "name").map(str::to_owned);
        let expr = self.doc.attr(node, "value").unwrap_or_default().to_owned();
        match self.resolve_target(selector.as_deref()) {
            Some(target) => {
                if let Some(name) = name {
                    let value = self.evaluate(&expr, scope);
                    if value.is_undefined() {
                        self.doc.remove_attr(target, &name);
                    } else {
                        self.doc.set_attr(target, &name, &value.render());
                    }
                }
            }
            None => self.warn_missing_target("hs-attr", &selector),
        }
        self.doc.remove(node);
    }

    pub(crate) fn resolve_target(&self, selector: Option<&str>) -> Option<NodeId> {
        let sel = selector?;
        self.doc.query_selector(self.doc.root(), sel)
    }

    pub(crate) fn warn_missing_target(&mut self, directive: &str, selector: &Option<String>) {
        self.warnings.push(format!(
            "{directive}: target {:?} not found",
            selector.as_deref().unwrap_or("")
        ));
    }
}

// ── hs-for iteration collection ───────────────────────────────────────────────

/// Run the loop header in an isolated scope (no store visibility, names
/// default to zero) and collect one value per iteration: the loop variable's
/// value before the step clause runs.  Any clause failure aborts the whole
/// collection.  The flag reports whether the iteration cap cut the loop
/// short — a loop that ends naturally at exactly the cap is not truncated.
fn collect_for_iterations(
    header: &LoopHeader,
    loop_var: Option<&str>,
    rng: &mut Lcg,
    log: &mut Vec<String>,
) -> Result<(Vec<Value>, bool), String> {
    let mut ctx = EvalCtx {
        merged: HashMap::new(),
        rng,
        log,
    };
    if !header.init.is_empty() {
        eval_str(&header.init, &mut ctx)?;
    }
    let mut values = Vec::new();
    let mut truncated = false;
    loop {
        if !header.cond.is_empty() && !eval_str(&header.cond, &mut ctx)?.as_bool() {
            break;
        }
        if values.len() == FOR_ITERATION_CAP {
            truncated = true;
            break;
        }
        let value = loop_var
            .and_then(|name| ctx.merged.get(name).cloned())
            .unwrap_or(Value::Undefined);
        values.push(value);
        if !header.step.is_empty() {
            eval_str(&header.step, &mut ctx)?;
        }
    }
    Ok((values, truncated))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
