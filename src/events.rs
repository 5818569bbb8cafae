//! Event binding and dispatch.
//!
//! `hs-on` captures its children as a detached template and attaches a
//! [`Binding`] to a resolved trigger node.  The binding outlives the
//! directive: [`Engine::dispatch_event`] clones the template, expands the
//! clone against the global scope, and routes the result to the node named
//! by the first `target` attribute the expansion produced.

use crate::scope::Scope;
use crate::tree::NodeId;
use crate::Engine;

/// One registered `hs-on` handler.
#[derive(Debug)]
pub struct Binding {
    pub event: String,
    pub target: NodeId,
    /// Detached clones of the directive's children at bind time.
    template: Vec<NodeId>,
}

impl Engine {
    pub(crate) fn handle_on(&mut self, node: NodeId) {
        let event = self.doc.attr(node, "event").unwrap_or_default().to_owned();
        let selector = self.doc.attr(node, "target").map(str::to_owned);
        match self.resolve_target(selector.as_deref()) {
            Some(target) => {
                let kids = self.doc.children(node).to_vec();
                let template = kids
                    .into_iter()
                    .map(|c| self.doc.clone_subtree(c))
                    .collect();
                self.bindings.push(Binding {
                    event,
                    target,
                    template,
                });
            }
            None => self.warn_missing_target("hs-on", &selector),
        }
        self.doc.remove(node);
    }

    /// Number of live event bindings.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Fire `event` on `target`, running every matching binding to
    /// completion in registration order.
    pub fn dispatch_event(&mut self, target: NodeId, event: &str) {
        let matched: Vec<Vec<NodeId>> = self
            .bindings
            .iter()
            .filter(|b| b.target == target && b.event == event)
            .map(|b| b.template.clone())
            .collect();
        for template in matched {
            self.run_binding(&template);
        }
    }

    fn run_binding(&mut self, template: &[NodeId]) {
        let scratch = self.doc.create_element("#scratch");
        for &t in template {
            let copy = self.doc.clone_subtree(t);
            self.doc.append_child(scratch, copy);
        }
        let mut scope = Scope::global();
        self.process_children(scratch, &mut scope);

        // The expansion names its own destination: the first node carrying a
        // `target` attribute has its children moved into the node that
        // attribute selects.  No such node, or an unresolvable selector,
        // means the handler ran for its side effects only.
        let Some(output) = self.doc.query_selector(scratch, "[target]") else {
            return;
        };
        let Some(selector) = self.doc.attr(output, "target").map(str::to_owned) else {
            return;
        };
        let Some(dest) = self.doc.query_selector(self.doc.root(), &selector) else {
            return;
        };
        for old in self.doc.children(dest).to_vec() {
            self.doc.remove(old);
        }
        for child in self.doc.children(output).to_vec() {
            self.doc.append_child(dest, child);
        }
    }
}
