//! Declarative directive scripting over a markup tree.
//!
//! This crate implements a tree-walking engine for `hs-*` directive
//! elements embedded in a host markup tree, covering:
//!
//! - Variable declaration and assignment (`hs-var`, `hs-set`, `hs-math`,
//!   `hs-random`) into a reactive global store or a lexical `hs-group` scope
//! - Control flow: `hs-if`/`hs-else`, `hs-switch`/`hs-case`, `hs-for`,
//!   `hs-repeat`, `hs-while` — loop bodies stamped out by structural cloning
//! - Observers that re-render on every store write: `hs-print`, `hs-show`,
//!   `hs-hide`
//! - Host-tree mutation (`hs-addclass`, `hs-removeclass`, `hs-attr`) and
//!   event binding (`hs-on`, [`Engine::dispatch_event`])
//! - An embedded expression evaluator with a small whitelisted capability
//!   table (`floor`, `random`, `log`, …) and no host-language escape
//!
//! # Quick start
//!
//! ```rust
//! use hscript::{Document, Engine, Value};
//!
//! let mut doc = Document::new("body");
//! let var = doc.create_element("hs-var");
//! doc.set_attr(var, "name", "hp");
//! doc.set_attr(var, "value", "6");
//! doc.append_child(doc.root(), var);
//! let print = doc.create_element("hs-print");
//! doc.set_attr(print, "value", "hp * 7");
//! doc.append_child(doc.root(), print);
//!
//! let mut engine = Engine::new(doc);
//! engine.run();
//! assert_eq!(engine.global("hp"), Some(&Value::Int(6)));
//! let out = engine.doc.query_selector(engine.doc.root(), "hs-print").unwrap();
//! assert_eq!(engine.doc.text_content(out), "42");
//! ```

pub mod builtins;
pub mod directive;
pub mod events;
pub mod expr;
pub mod interp;
pub mod loop_header;
pub mod scope;
pub mod store;
pub mod tree;
pub mod value;

pub use directive::Directive;
pub use events::Binding;
pub use interp::{Engine, FOR_ITERATION_CAP, WHILE_PASS_CAP};
pub use scope::Scope;
pub use store::Store;
pub use tree::{Document, NodeId};
pub use value::Value;
