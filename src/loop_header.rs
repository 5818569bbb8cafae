//! `hs-for` loop-header parsing.
//!
//! The `loop` attribute carries a C-style header, e.g. `let i=0;i<5;i++`.
//! It is split structurally into init / condition / step clauses; each
//! clause is an ordinary expression (a leading `let` / `var` keyword on the
//! init clause is stripped).  The loop variable is the identifier on the
//! left of the first `=` in the init clause — used only when the directive
//! gives no explicit `var` attribute.

use std::sync::OnceLock;

use regex::Regex;

/// A parsed `init;cond;step` loop header.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopHeader {
    /// Init expression, `let`/`var` keyword removed.  Empty = no init.
    pub init: String,
    /// Condition expression.  Empty = always true (the iteration cap still
    /// bounds the loop).
    pub cond: String,
    /// Step expression.  Empty = no step.
    pub step: String,
    /// Identifier assigned in the init clause, if one could be extracted.
    pub var_hint: Option<String>,
}

fn init_var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:let\s+|var\s+)?([A-Za-z_$][A-Za-z0-9_$]*)\s*=").unwrap()
    })
}

/// Parse a loop-header string.  Fails when there are not exactly three
/// `;`-separated clauses.
pub fn parse_header(src: &str) -> Result<LoopHeader, String> {
    let parts: Vec<&str> = src.split(';').collect();
    if parts.len() != 3 {
        return Err(format!(
            "loop header needs init;cond;step, got {} clause(s): {src:?}",
            parts.len()
        ));
    }

    let var_hint = init_var_re()
        .captures(parts[0])
        .map(|c| c[1].to_owned());

    let init = strip_decl_keyword(parts[0]).trim().to_owned();
    Ok(LoopHeader {
        init,
        cond: parts[1].trim().to_owned(),
        step: parts[2].trim().to_owned(),
        var_hint,
    })
}

fn strip_decl_keyword(clause: &str) -> &str {
    let t = clause.trim_start();
    for kw in ["let", "var"] {
        if let Some(rest) = t.strip_prefix(kw) {
            // Keyword must be a whole word (`letter=1` is not a declaration).
            if rest.starts_with(|c: char| c.is_whitespace()) {
                return rest;
            }
        }
    }
    t
}

// ── Tests ─────────────────────────────────────────────────────────────────────
