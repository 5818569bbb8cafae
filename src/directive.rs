//! Directive vocabulary.
//!
//! A directive is a tree node whose tag appears in the fixed dispatch table
//! below.  The interpreter replaces or consumes every directive it meets;
//! any other tag is recursed into and left in place.  `hs-else` and
//! `hs-case` are markers: they only have meaning inside `hs-if` and
//! `hs-switch` and are never dispatched on their own.

/// A directive kind, one per recognized `hs-*` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    Var,
    Set,
    Math,
    Random,
    Group,
    If,
    Else,
    For,
    Repeat,
    While,
    Switch,
    Case,
    Print,
    Log,
    Show,
    Hide,
    AddClass,
    RemoveClass,
    Attr,
    On,
}

impl Directive {
    /// Every directive kind, in dispatch-table order.
    pub const ALL: &'static [Directive] = &[
        Directive::Var,
        Directive::Set,
        Directive::Math,
        Directive::Random,
        Directive::Group,
        Directive::If,
        Directive::Else,
        Directive::For,
        Directive::Repeat,
        Directive::While,
        Directive::Switch,
        Directive::Case,
        Directive::Print,
        Directive::Log,
        Directive::Show,
        Directive::Hide,
        Directive::AddClass,
        Directive::RemoveClass,
        Directive::Attr,
        Directive::On,
    ];

    /// The wire-format tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            Directive::Var => "hs-var",
            Directive::Set => "hs-set",
            Directive::Math => "hs-math",
            Directive::Random => "hs-random",
            Directive::Group => "hs-group",
            Directive::If => "hs-if",
            Directive::Else => "hs-else",
            Directive::For => "hs-for",
            Directive::Repeat => "hs-repeat",
            Directive::While => "hs-while",
            Directive::Switch => "hs-switch",
            Directive::Case => "hs-case",
            Directive::Print => "hs-print",
            Directive::Log => "hs-log",
            Directive::Show => "hs-show",
            Directive::Hide => "hs-hide",
            Directive::AddClass => "hs-addclass",
            Directive::RemoveClass => "hs-removeclass",
            Directive::Attr => "hs-attr",
            Directive::On => "hs-on",
        }
    }

    /// Parse a node tag.  Case-insensitive, as tag names in markup are.
    pub fn from_tag(tag: &str) -> Option<Directive> {
        let lower = tag.to_ascii_lowercase();
        Directive::ALL.iter().copied().find(|d| d.tag() == lower)
    }

    /// Observer kinds stay in the tree after expansion and are re-evaluated
    /// on every global store write.
    pub fn is_observer(self) -> bool {
        matches!(self, Directive::Print | Directive::Show | Directive::Hide)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_tags() {
        for &d in Directive::ALL {
            assert_eq!(Directive::from_tag(d.tag()), Some(d));
        }
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(Directive::from_tag("HS-VAR"), Some(Directive::Var));
        assert_eq!(Directive::from_tag("Hs-Print"), Some(Directive::Print));
    }

    #[test]
    fn unknown_tags_are_none() {
        assert_eq!(Directive::from_tag("div"), None);
        assert_eq!(Directive::from_tag("hs-unknown"), None);
        assert_eq!(Directive::from_tag(""), None);
    }

    #[test]
    fn observer_kinds() {
        assert!(Directive::Print.is_observer());
        assert!(Directive::Show.is_observer());
        assert!(Directive::Hide.is_observer());
        assert!(!Directive::Set.is_observer());
        assert!(!Directive::On.is_observer());
    }
}
