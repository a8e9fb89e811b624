//! Syntax tree for CSS selectors.

use crate::path::NameTest;

/// A comma-separated group of selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

/// Compound selectors joined by combinators, e.g. `table > tr.hl td`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub head: CompoundSelector,
    pub tail: Vec<(Combinator, CompoundSelector)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// whitespace
    Descendant,
    /// `>`
    Child,
    /// `+`
    NextSibling,
    /// `~`
    SubsequentSibling,
}

/// A type test plus the conditions attached to it, e.g. `tr.hl[id]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    pub element: NameTest,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Class(String),
    Id(String),
    Attribute {
        name: String,
        matcher: Option<(AttrOperator, String)>,
    },
    Pseudo(PseudoClass),
    PseudoElement(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOperator {
    /// `=`
    Equals,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(Nth),
    NthLastChild(Nth),
    NthOfType(Nth),
    NthLastOfType(Nth),
    Not(Box<CompoundSelector>),
    Contains(String),
    /// User-interaction states that a static document never is in.
    Dynamic(String),
    Unknown(String),
}

/// The `an+b` argument of the `:nth-*` pseudo-classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    pub a: i32,
    pub b: i32,
}

impl Nth {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parses `odd`, `even`, `3`, `2n+1`, `-n + 3` and similar.
    pub fn parse(text: &str) -> Option<Nth> {
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "odd" => return Some(Nth::new(2, 1)),
            "even" => return Some(Nth::new(2, 0)),
            "" => return None,
            _ => {}
        }
        match compact.split_once('n') {
            Some((a, b)) => {
                let a = match a {
                    "" | "+" => 1,
                    "-" => -1,
                    other => other.parse().ok()?,
                };
                let b = match b {
                    "" => 0,
                    other if other.starts_with(['+', '-']) => other.parse().ok()?,
                    _ => return None,
                };
                Some(Nth::new(a, b))
            }
            None => compact.parse().ok().map(|b| Nth::new(0, b)),
        }
    }

    /// Whether a one-based position is `a*n + b` for some `n >= 0`.
    pub fn matches(&self, position: i32) -> bool {
        let (a, diff) = (i64::from(self.a), i64::from(position) - i64::from(self.b));
        if a == 0 {
            diff == 0
        } else {
            diff % a == 0 && diff / a >= 0
        }
    }
}
