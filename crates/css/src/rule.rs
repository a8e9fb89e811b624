//! Parsed stylesheet rules.

use indexmap::IndexMap;
use std::fmt;

/// A top-level rule that matters to the cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssRule {
    /// `@import "<href>" <media>;`
    Import(ImportRule),
    /// `<selector> { <declarations> }`
    Style(StyleRule),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRule {
    pub href: String,
    /// Media queries listed after the href. Recorded, never used for filtering.
    pub media: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// Selector text exactly as written, trimmed.
    pub selector: String,
    pub declarations: Declarations,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Declaration {
    value: String,
    important: bool,
}

/// The effective property values of one declaration block, in the order the
/// properties first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    entries: IndexMap<String, Declaration>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a declaration. A later value replaces an earlier one unless
    /// the earlier one is `!important` and the later one is not.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>, important: bool) {
        let name = name.into();
        if let Some(existing) = self.entries.get(&name) {
            if existing.important && !important {
                return;
            }
        }
        self.entries.insert(
            name,
            Declaration {
                value: value.into(),
                important,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|d| d.value.as_str())
    }

    pub fn is_important(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|d| d.important)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, d)| (name.as_str(), d.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Declarations {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut declarations = Declarations::new();
        for (name, value) in iter {
            declarations.push(name, value, false);
        }
        declarations
    }
}

impl fmt::Display for Declarations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, d) in &self.entries {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", name, d.value)?;
            if d.important {
                f.write_str(" !important")?;
            }
        }
        Ok(())
    }
}
