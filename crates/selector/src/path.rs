//! Element-path queries: the structural form a selector is translated into.
//!
//! An [`ElementPath`] is a union of location paths. Each path starts at the
//! document's root element on the `descendant-or-self` axis and walks one
//! [`Step`] per compound selector. `Display` renders the equivalent XPath 1.0
//! expression.

use std::fmt;

/// A union of alternative location paths (`a | b`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
    pub alternatives: Vec<LocationPath>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationPath {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    pub test: NameTest,
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    DescendantOrSelf,
    Descendant,
    Child,
    FollowingSibling,
    /// The first following element sibling only.
    NextSibling,
}

/// A test on the raw element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    /// `*`
    Any,
    /// An exact name, possibly prefixed (`fo:block`).
    Name(String),
    /// Any name with the given prefix (`fo:*`).
    Prefix(String),
}

impl NameTest {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Name(n) => n == name,
            NameTest::Prefix(p) => name
                .strip_prefix(p.as_str())
                .is_some_and(|rest| rest.starts_with(':')),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    HasAttribute(String),
    AttributeEquals { name: String, value: String },
    /// Whitespace-separated word match.
    AttributeIncludes { name: String, value: String },
    /// Exactly `value` or starting with `value-`.
    AttributeDashMatch { name: String, value: String },
    AttributeStartsWith { name: String, value: String },
    AttributeEndsWith { name: String, value: String },
    AttributeContains { name: String, value: String },
    /// The element's one-based position among its element siblings is `a*n+b`.
    /// With `of_type`, only siblings of that name are counted.
    Position {
        a: i32,
        b: i32,
        from_end: bool,
        of_type: Option<String>,
    },
    IsRoot,
    IsEmpty,
    TextContains(String),
    Not {
        test: NameTest,
        predicates: Vec<Predicate>,
    },
    Never,
}

// --- XPath rendering ---

fn literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

impl fmt::Display for NameTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameTest::Any => f.write_str("*"),
            NameTest::Name(n) => f.write_str(n),
            NameTest::Prefix(p) => write!(f, "{}:*", p),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::HasAttribute(n) => write!(f, "@{}", n),
            Predicate::AttributeEquals { name, value } => {
                write!(f, "@{} = {}", name, literal(value))
            }
            Predicate::AttributeIncludes { name, value } => write!(
                f,
                "@{n} and contains(concat(' ', normalize-space(@{n}), ' '), {v})",
                n = name,
                v = literal(&format!(" {} ", value))
            ),
            Predicate::AttributeDashMatch { name, value } => write!(
                f,
                "@{n} and (@{n} = {v} or starts-with(@{n}, {d}))",
                n = name,
                v = literal(value),
                d = literal(&format!("{}-", value))
            ),
            Predicate::AttributeStartsWith { name, value } => {
                write!(f, "@{n} and starts-with(@{n}, {v})", n = name, v = literal(value))
            }
            Predicate::AttributeEndsWith { name, value } => write!(
                f,
                "@{n} and substring(@{n}, string-length(@{n}) - {k}) = {v}",
                n = name,
                k = value.chars().count().saturating_sub(1),
                v = literal(value)
            ),
            Predicate::AttributeContains { name, value } => {
                write!(f, "@{n} and contains(@{n}, {v})", n = name, v = literal(value))
            }
            Predicate::Position {
                a,
                b,
                from_end,
                of_type,
            } => {
                let axis = if *from_end {
                    "following-sibling"
                } else {
                    "preceding-sibling"
                };
                let siblings = of_type.as_deref().unwrap_or("*");
                let position = format!("count({}::{}) + 1", axis, siblings);
                if *a == 0 {
                    write!(f, "{} = {}", position, b)
                } else {
                    write!(
                        f,
                        "({p} - {b}) mod {a} = 0 and ({p} - {b}) div {a} >= 0",
                        p = position,
                        a = a,
                        b = b
                    )
                }
            }
            Predicate::IsRoot => f.write_str("not(parent::*)"),
            Predicate::IsEmpty => f.write_str("not(*) and not(string-length())"),
            Predicate::TextContains(text) => write!(f, "contains(string(.), {})", literal(text)),
            Predicate::Not { test, predicates } => {
                write!(f, "not(self::{}", test)?;
                for p in predicates {
                    write!(f, "[{}]", p)?;
                }
                f.write_str(")")
            }
            Predicate::Never => f.write_str("0"),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.axis {
            Axis::DescendantOrSelf => write!(f, "descendant-or-self::{}", self.test)?,
            Axis::Descendant => write!(f, "descendant::{}", self.test)?,
            Axis::Child => write!(f, "{}", self.test)?,
            Axis::FollowingSibling => write!(f, "following-sibling::{}", self.test)?,
            Axis::NextSibling => {
                f.write_str("following-sibling::*[1]")?;
                if self.test != NameTest::Any {
                    write!(f, "[self::{}]", self.test)?;
                }
            }
        }
        for p in &self.predicates {
            write!(f, "[{}]", p)?;
        }
        Ok(())
    }
}

impl fmt::Display for LocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", path)?;
        }
        Ok(())
    }
}
