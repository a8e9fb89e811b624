//! Translation of parsed selectors into [`ElementPath`] queries.

use crate::ast::*;
use crate::error::SelectorError;
use crate::parser::parse_selector;
use crate::path::{Axis, ElementPath, LocationPath, NameTest, Predicate, Step};

/// Parses a selector group and translates it into an element path.
pub fn translate(selector: &str) -> Result<ElementPath, SelectorError> {
    let list = parse_selector(selector)?;
    list.to_element_path()
        .map_err(|feature| SelectorError::Unsupported {
            selector: selector.trim().to_string(),
            feature,
        })
}

impl SelectorList {
    /// On failure, returns a description of the construct that has no
    /// element-path equivalent.
    pub fn to_element_path(&self) -> Result<ElementPath, String> {
        let alternatives = self
            .0
            .iter()
            .map(ComplexSelector::to_location_path)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ElementPath { alternatives })
    }
}

impl ComplexSelector {
    fn to_location_path(&self) -> Result<LocationPath, String> {
        let mut steps = Vec::with_capacity(self.tail.len() + 1);
        steps.push(compound_step(Axis::DescendantOrSelf, &self.head)?);
        for (combinator, compound) in &self.tail {
            let axis = match combinator {
                Combinator::Descendant => Axis::Descendant,
                Combinator::Child => Axis::Child,
                Combinator::NextSibling => Axis::NextSibling,
                Combinator::SubsequentSibling => Axis::FollowingSibling,
            };
            steps.push(compound_step(axis, compound)?);
        }
        Ok(LocationPath { steps })
    }
}

fn compound_step(axis: Axis, compound: &CompoundSelector) -> Result<Step, String> {
    Ok(Step {
        axis,
        test: compound.element.clone(),
        predicates: compound_predicates(compound)?,
    })
}

fn compound_predicates(compound: &CompoundSelector) -> Result<Vec<Predicate>, String> {
    let mut predicates = Vec::with_capacity(compound.conditions.len());
    for condition in &compound.conditions {
        match condition {
            Condition::Class(class) => predicates.push(word_match("class", class)),
            Condition::Id(id) => predicates.push(Predicate::AttributeEquals {
                name: "id".to_string(),
                value: id.clone(),
            }),
            Condition::Attribute { name, matcher } => {
                predicates.push(attribute_predicate(name, matcher.as_ref()))
            }
            Condition::Pseudo(pseudo) => {
                pseudo_predicates(pseudo, &compound.element, &mut predicates)?
            }
            Condition::PseudoElement(name) => return Err(format!("pseudo-element ::{}", name)),
        }
    }
    Ok(predicates)
}

fn word_match(name: &str, value: &str) -> Predicate {
    if value.is_empty() || value.contains(char::is_whitespace) {
        return Predicate::Never;
    }
    Predicate::AttributeIncludes {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn attribute_predicate(name: &str, matcher: Option<&(AttrOperator, String)>) -> Predicate {
    let Some((op, value)) = matcher else {
        return Predicate::HasAttribute(name.to_string());
    };
    let name = name.to_string();
    let value = value.clone();
    match op {
        AttrOperator::Equals => Predicate::AttributeEquals { name, value },
        AttrOperator::Includes => word_match(&name, &value),
        AttrOperator::DashMatch => Predicate::AttributeDashMatch { name, value },
        // An empty prefix, suffix or substring matches nothing.
        _ if value.is_empty() => Predicate::Never,
        AttrOperator::Prefix => Predicate::AttributeStartsWith { name, value },
        AttrOperator::Suffix => Predicate::AttributeEndsWith { name, value },
        AttrOperator::Substring => Predicate::AttributeContains { name, value },
    }
}

fn position(nth: Nth, from_end: bool, of_type: Option<String>) -> Predicate {
    Predicate::Position {
        a: nth.a,
        b: nth.b,
        from_end,
        of_type,
    }
}

/// Counting siblings of the same type needs a concrete element name.
fn type_name(element: &NameTest, pseudo: &str) -> Result<String, String> {
    match element {
        NameTest::Name(name) => Ok(name.clone()),
        other => Err(format!("{}:{}", other, pseudo)),
    }
}

fn pseudo_predicates(
    pseudo: &PseudoClass,
    element: &NameTest,
    out: &mut Vec<Predicate>,
) -> Result<(), String> {
    let first = Nth::new(0, 1);
    match pseudo {
        PseudoClass::Root => out.push(Predicate::IsRoot),
        PseudoClass::Empty => out.push(Predicate::IsEmpty),
        PseudoClass::FirstChild => out.push(position(first, false, None)),
        PseudoClass::LastChild => out.push(position(first, true, None)),
        PseudoClass::OnlyChild => {
            out.push(position(first, false, None));
            out.push(position(first, true, None));
        }
        PseudoClass::FirstOfType => {
            let name = type_name(element, "first-of-type")?;
            out.push(position(first, false, Some(name)));
        }
        PseudoClass::LastOfType => {
            let name = type_name(element, "last-of-type")?;
            out.push(position(first, true, Some(name)));
        }
        PseudoClass::OnlyOfType => {
            let name = type_name(element, "only-of-type")?;
            out.push(position(first, false, Some(name.clone())));
            out.push(position(first, true, Some(name)));
        }
        PseudoClass::NthChild(nth) => out.push(position(*nth, false, None)),
        PseudoClass::NthLastChild(nth) => out.push(position(*nth, true, None)),
        PseudoClass::NthOfType(nth) => {
            let name = type_name(element, "nth-of-type()")?;
            out.push(position(*nth, false, Some(name)));
        }
        PseudoClass::NthLastOfType(nth) => {
            let name = type_name(element, "nth-last-of-type()")?;
            out.push(position(*nth, true, Some(name)));
        }
        PseudoClass::Not(inner) => out.push(Predicate::Not {
            test: inner.element.clone(),
            predicates: compound_predicates(inner)?,
        }),
        PseudoClass::Contains(text) => out.push(Predicate::TextContains(text.clone())),
        PseudoClass::Dynamic(_) => out.push(Predicate::Never),
        PseudoClass::Unknown(name) => return Err(format!("pseudo-class :{}", name)),
    }
    Ok(())
}
