//! Reads internal general entity declarations out of a `<!DOCTYPE>`.
//!
//! Everything else in the internal subset is skipped. External and
//! parameter entities are never loaded, so references to them stay
//! undeclared.

use crate::name::{is_ncname, is_xml_char};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, tag, take_till1, take_until, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{eof, map, opt, recognize, value},
    multi::many0,
    sequence::{delimited, preceded, terminated},
};
use quick_xml::escape::{resolve_predefined_entity, unescape_with};
use std::collections::HashMap;

/// Replacement text of declared general entities, keyed by name.
pub(crate) type Entities = HashMap<String, String>;

/// Looks up a predefined entity first, then a declared one.
pub(crate) fn resolve_entity<'e>(entities: &'e Entities, name: &str) -> Option<&'e str> {
    resolve_predefined_entity(name).or_else(|| entities.get(name).map(String::as_str))
}

/// Collects the internal general entities of a doctype body such as
/// `root [ <!ENTITY x "y"> ]`.
///
/// Replacement text may refer to characters and to entities declared
/// earlier. Text containing markup is rejected.
pub(crate) fn internal_entities(doctype: &str) -> Result<Entities, String> {
    let mut entities = Entities::new();
    let Some(open) = doctype.find('[') else {
        return Ok(entities);
    };
    let close = doctype
        .rfind(']')
        .filter(|&close| close > open)
        .ok_or_else(|| "unterminated internal subset".to_string())?;

    let (_, declarations) = terminated(
        many0(preceded(multispace0, declaration)),
        (multispace0, eof),
    )
    .parse(&doctype[open + 1..close])
    .map_err(|_| "malformed internal subset".to_string())?;

    for declaration in declarations {
        let Declaration::Entity { name, text } = declaration else {
            continue;
        };
        // The first declaration of a name binds; predefined names are fixed.
        if entities.contains_key(name) || resolve_predefined_entity(name).is_some() {
            continue;
        }
        if !is_ncname(name) {
            return Err(format!("'{}' is not a valid entity name", name));
        }
        let expanded = unescape_with(text, |n| resolve_entity(&entities, n))
            .map_err(|e| format!("entity '{}': {}", name, e))?
            .into_owned();
        if expanded.contains('<') {
            return Err(format!("entity '{}' contains markup", name));
        }
        if let Some(c) = expanded.chars().find(|&c| !is_xml_char(c)) {
            return Err(format!(
                "entity '{}' contains character U+{:04X}",
                name, c as u32
            ));
        }
        log::trace!("Declared entity '{}'", name);
        entities.insert(name.to_string(), expanded);
    }
    Ok(entities)
}

#[derive(Debug, Clone, PartialEq)]
enum Declaration<'a> {
    Entity { name: &'a str, text: &'a str },
    Other,
}

fn declaration(input: &str) -> IResult<&str, Declaration<'_>> {
    alt((
        value(Declaration::Other, comment),
        value(Declaration::Other, processing_instruction),
        value(Declaration::Other, parameter_reference),
        entity_declaration,
        value(Declaration::Other, preceded(tag("<!"), markup_tail)),
    ))
    .parse(input)
}

/// `<!ENTITY name "text">`; parameter and external entities yield `Other`.
fn entity_declaration(input: &str) -> IResult<&str, Declaration<'_>> {
    let (input, _) = (tag("<!ENTITY"), multispace1).parse(input)?;
    let (input, parameter) = opt(terminated(char('%'), multispace1)).parse(input)?;
    let (input, name) = take_while1(|c: char| !c.is_whitespace() && c != '>').parse(input)?;
    let (input, _) = multispace1.parse(input)?;
    let (input, text) = opt(quoted).parse(input)?;
    let (input, _) = markup_tail(input)?;
    let declaration = match (parameter, text) {
        (None, Some(text)) => Declaration::Entity { name, text },
        _ => Declaration::Other,
    };
    Ok((input, declaration))
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_until("\""), char('"')),
        delimited(char('\''), take_until("'"), char('\'')),
    ))
    .parse(input)
}

/// The rest of a declaration up to its unquoted `>`.
fn markup_tail(input: &str) -> IResult<&str, &str> {
    recognize((many0(alt((is_not("\"'>"), map(quoted, |_| "")))), char('>'))).parse(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("<!--"), take_until("-->"), tag("-->")).parse(input)
}

fn processing_instruction(input: &str) -> IResult<&str, &str> {
    delimited(tag("<?"), take_until("?>"), tag("?>")).parse(input)
}

fn parameter_reference(input: &str) -> IResult<&str, &str> {
    delimited(char('%'), take_till1(|c: char| c == ';'), char(';')).parse(input)
}
