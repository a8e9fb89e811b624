//! A `nom`-based parser for CSS level 3 selectors.

use crate::ast::*;
use crate::error::SelectorError;
use crate::path::NameTest;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, tag, take_while, take_while1},
    character::complete::{anychar, char, multispace0, multispace1},
    combinator::{map, not, opt, recognize, success, value},
    error::ErrorKind,
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
};

// --- Main Public Parser ---

pub fn parse_selector(input: &str) -> Result<SelectorList, SelectorError> {
    match selector_list(input.trim()) {
        Ok(("", list)) => Ok(list),
        Ok((rem, _)) => Err(SelectorError::Parse {
            selector: input.to_string(),
            message: format!("unexpected input at '{}'", rem),
        }),
        Err(e) => Err(SelectorError::Parse {
            selector: input.to_string(),
            message: e.to_string(),
        }),
    }
}

// --- Combinators & Helpers ---

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn ident(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        opt(char('-')),
        pair(take_while1(is_ident_start), take_while(is_ident_char)),
    ))
    .parse(input)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn escaped_char(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('\\'), anychar)).parse(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    alt((
        delimited(
            char('"'),
            map(recognize(many0(alt((is_not("\"\\"), escaped_char)))), unescape),
            char('"'),
        ),
        delimited(
            char('\''),
            map(recognize(many0(alt((is_not("'\\"), escaped_char)))), unescape),
            char('\''),
        ),
    ))
    .parse(input)
}

// --- Type Selectors ---

#[derive(Clone)]
enum NsPrefix<'a> {
    Any,
    Empty,
    Named(&'a str),
}

fn ns_prefix(input: &str) -> IResult<&str, NsPrefix<'_>> {
    terminated(
        alt((
            value(NsPrefix::Any, char('*')),
            map(ident, NsPrefix::Named),
            success(NsPrefix::Empty),
        )),
        pair(char('|'), not(char('='))),
    )
    .parse(input)
}

fn local_name(input: &str) -> IResult<&str, Option<&str>> {
    alt((value(None, char('*')), map(ident, Some))).parse(input)
}

/// `tr`, `*`, `fo|block` (stored as `fo:block`), `fo|*`, `*|tr`, `|tr`.
fn type_selector(input: &str) -> IResult<&str, NameTest> {
    map(pair(opt(ns_prefix), local_name), |(prefix, local)| {
        match (prefix, local) {
            (Some(NsPrefix::Named(p)), Some(l)) => NameTest::Name(format!("{}:{}", p, l)),
            (Some(NsPrefix::Named(p)), None) => NameTest::Prefix(p.to_string()),
            (_, Some(l)) => NameTest::Name(l.to_string()),
            (_, None) => NameTest::Any,
        }
    })
    .parse(input)
}

// --- Conditions ---

fn attr_operator(input: &str) -> IResult<&str, AttrOperator> {
    alt((
        value(AttrOperator::Includes, tag("~=")),
        value(AttrOperator::DashMatch, tag("|=")),
        value(AttrOperator::Prefix, tag("^=")),
        value(AttrOperator::Suffix, tag("$=")),
        value(AttrOperator::Substring, tag("*=")),
        value(AttrOperator::Equals, tag("=")),
    ))
    .parse(input)
}

fn attr_name(input: &str) -> IResult<&str, String> {
    map(
        pair(
            ident,
            opt(preceded(pair(char('|'), not(char('='))), ident)),
        ),
        |(first, local)| match local {
            Some(local) => format!("{}:{}", first, local),
            None => first.to_string(),
        },
    )
    .parse(input)
}

fn attr_value(input: &str) -> IResult<&str, String> {
    alt((
        string_literal,
        map(take_while1(is_ident_char), str::to_string),
    ))
    .parse(input)
}

fn attribute(input: &str) -> IResult<&str, Condition> {
    map(
        delimited(
            pair(char('['), multispace0),
            pair(attr_name, opt(pair(ws(attr_operator), attr_value))),
            pair(multispace0, char(']')),
        ),
        |(name, matcher)| Condition::Attribute { name, matcher },
    )
    .parse(input)
}

fn simple_pseudo(name: &str) -> Condition {
    let name = name.to_ascii_lowercase();
    let pseudo = match name.as_str() {
        "root" => PseudoClass::Root,
        "empty" => PseudoClass::Empty,
        "first-child" => PseudoClass::FirstChild,
        "last-child" => PseudoClass::LastChild,
        "only-child" => PseudoClass::OnlyChild,
        "first-of-type" => PseudoClass::FirstOfType,
        "last-of-type" => PseudoClass::LastOfType,
        "only-of-type" => PseudoClass::OnlyOfType,
        // CSS2 allowed these pseudo-elements with a single colon.
        "first-line" | "first-letter" | "before" | "after" => {
            return Condition::PseudoElement(name);
        }
        "hover" | "link" | "visited" | "active" | "focus" | "target" => {
            PseudoClass::Dynamic(name)
        }
        _ => PseudoClass::Unknown(name),
    };
    Condition::Pseudo(pseudo)
}

fn functional_pseudo(input: &str) -> IResult<&str, Condition> {
    let (input, name) = terminated(ident, char('(')).parse(input)?;
    let name = name.to_ascii_lowercase();
    let (input, pseudo) = match name.as_str() {
        "not" => map(ws(compound_selector), |c| PseudoClass::Not(Box::new(c))).parse(input)?,
        "contains" => map(
            ws(alt((string_literal, map(ident, str::to_string)))),
            PseudoClass::Contains,
        )
        .parse(input)?,
        "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
            let (rest, arg) = is_not(")").parse(input)?;
            let nth = Nth::parse(arg).ok_or_else(|| {
                nom::Err::Failure(nom::error::Error::new(arg, ErrorKind::Verify))
            })?;
            let pseudo = match name.as_str() {
                "nth-child" => PseudoClass::NthChild(nth),
                "nth-last-child" => PseudoClass::NthLastChild(nth),
                "nth-of-type" => PseudoClass::NthOfType(nth),
                _ => PseudoClass::NthLastOfType(nth),
            };
            (rest, pseudo)
        }
        _ => {
            let (rest, _) = opt(is_not(")")).parse(input)?;
            (rest, PseudoClass::Unknown(name.clone()))
        }
    };
    let (input, _) = char(')').parse(input)?;
    Ok((input, Condition::Pseudo(pseudo)))
}

fn pseudo(input: &str) -> IResult<&str, Condition> {
    alt((
        map(preceded(tag("::"), ident), |n: &str| {
            Condition::PseudoElement(n.to_ascii_lowercase())
        }),
        preceded(char(':'), alt((functional_pseudo, map(ident, simple_pseudo)))),
    ))
    .parse(input)
}

fn condition(input: &str) -> IResult<&str, Condition> {
    alt((
        map(preceded(char('.'), ident), |c: &str| {
            Condition::Class(c.to_string())
        }),
        map(preceded(char('#'), take_while1(is_ident_char)), |i: &str| {
            Condition::Id(i.to_string())
        }),
        attribute,
        pseudo,
    ))
    .parse(input)
}

// --- Selectors ---

fn compound_selector(input: &str) -> IResult<&str, CompoundSelector> {
    let (rest, element) = opt(type_selector).parse(input)?;
    let (rest, conditions) = many0(condition).parse(rest)?;
    if element.is_none() && conditions.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Verify,
        )));
    }
    Ok((
        rest,
        CompoundSelector {
            element: element.unwrap_or(NameTest::Any),
            conditions,
        },
    ))
}

fn combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        value(Combinator::Child, ws(char('>'))),
        value(Combinator::NextSibling, ws(char('+'))),
        value(Combinator::SubsequentSibling, ws(char('~'))),
        value(Combinator::Descendant, multispace1),
    ))
    .parse(input)
}

fn complex_selector(input: &str) -> IResult<&str, ComplexSelector> {
    map(
        pair(
            compound_selector,
            many0(pair(combinator, compound_selector)),
        ),
        |(head, tail)| ComplexSelector { head, tail },
    )
    .parse(input)
}

fn selector_list(input: &str) -> IResult<&str, SelectorList> {
    map(
        separated_list1(ws(char(',')), complex_selector),
        SelectorList,
    )
    .parse(input)
}
