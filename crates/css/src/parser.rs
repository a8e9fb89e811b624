//! A `nom`-based parser for the rule level of CSS.
//!
//! Only what the cascade needs is interpreted: style rules and `@import`.
//! Selector text is kept verbatim for the selector crate, and every other
//! at-rule is skipped together with its block.

use crate::error::CssError;
use crate::rule::{CssRule, Declarations, ImportRule, StyleRule};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case, take_until, take_while, take_while1},
    character::complete::{anychar, char},
    combinator::{eof, map, recognize, rest},
    multi::many0,
    sequence::{delimited, pair, preceded},
};

// --- Main Public Parsers ---

/// Parses stylesheet text into its import and style rules, in source order.
pub fn parse_stylesheet(css: &str) -> Result<Vec<CssRule>, CssError> {
    let source = strip_comments(css)?;
    let mut rules = Vec::new();
    let mut input = source.as_str();
    // Only `@charset` and other imports may precede an `@import`.
    let mut imports_allowed = true;

    loop {
        input = input.trim_start_matches(is_css_space);
        if input.is_empty() {
            break;
        }
        let offset = source.len() - input.len();
        let (remaining, stmt) = statement(input)
            .map_err(|_| CssError::syntax(&source, offset, describe_failure(input)))?;

        match stmt {
            Statement::At {
                name,
                prelude,
                block,
            } => match name.to_ascii_lowercase().as_str() {
                "import" => {
                    if block.is_some() {
                        return Err(CssError::syntax(
                            &source,
                            offset,
                            "@import cannot have a block",
                        ));
                    }
                    let rule = parse_import(prelude).ok_or_else(|| {
                        CssError::syntax(&source, offset, "expected a string or url() after @import")
                    })?;
                    if imports_allowed {
                        rules.push(CssRule::Import(rule));
                    } else {
                        log::warn!("Ignoring @import of '{}' after other rules", rule.href);
                    }
                }
                "charset" => {}
                other => {
                    imports_allowed = false;
                    log::debug!("Skipping unsupported @{} rule", other);
                }
            },
            Statement::Qualified { prelude, block } => {
                imports_allowed = false;
                let selector = prelude.trim();
                if selector.is_empty() {
                    return Err(CssError::syntax(&source, offset, "missing selector"));
                }
                let declarations = parse_block(&source, block)?;
                rules.push(CssRule::Style(StyleRule {
                    selector: selector.to_string(),
                    declarations,
                }));
            }
        }
        input = remaining;
    }

    Ok(rules)
}

/// Parses the inside of a declaration block, e.g. an inline `style` value.
pub fn parse_declarations(text: &str) -> Result<Declarations, CssError> {
    let source = strip_comments(text)?;
    parse_block(&source, &source)
}

// --- Combinators & Helpers ---

fn is_css_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn css_space(input: &str) -> IResult<&str, &str> {
    take_while(is_css_space).parse(input)
}

fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_').parse(input)
}

fn escape_sequence(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('\\'), anychar)).parse(input)
}

/// A complete quoted string, quotes included.
fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(delimited(
            char('"'),
            many0(alt((is_not("\"\\\n"), escape_sequence))),
            char('"'),
        )),
        recognize(delimited(
            char('\''),
            many0(alt((is_not("'\\\n"), escape_sequence))),
            char('\''),
        )),
    ))
    .parse(input)
}

fn paren_group(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('('),
        many0(alt((quoted, paren_group, is_not("()\"'")))),
        char(')'),
    ))
    .parse(input)
}

// --- Comments ---

enum Segment<'a> {
    Keep(&'a str),
    Comment(&'a str),
    Unterminated,
}

fn segment(input: &str) -> IResult<&str, Segment<'_>> {
    alt((
        map(
            recognize(delimited(tag("/*"), take_until("*/"), tag("*/"))),
            Segment::Comment,
        ),
        map(preceded(tag("/*"), rest), |_| Segment::Unterminated),
        map(quoted, Segment::Keep),
        map(is_not("/\"'"), Segment::Keep),
        map(alt((tag("/"), tag("\""), tag("'"))), Segment::Keep),
    ))
    .parse(input)
}

/// Blanks out comments, keeping newlines so positions stay meaningful.
fn strip_comments(css: &str) -> Result<String, CssError> {
    let mut out = String::with_capacity(css.len());
    let mut input = css;
    while !input.is_empty() {
        let offset = css.len() - input.len();
        let (remaining, seg) =
            segment(input).map_err(|_| CssError::syntax(css, offset, "unreadable input"))?;
        match seg {
            Segment::Keep(text) => out.push_str(text),
            Segment::Comment(text) => {
                out.extend(text.chars().map(|c| if c == '\n' { '\n' } else { ' ' }))
            }
            Segment::Unterminated => {
                return Err(CssError::syntax(css, offset, "unterminated comment"));
            }
        }
        input = remaining;
    }
    Ok(out)
}

// --- Statements ---

enum Statement<'a> {
    At {
        name: &'a str,
        prelude: &'a str,
        block: Option<&'a str>,
    },
    Qualified {
        prelude: &'a str,
        block: &'a str,
    },
}

fn prelude(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((quoted, is_not("{};\"'"))))).parse(input)
}

/// A `{ ... }` block with balanced braces; yields the inside.
fn block(input: &str) -> IResult<&str, &str> {
    delimited(
        char('{'),
        recognize(many0(alt((quoted, is_not("{}\"'"), recognize(block))))),
        char('}'),
    )
    .parse(input)
}

fn at_rule(input: &str) -> IResult<&str, Statement<'_>> {
    let (input, name) = preceded(char('@'), ident).parse(input)?;
    let (input, prelude) = prelude(input)?;
    let (input, block) = alt((
        map(char(';'), |_| None),
        map(block, Some),
        map(eof, |_| None),
    ))
    .parse(input)?;
    Ok((
        input,
        Statement::At {
            name,
            prelude,
            block,
        },
    ))
}

fn qualified_rule(input: &str) -> IResult<&str, Statement<'_>> {
    map(pair(prelude, block), |(prelude, block)| Statement::Qualified {
        prelude,
        block,
    })
    .parse(input)
}

fn statement(input: &str) -> IResult<&str, Statement<'_>> {
    alt((at_rule, qualified_rule)).parse(input)
}

fn describe_failure(input: &str) -> &'static str {
    if input.starts_with('}') {
        "unexpected '}'"
    } else if input.starts_with('@') {
        "unterminated at-rule"
    } else {
        "expected a '{' block, or the block or a string is never closed"
    }
}

// --- @import ---

fn url_function(input: &str) -> IResult<&str, String> {
    delimited(
        pair(tag_no_case("url("), css_space),
        alt((
            map(quoted, unquote),
            map(is_not(")"), |s: &str| s.trim_end().to_string()),
        )),
        pair(css_space, char(')')),
    )
    .parse(input)
}

fn import_target(input: &str) -> IResult<&str, String> {
    preceded(css_space, alt((map(quoted, unquote), url_function))).parse(input)
}

fn parse_import(prelude: &str) -> Option<ImportRule> {
    let (media, href) = import_target(prelude).ok()?;
    let media = media
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();
    Some(ImportRule { href, media })
}

/// Strips the quotes of a CSS string and resolves its escapes.
fn unquote(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut hex = String::new();
        while hex.len() < 6 {
            match chars.peek() {
                Some(h) if h.is_ascii_hexdigit() => {
                    hex.push(*h);
                    chars.next();
                }
                _ => break,
            }
        }
        if hex.is_empty() {
            match chars.next() {
                Some('\n') | None => {}
                Some(other) => out.push(other),
            }
        } else {
            if matches!(chars.peek(), Some(w) if is_css_space(*w)) {
                chars.next();
            }
            let ch = u32::from_str_radix(&hex, 16)
                .ok()
                .and_then(char::from_u32)
                .unwrap_or('\u{FFFD}');
            out.push(ch);
        }
    }
    out
}

// --- Declarations ---

fn declaration_chunk(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((quoted, paren_group, is_not(";\"'("))))).parse(input)
}

/// `block` must be a slice of `source`; errors are positioned within `source`.
fn parse_block(source: &str, block: &str) -> Result<Declarations, CssError> {
    let base = block.as_ptr() as usize - source.as_ptr() as usize;
    let mut declarations = Declarations::new();
    let mut input = block;

    loop {
        let (remaining, chunk) = declaration_chunk(input)
            .map_err(|_| CssError::declaration(source, base, "unreadable declaration"))?;

        let trimmed = chunk.trim_matches(is_css_space);
        if !trimmed.is_empty() {
            let offset = base + (trimmed.as_ptr() as usize - block.as_ptr() as usize);
            let (name, value, important) = split_declaration(trimmed)
                .map_err(|message| CssError::declaration(source, offset, message))?;
            declarations.push(name, value, important);
        }

        if remaining.is_empty() {
            break;
        }
        match remaining.strip_prefix(';') {
            Some(after) => input = after,
            None => {
                let offset = base + (remaining.as_ptr() as usize - block.as_ptr() as usize);
                return Err(CssError::declaration(
                    source,
                    offset,
                    "unbalanced parenthesis or unterminated string",
                ));
            }
        }
    }

    Ok(declarations)
}

fn split_declaration(text: &str) -> Result<(String, String, bool), String> {
    let (name, value) = text
        .split_once(':')
        .ok_or_else(|| format!("expected ':' in '{}'", text))?;
    let name = name.trim_matches(is_css_space);
    if name.is_empty() {
        return Err("missing property name".to_string());
    }
    if name.contains(is_css_space) {
        return Err(format!("invalid property name '{}'", name));
    }
    let (value, important) = strip_important(value.trim_matches(is_css_space));
    if value.is_empty() {
        return Err(format!("missing value for '{}'", name));
    }
    Ok((name.to_ascii_lowercase(), value.to_string(), important))
}

fn strip_important(value: &str) -> (&str, bool) {
    if let Some(bang) = value.rfind('!') {
        if value[bang + 1..]
            .trim_matches(is_css_space)
            .eq_ignore_ascii_case("important")
        {
            return (value[..bang].trim_end_matches(is_css_space), true);
        }
    }
    (value, false)
}
