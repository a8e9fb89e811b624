//! Expands stylesheet locations into the ordered rule list the cascade runs.

use crate::error::{StylesheetFailure, TransformError};
use foprep_css::{CssRule, Declarations, parse_stylesheet_bytes};
use foprep_source::{StylesheetSource, resolve_location};
use std::sync::Arc;

const MAX_IMPORT_DEPTH: usize = 100;

/// A style rule in cascade order, remembering the sheet it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub declarations: Declarations,
    pub origin: String,
}

/// Loads stylesheets and splices `@import`ed rules in at the position of the
/// import, depth first.
///
/// The resolver keeps no state between calls: every [`resolve`](Self::resolve)
/// re-reads its sheets, so concurrent transforms never observe each other.
#[derive(Debug, Clone)]
pub struct StylesheetResolver {
    source: Arc<dyn StylesheetSource>,
}

impl StylesheetResolver {
    pub fn new(source: Arc<dyn StylesheetSource>) -> Self {
        Self { source }
    }

    /// Resolves `locations` in order into a flat rule list.
    pub fn resolve<S: AsRef<str>>(&self, locations: &[S]) -> Result<Vec<Rule>, TransformError> {
        let mut rules = Vec::new();
        let mut stack = Vec::new();
        for location in locations {
            self.resolve_sheet(location.as_ref(), 0, &mut stack, &mut rules)?;
        }
        log::debug!(
            "Resolved {} stylesheet(s) into {} rule(s)",
            locations.len(),
            rules.len()
        );
        Ok(rules)
    }

    fn resolve_sheet(
        &self,
        location: &str,
        depth: usize,
        stack: &mut Vec<String>,
        out: &mut Vec<Rule>,
    ) -> Result<(), TransformError> {
        if depth > MAX_IMPORT_DEPTH {
            return Err(TransformError::stylesheet(
                location,
                StylesheetFailure::DepthExceeded(MAX_IMPORT_DEPTH),
            ));
        }
        if stack.iter().any(|open| open == location) {
            return Err(TransformError::circular_import(stack.as_slice(), location));
        }

        // The bytes are dropped as soon as the rules are extracted.
        let parsed = {
            let bytes = self
                .source
                .load(location)
                .map_err(|e| TransformError::stylesheet(location, e))?;
            parse_stylesheet_bytes(&bytes).map_err(|e| TransformError::from_css(location, e))?
        };
        log::debug!(
            "Loaded stylesheet '{}' from {} ({} rules)",
            location,
            self.source.name(),
            parsed.len()
        );

        stack.push(location.to_string());
        let result = self.splice_rules(location, parsed, depth, stack, out);
        stack.pop();
        result
    }

    fn splice_rules(
        &self,
        location: &str,
        parsed: Vec<CssRule>,
        depth: usize,
        stack: &mut Vec<String>,
        out: &mut Vec<Rule>,
    ) -> Result<(), TransformError> {
        for rule in parsed {
            match rule {
                CssRule::Import(import) => {
                    let target = resolve_location(&import.href, Some(location));
                    if !import.media.is_empty() {
                        log::debug!(
                            "Importing '{}' regardless of media [{}]",
                            target,
                            import.media.join(", ")
                        );
                    }
                    self.resolve_sheet(&target, depth + 1, stack, out)?;
                }
                CssRule::Style(style) => out.push(Rule {
                    selector: style.selector,
                    declarations: style.declarations,
                    origin: location.to_string(),
                }),
            }
        }
        Ok(())
    }
}
