//! Rewrite templates for canonicalization rules
//!
//! A rule's rewrite is a template over the raw identifier, e.g.
//! `"EDAM {segment}"` or `"NCI C{segment}"`. Templates are parsed once, at
//! rule construction, so a bad accessor or filter is a configuration error
//! rather than a per-identifier failure.
//!
//! Accessors:
//! - `{raw}` the raw identifier
//! - `{default}` the default-pass candidate
//! - `{token}` last whitespace-separated token of the default pass
//! - `{segment}` final `/` segment of the raw identifier
//! - `{local}` final segment after spaces → `_` and `#` → `/`
//! - `{fragment}` text after the last `#`
//! - `{tail}` text after the last `:`
//! - `{1}`..`{9}` regular expression captures
//!
//! Filters: `{segment | upper}`, `lower`, `trim`, `default:<value>`.

use thiserror::Error;

/// Errors raised while parsing a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed template expression in: {0}")]
    Unclosed(String),

    #[error("unknown template accessor: {0}")]
    UnknownAccessor(String),

    #[error("unknown template filter: {0}")]
    UnknownFilter(String),
}

/// Replace the generic delimiters with spaces and keep the final path segment.
pub fn default_pass(raw: &str) -> String {
    let spaced = raw.replace([':', '#', '_'], " ");
    spaced.rsplit('/').next().unwrap_or_default().to_string()
}

fn last_segment(s: &str) -> &str {
    s.rsplit('/').next().unwrap_or(s)
}

/// The values a template can read.
pub struct TemplateContext<'a> {
    pub raw: &'a str,
    pub captures: &'a [String],
}

impl<'a> TemplateContext<'a> {
    pub fn new(raw: &'a str, captures: &'a [String]) -> Self {
        Self { raw, captures }
    }

    fn resolve(&self, accessor: &Accessor) -> String {
        match accessor {
            Accessor::Raw => self.raw.to_string(),
            Accessor::Default => default_pass(self.raw),
            Accessor::Token => default_pass(self.raw)
                .split_whitespace()
                .last()
                .unwrap_or_default()
                .to_string(),
            Accessor::Segment => last_segment(self.raw).to_string(),
            Accessor::Local => {
                let local = self.raw.replace(' ', "_").replace('#', "/");
                last_segment(&local).to_string()
            }
            Accessor::Fragment => self.raw.rsplit('#').next().unwrap_or_default().to_string(),
            Accessor::Tail => self.raw.rsplit(':').next().unwrap_or_default().to_string(),
            Accessor::Capture(n) => self
                .captures
                .get(*n)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Accessor {
    Raw,
    Default,
    Token,
    Segment,
    Local,
    Fragment,
    Tail,
    /// Capture group index (1-based, as in the regex)
    Capture(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Filter {
    Upper,
    Lower,
    Trim,
    Default(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Expr { accessor: Accessor, filters: Vec<Filter> },
}

/// A parsed rewrite template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

impl Template {
    /// Parse a template string, validating accessors and filters.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars();

        while let Some(ch) = chars.next() {
            if ch != '{' {
                literal.push(ch);
                continue;
            }
            let mut expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => expr.push(c),
                    None => return Err(TemplateError::Unclosed(template.to_string())),
                }
            }
            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(parse_expression(expr.trim())?);
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            pieces,
        })
    }

    /// The identity template `{raw}`.
    pub fn identity() -> Self {
        Self {
            source: "{raw}".to_string(),
            pieces: vec![Piece::Expr {
                accessor: Accessor::Raw,
                filters: Vec::new(),
            }],
        }
    }

    /// Render against a raw identifier. Missing captures render empty.
    pub fn render(&self, ctx: &TemplateContext) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Expr { accessor, filters } => {
                    let value = filters
                        .iter()
                        .fold(ctx.resolve(accessor), |v, f| apply_filter(v, f));
                    out.push_str(&value);
                }
            }
        }
        out
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn parse_expression(expr: &str) -> Result<Piece, TemplateError> {
    let mut parts = expr.split('|');
    let accessor_str = parts.next().unwrap_or_default().trim();
    let accessor = match accessor_str {
        "raw" => Accessor::Raw,
        "default" => Accessor::Default,
        "token" => Accessor::Token,
        "segment" => Accessor::Segment,
        "local" => Accessor::Local,
        "fragment" => Accessor::Fragment,
        "tail" => Accessor::Tail,
        other => match other.parse::<usize>() {
            Ok(n) if (1..=9).contains(&n) => Accessor::Capture(n - 1),
            _ => return Err(TemplateError::UnknownAccessor(other.to_string())),
        },
    };

    let filters = parts
        .map(|f| parse_filter(f.trim()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Piece::Expr { accessor, filters })
}

fn parse_filter(filter: &str) -> Result<Filter, TemplateError> {
    let (name, arg) = match filter.split_once(':') {
        Some((n, a)) => (n.trim(), Some(a.trim())),
        None => (filter, None),
    };
    match name {
        "upper" => Ok(Filter::Upper),
        "lower" => Ok(Filter::Lower),
        "trim" => Ok(Filter::Trim),
        "default" => Ok(Filter::Default(arg.unwrap_or_default().to_string())),
        _ => Err(TemplateError::UnknownFilter(name.to_string())),
    }
}

fn apply_filter(value: String, filter: &Filter) -> String {
    match filter {
        Filter::Upper => value.to_uppercase(),
        Filter::Lower => value.to_lowercase(),
        Filter::Trim => value.trim().to_string(),
        Filter::Default(d) if value.is_empty() => d.clone(),
        Filter::Default(_) => value,
    }
}
