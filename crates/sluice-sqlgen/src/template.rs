//! SQL text templates with `{{.field}}` placeholders.
//!
//! A template is compiled once into literal text and field references.
//! Rendering substitutes each reference from a name-to-text map; substituted
//! text is never re-scanned for placeholders.

use std::collections::HashMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(String),
}

/// A compiled SQL template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl SqlTemplate {
    /// Compile a template.
    ///
    /// Placeholders are `{{.name}}` with optional whitespace inside the
    /// braces; names use `[A-Za-z0-9_]`.
    pub fn compile(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            let after_open = &rest[start + 2..];
            let end = after_open.find("}}").ok_or_else(|| {
                Error::template(format!(
                    "unclosed placeholder at offset {}",
                    source.len() - rest.len() + start
                ))
            })?;
            segments.push(Segment::Field(parse_placeholder(&after_open[..end])?));
            rest = &after_open[end + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text as configured
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names referenced by the template, in order of appearance
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Render with the given substitutions
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(name) => {
                    let value = values.get(name).ok_or_else(|| {
                        Error::template(format!("no value for placeholder '{{{{.{}}}}}'", name))
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

fn parse_placeholder(inner: &str) -> Result<String> {
    let body = inner.trim();
    let name = body.strip_prefix('.').ok_or_else(|| {
        Error::template(format!("placeholder '{{{{{}}}}}' must start with '.'", body))
    })?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::template(format!(
            "invalid placeholder name '{}'",
            name
        )));
    }
    Ok(name.to_string())
}
