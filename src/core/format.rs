//! Shared rendering rules for remote objects.
//!
//! Every per-entity formatter builds a [`Block`]: one heading line followed
//! by one line per present field, in a fixed order. Absent fields are omitted
//! entirely, never rendered as a blank or a "None". Collections join their
//! blocks with a blank line and keep the order the service returned.

use std::fmt::Display;

/// Ordered line buffer for one entity.
pub struct Block {
    lines: Vec<String>,
}

impl Block {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            lines: vec![heading.into()],
        }
    }

    /// `Label: value` line, skipped entirely when the value is absent.
    pub fn field(mut self, label: &str, value: Option<impl Display>) -> Self {
        if let Some(v) = value {
            self.lines.push(format!("{label}: {v}"));
        }
        self
    }

    /// Raw line, always emitted.
    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    /// Sub-heading followed by a body, skipped entirely when the body is
    /// absent.
    pub fn section(mut self, heading: &str, body: Option<impl Display>) -> Self {
        if let Some(b) = body {
            self.lines.push(format!("\n## {heading}"));
            self.lines.push(b.to_string());
        }
        self
    }

    /// Sub-heading with no attached body.
    pub fn heading(mut self, heading: &str) -> Self {
        self.lines.push(format!("\n## {heading}"));
        self
    }

    /// Bulleted list item.
    pub fn item(mut self, text: impl Display) -> Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn render(self) -> String {
        self.lines.join("\n")
    }
}

/// Join per-entity blocks with a blank line, preserving input order.
pub fn join_blocks<I>(blocks: I) -> String
where
    I: IntoIterator<Item = String>,
{
    blocks.into_iter().collect::<Vec<_>>().join("\n\n")
}

/// Standard single-line rendering for an empty collection.
pub fn none_found(what: &str) -> String {
    format!("No {what} found.")
}

/// Shorten long free-text values for one-line fields.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
