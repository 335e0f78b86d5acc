//! Styled, composable output documents.
//!
//! A [`Pen`] is a list of lines, each holding styled text and embedded
//! blocks. Failure messages are assembled as pens and only rendered to a
//! concrete [`Format`] when a failure is finalized.

use crate::errors::ConfigError;
use anstyle::AnsiColor;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use unicode_width::UnicodeWidthStr;

const INDENTATION_WIDTH: usize = 2;

/// Target format for rendering a [`Pen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Ansi,
    Html,
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Format::Text),
            "ansi" => Ok(Format::Ansi),
            "html" => Ok(Format::Html),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }
}

/// Built-in text styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Error,
    Strings,
    Key,
    Comment,
    Regexp,
    DiffLabel,
    Added,
    Removed,
}

impl Style {
    fn ansi(self) -> Option<anstyle::Style> {
        match self {
            Style::Error => Some(AnsiColor::Red.on_default().bold()),
            Style::Strings => Some(AnsiColor::Cyan.on_default()),
            Style::Key => None,
            Style::Comment => Some(AnsiColor::BrightBlack.on_default()),
            Style::Regexp | Style::Added => Some(AnsiColor::Green.on_default()),
            Style::DiffLabel => Some(AnsiColor::Blue.on_default()),
            Style::Removed => Some(AnsiColor::Red.on_default()),
        }
    }

    fn css(self) -> Option<&'static str> {
        match self {
            Style::Error => Some("color: red; font-weight: bold"),
            Style::Strings => Some("color: #00A0A0"),
            Style::Key => None,
            Style::Comment => Some("color: gray"),
            Style::Regexp | Style::Added => Some("color: green"),
            Style::DiffLabel => Some("color: blue"),
            Style::Removed => Some("color: red"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Text {
        content: String,
        style: Option<Style>,
    },
    Block(Pen),
}

/// Rendered dimensions of a [`Pen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

/// A composable output document.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    lines: Vec<Vec<Entry>>,
    indentation_level: usize,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            lines: vec![Vec::new()],
            indentation_level: 0,
        }
    }
}

impl Pen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unstyled text. Newlines start new lines.
    pub fn text(&mut self, content: impl AsRef<str>) -> &mut Self {
        self.write(content.as_ref(), None)
    }

    /// Append text in the given style.
    pub fn styled(&mut self, style: Style, content: impl AsRef<str>) -> &mut Self {
        self.write(content.as_ref(), Some(style))
    }

    pub fn error(&mut self, content: impl AsRef<str>) -> &mut Self {
        self.styled(Style::Error, content)
    }

    pub fn sp(&mut self) -> &mut Self {
        self.text(" ")
    }

    pub fn nl(&mut self) -> &mut Self {
        self.lines.push(Vec::new());
        self
    }

    pub fn nl_n(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.nl();
        }
        self
    }

    pub fn indent_lines(&mut self) -> &mut Self {
        self.indentation_level += 1;
        self
    }

    /// Emit the current indentation.
    pub fn i(&mut self) -> &mut Self {
        let indentation = " ".repeat(self.indentation_level * INDENTATION_WIDTH);
        self.text(indentation)
    }

    /// Embed another document at the current column.
    pub fn block(&mut self, pen: Pen) -> &mut Self {
        self.current_line().push(Entry::Block(pen));
        self
    }

    /// Continue the current line with the contents of another document.
    pub fn append(&mut self, pen: &Pen) -> &mut Self {
        let mut lines = pen.lines.iter();
        if let Some(first) = lines.next() {
            self.current_line().extend(first.iter().cloned());
        }
        self.lines.extend(lines.cloned());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.is_empty())
    }

    pub fn size(&self) -> Size {
        let rendered = self.render_lines(Format::Text);
        Size {
            width: rendered
                .iter()
                .map(|line| UnicodeWidthStr::width(line.as_str()))
                .max()
                .unwrap_or(0),
            height: rendered.len(),
        }
    }

    pub fn render(&self, format: Format) -> String {
        let lines = self.render_lines(format);
        match format {
            Format::Text | Format::Ansi => lines.join("\n"),
            Format::Html => {
                let mut html = String::from(
                    "<div style=\"font-family: monospace; white-space: nowrap\">\n",
                );
                for line in lines {
                    html.push_str("  <div>");
                    html.push_str(&line);
                    html.push_str("</div>\n");
                }
                html.push_str("</div>");
                html
            }
        }
    }

    fn write(&mut self, content: &str, style: Option<Style>) -> &mut Self {
        for (idx, part) in content.split('\n').enumerate() {
            if idx > 0 {
                self.nl();
            }
            if !part.is_empty() {
                self.current_line().push(Entry::Text {
                    content: part.to_string(),
                    style,
                });
            }
        }
        self
    }

    fn current_line(&mut self) -> &mut Vec<Entry> {
        if self.lines.is_empty() {
            self.lines.push(Vec::new());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    /// Render to one string per output line. Blocks continue at the column
    /// where they started.
    fn render_lines(&self, format: Format) -> Vec<String> {
        let mut out = Vec::new();
        for line in &self.lines {
            let mut current = String::new();
            let mut column = 0;
            for entry in line {
                match entry {
                    Entry::Text { content, style } => {
                        current.push_str(&serialize(format, content, *style));
                        column += UnicodeWidthStr::width(content.as_str());
                    }
                    Entry::Block(pen) => {
                        let block_lines = pen.render_lines(format);
                        let block_width = pen.size().width;
                        let mut block_lines = block_lines.into_iter();
                        if let Some(first) = block_lines.next() {
                            current.push_str(&first);
                        }
                        for rest in block_lines {
                            out.push(std::mem::take(&mut current));
                            current.push_str(&padding(format, column));
                            current.push_str(&rest);
                        }
                        column += block_width;
                    }
                }
            }
            out.push(current);
        }
        out
    }
}

fn padding(format: Format, width: usize) -> String {
    match format {
        Format::Html => "&nbsp;".repeat(width),
        Format::Text | Format::Ansi => " ".repeat(width),
    }
}

fn serialize(format: Format, content: &str, style: Option<Style>) -> String {
    match format {
        Format::Text => content.to_string(),
        Format::Ansi => match style.and_then(Style::ansi) {
            Some(ansi) => format!("{}{}{}", ansi.render(), content, ansi.render_reset()),
            None => content.to_string(),
        },
        Format::Html => {
            let escaped = html_escape::encode_text(content).replace(' ', "&nbsp;");
            match style.and_then(Style::css) {
                Some(css) => format!("<span style=\"{}\">{}</span>", css, escaped),
                None => escaped,
            }
        }
    }
}

impl fmt::Display for Pen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Format::Text))
    }
}
