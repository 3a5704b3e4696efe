//! Scoped formatting state for walking a markup tree.
//!
//! Every element entered with [`StyleTracker::enter`] opens a scope that
//! records exactly which counters and stacks it touched; the matching
//! [`StyleTracker::exit`] undoes those changes and nothing else.

use std::collections::HashMap;

use crate::model::Attributes;

/// Font size assumed when no ancestor sets one.
pub const DEFAULT_FONT_PX: f32 = 16.0;

const EMPTY_CHARS: &[char] = &[' ', '\t', '\n', '\r', '\u{a0}'];

/// Result of entering an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeSignal {
    /// The element is visible; call `exit` when leaving it
    Visible,
    /// `display:none`; the whole subtree must be ignored and no scope was opened
    Skip,
}

#[derive(Debug, Default)]
struct Scope {
    bold: u32,
    italic: u32,
    underline: u32,
    center: u32,
    font_sizes: usize,
    left_indent: bool,
    href: bool,
}

/// Reference-counted flags and value stacks for the element being walked.
#[derive(Debug, Default)]
pub struct StyleTracker {
    bold: u32,
    italic: u32,
    underline: u32,
    center: u32,
    font_size: Vec<f32>,
    left_indent: Vec<f32>,
    href: Vec<String>,
    scopes: Vec<Scope>,
}

impl StyleTracker {
    /// Create a tracker with no active formatting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the formatting of an element.
    ///
    /// `style` is the raw `style` attribute, `href` the link target for `<a>`.
    pub fn enter(&mut self, tag: &str, style: Option<&str>, href: Option<&str>) -> ScopeSignal {
        let css = style.map(parse_style_attribute).unwrap_or_default();
        if css.get("display").map(String::as_str) == Some("none") {
            return ScopeSignal::Skip;
        }

        let mut scope = Scope::default();

        match tag {
            "b" | "strong" => scope.bold += 1,
            "i" | "em" => scope.italic += 1,
            "u" | "ins" => scope.underline += 1,
            "center" => scope.center += 1,
            "a" => {
                self.href.push(href.unwrap_or_default().to_string());
                scope.href = true;
            }
            _ => {
                if let Some(px) = heading_font_px(tag) {
                    scope.bold += 1;
                    self.font_size.push(px);
                    scope.font_sizes += 1;
                }
            }
        }

        self.apply_css(&css, &mut scope);

        self.bold += scope.bold;
        self.italic += scope.italic;
        self.underline += scope.underline;
        self.center += scope.center;
        self.scopes.push(scope);
        ScopeSignal::Visible
    }

    /// Undo the innermost scope.
    pub fn exit(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            log::warn!("style scope underflow");
            return;
        };
        self.bold = self.bold.saturating_sub(scope.bold);
        self.italic = self.italic.saturating_sub(scope.italic);
        self.underline = self.underline.saturating_sub(scope.underline);
        self.center = self.center.saturating_sub(scope.center);
        let keep = self.font_size.len().saturating_sub(scope.font_sizes);
        self.font_size.truncate(keep);
        if scope.left_indent {
            self.left_indent.pop();
        }
        if scope.href {
            self.href.pop();
        }
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Current font size in px, or the default when none is set.
    pub fn font_px(&self) -> f32 {
        self.font_size.last().copied().unwrap_or(DEFAULT_FONT_PX)
    }

    /// Snapshot of the active formatting.
    pub fn attributes(&self) -> Attributes {
        Attributes {
            bold: self.bold > 0,
            italic: self.italic > 0,
            underline: self.underline > 0,
            text_center: self.center > 0,
            font_size: self.font_size.last().copied(),
            left_indent: self.left_indent.last().copied(),
            href: self.href.last().cloned(),
            ..Attributes::default()
        }
    }

    fn apply_css(&mut self, css: &HashMap<String, String>, scope: &mut Scope) {
        if let Some(weight) = css.get("font-weight") {
            if weight == "bold" || weight == "700" {
                scope.bold += 1;
            }
        }
        if css.get("font-style").map(String::as_str) == Some("italic") {
            scope.italic += 1;
        }
        if css.get("text-decoration").map(String::as_str) == Some("underline") {
            scope.underline += 1;
        }
        if css.get("text-align").map(String::as_str) == Some("center") {
            scope.center += 1;
        }

        let parent_px = self.font_px();
        if let Some(size) = css.get("font-size") {
            self.font_size.push(normalize_to_px(size, parent_px));
            scope.font_sizes += 1;
        }

        // Relative units in indents resolve against the element's own font.
        let font_px = self.font_px();
        let mut indent = 0.0;
        if let Some(value) = css.get("text-indent") {
            indent += normalize_to_px(value, font_px);
        }
        for (shorthand, longhand) in [("padding", "padding-left"), ("margin", "margin-left")] {
            if let Some(value) = css.get(shorthand) {
                if let Some(left) = box_left_component(value) {
                    indent += normalize_to_px(left, font_px);
                }
            }
            if let Some(value) = css.get(longhand) {
                indent += normalize_to_px(value, font_px);
            }
        }
        if indent != 0.0 {
            self.left_indent.push(indent);
            scope.left_indent = true;
        }
    }
}

/// Browser default sizes for heading tags.
fn heading_font_px(tag: &str) -> Option<f32> {
    match tag {
        "h1" => Some(32.0),
        "h2" => Some(24.0),
        "h3" => Some(18.72),
        "h4" => Some(16.0),
        "h5" => Some(13.28),
        "h6" => Some(10.72),
        _ => None,
    }
}

/// Parse a `style` attribute into lower-cased declarations.
///
/// The `font` shorthand is expanded into its longhand properties.
pub fn parse_style_attribute(style: &str) -> HashMap<String, String> {
    let lower = style.to_lowercase();
    let mut result = HashMap::new();
    for declaration in lower.split(';') {
        let declaration = declaration.trim_matches(EMPTY_CHARS);
        if let Some((key, value)) = declaration.split_once(':') {
            result.insert(
                key.trim_matches(EMPTY_CHARS).to_string(),
                value.trim_matches(EMPTY_CHARS).to_string(),
            );
        }
    }

    if let Some(font) = result.get("font").cloned() {
        result.extend(parse_font_shorthand(&font));
    }
    result
}

/// Expand `font: [style] [variant] [weight] size[/line-height] family`.
pub fn parse_font_shorthand(value: &str) -> HashMap<String, String> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    let mut result = HashMap::new();
    if parts.len() < 2 {
        return result;
    }

    let mut i = 0;
    if matches!(parts[i], "italic" | "oblique" | "normal") {
        if parts[i] == "italic" {
            result.insert("font-style".to_string(), "italic".to_string());
        }
        i += 1;
    }
    if i < parts.len() && matches!(parts[i], "small-caps" | "normal") {
        i += 1;
    }
    if i < parts.len() {
        let weight = match parts[i] {
            "bold" | "700" => Some("bold"),
            "normal" | "400" => Some("normal"),
            w @ ("100" | "200" | "300" | "500" | "600" | "800" | "900" | "lighter"
            | "bolder") => Some(w),
            _ => None,
        };
        if let Some(weight) = weight {
            result.insert("font-weight".to_string(), weight.to_string());
            i += 1;
        }
    }
    if i < parts.len() {
        let (size, line_height) = match parts[i].split_once('/') {
            Some((size, lh)) => (size, Some(lh)),
            None => (parts[i], None),
        };
        result.insert("font-size".to_string(), size.to_string());
        if let Some(lh) = line_height {
            result.insert("line-height".to_string(), lh.to_string());
        }
        i += 1;
    }
    if i < parts.len() {
        let family = parts[i..].join(" ");
        result.insert(
            "font-family".to_string(),
            family.trim_matches(|c| c == '\'' || c == '"').to_string(),
        );
    }
    result
}

/// The left side of a `padding`/`margin` shorthand.
fn box_left_component(value: &str) -> Option<&str> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.len() {
        1 => Some(parts[0]),
        2 | 3 => Some(parts[1]),
        4 => Some(parts[3]),
        _ => None,
    }
}

/// Split a CSS length into its number and unit.
fn parse_css_value(value: &str) -> (f32, &str) {
    let value = value.trim_matches(EMPTY_CHARS);
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (c == '-' && i == 0)))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    let number = value[..end].parse::<f32>().unwrap_or(0.0);
    let unit = value[end..].trim_matches(EMPTY_CHARS);
    (number, if unit.is_empty() { "px" } else { unit })
}

/// Convert a CSS length to px. `font_px` is the font size relative units resolve against.
pub fn normalize_to_px(value: &str, font_px: f32) -> f32 {
    let (number, unit) = parse_css_value(value);
    match unit {
        "px" => number,
        "pt" => number * 1.333,
        "em" => number * font_px,
        "rem" => number * DEFAULT_FONT_PX,
        "%" => number * font_px / 100.0,
        "ex" | "ch" => number * font_px * 0.5,
        "cm" => number * 37.8,
        "mm" => number * 3.78,
        "in" => number * 96.0,
        "pc" => number * 16.0,
        "auto" | "inherit" | "initial" => 0.0,
        _ => number,
    }
}
