//! HTML instruction producer.
//!
//! Walks the `<body>` of a parsed document depth first, tracking inherited
//! formatting with a [`StyleTracker`], and cuts the text into instruction
//! groups at block boundaries. Tables are captured cell by cell and emitted
//! as a single group once `</table>` is reached.

use scraper::{ElementRef, Html, Node, Selector};

use crate::model::{Attributes, Instruction, InstructionGroup};
use crate::parser::strings::check_string_style;
use crate::parser::style::{ScopeSignal, StyleTracker};
use crate::parser::table_builder::{parse_span, table_to_groups, TableBuilder};
use crate::structure::finalize_group;

/// Elements whose end closes the current line.
const BLOCK_TAGS: &[&str] = &["p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "br"];

/// Elements whose content never reaches the output.
const IGNORED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Read access to an element's tag and attributes.
///
/// Implemented for `scraper`'s element type; the producer only needs these
/// two operations, which keeps it independent of the DOM library.
pub trait MarkupElement {
    /// Lower-case tag name.
    fn tag(&self) -> &str;
    /// Attribute value by name.
    fn attr(&self, name: &str) -> Option<&str>;
}

impl MarkupElement for scraper::node::Element {
    fn tag(&self) -> &str {
        self.name()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        scraper::node::Element::attr(self, name)
    }
}

/// Event-driven builder of instruction groups.
///
/// Feed it `start` / `text` / `end` events in document order, then call
/// [`HtmlProducer::finish`].
#[derive(Debug, Default)]
pub struct HtmlProducer {
    style: StyleTracker,
    groups: Vec<InstructionGroup>,
    current: Vec<Instruction>,
    table: Option<TableBuilder>,
    table_depth: usize,
    skipped: usize,
}

impl HtmlProducer {
    /// Create an empty producer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter an element. On [`ScopeSignal::Skip`] the caller must not send
    /// events for the element's subtree, nor its `end`.
    pub fn start<E: MarkupElement + ?Sized>(&mut self, element: &E) -> ScopeSignal {
        let tag = element.tag();
        if IGNORED_TAGS.contains(&tag) {
            return ScopeSignal::Skip;
        }

        let href = if tag == "a" { element.attr("href") } else { None };
        if self.style.enter(tag, element.attr("style"), href) == ScopeSignal::Skip {
            self.skipped += 1;
            return ScopeSignal::Skip;
        }

        match tag {
            "table" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.flush();
                    self.table = Some(TableBuilder::new());
                }
            }
            "td" | "th" if self.table_depth == 1 => {
                if let Some(table) = &mut self.table {
                    table.start_cell(
                        parse_span(element.attr("rowspan")),
                        parse_span(element.attr("colspan")),
                    );
                }
            }
            "img" => {
                let src = element.attr("src").unwrap_or_default().to_string();
                let alt = element.attr("alt").map(str::to_string);
                self.image(Instruction::image(src, alt, self.style.attributes()));
            }
            _ => {}
        }
        ScopeSignal::Visible
    }

    /// A text node inside the current element.
    pub fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        let style = check_string_style(text);
        let attributes = Attributes {
            all_caps: style.all_caps,
            proper_case: style.proper_case,
            ..self.style.attributes()
        };
        let instruction = Instruction::text(text, attributes);

        match &mut self.table {
            Some(table) => {
                if let Some(stray) = table.push(instruction) {
                    // Text between rows or cells.
                    if !stray.is_blank_text() {
                        self.current.push(stray);
                    }
                }
            }
            None => self.current.push(instruction),
        }
    }

    /// Leave an element previously entered with [`ScopeSignal::Visible`].
    pub fn end<E: MarkupElement + ?Sized>(&mut self, element: &E) {
        let tag = element.tag();

        match tag {
            "table" => {
                if self.table_depth == 1 {
                    self.flush_table();
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            "tr" if self.table_depth == 1 => {
                if let Some(table) = &mut self.table {
                    table.end_row();
                }
            }
            "td" | "th" if self.table_depth == 1 => {
                if let Some(table) = &mut self.table {
                    table.end_cell();
                }
            }
            "td" | "th" if self.table_depth > 1 => {
                // Cells of a nested table are flattened into the outer cell.
                if let Some(table) = &mut self.table {
                    table.push(Instruction::plain(" "));
                }
            }
            "tr" if self.table_depth > 1 => {
                if let Some(table) = &mut self.table {
                    table.line_break();
                }
            }
            _ if BLOCK_TAGS.contains(&tag) => match &mut self.table {
                Some(table) => table.line_break(),
                None => self.flush(),
            },
            _ => {}
        }

        self.style.exit();
    }

    /// Number of `display:none` subtrees skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Close any open table and line and return the groups.
    pub fn finish(mut self) -> Vec<InstructionGroup> {
        if self.table.is_some() {
            self.flush_table();
        }
        self.flush();
        self.groups
    }

    fn image(&mut self, image: Instruction) {
        if let Some(table) = &mut self.table {
            if table.in_cell() {
                table.push(image);
                return;
            }
        }
        self.flush();
        self.groups.push(vec![image]);
    }

    fn flush(&mut self) {
        let pending = std::mem::take(&mut self.current);
        if let Some(group) = finalize_group(pending) {
            self.groups.push(group);
        }
    }

    fn flush_table(&mut self) {
        if let Some(table) = self.table.take() {
            let groups = table_to_groups(table.finish());
            log::trace!("table produced {} group(s)", groups.len());
            self.groups.extend(groups);
        }
    }

    /// Walk an element and its descendants.
    pub fn walk(&mut self, element: ElementRef<'_>) {
        if self.start(element.value()) == ScopeSignal::Skip {
            return;
        }
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.walk(child);
                    }
                }
                _ => {}
            }
        }
        self.end(element.value());
    }
}

/// Parse HTML and produce its instruction groups.
pub fn html_to_instructions(html: &str) -> Vec<InstructionGroup> {
    let document = Html::parse_document(html);
    let mut producer = HtmlProducer::new();
    producer.walk(body_element(&document));

    let skipped = producer.skipped();
    let groups = producer.finish();
    log::debug!(
        "html producer emitted {} groups ({} hidden subtrees skipped)",
        groups.len(),
        skipped
    );
    groups
}

fn body_element(document: &Html) -> ElementRef<'_> {
    Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element())
}
