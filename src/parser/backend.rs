//! lopdf-backed source of positioned text objects.
//!
//! Interprets the text operators of each page's content stream, keeping the
//! text matrix and font state, and reports one [`TextObject`] per string
//! shown. Bounding boxes are estimated from the font size: the PDF's glyph
//! metrics are not consulted.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::parser::pdf::{BoundingBox, TextObject, TextObjectSource};

/// TJ adjustment (thousandths of an em) treated as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Font size used before any `Tf`.
const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Estimated descender, ascender and average glyph width as fractions of the font size.
const DESCENT: f32 = 0.2;
const ASCENT: f32 = 0.8;
const GLYPH_WIDTH: f32 = 0.5;

#[derive(Debug, Clone)]
struct FontInfo {
    base_font: String,
    two_byte: bool,
}

/// Concrete [`TextObjectSource`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: Vec<ObjectId>,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load_bytes(&data)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        let pages = doc.get_pages().into_values().collect();
        Ok(Self { doc, pages })
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        self.pages
            .get(page)
            .copied()
            .ok_or(Error::PageOutOfRange(page as u32 + 1, self.pages.len() as u32))
    }

    fn page_fonts(&self, page_id: ObjectId) -> HashMap<Vec<u8>, FontInfo> {
        let Ok(fonts) = self.doc.get_page_fonts(page_id) else {
            log::debug!("no font resources on page {:?}", page_id);
            return HashMap::new();
        };
        fonts
            .into_iter()
            .map(|(name, dict)| {
                let base_font = dict
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).into_owned())
                    .unwrap_or_else(|| String::from_utf8_lossy(&name).into_owned());
                let two_byte = matches!(
                    dict.get(b"Encoding"),
                    Ok(Object::Name(enc)) if enc.starts_with(b"Identity")
                );
                (name, FontInfo { base_font, two_byte })
            })
            .collect()
    }

    fn page_text_objects(&self, page_id: ObjectId) -> Result<Vec<TextObject>> {
        let data = self.doc.get_page_content(page_id)?;
        let content = Content::decode(&data)?;
        let fonts = self.page_fonts(page_id);

        let mut objects = Vec::new();
        let mut font: Option<&FontInfo> = None;
        let mut font_key: Vec<u8> = Vec::new();
        let mut font_size = DEFAULT_FONT_SIZE;
        let mut matrix = TextMatrix::default();
        let mut in_text = false;

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "BT" => {
                    in_text = true;
                    matrix = TextMatrix::default();
                }
                "ET" => in_text = false,
                "Tf" if operands.len() >= 2 => {
                    if let Object::Name(name) = &operands[0] {
                        font_key = name.clone();
                        font = fonts.get(name);
                    }
                    font_size = get_number(&operands[1]).unwrap_or(DEFAULT_FONT_SIZE);
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        matrix.leading = leading;
                    }
                }
                "Td" | "TD" if operands.len() >= 2 => {
                    let tx = get_number(&operands[0]).unwrap_or(0.0);
                    let ty = get_number(&operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        matrix.leading = -ty;
                    }
                    matrix.translate(tx, ty);
                }
                "Tm" if operands.len() >= 6 => {
                    let n: Vec<f32> = operands.iter().take(6).map(|o| get_number(o).unwrap_or(0.0)).collect();
                    matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                }
                "T*" => matrix.next_line(),
                "Tj" | "TJ" | "'" | "\"" if in_text => {
                    if op.operator == "'" || op.operator == "\"" {
                        matrix.next_line();
                    }
                    let two_byte = font.map_or(false, |f| f.two_byte);
                    let text = match op.operator.as_str() {
                        "TJ" => operands
                            .first()
                            .map(|array| show_array(array, two_byte))
                            .unwrap_or_default(),
                        "\"" => operands.get(2).map(|s| show_string(s, two_byte)).unwrap_or_default(),
                        _ => operands.first().map(|s| show_string(s, two_byte)).unwrap_or_default(),
                    };
                    if text.trim().is_empty() {
                        continue;
                    }

                    let (x, y) = matrix.position();
                    let size = font_size * matrix.scale();
                    let chars = text.chars().count() as f32;
                    let font_name = match font {
                        Some(info) => info.base_font.clone(),
                        None => String::from_utf8_lossy(&font_key).into_owned(),
                    };
                    objects.push(TextObject::new(
                        text,
                        font_name,
                        (size > 0.0).then_some(size),
                        BoundingBox::new(
                            x,
                            y - size * DESCENT,
                            x + size * GLYPH_WIDTH * chars,
                            y + size * ASCENT,
                        ),
                    ));
                }
                _ => {}
            }
        }
        Ok(objects)
    }
}

impl TextObjectSource for LopdfBackend {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_objects(&self, page: usize) -> Result<Vec<TextObject>> {
        let page_id = self.page_id(page)?;
        self.page_text_objects(page_id)
    }
}

fn show_string(object: &Object, two_byte: bool) -> String {
    match object {
        Object::String(bytes, _) => decode_text(bytes, two_byte),
        _ => String::new(),
    }
}

/// Text of a TJ array, with large negative adjustments read as spaces.
fn show_array(object: &Object, two_byte: bool) -> String {
    let Object::Array(items) = object else {
        return String::new();
    };
    let mut combined = String::new();
    for item in items {
        match item {
            Object::String(bytes, _) => combined.push_str(&decode_text(bytes, two_byte)),
            other => {
                let Some(adjustment) = get_number(other) else {
                    continue;
                };
                let needs_space = -adjustment > TJ_SPACE_THRESHOLD
                    && combined
                        .chars()
                        .last()
                        .map_or(false, |c| !c.is_whitespace() && !is_spaceless_script_char(c));
                if needs_space {
                    combined.push(' ');
                }
            }
        }
    }
    combined
}

/// Decode string bytes; two-byte (Identity) fonts are tried as UTF-16BE first.
fn decode_text(bytes: &[u8], two_byte: bool) -> String {
    if two_byte && bytes.len() >= 2 && bytes.len() % 2 == 0 {
        let units: Vec<u16> = bytes
            .chunks(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        let decoded = String::from_utf16_lossy(&units);
        if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
            return decoded;
        }
    }
    decode_text_simple(bytes)
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Text matrix state between `BT` and `ET`.
#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    line_x: f32,
    line_y: f32,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_x: 0.0,
            line_y: 0.0,
            leading: DEFAULT_FONT_SIZE,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_x: e,
            line_y: f,
            leading: self.leading,
        };
    }

    /// Move to the start of the next line, offset from the current line start.
    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_x += tx * self.a + ty * self.c;
        self.line_y += tx * self.b + ty * self.d;
        self.e = self.line_x;
        self.f = self.line_y;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Scripts written without spaces between words.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF     // CJK Unified Ideographs
        | 0x3400..=0x4DBF   // Extension A
        | 0x3040..=0x30FF   // Hiragana, Katakana
        | 0xF900..=0xFAFF   // Compatibility Ideographs
        | 0x0E00..=0x0E7F   // Thai
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;
    use lopdf::{dictionary, Stream};

    fn build_pdf(pages: &[Vec<Operation>]) -> Vec<u8> {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let resources = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => regular, "F2" => bold },
        });

        let mut kids = Vec::new();
        for operations in pages {
            let content = Content {
                operations: operations.clone(),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn show(font: &str, size: i64, x: i64, y: i64, text: &str) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)]),
            Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]
    }

    #[test]
    fn test_text_objects_from_content_stream() {
        let mut ops = show("F2", 14, 72, 720, "Item 1. Business");
        ops.extend(show("F1", 10, 72, 700, "We make widgets."));
        let backend = LopdfBackend::load_bytes(&build_pdf(&[ops])).unwrap();

        assert_eq!(backend.page_count(), 1);
        let objects = backend.page_objects(0).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].text, "Item 1. Business");
        assert_eq!(objects[0].font_name, "Helvetica-Bold");
        assert_eq!(objects[0].font_size, Some(14.0));
        assert!((objects[0].bbox.left - 72.0).abs() < f32::EPSILON);
        assert!(objects[0].bbox.bottom < 720.0 && objects[0].bbox.top > 720.0);
        assert_eq!(objects[1].font_name, "Helvetica");
    }

    #[test]
    fn test_tj_array_spacing() {
        let ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(10)]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Net"),
                    Object::Integer(-250),
                    Object::string_literal("income"),
                    Object::Integer(-20),
                    Object::string_literal("s"),
                ])],
            ),
            Operation::new("ET", vec![]),
        ];
        let backend = LopdfBackend::load_bytes(&build_pdf(&[ops])).unwrap();
        let objects = backend.page_objects(0).unwrap();
        assert_eq!(objects[0].text, "Net incomes");
    }

    #[test]
    fn test_page_out_of_range() {
        let backend = LopdfBackend::load_bytes(&build_pdf(&[vec![]])).unwrap();
        assert!(matches!(
            backend.page_objects(3),
            Err(Error::PageOutOfRange(4, 1))
        ));
    }

    #[test]
    fn test_invalid_bytes() {
        assert!(LopdfBackend::load_bytes(b"%PDF-1.4 garbage").is_err());
    }

    #[test]
    fn test_text_matrix_leading() {
        let mut m = TextMatrix::default();
        m.set(2.0, 0.0, 0.0, 2.0, 100.0, 500.0);
        m.leading = 10.0;
        m.next_line();
        assert_eq!(m.position(), (100.0, 480.0));
        assert_eq!(m.scale(), 2.0);
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0xE9]), "H\u{e9}");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
        assert_eq!(decode_text(&[0x00, 0x41], true), "A");
    }
}
