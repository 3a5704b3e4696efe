//! End-to-end tests: producer through tree for every input format.

use docstruct::model::{group_text, CellValue, ContentItem, DocumentNode, Instruction};
use docstruct::parser::html_to_instructions;
use docstruct::render::{to_json, to_markdown, JsonFormat, RenderOptions};
use docstruct::{
    convert_bytes, convert_file, html_to_tree, pdf_to_tree, text_to_tree, DocumentTree,
    MappingDict, ParseOptions, TitleQuery,
};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

fn item_mapping() -> MappingDict {
    MappingDict::from_json(r#"[{"class": "item", "pattern": "item\\s*(\\d+[a-z]?)", "level": 0}]"#)
        .unwrap()
}

fn first_section(tree: &DocumentTree) -> &DocumentNode {
    tree.sections().next().map(|(_, node)| node).unwrap()
}

fn assert_levels_increase(node: &DocumentNode, parent_level: i32) {
    assert!(
        node.level > parent_level,
        "'{}' at level {} sits under level {}",
        node.title,
        node.level,
        parent_level
    );
    for (_, child) in node.sections() {
        assert_levels_increase(child, node.level);
    }
}

#[test]
fn test_heading_tags_nest_by_attribute_combination() {
    let html = "<h1>Item 1</h1><p>Intro text.</p><h2>Item 1A</h2><p>More text.</p>";
    let tree = html_to_tree(html, &ParseOptions::default());

    let item1 = first_section(&tree);
    assert_eq!(item1.title, "Item 1");
    assert_eq!(item1.class, "predicted_header");
    assert_eq!(item1.level, 0);
    assert_eq!(item1.body_text(), "Intro text.");

    let (_, item1a) = item1.sections().next().unwrap();
    assert_eq!(item1a.title, "Item 1A");
    assert_eq!(item1a.level, 1);
    assert_eq!(item1a.body_text(), "More text.");
    assert_eq!(tree.sections().count(), 1);
}

#[test]
fn test_dash_underline_marks_heading() {
    let tree = text_to_tree(b"TOTAL\n-----\nBody line", &ParseOptions::default()).unwrap();

    let total = first_section(&tree);
    assert_eq!(total.title, "TOTAL");
    assert_eq!(total.body_text(), "Body line");
    assert!(tree.introduction().unwrap().contents.is_empty());
}

#[test]
fn test_table_cleanup_in_tree() {
    let html = "<p><b>Results</b></p>\
        <table>\
          <tr><td>Year</td><td>Sales</td><td>Units</td></tr>\
          <tr><td>Year</td><td></td><td>Units</td></tr>\
          <tr><td>2023</td><td>10</td><td>4</td></tr>\
        </table>\
        <table><tr><td>Item 1.</td><td>Business</td></tr></table>";
    let tree = html_to_tree(html, &ParseOptions::default());

    let results = first_section(&tree);
    let items: Vec<_> = results.items().map(|(_, item)| item.clone()).collect();
    assert_eq!(items.len(), 2);

    let text = |s: &str| CellValue::Text(s.to_string());
    assert_eq!(
        items[0],
        ContentItem::Table(vec![
            vec![text("Year"), text("Sales"), text("Units")],
            vec![text("2023"), text("10"), text("4")],
        ])
    );
    assert_eq!(items[1], ContentItem::Text("Item 1. Business".to_string()));
}

#[test]
fn test_blank_run_between_bold_runs_merges() {
    let groups = html_to_instructions("<p><b>Foo</b><i> </i><b>Bar</b></p><p>body</p>");

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].len(), 1);
    match &groups[0][0] {
        Instruction::Text {
            content,
            attributes,
        } => {
            assert_eq!(content, "Foo Bar");
            assert!(attributes.bold);
        }
        other => panic!("expected text, got {:?}", other),
    }
    assert_eq!(group_text(&groups[1]), "body");
}

#[test]
fn test_rule_and_predicted_headings() {
    let html = "<p><b>Item 1. Business</b></p><p>Overview text.</p>\
        <p><i>Products</i></p><p>Widgets.</p>\
        <p><b>Item 1A. Risk Factors</b></p><p>Risky.</p>";
    let options = ParseOptions::new().with_mapping(item_mapping());
    let tree = html_to_tree(html, &options);

    let sections: Vec<_> = tree.sections().map(|(_, node)| node).collect();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].standardized_title.as_deref(), Some("item1"));
    assert_eq!(sections[0].class, "item");
    assert_eq!(sections[1].standardized_title.as_deref(), Some("item1a"));
    assert_eq!(sections[1].body_text(), "Risky.");

    let (_, products) = sections[0].sections().next().unwrap();
    assert_eq!(products.title, "Products");
    assert_eq!(products.class, "predicted_header");
    assert_eq!(products.level, 1);
    assert_eq!(products.body_text(), "Widgets.");

    for (_, node) in &tree.document {
        assert_levels_increase(node, -1);
    }

    let found = tree.find_sections(TitleQuery::Exact("ITEM1A"), None).unwrap();
    assert_eq!(found.len(), 1);
    let found = tree
        .find_sections(TitleQuery::Pattern(r"item\s*1"), Some("item"))
        .unwrap();
    assert_eq!(found.len(), 2);
}

#[test]
fn test_json_round_trip() {
    let html = "<p><b>Item 1. Business</b></p><p>Overview text.</p>\
        <p><i>Products</i></p><p>Widgets.</p>";
    let tree = html_to_tree(html, &ParseOptions::new().with_mapping(item_mapping()));

    let json = to_json(&tree, JsonFormat::Compact).unwrap();
    let parsed: DocumentTree = serde_json::from_str(&json).unwrap();
    assert_eq!(to_json(&parsed, JsonFormat::Compact).unwrap(), json);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["metadata"]["parser_name"], "html2dict");
    assert_eq!(value["document"]["-1"]["class"], "introduction");
    assert_eq!(value["document"]["0"]["standardized_title"], "item1");
    assert_eq!(value["document"]["0"]["contents"]["1"]["text"], "Overview text.");
    assert_eq!(value["document"]["0"]["contents"]["2"]["title"], "Products");
}

#[test]
fn test_markdown_of_nested_sections() {
    let html = "<h1>Item 1</h1><p>Intro text.</p><h2>Item 1A</h2><p>More text.</p>";
    let tree = html_to_tree(html, &ParseOptions::default());
    let markdown = to_markdown(&tree, &RenderOptions::default()).unwrap();
    assert_eq!(markdown, "# Item 1\nIntro text.\n## Item 1A\nMore text.");
}

#[test]
fn test_declared_text_encoding() {
    let options = ParseOptions::new().with_encoding("windows-1252");
    let tree = text_to_tree(b"CAF\xc9\n-----\nWe serve coffee.", &options).unwrap();

    let section = first_section(&tree);
    assert_eq!(section.title, "CAF\u{c9}");
    assert_eq!(section.body_text(), "We serve coffee.");
}

#[test]
fn test_txt_file_with_leading_tag_stays_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filing.txt");
    std::fs::write(
        &path,
        "<PAGE>\nITEM 1. BUSINESS\n\nWe make widgets.\n\nWe sell widgets.\n",
    )
    .unwrap();

    let tree = convert_file(&path, &ParseOptions::default()).unwrap();
    assert_eq!(tree.metadata.parser_name, "txt2dict");

    let found = tree
        .find_sections(TitleQuery::Pattern(r".*item 1\. business"), None)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].1.body_text(), "We make widgets.\nWe sell widgets.");
}

#[test]
fn test_empty_inputs_give_empty_trees() {
    let tree = html_to_tree("<html><body></body></html>", &ParseOptions::default());
    assert_eq!(tree.sections().count(), 0);
    assert!(tree.introduction().unwrap().contents.is_empty());

    let tree = text_to_tree(b"\n\n   \n", &ParseOptions::default()).unwrap();
    assert_eq!(tree.sections().count(), 0);
}

fn build_pdf(operations: Vec<Operation>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
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
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
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

fn show(font: &str, size: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), size.into()]),
        Operation::new("Td", vec![72.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

#[test]
fn test_pdf_headings_by_font_size() {
    let mut ops = show("F2", 18, 740, "Annual Report");
    ops.extend(show("F2", 14, 700, "Business"));
    ops.extend(show("F1", 10, 680, "We make widgets."));
    ops.extend(show("F1", 10, 665, "We sell widgets."));
    let bytes = build_pdf(ops);

    let tree = pdf_to_tree(&bytes, &ParseOptions::default()).unwrap();
    assert_eq!(tree.metadata.parser_name, "pdf2dict");

    let report = first_section(&tree);
    assert_eq!(report.title, "Annual Report");
    let (_, business) = report.sections().next().unwrap();
    assert_eq!(business.title, "Business");
    assert_eq!(business.body_text(), "We make widgets.\nWe sell widgets.");

    // Format detection routes the same bytes to the PDF producer.
    let detected = convert_bytes(&bytes, &ParseOptions::default()).unwrap();
    assert_eq!(detected, tree);
}
