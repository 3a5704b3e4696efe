//! Fold a leveled instruction stream into a [`DocumentTree`].

use std::collections::BTreeMap;

use crate::model::{
    CellValue, Content, ContentItem, DocumentNode, DocumentTree, ImageRef, Instruction,
    InstructionGroup, Level, LevelClass, TableCell, TreeMetadata, INTRODUCTION_KEY,
};

/// Title of a heading group with no text.
pub const NON_TEXT_TITLE: &str = "[Non-text header]";

const ROOT: usize = 0;
const INTRODUCTION: usize = 1;

enum Child {
    Node(usize),
    Item(ContentItem),
}

struct ArenaNode {
    node: DocumentNode,
    children: Vec<(i64, Child)>,
}

/// Nodes live in a flat arena while the stack machine runs; the nested
/// tree is assembled once every group has been placed.
struct Arena {
    nodes: Vec<ArenaNode>,
}

impl Arena {
    fn new() -> Self {
        let root = ArenaNode {
            node: DocumentNode::new("", "", -1),
            children: vec![(INTRODUCTION_KEY, Child::Node(INTRODUCTION))],
        };
        let introduction = ArenaNode {
            node: DocumentNode::introduction(),
            children: Vec::new(),
        };
        Self {
            nodes: vec![root, introduction],
        }
    }

    fn add_node(&mut self, parent: usize, key: i64, node: DocumentNode) -> usize {
        let id = self.nodes.len();
        self.nodes.push(ArenaNode {
            node,
            children: Vec::new(),
        });
        self.nodes[parent].children.push((key, Child::Node(id)));
        id
    }

    fn add_item(&mut self, parent: usize, key: i64, item: ContentItem) {
        self.nodes[parent].children.push((key, Child::Item(item)));
    }

    fn assemble(&mut self, id: usize) -> DocumentNode {
        let children = std::mem::take(&mut self.nodes[id].children);
        let mut contents = BTreeMap::new();
        for (key, child) in children {
            let content = match child {
                Child::Node(child_id) => Content::Section(self.assemble(child_id)),
                Child::Item(item) => Content::Item(item),
            };
            contents.insert(key, content);
        }
        let mut node = std::mem::replace(&mut self.nodes[id].node, DocumentNode::new("", "", 0));
        node.contents = contents;
        node
    }
}

/// Heading title: the group's text, or a placeholder for non-text headings.
fn heading_title(group: &[Instruction]) -> String {
    match group.first() {
        Some(Instruction::Text { .. }) => group.iter().filter_map(Instruction::as_text).collect(),
        _ => NON_TEXT_TITLE.to_string(),
    }
}

fn cell_value(cell: &TableCell) -> CellValue {
    match cell {
        TableCell::Text { text, .. } => CellValue::Text(text.clone()),
        TableCell::Image { src, alt } => CellValue::Image {
            image: ImageRef {
                src: src.clone(),
                alt: alt.clone(),
            },
        },
    }
}

/// One content item for a text-level group.
///
/// Tables and images take the whole group; text runs concatenate into a
/// `text` or `textsmall` item.
fn content_item(group: &[Instruction], class: &LevelClass) -> Option<ContentItem> {
    let mut text: Option<String> = None;
    for inst in group {
        match inst {
            Instruction::Table { matrix, .. } => {
                return Some(ContentItem::Table(
                    matrix.iter().map(|row| row.iter().map(cell_value).collect()).collect(),
                ));
            }
            Instruction::Image { src, alt, .. } => {
                return Some(ContentItem::Image(ImageRef {
                    src: src.clone(),
                    alt: alt.clone(),
                }));
            }
            Instruction::Text { content, .. } => {
                text.get_or_insert_with(String::new).push_str(content);
            }
        }
    }
    text.map(|text| match class {
        LevelClass::TextSmall => ContentItem::TextSmall(text),
        _ => ContentItem::Text(text),
    })
}

/// Build the tree from groups and their levels.
///
/// Content before the first heading lands in the introduction. A heading
/// closes every open section at its level or deeper and opens a new one.
/// Keys are group indices.
pub fn build_tree(
    groups: &[InstructionGroup],
    levels: &[Level],
    metadata: TreeMetadata,
) -> DocumentTree {
    let mut arena = Arena::new();
    let mut stack: Vec<(usize, i32)> = vec![(ROOT, -1)];
    let mut current = INTRODUCTION;

    for (idx, (group, level)) in groups.iter().zip(levels).enumerate() {
        let key = idx as i64;
        if level.is_heading() {
            while stack.len() > 1 && stack.last().map_or(false, |&(_, l)| l >= level.level) {
                stack.pop();
            }
            let parent = stack.last().map_or(ROOT, |&(id, _)| id);

            let mut node = DocumentNode::new(heading_title(group), level.class.name(), level.level);
            if !level.standardized_title.is_empty() {
                node.standardized_title = Some(level.standardized_title.clone());
            }
            let id = arena.add_node(parent, key, node);
            stack.push((id, level.level));
            current = id;
        } else if let Some(item) = content_item(group, &level.class) {
            arena.add_item(current, key, item);
        }
    }

    let root = arena.assemble(ROOT);
    let mut tree = DocumentTree::new(metadata);
    for (key, content) in root.contents {
        if let Content::Section(node) = content {
            tree.document.insert(key, node);
        }
    }
    log::debug!("tree built with {} top-level node(s)", tree.document.len());
    tree
}
