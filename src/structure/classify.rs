//! Heading-level classification of instruction groups.
//!
//! Every group gets a [`Level`] from its first instruction: small print,
//! body text, a rule-matched heading, or a predicted heading whose depth is
//! worked out from the attribute combinations seen within each section.

use std::collections::{BTreeMap, HashMap};

use unicode_normalization::UnicodeNormalization;

use crate::model::{Attributes, Instruction, InstructionGroup, Level, LevelClass};
use crate::structure::mapping::MappingDict;

/// Share of all groups the most common font size must exceed to be the body size.
pub const BODY_DOMINANCE: f32 = 0.5;

/// Sizes above this multiple of the body size count as big script.
pub const BIG_SCRIPT_RATIO: f32 = 1.2;

/// Font sizes of groups whose first instruction is text.
#[derive(Debug, Clone, Default)]
pub struct FontHistogram {
    counts: BTreeMap<u32, usize>,
    groups: usize,
}

impl FontHistogram {
    /// Count the first-instruction font sizes of the groups.
    pub fn from_groups(groups: &[InstructionGroup]) -> Self {
        let mut counts = BTreeMap::new();
        for size in groups.iter().filter_map(|g| first_text_size(g)) {
            *counts.entry(size_key(size)).or_insert(0) += 1;
        }
        Self {
            counts,
            groups: groups.len(),
        }
    }

    /// The most common size and its count; ties go to the smaller size.
    pub fn most_common(&self) -> Option<(f32, usize)> {
        let mut best: Option<(f32, usize)> = None;
        for (&key, &count) in &self.counts {
            let size = f32::from_bits(key);
            best = match best {
                Some((best_size, best_count))
                    if best_count > count || (best_count == count && best_size <= size) =>
                {
                    Some((best_size, best_count))
                }
                _ => Some((size, count)),
            };
        }
        best
    }

    /// The body size, if one size covers more than half of all groups.
    pub fn body_size(&self) -> Option<f32> {
        self.most_common()
            .filter(|&(_, count)| count as f32 > BODY_DOMINANCE * self.groups as f32)
            .map(|(size, _)| size)
    }

    /// Distinct sizes, largest first.
    pub fn sizes_descending(&self) -> Vec<f32> {
        let mut sizes: Vec<f32> = self.counts.keys().map(|&k| f32::from_bits(k)).collect();
        sizes.sort_by(|a, b| b.total_cmp(a));
        sizes
    }

    /// True if no group carried a font size.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

fn size_key(size: f32) -> u32 {
    // Fold -0.0 into 0.0 so equal sizes share a bucket.
    (size + 0.0).to_bits()
}

fn first_text(group: &[Instruction]) -> Option<(&str, &Attributes)> {
    match group.first() {
        Some(Instruction::Text {
            content,
            attributes,
        }) => Some((content, attributes)),
        _ => None,
    }
}

fn first_text_size(group: &[Instruction]) -> Option<f32> {
    first_text(group).and_then(|(_, attrs)| attrs.font_size)
}

/// Big-script flags: first text instruction larger than 1.2 × the body size.
fn big_script_flags(groups: &[InstructionGroup], histogram: &FontHistogram) -> Vec<bool> {
    let Some(body) = histogram.body_size() else {
        return vec![false; groups.len()];
    };
    groups
        .iter()
        .map(|g| first_text_size(g).map_or(false, |size| size > BIG_SCRIPT_RATIO * body))
        .collect()
}

/// Split groups that open with a heading-like run.
///
/// A group with more than one instruction whose first instruction is text
/// carrying a header attribute (or big script) becomes two groups: the
/// first instruction, then the rest.
pub fn split_header_groups(groups: Vec<InstructionGroup>) -> Vec<InstructionGroup> {
    let histogram = FontHistogram::from_groups(&groups);
    let big_script = big_script_flags(&groups, &histogram);

    let mut result = Vec::with_capacity(groups.len());
    for (mut group, big) in groups.into_iter().zip(big_script) {
        let header_like = first_text(&group)
            .map_or(false, |(_, attrs)| attrs.has_header_signal() || big);
        if group.len() > 1 && header_like {
            let rest = group.split_off(1);
            result.push(group);
            result.push(rest);
        } else {
            result.push(group);
        }
    }
    result
}

/// NFKC, lower case and trimmed: the form mapping rules are matched against.
pub fn normalize_header_text(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase().trim().to_string()
}

/// Assign a level to every group.
pub fn determine_levels(groups: &[InstructionGroup], mapping: Option<&MappingDict>) -> Vec<Level> {
    let histogram = FontHistogram::from_groups(groups);

    if let Some(MappingDict::FontSizeOnly) = mapping {
        return font_size_levels(groups, &histogram);
    }

    let base_level = mapping.map_or(0, MappingDict::rule_base_level);
    let body = histogram.body_size();
    match body {
        Some(size) => log::debug!("body font size {}", size),
        None if !histogram.is_empty() => log::debug!("no dominant font size"),
        None => {}
    }

    let mut levels: Vec<Level> = groups
        .iter()
        .map(|group| {
            let Some((text, attrs)) = first_text(group) else {
                return Level::text();
            };
            let size = attrs.font_size;
            if let (Some(body), Some(size)) = (body, size) {
                if size < body {
                    return Level::text_small();
                }
            }
            let big = matches!((body, size), (Some(body), Some(size)) if size > BIG_SCRIPT_RATIO * body);
            if !(attrs.has_header_signal() || big) {
                return Level::text();
            }
            if let Some(mapping) = mapping {
                if let Some((rule, title)) = mapping.match_rule(&normalize_header_text(text)) {
                    return Level::rule(rule.level, rule.class.clone(), title, attrs.clone());
                }
            }
            Level::predicted_header(base_level, attrs.clone())
        })
        .collect();

    determine_predicted_header_levels(&mut levels);
    levels
}

/// Levels from font size rank alone.
///
/// The most common size is body text and smaller sizes are small print.
/// Larger sizes become headings at their rank among all distinct sizes,
/// largest first. A group carrying a header attribute is ranked at body
/// size too.
fn font_size_levels(groups: &[InstructionGroup], histogram: &FontHistogram) -> Vec<Level> {
    let Some((body, _)) = histogram.most_common() else {
        return vec![Level::text(); groups.len()];
    };
    let ranks: HashMap<u32, i32> = histogram
        .sizes_descending()
        .into_iter()
        .enumerate()
        .map(|(rank, size)| (size_key(size), rank as i32))
        .collect();

    groups
        .iter()
        .map(|group| match first_text(group) {
            Some((_, attrs)) => match attrs.font_size {
                Some(size) if size < body => Level::text_small(),
                Some(size) if size > body || attrs.has_header_signal() => {
                    let rank = ranks.get(&size_key(size)).copied().unwrap_or(0);
                    Level::predicted_header(rank, attrs.clone())
                }
                _ => Level::text(),
            },
            None => Level::text(),
        })
        .collect()
}

/// Memo key of a predicted heading: its set header flags and font size.
///
/// The size is part of the key on purpose. Two headings with the same flags
/// but different sizes (an `<h1>` and an `<h2>`, both bold) must land on
/// different levels.
fn header_key(attrs: &Attributes) -> (u8, Option<u32>) {
    let flags = [
        attrs.bold,
        attrs.italic,
        attrs.underline,
        attrs.text_center,
        attrs.all_caps,
        attrs.fake_table,
        attrs.proper_case,
    ];
    let bits = flags
        .iter()
        .enumerate()
        .fold(0u8, |acc, (i, &set)| if set { acc | (1 << i) } else { acc });
    (bits, attrs.font_size.map(size_key))
}

/// Give predicted headings their depth.
///
/// Within a section, each new attribute combination gets the next level
/// after the predicted base. A rule-matched heading at or above the current
/// section level starts a new section and forgets the combinations seen.
pub fn determine_predicted_header_levels(levels: &mut [Level]) {
    let Some(base) = levels
        .iter()
        .filter(|l| l.class == LevelClass::PredictedHeader)
        .map(|l| l.level)
        .min()
    else {
        return;
    };

    let mut current_section_level = -1;
    let mut memo: HashMap<(u8, Option<u32>), i32> = HashMap::new();

    for level in levels.iter_mut() {
        match &level.class {
            LevelClass::Rule(_) => {
                if level.level <= current_section_level {
                    memo.clear();
                }
                current_section_level = level.level;
            }
            LevelClass::PredictedHeader => {
                let next = base + memo.len() as i32;
                level.level = *memo.entry(header_key(&level.attributes)).or_insert(next);
            }
            LevelClass::Text | LevelClass::TextSmall => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TableCell, TEXT_LEVEL};
    use crate::structure::mapping::MappingRule;

    fn sized(text: &str, size: f32) -> InstructionGroup {
        vec![Instruction::text(text, Attributes::new().with_font_size(size))]
    }

    fn bold(text: &str, size: f32) -> InstructionGroup {
        vec![Instruction::text(
            text,
            Attributes::new().with_bold(true).with_font_size(size),
        )]
    }

    fn level_numbers(levels: &[Level]) -> Vec<i32> {
        levels.iter().map(|l| l.level).collect()
    }

    #[test]
    fn test_histogram_tie_prefers_smaller() {
        let groups = vec![sized("a", 12.0), sized("b", 10.0)];
        let histogram = FontHistogram::from_groups(&groups);
        assert_eq!(histogram.most_common(), Some((10.0, 1)));
        assert_eq!(histogram.body_size(), None);
        assert_eq!(histogram.sizes_descending(), vec![12.0, 10.0]);
    }

    #[test]
    fn test_small_and_big_script() {
        let groups = vec![
            sized("Annual Report", 20.0),
            sized("Body one.", 10.0),
            sized("Body two.", 10.0),
            sized("Body three.", 10.0),
            sized("Footnote.", 8.0),
        ];
        let levels = determine_levels(&groups, None);
        assert_eq!(level_numbers(&levels), vec![0, -1, -1, -1, -2]);
        assert_eq!(levels[0].class, LevelClass::PredictedHeader);
        assert_eq!(levels[4].class, LevelClass::TextSmall);
    }

    #[test]
    fn test_no_dominant_size_is_flat() {
        let groups = vec![sized("a", 10.0), sized("b", 12.0), sized("c", 14.0)];
        let levels = determine_levels(&groups, None);
        assert!(levels.iter().all(|l| l.level == TEXT_LEVEL));
    }

    #[test]
    fn test_non_text_groups_are_text_level() {
        let groups = vec![
            vec![Instruction::image("a.png", None, Attributes::new().with_bold(true))],
            vec![Instruction::Table {
                matrix: vec![vec![TableCell::text("x")]],
                cleaned: true,
            }],
        ];
        let levels = determine_levels(&groups, None);
        assert_eq!(level_numbers(&levels), vec![-1, -1]);
    }

    #[test]
    fn test_rules_match_normalized_text() {
        let mapping = MappingDict::rules(vec![
            MappingRule::new("part", "part\\s+(i+)", 0).unwrap(),
            MappingRule::new("item", "item\\s*(\\d+[a-z]?)", 1).unwrap(),
        ]);
        let groups = vec![
            bold("PART I", 10.0),
            bold("  ITEM\u{a0}1A. Risk Factors ", 10.0),
            sized("item 2 mentioned in plain text", 10.0),
            bold("Cybersecurity", 10.0),
        ];
        let levels = determine_levels(&groups, Some(&mapping));
        assert_eq!(levels[0].standardized_title, "parti");
        assert_eq!(levels[1].standardized_title, "item1a");
        assert_eq!(levels[1].class.name(), "item");
        assert_eq!(levels[2].level, TEXT_LEVEL);
        assert_eq!(levels[3].class, LevelClass::PredictedHeader);
        assert_eq!(levels[3].level, 2);
    }

    #[test]
    fn test_predicted_levels_by_attribute_combination() {
        let caps = Attributes {
            bold: true,
            all_caps: true,
            ..Attributes::default()
        };
        let groups = vec![
            vec![Instruction::text("OVERVIEW", caps.clone())],
            bold("Products", 10.0),
            sized("text", 10.0),
            bold("Services", 10.0),
            vec![Instruction::text("COMPETITION", caps)],
        ];
        let levels = determine_levels(&groups, None);
        assert_eq!(level_numbers(&levels), vec![0, 1, -1, 1, 0]);
    }

    #[test]
    fn test_rule_heading_resets_memo() {
        let mapping = MappingDict::rules(vec![MappingRule::new("item", "item\\s*(\\d+)", 0).unwrap()]);
        let italic = |t: &str| vec![Instruction::text(t, Attributes::new().with_italic(true))];
        let groups = vec![
            bold("Item 1", 10.0),
            bold("Sub A", 12.0),
            italic("Sub B"),
            bold("Item 2", 10.0),
            italic("Sub C"),
        ];
        let levels = determine_levels(&groups, Some(&mapping));
        assert_eq!(level_numbers(&levels), vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn test_font_size_only() {
        let groups = vec![
            sized("Title", 24.0),
            sized("Section", 16.0),
            sized("Body", 10.0),
            sized("Body", 10.0),
            sized("Note", 8.0),
            vec![Instruction::image("x.png", None, Attributes::new())],
        ];
        let levels = determine_levels(&groups, Some(&MappingDict::font_size_only()));
        assert_eq!(level_numbers(&levels), vec![0, 1, -1, -1, -2, -1]);
    }

    #[test]
    fn test_font_size_only_ranks_bold_body_size() {
        let groups = vec![
            bold("Item 1. Business", 10.0),
            sized("We make widgets.", 10.0),
            sized("We sell widgets.", 10.0),
            sized("We ship widgets.", 10.0),
            bold("Note", 8.0),
        ];
        let levels = determine_levels(&groups, Some(&MappingDict::font_size_only()));
        assert_eq!(level_numbers(&levels), vec![0, -1, -1, -1, -2]);
        assert_eq!(levels[0].class, LevelClass::PredictedHeader);
        assert_eq!(levels[1].class, LevelClass::Text);
    }

    #[test]
    fn test_split_header_groups() {
        let groups = vec![
            vec![
                Instruction::text("Item 1.", Attributes::new().with_bold(true)),
                Instruction::plain(" We make widgets."),
            ],
            vec![Instruction::plain("a"), Instruction::text("b", Attributes::new().with_bold(true))],
        ];
        let split = split_header_groups(groups);
        assert_eq!(split.len(), 3);
        assert_eq!(split[0].len(), 1);
        assert_eq!(split[1][0].as_text(), Some(" We make widgets."));
        assert_eq!(split[2].len(), 2);
    }

    #[test]
    fn test_normalize_header_text() {
        assert_eq!(normalize_header_text("  ＩＴＥＭ 1A "), "item 1a");
        assert_eq!(normalize_header_text("Item\u{a0}7"), "item 7");
    }
}
