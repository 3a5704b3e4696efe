//! Classification result attached to each instruction group.

use serde::{Deserialize, Serialize};

use super::Attributes;

/// Level of small print.
pub const SMALL_TEXT_LEVEL: i32 = -2;

/// Level of ordinary text, tables and images.
pub const TEXT_LEVEL: i32 = -1;

/// What kind of entry a group became.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelClass {
    /// Small print below the body size
    TextSmall,
    /// Body text, tables and images
    Text,
    /// A heading found by attribute or font heuristics
    PredictedHeader,
    /// A heading matched by a mapping rule of this class
    Rule(String),
}

impl LevelClass {
    /// Name used for the `class` field of output nodes and content items.
    pub fn name(&self) -> &str {
        match self {
            LevelClass::TextSmall => "textsmall",
            LevelClass::Text => "text",
            LevelClass::PredictedHeader => "predicted_header",
            LevelClass::Rule(class) => class,
        }
    }

    /// True for rule-matched headings.
    pub fn is_rule(&self) -> bool {
        matches!(self, LevelClass::Rule(_))
    }
}

/// Hierarchy level and class of one instruction group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// `-2` small print, `-1` body content, `>= 0` heading depth
    pub level: i32,
    /// Classification
    pub class: LevelClass,
    /// Canonical title for rule matches; empty otherwise
    pub standardized_title: String,
    /// Attributes of the group's first instruction, for heading memo keys
    pub attributes: Attributes,
}

impl Level {
    /// Ordinary body content.
    pub fn text() -> Self {
        Self {
            level: TEXT_LEVEL,
            class: LevelClass::Text,
            standardized_title: String::new(),
            attributes: Attributes::default(),
        }
    }

    /// Small print.
    pub fn text_small() -> Self {
        Self {
            level: SMALL_TEXT_LEVEL,
            class: LevelClass::TextSmall,
            ..Self::text()
        }
    }

    /// A heuristic heading at the given level.
    pub fn predicted_header(level: i32, attributes: Attributes) -> Self {
        Self {
            level,
            class: LevelClass::PredictedHeader,
            standardized_title: String::new(),
            attributes,
        }
    }

    /// A rule-matched heading.
    pub fn rule(
        level: i32,
        class: impl Into<String>,
        standardized_title: impl Into<String>,
        attributes: Attributes,
    ) -> Self {
        Self {
            level,
            class: LevelClass::Rule(class.into()),
            standardized_title: standardized_title.into(),
            attributes,
        }
    }

    /// True for any heading.
    pub fn is_heading(&self) -> bool {
        self.level >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_constructors() {
        assert_eq!(Level::text().level, -1);
        assert_eq!(Level::text_small().class.name(), "textsmall");
        assert!(!Level::text().is_heading());

        let rule = Level::rule(1, "item", "item1a", Attributes::default());
        assert!(rule.is_heading());
        assert!(rule.class.is_rule());
        assert_eq!(rule.class.name(), "item");
        assert_eq!(
            Level::predicted_header(0, Attributes::default()).class.name(),
            "predicted_header"
        );
    }
}
