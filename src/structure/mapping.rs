//! Heading mapping dictionaries.
//!
//! Two JSON shapes are accepted:
//!
//! ```json
//! [{ "class": "item", "pattern": "item\\s*(\\d+[a-z]?)", "level": 1 }]
//! ```
//!
//! ```json
//! { "rules": { "use_font_size_only_for_level": true } }
//! ```

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One heading rule: a regex matched at the start of normalized header text.
#[derive(Debug, Clone)]
pub struct MappingRule {
    /// Class given to matching headings
    pub class: String,
    /// Source pattern as configured
    pub pattern: String,
    /// Heading level given to matching headings
    pub level: i32,
    regex: Regex,
}

impl MappingRule {
    /// Compile a rule. The pattern only has to match a prefix of the text.
    pub fn new(class: impl Into<String>, pattern: impl Into<String>, level: i32) -> Result<Self> {
        let class = class.into();
        let pattern = pattern.into();
        if class.trim().is_empty() {
            return Err(Error::InvalidRule {
                class,
                message: "class must not be empty".to_string(),
            });
        }
        if level < 0 {
            return Err(Error::InvalidRule {
                class,
                message: format!("level must be >= 0, got {}", level),
            });
        }
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|e| Error::InvalidRule {
            class: class.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            class,
            pattern,
            level,
            regex,
        })
    }

    /// Match normalized header text; returns the standardized title.
    ///
    /// The standardized title is the class followed by every capture group
    /// that participated in the match.
    pub fn standardize(&self, text: &str) -> Option<String> {
        let captures = self.regex.captures(text)?;
        let mut title = self.class.clone();
        for group in captures.iter().skip(1).flatten() {
            title.push_str(group.as_str());
        }
        Some(title)
    }
}

/// How headings are identified and leveled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawMapping", into = "RawMapping")]
pub enum MappingDict {
    /// Ordered regex rules; the first match wins
    Rules(Vec<MappingRule>),
    /// Rank headings by font size alone
    FontSizeOnly,
}

impl MappingDict {
    /// Build a rule list mapping.
    pub fn rules(rules: Vec<MappingRule>) -> Self {
        MappingDict::Rules(rules)
    }

    /// The font-size-only directive.
    pub fn font_size_only() -> Self {
        MappingDict::FontSizeOnly
    }

    /// Parse a mapping from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a mapping from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Level given to heuristic headings before per-section assignment.
    ///
    /// One past the deepest rule level, so predicted headings nest below
    /// rule-matched ones. Sparse rule levels are not renumbered.
    pub fn rule_base_level(&self) -> i32 {
        match self {
            MappingDict::Rules(rules) => rules.iter().map(|r| r.level + 1).max().unwrap_or(0),
            MappingDict::FontSizeOnly => 0,
        }
    }

    /// First rule matching the text, with its standardized title.
    pub fn match_rule(&self, text: &str) -> Option<(&MappingRule, String)> {
        match self {
            MappingDict::Rules(rules) => rules
                .iter()
                .find_map(|rule| rule.standardize(text).map(|title| (rule, title))),
            MappingDict::FontSizeOnly => None,
        }
    }

    /// Check for the font-size-only directive.
    pub fn is_font_size_only(&self) -> bool {
        matches!(self, MappingDict::FontSizeOnly)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRule {
    class: String,
    pattern: String,
    level: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawDirective {
    #[serde(default)]
    use_font_size_only_for_level: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawMapping {
    Rules(Vec<RawRule>),
    Directive { rules: RawDirective },
}

impl TryFrom<RawMapping> for MappingDict {
    type Error = Error;

    fn try_from(raw: RawMapping) -> Result<Self> {
        match raw {
            RawMapping::Rules(rules) => rules
                .into_iter()
                .map(|r| MappingRule::new(r.class, r.pattern, r.level))
                .collect::<Result<Vec<_>>>()
                .map(MappingDict::Rules),
            RawMapping::Directive { rules } if rules.use_font_size_only_for_level => {
                Ok(MappingDict::FontSizeOnly)
            }
            RawMapping::Directive { .. } => Ok(MappingDict::Rules(Vec::new())),
        }
    }
}

impl From<MappingDict> for RawMapping {
    fn from(mapping: MappingDict) -> Self {
        match mapping {
            MappingDict::Rules(rules) => RawMapping::Rules(
                rules
                    .into_iter()
                    .map(|r| RawRule {
                        class: r.class,
                        pattern: r.pattern,
                        level: r.level,
                    })
                    .collect(),
            ),
            MappingDict::FontSizeOnly => RawMapping::Directive {
                rules: RawDirective {
                    use_font_size_only_for_level: true,
                },
            },
        }
    }
}
