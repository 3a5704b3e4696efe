//! Textual style signals derived from the characters of a line.

/// Words allowed to stay lower case inside a Title Case line.
const STOP_WORDS: &[&str] = &[
    "and", "or", "of", "the", "in", "on", "at", "to", "for", "with", "by", "a", "an",
];

/// Style flags inferred from text alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringStyle {
    /// Every cased character is upper case
    pub all_caps: bool,
    /// Every word is capitalized, stop words excepted
    pub proper_case: bool,
}

/// Infer `all_caps` / `proper_case` from a line of text.
///
/// The two are exclusive: an all-caps line is never reported as proper case.
pub fn check_string_style(text: &str) -> StringStyle {
    if text.trim().is_empty() {
        return StringStyle::default();
    }

    if is_upper(text) {
        return StringStyle {
            all_caps: true,
            proper_case: false,
        };
    }

    StringStyle {
        all_caps: false,
        proper_case: is_proper_case(text),
    }
}

/// At least one cased character and no lower-case ones.
fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

fn is_proper_case(text: &str) -> bool {
    // Words are separated by whitespace runs; no leading or trailing space.
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        return false;
    }
    if !text.chars().any(|c| c.is_ascii_uppercase()) {
        return false;
    }
    text.split_whitespace().all(|word| {
        if STOP_WORDS.iter().any(|s| s.eq_ignore_ascii_case(word)) {
            return true;
        }
        let mut chars = word.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_alphabetic())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_caps() {
        let style = check_string_style("ITEM 1A. RISK FACTORS");
        assert!(style.all_caps);
        assert!(!style.proper_case);

        assert!(!check_string_style("1234").all_caps);
        assert!(!check_string_style("ITEM 1a").all_caps);
    }

    #[test]
    fn test_proper_case() {
        assert!(check_string_style("Management Discussion and Analysis").proper_case);
        assert!(check_string_style("The Company").proper_case);
        assert!(check_string_style("Results of Operations").proper_case);
    }

    #[test]
    fn test_not_proper_case() {
        assert!(!check_string_style("Management discussion").proper_case);
        assert!(!check_string_style("Item 1.").proper_case);
        assert!(!check_string_style("and the").proper_case);
        assert!(!check_string_style(" Leading Space").proper_case);
        assert!(!check_string_style("Net-Income").proper_case);
    }

    #[test]
    fn test_empty() {
        assert_eq!(check_string_style(""), StringStyle::default());
        assert_eq!(check_string_style("   "), StringStyle::default());
    }
}
