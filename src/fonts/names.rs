//! Font-name parsing and family comparison.
//!
//! PDF producers emit PostScript-style names such as `ABCDEF+Arial-BoldMT`.
//! This module turns them into a family/weight/style descriptor and scores how
//! close two family names are.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::FontStyle;

/// Weight keywords, longest first so that "semibold" wins over "bold".
const WEIGHT_KEYWORDS: &[(&str, u16)] = &[
    ("extralight", 200),
    ("ultralight", 200),
    ("extrabold", 800),
    ("ultrabold", 800),
    ("semibold", 600),
    ("demibold", 600),
    ("regular", 400),
    ("medium", 500),
    ("normal", 400),
    ("black", 900),
    ("heavy", 800),
    ("light", 300),
    ("roman", 400),
    ("thin", 100),
    ("bold", 700),
    ("book", 400),
    ("demi", 600),
];

/// Families with interchangeable advance widths.
const METRIC_COMPATIBLE_GROUPS: &[&[&str]] = &[
    &[
        "arial",
        "helvetica",
        "arimo",
        "liberationsans",
        "nimbussans",
        "nimbussansl",
        "freesans",
    ],
    &[
        "times",
        "timesroman",
        "timesnewroman",
        "tinos",
        "liberationserif",
        "nimbusroman",
        "nimbusromanno9l",
        "freeserif",
    ],
    &[
        "courier",
        "couriernew",
        "cousine",
        "liberationmono",
        "nimbusmono",
        "nimbusmonol",
        "nimbusmonops",
        "freemono",
    ],
];

/// Family distance between two members of the same compatible group.
pub const COMPATIBLE_FAMILY_DISTANCE: f32 = 0.05;

/// Lower bound of the distance between unrelated families.
const MIN_UNRELATED_DISTANCE: f32 = 0.1;

fn subset_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{6}\+").unwrap())
}

/// Remove the subset tag that embedded fonts carry (`ABCDEF+Name` → `Name`).
pub fn strip_subset_prefix(name: &str) -> &str {
    match subset_prefix().find(name) {
        Some(m) => &name[m.end()..],
        None => name,
    }
}

/// Family, weight and style parsed from a font name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontDescriptor {
    /// Family name as written (vendor suffixes removed)
    pub family: String,
    /// Weight on the CSS scale
    pub weight: u16,
    /// Slant
    pub style: FontStyle,
}

impl FontDescriptor {
    /// Parse a PostScript or display font name.
    pub fn parse(name: &str) -> Self {
        let name = strip_subset_prefix(name.trim());

        let (family, suffix) = match name.find([',', '-']) {
            Some(pos) => (&name[..pos], name[pos + 1..].to_string()),
            None => split_trailing_keywords(name),
        };

        let suffix = suffix.to_lowercase();
        let style = if suffix.contains("italic") || suffix.ends_with("it") {
            FontStyle::Italic
        } else if suffix.contains("oblique") {
            FontStyle::Oblique
        } else {
            FontStyle::Normal
        };
        let weight = WEIGHT_KEYWORDS
            .iter()
            .find(|(kw, _)| suffix.contains(kw))
            .map(|(_, w)| *w)
            .unwrap_or(400);

        let family = strip_vendor_suffix(family.trim());
        Self {
            family: if family.is_empty() {
                name.to_string()
            } else {
                family.to_string()
            },
            weight,
            style,
        }
    }
}

/// Split "Arial Bold Italic" into ("Arial", "bold italic").
fn split_trailing_keywords(name: &str) -> (&str, String) {
    let words: Vec<&str> = name.split_whitespace().collect();
    let mut keep = words.len();
    while keep > 1 && is_style_keyword(words[keep - 1]) {
        keep -= 1;
    }
    if keep == words.len() {
        return (name, String::new());
    }
    let family_end = words[..keep]
        .last()
        .and_then(|last| name.find(last).map(|pos| pos + last.len()))
        .unwrap_or(name.len());
    (&name[..family_end], words[keep..].join(" "))
}

fn is_style_keyword(word: &str) -> bool {
    let lower = word.to_lowercase();
    lower == "italic"
        || lower == "oblique"
        || WEIGHT_KEYWORDS.iter().any(|(kw, _)| lower == *kw)
}

/// Drop Monotype/PostScript tags such as `ArialMT` or `TimesNewRomanPSMT`.
fn strip_vendor_suffix(family: &str) -> &str {
    for tag in ["PSMT", "MT", "PS"] {
        if let Some(stripped) = family.strip_suffix(tag) {
            if !stripped.is_empty() {
                return stripped;
            }
        }
    }
    family
}

/// Comparison key for a family name: NFKC, lowercase, alphanumerics only.
pub fn family_key(family: &str) -> String {
    family
        .nfkc()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

fn compatible_group(key: &str) -> Option<usize> {
    METRIC_COMPATIBLE_GROUPS
        .iter()
        .position(|group| group.contains(&key))
}

/// Distance in [0, 1] between two family names (0 = same family).
pub fn family_distance(a: &str, b: &str) -> f32 {
    let (ka, kb) = (family_key(a), family_key(b));
    if ka == kb {
        return 0.0;
    }
    if let (Some(ga), Some(gb)) = (compatible_group(&ka), compatible_group(&kb)) {
        if ga == gb {
            return COMPATIBLE_FAMILY_DISTANCE;
        }
    }
    (1.0 - dice_similarity(&ka, &kb)).max(MIN_UNRELATED_DISTANCE)
}

/// Sørensen–Dice coefficient over character bigrams.
fn dice_similarity(a: &str, b: &str) -> f32 {
    fn bigrams(s: &str) -> BTreeSet<(char, char)> {
        let chars: Vec<char> = s.chars().collect();
        chars.windows(2).map(|w| (w[0], w[1])).collect()
    }
    let (ba, bb) = (bigrams(a), bigrams(b));
    if ba.is_empty() || bb.is_empty() {
        return 0.0;
    }
    let shared = ba.intersection(&bb).count();
    (2 * shared) as f32 / (ba.len() + bb.len()) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_subset_prefix() {
        assert_eq!(strip_subset_prefix("ABCDEF+Arial-Bold"), "Arial-Bold");
        assert_eq!(strip_subset_prefix("Arial-Bold"), "Arial-Bold");
        assert_eq!(strip_subset_prefix("abcdef+Arial"), "abcdef+Arial");
    }

    #[test]
    fn test_parse_postscript_names() {
        let d = FontDescriptor::parse("ABCDEF+Arial-BoldMT");
        assert_eq!(d.family, "Arial");
        assert_eq!(d.weight, 700);
        assert_eq!(d.style, FontStyle::Normal);

        let d = FontDescriptor::parse("TimesNewRomanPS-BoldItalicMT");
        assert_eq!(d.family, "TimesNewRoman");
        assert_eq!(d.weight, 700);
        assert_eq!(d.style, FontStyle::Italic);

        let d = FontDescriptor::parse("Helvetica-Oblique");
        assert_eq!(d.style, FontStyle::Oblique);
        assert_eq!(d.weight, 400);

        let d = FontDescriptor::parse("Roboto-SemiBold");
        assert_eq!(d.weight, 600);
    }

    #[test]
    fn test_parse_display_names() {
        let d = FontDescriptor::parse("Open Sans Light Italic");
        assert_eq!(d.family, "Open Sans");
        assert_eq!(d.weight, 300);
        assert_eq!(d.style, FontStyle::Italic);

        let d = FontDescriptor::parse("Garamond");
        assert_eq!(d.family, "Garamond");
        assert_eq!(d.weight, 400);
    }

    #[test]
    fn test_family_key() {
        assert_eq!(family_key("Times New Roman"), "timesnewroman");
        assert_eq!(family_key("TimesNewRoman"), "timesnewroman");
    }

    #[test]
    fn test_family_distance() {
        assert_eq!(family_distance("Arial", "arial"), 0.0);
        assert_eq!(
            family_distance("Arial", "Helvetica"),
            COMPATIBLE_FAMILY_DISTANCE
        );
        assert_eq!(
            family_distance("Times New Roman", "Liberation Serif"),
            COMPATIBLE_FAMILY_DISTANCE
        );
        let unrelated = family_distance("Arial", "Garamond");
        assert!(unrelated > 0.5);
        let similar = family_distance("Noto Sans", "Noto Serif");
        assert!(similar < unrelated);
        assert!(similar >= MIN_UNRELATED_DISTANCE);
    }
}
