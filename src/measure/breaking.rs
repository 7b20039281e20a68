//! Break-opportunity analysis.
//!
//! Text is split into grapheme clusters and grouped into tokens. Words of
//! space-delimited scripts stay whole; scripts written without spaces yield
//! one token per grapheme so a line may end after any of them.

use unicode_script::{Script, UnicodeScript};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};

/// Token kinds produced by [`tokenize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Run of graphemes from a space-delimited script
    Word,
    /// Run of whitespace
    Space,
    /// Single grapheme from a script without word spaces
    Cluster,
    /// Explicit line break
    HardBreak,
}

/// A token with its byte range and grapheme boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first grapheme
    pub start: usize,
    /// Byte offset past the last grapheme
    pub end: usize,
    /// A line may not start with this token (closing punctuation, or either
    /// side of a no-break space)
    pub no_break_before: bool,
}

/// Result of tokenizing one string.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tokens {
    pub tokens: Vec<Token>,
    /// Some graphemes had no known script and fell back to cluster breaking
    pub degraded: bool,
}

/// Scripts written without spaces between words.
const SPACELESS_SCRIPTS: &[Script] = &[
    Script::Han,
    Script::Hiragana,
    Script::Katakana,
    Script::Bopomofo,
    Script::Yi,
    Script::Thai,
    Script::Lao,
    Script::Khmer,
    Script::Myanmar,
    Script::Tibetan,
];

/// Punctuation that must not begin a line.
const CLOSING_PUNCTUATION: &[char] = &[
    '、', '。', '，', '．', '：', '；', '？', '！', '」', '』', '）', '】', '〉', '》', '〕', 'ー',
    '々', ')', ']', '}', ',', '.', ';', ':', '!', '?',
];

/// Check if the grapheme is an explicit line break.
pub(crate) fn is_hard_break(grapheme: &str) -> bool {
    matches!(grapheme, "\n" | "\r\n" | "\r" | "\u{2028}" | "\u{2029}")
}

/// Check if the grapheme is a space or joiner that forbids a break on either
/// side of it.
pub(crate) fn is_no_break_space(grapheme: &str) -> bool {
    matches!(
        grapheme,
        "\u{00A0}" | "\u{2007}" | "\u{202F}" | "\u{2060}" | "\u{FEFF}"
    )
}

/// CJK symbols and full-width forms, which are `Common` script but break like
/// ideographs.
fn is_cjk_symbol(c: char) -> bool {
    let code = c as u32;
    (0x3000..=0x303F).contains(&code) || (0xFF00..=0xFFEF).contains(&code)
}

/// Decide how a non-whitespace grapheme breaks.
///
/// Fails with [`Error::UnsupportedScriptBreak`] when the script of the
/// grapheme's base character is unknown.
pub(crate) fn classify(grapheme: &str) -> Result<TokenKind> {
    let Some(base) = grapheme.chars().next() else {
        return Ok(TokenKind::Word);
    };
    if is_cjk_symbol(base) {
        return Ok(TokenKind::Cluster);
    }
    match base.script() {
        Script::Unknown => Err(Error::UnsupportedScriptBreak(base)),
        script if SPACELESS_SCRIPTS.contains(&script) => Ok(TokenKind::Cluster),
        _ => Ok(TokenKind::Word),
    }
}

/// Split `text` into break tokens.
pub(crate) fn tokenize(text: &str) -> Tokens {
    let mut out = Tokens::default();
    let mut glue_next = false;

    for (start, grapheme) in text.grapheme_indices(true) {
        let end = start + grapheme.len();
        let no_break_space = is_no_break_space(grapheme);
        let glued = std::mem::replace(&mut glue_next, no_break_space);
        let kind = if is_hard_break(grapheme) {
            TokenKind::HardBreak
        } else if no_break_space {
            TokenKind::Word
        } else if grapheme.chars().all(char::is_whitespace) {
            TokenKind::Space
        } else {
            classify(grapheme).unwrap_or_else(|e| {
                log::debug!("{}; breaking at grapheme boundaries", e);
                out.degraded = true;
                TokenKind::Cluster
            })
        };

        let mergeable = matches!(kind, TokenKind::Word | TokenKind::Space);
        if let Some(last) = out.tokens.last_mut() {
            if mergeable && last.kind == kind && last.end == start {
                last.end = end;
                continue;
            }
        }

        let no_break_before = glued
            || no_break_space
            || grapheme
                .chars()
                .next()
                .is_some_and(|c| CLOSING_PUNCTUATION.contains(&c));
        out.tokens.push(Token {
            kind,
            start,
            end,
            no_break_before,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(TokenKind, &str)> {
        tokenize(text)
            .tokens
            .iter()
            .map(|t| (t.kind, &text[t.start..t.end]))
            .collect()
    }

    #[test]
    fn test_latin_words() {
        assert_eq!(
            kinds("Hello  world"),
            vec![
                (TokenKind::Word, "Hello"),
                (TokenKind::Space, "  "),
                (TokenKind::Word, "world"),
            ]
        );
    }

    #[test]
    fn test_hard_breaks() {
        assert_eq!(
            kinds("a\r\nb\u{2028}c"),
            vec![
                (TokenKind::Word, "a"),
                (TokenKind::HardBreak, "\r\n"),
                (TokenKind::Word, "b"),
                (TokenKind::HardBreak, "\u{2028}"),
                (TokenKind::Word, "c"),
            ]
        );
    }

    #[test]
    fn test_no_break_space_glues() {
        assert_eq!(
            kinds("a\u{a0}b 10\u{202f}km"),
            vec![
                (TokenKind::Word, "a\u{a0}b"),
                (TokenKind::Space, " "),
                (TokenKind::Word, "10\u{202f}km"),
            ]
        );

        // Between ideographs the space holds both neighbors together.
        let tokens = tokenize("漢\u{a0}字").tokens;
        assert_eq!(tokens.len(), 3);
        assert!(!tokens[0].no_break_before);
        assert!(tokens[1].no_break_before);
        assert!(tokens[2].no_break_before);
    }

    #[test]
    fn test_cjk_clusters() {
        let tokens = kinds("漢字。");
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|(k, _)| *k == TokenKind::Cluster));
        assert!(tokenize("漢字。").tokens[2].no_break_before);
    }

    #[test]
    fn test_thai_clusters() {
        // Thai has no word spaces; every grapheme is a break opportunity.
        let tokens = kinds("สวัสดี");
        assert!(tokens.len() > 1);
        assert!(tokens.iter().all(|(k, _)| *k == TokenKind::Cluster));
    }

    #[test]
    fn test_grapheme_not_split() {
        // e + combining acute stays one grapheme inside the word token.
        let text = "cafe\u{301} noir";
        let tokens = kinds(text);
        assert_eq!(tokens[0], (TokenKind::Word, "cafe\u{301}"));
    }

    #[test]
    fn test_unknown_script_degrades() {
        let out = tokenize("ab\u{E000}cd");
        assert!(out.degraded);
        assert!(out.tokens.iter().any(|t| t.kind == TokenKind::Cluster));
        assert!(matches!(
            classify("\u{E000}"),
            Err(Error::UnsupportedScriptBreak('\u{E000}'))
        ));
    }
}
