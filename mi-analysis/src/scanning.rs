//! Line scanner for bracket and variable tokens.
//!
//!     Two token shapes are recognized on every line:
//!
//!         [type:modifier:modifier]    bracket token, the span covers the text between the brackets
//!         ${name:modifier}            variable token, the span covers the whole `${...}` construct
//!
//!     Each line is scanned twice, once per shape, and the bracket tokens of a line are emitted
//!     before its variable tokens. Delimiters are never matched across lines and are not nesting
//!     aware: an opener is closed by the first closer that follows it. An opener without a closer
//!     ends that pass for the line without producing anything.
//!
//!     Columns and lengths are measured in UTF-16 code units, the default position encoding of
//!     the highlighting host.

/// Classification given to every `${...}` token regardless of its inner text.
pub const VARIABLE_TOKEN_TYPE: &str = "var";

const BRACKET_OPEN: char = '[';
const BRACKET_CLOSE: char = ']';
const VARIABLE_OPEN: &str = "${";
const VARIABLE_CLOSE: char = '}';
const SEGMENT_SEPARATOR: char = ':';

/// A classified span found by the scanner, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedToken {
    pub line: u32,
    pub start_character: u32,
    pub length: u32,
    pub token_type: String,
    pub token_modifiers: Vec<String>,
}

/// Scan a whole document.
pub fn scan(text: &str) -> Vec<ParsedToken> {
    let mut tokens = Vec::new();
    for (index, line) in split_lines(text).enumerate() {
        scan_line(index as u32, line, &mut tokens);
    }
    tokens
}

/// Scan a single line, appending its bracket tokens and then its variable tokens.
pub fn scan_line(line_index: u32, line: &str, tokens: &mut Vec<ParsedToken>) {
    scan_brackets(line_index, line, tokens);
    scan_variables(line_index, line, tokens);
}

fn scan_brackets(line_index: u32, line: &str, tokens: &mut Vec<ParsedToken>) {
    let mut columns = ColumnCursor::default();
    let mut cursor = 0;
    while let Some(open) = find_from(line, BRACKET_OPEN, cursor) {
        let Some(close) = find_from(line, BRACKET_CLOSE, open) else {
            break;
        };
        let inner_start = open + BRACKET_OPEN.len_utf8();
        let inner = &line[inner_start..close];
        let (token_type, token_modifiers) = split_segments(inner);
        let start_character = columns.advance_to(line, inner_start);
        let length = utf16_len(inner);
        columns.skip_to(close, start_character + length);
        tokens.push(ParsedToken {
            line: line_index,
            start_character,
            length,
            token_type: token_type.to_string(),
            token_modifiers,
        });
        // Resume at the closer itself rather than past it.
        cursor = close;
    }
}

fn scan_variables(line_index: u32, line: &str, tokens: &mut Vec<ParsedToken>) {
    let mut columns = ColumnCursor::default();
    let mut cursor = 0;
    while let Some(open) = line[cursor..].find(VARIABLE_OPEN).map(|at| at + cursor) {
        let Some(close) = find_from(line, VARIABLE_CLOSE, open) else {
            break;
        };
        // The segment before the first separator still carries the `{`; it is dropped anyway.
        let (_, token_modifiers) = split_segments(&line[open + 1..close]);
        let start_character = columns.advance_to(line, open);
        let length = utf16_len(&line[open..=close]);
        columns.skip_to(close, start_character + length - 1);
        tokens.push(ParsedToken {
            line: line_index,
            start_character,
            length,
            token_type: VARIABLE_TOKEN_TYPE.to_string(),
            token_modifiers,
        });
        cursor = close;
    }
}

/// Byte offset paired with its UTF-16 column, moved forward only.
///
/// Each pass visits openers and closers in increasing order, so every character of a line is
/// measured a bounded number of times and a pass stays linear in the line length.
#[derive(Debug, Default, Clone, Copy)]
struct ColumnCursor {
    byte: usize,
    column: u32,
}

impl ColumnCursor {
    /// Move to `byte` (at or after the current offset) and return its column.
    fn advance_to(&mut self, line: &str, byte: usize) -> u32 {
        self.column += utf16_len(&line[self.byte..byte]);
        self.byte = byte;
        self.column
    }

    /// Jump to an offset whose column is already known.
    fn skip_to(&mut self, byte: usize, column: u32) {
        self.byte = byte;
        self.column = column;
    }
}

/// Split token text on `:` into its type and its modifiers, without trimming.
pub fn split_segments(text: &str) -> (&str, Vec<String>) {
    let mut segments = text.split(SEGMENT_SEPARATOR);
    let token_type = segments.next().unwrap_or_default();
    (token_type, segments.map(str::to_string).collect())
}

/// Iterate over the lines of `text`, treating `\r\n`, `\r` and `\n` as terminators.
///
/// A trailing terminator yields a final empty line, so line numbers always agree with the host.
pub fn split_lines(text: &str) -> Lines<'_> {
    Lines { rest: Some(text) }
}

pub struct Lines<'a> {
    rest: Option<&'a str>,
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;
        match rest.find(|ch: char| ch == '\r' || ch == '\n') {
            Some(end) => {
                let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                self.rest = Some(&rest[end + terminator..]);
                Some(&rest[..end])
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}

fn find_from(line: &str, needle: char, from: usize) -> Option<usize> {
    line[from..].find(needle).map(|at| at + from)
}

fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn token(line: u32, start: u32, length: u32, token_type: &str, modifiers: &[&str]) -> ParsedToken {
        ParsedToken {
            line,
            start_character: start,
            length,
            token_type: token_type.to_string(),
            token_modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn bracket_and_variable_on_one_line() {
        let tokens = scan("[keyword:foo] rest ${var:bar}");
        assert_eq!(
            tokens,
            vec![
                token(0, 1, 11, "keyword", &["foo"]),
                token(0, 19, 10, "var", &["bar"]),
            ]
        );
    }

    #[test]
    fn variable_prefix_is_replaced_by_fixed_type() {
        let tokens = scan("${name:bold:italic}");
        assert_eq!(tokens, vec![token(0, 0, 19, "var", &["bold", "italic"])]);
    }

    #[test]
    fn variable_without_separator_has_no_modifiers() {
        let tokens = scan("say ${name} now");
        assert_eq!(tokens, vec![token(0, 4, 7, "var", &[])]);
    }

    #[rstest]
    #[case::no_delimiters("plain text only")]
    #[case::empty("")]
    #[case::unmatched_bracket("[abc")]
    #[case::unmatched_variable("${abc")]
    #[case::closer_before_opener("] and }")]
    #[case::dollar_without_brace("$abc}")]
    #[case::split_across_lines("[abc\ndef]")]
    #[case::variable_split_across_lines("${abc\r\ndef}")]
    fn yields_no_tokens(#[case] text: &str) {
        assert!(scan(text).is_empty());
    }

    #[test]
    fn empty_bracket_yields_empty_type() {
        assert_eq!(scan("[]"), vec![token(0, 1, 0, "", &[])]);
    }

    #[test]
    fn empty_variable_spans_both_delimiters() {
        assert_eq!(scan("${}"), vec![token(0, 0, 3, "var", &[])]);
    }

    #[test]
    fn modifiers_are_not_trimmed() {
        let tokens = scan("[showCh: left :]");
        assert_eq!(tokens, vec![token(0, 1, 14, "showCh", &[" left ", ""])]);
    }

    #[test]
    fn bracket_tokens_precede_variable_tokens_within_a_line() {
        let tokens = scan("${a} [showBg] ${b:c} [playBgm:loop]");
        let summary: Vec<(u32, &str)> = tokens
            .iter()
            .map(|t| (t.start_character, t.token_type.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![(6, "showBg"), (22, "playBgm"), (0, "var"), (14, "var")]
        );
    }

    #[test]
    fn unmatched_bracket_does_not_stop_variable_pass() {
        let tokens = scan("[open ${v:x}");
        assert_eq!(tokens, vec![token(0, 6, 6, "var", &["x"])]);
    }

    #[test]
    fn brackets_are_not_nesting_aware() {
        let tokens = scan("[a[b]c]");
        assert_eq!(tokens, vec![token(0, 1, 3, "a[b", &[])]);
    }

    #[test]
    fn second_opener_after_shared_closer() {
        let tokens = scan("[a][b]");
        assert_eq!(tokens, vec![token(0, 1, 1, "a", &[]), token(0, 4, 1, "b", &[])]);
    }

    #[rstest]
    #[case::lf("[a]\n[b]")]
    #[case::crlf("[a]\r\n[b]")]
    #[case::cr("[a]\r[b]")]
    fn recognizes_every_line_terminator(#[case] text: &str) {
        let tokens = scan(text);
        assert_eq!(tokens, vec![token(0, 1, 1, "a", &[]), token(1, 1, 1, "b", &[])]);
    }

    #[test]
    fn blank_lines_still_count() {
        let tokens = scan("\r\r\n\n[a]");
        assert_eq!(tokens, vec![token(3, 1, 1, "a", &[])]);
    }

    #[test]
    fn split_lines_matches_host_line_numbering() {
        let lines: Vec<&str> = split_lines("a\r\nb\rc\n").collect();
        assert_eq!(lines, vec!["a", "b", "c", ""]);
    }

    #[test]
    fn columns_are_utf16_code_units() {
        assert_eq!(scan("é[showCh]"), vec![token(0, 2, 6, "showCh", &[])]);
        assert_eq!(scan("😀 ${名:x}"), vec![token(0, 3, 6, "var", &["x"])]);
    }

    #[test]
    fn columns_stay_correct_after_wide_characters_between_tokens() {
        let tokens = scan("[a]é😀[b] ${x}名${y:z}");
        let columns: Vec<(u32, u32)> = tokens
            .iter()
            .map(|t| (t.start_character, t.length))
            .collect();
        assert_eq!(columns, vec![(1, 1), (7, 1), (10, 4), (15, 6)]);
    }

    #[test]
    fn dense_line_scans_in_linear_time() {
        let count = 100_000;
        let line = "[a]${b}".repeat(count);
        let started = std::time::Instant::now();
        let tokens = scan(&line);
        let elapsed = started.elapsed();

        assert_eq!(tokens.len(), 2 * count);
        let last_bracket = &tokens[count - 1];
        assert_eq!(last_bracket.start_character, (7 * (count - 1) + 1) as u32);
        let last_variable = &tokens[2 * count - 1];
        assert_eq!(last_variable.start_character, (7 * (count - 1) + 3) as u32);
        assert!(
            elapsed < std::time::Duration::from_secs(10),
            "scanning {} tokens took {:?}",
            2 * count,
            elapsed
        );
    }

    #[test]
    fn snapshot_of_a_short_script() {
        let tokens = scan("[showBg:forest] hello\n${var:name} says [unknown]");
        insta::assert_debug_snapshot!(tokens, @r###"
        [
            ParsedToken {
                line: 0,
                start_character: 1,
                length: 13,
                token_type: "showBg",
                token_modifiers: [
                    "forest",
                ],
            },
            ParsedToken {
                line: 1,
                start_character: 18,
                length: 7,
                token_type: "unknown",
                token_modifiers: [],
            },
            ParsedToken {
                line: 1,
                start_character: 0,
                length: 11,
                token_type: "var",
                token_modifiers: [
                    "name",
                ],
            },
        ]
        "###);
    }

    proptest! {
        #[test]
        fn text_without_openers_has_no_tokens(text in "[^\\[$]*") {
            prop_assert!(scan(&text).is_empty());
        }

        #[test]
        fn scanning_is_deterministic(text in "[a-z\\[\\]${}:\\n\\r ]{0,64}") {
            prop_assert_eq!(scan(&text), scan(&text));
        }

        #[test]
        fn spans_stay_inside_their_line(text in "[a-zé\\[\\]${}:\\n ]{0,64}") {
            let lines: Vec<&str> = split_lines(&text).collect();
            for token in scan(&text) {
                let line = lines[token.line as usize];
                prop_assert!(token.start_character + token.length <= utf16_len(line));
            }
        }

        #[test]
        fn second_line_index_ignores_first_line(first in "[a-z\\[\\]${}: ]{0,32}") {
            let text = format!("{first}\n[showCg:a] ${{x}}");
            let second_line: Vec<ParsedToken> =
                scan(&text).into_iter().filter(|t| t.line == 1).collect();
            prop_assert_eq!(second_line, scan("[showCg:a] ${x}")
                .into_iter()
                .map(|t| ParsedToken { line: 1, ..t })
                .collect::<Vec<_>>());
        }
    }
}
