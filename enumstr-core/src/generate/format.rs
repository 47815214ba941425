//! Validation and canonical layout of generated Go text.
//!
//! The text must parse as Go. Layout is then rewritten line by line:
//! tab indentation by bracket depth, no trailing whitespace, at most one
//! blank line in a row, no blank line right after an opening or right before
//! a closing bracket, and exactly one trailing newline. Lines inside raw
//! string literals and block comments are copied verbatim.

use crate::analysis::GoParser;
use crate::error::{EnumstrError, EnumstrResult};

/// Validates `source` as Go and returns it in canonical layout.
pub fn format_source(source: &str) -> EnumstrResult<String> {
    let mut parser = GoParser::new()?;
    parser.parse(source, |e| EnumstrError::Format {
        message: e.message,
        line: e.line,
        column: e.column,
    })?;
    Ok(canonicalize(source))
}

/// Lexical state carried from one line to the next.
#[derive(Debug, Default)]
struct LineScanner {
    in_raw_string: bool,
    in_block_comment: bool,
}

/// Bracket counts of one line, outside strings and comments.
#[derive(Debug, Default, PartialEq)]
struct Brackets {
    /// Closers before any other code on the line.
    leading_closes: usize,
    opens: usize,
    closes: usize,
}

impl LineScanner {
    /// Reports whether the line starts inside a multi-line token.
    fn in_multiline(&self) -> bool {
        self.in_raw_string || self.in_block_comment
    }

    fn scan(&mut self, line: &str) -> Brackets {
        let mut counts = Brackets::default();
        let mut leading = true;
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            if self.in_raw_string {
                if c == '`' {
                    self.in_raw_string = false;
                }
                continue;
            }
            if self.in_block_comment {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    self.in_block_comment = false;
                }
                continue;
            }
            match c {
                '"' | '\'' => {
                    leading = false;
                    while let Some(s) = chars.next() {
                        if s == '\\' {
                            chars.next();
                        } else if s == c {
                            break;
                        }
                    }
                }
                '`' => {
                    leading = false;
                    self.in_raw_string = true;
                }
                '/' if chars.peek() == Some(&'/') => break,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    self.in_block_comment = true;
                }
                '{' | '(' | '[' => {
                    leading = false;
                    counts.opens += 1;
                }
                '}' | ')' | ']' => {
                    if leading {
                        counts.leading_closes += 1;
                    } else {
                        counts.closes += 1;
                    }
                }
                c if c.is_whitespace() => {}
                _ => leading = false,
            }
        }
        counts
    }
}

/// Rewrites the layout of syntactically valid Go text.
fn canonicalize(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut scanner = LineScanner::default();
    let mut depth = 0usize;
    let mut pending_blank = false;

    for raw in source.lines() {
        if scanner.in_multiline() {
            out.push_str(raw.trim_end());
            out.push('\n');
            scanner.scan(raw);
            continue;
        }

        let line = raw.trim();
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }

        let counts = scanner.scan(line);
        depth = depth.saturating_sub(counts.leading_closes);

        let after_open = out.ends_with("{\n") || out.ends_with("(\n") || out.ends_with("[\n");
        if pending_blank && counts.leading_closes == 0 && !after_open {
            out.push('\n');
        }
        pending_blank = false;

        for _ in 0..depth {
            out.push('\t');
        }
        out.push_str(line);
        out.push('\n');

        depth = (depth + counts.opens).saturating_sub(counts.closes);
    }

    if out.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reindents_by_depth() {
        let src = "package p\n\nfunc f(x int) string {\nif x == 1 {\n        return \"one\"\n}\n   return \"\"\n}\n";
        let expected = "package p\n\nfunc f(x int) string {\n\tif x == 1 {\n\t\treturn \"one\"\n\t}\n\treturn \"\"\n}\n";
        assert_eq!(format_source(src).unwrap(), expected);
    }

    #[test]
    fn test_collapses_blank_lines() {
        let src = "\n\npackage p   \n\n\n\nimport \"fmt\"\n\n\nfunc f() {\n\n\tfmt.Println()\n\n}\n\n\n";
        let expected = "package p\n\nimport \"fmt\"\n\nfunc f() {\n\tfmt.Println()\n}\n";
        assert_eq!(format_source(src).unwrap(), expected);
    }

    #[test]
    fn test_brackets_in_strings_and_comments_ignored() {
        let src = "package p\n\nfunc f() string {\nreturn \"T(%v\" // closing )}\n}\n";
        let expected = "package p\n\nfunc f() string {\n\treturn \"T(%v\" // closing )}\n}\n";
        assert_eq!(format_source(src).unwrap(), expected);
    }

    #[test]
    fn test_else_branch() {
        let src = "package p\n\nfunc f(b bool) int {\nif b {\nreturn 1\n} else {\nreturn 2\n}\n}\n";
        let expected =
            "package p\n\nfunc f(b bool) int {\n\tif b {\n\t\treturn 1\n\t} else {\n\t\treturn 2\n\t}\n}\n";
        assert_eq!(format_source(src).unwrap(), expected);
    }

    #[test]
    fn test_raw_string_kept_verbatim() {
        let src = "package p\n\nconst s = `a\n   b {\n`\n\nfunc f() {\n}\n";
        let expected = "package p\n\nconst s = `a\n   b {\n`\n\nfunc f() {\n}\n";
        assert_eq!(format_source(src).unwrap(), expected);
    }

    #[test]
    fn test_idempotent() {
        let src = "package p\n\nimport (\n\"fmt\"\n)\n\nfunc f() {\nfmt.Println(\"x\")\n}\n";
        let once = format_source(src).unwrap();
        assert_eq!(format_source(&once).unwrap(), once);
        assert!(once.contains("import (\n\t\"fmt\"\n)"));
    }

    #[test]
    fn test_invalid_source() {
        let err = format_source("package p\n\nfunc f() {\n\tif {\n}\n").unwrap_err();
        assert!(matches!(err, EnumstrError::Format { .. }));
    }

    #[test]
    fn test_line_scanner_counts() {
        let mut scanner = LineScanner::default();
        assert_eq!(
            scanner.scan("} else {"),
            Brackets {
                leading_closes: 1,
                opens: 1,
                closes: 0
            }
        );
        assert_eq!(
            scanner.scan("func (r T) String() string {"),
            Brackets {
                leading_closes: 0,
                opens: 3,
                closes: 2
            }
        );
        assert_eq!(scanner.scan("'{'").opens, 0);
    }
}
