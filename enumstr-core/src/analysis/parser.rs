//! Thin wrapper around the tree-sitter Go grammar.
//!
//! Syntax errors are reported with the position of the first error or
//! missing node, which is what a reader needs to find the problem.

use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

use crate::error::{EnumstrError, EnumstrResult};

/// Maximum number of characters of offending text quoted in a message.
const SNIPPET_LEN: usize = 24;

/// Reusable Go parser.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> EnumstrResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| EnumstrError::parse("<grammar>", format!("Go grammar unavailable: {}", e)))?;
        Ok(Self { parser })
    }

    /// Parses `source`, failing on the first syntax error.
    ///
    /// The error is reported through `on_error` so callers decide whether it
    /// is a parse error of an input file or a format error of generated text.
    pub fn parse<F>(&mut self, source: &str, on_error: F) -> EnumstrResult<Tree>
    where
        F: FnOnce(SyntaxError) -> EnumstrError,
    {
        let Some(tree) = self.parser.parse(source, None) else {
            return Err(on_error(SyntaxError {
                message: "parser produced no tree".to_string(),
                line: 1,
                column: 1,
            }));
        };

        let root = tree.root_node();
        if root.has_error() {
            let err = first_error(root)
                .map(|node| SyntaxError::at(node, source))
                .unwrap_or(SyntaxError {
                    message: "syntax error".to_string(),
                    line: 1,
                    column: 1,
                });
            return Err(on_error(err));
        }
        Ok(tree)
    }

    /// Parses an input file, mapping syntax errors to `Parse` errors.
    pub fn parse_file(&mut self, path: &Path, source: &str) -> EnumstrResult<Tree> {
        self.parse(source, |e| EnumstrError::parse_at(path, e.message, e.line, e.column))
    }
}

/// Location and description of the first syntax error in a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    /// 1-indexed
    pub line: usize,
    /// 1-indexed, in bytes
    pub column: usize,
}

impl SyntaxError {
    fn at(node: Node<'_>, source: &str) -> Self {
        let pos = node.start_position();
        let message = if node.is_missing() {
            format!("syntax error: missing {}", node.kind())
        } else {
            let text = node.utf8_text(source.as_bytes()).unwrap_or_default();
            let snippet: String = text.chars().take(SNIPPET_LEN).collect();
            format!("syntax error near `{}`", snippet.trim())
        };
        Self {
            message,
            line: pos.row + 1,
            column: pos.column + 1,
        }
    }
}

/// Depth-first search for the first error or missing node.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

/// Source text of a node.
pub fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_valid() {
        let mut parser = GoParser::new().unwrap();
        let tree = parser
            .parse_file(&PathBuf::from("a.go"), "package p\n\nconst A = 1\n")
            .unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");
    }

    #[test]
    fn test_parse_error_position() {
        let mut parser = GoParser::new().unwrap();
        let err = parser
            .parse_file(&PathBuf::from("a.go"), "package p\n\nconst (\n\tA = \n")
            .unwrap_err();
        match err {
            EnumstrError::Parse { path, line, .. } => {
                assert_eq!(path, PathBuf::from("a.go"));
                assert!(line.is_some_and(|l| l >= 3));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_error_mapping() {
        let mut parser = GoParser::new().unwrap();
        let err = parser
            .parse("package p\nfunc {", |e| EnumstrError::Format {
                message: e.message,
                line: e.line,
                column: e.column,
            })
            .unwrap_err();
        assert!(matches!(err, EnumstrError::Format { line: 2, .. }));
    }
}
