use log::trace;
use thiserror::Error;
use tree_sitter::{Language, Node, Parser, Tree};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
    #[error("parser produced no syntax tree")]
    NoTree,
}

/// Parser for PHP sources, strict about syntax errors: tree-sitter recovers
/// from broken input, so a tree containing any error node is rejected here.
pub struct PhpParser {
    parser: Parser,
}

impl PhpParser {
    pub fn new() -> Self {
        let mut parser = Parser::new();
        let language: Language = tree_sitter_php::LANGUAGE_PHP_ONLY.into();
        parser
            .set_language(&language)
            .expect("PHP grammar incompatible with linked tree-sitter runtime");

        PhpParser { parser }
    }

    pub fn parse(&mut self, source: &str) -> Result<Tree, ParseError> {
        let tree = self.parser.parse(source, None).ok_or(ParseError::NoTree)?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, column) = first_error_position(root);
            trace!("rejecting tree with error node at {}:{}", line, column);
            return Err(ParseError::Syntax { line, column });
        }

        Ok(tree)
    }
}

impl Default for PhpParser {
    fn default() -> Self {
        PhpParser::new()
    }
}

// Position of the first error or missing node in document order, 1-based.
fn first_error_position(root: Node) -> (usize, usize) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            let position = node.start_position();
            return (position.row + 1, position.column + 1);
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                // has_error() promised an error node; fall back to the root
                let position = root.start_position();
                return (position.row + 1, position.column + 1);
            }
        }
    }
}
