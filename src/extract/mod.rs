mod comment;

pub use comment::normalize_doc_comment;

use crate::inventory::{DocElement, ElementKind};
use log::{debug, trace};
use tree_sitter::{Node, Tree};

/// Collects documentable elements from a parsed PHP tree in one depth-first
/// enter/leave traversal, in first-entry source order.
pub fn extract_elements(tree: &Tree, source: &str) -> Vec<DocElement> {
    let mut visitor = ElementVisitor::new();
    let mut cursor = tree.walk();

    loop {
        visitor.enter_node(cursor.node(), source);

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            visitor.leave_node(cursor.node());
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                debug!("extracted {} elements", visitor.elements.len());
                return visitor.into_elements();
            }
        }
    }
}

// The node kinds the visitor reacts to; everything else is traversed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeCategory {
    Class,
    Method,
    Property,
    Const,
    Function,
    Assignment,
}

impl NodeCategory {
    fn of(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(NodeCategory::Class),
            "method_declaration" => Some(NodeCategory::Method),
            "property_declaration" => Some(NodeCategory::Property),
            "const_declaration" => Some(NodeCategory::Const),
            "function_definition" => Some(NodeCategory::Function),
            "assignment_expression" => Some(NodeCategory::Assignment),
            _ => None,
        }
    }
}

// Enclosing-scope marker, popped when the node that opened it is left.
// Closures and arrow functions deliberately do not open a scope: only
// methods and named top-level functions suppress nested extraction.
#[derive(Debug)]
enum Scope {
    Class { name: String, node_id: usize },
    Function { node_id: usize },
}

impl Scope {
    fn node_id(&self) -> usize {
        match self {
            Scope::Class { node_id, .. } | Scope::Function { node_id } => *node_id,
        }
    }
}

struct ElementVisitor {
    elements: Vec<DocElement>,
    scopes: Vec<Scope>,
}

impl ElementVisitor {
    fn new() -> Self {
        ElementVisitor {
            elements: Vec::new(),
            scopes: Vec::new(),
        }
    }

    fn into_elements(self) -> Vec<DocElement> {
        self.elements
    }

    fn current_class(&self) -> Option<&str> {
        self.scopes.iter().rev().find_map(|scope| match scope {
            Scope::Class { name, .. } => Some(name.as_str()),
            Scope::Function { .. } => None,
        })
    }

    fn inside_function(&self) -> bool {
        self.scopes
            .iter()
            .any(|scope| matches!(scope, Scope::Function { .. }))
    }

    fn push(&mut self, element: DocElement) {
        trace!(
            "found {:?} '{}' at line {}",
            element.kind, element.name, element.start_line
        );
        self.elements.push(element);
    }

    fn enter_node(&mut self, node: Node, source: &str) {
        let Some(category) = NodeCategory::of(node.kind()) else {
            return;
        };

        let current_class = self.current_class().map(str::to_owned);
        let inside_function = self.inside_function();
        let line = start_line(node);

        match category {
            NodeCategory::Class => {
                if let Some(name) = node_name(node, source) {
                    let desc = doc_comment(node, source);
                    self.push(DocElement::new(ElementKind::Class, name.clone(), desc, line));
                    self.scopes.push(Scope::Class {
                        name,
                        node_id: node.id(),
                    });
                }
            }
            NodeCategory::Method => {
                if let (Some(class_name), Some(name)) = (&current_class, node_name(node, source)) {
                    let desc = doc_comment(node, source);
                    self.push(
                        DocElement::new(
                            ElementKind::Method,
                            format!("{class_name}::{name}"),
                            desc,
                            line,
                        )
                        .with_short_name(name),
                    );
                }
                self.scopes.push(Scope::Function {
                    node_id: node.id(),
                });
            }
            NodeCategory::Property => {
                if let Some(class_name) = &current_class {
                    // one statement may declare several properties sharing a doc comment
                    let desc = doc_comment(node, source);
                    for property in children_of_kind(node, "property_element") {
                        let name = child_of_kind(property, "variable_name")
                            .and_then(|variable| variable_identifier(variable, source));
                        if let Some(name) = name {
                            self.push(
                                DocElement::new(
                                    ElementKind::Property,
                                    format!("{class_name}::${name}"),
                                    desc.clone(),
                                    line,
                                )
                                .with_short_name(name),
                            );
                        }
                    }
                }
            }
            NodeCategory::Const => {
                if let Some(class_name) = &current_class {
                    let desc = doc_comment(node, source);
                    for constant in children_of_kind(node, "const_element") {
                        let name =
                            child_of_kind(constant, "name").and_then(|n| node_text(n, source));
                        if let Some(name) = name {
                            self.push(
                                DocElement::new(
                                    ElementKind::ClassConstant,
                                    format!("{class_name}::{name}"),
                                    desc.clone(),
                                    line,
                                )
                                .with_short_name(name),
                            );
                        }
                    }
                } else if !inside_function && !is_type_body_member(node) {
                    let desc = doc_comment(node, source);
                    for constant in children_of_kind(node, "const_element") {
                        let name =
                            child_of_kind(constant, "name").and_then(|n| node_text(n, source));
                        if let Some(name) = name {
                            self.push(DocElement::new(
                                ElementKind::Constant,
                                name,
                                desc.clone(),
                                line,
                            ));
                        }
                    }
                }
            }
            NodeCategory::Function => {
                if current_class.is_none() && !inside_function {
                    if let Some(name) = node_name(node, source) {
                        let desc = doc_comment(node, source);
                        self.push(DocElement::new(ElementKind::Function, name, desc, line));
                    }
                }
                self.scopes.push(Scope::Function {
                    node_id: node.id(),
                });
            }
            NodeCategory::Assignment => {
                if current_class.is_none() && !inside_function {
                    // only the simplest form counts: a bare `$name = ...` target
                    let target = node
                        .child_by_field_name("left")
                        .filter(|left| left.kind() == "variable_name");
                    if let Some(name) =
                        target.and_then(|variable| variable_identifier(variable, source))
                    {
                        let desc = doc_comment(node, source);
                        self.push(DocElement::new(
                            ElementKind::Variable,
                            format!("${name}"),
                            desc,
                            line,
                        ));
                    }
                }
            }
        }
    }

    fn leave_node(&mut self, node: Node) {
        if let Some(scope) = self.scopes.last() {
            if scope.node_id() == node.id() {
                self.scopes.pop();
            }
        }
    }
}

fn start_line(node: Node) -> usize {
    node.start_position().row + 1
}

// `const` uses one node kind both as a type member and as a statement.
// Without a current class the member form (interface, trait, enum body)
// must not be mistaken for a top-level constant.
fn is_type_body_member(node: Node) -> bool {
    node.parent()
        .is_some_and(|parent| parent.kind() == "declaration_list")
}

fn node_text(node: Node, source: &str) -> Option<String> {
    node.utf8_text(source.as_bytes())
        .ok()
        .map(|text| text.to_string())
}

fn node_name(node: Node, source: &str) -> Option<String> {
    node.child_by_field_name("name")
        .and_then(|name| node_text(name, source))
}

// Inner identifier of a `variable_name` node, without the `$` sigil.
// Dynamic variables (`$$x`) carry no plain name child and yield None.
fn variable_identifier(variable: Node, source: &str) -> Option<String> {
    child_of_kind(variable, "name")
        .and_then(|name| node_text(name, source))
        .filter(|name| !name.is_empty())
}

fn child_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|child| child.kind() == kind)
}

fn children_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() == kind)
        .collect()
}

// The doc comment attached to a declaration is the immediately preceding
// `/** ... */` sibling. A plain comment in that position hides any doc
// block further up. Assignments are wrapped in an expression_statement,
// so the lookup starts from the statement.
fn doc_comment(node: Node, source: &str) -> String {
    let mut target = node;
    if node.kind() == "assignment_expression" {
        if let Some(parent) = node.parent() {
            if parent.kind() == "expression_statement" {
                target = parent;
            }
        }
    }

    let Some(previous) = target.prev_sibling() else {
        return String::new();
    };
    if previous.kind() != "comment" {
        return String::new();
    }
    match previous.utf8_text(source.as_bytes()) {
        Ok(text) if text.starts_with("/**") => normalize_doc_comment(text),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PhpParser;
    use pretty_assertions::assert_eq;

    fn extract(source: &str) -> Vec<DocElement> {
        let mut parser = PhpParser::new();
        let tree = parser.parse(source).expect("test source must parse");
        extract_elements(&tree, source)
    }

    #[test]
    fn extracts_class_with_members_in_declaration_order() {
        let source = "<?php
/** Does X. Extra. */
class Foo {
    public $bar;
    const BAZ = 1;
    function m() {}
}
";
        let elements = extract(source);

        assert_eq!(elements.len(), 4);

        assert_eq!(elements[0].kind, ElementKind::Class);
        assert_eq!(elements[0].name, "Foo");
        assert_eq!(elements[0].desc, "Does X.");
        assert_eq!(elements[0].short_name, None);
        assert_eq!(elements[0].start_line, 3);

        assert_eq!(elements[1].kind, ElementKind::Property);
        assert_eq!(elements[1].name, "Foo::$bar");
        assert_eq!(elements[1].short_name.as_deref(), Some("bar"));

        assert_eq!(elements[2].kind, ElementKind::ClassConstant);
        assert_eq!(elements[2].name, "Foo::BAZ");
        assert_eq!(elements[2].short_name.as_deref(), Some("BAZ"));

        assert_eq!(elements[3].kind, ElementKind::Method);
        assert_eq!(elements[3].name, "Foo::m");
        assert_eq!(elements[3].short_name.as_deref(), Some("m"));
    }

    #[test]
    fn start_lines_are_non_decreasing() {
        let source = "<?php
const APP_VERSION = '1.0';

$config = array();

/** Renders the page. */
function render() {}

class Page {
    public $title;

    public function show() {}
}
";
        let elements = extract(source);
        let lines: Vec<usize> = elements.iter().map(|e| e.start_line).collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
        assert_eq!(elements.len(), 6);
    }

    #[test]
    fn property_statement_with_two_names_shares_doc_and_line() {
        let source = "<?php
class Foo {
    /** shared */
    public $x, $y;
}
";
        let elements = extract(source);
        assert_eq!(elements.len(), 3);

        assert_eq!(elements[1].name, "Foo::$x");
        assert_eq!(elements[1].desc, "shared");
        assert_eq!(elements[2].name, "Foo::$y");
        assert_eq!(elements[2].desc, "shared");
        assert_eq!(elements[1].start_line, elements[2].start_line);
    }

    #[test]
    fn const_statement_declares_one_element_per_name() {
        let source = "<?php
class Config {
    const ONE = 1, TWO = 2;
}

const LIMIT = 10, OFFSET = 0;
";
        let elements = extract(source);
        assert_eq!(elements.len(), 5);
        assert_eq!(elements[1].name, "Config::ONE");
        assert_eq!(elements[1].kind, ElementKind::ClassConstant);
        assert_eq!(elements[2].name, "Config::TWO");
        assert_eq!(elements[3].name, "LIMIT");
        assert_eq!(elements[3].kind, ElementKind::Constant);
        assert_eq!(elements[3].short_name, None);
        assert_eq!(elements[4].name, "OFFSET");
    }

    #[test]
    fn interface_members_are_not_extracted() {
        let source = "<?php
interface Jsonable {
    const FORMAT = 'json';
    public function toJson();
}
";
        assert_eq!(extract(source), vec![]);
    }

    #[test]
    fn nested_function_is_suppressed() {
        let source = "<?php
function outer() {
    function inner() {}
}
function after() {}
";
        let elements = extract(source);
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["outer", "after"]);
    }

    #[test]
    fn assignments_after_a_nested_function_stay_suppressed() {
        let source = "<?php
function outer() {
    function inner() {}
    $local = 1;
}
";
        let elements = extract(source);
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["outer"]);
    }

    #[test]
    fn only_plain_variable_targets_are_reported() {
        let source = "<?php
$plain = 1;
$arr[0] = 2;
$obj->field = 3;
";
        let elements = extract(source);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind, ElementKind::Variable);
        assert_eq!(elements[0].name, "$plain");
        assert_eq!(elements[0].short_name, None);
    }

    #[test]
    fn assignment_doc_comment_is_picked_up_from_the_statement() {
        let source = "<?php
/** Application configuration. */
$config = array();
";
        let elements = extract(source);
        assert_eq!(elements[0].name, "$config");
        assert_eq!(elements[0].desc, "Application configuration.");
    }

    #[test]
    fn chained_assignment_reports_each_plain_target() {
        let source = "<?php\n$a = $b = 1;\n";
        let elements = extract(source);
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["$a", "$b"]);
    }

    #[test]
    fn closure_bodies_do_not_open_a_function_scope() {
        let source = "<?php
$handler = function () {
    $inner = 1;
};
";
        let elements = extract(source);
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["$handler", "$inner"]);
    }

    #[test]
    fn method_bodies_suppress_variable_extraction() {
        let source = "<?php
class Controller {
    public function index() {
        $request = 1;
    }
}
";
        let elements = extract(source);
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[1].name, "Controller::index");
    }

    #[test]
    fn line_comment_directly_above_hides_an_earlier_doc_block() {
        let source = "<?php
/** Real doc. */
// unrelated note
class Foo {}
";
        let elements = extract(source);
        assert_eq!(elements[0].desc, "");
    }

    #[test]
    fn members_after_a_class_closes_are_top_level_again() {
        let source = "<?php
class First {
    public function a() {}
}
class Second {
    public function b() {}
}
function standalone() {}
";
        let elements = extract(source);
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["First", "First::a", "Second", "Second::b", "standalone"]
        );
    }

    #[test]
    fn elements_without_doc_comments_have_empty_descriptions() {
        let source = "<?php\nclass Bare { public $field; }\n";
        let elements = extract(source);
        assert!(elements.iter().all(|e| e.desc.is_empty()));
    }
}
