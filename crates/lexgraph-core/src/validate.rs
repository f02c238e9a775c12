//! Structural validation boundary.
//!
//! Validators only return a verdict; the pipeline decides what to do with
//! it. An invalid verdict never stops downstream stages by itself.

use serde::{Deserialize, Serialize};

use roxmltree::Node;

use crate::model::NormalizedDocument;

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationProblem {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub valid: bool,
    pub problems: Vec<ValidationProblem>,
}

impl ValidationVerdict {
    pub fn valid() -> Self {
        Self {
            valid: true,
            problems: Vec::new(),
        }
    }

    pub fn invalid(problems: Vec<ValidationProblem>) -> Self {
        Self {
            valid: false,
            problems,
        }
    }
}

pub trait SchemaValidator {
    fn validate(&self, doc: &NormalizedDocument) -> ValidationVerdict;
}

/// Well-formedness plus the `Law/{LawNum, LawBody/LawTitle}` skeleton.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredElementsValidator;

impl SchemaValidator for RequiredElementsValidator {
    fn validate(&self, doc: &NormalizedDocument) -> ValidationVerdict {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let xml = match roxmltree::Document::parse_with_options(doc.as_str(), options) {
            Ok(xml) => xml,
            Err(e) => {
                let pos = e.pos();
                return ValidationVerdict::invalid(vec![ValidationProblem {
                    line: pos.row,
                    column: pos.col,
                    message: e.to_string(),
                }]);
            }
        };

        let root = xml.root_element();
        let problem = |node: Node<'_, '_>, message: String| {
            let pos = xml.text_pos_at(node.range().start);
            ValidationProblem {
                line: pos.row,
                column: pos.col,
                message,
            }
        };

        if root.tag_name().name() != "Law" {
            return ValidationVerdict::invalid(vec![problem(
                root,
                format!("root element must be <Law>, found <{}>", root.tag_name().name()),
            )]);
        }

        let mut problems = Vec::new();
        if child(root, "LawNum").is_none() {
            problems.push(problem(root, "missing required element <LawNum>".to_string()));
        }
        match child(root, "LawBody") {
            None => problems.push(problem(root, "missing required element <LawBody>".to_string())),
            Some(body) => {
                if child(body, "LawTitle").is_none() {
                    problems.push(problem(body, "missing required element <LawTitle> in <LawBody>".to_string()));
                }
            }
        }

        if problems.is_empty() {
            ValidationVerdict::valid()
        } else {
            ValidationVerdict::invalid(problems)
        }
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}
