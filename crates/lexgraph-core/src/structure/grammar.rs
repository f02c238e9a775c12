//! Structural node types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::DocumentId;
use crate::structure::metadata::LawMetadata;

/// Kind of a structural node.
///
/// `Subitem1`…`Subitem10` elements all map to [`NodeKind::Item`]; nesting
/// depth is carried by the tree itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    SupplProvision,
    Part,
    Chapter,
    Section,
    Subsection,
    Division,
    Article,
    Paragraph,
    Item,
}

impl NodeKind {
    /// Kind for an element name, if the element is structural.
    pub fn from_element(name: &str) -> Option<NodeKind> {
        let kind = match name {
            "SupplProvision" => NodeKind::SupplProvision,
            "Part" => NodeKind::Part,
            "Chapter" => NodeKind::Chapter,
            "Section" => NodeKind::Section,
            "Subsection" => NodeKind::Subsection,
            "Division" => NodeKind::Division,
            "Article" => NodeKind::Article,
            "Paragraph" => NodeKind::Paragraph,
            "Item" => NodeKind::Item,
            other => {
                let depth = other.strip_prefix("Subitem")?.parse::<u8>().ok()?;
                if (1..=10).contains(&depth) {
                    NodeKind::Item
                } else {
                    return None;
                }
            }
        };
        Some(kind)
    }

    /// IRI path segment prefix, e.g. `article`
    pub fn segment(&self) -> &'static str {
        match self {
            NodeKind::SupplProvision => "suppl_provision",
            NodeKind::Part => "part",
            NodeKind::Chapter => "chapter",
            NodeKind::Section => "section",
            NodeKind::Subsection => "subsection",
            NodeKind::Division => "division",
            NodeKind::Article => "article",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Item => "item",
        }
    }

    /// Grouping levels above articles (including supplementary provisions)
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::SupplProvision
                | NodeKind::Part
                | NodeKind::Chapter
                | NodeKind::Section
                | NodeKind::Subsection
                | NodeKind::Division
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Where a node came from in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    /// XPath-like location, e.g. `/Law/LawBody/MainProvision/Article[2]/Paragraph[1]`
    pub xpath: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}, column {})", self.xpath, self.line, self.column)
    }
}

/// One node of the structural tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralNode {
    pub kind: NodeKind,
    /// 1-based position among same-kind siblings
    pub position: usize,
    /// Number label as printed (`第一条`, `Article 1`, `一`)
    pub label: String,
    pub title: Option<String>,
    pub text: Option<String>,
    pub source: SourcePosition,
    pub children: Vec<StructuralNode>,
}

impl StructuralNode {
    pub fn path_segment(&self) -> String {
        format!("{}_{}", self.kind.segment(), self.position)
    }
}

/// Parsed document: metadata plus top-level structural nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStructure {
    pub id: DocumentId,
    pub metadata: LawMetadata,
    pub children: Vec<StructuralNode>,
}

impl DocumentStructure {
    /// Every node in document order with its slash-joined structural path.
    pub fn nodes(&self) -> Vec<(String, &StructuralNode)> {
        fn walk<'a>(
            prefix: &str,
            nodes: &'a [StructuralNode],
            out: &mut Vec<(String, &'a StructuralNode)>,
        ) {
            for node in nodes {
                let path = if prefix.is_empty() {
                    node.path_segment()
                } else {
                    format!("{}/{}", prefix, node.path_segment())
                };
                out.push((path.clone(), node));
                walk(&path, &node.children, out);
            }
        }

        let mut out = Vec::new();
        walk("", &self.children, &mut out);
        out
    }

    /// Articles with their structural paths, in document order.
    pub fn articles(&self) -> Vec<(String, &StructuralNode)> {
        self.nodes()
            .into_iter()
            .filter(|(_, node)| node.kind == NodeKind::Article)
            .collect()
    }

    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes().iter().filter(|(_, n)| n.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subitems_map_to_item() {
        assert_eq!(NodeKind::from_element("Subitem1"), Some(NodeKind::Item));
        assert_eq!(NodeKind::from_element("Subitem10"), Some(NodeKind::Item));
        assert_eq!(NodeKind::from_element("Subitem11"), None);
        assert_eq!(NodeKind::from_element("SubitemX"), None);
        assert_eq!(NodeKind::from_element("LawBody"), None);
    }

    #[test]
    fn test_block_kinds() {
        assert!(NodeKind::Chapter.is_block());
        assert!(NodeKind::SupplProvision.is_block());
        assert!(!NodeKind::Article.is_block());
        assert!(!NodeKind::Item.is_block());
    }
}
