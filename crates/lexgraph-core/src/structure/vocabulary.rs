//! Per-variant node-label vocabulary.

use crate::model::Language;
use crate::structure::grammar::NodeKind;

/// Wording used when the source omits a label, and how sentences join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vocabulary {
    language: Language,
}

impl Vocabulary {
    pub fn for_language(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Separator between consecutive sentences of one node
    pub fn sentence_joiner(&self) -> &'static str {
        match self.language {
            Language::Ja => "",
            Language::En => " ",
        }
    }

    /// Label for a node whose heading element is absent or empty.
    ///
    /// `num` is the raw `Num` attribute (`2_3` for a branch article) or the
    /// sibling position when the attribute is missing.
    pub fn default_label(&self, kind: NodeKind, num: &str) -> String {
        match self.language {
            Language::Ja => {
                let unit = match kind {
                    NodeKind::SupplProvision => return "附則".to_string(),
                    NodeKind::Part => "編",
                    NodeKind::Chapter => "章",
                    NodeKind::Section => "節",
                    NodeKind::Subsection => "款",
                    NodeKind::Division => "目",
                    NodeKind::Article => "条",
                    NodeKind::Paragraph => "項",
                    NodeKind::Item => "号",
                };
                // Branch numbers follow the unit: 2_3 → 第2条の3
                let mut parts = num.split('_');
                let mut label = format!("第{}{}", parts.next().unwrap_or_default(), unit);
                for branch in parts {
                    label.push('の');
                    label.push_str(branch);
                }
                label
            }
            Language::En => {
                let n = num.replace('_', "-");
                match kind {
                    NodeKind::SupplProvision => "Supplementary Provisions".to_string(),
                    NodeKind::Part => format!("Part {n}"),
                    NodeKind::Chapter => format!("Chapter {n}"),
                    NodeKind::Section => format!("Section {n}"),
                    NodeKind::Subsection => format!("Subsection {n}"),
                    NodeKind::Division => format!("Division {n}"),
                    NodeKind::Article => format!("Article {n}"),
                    NodeKind::Paragraph => format!("paragraph ({n})"),
                    NodeKind::Item => format!("item ({n})"),
                }
            }
        }
    }
}
