//! Semantic conversion: structural tree → ELI legal graph.
//!
//! One converter serves both document variants; language-specific wording
//! comes from the structure's vocabulary, never from the converter.
//! Identifiers are derived only from structural position, so converting
//! the same input twice yields the same statement set.

use crate::errors::Result;
use crate::graph::ontology::{self, language_iri};
use crate::graph::{LegalGraph, Literal};
use crate::model::NormalizedDocument;
use crate::structure::{self, DocumentStructure, StructuralNode};

#[derive(Debug, Clone)]
pub struct Converter {
    base_iri: String,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ontology::DEFAULT_BASE_IRI)
    }
}

impl Converter {
    pub fn new(base_iri: impl Into<String>) -> Self {
        let base_iri: String = base_iri.into();
        Self {
            base_iri: base_iri.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_iri(&self) -> &str {
        &self.base_iri
    }

    /// IRI of the document root, `<base>/<name>/<lang>`.
    pub fn root_iri(&self, structure: &DocumentStructure) -> String {
        format!(
            "{}/{}/{}",
            self.base_iri,
            structure.id.slug(),
            structure.id.language().tag()
        )
    }

    /// Parse and convert a normalized document.
    ///
    /// # Errors
    /// Parse and structural-mapping failures from [`structure::parse`].
    pub fn convert(&self, doc: &NormalizedDocument) -> Result<LegalGraph> {
        let structure = structure::parse(doc)?;
        Ok(self.convert_structure(&structure))
    }

    pub fn convert_structure(&self, structure: &DocumentStructure) -> LegalGraph {
        let root = self.root_iri(structure);
        let lang = structure.id.language();
        let tag = lang.tag();
        let mut graph = LegalGraph::new(root.clone());

        graph.add_iri(&root, ontology::RDF_TYPE, ontology::ELI_LEGAL_RESOURCE);
        graph.add_iri(&root, ontology::ELI_LANGUAGE, &language_iri(lang));

        let meta = &structure.metadata;
        if let Some(title) = &meta.title {
            graph.add_literal(&root, ontology::ELI_TITLE, Literal::lang(title, tag));
        }
        if let Some(number) = &meta.law_number {
            graph.add_literal(&root, ontology::ELI_NUMBER, Literal::lang(number, tag));
        }
        if let Some(law_type) = &meta.law_type {
            graph.add_literal(&root, ontology::ELI_TYPE_DOCUMENT, Literal::plain(law_type));
        }
        if let Some(date) = meta.promulgation_date {
            let date = date.format("%Y-%m-%d").to_string();
            graph.add_literal(
                &root,
                ontology::ELI_VALID,
                Literal::plain(format!("{}/{}", date, ontology::VALIDITY_OPEN_END)),
            );
            graph.add_literal(
                &root,
                ontology::ELI_DATE_DOCUMENT,
                Literal::typed(date, ontology::XSD_DATE),
            );
        }

        for node in &structure.children {
            self.add_node(&mut graph, &root, node, tag, &language_iri(lang));
        }
        graph
    }

    fn add_node(
        &self,
        graph: &mut LegalGraph,
        parent: &str,
        node: &StructuralNode,
        tag: &str,
        language: &str,
    ) {
        let iri = format!("{}/{}", parent, node.path_segment());

        graph.add_iri(parent, ontology::ELI_HAS_PART, &iri);
        graph.add_iri(&iri, ontology::ELI_IS_PART_OF, parent);
        graph.add_iri(&iri, ontology::RDF_TYPE, ontology::ELI_SUBDIVISION);
        graph.add_iri(&iri, ontology::ELI_LANGUAGE, language);
        graph.add_literal(
            &iri,
            ontology::ELI_DIVISION_TYPE,
            Literal::plain(node.kind.segment()),
        );
        graph.add_literal(&iri, ontology::ELI_NUMBER, Literal::lang(&node.label, tag));
        graph.add_literal(
            &iri,
            ontology::JLAW_POSITION,
            Literal::typed(node.position.to_string(), ontology::XSD_INTEGER),
        );
        if let Some(title) = &node.title {
            graph.add_literal(&iri, ontology::ELI_TITLE, Literal::lang(title, tag));
        }
        if let Some(text) = &node.text {
            graph.add_literal(&iri, ontology::ELI_CONTENT, Literal::lang(text, tag));
        }

        for child in &node.children {
            self.add_node(graph, &iri, child, tag, language);
        }
    }

    /// Links from each source article to the translated article at the same
    /// structural path, plus root to root.
    pub fn translation_links(
        &self,
        source: &DocumentStructure,
        translation: &DocumentStructure,
    ) -> LegalGraph {
        let source_root = self.root_iri(source);
        let target_root = self.root_iri(translation);
        let mut graph = LegalGraph::new(source_root.clone());
        graph.add_iri(&source_root, ontology::JLAW_HAS_TRANSLATION, &target_root);

        let targets: std::collections::BTreeSet<String> = translation
            .articles()
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        for (path, _) in source.articles() {
            if targets.contains(&path) {
                graph.add_iri(
                    &format!("{source_root}/{path}"),
                    ontology::JLAW_HAS_TRANSLATION,
                    &format!("{target_root}/{path}"),
                );
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Term, Triple};
    use crate::model::{DocumentId, Language};
    use crate::structure::parse_str;

    const FLAT: &str = r#"<Law Era="Showa" Year="25" PromulgateMonth="5" PromulgateDay="2" LawType="Act">
<LawNum>昭和二十五年法律第百三十一号</LawNum>
<LawBody><LawTitle>電波法</LawTitle><MainProvision>
<Article Num="1"><ArticleTitle>第一条</ArticleTitle>
  <Paragraph Num="1"><ParagraphSentence><Sentence>目的</Sentence></ParagraphSentence>
    <Item Num="1"><ItemTitle>一</ItemTitle><ItemSentence><Sentence>a</Sentence></ItemSentence></Item>
    <Item Num="2"><ItemTitle>二</ItemTitle><ItemSentence><Sentence>b</Sentence></ItemSentence></Item>
  </Paragraph>
</Article>
<Article Num="2"><ArticleTitle>第二条</ArticleTitle>
  <Paragraph Num="1"><ParagraphSentence><Sentence>定義</Sentence></ParagraphSentence></Paragraph>
</Article>
</MainProvision></LawBody></Law>"#;

    fn structure(lang: Language) -> DocumentStructure {
        parse_str(&DocumentId::new("radio-act", lang), FLAT).unwrap()
    }

    #[test]
    fn test_root_statements() {
        let graph = Converter::default().convert_structure(&structure(Language::Ja));
        let root = "http://data.japan.go.jp/law/radio-act/ja";
        assert_eq!(graph.root(), root);
        assert!(graph.contains(&Triple::new(root, ontology::RDF_TYPE, Term::iri(ontology::ELI_LEGAL_RESOURCE))));
        assert!(graph.contains(&Triple::new(
            root,
            ontology::ELI_VALID,
            Term::Literal(Literal::plain("1950-05-02/9999-12-31"))
        )));
        assert!(graph.contains(&Triple::new(
            root,
            ontology::ELI_TITLE,
            Term::Literal(Literal::lang("電波法", "ja"))
        )));
    }

    #[test]
    fn test_root_has_part_per_article_and_items_numbered() {
        let graph = Converter::default().convert_structure(&structure(Language::Ja));
        let root = graph.root().to_string();
        assert_eq!(graph.objects(&root, ontology::ELI_HAS_PART).count(), 2);

        let item_numbers = graph
            .triples()
            .filter(|t| t.subject.starts_with(&format!("{root}/article_1/")))
            .filter(|t| t.subject.rsplit('/').next().is_some_and(|s| s.starts_with("item_")))
            .filter(|t| t.predicate == ontology::ELI_NUMBER)
            .count();
        assert_eq!(item_numbers, 2);
    }

    #[test]
    fn test_paths_are_positional() {
        let graph = Converter::default().convert_structure(&structure(Language::Ja));
        let item = "http://data.japan.go.jp/law/radio-act/ja/article_1/paragraph_1/item_2";
        assert!(graph.contains(&Triple::new(
            item,
            ontology::ELI_IS_PART_OF,
            Term::iri("http://data.japan.go.jp/law/radio-act/ja/article_1/paragraph_1")
        )));
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let a = Converter::default().convert_structure(&structure(Language::En));
        let b = Converter::default().convert_structure(&structure(Language::En));
        assert_eq!(a, b);
        assert_eq!(a.to_ntriples(), b.to_ntriples());
    }

    #[test]
    fn test_custom_base_iri() {
        let graph = Converter::new("http://example.org/laws/").convert_structure(&structure(Language::En));
        assert_eq!(graph.root(), "http://example.org/laws/radio-act/en");
    }

    #[test]
    fn test_translation_links_pair_equal_paths() {
        let converter = Converter::default();
        let links = converter.translation_links(&structure(Language::Ja), &structure(Language::En));
        assert_eq!(links.len(), 3);
        assert!(links.contains(&Triple::new(
            "http://data.japan.go.jp/law/radio-act/ja/article_2",
            ontology::JLAW_HAS_TRANSLATION,
            Term::iri("http://data.japan.go.jp/law/radio-act/en/article_2")
        )));
    }
}
