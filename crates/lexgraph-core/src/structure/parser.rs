//! Government statute XML → [`DocumentStructure`].
//!
//! Unknown wrapper elements are descended into transparently. Heading,
//! caption and sentence elements become node properties. Tables of contents,
//! appendix material and quoted amendment text sit outside the grammar and
//! are skipped.

use std::collections::BTreeMap;

use roxmltree::{Document, Node, ParsingOptions};

use crate::errors::{LexGraphError, Result};
use crate::model::{DocumentId, NormalizedDocument};
use crate::structure::grammar::{DocumentStructure, NodeKind, SourcePosition, StructuralNode};
use crate::structure::metadata;
use crate::structure::vocabulary::Vocabulary;

const ROOT_ELEMENT: &str = "Law";

/// Wrappers whose direct paragraphs belong to the document itself.
const PROVISION_WRAPPERS: &[&str] = &["MainProvision", "Preamble"];

/// Parse a normalized document.
///
/// # Errors
/// `MalformedXml` if the text is not well-formed, `StructuralMapping` if a
/// node violates the containment grammar.
pub fn parse(doc: &NormalizedDocument) -> Result<DocumentStructure> {
    parse_str(doc.id(), doc.as_str())
}

/// Parse statute XML text on behalf of document `id`.
///
/// # Errors
/// See [`parse`].
pub fn parse_str(id: &DocumentId, text: &str) -> Result<DocumentStructure> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let xml = Document::parse_with_options(text, options).map_err(|e| {
        LexGraphError::MalformedXml {
            doc_id: id.to_string(),
            reason: e.to_string(),
        }
    })?;

    let root = xml.root_element();
    if root.tag_name().name() != ROOT_ELEMENT {
        return Err(LexGraphError::StructuralMapping {
            doc_id: id.to_string(),
            position: source_position(&xml, root).to_string(),
            reason: format!(
                "document root must be <{}>, found <{}>",
                ROOT_ELEMENT,
                root.tag_name().name()
            ),
        });
    }

    let parser = Parser {
        xml: &xml,
        id,
        vocabulary: Vocabulary::for_language(id.language()),
    };
    let mut children = Vec::new();
    parser.collect(root, None, false, &mut BTreeMap::new(), &mut children)?;

    Ok(DocumentStructure {
        id: id.clone(),
        metadata: metadata::extract(root),
        children,
    })
}

struct Parser<'a, 'input> {
    xml: &'a Document<'input>,
    id: &'a DocumentId,
    vocabulary: Vocabulary,
}

impl<'a, 'input> Parser<'a, 'input> {
    /// Gather structural descendants of `element` belonging to `parent`.
    fn collect(
        &self,
        element: Node<'a, 'input>,
        parent: Option<NodeKind>,
        in_provision: bool,
        counters: &mut BTreeMap<NodeKind, usize>,
        out: &mut Vec<StructuralNode>,
    ) -> Result<()> {
        for child in element.children().filter(Node::is_element) {
            let name = child.tag_name().name();
            if is_skipped(name) || is_property(name) {
                continue;
            }
            match NodeKind::from_element(name) {
                Some(kind) => {
                    self.check_containment(child, kind, parent, in_provision)?;
                    let position = counters.entry(kind).or_insert(0);
                    *position += 1;
                    out.push(self.node(child, kind, *position)?);
                }
                None => {
                    let in_provision = in_provision || PROVISION_WRAPPERS.contains(&name);
                    self.collect(child, parent, in_provision, counters, out)?;
                }
            }
        }
        Ok(())
    }

    fn check_containment(
        &self,
        element: Node<'a, 'input>,
        kind: NodeKind,
        parent: Option<NodeKind>,
        in_provision: bool,
    ) -> Result<()> {
        let legal = match kind {
            k if k.is_block() => parent.map_or(true, |p| p.is_block()),
            NodeKind::Article => parent.map_or(true, |p| p.is_block()),
            NodeKind::Paragraph => match parent {
                Some(NodeKind::Article) | Some(NodeKind::SupplProvision) => true,
                None => in_provision,
                Some(_) => false,
            },
            _ => matches!(parent, Some(NodeKind::Paragraph) | Some(NodeKind::Item)),
        };
        if legal {
            return Ok(());
        }

        let found = match parent {
            Some(p) => format!("inside {p}"),
            None => "at document level".to_string(),
        };
        let required = match kind {
            NodeKind::Paragraph => "an article or provision block",
            NodeKind::Item => "a paragraph or item",
            _ => "the document, a provision block or a part",
        };
        Err(LexGraphError::StructuralMapping {
            doc_id: self.id.to_string(),
            position: source_position(self.xml, element).to_string(),
            reason: format!("{kind} must be enclosed by {required}, found {found}"),
        })
    }

    fn node(&self, element: Node<'a, 'input>, kind: NodeKind, position: usize) -> Result<StructuralNode> {
        let name = element.tag_name().name();
        let num = element
            .attribute("Num")
            .map(str::to_string)
            .unwrap_or_else(|| position.to_string());

        let (label_element, title_element) = match kind {
            NodeKind::Article => (Some("ArticleTitle".to_string()), Some("ArticleCaption".to_string())),
            NodeKind::Paragraph => (Some("ParagraphNum".to_string()), Some("ParagraphCaption".to_string())),
            NodeKind::Item => (Some(format!("{name}Title")), None),
            NodeKind::SupplProvision => (None, Some("SupplProvisionLabel".to_string())),
            _ => (None, Some(format!("{name}Title"))),
        };

        let label = label_element
            .and_then(|n| child_text(element, &n))
            .unwrap_or_else(|| self.vocabulary.default_label(kind, &num));
        let title = title_element.and_then(|n| child_text(element, &n));

        let text = match kind {
            NodeKind::Article => self.article_text(element),
            NodeKind::Paragraph | NodeKind::Item => self.own_sentences(element),
            _ => None,
        };

        let mut children = Vec::new();
        self.collect(element, Some(kind), false, &mut BTreeMap::new(), &mut children)?;

        Ok(StructuralNode {
            kind,
            position,
            label,
            title,
            text,
            source: source_position(self.xml, element),
            children,
        })
    }

    /// Sentences directly owned by a paragraph or item (`…Sentence` children).
    fn own_sentences(&self, element: Node<'a, 'input>) -> Option<String> {
        let sentences: Vec<String> = element
            .children()
            .filter(|c| c.is_element() && c.tag_name().name().ends_with("Sentence"))
            .flat_map(sentence_texts)
            .collect();
        join_non_empty(&sentences, self.vocabulary.sentence_joiner())
    }

    /// Every sentence of an article, one per line.
    fn article_text(&self, element: Node<'a, 'input>) -> Option<String> {
        let sentences: Vec<String> = element
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "Sentence")
            .filter(|n| !within_skipped(*n, element))
            .map(|n| collapse(&text_content(n)))
            .collect();
        join_non_empty(&sentences, "\n")
    }
}

fn is_skipped(name: &str) -> bool {
    name == "TOC" || name == "AmendProvision" || name.contains("Appdx")
}

/// Heading, caption and sentence elements consumed as node properties.
fn is_property(name: &str) -> bool {
    ["Title", "Caption", "Num", "Label", "Sentence"]
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

fn within_skipped(node: Node<'_, '_>, stop: Node<'_, '_>) -> bool {
    node.ancestors()
        .take_while(|a| *a != stop)
        .any(|a| a.is_element() && is_skipped(a.tag_name().name()))
}

/// `Sentence` texts under a sentence container; the whole text if it has none.
fn sentence_texts(container: Node<'_, '_>) -> Vec<String> {
    let sentences: Vec<String> = container
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Sentence")
        .map(|n| collapse(&text_content(n)))
        .collect();
    if sentences.is_empty() {
        vec![collapse(&text_content(container))]
    } else {
        sentences
    }
}

fn child_text(element: Node<'_, '_>, name: &str) -> Option<String> {
    let child = element
        .children()
        .find(|c| c.is_element() && c.tag_name().name() == name)?;
    let text = collapse(&text_content(child));
    (!text.is_empty()).then_some(text)
}

/// Concatenated text, ignoring ruby readings.
fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter(|n| {
            !n.ancestors()
                .any(|a| a.is_element() && a.tag_name().name() == "Rt")
        })
        .filter_map(|n| n.text())
        .collect()
}

/// Collapse ASCII whitespace runs; full-width spaces are content.
fn collapse(text: &str) -> String {
    text.split(|c: char| c.is_ascii_whitespace())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_non_empty(parts: &[String], joiner: &str) -> Option<String> {
    let parts: Vec<&str> = parts
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(joiner))
}

fn source_position(xml: &Document<'_>, node: Node<'_, '_>) -> SourcePosition {
    let mut segments: Vec<String> = node
        .ancestors()
        .filter(Node::is_element)
        .map(|n| {
            let name = n.tag_name().name();
            let same_before = n
                .prev_siblings()
                .filter(|s| s.is_element() && s.tag_name().name() == name)
                .count();
            let same_after = n
                .next_siblings()
                .filter(|s| s.is_element() && s.tag_name().name() == name)
                .count();
            // prev_siblings/next_siblings include the node itself
            if same_before + same_after > 2 {
                format!("{}[{}]", name, same_before)
            } else {
                name.to_string()
            }
        })
        .collect();
    segments.reverse();

    let pos = xml.text_pos_at(node.range().start);
    SourcePosition {
        xpath: format!("/{}", segments.join("/")),
        line: pos.row,
        column: pos.col,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Language;

    fn ja() -> DocumentId {
        DocumentId::new("radio-act", Language::Ja)
    }

    const SOURCE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Law Era="Showa" Year="25" Num="131" LawType="Act" Lang="ja" PromulgateMonth="05" PromulgateDay="02">
  <LawNum>昭和二十五年法律第百三十一号</LawNum>
  <LawBody>
    <LawTitle>電波法</LawTitle>
    <TOC><TOCChapter Num="1"><ChapterTitle>第一章　総則</ChapterTitle></TOCChapter></TOC>
    <MainProvision>
      <Chapter Num="1">
        <ChapterTitle>第一章　総則</ChapterTitle>
        <Article Num="1">
          <ArticleCaption>（目的）</ArticleCaption>
          <ArticleTitle>第一条</ArticleTitle>
          <Paragraph Num="1">
            <ParagraphNum/>
            <ParagraphSentence><Sentence>この法律は、電波の公平且つ能率的な利用を確保する。</Sentence></ParagraphSentence>
          </Paragraph>
        </Article>
        <Article Num="2">
          <ArticleCaption>（定義）</ArticleCaption>
          <ArticleTitle>第二条</ArticleTitle>
          <Paragraph Num="1">
            <ParagraphNum/>
            <ParagraphSentence><Sentence>用語の意義は、次の定義に従う。</Sentence></ParagraphSentence>
            <Item Num="1">
              <ItemTitle>一</ItemTitle>
              <ItemSentence><Sentence>「電波」とは、電磁波をいう。</Sentence></ItemSentence>
              <Subitem1 Num="1">
                <Subitem1Title>イ</Subitem1Title>
                <Subitem1Sentence><Sentence>細目</Sentence></Subitem1Sentence>
              </Subitem1>
            </Item>
            <Item Num="2">
              <ItemTitle>二</ItemTitle>
              <ItemSentence><Sentence>「無線電信」とは、符号を送る通信設備をいう。</Sentence></ItemSentence>
            </Item>
          </Paragraph>
        </Article>
      </Chapter>
    </MainProvision>
    <SupplProvision>
      <SupplProvisionLabel>附　則</SupplProvisionLabel>
      <Paragraph Num="1"><ParagraphNum/><ParagraphSentence><Sentence>施行する。</Sentence></ParagraphSentence></Paragraph>
    </SupplProvision>
  </LawBody>
</Law>"#;

    #[test]
    fn test_parses_tree_in_source_order() {
        let structure = parse_str(&ja(), SOURCE).unwrap();
        let paths: Vec<String> = structure.nodes().into_iter().map(|(p, _)| p).collect();
        assert_eq!(
            paths,
            vec![
                "chapter_1",
                "chapter_1/article_1",
                "chapter_1/article_1/paragraph_1",
                "chapter_1/article_2",
                "chapter_1/article_2/paragraph_1",
                "chapter_1/article_2/paragraph_1/item_1",
                "chapter_1/article_2/paragraph_1/item_1/item_1",
                "chapter_1/article_2/paragraph_1/item_2",
                "suppl_provision_1",
                "suppl_provision_1/paragraph_1",
            ]
        );
    }

    #[test]
    fn test_labels_titles_and_text() {
        let structure = parse_str(&ja(), SOURCE).unwrap();
        let articles = structure.articles();
        let (_, article) = articles[1];
        assert_eq!(article.label, "第二条");
        assert_eq!(article.title.as_deref(), Some("（定義）"));
        let paragraph = &article.children[0];
        assert_eq!(paragraph.label, "第1項");
        assert_eq!(paragraph.text.as_deref(), Some("用語の意義は、次の定義に従う。"));
        assert_eq!(paragraph.children[0].label, "一");
        assert_eq!(paragraph.children[0].children[0].label, "イ");

        let chapter = &structure.children[0];
        assert_eq!(chapter.label, "第1章");
        assert_eq!(chapter.title.as_deref(), Some("第一章　総則"));
        assert_eq!(structure.children[1].title.as_deref(), Some("附　則"));
    }

    #[test]
    fn test_article_text_joins_all_sentences() {
        let structure = parse_str(&ja(), SOURCE).unwrap();
        let (_, article) = structure.articles()[1];
        let text = article.text.as_deref().unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("用語の意義は"));
    }

    #[test]
    fn test_metadata_extracted() {
        let structure = parse_str(&ja(), SOURCE).unwrap();
        assert_eq!(structure.metadata.title.as_deref(), Some("電波法"));
        assert_eq!(structure.metadata.law_type.as_deref(), Some("Act"));
    }

    #[test]
    fn test_item_without_paragraph_is_rejected() {
        let xml = r#"<Law><LawBody><MainProvision>
<Article Num="1"><ArticleTitle>Article 1</ArticleTitle>
<Item Num="1"><ItemTitle>(i)</ItemTitle><ItemSentence><Sentence>bare</Sentence></ItemSentence></Item>
</Article></MainProvision></LawBody></Law>"#;
        let id = DocumentId::new("radio-act", Language::En);
        let err = parse_str(&id, xml).unwrap_err();
        match err {
            LexGraphError::StructuralMapping {
                doc_id,
                position,
                reason,
            } => {
                assert_eq!(doc_id, "radio-act:en");
                assert!(position.starts_with("/Law/LawBody/MainProvision/Article/Item"));
                assert!(position.contains("line 3"));
                assert!(reason.contains("item must be enclosed by a paragraph or item"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_paragraph_inside_chapter_is_rejected() {
        let xml = r#"<Law><LawBody><MainProvision><Chapter Num="1">
<Paragraph Num="1"><ParagraphSentence><Sentence>x</Sentence></ParagraphSentence></Paragraph>
</Chapter></MainProvision></LawBody></Law>"#;
        let err = parse_str(&ja(), xml).unwrap_err();
        assert!(matches!(err, LexGraphError::StructuralMapping { .. }));
    }

    #[test]
    fn test_paragraph_directly_in_main_provision_is_legal() {
        let xml = r#"<Law><LawBody><MainProvision>
<Paragraph Num="1"><ParagraphSentence><Sentence>x</Sentence></ParagraphSentence></Paragraph>
</MainProvision></LawBody></Law>"#;
        let structure = parse_str(&ja(), xml).unwrap();
        assert_eq!(structure.count(NodeKind::Paragraph), 1);
    }

    #[test]
    fn test_sibling_index_in_xpath() {
        let xml = r#"<Law><LawBody><MainProvision>
<Article Num="1"><Paragraph Num="1"/></Article>
<Article Num="2"><Item Num="1"/></Article>
</MainProvision></LawBody></Law>"#;
        let err = parse_str(&ja(), xml).unwrap_err();
        let LexGraphError::StructuralMapping { position, .. } = err else {
            panic!("expected structural mapping error");
        };
        assert!(position.starts_with("/Law/LawBody/MainProvision/Article[2]/Item"));
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_str(&ja(), "<Law><LawBody></Law>").unwrap_err();
        assert!(matches!(err, LexGraphError::MalformedXml { .. }));
    }

    #[test]
    fn test_wrong_root() {
        let err = parse_str(&ja(), "<Statute/>").unwrap_err();
        assert!(matches!(err, LexGraphError::StructuralMapping { .. }));
    }

    #[test]
    fn test_unknown_wrappers_are_transparent() {
        let xml = r#"<Law><LawBody><MainProvision><Wrapper><Article Num="1">
<Paragraph Num="1"><ParagraphSentence><Sentence>x</Sentence></ParagraphSentence></Paragraph>
</Article></Wrapper></MainProvision></LawBody></Law>"#;
        let structure = parse_str(&ja(), xml).unwrap();
        assert_eq!(structure.articles().len(), 1);
        assert_eq!(structure.articles()[0].0, "article_1");
    }
}
