//! Shared structural grammar for statute documents.
//!
//! Both document variants (source statute and its translation) are parsed
//! into the same tree: document → parts → articles → paragraphs → items.
//! Variant-specific wording lives in [`vocabulary::Vocabulary`].
//!
//! ## Entry point
//!
//! ```
//! use lexgraph_core::model::{DocumentId, Language};
//! use lexgraph_core::structure::parse_str;
//!
//! let id = DocumentId::new("radio-act", Language::En);
//! let xml = r#"<Law><LawNum>Act No. 131 of 1950</LawNum><LawBody><LawTitle>Radio Act</LawTitle>
//!   <MainProvision><Article Num="1"><Paragraph Num="1"><ParagraphSentence>
//!   <Sentence>Purpose.</Sentence></ParagraphSentence></Paragraph></Article></MainProvision>
//!   </LawBody></Law>"#;
//! let structure = parse_str(&id, xml).unwrap();
//! assert_eq!(structure.articles().len(), 1);
//! ```
//!
//! ## Guarantees
//!
//! - Source order is preserved; nothing is dropped or reordered.
//! - Every node gets a 1-based position among same-kind siblings, so paths
//!   are stable across re-parses of identical input.
//! - A paragraph outside an article/provision block, or an item outside a
//!   paragraph/item, fails with a structural mapping error naming the node.

pub mod grammar;
pub mod metadata;
pub mod parser;
pub mod vocabulary;

pub use grammar::{DocumentStructure, NodeKind, SourcePosition, StructuralNode};
pub use metadata::LawMetadata;
pub use parser::{parse, parse_str};
pub use vocabulary::Vocabulary;
