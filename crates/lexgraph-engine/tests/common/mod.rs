#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lexgraph_core::model::{DocumentId, Language};
use lexgraph_engine::DocumentRequest;

pub fn ja_id() -> DocumentId {
    DocumentId::new("radio-act", Language::Ja)
}

pub fn en_id() -> DocumentId {
    DocumentId::new("radio-act", Language::En)
}

pub fn statute(articles: usize) -> String {
    let mut body = String::new();
    for a in 1..=articles {
        body.push_str(&format!(
            "<Article Num=\"{a}\"><ArticleTitle>第{a}条</ArticleTitle>\
             <Paragraph Num=\"1\"><ParagraphNum/><ParagraphSentence><Sentence>第{a}条の本文</Sentence></ParagraphSentence>\
             <Item Num=\"1\"><ItemTitle>一</ItemTitle><ItemSentence><Sentence>号</Sentence></ItemSentence></Item>\
             </Paragraph></Article>\n"
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Law Era=\"Showa\" Year=\"25\" PromulgateMonth=\"5\" PromulgateDay=\"2\" LawType=\"Act\" Lang=\"ja\">\n\
         <LawNum>昭和二十五年法律第百三十一号</LawNum>\n\
         <LawBody><LawTitle>電波法</LawTitle><MainProvision>\n{body}</MainProvision></LawBody>\n</Law>\n"
    )
}

pub fn translation(articles: usize) -> String {
    let mut body = String::new();
    for a in 1..=articles {
        body.push_str(&format!(
            "<Article Num=\"{a}\"><ArticleTitle>Article {a}</ArticleTitle>\
             <Paragraph Num=\"1\"><ParagraphSentence><Sentence>Text of article {a}.</Sentence></ParagraphSentence></Paragraph></Article>\n"
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Law Lang=\"en\" LawType=\"Act\" OriginalPromulgateDate=\"May 2, 1950\">\n\
         <LawNum>Act No. 131 of 1950</LawNum>\n\
         <LawBody><LawTitle>Radio Act</LawTitle><MainProvision>\n{body}</MainProvision></LawBody>\n</Law>\n"
    )
}

/// A translation whose item sits directly under its article.
pub fn bare_item_translation() -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
     <Law Lang=\"en\" LawType=\"Act\" OriginalPromulgateDate=\"May 2, 1950\">\n\
     <LawNum>Act No. 131 of 1950</LawNum>\n\
     <LawBody><LawTitle>Radio Act</LawTitle><MainProvision>\n\
     <Article Num=\"1\"><ArticleTitle>Article 1</ArticleTitle>\n\
     <Item Num=\"1\"><ItemSentence><Sentence>stray</Sentence></ItemSentence></Item>\n\
     </Article></MainProvision></LawBody>\n</Law>\n"
        .to_string()
}

pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

pub fn requests(ja: &Path, en: &Path) -> Vec<DocumentRequest> {
    vec![
        DocumentRequest::new(ja_id(), ja.display().to_string()),
        DocumentRequest::new(en_id(), en.display().to_string()),
    ]
}
