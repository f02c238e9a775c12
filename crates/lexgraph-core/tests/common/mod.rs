use lexgraph_core::model::{DocumentId, Language, NormalizedDocument, RawDocument};
use lexgraph_core::normalize::normalize;

/// Build a statute with `articles` articles, each holding one paragraph
/// with `items` numbered items.
#[allow(dead_code)]
pub fn statute(articles: usize, items: usize) -> String {
    let mut body = String::new();
    for a in 1..=articles {
        body.push_str(&format!(
            "<Article Num=\"{a}\"><ArticleTitle>第{a}条</ArticleTitle>\
             <Paragraph Num=\"1\"><ParagraphNum/><ParagraphSentence><Sentence>第{a}条の本文</Sentence></ParagraphSentence>"
        ));
        for i in 1..=items {
            body.push_str(&format!(
                "<Item Num=\"{i}\"><ItemTitle>{i}</ItemTitle><ItemSentence><Sentence>号{i}</Sentence></ItemSentence></Item>"
            ));
        }
        body.push_str("</Paragraph></Article>\n");
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Law Era=\"Showa\" Year=\"25\" PromulgateMonth=\"5\" PromulgateDay=\"2\" LawType=\"Act\" Lang=\"ja\">\n\
         <LawNum>昭和二十五年法律第百三十一号</LawNum>\n\
         <LawBody><LawTitle>電波法</LawTitle><MainProvision>\n{body}</MainProvision></LawBody>\n</Law>\n"
    )
}

/// A small English translation with the same article layout.
#[allow(dead_code)]
pub fn translation(articles: usize) -> String {
    let mut body = String::new();
    for a in 1..=articles {
        body.push_str(&format!(
            "<Article Num=\"{a}\"><ArticleCaption>(Purpose {a})</ArticleCaption><ArticleTitle>Article {a}</ArticleTitle>\
             <Paragraph Num=\"1\"><ParagraphSentence><Sentence>The purpose of</Sentence><Sentence>this Act.</Sentence></ParagraphSentence></Paragraph></Article>\n"
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Law Lang=\"en\" LawType=\"Act\" OriginalPromulgateDate=\"May 2, 1950\">\n\
         <LawNum>Act No. 131 of 1950</LawNum>\n\
         <LawBody><LawTitle>Radio Act</LawTitle><MainProvision>\n{body}</MainProvision></LawBody>\n</Law>\n"
    )
}

#[allow(dead_code)]
pub fn ja_id() -> DocumentId {
    DocumentId::new("radio-act", Language::Ja)
}

#[allow(dead_code)]
pub fn en_id() -> DocumentId {
    DocumentId::new("radio-act", Language::En)
}

#[allow(dead_code)]
pub fn normalized(id: DocumentId, xml: &str) -> NormalizedDocument {
    normalize(&RawDocument::new(id, xml.as_bytes().to_vec())).unwrap()
}
