//! Byte-level normalization: arbitrary encoding in, canonical UTF-8 out.
//!
//! The output contains no byte-order mark, only `\n` line breaks, and (when
//! the document carries an XML declaration) declares `encoding="UTF-8"`.
//! Normalizing normalized output is a no-op.

use encoding_rs::{Encoding, EUC_JP, ISO_2022_JP, SHIFT_JIS, UTF_16BE, UTF_16LE, UTF_8};
use tracing::debug;

use crate::errors::{LexGraphError, Result};
use crate::model::{NormalizedDocument, RawDocument};

const BOM: char = '\u{FEFF}';

/// How far into the raw bytes the XML declaration is searched for
const XML_DECL_SNIFF_LIMIT: usize = 1024;

/// Converts raw documents into their canonical form.
#[derive(Debug, Clone)]
pub struct Normalizer {
    priority: Vec<&'static Encoding>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            priority: vec![UTF_8, SHIFT_JIS, EUC_JP, ISO_2022_JP],
        }
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fallback priority list tried after the declared, BOM and
    /// XML-declaration candidates.
    pub fn with_priority(priority: Vec<&'static Encoding>) -> Self {
        Self { priority }
    }

    /// Normalize one raw document.
    ///
    /// # Errors
    /// `Encoding` when no candidate decodes the bytes cleanly.
    pub fn normalize(&self, raw: &RawDocument) -> Result<NormalizedDocument> {
        let candidates = self.candidates(raw);

        for encoding in &candidates {
            if let Some(text) = decode_clean(encoding, &raw.bytes) {
                debug!(
                    doc_id = %raw.id,
                    encoding = encoding.name(),
                    "decoded raw document"
                );
                return Ok(NormalizedDocument::new(
                    raw.id.clone(),
                    encoding.name(),
                    canonicalize(&text),
                ));
            }
        }

        let tried = candidates
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join(", ");
        Err(LexGraphError::Encoding {
            doc_id: raw.id.to_string(),
            tried,
        })
    }

    /// Candidate encodings in trial order, without duplicates.
    fn candidates(&self, raw: &RawDocument) -> Vec<&'static Encoding> {
        let declared = raw
            .declared_encoding
            .as_deref()
            .and_then(|label| Encoding::for_label(label.trim().as_bytes()));
        let bom = Encoding::for_bom(&raw.bytes).map(|(encoding, _)| encoding);

        let mut ordered: Vec<&'static Encoding> = Vec::new();
        match (declared, bom) {
            // A BOM contradicting the declared label wins, as in WHATWG decode.
            (Some(d), Some(b)) if d != b => {
                ordered.push(b);
                ordered.push(d);
            }
            (d, b) => {
                ordered.extend(d);
                ordered.extend(b);
            }
        }
        ordered.extend(xml_declared_encoding(&raw.bytes));
        ordered.extend(self.priority.iter().copied());

        let mut unique = Vec::with_capacity(ordered.len());
        for encoding in ordered {
            if !unique.contains(&encoding) {
                unique.push(encoding);
            }
        }
        unique
    }
}

/// Normalize with the default candidate list.
///
/// # Errors
/// See [`Normalizer::normalize`].
pub fn normalize(raw: &RawDocument) -> Result<NormalizedDocument> {
    Normalizer::default().normalize(raw)
}

/// Decode without replacement; `None` on malformed input or embedded NULs.
fn decode_clean(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    let text = encoding.decode_without_bom_handling_and_without_replacement(bytes)?;
    if text.contains('\0') {
        return None;
    }
    Some(text.into_owned())
}

/// Text-level canonicalization shared by every decoded document.
pub fn canonicalize(text: &str) -> String {
    let text = text.trim_start_matches(BOM);
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    rewrite_declared_encoding(&text)
}

/// Encoding named by an ASCII-compatible XML declaration, if any.
///
/// UTF-16 documents are recognized from the `<?` pattern of their first two
/// code units, since their declaration cannot be read as ASCII. A UTF-16
/// label inside an ASCII-readable declaration resolves to UTF-8.
pub fn xml_declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    if bytes.starts_with(&[0x3C, 0x00, 0x3F, 0x00]) {
        return Some(UTF_16LE);
    }
    if bytes.starts_with(&[0x00, 0x3C, 0x00, 0x3F]) {
        return Some(UTF_16BE);
    }

    let head = &bytes[..bytes.len().min(XML_DECL_SNIFF_LIMIT)];
    let head = head.strip_prefix(&[0xEF, 0xBB, 0xBF][..]).unwrap_or(head);
    if !head.starts_with(b"<?xml") {
        return None;
    }
    let end = head.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(&head[..end]).ok()?;
    let (_, value) = encoding_value_span(decl)?;
    let named = Encoding::for_label(value.as_bytes())?;
    // An ASCII-readable declaration cannot be UTF-16, whatever it says.
    if named == UTF_16LE || named == UTF_16BE {
        return Some(UTF_8);
    }
    Some(named)
}

/// Byte offset and value of the `encoding` pseudo-attribute in a declaration.
fn encoding_value_span(decl: &str) -> Option<(usize, &str)> {
    let key = decl.find("encoding")?;
    let rest = &decl[key + "encoding".len()..];
    let eq = rest.find('=')?;
    if !rest[..eq].trim().is_empty() {
        return None;
    }
    let after_eq = &rest[eq + 1..];
    let trimmed = after_eq.trim_start();
    let quote = trimmed.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value_start_in_trimmed = quote.len_utf8();
    let close = trimmed[value_start_in_trimmed..].find(quote)?;
    let value = &trimmed[value_start_in_trimmed..value_start_in_trimmed + close];
    let offset = key
        + "encoding".len()
        + eq
        + 1
        + (after_eq.len() - trimmed.len())
        + value_start_in_trimmed;
    Some((offset, value))
}

/// Rewrite the declaration's encoding to `UTF-8`; other text is untouched.
fn rewrite_declared_encoding(text: &str) -> String {
    if !text.starts_with("<?xml") {
        return text.to_string();
    }
    let Some(end) = text.find("?>") else {
        return text.to_string();
    };
    let decl = &text[..end];
    match encoding_value_span(decl) {
        Some((offset, value)) if value != "UTF-8" => {
            let mut out = String::with_capacity(text.len());
            out.push_str(&text[..offset]);
            out.push_str("UTF-8");
            out.push_str(&text[offset + value.len()..]);
            out
        }
        _ => text.to_string(),
    }
}
