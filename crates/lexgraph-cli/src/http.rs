//! HTTP retrieval with a caller-supplied timeout.

use std::time::Duration;
use tracing::debug;

use lexgraph_core::errors::{ExError, ExErrorKind};
use lexgraph_core::model::Language;
use lexgraph_core_types::schema::STAGE_RETRIEVE;
use lexgraph_core_types::Sensitive;
use lexgraph_engine::retrieval::retrieval_error;
use lexgraph_engine::{DocumentRequest, FileRetriever, Retriever};

/// Environment variable holding the bearer token for the translation source
pub const EN_TOKEN_ENV: &str = "LEXGRAPH_EN_TOKEN";

/// Fetches `http(s)://` locations over HTTP; anything else is read as a
/// local file.
pub struct HttpRetriever {
    client: reqwest::blocking::Client,
    en_token: Option<Sensitive<String>>,
}

impl HttpRetriever {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lexgraph/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let en_token = std::env::var(EN_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .map(Sensitive::new);
        Ok(Self { client, en_token })
    }

    fn get(&self, request: &DocumentRequest) -> Result<Vec<u8>, ExError> {
        let mut builder = self.client.get(&request.location);
        if request.id.language() == Language::En {
            if let Some(token) = &self.en_token {
                builder = builder.bearer_auth(token.expose());
            }
        }
        debug!(doc_id = %request.id, url = %request.location, authenticated = self.en_token.is_some(), "http get");

        let response = builder.send().map_err(|e| transport_error(request, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(retrieval_error(
                &request.id,
                format!("{}: http status {status}", request.location),
            ));
        }
        let body = response.bytes().map_err(|e| transport_error(request, e))?;
        Ok(body.to_vec())
    }
}

impl Retriever for HttpRetriever {
    fn fetch(&self, request: &DocumentRequest) -> Result<Vec<u8>, ExError> {
        if is_remote(&request.location) {
            self.get(request)
        } else {
            FileRetriever.fetch(request)
        }
    }
}

fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn transport_error(request: &DocumentRequest, err: reqwest::Error) -> ExError {
    if err.is_timeout() {
        ExError::new(ExErrorKind::Timeout)
            .with_op("retrieve")
            .with_doc_id(request.id.to_string())
            .with_stage(STAGE_RETRIEVE)
            .with_message(format!("{}: {err}", request.location))
    } else {
        retrieval_error(&request.id, format!("{}: {err}", request.location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_detection() {
        assert!(is_remote("https://laws.e-gov.go.jp/data/x.zip"));
        assert!(is_remote("HTTP://example.test/a.xml"));
        assert!(!is_remote("fixtures/radio-act.xml"));
        assert!(!is_remote("/tmp/https.xml"));
    }

    #[test]
    fn test_local_paths_read_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ja.xml");
        std::fs::write(&path, "<Law/>").unwrap();

        let retriever = HttpRetriever::new(Duration::from_secs(1)).unwrap();
        let request = DocumentRequest::new(
            lexgraph_core::model::DocumentId::new("radio-act", Language::Ja),
            path.display().to_string(),
        );
        assert_eq!(retriever.retrieve(&request).unwrap().bytes, b"<Law/>");
    }
}
