//! Run configuration.
//!
//! Precedence: command-line flags, then the TOML file named by `--config`,
//! then built-in defaults.
//!
//! ```toml
//! [sources.ja]
//! url = "https://laws.e-gov.go.jp/data/…/325AC0000000131_xml.zip"
//! name = "radio-act"
//!
//! [sources.en]
//! file = "fixtures/radio-act-en.xml"
//! encoding = "Shift_JIS"
//!
//! [output]
//! dir = "data"
//! store = "data/fingerprints.json"
//! graph_format = "jsonld"
//!
//! [fetch]
//! timeout_secs = 30
//!
//! [graph]
//! base_iri = "http://data.japan.go.jp/law"
//! ```

use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lexgraph_core::graph::{ontology, GraphFormat};
use lexgraph_core::model::{DocumentId, Language};
use lexgraph_engine::{DocumentRequest, RunOptions};
use lexgraph_store::STORE_FILE_NAME;

use crate::commands::run::RunArgs;

pub const DEFAULT_JA_URL: &str = "https://laws.e-gov.go.jp/data/Act/325AC0000000131/606996_4/325AC0000000131_20250601_504AC0000000068_xml.zip";
pub const DEFAULT_EN_URL: &str = "https://www.japaneselawtranslation.go.jp/en/laws/download/3205/06/s25Aa001310204en7.0_h26A26.xml";
pub const DEFAULT_NAME: &str = "radio-act";
pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesConfig {
    pub ja: Option<SourceConfig>,
    pub en: Option<SourceConfig>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    pub encoding: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub graph_format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    pub base_iri: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug)]
pub struct Settings {
    pub requests: Vec<DocumentRequest>,
    pub output_dir: PathBuf,
    pub store_path: PathBuf,
    pub options: RunOptions,
    pub timeout: Duration,
    pub fail_on_change: bool,
}

impl Settings {
    pub fn resolve(args: &RunArgs, file: FileConfig) -> anyhow::Result<Self> {
        // A source flag selects its document; the config file only fills in
        // when no document was selected on the command line.
        let cli_ja = args.ja || args.ja_file.is_some() || args.ja_url.is_some();
        let cli_en = args.en || args.en_file.is_some() || args.en_url.is_some();
        let from_file = !cli_ja && !cli_en;

        let mut languages = Vec::new();
        if cli_ja || (from_file && file.sources.ja.is_some()) {
            languages.push(Language::Ja);
        }
        if cli_en || (from_file && file.sources.en.is_some()) {
            languages.push(Language::En);
        }
        if languages.is_empty() {
            bail!("select at least one document with --ja or --en (or configure [sources])");
        }

        let requests = languages
            .into_iter()
            .map(|language| {
                let configured = match language {
                    Language::Ja => file.sources.ja.clone(),
                    Language::En => file.sources.en.clone(),
                }
                .unwrap_or_default();
                source_request(args, language, configured)
            })
            .collect();

        let output_dir = args
            .output_dir
            .clone()
            .or(file.output.dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let store_path = args
            .store
            .clone()
            .or(file.output.store)
            .unwrap_or_else(|| output_dir.join(STORE_FILE_NAME));

        let graph_format = match args.format.as_deref().or(file.output.graph_format.as_deref()) {
            Some(label) => label.parse::<GraphFormat>()?,
            None => GraphFormat::default(),
        };
        let base_iri = file
            .graph
            .base_iri
            .unwrap_or_else(|| ontology::DEFAULT_BASE_IRI.to_string());
        let timeout_secs = args
            .timeout_secs
            .or(file.fetch.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            requests,
            output_dir,
            store_path,
            options: RunOptions {
                enable_diff: args.diff,
                enable_convert: args.convert || args.query_test,
                enable_query_test: args.query_test,
                graph_format,
                base_iri,
            },
            timeout: Duration::from_secs(timeout_secs),
            fail_on_change: args.fail_on_change,
        })
    }
}

fn source_request(args: &RunArgs, language: Language, configured: SourceConfig) -> DocumentRequest {
    let (cli_file, cli_url, cli_encoding, default_url) = match language {
        Language::Ja => (&args.ja_file, &args.ja_url, &args.ja_encoding, DEFAULT_JA_URL),
        Language::En => (&args.en_file, &args.en_url, &args.en_encoding, DEFAULT_EN_URL),
    };

    let location = if let Some(path) = cli_file {
        path.display().to_string()
    } else if let Some(url) = cli_url {
        url.clone()
    } else if let Some(path) = &configured.file {
        path.display().to_string()
    } else {
        configured.url.unwrap_or_else(|| default_url.to_string())
    };

    let name = configured.name.unwrap_or_else(|| DEFAULT_NAME.to_string());
    let request = DocumentRequest::new(DocumentId::new(name, language), location);
    match cli_encoding.clone().or(configured.encoding) {
        Some(label) => request.with_declared_encoding(label),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        run: RunArgs,
    }

    fn args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["lexgraph"];
        full.extend_from_slice(argv);
        Harness::parse_from(full).run
    }

    #[test]
    fn test_defaults_without_config() {
        let settings = Settings::resolve(&args(&["--ja", "--en"]), FileConfig::default()).unwrap();
        assert_eq!(settings.requests.len(), 2);
        assert_eq!(settings.requests[0].location, DEFAULT_JA_URL);
        assert_eq!(settings.requests[1].location, DEFAULT_EN_URL);
        assert_eq!(settings.requests[1].id.to_string(), "radio-act:en");
        assert_eq!(settings.output_dir, PathBuf::from("data"));
        assert_eq!(settings.store_path, PathBuf::from("data").join("fingerprints.json"));
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(settings.options, RunOptions::default());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let file = FileConfig::parse(
            r#"
            [sources.ja]
            url = "https://example.test/ja.zip"
            encoding = "EUC-JP"
            name = "radio"

            [output]
            dir = "out"
            graph_format = "jsonld"

            [fetch]
            timeout_secs = 5
            "#,
        )
        .unwrap();
        let settings = Settings::resolve(
            &args(&["--ja-file", "local.xml", "--timeout-secs", "9", "--format", "nt"]),
            file,
        )
        .unwrap();

        assert_eq!(settings.requests.len(), 1);
        let request = &settings.requests[0];
        assert_eq!(request.location, "local.xml");
        assert_eq!(request.declared_encoding.as_deref(), Some("EUC-JP"));
        assert_eq!(request.id.to_string(), "radio:ja");
        assert_eq!(settings.output_dir, PathBuf::from("out"));
        assert_eq!(settings.timeout, Duration::from_secs(9));
        assert_eq!(settings.options.graph_format, GraphFormat::NTriples);
    }

    #[test]
    fn test_query_test_implies_convert() {
        let settings = Settings::resolve(&args(&["--en", "--query-test"]), FileConfig::default()).unwrap();
        assert!(settings.options.enable_convert);
        assert!(settings.options.enable_query_test);
        assert!(!settings.options.enable_diff);
    }

    #[test]
    fn test_no_selection_is_an_error() {
        assert!(Settings::resolve(&args(&[]), FileConfig::default()).is_err());
    }

    #[test]
    fn test_unknown_config_key_is_rejected() {
        assert!(FileConfig::parse("[output]\nfolder = \"x\"\n").is_err());
    }
}
