//! Validated run configuration for each subcommand.
//!
//! Every command turns its clap arguments into one of these structs before
//! touching the filesystem, so pipeline stages only ever see checked values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::cli::{CleanupRule, ConvertArgs, CorpusArgs, ExtractArgs, MergeReportsArgs};
use crate::model::ExtractSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct QualityGate {
    pub min_text_chars: usize,
    pub min_alpha_ratio: f64,
    pub max_char_share: f64,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self {
            min_text_chars: 50,
            min_alpha_ratio: 0.5,
            max_char_share: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSettings {
    pub dpi: u32,
    pub first_page: u32,
    pub last_page: u32,
    pub lang: String,
    pub whitelist: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceFilter {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for SentenceFilter {
    fn default() -> Self {
        Self {
            min_chars: 10,
            max_chars: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub quality: QualityGate,
    pub ocr: OcrSettings,
    pub sentences: SentenceFilter,
    pub cleanup_rules: Vec<CleanupRule>,
}

impl ExtractConfig {
    pub fn from_args(args: &ExtractArgs) -> Result<Self> {
        require_directory(&args.input_dir)?;

        let quality = QualityGate {
            min_text_chars: args.min_text_chars,
            min_alpha_ratio: args.min_alpha_ratio,
            max_char_share: args.max_char_share,
        };
        if quality.min_text_chars == 0 {
            bail!("min-text-chars must be at least 1");
        }
        validate_ratio("min-alpha-ratio", quality.min_alpha_ratio)?;
        validate_ratio("max-char-share", quality.max_char_share)?;

        let ocr = OcrSettings {
            dpi: args.ocr_dpi,
            first_page: args.ocr_first_page,
            last_page: args.ocr_last_page,
            lang: args.ocr_lang.trim().to_string(),
            whitelist: args.ocr_whitelist.clone(),
        };
        if ocr.dpi == 0 {
            bail!("ocr-dpi must be greater than zero");
        }
        if ocr.first_page == 0 {
            bail!("ocr-first-page is 1-based and must be at least 1");
        }
        if ocr.first_page > ocr.last_page {
            bail!(
                "ocr-first-page ({}) must not exceed ocr-last-page ({})",
                ocr.first_page,
                ocr.last_page
            );
        }
        if ocr.lang.is_empty() {
            bail!("ocr-lang must not be empty");
        }

        let sentences = SentenceFilter {
            min_chars: args.min_sentence_chars,
            max_chars: args.max_sentence_chars,
        };
        if sentences.min_chars > sentences.max_chars {
            bail!(
                "min-sentence-chars ({}) must not exceed max-sentence-chars ({})",
                sentences.min_chars,
                sentences.max_chars
            );
        }

        let cleanup_rules = CleanupRule::ALL
            .into_iter()
            .filter(|rule| !args.disabled_rules.contains(rule))
            .collect();

        Ok(Self {
            input_dir: args.input_dir.clone(),
            output_dir: args
                .output_dir
                .clone()
                .unwrap_or_else(|| args.input_dir.join("smart_extracted_sentences")),
            manifest_path: args.manifest_path.clone(),
            quality,
            ocr,
            sentences,
            cleanup_rules,
        })
    }

    pub fn settings(&self) -> ExtractSettings {
        ExtractSettings {
            min_text_chars: self.quality.min_text_chars,
            min_alpha_ratio: self.quality.min_alpha_ratio,
            max_char_share: self.quality.max_char_share,
            ocr_dpi: self.ocr.dpi,
            ocr_first_page: self.ocr.first_page,
            ocr_last_page: self.ocr.last_page,
            ocr_lang: self.ocr.lang.clone(),
            min_sentence_chars: self.sentences.min_chars,
            max_sentence_chars: self.sentences.max_chars,
            cleanup_rules: self
                .cleanup_rules
                .iter()
                .map(|rule| rule.as_str().to_string())
                .collect(),
        }
    }
}

/// Shared by `merge-entities` and `link-yearly`.
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
}

impl CorpusConfig {
    pub fn from_args(args: &CorpusArgs, default_file_name: &str) -> Result<Self> {
        require_directory(&args.input_dir)?;

        Ok(Self {
            input_dir: args.input_dir.clone(),
            output_path: args
                .output_path
                .clone()
                .unwrap_or_else(|| args.input_dir.join(default_file_name)),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input_dir: PathBuf,
    pub files: Vec<String>,
    pub output_dir: PathBuf,
}

impl ConvertConfig {
    pub fn from_args(args: &ConvertArgs) -> Result<Self> {
        require_directory(&args.input_dir)?;

        for file in &args.files {
            if file.trim().is_empty() {
                bail!("--file values must not be empty");
            }
        }

        Ok(Self {
            input_dir: args.input_dir.clone(),
            files: args.files.clone(),
            output_dir: args
                .output_dir
                .clone()
                .unwrap_or_else(|| args.input_dir.clone()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub folders: Vec<PathBuf>,
    pub output_path: PathBuf,
    pub strip_headers: bool,
}

impl MergeConfig {
    pub fn from_args(args: &MergeReportsArgs) -> Result<Self> {
        if args.folders.is_empty() {
            bail!("at least one --folder is required");
        }
        if args.output_path.as_os_str().is_empty() {
            bail!("--output-path must not be empty");
        }

        Ok(Self {
            folders: args.folders.clone(),
            output_path: args.output_path.clone(),
            strip_headers: !args.keep_headers,
        })
    }
}

fn require_directory(path: &Path) -> Result<()> {
    let metadata = path
        .metadata()
        .with_context(|| format!("input directory is not accessible: {}", path.display()))?;
    if !metadata.is_dir() {
        bail!("input path is not a directory: {}", path.display());
    }
    Ok(())
}

fn validate_ratio(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value <= 1.0) {
        bail!("{name} must be within (0, 1], got {value}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_args(input_dir: PathBuf) -> ExtractArgs {
        ExtractArgs {
            input_dir,
            output_dir: None,
            manifest_path: None,
            min_text_chars: 50,
            min_alpha_ratio: 0.5,
            max_char_share: 0.3,
            ocr_dpi: 300,
            ocr_first_page: 1,
            ocr_last_page: 3,
            ocr_lang: "eng".to_string(),
            ocr_whitelist: "abc".to_string(),
            min_sentence_chars: 10,
            max_sentence_chars: 1000,
            disabled_rules: Vec::new(),
        }
    }

    #[test]
    fn extract_config_defaults_output_dir_under_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ExtractConfig::from_args(&extract_args(dir.path().to_path_buf()))
            .expect("valid config");

        assert_eq!(
            config.output_dir,
            dir.path().join("smart_extracted_sentences")
        );
        assert_eq!(config.cleanup_rules, CleanupRule::ALL.to_vec());
        assert_eq!(config.quality, QualityGate::default());
        assert_eq!(config.sentences, SentenceFilter::default());
    }

    #[test]
    fn extract_config_drops_disabled_rules_and_keeps_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut args = extract_args(dir.path().to_path_buf());
        args.disabled_rules = vec![CleanupRule::JoinLowercaseHyphens];

        let config = ExtractConfig::from_args(&args).expect("valid config");
        assert_eq!(config.cleanup_rules.len(), 6);
        assert!(!config
            .cleanup_rules
            .contains(&CleanupRule::JoinLowercaseHyphens));
        assert_eq!(config.cleanup_rules[0], CleanupRule::RejoinWrappedHyphens);
        assert_eq!(config.cleanup_rules[5], CleanupRule::DropShortLines);
    }

    #[test]
    fn extract_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut args = extract_args(dir.path().to_path_buf());
        args.ocr_first_page = 4;
        assert!(ExtractConfig::from_args(&args).is_err());

        let mut args = extract_args(dir.path().to_path_buf());
        args.ocr_first_page = 0;
        assert!(ExtractConfig::from_args(&args).is_err());

        let mut args = extract_args(dir.path().to_path_buf());
        args.min_alpha_ratio = 1.5;
        assert!(ExtractConfig::from_args(&args).is_err());

        let mut args = extract_args(dir.path().to_path_buf());
        args.min_sentence_chars = 2000;
        assert!(ExtractConfig::from_args(&args).is_err());

        let mut args = extract_args(dir.path().to_path_buf());
        args.ocr_lang = "  ".to_string();
        assert!(ExtractConfig::from_args(&args).is_err());

        let mut args = extract_args(dir.path().to_path_buf());
        args.min_text_chars = 0;
        assert!(ExtractConfig::from_args(&args).is_err());
    }

    #[test]
    fn missing_input_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = extract_args(dir.path().join("missing"));
        assert!(ExtractConfig::from_args(&args).is_err());

        let corpus = CorpusArgs {
            input_dir: dir.path().join("missing"),
            output_path: None,
        };
        assert!(CorpusConfig::from_args(&corpus, "report.txt").is_err());
    }

    #[test]
    fn corpus_config_defaults_output_file_in_input_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let corpus = CorpusArgs {
            input_dir: dir.path().to_path_buf(),
            output_path: None,
        };
        let config = CorpusConfig::from_args(&corpus, "prodigy_annotated.txt").expect("config");
        assert_eq!(config.output_path, dir.path().join("prodigy_annotated.txt"));
    }

    #[test]
    fn merge_config_strips_headers_unless_kept() {
        let mut args = MergeReportsArgs {
            folders: vec![PathBuf::from("reports")],
            output_path: PathBuf::from("merged.txt"),
            mode: None,
            keep_headers: false,
        };
        assert!(MergeConfig::from_args(&args).expect("config").strip_headers);

        args.keep_headers = true;
        assert!(!MergeConfig::from_args(&args).expect("config").strip_headers);

        args.folders.clear();
        assert!(MergeConfig::from_args(&args).is_err());
    }

    #[test]
    fn convert_config_defaults_output_to_input_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = ConvertArgs {
            input_dir: dir.path().to_path_buf(),
            files: Vec::new(),
            output_dir: None,
        };
        let config = ConvertConfig::from_args(&args).expect("config");
        assert_eq!(config.output_dir, dir.path().to_path_buf());
    }
}
