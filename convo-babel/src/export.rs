//! One download attempt, end to end
//!
//! [`Exporter::export`] runs the fixed sequence:
//!
//! 1. take the [`ExportGuard`] (a second concurrent attempt gets
//!    [`ExportError::Busy`])
//! 2. extract the transcript
//! 3. stop with [`ExportError::ExtractionEmpty`] when there are no turns
//! 4. resolve the target format (missing formats are
//!    [`ExportError::DependencyUnavailable`])
//! 5. serialize and name the artifact `{title}_{millis}.{ext}`
//!
//! Nothing is written until [`Artifact::write_to`], which goes through a
//! temporary file in the target directory so a failed write never leaves a
//! partial artifact behind.

use crate::error::ExportError;
use crate::extract::TranscriptExtractor;
use crate::format::{ExportContext, ParseOptions};
use crate::normalize::{HtmlToMarkdown, RichTextNormalizer};
use crate::registry::FormatRegistry;
use crate::render::{PageGeometry, RenderStyle};
use crate::sanitize::{artifact_filename, sanitize_title, TitleRules};
use crate::transcript::Transcript;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Try-lock admitting one export at a time.
#[derive(Debug, Clone, Default)]
pub struct ExportGuard {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of one export; releases the guard on drop.
#[derive(Debug)]
pub struct ExportPermit {
    busy: Arc<AtomicBool>,
}

impl ExportGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Result<ExportPermit, ExportError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok(ExportPermit {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for ExportPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// A finished export, not yet delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Write into `dir` under [`Artifact::filename`] and return the final path.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let dir = dir.as_ref();
        let target = dir.join(&self.filename);
        let finalize = |e: std::io::Error| ExportError::StreamFinalize {
            reason: format!("{}: {e}", target.display()),
        };

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(finalize)?;
        temp.write_all(&self.bytes).map_err(finalize)?;
        temp.as_file().sync_all().map_err(finalize)?;
        temp.persist(&target).map_err(|e| finalize(e.error))?;

        info!("Wrote {} ({} bytes)", target.display(), self.bytes.len());
        Ok(target)
    }
}

/// Extracts by parsing a source document through the registry.
struct RegistrySource<'r> {
    registry: &'r FormatRegistry,
    source: &'r str,
    format: &'r str,
    options: &'r ParseOptions,
}

impl TranscriptExtractor for RegistrySource<'_> {
    fn extract(&self) -> Result<Transcript, ExportError> {
        self.registry.parse(self.source, self.format, self.options)
    }
}

pub struct Exporter {
    registry: FormatRegistry,
    normalizer: Box<dyn RichTextNormalizer>,
    style: RenderStyle,
    page: PageGeometry,
    title_rules: TitleRules,
    guard: ExportGuard,
}

impl Exporter {
    pub fn new() -> Self {
        Self {
            registry: FormatRegistry::with_defaults(),
            normalizer: Box::new(HtmlToMarkdown::new()),
            style: RenderStyle::default(),
            page: PageGeometry::default(),
            title_rules: TitleRules::default(),
            guard: ExportGuard::new(),
        }
    }

    pub fn with_registry(mut self, registry: FormatRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_normalizer(mut self, normalizer: impl RichTextNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_page(mut self, page: PageGeometry) -> Self {
        self.page = page;
        self
    }

    pub fn with_title_rules(mut self, rules: TitleRules) -> Self {
        self.title_rules = rules;
        self
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn guard(&self) -> &ExportGuard {
        &self.guard
    }

    /// Extract with `extractor` and serialize into `target`.
    pub fn export(
        &self,
        extractor: &dyn TranscriptExtractor,
        target: &str,
        options: &HashMap<String, String>,
    ) -> Result<Artifact, ExportError> {
        let _permit = self.guard.try_acquire()?;

        let transcript = extractor.extract()?;
        if transcript.is_empty() {
            warn!("Export to '{}' aborted: no conversation data", target);
            return Err(ExportError::ExtractionEmpty);
        }
        debug!("Extracted {} turns", transcript.turns.len());

        let format = self.registry.get(target)?;
        let title = sanitize_title(&transcript.title, &self.title_rules);
        let context = ExportContext::new(title.clone(), &self.style, self.normalizer.as_ref())
            .with_page(self.page)
            .with_options(options.clone());

        let document = self.registry.serialize(&transcript, target, &context)?;

        let extension = format.file_extensions().first().copied().unwrap_or(target);
        let millis = chrono::Local::now().timestamp_millis();
        let artifact = Artifact {
            filename: artifact_filename(&title, millis, extension),
            mime: format.mime_type().to_string(),
            bytes: document.into_bytes(),
        };
        info!(
            "Exported {} messages as {}",
            transcript.turns.len(),
            artifact.filename
        );
        Ok(artifact)
    }

    /// Parse `source` as `from` and serialize into `target`.
    pub fn convert(
        &self,
        source: &str,
        from: &str,
        parse_options: &ParseOptions,
        target: &str,
        options: &HashMap<String, String>,
    ) -> Result<Artifact, ExportError> {
        let extractor = RegistrySource {
            registry: &self.registry,
            source,
            format: from,
            options: parse_options,
        };
        self.export(&extractor, target, options)
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Turn;
    use std::cell::RefCell;

    fn transcript() -> Transcript {
        Transcript {
            title: "My chat: part 1".to_string(),
            url: "https://g.co/share/1".to_string(),
            turns: vec![Turn::user("Hello"), Turn::assistant("Hi there", None)],
        }
    }

    #[test]
    fn guard_rejects_overlap_and_releases_on_drop() {
        let guard = ExportGuard::new();
        let permit = guard.try_acquire().unwrap();
        assert!(guard.is_busy());
        assert!(matches!(guard.try_acquire(), Err(ExportError::Busy)));
        drop(permit);
        assert!(!guard.is_busy());
        assert!(guard.try_acquire().is_ok());
    }

    /// Starts a second export on the same exporter while the first one runs.
    struct ReentrantExtractor<'e> {
        exporter: &'e Exporter,
        inner: RefCell<Option<Result<Artifact, ExportError>>>,
    }

    impl TranscriptExtractor for ReentrantExtractor<'_> {
        fn extract(&self) -> Result<Transcript, ExportError> {
            let nested = self
                .exporter
                .export(&transcript(), "json", &HashMap::new());
            *self.inner.borrow_mut() = Some(nested);
            Ok(transcript())
        }
    }

    #[test]
    fn concurrent_export_is_busy() {
        let exporter = Exporter::new();
        let extractor = ReentrantExtractor {
            exporter: &exporter,
            inner: RefCell::new(None),
        };
        exporter
            .export(&extractor, "json", &HashMap::new())
            .unwrap();
        let nested = extractor.inner.borrow_mut().take().unwrap();
        assert!(matches!(nested, Err(ExportError::Busy)));
        assert!(!exporter.guard().is_busy());
    }

    #[test]
    fn empty_transcript_is_extraction_empty() {
        let exporter = Exporter::new();
        let err = exporter
            .export(&Transcript::default(), "json", &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, ExportError::ExtractionEmpty));
        assert!(!exporter.guard().is_busy());
    }

    #[test]
    fn unknown_target_is_dependency_unavailable() {
        let exporter = Exporter::new();
        let err = exporter
            .export(&transcript(), "docx", &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, ExportError::DependencyUnavailable(_)));
    }

    #[test]
    fn artifact_is_named_after_sanitized_title() {
        let exporter = Exporter::new();
        let artifact = exporter
            .export(&transcript(), "json", &HashMap::new())
            .unwrap();
        assert!(artifact.filename.starts_with("My_chat_part_1_"));
        assert!(artifact.filename.ends_with(".json"));
        let millis = artifact
            .filename
            .trim_start_matches("My_chat_part_1_")
            .trim_end_matches(".json");
        assert!(millis.parse::<i64>().is_ok(), "got {}", artifact.filename);
        assert_eq!(artifact.mime, "application/json");
    }

    #[test]
    fn convert_parses_through_registry() {
        let source = r#"{"title":"x","url":"","messages":[{"role":"user","content":"q"}]}"#;
        let exporter = Exporter::new();
        let artifact = exporter
            .convert(
                source,
                "json",
                &ParseOptions::default(),
                "json",
                &HashMap::new(),
            )
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(value["messages"][0]["content"], "q");
    }

    #[test]
    fn write_to_places_file_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = Artifact {
            filename: "chat_1.json".to_string(),
            mime: "application/json".to_string(),
            bytes: b"{}".to_vec(),
        };
        let path = artifact.write_to(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("chat_1.json"));
        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_to_missing_directory_is_stream_finalize() {
        let artifact = Artifact {
            filename: "a.json".to_string(),
            mime: String::new(),
            bytes: vec![],
        };
        let err = artifact
            .write_to("/definitely/not/a/dir")
            .unwrap_err();
        assert!(matches!(err, ExportError::StreamFinalize { .. }));
    }
}
