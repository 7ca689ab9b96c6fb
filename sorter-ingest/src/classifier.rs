//! One-file pipeline: text source → bank identifier → strategy → record.
//!
//! A `Classifier` holds only read-only state, so a single instance can be
//! shared across worker threads behind an `Arc`.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use sorter_core::{EngineConfig, SensitiveAccountRegistry, StatementInfo};

use crate::identify::{BankIdentifier, IdSource, Identification};
use crate::source::{PageText, TextSource};
use crate::strategies::{Dispatcher, Strategy};

/// Outcome for one file, with enough detail for the processing log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub info: StatementInfo,
    /// `"filename"`, `"content"` or `"none"`.
    pub identified_by: &'static str,
    /// Why text extraction failed, if it did.
    pub text_error: Option<String>,
}

impl Classification {
    pub fn text_extracted(&self) -> bool {
        self.text_error.is_none()
    }
}

pub struct Classifier {
    config: EngineConfig,
    registry: SensitiveAccountRegistry,
    identifier: BankIdentifier,
    source: Box<dyn TextSource>,
}

impl Classifier {
    pub fn new(
        config: EngineConfig,
        registry: SensitiveAccountRegistry,
        source: Box<dyn TextSource>,
    ) -> Result<Self> {
        let identifier = BankIdentifier::new(&config)?;
        Ok(Self {
            config,
            registry,
            identifier,
            source,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &SensitiveAccountRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.config)
    }

    /// Strategy that produced (and will name) a record.
    pub fn strategy_for(&self, info: &StatementInfo) -> Strategy<'_> {
        self.dispatcher().dispatch(info.bank())
    }

    /// Extract text from `path` and classify it. Never fails: a file whose
    /// text cannot be read is classified from its name alone.
    pub fn classify_path(&self, path: &Path) -> Classification {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let (text, text_error) = match self.source.extract(path) {
            Ok(text) => (text, None),
            Err(e) => {
                tracing::warn!("{}; falling back to filename heuristics", e);
                (PageText::empty(), Some(e.to_string()))
            }
        };

        let mut out = self.classify_text(&filename, &text);
        out.text_error = text_error;
        out
    }

    /// Classify already-extracted text.
    pub fn classify_text(&self, filename: &str, text: &PageText) -> Classification {
        let id: Identification = self.identifier.identify(filename, text);
        let strategy = self.dispatcher().dispatch(id.bank);
        let info = strategy.extract_info(filename, text, &self.registry);

        Classification {
            info,
            identified_by: match id.source {
                IdSource::Filename { .. } => "filename",
                IdSource::Content { .. } => "content",
                IdSource::Unidentified => "none",
            },
            text_error: None,
        }
    }
}
