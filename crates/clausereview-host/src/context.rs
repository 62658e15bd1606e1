//! Process-wide review state, owned explicitly.
//!
//! Created once at start-up and passed by `&mut` to ingestion and query
//! operations. Dropped at exit.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clausereview_ai::{ExtractiveQaPipeline, Reader};
use clausereview_core::{Document, PipelineParams, ReviewConfig};
use clausereview_store::{
    ContractsDir, DocumentStore, StoreError, TfidfRetriever, convert_file, convert_source,
};
use tracing::{info, warn};

use crate::error::ReviewError;

const DEGRADED_MESSAGE: &str = "oops! looks like there is some issue while showing the contract!\n\
     Don't worry, the prediction will still work";

/// Contract text for display, or a warning when it cannot be shown.
///
/// Never an error: review runs are unaffected either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentView {
    Rendered(String),
    Degraded(String),
}

/// Outcome of ingesting one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub name: String,
    pub path: PathBuf,
    /// Passages indexed from this file.
    pub passages: usize,
    /// Passages indexed across the whole contracts directory.
    pub total_passages: usize,
    pub ingested_at: DateTime<Utc>,
}

/// Document store, retriever, and reader shared by every interaction.
pub struct AppContext<R: Reader> {
    config: ReviewConfig,
    contracts: ContractsDir,
    store: DocumentStore,
    retriever: TfidfRetriever,
    reader: R,
}

impl<R: Reader> AppContext<R> {
    /// Open the contracts directory (creating it if absent) with an empty index.
    pub fn open(config: ReviewConfig, reader: R) -> Result<Self, ReviewError> {
        let contracts = ContractsDir::open(&config.contracts_dir)
            .map_err(|source| ingest_error(&config.contracts_dir.display().to_string(), source))?;
        info!(contracts_dir = %config.contracts_dir.display(), "opened review context");
        Ok(Self {
            config,
            contracts,
            store: DocumentStore::new(),
            retriever: TfidfRetriever::new(),
            reader,
        })
    }

    /// Persist an upload and re-index the contracts directory.
    ///
    /// Re-uploading a file name replaces that file's passages in the index.
    /// Every file is converted before the index is touched. On error the
    /// upload is removed again and the index is left as it was. Other files
    /// in the directory that cannot be converted keep their previous
    /// passages and are skipped with a warning.
    pub fn ingest(&mut self, name: &str, bytes: &[u8]) -> Result<IngestReport, ReviewError> {
        let path = self
            .contracts
            .save(name, bytes)
            .map_err(|source| ingest_error(name, source))?;

        let converted = match self.convert_all(name, &path) {
            Ok(converted) => converted,
            Err(e) => {
                if let Err(io) = std::fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %io, "could not remove failed upload");
                }
                return Err(e);
            }
        };
        for (file_name, docs) in converted {
            self.store.replace_source(&file_name, docs);
        }

        let report = IngestReport {
            name: name.to_string(),
            path,
            passages: self.store.documents_for(name).len(),
            total_passages: self.store.len(),
            ingested_at: Utc::now(),
        };
        info!(
            name,
            passages = report.passages,
            total = report.total_passages,
            "ingested contract"
        );
        Ok(report)
    }

    /// Passages for the upload and every other convertible file, in name order.
    fn convert_all(
        &self,
        name: &str,
        path: &Path,
    ) -> Result<Vec<(String, Vec<Document>)>, ReviewError> {
        let mut uploaded = Some(convert_source(path).map_err(|source| ingest_error(name, source))?);
        let files = self
            .contracts
            .files()
            .map_err(|source| ingest_error(name, source))?;

        let mut converted = Vec::with_capacity(files.len());
        for file in files {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if file_name == name {
                converted.push((file_name, uploaded.take().unwrap_or_default()));
                continue;
            }
            match convert_source(&file) {
                Ok(docs) => converted.push((file_name, docs)),
                Err(e) => {
                    warn!(file = %file_name, error = %e, "skipping unconvertible contract");
                }
            }
        }
        Ok(converted)
    }

    /// Raw extracted text of an uploaded contract, or a degraded notice.
    ///
    /// Shows the file as extracted, before short lines are cleaned away.
    pub fn contract_view(&self, name: &str) -> DocumentView {
        let path = self.contracts.root().join(name);
        match convert_file(&path) {
            Ok(Some(text)) if !text.trim().is_empty() => DocumentView::Rendered(text),
            Ok(_) => DocumentView::Degraded(DEGRADED_MESSAGE.to_string()),
            Err(e) => {
                warn!(name, error = %e, "could not render contract");
                DocumentView::Degraded(DEGRADED_MESSAGE.to_string())
            }
        }
    }

    /// A pipeline borrowing this context's store, retriever, and reader.
    pub fn pipeline(&mut self) -> ExtractiveQaPipeline<'_> {
        ExtractiveQaPipeline::new(&self.store, &mut self.retriever, &mut self.reader)
    }

    pub fn params(&self) -> PipelineParams {
        self.config.pipeline_params()
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }
}

fn ingest_error(name: &str, source: StoreError) -> ReviewError {
    ReviewError::Ingest {
        name: name.to_string(),
        source,
    }
}
