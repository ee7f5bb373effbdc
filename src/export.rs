//! Export boundary: PDF export, print documents and preview object URLs
//!
//! Everything below the boundary is infallible or returns typed errors. Here they are
//! turned into short user-facing messages, and a zero-record export is refused outright
//! instead of producing an empty document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use chrono::{Local, NaiveDate};
use log::{info, warn};
use thiserror::Error;

use crate::customization::LabelSnapshot;
use crate::records::MailingLabelRecord;
use crate::renderer::{
    page_count, render_pdf, render_print_html, PdfError, PreviewConfig, OVERFLOW_WARNING,
};

/// Errors surfaced to the user by export actions
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("no labels to export")]
    NoLabels,
    #[error("PDF Generation Failed: {0}")]
    PdfGenerationFailed(String),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Short message suitable for a dialog or toast
    pub fn user_message(&self) -> String {
        match self {
            ExportError::NoLabels => {
                "There are no labels to export. Add at least one address first.".to_string()
            }
            ExportError::PdfGenerationFailed(_) => {
                "PDF Generation Failed. Please try again.".to_string()
            }
            ExportError::Write { path, .. } => {
                format!("Could not save the PDF to {}.", path.display())
            }
        }
    }

    /// Whether repeating the same action can succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ExportError::NoLabels)
    }
}

impl From<PdfError> for ExportError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::Empty => ExportError::NoLabels,
            other => ExportError::PdfGenerationFailed(other.to_string()),
        }
    }
}

/// Produces PDF bytes for a snapshot and its records
pub type PdfGenerator =
    fn(&LabelSnapshot, &[MailingLabelRecord]) -> Result<Vec<u8>, PdfError>;

/// `mailing-labels-<template>-<YYYY-MM-DD>.pdf`
pub fn export_file_name(template_key: &str, date: NaiveDate) -> String {
    let key: String = template_key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("mailing-labels-{}-{}.pdf", key, date.format("%Y-%m-%d"))
}

/// Export actions for one applied snapshot and its records
#[derive(Clone)]
pub struct ExportController {
    snapshot: Arc<LabelSnapshot>,
    records: Arc<Vec<MailingLabelRecord>>,
    generator: PdfGenerator,
}

impl ExportController {
    pub fn new(snapshot: Arc<LabelSnapshot>, records: Vec<MailingLabelRecord>) -> Self {
        Self {
            snapshot,
            records: Arc::new(records),
            generator: render_pdf,
        }
    }

    /// Replace the PDF generator
    pub fn with_generator(mut self, generator: PdfGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn snapshot(&self) -> &LabelSnapshot {
        &self.snapshot
    }

    pub fn records(&self) -> &[MailingLabelRecord] {
        &self.records
    }

    /// PDF and print actions are enabled only with at least one record
    pub fn can_export(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn page_count(&self) -> usize {
        page_count(self.records.len(), self.snapshot.template.labels_per_page())
    }

    /// Advisory to show before exporting; never blocks the export
    pub fn overflow_warning(&self) -> Option<&'static str> {
        self.snapshot.has_overflow().then_some(OVERFLOW_WARNING)
    }

    /// File name for an export made on `date`
    pub fn file_name(&self, date: NaiveDate) -> String {
        export_file_name(&self.snapshot.template.key, date)
    }

    /// File name for an export made today
    pub fn default_file_name(&self) -> String {
        self.file_name(Local::now().date_naive())
    }

    fn ensure_records(&self) -> Result<(), ExportError> {
        if self.can_export() {
            Ok(())
        } else {
            Err(ExportError::NoLabels)
        }
    }

    /// Generate the PDF on the calling thread
    pub fn export_pdf(&self) -> Result<Vec<u8>, ExportError> {
        self.ensure_records()?;
        if let Some(warning) = self.overflow_warning() {
            warn!("{}", warning);
        }
        generate(self.generator, &self.snapshot, &self.records)
    }

    /// Generate the PDF and write it to `path`; returns the number of bytes written
    pub fn export_pdf_to(&self, path: &Path) -> Result<usize, ExportError> {
        let bytes = self.export_pdf()?;
        std::fs::write(path, &bytes).map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("saved {} ({} bytes)", path.display(), bytes.len());
        Ok(bytes.len())
    }

    /// Print document for the browser print path
    pub fn print_html(&self, config: &PreviewConfig) -> Result<String, ExportError> {
        self.ensure_records()?;
        Ok(render_print_html(&self.snapshot, &self.records, config))
    }

    /// Generate the PDF on a worker thread
    ///
    /// Dropping the returned job abandons the result; the worker finishes and discards it.
    pub fn spawn_pdf_export(&self) -> Result<PdfJob, ExportError> {
        self.ensure_records()?;
        let (sender, receiver) = mpsc::channel();
        let snapshot = Arc::clone(&self.snapshot);
        let records = Arc::clone(&self.records);
        let generator = self.generator;

        thread::Builder::new()
            .name("pdf-export".to_string())
            .spawn(move || {
                let result = generate(generator, &snapshot, &records);
                // The receiver is gone when the job was abandoned
                let _ = sender.send(result);
            })
            .map_err(|e| ExportError::PdfGenerationFailed(e.to_string()))?;

        Ok(PdfJob { receiver })
    }
}

fn generate(
    generator: PdfGenerator,
    snapshot: &LabelSnapshot,
    records: &[MailingLabelRecord],
) -> Result<Vec<u8>, ExportError> {
    generator(snapshot, records).map_err(|e| {
        warn!("PDF generation failed: {}", e);
        ExportError::from(e)
    })
}

/// A PDF export running in the background
#[derive(Debug)]
pub struct PdfJob {
    receiver: Receiver<Result<Vec<u8>, ExportError>>,
}

impl PdfJob {
    /// Block until the worker finishes
    pub fn wait(self) -> Result<Vec<u8>, ExportError> {
        self.receiver
            .recv()
            .unwrap_or_else(|_| Err(worker_lost()))
    }

    /// The result if the worker is done, without blocking
    pub fn try_result(&self) -> Option<Result<Vec<u8>, ExportError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_lost())),
        }
    }
}

fn worker_lost() -> ExportError {
    ExportError::PdfGenerationFailed("export worker stopped unexpectedly".to_string())
}

#[derive(Debug, Default)]
struct UrlTable {
    next_id: u64,
    blobs: HashMap<String, Arc<Vec<u8>>>,
}

/// In-memory stand-in for the platform's object URL store
#[derive(Debug, Clone, Default)]
pub struct ObjectUrlRegistry {
    table: Arc<Mutex<UrlTable>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, UrlTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a blob and return its URL
    pub fn create(&self, bytes: Vec<u8>) -> String {
        let mut table = self.table();
        table.next_id += 1;
        let url = format!("blob:mailing-labels/{}", table.next_id);
        table.blobs.insert(url.clone(), Arc::new(bytes));
        url
    }

    /// Release a URL; returns false if it was not live
    pub fn revoke(&self, url: &str) -> bool {
        self.table().blobs.remove(url).is_some()
    }

    pub fn resolve(&self, url: &str) -> Option<Arc<Vec<u8>>> {
        self.table().blobs.get(url).cloned()
    }

    /// Number of URLs not yet revoked
    pub fn live_count(&self) -> usize {
        self.table().blobs.len()
    }
}

/// A PDF preview dialog holding at most one live object URL
#[derive(Debug)]
pub struct PdfPreviewSession {
    registry: ObjectUrlRegistry,
    current: Option<String>,
}

impl PdfPreviewSession {
    pub fn new(registry: ObjectUrlRegistry) -> Self {
        Self {
            registry,
            current: None,
        }
    }

    /// Show a freshly generated PDF, releasing the previous one first
    pub fn show(&mut self, pdf: Vec<u8>) -> &str {
        self.release();
        self.current.insert(self.registry.create(pdf))
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Close the dialog and release its URL
    pub fn close(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(url) = self.current.take() {
            self.registry.revoke(&url);
        }
    }
}

impl Drop for PdfPreviewSession {
    fn drop(&mut self) {
        self.release();
    }
}
