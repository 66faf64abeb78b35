//! Export of the displayed round through the aggregation service.

use super::Orchestrator;
use crate::error::{Error, Result};
use crate::types::{ExportFormat, ExportRequest, STATUS_SUCCESS};
use chrono::{Local, NaiveDate};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A generated export, ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    /// `spectrum-export-YYYY-MM-DD.<ext>`
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

impl ExportArtifact {
    /// Build an artifact from the `data` field of an export reply.
    ///
    /// String data is used verbatim; structured data is pretty-printed JSON.
    pub fn from_reply(format: ExportFormat, data: &Value, date: NaiveDate) -> Result<Self> {
        let body = match data {
            Value::Null => return Err(Error::ExportFailed("export reply carried no data".into())),
            Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other)?,
        };
        Ok(Self {
            format,
            file_name: format!(
                "spectrum-export-{}.{}",
                date.format("%Y-%m-%d"),
                format.extension()
            ),
            content_type: format.content_type(),
            body,
        })
    }

    /// Write the artifact into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.body)?;
        debug!("Wrote export to {}", path.display());
        Ok(path)
    }
}

impl Orchestrator {
    /// Export the displayed responses and synthesis. Read-only with respect
    /// to orchestrator state.
    pub async fn request_export(&self, format: ExportFormat) -> Result<ExportArtifact> {
        let request = {
            let state = self.lock()?;
            let aggregate = &state.aggregate;
            if !aggregate.has_exportable() {
                return Err(Error::NothingToExport);
            }
            let query = aggregate
                .context()
                .map(|c| c.query.clone())
                .ok_or(Error::NothingToExport)?;
            let summary = aggregate.synthesis_entry();
            ExportRequest {
                query,
                responses: aggregate.success_entries(),
                include_summary: summary.is_some(),
                summary,
                format,
            }
        };

        let reply = self.service.export(&request).await?;
        if reply.status != STATUS_SUCCESS {
            let message = reply
                .message
                .or_else(|| reply.data.as_str().map(str::to_string))
                .unwrap_or_else(|| format!("status {}", reply.status));
            return Err(Error::ExportFailed(message));
        }

        let artifact = ExportArtifact::from_reply(format, &reply.data, Local::now().date_naive())?;
        info!("Export generated: {}", artifact.file_name);
        Ok(artifact)
    }
}
