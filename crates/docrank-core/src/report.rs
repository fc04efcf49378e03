//! The output artifact. Field names are a compatibility surface.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::Query;
use crate::{RankedSection, Section};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    pub processing_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: usize,
    pub page_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    pub page_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: Metadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

/// ISO-8601 UTC timestamp with microseconds and no offset suffix,
/// e.g. `2025-07-10T08:15:30.123456`.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

impl Report {
    /// Assemble a report from ranked sections and their summaries.
    ///
    /// `summaries[i]` belongs to `ranked[i]`; both arrays keep rank order.
    pub fn new(
        query: &Query,
        ranked: &[RankedSection],
        summaries: &[String],
        timestamp: DateTime<Utc>,
    ) -> Self {
        let extracted_sections = ranked
            .iter()
            .map(|r| ExtractedSection {
                document: r.section.document.clone(),
                section_title: r.section.heading.clone(),
                importance_rank: r.rank,
                page_number: r.section.page,
            })
            .collect();

        let subsection_analysis = ranked
            .iter()
            .zip(summaries)
            .map(|(r, summary)| {
                let Section { document, page, .. } = &r.section;
                SubsectionAnalysis {
                    document: document.clone(),
                    refined_text: summary.clone(),
                    page_number: *page,
                }
            })
            .collect();

        Self {
            metadata: Metadata {
                input_documents: query.document_names(),
                persona: query.persona().to_string(),
                job_to_be_done: query.task().to_string(),
                processing_timestamp: format_timestamp(timestamp),
            },
            extracted_sections,
            subsection_analysis,
        }
    }

    /// Pretty JSON with two-space indentation; non-ASCII is written as-is.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report to `path`, creating parent directories as needed.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json_pretty().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
