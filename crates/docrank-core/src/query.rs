//! The query file: who is reading, what they need, and which documents.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("failed to read query file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed query file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("query file has an empty {0}")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobToBeDone {
    pub task: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A parsed query file (`query.json`).
///
/// Unknown top-level keys such as `challenge_info` are accepted and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub persona: Persona,
    pub job_to_be_done: JobToBeDone,
    pub documents: Vec<DocumentRef>,
}

impl Query {
    pub fn new(persona: &str, task: &str, documents: &[&str]) -> Self {
        Self {
            persona: Persona {
                role: persona.to_string(),
            },
            job_to_be_done: JobToBeDone {
                task: task.to_string(),
            },
            documents: documents
                .iter()
                .map(|f| DocumentRef {
                    filename: f.to_string(),
                    title: None,
                })
                .collect(),
        }
    }

    /// Parse and validate a query from JSON text.
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        let query: Query = serde_json::from_str(json)?;
        query.validate()?;
        Ok(query)
    }

    /// Read, parse and validate a query file.
    pub fn from_path(path: &Path) -> Result<Self, QueryError> {
        let content = std::fs::read_to_string(path).map_err(|source| QueryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    fn validate(&self) -> Result<(), QueryError> {
        if self.persona.role.trim().is_empty() {
            return Err(QueryError::Empty("persona.role"));
        }
        if self.job_to_be_done.task.trim().is_empty() {
            return Err(QueryError::Empty("job_to_be_done.task"));
        }
        if self.documents.iter().any(|d| d.filename.trim().is_empty()) {
            return Err(QueryError::Empty("documents[].filename"));
        }
        Ok(())
    }

    pub fn persona(&self) -> &str {
        &self.persona.role
    }

    pub fn task(&self) -> &str {
        &self.job_to_be_done.task
    }

    /// Document file names, in listed order.
    pub fn document_names(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.filename.clone()).collect()
    }

    /// The single free-text prompt embedded for ranking: `"<persona> — <task>"`.
    pub fn prompt(&self) -> String {
        format!("{} — {}", self.persona.role.trim(), self.job_to_be_done.task.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "challenge_info": {"challenge_id": "round_1b_002", "test_case_name": "travel_planner"},
        "documents": [
            {"filename": "South of France - Cities.pdf", "title": "South of France - Cities"},
            {"filename": "South of France - Cuisine.pdf", "title": "South of France - Cuisine"}
        ],
        "persona": {"role": "Travel Planner"},
        "job_to_be_done": {"task": "Plan a trip of 4 days for a group of 10 college friends."}
    }"#;

    #[test]
    fn parses_full_query_file() {
        let query = Query::from_json(SAMPLE).unwrap();
        assert_eq!(query.persona(), "Travel Planner");
        assert_eq!(query.documents.len(), 2);
        assert_eq!(
            query.document_names(),
            vec![
                "South of France - Cities.pdf".to_string(),
                "South of France - Cuisine.pdf".to_string()
            ]
        );
    }

    #[test]
    fn prompt_joins_persona_and_task() {
        let query = Query::new("  Travel Planner ", " plan a trip ", &[]);
        assert_eq!(query.prompt(), "Travel Planner — plan a trip");
    }

    #[test]
    fn missing_persona_is_malformed() {
        let err = Query::from_json(r#"{"job_to_be_done": {"task": "x"}, "documents": []}"#)
            .unwrap_err();
        assert!(matches!(err, QueryError::Malformed(_)));
    }

    #[test]
    fn missing_documents_is_malformed() {
        let err = Query::from_json(
            r#"{"persona": {"role": "HR"}, "job_to_be_done": {"task": "onboarding forms"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::Malformed(_)));
    }

    #[test]
    fn blank_task_is_rejected() {
        let err = Query::from_json(
            r#"{"persona": {"role": "HR"}, "job_to_be_done": {"task": "  "}, "documents": []}"#,
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::Empty("job_to_be_done.task")));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Query::from_path(Path::new("/nonexistent/query.json")).unwrap_err();
        assert!(matches!(err, QueryError::Read { .. }));
    }
}
