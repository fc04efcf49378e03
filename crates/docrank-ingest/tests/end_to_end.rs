use std::collections::HashMap;
use std::path::Path;

use chrono::{TimeZone, Utc};
use docrank_core::{
    BackendError, Config, ConfigBuilder, DocumentBackend, HashingEmbedder, NO_CONTENT_PLACEHOLDER,
    Query, UNTITLED_SECTION, analyze,
};
use docrank_ingest::{IngestError, PageEntry, collect_sections_with_backend, process_query};

/// Serves canned (outline, layout) entries keyed by file name.
struct StubBackend {
    documents: HashMap<String, (Vec<PageEntry>, Vec<PageEntry>)>,
}

impl StubBackend {
    fn lookup(&self, path: &Path) -> Result<&(Vec<PageEntry>, Vec<PageEntry>), BackendError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.documents
            .get(name)
            .ok_or_else(|| BackendError::OpenError(format!("no such document: {name}")))
    }
}

impl DocumentBackend for StubBackend {
    fn extract_outline(&self, path: &Path) -> Result<Vec<PageEntry>, BackendError> {
        Ok(self.lookup(path)?.0.clone())
    }

    fn extract_layout(&self, path: &Path) -> Result<Vec<PageEntry>, BackendError> {
        Ok(self.lookup(path)?.1.clone())
    }
}

fn travel_backend() -> StubBackend {
    let cities = (
        vec![
            PageEntry::new(
                1,
                "Comprehensive Guide to Cities",
                "Marseille is the oldest city in France. Nice sits on the coast.",
            ),
            PageEntry::new(
                3,
                "Nightlife and Entertainment",
                "Bars in Nice stay open late. College groups love the old town clubs.",
            ),
        ],
        vec![
            PageEntry::new(
                1,
                "Cities",
                "Marseille is the oldest city in France. Nice sits on the coast.",
            ),
            PageEntry::new(
                2,
                "History of Avignon",
                "The popes lived in Avignon. The palace is huge.",
            ),
            PageEntry::new(
                3,
                "Nightlife",
                "Bars in Nice stay open late. College groups love the old town clubs.",
            ),
        ],
    );
    let tips = (
        vec![],
        vec![
            PageEntry::new(
                1,
                "Packing Essentials Guide",
                "Pack light for a 4-day trip. Friends can share toiletries. Bring a reusable bottle.",
            ),
            PageEntry::new(2, "Budget Planning Tips", ""),
        ],
    );
    StubBackend {
        documents: HashMap::from([
            ("Cities.pdf".to_string(), cities),
            ("Tips.pdf".to_string(), tips),
        ]),
    }
}

fn travel_query() -> Query {
    Query::new(
        "Travel Planner",
        "plan a 4-day trip for 10 college friends",
        &["Cities.pdf", "Tips.pdf"],
    )
}

fn config_k3() -> Config {
    ConfigBuilder::new().top_k(3).build().unwrap()
}

#[test]
fn test_travel_planner_end_to_end() {
    let backend = travel_backend();
    let query = travel_query();
    let config = config_k3();
    let collection = collect_sections_with_backend(
        Path::new("/input"),
        &query.document_names(),
        &backend,
        &config,
    )
    .unwrap();
    assert_eq!(collection.sections.len(), 5);
    assert!(collection.skipped.is_empty());

    let embedder = HashingEmbedder::default();
    let analysis = analyze(&collection.sections, &query, &embedder, &config, |_| {}).unwrap();
    let report = analysis.into_report(&query, Utc::now());

    assert_eq!(report.extracted_sections.len(), 3);
    assert_eq!(report.subsection_analysis.len(), 3);
    let ranks: Vec<usize> = report
        .extracted_sections
        .iter()
        .map(|s| s.importance_rank)
        .collect();
    assert_eq!(ranks, vec![1, 2, 3]);

    for (extracted, sub) in report
        .extracted_sections
        .iter()
        .zip(&report.subsection_analysis)
    {
        assert_eq!(extracted.document, sub.document);
        assert_eq!(extracted.page_number, sub.page_number);
        assert!(!extracted.section_title.is_empty());
        let body_empty = extracted.document == "Tips.pdf" && extracted.page_number == 2;
        if body_empty {
            assert_eq!(sub.refined_text, NO_CONTENT_PLACEHOLDER);
        } else {
            assert!(!sub.refined_text.is_empty());
        }
    }

    assert_eq!(report.metadata.persona, "Travel Planner");
    assert_eq!(
        report.metadata.input_documents,
        vec!["Cities.pdf".to_string(), "Tips.pdf".to_string()]
    );
}

#[test]
fn test_outline_titles_are_used() {
    let backend = travel_backend();
    let query = travel_query();
    let collection = collect_sections_with_backend(
        Path::new("/input"),
        &query.document_names(),
        &backend,
        &Config::default(),
    )
    .unwrap();
    let headings: Vec<(&str, u32, &str)> = collection
        .sections
        .iter()
        .map(|s| (s.document.as_str(), s.page, s.heading.as_str()))
        .collect();
    assert_eq!(
        headings,
        vec![
            ("Cities.pdf", 1, "Comprehensive Guide to Cities"),
            ("Cities.pdf", 3, "Nightlife and Entertainment"),
            ("Cities.pdf", 2, "History of Avignon"),
            ("Tips.pdf", 1, "Packing Essentials Guide"),
            ("Tips.pdf", 2, "Budget Planning Tips"),
        ]
    );
}

#[test]
fn test_headingless_document() {
    let layout: Vec<PageEntry> = (1..=4)
        .map(|p| PageEntry::new(p, "", format!("{p}\n\nplain lowercase paragraph number {p}.")))
        .collect();
    let backend = StubBackend {
        documents: HashMap::from([("scan.pdf".to_string(), (vec![], layout))]),
    };
    let collection = collect_sections_with_backend(
        Path::new("/input"),
        &["scan.pdf".to_string()],
        &backend,
        &Config::default(),
    )
    .unwrap();
    assert_eq!(collection.sections.len(), 4);
    for (i, section) in collection.sections.iter().enumerate() {
        assert_eq!(section.page, i as u32 + 1);
        assert!(!section.heading.is_empty());
        assert_ne!(section.heading, UNTITLED_SECTION);
        assert!(section.heading.chars().count() <= 120);
    }
}

#[test]
fn test_identical_runs_differ_only_in_timestamp() {
    let backend = travel_backend();
    let query = travel_query();
    let config = config_k3();
    let embedder = HashingEmbedder::default();

    let run = |ts| {
        let collection = collect_sections_with_backend(
            Path::new("/input"),
            &query.document_names(),
            &backend,
            &config,
        )
        .unwrap();
        analyze(&collection.sections, &query, &embedder, &config, |_| {})
            .unwrap()
            .into_report(&query, ts)
    };

    let first = run(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    let mut second = run(Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap());
    assert_ne!(
        first.metadata.processing_timestamp,
        second.metadata.processing_timestamp
    );
    second.metadata.processing_timestamp = first.metadata.processing_timestamp.clone();
    assert_eq!(
        first.to_json_pretty().unwrap(),
        second.to_json_pretty().unwrap()
    );
}

#[test]
fn test_unreadable_document_aborts_by_default() {
    let backend = travel_backend();
    let documents = vec!["Cities.pdf".to_string(), "Missing.pdf".to_string()];
    let err = collect_sections_with_backend(
        Path::new("/input"),
        &documents,
        &backend,
        &Config::default(),
    )
    .unwrap_err();
    match err {
        IngestError::Extraction { document, .. } => assert_eq!(document, "Missing.pdf"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unreadable_document_skipped_when_configured() {
    let backend = travel_backend();
    let documents = vec!["Missing.pdf".to_string(), "Tips.pdf".to_string()];
    let config = ConfigBuilder::new().skip_unreadable(true).build().unwrap();
    let collection =
        collect_sections_with_backend(Path::new("/input"), &documents, &backend, &config).unwrap();
    assert_eq!(collection.sections.len(), 2);
    assert_eq!(collection.skipped.len(), 1);
    assert_eq!(collection.skipped[0].document, "Missing.pdf");
}

#[test]
fn test_plain_text_directory_run() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("menu.md"),
        "# Vegetarian Mains\nRoast the cauliflower. Serve with tahini.\x0c\
         # Gluten Free Sides\nQuinoa salad is filling. Rice noodles work too.",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("notes.txt"),
        "Buffet Layout Notes\nPlace plates at the start. Label every dish.",
    )
    .unwrap();

    let query = Query::new(
        "Food Contractor",
        "prepare a vegetarian buffet-style dinner menu",
        &["menu.md", "notes.txt"],
    );
    let config = ConfigBuilder::new().top_k(2).num_sentences(1).build().unwrap();
    let embedder = HashingEmbedder::new(64);
    let ts = Utc.with_ymd_and_hms(2025, 7, 10, 8, 15, 30).unwrap();

    let (report, collection) =
        process_query(dir.path(), &query, &embedder, &config, ts, |_| {}).unwrap();
    assert_eq!(collection.sections.len(), 3);
    assert_eq!(report.extracted_sections.len(), 2);
    assert_eq!(
        report.metadata.processing_timestamp,
        "2025-07-10T08:15:30.000000"
    );
    for sub in &report.subsection_analysis {
        assert!(!sub.refined_text.is_empty());
        assert!(!sub.refined_text.contains(". "), "one sentence per summary");
    }

    let out = dir.path().join("out").join("results.json");
    report.write_to(&out).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["extracted_sections"][0]["importance_rank"], 1);
    assert_eq!(value["metadata"]["input_documents"][1], "notes.txt");
}
