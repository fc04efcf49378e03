use chrono::{TimeZone, Utc};
use docrank_core::{
    AnalysisError, ConfigBuilder, EmbedError, MockEmbedder, Query, Section, Stage, analyze,
};

fn section(document: &str, page: u32, heading: &str, body: &str) -> Section {
    Section {
        document: document.to_string(),
        page,
        heading: heading.to_string(),
        body: body.to_string(),
    }
}

fn query() -> Query {
    Query::new("Travel Planner", "beach trip", &["guide.pdf"])
}

/// Bodies and sentences are pinned to fixed vectors so the expected order is exact.
fn pinned_embedder() -> MockEmbedder {
    MockEmbedder::new(3)
        .with_vector("Travel Planner — beach trip", &[1.0, 0.0, 0.0])
        .with_vector("Sand and sun. Museums nearby.", &[0.9, 0.1, 0.0])
        .with_vector("Sand and sun.", &[1.0, 0.0, 0.0])
        .with_vector("Museums nearby.", &[0.0, 1.0, 0.0])
        .with_vector("Tax forms.", &[0.0, 0.0, 1.0])
        .with_vector("Harbor walks.", &[0.5, 0.5, 0.0])
}

#[test]
fn test_ranked_report_order_and_shape() {
    let sections = vec![
        section("guide.pdf", 1, "Paperwork Overview", "Tax forms."),
        section("guide.pdf", 2, "Beach Days", "Sand and sun. Museums nearby."),
        section("guide.pdf", 3, "Old Port", "Harbor walks."),
    ];
    let config = ConfigBuilder::new()
        .top_k(2)
        .num_sentences(1)
        .keyword_boost(0.0)
        .build()
        .unwrap();
    let embedder = pinned_embedder();

    let analysis = analyze(&sections, &query(), &embedder, &config, |_| {}).unwrap();
    let report =
        analysis.into_report(&query(), Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());

    let pages: Vec<u32> = report
        .extracted_sections
        .iter()
        .map(|s| s.page_number)
        .collect();
    assert_eq!(pages, vec![2, 3]);
    assert_eq!(report.extracted_sections[0].section_title, "Beach Days");
    assert_eq!(report.subsection_analysis[0].refined_text, "Sand and sun.");
    assert_eq!(report.subsection_analysis[1].refined_text, "Harbor walks.");

    // One batch for ranking, then one per summarized section.
    assert_eq!(embedder.batch_sizes(), vec![4, 2, 1]);
}

#[test]
fn test_summarization_failure_is_tagged() {
    struct FailOnSecondCall(std::sync::atomic::AtomicUsize);

    impl docrank_core::Embedder for FailOnSecondCall {
        fn name(&self) -> &str {
            "flaky"
        }

        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
            let call = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if call >= 1 {
                return Err(EmbedError::Request("server went away".into()));
            }
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    let sections = vec![section("guide.pdf", 1, "Beach Days", "Sand and sun.")];
    let embedder = FailOnSecondCall(std::sync::atomic::AtomicUsize::new(0));
    let err = analyze(
        &sections,
        &query(),
        &embedder,
        &ConfigBuilder::new().build().unwrap(),
        |_| {},
    )
    .unwrap_err();
    let AnalysisError::Embedding { stage, source } = err;
    assert_eq!(stage, Stage::Summarization);
    assert!(matches!(source, EmbedError::Request(_)));
}
