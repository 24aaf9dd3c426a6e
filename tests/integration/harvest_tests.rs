//! End-to-end harvest behavior: pagination, aggregation, isolation

use crate::common::*;
use monty_harvest::aggregate::AggregateOutput;
use monty_harvest::config::HarvestMode;
use monty_harvest::harvester::{run_harvest, HarvestStatus};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_counts_accumulate_across_all_pages() {
    let server = MockServer::start().await;
    let page2_url = format!("{}/collections/alpha-events/page2", server.uri());

    Mock::given(method("GET"))
        .and(path(items_path("alpha-events")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![
                count_item("a1", &["USA", "MEX"]),
                count_item("a2", &["USA"]),
            ],
            Some(page2_url),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/collections/alpha-events/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![count_item("a3", &["CAN"]), count_item("a4", &["USA"])],
            None,
        )))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = test_config(
        &server.uri(),
        dir.path(),
        HarvestMode::CountryCounts,
        &["alpha-events"],
    );

    let reports = run_harvest(&config, Arc::new(AtomicBool::new(false)))
        .await
        .unwrap();

    let report = &reports["alpha-events"];
    assert_eq!(report.status, HarvestStatus::Completed);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.items_seen, 4);

    let AggregateOutput::Counts(counts) = &report.output else {
        panic!("expected counts output");
    };
    assert_eq!(counts.get("USA"), Some(&3));
    assert_eq!(counts.get("MEX"), Some(&1));
    assert_eq!(counts.get("CAN"), Some(&1));

    assert!(error_lines(&config).is_empty());
}

#[tokio::test]
async fn test_fatal_on_page_two_preserves_earlier_pages_and_isolates_collections() {
    // Three collections; beta-events is configured to break on its
    // second page. alpha and gamma must come through untouched, beta
    // must keep its page-1 data, and the error log must contain exactly
    // one record: beta, page 2.
    let server = MockServer::start().await;

    for collection in ["alpha-events", "gamma-events"] {
        Mock::given(method("GET"))
            .and(path(items_path(collection)))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
                vec![count_item("x1", &["FRA"]), count_item("x2", &["FRA"])],
                None,
            )))
            .mount(&server)
            .await;
    }

    let beta_page2_url = format!("{}/collections/beta-events/page2", server.uri());
    Mock::given(method("GET"))
        .and(path(items_path("beta-events")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![count_item("b1", &["ESP"])],
            Some(beta_page2_url.clone()),
        )))
        .mount(&server)
        .await;

    // Fatal server error: must be hit exactly once, never retried
    Mock::given(method("GET"))
        .and(path("/collections/beta-events/page2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = test_config(
        &server.uri(),
        dir.path(),
        HarvestMode::CountryCounts,
        &["alpha-events", "beta-events", "gamma-events"],
    );

    let reports = run_harvest(&config, Arc::new(AtomicBool::new(false)))
        .await
        .unwrap();

    assert_eq!(reports.len(), 3);

    for collection in ["alpha-events", "gamma-events"] {
        let report = &reports[collection];
        assert_eq!(report.status, HarvestStatus::Completed);
        let AggregateOutput::Counts(counts) = &report.output else {
            panic!("expected counts output");
        };
        assert_eq!(counts.get("FRA"), Some(&2));
    }

    let beta = &reports["beta-events"];
    assert_eq!(beta.status, HarvestStatus::Partial);
    assert_eq!(beta.items_seen, 1);
    let AggregateOutput::Counts(counts) = &beta.output else {
        panic!("expected counts output");
    };
    assert_eq!(counts.get("ESP"), Some(&1));

    let errors = error_lines(&config);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["collection"], "beta-events");
    assert_eq!(errors[0]["page"], 2);
    assert_eq!(errors[0]["reason"], "HTTP 500");
    assert_eq!(errors[0]["reference"], beta_page2_url);
}

#[tokio::test]
async fn test_first_match_found_on_second_page_stops_pagination() {
    let server = MockServer::start().await;
    let page2_url = format!("{}/collections/old-events/page2", server.uri());
    let page3_url = format!("{}/collections/old-events/page3", server.uri());

    // Page 1: only implausible dates
    Mock::given(method("GET"))
        .and(path(items_path("old-events")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![
                dated_item("bogus1", "0001-01-01T00:00:00Z"),
                dated_item("bogus2", "not-a-date"),
            ],
            Some(page2_url),
        )))
        .mount(&server)
        .await;

    // Page 2: a valid item, with a further page advertised
    Mock::given(method("GET"))
        .and(path("/collections/old-events/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![
                dated_item("winner", "1923-09-01T11:58:00Z"),
                dated_item("later", "1950-01-01T00:00:00Z"),
            ],
            Some(page3_url),
        )))
        .mount(&server)
        .await;

    // Early termination: page 3 must never be requested
    Mock::given(method("GET"))
        .and(path("/collections/old-events/page3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], None)))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = test_config(
        &server.uri(),
        dir.path(),
        HarvestMode::OldestItem,
        &["old-events"],
    );

    let reports = run_harvest(&config, Arc::new(AtomicBool::new(false)))
        .await
        .unwrap();

    let report = &reports["old-events"];
    assert_eq!(report.status, HarvestStatus::Completed);
    assert_eq!(report.pages_fetched, 2);

    let AggregateOutput::Oldest(Some(record)) = &report.output else {
        panic!("expected a match");
    };
    assert_eq!(record.item_id, "winner");
    assert_eq!(record.datetime, "1923-09-01T11:58:00Z");

    assert!(error_lines(&config).is_empty());
}

#[tokio::test]
async fn test_first_records_sampling_respects_role_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(items_path("mixed-events")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![
                serde_json::json!({"id": "src", "properties": {"roles": ["source"]}}),
                serde_json::json!({"id": "ev", "properties": {"roles": ["event"]}}),
                serde_json::json!({"id": "ev2", "properties": {"roles": ["event"]}}),
            ],
            None,
        )))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let mut config = test_config(
        &server.uri(),
        dir.path(),
        HarvestMode::FirstRecords,
        &["mixed-events"],
    );
    config.harvest.sample_role = Some("event".to_string());

    let reports = run_harvest(&config, Arc::new(AtomicBool::new(false)))
        .await
        .unwrap();

    let AggregateOutput::Samples(records) = &reports["mixed-events"].output else {
        panic!("expected samples output");
    };
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "ev");
}

#[tokio::test]
async fn test_decode_failure_aborts_the_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(items_path("broken-events")))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html>definitely not json</html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = test_config(
        &server.uri(),
        dir.path(),
        HarvestMode::CountryCounts,
        &["broken-events"],
    );

    let reports = run_harvest(&config, Arc::new(AtomicBool::new(false)))
        .await
        .unwrap();

    let report = &reports["broken-events"];
    assert_eq!(report.status, HarvestStatus::Aborted);
    assert_eq!(report.items_seen, 0);

    let errors = error_lines(&config);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["collection"], "broken-events");
    assert_eq!(errors[0]["page"], 1);
    assert!(errors[0]["reason"]
        .as_str()
        .unwrap()
        .contains("Malformed page payload"));
}

#[tokio::test]
async fn test_repeat_runs_produce_identical_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(items_path("stable-events")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![
                count_item("s1", &["USA", "CAN"]),
                count_item("s2", &["USA"]),
            ],
            None,
        )))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = test_config(
        &server.uri(),
        dir.path(),
        HarvestMode::CountryCounts,
        &["stable-events"],
    );

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let reports = run_harvest(&config, Arc::new(AtomicBool::new(false)))
            .await
            .unwrap();
        monty_harvest::output::write_results(
            config.harvest.mode,
            std::path::Path::new(&config.output.results_path),
            &reports,
        )
        .unwrap();
        outputs.push(std::fs::read(&config.output.results_path).unwrap());

        // The sink is truncated at run start and stays empty
        assert!(error_lines(&config).is_empty());
    }

    assert_eq!(outputs[0], outputs[1]);
}
