//! Reconciliation properties of the batch orchestrator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use studio_core::{reconcile, reconcile_with_report, BatchPhase, StudioError};
use uuid::Uuid;

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Succeeds with an uppercased prompt unless it contains "fail".
async fn shout(prompt: String) -> Result<String, StudioError> {
    if prompt.contains("fail") {
        Err(StudioError::Collaborator(format!("refused: {}", prompt)))
    } else {
        Ok(prompt.to_uppercase())
    }
}

#[tokio::test]
async fn test_output_length_matches_input() {
    init_logging();
    let cases: Vec<Vec<&str>> = vec![
        vec!["a"],
        vec!["a", "", "b"],
        vec!["", "x", "fail", "", "y"],
        vec!["a"; 10],
    ];
    for slots in cases {
        let out = reconcile(&slots, shout).await.unwrap();
        assert_eq!(out.len(), slots.len(), "slots: {:?}", slots);
    }
}

#[tokio::test]
async fn test_no_requests_for_blank_slots() {
    let calls = AtomicUsize::new(0);
    let slots = ["a", "", "   ", "b", "\n\t", "c"];
    let out = reconcile(&slots, |p| {
        calls.fetch_add(1, Ordering::SeqCst);
        shout(p)
    })
    .await
    .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(out[1], None);
    assert_eq!(out[2], None);
    assert_eq!(out[4], None);
}

#[tokio::test]
async fn test_order_preserved_under_partial_failure() {
    let slots = ["", "one", "fail-two", "", "three", "fail-four", "five"];
    let out = reconcile(&slots, shout).await.unwrap();
    assert_eq!(
        out,
        vec![
            None,
            Some("ONE".to_string()),
            None,
            None,
            Some("THREE".to_string()),
            None,
            Some("FIVE".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_out_of_order_completion_stays_aligned() {
    // Earlier slots finish last.
    let slots = ["slow", "medium", "", "fast"];
    let out = reconcile(&slots, |p| async move {
        let delay = match p.as_str() {
            "slow" => 30,
            "medium" => 15,
            _ => 0,
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok::<_, StudioError>(p)
    })
    .await
    .unwrap();

    assert_eq!(
        out,
        vec![
            Some("slow".to_string()),
            Some("medium".to_string()),
            None,
            Some("fast".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_single_failure_does_not_affect_siblings() {
    let healthy = reconcile(&["a", "b", "c"], shout).await.unwrap();
    let with_fault = reconcile(&["a", "fail", "c"], shout).await.unwrap();

    assert_eq!(with_fault[0], healthy[0]);
    assert_eq!(with_fault[1], None);
    assert_eq!(with_fault[2], healthy[2]);
}

#[tokio::test]
async fn test_all_failures_is_batch_failure() {
    let err = reconcile(&["fail-a", "", "fail-b"], shout).await.unwrap_err();
    assert!(matches!(err, StudioError::BatchFailed { attempted: 2 }));
}

#[tokio::test]
async fn test_all_blank_is_not_a_failure() {
    let calls = AtomicUsize::new(0);
    let out = reconcile(&["", "  ", ""], |p| {
        calls.fetch_add(1, Ordering::SeqCst);
        shout(p)
    })
    .await
    .unwrap();

    assert_eq!(out, vec![None, None, None]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_scenario_blank_then_failure() {
    // "a" succeeds with X, "" is skipped, "b" fails.
    let out = reconcile(&["a", "", "b"], |p| async move {
        match p.as_str() {
            "a" => Ok("X"),
            _ => Err(StudioError::NoArtifact),
        }
    })
    .await
    .unwrap();
    assert_eq!(out, vec![Some("X"), None, None]);
}

#[tokio::test]
async fn test_scenario_two_blanks() {
    let out = reconcile(&["", ""], shout).await.unwrap();
    assert_eq!(out, vec![None, None]);
}

#[tokio::test]
async fn test_report_carries_batch_id_and_failures() {
    let id = Uuid::new_v4();
    let report = reconcile_with_report(id, &["ok", "fail", ""], shout)
        .await
        .unwrap();

    assert_eq!(report.batch_id, id);
    assert_eq!(report.phase, BatchPhase::Settled);
    assert_eq!(report.produced(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert!(report.failures[0].message.contains("refused"));
}
