mod support;

use authenticator::diagnostics::{idp_reachability, smcb_readability, IDP_TEST_NAME};
use authenticator::{connect_with, run_all, TestStatus};
use authenticator_connector::soap::SoapAction;
use authenticator_connector::ProbeTimeouts;
use std::fs;
use support::*;

#[tokio::test]
async fn multiple_smcb_cards_count_as_readable() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let connector = MockConnector::new();
    connector.respond(
        SoapAction::GetCards,
        cards_response(&[("SMC-B", "S1"), ("SMC-B", "S2")]),
    );

    let mut session = connect_with(&test_config(dir.path()), connector.clone()).await?;
    let result = smcb_readability(&mut session).await;

    assert_eq!(result.status, TestStatus::Success);
    assert!(result.details.contains("Multiple SMC-B cards found"));
    Ok(())
}

#[tokio::test]
async fn single_smcb_card_is_reported_with_its_slot() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let connector = MockConnector::new();
    connector.respond(SoapAction::GetCards, cards_response(&[("SMC-B", "S1")]));

    let mut session = connect_with(&test_config(dir.path()), connector.clone()).await?;
    let result = smcb_readability(&mut session).await;

    assert!(result.is_success());
    assert!(result.details.contains("CT1"));
    Ok(())
}

#[tokio::test]
async fn connector_fault_is_reported_verbatim() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let connector = MockConnector::new();
    connector.respond_with(
        SoapAction::GetCards,
        500,
        fault_response("4004", "Ungültige Mandant-ID"),
    );

    let mut session = connect_with(&test_config(dir.path()), connector.clone()).await?;
    let result = smcb_readability(&mut session).await;

    assert_eq!(result.status, TestStatus::Failure);
    assert!(result.details.contains("4004"));
    assert!(result.details.contains("Ungültige Mandant-ID"));
    Ok(())
}

#[tokio::test]
async fn no_smcb_is_a_failure_with_support_code() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let connector = MockConnector::new();
    connector.respond(SoapAction::GetCards, cards_response(&[]));

    let mut session = connect_with(&test_config(dir.path()), connector.clone()).await?;
    let result = smcb_readability(&mut session).await;

    assert_eq!(result.status, TestStatus::Failure);
    assert!(result.details.contains("AUTHCL_1104"));
    Ok(())
}

#[tokio::test]
async fn idp_answering_503_fails_with_status_code() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let url = http_stub("503 Service Unavailable").await?;
    let path = dir.path().join("test-cases-config.json");
    fs::write(&path, serde_json::json!({ "Test IDP": url }).to_string())?;

    let results = idp_reachability(&path, &[], ProbeTimeouts::default()).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, TestStatus::Failure);
    assert!(results[0].details.contains("503"));
    assert!(results[0].name.contains("Test IDP"));
    Ok(())
}

#[tokio::test]
async fn idp_answering_200_passes() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let ok = http_stub("200 OK").await?;
    let down = http_stub("502 Bad Gateway").await?;
    let path = dir.path().join("test-cases-config.json");
    fs::write(
        &path,
        serde_json::json!({ "A IDP": ok, "B IDP": down }).to_string(),
    )?;

    let results = idp_reachability(&path, &[], ProbeTimeouts::default()).await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_success());
    assert!(!results[1].is_success());
    assert!(results[1].details.contains("502"));
    Ok(())
}

#[tokio::test]
async fn missing_idp_list_is_a_single_failure() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let results = idp_reachability(
        &dir.path().join("test-cases-config.json"),
        &[],
        ProbeTimeouts::default(),
    )
    .await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, IDP_TEST_NAME);
    assert_eq!(results[0].status, TestStatus::Failure);
    assert!(results[0].details.contains("not found"));
    Ok(())
}

#[tokio::test]
async fn run_all_keeps_checks_independent() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let url = http_stub("200 OK").await?;
    fs::write(
        dir.path().join("test-cases-config.json"),
        serde_json::json!({ "IDP": url }).to_string(),
    )?;

    // Connector has nothing scripted: the card check fails, the IDP check still runs.
    let connector = MockConnector::new();
    let results = run_all(&test_config(dir.path()), connector.clone()).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, TestStatus::Failure);
    assert_eq!(results[1].status, TestStatus::Success);

    let json = serde_json::to_value(&results)?;
    assert_eq!(json[0]["status"], "failure");
    assert_eq!(json[1]["status"], "success");
    Ok(())
}
