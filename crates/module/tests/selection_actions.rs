//! Selection actions and single-record operations.

mod common;

use assert_matches::assert_matches;
use serde_json::json;

use common::*;
use workspaces_core::error::CoreError;
use workspaces_core::types::RecordKey;
use workspaces_events::ModuleEvent;
use workspaces_module::presentation::DialogKind;
use workspaces_module::{ActionOutcome, Command, CommandOutcome, ModuleError};

fn keys() -> [RecordKey; 2] {
    [
        RecordKey::new("pages", 10, 1),
        RecordKey::new("tt_content", 11, 2),
    ]
}

async fn harness_with_selection(
    gateway: std::sync::Arc<MockGateway>,
    interaction: std::sync::Arc<ScriptedInteraction>,
) -> Harness {
    let mut harness = Harness::started(
        gateway,
        interaction,
        vec![row("pages", 10, 1), row("tt_content", 11, 2)],
    )
    .await;
    for key in keys() {
        harness
            .module
            .dispatch(Command::ToggleRecord { key, checked: true })
            .await
            .unwrap();
    }
    harness.drain_events();
    harness
}

// ---------------------------------------------------------------------------
// Test: publish with an ok verdict executes and refreshes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_selection_with_ok_verdict() {
    let gateway = MockGateway::new();
    gateway.respond("checkIntegrity", json!({"result": "ok"}));
    let interaction = ScriptedInteraction::accepting();
    let mut harness = harness_with_selection(gateway.clone(), interaction.clone()).await;

    let outcome = harness
        .module
        .dispatch(Command::RunSelectionAction("publish".into()))
        .await
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Action(ActionOutcome::Completed));

    let selection = json!([
        {"table": "pages", "liveId": 1, "versionId": 10},
        {"table": "tt_content", "liveId": 2, "versionId": 11},
    ]);
    assert_eq!(
        gateway.calls_to("checkIntegrity")[0].payload(),
        json!({"selection": selection, "type": "selection"})
    );
    assert_eq!(
        gateway.calls_to("executeSelectionAction")[0].payload(),
        json!({"action": "publish", "selection": selection})
    );

    // Only the selection confirmation was shown.
    let dialogs = interaction.dialogs();
    assert_eq!(dialogs.len(), 1);
    assert_eq!(dialogs[0].kind, DialogKind::SelectionAction);

    assert!(harness.module.table().await.selection().is_empty());
    assert_eq!(
        gateway.methods().last().map(String::as_str),
        Some("getWorkspaceInfos")
    );
    assert_eq!(harness.drain_events(), vec![ModuleEvent::PageTreeRefresh]);
}

// ---------------------------------------------------------------------------
// Test: declining an integrity warning changes nothing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn declined_integrity_warning_sends_nothing() {
    let gateway = MockGateway::new();
    gateway.respond("checkIntegrity", json!({"result": "warning", "issues": []}));
    let interaction = ScriptedInteraction::with_confirms(&[false]);
    let mut harness = harness_with_selection(gateway.clone(), interaction.clone()).await;
    let fetches = gateway.count("getWorkspaceInfos");

    let outcome = harness
        .module
        .dispatch(Command::RunSelectionAction("publish".into()))
        .await
        .unwrap();

    assert_eq!(outcome, CommandOutcome::Action(ActionOutcome::Cancelled));
    assert_eq!(gateway.count("executeSelectionAction"), 0);
    assert_eq!(gateway.count("getWorkspaceInfos"), fetches);
    assert_eq!(interaction.dialogs()[0].kind, DialogKind::IntegrityWarning);
    assert_eq!(harness.module.table().await.selection().len(), 2);
    assert!(harness.drain_events().is_empty());
}

#[tokio::test]
async fn accepted_integrity_warning_proceeds_to_confirmation() {
    let gateway = MockGateway::new();
    gateway.respond("checkIntegrity", json!({"result": "warning"}));
    let interaction = ScriptedInteraction::accepting();
    let harness = harness_with_selection(gateway.clone(), interaction.clone()).await;

    harness
        .module
        .dispatch(Command::RunSelectionAction("publish".into()))
        .await
        .unwrap();

    let kinds: Vec<_> = interaction.dialogs().iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![DialogKind::IntegrityWarning, DialogKind::SelectionAction]
    );
    assert_eq!(gateway.count("executeSelectionAction"), 1);
}

// ---------------------------------------------------------------------------
// Test: discard never runs the integrity check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn discard_selection_skips_integrity_check() {
    let gateway = MockGateway::new();
    let harness = harness_with_selection(gateway.clone(), ScriptedInteraction::accepting()).await;

    harness
        .module
        .dispatch(Command::RunSelectionAction("discard".into()))
        .await
        .unwrap();

    assert_eq!(gateway.count("checkIntegrity"), 0);
    assert_eq!(
        gateway.calls_to("executeSelectionAction")[0].payload()["action"],
        "discard"
    );
}

#[tokio::test]
async fn declined_confirmation_keeps_selection() {
    let gateway = MockGateway::new();
    let interaction = ScriptedInteraction::with_confirms(&[false]);
    let harness = harness_with_selection(gateway.clone(), interaction).await;

    let outcome = harness
        .module
        .dispatch(Command::RunSelectionAction("discard".into()))
        .await
        .unwrap();

    assert_eq!(outcome, CommandOutcome::Action(ActionOutcome::Cancelled));
    assert_eq!(gateway.count("executeSelectionAction"), 0);
    assert_eq!(harness.module.table().await.selection().len(), 2);
}

// ---------------------------------------------------------------------------
// Test: empty and unknown choices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_choice_is_a_no_op() {
    let gateway = MockGateway::new();
    let harness = harness_with_selection(gateway.clone(), ScriptedInteraction::accepting()).await;
    let sent = gateway.calls().len();

    let outcome = harness
        .module
        .dispatch(Command::RunSelectionAction(String::new()))
        .await
        .unwrap();

    assert_eq!(outcome, CommandOutcome::Action(ActionOutcome::Skipped));
    assert_eq!(gateway.calls().len(), sent);
}

#[tokio::test]
async fn unknown_choice_is_invalid() {
    let harness =
        harness_with_selection(MockGateway::new(), ScriptedInteraction::accepting()).await;

    let result = harness
        .module
        .dispatch(Command::RunSelectionAction("archive".into()))
        .await;

    assert_matches!(
        result,
        Err(ModuleError::Core(CoreError::InvalidAction(_)))
    );
}

#[tokio::test]
async fn failed_action_surfaces_error() {
    let gateway = MockGateway::new();
    gateway.fail("executeSelectionAction", "Record is locked");
    let harness = harness_with_selection(gateway.clone(), ScriptedInteraction::accepting()).await;

    let result = harness
        .module
        .dispatch(Command::RunSelectionAction("discard".into()))
        .await;

    assert_matches!(result, Err(ModuleError::Remote(_)));
    assert_eq!(harness.module.table().await.selection().len(), 2);
}

// ---------------------------------------------------------------------------
// Test: single-record publish, discard and preview
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_single_record() {
    let gateway = MockGateway::new();
    gateway.respond("checkIntegrity", json!({"result": "ok"}));
    let interaction = ScriptedInteraction::accepting();
    let mut harness = Harness::started(
        gateway.clone(),
        interaction.clone(),
        vec![row("pages", 10, 1)],
    )
    .await;

    let outcome = harness
        .module
        .dispatch(Command::PublishRecord(keys()[0].clone()))
        .await
        .unwrap();

    assert_eq!(outcome, CommandOutcome::Action(ActionOutcome::Completed));
    assert_eq!(
        gateway.calls_to("checkIntegrity")[0].payload(),
        json!({"selection": [{"table": "pages", "liveId": 1, "versionId": 10}], "type": "selection"})
    );
    assert_eq!(
        gateway.calls_to("publishSingleRecord")[0].payload(),
        json!(["pages", 1, 10])
    );
    assert_eq!(interaction.dialogs()[0].kind, DialogKind::PublishRecord);
    assert_eq!(gateway.count("getWorkspaceInfos"), 2);
    assert_eq!(harness.drain_events(), vec![ModuleEvent::PageTreeRefresh]);
}

#[tokio::test]
async fn discard_single_record_without_integrity_check() {
    let gateway = MockGateway::new();
    let interaction = ScriptedInteraction::accepting();
    let harness = Harness::started(
        gateway.clone(),
        interaction.clone(),
        vec![row("pages", 10, 1)],
    )
    .await;

    harness
        .module
        .dispatch(Command::DiscardRecord(keys()[0].clone()))
        .await
        .unwrap();

    assert_eq!(gateway.count("checkIntegrity"), 0);
    assert_eq!(
        gateway.calls_to("deleteSingleRecord")[0].payload(),
        json!(["pages", 10])
    );
    assert_eq!(interaction.dialogs()[0].kind, DialogKind::DiscardRecord);
}

#[tokio::test]
async fn preview_url_and_links() {
    let gateway = MockGateway::new();
    gateway.respond("viewSingleRecord", json!("https://cms.test/preview/10"));
    gateway.respond(
        "generateWorkspacePreviewLinksForAllLanguages",
        json!({"English": "https://cms.test/en", "German": "https://cms.test/de"}),
    );
    let harness = Harness::started(
        gateway.clone(),
        ScriptedInteraction::accepting(),
        vec![row("pages", 10, 1)],
    )
    .await;

    let url = harness.module.preview_url(&keys()[0]).await.unwrap();
    assert_eq!(url, "https://cms.test/preview/10");
    assert_eq!(
        gateway.calls_to("viewSingleRecord")[0].payload(),
        json!(["pages", 10])
    );

    let links = harness.module.preview_links().await.unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].language, "English");
    assert_eq!(links[1].url, "https://cms.test/de");
    assert_eq!(
        gateway.calls_to("generateWorkspacePreviewLinksForAllLanguages")[0].payload(),
        json!([WORKSPACE_ID])
    );
}
