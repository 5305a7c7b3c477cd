use std::sync::Arc;

use quill_settings::{
    FieldValue, InputEvent, SettingsError, SettingsEvent, SettingsForm, TransportError,
    WRITING_SCHEMA,
};
use quill_test_support::fixtures::writing_snapshot;
use quill_test_support::mocks::{ScriptedSnapshotProvider, ScriptedTransport};

fn mount(
    provider: ScriptedSnapshotProvider,
) -> (SettingsForm, Arc<ScriptedTransport>, Arc<ScriptedSnapshotProvider>) {
    let transport = Arc::new(ScriptedTransport::new());
    let provider = Arc::new(provider);
    let form = SettingsForm::new(WRITING_SCHEMA, transport.clone(), provider.clone());
    (form, transport, provider)
}

#[tokio::test]
async fn refresh_projects_snapshot_onto_schema() -> anyhow::Result<()> {
    let (form, _transport, provider) = mount(ScriptedSnapshotProvider::serving(writing_snapshot()));

    form.refresh().await?;

    let fields = form.fields();
    assert_eq!(fields.len(), WRITING_SCHEMA.fields().len());
    assert!(!fields.contains("blogname"));
    assert_eq!(fields.get("minileven"), Some(&FieldValue::from(true)));
    assert_eq!(provider.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn requesting_flag_tracks_outstanding_fetch() -> anyhow::Result<()> {
    let (form, _transport, provider) = mount(ScriptedSnapshotProvider::held(writing_snapshot()));
    let mut changes = form.subscribe();

    let pending = {
        let form = form.clone();
        tokio::spawn(async move { form.refresh().await })
    };
    provider.wait_for_request().await;
    assert!(form.is_requesting_settings());

    provider.release();
    pending.await??;
    assert!(!form.is_requesting_settings());

    let kinds: Vec<_> = changes
        .drain()
        .into_iter()
        .map(|change| change.event.kind())
        .collect();
    assert_eq!(kinds, vec!["request_started", "request_finished", "reconciled"]);
    Ok(())
}

#[tokio::test]
async fn refresh_failure_surfaces_transport_error() {
    let provider = ScriptedSnapshotProvider::serving(writing_snapshot());
    provider.fail_with(TransportError::Unavailable {
        message: "timeout".to_string(),
    });
    let (form, _transport, _provider) = mount(provider);

    let err = form.refresh().await.expect_err("refresh fails");
    assert!(matches!(err, SettingsError::RequestFailed { .. }));
    assert!(!form.is_requesting_settings());
    assert!(form.fields().is_empty());
}

#[tokio::test]
async fn submit_sends_edited_and_toggled_fields() -> anyhow::Result<()> {
    let (form, transport, _provider) = mount(ScriptedSnapshotProvider::serving(writing_snapshot()));
    form.refresh().await?;

    form.on_change_field("default_post_format")(&InputEvent::named(
        "default_post_format",
        "aside",
    ));
    form.handle_toggle("minileven")();
    assert_eq!(form.fields().get("minileven"), Some(&FieldValue::from(false)));

    let receipt = form.handle_submit_form().await?;

    assert_eq!(receipt.saved, vec!["default_post_format", "minileven"]);
    let payloads = transport.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].names(), vec!["default_post_format", "minileven"]);
    assert_eq!(payloads[0].get("default_post_format"), Some(&FieldValue::from("aside")));
    assert!(!form.store().has_dirty());
    assert!(!form.is_saving_settings());
    Ok(())
}

#[tokio::test]
async fn edits_outside_schema_are_never_submitted() -> anyhow::Result<()> {
    let (form, transport, _provider) = mount(ScriptedSnapshotProvider::serving(writing_snapshot()));
    form.refresh().await?;

    form.on_change_field("blogname")(&InputEvent::new("Renamed"));
    let receipt = form.handle_submit_form().await?;

    assert!(receipt.is_empty());
    assert_eq!(transport.call_count(), 0);
    assert!(form.store().is_dirty("blogname"));
    Ok(())
}

#[tokio::test]
async fn snapshot_after_dispose_is_discarded() -> anyhow::Result<()> {
    let (form, _transport, provider) = mount(ScriptedSnapshotProvider::held(writing_snapshot()));
    let mut changes = form.subscribe();

    let pending = {
        let form = form.clone();
        tokio::spawn(async move { form.refresh().await })
    };
    provider.wait_for_request().await;
    form.dispose();
    provider.release();

    assert!(matches!(pending.await?, Err(SettingsError::Disposed)));
    assert!(form.fields().is_empty());
    assert!(
        changes
            .drain()
            .iter()
            .any(|change| change.event == SettingsEvent::Disposed)
    );

    form.on_change_field("minileven")(&InputEvent::new(false));
    assert!(!form.store().has_dirty());
    Ok(())
}
