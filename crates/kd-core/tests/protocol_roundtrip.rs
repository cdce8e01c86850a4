//! Integration tests for the kd-core embedding protocol.
//!
//! These tests go through the public API only and check the guards, the
//! decoders, and the drill correlator together.

use kd_core::protocol::*;
use kd_core::{decode_command, decode_message, encode_message, DecodedMessage, MessageEnvelope};
use serde_json::{json, Value};

type Guard = fn(&Value) -> bool;

/// Every guard the protocol exposes, paired with the wire kind it accepts.
fn all_guards() -> Vec<(&'static str, Guard)> {
    vec![
        ("saveDashboard", is_save_dashboard_command_data),
        ("saveAsDashboard", is_save_as_dashboard_command_data),
        ("cancelEdit", is_cancel_edit_command_data),
        ("deleteDashboard", is_delete_dashboard_command_data),
        ("switchToEdit", is_switch_to_edit_command_data),
        ("drillableItems", is_drillable_items_command_data),
        ("setSize", is_set_size_command_data),
        ("addWidget", is_add_widget_command_data),
        ("addFilter", is_add_filter_command_data),
        ("exportToPdf", is_export_to_pdf_command_data),
        ("setFilterContext", is_set_filter_context_command_data),
        ("removeFilterContext", is_remove_filter_context_command_data),
        ("listeningForDrillableItems", is_listening_for_drillable_items_event_data),
        ("loadingStarted", is_loading_started_event_data),
        ("noPermissions", is_no_permissions_event_data),
        ("resized", is_resized_event_data),
        ("dashboardCreated", is_dashboard_created_event_data),
        ("loaded", is_dashboard_loaded_event_data),
        ("dashboardUpdated", is_dashboard_updated_event_data),
        ("dashboardSaved", is_dashboard_saved_event_data),
        ("dashboardDeleted", is_dashboard_deleted_event_data),
        ("dashboardCreationCanceled", is_dashboard_creation_canceled_event_data),
        ("switchedToEdit", is_switched_to_edit_event_data),
        ("switchedToView", is_switched_to_view_event_data),
        ("platform", is_platform_event_data),
        ("widgetAdded", is_widget_added_event_data),
        ("filterAdded", is_filter_added_event_data),
        ("exportedToPdf", is_exported_to_pdf_event_data),
        ("drill", is_drill_event_data),
        ("filterContextChanged", is_filter_context_changed_event_data),
        ("setFilterContextFinished", is_set_filter_context_finished_event_data),
        ("removeFilterContextFinished", is_remove_filter_context_finished_event_data),
        ("drillToUrlStarted", is_drill_to_url_started_event_data),
        ("drillToUrlResolved", is_drill_to_url_resolved_event_data),
        (COMMAND_FAILED_EVENT_TYPE, is_command_failed_event_data),
    ]
}

fn envelope(kind: &str) -> Value {
    json!({"product": "kpiDashboard", "data": {"type": kind}})
}

#[test]
fn test_guard_table_covers_every_kind() {
    let guards = all_guards();
    for kind in KdCommandType::ALL {
        assert!(guards.iter().any(|(k, _)| *k == kind.as_str()), "{kind} has no guard");
    }
    for kind in KdEventType::ALL {
        assert!(guards.iter().any(|(k, _)| *k == kind.as_str()), "{kind} has no guard");
    }
    assert_eq!(guards.len(), KdCommandType::ALL.len() + KdEventType::ALL.len() + 1);
}

#[test]
fn test_each_envelope_satisfies_exactly_its_own_guard() {
    let guards = all_guards();
    for (kind, _) in &guards {
        // Arrange
        let value = envelope(kind);

        // Act
        let accepted: Vec<&str> = guards
            .iter()
            .filter(|(_, guard)| guard(&value))
            .map(|(k, _)| *k)
            .collect();

        // Assert
        assert_eq!(accepted, vec![*kind], "envelope of {kind} matched {accepted:?}");
    }
}

#[test]
fn test_guards_reject_malformed_values() {
    let malformed = [
        json!(null),
        json!(true),
        json!(42),
        json!("setSize"),
        json!([]),
        json!({}),
        json!({"data": null}),
        json!({"data": "setSize"}),
        json!({"data": {}}),
        json!({"data": {"type": 1}}),
        json!({"data": {"type": null}}),
        json!({"type": "setSize"}),
    ];
    for value in &malformed {
        assert_eq!(get_event_type(value), None, "{value}");
        for (kind, guard) in all_guards() {
            assert!(!guard(value), "guard for {kind} accepted {value}");
        }
    }
}

#[test]
fn test_guards_are_case_sensitive() {
    assert!(!is_set_size_command_data(&envelope("SetSize")));
    assert!(!is_dashboard_loaded_event_data(&envelope("dashboardLoaded")));
}

#[test]
fn test_guard_accepts_bad_body_but_decoder_rejects_it() {
    // Arrange
    let value = json!({"product": "kpiDashboard", "data": {"type": "setSize", "height": "tall"}});

    // Act / Assert
    assert!(is_set_size_command_data(&value));
    assert!(matches!(
        decode_command(&value),
        Err(ProtocolError::MalformedBody { .. })
    ));
}

#[test]
fn test_set_size_end_to_end() {
    // Arrange: what the host posts into the iframe
    let posted = encode_message(&MessageEnvelope::kd(KdCommand::SetSize(SetSizeCommandBody {
        height: 480.0,
    })))
    .unwrap();

    // Act: what KD does on receipt
    let kind = get_event_type(&posted);
    let decoded = decode_command(&posted).unwrap();

    // Assert
    assert_eq!(posted, json!({"product": "kpiDashboard", "data": {"type": "setSize", "height": 480.0}}));
    assert_eq!(kind, Some("setSize"));
    assert!(is_set_size_command_data(&posted));
    assert_eq!(decoded.data.command_type().contract().success_event, None);
}

#[test]
fn test_loaded_event_decodes_available_commands_and_meta() {
    let value = json!({
        "product": "kpiDashboard",
        "data": {
            "type": "loaded",
            "availableCommands": ["switchToEdit", "exportToPdf"],
            "dashboardId": "abc",
            "project": "p1",
            "dashboard": "/gdc/md/p1/obj/5",
            "title": "Sales"
        }
    });

    match decode_message(&value).unwrap() {
        DecodedMessage::Event(env) => {
            assert_eq!(env.data.event_type(), KdEventType::DashboardLoaded);
            assert_eq!(
                env.data.available_commands(),
                Some(&[KdCommandType::SwitchToEdit, KdCommandType::ExportToPdf][..])
            );
        }
        other => panic!("expected event, got {other:?}"),
    }
}

#[test]
fn test_drill_to_url_correlation_through_decoded_events() {
    // Arrange: KD starts two drills and resolves them out of order,
    // with unrelated traffic in between.
    let first = DrillToUrlStartedBody::generate();
    let second = DrillToUrlStartedBody::generate();
    assert_ne!(first.id, second.id);

    let stream = vec![
        MessageEnvelope::kd(KdEvent::DrillToUrlStarted(first.clone())),
        MessageEnvelope::kd(KdEvent::DrillToUrlStarted(second.clone())),
        MessageEnvelope::kd(KdEvent::Resized(ResizedBody { height: 300.0 })),
        MessageEnvelope::kd(KdEvent::DrillToUrlResolved(second.resolve("https://example.com/2"))),
        MessageEnvelope::kd(KdEvent::DrillToUrlResolved(first.resolve("https://example.com/1"))),
        MessageEnvelope::kd(KdEvent::DrillToUrlResolved(DrillToUrlResolvedBody {
            id: "never-started".to_string(),
            url: "https://example.com/x".to_string(),
        })),
    ];

    // Act: round-trip every event through JSON, then correlate
    let mut correlator = DrillToUrlCorrelator::new();
    let mut resolutions = Vec::new();
    for env in &stream {
        let wire = encode_message(env).unwrap();
        let decoded = decode_event(&wire).unwrap();
        if let Some(resolution) = correlator.observe(&decoded.data).unwrap() {
            resolutions.push(resolution);
        }
    }

    // Assert
    assert_eq!(resolutions.len(), 3);
    assert_eq!(resolutions[0].id(), second.id);
    assert_eq!(resolutions[0].url(), "https://example.com/2");
    assert!(!resolutions[0].is_orphaned());
    assert_eq!(resolutions[1].id(), first.id);
    assert!(!resolutions[1].is_orphaned());
    assert!(resolutions[2].is_orphaned());
    assert_eq!(correlator.pending_count(), 0);
}

#[test]
fn test_failure_event_is_decoded_as_failure() {
    let wire = encode_message(&FailureTrigger::FilterNotFound.into_failure()).unwrap();
    assert!(is_command_failed_event_data(&wire));
    assert!(matches!(decode_message(&wire).unwrap(), DecodedMessage::Failure(_)));
}
