//! Integration tests for the sysbridge-core envelope codec.
//!
//! Every outbound command is encoded the way the client sends it and decoded
//! the way the backend reads it; inbound notifications go the other way.
//! Together they exercise the codec, the event-kind table, and the model
//! registry through the public API only.

use serde_json::{json, Value};
use sysbridge_core::{
    decode_command, decode_inbound, encode_command, encode_inbound,
    protocol::{messages::OpenTarget, EventKind},
    Command, InboundEnvelope, ModelRegistry, Module, Notification,
};

fn roundtrip(cmd: Command) -> Command {
    let text = encode_command(&cmd, "integration-key", Some("req-42"));
    let decoded = decode_command(&text).expect("decode must succeed");
    assert_eq!(decoded.api_key, "integration-key");
    assert_eq!(decoded.id.as_deref(), Some("req-42"));
    decoded.command
}

fn all_commands() -> Vec<Command> {
    vec![
        Command::GetData {
            modules: vec!["battery".into(), "display".into()],
        },
        Command::RegisterDataListener {
            modules: vec!["battery".into()],
        },
        Command::GetDirectories,
        Command::GetFiles {
            base: "documents".into(),
            path: Some("Reports".into()),
        },
        Command::GetFiles {
            base: "music".into(),
            path: None,
        },
        Command::GetFile {
            base: "pictures".into(),
            path: "holiday/beach.jpg".into(),
        },
        Command::KeyboardKeypress { key: "a".into() },
        Command::KeyboardText {
            text: "hello world".into(),
        },
        Command::Open(OpenTarget::Path("/tmp".into())),
        Command::Open(OpenTarget::Url("https://example.com".into())),
        Command::ExitApplication,
    ]
}

#[test]
fn test_every_outbound_command_survives_roundtrip() {
    for cmd in all_commands() {
        assert_eq!(roundtrip(cmd.clone()), cmd);
    }
}

#[test]
fn test_every_outbound_kind_is_covered() {
    let mut kinds: Vec<EventKind> = all_commands().iter().map(Command::kind).collect();
    kinds.dedup();
    assert_eq!(kinds.len(), 9);
}

#[test]
fn test_encoded_commands_never_contain_null() {
    for cmd in all_commands() {
        let value: Value =
            serde_json::from_str(&encode_command(&cmd, "k", None)).expect("valid JSON");
        let obj = value.as_object().expect("object");
        assert!(
            obj.values().all(|v| !v.is_null()),
            "{cmd:?} produced a null field"
        );
        assert!(!obj.contains_key("id"));
    }
}

#[test]
fn test_inbound_notifications_roundtrip() {
    let cases = vec![
        Notification::DataUpdate {
            module: Some("battery".into()),
            data: Some(json!({"percentage": 87.5, "is_charging": true})),
        },
        Notification::Error {
            subtype: Some("listener-already-registered".into()),
            message: Some("Listener already registered".into()),
        },
        Notification::Directories(json!([{"key": "home", "path": "/home/u"}])),
        Notification::Files(json!({"files": [], "path": "Reports"})),
        Notification::File(json!({"name": "a"})),
        Notification::Other {
            kind: "application-update".into(),
        },
    ];

    for notification in cases {
        let envelope = InboundEnvelope {
            id: Some("9".into()),
            notification,
        };
        let decoded = decode_inbound(&encode_inbound(&envelope)).expect("decode must succeed");
        assert_eq!(decoded, envelope);
    }
}

#[test]
fn test_decoded_data_update_resolves_and_decodes_through_registry() {
    let env = decode_inbound(
        r#"{"type":"data-update","module":"battery","data":{"percentage":87.5,"is_charging":true}}"#,
    )
    .expect("decode");
    let Notification::DataUpdate {
        module: Some(name),
        data: Some(data),
    } = env.notification
    else {
        panic!("expected a data-update with data");
    };

    let module = ModelRegistry::standard().resolve(&name).expect("battery is registered");
    let payload = module.decode(data).expect("schema match");

    assert_eq!(module, Module::Battery);
    let battery = payload.as_battery().expect("battery");
    assert_eq!(battery.percentage, Some(87.5));
    assert_eq!(battery.is_charging, Some(true));
}

#[test]
fn test_display_update_decodes_to_display_payload() {
    let env = decode_inbound(
        r#"{"type":"data-update","module":"display","data":{
            "id":"display","displays":[{"name":"DELL U2720Q","resolution_horizontal":3840},{"name":"Built-in"}],
            "last_updated":{"displays":1718000000.5}}}"#,
    )
    .expect("decode");
    let Notification::DataUpdate {
        module: Some(name),
        data: Some(data),
    } = env.notification
    else {
        panic!("expected a data-update with data");
    };

    let module = ModelRegistry::standard().resolve(&name).expect("display is registered");
    let payload = module.decode(data).expect("schema match");

    assert_eq!(module, Module::Display);
    assert!(payload.as_battery().is_none());
    let display = payload.as_display().expect("display");
    assert_eq!(display.id.as_deref(), Some("display"));
    let monitors = display.displays.as_ref().expect("monitor list");
    assert_eq!(monitors.len(), 2);
    assert_eq!(monitors[0]["name"], "DELL U2720Q");
    assert_eq!(
        display.last_updated.as_ref().and_then(|u| u.displays),
        Some(1718000000.5)
    );
}
