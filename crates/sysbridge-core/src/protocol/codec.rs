//! JSON codec for System Bridge envelopes.
//!
//! Wire format (one WebSocket text frame per envelope):
//! ```text
//! outbound: {"event": "<kind>", "api-key": "<key>", "id": "<uuid>", ...fields}
//! inbound:  {"type": "<kind>", "id"?: ..., "subtype"?: ..., "message"?: ...,
//!            "module"?: ..., "data"?: ..., "directories"|"files"|"file"?: ...}
//! ```
//! Optional fields that are absent are omitted from the object entirely,
//! never written as `null`.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::protocol::event::{Direction, EventKind};
use crate::protocol::messages::{
    field, Command, CommandEnvelope, InboundEnvelope, Notification, OpenTarget,
};

/// Errors that can occur while decoding a frame.
///
/// Encoding cannot fail: every [`Command`] maps onto a JSON object.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CodecError {
    /// The text is not valid JSON at all.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The text parsed, but the top-level value is not an object.
    #[error("frame is not a JSON object")]
    NotAnObject,

    /// The `event` / `type` discriminator is missing or not a string.
    #[error("frame has no string `{0}` discriminator")]
    MissingDiscriminator(&'static str),

    /// The `event` field names a kind this codec does not know.
    #[error("unknown event kind: {0}")]
    UnknownEvent(String),

    /// An inbound kind appeared where an outbound command was expected.
    #[error("`{0}` is not a client command")]
    NotACommand(EventKind),

    /// A field required by the kind is missing or has the wrong JSON type.
    #[error("`{event}` frame has a missing or mistyped `{field}` field")]
    InvalidField {
        event: EventKind,
        field: &'static str,
    },

    /// A module payload does not match that module's schema.
    #[error("`{module}` payload does not match its schema: {reason}")]
    PayloadMismatch {
        module: &'static str,
        reason: String,
    },
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::InvalidJson(err.to_string())
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes `command` as an outbound text frame.
///
/// `id` is the request correlation id; pass `None` to leave it out.
///
/// # Examples
///
/// ```rust
/// use sysbridge_core::{decode_command, encode_command, Command};
///
/// let text = encode_command(&Command::GetDirectories, "secret", None);
/// let decoded = decode_command(&text).unwrap();
/// assert_eq!(decoded.command, Command::GetDirectories);
/// assert_eq!(decoded.api_key, "secret");
/// assert!(!text.contains("null"));
/// ```
pub fn encode_command(command: &Command, api_key: &str, id: Option<&str>) -> String {
    let mut obj = Map::new();
    obj.insert(field::EVENT.into(), command.kind().as_str().into());
    obj.insert(field::API_KEY.into(), api_key.into());
    if let Some(id) = id {
        obj.insert(field::ID.into(), id.into());
    }

    match command {
        Command::GetData { modules } | Command::RegisterDataListener { modules } => {
            obj.insert(field::MODULES.into(), modules.clone().into());
        }
        Command::GetDirectories | Command::ExitApplication => {}
        Command::GetFiles { base, path } => {
            obj.insert(field::BASE.into(), base.as_str().into());
            if let Some(path) = path {
                obj.insert(field::PATH.into(), path.as_str().into());
            }
        }
        Command::GetFile { base, path } => {
            obj.insert(field::BASE.into(), base.as_str().into());
            obj.insert(field::PATH.into(), path.as_str().into());
        }
        Command::KeyboardKeypress { key } => {
            obj.insert(field::KEY.into(), key.as_str().into());
        }
        Command::KeyboardText { text } => {
            obj.insert(field::TEXT.into(), text.as_str().into());
        }
        Command::Open(OpenTarget::Path(path)) => {
            obj.insert(field::PATH.into(), path.as_str().into());
        }
        Command::Open(OpenTarget::Url(url)) => {
            obj.insert(field::URL.into(), url.as_str().into());
        }
    }

    Value::Object(obj).to_string()
}

/// Decodes an outbound text frame.
///
/// The client never receives these; the function exists so test servers and
/// benchmarks can play the backend side of the conversation.
///
/// # Errors
///
/// Returns [`CodecError`] if the frame is not an object, lacks an `event`
/// string, names an unknown or inbound kind, or is missing a required field.
pub fn decode_command(text: &str) -> Result<CommandEnvelope, CodecError> {
    let obj = parse_object(text)?;
    let event_name =
        string_field(&obj, field::EVENT).ok_or(CodecError::MissingDiscriminator(field::EVENT))?;
    let event = EventKind::from_wire(&event_name).ok_or(CodecError::UnknownEvent(event_name))?;
    if event.direction() != Direction::Outbound {
        return Err(CodecError::NotACommand(event));
    }

    let api_key = required_string(&obj, event, field::API_KEY)?;
    let id = string_field(&obj, field::ID);

    let command = match event {
        EventKind::GetData => Command::GetData {
            modules: required_modules(&obj, event)?,
        },
        EventKind::RegisterDataListener => Command::RegisterDataListener {
            modules: required_modules(&obj, event)?,
        },
        EventKind::GetDirectories => Command::GetDirectories,
        EventKind::GetFiles => Command::GetFiles {
            base: required_string(&obj, event, field::BASE)?,
            path: string_field(&obj, field::PATH),
        },
        EventKind::GetFile => Command::GetFile {
            base: required_string(&obj, event, field::BASE)?,
            path: required_string(&obj, event, field::PATH)?,
        },
        EventKind::KeyboardKeypress => Command::KeyboardKeypress {
            key: required_string(&obj, event, field::KEY)?,
        },
        EventKind::KeyboardText => Command::KeyboardText {
            text: required_string(&obj, event, field::TEXT)?,
        },
        EventKind::Open => match (string_field(&obj, field::PATH), string_field(&obj, field::URL)) {
            (Some(path), _) => Command::Open(OpenTarget::Path(path)),
            (None, Some(url)) => Command::Open(OpenTarget::Url(url)),
            (None, None) => {
                return Err(CodecError::InvalidField {
                    event,
                    field: field::PATH,
                })
            }
        },
        EventKind::ExitApplication => Command::ExitApplication,
        // Inbound kinds were rejected by the direction check above.
        _ => return Err(CodecError::NotACommand(event)),
    };

    Ok(CommandEnvelope {
        api_key,
        id,
        command,
    })
}

/// Decodes an inbound text frame.
///
/// Unknown `type` values decode to [`Notification::Other`] rather than
/// failing, so a newer backend cannot break the receive loop.
///
/// # Errors
///
/// Returns [`CodecError`] if the text is not a JSON object or has no string
/// `type` field.
///
/// # Examples
///
/// ```rust
/// use sysbridge_core::{decode_inbound, Notification};
///
/// let env = decode_inbound(r#"{"type":"error","subtype":"bad-api-key","message":"x"}"#).unwrap();
/// assert_eq!(
///     env.notification,
///     Notification::Error { subtype: Some("bad-api-key".into()), message: Some("x".into()) }
/// );
/// ```
pub fn decode_inbound(text: &str) -> Result<InboundEnvelope, CodecError> {
    let mut obj = parse_object(text)?;
    let type_name =
        string_field(&obj, field::TYPE).ok_or(CodecError::MissingDiscriminator(field::TYPE))?;
    let id = string_field(&obj, field::ID);

    let notification = match EventKind::from_wire(&type_name) {
        Some(EventKind::DataUpdate) => Notification::DataUpdate {
            module: string_field(&obj, field::MODULE),
            data: obj.remove(field::DATA).filter(|v| !v.is_null()),
        },
        Some(EventKind::Error) => Notification::Error {
            subtype: string_field(&obj, field::SUBTYPE),
            message: obj.get(field::MESSAGE).and_then(message_text),
        },
        Some(EventKind::Directories) => {
            Notification::Directories(obj.remove(field::DIRECTORIES).unwrap_or(Value::Null))
        }
        Some(EventKind::Files) => Notification::Files(obj.remove(field::FILES).unwrap_or(Value::Null)),
        Some(EventKind::File) => Notification::File(obj.remove(field::FILE).unwrap_or(Value::Null)),
        _ => Notification::Other { kind: type_name },
    };

    Ok(InboundEnvelope { id, notification })
}

/// Encodes an inbound envelope.  Used by test servers to play the backend.
pub fn encode_inbound(envelope: &InboundEnvelope) -> String {
    let mut obj = Map::new();
    obj.insert(field::TYPE.into(), envelope.notification.type_name().into());
    if let Some(id) = &envelope.id {
        obj.insert(field::ID.into(), id.as_str().into());
    }

    match &envelope.notification {
        Notification::DataUpdate { module, data } => {
            insert_opt(&mut obj, field::MODULE, module.as_deref());
            if let Some(data) = data {
                obj.insert(field::DATA.into(), data.clone());
            }
        }
        Notification::Error { subtype, message } => {
            insert_opt(&mut obj, field::SUBTYPE, subtype.as_deref());
            insert_opt(&mut obj, field::MESSAGE, message.as_deref());
        }
        Notification::Directories(value) => {
            obj.insert(field::DIRECTORIES.into(), value.clone());
        }
        Notification::Files(value) => {
            obj.insert(field::FILES.into(), value.clone());
        }
        Notification::File(value) => {
            obj.insert(field::FILE.into(), value.clone());
        }
        Notification::Other { .. } => {}
    }

    Value::Object(obj).to_string()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_object(text: &str) -> Result<Map<String, Value>, CodecError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(obj) => Ok(obj),
        _ => Err(CodecError::NotAnObject),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn required_string(
    obj: &Map<String, Value>,
    event: EventKind,
    key: &'static str,
) -> Result<String, CodecError> {
    string_field(obj, key).ok_or(CodecError::InvalidField { event, field: key })
}

fn required_modules(obj: &Map<String, Value>, event: EventKind) -> Result<Vec<String>, CodecError> {
    let invalid = CodecError::InvalidField {
        event,
        field: field::MODULES,
    };
    let items = obj
        .get(field::MODULES)
        .and_then(Value::as_array)
        .ok_or_else(|| invalid.clone())?;
    items
        .iter()
        .map(|item| item.as_str().map(str::to_owned).ok_or_else(|| invalid.clone()))
        .collect()
}

/// Backends occasionally put a structured value in `message`; keep its JSON
/// text rather than dropping it.
fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn insert_opt(obj: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        obj.insert(key.into(), value.into());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_json(text: &str) -> Value {
        serde_json::from_str(text).expect("encoder must emit valid JSON")
    }

    // ── encode_command ───────────────────────────────────────────────────────

    #[test]
    fn test_encode_get_data_carries_event_key_id_and_modules() {
        let cmd = Command::GetData {
            modules: vec!["battery".into(), "display".into()],
        };

        let value = as_json(&encode_command(&cmd, "abc", Some("req-1")));

        assert_eq!(
            value,
            json!({
                "event": "get-data",
                "api-key": "abc",
                "id": "req-1",
                "modules": ["battery", "display"],
            })
        );
    }

    #[test]
    fn test_encode_get_files_without_path_omits_the_key() {
        let cmd = Command::GetFiles {
            base: "documents".into(),
            path: None,
        };

        let value = as_json(&encode_command(&cmd, "k", None));
        let obj = value.as_object().expect("object");

        assert_eq!(obj.get("base"), Some(&json!("documents")));
        assert!(!obj.contains_key("path"), "absent path must be omitted, not null");
        assert!(!obj.contains_key("id"), "absent id must be omitted, not null");
    }

    #[test]
    fn test_encode_open_url_uses_url_field() {
        let cmd = Command::Open(OpenTarget::Url("https://example.com".into()));

        let value = as_json(&encode_command(&cmd, "k", None));

        assert_eq!(value["event"], "open");
        assert_eq!(value["url"], "https://example.com");
        assert!(value.get("path").is_none());
    }

    #[test]
    fn test_encode_exit_application_has_only_envelope_fields() {
        let value = as_json(&encode_command(&Command::ExitApplication, "k", Some("1")));

        assert_eq!(value.as_object().map(Map::len), Some(3));
    }

    // ── decode_command ───────────────────────────────────────────────────────

    #[test]
    fn test_decode_command_rejects_inbound_kind() {
        let err = decode_command(r#"{"event":"data-update","api-key":"k"}"#).unwrap_err();
        assert_eq!(err, CodecError::NotACommand(EventKind::DataUpdate));
    }

    #[test]
    fn test_decode_command_requires_api_key() {
        let err = decode_command(r#"{"event":"get-directories"}"#).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidField {
                event: EventKind::GetDirectories,
                field: "api-key",
            }
        );
    }

    #[test]
    fn test_decode_command_rejects_non_string_module() {
        let err = decode_command(r#"{"event":"get-data","api-key":"k","modules":["battery",3]}"#)
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidField { field: "modules", .. }));
    }

    #[test]
    fn test_decode_command_unknown_event() {
        let err = decode_command(r#"{"event":"reboot","api-key":"k"}"#).unwrap_err();
        assert_eq!(err, CodecError::UnknownEvent("reboot".into()));
    }

    // ── decode_inbound ───────────────────────────────────────────────────────

    #[test]
    fn test_decode_inbound_data_update() {
        let env = decode_inbound(
            r#"{"type":"data-update","id":"7","module":"battery","data":{"percentage":87.5}}"#,
        )
        .expect("decode");

        assert_eq!(env.id.as_deref(), Some("7"));
        assert_eq!(
            env.notification,
            Notification::DataUpdate {
                module: Some("battery".into()),
                data: Some(json!({"percentage": 87.5})),
            }
        );
    }

    #[test]
    fn test_decode_inbound_null_data_becomes_none() {
        let env = decode_inbound(r#"{"type":"data-update","module":"battery","data":null}"#)
            .expect("decode");
        assert!(matches!(env.notification, Notification::DataUpdate { data: None, .. }));
    }

    #[test]
    fn test_decode_inbound_files_extracts_nested_field() {
        let env = decode_inbound(r#"{"type":"files","files":{"files":[],"path":"Reports"}}"#)
            .expect("decode");
        assert_eq!(
            env.notification,
            Notification::Files(json!({"files": [], "path": "Reports"}))
        );
    }

    #[test]
    fn test_decode_inbound_unknown_type_is_other() {
        let env = decode_inbound(r#"{"type":"application-update"}"#).expect("decode");
        assert_eq!(
            env.notification,
            Notification::Other {
                kind: "application-update".into()
            }
        );
    }

    #[test]
    fn test_decode_inbound_structured_message_is_kept_as_json_text() {
        let env = decode_inbound(r#"{"type":"error","message":{"path":"x"}}"#).expect("decode");
        assert_eq!(
            env.notification,
            Notification::Error {
                subtype: None,
                message: Some(r#"{"path":"x"}"#.into()),
            }
        );
    }

    #[test]
    fn test_decode_inbound_rejects_non_object() {
        assert_eq!(decode_inbound("[1,2]").unwrap_err(), CodecError::NotAnObject);
        assert_eq!(decode_inbound("\"text\"").unwrap_err(), CodecError::NotAnObject);
    }

    #[test]
    fn test_decode_inbound_rejects_missing_or_non_string_type() {
        assert_eq!(
            decode_inbound(r#"{"module":"battery"}"#).unwrap_err(),
            CodecError::MissingDiscriminator("type")
        );
        assert_eq!(
            decode_inbound(r#"{"type":5}"#).unwrap_err(),
            CodecError::MissingDiscriminator("type")
        );
    }

    #[test]
    fn test_decode_inbound_rejects_invalid_json() {
        assert!(matches!(
            decode_inbound("{not json").unwrap_err(),
            CodecError::InvalidJson(_)
        ));
    }

    // ── encode_inbound ───────────────────────────────────────────────────────

    #[test]
    fn test_encode_inbound_error_omits_absent_subtype() {
        let env = InboundEnvelope::new(Notification::Error {
            subtype: None,
            message: Some("oops".into()),
        });

        let value = as_json(&encode_inbound(&env));

        assert_eq!(value, json!({"type": "error", "message": "oops"}));
    }
}
