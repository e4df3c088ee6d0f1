//! Notification shape detection

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Media extension the pipeline accepts, compared case-insensitively
pub const SUPPORTED_EXTENSION: &str = ".mp4";

/// Canonical reference to the object that triggered a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectReference {
    /// Bucket holding the object
    pub bucket: String,

    /// Object name, possibly with a path prefix
    pub name: String,
}

impl ObjectReference {
    /// Build a reference, rejecting empty components
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Option<Self> {
        let bucket = bucket.into();
        let name = name.into();
        if bucket.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self { bucket, name })
    }

    /// `gs://` URI understood by Speech-to-Text
    pub fn uri(&self) -> String {
        format!("gs://{}/{}", self.bucket, self.name)
    }
}

/// Resolve the object a notification refers to.
///
/// Shapes are tried in a fixed order and the first one present wins, even if
/// its fields turn out to be unusable:
///
/// 1. Pub/Sub push (`message.attributes.bucketId` / `objectId`)
/// 2. Direct Cloud Storage push (top-level `bucket` / `name`)
/// 3. CloudEvent structured mode (`data.bucket` / `data.name`)
///
/// Anything else yields `None`; unrelated payloads are expected and are not errors.
pub fn normalize(event: &Value) -> Option<ObjectReference> {
    let event = event.as_object()?;

    if let Some(attributes) = event
        .get("message")
        .and_then(Value::as_object)
        .and_then(|message| message.get("attributes"))
        .and_then(Value::as_object)
    {
        return reference_from(attributes, "bucketId", "objectId");
    }

    if event.contains_key("bucket") && event.contains_key("name") {
        return reference_from(event, "bucket", "name");
    }

    if let Some(data) = event.get("data").and_then(Value::as_object) {
        if data.contains_key("bucket") && data.contains_key("name") {
            return reference_from(data, "bucket", "name");
        }
    }

    None
}

fn reference_from(fields: &Map<String, Value>, bucket: &str, name: &str) -> Option<ObjectReference> {
    let bucket = fields.get(bucket)?.as_str()?;
    let name = fields.get(name)?.as_str()?;
    ObjectReference::new(bucket, name)
}

/// Whether an object name carries the supported media extension
pub fn is_supported_media(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(SUPPORTED_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expected() -> Option<ObjectReference> {
        ObjectReference::new("meetings", "2024/standup.mp4")
    }

    #[test]
    fn pubsub_push_uses_message_attributes() {
        let event = json!({
            "message": {
                "attributes": {
                    "bucketId": "meetings",
                    "objectId": "2024/standup.mp4",
                    "eventType": "OBJECT_FINALIZE"
                },
                "data": "e30="
            },
            "subscription": "projects/acme/subscriptions/minutes"
        });
        assert_eq!(normalize(&event), expected());
    }

    #[test]
    fn direct_push_uses_top_level_fields() {
        let event = json!({ "bucket": "meetings", "name": "2024/standup.mp4", "size": "1024" });
        assert_eq!(normalize(&event), expected());
    }

    #[test]
    fn cloudevent_uses_nested_data() {
        let event = json!({
            "specversion": "1.0",
            "type": "google.cloud.storage.object.v1.finalized",
            "data": { "bucket": "meetings", "name": "2024/standup.mp4" }
        });
        assert_eq!(normalize(&event), expected());
    }

    #[test]
    fn unknown_shapes_are_absent() {
        assert_eq!(normalize(&json!({})), None);
        assert_eq!(normalize(&json!({ "message": { "data": "e30=" } })), None);
        assert_eq!(normalize(&json!({ "data": { "bucket": "meetings" } })), None);
        assert_eq!(normalize(&json!(["meetings", "standup.mp4"])), None);
        assert_eq!(normalize(&json!("gs://meetings/standup.mp4")), None);
    }

    #[test]
    fn matched_shape_with_unusable_fields_does_not_fall_through() {
        let event = json!({
            "message": { "attributes": { "bucketId": "meetings" } },
            "bucket": "meetings",
            "name": "2024/standup.mp4"
        });
        assert_eq!(normalize(&event), None);

        let event = json!({ "bucket": "", "name": "standup.mp4" });
        assert_eq!(normalize(&event), None);

        let event = json!({ "bucket": "meetings", "name": 42 });
        assert_eq!(normalize(&event), None);
    }

    #[test]
    fn pubsub_shape_takes_priority() {
        let event = json!({
            "message": { "attributes": { "bucketId": "meetings", "objectId": "2024/standup.mp4" } },
            "data": { "bucket": "other", "name": "other.mp4" }
        });
        assert_eq!(normalize(&event), expected());
    }

    #[test]
    fn supported_media_is_case_insensitive() {
        assert!(is_supported_media("standup.mp4"));
        assert!(is_supported_media("2024/Standup.MP4"));
        assert!(!is_supported_media("standup.pdf"));
        assert!(!is_supported_media("standup.mp4.pdf"));
        assert!(!is_supported_media("mp4"));
    }

    #[test]
    fn uri_uses_gs_scheme() {
        assert_eq!(expected().unwrap().uri(), "gs://meetings/2024/standup.mp4");
    }
}
