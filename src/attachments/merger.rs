use crate::attachments::error::MergeError;
use crate::attachments::model::UpdatePayload;
use crate::db::model::{Attachment, Child};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

const KEY_TIME_FORMAT: &str = "%Y-%m-%dT%H%M%S";

pub const PHOTO_FIELD: &str = "photo";

/// `photo` at 2010-01-17 14:05:32 becomes `photo-2010-01-17T140532`.
pub fn attachment_key(field: &str, now: DateTime<Utc>) -> String {
    format!("{field}-{}", now.format(KEY_TIME_FORMAT))
}

/// Applies an update payload to a child in place.
///
/// Scalar fields overwrite, fields missing from the payload stay as they
/// were. Each upload with data is appended under a fresh timestamped key;
/// existing attachments are never removed or replaced. An upload whose key
/// the child already holds (a second upload in the same second) fails the
/// whole merge and leaves the child untouched. Returns the number of
/// attachments written.
pub fn merge(
    child: &mut Child,
    payload: UpdatePayload,
    now: DateTime<Utc>,
) -> Result<usize, MergeError> {
    if let Some(key) = payload
        .uploads
        .iter()
        .filter(|upload| upload.has_data())
        .map(|upload| attachment_key(&upload.field, now))
        .find(|key| child.attachments.contains_key(key))
    {
        return Err(MergeError::AttachmentExists { key });
    }

    for (name, value) in payload.fields {
        child.fields.insert(name, value);
    }

    let mut written = 0;
    for upload in payload.uploads {
        if !upload.has_data() {
            debug!(id = %child.id, field = %upload.field, "empty upload ignored");
            continue;
        }

        let key = attachment_key(&upload.field, now);
        let attachment = Attachment {
            content_type: upload.content_type_or_default(),
            data: upload.data,
        };
        if child.attachments.insert(key.clone(), attachment).is_some() {
            warn!(id = %child.id, %key, "same key twice in one payload, keeping the last upload");
        } else {
            written += 1;
        }

        if upload.field == PHOTO_FIELD {
            child.current_photo_key = Some(key);
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::model::FieldValue;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2010, 1, 17, h, m, s).unwrap()
    }

    fn child_with_photo() -> Child {
        let mut child = Child::new("1").with_field("last_known_location", "London");
        merge(
            &mut child,
            UpdatePayload::default().with_upload("photo", "image/jpeg", b"first"),
            at(9, 0, 0),
        )
        .unwrap();
        child
    }

    #[test]
    fn key_is_field_name_and_compact_timestamp() {
        assert_eq!(attachment_key("photo", at(14, 5, 32)), "photo-2010-01-17T140532");
    }

    #[test]
    fn photo_update_appends_and_keeps_prior_keys() {
        let mut child = child_with_photo();
        let before: Vec<String> = child.attachments.keys().cloned().collect();

        let payload = UpdatePayload::default()
            .with_field("last_known_location", "Manchester")
            .with_upload("photo", "image/jpeg", b"jeff");
        assert_eq!(merge(&mut child, payload, at(14, 5, 32)).unwrap(), 1);

        assert_eq!(child.attachments.len(), before.len() + 1);
        for key in &before {
            assert!(child.attachments.contains_key(key));
        }
        assert_eq!(child.attachments["photo-2010-01-17T140532"].data, b"jeff".to_vec());
        assert_eq!(child.current_photo_key.as_deref(), Some("photo-2010-01-17T140532"));
        assert_eq!(child.field_text("last_known_location"), "Manchester");
    }

    #[test]
    fn scalar_only_update_leaves_attachments_alone() {
        let mut child = child_with_photo();
        let payload = UpdatePayload::default()
            .with_field("last_known_location", "Manchester")
            .with_field("age", "7");
        assert_eq!(merge(&mut child, payload, at(14, 5, 32)).unwrap(), 0);

        assert_eq!(child.attachments.len(), 1);
        assert_eq!(child.field("age"), Some(&FieldValue::from("7")));
    }

    #[test]
    fn untouched_fields_survive() {
        let mut child = child_with_photo().with_field("name", "Dave");
        merge(
            &mut child,
            UpdatePayload::default().with_field("age", 7),
            at(10, 0, 0),
        )
        .unwrap();
        assert_eq!(child.name(), "Dave");
        assert_eq!(child.field_text("last_known_location"), "London");
    }

    #[test]
    fn different_seconds_give_distinct_keys() {
        let mut child = child_with_photo();
        merge(
            &mut child,
            UpdatePayload::default().with_upload("photo", "image/jpeg", b"a"),
            at(14, 5, 32),
        )
        .unwrap();
        merge(
            &mut child,
            UpdatePayload::default().with_upload("photo", "image/jpeg", b"b"),
            at(14, 5, 33),
        )
        .unwrap();
        assert_eq!(child.attachments.len(), 3);
        assert_eq!(child.current_photo_key.as_deref(), Some("photo-2010-01-17T140533"));
    }

    #[test]
    fn empty_upload_counts_as_not_updated() {
        let mut child = child_with_photo();
        let payload = UpdatePayload::default().with_upload("photo", "image/jpeg", b"");
        assert_eq!(merge(&mut child, payload, at(14, 5, 32)).unwrap(), 0);
        assert_eq!(child.attachments.len(), 1);
        assert_eq!(child.current_photo_key.as_deref(), Some("photo-2010-01-17T090000"));
    }

    #[test]
    fn same_key_in_one_payload_keeps_last() {
        let mut child = Child::new("1");
        let payload = UpdatePayload::default()
            .with_upload("photo", "image/jpeg", b"one")
            .with_upload("photo", "image/png", b"two");
        assert_eq!(merge(&mut child, payload, at(14, 5, 32)).unwrap(), 1);

        let stored = &child.attachments["photo-2010-01-17T140532"];
        assert_eq!(stored.data, b"two".to_vec());
        assert_eq!(stored.content_type, "image/png");
    }

    #[test]
    fn second_upload_in_the_same_second_is_rejected() {
        let mut child = child_with_photo();
        let payload = UpdatePayload::default()
            .with_field("last_known_location", "Manchester")
            .with_upload("photo", "image/jpeg", b"second");

        let err = merge(&mut child, payload, at(9, 0, 0)).unwrap_err();
        assert_eq!(
            err,
            MergeError::AttachmentExists {
                key: "photo-2010-01-17T090000".to_string()
            }
        );
        assert_eq!(child.attachments["photo-2010-01-17T090000"].data, b"first".to_vec());
        assert_eq!(child.field_text("last_known_location"), "London");
    }

    #[test]
    fn non_photo_uploads_do_not_move_current_photo() {
        let mut child = child_with_photo();
        merge(
            &mut child,
            UpdatePayload::default().with_upload("recording", "audio/amr", b"..."),
            at(14, 5, 32),
        )
        .unwrap();
        assert!(child.attachments.contains_key("recording-2010-01-17T140532"));
        assert_eq!(child.current_photo_key.as_deref(), Some("photo-2010-01-17T090000"));
    }
}
