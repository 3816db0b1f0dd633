//! Audit vocabulary, detail redaction and activity descriptions.
//!
//! This module lives in `core` (zero IO) so both the repository layer and the
//! API recorder agree on action names and resource types.

use chrono::Duration;

// ---------------------------------------------------------------------------
// Action constants
// ---------------------------------------------------------------------------

/// Known `action` values for audit log entries.
pub mod actions {
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
    pub const VIEW: &str = "view";
    pub const VIEW_STATISTICS: &str = "view_statistics";
    pub const CREATE_MEETING: &str = "create_meeting";
    pub const UPDATE_MEETING: &str = "update_meeting";
    pub const DELETE_MEETING: &str = "delete_meeting";
    pub const UPLOAD_REPORT: &str = "upload_report";
    pub const UPLOAD_MEETING_FILES: &str = "upload_multiple_reports";
    pub const CREATE_AGENDA: &str = "create_agenda";
    pub const UPDATE_AGENDA: &str = "update_agenda";
    pub const DELETE_AGENDA: &str = "delete_agenda";
    pub const DELETE_FILE: &str = "delete_file";
    pub const BULK_DELETE_MEETINGS: &str = "bulk_delete_meetings";
    pub const BULK_DELETE_AGENDAS: &str = "bulk_soft_delete_agendas";
}

/// Known `resource_type` values for audit log entries.
pub mod resources {
    pub const MEETING: &str = "meeting_reports";
    pub const AGENDA: &str = "meeting_agendas";
    pub const MANAGEMENT: &str = "management";
    pub const MEETING_REPORT: &str = "meeting_report";
    pub const MEETING_FILE: &str = "meeting_file";
    pub const AGENDA_FILE: &str = "agenda_file";
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Keys whose values never reach the audit table.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "authorization",
    "credential",
];

/// Replace the value of any key containing a [`SENSITIVE_FIELDS`] entry with
/// `"[REDACTED]"`, recursing into nested objects and arrays.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Activity feed helpers
// ---------------------------------------------------------------------------

/// Thai description of an action for the recent-activity feed.
///
/// Unknown actions are returned unchanged.
pub fn describe_action(action: &str) -> &str {
    match action {
        actions::LOGIN => "เข้าสู่ระบบ",
        actions::LOGOUT => "ออกจากระบบ",
        actions::VIEW => "ดูข้อมูล",
        actions::VIEW_STATISTICS => "ดูสถิติระบบ",
        actions::CREATE_MEETING => "สร้างการประชุม",
        actions::UPDATE_MEETING => "แก้ไขการประชุม",
        actions::DELETE_MEETING => "ลบการประชุม",
        actions::UPLOAD_REPORT => "อัพโหลดรายงาน",
        actions::UPLOAD_MEETING_FILES => "อัพโหลดไฟล์การประชุม",
        actions::CREATE_AGENDA => "สร้างวาระ",
        actions::UPDATE_AGENDA => "แก้ไขวาระ",
        actions::DELETE_AGENDA => "ลบวาระ",
        actions::DELETE_FILE => "ลบไฟล์",
        actions::BULK_DELETE_MEETINGS => "ลบการประชุมหลายรายการ",
        actions::BULK_DELETE_AGENDAS => "ลบวาระหลายรายการ",
        other => other,
    }
}

/// Relative Thai time label ("5 นาทีที่แล้ว") for an elapsed duration.
///
/// Uses the largest unit the elapsed time strictly exceeds; negative
/// durations (clock skew) read as zero seconds.
pub fn time_ago(elapsed: Duration) -> String {
    let seconds = elapsed.num_seconds().max(0);

    const UNITS: &[(i64, &str)] = &[
        (31_536_000, "ปี"),
        (2_592_000, "เดือน"),
        (86_400, "วัน"),
        (3_600, "ชั่วโมง"),
        (60, "นาที"),
    ];

    for &(unit_secs, label) in UNITS {
        if seconds > unit_secs {
            return format!("{} {label}ที่แล้ว", seconds / unit_secs);
        }
    }
    format!("{seconds} วินาทีที่แล้ว")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_sensitive_top_level_keys() {
        let detail = json!({ "password": "hunter2", "meeting_number": "1/2568" });
        let redacted = redact_sensitive_fields(&detail);
        assert_eq!(redacted["password"], "[REDACTED]");
        assert_eq!(redacted["meeting_number"], "1/2568");
    }

    #[test]
    fn redacts_nested_and_case_insensitive_keys() {
        let detail = json!({ "outer": { "AccessToken": "abc" }, "list": [{ "secret_key": 1 }] });
        let redacted = redact_sensitive_fields(&detail);
        assert_eq!(redacted["outer"]["AccessToken"], "[REDACTED]");
        assert_eq!(redacted["list"][0]["secret_key"], "[REDACTED]");
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(redact_sensitive_fields(&json!(3)), json!(3));
        assert_eq!(redact_sensitive_fields(&json!(null)), json!(null));
    }

    #[test]
    fn known_actions_have_descriptions() {
        assert_eq!(describe_action(actions::LOGIN), "เข้าสู่ระบบ");
        assert_eq!(describe_action(actions::DELETE_AGENDA), "ลบวาระ");
    }

    #[test]
    fn unknown_action_is_echoed() {
        assert_eq!(describe_action("reindex"), "reindex");
    }

    #[test]
    fn time_ago_picks_largest_exceeded_unit() {
        assert_eq!(time_ago(Duration::seconds(30)), "30 วินาทีที่แล้ว");
        assert_eq!(time_ago(Duration::seconds(60)), "60 วินาทีที่แล้ว");
        assert_eq!(time_ago(Duration::minutes(5)), "5 นาทีที่แล้ว");
        assert_eq!(time_ago(Duration::hours(3)), "3 ชั่วโมงที่แล้ว");
        assert_eq!(time_ago(Duration::days(2)), "2 วันที่แล้ว");
        assert_eq!(time_ago(Duration::days(400)), "1 ปีที่แล้ว");
    }

    #[test]
    fn time_ago_clamps_negative_durations() {
        assert_eq!(time_ago(Duration::seconds(-10)), "0 วินาทีที่แล้ว");
    }
}
