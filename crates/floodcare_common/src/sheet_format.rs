//! Spreadsheet wire format
//!
//! The sheet receives a flat row per report and hands back report-shaped
//! objects whose fields may have been mangled by the spreadsheet (numbers
//! for ids, strings for booleans, dates in whatever format the cell holds).
//! Parsing here is deliberately lenient; a record is dropped only when it
//! has no id.

use crate::types::{Category, Coordinates, Report, RiskLevel};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Offset of the school's local time (Asia/Bangkok, no DST)
const LOCAL_OFFSET_SECS: i32 = 7 * 3600;

/// Thai solar calendar year = Gregorian year + 543
const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Placeholder for empty optional cells
pub const EMPTY_CELL: &str = "-";

/// Flat projection of a report, as appended to the sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRow {
    pub timestamp: String,
    pub id: String,
    pub name: String,
    pub phone: String,
    pub dorm: String,
    pub category: String,
    pub risk: String,
    pub message: String,
    pub location: String,
    pub status: String,
}

impl SheetRow {
    /// Build the row; `submitted_at` is the time of the push, not of creation
    pub fn from_report(report: &Report, submitted_at: DateTime<Utc>) -> Self {
        Self {
            timestamp: format_thai_timestamp(submitted_at),
            id: report.id.clone(),
            name: report.student_name.clone(),
            phone: report
                .phone_number
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| EMPTY_CELL.to_string()),
            dorm: report.dormitory.clone(),
            category: report.category.to_string(),
            risk: report.risk_level.to_string(),
            message: report.message.clone(),
            location: report
                .location
                .map(|c| c.to_sheet_string())
                .unwrap_or_else(|| EMPTY_CELL.to_string()),
            status: status_label(report.is_resolved).to_string(),
        }
    }
}

pub fn status_label(resolved: bool) -> &'static str {
    if resolved {
        "Solved"
    } else {
        "Pending"
    }
}

fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(LOCAL_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// `d/m/YYYY HH:MM:SS` in school-local time with the Buddhist-era year
pub fn format_thai_timestamp(ts: DateTime<Utc>) -> String {
    let local = ts.with_timezone(&local_offset());
    format!(
        "{}/{}/{} {}",
        local.day(),
        local.month(),
        local.year() + BUDDHIST_ERA_OFFSET,
        local.format("%H:%M:%S")
    )
}

/// Naive date-time formats a sheet cell may hold, read as school-local time
const LOCAL_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn from_school_local(naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
    local_offset()
        .from_local_datetime(naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_local_naive(s: &str) -> Option<DateTime<Utc>> {
    if let Some(naive) = LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return from_school_local(&naive);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    from_school_local(&date.and_hms_opt(0, 0, 0)?)
}

/// Inverse of [`format_thai_timestamp`]
pub fn parse_thai_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let (date, time) = s.trim().split_once(' ')?;
    let mut parts = date.split('/');
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let year: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let gregorian = if year > 2400 { year - BUDDHIST_ERA_OFFSET } else { year };
    let naive = NaiveDateTime::parse_from_str(
        &format!("{:04}-{:02}-{:02} {}", gregorian, month, day, time.trim()),
        "%Y-%m-%d %H:%M:%S",
    )
    .ok()?;
    from_school_local(&naive)
}

/// Coerce a timestamp cell; `None` when absent or unrecognised
pub fn parse_timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Some(dt) = parse_local_naive(s) {
                return Some(dt);
            }
            if let Ok(ms) = s.parse::<i64>() {
                return Utc.timestamp_millis_opt(ms).single();
            }
            parse_thai_timestamp(s)
        }
        _ => None,
    }
}

fn string_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn resolved_field(obj: &serde_json::Map<String, Value>) -> bool {
    match obj.get("isResolved").or_else(|| obj.get("status")) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "solved" | "resolved")
        }
        _ => false,
    }
}

fn location_field(obj: &serde_json::Map<String, Value>) -> Option<Coordinates> {
    match obj.get("location")? {
        Value::String(s) => Coordinates::parse_pair(s),
        other => serde_json::from_value::<Coordinates>(other.clone()).ok(),
    }
}

/// Turn one fetched record into a report
///
/// `now` is used when the timestamp cell is absent or malformed.
pub fn report_from_value(value: &Value, now: DateTime<Utc>) -> Option<Report> {
    let obj = value.as_object()?;

    let id = string_field(obj, &["id"]).filter(|id| !id.trim().is_empty());
    let Some(id) = id else {
        debug!("Skipping sheet record without id");
        return None;
    };

    let phone_number = string_field(obj, &["phoneNumber", "phone"])
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty() && p != EMPTY_CELL);

    let category = string_field(obj, &["category"])
        .and_then(|c| c.parse::<Category>().ok())
        .unwrap_or(Category::Other);

    let risk_level = string_field(obj, &["riskLevel", "risk"])
        .and_then(|r| r.parse::<RiskLevel>().ok())
        .unwrap_or(RiskLevel::Medium);

    let timestamp = obj
        .get("timestamp")
        .and_then(parse_timestamp_value)
        .unwrap_or(now);

    Some(Report {
        id,
        student_name: string_field(obj, &["studentName", "name"]).unwrap_or_default(),
        phone_number,
        dormitory: string_field(obj, &["dormitory", "dorm"]).unwrap_or_default(),
        timestamp,
        location: location_field(obj),
        message: string_field(obj, &["message"]).unwrap_or_default(),
        category,
        risk_level,
        image_url: string_field(obj, &["imageUrl"]).filter(|u| !u.is_empty()),
        is_resolved: resolved_field(obj),
    })
}

/// Parse a fetched body (oldest-first) into reports, newest-first
pub fn parse_sheet_reports(body: &Value, now: DateTime<Utc>) -> Option<Vec<Report>> {
    let records = body.as_array()?;
    let mut reports: Vec<Report> = records
        .iter()
        .filter_map(|v| report_from_value(v, now))
        .collect();
    reports.reverse();
    Some(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 28, 3, 0, 0).unwrap()
    }

    #[test]
    fn test_thai_timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2025, 11, 28, 2, 5, 9).unwrap();
        assert_eq!(format_thai_timestamp(ts), "28/11/2568 09:05:09");
        assert_eq!(parse_thai_timestamp("28/11/2568 09:05:09"), Some(ts));
        assert_eq!(parse_thai_timestamp("28/11/2025 09:05:09"), Some(ts));
        assert_eq!(parse_thai_timestamp("yesterday"), None);
    }

    #[test]
    fn test_sheet_row_projection() {
        let report = Report {
            id: "1764298800000".into(),
            student_name: "Somchai".into(),
            phone_number: None,
            dormitory: "หอ 3".into(),
            timestamp: now(),
            location: Some(Coordinates::new(6.87, 101.25)),
            message: "ไฟดับ".into(),
            category: Category::Other,
            risk_level: RiskLevel::High,
            image_url: None,
            is_resolved: false,
        };
        let row = SheetRow::from_report(&report, now());
        assert_eq!(row.phone, "-");
        assert_eq!(row.location, "6.87, 101.25");
        assert_eq!(row.risk, "DANGER");
        assert_eq!(row.category, "OTHER");
        assert_eq!(row.status, "Pending");
        assert_eq!(row.timestamp, "28/11/2568 10:00:00");

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["dorm"], "หอ 3");
        assert_eq!(json["name"], "Somchai");
    }

    #[test]
    fn test_lenient_record() {
        let value = json!({
            "id": 1764298800000u64,
            "studentName": "Aisha",
            "phoneNumber": "0812345678",
            "dormitory": "หอ 8",
            "timestamp": "2025-11-28T02:00:00.000Z",
            "message": "หมดสติ",
            "category": "EVACUATION",
            "riskLevel": "CRITICAL",
            "location": "6.8694, 101.2503",
            "isResolved": "Solved"
        });
        let report = report_from_value(&value, now()).unwrap();
        assert_eq!(report.id, "1764298800000");
        assert_eq!(report.risk_level, RiskLevel::Critical);
        assert_eq!(report.timestamp, Utc.with_ymd_and_hms(2025, 11, 28, 2, 0, 0).unwrap());
        assert_eq!(report.location, Some(Coordinates::new(6.8694, 101.2503)));
        assert!(report.is_resolved);
    }

    #[test]
    fn test_sheet_row_shaped_record() {
        let value = json!({
            "timestamp": "28/11/2568 09:05:09",
            "id": "42",
            "name": "Somchai",
            "phone": "-",
            "dorm": "หอ 1",
            "category": "FOOD",
            "risk": "DANGER",
            "message": "ไม่มีอาหาร",
            "location": "-",
            "status": "Pending"
        });
        let report = report_from_value(&value, now()).unwrap();
        assert_eq!(report.student_name, "Somchai");
        assert_eq!(report.phone_number, None);
        assert_eq!(report.location, None);
        assert_eq!(report.risk_level, RiskLevel::High);
        assert!(!report.is_resolved);
        assert_eq!(report.timestamp, Utc.with_ymd_and_hms(2025, 11, 28, 2, 5, 9).unwrap());
    }

    #[test]
    fn test_missing_or_bad_timestamp_defaults_to_now() {
        let missing = report_from_value(&json!({"id": "1"}), now()).unwrap();
        assert_eq!(missing.timestamp, now());
        let garbage = report_from_value(&json!({"id": "2", "timestamp": "soon"}), now()).unwrap();
        assert_eq!(garbage.timestamp, now());
        assert_eq!(garbage.category, Category::Other);
        assert_eq!(garbage.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_offsetless_timestamps_are_school_local() {
        let later = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let nine_am = Utc.with_ymd_and_hms(2025, 11, 28, 2, 0, 0).unwrap();

        for cell in ["2025-11-28T09:00:00", "2025-11-28T09:00:00.000", "2025-11-28 09:00:00"] {
            let report = report_from_value(&json!({"id": "1", "timestamp": cell}), later).unwrap();
            assert_eq!(report.timestamp, nine_am, "cell {}", cell);
        }

        let midnight = Utc.with_ymd_and_hms(2025, 11, 27, 17, 0, 0).unwrap();
        let date_only =
            report_from_value(&json!({"id": "2", "timestamp": "2025-11-28"}), later).unwrap();
        assert_eq!(date_only.timestamp, midnight);

        let fractional = parse_timestamp_value(&json!("2025-11-28T09:00:00.250")).unwrap();
        assert_eq!(fractional.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_records_without_id_are_dropped() {
        assert!(report_from_value(&json!({"studentName": "x"}), now()).is_none());
        assert!(report_from_value(&json!({"id": "  "}), now()).is_none());
        assert!(report_from_value(&json!("row"), now()).is_none());
    }

    #[test]
    fn test_parse_sheet_reports_newest_first() {
        let body = json!([{"id": "1"}, {"id": "2"}, {"nope": true}, {"id": "3"}]);
        let reports = parse_sheet_reports(&body, now()).unwrap();
        let ids: Vec<&str> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
        assert!(parse_sheet_reports(&json!({"error": "quota"}), now()).is_none());
    }
}
