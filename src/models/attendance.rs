use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{RecordId, UserSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInMethod {
    QrCode,
    Manual,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Simulated check-in. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub meeting_id: RecordId,
    pub user_id: RecordId,
    pub check_in_time: DateTime<Utc>,
    pub check_in_method: CheckInMethod,
    pub is_late: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub device_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub invited: usize,
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    /// Present / invited, 0.0 when nobody was invited.
    pub attendance_rate: f64,
}

impl AttendanceSummary {
    pub fn from_records(invited: usize, records: &[AttendanceRecord]) -> Self {
        let present = records.len();
        let late = records.iter().filter(|r| r.is_late).count();
        let attendance_rate = if invited == 0 {
            0.0
        } else {
            present as f64 / invited as f64
        };
        AttendanceSummary {
            invited,
            present,
            late,
            absent: invited.saturating_sub(present),
            attendance_rate,
        }
    }
}

/// One-off check-in ticket encoded into the meeting's QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrTicket {
    pub meeting_id: RecordId,
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// GET /api/meetings/{id}/attendance body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceReport {
    pub meeting_id: RecordId,
    pub records: Vec<AttendanceRecord>,
    pub summary: AttendanceSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(late: bool) -> AttendanceRecord {
        AttendanceRecord {
            id: "a".into(),
            meeting_id: "m".into(),
            user_id: "u".into(),
            check_in_time: Utc::now(),
            check_in_method: CheckInMethod::Manual,
            is_late: late,
            location: None,
            device_info: "test".into(),
            user: None,
        }
    }

    #[test]
    fn summary_counts() {
        let s = AttendanceSummary::from_records(4, &[record(false), record(true), record(false)]);
        assert_eq!((s.present, s.late, s.absent), (3, 1, 1));
        assert!((s.attendance_rate - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn nobody_invited() {
        let s = AttendanceSummary::from_records(0, &[]);
        assert_eq!(s.attendance_rate, 0.0);
    }

    #[test]
    fn method_wire_names() {
        assert_eq!(
            serde_json::to_value(CheckInMethod::QrCode).unwrap(),
            serde_json::json!("qr_code")
        );
    }
}
