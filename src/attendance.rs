//! Mock attendance: simulated check-ins for a meeting and the QR ticket that
//! a real check-in flow would scan.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use qrcode::QrCode;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::models::{
    AttendanceRecord, CheckInMethod, GeoPoint, InviteStatus, Meeting, MeetingType, QrTicket,
    new_id,
};

/// Check-ins later than this after the start count as late.
pub const LATE_GRACE_MINUTES: i64 = 10;
pub const TICKET_TTL_MINUTES: i64 = 15;
const PRESENT_PROBABILITY: f64 = 0.85;
/// Monas, Jakarta. Onsite check-ins scatter around it.
const OFFICE: GeoPoint = GeoPoint {
    latitude: -6.1754,
    longitude: 106.8272,
};
const DEVICES: [&str; 5] = [
    "Android 14 / Chrome",
    "iOS 17 / Safari",
    "Windows 11 / Edge",
    "macOS 14 / Chrome",
    "Android 13 / Samsung Internet",
];

pub fn is_late(meeting_start: DateTime<Utc>, check_in: DateTime<Utc>) -> bool {
    check_in > meeting_start + Duration::minutes(LATE_GRACE_MINUTES)
}

/// Pseudo-random check-ins for the meeting's participants as of `now`.
/// Declined invitees never show up; nobody has checked in before the
/// meeting starts. Deterministic for a seeded `rng`.
pub fn simulate<R: Rng + ?Sized>(
    meeting: &Meeting,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<AttendanceRecord> {
    if meeting.date_time > now {
        return Vec::new();
    }

    let mut records = Vec::new();
    for participant in &meeting.participants {
        if participant.status == InviteStatus::Declined || !rng.random_bool(PRESENT_PROBABILITY) {
            continue;
        }

        let offset = Duration::minutes(rng.random_range(-15..=25));
        let check_in_time = (meeting.date_time + offset).min(now);

        let check_in_method = match meeting.meeting_type {
            MeetingType::Virtual => CheckInMethod::Auto,
            _ => *[CheckInMethod::QrCode, CheckInMethod::QrCode, CheckInMethod::Manual]
                .choose(rng)
                .unwrap_or(&CheckInMethod::Manual),
        };

        let location = (check_in_method == CheckInMethod::QrCode).then(|| GeoPoint {
            latitude: OFFICE.latitude + rng.random_range(-0.001..0.001),
            longitude: OFFICE.longitude + rng.random_range(-0.001..0.001),
        });

        records.push(AttendanceRecord {
            id: new_id(),
            meeting_id: meeting.id.clone(),
            user_id: participant.user_id.clone(),
            check_in_time,
            check_in_method,
            is_late: is_late(meeting.date_time, check_in_time),
            location,
            device_info: DEVICES.choose(rng).copied().unwrap_or("Unknown").to_string(),
            user: participant.user.clone(),
        });
    }
    records
}

pub fn issue_ticket<R: Rng + ?Sized>(meeting_id: &str, rng: &mut R, now: DateTime<Utc>) -> QrTicket {
    let bytes: [u8; 16] = rng.random();
    QrTicket {
        meeting_id: meeting_id.to_string(),
        token: hex::encode(bytes),
        issued_at: now,
        expires_at: now + Duration::minutes(TICKET_TTL_MINUTES),
    }
}

#[derive(Debug)]
pub enum QrError {
    Encode(qrcode::types::QrError),
    Png(png::EncodingError),
    Payload(serde_json::Error),
}

impl fmt::Display for QrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QrError::Encode(e) => write!(f, "QR encoding error: {e}"),
            QrError::Png(e) => write!(f, "PNG encoding error: {e}"),
            QrError::Payload(e) => write!(f, "QR payload error: {e}"),
        }
    }
}

impl std::error::Error for QrError {}

impl From<qrcode::types::QrError> for QrError {
    fn from(e: qrcode::types::QrError) -> Self {
        QrError::Encode(e)
    }
}

impl From<png::EncodingError> for QrError {
    fn from(e: png::EncodingError) -> Self {
        QrError::Png(e)
    }
}

/// Grayscale PNG of `data`, each module scaled to fill roughly `size` pixels.
pub fn qr_png(data: &str, size: u32) -> Result<Vec<u8>, QrError> {
    let code = QrCode::new(data.as_bytes())?;
    let matrix = code.to_colors();
    let qr_width = code.width();

    let scale = (size as usize / qr_width).max(1);
    let actual_size = qr_width * scale;

    let mut pixels: Vec<u8> = Vec::with_capacity(actual_size * actual_size);
    for y in 0..actual_size {
        for x in 0..actual_size {
            let idx = (y / scale) * qr_width + (x / scale);
            let is_dark = matrix
                .get(idx)
                .is_some_and(|c| *c == qrcode::Color::Dark);
            pixels.push(if is_dark { 0 } else { 255 });
        }
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, actual_size as u32, actual_size as u32);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&pixels)?;
    }
    Ok(out)
}

/// PNG of the ticket's JSON payload.
pub fn ticket_png(ticket: &QrTicket, size: u32) -> Result<Vec<u8>, QrError> {
    let payload = serde_json::to_string(ticket).map_err(QrError::Payload)?;
    qr_png(&payload, size)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::models::Participant;

    fn meeting(start: DateTime<Utc>, kind: MeetingType) -> Meeting {
        Meeting {
            id: "m1".into(),
            title: "Rapat".into(),
            description: String::new(),
            date_time: start,
            duration: 60,
            status: Default::default(),
            location: String::new(),
            meeting_type: kind,
            meeting_link: None,
            agenda: vec![],
            created_by: "u1".into(),
            participants: (1..=20)
                .map(|i| Participant::invited(format!("u{i}")))
                .collect(),
            created_at: start,
            updated_at: start,
            creator: None,
        }
    }

    #[test]
    fn grace_period() {
        let start = Utc::now();
        assert!(!is_late(start, start + Duration::minutes(10)));
        assert!(is_late(start, start + Duration::minutes(11)));
    }

    #[test]
    fn seeded_runs_repeat() {
        let now = Utc::now();
        let m = meeting(now - Duration::hours(1), MeetingType::Onsite);
        let a = simulate(&m, &mut StdRng::seed_from_u64(7), now);
        let b = simulate(&m, &mut StdRng::seed_from_u64(7), now);
        let key = |r: &AttendanceRecord| (r.user_id.clone(), r.check_in_time, r.is_late);
        assert_eq!(a.iter().map(key).collect::<Vec<_>>(), b.iter().map(key).collect::<Vec<_>>());
        assert!(!a.is_empty());
        for r in &a {
            assert_eq!(r.is_late, is_late(m.date_time, r.check_in_time));
            assert_eq!(r.location.is_some(), r.check_in_method == CheckInMethod::QrCode);
        }
    }

    #[test]
    fn future_meeting_has_no_checkins() {
        let now = Utc::now();
        let m = meeting(now + Duration::hours(1), MeetingType::Onsite);
        assert!(simulate(&m, &mut StdRng::seed_from_u64(1), now).is_empty());
    }

    #[test]
    fn declined_never_present_and_virtual_is_auto() {
        let now = Utc::now();
        let mut m = meeting(now - Duration::hours(1), MeetingType::Virtual);
        for p in &mut m.participants {
            p.status = InviteStatus::Declined;
        }
        m.participants[0].status = InviteStatus::Accepted;
        let records = simulate(&m, &mut StdRng::seed_from_u64(3), now);
        assert!(records.len() <= 1);
        assert!(records.iter().all(|r| r.check_in_method == CheckInMethod::Auto));
    }

    #[test]
    fn ticket_token_is_hex() {
        let now = Utc::now();
        let t = issue_ticket("m1", &mut StdRng::seed_from_u64(9), now);
        assert_eq!(t.token.len(), 32);
        assert!(t.token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(t.expires_at - t.issued_at, Duration::minutes(TICKET_TTL_MINUTES));
    }

    #[test]
    fn png_signature() {
        let png = qr_png("rapat:m1", 200).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
