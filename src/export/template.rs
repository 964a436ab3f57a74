use askama::Template;
use chrono::{DateTime, Datelike, Duration, FixedOffset, Utc};

use super::ExportGraph;
use crate::models::{ActionPriority, ActionStatus, MeetingType, UserSummary};

const HARI: [&str; 7] = ["Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu", "Minggu"];
const BULAN: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
    "Oktober", "November", "Desember",
];

/// Dates in the document are shown in Western Indonesian Time (UTC+7).
fn wib(dt: DateTime<Utc>) -> DateTime<FixedOffset> {
    match FixedOffset::east_opt(7 * 3600) {
        Some(offset) => dt.with_timezone(&offset),
        None => dt.fixed_offset(),
    }
}

/// "Senin, 15 Januari 2024"
pub fn tanggal(dt: DateTime<Utc>) -> String {
    let local = wib(dt);
    format!(
        "{}, {} {} {}",
        HARI[local.weekday().num_days_from_monday() as usize],
        local.day(),
        BULAN[local.month0() as usize],
        local.year()
    )
}

/// "15 Januari 2024"
pub fn tanggal_pendek(dt: DateTime<Utc>) -> String {
    let local = wib(dt);
    format!("{} {} {}", local.day(), BULAN[local.month0() as usize], local.year())
}

/// "09.00 WIB"
pub fn jam(dt: DateTime<Utc>) -> String {
    format!("{} WIB", wib(dt).format("%H.%M"))
}

fn meeting_type_label(kind: MeetingType) -> &'static str {
    match kind {
        MeetingType::Onsite => "Tatap Muka",
        MeetingType::Virtual => "Daring",
        MeetingType::Hybrid => "Hybrid",
    }
}

fn name_or_dash(user: Option<&UserSummary>) -> String {
    user.map(|u| u.full_name.clone())
        .unwrap_or_else(|| "-".to_string())
}

#[derive(Debug, Clone)]
pub struct ActionCard {
    pub number: usize,
    pub description: String,
    pub assignee: String,
    pub due: String,
    pub priority: &'static str,
    pub priority_class: &'static str,
    pub status: &'static str,
}

/// The printable notulensi document.
#[derive(Template)]
#[template(path = "notulensi_export.html")]
pub struct NotulensiExport {
    pub title: String,
    pub date: String,
    pub time_range: String,
    pub location: String,
    pub meeting_type: String,
    pub meeting_link: Option<String>,
    pub status: String,
    pub notulis: String,
    pub participants: Vec<String>,
    pub agenda: Vec<String>,
    pub content: String,
    pub decisions: Vec<String>,
    pub action_items: Vec<ActionCard>,
    pub next_meeting: Option<String>,
    pub approver: Option<String>,
    pub approved_on: Option<String>,
    pub generated_at: String,
}

impl NotulensiExport {
    pub fn build(graph: &ExportGraph, now: DateTime<Utc>) -> Self {
        let n = &graph.notulensi;
        let meeting = graph.meeting.as_ref();

        let (date, time_range) = match meeting {
            Some(m) => (
                tanggal(m.date_time),
                format!(
                    "{} - {}",
                    wib(m.date_time).format("%H.%M"),
                    jam(m.date_time + Duration::minutes(i64::from(m.duration)))
                ),
            ),
            None => ("-".to_string(), "-".to_string()),
        };

        let status = if n.is_approved() {
            "Disetujui"
        } else if n.is_draft {
            "Draf"
        } else {
            "Final"
        };

        let action_items = n
            .action_items
            .iter()
            .enumerate()
            .map(|(i, item)| ActionCard {
                number: i + 1,
                description: item.description.clone(),
                assignee: name_or_dash(item.assignee.as_ref()),
                due: item
                    .due_date
                    .map(tanggal_pendek)
                    .unwrap_or_else(|| "-".to_string()),
                priority: match item.priority {
                    ActionPriority::Low => "Rendah",
                    ActionPriority::Medium => "Sedang",
                    ActionPriority::High => "Tinggi",
                },
                priority_class: item.priority.as_str(),
                status: match item.status {
                    ActionStatus::Pending => "Belum selesai",
                    ActionStatus::Completed => "Selesai",
                },
            })
            .collect();

        NotulensiExport {
            title: graph.meeting_title().to_string(),
            date,
            time_range,
            location: meeting
                .map(|m| m.location.clone())
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| "-".to_string()),
            meeting_type: meeting
                .map(|m| meeting_type_label(m.meeting_type).to_string())
                .unwrap_or_else(|| "-".to_string()),
            meeting_link: meeting.and_then(|m| m.meeting_link.clone()),
            status: status.to_string(),
            notulis: name_or_dash(n.creator.as_ref()),
            participants: meeting
                .map(|m| {
                    m.participants
                        .iter()
                        .map(|p| name_or_dash(p.user.as_ref()))
                        .collect()
                })
                .unwrap_or_default(),
            agenda: meeting.map(|m| m.agenda.clone()).unwrap_or_default(),
            content: n.content.clone(),
            decisions: n.decisions.clone(),
            action_items,
            next_meeting: n
                .next_meeting_date
                .map(|d| format!("{}, pukul {}", tanggal(d), jam(d))),
            approver: n.approver.as_ref().map(|u| u.full_name.clone()),
            approved_on: n.approval.as_ref().map(|a| tanggal_pendek(a.approved_at)),
            generated_at: format!("{} {}", tanggal_pendek(now), jam(now)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::export::assemble;
    use crate::store::{MemoryStore, seed};

    #[test]
    fn indonesian_dates() {
        // 2024-01-15 02:30 UTC is 09.30 WIB on a Monday.
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 2, 30, 0).unwrap();
        assert_eq!(tanggal(dt), "Senin, 15 Januari 2024");
        assert_eq!(tanggal_pendek(dt), "15 Januari 2024");
        assert_eq!(jam(dt), "09.30 WIB");

        // Late evening UTC already falls on the next day in WIB.
        let dt = Utc.with_ymd_and_hms(2024, 12, 31, 20, 0, 0).unwrap();
        assert_eq!(tanggal(dt), "Rabu, 1 Januari 2025");
    }

    #[actix_rt::test]
    async fn renders_sections_and_escapes() {
        let store = MemoryStore::new();
        seed::seed_demo(&store).await.unwrap();
        let mut graph = assemble(&store, "1").await.unwrap().unwrap();
        graph.notulensi.decisions.push("<script>alert(1)</script>".into());

        let html = NotulensiExport::build(&graph, Utc::now()).render().unwrap();
        assert!(html.contains("Rapat Koordinasi Bulanan"));
        assert!(html.contains("Anggaran kegiatan sosialisasi disetujui"));
        assert!(html.contains("Menyusun laporan realisasi anggaran"));
        assert!(html.contains("Siti Rahayu"));
        assert!(html.contains("size: A4"));
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&#60;script&#62;alert(1)"));
    }

    #[actix_rt::test]
    async fn optional_sections_are_omitted() {
        let store = MemoryStore::new();
        seed::seed_demo(&store).await.unwrap();
        let graph = assemble(&store, "2").await.unwrap().unwrap();

        let html = NotulensiExport::build(&graph, Utc::now()).render().unwrap();
        assert!(!html.contains("Keputusan Rapat"));
        assert!(!html.contains("Tindak Lanjut"));
        assert!(!html.contains("Rapat Berikutnya"));
        assert!(html.contains("Draf"));
    }
}
