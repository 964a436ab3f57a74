//! Notulensi export: gather the record graph, render it to HTML, hand the
//! HTML to a [`PdfRenderer`].

use chrono::{DateTime, Utc};

use crate::models::{Lookup, Meeting, Notulensi, Resource, User};
use crate::store::{DocumentStore, Repository, StoreError};

pub mod renderer;
pub mod template;

pub use renderer::{ChromiumRenderer, PdfRenderer, RenderError};
pub use template::NotulensiExport;

/// Everything the export template shows, with display summaries filled in.
#[derive(Debug, Clone)]
pub struct ExportGraph {
    pub notulensi: Notulensi,
    pub meeting: Option<Meeting>,
}

impl ExportGraph {
    pub fn meeting_title(&self) -> &str {
        self.meeting
            .as_ref()
            .map(|m| m.title.as_str())
            .unwrap_or("Rapat")
    }
}

/// Load the minutes with their meeting and every user they mention.
/// `Ok(None)` when the minutes do not exist.
pub async fn assemble(
    store: &dyn DocumentStore,
    id: &str,
) -> Result<Option<ExportGraph>, StoreError> {
    let Some(mut notulensi) = Repository::<Notulensi>::new(store).get(id).await? else {
        return Ok(None);
    };
    let mut meeting = Repository::<Meeting>::new(store)
        .get(&notulensi.meeting_id)
        .await?;
    if meeting.is_none() {
        log::warn!(
            "Notulensi {id} points at missing meeting {}",
            notulensi.meeting_id
        );
    }

    let users = Repository::<User>::new(store).list().await?;
    let lookup = Lookup {
        users: users.iter().map(|u| (u.id.clone(), u.summary())).collect(),
        meetings: meeting
            .iter()
            .map(|m| (m.id.clone(), m.summary()))
            .collect(),
    };
    notulensi.expand(&lookup);
    if let Some(m) = meeting.as_mut() {
        m.expand(&lookup);
    }

    Ok(Some(ExportGraph { notulensi, meeting }))
}

/// `Notulensi_<title>_<yyyy-mm-dd>.pdf`, every non-alphanumeric character of
/// the title replaced by `_`.
pub fn export_filename(title: &str, created_at: DateTime<Utc>) -> String {
    let safe: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("Notulensi_{}_{}.pdf", safe, created_at.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::store::{MemoryStore, seed};

    #[test]
    fn filename_is_sanitised() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        assert_eq!(
            export_filename("Rapat Q1: Anggaran/2024", at),
            "Notulensi_Rapat_Q1__Anggaran_2024_2024-01-15.pdf"
        );
        assert_eq!(export_filename("Évaluasi", at), "Notulensi__valuasi_2024-01-15.pdf");
    }

    #[actix_rt::test]
    async fn assembles_demo_minutes() {
        let store = MemoryStore::new();
        seed::seed_demo(&store).await.unwrap();

        let graph = assemble(&store, "1").await.unwrap().unwrap();
        assert_eq!(graph.meeting_title(), "Rapat Koordinasi Bulanan");
        assert_eq!(
            graph.notulensi.creator.as_ref().unwrap().full_name,
            "Budi Santoso"
        );
        assert_eq!(
            graph.notulensi.action_items[0].assignee.as_ref().unwrap().full_name,
            "Siti Rahayu"
        );
        let meeting = graph.meeting.unwrap();
        assert!(meeting.participants.iter().all(|p| p.user.is_some()));

        assert!(assemble(&store, "404").await.unwrap().is_none());
    }
}
