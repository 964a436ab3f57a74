//! First-run data: the configured admin account and optional demo records.

use chrono::{DateTime, Duration, Utc};

use super::{DocumentStore, Repository, StoreError};
use crate::auth::password::hash_password;
use crate::models::{
    ActionItem, ActionPriority, ActionStatus, Approval, Credential, InviteStatus, Meeting,
    MeetingStatus, MeetingType, Notulensi, Participant, Task, TaskPriority, TaskStatus, User,
    UserRole, new_id,
};

pub const DEMO_PASSWORD: &str = "rapat12345";

async fn store_user(
    store: &dyn DocumentStore,
    user: &User,
    password: &str,
) -> Result<(), StoreError> {
    let password_hash = match hash_password(password) {
        Ok(hash) => hash,
        Err(e) => {
            log::error!("Could not hash password for {}: {e}", user.email);
            return Ok(());
        }
    };
    Repository::<User>::new(store).create(user).await?;
    Repository::<Credential>::new(store)
        .create(&Credential {
            id: user.id.clone(),
            email: user.email.clone(),
            password_hash,
        })
        .await
}

/// Create the admin account when there are no users yet.
pub async fn seed_admin(
    store: &dyn DocumentStore,
    email: &str,
    password: &str,
) -> Result<bool, StoreError> {
    if !Repository::<User>::new(store).list().await?.is_empty() {
        return Ok(false);
    }
    let now = Utc::now();
    let admin = User {
        id: new_id(),
        email: email.trim().to_lowercase(),
        full_name: "Administrator".to_string(),
        role: UserRole::Admin,
        department: None,
        avatar_url: None,
        created_at: now,
        updated_at: now,
    };
    store_user(store, &admin, password).await?;
    log::info!("Seeded admin account {}", admin.email);
    Ok(true)
}

fn user(id: &str, email: &str, name: &str, role: UserRole, dept: &str, now: DateTime<Utc>) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        full_name: name.to_string(),
        role,
        department: Some(dept.to_string()),
        avatar_url: None,
        created_at: now,
        updated_at: now,
    }
}

#[allow(clippy::too_many_arguments)]
fn meeting(
    id: &str,
    title: &str,
    at: DateTime<Utc>,
    status: MeetingStatus,
    meeting_type: MeetingType,
    location: &str,
    agenda: &[&str],
    now: DateTime<Utc>,
) -> Meeting {
    Meeting {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        date_time: at,
        duration: 90,
        status,
        location: location.to_string(),
        meeting_type,
        meeting_link: meeting_type
            .needs_link()
            .then(|| format!("https://meet.contoh.id/{id}")),
        agenda: agenda.iter().map(|a| a.to_string()).collect(),
        created_by: "user-1".to_string(),
        participants: ["user-1", "user-2", "user-3"]
            .iter()
            .map(|uid| Participant {
                user_id: uid.to_string(),
                status: InviteStatus::Accepted,
                user: None,
            })
            .collect(),
        created_at: now,
        updated_at: now,
        creator: None,
    }
}

fn task(
    id: &str,
    title: &str,
    priority: TaskPriority,
    assignee: &str,
    due: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        status: TaskStatus::Pending,
        priority,
        assigned_to: Some(assignee.to_string()),
        created_by: "user-1".to_string(),
        due_date: Some(due),
        completed_at: None,
        tags: vec![],
        created_at: now,
        updated_at: now,
        assignee: None,
        creator: None,
    }
}

/// Sample organisation data for local development. Skipped when meetings
/// already exist.
pub async fn seed_demo(store: &dyn DocumentStore) -> Result<bool, StoreError> {
    if !Repository::<Meeting>::new(store).list().await?.is_empty() {
        return Ok(false);
    }
    let now = Utc::now();

    let users = [
        user("user-1", "budi@contoh.id", "Budi Santoso", UserRole::Manager, "Sekretariat", now),
        user("user-2", "siti@contoh.id", "Siti Rahayu", UserRole::Employee, "Keuangan", now),
        user("user-3", "andi@contoh.id", "Andi Wijaya", UserRole::Employee, "Teknologi Informasi", now),
    ];
    for u in &users {
        store_user(store, u, DEMO_PASSWORD).await?;
    }

    let meetings = [
        meeting(
            "1",
            "Rapat Koordinasi Bulanan",
            now - Duration::days(2),
            MeetingStatus::Completed,
            MeetingType::Onsite,
            "Ruang Rapat Utama",
            &["Laporan kegiatan", "Evaluasi anggaran", "Rencana bulan depan"],
            now,
        ),
        meeting(
            "2",
            "Evaluasi Anggaran Kuartal III",
            now + Duration::days(3),
            MeetingStatus::Scheduled,
            MeetingType::Virtual,
            "",
            &["Realisasi anggaran", "Usulan revisi"],
            now,
        ),
        meeting(
            "3",
            "Perencanaan Sprint Tim TI",
            now + Duration::days(7),
            MeetingStatus::Scheduled,
            MeetingType::Hybrid,
            "Lantai 3",
            &["Review backlog"],
            now,
        ),
    ];
    let meeting_repo = Repository::<Meeting>::new(store);
    for m in &meetings {
        meeting_repo.create(m).await?;
    }

    let approved_at = now - Duration::days(1);
    let notulensi = [
        Notulensi {
            id: "1".to_string(),
            meeting_id: "1".to_string(),
            content: "Rapat membahas capaian kegiatan bulan lalu dan realisasi anggaran."
                .to_string(),
            decisions: vec![
                "Anggaran kegiatan sosialisasi disetujui".to_string(),
                "Laporan bulanan dikirim paling lambat tanggal 5".to_string(),
            ],
            next_meeting_date: Some(now + Duration::days(28)),
            created_by: "user-1".to_string(),
            approval: Some(Approval {
                approved_by: "user-1".to_string(),
                approved_at,
            }),
            action_items: vec![ActionItem {
                id: new_id(),
                description: "Menyusun laporan realisasi anggaran".to_string(),
                assigned_to: Some("user-2".to_string()),
                due_date: Some(now + Duration::days(5)),
                priority: ActionPriority::High,
                status: ActionStatus::Pending,
                completed_at: None,
                assignee: None,
            }],
            is_draft: false,
            created_at: now - Duration::days(2),
            updated_at: approved_at,
            meeting: None,
            creator: None,
            approver: None,
        },
        Notulensi {
            id: "2".to_string(),
            meeting_id: "2".to_string(),
            content: "Catatan awal untuk evaluasi anggaran.".to_string(),
            decisions: vec![],
            next_meeting_date: None,
            created_by: "user-2".to_string(),
            approval: None,
            action_items: vec![],
            is_draft: true,
            created_at: now,
            updated_at: now,
            meeting: None,
            creator: None,
            approver: None,
        },
    ];
    let notulensi_repo = Repository::<Notulensi>::new(store);
    for n in &notulensi {
        notulensi_repo.create(n).await?;
    }

    let tasks = [
        task("1", "Siapkan bahan presentasi anggaran", TaskPriority::High, "user-2", now + Duration::days(2), now),
        task("2", "Perbarui inventaris perangkat", TaskPriority::Medium, "user-3", now + Duration::days(10), now),
        task("3", "Kirim undangan rapat koordinasi", TaskPriority::Low, "user-1", now - Duration::days(1), now),
    ];
    let task_repo = Repository::<Task>::new(store);
    for t in &tasks {
        task_repo.create(t).await?;
    }

    log::info!(
        "Seeded demo data: {} users, {} meetings, {} notulensi, {} tasks",
        users.len(),
        meetings.len(),
        notulensi.len(),
        tasks.len()
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[actix_rt::test]
    async fn admin_only_on_empty_store() {
        let store = MemoryStore::new();
        assert!(seed_admin(&store, "Admin@Contoh.id", "rahasia123").await.unwrap());
        assert!(!seed_admin(&store, "other@contoh.id", "rahasia123").await.unwrap());

        let users = Repository::<User>::new(&store).list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "admin@contoh.id");
        assert!(users[0].is_admin());
        assert!(Repository::<Credential>::new(&store).exists(&users[0].id).await.unwrap());
    }

    #[actix_rt::test]
    async fn demo_minutes_one() {
        let store = MemoryStore::new();
        assert!(seed_demo(&store).await.unwrap());
        let n = Repository::<Notulensi>::new(&store).get("1").await.unwrap().unwrap();
        assert_eq!(n.decisions.len(), 2);
        assert_eq!(n.action_items.len(), 1);
        assert!(n.is_approved());
        assert!(!seed_demo(&store).await.unwrap());
    }
}
