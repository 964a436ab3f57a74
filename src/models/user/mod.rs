mod resource;
mod types;

pub use types::*;

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::Resource;
    use crate::query::ListQuery;

    fn draft() -> UserDraft {
        UserDraft {
            email: "  Budi@Example.COM ".to_string(),
            full_name: "Budi Santoso".to_string(),
            role: UserRole::Manager,
            department: Some("Keuangan".to_string()),
            avatar_url: None,
            password: Some("rahasia123".to_string()),
        }
    }

    #[test]
    fn draft_normalises_email() {
        let user = User::from_draft("u1".into(), draft(), "admin", Utc::now()).expect("valid draft");
        assert_eq!(user.email, "budi@example.com");
        assert_eq!(user.role, UserRole::Manager);
    }

    #[test]
    fn draft_rejects_missing_name_and_bad_email() {
        let mut d = draft();
        d.full_name = "  ".to_string();
        d.email = "not-an-email".to_string();
        let err = User::from_draft("u1".into(), d, "admin", Utc::now()).unwrap_err();
        assert!(err.contains("Full name is required"));
        assert!(err.contains("Email"));
    }

    #[test]
    fn empty_department_clears_field() {
        let mut user = User::from_draft("u1".into(), draft(), "admin", Utc::now()).unwrap();
        let patch = UserPatch {
            department: Some(String::new()),
            ..Default::default()
        };
        user.apply_patch(patch, Utc::now()).unwrap();
        assert_eq!(user.department, None);
    }

    #[test]
    fn role_and_department_filters() {
        let user = User::from_draft("u1".into(), draft(), "admin", Utc::now()).unwrap();
        let mut q = ListQuery::default();
        q.role = Some("manager".into());
        assert!(user.matches_query(&q));
        q.role = Some("admin".into());
        assert!(!user.matches_query(&q));
        q.role = None;
        q.department = Some("Keuangan".into());
        assert!(user.matches_query(&q));
    }
}
