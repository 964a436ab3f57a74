//! Field validators shared by the entity drafts and the login form.
//! Each returns `Some(message)` when the value is rejected.

/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => None,
        _ => Some("Email must be a valid address".to_string()),
    }
}

/// Validate a password: min 8 chars on create.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.len() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    if value.trim().chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_rules() {
        assert!(validate_email("budi@contoh.id").is_none());
        assert!(validate_email("").is_some());
        assert!(validate_email("@contoh.id").is_some());
        assert!(validate_email("budi@localhost").is_some());
    }

    #[test]
    fn required_counts_characters() {
        assert!(validate_required("  ", "Title", 10).is_some());
        assert!(validate_required("ééé", "Title", 3).is_none());
        assert_eq!(
            validate_required("abcd", "Title", 3).as_deref(),
            Some("Title must be at most 3 characters")
        );
    }

    #[test]
    fn optional_allows_empty() {
        assert!(validate_optional("", "Content", 5).is_none());
        assert!(validate_optional("123456", "Content", 5).is_some());
    }

    #[test]
    fn short_password_rejected() {
        assert!(validate_password("rahasia").is_some());
        assert!(validate_password("rahasia123").is_none());
    }
}
