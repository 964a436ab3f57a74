//! JSON envelope shared by the server handlers and the client backend.

use serde::{Deserialize, Serialize};

use crate::query::Pagination;

/// `{ success, data?, error? }` wrapper around every JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Envelope {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Body of a list response: one page plus its pagination block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Body of a delete response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deleted {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_envelope_shape() {
        let v = serde_json::to_value(Envelope::error("Notulensi not found")).unwrap();
        assert_eq!(v, json!({"success": false, "error": "Notulensi not found"}));
    }

    #[test]
    fn ok_envelope_shape() {
        let v = serde_json::to_value(Envelope::ok(Deleted { id: "7".into() })).unwrap();
        assert_eq!(v, json!({"success": true, "data": {"id": "7"}}));
    }
}
