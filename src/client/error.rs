use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request never produced a response.
    Transport(String),
    /// Non-2xx status or `success: false`. Carries the envelope's `error`.
    Api { status: u16, message: Option<String> },
    Decode(String),
    NotLoggedIn,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(e) => write!(f, "Transport error: {e}"),
            ClientError::Api {
                status,
                message: Some(m),
            } => write!(f, "{m} (HTTP {status})"),
            ClientError::Api {
                status,
                message: None,
            } => write!(f, "Request failed with HTTP {status}"),
            ClientError::Decode(e) => write!(f, "Invalid response: {e}"),
            ClientError::NotLoggedIn => write!(f, "Not logged in"),
        }
    }
}

impl std::error::Error for ClientError {}

impl ClientError {
    /// Text shown to users: the server's own message when it sent one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api {
                message: Some(m), ..
            } if !m.trim().is_empty() => m.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_wins() {
        let err = ClientError::Api {
            status: 404,
            message: Some("Meeting not found".into()),
        };
        assert_eq!(err.user_message("Failed to fetch meetings"), "Meeting not found");
    }

    #[test]
    fn fallback_for_transport_errors() {
        let err = ClientError::Transport("connection refused".into());
        assert_eq!(err.user_message("Failed to fetch meetings"), "Failed to fetch meetings");
        let err = ClientError::Api {
            status: 502,
            message: None,
        };
        assert_eq!(err.user_message("Failed to fetch tasks"), "Failed to fetch tasks");
    }
}
