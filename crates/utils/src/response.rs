use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Standard envelope for every API response.
///
/// `data` is present on success, `message` carries a human-readable error
/// description on failure. The shape is shared with the mobile client.
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_carries_data() {
        let resp = ApiResponse::success(42u32);
        assert!(resp.success);
        assert_eq!(resp.data, Some(42));
        assert!(resp.message.is_none());
    }

    #[test]
    fn error_carries_message_only() {
        let resp: ApiResponse<()> = ApiResponse::error("invite code invalid");
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(resp.message.as_deref(), Some("invite code invalid"));
    }
}
