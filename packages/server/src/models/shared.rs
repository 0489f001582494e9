use serde::Serialize;

use crate::error::AppError;

/// Standard `{success, data?, error?}` response envelope. The failure
/// half is produced by [`crate::error::AppError`].
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always `true` on success responses.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success with no payload (deletes).
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation(
            "Title must be 1-256 characters".into(),
        ));
    }
    Ok(())
}

/// Validate an optional position field (must be >= 0 when present).
pub fn validate_optional_position(pos: Option<i32>) -> Result<(), AppError> {
    if let Some(pos) = pos
        && pos < 0
    {
        return Err(AppError::Validation("Position must be >= 0".into()));
    }
    Ok(())
}

/// Validate an optional card style selector.
pub fn validate_card_style(style: Option<&str>) -> Result<(), AppError> {
    match style {
        None | Some("CARDSTYLE1") | Some("CARDSTYLE2") => Ok(()),
        Some(other) => Err(AppError::Validation(format!(
            "card_style must be CARDSTYLE1 or CARDSTYLE2, got {other}"
        ))),
    }
}
