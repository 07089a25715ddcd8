use serde::Serialize;

/// Uniform success envelope: `{"statusCode": .., "data": .., "message": ..}`.
///
/// Error responses use the same field names with `data: null`; see
/// [`crate::error::AppError`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code,
            data,
            message: message.into(),
        }
    }
}
