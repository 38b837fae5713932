//! Shared response envelope types for API handlers.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// Used for payloads that are not a stored entity (uploads, image content).
/// Entity endpoints return the entity itself.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
