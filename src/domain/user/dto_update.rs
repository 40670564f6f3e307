/// Partial update — only the provided fields change.
///
/// Changing `internal_id` or `email` does not cascade to the consent
/// manager; the remote identifier keeps pointing at the old values.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserDto {
    pub internal_id: Option<String>,
    pub email: Option<String>,
    pub attributes: Option<serde_json::Map<String, serde_json::Value>>,
}
