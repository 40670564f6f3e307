#[derive(Debug, Clone, Default)]
pub struct CreateUserDto {
    pub internal_id: String,
    pub email: String,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}
