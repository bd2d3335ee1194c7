use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ToggleOptionRequest {
    #[validate(length(min = 1, message = "Option must not be empty"))]
    pub option: String,
}
