use serde::{Deserialize, Serialize};

// -- Users --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub email: String,
    pub full_name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

// -- Posts --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

fn default_true() -> bool {
    true
}

// -- System --

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub message: String,
    pub endpoints: EndpointIndex,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointIndex {
    pub health: String,
    pub users: String,
    pub posts: String,
    pub compute_fibonacci: String,
    pub compute_sum: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// -- Compute --

#[derive(Debug, Serialize, Deserialize)]
pub struct FibonacciResponse {
    pub n: i64,
    pub fibonacci: u64,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SumResponse {
    pub n: i64,
    pub sum: u64,
    pub message: String,
}

// -- Errors --

/// Every error response carries a human-readable `detail` field.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_defaults_to_active() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"email":"a@x.com","full_name":"A"}"#).unwrap();
        assert!(req.is_active);
    }

    #[test]
    fn create_post_defaults_to_published() {
        let req: CreatePostRequest =
            serde_json::from_str(r#"{"title":"T","content":"C"}"#).unwrap();
        assert!(req.is_published);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<CreateUserRequest, _> =
            serde_json::from_str(r#"{"email":"a@x.com","full_name":"A","id":7}"#);
        assert!(res.is_err());
    }
}
