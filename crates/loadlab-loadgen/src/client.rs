use anyhow::Result;

use loadlab_types::api::{CreatePostRequest, CreateUserRequest, FibonacciResponse, HealthResponse, SumResponse};
use loadlab_types::models::{Post, User};

/// Thin typed wrapper around the service's HTTP surface. Any non-2xx
/// status is surfaced as an error so phases can count it as a failure.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    pub async fn create_user(&self, seq: usize) -> Result<User> {
        let body = CreateUserRequest {
            email: format!("user{}@example.com", seq),
            full_name: format!("User {}", seq),
            is_active: true,
        };
        let resp = self
            .http
            .post(format!("{}/users/", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    pub async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<User>> {
        let resp = self
            .http
            .get(format!(
                "{}/users/?skip={}&limit={}",
                self.base_url, skip, limit
            ))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    pub async fn create_post(&self, owner_id: i64, seq: usize) -> Result<Post> {
        let body = CreatePostRequest {
            title: format!("Post {} by User {}", seq, owner_id),
            content: format!("This is the content of post {}. ", seq).repeat(10),
            is_published: true,
        };
        let resp = self
            .http
            .post(format!("{}/users/{}/posts/", self.base_url, owner_id))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    pub async fn fibonacci(&self, n: i64) -> Result<FibonacciResponse> {
        let resp = self
            .http
            .get(format!("{}/compute/fibonacci/{}", self.base_url, n))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    pub async fn sum(&self, n: i64) -> Result<SumResponse> {
        let resp = self
            .http
            .get(format!("{}/compute/sum/{}", self.base_url, n))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }
}
