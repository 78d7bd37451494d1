use crate::infrastructure::error::CoreError;
use crate::infrastructure::event_normalizer::{DashboardPayload, RawPersonalEvent};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_at: String,
    pub end_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn fetch_dashboard(&self, access_token: &str) -> Result<DashboardPayload, CoreError>;

    async fn create_event(
        &self,
        access_token: &str,
        draft: &EventDraft,
    ) -> Result<RawPersonalEvent, CoreError>;

    async fn complete_event(&self, access_token: &str, event_id: &str) -> Result<(), CoreError>;

    async fn clear_event(&self, access_token: &str, event_id: &str) -> Result<(), CoreError>;

    async fn unclear_event(&self, access_token: &str, event_id: &str) -> Result<(), CoreError>;

    async fn delete_event(&self, access_token: &str, event_id: &str) -> Result<(), CoreError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestPortalApi {
    client: Client,
    base_url: Url,
}

impl ReqwestPortalApi {
    pub fn new(base_url: &str) -> Result<Self, CoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|error| CoreError::InvalidConfig(format!("invalid portal base url: {error}")))?;
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn ensure_non_empty(value: &str, field: &str) -> Result<(), CoreError> {
        if value.trim().is_empty() {
            return Err(CoreError::InvalidConfig(format!("{field} must not be empty")));
        }
        Ok(())
    }

    fn api_endpoint(&self, segments: &[&str]) -> Result<Url, CoreError> {
        let mut url = self.base_url.clone();
        {
            let mut parts = url.path_segments_mut().map_err(|_| {
                CoreError::InvalidConfig("portal base URL cannot be a base".to_string())
            })?;
            parts.pop_if_empty();
            parts.push("api");
            for segment in segments {
                parts.push(segment);
            }
        }
        Ok(url)
    }

    fn status_error(status: reqwest::StatusCode, body: String) -> CoreError {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return CoreError::Unauthorized;
        }
        CoreError::Http {
            status: status.as_u16(),
            body,
        }
    }

    async fn read_checked(response: reqwest::Response, action: &str) -> Result<String, CoreError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| CoreError::Network(format!("failed reading {action} response: {error}")))?;
        if !status.is_success() {
            return Err(Self::status_error(status, body));
        }
        Ok(body)
    }

    async fn send_event_action(
        &self,
        access_token: &str,
        event_id: &str,
        action: &str,
    ) -> Result<(), CoreError> {
        Self::ensure_non_empty(access_token, "access token")?;
        Self::ensure_non_empty(event_id, "event id")?;

        let endpoint = self.api_endpoint(&["events", event_id, action])?;
        let response = self
            .client
            .put(endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|error| {
                CoreError::Network(format!("network error during event {action}: {error}"))
            })?;

        Self::read_checked(response, action).await?;
        Ok(())
    }
}

#[async_trait]
impl PortalApi for ReqwestPortalApi {
    async fn fetch_dashboard(&self, access_token: &str) -> Result<DashboardPayload, CoreError> {
        Self::ensure_non_empty(access_token, "access token")?;

        let endpoint = self.api_endpoint(&["dashboard"])?;
        let response = self
            .client
            .get(endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|error| {
                CoreError::Network(format!("network error while fetching dashboard: {error}"))
            })?;

        let body = Self::read_checked(response, "dashboard fetch").await?;
        serde_json::from_str(&body).map_err(|error| {
            CoreError::InvalidEventData(format!("invalid dashboard payload: {error}; body={body}"))
        })
    }

    async fn create_event(
        &self,
        access_token: &str,
        draft: &EventDraft,
    ) -> Result<RawPersonalEvent, CoreError> {
        Self::ensure_non_empty(access_token, "access token")?;
        Self::ensure_non_empty(&draft.title, "event title")?;

        let endpoint = self.api_endpoint(&["events"])?;
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(access_token)
            .json(draft)
            .send()
            .await
            .map_err(|error| {
                CoreError::Network(format!("network error while creating event: {error}"))
            })?;

        let body = Self::read_checked(response, "event create").await?;
        serde_json::from_str(&body).map_err(|error| {
            CoreError::InvalidEventData(format!("invalid event create payload: {error}; body={body}"))
        })
    }

    async fn complete_event(&self, access_token: &str, event_id: &str) -> Result<(), CoreError> {
        self.send_event_action(access_token, event_id, "complete").await
    }

    async fn clear_event(&self, access_token: &str, event_id: &str) -> Result<(), CoreError> {
        self.send_event_action(access_token, event_id, "clear").await
    }

    async fn unclear_event(&self, access_token: &str, event_id: &str) -> Result<(), CoreError> {
        self.send_event_action(access_token, event_id, "unclear").await
    }

    async fn delete_event(&self, access_token: &str, event_id: &str) -> Result<(), CoreError> {
        Self::ensure_non_empty(access_token, "access token")?;
        Self::ensure_non_empty(event_id, "event id")?;

        let endpoint = self.api_endpoint(&["events", event_id])?;
        let response = self
            .client
            .delete(endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|error| {
                CoreError::Network(format!("network error while deleting event: {error}"))
            })?;

        Self::read_checked(response, "event delete").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_endpoint_joins_segments_under_base() {
        let client = ReqwestPortalApi::new("https://portal.example.edu").expect("valid base url");
        let url = client
            .api_endpoint(&["events", "evt-1", "clear"])
            .expect("endpoint");
        assert_eq!(url.as_str(), "https://portal.example.edu/api/events/evt-1/clear");
    }

    #[test]
    fn unauthorized_status_maps_to_dedicated_error() {
        let error =
            ReqwestPortalApi::status_error(reqwest::StatusCode::UNAUTHORIZED, String::new());
        assert!(matches!(error, CoreError::Unauthorized));

        let error = ReqwestPortalApi::status_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "boom".to_string(),
        );
        assert!(matches!(error, CoreError::Http { status: 500, .. }));
    }

    #[test]
    fn new_rejects_unparseable_base_url() {
        assert!(ReqwestPortalApi::new("not a url").is_err());
    }
}
