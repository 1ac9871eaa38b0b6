use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::PlanningRemote;
use crate::error::RemoteError;
use crate::planning::intent::PaintIntent;
use crate::planning::types::{
    Analyst, AssignmentKey, Cluster, ShiftAssignment, ShiftConcept, Team, TeamId,
};

/// Header carrying the admin password on write requests
pub const ADMIN_PASSWORD_HEADER: &str = "X-Admin-Password";

/// Client for the JSON API served by [`crate::web`]
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: String,
    admin_password: Option<String>,
}

/// Error body written by the planning API: `{"success": false, "error": ...}`
#[derive(Deserialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            admin_password: None,
        }
    }

    pub fn with_admin_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = Some(password.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.admin_password {
            Some(password) => request.header(ADMIN_PASSWORD_HEADER, password),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, RemoteError> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        decode(check(response).await?).await
    }
}

fn transport(err: reqwest::Error) -> RemoteError {
    RemoteError::Transport(err.to_string())
}

/// Maps non-success statuses to remote errors, keeping the server's message.
/// Only a 404 carrying the API's error body means the row is missing; any
/// other 404 (wrong base URL, unknown route) is a rejection.
async fn check(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify(status, body))
}

fn classify(status: StatusCode, body: String) -> RemoteError {
    let api_error = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .filter(|b| !b.success);
    match api_error {
        Some(_) if status == StatusCode::NOT_FOUND => RemoteError::NotFound,
        Some(api_error) => RemoteError::rejected(status.as_u16(), api_error.error),
        None => RemoteError::rejected(status.as_u16(), body),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    response
        .json::<T>()
        .await
        .map_err(|err| RemoteError::Decode(err.to_string()))
}

fn team_query(team: Option<TeamId>) -> Vec<(&'static str, String)> {
    team.map(|id| vec![("team", id.to_string())]).unwrap_or_default()
}

#[async_trait]
impl PlanningRemote for HttpRemote {
    async fn list_teams(&self) -> Result<Vec<Team>, RemoteError> {
        self.get_json("teams", &[]).await
    }

    async fn list_concepts(&self) -> Result<Vec<ShiftConcept>, RemoteError> {
        self.get_json("concepts", &[]).await
    }

    async fn list_clusters(&self) -> Result<Vec<Cluster>, RemoteError> {
        self.get_json("clusters", &[]).await
    }

    async fn list_analysts(&self, team: Option<TeamId>) -> Result<Vec<Analyst>, RemoteError> {
        self.get_json("analysts", &team_query(team)).await
    }

    async fn list_assignments(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        team: Option<TeamId>,
    ) -> Result<Vec<ShiftAssignment>, RemoteError> {
        let mut query = vec![("start", start.to_string()), ("end", end.to_string())];
        query.extend(team_query(team));
        self.get_json("assignments", &query).await
    }

    async fn put_assignment(&self, write: &PaintIntent) -> Result<ShiftAssignment, RemoteError> {
        let request = self.authorized(self.client.put(self.url("assignments")).json(write));
        let response = request.send().await.map_err(transport)?;
        decode(check(response).await?).await
    }

    async fn delete_assignment(&self, key: AssignmentKey) -> Result<(), RemoteError> {
        let path = format!("assignments/{}/{}", key.analyst_id, key.date);
        let request = self.authorized(self.client.delete(self.url(&path)));
        let response = request.send().await.map_err(transport)?;
        check(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_rooted_under_api() {
        let remote = HttpRemote::new("http://localhost:8080/");
        assert_eq!(remote.url("teams"), "http://localhost:8080/api/teams");
        assert_eq!(team_query(Some(4)), vec![("team", "4".to_string())]);
        assert!(team_query(None).is_empty());
    }

    #[test]
    fn only_api_shaped_404s_mean_not_found() {
        let api_body = r#"{"success":false,"error":"Not found"}"#.to_string();
        assert_eq!(classify(StatusCode::NOT_FOUND, api_body), RemoteError::NotFound);
        assert_eq!(
            classify(StatusCode::NOT_FOUND, String::new()),
            RemoteError::rejected(404, "")
        );
        assert_eq!(
            classify(StatusCode::NOT_FOUND, "<h1>Not Found</h1>".into()),
            RemoteError::rejected(404, "<h1>Not Found</h1>")
        );
        let unauthorized = r#"{"success":false,"error":"Unauthorized"}"#.to_string();
        assert_eq!(
            classify(StatusCode::UNAUTHORIZED, unauthorized),
            RemoteError::rejected(401, "Unauthorized")
        );
    }
}
