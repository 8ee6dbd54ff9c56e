//! Reddit OAuth client implementing the curator's platform traits.

mod model;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use curator_config::RedditConfig;
use curator_core::{CommentRef, ForumPlatform, PlatformError, Post, PromotionPlatform};

use model::{
    Me, TokenResponse, api_errors, created_id, fullname, posts_from_listing, removal_message_body,
    removal_reason_body,
};

/// Longest slice of an error body kept in [`PlatformError::Api`].
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Debug, Clone)]
pub struct RedditClient {
    http: Client,
    api_base_url: String,
    token: String,
}

impl RedditClient {
    /// Authenticate with the script-app password grant.
    pub async fn connect(config: &RedditConfig) -> Result<Self, PlatformError> {
        if !config.has_credentials() {
            return Err(PlatformError::Unauthorized(
                "reddit credentials are incomplete (REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET, REDDIT_USERNAME, REDDIT_PASSWORD)"
                    .to_string(),
            ));
        }

        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(transport)?;

        let response = http
            .post(&config.auth_url)
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", config.username.as_str()),
                ("password", config.password.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;
        let payload: TokenResponse = decode(check_status(response).await?).await?;

        let token = match (payload.access_token, payload.error) {
            (Some(token), _) if !token.is_empty() => token,
            (_, Some(error)) => return Err(PlatformError::Unauthorized(error)),
            _ => return Err(PlatformError::Unauthorized("no access token returned".to_string())),
        };
        debug!(user = %config.username, "authenticated with reddit");

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, PlatformError> {
        let url = format!("{}{path}", self.api_base_url);
        debug!(%url, "reddit GET");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("raw_json", "1")])
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        decode(check_status(response).await?).await
    }

    async fn post(&self, path: &str, form: &[(&str, &str)]) -> Result<Value, PlatformError> {
        let url = format!("{}{path}", self.api_base_url);
        debug!(%url, "reddit POST");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .form(form)
            .send()
            .await
            .map_err(transport)?;
        let payload: Value = decode(check_status(response).await?).await?;
        if let Some(errors) = api_errors(&payload) {
            return Err(PlatformError::Api {
                status: StatusCode::OK.as_u16(),
                message: errors,
            });
        }
        Ok(payload)
    }

    async fn first_post(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<Post>, PlatformError> {
        let payload = self.get(path, query).await?;
        Ok(posts_from_listing(payload)?.into_iter().next())
    }

    async fn post_by_fullname(&self, name: &str) -> Result<Post, PlatformError> {
        self.first_post(&format!("/by_id/{name}"), &[])
            .await?
            .ok_or_else(|| PlatformError::NotFound(name.to_string()))
    }
}

#[async_trait]
impl ForumPlatform for RedditClient {
    async fn fetch_newest_posts(&self, forum: &str, limit: usize) -> Result<Vec<Post>, PlatformError> {
        let limit = limit.to_string();
        let payload = self
            .get(&format!("/r/{forum}/new"), &[("limit", limit.as_str())])
            .await?;
        posts_from_listing(payload)
    }

    async fn remove_post(&self, post: &Post, reason_id: &str, note: &str) -> Result<(), PlatformError> {
        let name = fullname(&post.id);
        self.post("/api/remove", &[("id", name.as_str()), ("spam", "false")])
            .await?;

        if !reason_id.is_empty() || !note.is_empty() {
            let body = removal_reason_body(&name, reason_id, note);
            self.post("/api/v1/modactions/removal_reasons", &[("json", body.as_str())])
                .await?;
        }
        Ok(())
    }

    async fn notify_removal(&self, post: &Post, message: &str) -> Result<(), PlatformError> {
        let body = removal_message_body(&fullname(&post.id), message);
        self.post("/api/v1/modactions/removal_link_message", &[("json", body.as_str())])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PromotionPlatform for RedditClient {
    async fn top_post_of_week(&self, forum: &str) -> Result<Option<Post>, PlatformError> {
        self.first_post(&format!("/r/{forum}/top"), &[("t", "week"), ("limit", "1")])
            .await
    }

    async fn sticky(&self, forum: &str, slot: u8) -> Result<Option<Post>, PlatformError> {
        let slot = slot.to_string();
        match self
            .first_post(&format!("/r/{forum}/about/sticky"), &[("num", slot.as_str())])
            .await
        {
            Err(err) if err.is_not_found() => Ok(None),
            other => other,
        }
    }

    async fn set_sticky(&self, post: &Post, state: bool, bottom: bool) -> Result<(), PlatformError> {
        let name = fullname(&post.id);
        let state = if state { "true" } else { "false" };
        let mut form = vec![("id", name.as_str()), ("state", state), ("api_type", "json")];
        if state == "true" && !bottom {
            form.push(("num", "1"));
        }
        self.post("/api/set_subreddit_sticky", &form).await?;
        Ok(())
    }

    async fn delete_post(&self, post: &Post) -> Result<(), PlatformError> {
        let name = fullname(&post.id);
        self.post("/api/del", &[("id", name.as_str())]).await?;
        Ok(())
    }

    async fn crosspost(
        &self,
        post: &Post,
        forum: &str,
        flair_id: Option<&str>,
    ) -> Result<Post, PlatformError> {
        let source = fullname(&post.id);
        let mut form = vec![
            ("sr", forum),
            ("title", post.title.as_str()),
            ("kind", "crosspost"),
            ("crosspost_fullname", source.as_str()),
            ("sendreplies", "false"),
            ("resubmit", "true"),
            ("api_type", "json"),
        ];
        if let Some(flair_id) = flair_id {
            form.push(("flair_id", flair_id));
        }

        let payload = self.post("/api/submit", &form).await?;
        let id = created_id(&payload)
            .ok_or_else(|| PlatformError::Decode("submit response carried no id".to_string()))?;
        let mut crosspost = self.post_by_fullname(&fullname(&id)).await?;
        // A crosspost links to its source's permalink.
        if crosspost.url.is_empty() {
            crosspost.url = post.permalink.clone();
        }
        Ok(crosspost)
    }

    async fn reply(&self, post: &Post, text: &str) -> Result<CommentRef, PlatformError> {
        let parent = fullname(&post.id);
        let payload = self
            .post(
                "/api/comment",
                &[("thing_id", parent.as_str()), ("text", text), ("api_type", "json")],
            )
            .await?;
        let id = created_id(&payload)
            .ok_or_else(|| PlatformError::Decode("comment response carried no id".to_string()))?;
        Ok(CommentRef { id })
    }

    async fn distinguish(&self, comment: &CommentRef) -> Result<(), PlatformError> {
        let name = format!("t1_{}", comment.id);
        self.post(
            "/api/distinguish",
            &[("id", name.as_str()), ("how", "yes"), ("api_type", "json")],
        )
        .await?;
        Ok(())
    }

    async fn lock(&self, post: &Post) -> Result<(), PlatformError> {
        let name = fullname(&post.id);
        self.post("/api/lock", &[("id", name.as_str())]).await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<String, PlatformError> {
        let payload = self.get("/api/v1/me", &[]).await?;
        let me: Me =
            serde_json::from_value(payload).map_err(|err| PlatformError::Decode(err.to_string()))?;
        Ok(me.name)
    }
}

fn transport(err: reqwest::Error) -> PlatformError {
    PlatformError::Transport(err.to_string())
}

async fn check_status(response: Response) -> Result<Response, PlatformError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &url, &body))
}

fn status_error(status: StatusCode, path: &str, body: &str) -> PlatformError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => PlatformError::RateLimited,
        StatusCode::NOT_FOUND => PlatformError::NotFound(path.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PlatformError::Unauthorized(format!("{status} on {path}"))
        }
        _ => PlatformError::Api {
            status: status.as_u16(),
            message: body.chars().take(ERROR_BODY_LIMIT).collect(),
        },
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, PlatformError> {
    response
        .json::<T>()
        .await
        .map_err(|err| PlatformError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_codes() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "/r/x/new", ""),
            PlatformError::RateLimited
        ));
        assert!(status_error(StatusCode::NOT_FOUND, "/r/x/about/sticky", "").is_not_found());
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "/api/remove", ""),
            PlatformError::Unauthorized(_)
        ));
        match status_error(StatusCode::BAD_GATEWAY, "/r/x/new", &"x".repeat(1_000)) {
            PlatformError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message.len(), ERROR_BODY_LIMIT);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn connect_refuses_incomplete_credentials() {
        let err = RedditClient::connect(&RedditConfig::default()).await.unwrap_err();
        assert!(matches!(err, PlatformError::Unauthorized(_)));
    }
}
