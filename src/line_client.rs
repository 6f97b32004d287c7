use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::models::{ErrorResponse, Profile, ReplyRequest, SendMessage};

const REQUEST_ID_HEADER: &str = "x-line-request-id";

#[derive(Debug, thiserror::Error)]
pub enum LineApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Messaging API returned {status}: {error}")]
    Api {
        status: StatusCode,
        request_id: Option<String>,
        error: ErrorResponse,
    },
}

/// Messaging API client bound to one channel access token.
#[derive(Clone)]
pub struct LineClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl LineClient {
    pub fn new(http: reqwest::Client, base_url: Url, access_token: String) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    pub fn build_http(timeout: Duration) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(timeout)
            .build()
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, LineApiError> {
        let mut url = self.base_url.join("v2/bot/profile/")?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(user_id);

        let res = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let res = check_status(res).await?;

        Ok(res.json::<Profile>().await?)
    }

    pub async fn reply_message(
        &self,
        reply_token: &str,
        messages: Vec<SendMessage>,
    ) -> Result<(), LineApiError> {
        let url = self.base_url.join("v2/bot/message/reply")?;
        let payload = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages,
        };

        let res = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await?;
        let res = check_status(res).await?;

        if let Some(request_id) = request_id(&res) {
            debug!("Reply accepted, request id {}", request_id);
        }
        Ok(())
    }
}

fn request_id(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, LineApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let request_id = request_id(&res);
    let body = res
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    let error = serde_json::from_str::<ErrorResponse>(&body).unwrap_or_else(|_| ErrorResponse {
        message: body,
        details: Vec::new(),
    });

    Err(LineApiError::Api {
        status,
        request_id,
        error,
    })
}
