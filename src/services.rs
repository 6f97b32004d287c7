use std::sync::Arc;
use tracing::{Level, debug, error, info, warn};

use crate::error::AppError;
use crate::line_client::{LineApiError, LineClient};
use crate::models::{Event, Message, MessageEvent, SendMessage, Source, WebhookPayload};
use crate::signature;

const PAGE_CHARS: usize = 400;

/// Page estimate for `char_count` characters of 400-character manuscript paper.
///
/// Anything over one page is `char_count / 400 + 1`, so an exact multiple of
/// 400 still gets the extra page (800 characters is "3 pages").
pub fn page_label(char_count: usize) -> String {
    if char_count <= PAGE_CHARS {
        "1 page".to_string()
    } else {
        format!("{} pages", char_count / PAGE_CHARS + 1)
    }
}

/// Reply segments for `text`, in send order.
///
/// With a sender name the reply opens with a "From:" line and uses the short
/// "paper" wording; without one it is three segments with "manuscript paper".
pub fn build_reply(text: &str, display_name: Option<&str>) -> Vec<String> {
    let char_count = text.chars().count();
    let pages = page_label(char_count);

    match display_name {
        Some(name) => vec![
            format!("From: {name}"),
            format!("Received message: {text}"),
            format!("Text length: {char_count}"),
            format!("400-character paper: {pages}"),
        ],
        None => vec![
            format!("Received message: {text}"),
            format!("Text length: {char_count}"),
            format!("400-character manuscript paper: {pages}"),
        ],
    }
}

/// Log lines for a Messaging API failure: a summary, then one line per detail.
pub fn describe_api_error(context: &str, err: &LineApiError) -> Vec<String> {
    match err {
        LineApiError::Api {
            status,
            request_id,
            error: body,
        } => {
            let mut lines = vec![format!(
                "{}: Got exception from LINE Messaging API: {} (status {}, request id {})",
                context,
                body.message,
                status,
                request_id.as_deref().unwrap_or("-")
            )];
            lines.extend(body.details.iter().map(|detail| {
                format!(
                    "  {}: {}",
                    detail.property.as_deref().unwrap_or("-"),
                    detail.message
                )
            }));
            lines
        }
        other => vec![format!("{}: {}", context, other)],
    }
}

/// Logs a Messaging API failure at ERROR, or at WARN for any other `level`.
pub fn log_api_error(level: Level, context: &str, err: &LineApiError) {
    for line in describe_api_error(context, err) {
        if level == Level::ERROR {
            error!("{}", line);
        } else {
            warn!("{}", line);
        }
    }
}

#[derive(Clone)]
pub struct WebhookService {
    client: LineClient,
    channel_secret: Arc<str>,
}

impl WebhookService {
    pub fn new(client: LineClient, channel_secret: impl Into<Arc<str>>) -> Self {
        Self {
            client,
            channel_secret: channel_secret.into(),
        }
    }

    /// Verifies `signature` over `body`, then handles every event in order.
    ///
    /// Only an unauthenticated or unparsable body is an error. Failures while
    /// replying to an individual event are logged and the remaining events are
    /// still handled.
    pub async fn handle(&self, body: &str, signature: &str) -> Result<(), AppError> {
        if !signature::verify(&self.channel_secret, body.as_bytes(), signature) {
            return Err(AppError::InvalidSignature);
        }

        let payload: WebhookPayload = serde_json::from_str(body)?;
        debug!(
            "Webhook for {} with {} event(s)",
            payload.destination.as_deref().unwrap_or("<unknown>"),
            payload.events.len()
        );

        for (index, raw) in payload.events.into_iter().enumerate() {
            let event = match Event::parse(raw) {
                Ok(event) => event,
                Err(e) => {
                    debug!("Skipping malformed event #{}: {}", index, e);
                    continue;
                }
            };
            match event {
                Event::Message(event) => {
                    if let Err(e) = self.handle_message(event).await {
                        log_api_error(Level::ERROR, "Reply failed", &e);
                    }
                }
                Event::Unsupported => debug!("Ignoring unsupported event #{}", index),
            }
        }

        Ok(())
    }

    async fn handle_message(&self, event: MessageEvent) -> Result<(), LineApiError> {
        let Message::Text(message) = event.message else {
            debug!("Ignoring non-text message from {}", event.source);
            return Ok(());
        };
        let Some(reply_token) = event.reply_token else {
            debug!(
                mode = event.mode.as_deref().unwrap_or("-"),
                "Message {} has no reply token, skipping",
                message.id
            );
            return Ok(());
        };

        info!(
            event_id = event.webhook_event_id.as_deref().unwrap_or("-"),
            timestamp = event.timestamp,
            "Text message {} from {}",
            message.id,
            event.source
        );

        let display_name = match &event.source {
            Source::User { user_id } => match self.client.get_profile(user_id).await {
                Ok(profile) => Some(profile.display_name),
                Err(e) => {
                    warn!("Profile lookup for {} failed, replying without sender", user_id);
                    log_api_error(Level::WARN, "Profile lookup failed", &e);
                    None
                }
            },
            Source::Group { .. } | Source::Room { .. } | Source::Unknown => None,
        };

        let messages = build_reply(&message.text, display_name.as_deref())
            .into_iter()
            .map(SendMessage::text)
            .collect();

        self.client.reply_message(&reply_token, messages).await
    }
}
