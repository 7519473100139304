use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::token::Token;
use crate::client::Notifier;
use crate::error::{NotifyError, Result};
use crate::message::envelope::Envelope;
use crate::message::options::MessageOptions;
use crate::message::receiver::MessageReceiver;
use crate::message::result::MessageResult;
use crate::message::Message;
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR, OUTCOME_OK, OUTCOME_REMOTE_ERROR};
use crate::utils::constants::PATH_MESSAGE_SEND;

impl Notifier {
    /// Send `message` to `receiver`.
    ///
    /// A reply rejecting the access token (42001 / 40014) triggers exactly one
    /// forced refresh and one resend; whatever the resend returns is final.
    /// A resend may duplicate a delivery the API had already accepted.
    pub async fn send(
        &self,
        receiver: &MessageReceiver,
        message: &Message,
        options: Option<&MessageOptions>,
    ) -> Result<MessageResult> {
        let envelope = Envelope::build(receiver, self.agent_id, message, options)?;
        let metrics = get_metrics().await;
        let start = Instant::now();

        let sent = self.send_envelope(&envelope).await;

        metrics
            .message_send_duration
            .with_label_values(&[envelope.msgtype])
            .observe(start.elapsed().as_secs_f64());
        let outcome = match &sent {
            Ok(result) if result.is_ok() => OUTCOME_OK,
            Ok(_) => OUTCOME_REMOTE_ERROR,
            Err(_) => OUTCOME_ERROR,
        };
        metrics.messages_sent.with_label_values(&[envelope.msgtype, outcome]).inc();
        sent
    }

    /// Send a message given as a raw `msgtype` and JSON payload.
    ///
    /// Everything is checked before any request: the payload must not be
    /// null, the receiver must name someone, and `msgtype` must be known.
    pub async fn send_value(
        &self,
        receiver: &MessageReceiver,
        msgtype: &str,
        payload: Value,
        options: Option<&MessageOptions>,
    ) -> Result<MessageResult> {
        if payload.is_null() {
            return Err(NotifyError::MissingMessage);
        }
        receiver.validate()?;
        let message = Message::from_value(msgtype, payload)?;
        self.send(receiver, &message, options).await
    }

    async fn send_envelope(&self, envelope: &Envelope) -> Result<MessageResult> {
        let token = self.tokens.get_token().await?;
        let result = self.post_message(&token, envelope).await?;
        if !result.is_token_error() {
            log_result(envelope, &result);
            return Ok(result);
        }

        warn!(
            "send message: token rejected ({} {}), refreshing and resending once",
            result.errcode, result.errmsg
        );
        get_metrics().await.message_token_retries.inc();
        let token = self.tokens.force_refresh(&token.value).await?;
        let result = self.post_message(&token, envelope).await?;
        log_result(envelope, &result);
        Ok(result)
    }

    async fn post_message(&self, token: &Token, envelope: &Envelope) -> Result<MessageResult> {
        let url = format!("{}{}", self.tokens.api_base(), PATH_MESSAGE_SEND);
        let response = self
            .client
            .post(&url)
            .query(&[("access_token", token.value.as_str())])
            .json(envelope)
            .send()
            .await
            .map_err(NotifyError::http("send message request error"))?;
        let body = response
            .bytes()
            .await
            .map_err(NotifyError::http("send message request error"))?;

        serde_json::from_slice(&body).map_err(NotifyError::decode("send message result decode error"))
    }
}

fn log_result(envelope: &Envelope, result: &MessageResult) {
    if !result.is_ok() {
        warn!("send message: '{}' rejected: {} {}", envelope.msgtype, result.errcode, result.errmsg);
    } else if result.has_invalid_receivers() {
        info!(
            "send message: '{}' sent, invalid receivers user='{}' party='{}' tag='{}'",
            envelope.msgtype, result.invaliduser, result.invalidparty, result.invalidtag
        );
    } else {
        debug!("send message: '{}' sent, msgid '{}'", envelope.msgtype, result.msgid);
    }
}
