use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::message::options::MessageOptions;
use crate::message::receiver::MessageReceiver;
use crate::message::Message;

/// Request body of `message/send`, built fresh for every call.
///
/// The payload sits under a key equal to `msgtype`. Option flags are only
/// present when switched on, and then serialize as `1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub touser: String,
    pub toparty: String,
    pub totag: String,
    pub agentid: i64,
    pub msgtype: &'static str,
    #[serde(flatten)]
    payload: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_id_trans: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_duplicate_check: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_check_interval: Option<u32>,
}

impl Envelope {
    pub fn build(
        receiver: &MessageReceiver,
        agent_id: i64,
        message: &Message,
        options: Option<&MessageOptions>,
    ) -> Result<Self> {
        receiver.validate()?;
        let kind = message.kind();

        let mut payload = Map::with_capacity(1);
        payload.insert(kind.as_str().to_owned(), message.payload()?);

        let mut envelope = Self {
            touser: receiver.to_user.to_owned(),
            toparty: receiver.to_party.to_owned(),
            totag: receiver.to_tag.to_owned(),
            agentid: agent_id,
            msgtype: kind.as_str(),
            payload,
            safe: None,
            enable_id_trans: None,
            enable_duplicate_check: None,
            duplicate_check_interval: None,
        };
        if let Some(options) = options {
            envelope.apply_options(options)?;
        }
        Ok(envelope)
    }

    fn apply_options(&mut self, options: &MessageOptions) -> Result<()> {
        options.validate()?;
        if options.safe {
            self.safe = Some(1);
        }
        if options.enable_id_trans {
            self.enable_id_trans = Some(1);
        }
        if options.enable_duplicate_check {
            self.enable_duplicate_check = Some(1);
            if options.duplicate_check_interval != 0 {
                self.duplicate_check_interval = Some(options.duplicate_check_interval);
            }
        }
        Ok(())
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.get(self.msgtype)
    }
}
