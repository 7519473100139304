use serde::{Deserialize, Serialize};

use crate::error::{NotifyError, Result};

/// `touser` value addressing every member who can see the application.
pub const ALL_USERS: &str = "@all";

const LIST_SEPARATOR: char = '|';

/// Who a message goes to. At least one list must be set.
///
/// Each list is `|`-separated: up to 1000 users, 100 departments and 100
/// tags. With `touser = "@all"` the department and tag lists are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceiver {
    #[serde(rename = "touser", default)]
    pub to_user: String,
    #[serde(rename = "toparty", default)]
    pub to_party: String,
    #[serde(rename = "totag", default)]
    pub to_tag: String,
}

impl MessageReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            to_user: ALL_USERS.to_owned(),
            ..Self::default()
        }
    }

    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.to_user = join_list(users);
        self
    }

    pub fn with_parties<I, S>(mut self, parties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.to_party = join_list(parties);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.to_tag = join_list(tags);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.to_user.is_empty() && self.to_party.is_empty() && self.to_tag.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(NotifyError::MissingReceiver);
        }
        Ok(())
    }
}

fn join_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join("|")
}

/// Split a `|`-separated list as returned by the API, skipping empty entries.
pub fn split_list(raw: &str) -> Vec<&str> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}
