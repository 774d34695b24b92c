use serde::{Deserialize, Serialize};

use crate::{
    api::{
        contracts::{ChannelMessagesSource, MessagePersister, PresenceSource},
        ApiError,
    },
    domain::{message::Message, presence::PresenceSnapshot},
};

/// REST collaborator for persistence and presence polls.
///
/// Every call here is a conventional request/response operation against
/// authoritative server state; the synchronization core consumes these but
/// never retries them, that responsibility stays with the caller.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: String,
    auth_token: Option<String>,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CreateMessageBody<'a> {
    content: &'a str,
    channel_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_message_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct EditMessageBody<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct AddReactionBody<'a> {
    emoji: &'a str,
}

#[derive(Debug, Deserialize)]
struct OnlineUsersResponse {
    online_users: Vec<OnlineUserRecord>,
}

#[derive(Debug, Deserialize)]
struct OnlineUserRecord {
    id: i64,
}

impl HttpApiClient {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.request(builder).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    async fn send_expect_success(&self, builder: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let response = self.request(builder).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    pub async fn edit_message(&self, message_id: i64, content: &str) -> Result<Message, ApiError> {
        let url = self.url(&format!("/messages/{message_id}"));
        self.send_json(self.http.put(url).json(&EditMessageBody { content }))
            .await
    }

    pub async fn delete_message(&self, message_id: i64) -> Result<(), ApiError> {
        let url = self.url(&format!("/messages/{message_id}"));
        self.send_expect_success(self.http.delete(url)).await
    }

    pub async fn add_reaction(&self, message_id: i64, emoji: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/messages/{message_id}/reactions"));
        self.send_expect_success(self.http.post(url).json(&AddReactionBody { emoji }))
            .await
    }

    pub async fn fetch_thread(&self, message_id: i64) -> Result<Vec<Message>, ApiError> {
        let url = self.url(&format!("/messages/{message_id}/thread"));
        self.send_json(self.http.get(url)).await
    }

    pub async fn search_messages(&self, query: &str) -> Result<Vec<Message>, ApiError> {
        let url = self.url("/search/messages");
        self.send_json(self.http.get(url).query(&[("q", query)]))
            .await
    }
}

impl PresenceSource for HttpApiClient {
    async fn fetch_online(&self) -> Result<PresenceSnapshot, ApiError> {
        let url = self.url("/online-users");
        let response: OnlineUsersResponse = self.send_json(self.http.get(url)).await?;

        Ok(PresenceSnapshot {
            online: response
                .online_users
                .into_iter()
                .map(|user| user.id.to_string())
                .collect(),
        })
    }
}

impl ChannelMessagesSource for HttpApiClient {
    async fn fetch_channel_messages(&self, channel_id: &str) -> Result<Vec<Message>, ApiError> {
        let url = self.url(&format!("/channels/{channel_id}/messages"));
        self.send_json(self.http.get(url)).await
    }
}

impl MessagePersister for HttpApiClient {
    async fn create_message(&self, channel_id: &str, content: &str) -> Result<Message, ApiError> {
        let channel_id: i64 = channel_id
            .parse()
            .map_err(|_| ApiError::InvalidChannelId {
                channel_id: channel_id.to_owned(),
            })?;
        let url = self.url("/messages/");

        self.send_json(self.http.post(url).json(&CreateMessageBody {
            content,
            channel_id,
            parent_message_id: None,
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_url_and_path_without_double_slash() {
        let client = HttpApiClient::new("http://localhost:8000/api/", None);

        assert_eq!(
            client.url("/online-users"),
            "http://localhost:8000/api/online-users"
        );
    }

    #[test]
    fn online_users_response_maps_ids_to_strings() {
        let raw = r#"{"online_users":[{"id":7},{"id":42}],"count":2}"#;

        let response: OnlineUsersResponse =
            serde_json::from_str(raw).expect("response should decode");
        let ids: Vec<String> = response
            .online_users
            .into_iter()
            .map(|user| user.id.to_string())
            .collect();

        assert_eq!(ids, vec!["7".to_owned(), "42".to_owned()]);
    }
}
