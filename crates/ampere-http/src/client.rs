//! reqwest implementation of the Transport port

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

use ampere_core::protocol::payloads::{
    ApiInfoPayload, ChannelPayload, EditMessagePayload, MemberListPayload, MemberPayload,
    MessagePayload, ProfilePayload, SendMessagePayload, ServerPayload, UploadedFilePayload,
    UserPayload,
};
use ampere_core::traits::{MessageQuery, Transport};
use ampere_core::value_objects::Ulid;
use ampere_core::{TransportError, TransportResult};

use crate::error::map_request_error;

/// Rate limit body returned with a 429
#[derive(Debug, Deserialize)]
struct RetryBody {
    retry_after: u64,
}

/// REST client holding the authenticated HTTP session
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    file_server: Arc<RwLock<Option<String>>>,
}

impl RestClient {
    /// Create a new RestClient authenticated with a bot token
    pub fn new(api_url: &str, token: &str, user_agent: &str) -> TransportResult<Self> {
        let mut token_value = HeaderValue::from_str(token)
            .map_err(|err| TransportError::Request(format!("invalid token header: {err}")))?;
        token_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-bot-token", token_value);

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(map_request_error)?;

        Ok(Self {
            http,
            base_url: api_url.trim_end_matches('/').to_string(),
            file_server: Arc::new(RwLock::new(None)),
        })
    }

    /// Point uploads at the file server advertised by the node
    pub fn set_file_server_url(&self, url: impl Into<String>) {
        *self.file_server.write() = Some(url.into());
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> TransportResult<T> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(map_request_error)?;
        read_json(response).await
    }
}

async fn check_status(response: Response) -> TransportResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_ms = match response.json::<RetryBody>().await {
            Ok(body) => body.retry_after,
            Err(_) => 0,
        };
        return Err(TransportError::RateLimited { retry_after_ms });
    }
    Err(TransportError::Status {
        status: status.as_u16(),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> TransportResult<T> {
    check_status(response)
        .await?
        .json::<T>()
        .await
        .map_err(map_request_error)
}

async fn read_empty(response: Response) -> TransportResult<()> {
    check_status(response).await.map(|_| ())
}

#[async_trait]
impl Transport for RestClient {
    #[instrument(skip(self))]
    async fn get_api_info(&self) -> TransportResult<ApiInfoPayload> {
        self.get_json("").await
    }

    #[instrument(skip(self))]
    async fn fetch_self(&self) -> TransportResult<UserPayload> {
        self.get_json("users/@me").await
    }

    #[instrument(skip(self))]
    async fn fetch_user(&self, user_id: Ulid) -> TransportResult<UserPayload> {
        self.get_json(&format!("users/{user_id}")).await
    }

    #[instrument(skip(self))]
    async fn fetch_user_profile(&self, user_id: Ulid) -> TransportResult<ProfilePayload> {
        self.get_json(&format!("users/{user_id}/profile")).await
    }

    #[instrument(skip(self))]
    async fn open_dm(&self, user_id: Ulid) -> TransportResult<ChannelPayload> {
        self.get_json(&format!("users/{user_id}/dm")).await
    }

    #[instrument(skip(self))]
    async fn fetch_server(&self, server_id: Ulid) -> TransportResult<ServerPayload> {
        self.get_json(&format!("servers/{server_id}")).await
    }

    #[instrument(skip(self))]
    async fn fetch_member(
        &self,
        server_id: Ulid,
        user_id: Ulid,
    ) -> TransportResult<MemberPayload> {
        self.get_json(&format!("servers/{server_id}/members/{user_id}"))
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_members(&self, server_id: Ulid) -> TransportResult<MemberListPayload> {
        self.get_json(&format!("servers/{server_id}/members")).await
    }

    #[instrument(skip(self))]
    async fn fetch_channel(&self, channel_id: Ulid) -> TransportResult<ChannelPayload> {
        self.get_json(&format!("channels/{channel_id}")).await
    }

    #[instrument(skip(self))]
    async fn fetch_message(
        &self,
        channel_id: Ulid,
        message_id: Ulid,
    ) -> TransportResult<MessagePayload> {
        self.get_json(&format!("channels/{channel_id}/messages/{message_id}"))
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_messages(
        &self,
        channel_id: Ulid,
        query: MessageQuery,
    ) -> TransportResult<Vec<MessagePayload>> {
        let response = self
            .http
            .get(self.url(&format!("channels/{channel_id}/messages")))
            .query(&query)
            .send()
            .await
            .map_err(map_request_error)?;
        read_json(response).await
    }

    #[instrument(skip(self, body))]
    async fn send_message(
        &self,
        channel_id: Ulid,
        body: &SendMessagePayload,
    ) -> TransportResult<MessagePayload> {
        let response = self
            .http
            .post(self.url(&format!("channels/{channel_id}/messages")))
            .json(body)
            .send()
            .await
            .map_err(map_request_error)?;
        read_json(response).await
    }

    #[instrument(skip(self, body))]
    async fn edit_message(
        &self,
        channel_id: Ulid,
        message_id: Ulid,
        body: &EditMessagePayload,
    ) -> TransportResult<()> {
        let response = self
            .http
            .patch(self.url(&format!("channels/{channel_id}/messages/{message_id}")))
            .json(body)
            .send()
            .await
            .map_err(map_request_error)?;
        read_empty(response).await
    }

    #[instrument(skip(self))]
    async fn delete_message(&self, channel_id: Ulid, message_id: Ulid) -> TransportResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("channels/{channel_id}/messages/{message_id}")))
            .send()
            .await
            .map_err(map_request_error)?;
        read_empty(response).await
    }

    #[instrument(skip(self, bytes))]
    async fn upload_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        tag: &str,
    ) -> TransportResult<UploadedFilePayload> {
        let base = self
            .file_server
            .read()
            .clone()
            .ok_or(TransportError::FileServerUnavailable)?;

        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/{}", base.trim_end_matches('/'), tag))
            .multipart(form)
            .send()
            .await
            .map_err(map_request_error)?;
        read_json(response).await
    }
}
