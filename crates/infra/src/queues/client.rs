use std::sync::Arc;

use nimbus_domain::constants::{CLIENT_ID_HEADER, QUEUES_SERVICE_TYPE};
use nimbus_domain::{
    id_from_href, HomeDocument, Message, MessageId, MessagesPage, NimbusError, PostedMessages,
    QueueName, QueueStatistics, QueuedMessage, QueuesPage, Result,
};
use reqwest::StatusCode;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use super::wire::{next_marker, MessageListing, PostResult, QueueListing};
use crate::context::ServiceContext;
use crate::http::{ApiRequest, HttpClient, Pipeline};
use crate::identity::AccessTokenProvider;

/// Paging options for [`QueueClient::list_queues`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQueuesOptions {
    pub marker: Option<String>,
    pub limit: Option<u32>,
    /// Include each queue's metadata.
    pub detailed: bool,
}

/// Paging and filter options for [`QueueClient::list_messages`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListMessagesOptions {
    pub marker: Option<String>,
    pub limit: Option<u32>,
    /// Include messages posted by this client.
    pub echo: bool,
    /// Include messages currently held by a claim.
    pub include_claimed: bool,
}

/// Client for the queue service.
///
/// Every request carries this client's `Client-ID`. The home document is
/// fetched once per client and reused.
#[derive(Debug, Clone)]
pub struct QueueClient {
    pub(crate) pipeline: Pipeline,
    client_id: Uuid,
}

impl QueueClient {
    /// # Errors
    /// Returns `NimbusError::Config` if the client id cannot be sent as a
    /// header.
    pub fn new(
        http: HttpClient,
        auth: Arc<dyn AccessTokenProvider>,
        region: Option<String>,
        internal: bool,
        client_id: Uuid,
    ) -> Result<Self> {
        let context = Arc::new(ServiceContext::new(QUEUES_SERVICE_TYPE, region, internal));
        let pipeline = Pipeline::new(http, auth, context)
            .with_header(CLIENT_ID_HEADER, &client_id.to_string())?;
        Ok(Self {
            pipeline,
            client_id,
        })
    }

    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    /// Fetch the service's home document, once per client.
    ///
    /// # Errors
    /// Any pipeline error from the first fetch.
    pub async fn home_document(&self, cancel: &CancellationToken) -> Result<Arc<HomeDocument>> {
        if let Some(document) = self.pipeline.context().cached_home_document() {
            return Ok(document);
        }
        let request = ApiRequest::get("").expect_status(&[StatusCode::OK]);
        let document: HomeDocument = self.pipeline.execute_json(&request, cancel).await?;
        Ok(self.pipeline.context().store_home_document(document))
    }

    /// Create a queue. Returns `false` if it already existed.
    ///
    /// # Errors
    /// Any pipeline error.
    pub async fn create_queue(
        &self,
        queue: &QueueName,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let request = ApiRequest::put(queue_path(queue))
            .expect_status(&[StatusCode::CREATED, StatusCode::NO_CONTENT]);
        let response = self.pipeline.execute(&request, cancel).await?;
        let created = response.status == StatusCode::CREATED;
        info!(queue = %queue, created, "create queue");
        Ok(created)
    }

    /// # Errors
    /// Any pipeline error.
    pub async fn delete_queue(
        &self,
        queue: &QueueName,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let request =
            ApiRequest::delete(queue_path(queue)).expect_status(&[StatusCode::NO_CONTENT]);
        self.pipeline.execute(&request, cancel).await?;
        info!(queue = %queue, "deleted queue");
        Ok(())
    }

    /// # Errors
    /// Any pipeline error other than "not found".
    pub async fn queue_exists(
        &self,
        queue: &QueueName,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let request = ApiRequest::head(queue_path(queue)).expect_status(&[
            StatusCode::OK,
            StatusCode::NO_CONTENT,
            StatusCode::NOT_FOUND,
        ]);
        let response = self.pipeline.execute(&request, cancel).await?;
        Ok(response.status != StatusCode::NOT_FOUND)
    }

    /// List one page of queues.
    ///
    /// # Errors
    /// Any pipeline error, or `Validation` for a zero limit.
    pub async fn list_queues(
        &self,
        options: &ListQueuesOptions,
        cancel: &CancellationToken,
    ) -> Result<QueuesPage> {
        validate_limit(options.limit)?;
        let request = ApiRequest::get("queues")
            .query_opt("marker", options.marker.as_deref())
            .query_opt("limit", options.limit)
            .query("detailed", options.detailed)
            .expect_status(&[StatusCode::OK, StatusCode::NO_CONTENT]);

        let response = self.pipeline.execute(&request, cancel).await?;
        if response.status == StatusCode::NO_CONTENT || response.is_empty() {
            return Ok(QueuesPage::default());
        }
        let listing: QueueListing = response.json()?;
        Ok(QueuesPage {
            next_marker: next_marker(&listing.links),
            queues: listing.queues,
        })
    }

    /// # Errors
    /// Any pipeline error.
    pub async fn get_queue_metadata(
        &self,
        queue: &QueueName,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let request = ApiRequest::get(format!("{}/metadata", queue_path(queue)))
            .expect_status(&[StatusCode::OK]);
        self.pipeline.execute_json(&request, cancel).await
    }

    /// Replace the queue's metadata document.
    ///
    /// # Errors
    /// `Validation` if `metadata` is not a JSON object, or any pipeline error.
    pub async fn set_queue_metadata(
        &self,
        queue: &QueueName,
        metadata: &Value,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if !metadata.is_object() {
            return Err(NimbusError::Validation("queue metadata must be a JSON object".into()));
        }
        let request = ApiRequest::put(format!("{}/metadata", queue_path(queue)))
            .json(metadata)?
            .expect_status(&[StatusCode::NO_CONTENT]);
        self.pipeline.execute(&request, cancel).await?;
        Ok(())
    }

    /// # Errors
    /// Any pipeline error.
    pub async fn queue_statistics(
        &self,
        queue: &QueueName,
        cancel: &CancellationToken,
    ) -> Result<QueueStatistics> {
        let request = ApiRequest::get(format!("{}/stats", queue_path(queue)))
            .expect_status(&[StatusCode::OK]);
        self.pipeline.execute_json(&request, cancel).await
    }

    /// Post a batch of messages.
    ///
    /// # Errors
    /// `Validation` for an empty batch, `Decode` for an unreadable resource
    /// list, or any pipeline error.
    pub async fn post_messages(
        &self,
        queue: &QueueName,
        messages: &[Message],
        cancel: &CancellationToken,
    ) -> Result<PostedMessages> {
        if messages.is_empty() {
            return Err(NimbusError::Validation("at least one message is required".into()));
        }
        let request = ApiRequest::post(messages_path(queue))
            .json(messages)?
            .expect_status(&[StatusCode::CREATED]);
        let result: PostResult = self.pipeline.execute_json(&request, cancel).await?;

        let ids = result
            .resources
            .iter()
            .map(|href| {
                id_from_href(href).map(MessageId::new).ok_or_else(|| {
                    NimbusError::Decode(format!("message resource has no identity: {href:?}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(queue = %queue, posted = ids.len(), partial = result.partial, "posted messages");
        Ok(PostedMessages {
            partial: result.partial,
            ids,
        })
    }

    /// List one page of messages.
    ///
    /// # Errors
    /// Any pipeline error, or `Validation` for a zero limit.
    pub async fn list_messages(
        &self,
        queue: &QueueName,
        options: &ListMessagesOptions,
        cancel: &CancellationToken,
    ) -> Result<MessagesPage> {
        validate_limit(options.limit)?;
        let request = ApiRequest::get(messages_path(queue))
            .query_opt("marker", options.marker.as_deref())
            .query_opt("limit", options.limit)
            .query("echo", options.echo)
            .query("include_claimed", options.include_claimed)
            .expect_status(&[StatusCode::OK, StatusCode::NO_CONTENT]);

        let response = self.pipeline.execute(&request, cancel).await?;
        if response.status == StatusCode::NO_CONTENT || response.is_empty() {
            return Ok(MessagesPage::default());
        }
        let listing: MessageListing = response.json()?;
        Ok(MessagesPage {
            next_marker: next_marker(&listing.links),
            messages: listing.messages,
        })
    }

    /// # Errors
    /// `NotFound` if the message does not exist, or any pipeline error.
    pub async fn get_message(
        &self,
        queue: &QueueName,
        message: &MessageId,
        cancel: &CancellationToken,
    ) -> Result<QueuedMessage> {
        let request =
            ApiRequest::get(message_path(queue, message)).expect_status(&[StatusCode::OK]);
        self.pipeline.execute_json(&request, cancel).await
    }

    /// Fetch several messages by identity. Unknown identities are skipped
    /// by the server.
    ///
    /// # Errors
    /// Any pipeline error.
    pub async fn get_messages(
        &self,
        queue: &QueueName,
        messages: &[MessageId],
        cancel: &CancellationToken,
    ) -> Result<Vec<QueuedMessage>> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }
        let request = ApiRequest::get(messages_path(queue))
            .query("ids", join_ids(messages))
            .expect_status(&[StatusCode::OK, StatusCode::NO_CONTENT]);

        let response = self.pipeline.execute(&request, cancel).await?;
        if response.status == StatusCode::NO_CONTENT || response.is_empty() {
            return Ok(Vec::new());
        }
        response.json()
    }

    /// Bulk delete. The server only deletes messages that are not claimed.
    ///
    /// # Errors
    /// Any pipeline error.
    pub async fn delete_messages(
        &self,
        queue: &QueueName,
        messages: &[MessageId],
        cancel: &CancellationToken,
    ) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }
        let request = ApiRequest::delete(messages_path(queue))
            .query("ids", join_ids(messages))
            .expect_status(&[StatusCode::NO_CONTENT]);
        self.pipeline.execute(&request, cancel).await?;
        debug!(queue = %queue, count = messages.len(), "deleted messages");
        Ok(())
    }
}

pub(crate) fn queue_path(queue: &QueueName) -> String {
    format!("queues/{queue}")
}

pub(crate) fn messages_path(queue: &QueueName) -> String {
    format!("queues/{queue}/messages")
}

pub(crate) fn message_path(queue: &QueueName, message: &MessageId) -> String {
    format!("queues/{queue}/messages/{message}")
}

fn join_ids(messages: &[MessageId]) -> String {
    messages.iter().map(MessageId::as_str).collect::<Vec<_>>().join(",")
}

fn validate_limit(limit: Option<u32>) -> Result<()> {
    match limit {
        Some(0) => Err(NimbusError::Validation("limit must be greater than zero".into())),
        _ => Ok(()),
    }
}
