//! Claim endpoints of the queue service

use async_trait::async_trait;
use chrono::Duration;
use nimbus_core::MessageQueuePort;
use nimbus_domain::{
    id_from_href, ClaimBody, ClaimId, ClaimRequest, ClaimSnapshot, MessageId, NimbusError,
    QueueName, QueuedMessage, Result,
};
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::client::{message_path, queue_path, QueueClient};
use crate::errors::status_error;
use crate::http::ApiRequest;

fn claims_path(queue: &QueueName) -> String {
    format!("{}/claims", queue_path(queue))
}

fn claim_path(queue: &QueueName, claim: &ClaimId) -> String {
    format!("{}/claims/{claim}", queue_path(queue))
}

#[async_trait]
impl MessageQueuePort for QueueClient {
    async fn create_claim(
        &self,
        queue: &QueueName,
        request: &ClaimRequest,
        cancel: &CancellationToken,
    ) -> Result<Option<ClaimSnapshot>> {
        let api = ApiRequest::post(claims_path(queue))
            .query_opt("limit", request.limit)
            .json(&ClaimBody {
                ttl: request.ttl,
                grace: Some(request.grace),
            })?
            .expect_status(&[StatusCode::CREATED, StatusCode::NO_CONTENT]);

        let response = self.pipeline.execute(&api, cancel).await?;
        if response.status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let location = response
            .location()
            .ok_or_else(|| NimbusError::Decode("claim response has no Location header".into()))?;
        let id = id_from_href(location).ok_or_else(|| {
            NimbusError::Decode(format!("claim location has no identity: {location:?}"))
        })?;
        let messages: Vec<QueuedMessage> = if response.is_empty() {
            Vec::new()
        } else {
            response.json()?
        };

        debug!(queue = %queue, claim = %id, messages = messages.len(), "claim created");
        Ok(Some(ClaimSnapshot {
            id: ClaimId::new(id),
            ttl: request.ttl,
            age: Duration::zero(),
            messages,
        }))
    }

    async fn query_claim(
        &self,
        queue: &QueueName,
        claim: &ClaimId,
        cancel: &CancellationToken,
    ) -> Result<ClaimSnapshot> {
        let api = ApiRequest::get(claim_path(queue, claim)).expect_status(&[StatusCode::OK]);
        self.pipeline.execute_json(&api, cancel).await
    }

    async fn renew_claim(
        &self,
        queue: &QueueName,
        claim: &ClaimId,
        ttl: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let api = ApiRequest::patch(claim_path(queue, claim))
            .json(&ClaimBody { ttl, grace: None })?
            .expect_status(&[StatusCode::NO_CONTENT]);
        self.pipeline.execute(&api, cancel).await?;
        Ok(())
    }

    async fn release_claim(
        &self,
        queue: &QueueName,
        claim: &ClaimId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let api =
            ApiRequest::delete(claim_path(queue, claim)).expect_status(&[StatusCode::NO_CONTENT]);
        self.pipeline.execute(&api, cancel).await?;
        Ok(())
    }

    async fn delete_message(
        &self,
        queue: &QueueName,
        message: &MessageId,
        claim: Option<&ClaimId>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let api = ApiRequest::delete(message_path(queue, message))
            .query_opt("claim_id", claim)
            .expect_status(&[StatusCode::NO_CONTENT, StatusCode::FORBIDDEN, StatusCode::CONFLICT]);

        let response = self.pipeline.execute(&api, cancel).await?;
        match response.status {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::FORBIDDEN | StatusCode::CONFLICT => {
                let holder =
                    claim.map_or_else(|| "no claim".to_string(), |id| format!("claim {id}"));
                Err(NimbusError::ClaimMismatch(format!(
                    "message {message} in queue {queue} is not deletable with {holder}"
                )))
            }
            status => Err(status_error(status, &response.url, &response.text())),
        }
    }
}
