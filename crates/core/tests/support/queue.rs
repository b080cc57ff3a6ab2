//! In-memory implementation of `MessageQueuePort`
//!
//! Models the server rules the claim protocol depends on: claiming only
//! unclaimed messages, releasing makes messages visible again, and the
//! dual-mode ownership check on delete.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Duration;
use nimbus_core::{CancellationToken, MessageQueuePort};
use nimbus_domain::{
    ClaimId, ClaimRequest, ClaimSnapshot, MessageId, NimbusError, QueueName, QueuedMessage,
    Result,
};
use serde_json::{json, Value};

const DEFAULT_CLAIM_LIMIT: usize = 10;

#[derive(Debug, Clone)]
struct StoredMessage {
    id: String,
    ttl: i64,
    body: Value,
    claimed_by: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredClaim {
    ttl: i64,
    age: i64,
}

#[derive(Debug, Default)]
struct State {
    messages: Vec<StoredMessage>,
    claims: HashMap<String, StoredClaim>,
    next_claim: usize,
    fail_next_release: Option<NimbusError>,
    fail_next_create: Option<NimbusError>,
}

/// Fake queue service with call counters.
#[derive(Debug, Default)]
pub struct InMemoryQueueService {
    state: Mutex<State>,
    pub create_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub renew_calls: AtomicUsize,
    pub release_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl InMemoryQueueService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `count` unclaimed messages with ids `m1..=mN`.
    pub fn with_messages(count: usize) -> Self {
        let service = Self::new();
        {
            let mut state = service.state.lock().unwrap();
            for n in 1..=count {
                state.messages.push(StoredMessage {
                    id: format!("m{n}"),
                    ttl: 600,
                    body: json!({"seq": n}),
                    claimed_by: None,
                });
            }
        }
        service
    }

    pub fn fail_next_release(&self, err: NimbusError) {
        self.state.lock().unwrap().fail_next_release = Some(err);
    }

    pub fn fail_next_create(&self, err: NimbusError) {
        self.state.lock().unwrap().fail_next_create = Some(err);
    }

    /// Simulate the server-side passage of time for a claim.
    pub fn age_claim(&self, claim: &str, seconds: i64) {
        if let Some(stored) = self.state.lock().unwrap().claims.get_mut(claim) {
            stored.age += seconds;
        }
    }

    /// Simulate the server expiring a claim.
    pub fn expire_claim(&self, claim: &str) {
        let mut state = self.state.lock().unwrap();
        state.claims.remove(claim);
        for message in &mut state.messages {
            if message.claimed_by.as_deref() == Some(claim) {
                message.claimed_by = None;
            }
        }
    }

    pub fn remaining_messages(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    pub fn claimed_messages(&self) -> usize {
        self.state.lock().unwrap().messages.iter().filter(|m| m.claimed_by.is_some()).count()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn snapshot(state: &State, queue: &QueueName, claim: &str) -> Option<ClaimSnapshot> {
        let stored = state.claims.get(claim)?;
        let messages = state
            .messages
            .iter()
            .filter(|m| m.claimed_by.as_deref() == Some(claim))
            .map(|m| queued(queue, m, claim))
            .collect();
        Some(ClaimSnapshot {
            id: ClaimId::new(claim),
            ttl: Duration::seconds(stored.ttl),
            age: Duration::seconds(stored.age),
            messages,
        })
    }
}

fn queued(queue: &QueueName, message: &StoredMessage, claim: &str) -> QueuedMessage {
    serde_json::from_value(json!({
        "href": format!("/v1/queues/{queue}/messages/{}?claim_id={claim}", message.id),
        "ttl": message.ttl,
        "age": 0,
        "body": message.body,
    }))
    .unwrap()
}

fn check_cancel(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(NimbusError::Cancelled);
    }
    Ok(())
}

#[async_trait]
impl MessageQueuePort for InMemoryQueueService {
    async fn create_claim(
        &self,
        queue: &QueueName,
        request: &ClaimRequest,
        cancel: &CancellationToken,
    ) -> Result<Option<ClaimSnapshot>> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        check_cancel(cancel)?;
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.fail_next_create.take() {
            return Err(err);
        }

        let limit = request.limit.map_or(DEFAULT_CLAIM_LIMIT, |l| l as usize);
        let available: Vec<usize> = state
            .messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.claimed_by.is_none())
            .map(|(i, _)| i)
            .take(limit)
            .collect();
        if available.is_empty() {
            return Ok(None);
        }

        state.next_claim += 1;
        let claim = format!("c{}", state.next_claim);
        for index in available {
            state.messages[index].claimed_by = Some(claim.clone());
        }
        state.claims.insert(claim.clone(), StoredClaim {
            ttl: request.ttl.num_seconds(),
            age: 0,
        });
        Ok(Self::snapshot(&state, queue, &claim))
    }

    async fn query_claim(
        &self,
        queue: &QueueName,
        claim: &ClaimId,
        cancel: &CancellationToken,
    ) -> Result<ClaimSnapshot> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        check_cancel(cancel)?;
        let state = self.state.lock().unwrap();
        Self::snapshot(&state, queue, claim.as_str())
            .ok_or_else(|| NimbusError::NotFound(format!("claim {claim}")))
    }

    async fn renew_claim(
        &self,
        _queue: &QueueName,
        claim: &ClaimId,
        ttl: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.renew_calls.fetch_add(1, Ordering::SeqCst);
        check_cancel(cancel)?;
        let mut state = self.state.lock().unwrap();
        let stored = state
            .claims
            .get_mut(claim.as_str())
            .ok_or_else(|| NimbusError::NotFound(format!("claim {claim}")))?;
        stored.ttl = ttl.num_seconds();
        stored.age = 0;
        Ok(())
    }

    async fn release_claim(
        &self,
        _queue: &QueueName,
        claim: &ClaimId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        check_cancel(cancel)?;
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.fail_next_release.take() {
            return Err(err);
        }
        if state.claims.remove(claim.as_str()).is_none() {
            return Err(NimbusError::NotFound(format!("claim {claim}")));
        }
        for message in &mut state.messages {
            if message.claimed_by.as_deref() == Some(claim.as_str()) {
                message.claimed_by = None;
            }
        }
        Ok(())
    }

    async fn delete_message(
        &self,
        _queue: &QueueName,
        message: &MessageId,
        claim: Option<&ClaimId>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        check_cancel(cancel)?;
        let mut state = self.state.lock().unwrap();
        let Some(index) = state.messages.iter().position(|m| m.id == message.as_str()) else {
            return Ok(());
        };

        let holder = state.messages[index].claimed_by.clone();
        match (claim, holder.as_deref()) {
            (Some(claim), Some(holder)) if claim.as_str() == holder => {}
            (None, None) => {}
            (Some(claim), _) => {
                return Err(NimbusError::ClaimMismatch(format!(
                    "message {message} is not held by claim {claim}"
                )))
            }
            (None, Some(_)) => {
                return Err(NimbusError::ClaimMismatch(format!("message {message} is claimed")))
            }
        }
        state.messages.remove(index);
        Ok(())
    }
}
