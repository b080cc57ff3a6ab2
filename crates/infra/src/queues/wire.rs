//! Response envelopes that never leave this module

use nimbus_domain::{query_param_from_href, Queue, QueuedMessage};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct Link {
    pub rel: String,
    pub href: String,
}

/// Marker of the `rel=next` link, if the page has one.
pub(crate) fn next_marker(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|link| link.rel == "next")
        .and_then(|link| query_param_from_href(&link.href, "marker"))
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueueListing {
    #[serde(default)]
    pub queues: Vec<Queue>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageListing {
    #[serde(default)]
    pub messages: Vec<QueuedMessage>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostResult {
    #[serde(default)]
    pub partial: bool,
    #[serde(default)]
    pub resources: Vec<String>,
}
