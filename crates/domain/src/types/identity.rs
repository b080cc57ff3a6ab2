//! Identity service types: access tokens and the service catalog

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tenant the token was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Bearer token with its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: String,
    pub expires: DateTime<Utc>,
    #[serde(default)]
    pub tenant: Option<Tenant>,
}

impl AccessToken {
    /// True when the token expires within `threshold` of `now`.
    pub fn expires_within(&self, threshold: Duration, now: DateTime<Utc>) -> bool {
        self.expires - threshold <= now
    }
}

/// A single service endpoint in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(rename = "publicURL")]
    pub public_url: String,
    #[serde(rename = "internalURL", default)]
    pub internal_url: Option<String>,
    #[serde(rename = "tenantId", default)]
    pub tenant_id: Option<String>,
}

/// Catalog entry for one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCatalogEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// Token plus service catalog returned by authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccess {
    pub token: AccessToken,
    #[serde(default)]
    pub service_catalog: Vec<ServiceCatalogEntry>,
}

impl UserAccess {
    /// Find an endpoint for `service_type`.
    ///
    /// A region-specific endpoint is preferred; an endpoint without a region
    /// (a global service) matches any requested region. With no region
    /// requested, the first endpoint of the service is used.
    pub fn find_endpoint(&self, service_type: &str, region: Option<&str>) -> Option<&Endpoint> {
        let entry = self.service_catalog.iter().find(|entry| entry.service_type == service_type)?;
        let regional = region.and_then(|wanted| {
            entry.endpoints.iter().find(|endpoint| {
                endpoint.region.as_deref().is_some_and(|r| r.eq_ignore_ascii_case(wanted))
            })
        });
        regional
            .or_else(|| entry.endpoints.iter().find(|endpoint| endpoint.region.is_none()))
            .or_else(|| if region.is_none() { entry.endpoints.first() } else { None })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_access() -> UserAccess {
        serde_json::from_value(json!({
            "token": {"id": "abc", "expires": "2030-01-01T00:00:00Z", "tenant": {"id": "1234"}},
            "serviceCatalog": [
                {
                    "name": "cloudQueues",
                    "type": "rax:queues",
                    "endpoints": [
                        {"region": "ORD", "publicURL": "https://ord.queues.example.com/v1/1234",
                         "internalURL": "https://snet-ord.queues.example.com/v1/1234"},
                        {"region": "DFW", "publicURL": "https://dfw.queues.example.com/v1/1234"}
                    ]
                },
                {
                    "name": "cloudDNS",
                    "type": "rax:dns",
                    "endpoints": [{"publicURL": "https://dns.example.com/v1.0/1234"}]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_find_regional_endpoint() {
        let access = sample_access();
        let endpoint = access.find_endpoint("rax:queues", Some("dfw")).unwrap();
        assert_eq!(endpoint.public_url, "https://dfw.queues.example.com/v1/1234");
        assert!(access.find_endpoint("rax:queues", Some("SYD")).is_none());
    }

    #[test]
    fn test_global_endpoint_matches_any_region() {
        let access = sample_access();
        let endpoint = access.find_endpoint("rax:dns", Some("ORD")).unwrap();
        assert_eq!(endpoint.public_url, "https://dns.example.com/v1.0/1234");
    }

    #[test]
    fn test_no_region_uses_first_endpoint() {
        let access = sample_access();
        let endpoint = access.find_endpoint("rax:queues", None).unwrap();
        assert_eq!(endpoint.region.as_deref(), Some("ORD"));
        assert!(access.find_endpoint("rax:compute", None).is_none());
    }

    #[test]
    fn test_token_expiry_threshold() {
        let access = sample_access();
        let expires = access.token.expires;
        assert!(access.token.expires_within(Duration::minutes(5), expires - Duration::minutes(1)));
        assert!(!access.token.expires_within(Duration::minutes(5), expires - Duration::hours(1)));
    }
}
