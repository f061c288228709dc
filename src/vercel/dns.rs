//! DNS Records
//!
//! Listing of DNS records for a domain.

use super::client::VercelClient;
use super::context::Context;
use super::error::Result;
use super::http::{path_segment, PreparedRequest};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Largest page size the records endpoint accepts
pub const DNS_RECORDS_PAGE_LIMIT: usize = 100;

/// A single DNS entry of a domain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", alias = "recordType", default)]
    pub record_type: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub ttl: Option<u64>,
    #[serde(default)]
    pub mx_priority: Option<u64>,
    #[serde(default)]
    pub priority: Option<u64>,
    #[serde(default)]
    pub creator: Option<String>,
    /// Creation time in milliseconds since the epoch
    #[serde(default)]
    pub created: Option<i64>,
    /// Team scope of the call that returned this record. Not part of the API payload.
    #[serde(skip)]
    pub team_id: String,
}

impl DnsRecord {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }
}

#[derive(Deserialize)]
struct DnsRecordsResponse {
    #[serde(default)]
    records: Vec<DnsRecord>,
}

impl VercelClient {
    /// List the DNS records of `domain`.
    ///
    /// Only the first page of [`DNS_RECORDS_PAGE_LIMIT`] records is requested;
    /// domains with more records are truncated.
    pub async fn list_dns_records(
        &self,
        ctx: &Context,
        domain: &str,
        team_id: &str,
    ) -> Result<Vec<DnsRecord>> {
        let team_id = self.team_id(team_id);
        let limit = DNS_RECORDS_PAGE_LIMIT.to_string();
        let url = self.url(
            &format!("/v4/domains/{}/records", path_segment("domain", domain)?),
            &[("limit", limit.as_str())],
            team_id,
        );

        let response: DnsRecordsResponse =
            self.http.do_request(ctx, PreparedRequest::get(url)).await?;

        tracing::debug!("Listed {} DNS records for {}", response.records.len(), domain);

        Ok(response
            .records
            .into_iter()
            .take(DNS_RECORDS_PAGE_LIMIT)
            .map(|mut record| {
                record.team_id = team_id.to_string();
                record
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_deserializes_list_shape() {
        let record: DnsRecord = serde_json::from_value(json!({
            "id": "rec_1",
            "slug": "example.com-www-A",
            "name": "www",
            "type": "A",
            "value": "76.76.21.21",
            "ttl": 60,
            "creator": "user_1",
            "created": 1_700_000_000_000i64
        }))
        .unwrap();

        assert_eq!(record.record_type, "A");
        assert_eq!(record.ttl, Some(60));
        assert_eq!(record.mx_priority, None);
        assert!(record.team_id.is_empty());
        assert_eq!(
            record.created_at().unwrap().to_rfc3339(),
            "2023-11-14T22:13:20+00:00"
        );
    }

    #[test]
    fn test_record_accepts_record_type_alias() {
        let record: DnsRecord =
            serde_json::from_value(json!({"id": "rec_2", "recordType": "MX", "mxPriority": 10}))
                .unwrap();
        assert_eq!(record.record_type, "MX");
        assert_eq!(record.mx_priority, Some(10));
        assert!(record.created_at().is_none());
    }

    #[test]
    fn test_team_id_not_serialized() {
        let record = DnsRecord {
            id: "rec_3".into(),
            team_id: "team_1".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("teamId").is_none());
    }
}
