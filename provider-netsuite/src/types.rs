//! SuiteQL response types
//!
//! Data structures for deserializing `query/v1/suiteql` responses.

use bridge_traits::scalar::{optional_string, required_string};
use bridge_traits::source::{SourceCustomer, SourcePage};
use serde::{Deserialize, Serialize};

/// SuiteQL request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteQlQuery {
    pub q: String,
}

/// SuiteQL collection response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteQlResponse {
    /// Rows matching the query across all pages
    #[serde(default)]
    pub total_results: u64,

    #[serde(default)]
    pub has_more: bool,

    #[serde(default)]
    pub count: u64,

    #[serde(default)]
    pub offset: u64,

    #[serde(default)]
    pub items: Vec<CustomerRow>,
}

/// One `customer` row, columns in SuiteQL's lowercase naming.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRow {
    #[serde(deserialize_with = "required_string")]
    pub id: String,
    #[serde(default, deserialize_with = "optional_string")]
    pub companyname: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    pub altname: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    pub comments: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    pub creditlimit: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    pub lastmodifieddate: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    pub entityid: Option<String>,
}

impl From<CustomerRow> for SourceCustomer {
    fn from(row: CustomerRow) -> Self {
        SourceCustomer {
            id: row.id,
            company_name: row.companyname,
            alt_name: row.altname,
            phone: row.phone,
            email: row.email,
            comments: row.comments,
            credit_limit: row.creditlimit,
            last_modified: row.lastmodifieddate,
            entity_id: row.entityid,
        }
    }
}

impl From<SuiteQlResponse> for SourcePage {
    fn from(response: SuiteQlResponse) -> Self {
        SourcePage {
            total_results: response.total_results,
            has_more: response.has_more,
            items: response.items.into_iter().map(SourceCustomer::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mixed_scalar_columns() {
        let response: SuiteQlResponse = serde_json::from_str(
            r#"{
                "links": [],
                "count": 1,
                "hasMore": false,
                "offset": 0,
                "totalResults": 1,
                "items": [
                    {
                        "links": [],
                        "id": 123,
                        "companyname": "Acme LLC",
                        "creditlimit": 1500.5,
                        "lastmodifieddate": "5/10/2025",
                        "entityid": "CUST-123",
                        "phone": null
                    }
                ]
            }"#,
        )
        .unwrap();

        let page = SourcePage::from(response);
        let customer = &page.items[0];

        assert_eq!(page.total_results, 1);
        assert!(!page.has_more);
        assert_eq!(customer.id, "123");
        assert_eq!(customer.company_name.as_deref(), Some("Acme LLC"));
        assert_eq!(customer.credit_limit.as_deref(), Some("1500.5"));
        assert_eq!(customer.phone, None);
        assert_eq!(customer.alt_name, None);
    }

    #[test]
    fn test_null_id_is_rejected() {
        let result = serde_json::from_str::<CustomerRow>(r#"{"id": null}"#);
        assert!(result.is_err());
    }
}
