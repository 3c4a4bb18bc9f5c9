//! Field mapping from NetSuite customers to Repzo client bodies.

use bridge_traits::crm::{ClientBody, Financials, IntegrationMeta};
use bridge_traits::source::SourceCustomer;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

/// Formats NetSuite uses for `lastmodifieddate`, depending on account
/// preferences. Naive values are read as UTC.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %I:%M %p", "%m/%d/%Y %H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// `{namespace}_{source id}`, the join key between both systems.
pub fn composite_id(namespace: &str, source_id: &str) -> String {
    format!("{}_{}", namespace, source_id)
}

/// Parse a timestamp from either system.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

/// Credit limit as a number; empty input is omitted, non-numeric input is
/// omitted with a warning.
pub fn credit_limit(customer: &SourceCustomer) -> Option<f64> {
    let raw = customer.credit_limit.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            warn!(
                customer_id = %customer.id,
                credit_limit = raw,
                "Ignoring non-numeric credit limit"
            );
            None
        }
    }
}

/// Company name, falling back to the alternate name.
pub fn display_name(customer: &SourceCustomer) -> Option<String> {
    non_empty(&customer.company_name).or_else(|| non_empty(&customer.alt_name))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

fn base_body(customer: &SourceCustomer) -> ClientBody {
    ClientBody {
        name: display_name(customer),
        email: customer.email.clone(),
        phone: customer.phone.clone(),
        comment: customer.comments.clone(),
        financials: credit_limit(customer).map(|limit| Financials {
            credit_limit: Some(limit),
        }),
        ..Default::default()
    }
}

/// Body for a client that does not exist in Repzo yet.
pub fn create_body(customer: &SourceCustomer, namespace: &str, synced_at: &str) -> ClientBody {
    ClientBody {
        client_code: Some(format!(
            "{}-{}",
            customer.id,
            customer.entity_id.as_deref().unwrap_or_default()
        )),
        integration_meta: Some(IntegrationMeta {
            composite_id: Some(composite_id(namespace, &customer.id)),
            netsuite_id: Some(customer.id.clone()),
            netsuite_last_sync: Some(synced_at.to_string()),
        }),
        ..base_body(customer)
    }
}

/// Partial body for an already linked client. Link ids are left alone.
pub fn update_body(customer: &SourceCustomer, synced_at: &str) -> ClientBody {
    ClientBody {
        integration_meta: Some(IntegrationMeta {
            netsuite_last_sync: Some(synced_at.to_string()),
            ..Default::default()
        }),
        ..base_body(customer)
    }
}
