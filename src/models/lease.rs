use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::property::Property;
use super::tenant::Tenant;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lease {
    pub id: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rent: Decimal,
    pub deposit: Decimal,
    pub property_id: i32,
    pub tenant_cognito_id: String,
}

impl Lease {
    /// Rent falls due monthly; the next payment lands one month after the
    /// lease start.
    pub fn next_payment_date(&self) -> DateTime<Utc> {
        self.start_date + Months::new(1)
    }
}

/// SQL fragment rendering a `leases` row (alias `ls`) as camelCase JSON.
pub const LEASE_JSON: &str = "json_build_object(\
 'id', ls.id,\
 'startDate', ls.start_date,\
 'endDate', ls.end_date,\
 'rent', ls.rent,\
 'deposit', ls.deposit,\
 'propertyId', ls.property_id,\
 'tenantCognitoId', ls.tenant_cognito_id)";

/// Lease annotated with its computed next payment date, used by the
/// applications listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseWithNextPayment {
    #[serde(flatten)]
    pub lease: Lease,
    pub next_payment_date: DateTime<Utc>,
}

impl From<Lease> for LeaseWithNextPayment {
    fn from(lease: Lease) -> Self {
        let next_payment_date = lease.next_payment_date();
        Self {
            lease,
            next_payment_date,
        }
    }
}

/// Lease joined with its tenant, as returned by `GET /properties/:id/leases`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseWithTenant {
    #[serde(flatten)]
    pub lease: Lease,
    pub tenant: Tenant,
}

#[derive(Debug, FromRow)]
pub struct LeaseWithTenantRow {
    #[sqlx(flatten)]
    pub lease: Lease,
    pub tenant: Json<Tenant>,
}

impl From<LeaseWithTenantRow> for LeaseWithTenant {
    fn from(row: LeaseWithTenantRow) -> Self {
        Self {
            lease: row.lease,
            tenant: row.tenant.0,
        }
    }
}

/// Lease joined with both parties, as returned by `GET /leases`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseWithParties {
    #[serde(flatten)]
    pub lease: Lease,
    pub tenant: Tenant,
    pub property: Property,
}

#[derive(Debug, FromRow)]
pub struct LeaseWithPartiesRow {
    #[sqlx(flatten)]
    pub lease: Lease,
    pub tenant: Json<Tenant>,
    pub property: Json<Property>,
}

impl From<LeaseWithPartiesRow> for LeaseWithParties {
    fn from(row: LeaseWithPartiesRow) -> Self {
        Self {
            lease: row.lease,
            tenant: row.tenant.0,
            property: row.property.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lease_starting(start: DateTime<Utc>) -> Lease {
        Lease {
            id: 1,
            start_date: start,
            end_date: start + Months::new(12),
            rent: Decimal::new(1200, 0),
            deposit: Decimal::new(1200, 0),
            property_id: 9,
            tenant_cognito_id: "us-east-1:ten".into(),
        }
    }

    #[test]
    fn next_payment_is_one_month_after_start() {
        let start = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
        let lease = lease_starting(start);
        assert_eq!(
            lease.next_payment_date(),
            Utc.with_ymd_and_hms(2025, 4, 15, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn month_arithmetic_clamps_short_months() {
        let start = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
        let lease = lease_starting(start);
        assert_eq!(
            lease.next_payment_date(),
            Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn annotated_lease_flattens_fields() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let annotated = LeaseWithNextPayment::from(lease_starting(start));
        let json = serde_json::to_value(&annotated).unwrap();
        assert!(json.get("startDate").is_some());
        assert!(json.get("nextPaymentDate").is_some());
    }
}
