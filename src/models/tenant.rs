use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: i32,
    pub cognito_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

/// SQL fragment rendering a `tenants` row (alias `t`) as camelCase JSON.
pub const TENANT_JSON: &str = "json_build_object(\
 'id', t.id,\
 'cognitoId', t.cognito_id,\
 'name', t.name,\
 'email', t.email,\
 'phoneNumber', t.phone_number)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fragment_matches_serde_keys() {
        let tenant = Tenant {
            id: 1,
            cognito_id: "us-east-1:abc".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone_number: "555-0100".into(),
        };
        let json = serde_json::to_value(&tenant).unwrap();
        for key in json.as_object().unwrap().keys() {
            assert!(TENANT_JSON.contains(&format!("'{}'", key)), "missing {key}");
        }
    }
}
