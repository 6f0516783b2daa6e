use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Manager {
    pub id: i32,
    pub cognito_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

/// SQL fragment rendering a `managers` row (alias `m`) as camelCase JSON.
pub const MANAGER_JSON: &str = "json_build_object(\
 'id', m.id,\
 'cognitoId', m.cognito_id,\
 'name', m.name,\
 'email', m.email,\
 'phoneNumber', m.phone_number)";
