use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// Logistician
///
/// A person handling deliveries for a district. Serialized with camelCase field names
/// (`fullName`, `phoneNumber`) for the web client.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Logistician {
    pub id: Uuid,
    pub full_name: String,
    pub phone_number: String,
    pub gender: String,
    pub address: String,
}

impl Logistician {
    /// The fixed record served by `GET /logisticians`. The id is fresh on every call.
    pub fn sample() -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: "John Doe".to_string(),
            phone_number: "0712121212".to_string(),
            gender: "Name".to_string(),
            address: "Kabwe".to_string(),
        }
    }
}

/// DistrictList
///
/// Key to district-name mapping served by `GET /district-list`. Serializes as a plain
/// JSON object.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[serde(transparent)]
#[ts(export)]
pub struct DistrictList(pub BTreeMap<String, String>);

impl DistrictList {
    pub fn sample() -> Self {
        Self(BTreeMap::from([
            ("name".to_string(), "District 1".to_string()),
            ("name2".to_string(), "District 2".to_string()),
        ]))
    }
}

/// ServiceInfo
///
/// Name and version of the running service, served by `GET /template`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[ts(export)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
}

impl ServiceInfo {
    pub fn current() -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
