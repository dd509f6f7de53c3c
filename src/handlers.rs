use axum::Json;

use crate::{
    models::{DistrictList, Logistician, ServiceInfo},
    security::CurrentAuthentication,
};

/// get_logisticians
///
/// [Protected Route] Lists the logisticians. The list is fixed; the caller's identity
/// (if a token was presented) is only logged.
#[utoipa::path(
    get,
    path = "/logisticians",
    responses(
        (status = 200, description = "Logisticians", body = [Logistician]),
        (status = 401, description = "Invalid or missing access token")
    )
)]
pub async fn get_logisticians(
    CurrentAuthentication(context): CurrentAuthentication,
) -> Json<Vec<Logistician>> {
    tracing::debug!(
        principal = context.principal().map(|p| p.name()).unwrap_or("anonymous"),
        "fetching logisticians"
    );
    Json(vec![Logistician::sample()])
}

/// get_district_list
///
/// [Public Route] Returns the district names keyed by slot.
#[utoipa::path(
    get,
    path = "/district-list",
    responses((status = 200, description = "District names", body = DistrictList))
)]
pub async fn get_district_list() -> Json<DistrictList> {
    tracing::debug!("returning district list");
    Json(DistrictList::sample())
}

/// get_service_info
///
/// [Public Route] Service name and version.
#[utoipa::path(
    get,
    path = "/template",
    responses((status = 200, description = "Service info", body = ServiceInfo))
)]
pub async fn get_service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo::current())
}
