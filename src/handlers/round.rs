use crate::models::*;
use crate::services::RoundService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/rounds/active",
    tag = "round",
    responses(
        (status = 200, description = "Active round and its ticket grid (round is null when none is active)", body = ActiveRoundView)
    )
)]
/// Active round with all tickets ordered by number
pub async fn get_active_round(service: web::Data<RoundService>) -> Result<HttpResponse> {
    match service.get_active_round_view().await {
        Ok(view) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": view }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/rounds",
    tag = "round",
    params(
        ("page" = Option<u32>, Query, description = "Page (default 1)"),
        ("per_page" = Option<u32>, Query, description = "Page size (default 20)")
    ),
    responses(
        (status = 200, description = "Round history, newest first", body = RoundPage)
    )
)]
/// Round history including archived rounds
pub async fn list_rounds(
    service: web::Data<RoundService>,
    query: web::Query<RoundListQuery>,
) -> Result<HttpResponse> {
    match service.list_rounds(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn round_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rounds")
            .route("", web::get().to(list_rounds))
            .route("/active", web::get().to(get_active_round)),
    );
}
