use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{DrawService, RoundService, StatisticsService};
use crate::utils::Claims;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// Operator subject set by the auth middleware, for logging
fn operator_from_request(req: &HttpRequest) -> String {
    req.extensions()
        .get::<Claims>()
        .map(|c| c.sub.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Start-round body: empty means "use the default name", anything else must
/// be a valid `StartRoundRequest`
fn parse_start_request(body: &[u8]) -> AppResult<StartRoundRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StartRoundRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::ValidationError(format!("Invalid round request: {e}")))
}

#[utoipa::path(
    post,
    path = "/admin/rounds",
    tag = "admin",
    request_body = StartRoundRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "New round started; the previous one is archived", body = RoundResponse),
        (status = 400, description = "Invalid round name or malformed body"),
        (status = 401, description = "Unauthorized")
    )
)]
/// Archive the active round and open a new one with fresh tickets
pub async fn start_round(
    service: web::Data<RoundService>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let request = match parse_start_request(&body) {
        Ok(request) => request,
        Err(e) => return Ok(e.error_response()),
    };
    log::info!("Round start requested by {}", operator_from_request(&req));
    match service.start_new_round(request.name.as_deref()).await {
        Ok(round) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": round,
            "message": "New round started"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/rounds/active/lock",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "New lock state", body = LockStateResponse),
        (status = 404, description = "No active round"),
        (status = 401, description = "Unauthorized")
    )
)]
/// Pause or resume claiming in the active round
pub async fn toggle_lock(
    service: web::Data<RoundService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    log::info!("Lock toggle requested by {}", operator_from_request(&req));
    match service.toggle_lock().await {
        Ok(state) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": state }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/draw",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Winning ticket", body = DrawResponse),
        (status = 404, description = "No active round"),
        (status = 409, description = "No eligible tickets (empty_pot or no_unique_winners_left)"),
        (status = 401, description = "Unauthorized")
    )
)]
/// Draw one winner among eligible tickets of the active round
pub async fn draw_winner(service: web::Data<DrawService>, req: HttpRequest) -> Result<HttpResponse> {
    log::info!("Draw requested by {}", operator_from_request(&req));
    match service.draw_winner().await {
        Ok(winner) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": winner }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/snapshot",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Active round, eligible pot and total taken", body = AdminSnapshot),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_snapshot(service: web::Data<StatisticsService>) -> Result<HttpResponse> {
    match service.get_admin_snapshot().await {
        Ok(snapshot) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": snapshot }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Hall of fame, winning numbers and recent winners", body = AdminStats),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_stats(service: web::Data<StatisticsService>) -> Result<HttpResponse> {
    match service.get_admin_stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": stats }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/rounds", web::post().to(start_round))
            .route("/rounds/active/lock", web::post().to(toggle_lock))
            .route("/draw", web::post().to(draw_winner))
            .route("/snapshot", web::get().to(get_snapshot))
            .route("/stats", web::get().to(get_stats)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn empty_body_uses_default_name() {
        assert!(parse_start_request(b"").unwrap().name.is_none());
        assert!(parse_start_request(b"  \n").unwrap().name.is_none());
    }

    #[test]
    fn named_body_is_parsed() {
        let request = parse_start_request(br#"{"name":"Friday"}"#).unwrap();
        assert_eq!(request.name.as_deref(), Some("Friday"));
    }

    #[test]
    fn malformed_body_is_rejected() {
        assert_matches!(
            parse_start_request(br#"{"name": 42}"#),
            Err(AppError::ValidationError(_))
        );
        assert_matches!(
            parse_start_request(b"name=Friday"),
            Err(AppError::ValidationError(_))
        );
    }
}
