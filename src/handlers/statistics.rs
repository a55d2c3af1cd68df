use crate::models::*;
use crate::services::StatisticsService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/stats/leaderboard",
    tag = "statistics",
    responses(
        (status = 200, description = "Owners with the most wins across all rounds", body = [LeaderboardEntry])
    )
)]
pub async fn get_leaderboard(service: web::Data<StatisticsService>) -> Result<HttpResponse> {
    match service.get_leaderboard().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/stats/numbers",
    tag = "statistics",
    responses(
        (status = 200, description = "Ticket numbers that win most often", body = [NumberFrequencyEntry])
    )
)]
pub async fn get_number_frequency(service: web::Data<StatisticsService>) -> Result<HttpResponse> {
    match service.get_number_frequency().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn statistics_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stats")
            .route("/leaderboard", web::get().to(get_leaderboard))
            .route("/numbers", web::get().to(get_number_frequency)),
    );
}
