use crate::models::*;
use crate::services::AllocationService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/tickets/claim",
    tag = "ticket",
    request_body = ClaimTicketsRequest,
    responses(
        (status = 200, description = "All requested tickets claimed", body = ClaimResponse),
        (status = 400, description = "Invalid name or numbers"),
        (status = 404, description = "No active round"),
        (status = 409, description = "Some numbers were already taken; nothing was claimed"),
        (status = 423, description = "Round is locked")
    )
)]
/// Claim tickets in the active round, all or nothing
pub async fn claim_tickets(
    service: web::Data<AllocationService>,
    request: web::Json<ClaimTicketsRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    match service
        .claim_tickets(&request.numbers, &request.owner_name)
        .await
    {
        Ok(claim) => {
            let message = claim.message.clone();
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": claim,
                "message": message
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn ticket_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/tickets").route("/claim", web::post().to(claim_tickets)));
}
