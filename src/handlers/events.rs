use crate::services::RoundEvents;
use actix_web::http::header;
use actix_web::{HttpResponse, web};
use futures_util::stream;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;

#[utoipa::path(
    get,
    path = "/events",
    tag = "round",
    responses(
        (status = 200, description = "Server-sent refresh events (round started, lock toggled, tickets claimed, winner drawn)")
    )
)]
/// Refresh signal stream for ticket grids and operator views
pub async fn stream_events(events: web::Data<RoundEvents>) -> HttpResponse {
    let rx = events.subscribe();

    let body = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(e) => {
                            log::error!("Failed to encode refresh event: {e}");
                            continue;
                        }
                    };
                    let frame = web::Bytes::from(format!("data: {payload}\n\n"));
                    return Some((Ok::<_, Infallible>(frame), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    // client reloads on any event, skipped ones carry nothing extra
                    log::debug!("Refresh subscriber lagged, skipped {skipped} events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(body)
}

pub fn events_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::get().to(stream_events));
}
