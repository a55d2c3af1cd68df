use actix_cors::Cors;
use actix_web::http::header;

/// Lottery pages are served from another origin; operator calls use bearer
/// tokens, so no cookies or credentials cross origins.
pub fn create_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600)
}
