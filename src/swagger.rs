use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::NoCandidatesReason;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::round::get_active_round,
        handlers::round::list_rounds,
        handlers::ticket::claim_tickets,
        handlers::statistics::get_leaderboard,
        handlers::statistics::get_number_frequency,
        handlers::events::stream_events,
        handlers::auth::login,
        handlers::admin::start_round,
        handlers::admin::toggle_lock,
        handlers::admin::draw_winner,
        handlers::admin::get_snapshot,
        handlers::admin::get_stats,
    ),
    components(
        schemas(
            RoundResponse,
            TicketResponse,
            ActiveRoundView,
            StartRoundRequest,
            LockStateResponse,
            RoundListQuery,
            RoundPage,
            ClaimTicketsRequest,
            ClaimResponse,
            DrawResponse,
            LeaderboardEntry,
            NumberFrequencyEntry,
            RecentWinner,
            AdminSnapshot,
            AdminStats,
            LoginRequest,
            AuthResponse,
            NoCandidatesReason,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "round", description = "Active round and round history"),
        (name = "ticket", description = "Ticket claiming"),
        (name = "statistics", description = "Cross-round statistics"),
        (name = "auth", description = "Operator login"),
        (name = "admin", description = "Operator actions"),
    ),
    info(
        title = "Lottery Backend API",
        version = "1.0.0",
        description = "Numbered-ticket lottery: rounds, claims, draws and statistics"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
