use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{DrawStatus, GiftStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::draw::start_draw,
        handlers::draw::list_draws,
        handlers::draw::get_draw,
        handlers::participant::join_game,
        handlers::participant::list_participants,
        handlers::participant::get_recipient,
        handlers::notification::list_notifications,
        handlers::notification::unread_count,
        handlers::notification::mark_as_read,
        handlers::notification::mark_all_as_read,
    ),
    components(
        schemas(
            DrawStatus,
            GiftStatus,
            AssignmentResponse,
            DrawResponse,
            DrawSummaryResponse,
            JoinGameRequest,
            ParticipantResponse,
            RecipientResponse,
            NotificationQuery,
            NotificationResponse,
            UnreadCountResponse,
            MarkAllReadResponse,
            ApiError,
            ApiErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "draw", description = "Secret Santa draw API"),
        (name = "participant", description = "Game participants API"),
        (name = "notification", description = "Notification inbox API"),
    ),
    info(
        title = "Santa Backend API",
        version = "1.0.0",
        description = "Secret Santa gift exchange REST API documentation"
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
