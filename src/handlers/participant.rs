use super::get_user_id_from_request;
use crate::models::*;
use crate::services::ParticipantService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/games/join",
    tag = "participant",
    request_body = JoinGameRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "加入游戏成功", body = ParticipantResponse),
        (status = 400, description = "已在游戏中、秘钥为空或已抽签"),
        (status = 401, description = "未授权"),
        (status = 403, description = "私密游戏不能直接加入"),
        (status = 404, description = "游戏不存在")
    )
)]
/// 通过秘钥加入游戏
pub async fn join_game(
    service: web::Data<ParticipantService>,
    req: HttpRequest,
    payload: web::Json<JoinGameRequest>,
) -> Result<HttpResponse> {
    let user_id = match get_user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.join_game(user_id, &payload.secret_key).await {
        Ok(participant) => {
            Ok(HttpResponse::Ok().json(json!({ "success": true, "data": participant })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/games/{game_id}/participants",
    tag = "participant",
    params(
        ("game_id" = i64, Path, description = "游戏ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取参与者列表成功", body = [ParticipantResponse]),
        (status = 401, description = "未授权"),
        (status = 404, description = "游戏不存在或无权查看")
    )
)]
/// 按报名顺序列出参与者
pub async fn list_participants(
    service: web::Data<ParticipantService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match get_user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list_participants(user_id, path.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/games/{game_id}/recipient",
    tag = "participant",
    params(
        ("game_id" = i64, Path, description = "游戏ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取送礼对象成功", body = RecipientResponse),
        (status = 400, description = "尚未抽签"),
        (status = 401, description = "未授权"),
        (status = 404, description = "未参与该游戏")
    )
)]
/// 当前用户的送礼对象
pub async fn get_recipient(
    service: web::Data<ParticipantService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match get_user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.get_recipient(user_id, path.into_inner()).await {
        Ok(recipient) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": recipient }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn participant_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/games/join", web::post().to(join_game))
        .route(
            "/games/{game_id}/participants",
            web::get().to(list_participants),
        )
        .route("/games/{game_id}/recipient", web::get().to(get_recipient));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middlewares::AuthMiddleware;
    use crate::services::NotificationService;
    use crate::test_support::{create_game, create_user, setup_db};
    use crate::utils::JwtService;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_join_and_list_participants() {
        let db = setup_db().await;
        let jwt = JwtService::new("test-secret", 3600);
        let organizer = create_user(&db, "organizer").await;
        let alice = create_user(&db, "alice").await;
        let game = create_game(&db, organizer.id, false).await;
        let alice_auth = (
            "Authorization",
            format!("Bearer {}", jwt.generate_access_token(alice.id).unwrap()),
        );

        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .app_data(web::Data::new(ParticipantService::new(db.clone())))
                .app_data(web::Data::new(NotificationService::new(db.clone())))
                .service(web::scope("/api/v1").configure(participant_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/games/join")
            .insert_header(alice_auth.clone())
            .set_json(JoinGameRequest {
                secret_key: game.secret_key.clone(),
            })
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["user_id"], alice.id);

        let req = test::TestRequest::post()
            .uri("/api/v1/games/join")
            .insert_header(alice_auth.clone())
            .set_json(JoinGameRequest {
                secret_key: game.secret_key.clone(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/games/{}/participants", game.id))
            .insert_header(alice_auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        // 未抽签时没有送礼对象
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/games/{}/recipient", game.id))
            .insert_header(alice_auth)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
