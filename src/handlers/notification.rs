use super::get_user_id_from_request;
use crate::models::*;
use crate::services::NotificationService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notification",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)"),
        ("unread_only" = Option<bool>, Query, description = "只看未读")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取通知成功", body = PaginatedResponse<NotificationResponse>),
        (status = 401, description = "未授权")
    )
)]
/// 分页获取收件箱（倒序）
pub async fn list_notifications(
    service: web::Data<NotificationService>,
    req: HttpRequest,
    query: web::Query<NotificationQuery>,
) -> Result<HttpResponse> {
    let user_id = match get_user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list_notifications(user_id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    tag = "notification",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取未读数量成功", body = UnreadCountResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn unread_count(
    service: web::Data<NotificationService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match get_user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.unread_count(user_id).await {
        Ok(unread) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": UnreadCountResponse { unread }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/notifications/{id}/read",
    tag = "notification",
    params(
        ("id" = i64, Path, description = "接收记录ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "标记已读成功", body = NotificationResponse),
        (status = 401, description = "未授权"),
        (status = 404, description = "通知不存在")
    )
)]
/// 标记单条通知为已读（重复标记无副作用）
pub async fn mark_as_read(
    service: web::Data<NotificationService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match get_user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.mark_as_read(user_id, path.into_inner()).await {
        Ok(item) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": item }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/notifications/read-all",
    tag = "notification",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "全部标记已读成功", body = MarkAllReadResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn mark_all_as_read(
    service: web::Data<NotificationService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match get_user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.mark_all_as_read(user_id).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": MarkAllReadResponse { updated }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn notification_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(list_notifications))
            .route("/unread-count", web::get().to(unread_count))
            .route("/read-all", web::post().to(mark_all_as_read))
            .route("/{id}/read", web::post().to(mark_as_read)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middlewares::AuthMiddleware;
    use crate::test_support::{create_user, setup_db};
    use crate::utils::JwtService;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_inbox_endpoints() {
        let db = setup_db().await;
        let jwt = JwtService::new("test-secret", 3600);
        let alice = create_user(&db, "alice").await;
        let bob = create_user(&db, "bob").await;
        for text in ["one", "two"] {
            let n = NotificationService::create_notification(&db, None, text)
                .await
                .unwrap();
            NotificationService::broadcast(&db, &n, &[alice.id]).await.unwrap();
        }
        let alice_auth = (
            "Authorization",
            format!("Bearer {}", jwt.generate_access_token(alice.id).unwrap()),
        );
        let bob_auth = (
            "Authorization",
            format!("Bearer {}", jwt.generate_access_token(bob.id).unwrap()),
        );

        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .app_data(web::Data::new(NotificationService::new(db.clone())))
                .service(web::scope("/api/v1").configure(notification_config)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/notifications?page=1&per_page=10")
            .insert_header(alice_auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["data"][0]["text"], "two");
        let newest_id = body["data"]["data"][0]["id"].as_i64().unwrap();

        // 他人的通知按不存在处理
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/notifications/{newest_id}/read"))
            .insert_header(bob_auth)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/notifications/{newest_id}/read"))
            .insert_header(alice_auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["is_read"], true);

        let req = test::TestRequest::get()
            .uri("/api/v1/notifications?unread_only=true")
            .insert_header(alice_auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total"], 1);

        let req = test::TestRequest::post()
            .uri("/api/v1/notifications/read-all")
            .insert_header(alice_auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["updated"], 1);

        let req = test::TestRequest::get()
            .uri("/api/v1/notifications/unread-count")
            .insert_header(alice_auth)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["unread"], 0);
    }
}
