use super::get_user_id_from_request;
use crate::services::DrawService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/games/{game_id}/draws",
    tag = "draw",
    params(
        ("game_id" = i64, Path, description = "游戏ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽签成功", body = DrawResponse),
        (status = 400, description = "参与者不足或已抽过签"),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是游戏组织者"),
        (status = 404, description = "游戏不存在"),
        (status = 500, description = "未能生成有效分配")
    )
)]
/// 组织者发起抽签:
/// 1. 校验组织者身份与参与人数
/// 2. 随机生成无自送、无互送的分配
/// 3. 在同一事务中写入抽签记录、分配与参与者指向
/// 4. 通知所有送礼人
pub async fn start_draw(
    service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match get_user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.start_draw(user_id, path.into_inner()).await {
        Ok(draw) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": draw }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/games/{game_id}/draws",
    tag = "draw",
    params(
        ("game_id" = i64, Path, description = "游戏ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取抽签历史成功", body = [DrawSummaryResponse]),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是游戏组织者"),
        (status = 404, description = "游戏不存在")
    )
)]
/// 游戏的抽签历史（新的在前）
pub async fn list_draws(
    service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match get_user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list_draws(user_id, path.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/draws/{draw_id}",
    tag = "draw",
    params(
        ("draw_id" = i64, Path, description = "抽签ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取抽签详情成功", body = DrawResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是游戏组织者"),
        (status = 404, description = "抽签不存在")
    )
)]
pub async fn get_draw(
    service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match get_user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.get_draw(user_id, path.into_inner()).await {
        Ok(draw) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": draw }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn draw_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/games/{game_id}/draws")
            .route(web::post().to(start_draw))
            .route(web::get().to(list_draws)),
    )
    .route("/draws/{draw_id}", web::get().to(get_draw));
}
