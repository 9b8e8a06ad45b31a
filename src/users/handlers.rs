use actix_web::web;
use actix_web::{Error, HttpRequest, HttpResponse};
use chrono::Utc;

use crate::auth::middleware::authenticated_user;
use crate::db::AppState;
use crate::quota;
use crate::users::model::UserStats;

#[utoipa::path(
    context_path = "/api",
    tag = "Users",
    get,
    path = "/user/stats",
    responses(
        (status = 200, description = "Usage snapshot for the caller", body = UserStats),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn user_stats(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let user_id = authenticated_user(&req)?;
    let user = data.ledger.get_user(user_id).await?;

    let now = Utc::now();
    let documents_this_month = data
        .ledger
        .count_since(user.id, quota::month_start(now))
        .await?;
    let can_create = quota::can_create(data.ledger.as_ref(), &user, now).await?;

    Ok(HttpResponse::Ok().json(UserStats {
        documents_created: user.documents_created,
        subscription_plan: user.plan,
        is_premium: user.is_premium(now),
        can_create_document: can_create,
        documents_this_month,
    }))
}
