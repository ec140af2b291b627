use axum::{
    extract::State,
    Extension, Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use service::calendar;
use service::views::{self, GridView, ListView};

use crate::errors::JsonApiError;
use crate::extract::ApiQuery;
use crate::routes::auth::{CurrentUser, ServerState};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeekQuery {
    /// Any day of the wanted week; defaults to today
    pub date: Option<String>,
    /// Caller's offset from UTC, -720..=840
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub utc_offset_minutes: Option<i32>,
}

fn offset(minutes: Option<i32>) -> Result<(i32, chrono::FixedOffset), JsonApiError> {
    let minutes = minutes.unwrap_or(0);
    let offset = calendar::offset_from_minutes(minutes).map_err(|e| JsonApiError::bad_request(e.to_string()))?;
    Ok((minutes, offset))
}

#[utoipa::path(get, path = "/views/week", tag = "views", security(("bearer" = [])), params(WeekQuery),
    responses((status = 200, description = "Seven days, Sunday first"), (status = 400, description = "Bad query")))]
pub async fn week(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiQuery(q): ApiQuery<WeekQuery>,
) -> Result<Json<GridView>, JsonApiError> {
    let (minutes, offset) = offset(q.utc_offset_minutes)?;
    let date = match q.date.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => calendar::parse_local_date(raw, offset).map_err(|e| JsonApiError::bad_request(e.to_string()))?,
        None => Utc::now().with_timezone(&offset).date_naive(),
    };
    Ok(Json(views::week_view(&state.db, me.id, date, minutes).await?))
}

#[utoipa::path(get, path = "/views/month", tag = "views", security(("bearer" = [])), params(MonthQuery),
    responses((status = 200, description = "Whole weeks covering the month"), (status = 400, description = "Bad query")))]
pub async fn month(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiQuery(q): ApiQuery<MonthQuery>,
) -> Result<Json<GridView>, JsonApiError> {
    let (minutes, offset) = offset(q.utc_offset_minutes)?;
    let today = Utc::now().with_timezone(&offset).date_naive();
    let year = q.year.unwrap_or(today.year());
    let month = q.month.unwrap_or(today.month());
    Ok(Json(views::month_view(&state.db, me.id, year, month, minutes).await?))
}

#[utoipa::path(get, path = "/views/list", tag = "views", security(("bearer" = [])),
    responses((status = 200, description = "Unlabeled, one column per column label, Done")))]
pub async fn list(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> Result<Json<ListView>, JsonApiError> {
    Ok(Json(views::list_view(&state.db, me.id, Utc::now()).await?))
}
