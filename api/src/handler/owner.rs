use crate::{
    extractor::AuthorizedUser,
    model::owner::{OwnerBookingsQuery, OwnerBookingsResponse},
};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use kernel::model::aggregation::{OwnerMonthMatrix, YearMonth};
use registry::AppRegistry;
use shared::error::AppResult;

// オーナーが所有する全ターフの月間予約状況（ターフ × 日付 × スロット）
pub async fn show_owner_bookings(
    user: AuthorizedUser,
    Query(query): Query<OwnerBookingsQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<OwnerBookingsResponse>> {
    user.ensure_owner()?;

    let month = match query.month.as_deref() {
        Some(month) => month.parse::<YearMonth>()?,
        None => YearMonth::of(Utc::now().date_naive()),
    };

    let turfs = registry.turf_repository().find_by_owner(user.id()).await?;
    let turf_ids = turfs.iter().map(|turf| turf.turf_id).collect();
    let reservations = registry
        .reservation_repository()
        .find_by_turfs_in_month(turf_ids, month)
        .await?;

    let matrix = OwnerMonthMatrix::build(month, &turfs, reservations);
    Ok(Json(matrix.into()))
}
