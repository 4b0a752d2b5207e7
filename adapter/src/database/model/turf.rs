use chrono::{DateTime, Utc};
use kernel::model::{
    id::{TurfId, UserId},
    turf::Turf,
};

#[derive(sqlx::FromRow)]
pub struct TurfRow {
    pub turf_id: TurfId,
    pub owner_id: UserId,
    pub name: String,
    pub city: String,
    pub price_per_player: i64,
    pub capacity: i32,
    pub sports: Vec<String>,
    pub description: String,
    pub cover_image: String,
    pub gallery_images: Vec<String>,
    pub map_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TurfRow> for Turf {
    fn from(value: TurfRow) -> Self {
        let TurfRow {
            turf_id,
            owner_id,
            name,
            city,
            price_per_player,
            capacity,
            sports,
            description,
            cover_image,
            gallery_images,
            map_link,
            created_at,
        } = value;
        Turf {
            turf_id,
            owner_id,
            name,
            city,
            price_per_player,
            capacity,
            sports,
            description,
            cover_image,
            gallery_images,
            map_link,
            created_at,
        }
    }
}
