use crate::model::{
    id::{TurfId, UserId},
    turf::{Turf, MAX_PRICE_PER_PLAYER},
};
use derive_new::new;
use shared::error::{AppError, AppResult};

#[derive(Debug, new)]
pub struct CreateTurf {
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
}

#[derive(Debug)]
pub struct UpdateTurf {
    pub turf_id: TurfId,
    pub requested_user: UserId,
    pub name: Option<String>,
    pub city: Option<String>,
    pub price_per_player: Option<i64>,
    pub capacity: Option<i32>,
    pub sports: Option<Vec<String>>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub gallery_images: Option<Vec<String>>,
    pub map_link: Option<String>,
}

impl UpdateTurf {
    // 変更項目なしの更新イベントを作る
    pub fn new(turf_id: TurfId, requested_user: UserId) -> Self {
        Self {
            turf_id,
            requested_user,
            name: None,
            city: None,
            price_per_player: None,
            capacity: None,
            sports: None,
            description: None,
            cover_image: None,
            gallery_images: None,
            map_link: None,
        }
    }

    /// Applies the requested changes to `turf`.
    ///
    /// Only the owner may edit a listing. `peak_occupancy` is the highest
    /// confirmed occupancy of any slot of the turf; the capacity can never
    /// drop below it, otherwise already admitted reservations would overbook
    /// their slot.
    pub fn apply_to(self, turf: &mut Turf, peak_occupancy: i32) -> AppResult<()> {
        if !turf.is_owned_by(&self.requested_user) {
            return Err(AppError::ForbiddenOperation);
        }

        if let Some(capacity) = self.capacity {
            if capacity < 1 {
                return Err(AppError::InvalidRequest("capacity must be positive".into()));
            }
            if capacity < peak_occupancy {
                return Err(AppError::UnprocessableEntity(format!(
                    "capacity {capacity} is below the {peak_occupancy} players already booked in one slot"
                )));
            }
            turf.capacity = capacity;
        }
        if let Some(price) = self.price_per_player {
            if !(0..=MAX_PRICE_PER_PLAYER).contains(&price) {
                return Err(AppError::InvalidRequest(format!(
                    "price must be between 0 and {MAX_PRICE_PER_PLAYER}"
                )));
            }
            turf.price_per_player = price;
        }
        if let Some(name) = self.name {
            turf.name = name;
        }
        if let Some(city) = self.city {
            turf.city = city;
        }
        if let Some(sports) = self.sports {
            turf.sports = sports;
        }
        if let Some(description) = self.description {
            turf.description = description;
        }
        if let Some(cover_image) = self.cover_image {
            turf.cover_image = cover_image;
        }
        if let Some(gallery_images) = self.gallery_images {
            turf.gallery_images = gallery_images;
        }
        if let Some(map_link) = self.map_link {
            turf.map_link = Some(map_link);
        }
        Ok(())
    }

    /// Whether applying this update needs the turf's peak occupancy.
    pub fn changes_capacity(&self) -> bool {
        self.capacity.is_some()
    }
}

#[derive(Debug, new)]
pub struct DeleteTurf {
    pub turf_id: TurfId,
    pub requested_user: UserId,
}
