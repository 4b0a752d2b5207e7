use chrono::{DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::{TurfId, UserId},
    turf::{
        event::{CreateTurf, UpdateTurf},
        Turf, TurfListFilter,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTurfRequest {
    #[garde(length(min = 1, max = 100))]
    pub name: String,
    #[garde(length(min = 1, max = 100))]
    pub city: String,
    #[garde(range(min = 0, max = 1_000_000))]
    pub price_per_player: i64,
    // 省略時は設定値の既定定員を使う
    #[garde(range(min = 1, max = 1000))]
    pub capacity: Option<i32>,
    #[serde(default)]
    #[garde(skip)]
    pub sports: Vec<String>,
    #[serde(default)]
    #[garde(length(max = 2000))]
    pub description: String,
    #[garde(length(min = 1))]
    pub cover_image: String,
    #[serde(default)]
    #[garde(skip)]
    pub gallery_images: Vec<String>,
    #[garde(skip)]
    pub map_link: Option<String>,
}

impl CreateTurfRequest {
    pub fn into_event(self, owner_id: UserId, default_capacity: i32) -> CreateTurf {
        let CreateTurfRequest {
            name,
            city,
            price_per_player,
            capacity,
            sports,
            description,
            cover_image,
            gallery_images,
            map_link,
        } = self;
        CreateTurf {
            owner_id,
            name,
            city,
            price_per_player,
            capacity: capacity.unwrap_or(default_capacity),
            sports,
            description,
            cover_image,
            gallery_images,
            map_link,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTurfRequest {
    #[garde(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[garde(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[garde(range(min = 0, max = 1_000_000))]
    pub price_per_player: Option<i64>,
    #[garde(range(min = 1, max = 1000))]
    pub capacity: Option<i32>,
    #[garde(skip)]
    pub sports: Option<Vec<String>>,
    #[garde(length(max = 2000))]
    pub description: Option<String>,
    #[garde(length(min = 1))]
    pub cover_image: Option<String>,
    #[garde(skip)]
    pub gallery_images: Option<Vec<String>>,
    #[garde(skip)]
    pub map_link: Option<String>,
}

#[derive(new)]
pub struct UpdateTurfRequestWithIds(TurfId, UserId, UpdateTurfRequest);
impl From<UpdateTurfRequestWithIds> for UpdateTurf {
    fn from(value: UpdateTurfRequestWithIds) -> Self {
        let UpdateTurfRequestWithIds(
            turf_id,
            requested_user,
            UpdateTurfRequest {
                name,
                city,
                price_per_player,
                capacity,
                sports,
                description,
                cover_image,
                gallery_images,
                map_link,
            },
        ) = value;
        UpdateTurf {
            turf_id,
            requested_user,
            name,
            city,
            price_per_player,
            capacity,
            sports,
            description,
            cover_image,
            gallery_images,
            map_link,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct TurfListQuery {
    #[garde(length(max = 100))]
    pub city: Option<String>,
    #[garde(length(max = 100))]
    pub search: Option<String>,
}

impl From<TurfListQuery> for TurfListFilter {
    fn from(value: TurfListQuery) -> Self {
        // 空文字は条件なしとして扱う
        let non_blank = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        Self {
            city: non_blank(value.city),
            search: non_blank(value.search),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurfResponse {
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

impl From<Turf> for TurfResponse {
    fn from(value: Turf) -> Self {
        let Turf {
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
        Self {
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurfsResponse {
    pub items: Vec<TurfResponse>,
}

impl From<Vec<Turf>> for TurfsResponse {
    fn from(value: Vec<Turf>) -> Self {
        Self {
            items: value.into_iter().map(TurfResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTurfResponse {
    pub turf_id: TurfId,
}
