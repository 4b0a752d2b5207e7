use crate::model::id::{TurfId, UserId};
use chrono::{DateTime, Utc};

pub mod event;

/// Upper bound on a turf's price per player, in integer currency units.
pub const MAX_PRICE_PER_PLAYER: i64 = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Turf {
    pub turf_id: TurfId,
    pub owner_id: UserId,
    pub name: String,
    pub city: String,
    pub price_per_player: i64,
    // 1 スロットあたりの最大プレイヤー数
    pub capacity: i32,
    pub sports: Vec<String>,
    pub description: String,
    pub cover_image: String,
    pub gallery_images: Vec<String>,
    pub map_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Turf {
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.owner_id == *user_id
    }
}

/// Filter for the public turf listing.
#[derive(Debug, Default, Clone)]
pub struct TurfListFilter {
    pub city: Option<String>,
    pub search: Option<String>,
}

impl TurfListFilter {
    // city は完全一致、search は名前か都市名の部分一致（いずれも大文字小文字を区別しない）
    pub fn matches(&self, turf: &Turf) -> bool {
        let city_ok = self
            .city
            .as_deref()
            .map_or(true, |city| turf.city.eq_ignore_ascii_case(city));
        let search_ok = self.search.as_deref().map_or(true, |q| {
            let q = q.to_lowercase();
            turf.name.to_lowercase().contains(&q) || turf.city.to_lowercase().contains(&q)
        });
        city_ok && search_ok
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn turf_named(name: &str, capacity: i32) -> Turf {
        Turf {
            capacity,
            ..turf(name, "Mumbai")
        }
    }

    fn turf(name: &str, city: &str) -> Turf {
        Turf {
            turf_id: TurfId::new(),
            owner_id: "owner-1".parse().unwrap(),
            name: name.into(),
            city: city.into(),
            price_per_player: 100,
            capacity: 22,
            sports: vec!["Football".into()],
            description: String::new(),
            cover_image: "https://img.example/cover.jpg".into(),
            gallery_images: vec![],
            map_link: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn filter_matches_city_and_search_case_insensitively() {
        let t = turf("Greenfield Turf", "Mumbai");
        let by_city = TurfListFilter {
            city: Some("mumbai".into()),
            search: None,
        };
        assert!(by_city.matches(&t));

        let by_name = TurfListFilter {
            city: None,
            search: Some("green".into()),
        };
        assert!(by_name.matches(&t));

        let miss = TurfListFilter {
            city: Some("Pune".into()),
            search: Some("green".into()),
        };
        assert!(!miss.matches(&t));
    }
}
