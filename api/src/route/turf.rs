use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::{
    reservation::reserve_slot,
    turf::{
        delete_turf, register_turf, show_availability, show_my_turfs, show_turf,
        show_turf_list, update_turf,
    },
};

pub fn build_turf_routers() -> Router<AppRegistry> {
    let turfs_routers = Router::new()
        .route("/", post(register_turf))
        .route("/", get(show_turf_list))
        .route("/mine", get(show_my_turfs))
        .route("/:turf_id", get(show_turf))
        .route("/:turf_id", put(update_turf))
        .route("/:turf_id", delete(delete_turf))
        .route("/:turf_id/availability", get(show_availability))
        .route("/:turf_id/reservations", post(reserve_slot));

    Router::new().nest("/turfs", turfs_routers)
}
