use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::owner::show_owner_bookings;

pub fn build_owner_routers() -> Router<AppRegistry> {
    let routers = Router::new().route("/bookings", get(show_owner_bookings));

    Router::new().nest("/owner", routers)
}
