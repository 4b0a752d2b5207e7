use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::user::{get_me, register_me};

pub fn build_user_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/me", post(register_me))
        .route("/me", get(get_me));

    Router::new().nest("/users", routers)
}
