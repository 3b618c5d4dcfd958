use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::assets_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/assets", get(assets_controller::get_list_assets).post(assets_controller::post_add_asset))
        .route("/assets/all", get(assets_controller::get_all_assets))
        .route("/assets/by-symbol/:symbol", get(assets_controller::get_asset))
        .route("/assets/by-symbol/:symbol/delete", post(assets_controller::post_remove_asset))
        .route("/prices/check", post(assets_controller::post_check_prices))
        .route("/portfolio/value", get(assets_controller::get_portfolio_value))
}
