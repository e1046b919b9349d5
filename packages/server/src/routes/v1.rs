use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/buyers", buyer_routes(config))
        .routes(routes!(handlers::health::health))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn buyer_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let listing = OpenApiRouter::new()
        .routes(routes!(handlers::buyer::list_buyers))
        .routes(routes!(handlers::upload::list_uploads))
        .routes(routes!(
            handlers::upload::get_upload,
            handlers::upload::delete_upload
        ));

    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::buyer::upload_buyers))
        .layer(handlers::buyer::upload_body_limit(config.upload.max_file_size));

    listing.merge(upload)
}
