pub mod auth;
pub mod projects;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (protected by JWT via the AuthenticatedUser extractor) ──
    cfg.service(web::scope("/auth").route("/me", web::get().to(auth::me)));

    // ── Project routes ──
    // Fixed segments go first so they are not captured by `/{id_or_slug}`.
    cfg.service(
        web::scope("/projects")
            .route("", web::get().to(projects::get_projects))
            .route("", web::post().to(projects::create_project))
            .route("/mine", web::get().to(projects::get_my_projects))
            .route("/mine/{id_or_slug}", web::get().to(projects::get_my_project))
            .route("/favorites", web::get().to(projects::get_favorites))
            .route("/{id_or_slug}", web::get().to(projects::get_project))
            .route("/{id_or_slug}", web::put().to(projects::update_project))
            .route("/{id_or_slug}", web::delete().to(projects::delete_project))
            .route("/{id_or_slug}/close", web::post().to(projects::close_project))
            .route("/{id}/favorite", web::post().to(projects::toggle_favorite)),
    );
}
