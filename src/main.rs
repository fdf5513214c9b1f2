use std::process::ExitCode;

use catalogo::db::{establish_connection_pool, run_migrations};
use catalogo::pagination::PagingParams;
use catalogo::repository::{DieselContext, UnitOfWork};
use catalogo::services::categories::list_categories;
use catalogo::settings::{DEFAULT_CONFIG_PATH, Settings};
use catalogo::token::TokenIssuer;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path =
        std::env::var("APP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let settings = match Settings::load(&config_path) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load settings from {config_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let issuer = match TokenIssuer::new(&settings.token_settings()) {
        Ok(issuer) => issuer,
        Err(e) => {
            log::error!("Invalid token configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Access tokens valid for {} seconds", issuer.lifetime().num_seconds());

    let pool = match establish_connection_pool(&settings.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to open database {}: {e}", settings.database_url);
            return ExitCode::FAILURE;
        }
    };

    match run_migrations(&pool) {
        Ok(applied) => log::info!("Database ready, {applied} migration(s) applied"),
        Err(e) => {
            log::error!("Failed to run migrations: {e}");
            return ExitCode::FAILURE;
        }
    }

    let context = match DieselContext::from_pool(&pool) {
        Ok(context) => context,
        Err(e) => {
            log::error!("Failed to get a database connection: {e}");
            return ExitCode::FAILURE;
        }
    };
    let uow = UnitOfWork::new(context);

    match list_categories(&uow, PagingParams::default()) {
        Ok(page) => {
            let meta = page.metadata();
            log::info!(
                "Catalog holds {} categories over {} page(s)",
                meta.total_count,
                meta.total_pages
            );
            for category in &page {
                log::info!("  #{} {}", category.category_id, category.name);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            ExitCode::FAILURE
        }
    }
}
