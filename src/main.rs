#[macro_use]
extern crate rocket;

use rocket::{Build, Rocket};
use std::sync::Arc;
use std::time::Duration;

mod ai;
mod boot;
mod config;
mod error;
mod generator;
mod rate_limit;
mod routes;
mod session;
mod store;
mod tasks;
mod validate;


use generator::BlogGenerator;
use rate_limit::InMemoryRateLimiter;
use store::shopify::ShopifyConnector;
use store::StoreConnector;

/// Everything a request handler needs, shared via Rocket managed state.
pub struct AppState {
    pub generator: BlogGenerator,
    pub stores: Arc<dyn StoreConnector>,
}

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(Arc::new(state))
        .mount("/", routes::routes())
        .register("/", routes::catchers())
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let (config, ai) = boot::run();

    let limiter = Arc::new(InMemoryRateLimiter::new(
        config.rate_limit.max_requests,
        Duration::from_secs(config.rate_limit.window_secs),
    ));
    let generator = BlogGenerator::new(Arc::new(ai), limiter.clone(), &config);
    let state = AppState {
        generator,
        stores: Arc::new(ShopifyConnector::new(config.shopify.clone())),
    };

    build_rocket(state)
        .manage(limiter)
        .attach(tasks::BackgroundTasks {
            cleanup_interval: Duration::from_secs(config.rate_limit.window_secs),
        })
}
