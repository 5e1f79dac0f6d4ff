extern crate diesel;
extern crate dotenv;

pub mod app;
pub mod database;
pub mod schema;

mod auth;
mod routes;
mod service;

use std::io;

use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use dotenv::dotenv;

use app::{config::Config, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let app_state = AppState::new(&config).map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    log::info!("Server running on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(app_state.clone()))
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
