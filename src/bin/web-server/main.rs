use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use random_dish::{config::Config, rakuten::RakutenClient, selector::DishSelector, state};
use tracing_subscriber::EnvFilter;

mod api;
mod page;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(true)
        .with_file(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("fail to setup logging")?;

    let config = Config::load()?;
    let gateway = RakutenClient::new(config.gateway).context("fail to build rakuten client")?;

    let app_state = Arc::new(state::AppState::new());
    state::spawn_category_load(app_state.clone(), gateway.clone());

    let data = web::Data::new(api::ApiState::new(app_state, DishSelector::new(gateway)));
    let cors_origin = config.cors_origin;

    tracing::info!("listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allowed_origin(&cors_origin)
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(data.clone())
            .service(api::index)
            .service(api::generate_dish)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;
    Ok(())
}
