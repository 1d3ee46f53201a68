use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};
use std::sync::Arc;
use slpfilter::blockchain::{Blacklist, ResultCache, RpcTokenInfoSource, SlpClassifier};
use slpfilter::retry::RetryWrapper;
use slpfilter::{rest, AppState, Config, SlpError};

// Builds the blacklist from SLP_BLACKLIST_FILE and SLP_BLACKLIST, merged
fn load_blacklist(config: &Config) -> Result<Blacklist, SlpError> {
    let blacklist = match &config.blacklist_file {
        Some(path) => Blacklist::from_file(path)?,
        None => Blacklist::default(),
    };
    if let Some(list) = &config.blacklist {
        blacklist.add_list(list);
    }
    Ok(blacklist)
}

// Wires the token info source, cache, blacklist and classifier owned by this process
fn build_state(config: &Config) -> Result<AppState, SlpError> {
    let source = Arc::new(RpcTokenInfoSource::new(&config.rpc_url, &config.rpc_user, &config.rpc_password)?);
    let cache = Arc::new(ResultCache::new(source, config.cache_capacity));
    let blacklist = Arc::new(load_blacklist(config)?);
    info!("{} tokens blacklisted", blacklist.len());

    let classifier = SlpClassifier::new(cache, blacklist, RetryWrapper::new(config.retry), config.concurrency);
    Ok(AppState::new(classifier))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // A missing .env file is fine; the real environment still applies
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("{}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    let state = build_state(&config).map_err(|e| {
        error!("Failed to start: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    info!(
        "Starting SLP filter on {} (concurrency {}, {} retries)",
        config.bind_addr, config.concurrency, config.retry.attempts
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(rest::configure)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
