#[macro_use]
extern crate tracing;

use std::{net::SocketAddr, process, sync::Arc};

use dotenvy::dotenv;
use ipgeo::{
    AppState, Config, Resolver, api,
    geo::{GeoDatabases, provision},
    trace,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    launch_info();
    dotenv().ok();
    let config = Config::load();
    let _log_guard = trace::init(&config.log);

    if let Err(err) = provision::ensure_databases(config.database.files(), &config.download).await {
        error!("failed to provision databases: {}", err);
        process::exit(1);
    }

    let databases = match GeoDatabases::open(&config.database) {
        Ok(databases) => databases,
        Err(err) => {
            error!("failed to open databases: {}", err);
            process::exit(1);
        }
    };
    let state = AppState {
        resolver: Arc::new(Resolver::new(databases, config.language.clone())),
    };
    let app = api::router(state, config.cors);

    let listener = match TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {}: {}", config.addr, err);
            process::exit(1);
        }
    };
    match listener.local_addr() {
        Ok(addr) => info!("listening on http://{}", addr),
        Err(err) => warn!("local address unavailable: {}", err),
    }

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());
    if let Err(err) = server.await {
        error!("server error: {}", err);
    }
    info!("server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

fn launch_info() {
    println!();
    println!(
        "=================== Starting ipgeo {} ===================",
        env!("CARGO_PKG_VERSION")
    );
    println!();
}
