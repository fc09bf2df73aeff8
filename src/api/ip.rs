use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
    routing::get,
};

use crate::{AppState, Error, resolve::IpInfo, resolve::Resolver, util};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(current_ip))
        .route("/ip", get(current_ip))
        .route("/ip/{ip}", get(query_ip))
}

async fn current_ip(
    State(resolver): State<Arc<Resolver>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<IpInfo>, Error> {
    let ip = util::client_ip(&headers, peer);
    lookup(&resolver, &ip)
}

async fn query_ip(
    State(resolver): State<Arc<Resolver>>,
    Path(ip): Path<String>,
) -> Result<Json<IpInfo>, Error> {
    lookup(&resolver, &ip)
}

fn lookup(resolver: &Resolver, ip: &str) -> Result<Json<IpInfo>, Error> {
    info!("lookup {}", ip);
    let info = resolver.resolve(ip)?;
    Ok(Json(info))
}
