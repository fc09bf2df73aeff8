use std::{
    future::Future,
    net::SocketAddr,
    pin::Pin,
    task::{Context, Poll},
};

use axum::{
    extract::ConnectInfo,
    http::{Request, Response, StatusCode},
};
use futures_util::ready;
use pin_project_lite::pin_project;
use tokio::time::Instant;
use tower::{Layer, Service};
use yansi::{Color, Paint, Painted};

/// Request log line: peer, method, path, status, latency.
#[derive(Clone)]
pub struct TraceLayer;

impl<S> Layer<S> for TraceLayer {
    type Service = TraceMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceMiddleware { inner }
    }
}

#[derive(Clone)]
pub struct TraceMiddleware<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for TraceMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = TraceFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| String::from("-"));
        let request_line = format!("{} {}", req.method(), req.uri().path());
        TraceFuture {
            response_future: self.inner.call(req),
            start: Instant::now(),
            peer,
            request_line,
        }
    }
}

pin_project! {
    pub struct TraceFuture<F> {
        #[pin]
        response_future: F,
        start: Instant,
        peer: String,
        request_line: String,
    }
}

impl<F, ResBody, E> Future for TraceFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let res = ready!(this.response_future.poll(cx)?);
        let status = res.status();
        let elapsed = this.start.elapsed();
        if status.is_server_error() {
            warn!(
                peer = %this.peer,
                request = %this.request_line,
                status = %paint_status(status),
                elapsed = ?elapsed
            );
        } else {
            info!(
                peer = %this.peer,
                request = %this.request_line.green(),
                status = %paint_status(status),
                elapsed = ?elapsed.rgb(248, 200, 220)
            );
        }
        Poll::Ready(Ok(res))
    }
}

fn paint_status(status: StatusCode) -> Painted<u16> {
    let code = status.as_u16();
    let color = match code {
        100..=199 => Color::Blue,
        200..=299 => Color::Green,
        300..=399 => Color::Cyan,
        400..=499 => Color::Yellow,
        _ => Color::Red,
    };
    Painted::new(code).fg(color)
}
