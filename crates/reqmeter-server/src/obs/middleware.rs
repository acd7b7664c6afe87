//! HTTP metrics middleware.
//!
//! Every request opens a [`RequestTimer`]; the timer records exactly once when
//! it is dropped. A request that completes records its real status. A request
//! whose future is dropped first (client went away, task cancelled, handler
//! panicked) records status [`ABORTED_STATUS`].

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;
use crate::obs::HttpMetrics;

/// Status label for requests that never produced a response.
pub const ABORTED_STATUS: &str = "aborted";

/// Route label: the matched template if routing resolved one, else the raw path.
pub fn route_label(matched: Option<&MatchedPath>, path: &str) -> String {
    match matched {
        Some(m) => m.as_str().to_string(),
        None => path.to_string(),
    }
}

/// Timing window for one request.
pub struct RequestTimer {
    metrics: HttpMetrics,
    method: String,
    route: String,
    start: Instant,
    status: Option<StatusCode>,
}

impl RequestTimer {
    pub fn start(metrics: HttpMetrics, method: &str, route: String) -> Self {
        Self {
            metrics,
            method: method.to_string(),
            route,
            start: Instant::now(),
            status: None,
        }
    }

    /// Close the window with the response status.
    pub fn finish(mut self, status: StatusCode) {
        self.status = Some(status);
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        let status = match self.status {
            Some(s) => s.as_u16().to_string(),
            None => ABORTED_STATUS.to_string(),
        };
        if let Err(e) = self.metrics.record(&self.method, &self.route, &status, elapsed) {
            tracing::warn!(error = %e, route = %self.route, "request metrics not recorded");
        }
    }
}

/// Records duration and count for every request passing through the router.
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let route = route_label(req.extensions().get::<MatchedPath>(), req.uri().path());
    let timer = RequestTimer::start(state.http_metrics().clone(), req.method().as_str(), route);

    let response = next.run(req).await;

    timer.finish(response.status());
    response
}
