/// Liveness probe; the pipeline was validated before the listener opened.
pub async fn health_route() -> &'static str {
    "ok"
}
