use rocket::http::{ContentType, Status};
use rocket::{Build, Rocket, Shutdown};
use starry_metrics::serialize_metrics;
use tokio::sync::oneshot::{self, Receiver};

#[rocket::get("/metrics")]
fn metrics() -> Result<(ContentType, Vec<u8>), Status> {
    match serialize_metrics() {
        Ok(body) => Ok((ContentType::Plain, body)),
        Err(e) => {
            tracing::warn!("failed to encode metrics: {}", e);
            Err(Status::InternalServerError)
        }
    }
}

#[rocket::get("/")]
fn root() -> &'static str {
    "This server doesn't have any content. Go away. *waves you away*"
}

/// The metrics server, listening on every interface at `port`.
pub fn build(port: u16) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));
    rocket::custom(figment).mount("/", rocket::routes![metrics, root])
}

async fn _start(port: u16, tx: oneshot::Sender<Shutdown>) {
    let r = match build(port).ignite().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("failed to ignite metrics server: {}", e);
            return;
        }
    };

    if tx.send(r.shutdown()).is_err() {
        tracing::warn!("shutdown receiver was dropped before the metrics server started");
    }

    if let Err(e) = r.launch().await {
        tracing::warn!("error while starting metrics server: {}", e)
    };
}

/// Spawns the metrics server. The receiver yields its shutdown handle once it's ignited.
pub fn start(port: u16) -> Receiver<Shutdown> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(_start(port, tx));
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::local::blocking::Client;

    #[test]
    fn root_waves_you_away() {
        let client = Client::tracked(build(0)).unwrap();
        let response = client.get("/").dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert!(response.into_string().unwrap().contains("Go away"));
    }

    #[test]
    fn metrics_are_plain_text() {
        let client = Client::tracked(build(0)).unwrap();
        let response = client.get("/metrics").dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.content_type(), Some(ContentType::Plain));
    }
}
