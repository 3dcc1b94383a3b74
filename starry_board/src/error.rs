use serenity::http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StarboardError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("discord error: {0}")]
    Discord(#[from] serenity::Error),
}

/// Whether Discord answered 404, i.e. the message or channel is gone.
pub fn is_unknown_resource(e: &serenity::Error) -> bool {
    match e {
        serenity::Error::Http(err) => {
            let err: &HttpError = err;
            matches!(err, HttpError::UnsuccessfulRequest(r) if r.status_code.as_u16() == 404)
        }
        _ => false,
    }
}
