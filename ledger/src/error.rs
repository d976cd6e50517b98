use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The response arrived but could not be interpreted.
    #[error("bad response: {0}")]
    BadResponse(String),

    /// The sign-in service failed repeatedly while a login was pending.
    #[error("sign-in polling failed: {0}")]
    SignInUnavailable(String),
}
