//! Push-messaging transport port trait.

use crate::domain::error::EtfBalanceError;

pub trait PushPort {
    /// POST `body` as JSON with a bearer token. Returns the HTTP status and
    /// response body; `Err` only for transport failures.
    fn post_json(
        &self,
        url: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> Result<(u16, String), EtfBalanceError>;
}
