use crate::request::ApiRequest;

/// One try of a logical request.
///
/// Carries the retry count and the bearer token to use instead of the token
/// source's value, so the original [`ApiRequest`] is never modified.
#[derive(Debug, Clone)]
pub struct Attempt<'a> {
    request: &'a ApiRequest,
    retries: u8,
    bearer: Option<String>,
}

impl<'a> Attempt<'a> {
    /// Replays allowed per logical request after a `401`.
    pub const MAX_RETRIES: u8 = 1;

    pub fn first(request: &'a ApiRequest) -> Self {
        Self {
            request,
            retries: 0,
            bearer: None,
        }
    }

    pub fn request(&self) -> &'a ApiRequest {
        self.request
    }

    pub fn retries(&self) -> u8 {
        self.retries
    }

    pub fn can_retry(&self) -> bool {
        self.retries < Self::MAX_RETRIES
    }

    /// Token pinned for this attempt, if any.
    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    /// Next attempt, replaying the same request with `access_token`.
    pub fn retry_with(self, access_token: String) -> Self {
        Self {
            request: self.request,
            retries: self.retries + 1,
            bearer: Some(access_token),
        }
    }
}
