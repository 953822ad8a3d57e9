use log::trace;
use reqwest::blocking::Client;
use thiserror::Error;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("HTTP request to {url} failed: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },
}

/// Status and body of a completed GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Performs blocking GET requests. Any status code is a successful fetch; only
/// failures of the channel itself are errors.
pub trait HttpFetcher {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError>;
}

impl<T: HttpFetcher + ?Sized> HttpFetcher for &T {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        (**self).get(url)
    }
}

pub struct ReqwestFetcher {
    client: Client,
    token: Option<String>,
}

impl ReqwestFetcher {
    pub fn new(token: Option<String>) -> Result<Self, HttpError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(HttpError::Client)?;
        Ok(ReqwestFetcher { client, token })
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        trace!("GET {}", url);
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let to_error = |source: reqwest::Error| HttpError::Request {
            url: url.to_string(),
            source,
        };
        let response = request.send().map_err(to_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(to_error)?;
        trace!("GET {} returned {}", url, status);
        Ok(HttpResponse { status, body })
    }
}
