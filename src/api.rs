use crate::error::{ApiError, Result};
use crate::models::{Credentials, Event, EventData, EventFilter, EventPatch, SignupData, User};
use log::{debug, warn};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

/// Where the backend lives when nobody says otherwise.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";

/// Cookie Django drops on us from `GET /users/csrf/`.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Header the CSRF cookie value gets echoed into (`X-CSRFToken` on the wire,
/// lowercase here so it can go straight into `HeaderName::from_static`).
pub const CSRF_HEADER: &str = "x-csrftoken";

/// Per-request knobs for [`ApiClient::fetch_with_auth`].
///
/// Caller headers are layered on top of the defaults, so anything set here wins.
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<String>,
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let encoded = serde_json::to_string(body).map_err(|err| ApiError::Json {
            message: format!("Could not encode request body: {err}"),
        })?;
        self.body = Some(encoded);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Thin wrapper around the Speak Football REST API.
///
/// Owns the cookie jar that stands in for the browser's cookie store. The
/// session cookie and the CSRF cookie both live there and ride along on
/// every request automatically.
pub struct ApiClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
    cached_user: Mutex<Option<User>>,
}

impl ApiClient {
    /// Creates a client for the backend at `origin` (e.g. `http://localhost:8000`).
    /// All endpoints hang off `<origin>/api/`.
    pub fn new(origin: &str) -> Result<Self> {
        Self::with_jar(origin, Arc::new(Jar::default()))
    }

    /// Same as [`ApiClient::new`] but with a jar the caller already seeded.
    pub fn with_jar(origin: &str, jar: Arc<Jar>) -> Result<Self> {
        let base_url = api_base(origin)?;
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|err| {
                warn!("Could not build HTTP client: {err}");
                ApiError::Network
            })?;

        Ok(Self {
            http,
            jar,
            base_url,
            cached_user: Mutex::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Everything in the jar for the API, formatted like a `Cookie` header.
    pub fn cookie_header(&self) -> Option<String> {
        self.jar
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Puts a cookie back into the jar, scoped to the whole API origin.
    pub fn restore_cookie(&self, name: &str, value: &str) {
        self.jar
            .add_cookie_str(&format!("{name}={value}; Path=/"), &self.base_url);
    }

    /// Current CSRF cookie value, if the server ever handed us one.
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.cookie_header()?;
        cookie_value(&header, CSRF_COOKIE).map(str::to_string)
    }

    /// The locally mirrored user. Best effort, the server session is the truth.
    pub fn cached_user(&self) -> Option<User> {
        self.cached_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn remember_user(&self, user: Option<User>) {
        *self
            .cached_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = user;
    }

    /// Hits the CSRF endpoint so the server sets the cookie in our jar.
    ///
    /// Only a transport failure counts as failure here. A non-2xx answer is
    /// logged and otherwise ignored, the follow-up request will complain if
    /// the cookie really never showed up.
    pub async fn ensure_csrf_token(&self) -> Result<()> {
        let url = self.endpoint("users/csrf/")?;
        debug!("Priming CSRF cookie via {url}");

        match self.http.get(url).send().await {
            Ok(response) => {
                if !response.status().is_success() {
                    warn!("CSRF endpoint answered {}", response.status());
                }
                Ok(())
            }
            Err(err) => {
                warn!("Failed to get CSRF token: {err}");
                Err(ApiError::CsrfToken)
            }
        }
    }

    /// Default headers: JSON content type, plus the CSRF echo when we have a cookie.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = self.csrf_token() {
            if let Ok(value) = HeaderValue::from_str(&token) {
                headers.insert(HeaderName::from_static(CSRF_HEADER), value);
            }
        }

        headers
    }

    /// The one request path everything goes through.
    ///
    /// 1. Mutating verbs without a CSRF cookie prime one first (and wait for it)
    /// 2. Default headers get merged with the caller's (caller wins)
    /// 3. Non-2xx responses become an [`ApiError`] carrying the server's message
    pub async fn fetch_with_auth(&self, url: Url, options: RequestOptions) -> Result<Response> {
        if is_state_changing(&options.method) && self.csrf_token().is_none() {
            self.ensure_csrf_token().await?;
        }

        let mut headers = self.headers();
        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }

        debug!("{} {}", options.method, url);
        let mut request = self.http.request(options.method, url).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|err| {
            debug!("Request never got a response: {err}");
            ApiError::Network
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let err = ApiError::from_body(&body);
            debug!("Request failed ({status}): {err}");
            return Err(err);
        }

        Ok(response)
    }

    // Auth

    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        let url = self.endpoint("users/login/")?;
        let options = RequestOptions::method(Method::POST).json(credentials)?;
        let user: User = parse(self.fetch_with_auth(url, options).await?).await?;
        self.remember_user(Some(user.clone()));
        Ok(user)
    }

    pub async fn signup(&self, data: &SignupData) -> Result<User> {
        let url = self.endpoint("users/register/")?;
        let options = RequestOptions::method(Method::POST).json(data)?;
        let user: User = parse(self.fetch_with_auth(url, options).await?).await?;
        self.remember_user(Some(user.clone()));
        Ok(user)
    }

    /// Ends the server session. The mirrored user only goes away if the server agreed.
    pub async fn logout(&self) -> Result<()> {
        let url = self.endpoint("users/logout/")?;
        self.fetch_with_auth(url, RequestOptions::method(Method::POST))
            .await?;
        self.remember_user(None);
        Ok(())
    }

    /// Who we are according to the session cookie, or `None`.
    ///
    /// Never fails. A 401, a dead server and a garbage body all read as
    /// "not logged in"; the reason only shows up in debug logs.
    ///
    /// When the server itself turns the session down (expired, logged out
    /// elsewhere) the mirrored user is dropped too. Transport trouble leaves
    /// it alone.
    pub async fn current_user(&self) -> Option<User> {
        let url = self.endpoint("users/me/").ok()?;
        let result = match self.fetch_with_auth(url, RequestOptions::default()).await {
            Ok(response) => parse::<User>(response).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(user) => {
                self.remember_user(Some(user.clone()));
                Some(user)
            }
            Err(err) => {
                debug!("No current user: {err}");
                if matches!(err, ApiError::Response { .. }) {
                    self.remember_user(None);
                }
                None
            }
        }
    }

    // Events

    /// `/events/` with `lat`, `lng` and `radius` appended only when given.
    pub fn events_url(&self, filter: &EventFilter) -> Result<Url> {
        let mut url = self.endpoint("events/")?;
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    pub async fn events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let url = self.events_url(filter)?;
        parse(self.fetch_with_auth(url, RequestOptions::default()).await?).await
    }

    pub async fn event(&self, id: i64) -> Result<Event> {
        let url = self.endpoint(&format!("events/{id}/"))?;
        parse(self.fetch_with_auth(url, RequestOptions::default()).await?).await
    }

    pub async fn create_event(&self, data: &EventData) -> Result<Event> {
        let url = self.endpoint("events/")?;
        let options = RequestOptions::method(Method::POST).json(data)?;
        parse(self.fetch_with_auth(url, options).await?).await
    }

    pub async fn update_event(&self, id: i64, patch: &EventPatch) -> Result<Event> {
        let url = self.endpoint(&format!("events/{id}/"))?;
        let options = RequestOptions::method(Method::PATCH).json(patch)?;
        parse(self.fetch_with_auth(url, options).await?).await
    }

    pub async fn delete_event(&self, id: i64) -> Result<()> {
        let url = self.endpoint(&format!("events/{id}/"))?;
        self.fetch_with_auth(url, RequestOptions::method(Method::DELETE))
            .await?;
        Ok(())
    }

    pub async fn participate(&self, id: i64) -> Result<()> {
        let url = self.endpoint(&format!("events/{id}/participate/"))?;
        self.fetch_with_auth(url, RequestOptions::method(Method::POST))
            .await?;
        Ok(())
    }

    pub async fn leave_event(&self, id: i64) -> Result<()> {
        let url = self.endpoint(&format!("events/{id}/participate/"))?;
        self.fetch_with_auth(url, RequestOptions::method(Method::DELETE))
            .await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::InvalidUrl(format!("{path}: {err}")))
    }
}

/// Turns a backend origin into the `/api/` base every endpoint is joined onto.
pub fn api_base(origin: &str) -> Result<Url> {
    let origin = origin.trim().trim_end_matches('/');
    let url = Url::parse(&format!("{origin}/api/"))
        .map_err(|err| ApiError::InvalidUrl(format!("{origin}: {err}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::InvalidUrl(format!(
            "{origin}: unsupported scheme {other}"
        ))),
    }
}

/// POST, PUT, PATCH and DELETE need a CSRF token. Reads don't.
pub fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Pulls one cookie's value out of a `name=value; other=value` string.
/// Empty values count as missing.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    cookie_pairs(header)
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Splits a `Cookie` header into `(name, value)` pairs.
pub fn cookie_pairs(header: &str) -> impl Iterator<Item = (&str, &str)> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    response.json::<T>().await.map_err(|err| ApiError::Json {
        message: format!("Invalid server response: {err}"),
    })
}
