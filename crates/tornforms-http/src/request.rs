//! HTTP request type.
//!
//! [`HttpRequest`] carries what a form needs from a request: its urlencoded
//! arguments and the locale its errors are translated into. It implements
//! [`FormHost`], so forms bind to it through
//! [`with_form`](tornforms_forms::with_form) or
//! [`Form::bind_to`](tornforms_forms::Form::bind_to).

use std::collections::HashMap;
use std::sync::Arc;

use http::{HeaderMap, Method};
use tornforms_core::i18n::Locale;
use tornforms_core::SETTINGS;
use tornforms_forms::{BoundForm, FormHost, RawValue, Translate};

use crate::querydict::QueryDict;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// An HTTP request with parsed arguments.
///
/// # Examples
///
/// ```
/// use tornforms_http::HttpRequest;
///
/// let request = HttpRequest::builder()
///     .method(http::Method::POST)
///     .path("/signup")
///     .query_string("ref=home")
///     .form_body("name=Ada")
///     .header("Accept-Language", "de-DE,de;q=0.9")
///     .build();
///
/// assert_eq!(request.post().get_str("name").as_deref(), Some("Ada"));
/// assert_eq!(request.locale().code(), "de-de");
/// ```
#[derive(Debug)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    get: QueryDict,
    post: QueryDict,
    headers: HeaderMap,
    body: Vec<u8>,
    locale: Locale,
    forms: HashMap<String, BoundForm>,
}

impl HttpRequest {
    /// Creates a new [`HttpRequestBuilder`].
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Creates an `HttpRequest` from request parts and the collected body.
    pub fn from_parts(parts: http::request::Parts, body: Vec<u8>) -> Self {
        let mut builder = Self::builder()
            .method(parts.method)
            .path(parts.uri.path())
            .query_string(parts.uri.query().unwrap_or(""))
            .body(body);
        builder.headers = parts.headers;
        builder.build()
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string, without the leading `?`.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the `Content-Type` header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the query string arguments.
    pub const fn get(&self) -> &QueryDict {
        &self.get
    }

    /// Returns the urlencoded body arguments.
    pub const fn post(&self) -> &QueryDict {
        &self.post
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw request body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the locale errors are translated into.
    pub const fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Returns the form bound under `name`.
    pub fn form(&self, name: &str) -> Option<&BoundForm> {
        self.forms.get(name)
    }

    /// Returns the form bound under `name`, mutably, for adding errors.
    pub fn form_mut(&mut self, name: &str) -> Option<&mut BoundForm> {
        self.forms.get_mut(name)
    }

    /// Returns every value submitted under `key`, query values first.
    ///
    /// Body values come last, so a field that keeps the last value prefers
    /// the body over the query string.
    ///
    /// Values are stripped of surrounding whitespace unless the
    /// `strip_arguments` setting is off.
    pub fn arguments(&self, key: &str) -> Vec<Vec<u8>> {
        let strip = SETTINGS.try_get().map_or(true, |s| s.strip_arguments);

        self.get
            .get_list(key)
            .into_iter()
            .chain(self.post.get_list(key))
            .flatten()
            .map(|value| {
                if strip {
                    trim_ascii_whitespace(value).to_vec()
                } else {
                    value.clone()
                }
            })
            .collect()
    }
}

impl FormHost for HttpRequest {
    fn argument(&self, key: &str) -> Option<RawValue> {
        let values = self.arguments(key);
        if values.is_empty() {
            return None;
        }
        Some(RawValue::List(values.into_iter().map(RawValue::Bytes).collect()))
    }

    fn translator(&self) -> Arc<dyn Translate> {
        Arc::new(self.locale.clone())
    }

    fn attach_form(&mut self, name: &str, form: BoundForm) {
        self.forms.insert(name.to_string(), form);
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: Method,
    path: String,
    query_string: String,
    headers: HeaderMap,
    body: Vec<u8>,
    locale: Option<Locale>,
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query_string: String::new(),
            headers: HeaderMap::new(),
            body: Vec::new(),
            locale: None,
        }
    }
}

impl HttpRequestBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the query string (without leading `?`).
    #[must_use]
    pub fn query_string(mut self, qs: &str) -> Self {
        self.query_string = qs.to_string();
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn content_type(self, ct: &str) -> Self {
        self.header("content-type", ct)
    }

    /// Adds a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Sets a urlencoded body and its content type.
    #[must_use]
    pub fn form_body(self, body: &str) -> Self {
        self.content_type(FORM_URLENCODED).body(body.as_bytes().to_vec())
    }

    /// Overrides the locale negotiated from `Accept-Language`.
    #[must_use]
    pub fn locale(mut self, code: &str) -> Self {
        self.locale = Some(Locale::new(code));
        self
    }

    /// Builds the [`HttpRequest`].
    pub fn build(self) -> HttpRequest {
        let get = QueryDict::parse(&self.query_string);

        let content_type = self
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let post = if content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with(FORM_URLENCODED))
        {
            QueryDict::parse_bytes(&self.body)
        } else {
            QueryDict::new()
        };

        let locale = self
            .locale
            .unwrap_or_else(|| negotiate_locale(&self.headers));

        tracing::trace!(
            method = %self.method,
            path = %self.path,
            locale = %locale,
            "built request"
        );

        HttpRequest {
            method: self.method,
            path: self.path,
            query_string: self.query_string,
            content_type,
            get,
            post,
            headers: self.headers,
            body: self.body,
            locale,
            forms: HashMap::new(),
        }
    }
}

/// Picks the first language named in `Accept-Language`, falling back to the
/// configured language code.
fn negotiate_locale(headers: &HeaderMap) -> Locale {
    let requested = headers
        .get(http::header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|tag| tag.split(';').next())
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && *tag != "*");

    match requested {
        Some(tag) => Locale::new(tag),
        None => SETTINGS
            .try_get()
            .map_or_else(Locale::default, |s| Locale::new(&s.language_code)),
    }
}

fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}
