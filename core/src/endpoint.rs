//! Target URL plus headers applied to every request against it.

use url::Url;

/// Endpoint descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    default_headers: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            default_headers: Vec::new(),
        }
    }

    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?))
    }

    /// Add a default header. Headers are applied in the order they were added.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.default_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }
}

impl From<Url> for Endpoint {
    fn from(url: Url) -> Self {
        Self::new(url)
    }
}
