//! API endpoint selection
//!
//! UpYun publishes one auto-routing domain and one per carrier. Any other
//! value is taken as a literal base URL override.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

const AUTO_URL: &str = "http://v0.api.upyun.com";
const TELECOM_URL: &str = "http://v1.api.upyun.com";
const UNICOM_URL: &str = "http://v2.api.upyun.com";
const MOBILE_URL: &str = "http://v3.api.upyun.com";

/// Base URL all requests of a client are sent to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Endpoint {
    /// `v0`: the service picks the best carrier
    #[default]
    Auto,
    /// `v1`: China Telecom
    Telecom,
    /// `v2`: China Unicom / Netcom
    Unicom,
    /// `v3`: China Mobile / Tietong
    Mobile,
    /// Caller-supplied base URL, used verbatim
    Custom(String),
}

impl Endpoint {
    /// Resolve an optional route name.
    ///
    /// `v0`..`v3` select the named routes, `None` or an empty string falls
    /// back to [`Endpoint::Auto`], anything else is a custom URL.
    pub fn from_route(route: Option<&str>) -> Self {
        match route {
            None | Some("") | Some("v0") => Endpoint::Auto,
            Some("v1") => Endpoint::Telecom,
            Some("v2") => Endpoint::Unicom,
            Some("v3") => Endpoint::Mobile,
            Some(url) => Endpoint::Custom(url.to_string()),
        }
    }

    /// Base URL; custom values are returned as given
    pub fn url(&self) -> &str {
        match self {
            Endpoint::Auto => AUTO_URL,
            Endpoint::Telecom => TELECOM_URL,
            Endpoint::Unicom => UNICOM_URL,
            Endpoint::Mobile => MOBILE_URL,
            Endpoint::Custom(url) => url,
        }
    }

    /// Join the base URL with an already-encoded request uri
    pub(crate) fn join(&self, uri: &str) -> String {
        let base = self.url().trim_end_matches('/');
        let mut url = String::with_capacity(base.len() + uri.len());
        url.push_str(base);
        url.push_str(uri);
        url
    }
}

impl FromStr for Endpoint {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Endpoint::from_route(Some(s)))
    }
}

impl From<String> for Endpoint {
    fn from(s: String) -> Self {
        Endpoint::from_route(Some(&s))
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        match endpoint {
            Endpoint::Auto => "v0".to_string(),
            Endpoint::Telecom => "v1".to_string(),
            Endpoint::Unicom => "v2".to_string(),
            Endpoint::Mobile => "v3".to_string(),
            Endpoint::Custom(url) => url,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_auto() {
        assert_eq!(Endpoint::default(), Endpoint::Auto);
        assert_eq!(Endpoint::default().url(), "http://v0.api.upyun.com");
    }

    #[test]
    fn test_named_routes() {
        assert_eq!(Endpoint::from_route(Some("v0")).url(), "http://v0.api.upyun.com");
        assert_eq!(Endpoint::from_route(Some("v1")).url(), "http://v1.api.upyun.com");
        assert_eq!(Endpoint::from_route(Some("v2")).url(), "http://v2.api.upyun.com");
        assert_eq!(Endpoint::from_route(Some("v3")).url(), "http://v3.api.upyun.com");
    }

    #[test]
    fn test_missing_route_falls_back_to_auto() {
        assert_eq!(Endpoint::from_route(None), Endpoint::Auto);
        assert_eq!(Endpoint::from_route(Some("")), Endpoint::Auto);
    }

    #[test]
    fn test_custom_url_is_verbatim() {
        let endpoint: Endpoint = "http://www.baidu.com".parse().unwrap();
        assert_eq!(endpoint, Endpoint::Custom("http://www.baidu.com".to_string()));
        assert_eq!(endpoint.url(), "http://www.baidu.com");

        let padded = Endpoint::from_route(Some(" http://127.0.0.1:8080/"));
        assert_eq!(padded, Endpoint::Custom(" http://127.0.0.1:8080/".to_string()));
        assert_eq!(padded.url(), " http://127.0.0.1:8080/");
    }

    #[test]
    fn test_join_strips_trailing_slash() {
        let endpoint = Endpoint::Custom("http://127.0.0.1:8080/".to_string());
        assert_eq!(endpoint.url(), "http://127.0.0.1:8080/");
        assert_eq!(endpoint.join("/bucket/a.txt"), "http://127.0.0.1:8080/bucket/a.txt");
    }

    #[test]
    fn test_serde_uses_route_names() {
        let yaml = serde_yaml::to_string(&Endpoint::Telecom).unwrap();
        assert_eq!(yaml.trim(), "v1");
        let parsed: Endpoint = serde_yaml::from_str("v3").unwrap();
        assert_eq!(parsed, Endpoint::Mobile);
    }
}
