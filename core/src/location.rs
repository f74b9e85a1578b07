//! Base URL resolution from a page location.

use std::fmt;

use url::Url;

use crate::error::ApiError;

/// The parts of a page location that make up the API base URL.
///
/// `protocol` keeps the browser convention of a trailing `:` (`"https:"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    protocol: String,
    hostname: String,
    port: Option<u16>,
}

impl Location {
    pub fn new(protocol: &str, hostname: &str, port: Option<u16>) -> Self {
        let protocol = if protocol.ends_with(':') {
            protocol.to_string()
        } else {
            format!("{protocol}:")
        };
        Self {
            protocol,
            hostname: hostname.to_string(),
            port,
        }
    }

    /// Derive a location from an absolute URL. Path, query and fragment are
    /// ignored; a default port for the scheme is dropped.
    pub fn parse(input: &str) -> Result<Self, ApiError> {
        let url = Url::parse(input)
            .map_err(|e| ApiError::Configuration(format!("invalid base URL {input:?}: {e}")))?;
        let hostname = url
            .host_str()
            .ok_or_else(|| ApiError::Configuration(format!("base URL {input:?} has no host")))?;
        Ok(Self::new(url.scheme(), hostname, url.port()))
    }

    /// Read `window.location` of the running page.
    #[cfg(all(feature = "web", target_arch = "wasm32"))]
    pub fn current() -> Result<Self, ApiError> {
        let location = web_sys::window()
            .ok_or_else(|| ApiError::Configuration("no window available".to_string()))?
            .location();
        let read = |value: Result<String, web_sys::wasm_bindgen::JsValue>, what: &str| {
            value.map_err(|e| ApiError::Configuration(format!("location.{what}: {e:?}")))
        };
        let protocol = read(location.protocol(), "protocol")?;
        let hostname = read(location.hostname(), "hostname")?;
        let port = read(location.port(), "port")?;
        let port = if port.is_empty() {
            None
        } else {
            Some(port.parse().map_err(|_| {
                ApiError::Configuration(format!("location.port is not a number: {port}"))
            })?)
        };
        Ok(Self::new(&protocol, &hostname, port))
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// `protocol//hostname[:port]`, with no trailing slash.
    pub fn base_url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}//{}", self.protocol, self.hostname)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}
