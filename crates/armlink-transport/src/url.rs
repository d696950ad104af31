use crate::error::{Result, TransportError};

/// URL scheme prefix for serial devices.
pub const SERIAL_SCHEME: &str = "serial://";

/// A resolved serial endpoint.
///
/// Accepts a plain device path (`/dev/ttyUSB2`, `COM3`) or a
/// `serial://<path>[:<baud>]` URL. A baud suffix in the URL overrides the
/// configured rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub path: String,
    pub baud_rate: u32,
}

impl LinkTarget {
    /// Resolve `url` against the configured `baud_rate`.
    pub fn parse(url: &str, baud_rate: u32) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(TransportError::InvalidUrl("empty device".to_string()));
        }

        let Some((scheme, rest)) = url.split_once("://") else {
            return Ok(Self {
                path: url.to_string(),
                baud_rate,
            });
        };

        if scheme != SERIAL_SCHEME.trim_end_matches("://") {
            return Err(TransportError::InvalidUrl(format!(
                "unsupported scheme '{scheme}' in {url}"
            )));
        }

        let (path, baud_rate) = match rest.rsplit_once(':') {
            Some((path, baud)) if !baud.is_empty() && baud.bytes().all(|b| b.is_ascii_digit()) => {
                let baud: u32 = baud
                    .parse()
                    .map_err(|_| TransportError::InvalidUrl(format!("invalid baud in {url}")))?;
                if baud == 0 {
                    return Err(TransportError::InvalidUrl(format!("zero baud in {url}")));
                }
                (path, baud)
            }
            _ => (rest, baud_rate),
        };

        if path.is_empty() {
            return Err(TransportError::InvalidUrl(format!("missing device in {url}")));
        }

        Ok(Self {
            path: path.to_string(),
            baud_rate,
        })
    }
}

impl std::fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{SERIAL_SCHEME}{}:{}", self.path, self.baud_rate)
    }
}
