use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Reasons a link is refused before being passed to the system opener.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("Invalid link: {0}")]
    Invalid(#[from] url::ParseError),
    #[error("Refusing to open {0} link (only http/https)")]
    UnsupportedScheme(String),
    #[error("Refusing to open link without a host")]
    MissingHost,
    #[error("Refusing to open link to a local address")]
    LocalAddress,
}

/// Check a poster link before `open::that` sees it.
///
/// Only web links to public hosts pass. Anything else could launch a local
/// handler (`file:`, custom schemes) or poke at the local network.
pub fn validate_link(link: &str) -> Result<Url, LinkError> {
    let url = Url::parse(link)?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(LinkError::UnsupportedScheme(other.to_owned())),
    }

    let host = url.host_str().ok_or(LinkError::MissingHost)?;
    if host.eq_ignore_ascii_case("localhost") {
        return Err(LinkError::LocalAddress);
    }

    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if let Ok(ip) = bare.parse::<IpAddr>() {
        if is_local(&ip) {
            return Err(LinkError::LocalAddress);
        }
    }

    Ok(url)
}

fn is_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80
        }
    }
}
