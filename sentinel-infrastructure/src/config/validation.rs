use anyhow::{anyhow, Result};

pub fn validate_bind_addr(value: &str) -> Result<()> {
    value
        .parse::<std::net::SocketAddr>()
        .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
    Ok(())
}

/// The live-feed path must be absolute and must not shadow the REST surface.
pub fn validate_ws_path(value: &str) -> Result<()> {
    if !value.starts_with('/') {
        return Err(anyhow!("ws_path must start with '/'"));
    }
    if value == "/api" || value.starts_with("/api/") {
        return Err(anyhow!("ws_path must not live under /api"));
    }
    if value.contains(|c: char| c.is_whitespace() || c == ':' || c == '*') {
        return Err(anyhow!("ws_path must be a plain path"));
    }
    Ok(())
}
