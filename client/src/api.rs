use orcamap_shared::{LoadError, Sighting, parse_sightings};

/// Fetch the current sightings list. One request; no retry or timeout.
pub async fn fetch_sightings(url: &str) -> Result<Vec<Sighting>, LoadError> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| LoadError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(LoadError::Status(resp.status()));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| LoadError::Network(e.to_string()))?;
    parse_sightings(&body)
}
