//! Request validation applied before anything reaches the engine.

use std::sync::OnceLock;

use rail_graph_core::RouteError;
use regex::Regex;

use crate::error::{Error, Result};

fn town_regex() -> &'static Regex {
    static TOWN: OnceLock<Regex> = OnceLock::new();
    TOWN.get_or_init(|| Regex::new(r"^[A-Z]{1,16}$").expect("town pattern is valid"))
}

/// Normalize a town id (trim + uppercase) and check it against `[A-Z]{1,16}`.
pub fn validate_town(raw: &str) -> Result<String> {
    if raw.is_empty() {
        return Err(Error::EmptyTown);
    }
    let town = raw.trim().to_ascii_uppercase();
    if !town_regex().is_match(&town) {
        return Err(Error::InvalidTown(raw.to_string()));
    }
    Ok(town)
}

/// Validate a fixed path: at least two towns, each a valid id.
pub fn validate_path(raw: &[String]) -> Result<Vec<String>> {
    if raw.len() < 2 {
        return Err(Error::InvalidArgument(
            "path must contain at least two towns".to_string(),
        ));
    }
    raw.iter().map(|t| validate_town(t)).collect()
}

/// Check stop bounds and narrow them to the engine's unsigned type.
pub fn stop_bounds(min_stops: i64, max_stops: i64) -> Result<(u32, u32)> {
    if min_stops < 0 {
        return Err(invalid_bounds("minStops must be >= 0"));
    }
    if max_stops < 0 {
        return Err(invalid_bounds("maxStops must be >= 0"));
    }
    if min_stops > max_stops {
        return Err(invalid_bounds("minStops cannot be greater than maxStops"));
    }
    let max = u32::try_from(max_stops).map_err(|_| invalid_bounds("maxStops is too large"))?;
    // min <= max, so it fits too.
    Ok((min_stops as u32, max))
}

pub fn distance_bound(max_distance: i64) -> Result<u64> {
    if max_distance <= 0 {
        return Err(invalid_bounds("maxDistance must be > 0"));
    }
    Ok(max_distance as u64)
}

/// `limit <= 0` means no limit, which the engine spells as 0.
pub fn route_limit(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

fn invalid_bounds(msg: &str) -> Error {
    Error::Route(RouteError::InvalidBounds(msg.to_string()))
}

/// Split an uploaded edge list into tokens.
///
/// Pieces are comma-separated; anything that is not a letter or digit is
/// stripped from both ends (quotes, brackets, stray whitespace), and empty
/// pieces are dropped.
pub fn sanitize_edges_input(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|piece| piece.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
