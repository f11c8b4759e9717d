use std::time::Duration;

const AGROSENSE_INTERVAL: &str = "AGROSENSE_INTERVAL";

/// Polling interval from the environment, or `fallback` if unset or invalid
pub fn get_interval(fallback: Duration) -> Duration {
    let interval_from_env = std::env::var(AGROSENSE_INTERVAL);
    interval_from_env.map_or(fallback, |res| parse_interval(&res).unwrap_or(fallback))
}

fn parse_interval(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

const AGROSENSE_CONFIG: &str = "AGROSENSE_CONFIG";

pub fn get_config_path() -> Option<String> {
    let path_from_env = std::env::var(AGROSENSE_CONFIG);
    path_from_env.ok()
}
