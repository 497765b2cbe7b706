/// Get environment variable with CARDHOOK_ prefix, falling back to unprefixed version
///
/// Checks `CARDHOOK_{key}` first, then `{key}`, so deployments that already
/// export plain `PORT` or `LOG_LEVEL` keep working.
///
/// # Examples
///
/// ```rust,ignore
/// // Checks CARDHOOK_CREDENTIALS first, then CREDENTIALS
/// let credentials = get_env_with_prefix("CREDENTIALS");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("CARDHOOK_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}
