//! Shared output helpers, driven by the global CLI flags.

/// Whether `--json` was passed.
pub fn is_json() -> bool {
    std::env::var("CREDITLENS_JSON").is_ok()
}

/// Whether `--quiet` was passed.
pub fn is_quiet() -> bool {
    std::env::var("CREDITLENS_QUIET").is_ok()
}

/// Print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}
