//! Process-wide switch for the CLI's human-facing chatter.
//!
//! Tables and heatmaps are the command's actual output and always print;
//! banners, section rules and status lines go quiet when scripted.

use std::sync::OnceLock;

/// Set to `1` or `true` to silence banners and status lines
pub const QUIET_ENV: &str = "REPOPULSE_QUIET";

static QUIET: OnceLock<bool> = OnceLock::new();

fn quiet_value(value: Option<&str>) -> bool {
    value.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Read once per process; later changes to the variable are ignored
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| quiet_value(std::env::var(QUIET_ENV).ok().as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_values() {
        assert!(quiet_value(Some("1")));
        assert!(quiet_value(Some("TRUE")));
        assert!(!quiet_value(Some("0")));
        assert!(!quiet_value(Some("")));
        assert!(!quiet_value(None));
    }
}
