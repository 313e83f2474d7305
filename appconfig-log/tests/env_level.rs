//! The environment decides the threshold even when the first line logged is
//! below the default level. Kept alone in its own binary so no other test
//! reads the threshold first.

use appconfig_log::{Level, debug, is_level_enabled, trace};

#[test]
fn test_env_debug_level_applies_before_any_info_line() {
    unsafe {
        std::env::set_var("APPCONFIG_LOG_LEVEL", "debug");
    }

    debug!("first line is a debug line");
    trace!("filtered out");

    assert!(is_level_enabled(Level::Debug));
    assert!(!is_level_enabled(Level::Trace));
    assert_eq!(appconfig_log::config().level, Level::Debug);

    appconfig_log::set_level(Level::Error);
    assert!(!is_level_enabled(Level::Debug));

    unsafe {
        std::env::remove_var("APPCONFIG_LOG_LEVEL");
    }
}
