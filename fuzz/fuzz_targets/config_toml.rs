#![no_main]

use libfuzzer_sys::fuzz_target;
use loadburst::config::types::ConfigFile;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let parsed: Option<ConfigFile> = toml::from_str(input).ok();
        if let Ok(args) = loadburst::fuzzing::apply_config_from_toml(input) {
            debug_assert!(args.users.get() >= 1);
            debug_assert!(args.requests_per_user.get() >= 1);
            if let Some(config) = parsed {
                if let Some(users) = config.users {
                    debug_assert_eq!(args.users.get(), users);
                }
                if let Some(url) = config.url {
                    debug_assert_eq!(args.url.as_deref(), Some(url.as_str()));
                }
            }
        }
    }
});
