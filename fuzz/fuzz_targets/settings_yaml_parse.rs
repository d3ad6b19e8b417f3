//! Fuzz target for settings YAML parsing and validation.

#![no_main]

use composure::config::Settings;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(yaml) = std::str::from_utf8(data) else {
        return;
    };
    if yaml.len() > 1024 * 1024 {
        return;
    }

    if let Ok(settings) = Settings::from_yaml_str(yaml) {
        let _ = settings.validate();
    }
});
