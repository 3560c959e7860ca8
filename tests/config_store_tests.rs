//! Settings persistence through the standard `open` path with a custom directory.

use switchr::config::{self, SettingKey, SettingValue};
use switchr::schedule::TimeOfDay;

#[test]
fn test_custom_config_dir_round_trip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path().join("nested").join("switchr");
    config::set_config_dir(Some(dir.to_string_lossy().into_owned())).unwrap();

    assert_eq!(config::get_custom_config_dir(), Some(dir.clone()));
    assert_eq!(config::get_settings_path().unwrap(), dir.join("settings.toml"));

    // First run: nothing on disk, documented defaults
    let mut store = config::open().unwrap();
    assert!(!store.config().enabled);
    assert!(store.config().show_window_on_launch);
    assert!(!dir.exists());

    store.set_enabled(true).unwrap();
    store.set_light_time(TimeOfDay::new(5, 55).unwrap()).unwrap();
    store
        .save(SettingKey::ShowWindowOnLaunch, SettingValue::Bool(false))
        .unwrap();
    assert!(dir.join("settings.toml").exists());

    let reopened = config::open().unwrap();
    assert_eq!(reopened.config(), store.config());
    assert_eq!(reopened.config().light_time(), TimeOfDay::new(5, 55).unwrap());
    assert!(!reopened.config().show_window_on_launch);

    // The directory can only be chosen once per process
    assert!(config::set_config_dir(None).is_err());
}
