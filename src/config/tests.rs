use super::*;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

fn file_store(dir: &std::path::Path) -> ConfigStore {
    ConfigStore::new(Box::new(TomlFileStore::new(dir.join(SETTINGS_FILE_NAME))))
}

fn tod(hour: u8, minute: u8) -> TimeOfDay {
    TimeOfDay::new(hour, minute).unwrap()
}

#[test]
fn test_missing_keys_load_documented_defaults() {
    let store = ConfigStore::new(Box::new(MemoryStore::new()));
    let config = store.config();

    assert!(!config.enabled);
    assert_eq!(config.light_time(), tod(7, 0));
    assert_eq!(config.dark_time(), tod(19, 0));
    assert!(config.show_window_on_launch);
}

#[test]
fn test_missing_file_loads_defaults_without_creating_it() {
    let temp_dir = tempdir().unwrap();
    let store = file_store(temp_dir.path());

    assert_eq!(*store.config(), ScheduleConfig::default());
    assert!(!temp_dir.path().join(SETTINGS_FILE_NAME).exists());
}

#[test]
fn test_save_then_load_round_trip() {
    let temp_dir = tempdir().unwrap();
    let mut store = file_store(temp_dir.path());

    store.set_enabled(true).unwrap();
    store.set_light_time(tod(6, 45)).unwrap();
    store.set_dark_time(tod(21, 5)).unwrap();
    store.set_show_window_on_launch(false).unwrap();

    let reloaded = file_store(temp_dir.path());
    assert_eq!(
        *reloaded.config(),
        ScheduleConfig {
            enabled: true,
            light_hour: 6,
            light_minute: 45,
            dark_hour: 21,
            dark_minute: 5,
            show_window_on_launch: false,
        }
    );
}

#[test]
fn test_round_trip_extreme_values() {
    let backing = MemoryStore::new();
    let mut store = ConfigStore::new(Box::new(backing.clone()));

    for (hour, minute) in [(0, 0), (23, 59), (12, 30)] {
        store.set_dark_time(tod(hour, minute)).unwrap();
        let mut fresh = ConfigStore::new(Box::new(backing.clone()));
        let config = fresh.load();
        assert_eq!((config.dark_hour, config.dark_minute), (hour, minute));
    }
}

#[test]
fn test_file_uses_flat_key_names() {
    let temp_dir = tempdir().unwrap();
    let mut store = file_store(temp_dir.path());
    store.set_enabled(true).unwrap();
    store.set_light_time(tod(8, 15)).unwrap();

    let content = fs::read_to_string(temp_dir.path().join(SETTINGS_FILE_NAME)).unwrap();
    let table: toml::Table = content.parse().unwrap();
    assert_eq!(table.get("scheduleEnabled"), Some(&toml::Value::Boolean(true)));
    assert_eq!(table.get("lightModeHour"), Some(&toml::Value::Integer(8)));
    assert_eq!(table.get("lightModeMinute"), Some(&toml::Value::Integer(15)));
    // Untouched keys stay unwritten
    assert!(table.get("showWindowOnLaunch").is_none());
}

#[test]
fn test_save_preserves_other_keys() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join(SETTINGS_FILE_NAME);
    fs::write(&path, "darkModeHour = 22\ncustomNote = \"keep me\"\n").unwrap();

    let mut store = file_store(temp_dir.path());
    assert_eq!(store.config().dark_hour, 22);
    store.set_enabled(true).unwrap();

    let table: toml::Table = fs::read_to_string(&path).unwrap().parse().unwrap();
    assert_eq!(table.get("darkModeHour"), Some(&toml::Value::Integer(22)));
    assert_eq!(
        table.get("customNote"),
        Some(&toml::Value::String("keep me".to_string()))
    );
}

#[test]
fn test_invalid_stored_values_fall_back_per_key() {
    let temp_dir = tempdir().unwrap();
    fs::write(
        temp_dir.path().join(SETTINGS_FILE_NAME),
        "scheduleEnabled = true\nlightModeHour = 31\nlightModeMinute = 15\ndarkModeHour = \"late\"\ndarkModeMinute = 1.5\nshowWindowOnLaunch = 0\n",
    )
    .unwrap();

    let config = *file_store(temp_dir.path()).config();
    assert!(config.enabled);
    assert_eq!(config.light_hour, DEFAULT_LIGHT_HOUR);
    assert_eq!(config.light_minute, 15);
    assert_eq!(config.dark_hour, DEFAULT_DARK_HOUR);
    assert_eq!(config.dark_minute, DEFAULT_DARK_MINUTE);
    assert_eq!(config.show_window_on_launch, DEFAULT_SHOW_WINDOW_ON_LAUNCH);
}

#[test]
fn test_unparseable_file_loads_defaults_and_is_not_overwritten() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join(SETTINGS_FILE_NAME);
    let garbage = "this is [not toml\n";
    fs::write(&path, garbage).unwrap();

    let mut store = file_store(temp_dir.path());
    assert_eq!(*store.config(), ScheduleConfig::default());

    assert!(store.set_enabled(true).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), garbage);
    // The failed write does not change the cached value either
    assert!(!store.config().enabled);
}

#[test]
fn test_save_rejects_invalid_values() {
    let backing = MemoryStore::new();
    let mut store = ConfigStore::new(Box::new(backing.clone()));

    let err = store
        .save(SettingKey::LightModeHour, SettingValue::Int(24))
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::OutOfRange {
            key: SettingKey::LightModeHour,
            value: 24,
            min: 0,
            max: 23,
        })
    );

    let err = store
        .save(SettingKey::ScheduleEnabled, SettingValue::Int(1))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::TypeMismatch { .. })
    ));

    assert!(backing.snapshot().is_empty());
}

#[test]
fn test_first_run_show_flag_only_until_written() {
    let backing = MemoryStore::new();
    let mut store = ConfigStore::new(Box::new(backing.clone()));
    assert!(store.config().show_window_on_launch);

    store.set_show_window_on_launch(false).unwrap();
    let reloaded = ConfigStore::new(Box::new(backing));
    assert!(!reloaded.config().show_window_on_launch);
}

#[test]
fn test_setting_key_metadata() {
    for key in SettingKey::ALL {
        assert_eq!(SettingKey::from_name(key.as_str()), Some(key));
        assert!(validation::validate_value(key, key.default_value()).is_ok());
    }
    assert_eq!(SettingKey::DarkModeMinute.range(), Some((0, 59)));
    assert_eq!(SettingKey::ScheduleEnabled.range(), None);
    assert_eq!(SettingKey::from_name("sunrise"), None);
}

#[test]
fn test_config_window_follows_fields() {
    let config = ScheduleConfig {
        light_hour: 6,
        light_minute: 0,
        dark_hour: 22,
        dark_minute: 0,
        ..ScheduleConfig::default()
    };
    let window = config.window();
    assert_eq!(window.light, tod(6, 0));
    assert_eq!(window.dark, tod(22, 0));
}

#[test]
fn test_config_serializes_for_status_output() {
    let json = serde_json::to_value(ScheduleConfig::default()).unwrap();
    assert_eq!(json["enabled"], serde_json::json!(false));
    assert_eq!(json["light_hour"], serde_json::json!(7));
    assert_eq!(
        serde_json::to_value(SettingValue::Int(19)).unwrap(),
        serde_json::json!(19)
    );
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_settings_path_follows_xdg_config_home() {
    let temp_dir = tempdir().unwrap();

    // Save and restore XDG_CONFIG_HOME
    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    let path = get_settings_path();

    unsafe {
        match original {
            Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    assert_eq!(
        path.unwrap(),
        temp_dir.path().join(APP_DIR_NAME).join(SETTINGS_FILE_NAME)
    );
}
