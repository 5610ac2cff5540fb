//! Layered loading tests
//!
//! Every test runs inside a `figment::Jail`, which serializes access to the
//! process environment and restores it afterwards.

use figment::Jail;
use std::time::Duration;
use webmods_domain::Error;
use webmods_infrastructure::config::{ConfigLoader, ConfigStore, LoggingConfig};

fn load(jail: &Jail, cmd: &str) -> figment::error::Result<ConfigStore> {
    ConfigLoader::new(cmd)
        .with_config_dir(jail.directory().join("configs"))
        .load()
        .map_err(|e| e.to_string().into())
}

fn make_dirs(jail: &Jail, dirs: &[&str]) -> figment::error::Result<()> {
    for dir in dirs {
        std::fs::create_dir_all(jail.directory().join(dir)).map_err(|e| e.to_string())?;
    }
    Ok(())
}

#[test]
fn test_mode_overlay_wins_over_default() {
    Jail::expect_with(|jail| {
        make_dirs(jail, &["configs"])?;
        jail.create_file("configs/default.yaml", "log:\n  level: info\n  format: json\n")?;
        jail.create_file("configs/production.yaml", "log:\n  level: error\n")?;
        jail.set_env("MODE", "production");

        let store = load(jail, "api")?;
        assert_eq!(store.mode(), "production");
        assert_eq!(store.get_string("log.level"), "error");
        assert_eq!(store.get_string("log.format"), "json");
        Ok(())
    });
}

#[test]
fn test_env_overrides_files() {
    Jail::expect_with(|jail| {
        make_dirs(jail, &["configs"])?;
        jail.create_file("configs/default.yaml", "log:\n  level: info\n")?;
        jail.create_file("configs/production.yaml", "log:\n  level: error\n")?;
        jail.set_env("MODE", "production");
        jail.set_env("LOG__LEVEL", "debug");

        let store = load(jail, "api")?;
        assert_eq!(store.get_string("log.level"), "debug");
        assert_eq!(LoggingConfig::from_store(&store).level, "debug");
        Ok(())
    });
}

#[test]
fn test_command_base_replaces_global_layers() {
    Jail::expect_with(|jail| {
        make_dirs(jail, &["configs/worker"])?;
        jail.create_file("configs/default.yaml", "app:\n  name: x\n")?;
        jail.create_file("configs/development.yaml", "app:\n  region: eu\n")?;
        jail.create_file("configs/worker/default.yaml", "worker:\n  threads: 4\n")?;
        jail.set_env("MODE", "development");

        let store = load(jail, "worker")?;
        assert_eq!(store.get_i64("worker.threads"), 4);
        assert_eq!(store.get_string("app.name"), "");
        assert_eq!(store.get_string("app.region"), "");
        Ok(())
    });
}

#[test]
fn test_command_mode_overlays_global_layers() {
    Jail::expect_with(|jail| {
        make_dirs(jail, &["configs/worker"])?;
        jail.create_file("configs/default.yaml", "app:\n  name: x\nworker:\n  threads: 1\n")?;
        jail.create_file("configs/staging.yaml", "worker:\n  threads: 2\n")?;
        jail.create_file("configs/worker/staging.yaml", "worker:\n  threads: 8\n")?;
        jail.set_env("MODE", "staging");

        let loader = ConfigLoader::new("worker").with_config_dir(jail.directory().join("configs"));
        assert_eq!(loader.layer_files().len(), 3);

        let store = load(jail, "worker")?;
        assert_eq!(store.get_i64("worker.threads"), 8);
        assert_eq!(store.get_string("app.name"), "x");
        Ok(())
    });
}

#[test]
fn test_env_value_applies_without_file_key() {
    Jail::expect_with(|jail| {
        make_dirs(jail, &["configs"])?;
        jail.create_file("configs/default.yaml", "cache:\n  local_ttl: 5s\n")?;
        jail.set_env("MODE", "development");
        jail.set_env("CACHE__LOCAL_CAPACITY", "25");
        jail.set_env("REDIS__URLS", "a:6379,b:6379");

        let store = load(jail, "api")?;
        assert_eq!(store.get_i64("cache.local_capacity"), 25);
        assert_eq!(store.get_duration("cache.local_ttl"), Duration::from_secs(5));
        assert_eq!(store.get_string_list("redis.urls"), vec!["a:6379", "b:6379"]);
        Ok(())
    });
}

#[test]
fn test_single_segment_env_stays_out_of_tree() {
    Jail::expect_with(|jail| {
        make_dirs(jail, &["configs"])?;
        jail.create_file("configs/default.yaml", "app:\n  name: x\n")?;
        jail.set_env("MODE", "development");
        jail.set_env("SOME_UNRELATED_VAR", "1");

        let store = load(jail, "api")?;
        assert!(store.all().get("some_unrelated_var").is_none());
        assert_eq!(store.get_string("some_unrelated_var"), "1");
        Ok(())
    });
}

#[test]
fn test_single_segment_env_applies_without_file_key() {
    Jail::expect_with(|jail| {
        make_dirs(jail, &["configs"])?;
        jail.create_file("configs/default.yaml", "app:\n  name: x\n")?;
        jail.set_env("MODE", "development");
        jail.set_env("PORT", "8080");

        let store = load(jail, "api")?;
        assert_eq!(store.get_string("port"), "8080");
        assert_eq!(store.get_i64("PORT"), 8080);
        assert!(store.is_set("port"));
        Ok(())
    });
}

#[test]
fn test_env_reaches_mixed_case_file_keys() {
    Jail::expect_with(|jail| {
        make_dirs(jail, &["configs"])?;
        jail.create_file("configs/default.yaml", "server:\n  maxConns: 5\n  idleTimeout: 30s\n")?;
        jail.set_env("MODE", "development");
        jail.set_env("SERVER__MAXCONNS", "9");

        let store = load(jail, "api")?;
        assert_eq!(store.get_i64("server.maxConns"), 9);
        assert_eq!(store.get_i64("server.maxconns"), 9);
        assert_eq!(store.get_duration("server.idleTimeout"), Duration::from_secs(30));
        assert_eq!(store.all()["server"]["maxconns"], 9);
        Ok(())
    });
}

#[test]
fn test_env_values_are_returned_verbatim() {
    Jail::expect_with(|jail| {
        make_dirs(jail, &["configs"])?;
        jail.create_file("configs/default.yaml", "app:\n  code: \"001\"\n")?;
        jail.set_env("MODE", "development");
        jail.set_env("APP__CODE", "007");

        let store = load(jail, "api")?;
        assert_eq!(store.get_string("app.code"), "007");
        assert_eq!(store.get_i64("app.code"), 7);
        Ok(())
    });
}

#[test]
fn test_missing_files_give_empty_tree() {
    Jail::expect_with(|jail| {
        jail.set_env("MODE", "development");

        let store = load(jail, "api")?;
        assert_eq!(store.get_string("log.level"), "");
        assert!(ConfigLoader::new("api")
            .with_config_dir(jail.directory().join("configs"))
            .layer_files()
            .is_empty());
        Ok(())
    });
}

#[test]
fn test_unparseable_file_is_a_configuration_error() {
    Jail::expect_with(|jail| {
        make_dirs(jail, &["configs"])?;
        jail.create_file("configs/default.yaml", "log: [unclosed\n")?;
        jail.set_env("MODE", "development");

        let err = ConfigLoader::new("api")
            .with_config_dir(jail.directory().join("configs"))
            .load()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }), "{err:?}");
        Ok(())
    });
}

#[test]
fn test_json_and_toml_layers() {
    Jail::expect_with(|jail| {
        make_dirs(jail, &["configs"])?;
        jail.create_file("configs/default.json", r#"{"server": {"port": 8080, "host": "a"}}"#)?;
        jail.create_file("configs/development.toml", "[server]\nport = 9090\n")?;
        jail.set_env("MODE", "development");

        let store = load(jail, "api")?;
        assert_eq!(store.get_i64("server.port"), 9090);
        assert_eq!(store.get_string("server.host"), "a");
        Ok(())
    });
}

#[test]
fn test_yaml_is_probed_before_json() {
    Jail::expect_with(|jail| {
        make_dirs(jail, &["configs"])?;
        jail.create_file("configs/default.yaml", "source: yaml\n")?;
        jail.create_file("configs/default.json", r#"{"source": "json"}"#)?;
        jail.set_env("MODE", "development");

        let store = load(jail, "api")?;
        assert_eq!(store.get_string("source"), "yaml");
        Ok(())
    });
}

#[test]
fn test_mode_resolution() {
    Jail::expect_with(|jail| {
        jail.set_env("MODE", "");
        assert_eq!(ConfigLoader::new("api").mode(), "development");

        jail.set_env("MODE", "production");
        assert_eq!(ConfigLoader::new("api").mode(), "production");
        assert_eq!(ConfigLoader::new("api").with_mode("test").mode(), "test");
        Ok(())
    });
}
