//! KV client configuration

use crate::config::ConfigStore;
use webmods_domain::value_objects::KvConfig;

/// Read `redis.urls` (list or comma-separated string) and `redis.password`
pub fn kv_config_from_store(store: &ConfigStore) -> KvConfig {
    let password = store.get_string("redis.password");
    KvConfig {
        urls: store.get_string_list("redis.urls"),
        password: (!password.is_empty()).then_some(password),
    }
}
