//! Object storage configuration

use crate::config::ConfigStore;
use webmods_domain::value_objects::StorageConfig;

/// Read `object_storage.provider` and `object_storage.base_path`
pub fn storage_config_from_store(store: &ConfigStore) -> StorageConfig {
    let mut config = StorageConfig::default();

    let provider = store.get_string("object_storage.provider");
    if !provider.is_empty() {
        config.provider = provider.to_ascii_lowercase();
    }

    let base_path = store.get_string("object_storage.base_path");
    if !base_path.is_empty() {
        config.base_path = base_path;
    }

    config
}
