pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SETTLE_MS: u64 = 50;
pub const DEFAULT_PORT_SCAN_LIMIT: u16 = 100;

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_index_file() -> String {
    "routes.toml".to_string()
}

pub fn default_vendor_dirs() -> Vec<String> {
    remount_graph::DEFAULT_VENDOR_DIRS
        .iter()
        .map(|dir| dir.to_string())
        .collect()
}
