use crate::config::RemountConfig;
use crate::error::ConfigError;

impl RemountConfig {
    /// Reject values the dev loop cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.host_addr()?;

        if self.port_scan_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port_scan_limit".to_string(),
                value: "0".to_string(),
                hint: "Scan at least one port".to_string(),
            });
        }

        let index = std::path::Path::new(&self.index_file);
        if self.index_file.trim().is_empty() || index.is_absolute() {
            return Err(ConfigError::InvalidValue {
                field: "index_file".to_string(),
                value: self.index_file.clone(),
                hint: "Use a file name relative to the target directory, e.g. routes.toml"
                    .to_string(),
            });
        }

        if let Some(dir) = self
            .vendor_dirs
            .iter()
            .find(|dir| dir.is_empty() || dir.contains(['/', '\\']))
        {
            return Err(ConfigError::InvalidValue {
                field: "vendor_dirs".to_string(),
                value: dir.clone(),
                hint: "List bare directory names such as node_modules".to_string(),
            });
        }

        Ok(())
    }
}
