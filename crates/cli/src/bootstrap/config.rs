use anyhow::Context;
use dnschat_domain::{CliOverrides, Config};

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    Config::load(path, overrides).context("Failed to load configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnschat_domain::ConfigError;

    #[test]
    fn test_load_error_keeps_config_error_source() {
        let err = load_config(Some("/nonexistent/dnschat.toml"), CliOverrides::default())
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to load configuration");
        let source = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(source, ConfigError::FileRead(..)));
    }
}
