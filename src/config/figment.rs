use std::path::Path;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use crate::bin_constants::APP_CONFIG_ENV_PREFIX;
use crate::config::app_config::AppConfig;

pub trait FigmentExt {
    fn setup_app_config(
        self,
        config_file: impl AsRef<Path>,
    ) -> Figment;
}

impl FigmentExt for Figment {
    fn setup_app_config(self, config_file: impl AsRef<Path>) -> Figment {
        self.merge(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(APP_CONFIG_ENV_PREFIX).global())
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use super::*;

    #[test]
    fn env_overrides_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "noteprobe.toml",
                r#"
                    store_url = "https://store.example"
                    api_key = "anon"
                "#,
            )?;
            jail.set_env("NOTEPROBE_API_KEY", "from-env");
            let config: AppConfig = Figment::new()
                .setup_app_config("noteprobe.toml")
                .extract()?;
            assert_eq!(config.store_url, "https://store.example");
            assert_eq!(config.api_key, "from-env");
            assert_eq!(config.notes_collection, "notes");
            assert_eq!(config.access_token, None);
            Ok(())
        });
    }
}
