pub const DEFAULT_CONFIG_FILE: &str = "/etc/noteprobe/noteprobe.toml";

pub const APP_CONFIG_ENV_PREFIX: &str = "NOTEPROBE_";
