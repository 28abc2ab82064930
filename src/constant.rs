/// Default path of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "imgbot.toml";

/// Token substituted with the picked image's filename in the caption template.
pub const FILENAME_PLACEHOLDER: &str = "%filename%";
