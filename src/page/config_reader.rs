use crate::page::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSettings {
    pub root: Option<String>,
    pub port: Option<u16>,
}

/// Individual overrides of the locale labels.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelSettings {
    #[serde(rename = "photoPrefix")]
    pub photo_prefix: Option<String>,
    pub positive: Option<String>,
    pub negative: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub feed: Option<String>,
    pub template: Option<String>,
    #[serde(rename = "containerClass")]
    pub container_class: Option<String>,
    pub criterion: Option<String>,
    pub locale: Option<String>,
    pub labels: Option<LabelSettings>,
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    pub server: Option<ServerSettings>,
}

impl PageConfig {
    /// The labels of the locale, with the individual overrides applied.
    /// `locale` takes precedence over the locale of the configuration.
    pub fn card_labels(&self, locale: Option<&str>) -> PageResult<CardLabels> {
        let mut labels = match locale.or(self.locale.as_deref()) {
            Some(l) => CardLabels::for_locale(l).context(UnknownLocaleSnafu { locale: l })?,
            None => CardLabels::default(),
        };
        if let Some(overrides) = self.labels.as_ref() {
            if let Some(x) = overrides.photo_prefix.as_ref() {
                labels.photo_prefix = x.clone();
            }
            if let Some(x) = overrides.positive.as_ref() {
                labels.positive = x.clone();
            }
            if let Some(x) = overrides.negative.as_ref() {
                labels.negative = x.clone();
            }
        }
        Ok(labels)
    }

    pub fn output_path(&self) -> Option<String> {
        self.output_settings
            .as_ref()
            .and_then(|o| o.output_path.clone())
    }
}

/// A configuration and the directory its relative paths are resolved from.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LoadedConfig {
    pub config: PageConfig,
    pub root: PathBuf,
}

impl LoadedConfig {
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

/// Reads the configuration file, or an empty configuration rooted in the
/// current directory when there is none.
pub fn load_config(path: Option<&str>) -> PageResult<LoadedConfig> {
    match path {
        None => Ok(LoadedConfig {
            config: PageConfig::default(),
            root: PathBuf::from("."),
        }),
        Some(p) => {
            let config = read_config(p)?;
            info!("config: {:?}", config);
            let root = Path::new(p)
                .parent()
                .map(|x| x.to_path_buf())
                .context(MissingParentDirSnafu { path: p })?;
            Ok(LoadedConfig { config, root })
        }
    }
}

pub fn read_config(path: &str) -> PageResult<PageConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    debug!("read_config: read content: {:?}", contents);
    serde_json::from_str(&contents).context(ParsingJsonSnafu { path })
}

pub fn read_reference(path: &str) -> PageResult<String> {
    fs::read_to_string(path).context(OpeningFileSnafu { path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let js = r#"{
            "feed": "data/fazenda.json",
            "template": "index.html",
            "containerClass": "ranking",
            "criterion": "negative",
            "locale": "pt",
            "labels": { "positive": "A favor" },
            "outputSettings": { "outputPath": "dist/index.html" },
            "server": { "root": ".", "port": 8080 }
        }"#;
        let config: PageConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.feed.as_deref(), Some("data/fazenda.json"));
        assert_eq!(config.container_class.as_deref(), Some("ranking"));
        assert_eq!(config.output_path().as_deref(), Some("dist/index.html"));
        assert_eq!(config.server.as_ref().and_then(|s| s.port), Some(8080));

        let labels = config.card_labels(None).unwrap();
        assert_eq!(labels.photo_prefix, "Foto de");
        assert_eq!(labels.positive, "A favor");
        assert_eq!(labels.negative, "Negativos");
    }

    #[test]
    fn empty_config() {
        let config: PageConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PageConfig::default());
        assert_eq!(config.card_labels(None).unwrap(), CardLabels::english());
    }

    #[test]
    fn locale_flag_wins() {
        let config = PageConfig {
            locale: Some("pt".to_string()),
            ..Default::default()
        };
        assert_eq!(config.card_labels(Some("en")).unwrap(), CardLabels::english());
        assert!(matches!(
            config.card_labels(Some("xx")),
            Err(PageError::UnknownLocale { .. })
        ));
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let loaded = LoadedConfig {
            config: PageConfig::default(),
            root: PathBuf::from("site"),
        };
        assert_eq!(loaded.resolve("index.html"), PathBuf::from("site/index.html"));
    }
}
