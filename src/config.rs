use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::Error;
use crate::model::Tags;
use crate::pod::LabelSelector;

pub const NODE_NAME_ENV: &str = "MY_NODE_NAME";

fn default_tags() -> Tags {
    Tags::parse("unknown")
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PodConfig {
    /// Discover pods running on the local node only, the node name is taken
    /// from the `MY_NODE_NAME` environment variable.
    #[serde(default)]
    pub local_mode: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Whitespace separated tags attached to every discovered target.
    #[serde(default = "default_tags")]
    pub tags: Tags,

    /// Namespaces to discover pods in. If empty, all namespaces are used.
    #[serde(default)]
    pub namespaces: Vec<String>,

    /// Only pods whose labels match are discovered, e.g. `app=web,tier!=backend`.
    #[serde(default)]
    pub label_selector: LabelSelector,

    #[serde(default)]
    pub pod: PodConfig,

    /// How long to wait for the initial sync of the pod, config map and secret
    /// caches. Waits forever if not set.
    #[serde(default, with = "humanize::duration::serde_option")]
    pub sync_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tags: default_tags(),
            namespaces: vec![],
            label_selector: LabelSelector::default(),
            pod: PodConfig::default(),
            sync_timeout: None,
        }
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_yaml::from_str(s).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = "{}".parse::<Config>().unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.tags.to_string(), "unknown");
        assert!(config.namespaces.is_empty());
        assert!(!config.pod.local_mode);
        assert_eq!(config.sync_timeout, None);
    }

    #[test]
    fn parse() {
        let config = r#"
tags: k8s pod
namespaces:
  - default
  - monitoring
label_selector: app=web,!canary
pod:
  local_mode: true
sync_timeout: 30s
"#
        .parse::<Config>()
        .unwrap();

        assert_eq!(config.tags.to_string(), "k8s pod");
        assert_eq!(config.namespaces, ["default", "monitoring"]);
        assert!(config.pod.local_mode);
        assert_eq!(
            config.label_selector,
            "app=web,!canary".parse::<LabelSelector>().unwrap()
        );
        assert_eq!(config.sync_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn unknown_field() {
        let err = "role: service".parse::<Config>().unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");
    }

    #[test]
    fn invalid_label_selector() {
        let err = "label_selector: env in (prod)".parse::<Config>().unwrap_err();
        assert!(err.to_string().contains("invalid label selector"), "{err}");
    }
}
