use std::collections::BTreeMap;

use kubernetes::{Cache, ConfigMap, Container, EnvFromSource, EnvVar, Secret};

/// Resolves the environment of containers from their literal values and the
/// config maps and secrets they reference.
///
/// Resolution never fails, a reference which cannot be resolved (yet) simply
/// leaves its variables unset.
pub struct EnvResolver<'a> {
    config_maps: &'a dyn Cache<ConfigMap>,
    secrets: &'a dyn Cache<Secret>,
}

impl<'a> EnvResolver<'a> {
    pub fn new(config_maps: &'a dyn Cache<ConfigMap>, secrets: &'a dyn Cache<Secret>) -> Self {
        EnvResolver {
            config_maps,
            secrets,
        }
    }

    /// Flattens the environment of `container`, `None` if nothing resolves.
    ///
    /// When a key exists in multiple sources, the value of the last source
    /// wins, and `env` entries win over `envFrom` imports. The order follows
    /// how the kubelet builds the environment.
    pub fn resolve(
        &self,
        namespace: &str,
        container: &Container,
    ) -> Option<BTreeMap<String, String>> {
        let mut vars = BTreeMap::new();

        for source in &container.env_from {
            self.import(&mut vars, namespace, source);
        }

        for env in &container.env {
            // names like "$(FOO)" reference other variables
            if env.name.is_empty() || env.name.contains('$') {
                continue;
            }

            if let Some(value) = self.value_of(namespace, env) {
                vars.insert(env.name.clone(), value);
            }
        }

        if vars.is_empty() { None } else { Some(vars) }
    }

    fn import(&self, vars: &mut BTreeMap<String, String>, namespace: &str, source: &EnvFromSource) {
        if let Some(selector) = &source.config_map_ref {
            let Some(cm) = self.config_maps.get(namespace, &selector.name) else {
                debug!(message = "config map not found", namespace, name = %selector.name);
                return;
            };

            for (key, value) in &cm.data {
                vars.insert(format!("{}{}", source.prefix, key), value.clone());
            }
        } else if let Some(selector) = &source.secret_ref {
            let Some(secret) = self.secrets.get(namespace, &selector.name) else {
                debug!(message = "secret not found", namespace, name = %selector.name);
                return;
            };

            for (key, value) in secret.entries() {
                vars.insert(format!("{}{}", source.prefix, key), value);
            }
        }
    }

    fn value_of(&self, namespace: &str, env: &EnvVar) -> Option<String> {
        if !env.value.is_empty() {
            return Some(env.value.clone());
        }

        let source = env.value_from.as_ref()?;
        if let Some(selector) = &source.secret_key_ref {
            let secret = self.secrets.get(namespace, &selector.name)?;
            return secret.get(&selector.key);
        }

        if let Some(selector) = &source.config_map_key_ref {
            let cm = self.config_maps.get(namespace, &selector.name)?;
            return cm.data.get(&selector.key).cloned();
        }

        None
    }
}
