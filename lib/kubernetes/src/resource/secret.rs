use std::collections::BTreeMap;

use base64::Engine;
use serde::{Deserialize, Deserializer};

use super::{ObjectMeta, Resource};

/// Secret holds secret data of a certain type.
///
/// See https://kubernetes.io/docs/reference/generated/kubernetes-api/v1.31/#secret-v1-core
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Secret {
    pub metadata: ObjectMeta,

    /// Data contains the secret data. The serialized form of the secret data is
    /// a base64 encoded string, the values here are already decoded.
    #[serde(default, deserialize_with = "deserialize_data")]
    pub data: BTreeMap<String, Vec<u8>>,

    /// stringData allows specifying non-binary secret data in string form. It is
    /// provided as a write-only input field for convenience, but some API servers
    /// and most fixtures still carry it.
    #[serde(default, rename = "stringData")]
    pub string_data: BTreeMap<String, String>,
}

impl Secret {
    /// Returns the value of `key` as text, `data` wins over `stringData`.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.data.get(key) {
            Some(value) => Some(String::from_utf8_lossy(value).into_owned()),
            None => self.string_data.get(key).cloned(),
        }
    }

    /// Iterates over all entries as text, `data` wins over `stringData`.
    pub fn entries(&self) -> BTreeMap<String, String> {
        let mut entries = self.string_data.clone();
        for (key, value) in &self.data {
            entries.insert(key.clone(), String::from_utf8_lossy(value).into_owned());
        }
        entries
    }
}

fn deserialize_data<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = Option::<BTreeMap<String, String>>::deserialize(deserializer)?;

    encoded
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            base64::engine::general_purpose::STANDARD
                .decode(value.trim())
                .map(|decoded| (key, decoded))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

impl Resource for Secret {
    const KIND: &'static str = "Secret";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}
