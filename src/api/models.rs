use serde::{Deserialize, Deserializer, Serialize};

/// One playable song as served by the song list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Track {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, alias = "cover", alias = "artwork")]
    pub image: String,
    #[serde(alias = "src", alias = "streamUrl")]
    pub url: String,
}

impl Track {
    pub fn artwork(&self) -> Option<&str> {
        let image = self.image.trim();
        if image.is_empty() {
            None
        } else {
            Some(image)
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
