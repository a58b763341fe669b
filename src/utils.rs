use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read a file to a `String`.
pub async fn read(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Deserialize a JSON file into type `T`.
pub async fn deserialize<T>(path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let content = read(path).await?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file at {}", path.display()))
}
