use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::*;

pub const COMPOSE_VERSION: &str = "3.8";

/// Field order matches the emitted compose document and is part of the
/// output contract.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub image: String,

    pub container_name: String,

    pub ports: Vec<String>,

    pub volumes: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy: Option<Deploy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<Logging>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub networks: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deploy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestartPolicy {
    pub condition: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<i64>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpus: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logging {
    pub driver: String,

    pub options: BTreeMap<String, String>,
}

/// Services loaded from disk stay as raw values so that entries this tool
/// did not generate are re-emitted with their original keys and order.
/// Top-level sections other than `version` and `services` ride through the
/// flattened map untouched.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ComposeFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub services: IndexMap<String, Value>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

// Within one fresh batch a duplicate name replaces the earlier definition.
pub fn fresh(services: Vec<(String, Service)>) -> Result<ComposeFile, Error> {
    let mut file = ComposeFile {
        version: Some(COMPOSE_VERSION.to_string()),
        ..ComposeFile::default()
    };

    for (name, service) in services {
        file.services.insert(name, to_value(&service)?);
    }

    Ok(file)
}

/// Folds generated services into an existing document. An existing entry
/// always wins: a generated service whose name is already present is
/// skipped entirely, never merged field by field.
pub fn merge(existing: &mut ComposeFile, services: Vec<(String, Service)>) -> Result<(), Error> {
    for (name, service) in services {
        if existing.services.contains_key(&name) {
            continue;
        }
        let value = to_value(&service)?;
        existing.services.insert(name, value);
    }

    Ok(())
}

fn to_value(service: &Service) -> Result<Value, Error> {
    serde_yaml::to_value(service).map_err(|err| Error::ComposeEncode(err.to_string()))
}

pub async fn load(path: &Path) -> Result<ComposeFile, Error> {
    let contents = fs::read_to_string(path).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::ComposeFileMissing(path.display().to_string())
        } else {
            Error::Io(err.to_string())
        }
    })?;

    serde_yaml::from_str(&contents).map_err(|err| Error::ComposeParse(err.to_string()))
}

/// Serializes the document to `output`, where `-` designates stdout.
pub async fn write(file: &ComposeFile, output: &str) -> Result<(), Error> {
    let data = serde_yaml::to_string(file).map_err(|err| Error::ComposeEncode(err.to_string()))?;

    if output == "-" {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(data.as_bytes())
            .await
            .map_err(|err| Error::Io(err.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|err| Error::Io(err.to_string()))?;
    } else {
        fs::write(output, data)
            .await
            .map_err(|err| Error::Io(err.to_string()))?;
    }

    Ok(())
}
