use async_trait::async_trait;
use bollard::container::{InspectContainerOptions, ListContainersOptions};
use bollard::models::ContainerInspectResponse;
use bollard::{Docker, API_DEFAULT_VERSION};
use futures::future::try_join_all;
use tokio::process::Command;

use crate::errors::*;

const CONNECT_TIMEOUT_SECS: u64 = 120;
const DOCKER_BIN: &str = "docker";

/// Supplies inspect records for the requested container, or for every
/// running container when none is named. Both implementations yield the
/// same record type, so the rest of the pipeline cannot tell them apart.
#[async_trait]
pub trait InspectSource {
    async fn fetch(&self, container: Option<&str>)
        -> Result<Vec<ContainerInspectResponse>, Error>;
}

pub struct ApiSource {
    docker: Docker,
}

impl ApiSource {
    pub fn connect(host: Option<&str>) -> Result<Self, Error> {
        let docker = match host {
            None => Docker::connect_with_local_defaults(),
            Some(host) if host.starts_with("unix://") => {
                Docker::connect_with_unix(host, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)
            }
            Some(host) => {
                Docker::connect_with_http(host, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)
            }
        }
        .map_err(|err| Error::DockerApi(err.to_string()))?;

        Ok(ApiSource { docker })
    }

    async fn inspect(&self, container: &str) -> Result<ContainerInspectResponse, Error> {
        self.docker
            .inspect_container(container, None::<InspectContainerOptions>)
            .await
            .map_err(|err| match err {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => Error::ContainerNotFound(container.to_string()),
                err => Error::DockerApi(err.to_string()),
            })
    }
}

#[async_trait]
impl InspectSource for ApiSource {
    async fn fetch(
        &self,
        container: Option<&str>,
    ) -> Result<Vec<ContainerInspectResponse>, Error> {
        match container {
            Some(container) => Ok(vec![self.inspect(container).await?]),
            None => {
                let summaries = self
                    .docker
                    .list_containers(None::<ListContainersOptions<String>>)
                    .await
                    .map_err(|err| Error::DockerApi(err.to_string()))?;

                let ids: Vec<String> = summaries
                    .into_iter()
                    .filter_map(|summary| summary.id)
                    .collect();

                // Inspection fans out concurrently; try_join_all collects
                // the records back in listing order before assembly.
                try_join_all(ids.iter().map(|id| self.inspect(id))).await
            }
        }
    }
}

/// Shells out to the `docker` binary and parses its JSON output into the
/// same record type the API client returns.
pub struct CommandSource;

impl CommandSource {
    async fn run(args: &[&str]) -> Result<Vec<u8>, Error> {
        debug!("Running: {} {}", DOCKER_BIN, args.join(" "));

        let output = Command::new(DOCKER_BIN)
            .args(args)
            .output()
            .await
            .map_err(|err| Error::DockerCommand(err.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::DockerCommand(format!(
                "`{} {}` failed ({}): {}",
                DOCKER_BIN,
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }

    async fn inspect(&self, container: &str) -> Result<ContainerInspectResponse, Error> {
        let output = Self::run(&["inspect", container]).await?;

        parse_inspect_output(&output)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::InspectParse("empty inspect output".to_string()))
    }
}

#[async_trait]
impl InspectSource for CommandSource {
    async fn fetch(
        &self,
        container: Option<&str>,
    ) -> Result<Vec<ContainerInspectResponse>, Error> {
        match container {
            Some(container) => Ok(vec![self.inspect(container).await?]),
            None => {
                let output = Self::run(&["ps", "-q"]).await?;
                let listing = String::from_utf8_lossy(&output);

                let mut records = Vec::new();
                for id in listing.split_whitespace() {
                    records.push(self.inspect(id).await?);
                }

                Ok(records)
            }
        }
    }
}

/// `docker inspect` prints a JSON array of inspect records.
pub fn parse_inspect_output(raw: &[u8]) -> Result<Vec<ContainerInspectResponse>, Error> {
    serde_json::from_slice(raw).map_err(|err| Error::InspectParse(err.to_string()))
}
