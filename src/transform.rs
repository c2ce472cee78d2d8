use bollard::models::{
    ContainerConfig, ContainerInspectResponse, HostConfig, NetworkSettings, RestartPolicyNameEnum,
};

use crate::compose::{Deploy, Logging, Resources, RestartPolicy, Service};
use crate::errors::*;

const NANO_CPUS_PER_CPU: f64 = 1_000_000_000.0;

pub fn service_name(record: &ContainerInspectResponse) -> Result<String, Error> {
    let name = record.name.as_deref().ok_or(Error::MissingField("Name"))?;
    Ok(name.trim_start_matches('/').to_string())
}

/// Runs every extractor over one inspect record and assembles the service
/// definition. Optional sections are omitted when empty; `deploy` appears
/// only when a restart policy or a resource limit survives extraction.
pub fn service_definition(
    record: &ContainerInspectResponse,
    include_path_env: bool,
) -> Result<Service, Error> {
    let image = config(record)?
        .image
        .clone()
        .ok_or(Error::MissingField("Config.Image"))?;

    let environment = environment(record, include_path_env)?;
    let restart_policy = restart_policy(record)?;
    let resources = resources(record)?;
    let logging = logging(record)?;
    let networks = networks(record)?;

    let deploy = if restart_policy.is_some() || resources.is_some() {
        Some(Deploy {
            restart_policy,
            resources,
        })
    } else {
        None
    };

    Ok(Service {
        image,
        container_name: service_name(record)?,
        ports: ports(record)?,
        volumes: volumes(record)?,
        environment: if environment.is_empty() {
            None
        } else {
            Some(environment)
        },
        deploy,
        logging,
        networks: if networks.is_empty() {
            None
        } else {
            Some(networks)
        },
    })
}

/// One `"hostPort:containerPort"` entry per published binding; a container
/// port with no bindings contributes nothing.
pub fn ports(record: &ContainerInspectResponse) -> Result<Vec<String>, Error> {
    let port_map = network_settings(record)?
        .ports
        .as_ref()
        .ok_or(Error::MissingField("NetworkSettings.Ports"))?;

    // The engine emits this map with sorted keys; iterating the same way
    // keeps output deterministic.
    let mut entries: Vec<_> = port_map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut published = Vec::new();
    for (key, bindings) in entries {
        let bindings = match bindings {
            Some(bindings) => bindings,
            None => continue,
        };

        let container_port = match key.split_once('/') {
            Some((port, _)) => port,
            None => key.as_str(),
        };

        for binding in bindings {
            let host_port = binding
                .host_port
                .as_deref()
                .ok_or(Error::MissingField("NetworkSettings.Ports.HostPort"))?;
            published.push(format!("{}:{}", host_port, container_port));
        }
    }

    Ok(published)
}

pub fn volumes(record: &ContainerInspectResponse) -> Result<Vec<String>, Error> {
    let mounts = record.mounts.as_ref().ok_or(Error::MissingField("Mounts"))?;

    let mut out = Vec::new();
    for mount in mounts {
        let source = mount
            .source
            .as_deref()
            .ok_or(Error::MissingField("Mounts.Source"))?;
        let destination = mount
            .destination
            .as_deref()
            .ok_or(Error::MissingField("Mounts.Destination"))?;
        out.push(format!("{}:{}", source, destination));
    }

    Ok(out)
}

/// Order and duplicate keys are preserved; entries keyed exactly `PATH`
/// are dropped unless `include_path_env` is set.
pub fn environment(
    record: &ContainerInspectResponse,
    include_path_env: bool,
) -> Result<Vec<String>, Error> {
    let env = config(record)?
        .env
        .as_ref()
        .ok_or(Error::MissingField("Config.Env"))?;

    Ok(env
        .iter()
        .filter(|entry| include_path_env || env_key(entry) != "PATH")
        .cloned()
        .collect())
}

fn env_key(entry: &str) -> &str {
    match entry.split_once('=') {
        Some((key, _)) => key,
        None => entry,
    }
}

pub fn restart_policy(
    record: &ContainerInspectResponse,
) -> Result<Option<RestartPolicy>, Error> {
    let policy = host_config(record)?
        .restart_policy
        .as_ref()
        .ok_or(Error::MissingField("HostConfig.RestartPolicy"))?;
    let name = policy
        .name
        .as_ref()
        .ok_or(Error::MissingField("HostConfig.RestartPolicy.Name"))?;

    let condition: &str = name.as_ref();
    if condition.is_empty() {
        return Ok(None);
    }

    // MaximumRetryCount only means something for on-failure; the engine
    // may omit it, in which case compose expects 0.
    let max_attempts = if *name == RestartPolicyNameEnum::ON_FAILURE {
        Some(policy.maximum_retry_count.unwrap_or(0))
    } else {
        None
    };

    Ok(Some(RestartPolicy {
        condition: condition.to_string(),
        max_attempts,
    }))
}

pub fn resources(record: &ContainerInspectResponse) -> Result<Option<Resources>, Error> {
    let host = host_config(record)?;

    let cpus = match host.nano_cpus {
        Some(nano) if nano != 0 => Some((nano as f64 / NANO_CPUS_PER_CPU).to_string()),
        _ => None,
    };

    let memory = match host.memory {
        Some(bytes) if bytes != 0 => Some(bytes),
        _ => None,
    };

    if cpus.is_none() && memory.is_none() {
        return Ok(None);
    }

    Ok(Some(Resources { cpus, memory }))
}

pub fn logging(record: &ContainerInspectResponse) -> Result<Option<Logging>, Error> {
    let log_config = host_config(record)?
        .log_config
        .as_ref()
        .ok_or(Error::MissingField("HostConfig.LogConfig"))?;
    let driver = log_config
        .typ
        .as_deref()
        .ok_or(Error::MissingField("HostConfig.LogConfig.Type"))?;

    if driver.is_empty() {
        return Ok(None);
    }

    let options = log_config
        .config
        .as_ref()
        .ok_or(Error::MissingField("HostConfig.LogConfig.Config"))?;

    Ok(Some(Logging {
        driver: driver.to_string(),
        options: options
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    }))
}

pub fn networks(record: &ContainerInspectResponse) -> Result<Vec<String>, Error> {
    let networks = network_settings(record)?
        .networks
        .as_ref()
        .ok_or(Error::MissingField("NetworkSettings.Networks"))?;

    let mut names: Vec<String> = networks.keys().cloned().collect();
    names.sort();

    Ok(names)
}

fn config(record: &ContainerInspectResponse) -> Result<&ContainerConfig, Error> {
    record.config.as_ref().ok_or(Error::MissingField("Config"))
}

fn host_config(record: &ContainerInspectResponse) -> Result<&HostConfig, Error> {
    record
        .host_config
        .as_ref()
        .ok_or(Error::MissingField("HostConfig"))
}

fn network_settings(record: &ContainerInspectResponse) -> Result<&NetworkSettings, Error> {
    record
        .network_settings
        .as_ref()
        .ok_or(Error::MissingField("NetworkSettings"))
}
