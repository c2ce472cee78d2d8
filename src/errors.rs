use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Container {0} not found")]
    ContainerNotFound(String),

    #[error("Docker API error: {0}")]
    DockerApi(String),

    #[error("Error executing command: {0}")]
    DockerCommand(String),

    #[error("Error decoding JSON from docker inspect: {0}")]
    InspectParse(String),

    #[error("Expected key not found in docker inspect data: {0}")]
    MissingField(&'static str),

    #[error("File {0} not found")]
    ComposeFileMissing(String),

    #[error("Error parsing YAML file: {0}")]
    ComposeParse(String),

    #[error("Error encoding YAML: {0}")]
    ComposeEncode(String),

    #[error("IO error: {0}")]
    Io(String),
}
