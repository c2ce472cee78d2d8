#[macro_use]
extern crate log;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

mod compose;

mod errors;

mod source;
#[cfg(test)]
mod source_tests;

mod transform;

use errors::Error;
use source::{ApiSource, CommandSource, InspectSource};

#[derive(Parser)]
#[command(
    name = "inspect2compose",
    version,
    about = "Transform Docker container info to Docker Compose service definitions"
)]
struct Cli {
    /// ID or name of the running Docker container; all running containers when omitted
    container: Option<String>,

    /// Output file to write the Docker Compose definition, '-' for stdout
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Include the PATH environment variable in the output
    #[arg(long)]
    include_path_env: bool,

    /// Path to an existing docker-compose.yml file to add the new services to
    #[arg(long, value_name = "FILE")]
    add_to: Option<PathBuf>,

    /// Use the specified address to connect to docker (api backend only)
    #[arg(short = 'a', long, value_name = "ADDRESS")]
    host: Option<String>,

    /// How to query the container runtime
    #[arg(long, value_enum, default_value_t = Backend::Api)]
    backend: Backend,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Docker Engine API over the local socket, or --host
    Api,
    /// Shell out to the docker binary
    Command,
}

#[tokio::main]
async fn main() {
    let env = env_logger::Env::default()
        .filter_or("LOG_LEVEL", "info")
        .write_style_or("LOG_STYLE", "always");
    env_logger::init_from_env(env);

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        error!("{}", err);
        std::process::exit(1);
    }

    info!("Docker Compose service definition(s) created successfully.");
}

async fn run(cli: Cli) -> Result<(), Error> {
    let source: Box<dyn InspectSource> = match cli.backend {
        Backend::Api => Box::new(ApiSource::connect(cli.host.as_deref())?),
        Backend::Command => Box::new(CommandSource),
    };

    let records = source.fetch(cli.container.as_deref()).await?;

    let mut services = Vec::with_capacity(records.len());
    for record in &records {
        let name = transform::service_name(record)?;
        let service = transform::service_definition(record, cli.include_path_env)?;
        services.push((name, service));
    }

    let document = match cli.add_to.as_ref() {
        Some(path) => {
            let mut existing = compose::load(path).await?;
            compose::merge(&mut existing, services)?;
            existing
        }
        None => compose::fresh(services)?,
    };

    compose::write(&document, &cli.output).await
}
