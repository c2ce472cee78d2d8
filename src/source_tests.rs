use crate::errors::Error;
use crate::source::parse_inspect_output;
use crate::transform;

// Trimmed-down `docker inspect` output, shaped like the real thing.
const INSPECT_JSON: &str = r#"[
  {
    "Id": "4f8b9d7c2a91",
    "Name": "/web1",
    "Config": {
      "Image": "nginx:latest",
      "Env": ["PATH=/usr/local/sbin:/usr/local/bin", "NGINX_VERSION=1.25.3"]
    },
    "HostConfig": {
      "RestartPolicy": { "Name": "on-failure", "MaximumRetryCount": 3 },
      "NanoCpus": 1500000000,
      "Memory": 0,
      "LogConfig": { "Type": "json-file", "Config": { "max-size": "10m" } }
    },
    "NetworkSettings": {
      "Ports": {
        "80/tcp": [{ "HostIp": "0.0.0.0", "HostPort": "8080" }],
        "9000/tcp": null
      },
      "Networks": { "bridge": {} }
    },
    "Mounts": [{ "Source": "/srv/www", "Destination": "/usr/share/nginx/html" }]
  }
]"#;

#[test]
fn test_parse_inspect_output() {
    let records = parse_inspect_output(INSPECT_JSON.as_bytes()).unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.name.as_deref(), Some("/web1"));

    // The parsed record feeds straight into the extractors, exactly like
    // one fetched over the API.
    let service = transform::service_definition(record, false).unwrap();
    assert_eq!(service.image, "nginx:latest");
    assert_eq!(service.container_name, "web1");
    assert_eq!(service.ports, vec!["8080:80"]);
    assert_eq!(service.volumes, vec!["/srv/www:/usr/share/nginx/html"]);
    assert_eq!(
        service.environment.as_deref(),
        Some(&["NGINX_VERSION=1.25.3".to_string()][..])
    );

    let deploy = service.deploy.unwrap();
    let policy = deploy.restart_policy.unwrap();
    assert_eq!(policy.condition, "on-failure");
    assert_eq!(policy.max_attempts, Some(3));
    let resources = deploy.resources.unwrap();
    assert_eq!(resources.cpus.as_deref(), Some("1.5"));
    assert_eq!(resources.memory, None);

    let logging = service.logging.unwrap();
    assert_eq!(logging.driver, "json-file");
    assert_eq!(
        logging.options.get("max-size").map(String::as_str),
        Some("10m")
    );

    assert_eq!(service.networks, Some(vec!["bridge".to_string()]));
}

#[test]
fn test_parse_inspect_output_rejects_malformed_json() {
    match parse_inspect_output(b"Error: No such object: web1") {
        Err(Error::InspectParse(_)) => {}
        other => panic!("Expected inspect parse error, got {:?}", other),
    }
}
