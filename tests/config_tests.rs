//! Integration tests for configuration loading and host wiring

use keeper::prelude::*;
use std::io::Write;

fn host_from(yaml: &str) -> KeeperHost {
    let config = KeeperConfig::from_yaml_str(yaml).unwrap();
    KeeperHost::in_memory(config).unwrap()
}

#[test]
fn test_empty_yaml_gives_defaults() {
    let config = KeeperConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, KeeperConfig::default());
}

#[test]
fn test_rejects_zero_max_size() {
    let result = KeeperConfig::from_yaml_str("pagination:\n  max_size: 0\n");
    assert!(result.is_err());
}

#[test]
fn test_rejects_broadcast_without_capacity() {
    let yaml = "audit:\n  sink: broadcast\n  channel_capacity: 0\n";
    assert!(KeeperConfig::from_yaml_str(yaml).is_err());
}

#[test]
fn test_rejects_unknown_sink() {
    assert!(KeeperConfig::from_yaml_str("audit:\n  sink: kafka\n").is_err());
}

#[test]
fn test_unknown_override_type_fails_host() {
    let config = KeeperConfig::from_yaml_str(
        r#"
resources:
  - type_name: Snake
    resource_type: serpent
"#,
    )
    .unwrap();

    let err = KeeperHost::in_memory(config).err().unwrap();
    assert!(matches!(err, keeper::core::ConfigError::UnknownType { .. }));
}

#[test]
fn test_load_host_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
pagination:
  default_size: 5
  max_size: 10
audit:
  sink: none
"#
    )
    .unwrap();

    let config = KeeperConfig::from_yaml_file(file.path()).unwrap();
    let host = KeeperHost::in_memory(config).unwrap();

    assert_eq!(host.page(2), PageRequest::new(2, 5));
    assert!(host.memory_audit.is_none());
    assert!(host.broadcast_audit.is_none());
}

#[tokio::test]
async fn test_resource_override_names_audit_events() {
    let host = host_from(
        r#"
audit:
  sink: memory
resources:
  - type_name: Enclosure
    resource_type: tank
    base_action: terrarium
"#,
    );
    let sink = host.memory_audit.clone().unwrap();

    host.users
        .create(&AuthContext::System, UserDto::new("alice", "alice@example.com"))
        .await
        .unwrap();
    host.enclosures
        .create(
            &AuthContext::user("alice"),
            EnclosureDto::new("Tank-1", EnclosureType::Terrarium),
        )
        .await
        .unwrap();

    let events = sink.events_of(AuditOperationType::Create);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].resource_type, "user");
    assert_eq!(events[0].actor, "system");
    assert_eq!(events[1].resource_type, "tank");
    assert_eq!(events[1].action, "terrarium.create");
    assert_eq!(host.resolver.resource_type::<Enclosure>(), "tank");
    assert_eq!(host.resolver.resource_type::<Reptile>(), "reptile");
}

#[tokio::test]
async fn test_max_page_size_is_enforced() {
    let host = host_from("pagination:\n  default_size: 2\n  max_size: 3\n");
    host.users
        .create(&AuthContext::System, UserDto::new("alice", "alice@example.com"))
        .await
        .unwrap();
    let alice = AuthContext::user("alice");
    for i in 0..5 {
        host.enclosures
            .create(&alice, EnclosureDto::new(format!("T{}", i), EnclosureType::Vivarium))
            .await
            .unwrap();
    }

    let page = host
        .enclosures
        .page(&alice, PageRequest::new(0, 50))
        .await
        .unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page.meta.size, 3);
    assert_eq!(page.meta.total, 5);
}

#[tokio::test]
async fn test_broadcast_sink_publishes_events() {
    let host = host_from("audit:\n  sink: broadcast\n  channel_capacity: 16\n");
    let mut events = host.broadcast_audit.as_ref().unwrap().subscribe();

    let user = host
        .users
        .create(&AuthContext::System, UserDto::new("alice", "alice@example.com"))
        .await
        .unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event.operation, AuditOperationType::Create);
    assert_eq!(event.resource_type, "user");
    assert_eq!(
        event.subject.as_identifier(),
        user.id.map(|id| id.to_string()).as_deref()
    );
}

#[test]
fn test_init_tracing_is_idempotent() {
    let config = KeeperConfig::default();
    init_tracing(&config.logging);
    init_tracing(&config.logging);
}
