use anyhow::Result;
use fanlog::{
    CompositeLoggingProvider, ConfigError, LogEntry, LoggingConfig, LoggingProvider,
    LoggingProviderCollection, LoggingSystem, MemoryLoggingProvider, ProviderDeclaration,
    Severity, SharedProvider,
};
use std::collections::BTreeMap;
use std::sync::Arc;

fn declaration(name: &str, kind: &str, attributes: &[(&str, &str)]) -> ProviderDeclaration {
    ProviderDeclaration {
        name: name.to_string(),
        kind: kind.to_string(),
        attributes: attributes
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn config(default_provider: &str, providers: Vec<ProviderDeclaration>) -> LoggingConfig {
    LoggingConfig {
        default_provider: default_provider.to_string(),
        providers,
    }
}

fn attribute_bag(pairs: &[(&str, &str)]) -> fanlog::AttributeBag {
    fanlog::AttributeBag::new(
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    )
}

#[test]
fn completion_resolves_a_single_referenced_provider() -> Result<()> {
    let referenced = Arc::new(MemoryLoggingProvider::new("Other Provider"));
    let default_provider = Arc::new(MemoryLoggingProvider::new("Default Provider"));
    let composite = CompositeLoggingProvider::from_attributes(
        "forwarder",
        attribute_bag(&[("provider1", "Other Provider")]),
    )?;

    let registry = LoggingProviderCollection::from_providers([
        referenced.clone() as SharedProvider,
        default_provider.clone() as SharedProvider,
    ])?;
    composite.complete_initialization(&registry, &(default_provider as SharedProvider))?;

    let children = composite.providers()?;
    assert_eq!(children.len(), 1);
    assert!(Arc::ptr_eq(&children[0], &(referenced as SharedProvider)));
    Ok(())
}

#[test]
fn resolved_children_follow_ascending_numeric_order_with_gaps() -> Result<()> {
    // Attribute numbers 3, 66 and 143; names chosen so that name order
    // disagrees with numeric order.
    let first = Arc::new(MemoryLoggingProvider::new("Z first provider"));
    let second = Arc::new(MemoryLoggingProvider::new("Y second provider"));
    let third = Arc::new(MemoryLoggingProvider::new("X third provider"));
    let default_provider = Arc::new(MemoryLoggingProvider::new("Default Provider"));
    let composite = CompositeLoggingProvider::from_attributes(
        "forwarder",
        attribute_bag(&[
            ("provider3", "Z first provider"),
            ("provider143", "X third provider"),
            ("provider66", "Y second provider"),
        ]),
    )?;

    let registry = LoggingProviderCollection::from_providers([
        third.clone() as SharedProvider,
        default_provider.clone() as SharedProvider,
        first.clone() as SharedProvider,
        second.clone() as SharedProvider,
    ])?;
    composite.complete_initialization(&registry, &(default_provider as SharedProvider))?;

    let children = composite.providers()?;
    assert_eq!(children.len(), 3);
    assert!(Arc::ptr_eq(&children[0], &(first as SharedProvider)));
    assert!(Arc::ptr_eq(&children[1], &(second as SharedProvider)));
    assert!(Arc::ptr_eq(&children[2], &(third as SharedProvider)));
    Ok(())
}

#[test]
fn completed_composite_fans_out_to_the_referenced_sinks() -> Result<()> {
    let buffer = Arc::new(MemoryLoggingProvider::new("buffer"));
    let composite = CompositeLoggingProvider::from_attributes(
        "forwarder",
        attribute_bag(&[("provider1", "buffer")]),
    )?;

    let registry =
        LoggingProviderCollection::from_providers([buffer.clone() as SharedProvider])?;
    let default_provider = buffer.clone() as SharedProvider;
    composite.complete_initialization(&registry, &default_provider)?;

    composite.log(&LogEntry::from_message("Some message"))?;

    let entries = buffer.logged_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message(), "Some message");
    Ok(())
}

#[test]
fn missing_referenced_name_fails_completion_with_a_spelling_hint() {
    let default_provider = Arc::new(MemoryLoggingProvider::new("Default Provider"));
    let composite = CompositeLoggingProvider::from_attributes(
        "forwarder",
        attribute_bag(&[("provider1", "Non existing provider name")]),
    )
    .unwrap();

    let registry = LoggingProviderCollection::from_providers([
        default_provider.clone() as SharedProvider,
    ])
    .unwrap();
    let error = composite
        .complete_initialization(&registry, &(default_provider as SharedProvider))
        .unwrap_err();

    let rendered = error.to_string();
    assert!(rendered.contains("references a provider"));
    assert!(rendered.contains("does not exist"));
    assert!(rendered.contains("CompositeLoggingProvider"));
    assert!(rendered.contains("forwarder"));
    assert!(rendered.contains("Non existing provider name"));
    assert!(rendered.contains("spelled correctly"));
}

#[test]
fn system_initialization_wires_composite_and_sinks() -> Result<()> {
    let system = LoggingSystem::initialize(&config(
        "forwarder",
        vec![
            declaration("forwarder", "composite", &[("provider1", "buffer")]),
            declaration("buffer", "memory", &[]),
        ],
    ))?;

    assert_eq!(system.default_provider().name(), "forwarder");
    system.log(&LogEntry::from_message("hello"))?;
    Ok(())
}

#[test]
fn forward_references_resolve_regardless_of_declaration_order() -> Result<()> {
    // The composite is declared before the provider it references.
    let system = LoggingSystem::initialize(&config(
        "forwarder",
        vec![
            declaration("forwarder", "composite", &[("provider1", "late")]),
            declaration("late", "memory", &[]),
        ],
    ))?;

    system.log(&LogEntry::from_message("forward"))?;
    Ok(())
}

#[test]
fn missing_fallback_reference_fails_completion() {
    let error = LoggingSystem::initialize(&config(
        "buffer",
        vec![declaration(
            "buffer",
            "memory",
            &[("fallbackProvider", "ghost")],
        )],
    ))
    .unwrap_err();

    let rendered = error.to_string();
    assert!(rendered.contains("ghost"));
    assert!(rendered.contains("spelled correctly"));
}

#[test]
fn two_composites_referencing_each_other_fail_with_a_circular_error() {
    let error = LoggingSystem::initialize(&config(
        "C1",
        vec![
            declaration("C1", "composite", &[("provider1", "C2")]),
            declaration("C2", "composite", &[("provider1", "C1")]),
        ],
    ))
    .unwrap_err();

    assert!(matches!(error, ConfigError::CircularReference { .. }));
    assert!(error.to_string().contains("circular"));
}

#[test]
fn a_cycle_through_a_fallback_edge_is_detected_identically() {
    let error = LoggingSystem::initialize(&config(
        "C1",
        vec![
            declaration(
                "C1",
                "composite",
                &[("provider1", "buffer"), ("fallbackProvider", "C2")],
            ),
            declaration("C2", "composite", &[("provider1", "C1")]),
            declaration("buffer", "memory", &[]),
        ],
    ))
    .unwrap_err();

    assert!(error.to_string().contains("circular"));
}

#[test]
fn a_composite_referencing_itself_fails_with_a_circular_error() {
    let error = LoggingSystem::initialize(&config(
        "C1",
        vec![declaration("C1", "composite", &[("provider1", "C1")])],
    ))
    .unwrap_err();

    assert!(error.to_string().contains("circular"));
}

#[test]
fn duplicate_declaration_names_are_rejected() {
    let error = LoggingSystem::initialize(&config(
        "twin",
        vec![
            declaration("twin", "memory", &[]),
            declaration("twin", "memory", &[]),
        ],
    ))
    .unwrap_err();

    assert!(matches!(error, ConfigError::DuplicateProviderName { .. }));
}

#[test]
fn missing_default_provider_is_rejected_before_completion() {
    let error = LoggingSystem::initialize(&config(
        "nowhere",
        vec![declaration("buffer", "memory", &[])],
    ))
    .unwrap_err();

    assert!(matches!(error, ConfigError::MissingDefaultProvider { .. }));
    assert!(error.to_string().contains("nowhere"));
}

#[test]
fn fallback_chains_between_sinks_are_allowed() -> Result<()> {
    let system = LoggingSystem::initialize(&config(
        "primary",
        vec![
            declaration("primary", "memory", &[("fallbackProvider", "secondary")]),
            declaration("secondary", "memory", &[]),
        ],
    ))?;

    system.log(&LogEntry::from_message("steady"))?;
    Ok(())
}

#[test]
fn initialization_from_toml_wires_the_whole_system() -> Result<()> {
    let parsed = LoggingConfig::from_toml_str(
        r#"
        [logging]
        default_provider = "forwarder"

        [[logging.providers]]
        name = "forwarder"
        kind = "composite"
        attributes = { provider1 = "buffer", threshold = "warning" }

        [[logging.providers]]
        name = "buffer"
        kind = "memory"
        "#,
    )?;

    let system = LoggingSystem::initialize(&parsed)?;

    let forwarder = system.provider("forwarder").unwrap();
    assert_eq!(forwarder.threshold(), Severity::Warning);
    system.log(&LogEntry::from_message("below threshold, still ok"))?;
    Ok(())
}
