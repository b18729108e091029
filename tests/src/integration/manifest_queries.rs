//! # Registry Classification Scenarios
//!
//! Role and trust queries against the manifest, including the documented
//! exact-match trust semantics and order independence of role queries.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use clarity_component::testing::ProbeComponent;
    use clarity_component::Component;
    use clarity_manifest::Manifest;
    use clarity_types::{ComponentId, ConfigError, RoleTag, TrustLevel};

    fn probe(tag: &str) -> Arc<dyn Component> {
        Arc::new(ProbeComponent::new(tag))
    }

    #[test]
    fn test_role_query_matches_exactly_the_tagged_components() {
        // Register in one order, tag in another; the query result depends
        // only on the tags.
        let manifest = Manifest::new();
        let untagged = probe("untagged");
        let memory_a = probe("memory-a");
        let memory_b = probe("memory-b");

        manifest
            .register(Arc::clone(&memory_b), TrustLevel::Low, &[RoleTag::Memory])
            .unwrap();
        manifest
            .register(Arc::clone(&untagged), TrustLevel::High, &[RoleTag::Reasoning])
            .unwrap();
        manifest
            .register(Arc::clone(&memory_a), TrustLevel::Medium, &[RoleTag::Memory])
            .unwrap();

        let matched = manifest.get_components_by_role(RoleTag::Memory);
        let ids: Vec<ComponentId> = matched.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![memory_b.id(), memory_a.id()]);

        let roles = manifest.roles_of(untagged.id()).unwrap();
        assert!(roles.contains(&RoleTag::Reasoning));
        assert!(!roles.contains(&RoleTag::Memory));
    }

    #[test]
    fn test_trust_exact_match_versus_threshold() {
        let manifest = Manifest::new();
        let medium = probe("medium");
        let verified = probe("verified");

        manifest
            .register(Arc::clone(&medium), TrustLevel::Medium, &[])
            .unwrap();
        manifest
            .register(Arc::clone(&verified), TrustLevel::Verified, &[])
            .unwrap();

        // Exact match does not treat the level as a floor.
        assert_eq!(manifest.get_components_by_trust(TrustLevel::Medium).len(), 1);
        assert_eq!(
            manifest
                .get_components_by_trust_at_least(TrustLevel::Medium)
                .len(),
            2
        );
    }

    #[test]
    fn test_unrecognized_labels_reject_registration_whole() {
        let manifest = Manifest::new();
        let component = probe("worker");
        let id = component.id();

        let err = manifest
            .register_from_labels(component, "high", &["memory", "mascot"])
            .unwrap_err();

        assert!(matches!(err, ConfigError::UnknownRoleTag(_)));
        assert!(manifest.get(id).is_none());
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_active_flag_drives_active_query() {
        let manifest = Manifest::new();
        let worker = probe("worker");
        let id = worker.id();
        manifest.register(worker, TrustLevel::Medium, &[]).unwrap();

        assert!(manifest.get_active_components().is_empty());

        manifest.update_status(id, true).unwrap();
        assert_eq!(manifest.get_active_components().len(), 1);

        manifest.update_status(id, false).unwrap();
        assert!(manifest.get_active_components().is_empty());
    }

    #[test]
    fn test_trust_escalation_is_the_only_raise_path() {
        let manifest = Manifest::new();
        let worker = probe("worker");
        let id = worker.id();
        manifest.register(worker, TrustLevel::Untrusted, &[]).unwrap();

        manifest.escalate_trust(id, TrustLevel::Medium).unwrap();
        assert!(manifest.get_components_by_trust(TrustLevel::Medium).len() == 1);

        // Lowering is rejected, and the level is untouched.
        assert!(manifest.escalate_trust(id, TrustLevel::Low).is_err());
        assert_eq!(
            manifest.entry_summary(id).unwrap().trust_level,
            TrustLevel::Medium
        );
    }
}
