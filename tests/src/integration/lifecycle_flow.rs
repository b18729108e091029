//! # Lifecycle Contract Scenarios
//!
//! The contract every component variant must honor, exercised through the
//! trait's provided methods rather than the state cell directly:
//!
//! 1. **Idempotent activation**: a second `activate()` is a success with no
//!    duplicated side effects
//! 2. **Faithful failure**: a failed startup hook leaves FAILED and the
//!    error reaches the caller
//! 3. **Reset discipline**: FAILED components re-activate only after an
//!    explicit `reset()`
//! 4. **No-op deactivation**: `deactivate()` on STOPPED succeeds silently

#[cfg(test)]
mod tests {
    use clarity_component::testing::ProbeComponent;
    use clarity_component::{ActivationError, Component, LifecycleState};

    #[tokio::test]
    async fn test_double_activation_has_no_duplicate_side_effects() {
        let probe = ProbeComponent::new("worker");

        probe.activate().await.unwrap();
        probe.activate().await.unwrap();

        assert_eq!(probe.get_status().state, LifecycleState::Active);
        assert_eq!(probe.activations(), 1);
    }

    #[tokio::test]
    async fn test_full_cycle_and_restart() {
        let probe = ProbeComponent::new("worker");

        probe.activate().await.unwrap();
        probe.deactivate().await.unwrap();
        assert_eq!(probe.get_status().state, LifecycleState::Stopped);

        // STOPPED re-enters through a fresh activate().
        probe.activate().await.unwrap();
        assert_eq!(probe.get_status().state, LifecycleState::Active);
        assert_eq!(probe.activations(), 2);
    }

    #[tokio::test]
    async fn test_failure_propagates_and_requires_reset() {
        let probe = ProbeComponent::failing("broken");

        let err = probe.activate().await.unwrap_err();
        assert!(matches!(err, ActivationError::Startup(_)));
        assert_eq!(probe.get_status().state, LifecycleState::Failed);

        // Re-activation without reset is rejected.
        assert!(matches!(
            probe.activate().await.unwrap_err(),
            ActivationError::ResetRequired
        ));

        probe.lifecycle().reset().unwrap();
        assert_eq!(probe.get_status().state, LifecycleState::Created);
    }

    #[tokio::test]
    async fn test_deactivate_stopped_is_silent_noop() {
        let probe = ProbeComponent::new("worker");
        probe.activate().await.unwrap();
        probe.deactivate().await.unwrap();

        probe.deactivate().await.unwrap();

        assert_eq!(probe.get_status().state, LifecycleState::Stopped);
        assert_eq!(probe.deactivations(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_failure_propagates_but_stops() {
        let probe = ProbeComponent::failing_shutdown("flaky");
        probe.activate().await.unwrap();

        let err = probe.deactivate().await.unwrap_err();
        assert!(matches!(err, ActivationError::Shutdown(_)));
        // The component still comes to rest.
        assert_eq!(probe.get_status().state, LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn test_status_snapshot_is_read_only() {
        let probe = ProbeComponent::new("worker");
        probe.activate().await.unwrap();

        let before = probe.get_status();
        let after = probe.get_status();

        assert_eq!(before.state, after.state);
        assert_eq!(probe.activations(), 1);
        assert!(after.health.contains_key("activations"));
    }
}
