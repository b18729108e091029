//! # Boot Pipeline Scenarios
//!
//! End-to-end runs of the staged pipeline over a real runtime context:
//! fail-fast halting with exit-code mapping, the safe-mode prefix, and the
//! announcements external observers rely on.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;

    use boot_runtime::{
        BootConfig, BootOrchestrator, BootScope, BootStage, NullSnapshotStore, OverallStatus,
        RuntimeContext, ServiceBlueprint, StageStatus, StaticSecrets,
    };
    use clarity_bus::well_known;
    use clarity_component::testing::ProbeComponent;
    use clarity_component::{Component, LifecycleState};
    use clarity_types::{RoleTag, TrustLevel};

    fn orchestrator(blueprints: Vec<ServiceBlueprint>) -> BootOrchestrator {
        let mut orchestrator = BootOrchestrator::new(
            RuntimeContext::default(),
            BootConfig::default(),
            Arc::new(StaticSecrets::development()),
            Arc::new(NullSnapshotStore),
        );
        for blueprint in blueprints {
            orchestrator = orchestrator.with_service(blueprint);
        }
        orchestrator
    }

    #[tokio::test]
    async fn test_full_boot_composes_the_runtime() {
        let worker = Arc::new(ProbeComponent::new("worker"));
        let orchestrator = orchestrator(vec![ServiceBlueprint::new(
            Arc::clone(&worker) as Arc<dyn Component>,
            TrustLevel::Medium,
            &[RoleTag::Reasoning],
        )]);

        let mut activations = orchestrator
            .context()
            .bus()
            .subscribe_stream(well_known::COMPONENT_ACTIVATED, "observer");
        let mut loops = orchestrator
            .context()
            .bus()
            .subscribe_stream(well_known::LOOP_COMPLETED, "observer");

        let report = orchestrator.boot(BootScope::Full).await;

        assert_eq!(report.overall, OverallStatus::Success);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.results.len(), 9);

        // The worker was registered, activated, and announced.
        assert_eq!(worker.lifecycle().state(), LifecycleState::Active);
        let announced = timeout(Duration::from_secs(1), activations.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(announced.source, worker.id());

        // Stage 8 emitted its forensic diagnostics envelope.
        let sweep = timeout(Duration::from_secs(1), loops.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sweep.payload["loop_type"], "forensic-diagnostics");
        assert_eq!(sweep.payload["status"], "success");

        // The manifest reflects the bring-up: worker plus oversight.
        let manifest = orchestrator.context().manifest();
        assert_eq!(manifest.get_active_components().len(), 2);
        assert_eq!(
            manifest.get_components_by_role(RoleTag::Oversight).len(),
            1
        );
    }

    #[tokio::test]
    async fn test_stage_five_failure_maps_to_exit_code_five() {
        let orchestrator = orchestrator(vec![ServiceBlueprint::new(
            Arc::new(ProbeComponent::failing("broken")),
            TrustLevel::Low,
            &[],
        )]);

        let report = orchestrator.boot(BootScope::Full).await;

        assert_eq!(report.overall, OverallStatus::Failed);
        assert_eq!(report.exit_code(), 5);

        // Stages 0-4 passed, stage 5 failed, stages 6-8 never attempted.
        for stage in BootScope::SafeMode.stages() {
            assert_eq!(
                report.stage_result(*stage).unwrap().status,
                StageStatus::Passed
            );
        }
        assert_eq!(
            report.stage_result(BootStage::ServiceBringUp).unwrap().status,
            StageStatus::Failed
        );
        for stage in [
            BootStage::SmokeTests,
            BootStage::OversightSetup,
            BootStage::ForensicDiagnostics,
        ] {
            assert!(report.stage_result(stage).is_none());
        }
    }

    #[tokio::test]
    async fn test_safe_mode_validates_without_starting_services() {
        let worker = Arc::new(ProbeComponent::new("worker"));
        let orchestrator = orchestrator(vec![ServiceBlueprint::new(
            Arc::clone(&worker) as Arc<dyn Component>,
            TrustLevel::Medium,
            &[],
        )]);

        let report = orchestrator.boot(BootScope::SafeMode).await;

        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.results.len(), 5);
        assert!(report.stage_result(BootStage::ServiceBringUp).is_none());
        assert_eq!(worker.lifecycle().state(), LifecycleState::Created);
        assert!(orchestrator.context().manifest().is_empty());
    }

    #[tokio::test]
    async fn test_stage_failure_announced_on_bus() {
        let orchestrator = orchestrator(vec![ServiceBlueprint::new(
            Arc::new(ProbeComponent::failing("broken")),
            TrustLevel::Low,
            &[],
        )]);
        let mut failures = orchestrator
            .context()
            .bus()
            .subscribe_stream(well_known::BOOT_STAGE_FAILED, "observer");

        let report = orchestrator.boot(BootScope::Full).await;
        assert_eq!(report.overall, OverallStatus::Failed);

        let announcement = timeout(Duration::from_secs(1), failures.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(announcement.payload["stage"], "service-bring-up");
        assert_eq!(announcement.payload["index"], 5);
    }

    #[tokio::test]
    async fn test_boot_then_shutdown_round_trip() {
        let worker = Arc::new(ProbeComponent::new("worker"));
        let orchestrator = orchestrator(vec![ServiceBlueprint::new(
            Arc::clone(&worker) as Arc<dyn Component>,
            TrustLevel::Medium,
            &[],
        )]);

        let report = orchestrator.boot(BootScope::Full).await;
        assert_eq!(report.exit_code(), 0);

        orchestrator.shutdown().await;

        assert_eq!(worker.lifecycle().state(), LifecycleState::Stopped);
        assert!(orchestrator
            .context()
            .manifest()
            .get_active_components()
            .is_empty());
    }
}
