use super::error::RenderError;
use crate::deployment::{ComponentStatus, InstallationPhase, ProcessEvent, RenderAction};
use crate::step::{Step, StepFactory};
use std::collections::HashMap;
use std::sync::Arc;

/// 단계별로 열린 Step을 관리하며 렌더링 동작을 Step 호출로 옮긴다.
///
/// 소비 태스크 하나만 소유하므로 잠금 없이 사용한다.
pub struct PhaseRenderer {
    /// Step 생성기.
    factory: Arc<dyn StepFactory>,
    /// 단계별로 열린 Step. 단계당 최대 하나이다.
    ongoing: HashMap<InstallationPhase, Box<dyn Step>>,
}

impl PhaseRenderer {
    pub fn new(factory: Arc<dyn StepFactory>) -> Self {
        Self {
            factory,
            ongoing: HashMap::new(),
        }
    }

    /// 동작 하나를 렌더링한다.
    ///
    /// 수명 순서 위반이면 아무것도 그리지 않고 오류를 반환한다. 실패 보고는 Step을
    /// 실패로 그린 뒤 오류를 반환한다.
    pub fn render(&mut self, action: RenderAction) -> Result<(), RenderError> {
        match action {
            RenderAction::PhaseStart(phase) => self.start_phase(phase),
            RenderAction::PhaseStop { phase, outcome } => self.stop_phase(phase, outcome),
            RenderAction::ComponentResult {
                phase,
                name,
                status,
            } => self.render_component(phase, &name, status),
            RenderAction::Heartbeat(_) => Ok(()),
        }
    }

    /// 단계에 열린 Step이 있는지 여부.
    #[cfg(test)]
    pub(crate) fn is_open(&self, phase: InstallationPhase) -> bool {
        self.ongoing.contains_key(&phase)
    }

    /// 종료 이벤트 없이 남은 단계 Step을 실패로 닫는다.
    pub fn close_abandoned(&mut self) {
        for (phase, mut step) in self.ongoing.drain() {
            tracing::warn!(%phase, "종료 이벤트 없이 단계가 남아 있어 실패로 표시합니다.");
            step.failure();
        }
    }

    fn start_phase(&mut self, phase: InstallationPhase) -> Result<(), RenderError> {
        if self.ongoing.contains_key(&phase) {
            return Err(RenderError::PhaseAlreadyStarted(phase));
        }
        let step = self.factory.new_step(phase.label());
        self.ongoing.insert(phase, step);
        Ok(())
    }

    fn stop_phase(
        &mut self,
        phase: InstallationPhase,
        outcome: ProcessEvent,
    ) -> Result<(), RenderError> {
        let Some(mut step) = self.ongoing.remove(&phase) else {
            return Err(RenderError::PhaseNotStarted(phase));
        };
        if outcome == ProcessEvent::Finished {
            step.success();
            return Ok(());
        }
        step.failure();
        Err(RenderError::PhaseFailed {
            phase,
            event: outcome,
        })
    }

    fn render_component(
        &mut self,
        phase: InstallationPhase,
        name: &str,
        status: ComponentStatus,
    ) -> Result<(), RenderError> {
        if !self.ongoing.contains_key(&phase) {
            return Err(RenderError::PhaseNotStarted(phase));
        }
        let mut step = self.factory.new_step(&component_label(phase, name));
        match status {
            ComponentStatus::Ok => {
                step.success();
                Ok(())
            }
            ComponentStatus::Error => {
                step.failure();
                Err(RenderError::ComponentFailed(name.to_string()))
            }
        }
    }
}

/// 컴포넌트 Step 라벨을 만든다.
fn component_label(phase: InstallationPhase, name: &str) -> String {
    if phase.is_uninstall() {
        format!("Removing component '{name}'")
    } else {
        format!("Deploying component '{name}'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::ProcessUpdate;
    use crate::step::recording::{RecordingFactory, StepCall};

    const PHASE: InstallationPhase = InstallationPhase::InstallComponents;

    fn renderer() -> (RecordingFactory, PhaseRenderer) {
        let factory = RecordingFactory::new();
        let renderer = PhaseRenderer::new(Arc::new(factory.clone()));
        (factory, renderer)
    }

    fn render(renderer: &mut PhaseRenderer, update: ProcessUpdate) -> Result<(), RenderError> {
        renderer.render(update.classify())
    }

    #[test]
    fn component_inside_open_phase_is_created_and_closed_at_once() {
        let (factory, mut renderer) = renderer();
        render(&mut renderer, ProcessUpdate::start(PHASE)).expect("시작 실패");
        render(
            &mut renderer,
            ProcessUpdate::component(PHASE, "core", ComponentStatus::Ok),
        )
        .expect("컴포넌트 렌더링 실패");
        render(&mut renderer, ProcessUpdate::finished(PHASE)).expect("종료 실패");

        assert_eq!(
            factory.calls(),
            vec![
                StepCall::Created("Deploying components".into()),
                StepCall::Created("Deploying component 'core'".into()),
                StepCall::Success("Deploying component 'core'".into()),
                StepCall::Success("Deploying components".into()),
            ]
        );
        assert!(!renderer.is_open(PHASE));
    }

    #[test]
    fn second_start_is_rejected_without_a_new_step() {
        let (factory, mut renderer) = renderer();
        render(&mut renderer, ProcessUpdate::start(PHASE)).expect("시작 실패");
        let err = render(&mut renderer, ProcessUpdate::start(PHASE)).expect_err("중복 시작 허용됨");
        assert_eq!(err, RenderError::PhaseAlreadyStarted(PHASE));
        assert_eq!(factory.created(), vec!["Deploying components".to_string()]);
        assert!(renderer.is_open(PHASE));
    }

    #[test]
    fn stop_without_start_renders_nothing() {
        let (factory, mut renderer) = renderer();
        let err = render(&mut renderer, ProcessUpdate::finished(PHASE)).expect_err("허용됨");
        assert_eq!(err, RenderError::PhaseNotStarted(PHASE));
        assert!(factory.calls().is_empty());
    }

    #[test]
    fn failed_component_is_rendered_and_reported() {
        let (factory, mut renderer) = renderer();
        let phase = InstallationPhase::UninstallComponents;
        render(&mut renderer, ProcessUpdate::start(phase)).expect("시작 실패");
        let err = render(
            &mut renderer,
            ProcessUpdate::component(phase, "istio", ComponentStatus::Error),
        )
        .expect_err("실패가 보고되지 않음");
        assert_eq!(err, RenderError::ComponentFailed("istio".into()));
        assert_eq!(
            factory.terminals(),
            vec![StepCall::Failure("Removing component 'istio'".into())]
        );
        assert!(renderer.is_open(phase));
    }

    #[test]
    fn phases_are_tracked_independently() {
        let (factory, mut renderer) = renderer();
        let prereq = InstallationPhase::InstallPreRequisites;
        render(&mut renderer, ProcessUpdate::start(prereq)).expect("시작 실패");
        render(&mut renderer, ProcessUpdate::start(PHASE)).expect("시작 실패");
        let err = render(&mut renderer, ProcessUpdate::failed(prereq)).expect_err("실패 누락");
        assert_eq!(err.to_string(), "deployment phase install-prerequisites failed: Failed");
        assert!(renderer.is_open(PHASE));

        renderer.close_abandoned();
        assert_eq!(
            factory.terminals(),
            vec![
                StepCall::Failure("Deploying pre-requisites".into()),
                StepCall::Failure("Deploying components".into()),
            ]
        );
    }

    #[test]
    fn heartbeat_is_ignored() {
        let (factory, mut renderer) = renderer();
        let mut update = ProcessUpdate::start(PHASE);
        update.event = ProcessEvent::Running;
        render(&mut renderer, update).expect("하트비트 처리 실패");
        assert!(factory.calls().is_empty());
    }
}
