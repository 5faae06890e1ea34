use serde::{Deserialize, Serialize};
use std::fmt;

/// 배포 엔진이 보고하는 프로세스 이벤트 종류이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessEvent {
    /// 단계 시작 알림.
    Start,
    /// 진행 중 알림. 컴포넌트가 붙어 있으면 해당 컴포넌트 완료를 뜻한다.
    Running,
    /// 단계 정상 종료.
    Finished,
    /// 단계 실패.
    Failed,
}

impl fmt::Display for ProcessEvent {
    /// 원시 이벤트 이름을 그대로 출력한다.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessEvent::Start => "Start",
            ProcessEvent::Running => "Running",
            ProcessEvent::Finished => "Finished",
            ProcessEvent::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// 설치/제거 작업의 최상위 단계이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallationPhase {
    /// 선행 리소스 설치.
    #[serde(rename = "install-prerequisites")]
    InstallPreRequisites,
    /// 선행 리소스 제거.
    #[serde(rename = "uninstall-prerequisites")]
    UninstallPreRequisites,
    /// 컴포넌트 설치.
    InstallComponents,
    /// 컴포넌트 제거.
    UninstallComponents,
}

impl InstallationPhase {
    /// 단계 Step에 표시할 문구를 반환한다.
    pub fn label(self) -> &'static str {
        match self {
            InstallationPhase::InstallPreRequisites => "Deploying pre-requisites",
            InstallationPhase::UninstallPreRequisites => "Undeploying pre-requisites",
            InstallationPhase::InstallComponents => "Deploying components",
            InstallationPhase::UninstallComponents => "Undeploying components",
        }
    }

    /// 제거 방향의 단계인지 여부.
    pub fn is_uninstall(self) -> bool {
        matches!(
            self,
            InstallationPhase::UninstallPreRequisites | InstallationPhase::UninstallComponents
        )
    }
}

impl fmt::Display for InstallationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallationPhase::InstallPreRequisites => "install-prerequisites",
            InstallationPhase::UninstallPreRequisites => "uninstall-prerequisites",
            InstallationPhase::InstallComponents => "install-components",
            InstallationPhase::UninstallComponents => "uninstall-components",
        };
        f.write_str(name)
    }
}

/// 컴포넌트 작업 결과이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    /// 정상 처리.
    Ok,
    /// 오류 발생.
    Error,
}

/// 단계 하위의 개별 컴포넌트 정보이다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// 컴포넌트 이름.
    pub name: String,
    /// 처리 결과.
    pub status: ComponentStatus,
}

/// 배포 엔진이 큐에 넣는 원시 이벤트이다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessUpdate {
    /// 이벤트 종류.
    pub event: ProcessEvent,
    /// 이벤트가 속한 단계.
    pub phase: InstallationPhase,
    /// 컴포넌트 정보. 없으면 단계 자체에 대한 이벤트이다.
    #[serde(default)]
    pub component: Option<Component>,
}

impl ProcessUpdate {
    /// 단계 시작 이벤트를 만든다.
    pub fn start(phase: InstallationPhase) -> Self {
        Self {
            event: ProcessEvent::Start,
            phase,
            component: None,
        }
    }

    /// 단계 정상 종료 이벤트를 만든다.
    pub fn finished(phase: InstallationPhase) -> Self {
        Self {
            event: ProcessEvent::Finished,
            phase,
            component: None,
        }
    }

    /// 단계 실패 이벤트를 만든다.
    pub fn failed(phase: InstallationPhase) -> Self {
        Self {
            event: ProcessEvent::Failed,
            phase,
            component: None,
        }
    }

    /// 컴포넌트 결과 이벤트를 만든다. 엔진과 동일하게 `Running`으로 보고한다.
    pub fn component(
        phase: InstallationPhase,
        name: impl Into<String>,
        status: ComponentStatus,
    ) -> Self {
        Self {
            event: ProcessEvent::Running,
            phase,
            component: Some(Component {
                name: name.into(),
                status,
            }),
        }
    }

    /// 원시 이벤트를 렌더링 동작으로 분류한다.
    ///
    /// `Start`는 컴포넌트 유무와 상관없이 단계 시작이다. 이름이 비어 있는 컴포넌트는
    /// 없는 것으로 취급한다. 컴포넌트가 붙은 나머지 이벤트는 모두 해당 컴포넌트의
    /// 완료로 해석되므로, 향후 엔진이 "아직 진행 중" 신호를 컴포넌트와 함께 보내면
    /// 완료로 잘못 그려진다.
    pub fn classify(self) -> RenderAction {
        let ProcessUpdate {
            event,
            phase,
            component,
        } = self;
        let component = component.filter(|c| !c.name.is_empty());
        match (event, component) {
            (ProcessEvent::Start, _) => RenderAction::PhaseStart(phase),
            (_, Some(Component { name, status })) => RenderAction::ComponentResult {
                phase,
                name,
                status,
            },
            (ProcessEvent::Running, None) => RenderAction::Heartbeat(phase),
            (outcome, None) => RenderAction::PhaseStop { phase, outcome },
        }
    }
}

/// 분류가 끝난 렌더링 동작이다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderAction {
    /// 단계 Step을 연다.
    PhaseStart(InstallationPhase),
    /// 단계 Step을 닫는다. `outcome`이 `Finished`가 아니면 실패로 표시한다.
    PhaseStop {
        phase: InstallationPhase,
        outcome: ProcessEvent,
    },
    /// 컴포넌트 Step을 만들고 즉시 닫는다.
    ComponentResult {
        phase: InstallationPhase,
        name: String,
        status: ComponentStatus,
    },
    /// 컴포넌트 없는 진행 알림. 아무것도 그리지 않는다.
    Heartbeat(InstallationPhase),
}

impl RenderAction {
    /// 동작이 속한 단계.
    pub fn phase(&self) -> InstallationPhase {
        match self {
            RenderAction::PhaseStart(phase) | RenderAction::Heartbeat(phase) => *phase,
            RenderAction::PhaseStop { phase, .. } | RenderAction::ComponentResult { phase, .. } => {
                *phase
            }
        }
    }
}

impl From<ProcessUpdate> for RenderAction {
    fn from(update: ProcessUpdate) -> Self {
        update.classify()
    }
}
