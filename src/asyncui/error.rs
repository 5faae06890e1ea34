use crate::deployment::{InstallationPhase, ProcessEvent};

/// 렌더링 중 감지되어 오류 채널로 전달되는 오류이다.
///
/// 어떤 오류도 소비 루프를 멈추지 않는다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// 이미 열린 단계에 대한 시작 이벤트.
    #[error("start for phase {0} already in progress")]
    PhaseAlreadyStarted(InstallationPhase),
    /// 열린 적 없는 단계에 대한 종료/컴포넌트 이벤트.
    #[error("stop for phase {0} with no matching start")]
    PhaseNotStarted(InstallationPhase),
    /// 단계가 `Finished` 이외의 이벤트로 끝났다.
    #[error("deployment phase {phase} failed: {event}")]
    PhaseFailed {
        phase: InstallationPhase,
        event: ProcessEvent,
    },
    /// 컴포넌트 처리 실패.
    #[error("deployment of component '{0}' failed")]
    ComponentFailed(String),
}

/// `RenderError`의 분류이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 단계 수명 순서 위반.
    IllegalState,
    /// 단계 실패 보고.
    PhaseFailure,
    /// 컴포넌트 실패 보고.
    ComponentFailure,
}

impl RenderError {
    /// 오류 분류를 반환한다.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::PhaseAlreadyStarted(_) | RenderError::PhaseNotStarted(_) => {
                ErrorKind::IllegalState
            }
            RenderError::PhaseFailed { .. } => ErrorKind::PhaseFailure,
            RenderError::ComponentFailed(_) => ErrorKind::ComponentFailure,
        }
    }
}

/// 컨트롤러 사용 순서가 잘못되었을 때 호출 지점으로 반환되는 오류이다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    /// `start`를 두 번 호출했다.
    #[error("progress controller was already started")]
    AlreadyStarted,
    /// `stop` 이후에 `start`를 호출했다.
    #[error("progress controller was already stopped")]
    AlreadyStopped,
    /// 실행 중이 아닌 컨트롤러에서 큐를 요청했다.
    #[error("progress controller is not running")]
    NotRunning,
    /// Tokio 런타임 밖에서 `start`를 호출했다.
    #[error("progress controller must be started inside a Tokio runtime")]
    NoRuntime,
    /// 큐가 이미 닫혔다.
    #[error("update queue is closed")]
    QueueClosed,
}
