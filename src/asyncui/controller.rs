use super::error::{ControllerError, RenderError};
use super::renderer::PhaseRenderer;
use crate::deployment::{ProcessUpdate, RenderAction};
use crate::plan::UiOptions;
use crate::step::StepFactory;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, Receiver, Sender, UnboundedSender};
use tokio_util::sync::CancellationToken;

/// 큐 용량 기본값. 1이면 소비자가 직전 이벤트를 받을 때까지 생산자가 대기한다.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1;

/// 배포 엔진의 이벤트를 받아 Step으로 그리는 비동기 진행 컨트롤러이다.
///
/// `start`가 소비 태스크 하나를 띄우고 생산자용 큐 핸들을 돌려준다. `stop`은 큐를
/// 닫고 이미 들어온 이벤트가 모두 그려질 때까지 기다린다.
pub struct AsyncUi {
    /// Step 생성기.
    factory: Arc<dyn StepFactory>,
    /// 호출자가 소유한 오류 채널.
    errors: Option<UnboundedSender<RenderError>>,
    /// 업데이트 큐 용량.
    queue_capacity: usize,
    /// 시작/종료 상태. `stop`이 동시에 호출되어도 큐를 한 번만 닫도록 보호한다.
    lifecycle: Mutex<Lifecycle>,
}

/// 컨트롤러 수명 단계이다.
enum Lifecycle {
    /// 아직 시작하지 않음.
    Idle,
    /// 소비 태스크 실행 중.
    Running {
        /// 컨트롤러가 보관하는 생산자 핸들.
        updates: Sender<ProcessUpdate>,
        /// 큐 종료 요청 신호.
        shutdown: CancellationToken,
        /// 소비 태스크 종료 신호.
        done: CancellationToken,
    },
    /// 종료됨. 이후 호출은 모두 무시된다.
    Stopped,
}

impl AsyncUi {
    /// 오류 채널 없이 컨트롤러를 만든다.
    pub fn new(factory: Arc<dyn StepFactory>) -> Self {
        Self {
            factory,
            errors: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    /// UI 옵션으로 큐 용량을 설정해 컨트롤러를 만든다.
    pub fn from_options(factory: Arc<dyn StepFactory>, options: &UiOptions) -> Self {
        Self::new(factory).with_queue_capacity(options.queue_capacity)
    }

    /// 렌더링 오류를 받을 채널을 지정한다. 컨트롤러는 이 채널을 읽거나 닫지 않는다.
    pub fn with_errors(mut self, errors: UnboundedSender<RenderError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// 업데이트 큐 용량을 지정한다. 0은 1로 올려 잡는다.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// 소비 태스크를 띄우고 생산자용 큐 핸들을 반환한다.
    ///
    /// Tokio 런타임 안에서 호출해야 하며 인스턴스당 한 번만 성공한다.
    pub fn start(&self) -> Result<UpdateSender, ControllerError> {
        let runtime = Handle::try_current().map_err(|_| ControllerError::NoRuntime)?;
        let mut lifecycle = self.lock();
        match *lifecycle {
            Lifecycle::Idle => {}
            Lifecycle::Running { .. } => return Err(ControllerError::AlreadyStarted),
            Lifecycle::Stopped => return Err(ControllerError::AlreadyStopped),
        }

        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let shutdown = CancellationToken::new();
        let done = CancellationToken::new();
        let renderer = PhaseRenderer::new(self.factory.clone());
        runtime.spawn(consume_updates(
            rx,
            renderer,
            self.errors.clone(),
            shutdown.clone(),
            done.clone(),
        ));
        tracing::debug!(capacity = self.queue_capacity, "진행 컨트롤러를 시작했습니다.");

        *lifecycle = Lifecycle::Running {
            updates: tx.clone(),
            shutdown,
            done,
        };
        Ok(UpdateSender { inner: tx })
    }

    /// 실행 중인 큐에 대한 생산자 핸들을 하나 더 얻는다.
    pub fn update_channel(&self) -> Result<UpdateSender, ControllerError> {
        match &*self.lock() {
            Lifecycle::Running { updates, .. } => Ok(UpdateSender {
                inner: updates.clone(),
            }),
            Lifecycle::Idle | Lifecycle::Stopped => Err(ControllerError::NotRunning),
        }
    }

    /// 소비 태스크가 이벤트를 받고 있는지 여부.
    pub fn is_running(&self) -> bool {
        matches!(*self.lock(), Lifecycle::Running { .. })
    }

    /// 큐를 닫고 남은 이벤트가 모두 그려질 때까지 기다린다.
    ///
    /// 이미 종료되었거나 시작하지 않았다면 즉시 반환한다.
    pub async fn stop(&self) {
        let done = {
            let mut lifecycle = self.lock();
            match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
                Lifecycle::Running {
                    updates,
                    shutdown,
                    done,
                } => {
                    drop(updates);
                    shutdown.cancel();
                    done
                }
                Lifecycle::Idle | Lifecycle::Stopped => return,
            }
        };
        done.cancelled().await;
        tracing::debug!("진행 컨트롤러가 종료되었습니다.");
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for AsyncUi {
    /// `stop` 없이 버려지면 종료만 요청한다. 남은 이벤트는 백그라운드에서 그려진다.
    fn drop(&mut self) {
        let lifecycle = self
            .lifecycle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Lifecycle::Running { shutdown, .. } = lifecycle {
            shutdown.cancel();
        }
    }
}

impl fmt::Debug for AsyncUi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncUi")
            .field("factory", &"<factory>")
            .field("errors", &self.errors.is_some())
            .field("queue_capacity", &self.queue_capacity)
            .field("running", &self.is_running())
            .finish()
    }
}

/// 생산자가 업데이트 큐에 이벤트를 넣는 핸들이다.
///
/// 큐가 가득 차면 `send`는 자리가 날 때까지 대기하고, 큐가 닫히면 대기 중이던
/// 호출을 포함해 모두 `ControllerError::QueueClosed`로 즉시 실패한다.
#[derive(Debug, Clone)]
pub struct UpdateSender {
    inner: Sender<ProcessUpdate>,
}

impl UpdateSender {
    /// 이벤트를 큐에 넣는다.
    pub async fn send(&self, update: ProcessUpdate) -> Result<(), ControllerError> {
        self.inner
            .send(update)
            .await
            .map_err(|_| ControllerError::QueueClosed)
    }

    /// 동기 스레드에서 이벤트를 큐에 넣는다. 비동기 컨텍스트에서 호출하면 패닉한다.
    pub fn blocking_send(&self, update: ProcessUpdate) -> Result<(), ControllerError> {
        self.inner
            .blocking_send(update)
            .map_err(|_| ControllerError::QueueClosed)
    }

    /// 큐가 닫혔는지 여부.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// 큐가 닫히고 비워질 때까지 이벤트를 하나씩 렌더링한다.
async fn consume_updates(
    mut updates: Receiver<ProcessUpdate>,
    mut renderer: PhaseRenderer,
    errors: Option<UnboundedSender<RenderError>>,
    shutdown: CancellationToken,
    done: CancellationToken,
) {
    let _done = done.drop_guard();
    loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                updates.close();
                while let Some(update) = updates.recv().await {
                    dispatch(&mut renderer, update, errors.as_ref());
                }
                break;
            }
            update = updates.recv() => match update {
                Some(update) => dispatch(&mut renderer, update, errors.as_ref()),
                None => break,
            },
        }
    }
    renderer.close_abandoned();
}

/// 이벤트 하나를 렌더링하고 오류가 있으면 오류 채널로 넘긴다.
fn dispatch(
    renderer: &mut PhaseRenderer,
    update: ProcessUpdate,
    errors: Option<&UnboundedSender<RenderError>>,
) {
    let action = RenderAction::from(update);
    tracing::debug!(phase = %action.phase(), ?action, "진행 이벤트를 렌더링합니다.");
    if let Err(err) = renderer.render(action) {
        tracing::debug!(error = %err, kind = ?err.kind(), "렌더링 오류를 전달합니다.");
        if let Some(sink) = errors {
            let _ = sink.send(err);
        }
    }
}
