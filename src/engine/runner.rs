use super::executor::SharedExecutor;
use super::reporter::Reporter;
use crate::deployment::{ComponentStatus, InstallationPhase, ProcessUpdate};
use crate::plan::{ComponentSpec, DeploymentPlan};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::time::{Instant, timeout, timeout_at};
use tokio_util::sync::CancellationToken;

/// 배포 엔진이 수행할 작업 방향이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// 선행 리소스 → 컴포넌트 순으로 설치한다.
    Install,
    /// 컴포넌트 → 선행 리소스 순으로 역순 제거한다.
    Uninstall,
}

/// 단계 하나의 실행 설정이다.
struct PhaseRun {
    phase: InstallationPhase,
    components: Vec<ComponentSpec>,
    parallelism: usize,
}

/// 배포 계획 전체를 실행하고 진행 이벤트를 송신한다.
///
/// `quit_timeout`이 지나면 진행 중인 작업을 버리고 오류를 반환한다.
pub async fn run_deployment(
    plan: &DeploymentPlan,
    operation: Operation,
    executor: SharedExecutor,
    reporter: Reporter,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let deadline = Instant::now() + plan.cancel_timeout();
    let phases = plan_phases(plan, operation);
    let run = async {
        for phase in phases {
            if cancel.is_cancelled() {
                anyhow::bail!("deployment was cancelled before phase {}", phase.phase);
            }
            run_phase(phase, &executor, &reporter, deadline, &cancel).await?;
        }
        Ok::<(), anyhow::Error>(())
    };
    match timeout(plan.quit_timeout(), run).await {
        Ok(result) => result,
        Err(_) => {
            cancel.cancel();
            anyhow::bail!(
                "deployment aborted after quit timeout of {}s",
                plan.quit_timeout_sec
            )
        }
    }
}

/// 작업 방향에 맞춰 단계 순서와 병렬도를 정한다.
fn plan_phases(plan: &DeploymentPlan, operation: Operation) -> Vec<PhaseRun> {
    match operation {
        Operation::Install => vec![
            PhaseRun {
                phase: InstallationPhase::InstallPreRequisites,
                components: plan.prerequisites.clone(),
                parallelism: 1,
            },
            PhaseRun {
                phase: InstallationPhase::InstallComponents,
                components: plan.components.clone(),
                parallelism: plan.workers_count,
            },
        ],
        Operation::Uninstall => vec![
            PhaseRun {
                phase: InstallationPhase::UninstallComponents,
                components: plan.components.iter().rev().cloned().collect(),
                parallelism: plan.workers_count,
            },
            PhaseRun {
                phase: InstallationPhase::UninstallPreRequisites,
                components: plan.prerequisites.iter().rev().cloned().collect(),
                parallelism: 1,
            },
        ],
    }
}

/// 단계 하나를 실행한다. 컴포넌트 결과는 각 워커가 직접 송신한다.
async fn run_phase(
    run: PhaseRun,
    executor: &SharedExecutor,
    reporter: &Reporter,
    deadline: Instant,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let PhaseRun {
        phase,
        components,
        parallelism,
    } = run;
    let total = components.len();
    reporter.emit(ProcessUpdate::start(phase)).await?;

    type WorkerHandle = tokio::task::JoinHandle<anyhow::Result<bool>>;
    let mut pending = components.into_iter();
    let mut running: FuturesUnordered<WorkerHandle> = FuturesUnordered::new();
    let mut failed = 0usize;
    loop {
        while running.len() < parallelism.max(1) {
            let Some(spec) = pending.next() else {
                break;
            };
            running.push(tokio::spawn(run_component(
                spec,
                phase,
                executor.clone(),
                reporter.clone(),
                deadline,
                cancel.clone(),
            )));
        }
        let Some(joined) = running.next().await else {
            break;
        };
        let succeeded = match joined {
            Ok(Ok(succeeded)) => succeeded,
            Ok(Err(err)) => {
                // 남은 워커가 분리된 채 계속 돌지 않도록 함께 멈춘다.
                cancel.cancel();
                return Err(err);
            }
            Err(err) => {
                tracing::warn!(%phase, error = %err, "컴포넌트 워커가 비정상 종료되었습니다.");
                false
            }
        };
        if !succeeded {
            failed += 1;
        }
    }

    if failed == 0 {
        reporter.emit(ProcessUpdate::finished(phase)).await?;
        return Ok(());
    }
    reporter.emit(ProcessUpdate::failed(phase)).await?;
    anyhow::bail!("deployment phase {phase} failed: {failed} of {total} components failed")
}

/// 컴포넌트 하나를 처리하고 결과 이벤트를 송신한다.
///
/// 송신 실패만 오류로 반환하며, 처리 결과는 `bool`로 돌려준다.
async fn run_component(
    spec: ComponentSpec,
    phase: InstallationPhase,
    executor: SharedExecutor,
    reporter: Reporter,
    deadline: Instant,
    cancel: CancellationToken,
) -> anyhow::Result<bool> {
    let work = async {
        if phase.is_uninstall() {
            executor.uninstall(&spec).await
        } else {
            executor.install(&spec).await
        }
    };
    let result = tokio::select! {
        () = cancel.cancelled() => {
            Err(anyhow::anyhow!("component '{}' was cancelled", spec.name))
        },
        outcome = timeout_at(deadline, work) => outcome.unwrap_or_else(|_| {
            Err(anyhow::anyhow!(
                "component '{}' was cancelled after the cancel timeout",
                spec.name
            ))
        }),
    };
    let status = match &result {
        Ok(()) => ComponentStatus::Ok,
        Err(err) => {
            tracing::warn!(%phase, component = %spec.name, error = %err, "컴포넌트 처리 실패");
            ComponentStatus::Error
        }
    };
    reporter
        .emit(ProcessUpdate::component(phase, spec.name.clone(), status))
        .await?;
    Ok(result.is_ok())
}
