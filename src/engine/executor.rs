use crate::plan::ComponentSpec;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::sleep;

/// ComponentExecutor는 컴포넌트 설치/제거를 위한 추상 계층을 정의한다.
#[async_trait]
pub trait ComponentExecutor: Send + Sync {
    /// 컴포넌트를 설치한다.
    async fn install(&self, component: &ComponentSpec) -> anyhow::Result<()>;

    /// 컴포넌트를 제거한다.
    async fn uninstall(&self, component: &ComponentSpec) -> anyhow::Result<()>;
}

/// SimulatedExecutor는 실제 클러스터 없이 지정된 시간만큼 대기하는 기본 구현이다.
#[derive(Debug, Default, Clone)]
pub struct SimulatedExecutor;

impl SimulatedExecutor {
    async fn simulate(component: &ComponentSpec, action: &str) -> anyhow::Result<()> {
        tracing::debug!(component = %component.name, action, "컴포넌트 작업을 시뮬레이션합니다.");
        sleep(component.duration()).await;
        if component.fail {
            anyhow::bail!("simulated {action} failure of component '{}'", component.name);
        }
        Ok(())
    }
}

#[async_trait]
impl ComponentExecutor for SimulatedExecutor {
    async fn install(&self, component: &ComponentSpec) -> anyhow::Result<()> {
        Self::simulate(component, "install").await
    }

    async fn uninstall(&self, component: &ComponentSpec) -> anyhow::Result<()> {
        Self::simulate(component, "uninstall").await
    }
}

/// ComponentExecutor를 공유하기 위한 Arc 타입 별칭이다.
pub type SharedExecutor = Arc<dyn ComponentExecutor>;
