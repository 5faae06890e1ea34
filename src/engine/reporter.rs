use crate::asyncui::UpdateSender;
use crate::deployment::ProcessUpdate;
use anyhow::Context;

/// 엔진 진행 상황을 업데이트 큐 또는 로그로 내보낸다.
///
/// 큐가 없으면(상세 출력 모드) 이벤트를 `tracing`으로 기록한다.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    updates: Option<UpdateSender>,
}

impl Reporter {
    pub fn new(updates: Option<UpdateSender>) -> Self {
        Self { updates }
    }

    /// 이벤트 하나를 보낸다. 큐가 닫혔으면 오류를 반환한다.
    pub async fn emit(&self, update: ProcessUpdate) -> anyhow::Result<()> {
        match &self.updates {
            Some(updates) => updates
                .send(update)
                .await
                .context("진행 이벤트를 보낼 수 없습니다."),
            None => {
                match &update.component {
                    Some(component) => tracing::info!(
                        phase = %update.phase,
                        event = %update.event,
                        component = %component.name,
                        status = ?component.status,
                        "컴포넌트 처리 결과"
                    ),
                    None => tracing::info!(
                        phase = %update.phase,
                        event = %update.event,
                        "단계 진행 상황"
                    ),
                }
                Ok(())
            }
        }
    }
}
