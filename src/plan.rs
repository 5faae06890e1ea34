use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// 진행 UI 동작 옵션이다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiOptions {
    /// 스피너 없이 줄 단위로 출력할지 여부.
    #[serde(default)]
    pub non_interactive: bool,
    /// 업데이트 큐 용량.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            non_interactive: false,
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// 시뮬레이션할 컴포넌트 하나의 정의이다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComponentSpec {
    /// 컴포넌트 이름.
    pub name: String,
    /// 처리에 걸리는 시간(밀리초).
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    /// 실패로 끝낼지 여부.
    #[serde(default)]
    pub fail: bool,
}

impl ComponentSpec {
    /// 처리 시간을 `Duration`으로 반환한다.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// 배포 계획 전체를 표현한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentPlan {
    /// 계획의 표시 이름.
    pub name: String,
    /// 컴포넌트 병렬 처리 워커 수.
    #[serde(default = "default_workers_count")]
    pub workers_count: usize,
    /// 이 시간이 지나면 진행 중인 워커를 취소한다(초 단위).
    #[serde(default = "default_cancel_timeout")]
    pub cancel_timeout_sec: u64,
    /// 이 시간이 지나면 전체 작업을 중단한다(초 단위).
    #[serde(default = "default_quit_timeout")]
    pub quit_timeout_sec: u64,
    /// 순차 처리되는 선행 컴포넌트 목록.
    #[serde(default)]
    pub prerequisites: Vec<ComponentSpec>,
    /// 병렬 처리되는 컴포넌트 목록.
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    /// 진행 UI 옵션.
    #[serde(default)]
    pub ui: UiOptions,
}

/// 배포 계획 검증 오류이다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// 중단 시간이 취소 시간보다 짧다.
    #[error("quit timeout ({quit}s) cannot be smaller than cancel timeout ({cancel}s)")]
    QuitBeforeCancel { quit: u64, cancel: u64 },
    /// 워커 수가 0이다.
    #[error("workers count must be greater than zero")]
    NoWorkers,
    /// 큐 용량이 0이다.
    #[error("update queue capacity must be greater than zero")]
    NoQueueCapacity,
    /// 컴포넌트 이름이 비어 있다.
    #[error("component name must not be empty")]
    EmptyComponentName,
    /// 컴포넌트 이름이 중복되었다.
    #[error("duplicate component name: {0}")]
    DuplicateComponent(String),
}

impl DeploymentPlan {
    /// 설정 값의 일관성을 검사한다.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.quit_timeout_sec < self.cancel_timeout_sec {
            return Err(PlanError::QuitBeforeCancel {
                quit: self.quit_timeout_sec,
                cancel: self.cancel_timeout_sec,
            });
        }
        if self.workers_count == 0 {
            return Err(PlanError::NoWorkers);
        }
        if self.ui.queue_capacity == 0 {
            return Err(PlanError::NoQueueCapacity);
        }
        let mut seen = HashSet::new();
        for spec in self.prerequisites.iter().chain(&self.components) {
            if spec.name.trim().is_empty() {
                return Err(PlanError::EmptyComponentName);
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(PlanError::DuplicateComponent(spec.name.clone()));
            }
        }
        Ok(())
    }

    /// 워커 취소 시간.
    pub fn cancel_timeout(&self) -> Duration {
        Duration::from_secs(self.cancel_timeout_sec)
    }

    /// 전체 중단 시간.
    pub fn quit_timeout(&self) -> Duration {
        Duration::from_secs(self.quit_timeout_sec)
    }
}

fn default_queue_capacity() -> usize {
    1
}

fn default_duration_ms() -> u64 {
    200
}

fn default_workers_count() -> usize {
    4
}

fn default_cancel_timeout() -> u64 {
    900
}

fn default_quit_timeout() -> u64 {
    1200
}

/// YAML 파일을 읽어 검증된 배포 계획으로 역직렬화한다.
pub fn load_plan_from_file(path: &Path) -> anyhow::Result<DeploymentPlan> {
    let mut file = File::open(path)
        .with_context(|| format!("배포 계획 파일을 열 수 없습니다: {}", path.display()))?;
    load_plan_from_reader(&mut file)
        .with_context(|| format!("배포 계획을 읽을 수 없습니다: {}", path.display()))
}

/// Reader에서 YAML을 읽어 배포 계획으로 파싱하고 검증한다.
pub fn load_plan_from_reader<R: Read>(reader: &mut R) -> anyhow::Result<DeploymentPlan> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    let plan: DeploymentPlan = serde_yaml::from_str(&buf)?;
    plan.validate()?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"
name: local
workers_count: 2
prerequisites:
  - name: cluster-essentials
    duration_ms: 10
components:
  - name: core
  - name: istio
    fail: true
ui:
  non_interactive: true
"#;

    #[test]
    fn parses_plan_with_defaults() {
        let plan = load_plan_from_reader(&mut PLAN.as_bytes()).expect("계획 파싱 실패");
        assert_eq!(plan.name, "local");
        assert_eq!(plan.workers_count, 2);
        assert_eq!(plan.cancel_timeout(), Duration::from_secs(900));
        assert_eq!(plan.quit_timeout(), Duration::from_secs(1200));
        assert_eq!(plan.prerequisites[0].duration(), Duration::from_millis(10));
        assert_eq!(plan.components[0].duration_ms, 200);
        assert!(plan.components[1].fail);
        assert!(plan.ui.non_interactive);
        assert_eq!(plan.ui.queue_capacity, 1);
    }

    #[test]
    fn rejects_quit_timeout_smaller_than_cancel_timeout() {
        let yaml = "name: x\ncancel_timeout_sec: 10\nquit_timeout_sec: 5\n";
        let err = load_plan_from_reader(&mut yaml.as_bytes()).expect_err("검증 누락");
        assert_eq!(
            err.downcast_ref::<PlanError>(),
            Some(&PlanError::QuitBeforeCancel { quit: 5, cancel: 10 })
        );
    }

    #[test]
    fn rejects_duplicate_and_empty_names() {
        let yaml = "name: x\nprerequisites: [{name: core}]\ncomponents: [{name: core}]\n";
        let err = load_plan_from_reader(&mut yaml.as_bytes()).expect_err("검증 누락");
        assert_eq!(
            err.downcast_ref::<PlanError>(),
            Some(&PlanError::DuplicateComponent("core".into()))
        );

        let yaml = "name: x\ncomponents: [{name: ' '}]\n";
        let err = load_plan_from_reader(&mut yaml.as_bytes()).expect_err("검증 누락");
        assert_eq!(
            err.downcast_ref::<PlanError>(),
            Some(&PlanError::EmptyComponentName)
        );
    }

    #[test]
    fn rejects_zero_workers_and_capacity() {
        let yaml = "name: x\nworkers_count: 0\n";
        let err = load_plan_from_reader(&mut yaml.as_bytes()).expect_err("검증 누락");
        assert_eq!(err.downcast_ref::<PlanError>(), Some(&PlanError::NoWorkers));

        let yaml = "name: x\nui: {queue_capacity: 0}\n";
        let err = load_plan_from_reader(&mut yaml.as_bytes()).expect_err("검증 누락");
        assert_eq!(err.downcast_ref::<PlanError>(), Some(&PlanError::NoQueueCapacity));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_plan_from_file(Path::new("/nonexistent/plan.yaml")).expect_err("열림");
        assert!(err.to_string().contains("/nonexistent/plan.yaml"));
    }
}
