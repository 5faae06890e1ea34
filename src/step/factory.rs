use super::{SimpleFactory, SpinnerFactory, Step, StepFactory};
use crate::plan::UiOptions;
use std::io::IsTerminal;

/// 실행 환경에 맞는 렌더링 백엔드를 골라 Step을 만든다.
///
/// 비대화형 모드이거나 표준 오류가 터미널이 아니면 줄 단위 출력을 사용한다.
#[derive(Debug, Clone)]
pub enum Factory {
    /// 스피너 기반 대화형 출력.
    Interactive(SpinnerFactory),
    /// 줄 단위 출력.
    NonInteractive(SimpleFactory),
}

impl Factory {
    /// UI 옵션과 터미널 여부로 백엔드를 결정한다.
    pub fn from_options(options: &UiOptions) -> Self {
        let is_terminal = std::io::stderr().is_terminal();
        Self::select(options.non_interactive, is_terminal)
    }

    fn select(non_interactive: bool, is_terminal: bool) -> Self {
        if non_interactive || !is_terminal {
            tracing::debug!("줄 단위 Step 출력을 사용합니다.");
            Factory::NonInteractive(SimpleFactory::stdout())
        } else {
            Factory::Interactive(SpinnerFactory::new(true))
        }
    }

    /// 대화형 백엔드인지 여부.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Factory::Interactive(_))
    }
}

impl StepFactory for Factory {
    fn new_step(&self, label: &str) -> Box<dyn Step> {
        match self {
            Factory::Interactive(factory) => factory.new_step(label),
            Factory::NonInteractive(factory) => factory.new_step(label),
        }
    }
}
