use std::fmt;
use std::io;

mod factory;
mod simple;
mod spinner;

#[cfg(test)]
pub(crate) mod recording;

pub use factory::Factory;
pub use simple::{SharedWriter, SimpleFactory, SimpleStep};
pub use spinner::{SpinnerFactory, SpinnerStep};

pub(crate) const SUCCESS_GLYPH: &str = "✅";
pub(crate) const FAILURE_GLYPH: &str = "❌";
pub(crate) const WAIT_GLYPH: &str = "⏳";
pub(crate) const INFO_GLYPH: &str = "ℹ️";
pub(crate) const WARNING_GLYPH: &str = "⚠️";
pub(crate) const QUESTION_GLYPH: &str = "❓";

/// 화면에 표시되는 진행 단위 하나를 표현한다.
///
/// 생성한 쪽이 유일한 소유자이며, 열린 Step에는 `success` 계열 또는 `failure` 계열
/// 중 하나를 정확히 한 번 호출해야 한다.
pub trait Step: Send {
    /// 라벨을 출력하며 진행 표시를 시작한다.
    fn start(&mut self);

    /// 진행 중 상태 문구를 갱신한다.
    fn status(&mut self, msg: &str);

    /// 성공으로 종료한다.
    fn success(&mut self);

    /// 라벨을 바꾼 뒤 성공으로 종료한다.
    fn successf(&mut self, args: fmt::Arguments<'_>);

    /// 실패로 종료한다.
    fn failure(&mut self);

    /// 라벨을 바꾼 뒤 실패로 종료한다.
    fn failuref(&mut self, args: fmt::Arguments<'_>);

    /// 안내 로그를 출력한다.
    fn log_info(&mut self, msg: &str);

    /// 오류 로그를 출력한다.
    fn log_error(&mut self, msg: &str);

    /// 사용자 입력을 한 줄 받는다.
    fn prompt(&mut self, msg: &str) -> io::Result<String>;

    fn log_infof(&mut self, args: fmt::Arguments<'_>) {
        self.log_info(&args.to_string());
    }

    fn log_errorf(&mut self, args: fmt::Arguments<'_>) {
        self.log_error(&args.to_string());
    }

    /// 예/아니오 질문을 하고 `y` 또는 `yes`일 때만 `true`를 반환한다.
    fn prompt_yes_no(&mut self, msg: &str) -> bool {
        match self.prompt(&format!("{msg} Type [y/N]: ")) {
            Ok(answer) => matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(err) => {
                tracing::warn!(error = %err, "프롬프트 입력을 읽지 못했습니다.");
                false
            }
        }
    }
}

/// 렌더링 백엔드별로 Step을 생성한다.
pub trait StepFactory: Send + Sync {
    /// 라벨을 가진 새 Step을 만든다. 반환된 Step은 이미 시작된 상태이다.
    fn new_step(&self, label: &str) -> Box<dyn Step>;
}
