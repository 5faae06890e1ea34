use super::{
    FAILURE_GLYPH, INFO_GLYPH, QUESTION_GLYPH, SUCCESS_GLYPH, Step, StepFactory, WAIT_GLYPH,
    WARNING_GLYPH,
};
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// 여러 Step이 함께 쓰는 출력 대상이다.
pub type SharedWriter = Arc<Mutex<dyn Write + Send>>;

/// 비대화형 환경을 위한 줄 단위 Step이다.
pub struct SimpleStep {
    /// 현재 라벨.
    msg: String,
    /// 일반 출력 대상.
    out: SharedWriter,
    /// 경고 출력 대상.
    err: SharedWriter,
}

impl SimpleStep {
    /// 지정한 출력 대상으로 Step을 만든다. 시작은 호출자가 한다.
    pub fn new(msg: impl Into<String>, out: SharedWriter, err: SharedWriter) -> Self {
        Self {
            msg: msg.into(),
            out,
            err,
        }
    }

    fn write_line(target: &SharedWriter, line: fmt::Arguments<'_>) {
        let mut guard = target.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = guard.write_fmt(line);
        let _ = guard.write_all(b"\n");
        let _ = guard.flush();
    }

    fn stop(&mut self, success: bool) {
        let glyph = if success { SUCCESS_GLYPH } else { FAILURE_GLYPH };
        Self::write_line(&self.out, format_args!("{glyph} {}", self.msg));
    }

    fn stopf(&mut self, success: bool, args: fmt::Arguments<'_>) {
        self.msg = args.to_string();
        self.stop(success);
    }
}

impl Step for SimpleStep {
    fn start(&mut self) {
        Self::write_line(&self.out, format_args!("{}", self.msg));
    }

    fn status(&mut self, msg: &str) {
        Self::write_line(&self.out, format_args!("{WAIT_GLYPH} {} : {msg}", self.msg));
    }

    fn success(&mut self) {
        self.stop(true);
    }

    fn successf(&mut self, args: fmt::Arguments<'_>) {
        self.stopf(true, args);
    }

    fn failure(&mut self) {
        self.stop(false);
    }

    fn failuref(&mut self, args: fmt::Arguments<'_>) {
        self.stopf(false, args);
    }

    fn log_info(&mut self, msg: &str) {
        Self::write_line(&self.out, format_args!("{INFO_GLYPH}  {msg}"));
    }

    fn log_error(&mut self, msg: &str) {
        Self::write_line(&self.err, format_args!("{WARNING_GLYPH}  {msg}"));
    }

    fn prompt(&mut self, msg: &str) -> io::Result<String> {
        {
            let mut guard = self.out.lock().unwrap_or_else(PoisonError::into_inner);
            write!(guard, "{QUESTION_GLYPH} {msg}")?;
            guard.flush()?;
        }
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    }
}

/// `SimpleStep`을 생성하는 팩토리이다.
#[derive(Clone)]
pub struct SimpleFactory {
    out: SharedWriter,
    err: SharedWriter,
}

impl SimpleFactory {
    /// 표준 출력/표준 오류로 쓰는 팩토리를 만든다.
    pub fn stdout() -> Self {
        Self::with_writers(
            Arc::new(Mutex::new(io::stdout())),
            Arc::new(Mutex::new(io::stderr())),
        )
    }

    /// 출력 대상을 직접 지정한다.
    pub fn with_writers(out: SharedWriter, err: SharedWriter) -> Self {
        Self { out, err }
    }
}

impl fmt::Debug for SimpleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleFactory").finish_non_exhaustive()
    }
}

impl StepFactory for SimpleFactory {
    fn new_step(&self, label: &str) -> Box<dyn Step> {
        let mut step = SimpleStep::new(label, self.out.clone(), self.err.clone());
        step.start();
        Box::new(step)
    }
}
