use super::{
    FAILURE_GLYPH, INFO_GLYPH, QUESTION_GLYPH, SUCCESS_GLYPH, Step, StepFactory, WARNING_GLYPH,
};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

/// 스피너 갱신 주기 (10 Hz).
const TICK_INTERVAL_MS: u64 = 100;

const SPINNER_TEMPLATE: &str = "{spinner:.bold.cyan} {msg}";
const SPINNER_TEMPLATE_NO_COLOR: &str = "{spinner} {msg}";
const FINISHED_TEMPLATE: &str = "{msg}";

/// `indicatif` 스피너로 그려지는 대화형 Step이다.
#[derive(Debug)]
pub struct SpinnerStep {
    /// 현재 라벨.
    msg: String,
    /// 스피너 막대.
    bar: ProgressBar,
    /// 종료 여부. 종료된 스피너는 다시 그리지 않는다.
    finished: bool,
}

impl SpinnerStep {
    fn stop(&mut self, success: bool) {
        if self.finished {
            return;
        }
        let glyph = if success { SUCCESS_GLYPH } else { FAILURE_GLYPH };
        if let Ok(style) = ProgressStyle::with_template(FINISHED_TEMPLATE) {
            self.bar.set_style(style);
        }
        self.bar.finish_with_message(format!("{glyph} {}", self.msg));
        self.finished = true;
    }

    fn stopf(&mut self, success: bool, args: fmt::Arguments<'_>) {
        self.msg = args.to_string();
        self.stop(success);
    }
}

impl Step for SpinnerStep {
    fn start(&mut self) {
        self.bar.set_message(self.msg.clone());
        self.bar.enable_steady_tick(Duration::from_millis(TICK_INTERVAL_MS));
    }

    fn status(&mut self, msg: &str) {
        self.bar.set_message(format!("{} : {msg}", self.msg));
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
        self.bar.println(format!("{INFO_GLYPH}  {msg}"));
    }

    fn log_error(&mut self, msg: &str) {
        self.bar.suspend(|| eprintln!("{WARNING_GLYPH}  {msg}"));
    }

    fn prompt(&mut self, msg: &str) -> io::Result<String> {
        self.bar.suspend(|| -> io::Result<String> {
            let mut stdout = io::stdout();
            write!(stdout, "{QUESTION_GLYPH} {msg}")?;
            stdout.flush()?;
            let mut answer = String::new();
            io::stdin().read_line(&mut answer)?;
            Ok(answer.trim().to_string())
        })
    }
}

impl Drop for SpinnerStep {
    /// 종료되지 않은 채 버려진 스피너는 화면에서 지운다.
    fn drop(&mut self) {
        if !self.finished {
            self.bar.finish_and_clear();
        }
    }
}

/// 하나의 `MultiProgress` 아래에 스피너 Step을 쌓는 팩토리이다.
#[derive(Debug, Clone)]
pub struct SpinnerFactory {
    multi: MultiProgress,
    use_colors: bool,
}

impl SpinnerFactory {
    /// 표준 오류에 그리는 팩토리를 만든다.
    pub fn new(use_colors: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            use_colors,
        }
    }

    fn spinner_style(&self) -> ProgressStyle {
        let template = if self.use_colors {
            SPINNER_TEMPLATE
        } else {
            SPINNER_TEMPLATE_NO_COLOR
        };
        ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl StepFactory for SpinnerFactory {
    fn new_step(&self, label: &str) -> Box<dyn Step> {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(self.spinner_style());
        let mut step = SpinnerStep {
            msg: label.to_string(),
            bar,
            finished: false,
        };
        step.start();
        Box::new(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    fn hidden_step(label: &str) -> SpinnerStep {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        SpinnerStep {
            msg: label.to_string(),
            bar,
            finished: false,
        }
    }

    #[test]
    fn finishing_renders_the_glyph_and_label() {
        let mut step = hidden_step("Deploying components");
        step.start();
        step.success();
        assert!(step.bar.is_finished());
        assert_eq!(
            step.bar.message(),
            format!("{SUCCESS_GLYPH} Deploying components")
        );
    }

    #[test]
    fn second_stop_is_ignored() {
        let mut step = hidden_step("Deploying component 'core'");
        step.failuref(format_args!("Component '{}' failed", "core"));
        step.success();
        assert_eq!(step.bar.message(), format!("{FAILURE_GLYPH} Component 'core' failed"));
    }
}
