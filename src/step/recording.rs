use super::{Step, StepFactory};
use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::sync::{Arc, Mutex};

/// 테스트에서 관찰하는 Step 호출 기록이다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StepCall {
    /// Step 생성.
    Created(String),
    /// 성공 종료.
    Success(String),
    /// 실패 종료.
    Failure(String),
}

impl StepCall {
    /// 종료 호출인지 여부.
    pub(crate) fn is_terminal(&self) -> bool {
        !matches!(self, StepCall::Created(_))
    }
}

/// 모든 Step 호출을 순서대로 누적하는 목업 팩토리이다.
#[derive(Clone, Default)]
pub(crate) struct RecordingFactory {
    calls: Arc<Mutex<Vec<StepCall>>>,
    answers: Arc<Mutex<VecDeque<String>>>,
}

impl RecordingFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `prompt`가 차례로 돌려줄 응답을 지정한다.
    pub(crate) fn with_answers<const N: usize>(answers: [&str; N]) -> Self {
        let factory = Self::new();
        factory
            .answers
            .lock()
            .expect("응답 큐 잠금 실패")
            .extend(answers.iter().map(|a| a.to_string()));
        factory
    }

    /// 지금까지 기록된 호출 목록.
    pub(crate) fn calls(&self) -> Vec<StepCall> {
        self.calls.lock().expect("호출 기록 잠금 실패").clone()
    }

    /// 생성된 Step 라벨 목록.
    pub(crate) fn created(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StepCall::Created(label) => Some(label),
                _ => None,
            })
            .collect()
    }

    /// 종료 호출만 추린 목록.
    pub(crate) fn terminals(&self) -> Vec<StepCall> {
        self.calls()
            .into_iter()
            .filter(StepCall::is_terminal)
            .collect()
    }
}

impl StepFactory for RecordingFactory {
    fn new_step(&self, label: &str) -> Box<dyn Step> {
        self.calls
            .lock()
            .expect("호출 기록 잠금 실패")
            .push(StepCall::Created(label.to_string()));
        Box::new(RecordingStep {
            label: label.to_string(),
            calls: self.calls.clone(),
            answers: self.answers.clone(),
        })
    }
}

struct RecordingStep {
    label: String,
    calls: Arc<Mutex<Vec<StepCall>>>,
    answers: Arc<Mutex<VecDeque<String>>>,
}

impl RecordingStep {
    fn record(&self, call: StepCall) {
        self.calls.lock().expect("호출 기록 잠금 실패").push(call);
    }
}

impl Step for RecordingStep {
    fn start(&mut self) {}

    fn status(&mut self, _msg: &str) {}

    fn success(&mut self) {
        self.record(StepCall::Success(self.label.clone()));
    }

    fn successf(&mut self, args: fmt::Arguments<'_>) {
        self.label = args.to_string();
        self.success();
    }

    fn failure(&mut self) {
        self.record(StepCall::Failure(self.label.clone()));
    }

    fn failuref(&mut self, args: fmt::Arguments<'_>) {
        self.label = args.to_string();
        self.failure();
    }

    fn log_info(&mut self, _msg: &str) {}

    fn log_error(&mut self, _msg: &str) {}

    fn prompt(&mut self, _msg: &str) -> io::Result<String> {
        self.answers
            .lock()
            .expect("응답 큐 잠금 실패")
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "응답 없음"))
    }
}
