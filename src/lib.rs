//! 배포 엔진의 진행 이벤트를 받아 터미널 Step으로 그리는 비동기 진행 컨트롤러.

pub mod asyncui;
pub mod deployment;
pub mod engine;
pub mod plan;
pub mod step;
