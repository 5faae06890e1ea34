use clap::{Parser, Subcommand};
use deploy_progress::asyncui::AsyncUi;
use deploy_progress::engine::{
    Operation, Reporter, SharedExecutor, SimulatedExecutor, run_deployment,
};
use deploy_progress::plan::load_plan_from_file;
use deploy_progress::step::Factory;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Level;

/// 배포 계획을 시뮬레이션하며 진행 상황을 터미널에 그린다.
#[derive(Debug, Parser)]
#[command(name = "deploy-progress", version)]
struct Cli {
    /// 실행 세부 내용을 로그로 출력한다. 이 모드에서는 진행 UI를 쓰지 않는다.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// 스피너와 색상 없이 줄 단위로 출력한다.
    #[arg(long, global = true)]
    non_interactive: bool,
    /// CI 환경에서 실행한다. 비대화형 모드를 포함한다.
    #[arg(long, global = true)]
    ci: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 선행 리소스와 컴포넌트를 설치한다.
    Deploy {
        /// 배포 계획 YAML 경로.
        #[arg(short, long)]
        plan: PathBuf,
    },
    /// 컴포넌트와 선행 리소스를 역순으로 제거한다.
    Uninstall {
        /// 배포 계획 YAML 경로.
        #[arg(short, long)]
        plan: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// 계획을 읽고 엔진과 진행 UI를 연결해 실행한다.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let (operation, path) = match cli.command {
        Command::Deploy { plan } => (Operation::Install, plan),
        Command::Uninstall { plan } => (Operation::Uninstall, plan),
    };
    let mut plan = load_plan_from_file(&path)?;
    if cli.non_interactive || cli.ci {
        plan.ui.non_interactive = true;
    }
    let executor: SharedExecutor = Arc::new(SimulatedExecutor);
    let cancel = CancellationToken::new();

    if cli.verbose {
        return run_deployment(&plan, operation, executor, Reporter::default(), cancel).await;
    }

    let factory = Arc::new(Factory::from_options(&plan.ui));
    tracing::debug!(interactive = factory.is_interactive(), "진행 UI 백엔드를 선택했습니다.");
    let (errors_tx, mut errors_rx) = mpsc::unbounded_channel();
    let ui = AsyncUi::from_options(factory, &plan.ui).with_errors(errors_tx);
    let updates = ui.start()?;
    let result = run_deployment(
        &plan,
        operation,
        executor,
        Reporter::new(Some(updates)),
        cancel,
    )
    .await;
    ui.stop().await;

    while let Ok(err) = errors_rx.try_recv() {
        tracing::warn!(kind = ?err.kind(), "{err}");
    }
    result?;

    match operation {
        Operation::Install => println!("'{}' successfully deployed.", plan.name),
        Operation::Uninstall => println!("'{}' successfully removed.", plan.name),
    }
    Ok(())
}
