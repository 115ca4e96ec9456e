use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::runtime::Runtime;

use report_core::{FormData, ReportViewModel, Severity};
use report_engine::{Controller, ReportClient, ReqwestReportClient};
use report_logging::{report_info, report_warn};

use crate::config::AppConfig;
use crate::form::{missing_known_fields, parse_form};
use crate::logging;
use crate::presenter::FilePresenter;
use crate::render::render;

const USAGE: &str = "usage: report_app key=value [key=value ...]\n       report_app health";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Health,
    Submit(FormData),
}

pub fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    match args {
        [] => bail!(USAGE),
        [only] if only == "health" => Ok(Command::Health),
        fields => Ok(Command::Submit(
            parse_form(fields).with_context(|| USAGE.to_string())?,
        )),
    }
}

pub fn run(args: Vec<String>) -> anyhow::Result<ExitCode> {
    let command = parse_command(&args)?;
    let config = AppConfig::load()?;
    logging::initialize(config.log, config.level()?);
    report_info!("report_app starting against {}", config.server_url);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building async runtime")?;
    let client = ReqwestReportClient::new(config.client_settings())
        .with_context(|| format!("creating client for {}", config.server_url))?;

    match command {
        Command::Health => runtime.block_on(health(&client)),
        Command::Submit(form) => submit(&runtime, &config, Arc::new(client), form),
    }
}

async fn health(client: &dyn ReportClient) -> anyhow::Result<ExitCode> {
    let health = client.health().await.context("checking server health")?;
    println!("status: {}", health.status);
    println!("service: {}", health.service);
    Ok(if health.status == "healthy" {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn submit(
    runtime: &Runtime,
    config: &AppConfig,
    client: Arc<dyn ReportClient>,
    form: FormData,
) -> anyhow::Result<ExitCode> {
    for field in missing_known_fields(&form) {
        report_warn!("form has no `{}` field; the server may reject it", field);
    }

    // Effects spawn onto the runtime; they only make progress inside block_on.
    let _guard = runtime.enter();
    let presenter = FilePresenter::new(config.output_dir.clone(), config.opener.clone());
    let mut controller = Controller::new(client, presenter, config.controller_config());

    if let Some(view) = controller.submit(form) {
        print_view(&view);
    }
    let mut view = runtime.block_on(controller.settle_with(print_view));

    let stdin = io::stdin();
    let mut input = stdin.lock();
    while view.retry_visible {
        if !prompt_retry(&mut input, &mut io::stdout())? {
            break;
        }
        if let Some(changed) = controller.retry() {
            print_view(&changed);
        }
        view = runtime.block_on(controller.settle_with(print_view));
    }

    let presenter = controller.presenter();
    if !presenter.written().is_empty() {
        println!("Reports are in {}", presenter.output_dir().display());
    }
    Ok(exit_code(&view))
}

fn print_view(view: &ReportViewModel) {
    for line in render(view) {
        println!("{line}");
    }
}

/// Enter retries, `q` or end of input quits.
fn prompt_retry(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<bool> {
    write!(output, "Press Enter to retry, or q to quit: ")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(false);
    }
    Ok(!line.trim().eq_ignore_ascii_case("q"))
}

fn exit_code(view: &ReportViewModel) -> ExitCode {
    match view.severity {
        Severity::Info | Severity::Success => ExitCode::SUCCESS,
        Severity::Warning | Severity::Error => ExitCode::FAILURE,
    }
}
