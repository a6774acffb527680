mod cli;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use sessionpad_core::{
    emit_commands, plan_run, run_with_progress, Config, MatchCase, ProgressEvent, RetryPolicy,
    Sox,
};

use crate::cli::build_cli;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = build_cli().get_matches();

    let path = |id: &str| {
        matches
            .get_one::<PathBuf>(id)
            .cloned()
            .expect("required or defaulted argument")
    };
    let session = path("session");
    let audio_dir = path("audio_dir");
    let output_dir = path("output_dir");
    let extractor = path("exe");
    let padder = path("sox");

    let match_case = if matches.get_flag("ignore-case") {
        MatchCase::Insensitive
    } else {
        MatchCase::Sensitive
    };
    let retry = RetryPolicy {
        retries: *matches.get_one::<u32>("retries").expect("defaulted argument"),
        delay: *matches
            .get_one::<Duration>("retry-delay")
            .expect("defaulted argument"),
    };
    let dry_run = matches.get_flag("dry-run");

    let config = Config::builder(&session, &audio_dir, &output_dir)
        .extractor(extractor)
        .padder(padder)
        .track_filter(matches.get_one::<u32>("track").copied())
        .check(matches.get_flag("check"))
        .match_case(match_case)
        .append(matches.get_flag("add"))
        .retry(retry)
        .build()
        .with_context(|| format!("failed to configure run for '{}'", session.display()))?;

    let sox = Sox::locate(&config.padder).context("sox must be installed or passed with --sox")?;

    if dry_run {
        let operations = plan_run(&config)
            .with_context(|| format!("failed to plan padding for '{}'", session.display()))?;
        emit_commands(&operations, &sox, io::stdout().lock())
            .context("failed to write commands")?;
        return Ok(());
    }

    let progress = ProgressBar::new(0);
    progress.set_draw_target(ProgressDrawTarget::stderr());
    let bar_style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(bar_style);

    let progress_handle = progress.clone();
    let mut report = move |event: ProgressEvent| match event {
        ProgressEvent::Start { total } => {
            progress_handle.set_length(total as u64);
            progress_handle.set_message("padding");
        }
        ProgressEvent::Advance { completed, .. } => {
            progress_handle.set_position(completed as u64);
        }
        ProgressEvent::Finish => {
            progress_handle.set_message("completed");
        }
    };

    let result = run_with_progress(&config, &sox, &mut report)
        .with_context(|| format!("failed to pad files into '{}'", output_dir.display()));

    progress.finish_and_clear();

    let written = result?;
    info!("wrote {written} padded files to '{}'", output_dir.display());

    Ok(())
}
