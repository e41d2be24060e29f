//! `inliner`: command-line front end for the content pipeline.
//!
//! Extractions run on the engine's background runtime; this binary only wires
//! configuration, logging and stdin/stdout around it.

mod cli;
mod config;
mod logging;

use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::Parser;
use inliner_core::{classify, Article, FilterAction};
use inliner_engine::{EngineEvent, EngineHandle, JobId, Pipeline};
use inliner_logging::{inliner_debug, inliner_error, inliner_warn};

use cli::{Cli, Command};
use config::AppConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            inliner_error!("{:#}", err);
            eprintln!("inliner: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Classify { urls } => {
            for url in urls {
                println!("{}\t{}", classify(&url), url);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Embed { urls } => {
            let engine = start_engine(&config);
            for (job_id, url) in urls.iter().enumerate() {
                engine.enqueue_embed(job_id as JobId, url.as_str());
            }
            for response in collect(&engine, urls.len(), |event| match event {
                EngineEvent::Embedded {
                    job_id, response, ..
                } => Some((job_id, response)),
                _ => None,
            }) {
                let response = response.unwrap_or_default();
                println!("{}", serde_json::to_string(&response)?);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::FullText { url } => {
            if !config.enable_share_anything {
                inliner_warn!("full text sharing is disabled in the configuration");
            }
            let engine = start_engine(&config);
            engine.enqueue_full_text(0, url, config.enable_share_anything);
            let content = collect(&engine, 1, |event| match event {
                EngineEvent::FullText {
                    job_id, content, ..
                } => Some((job_id, content)),
                _ => None,
            })
            .pop()
            .flatten()
            .flatten();
            match content {
                Some(content) => {
                    println!("{content}");
                    Ok(ExitCode::SUCCESS)
                }
                None => Ok(ExitCode::FAILURE),
            }
        }
        Command::Filter { feed } => {
            let flags = config.feed_flags(feed);
            if !flags.enabled {
                inliner_debug!("feed {} is not enabled; article passes through", feed);
            }
            let article = read_article()?;
            let engine = start_engine(&config);
            engine.enqueue_filter(0, article.clone(), flags);
            print_article(filtered(&engine).unwrap_or(article))
        }
        Command::Action { name } => {
            let action = FilterAction::from_name(&name)
                .ok_or_else(|| anyhow!("unknown filter action {name:?}"))?;
            let article = read_article()?;
            let engine = start_engine(&config);
            engine.enqueue_action(0, article.clone(), action);
            print_article(filtered(&engine).unwrap_or(article))
        }
    }
}

fn start_engine(config: &AppConfig) -> EngineHandle {
    EngineHandle::new(Pipeline::new(config.pipeline.clone()))
}

fn read_article() -> anyhow::Result<Article> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("reading article from stdin")?;
    serde_json::from_str(&input).context("parsing article JSON")
}

fn print_article(article: Article) -> anyhow::Result<ExitCode> {
    println!("{}", serde_json::to_string(&article)?);
    Ok(ExitCode::SUCCESS)
}

fn filtered(engine: &EngineHandle) -> Option<Article> {
    collect(engine, 1, |event| match event {
        EngineEvent::ArticleFiltered { job_id, article } => Some((job_id, article)),
        _ => None,
    })
    .pop()
    .flatten()
}

/// Waits for `count` results numbered `0..count`; they come back in job order.
fn collect<T, F>(engine: &EngineHandle, count: usize, mut pick: F) -> Vec<Option<T>>
where
    F: FnMut(EngineEvent) -> Option<(JobId, T)>,
{
    let mut results: Vec<Option<T>> = std::iter::repeat_with(|| None).take(count).collect();
    let mut pending = count;
    while pending > 0 {
        let Some(event) = engine.recv() else {
            inliner_error!("extraction engine stopped with {} jobs pending", pending);
            break;
        };
        if let EngineEvent::Started { job_id, source } = &event {
            inliner_debug!("job {} started ({})", job_id, source);
            continue;
        }
        match pick(event) {
            Some((job_id, value)) => {
                if let Some(slot) = results.get_mut(job_id as usize) {
                    *slot = Some(value);
                }
                pending -= 1;
            }
            None => inliner_warn!("ignoring unexpected engine event"),
        }
    }
    results
}
