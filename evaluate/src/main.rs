use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use database::storage::Context;
use evaluate::cache::{CachedScorer, MemoryReportCache, ReportCache};
use evaluate::compatibility::match_stack;
use evaluate::config::EvaluationContext;
use evaluate::scorer::{CredentialedTreeSource, EvaluationRequest, QualityScorer};
use futures::stream::{self, StreamExt};
use github_handler::GitHubClient;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "evaluate", version, about = "Repository quality scoring")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score one or more `owner/repo` repositories and print the reports as JSON
    Score {
        #[arg(required = true)]
        repos: Vec<String>,
        /// GitHub token, tried after the configured ones; may be repeated
        #[arg(long = "token", env = "GITHUB_TOKEN")]
        tokens: Vec<String>,
        #[arg(long, default_value = "evaluate/config")]
        config: String,
        /// Ignore the configured database cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Compare a skill set against a target stack
    Match {
        #[arg(long, value_delimiter = ',')]
        have: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        target: Vec<String>,
    },
}

fn init_logger() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_target(false),
        )
        .init();
}

fn split_full_name(full_name: &str) -> Option<(&str, &str)> {
    let (owner, repo) = full_name.split_once('/')?;
    (!owner.is_empty() && !repo.is_empty() && !repo.contains('/')).then_some((owner, repo))
}

/// 拉取 README、元数据和提交记录, 失败的仓库会被跳过
async fn collect_requests(
    client: &GitHubClient,
    ctx: &EvaluationContext,
    repos: &[String],
) -> Vec<EvaluationRequest> {
    let credentials = &ctx.github.tokens;
    stream::iter(repos.iter().filter_map(|full_name| {
        let parsed = split_full_name(full_name);
        if parsed.is_none() {
            error!("Invalid repository name {}, expected owner/repo", full_name);
        }
        parsed
    }))
    .map(|(owner, repo)| async move {
        match client
            .fetch_signals(owner, repo, credentials, ctx.github.commit_limit)
            .await
        {
            Ok(signals) => Some(EvaluationRequest::from_signals(
                owner,
                repo,
                signals,
                credentials.first().cloned(),
            )),
            Err(err) => {
                error!("Failed to fetch {}/{}: {}", owner, repo, err);
                None
            }
        }
    })
    .buffer_unordered(ctx.concurrency.max(1))
    .filter_map(|request| async move { request })
    .collect()
    .await
}

async fn score_with<C: ReportCache>(
    cache: C,
    source: CredentialedTreeSource,
    ctx: Arc<EvaluationContext>,
    requests: Vec<EvaluationRequest>,
) -> Result<()> {
    let concurrency = ctx.concurrency;
    let ttl = ctx.cache.ttl();
    let scorer = CachedScorer::new(cache, QualityScorer::new(source, ctx), ttl);

    let mut results = scorer.evaluate_many(requests, concurrency).await;
    results.sort_by(|left, right| left.0.cmp(&right.0));
    for (full_name, report) in results {
        let line = serde_json::json!({ "repository": full_name, "report": report });
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}

async fn run_score(repos: Vec<String>, tokens: Vec<String>, config: &str, no_cache: bool) -> Result<()> {
    // 加载配置
    let mut ctx = EvaluationContext::load_config(config)?;
    ctx.github.tokens.extend(tokens);

    let client = GitHubClient::new(&ctx.github.client_config())
        .context("Failed to build GitHub client")?;
    let requests = collect_requests(&client, &ctx, &repos).await;
    info!("Scoring {} of {} repositories", requests.len(), repos.len());

    // 目录树请求与其他请求使用同一组凭据回退
    let source = CredentialedTreeSource::new(client, ctx.github.tokens.clone());
    let database_url = ctx.cache.database_url.clone().filter(|_| !no_cache);
    let ctx = Arc::new(ctx);
    match database_url {
        Some(url) => {
            // 初始化数据库连接
            let db_ctx = Context::new(&url)
                .await
                .context("Failed to connect to the cache database")?;
            let cache = db_ctx.quality_cache_stg();
            cache.ensure_schema().await?;
            score_with(cache, source, ctx, requests).await
        }
        None => score_with(MemoryReportCache::new(), source, ctx, requests).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志记录器
    init_logger();

    match Cli::parse().command {
        Command::Score {
            repos,
            tokens,
            config,
            no_cache,
        } => run_score(repos, tokens, &config, no_cache).await,
        Command::Match { have, target } => {
            let report = match_stack(&have, &target);
            println!("{}", serde_json::to_string(&report)?);
            Ok(())
        }
    }
}
