//! Run command - discover new articles and announce them

use anyhow::{Context, Result, bail};
use autotweet_adapters::{
    codec::ImageRsCodec,
    content::{HttpImageFetcher, LocalArticleReader},
    dedup::HttpDedupStore,
    source::GitEventSource,
    vision::{GeminiDescriber, StubDescriber, VisionConfig},
    x::{StubPublisher, XPublisher},
};
use autotweet_domain::{
    ArticleCandidate, DedupStore, ProcessResult, Publisher, SystemClock, TokioPacer,
    VisionDescriber,
    usecases::{AltTextGenerator, Pipeline, PipelineDeps},
};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::args::RunArgs;
use crate::commands::{env_value, load_api_key};
use crate::config::AppConfig;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let pipeline_config = config.pipeline_config(args.dry_run);
    pipeline_config
        .validate()
        .context("Invalid pipeline limits")?;

    tracing::info!(
        dry_run = pipeline_config.dry_run,
        content_root = %config.general.content_root.display(),
        explicit_articles = args.articles.len(),
        "Starting autotweet run"
    );

    let root = config.general.content_root.clone();
    let source = Arc::new(GitEventSource::new(
        env_value(&config.trigger.event_path_env).map(PathBuf::from),
        config.trigger.action.clone(),
        root.clone(),
        config.general.articles_dir.clone(),
        config.trigger.empty_tree_sha.clone(),
    ));

    let fetcher = HttpImageFetcher::new(root.clone(), config.http_timeout())
        .context("Failed to initialize image fetcher")?;

    let deps = PipelineDeps {
        source,
        dedup: build_dedup_store(&config)?,
        reader: Arc::new(LocalArticleReader::new(root)),
        fetcher: Arc::new(fetcher),
        alt_text: AltTextGenerator::new(
            build_describer(&config)?,
            pipeline_config.alt_text.clone(),
        ),
        publisher: build_publisher(&config, pipeline_config.dry_run)?,
        pacer: Arc::new(TokioPacer),
        clock: Arc::new(SystemClock),
    };

    let pipeline = Pipeline::new(deps, ImageRsCodec, pipeline_config);

    let results = if args.articles.is_empty() {
        pipeline.run_once().await
    } else {
        let candidates = args
            .articles
            .iter()
            .map(|path| ArticleCandidate::new(path.as_str()))
            .collect();
        pipeline.run_candidates(candidates).await
    };

    log_summary(&results);
    Ok(())
}

fn build_dedup_store(config: &AppConfig) -> Result<Option<Arc<dyn DedupStore>>> {
    let store = HttpDedupStore::from_settings(
        env_value(&config.memory.base_url_env),
        env_value(&config.memory.token_env).map(|token| SecretString::new(token.into())),
        config.memory.token_header.clone(),
        config.http_timeout(),
    )
    .context("Failed to initialize memory store")?;

    Ok(store.map(|store| Arc::new(store) as Arc<dyn DedupStore>))
}

fn build_describer(config: &AppConfig) -> Result<Option<Arc<dyn VisionDescriber>>> {
    match config.vision.provider.as_str() {
        "gemini" => {
            let api_key = match load_api_key(&config.vision.api_key_env, "gemini") {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!(error = %e, "Vision disabled, using fallback alt text");
                    return Ok(None);
                }
            };
            let vision_config = VisionConfig {
                model: config.vision.model.clone(),
                max_output_tokens: config.vision.max_output_tokens,
                timeout_secs: config.vision.timeout_secs,
            };
            let describer = GeminiDescriber::new(api_key, vision_config)
                .context("Failed to initialize Gemini describer")?;
            Ok(Some(Arc::new(describer)))
        }
        "stub" => Ok(Some(Arc::new(StubDescriber::default()))),
        "none" => Ok(None),
        other => bail!("Unknown vision provider: {}", other),
    }
}

fn build_publisher(config: &AppConfig, dry_run: bool) -> Result<Arc<dyn Publisher>> {
    match config.x.provider.as_str() {
        // never called in dry-run, so no credentials are needed
        _ if dry_run => Ok(Arc::new(StubPublisher::new())),
        "x" => {
            let user_token = load_api_key(&config.x.user_token_env, "x")?;
            let publisher = XPublisher::with_base_url(
                user_token,
                config.x.base_url.clone(),
                config.tweet.max_chars,
                Duration::from_secs(config.general.http_timeout_secs),
            )
            .context("Failed to initialize X publisher")?;
            Ok(Arc::new(publisher))
        }
        "stub" => Ok(Arc::new(StubPublisher::new())),
        other => bail!("Unknown X provider: {}", other),
    }
}

fn log_summary(results: &[(String, ProcessResult)]) {
    let mut published = 0;
    let mut failed = 0;
    let mut skipped = 0;
    let mut dry_run = 0;

    for (path, result) in results {
        match result {
            ProcessResult::Published { outcome, text } => {
                published += 1;
                tracing::info!(
                    path = %path,
                    post_id = ?outcome.post_id,
                    text = %text,
                    "Published"
                );
            }
            ProcessResult::Failed { outcome, .. } => {
                failed += 1;
                tracing::error!(path = %path, error = %outcome.message, "Failed");
            }
            ProcessResult::Skipped { reason } => {
                skipped += 1;
                tracing::info!(path = %path, reason = %reason, "Skipped");
            }
            ProcessResult::DryRun { text } => {
                dry_run += 1;
                tracing::info!(path = %path, text = %text, "Composed (dry run)");
            }
        }
    }

    tracing::info!(
        processed = results.len(),
        published,
        failed,
        skipped,
        dry_run,
        "autotweet run completed"
    );
}
