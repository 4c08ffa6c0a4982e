//! Preview command - compose the announcement for one local article

use anyhow::{Context, Result};
use autotweet_adapters::content::LocalArticleReader;
use autotweet_domain::{
    ArticleReader, DedupKey, ImageRef,
    usecases::{TweetComposer, extract_metadata},
};
use serde::Serialize;
use std::path::PathBuf;

use crate::args::PreviewArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct PreviewOutput {
    path: String,
    title: String,
    category: Option<String>,
    hashtags: Vec<String>,
    image: Option<ImageRef>,
    url: String,
    text: String,
    chars: usize,
    dedup_key: String,
}

pub async fn execute(args: PreviewArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let reader = LocalArticleReader::new(config.general.content_root.clone());
    let html = reader
        .read_article(&args.path)
        .await
        .with_context(|| format!("Failed to read article {}", args.path))?;

    let metadata = extract_metadata(&html, &config.tweet.brand_hashtag)
        .with_context(|| format!("Failed to extract metadata from {}", args.path))?;

    let composer = TweetComposer::new(config.tweet_policy());
    let url = composer.article_url(&args.path);
    let text = composer.compose(&metadata.title, &metadata.hashtags, &url);

    let output = PreviewOutput {
        dedup_key: DedupKey::from_path(&args.path).to_string(),
        chars: text.chars().count(),
        path: args.path,
        title: metadata.title,
        category: metadata.category,
        hashtags: metadata.hashtags,
        image: metadata.image,
        url,
        text,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_preview(&output);
    }

    Ok(())
}

fn print_preview(output: &PreviewOutput) {
    println!("Article:  {}", output.path);
    println!("Title:    {}", output.title);
    println!(
        "Category: {}",
        output.category.as_deref().unwrap_or("(none)")
    );
    println!("Hashtags: {}", output.hashtags.join(" "));
    match &output.image {
        Some(image) => {
            println!("Image:    {}", image.src);
            if let Some(alt) = &image.embedded_alt {
                println!("Alt text: {}", alt);
            }
        }
        None => println!("Image:    (none)"),
    }
    println!("Key:      {}", output.dedup_key);
    println!();
    println!("{}", output.text);
    println!();
    println!("({} chars)", output.chars);
}
