//! Doctor command - validate configuration and show status

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::commands::env_value;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    content: CheckResult,
    memory: CheckResult,
    vision: CheckResult,
    x: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        content: CheckResult::error("Not checked"),
        memory: CheckResult::error("Not checked"),
        vision: CheckResult::error("Not checked"),
        x: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = check_limits(&c);
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.content = check_content(config);
        report.memory = check_memory(config);
        report.vision = check_vision(config);
        report.x = check_x(config);
    }

    let checks = [
        &report.config,
        &report.content,
        &report.memory,
        &report.vision,
        &report.x,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_limits(config: &AppConfig) -> CheckResult {
    match config.pipeline_config(false).validate() {
        Ok(()) => CheckResult::ok("Configuration loaded successfully"),
        Err(e) => CheckResult::error(format!("Invalid limits: {}", e)),
    }
}

fn check_content(config: &AppConfig) -> CheckResult {
    let root = &config.general.content_root;
    if !root.is_dir() {
        return CheckResult::error(format!(
            "Content root does not exist: {}",
            root.display()
        ));
    }

    let articles = root.join(&config.general.articles_dir);
    let details = serde_json::json!({
        "content_root": root.display().to_string(),
        "articles_dir": config.general.articles_dir,
        "git_checkout": root.join(".git").exists(),
    });

    if articles.is_dir() {
        CheckResult::ok(format!("Articles directory: {}", articles.display())).with_details(details)
    } else {
        CheckResult::warn(format!(
            "Articles directory not found: {}",
            articles.display()
        ))
        .with_details(details)
    }
}

fn check_memory(config: &AppConfig) -> CheckResult {
    let url_env = &config.memory.base_url_env;
    let token_env = &config.memory.token_env;

    match (env_value(url_env), env_value(token_env)) {
        (Some(url), Some(_)) => CheckResult::ok(format!(
            "Memory store: {}, token: {} (set)",
            url, token_env
        )),
        (url, token) => CheckResult::warn(format!(
            "Memory store disabled, announcements will not be deduplicated ({}: {}, {}: {})",
            url_env,
            if url.is_some() { "set" } else { "not set" },
            token_env,
            if token.is_some() { "set" } else { "not set" },
        )),
    }
}

fn check_vision(config: &AppConfig) -> CheckResult {
    let vision = &config.vision;
    match vision.provider.as_str() {
        "gemini" => match env_value(&vision.api_key_env) {
            Some(_) => CheckResult::ok(format!(
                "Provider: gemini, Model: {}, API key: {} (set)",
                vision.model, vision.api_key_env
            )),
            None => CheckResult::warn(format!(
                "Provider: gemini, Model: {}, API key: {} (not set), fallback alt text will be used",
                vision.model, vision.api_key_env
            )),
        },
        "stub" => CheckResult::ok("Provider: stub (offline)"),
        "none" => CheckResult::ok("Vision disabled, fallback alt text will be used"),
        other => CheckResult::error(format!("Unknown vision provider: {}", other)),
    }
}

fn check_x(config: &AppConfig) -> CheckResult {
    match config.x.provider.as_str() {
        "x" => {
            let env_var = &config.x.user_token_env;
            if env_var.trim().is_empty() {
                return CheckResult::error("No user token env var configured");
            }
            match env_value(env_var) {
                Some(_) => CheckResult::ok(format!(
                    "User token: {} (set), API: {}",
                    env_var, config.x.base_url
                )),
                None => CheckResult::warn(format!(
                    "User token: {} (not set), only --dry-run will work",
                    env_var
                )),
            }
        }
        "stub" => CheckResult::ok("Provider: stub (posts are only logged)"),
        other => CheckResult::error(format!("Unknown X provider: {}", other)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("autotweet Doctor Report");
    println!("=======================");
    println!();

    print_check("Config", &report.config);
    print_check("Content", &report.content);
    print_check("Memory Store", &report.memory);
    print_check("Vision", &report.vision);
    print_check("X", &report.x);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall != "error" {
        println!();
        println!("Ready to run! Try: autotweet run --dry-run");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
