//! translate: 命令行翻译工具，按配置的优先级路由到翻译后端
//!
//! Usage:
//!   translate [--config <path>] <from> <to> <text...>   Translate text (source text on failure)
//!   translate status [--config <path>]                   Print backend health and usage as JSON

use anyhow::{bail, Context};
use translation_router::{RouterSettings, TranslationRouter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, rest) = split_config_flag(&args)?;

    match rest.first().map(String::as_str) {
        None | Some("help" | "--help" | "-h") => {
            print_usage();
            Ok(())
        }
        Some("version" | "--version" | "-V") => {
            println!("translate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some("status") => {
            let router = load_router(config_path.as_deref())?;
            let status = router.provider_status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Some(_) => {
            if rest.len() < 3 {
                print_usage();
                bail!("expected <from> <to> <text...>");
            }
            let router = load_router(config_path.as_deref())?;
            let text = rest[2..].join(" ");
            let translated = router.translate_or_source(&text, &rest[0], &rest[1]).await;
            println!("{}", translated);
            Ok(())
        }
    }
}

fn print_usage() {
    println!(
        r#"translate: multi-backend translation

USAGE:
    translate [--config <path>] <from> <to> <text...>
    translate status [--config <path>]

ENVIRONMENT:
    TRANSLATE_ROUTER_CONFIG     Settings file used when --config is absent
    TRANSLATE_CACHE_TTL_SECS    Overrides route.cache_ttl_secs
    RUST_LOG                    Log filter (default: info)"#
    );
}

/// Pulls `--config <path>` out of the argument list wherever it appears.
fn split_config_flag(args: &[String]) -> anyhow::Result<(Option<String>, Vec<String>)> {
    let mut config = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter.next().context("--config requires a path")?;
            config = Some(path.clone());
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((config, rest))
}

fn load_router(path: Option<&str>) -> anyhow::Result<TranslationRouter> {
    let settings = match path {
        Some(path) => RouterSettings::from_path(path)
            .with_context(|| format!("loading settings from {}", path))?,
        None => RouterSettings::from_env()?
            .context("no settings: pass --config or set TRANSLATE_ROUTER_CONFIG")?,
    };
    Ok(settings.into_router()?)
}
