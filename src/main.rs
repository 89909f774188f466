use std::error::Error;

use doc_lookup::{DocLookupService, LookupConfig, render_faq, render_lookup, telemetry};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: rtfm-backend <rtfm|rtfm-rewrite|faq|refresh|issue> [query...]";

/// One chat command, as the routing layer would hand it over.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Rtfm { docset: &'static str, query: String },
    Faq { query: String },
    Refresh,
    Issue { text: String },
}

fn parse_command(args: &[String]) -> Option<Command> {
    let (name, rest) = args.split_first()?;
    let query = rest.join(" ");
    match name.as_str() {
        "rtfm" | "rtfd" => Some(Command::Rtfm {
            docset: "latest",
            query,
        }),
        "rtfm-rewrite" => Some(Command::Rtfm {
            docset: "rewrite",
            query,
        }),
        "faq" => Some(Command::Faq { query }),
        "refresh" => Some(Command::Refresh),
        "issue" => Some(Command::Issue { text: query }),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file when present.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", telemetry::level_from_env(Level::INFO)))
        .with(telemetry::layer())
        .try_init()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = parse_command(&args) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let svc = DocLookupService::from_config(LookupConfig::from_env()?)?;

    let reply = match command {
        Command::Rtfm { docset, query } => match svc.lookup(docset, &query).await {
            Ok(outcome) => render_lookup(&outcome),
            Err(e) if e.is_build_failure() => e.to_string(),
            Err(e) => return Err(e.into()),
        },
        Command::Faq { query } => match svc.faq(&query).await {
            Ok(outcome) => render_faq(&outcome),
            Err(e) if e.is_build_failure() => e.to_string(),
            Err(e) => return Err(e.into()),
        },
        Command::Refresh => {
            for set in &svc.config().doc_sets {
                svc.rebuild(&set.key)?;
            }
            svc.rebuild_faq();
            "\u{2705}".to_string()
        }
        Command::Issue { text } => svc
            .issue_link(&text)
            .unwrap_or_else(|| "No issue reference found.".to_string()),
    };

    println!("{reply}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rtfm_joins_the_query() {
        assert_eq!(
            parse_command(&args(&["rtfm-rewrite", "msg", "content"])),
            Some(Command::Rtfm {
                docset: "rewrite",
                query: "msg content".into()
            })
        );
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert_eq!(parse_command(&args(&["pin", "123"])), None);
        assert_eq!(parse_command(&[]), None);
    }
}
