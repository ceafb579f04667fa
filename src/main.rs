use clap::{Parser, Subcommand};
use pr_board::config::Config;
use pr_board::github::{Caller, FetchError, RepositoryPullRequests, UpstreamClient};
use serde::Serialize;
use std::future::Future;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Show open PRs for the selected repositories (default if no subcommand)
    Pulls {
        /// Repositories as "org/repo"; defaults to `repos` from the config file
        repos: Vec<String>,

        /// Login to match against requested reviewers (defaults to config, then the token's owner)
        #[arg(short, long)]
        user: Option<String>,

        /// Refresh every `auto_refresh_interval` seconds until interrupted
        #[arg(short, long)]
        watch: bool,
    },
    /// List repositories visible to your token; "*" marks the configured ones
    Repos {
        /// Only show repositories whose name contains this text (case-insensitive)
        filter: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "pr-board")]
#[command(about = "Open pull requests across your GitHub repositories", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/pr-board/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// GitHub token (defaults to PR_BOARD_GH_TOKEN, then GITHUB_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Give up on a whole pass after this long (e.g. "90s", "2m")
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+); an
    // already-installed provider is fine
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();

    if let Err(e) = pr_board::logging::initialize_logging(cli.verbose) {
        eprintln!("{}", e);
    }

    let config_path = cli.config.clone().map(PathBuf::from);
    let config = match pr_board::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let token = match pr_board::credentials::resolve_token(cli.token.clone()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Credential error: {}", e);
            std::process::exit(EXIT_AUTH);
        }
    };

    let client = match pr_board::github::create_client(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create GitHub client: {:#}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    let command = cli.command.clone().unwrap_or(Commands::Pulls {
        repos: Vec::new(),
        user: None,
        watch: false,
    });

    let code = match command {
        Commands::Repos { filter } => {
            run_repos(&cli, &config, &client, &token, filter.as_deref()).await
        }
        Commands::Pulls { repos, user, watch } => {
            run_pulls(&cli, &config, &client, &token, repos, user, watch).await
        }
    };

    std::process::exit(code);
}

async fn run_repos(
    cli: &Cli,
    config: &Config,
    client: &UpstreamClient,
    token: &str,
    filter: Option<&str>,
) -> i32 {
    let listing = with_timeout(cli.timeout, pr_board::github::list_repositories(client, token)).await;

    let repositories = match listing {
        Some(Ok(repos)) => {
            let repos = pr_board::github::filter_repositories(repos, filter.unwrap_or_default());
            pr_board::github::mark_selected(repos, &config.repos)
        }
        Some(Err(e)) => return report_fetch_error(&e),
        None => return report_timeout(cli.timeout),
    };

    if cli.json {
        print_json(&repositories, true)
    } else {
        let use_colors = pr_board::output::should_use_colors();
        println!(
            "{}",
            pr_board::output::format_repository_list(&repositories, use_colors)
        );
        EXIT_SUCCESS
    }
}

async fn run_pulls(
    cli: &Cli,
    config: &Config,
    client: &UpstreamClient,
    token: &str,
    repos: Vec<String>,
    user: Option<String>,
    watch: bool,
) -> i32 {
    let selection = if repos.is_empty() {
        config.repos.clone()
    } else {
        repos
    };

    if selection.is_empty() {
        eprintln!("No repositories selected.");
        eprintln!("Pass them as arguments or add them to ~/.config/pr-board/config.yaml:");
        eprintln!("  repos:");
        eprintln!("    - octo/app");
        eprintln!("Run `pr-board repos` to see what your token can access.");
        return EXIT_CONFIG;
    }

    let login = match user.or_else(|| config.username.clone()) {
        Some(login) => login,
        None => match pr_board::github::fetch_viewer_login(client, token).await {
            Ok(login) => {
                tracing::debug!(login, "resolved login from token");
                login
            }
            Err(e) => return report_fetch_error(&e),
        },
    };

    let caller = Caller::new(token, &login);
    let options = config.aggregate_options();
    let selection = &selection;

    let outcome = run_passes(config.refresh_interval(), interrupted(), || async move {
        let start = Instant::now();
        let pass = with_timeout(
            cli.timeout,
            pr_board::aggregate(client, selection, caller, options),
        )
        .await;

        match pass {
            Some(results) => {
                tracing::debug!(
                    repositories = results.len(),
                    elapsed = ?start.elapsed(),
                    "aggregation pass finished"
                );
                let code = render_results(cli, &results, watch);
                if watch {
                    ControlFlow::Continue(())
                } else if all_failed(&results) {
                    ControlFlow::Break(EXIT_NETWORK)
                } else {
                    ControlFlow::Break(code)
                }
            }
            None if !watch => ControlFlow::Break(report_timeout(cli.timeout)),
            None => {
                tracing::warn!("refresh timed out, keeping the previous output");
                ControlFlow::Continue(())
            }
        }
    })
    .await;

    match outcome {
        Some(code) => code,
        // Ctrl-C is how --watch is meant to end
        None if watch => EXIT_SUCCESS,
        None => EXIT_INTERRUPTED,
    }
}

/// Resolves on the first Ctrl-C. If the handler cannot be installed it
/// never resolves and the process keeps the default SIGINT behaviour.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Run `pass` until it breaks, sleeping `interval` between passes.
///
/// `interrupt` is listened to for the whole run, during passes as well as
/// between them. Returns `None` when it fires first.
async fn run_passes<I, P, Fut>(interval: Duration, interrupt: I, mut pass: P) -> Option<i32>
where
    I: Future<Output = ()>,
    P: FnMut() -> Fut,
    Fut: Future<Output = ControlFlow<i32>>,
{
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            flow = pass() => {
                if let ControlFlow::Break(code) = flow {
                    return Some(code);
                }
            }
            _ = &mut interrupt => return None,
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = &mut interrupt => return None,
        }
    }
}

/// Run `fut`, giving up after `limit` when one is set
async fn with_timeout<F: Future>(limit: Option<Duration>, fut: F) -> Option<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
        None => Some(fut.await),
    }
}

fn render_results(cli: &Cli, results: &[RepositoryPullRequests], watch: bool) -> i32 {
    if cli.json {
        // One document per line while watching, so the stream stays parseable
        return print_json(&results, !watch);
    }

    let use_colors = pr_board::output::should_use_colors();
    if watch {
        println!(
            "--- {} ---",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!("{}", pr_board::output::format_results(results, use_colors));
    EXIT_SUCCESS
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> i32 {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match rendered {
        Ok(json) => {
            println!("{}", json);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize output: {}", e);
            EXIT_NETWORK
        }
    }
}

/// Every selected repository came back with an error placeholder
fn all_failed(results: &[RepositoryPullRequests]) -> bool {
    !results.is_empty() && results.iter().all(|r| r.error.is_some())
}

fn report_fetch_error(error: &FetchError) -> i32 {
    if error.is_bad_credentials() {
        eprintln!("Your GitHub token was rejected (invalid or expired): {}", error.message());
        eprintln!("Create a new one at https://github.com/settings/tokens and pass it with --token or PR_BOARD_GH_TOKEN.");
        EXIT_AUTH
    } else {
        eprintln!("{}", error);
        EXIT_NETWORK
    }
}

fn report_timeout(limit: Option<Duration>) -> i32 {
    let limit = limit.map(|d| humantime::format_duration(d).to_string());
    eprintln!(
        "Timed out after {}. Check your network connection.",
        limit.as_deref().unwrap_or("the configured limit")
    );
    EXIT_NETWORK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_stops_on_break() {
        let mut calls = 0;
        let outcome = run_passes(Duration::from_millis(10), std::future::pending(), || {
            calls += 1;
            let n = calls;
            async move {
                if n == 3 {
                    ControlFlow::Break(EXIT_NETWORK)
                } else {
                    ControlFlow::Continue(())
                }
            }
        })
        .await;

        assert_eq!(outcome, Some(EXIT_NETWORK));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_interrupt_during_a_later_pass_cancels_it() {
        let mut calls = 0;
        let interrupt = tokio::time::sleep(Duration::from_millis(200));
        let run = run_passes(Duration::from_millis(10), interrupt, || {
            calls += 1;
            let n = calls;
            async move {
                // The second pass hangs like a request that never answers
                if n >= 2 {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
                ControlFlow::Continue(())
            }
        });

        let outcome = tokio::time::timeout(Duration::from_secs(5), run).await;

        assert_eq!(outcome, Ok(None));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_interrupt_between_passes() {
        let mut calls = 0;
        let interrupt = tokio::time::sleep(Duration::from_millis(100));
        let run = run_passes(Duration::from_secs(30), interrupt, || {
            calls += 1;
            async { ControlFlow::Continue(()) }
        });

        let outcome = tokio::time::timeout(Duration::from_secs(5), run).await;

        assert_eq!(outcome, Ok(None));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_repos_takes_an_optional_filter() {
        let cli = Cli::try_parse_from(["pr-board", "repos", "Octo"]).unwrap();
        match cli.command {
            Some(Commands::Repos { filter }) => assert_eq!(filter.as_deref(), Some("Octo")),
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["pr-board", "repos"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Repos { filter: None })));
    }
}
