//! CLI entry point for `sendShell`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use sendshell::auth::implicit::UrlAnnouncer;
use sendshell::auth::StaticTokenProvider;
use sendshell::composer::{Composer, Services};
use sendshell::config::{self, Config};
use sendshell::i18n;
use sendshell::model::notice::{Notice, NoticeLevel};
use sendshell::model::session::AccessToken;

#[derive(Parser)]
#[command(name = "sendshell", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Language (en, es). Defaults to system locale.
    #[arg(long, value_name = "LANG", global = true)]
    lang: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the composer in the TUI
    Compose,
    /// Sign in with Google and show the account
    Login {
        /// Print the access token to stdout
        #[arg(long)]
        print_token: bool,
    },
    /// Send a message without the TUI
    Send {
        /// Recipient address
        #[arg(long)]
        to: Option<String>,
        /// Subject line
        #[arg(short, long)]
        subject: String,
        /// Message body
        #[arg(short, long, conflicts_with = "message_file")]
        message: Option<String>,
        /// Read the message body from a file
        #[arg(long, value_name = "PATH")]
        message_file: Option<PathBuf>,
        /// File to attach
        #[arg(short, long, value_name = "PATH")]
        file: PathBuf,
        /// Use this access token instead of signing in
        #[arg(long, env = "SENDSHELL_ACCESS_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
    /// Show or initialize the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file location
    Path,
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Detect language early from --lang, the environment or the config file,
/// before clap processes --help.
fn detect_lang_early(config: &Config) -> i18n::Lang {
    let args: Vec<String> = std::env::args().collect();
    for (i, arg) in args.iter().enumerate() {
        if arg == "--lang" {
            if let Some(lang) = args.get(i + 1).and_then(|c| i18n::Lang::from_code(c)) {
                return lang;
            }
        }
        if let Some(lang) = arg.strip_prefix("--lang=").and_then(i18n::Lang::from_code) {
            return lang;
        }
    }
    if std::env::var_os("SENDSHELL_LANG").is_none() {
        if let Some(lang) = config
            .general
            .language
            .as_deref()
            .and_then(i18n::Lang::from_code)
        {
            return lang;
        }
    }
    i18n::detect_system_lang()
}

/// Build a localized clap Command using i18n strings.
fn build_localized_command() -> clap::Command {
    let mut cmd = Cli::command()
        .about(i18n::app_about())
        .long_about(i18n::app_long_about())
        .after_help(i18n::app_after_help());

    let names: Vec<String> = cmd
        .get_subcommands()
        .map(|s| s.get_name().to_string())
        .collect();
    for name in names {
        let about = match name.as_str() {
            "compose" => i18n::help_cmd_compose(),
            "login" => i18n::help_cmd_login(),
            "send" => i18n::help_cmd_send(),
            "config" => i18n::help_cmd_config(),
            "completions" => i18n::help_cmd_completions(),
            "manpage" => i18n::help_cmd_manpage(),
            _ => continue,
        };
        cmd = cmd.mut_subcommand(name, |s| s.about(about));
    }
    cmd
}

fn main() -> anyhow::Result<()> {
    let config = config::load_config();

    // Language must be fixed before clap renders --help
    i18n::set_lang(detect_lang_early(&config));

    let matches = build_localized_command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // The TUI owns the terminal, so it only logs to the file
    let interactive = matches!(cli.command, None | Some(Commands::Compose));
    setup_logging(log_level, &config, !interactive);

    match cli.command {
        None | Some(Commands::Compose) => cmd_compose(&config),
        Some(Commands::Login { print_token }) => cmd_login(&config, print_token),
        Some(Commands::Send {
            to,
            subject,
            message,
            message_file,
            file,
            token,
        }) => {
            let body = match (message, message_file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                (None, None) => String::new(),
            };
            let draft = CliDraft {
                to,
                subject,
                body,
                file,
            };
            cmd_send(&config, draft, token)
        }
        Some(Commands::Config { action }) => cmd_config(&config, action),
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
    }
}

/// Set up tracing with an optional stderr layer and file logging.
fn setup_logging(level: &str, config: &Config, to_stderr: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer =
        to_stderr.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let log_dir = config::cache_dir(config);
    let log_path = config::log_file_path(config);
    let log_name = log_path.file_name().unwrap_or_default().to_os_string();
    let file_layer = std::fs::create_dir_all(&log_dir).is_ok().then(|| {
        let file_appender = tracing_appender::rolling::never(&log_dir, log_name);
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

/// Announcer for CLI commands: the URL goes to stderr in case no browser opens.
fn stderr_announcer() -> UrlAnnouncer {
    Arc::new(|url: &Url| {
        eprintln!("  {}:", i18n::msg_open_url());
        eprintln!("  {url}");
        eprintln!();
    })
}

/// Print queued notices: success to stdout, the rest to stderr.
fn print_notices(composer: &mut Composer) {
    for Notice { level, text } in composer.take_notices() {
        match level {
            NoticeLevel::Success => println!("  {text}"),
            NoticeLevel::Info => eprintln!("  {text}"),
            NoticeLevel::Warning | NoticeLevel::Error => eprintln!("  ! {text}"),
        }
    }
}

fn cmd_compose(config: &Config) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    sendshell::tui::run_tui(config, runtime.handle().clone())
}

fn cmd_login(config: &Config, print_token: bool) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let services = Services::from_config(config, Some(stderr_announcer()))?;
    let mut composer = Composer::new(services, config.compose.clone());

    eprintln!("  {}", i18n::msg_waiting_for_browser());
    let result = runtime.block_on(composer.login());
    print_notices(&mut composer);

    // A failed userinfo lookup still leaves a usable token
    let Some(token) = composer.session().access_token.clone() else {
        return Err(result.err().map(anyhow::Error::from).unwrap_or_else(|| {
            anyhow::anyhow!(i18n::err_login_failed())
        }));
    };
    if print_token {
        println!("{}", token.secret());
    }
    Ok(())
}

/// Values collected from `send` arguments.
struct CliDraft {
    to: Option<String>,
    subject: String,
    body: String,
    file: PathBuf,
}

fn cmd_send(config: &Config, draft: CliDraft, token: Option<String>) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let services = match token {
        Some(token) => {
            let provider = StaticTokenProvider::new(AccessToken::new(token));
            Services::with_tokens(config, Arc::new(provider))?
        }
        None => Services::from_config(config, Some(stderr_announcer()))?,
    };
    let mut composer = Composer::new(services, config.compose.clone());

    let login = runtime.block_on(composer.login());
    print_notices(&mut composer);
    if !composer.session().is_authenticated() {
        return Err(login
            .err()
            .map(anyhow::Error::from)
            .unwrap_or_else(|| anyhow::anyhow!(i18n::err_login_failed())));
    }

    {
        let message = composer.draft_mut();
        message.recipient = draft.to.unwrap_or_default();
        message.subject = draft.subject;
        message.body = draft.body;
    }
    let attached = composer.attach_file(&draft.file);
    print_notices(&mut composer);
    attached?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(i18n::msg_sending());
    pb.enable_steady_tick(Duration::from_millis(100));

    let outcome = runtime.block_on(composer.send());
    pb.finish_and_clear();
    print_notices(&mut composer);

    outcome.map(|_| ()).map_err(anyhow::Error::from)
}

fn cmd_config(config: &Config, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Path => {
            let path = config::config_file_path()
                .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            println!("# log file: {}", config::log_file_path(config).display());
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigAction::Init { force } => {
            if let Some(path) = config::config_file_path().filter(|p| p.exists()) {
                if !force {
                    anyhow::bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
            }
            let path = config::save_config(&Config::default())?;
            println!("  {}", path.display());
        }
    }
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "sendshell", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
