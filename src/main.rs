//! command-sandbox - policy gate for shell commands run by coding agents
//!
//! # Usage
//!
//! ```bash
//! # Classify a command (reads JSON from stdin, writes JSON to stdout)
//! echo '{"command":"rm -rf /"}' | command-sandbox
//!
//! # Or pass the command directly
//! command-sandbox check --command "git push --force origin main"
//!
//! # Manage rules in the policy file
//! command-sandbox list
//! command-sandbox add --block 'rm\s+-rf\s+/'
//! command-sandbox remove common-block-0
//! ```

use std::env;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use command_sandbox::{
    audit::AuditLogger,
    config::Config,
    gate::CommandGate,
    input::CheckRequest,
    output::EvaluationResult,
    parser::RuleType,
    policy::SecurityPolicy,
    rules::defaults::DEFAULT_POLICY_JSON,
    store::{FilePolicyStore, PolicyEditor, PolicyStore},
    SandboxEngine,
};

/// Environment variable holding the log filter
const LOG_ENV: &str = "COMMAND_SANDBOX_LOG";

/// Print version information
fn print_version() {
    println!("command-sandbox {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message
fn print_help() {
    println!(
        r#"command-sandbox - policy gate for shell commands run by coding agents

USAGE:
    command-sandbox [OPTIONS] [COMMAND]

COMMANDS:
    check                   Classify a command (default). Reads {{"command": "..."}} from stdin
    list                    Print the editable block and risk rules with their ids
    add --block|--risk TEXT Append a rule to the common section
    edit ID [--] TEXT       Replace the rule with the given id
    remove ID               Remove the rule with the given id (alias: unblock, delete)
    validate                Report policy errors and patterns that will be skipped
    init [--force]          Write the default policy

OPTIONS:
        --                  Treat every later argument as rule text or an id
    -h, --help              Print this help message
    -v, --version           Print version information
    -p, --policy PATH       Path to the policy file
    -c, --config PATH       Path to config file
        --platform ID       Apply rules for win32, darwin or linux
        --command CMD       Command to classify instead of reading stdin

ENVIRONMENT:
    COMMAND_SANDBOX_POLICY  Policy file path
    COMMAND_SANDBOX_LOG     Log filter (default: warn)

An invalid or missing policy allows every command.
"#
    );
}

#[derive(Debug, Default, PartialEq)]
enum Subcommand {
    #[default]
    Check,
    List,
    Add,
    Edit,
    Remove,
    Validate,
    Init,
}

/// Parse command line arguments
#[derive(Debug, Default)]
struct Args {
    help: bool,
    version: bool,
    subcommand: Subcommand,
    policy_path: Option<String>,
    config_path: Option<String>,
    platform: Option<String>,
    command: Option<String>,
    rule_type: Option<RuleType>,
    force: bool,
    positional: Vec<String>,
}

impl Args {
    fn parse() -> Self {
        Self::parse_from(env::args().skip(1).collect())
    }

    fn parse_from(args: Vec<String>) -> Self {
        let mut result = Args::default();
        let mut saw_subcommand = false;
        let mut options_done = false;

        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            let take_value = |i: &mut usize| -> Option<String> {
                if *i + 1 < args.len() {
                    *i += 1;
                    Some(args[*i].clone())
                } else {
                    None
                }
            };

            if options_done {
                result.positional.push(arg.to_string());
                i += 1;
                continue;
            }

            match arg {
                "--" => options_done = true,
                "-h" | "--help" => result.help = true,
                "-v" | "--version" => result.version = true,
                "--force" => result.force = true,
                "-p" | "--policy" => result.policy_path = take_value(&mut i),
                "-c" | "--config" => result.config_path = take_value(&mut i),
                "--platform" => result.platform = take_value(&mut i),
                "--command" => result.command = take_value(&mut i),
                "--block" => {
                    result.rule_type = Some(RuleType::Block);
                    if let Some(text) = take_value(&mut i) {
                        result.positional.push(text);
                    }
                }
                "--risk" => {
                    result.rule_type = Some(RuleType::Risk);
                    if let Some(text) = take_value(&mut i) {
                        result.positional.push(text);
                    }
                }
                a if a.starts_with("--policy=") => {
                    result.policy_path = Some(a.trim_start_matches("--policy=").to_string());
                }
                a if a.starts_with("--config=") => {
                    result.config_path = Some(a.trim_start_matches("--config=").to_string());
                }
                a if a.starts_with("--platform=") => {
                    result.platform = Some(a.trim_start_matches("--platform=").to_string());
                }
                a if a.starts_with("--command=") => {
                    result.command = Some(a.trim_start_matches("--command=").to_string());
                }
                a if !saw_subcommand && !a.starts_with('-') => {
                    saw_subcommand = true;
                    result.subcommand = match a {
                        "check" => Subcommand::Check,
                        "list" => Subcommand::List,
                        "add" => Subcommand::Add,
                        "edit" => Subcommand::Edit,
                        "remove" | "unblock" | "delete" => Subcommand::Remove,
                        "validate" => Subcommand::Validate,
                        "init" => Subcommand::Init,
                        other => {
                            eprintln!("Unknown command: {}", other);
                            result.help = true;
                            Subcommand::Check
                        }
                    };
                }
                a => result.positional.push(a.to_string()),
            }
            i += 1;
        }

        result
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_ansi(false))
        .with(filter)
        .try_init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    init_tracing();

    // Load configuration
    let mut config = match args.config_path {
        Some(ref path) => Config::load_from(&Config::expand_path(path)).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Config::default()
        }),
        None => Config::load(),
    };

    if let Some(ref platform) = args.platform {
        config.general.platform = Some(platform.clone());
    }

    let policy_path = args
        .policy_path
        .as_deref()
        .map(Config::expand_path)
        .or_else(|| config.policy_path());

    let Some(policy_path) = policy_path else {
        eprintln!("Error: no policy file configured");
        return ExitCode::FAILURE;
    };

    let store = FilePolicyStore::new(policy_path);

    match args.subcommand {
        Subcommand::Check => run_check(&args, &config, &store),
        Subcommand::List => run_list(&store),
        Subcommand::Add => run_add(&args, &store),
        Subcommand::Edit => run_edit(&args, &store),
        Subcommand::Remove => run_remove(&args, &store),
        Subcommand::Validate => run_validate(&config, &store),
        Subcommand::Init => run_init(&args, &store),
    }
}

fn run_check(args: &Args, config: &Config, store: &FilePolicyStore) -> ExitCode {
    let request = match args.command {
        Some(ref command) => CheckRequest::new(command.clone()),
        None => {
            let mut input_json = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut input_json) {
                tracing::warn!(error = %e, "failed to read stdin");
            }

            // No input = nothing to check
            if input_json.trim().is_empty() {
                print_json(&EvaluationResult::allow("No command to check").to_json());
                return ExitCode::SUCCESS;
            }

            match CheckRequest::from_json(&input_json) {
                Ok(request) => request,
                Err(e) => {
                    // The policy fails open, but a request we cannot read has
                    // no command we could vouch for.
                    let result =
                        EvaluationResult::block(format!("Malformed check request: {}", e), None);
                    print_json(&result.to_json());
                    return ExitCode::SUCCESS;
                }
            }
        }
    };

    let gate = CommandGate::from_config(store, config);
    let result = gate.check(&request.command);

    let audit_path = if config.general.audit_log {
        config.audit_path()
    } else {
        None
    };
    let mut logger = AuditLogger::new(audit_path.as_deref());
    if let Err(e) = logger.log_decision(&request, &result, gate.platform()) {
        tracing::warn!(error = %e, "failed to write audit log");
    }

    print_json(&result.to_json());
    ExitCode::SUCCESS
}

fn run_list(store: &FilePolicyStore) -> ExitCode {
    let rules = PolicyEditor::new(store).rules();
    print_json(&serde_json::to_string_pretty(&rules).unwrap_or_else(|_| "{}".to_string()));
    ExitCode::SUCCESS
}

fn run_add(args: &Args, store: &FilePolicyStore) -> ExitCode {
    let (Some(kind), Some(text)) = (args.rule_type, args.positional.first()) else {
        eprintln!("Usage: command-sandbox add --block TEXT | --risk TEXT");
        return ExitCode::FAILURE;
    };
    report_edit(PolicyEditor::new(store).add(kind, text))
}

fn run_edit(args: &Args, store: &FilePolicyStore) -> ExitCode {
    let [id, text] = args.positional.as_slice() else {
        eprintln!("Usage: command-sandbox edit ID TEXT");
        return ExitCode::FAILURE;
    };
    report_edit(PolicyEditor::new(store).update(id, text))
}

fn run_remove(args: &Args, store: &FilePolicyStore) -> ExitCode {
    let [id] = args.positional.as_slice() else {
        eprintln!("Usage: command-sandbox remove ID");
        return ExitCode::FAILURE;
    };
    report_edit(PolicyEditor::new(store).remove(id))
}

fn report_edit(
    outcome: Result<command_sandbox::ParsedPolicy, command_sandbox::StoreError>,
) -> ExitCode {
    match outcome {
        Ok(rules) => {
            print_json(&serde_json::to_string_pretty(&rules).unwrap_or_else(|_| "{}".to_string()));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_validate(config: &Config, store: &FilePolicyStore) -> ExitCode {
    let Some(text) = store.load() else {
        println!("No policy at {}: all commands are allowed", store.path().display());
        return ExitCode::SUCCESS;
    };

    let policy = match SecurityPolicy::from_json(&text) {
        Ok(policy) => policy,
        Err(e) => {
            println!("Invalid policy ({}): all commands are allowed", e);
            return ExitCode::FAILURE;
        }
    };

    let engine = SandboxEngine::from_config(Some(&policy), config);
    let platform = engine.platform().map(|p| p.id()).unwrap_or("none");
    let rules = engine.rules();
    println!(
        "Policy OK for platform {}: {} block, {} allow, {} risk rules",
        platform,
        rules.block.len(),
        rules.allow.len(),
        rules.risk_keywords.len()
    );

    let skipped = engine.skipped_patterns();
    for pattern in skipped {
        println!(
            "  skipped {} pattern {}[{}] {:?}: {}",
            pattern.kind.as_str(),
            pattern.scope,
            pattern.index,
            pattern.pattern,
            pattern.error
        );
    }

    if skipped.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_init(args: &Args, store: &FilePolicyStore) -> ExitCode {
    if store.exists() && !args.force {
        eprintln!(
            "Policy already exists at {} (use --force to overwrite)",
            store.path().display()
        );
        return ExitCode::FAILURE;
    }

    match store.save(DEFAULT_POLICY_JSON) {
        Ok(()) => {
            println!("Wrote default policy to {}", store.path().display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: failed to write {}: {}", store.path().display(), e);
            ExitCode::FAILURE
        }
    }
}

fn print_json(json: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{}", json);
    let _ = handle.flush();
}
