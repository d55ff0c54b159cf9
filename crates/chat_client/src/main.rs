use std::io::{self, BufRead, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chat_client::auth::AuthGate;
use chat_client::config::ClientConfig;
use chat_client::controller::ConversationController;
use chat_client::providers;
use chat_client::repl::{unlock, Flow, Repl, ReplSettings};
use million_chat::config::EnvConfig;
use million_chat::logging::init_logging;
use million_chat::prewarm_code_highlighting;
use session_store::{store_root, FileKeyValueStore, KeyValueStore, SessionStore};
use signal_hook::consts::SIGINT;

/// Exit status used when a second Ctrl-C arrives before the first was handled.
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() -> io::Result<()> {
    let env_config = EnvConfig::from_env();
    if let Err(error) = init_logging(&env_config) {
        eprintln!("logging disabled: {error}");
    }
    let config = ClientConfig::from_env();

    let _ = std::thread::Builder::new()
        .name("code-highlight-prewarm".to_string())
        .spawn(prewarm_code_highlighting);

    let backend: Arc<dyn KeyValueStore> = Arc::new(
        FileKeyValueStore::open(store_root(&config.home)).map_err(io::Error::other)?,
    );
    let provider = providers::provider_for_id(&config.provider_id).map_err(io::Error::other)?;
    let profile = provider.profile();
    tracing::info!(
        provider = %profile.provider_id,
        model = %profile.model_id,
        home = %config.home.display(),
        "starting"
    );

    let interrupt = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register_conditional_shutdown(
        SIGINT,
        INTERRUPTED_EXIT_CODE,
        Arc::clone(&interrupt),
    )?;
    signal_hook::flag::register(SIGINT, Arc::clone(&interrupt))?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();

    let gate = AuthGate::new(Arc::clone(&backend), config.access_secret.clone());
    if !unlock(&gate, &mut input, &mut stdout)? {
        return Ok(());
    }

    let store = Arc::new(SessionStore::load(backend));
    let controller = ConversationController::new(store, provider, config.persona);
    let settings = ReplSettings {
        columns: env_config.columns,
        rows: env_config.rows,
        color: !env_config.no_color,
    };
    let mut repl = Repl::new(controller, settings, interrupt, stdout);

    writeln!(
        io::stderr(),
        "{} / {}  (/help for commands)",
        profile.provider_id,
        profile.model_id
    )?;
    repl.print_conversation()?;

    let mut line = String::new();
    loop {
        repl.prompt()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        if repl.handle_line(line.trim_end_matches(['\r', '\n']))? == Flow::Quit {
            break;
        }
    }

    tracing::info!("exiting");
    Ok(())
}
