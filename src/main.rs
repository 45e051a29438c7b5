// `soapbox` runs one stage on a virtual clock and prints what the audience does:
//
// ```console
// $ soapbox --nickname RantMaster --speak-at 50 --rant-text "Return your carts!"
// ```
//
// or lists archived rants:
//
// ```console
// $ soapbox --hall --search pizza --sort controversial
// ```

use anyhow::{Context, Result};
use clap::Parser;
use soapbox_stage::archive::HallOfHowls;
use soapbox_stage::simulation::{
    LoggingConfig, LoggingGuard, StageCollaborators, StageController, StageStatistics,
};
use soapbox_stage::speech::{
    AudioSink, DisabledSynthesizer, ElevenLabsClient, FileSink, HeadlessSink, Microphone,
    PrerecordedMicrophone, SpeechSynthesizer,
};
use soapbox_stage::storage::LocalStore;
use soapbox_stage::types::config::CliArgs;
use soapbox_stage::types::{StageConfig, StagePhase};
use soapbox_stage::user::{identity, User};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// Rant delivered when the stage is taken without any content
const FALLBACK_RANT: &str = "I have strong opinions and exactly sixty seconds to share them. Here goes nothing!";

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.print_config {
        return match StageConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("soapbox: cannot encode the default settings: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let _logging_guard = match init_logging(&args) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("soapbox: cannot set up logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => {
            info!("r/Soapbox stage closed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    let config = StageConfig::from_cli_args(args.clone()).context("Failed to load stage settings")?;
    config.validate().context("Stage settings rejected")?;
    info!(seed = ?config.seed, hall = args.hall, "Starting r/Soapbox");

    if args.dry_run {
        eprintln!("Stage settings are valid; nothing mounted (--dry-run).");
        print_configuration_summary(&config, &args);
        return Ok(());
    }

    if args.hall {
        run_hall(&args)
    } else {
        run_stage(config, &args)
    }
}

/// Initialize logging based on CLI flags
fn init_logging(args: &CliArgs) -> Result<LoggingGuard, Box<dyn std::error::Error + Send + Sync>> {
    if !args.json_logs && args.log_dir.is_none() {
        if args.debug {
            return LoggingConfig::init_debug();
        }
        if args.verbose {
            return LoggingConfig::init_verbose();
        }
    }

    let level = if args.debug {
        tracing::Level::DEBUG
    } else if args.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    let mut logging = LoggingConfig::new().with_level(level);
    if args.json_logs {
        logging = logging.with_json_format();
    }
    if let Some(dir) = &args.log_dir {
        logging = logging.with_file_logging(dir.clone());
    }
    logging.init()
}

/// List archived rants
fn run_hall(args: &CliArgs) -> Result<()> {
    let hall = HallOfHowls::with_examples().context("Failed to load the Hall of Howls")?;
    let rants = hall.query(args.search.as_deref(), args.sort);

    println!("🏆 Hall of Howls ({} rants, sorted by {})", rants.len(), args.sort);
    println!("==========================================");
    if rants.is_empty() {
        println!("No rants match. Try one of: {}", hall.suggestions().join(", "));
        return Ok(());
    }

    for rant in rants {
        let r = &rant.reactions;
        println!(
            "\n{} ({}s, {})",
            rant.nickname,
            rant.duration,
            if rant.survived { "survived" } else { "ejected" }
        );
        println!("  {}", rant.preview(120));
        println!(
            "  🥫 {}  ❓ {}  👍 {}  😬 {}  | {}",
            r.tomato,
            r.explain,
            r.plus_one,
            r.cringe,
            rant.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

/// Mount a stage and play the scripted scenario on the virtual clock
fn run_stage(config: StageConfig, args: &CliArgs) -> Result<()> {
    print_startup_banner(&config, args);

    let mut store = match &config.store_path {
        Some(path) => LocalStore::open(path).with_context(|| format!("Failed to open local store {}", path))?,
        None => LocalStore::in_memory(),
    };
    if args.seen_example {
        store.mark_example_seen().context("Failed to update the local store")?;
    }

    let user = resolve_user(&mut store, args.nickname.as_deref())?;
    eprintln!("Signed in as {} ({})", user.nickname, user.id);

    let collaborators = build_collaborators(&config, args)?;
    let mut stage = StageController::mount(config, user, store, collaborators)
        .context("Failed to mount the stage")?;

    for second in 0..args.duration_secs {
        if args.speak_at == Some(second) {
            take_the_stage(&mut stage, args);
        }

        stage.advance_by(Duration::from_secs(1));

        for notification in stage.take_notifications() {
            println!("[{:>4}s] {}", second + 1, notification);
        }
        if (second + 1) % 5 == 0 {
            print_status(&stage, second + 1);
        }
        if stage.phase() == StagePhase::Ejected {
            // walk off stage
            if let Err(e) = stage.stop() {
                warn!("Could not clear the ejection: {}", e);
            }
        }

        if args.realtime {
            thread::sleep(Duration::from_secs(1));
        }
    }

    stage.teardown();
    print_final_statistics(stage.statistics());
    Ok(())
}

/// Restore the stored user or sign in with the given nickname
fn resolve_user(store: &mut LocalStore, nickname: Option<&str>) -> Result<User> {
    let now = chrono::Utc::now();
    let user = match nickname {
        Some(nickname) => identity::sign_in_or_restore(store, nickname, now)?,
        None => match identity::current_user(store)? {
            Some(user) => user,
            None => identity::sign_in(store, "Guest", now)?,
        },
    };
    Ok(user)
}

/// Choose speech, microphone and playback collaborators from the configuration
fn build_collaborators(config: &StageConfig, args: &CliArgs) -> Result<StageCollaborators> {
    let synthesizer: Box<dyn SpeechSynthesizer> = if config.speech.has_valid_api_key() {
        Box::new(ElevenLabsClient::new(config.speech.clone())?)
    } else {
        info!("No speech API key configured, running text-only");
        Box::new(DisabledSynthesizer)
    };

    let microphone: Box<dyn Microphone> = match &args.recording {
        Some(path) => Box::new(PrerecordedMicrophone::from_file(path)),
        None => Box::new(PrerecordedMicrophone::denied()),
    };

    let sink: Box<dyn AudioSink> = match &args.audio_out {
        Some(dir) => Box::new(FileSink::new(dir)),
        None => Box::new(HeadlessSink::new()),
    };

    Ok(StageCollaborators { synthesizer, microphone, sink })
}

/// Queue up, take the stage and submit the rant
fn take_the_stage(stage: &mut StageController, args: &CliArgs) {
    if let Err(e) = stage.join_queue().and_then(|_| stage.advance_queue()) {
        warn!("Could not take the stage: {}", e);
        return;
    }
    if !stage.is_local_speaking() {
        warn!("Someone else holds the stage");
        return;
    }

    if args.recording.is_some() {
        match stage.start_recording().and_then(|_| stage.finish_recording()) {
            Ok(()) => return,
            Err(e) => warn!("Voice rant failed, falling back to text: {}", e),
        }
    }

    let text = args.rant_text.as_deref().unwrap_or(FALLBACK_RANT);
    if let Err(e) = stage.submit_text_rant(text, None) {
        warn!("Rant rejected: {}", e);
    }
}

/// Print a one-line stage status
fn print_status(stage: &StageController, second: u64) {
    let speaker = match stage.phase() {
        StagePhase::ExampleDemo => format!("example rant, {}s left", stage.demo_time_left().unwrap_or(0)),
        StagePhase::UserSpeaking => match stage.time_left() {
            Some(left) => format!("{} speaking, {}s left", stage.local_user().nickname, left),
            None => format!("{} choosing a rant", stage.local_user().nickname),
        },
        phase => phase.to_string(),
    };

    println!(
        "[{:>4}s] {} | cringe {:>3}% | {} reactions | {} connected",
        second,
        speaker,
        stage.cringe_percentage(),
        stage.reactions().len(),
        stage.connected_users().len()
    );
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &StageConfig, args: &CliArgs) {
    eprintln!("r/Soapbox Stage");
    eprintln!("===============");
    eprintln!("Queue up, rant for {} seconds, survive the cringe meter", config.rant_duration_secs);
    eprintln!();

    print_configuration_summary(config, args);
}

/// Print configuration summary
fn print_configuration_summary(config: &StageConfig, args: &CliArgs) {
    eprintln!("Configuration:");
    eprintln!("  Rant Duration: {}s", config.rant_duration_secs);
    eprintln!("  Example Demo Duration: {}s", config.demo_duration_secs);
    eprintln!("  Cringe Window: last {} reactions", config.cringe_window);
    eprintln!("  Eject Threshold: {}%", config.eject_threshold);
    eprintln!("  Audience Size: {} - {}", config.min_audience, config.max_audience);
    eprintln!(
        "  Reaction Cadence: {}ms @ {:.0}% (demo {}ms @ {:.0}%)",
        config.reaction_interval_ms,
        config.reaction_probability * 100.0,
        config.demo_reaction_interval_ms,
        config.demo_reaction_probability * 100.0
    );
    eprintln!(
        "  Speech: {}",
        if config.speech.has_valid_api_key() { config.speech.base_url.as_str() } else { "disabled" }
    );
    eprintln!("  Simulated Run: {}s{}", args.duration_secs, if args.realtime { " (realtime)" } else { "" });
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed: {}", seed);
    }
    eprintln!();
}

/// Print the end-of-run report
fn print_final_statistics(statistics: &StageStatistics) {
    eprintln!("\n{}", statistics.generate_summary_report());
}
