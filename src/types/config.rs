//! Configuration structures for the stage engine
//!
//! This module contains the stage configuration, the command line surface of
//! the `soapbox` binary and the validation logic that keeps timer cadences,
//! audience sizes and probabilities within sensible ranges.

use super::RantSort;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Stage timing and meter constants
pub mod stage {
    /// Length of a user rant once content is submitted
    pub const RANT_DURATION_SECS: u32 = 60;

    /// Length of the scripted example rant
    pub const DEMO_DURATION_SECS: u32 = 45;

    /// Number of most recent reactions the cringe meter looks at
    pub const CRINGE_WINDOW: usize = 20;

    /// Number of reactions retained in the live log
    pub const REACTION_LOG_CAPACITY: usize = 50;

    /// Cringe percentage that ejects the speaker
    pub const EJECT_THRESHOLD: u8 = 100;

    /// Maximum characters accepted for a text rant
    pub const MAX_RANT_CHARS: usize = 1000;

    /// Speech rate used to estimate text rant duration
    pub const CHARS_PER_SECOND: usize = 12;
}

/// Default model used by the text-to-speech provider
pub const DEFAULT_SPEECH_MODEL: &str = "eleven_monolingual_v1";

/// Default base URL of the text-to-speech provider
pub const DEFAULT_SPEECH_BASE_URL: &str = "https://api.elevenlabs.io";

/// Text-to-speech provider settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeechConfig {
    /// Provider API key; never written back out
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Provider base URL
    pub base_url: String,
    /// Provider model identifier
    pub model_id: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_SPEECH_BASE_URL.to_string(),
            model_id: DEFAULT_SPEECH_MODEL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl SpeechConfig {
    /// Whether the API key looks like a real credential rather than a placeholder
    pub fn has_valid_api_key(&self) -> bool {
        self.api_key.as_deref().map(is_valid_api_key).unwrap_or(false)
    }
}

/// Check that an API key is present and not a template placeholder
pub fn is_valid_api_key(key: &str) -> bool {
    !key.trim().is_empty() && !key.contains("your_") && !key.contains("_here") && key.len() > 10
}

/// Command line surface of the `soapbox` binary
#[derive(Debug, Clone, Parser)]
#[command(
    name = "soapbox",
    version,
    about = "r/Soapbox stage engine - queue up, rant for 60 seconds, survive the cringe meter",
    long_about = "Runs an r/Soapbox stage on a virtual clock with a simulated live audience. The audience reacts with emoji; if the cringe meter reaches 100% while you are speaking you get ejected.

EXAMPLES:
    # Watch the example rant and an idle stage for two minutes
    soapbox --duration-secs 120

    # Take the stage after 10 seconds and rant
    soapbox --nickname RantMaster --speak-at 10 --rant-text \"Turn signals are free!\"

    # Browse the Hall of Howls
    soapbox --hall --search pizza --sort popular

    # Dump the defaults, edit, then run with them
    soapbox --print-config > stage.json
    soapbox --config stage.json --seed 7

Settings given on the command line win over the --config JSON file, which
wins over the built-in defaults. Unset file fields keep their defaults."
)]
pub struct CliArgs {
    /// JSON stage settings file
    #[arg(short, long, value_name = "FILE", help = "Stage settings file (.json)")]
    pub config: Option<String>,

    /// Seed for the audience generator
    #[arg(long, help = "Seed that makes the simulated audience reproducible")]
    pub seed: Option<u64>,

    /// Path of the persisted local store
    #[arg(
        long,
        help = "Path of the local store JSON file",
        long_help = "Path of the JSON file that persists the signed-in identity and the seen-example flag. Without it state lives in memory only."
    )]
    pub store_path: Option<String>,

    /// Text-to-speech API key
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true, help = "Text-to-speech API key")]
    pub api_key: Option<String>,

    /// Text-to-speech base URL
    #[arg(long, help = "Text-to-speech provider base URL")]
    pub speech_base_url: Option<String>,

    /// Seconds a submitted rant lasts
    #[arg(long, help = "Rant countdown length in seconds")]
    pub rant_duration_secs: Option<u32>,

    /// Seconds the example rant lasts
    #[arg(long, help = "Example rant length in seconds")]
    pub demo_duration_secs: Option<u32>,

    /// Nickname to sign in with
    #[arg(long, help = "Nickname to sign in with")]
    pub nickname: Option<String>,

    /// Text of the rant to deliver
    #[arg(long, help = "Text rant to submit once on stage")]
    pub rant_text: Option<String>,

    /// Pre-recorded audio file used as the microphone
    #[arg(
        long,
        help = "Audio file used as the microphone",
        long_help = "Path of an audio file that stands in for microphone capture. When set, the rant is submitted in voice mode."
    )]
    pub recording: Option<String>,

    /// Simulated second at which the local user queues and takes the stage
    #[arg(long, help = "Simulated second at which to take the stage")]
    pub speak_at: Option<u64>,

    /// Total simulated seconds to run
    #[arg(long, default_value = "120", help = "Simulated seconds to run")]
    pub duration_secs: u64,

    /// Pace the virtual clock against the wall clock
    #[arg(long, help = "Run at wall-clock speed instead of as fast as possible")]
    pub realtime: bool,

    /// Directory receiving played audio clips
    #[arg(long, help = "Directory that receives played audio clips")]
    pub audio_out: Option<String>,

    /// Treat this client as one that has already seen the example rant
    #[arg(long, help = "Skip the example rant")]
    pub seen_example: bool,

    /// Query the Hall of Howls instead of running the stage
    #[arg(long, help = "List archived rants from the Hall of Howls")]
    pub hall: bool,

    /// Hall of Howls search term
    #[arg(long, help = "Search term for the Hall of Howls")]
    pub search: Option<String>,

    /// Hall of Howls sort order
    #[arg(long, default_value = "recent", help = "Sort order: recent, popular, longest, controversial")]
    pub sort: RantSort,

    /// INFO level logs with span events
    #[arg(short, long, help = "Log stage events at INFO level")]
    pub verbose: bool,

    /// DEBUG level logs with span events
    #[arg(short, long, help = "Log timer and reaction detail at DEBUG level")]
    pub debug: bool,

    /// Emit JSON logs
    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    /// Write logs to a rolling file in this directory
    #[arg(long, help = "Directory for rolling log files")]
    pub log_dir: Option<String>,

    /// Dry run mode - validate configuration without running the stage
    #[arg(long, help = "Validate configuration without running the stage")]
    pub dry_run: bool,

    /// Dump the default settings as JSON
    #[arg(long, help = "Print the default stage settings as JSON and exit")]
    pub print_config: bool,
}

/// Stage settings as read from disk; every field is optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Seconds a submitted rant lasts
    pub rant_duration_secs: Option<u32>,
    /// Seconds the example rant lasts
    pub demo_duration_secs: Option<u32>,
    /// Reactions considered by the cringe meter
    pub cringe_window: Option<usize>,
    /// Reactions retained in the live log
    pub reaction_log_capacity: Option<usize>,
    /// Cringe percentage that ejects the speaker
    pub eject_threshold: Option<u8>,
    /// Smallest simulated audience
    pub min_audience: Option<usize>,
    /// Largest simulated audience
    pub max_audience: Option<usize>,
    /// Seconds between audience re-rolls
    pub audience_refresh_secs: Option<u32>,
    /// Reaction generator period outside the demo
    pub reaction_interval_ms: Option<u64>,
    /// Reaction probability per tick outside the demo
    pub reaction_probability: Option<f64>,
    /// Reaction generator period during the demo
    pub demo_reaction_interval_ms: Option<u64>,
    /// Reaction probability per tick during the demo
    pub demo_reaction_probability: Option<f64>,
    /// Maximum characters in a text rant
    pub max_rant_chars: Option<usize>,
    /// Speech rate used for duration estimates
    pub chars_per_second: Option<usize>,
    /// Random seed
    pub seed: Option<u64>,
    /// Path of the persisted local store
    pub store_path: Option<String>,
    /// Text-to-speech settings
    pub speech: Option<SpeechConfig>,
}

/// Configuration for a stage instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageConfig {
    /// Seconds a submitted rant lasts
    pub rant_duration_secs: u32,
    /// Seconds the example rant lasts
    pub demo_duration_secs: u32,
    /// Reactions considered by the cringe meter
    pub cringe_window: usize,
    /// Reactions retained in the live log
    pub reaction_log_capacity: usize,
    /// Cringe percentage that ejects the speaker
    pub eject_threshold: u8,
    /// Smallest simulated audience
    pub min_audience: usize,
    /// Largest simulated audience
    pub max_audience: usize,
    /// Seconds between audience re-rolls
    pub audience_refresh_secs: u32,
    /// Reaction generator period outside the demo
    pub reaction_interval_ms: u64,
    /// Reaction probability per tick outside the demo (0.0-1.0)
    pub reaction_probability: f64,
    /// Reaction generator period during the demo
    pub demo_reaction_interval_ms: u64,
    /// Reaction probability per tick during the demo (0.0-1.0)
    pub demo_reaction_probability: f64,
    /// Maximum characters in a text rant
    pub max_rant_chars: usize,
    /// Speech rate used for duration estimates
    pub chars_per_second: usize,
    /// Random seed for reproducible audiences
    pub seed: Option<u64>,
    /// Path of the persisted local store
    pub store_path: Option<String>,
    /// Text-to-speech settings
    pub speech: SpeechConfig,
}

/// Failure to load stage settings from disk
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No file at the given path
    #[error("no stage settings at {}", .0.display())]
    Missing(PathBuf),

    /// Only `.json` settings are understood
    #[error("stage settings must be a .json file, got {0:?}")]
    NotJson(String),

    /// Reading the file failed
    #[error("could not read stage settings: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid settings JSON
    #[error("malformed stage settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// A stage setting that would break the timers, meter or audience
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// A countdown, period or size is zero
    #[error("{field} must be greater than 0")]
    ZeroValue {
        /// Name of the offending field
        field: &'static str,
    },

    /// Window is empty or larger than the retained log
    #[error("cringe window {window} must be between 1 and the log capacity {capacity}")]
    CringeWindow {
        /// Configured window
        window: usize,
        /// Configured log capacity
        capacity: usize,
    },

    /// Text limit above what the speech provider accepts
    #[error("max_rant_chars {0} exceeds the speech limit of {limit}", limit = stage::MAX_RANT_CHARS)]
    RantTooLong(usize),

    /// Empty audience or min above max
    #[error("audience range {0}..={1} is empty or starts at 0")]
    AudienceRange(usize, usize),

    /// Threshold outside `1..=100`
    #[error("eject threshold {0}% must be between 1 and 100")]
    EjectThreshold(u8),

    /// Reaction probability outside `0.0..=1.0`
    #[error("{field} = {value} is not a probability")]
    Probability {
        /// Name of the offending field
        field: &'static str,
        /// Rejected value
        value: f64,
    },
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            rant_duration_secs: stage::RANT_DURATION_SECS,
            demo_duration_secs: stage::DEMO_DURATION_SECS,
            cringe_window: stage::CRINGE_WINDOW,
            reaction_log_capacity: stage::REACTION_LOG_CAPACITY,
            eject_threshold: stage::EJECT_THRESHOLD,
            min_audience: 5,
            max_audience: 12,
            audience_refresh_secs: 45,
            reaction_interval_ms: 3000,
            reaction_probability: 0.2,
            demo_reaction_interval_ms: 1200,
            demo_reaction_probability: 0.7,
            max_rant_chars: stage::MAX_RANT_CHARS,
            chars_per_second: stage::CHARS_PER_SECOND,
            seed: None,
            store_path: None,
            speech: SpeechConfig::default(),
        }
    }
}

impl StageConfig {
    /// Defaults, then the `--config` file, then command line overrides
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = match args.config.as_deref() {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        Ok(config)
    }

    /// Load settings from a `.json` file; absent fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        if extension != "json" {
            return Err(ConfigError::NotJson(extension.to_string()));
        }

        let partial: ConfigFile = serde_json::from_str(&fs::read_to_string(path)?)?;
        Ok(Self::default().merged_with(partial))
    }

    fn merged_with(self, file: ConfigFile) -> Self {
        Self {
            rant_duration_secs: file.rant_duration_secs.unwrap_or(self.rant_duration_secs),
            demo_duration_secs: file.demo_duration_secs.unwrap_or(self.demo_duration_secs),
            cringe_window: file.cringe_window.unwrap_or(self.cringe_window),
            reaction_log_capacity: file.reaction_log_capacity.unwrap_or(self.reaction_log_capacity),
            eject_threshold: file.eject_threshold.unwrap_or(self.eject_threshold),
            min_audience: file.min_audience.unwrap_or(self.min_audience),
            max_audience: file.max_audience.unwrap_or(self.max_audience),
            audience_refresh_secs: file.audience_refresh_secs.unwrap_or(self.audience_refresh_secs),
            reaction_interval_ms: file.reaction_interval_ms.unwrap_or(self.reaction_interval_ms),
            reaction_probability: file.reaction_probability.unwrap_or(self.reaction_probability),
            demo_reaction_interval_ms: file
                .demo_reaction_interval_ms
                .unwrap_or(self.demo_reaction_interval_ms),
            demo_reaction_probability: file
                .demo_reaction_probability
                .unwrap_or(self.demo_reaction_probability),
            max_rant_chars: file.max_rant_chars.unwrap_or(self.max_rant_chars),
            chars_per_second: file.chars_per_second.unwrap_or(self.chars_per_second),
            seed: file.seed.or(self.seed),
            store_path: file.store_path.or(self.store_path),
            speech: file.speech.unwrap_or(self.speech),
        }
    }

    fn apply_overrides(&mut self, args: CliArgs) {
        self.seed = args.seed.or(self.seed);
        self.store_path = args.store_path.or(self.store_path.take());
        if let Some(key) = args.api_key {
            self.speech.api_key = Some(key);
        }
        if let Some(url) = args.speech_base_url {
            self.speech.base_url = url;
        }
        self.rant_duration_secs = args.rant_duration_secs.unwrap_or(self.rant_duration_secs);
        self.demo_duration_secs = args.demo_duration_secs.unwrap_or(self.demo_duration_secs);
    }

    /// Write the settings as pretty JSON; the API key is left out
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.print_json()?)?;
        Ok(())
    }

    /// Settings as pretty JSON, without the API key
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings the stage cannot run with
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let non_zero = [
            ("rant_duration_secs", u64::from(self.rant_duration_secs)),
            ("demo_duration_secs", u64::from(self.demo_duration_secs)),
            ("audience_refresh_secs", u64::from(self.audience_refresh_secs)),
            ("reaction_interval_ms", self.reaction_interval_ms),
            ("demo_reaction_interval_ms", self.demo_reaction_interval_ms),
            ("max_rant_chars", self.max_rant_chars as u64),
            ("chars_per_second", self.chars_per_second as u64),
        ];
        if let Some((field, _)) = non_zero.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigValidationError::ZeroValue { field });
        }

        if self.max_rant_chars > stage::MAX_RANT_CHARS {
            return Err(ConfigValidationError::RantTooLong(self.max_rant_chars));
        }

        if !(1..=self.reaction_log_capacity).contains(&self.cringe_window) {
            return Err(ConfigValidationError::CringeWindow {
                window: self.cringe_window,
                capacity: self.reaction_log_capacity,
            });
        }

        if self.min_audience == 0 || self.min_audience > self.max_audience {
            return Err(ConfigValidationError::AudienceRange(self.min_audience, self.max_audience));
        }

        if !(1..=100).contains(&self.eject_threshold) {
            return Err(ConfigValidationError::EjectThreshold(self.eject_threshold));
        }

        check_probability("reaction_probability", self.reaction_probability)?;
        check_probability("demo_reaction_probability", self.demo_reaction_probability)
    }

    /// Inclusive audience size bounds
    pub fn audience_range(&self) -> (usize, usize) {
        (self.min_audience, self.max_audience)
    }

    /// Estimated speaking time of a text rant, rounded up to whole seconds
    pub fn estimate_text_duration(&self, text: &str) -> u32 {
        let chars = text.chars().count();
        let per_second = self.chars_per_second.max(1);
        chars.div_ceil(per_second) as u32
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigValidationError::Probability { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn bare_args() -> CliArgs {
        CliArgs::parse_from(["soapbox"])
    }

    #[test]
    fn test_stage_config_default() {
        let config = StageConfig::default();

        assert_eq!(config.rant_duration_secs, 60);
        assert_eq!(config.demo_duration_secs, 45);
        assert_eq!(config.cringe_window, 20);
        assert_eq!(config.reaction_log_capacity, 50);
        assert_eq!(config.eject_threshold, 100);
        assert_eq!(config.audience_range(), (5, 12));
        assert_eq!(config.reaction_interval_ms, 3000);
        assert_eq!(config.demo_reaction_interval_ms, 1200);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_loading() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"rant_duration_secs": 30, "seed": 7, "max_audience": 20}}"#).unwrap();

        let config = StageConfig::from_file(file.path()).unwrap();
        assert_eq!(config.rant_duration_secs, 30);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_audience, 20);
        // Untouched fields keep their defaults
        assert_eq!(config.demo_duration_secs, 45);
    }

    #[test]
    fn test_config_file_missing() {
        let err = StageConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref path) if path.ends_with("here.json")));
    }

    #[test]
    fn test_config_file_unsupported_format() {
        let file = Builder::new().suffix(".yaml").tempfile().unwrap();
        match StageConfig::from_file(file.path()) {
            Err(ConfigError::NotJson(ext)) => assert_eq!(ext, "yaml"),
            other => panic!("yaml settings should be refused, got {:?}", other),
        }
    }

    #[test]
    fn test_saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stage.json");
        let mut config = StageConfig { seed: Some(9), min_audience: 2, ..Default::default() };
        config.speech.api_key = Some("sk_0123456789abcdef".to_string());

        config.save(&path).unwrap();
        let loaded = StageConfig::from_file(&path).unwrap();
        assert_eq!(loaded.seed, Some(9));
        assert_eq!(loaded.min_audience, 2);
        assert!(loaded.speech.api_key.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let mut args = bare_args();
        args.seed = Some(42);
        args.rant_duration_secs = Some(10);
        args.api_key = Some("sk_live_1234567890".to_string());

        let config = StageConfig::from_cli_args(args).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.rant_duration_secs, 10);
        assert!(config.speech.has_valid_api_key());
    }

    #[test]
    fn test_validation_audience_range() {
        let config = StageConfig { min_audience: 8, max_audience: 3, ..Default::default() };
        match config.validate() {
            Err(ConfigValidationError::AudienceRange(8, 3)) => {}
            other => panic!("inverted audience range accepted: {:?}", other),
        }
    }

    #[test]
    fn test_validation_cringe_window() {
        let config = StageConfig { cringe_window: 60, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::CringeWindow { window: 60, capacity: 50 })
        ));
    }

    #[test]
    fn test_validation_probability() {
        let config = StageConfig { demo_reaction_probability: 1.5, ..Default::default() };
        match config.validate() {
            Err(ConfigValidationError::Probability { field, value }) => {
                assert_eq!(field, "demo_reaction_probability");
                assert!((value - 1.5).abs() < f64::EPSILON);
            }
            other => panic!("probability 1.5 accepted: {:?}", other),
        }
    }

    #[test]
    fn test_validation_zero_duration() {
        let config = StageConfig { rant_duration_secs: 0, ..Default::default() };
        match config.validate() {
            Err(ConfigValidationError::ZeroValue { field }) => assert_eq!(field, "rant_duration_secs"),
            other => panic!("zero rant length accepted: {:?}", other),
        }
    }

    #[test]
    fn test_rant_limit_capped_by_speech_limit() {
        let config = StageConfig { max_rant_chars: 1500, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigValidationError::RantTooLong(1500))));

        let config = StageConfig { max_rant_chars: 280, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_key_placeholder_detection() {
        assert!(!is_valid_api_key(""));
        assert!(!is_valid_api_key("   "));
        assert!(!is_valid_api_key("your_api_key"));
        assert!(!is_valid_api_key("put_key_here_please"));
        assert!(!is_valid_api_key("short"));
        assert!(is_valid_api_key("sk_0123456789abcdef"));
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let mut config = StageConfig::default();
        config.speech.api_key = Some("sk_0123456789abcdef".to_string());

        let json = config.print_json().unwrap();
        assert!(!json.contains("sk_0123456789abcdef"));
    }

    #[test]
    fn test_text_duration_estimate() {
        let config = StageConfig::default();
        assert_eq!(config.estimate_text_duration(""), 0);
        assert_eq!(config.estimate_text_duration("abcdefghijkl"), 1);
        assert_eq!(config.estimate_text_duration("abcdefghijklm"), 2);
    }
}
