use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use brawl_engine::{LoopConfig, SimConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::script::{parse_script, ScriptCommand};
use super::AppError;

pub(crate) const CONFIG_ENV_VAR: &str = "BRAWL_CONFIG";
pub(crate) const SCRIPT_ENV_VAR: &str = "BRAWL_SCRIPT";
pub(crate) const SEED_ENV_VAR: &str = "BRAWL_SEED";
pub(crate) const TPS_ENV_VAR: &str = "BRAWL_TPS";

const DEFAULT_SEED: u64 = 1;
const BUILT_IN_SCRIPT_ORIGIN: &str = "<built-in demo>";
const BUILT_IN_SCRIPT: &str = "\
# Start a run, walk into the first wave and trade punches.
intent reset
tick 2
intent move_right
tick 45
intent stop
tick 20
snapshot
intent punch
tick 30
intent punch
tick 30
intent punch
tick 30
snapshot
frame 16 120
";

pub(crate) struct AppWiring {
    pub(crate) sim_config: SimConfig,
    pub(crate) loop_config: LoopConfig,
    pub(crate) seed: u64,
    pub(crate) script: Vec<ScriptCommand>,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Brawl Startup ===");

    let sim_config = match read_env(CONFIG_ENV_VAR)? {
        Some(path) => load_sim_config(Path::new(&path))?,
        None => SimConfig::default(),
    };
    let seed = match read_env(SEED_ENV_VAR)? {
        Some(raw) => parse_env_value(SEED_ENV_VAR, &raw, "an unsigned integer")?,
        None => DEFAULT_SEED,
    };
    let mut loop_config = LoopConfig::default();
    if let Some(raw) = read_env(TPS_ENV_VAR)? {
        let target_tps: u32 = parse_env_value(TPS_ENV_VAR, &raw, "a positive integer")?;
        if target_tps == 0 {
            return Err(AppError::InvalidEnvValue {
                var: TPS_ENV_VAR,
                expected: "a positive integer",
                value: raw,
            });
        }
        loop_config.target_tps = target_tps;
    }
    let script = match read_env(SCRIPT_ENV_VAR)? {
        Some(path) => load_script(Path::new(&path))?,
        None => built_in_script()?,
    };

    info!(
        seed,
        target_tps = loop_config.target_tps,
        commands = script.len(),
        "app_configured"
    );
    Ok(AppWiring {
        sim_config,
        loop_config,
        seed,
        script,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn read_env(var: &'static str) -> Result<Option<String>, AppError> {
    match env::var(var) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(AppError::EnvVar { var, source }),
    }
}

fn parse_env_value<T: FromStr>(
    var: &'static str,
    raw: &str,
    expected: &'static str,
) -> Result<T, AppError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AppError::InvalidEnvValue {
            var,
            expected,
            value: raw.to_string(),
        })
}

pub(crate) fn load_sim_config(path: &Path) -> Result<SimConfig, AppError> {
    let raw = fs::read_to_string(path).map_err(|source| AppError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    let config = serde_path_to_error::deserialize::<_, SimConfig>(&mut deserializer).map_err(
        |error| {
            let at = error.path().to_string();
            AppError::ConfigParse {
                path: path.to_path_buf(),
                at: if at.is_empty() { ".".to_string() } else { at },
                source: error.into_inner(),
            }
        },
    )?;
    info!(path = %path.display(), "sim_config_loaded");
    Ok(config)
}

pub(crate) fn load_script(path: &Path) -> Result<Vec<ScriptCommand>, AppError> {
    let raw = fs::read_to_string(path).map_err(|source| AppError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&raw).map_err(|source| AppError::Script {
        origin: path.display().to_string(),
        source,
    })
}

pub(crate) fn built_in_script() -> Result<Vec<ScriptCommand>, AppError> {
    parse_script(BUILT_IN_SCRIPT).map_err(|source| AppError::Script {
        origin: BUILT_IN_SCRIPT_ORIGIN.to_string(),
        source,
    })
}
