/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
///
/// All temporal behavior in the core is driven by these values; tests
/// construct a `GameConfig::default()` and never touch the filesystem.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub rules: RulesConfig,
}

/// Every deferred transition in the simulation, in logical milliseconds.
#[derive(Clone, Debug)]
pub struct TimingConfig {
    /// Delay between bomb placement and detonation.
    pub fuse_ms: u64,
    /// Per-player minimum interval between placements.
    pub place_cooldown_ms: u64,
    /// Post-hit invulnerability window.
    pub invuln_ms: u64,
    /// How long blast cells stay rendered.
    pub blast_ms: u64,
    /// Delay between a block starting to crumble and the spawn roll.
    pub powerup_delay_ms: u64,
}

/// Starting stats for a freshly joined player.
#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub starting_lives: u32,
    pub starting_bombs: u32,
    pub starting_range: u32,
    pub starting_speed: f32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    rules: TomlRules,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_fuse")]
    fuse_ms: u64,
    #[serde(default = "default_cooldown")]
    place_cooldown_ms: u64,
    #[serde(default = "default_invuln")]
    invuln_ms: u64,
    #[serde(default = "default_blast")]
    blast_ms: u64,
    #[serde(default = "default_powerup_delay")]
    powerup_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_lives")]
    starting_lives: u32,
    #[serde(default = "default_bombs")]
    starting_bombs: u32,
    #[serde(default = "default_range")]
    starting_range: u32,
    #[serde(default = "default_speed")]
    starting_speed: f32,
}

// ── Defaults ──

fn default_fuse() -> u64 { 2000 }
fn default_cooldown() -> u64 { 1000 }
fn default_invuln() -> u64 { 2000 }
fn default_blast() -> u64 { 500 }
fn default_powerup_delay() -> u64 { 400 }

fn default_lives() -> u32 { 3 }
fn default_bombs() -> u32 { 1 }
fn default_range() -> u32 { 1 }
fn default_speed() -> f32 { 1.0 }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            fuse_ms: default_fuse(),
            place_cooldown_ms: default_cooldown(),
            invuln_ms: default_invuln(),
            blast_ms: default_blast(),
            powerup_delay_ms: default_powerup_delay(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            starting_lives: default_lives(),
            starting_bombs: default_bombs(),
            starting_range: default_range(),
            starting_speed: default_speed(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into_config()
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        load_toml(&candidate_dirs()).into_config()
    }
}

impl TomlConfig {
    fn into_config(self) -> GameConfig {
        GameConfig {
            timing: TimingConfig {
                fuse_ms: self.timing.fuse_ms,
                place_cooldown_ms: self.timing.place_cooldown_ms,
                invuln_ms: self.timing.invuln_ms,
                blast_ms: self.timing.blast_ms,
                powerup_delay_ms: self.timing.powerup_delay_ms,
            },
            rules: RulesConfig {
                starting_lives: self.rules.starting_lives,
                starting_bombs: self.rules.starting_bombs,
                starting_range: self.rules.starting_range,
                starting_speed: self.rules.starting_speed,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        log::warn!("config.toml parse error: {e}; using defaults");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_constants() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.timing.fuse_ms, 2000);
        assert_eq!(cfg.timing.place_cooldown_ms, 1000);
        assert_eq!(cfg.timing.invuln_ms, 2000);
        assert_eq!(cfg.timing.blast_ms, 500);
        assert_eq!(cfg.timing.powerup_delay_ms, 400);
        assert_eq!(cfg.rules.starting_lives, 3);
    }

    #[test]
    fn partial_toml_fills_missing_keys() {
        let cfg: TomlConfig = toml::from_str("[timing]\nfuse_ms = 1500\n").unwrap();
        assert_eq!(cfg.timing.fuse_ms, 1500);
        assert_eq!(cfg.timing.place_cooldown_ms, 1000);
        assert_eq!(cfg.rules.starting_lives, 3);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let cfg: TomlConfig = toml::from_str("").unwrap();
        let game = cfg.into_config();
        assert_eq!(game.timing.blast_ms, 500);
        assert_eq!(game.rules.starting_bombs, 1);
    }
}
