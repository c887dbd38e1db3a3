use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// How the ghost moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    #[default]
    Roam,
    Follow,
    Static,
}

impl Behavior {
    pub fn label(self) -> &'static str {
        match self {
            Behavior::Roam => "roam",
            Behavior::Follow => "follow",
            Behavior::Static => "static",
        }
    }
}

/// Speed tier; sets the scheduler periods and the roam step range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedTier {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SpeedTier {
    /// Base period in milliseconds that every behavior interval derives from.
    pub fn base_period_ms(self) -> u64 {
        match self {
            SpeedTier::Slow => 15_000,
            SpeedTier::Normal => 12_000,
            SpeedTier::Fast => 8_000,
        }
    }

    /// Roam step magnitude range (percent per tick).
    pub fn step_range(self) -> (f32, f32) {
        match self {
            SpeedTier::Slow => (3.0, 8.0),
            SpeedTier::Normal => (5.0, 10.0),
            SpeedTier::Fast => (8.0, 15.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTier {
    Small,
    #[default]
    Medium,
    Large,
}

/// Resting expression requested by the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodHint {
    #[default]
    Normal,
    Happy,
    Sad,
    Surprised,
}

/// Per-mount configuration. Replaced as a whole on reconfiguration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GhostConfig {
    /// Page identity; changing it reseeds the ghost.
    pub identity: String,
    /// Container to roam in. Falls back to the viewport when unresolvable.
    pub frame_id: Option<String>,
    pub behavior: Behavior,
    pub mood: MoodHint,
    pub speed: SpeedTier,
    pub size: SizeTier,
    /// Sparkles and trail particles.
    pub effects: bool,
    pub z_index: i32,
    pub debug: bool,
    pub interactive: bool,
    pub responsive_scale: bool,
    /// Forced appearance; `None` follows the theme signal.
    pub dark_mode: Option<bool>,
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            identity: "default".to_string(),
            frame_id: None,
            behavior: Behavior::Roam,
            mood: MoodHint::Normal,
            speed: SpeedTier::Normal,
            size: SizeTier::Medium,
            effects: true,
            z_index: 50,
            debug: false,
            interactive: true,
            responsive_scale: true,
            dark_mode: None,
        }
    }
}

impl GhostConfig {
    /// Whether moving from `self` to `next` must tear down the behavior regime.
    pub fn needs_reschedule(&self, next: &GhostConfig) -> bool {
        self.behavior != next.behavior || self.speed != next.speed
    }

    /// Whether moving from `self` to `next` must reseed position and direction.
    pub fn needs_reseed(&self, next: &GhostConfig) -> bool {
        self.frame_id != next.frame_id
            || self.identity != next.identity
            || self.effects != next.effects
    }

    /// Parse one config object or a list of them.
    pub fn parse_all(json: &str) -> Result<Vec<GhostConfig>, ConfigError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            Many(Vec<GhostConfig>),
            One(GhostConfig),
        }

        let configs = match serde_json::from_str::<OneOrMany>(json)? {
            OneOrMany::Many(list) => list,
            OneOrMany::One(config) => vec![config],
        };
        if configs.is_empty() {
            return Err(ConfigError::Empty);
        }
        Ok(configs)
    }

    pub fn load_all(path: &Path) -> Result<Vec<GhostConfig>, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_all(&text)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read ghost config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid ghost config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ghost config lists no ghosts")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let configs = GhostConfig::parse_all("{}").unwrap();
        assert_eq!(configs, vec![GhostConfig::default()]);
    }

    #[test]
    fn parses_list_with_overrides() {
        let json = r#"[
            {"identity": "home", "behavior": "static", "speed": "fast"},
            {"frame_id": "chat-panel", "size": "large", "effects": false, "dark_mode": true}
        ]"#;
        let configs = GhostConfig::parse_all(json).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].identity, "home");
        assert_eq!(configs[0].behavior, Behavior::Static);
        assert_eq!(configs[0].speed, SpeedTier::Fast);
        assert_eq!(configs[1].frame_id.as_deref(), Some("chat-panel"));
        assert_eq!(configs[1].size, SizeTier::Large);
        assert!(!configs[1].effects);
        assert_eq!(configs[1].dark_mode, Some(true));
        assert_eq!(configs[1].z_index, 50);
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(matches!(GhostConfig::parse_all("[]"), Err(ConfigError::Empty)));
    }

    #[test]
    fn unknown_behavior_is_a_json_error() {
        let err = GhostConfig::parse_all(r#"{"behavior": "teleport"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn reschedule_and_reseed_triggers() {
        let base = GhostConfig::default();

        let mut faster = base.clone();
        faster.speed = SpeedTier::Fast;
        assert!(base.needs_reschedule(&faster));
        assert!(!base.needs_reseed(&faster));

        let mut moved = base.clone();
        moved.frame_id = Some("sidebar".into());
        assert!(moved.needs_reseed(&base));
        assert!(!moved.needs_reschedule(&base));

        let mut layered = base.clone();
        layered.z_index = 10;
        assert!(!base.needs_reschedule(&layered));
        assert!(!base.needs_reseed(&layered));
    }

    #[test]
    fn speed_tiers_order_periods() {
        assert!(SpeedTier::Slow.base_period_ms() > SpeedTier::Normal.base_period_ms());
        assert!(SpeedTier::Normal.base_period_ms() > SpeedTier::Fast.base_period_ms());
        assert_eq!(SpeedTier::Fast.step_range(), (8.0, 15.0));
    }
}
