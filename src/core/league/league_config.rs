// League rule configuration.

use chrono::Duration;

/// Longest clock or clock extension the league accepts, in days.
pub const MAX_CLOCK_DAYS: i64 = 365;

/// Tunable league rules. Defaults match the current rulebook.
#[derive(Debug, Clone)]
pub struct LeagueConfig {
    /// Minimum roster size before a team can challenge or be challenged.
    pub min_roster: usize,

    /// Maximum roster size, counting pending invites.
    pub max_roster: usize,

    /// Captains per team, not counting the founder.
    pub max_captains: usize,

    /// Maps in each home map set.
    pub home_maps_per_set: usize,

    /// How long a clocked challenge has to be scheduled.
    pub clock_days: i64,

    /// How much an admin extension pushes a clock deadline back.
    pub clock_extension_days: i64,

    /// Clocks each team may put on challenges per season.
    pub clocks_per_season: u32,

    pub max_team_name_len: usize,

    pub max_tag_len: usize,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            min_roster: 2,
            max_roster: 8,
            max_captains: 2,
            home_maps_per_set: 3,
            clock_days: 28,
            clock_extension_days: 14,
            clocks_per_season: 2,
            max_team_name_len: 25,
            max_tag_len: 5,
        }
    }
}

impl LeagueConfig {
    /// Read `LEAGUE_*` overrides from the environment, keeping defaults for
    /// anything unset or unparsable.
    pub fn from_env() -> Self {
        fn var<T: std::str::FromStr>(name: &str, default: T) -> T {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse::<T>().ok())
                .unwrap_or(default)
        }

        let defaults = Self::default();
        Self {
            min_roster: var("LEAGUE_MIN_ROSTER", defaults.min_roster),
            max_roster: var("LEAGUE_MAX_ROSTER", defaults.max_roster),
            max_captains: var("LEAGUE_MAX_CAPTAINS", defaults.max_captains),
            home_maps_per_set: var("LEAGUE_HOME_MAPS", defaults.home_maps_per_set),
            clock_days: clock_days(
                "LEAGUE_CLOCK_DAYS",
                var("LEAGUE_CLOCK_DAYS", defaults.clock_days),
                defaults.clock_days,
            ),
            clock_extension_days: clock_days(
                "LEAGUE_CLOCK_EXTENSION_DAYS",
                var("LEAGUE_CLOCK_EXTENSION_DAYS", defaults.clock_extension_days),
                defaults.clock_extension_days,
            ),
            clocks_per_season: var("LEAGUE_CLOCKS_PER_SEASON", defaults.clocks_per_season),
            max_team_name_len: var("LEAGUE_MAX_TEAM_NAME_LEN", defaults.max_team_name_len),
            max_tag_len: var("LEAGUE_MAX_TAG_LEN", defaults.max_tag_len),
        }
    }

    pub fn clock_duration(&self) -> Duration {
        bounded_days(self.clock_days)
    }

    pub fn clock_extension(&self) -> Duration {
        bounded_days(self.clock_extension_days)
    }
}

/// Out-of-range clock lengths fall back to the default, like unparsable ones.
fn clock_days(name: &str, days: i64, default: i64) -> i64 {
    if (1..=MAX_CLOCK_DAYS).contains(&days) {
        days
    } else {
        tracing::warn!(
            setting = name,
            days,
            max = MAX_CLOCK_DAYS,
            "Clock length out of range, using the default"
        );
        default
    }
}

// The fields are public, so a hand-built config may still hold anything.
fn bounded_days(days: i64) -> Duration {
    let days = days.clamp(1, MAX_CLOCK_DAYS);
    Duration::try_days(days).unwrap_or_else(|| Duration::days(MAX_CLOCK_DAYS))
}
