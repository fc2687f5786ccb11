//! Enemy and boss rows.

/// Stats shared by every enemy archetype.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnemyBaseStatRow {
    pub max_health: f32,
    pub move_speed: f32,
    /// Perception radius handed to the AI layer.
    pub sight_radius: f32,
    pub attack_range: f32,
    /// Seconds between the attack warning and the hit (the perfect-dodge window).
    pub attack_warning_duration: f32,
    /// Health removed by one melee or projectile hit.
    pub attack_damage: f32,
}

impl Default for EnemyBaseStatRow {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            move_speed: 400.0,
            sight_radius: 1500.0,
            attack_range: 200.0,
            attack_warning_duration: 0.5,
            attack_damage: 10.0,
        }
    }
}

/// Extra stats for projectile-firing enemies.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnemyRangedStatRow {
    pub projectile_speed: f32,
    /// Seconds before an unspent projectile is removed.
    pub projectile_life_span: f32,
    /// Distance the AI tries to keep from its target.
    pub min_engagement_range: f32,
}

impl Default for EnemyRangedStatRow {
    fn default() -> Self {
        Self {
            projectile_speed: 1200.0,
            projectile_life_span: 5.0,
            min_engagement_range: 600.0,
        }
    }
}

/// Boss phase thresholds.
///
/// `phase_health_thresholds` holds health ratios in descending order; phase `n`
/// begins once the ratio drops to `phase_health_thresholds[n - 1]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BossPhaseRow {
    pub phase_health_thresholds: Vec<f32>,
    /// Seconds the boss ignores further phase checks after a transition.
    pub transition_duration: f32,
}

impl Default for BossPhaseRow {
    fn default() -> Self {
        Self {
            phase_health_thresholds: vec![0.7, 0.4],
            transition_duration: 2.0,
        }
    }
}

impl BossPhaseRow {
    /// Number of phases after the opening phase.
    pub fn phase_count(&self) -> usize {
        self.phase_health_thresholds.len()
    }
}
