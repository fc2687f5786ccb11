/// Combat configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Damage dealt by one combo hit before the row's damage multiplier.
    pub base_attack_damage: f32,
    /// Distance ahead of the attacker where the combo hit sphere is centred.
    pub hit_sphere_offset: f32,
    /// Radius of the combo hit sphere.
    pub hit_sphere_radius: f32,
    /// Charge attack launch speed as a multiple of the enemy move speed.
    pub charge_speed_multiplier: f32,
    /// Seconds until a charging enemy may charge again.
    pub charge_duration: f32,
    /// Seconds a dead enemy stays in the world before it is destroyed.
    pub corpse_lifespan: f32,
}

impl CombatConfig {
    // ===== compile-time constants =====
    /// Highest reachable combo step. Advancing past it ends the combo.
    pub const MAX_COMBO_STEP: u8 = 5;
    /// Magnitudes at or below this absolute value are treated as zero.
    pub const NEARLY_ZERO: f32 = 1e-8;
    /// Maximum number of boss patterns a single boss can unlock.
    pub const MAX_BOSS_PATTERNS: usize = 8;

    // ===== data-table row names =====
    pub const BASE_STAT_ROW: &'static str = "InitBaseStat";
    pub const ACTION_COST_ROW: &'static str = "InitActionCost";
    pub const OVERCLOCK_ROW: &'static str = "InitOverclock";
    pub const ENEMY_BASE_STAT_ROW: &'static str = "EnemyBaseStatInit";
    pub const ENEMY_RANGED_STAT_ROW: &'static str = "EnemyRangedStatInit";
    pub const BOSS_PHASE_ROW: &'static str = "BossPhaseInit";

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_BASE_ATTACK_DAMAGE: f32 = 10.0;
    pub const DEFAULT_HIT_SPHERE_OFFSET: f32 = 100.0;
    pub const DEFAULT_HIT_SPHERE_RADIUS: f32 = 80.0;
    pub const DEFAULT_CHARGE_SPEED_MULTIPLIER: f32 = 2.5;
    pub const DEFAULT_CHARGE_DURATION: f32 = 0.5;
    pub const DEFAULT_CORPSE_LIFESPAN: f32 = 5.0;

    pub fn new() -> Self {
        Self {
            base_attack_damage: Self::DEFAULT_BASE_ATTACK_DAMAGE,
            hit_sphere_offset: Self::DEFAULT_HIT_SPHERE_OFFSET,
            hit_sphere_radius: Self::DEFAULT_HIT_SPHERE_RADIUS,
            charge_speed_multiplier: Self::DEFAULT_CHARGE_SPEED_MULTIPLIER,
            charge_duration: Self::DEFAULT_CHARGE_DURATION,
            corpse_lifespan: Self::DEFAULT_CORPSE_LIFESPAN,
        }
    }

    pub fn with_base_attack_damage(mut self, damage: f32) -> Self {
        self.base_attack_damage = damage;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns true if `value` is close enough to zero to be ignored.
#[inline]
pub fn is_nearly_zero(value: f32) -> bool {
    value.abs() <= CombatConfig::NEARLY_ZERO
}
