//! Tag-to-attribute registry.
//!
//! Effects name the attribute they modify by tag. Resolving a tag happens on
//! every hit, so the mapping is built once per process from the static
//! [`ATTRIBUTE_TAGS`] table and then read without locking.

use std::collections::HashMap;

use once_cell::sync::OnceCell;
use strum::EnumCount;

use super::Attribute;
use crate::tags::GameplayTag;
use crate::tags::native::stats;

/// Every `(tag, attribute)` pair known to the effect engine.
pub const ATTRIBUTE_TAGS: [(GameplayTag, Attribute); Attribute::COUNT] = [
    (stats::HEALTH, Attribute::Health),
    (stats::MAX_HEALTH, Attribute::MaxHealth),
    (stats::MOVEMENT_SPEED, Attribute::MovementSpeed),
    (stats::STAMINA, Attribute::Stamina),
    (stats::MAX_STAMINA, Attribute::MaxStamina),
    (stats::STAMINA_REGEN_RATE, Attribute::StaminaRegenRate),
    (stats::CHRONOS, Attribute::Chronos),
    (stats::MAX_CHRONOS, Attribute::MaxChronos),
    (stats::OVERCLOCK_POINT, Attribute::OverclockPoint),
    (stats::MAX_OVERCLOCK_POINT, Attribute::MaxOverclockPoint),
];

static GLOBAL: OnceCell<AttributeRegistry> = OnceCell::new();

/// Read-only mapping from attribute-selector tag to attribute slot.
///
/// # One-time build
///
/// [`AttributeRegistry::global`] builds the process-wide instance on first use
/// and returns the same instance for the rest of the process. The attribute set
/// is fixed at compile time, so the registry never needs rebuilding.
#[derive(Debug)]
pub struct AttributeRegistry {
    by_tag: HashMap<GameplayTag, Attribute>,
}

impl AttributeRegistry {
    /// Returns the process-wide registry, building it on first access.
    pub fn global() -> &'static AttributeRegistry {
        GLOBAL.get_or_init(|| {
            let registry = Self::build();
            tracing::debug!(
                target: "combat::attributes",
                entries = registry.len(),
                "attribute registry built"
            );
            registry
        })
    }

    /// Builds a registry from [`ATTRIBUTE_TAGS`].
    pub fn build() -> Self {
        Self {
            by_tag: ATTRIBUTE_TAGS.into_iter().collect(),
        }
    }

    /// Resolves a tag to its attribute. `None` for unmapped tags.
    #[inline]
    pub fn lookup(&self, tag: &GameplayTag) -> Option<Attribute> {
        self.by_tag.get(tag).copied()
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_attribute_resolves_from_its_tag() {
        let registry = AttributeRegistry::build();
        assert_eq!(registry.len(), Attribute::COUNT);
        for attribute in Attribute::iter() {
            assert_eq!(registry.lookup(&attribute.data_tag()), Some(attribute));
        }
    }

    #[test]
    fn tags_follow_namespace_convention() {
        for (tag, attribute) in ATTRIBUTE_TAGS {
            assert_eq!(tag.as_str(), format!("Data.Stats.{attribute}"));
        }
    }

    #[test]
    fn unmapped_tags_resolve_to_none() {
        let registry = AttributeRegistry::build();
        assert_eq!(registry.lookup(&stats::ATTACK_SPEED), None);
        assert_eq!(
            registry.lookup(&GameplayTag::from_static("State.Dead")),
            None
        );
    }

    #[test]
    fn owned_and_static_tags_hash_identically() {
        let owned = GameplayTag::request("Data.Stats.Stamina").expect("valid tag");
        assert_eq!(
            AttributeRegistry::global().lookup(&owned),
            Some(Attribute::Stamina)
        );
    }

    #[test]
    fn global_is_built_once() {
        let first = AttributeRegistry::global() as *const _;
        let second = AttributeRegistry::global() as *const _;
        assert_eq!(first, second);
    }
}
