//! Stack compatibility - may two item instances share one inventory stack?

use super::{ExtendedData, Extension, ItemInstance, UniqueKind};
use std::collections::HashMap;

/// Decide whether two extension states allow stacking
///
/// - Neither side extended: compatible.
/// - One side extended: compatible only if it carries no unique component.
/// - Both extended: every unique component of `b` needs an equal component
///   of the same kind on `a`, and `a` may not have unique components left
///   over. Duplicate unique kinds on `a` are never compatible.
pub fn extensions_compatible(a: Option<&ExtendedData>, b: Option<&ExtendedData>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(only), None) | (None, Some(only)) => !only.has_unique(),
        (Some(a), Some(b)) => {
            let mut uniques: HashMap<UniqueKind, &Extension> = HashMap::new();
            for (kind, component) in a.unique_components() {
                if uniques.insert(kind, component).is_some() {
                    return false;
                }
            }

            for (kind, component) in b.unique_components() {
                match uniques.remove(&kind) {
                    Some(other) if component.unique_eq(other) => {}
                    _ => return false,
                }
            }

            uniques.is_empty()
        }
    }
}

/// Whether `b` may be merged into a stack holding `a`
///
/// Only looks at extension state; `false` means "do not merge".
pub fn is_compatible(a: &ItemInstance, b: &ItemInstance) -> bool {
    extensions_compatible(a.extended.as_ref(), b.extended.as_ref())
}

/// Whether `item` can go onto `stack`: same kind, room left, compatible state
pub fn can_merge(stack: &ItemInstance, item: &ItemInstance) -> bool {
    stack.name == item.name && stack.free_space() > 0 && is_compatible(stack, item)
}

/// First stack in `candidates` that `item` can be merged into
pub fn find_stack<'a>(
    candidates: impl IntoIterator<Item = &'a ItemInstance>,
    item: &ItemInstance,
) -> Option<&'a ItemInstance> {
    candidates
        .into_iter()
        .find(|stack| stack.id != item.id && can_merge(stack, item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::BonusComponent;
    use crate::item::{BlueprintId, CrafterSignature};
    use crate::types::ItemId;

    fn meat(id: u64) -> ItemInstance {
        ItemInstance::new(ItemId(id), "cooked_meat", BlueprintId(0))
    }

    fn bonus(level: u32, perfect: bool) -> Extension {
        Extension::CookingBonus(BonusComponent::new(level, perfect))
    }

    #[test]
    fn test_plain_items_stack() {
        assert!(is_compatible(&meat(1), &meat(2)));
    }

    #[test]
    fn test_equal_bonuses_stack() {
        let a = meat(1).with_extension(bonus(50, false));
        let b = meat(2).with_extension(bonus(50, false));
        assert!(is_compatible(&a, &b));
    }

    #[test]
    fn test_perfect_mismatch_blocks() {
        let a = meat(1).with_extension(bonus(50, false));
        let b = meat(2).with_extension(bonus(50, true));
        assert!(!is_compatible(&a, &b));
        assert!(!is_compatible(&b, &a));
    }

    #[test]
    fn test_level_mismatch_blocks() {
        let a = meat(1).with_extension(bonus(50, false));
        let b = meat(2).with_extension(bonus(55, false));
        assert!(!is_compatible(&a, &b));
    }

    #[test]
    fn test_one_sided_unique_blocks() {
        let a = meat(1).with_extension(bonus(50, false));
        assert!(!is_compatible(&a, &meat(2)));
        assert!(!is_compatible(&meat(2), &a));
    }

    #[test]
    fn test_one_sided_non_unique_stacks() {
        let a = meat(1).with_extension(Extension::Note("smoked".into()));
        assert!(is_compatible(&a, &meat(2)));
        assert!(is_compatible(&meat(2), &a));

        let mut empty = meat(3);
        empty.extended_mut();
        assert!(is_compatible(&empty, &meat(4)));
    }

    #[test]
    fn test_extra_unique_on_either_side_blocks() {
        let crafter = Extension::Crafter(CrafterSignature::new("Ragnar"));
        let a = meat(1)
            .with_extension(bonus(50, false))
            .with_extension(crafter.clone());
        let b = meat(2).with_extension(bonus(50, false));

        assert!(!is_compatible(&a, &b));
        assert!(!is_compatible(&b, &a));

        let c = meat(3).with_extension(crafter).with_extension(bonus(50, false));
        assert!(is_compatible(&a, &c));
    }

    #[test]
    fn test_notes_do_not_participate() {
        let a = meat(1)
            .with_extension(bonus(25, false))
            .with_extension(Extension::Note("left".into()));
        let b = meat(2)
            .with_extension(Extension::Note("right".into()))
            .with_extension(bonus(25, false));
        assert!(is_compatible(&a, &b));
    }

    #[test]
    fn test_duplicate_unique_kinds_block() {
        let a = meat(1)
            .with_extension(bonus(25, false))
            .with_extension(bonus(25, false));
        let b = meat(2)
            .with_extension(bonus(25, false))
            .with_extension(bonus(25, false));
        assert!(!is_compatible(&a, &b));
        assert!(!is_compatible(&meat(3).with_extension(bonus(25, false)), &b));
    }

    #[test]
    fn test_find_stack() {
        let full = meat(1).with_stack(20).with_extension(bonus(50, false));
        let other_level = meat(2).with_extension(bonus(40, false));
        let fish = ItemInstance::new(ItemId(3), "cooked_fish", BlueprintId(1))
            .with_extension(bonus(50, false));
        let target = meat(4).with_stack(5).with_extension(bonus(50, false));
        let stacks = vec![full, other_level, fish, target];

        let incoming = meat(9).with_extension(bonus(50, false));
        let found = find_stack(&stacks, &incoming).map(|stack| stack.id);
        assert_eq!(found, Some(ItemId(4)));

        let perfect = meat(10).with_extension(bonus(50, true));
        assert!(find_stack(&stacks, &perfect).is_none());
    }
}
