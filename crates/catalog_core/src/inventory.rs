use serde::Serialize;
use shared::domain::Variant;

/// A variant annotated with the inventory metrics derived from its sibling
/// group. Computed fresh on every aggregation pass, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedVariant {
    pub variant: Variant,
    /// Sellable total across the whole sibling group.
    pub inventory_total: u64,
    /// This variant's share of the group total, 0-100. Untracked variants
    /// and zero-total groups report 100 so the inventory bar renders full.
    pub inventory_percentage: u8,
    /// Display-proportioning heuristic: percentage minus the title length.
    /// Negative values are expected for long titles.
    pub inventory_width: i64,
}

/// Annotates a sibling group and returns it sorted ascending by `index`.
///
/// Percentages use truncating integer division. An empty input produces an
/// empty output without touching the total.
pub fn annotate(variants: Vec<Variant>) -> Vec<AnnotatedVariant> {
    let mut annotated = annotate_preserving_order(variants);
    annotated.sort_by_key(|entry| entry.variant.index);
    annotated
}

/// Same metrics as [`annotate`] but keeps the caller's order, for views
/// whose order is already authoritative (an optimistic reorder in flight).
pub fn annotate_preserving_order(variants: Vec<Variant>) -> Vec<AnnotatedVariant> {
    let inventory_total: u64 = variants
        .iter()
        .filter(|variant| variant.inventory_management)
        .map(|variant| u64::from(variant.inventory_available_to_sell))
        .sum();

    variants
        .into_iter()
        .map(|variant| {
            let inventory_percentage = if variant.inventory_management && inventory_total > 0 {
                (u64::from(variant.inventory_available_to_sell) * 100 / inventory_total) as u8
            } else {
                100
            };
            let inventory_width = match &variant.title {
                Some(title) => i64::from(inventory_percentage) - title.chars().count() as i64,
                None => 0,
            };
            AnnotatedVariant {
                variant,
                inventory_total,
                inventory_percentage,
                inventory_width,
            }
        })
        .collect()
}

pub fn is_sold_out(variant: &Variant) -> bool {
    variant.inventory_available_to_sell < 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{ShopId, VariantId};

    fn variant(id: &str, index: i64, managed: bool, available: u32) -> Variant {
        Variant {
            id: VariantId::new(id),
            ancestors: Vec::new(),
            index,
            title: None,
            inventory_management: managed,
            inventory_available_to_sell: available,
            is_visible: true,
            shop_id: ShopId::new("shop-1"),
        }
    }

    fn titled(mut v: Variant, title: &str) -> Variant {
        v.title = Some(title.to_string());
        v
    }

    #[test]
    fn splits_percentages_across_the_group_total() {
        let annotated = annotate(vec![
            variant("a", 0, true, 30),
            variant("b", 1, true, 70),
        ]);
        assert_eq!(annotated[0].inventory_total, 100);
        assert_eq!(annotated[0].inventory_percentage, 30);
        assert_eq!(annotated[1].inventory_percentage, 70);
    }

    #[test]
    fn equal_availability_splits_evenly() {
        let annotated = annotate(vec![
            variant("a", 0, true, 1),
            variant("b", 1, true, 1),
        ]);
        assert_eq!(annotated[0].inventory_total, 2);
        assert_eq!(annotated[0].inventory_percentage, 50);
        assert_eq!(annotated[1].inventory_percentage, 50);
    }

    #[test]
    fn percentage_truncates_instead_of_rounding() {
        let annotated = annotate(vec![
            variant("a", 0, true, 1),
            variant("b", 1, true, 2),
        ]);
        assert_eq!(annotated[0].inventory_percentage, 33);
        assert_eq!(annotated[1].inventory_percentage, 66);
    }

    #[test]
    fn untracked_group_reports_full_bars() {
        let annotated = annotate(vec![
            variant("a", 0, false, 0),
            variant("b", 1, false, 5),
        ]);
        assert!(annotated.iter().all(|entry| entry.inventory_percentage == 100));
        assert_eq!(annotated[0].inventory_total, 0);
    }

    #[test]
    fn zero_total_falls_back_to_full_bars_for_tracked_variants() {
        let annotated = annotate(vec![
            variant("a", 0, true, 0),
            variant("b", 1, true, 0),
        ]);
        assert_eq!(annotated[0].inventory_total, 0);
        assert!(annotated.iter().all(|entry| entry.inventory_percentage == 100));
    }

    #[test]
    fn untracked_variant_does_not_contribute_to_the_total() {
        let annotated = annotate(vec![
            variant("a", 0, true, 25),
            variant("b", 1, false, 1000),
            variant("c", 2, true, 75),
        ]);
        assert_eq!(annotated[0].inventory_total, 100);
        assert_eq!(annotated[0].inventory_percentage, 25);
        assert_eq!(annotated[1].inventory_percentage, 100);
        assert_eq!(annotated[2].inventory_percentage, 75);
    }

    #[test]
    fn empty_group_yields_empty_output() {
        assert!(annotate(Vec::new()).is_empty());
    }

    #[test]
    fn output_is_sorted_by_index_regardless_of_input_order() {
        let annotated = annotate(vec![
            variant("c", 2, false, 0),
            variant("a", 0, false, 0),
            variant("b", 1, false, 0),
        ]);
        let ids: Vec<&str> = annotated.iter().map(|e| e.variant.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn width_subtracts_title_length_and_may_go_negative() {
        let long_title = "x".repeat(120);
        let annotated = annotate(vec![
            titled(variant("a", 0, true, 60), "Small"),
            titled(variant("b", 1, true, 40), &long_title),
            variant("c", 2, false, 0),
        ]);
        assert_eq!(annotated[0].inventory_width, 60 - 5);
        assert_eq!(annotated[1].inventory_width, 40 - 120);
        assert_eq!(annotated[2].inventory_width, 0);
    }

    #[test]
    fn sold_out_means_nothing_available() {
        assert!(is_sold_out(&variant("a", 0, true, 0)));
        assert!(!is_sold_out(&variant("a", 0, true, 1)));
    }
}
