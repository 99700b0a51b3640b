use shared::domain::{Variant, VariantId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("index {index} out of range for sibling group of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Moves the element at `from` so it lands at `to`: remove first, then
/// insert into the shortened list. A single-element move, not a swap; the
/// result is always a permutation of the input.
///
/// Out-of-range indices fail deterministically rather than clamping, since
/// callers derive both indices from the rendered list.
pub fn reorder(
    mut siblings: Vec<Variant>,
    from: usize,
    to: usize,
) -> Result<Vec<Variant>, OrderError> {
    let len = siblings.len();
    if from >= len {
        return Err(OrderError::IndexOutOfRange { index: from, len });
    }
    if to >= len {
        return Err(OrderError::IndexOutOfRange { index: to, len });
    }

    let moved = siblings.remove(from);
    siblings.insert(to, moved);
    Ok(siblings)
}

/// Canonical identifier order of a sibling group, as submitted to the
/// position-persistence call.
pub fn variant_ids(siblings: &[Variant]) -> Vec<VariantId> {
    siblings.iter().map(|variant| variant.id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::ShopId;

    fn group(ids: &[&str]) -> Vec<Variant> {
        ids.iter()
            .enumerate()
            .map(|(index, id)| Variant {
                id: VariantId::new(*id),
                ancestors: Vec::new(),
                index: index as i64,
                title: None,
                inventory_management: false,
                inventory_available_to_sell: 0,
                is_visible: true,
                shop_id: ShopId::new("shop-1"),
            })
            .collect()
    }

    fn ids(siblings: &[Variant]) -> Vec<&str> {
        siblings.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn moves_a_single_element_forward() {
        let reordered = reorder(group(&["a", "b", "c", "d"]), 0, 2).expect("in range");
        assert_eq!(ids(&reordered), ["b", "c", "a", "d"]);
    }

    #[test]
    fn moves_a_single_element_backward() {
        let reordered = reorder(group(&["a", "b", "c", "d"]), 3, 1).expect("in range");
        assert_eq!(ids(&reordered), ["a", "d", "b", "c"]);
    }

    #[test]
    fn same_index_is_the_identity_permutation() {
        let reordered = reorder(group(&["a", "b", "c"]), 1, 1).expect("in range");
        assert_eq!(ids(&reordered), ["a", "b", "c"]);
    }

    #[test]
    fn every_valid_index_pair_yields_a_permutation() {
        let original = group(&["a", "b", "c", "d"]);
        for from in 0..original.len() {
            for to in 0..original.len() {
                let reordered =
                    reorder(original.clone(), from, to).expect("all pairs are in range");
                assert_eq!(reordered.len(), original.len());
                let mut sorted = variant_ids(&reordered);
                sorted.sort();
                let mut expected = variant_ids(&original);
                expected.sort();
                assert_eq!(sorted, expected, "from={from} to={to}");
            }
        }
    }

    #[test]
    fn out_of_range_indices_fail_without_clamping() {
        let siblings = group(&["a", "b"]);
        assert_eq!(
            reorder(siblings.clone(), 2, 0),
            Err(OrderError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            reorder(siblings, 0, 5),
            Err(OrderError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn identifier_order_follows_the_group_order() {
        let siblings = group(&["b", "a"]);
        let ids = variant_ids(&siblings);
        assert_eq!(ids, [VariantId::new("b"), VariantId::new("a")]);
    }
}
