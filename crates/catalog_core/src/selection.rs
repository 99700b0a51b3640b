use shared::domain::{Variant, VariantId};

/// A variant counts as selected when it is the current selection itself or
/// an ancestor of it, so selecting a nested variant highlights its whole
/// chain.
pub fn is_selected(candidate: &VariantId, current: Option<&Variant>) -> bool {
    match current {
        Some(current) => current.id == *candidate || current.ancestors.contains(candidate),
        None => false,
    }
}

/// Active-in-panel additionally requires an open panel whose own variant is
/// still selected; a stale or closed panel never reports a variant active.
pub fn is_active_in_panel(
    candidate: &VariantId,
    current: Option<&Variant>,
    panel_variant: Option<&Variant>,
    panel_open: bool,
) -> bool {
    let Some(panel_variant) = panel_variant else {
        return false;
    };
    panel_open && is_selected(candidate, current) && is_selected(&panel_variant.id, current)
}
