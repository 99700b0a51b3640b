/// User-facing strings for controller alerts. The embedding layer supplies
/// localized values; the defaults keep the core usable without one.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Confirm-button label on failure alerts.
    pub close_label: String,
    /// Creation-failure alert text; `{title}` is replaced with the product
    /// title.
    pub create_variant_failure: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            close_label: "Close".into(),
            create_variant_failure: "Could not create a variant for {title}".into(),
        }
    }
}

impl ControllerConfig {
    pub fn create_variant_failure_message(&self, product_title: &str) -> String {
        self.create_variant_failure.replace("{title}", product_title)
    }
}
