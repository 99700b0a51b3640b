use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{Capability, MediaRecord, PriceRange, Product, ProductId, ShopId, Variant, VariantId},
    error::RemoteCallError,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

pub mod config;
pub mod inventory;
pub mod ordering;
pub mod selection;

pub use config::ControllerConfig;
pub use inventory::AnnotatedVariant;
pub use ordering::OrderError;

/// Product field flipped by visibility toggles.
const VISIBILITY_FIELD: &str = "isVisible";
const EDIT_FOCUS_PREFIX: &str = "variant-";

/// Read access to the external catalog's current products and variants.
pub trait ProductStore: Send + Sync {
    fn selected_product(&self) -> Option<Product>;
    fn selected_variant(&self) -> Option<Variant>;
    fn top_variants(&self) -> Vec<Variant>;
    fn child_variants(&self) -> Vec<Variant>;
    fn variant_by_id(&self, id: &VariantId) -> Option<Variant>;
    fn variant_price_range(&self, id: &VariantId) -> Option<PriceRange>;
    fn set_current_variant(&self, id: &VariantId);
}

pub struct MissingProductStore;

impl ProductStore for MissingProductStore {
    fn selected_product(&self) -> Option<Product> {
        None
    }

    fn selected_variant(&self) -> Option<Variant> {
        None
    }

    fn top_variants(&self) -> Vec<Variant> {
        Vec::new()
    }

    fn child_variants(&self) -> Vec<Variant> {
        Vec::new()
    }

    fn variant_by_id(&self, _id: &VariantId) -> Option<Variant> {
        None
    }

    fn variant_price_range(&self, _id: &VariantId) -> Option<PriceRange> {
        None
    }

    fn set_current_variant(&self, id: &VariantId) {
        warn!("product store unavailable, dropping current-variant update for {id}");
    }
}

pub trait AuthorizationService: Send + Sync {
    fn has_permission(&self, capabilities: &[Capability]) -> bool;
}

pub struct MissingAuthorizationService;

impl AuthorizationService for MissingAuthorizationService {
    fn has_permission(&self, _capabilities: &[Capability]) -> bool {
        false
    }
}

/// Remote catalog mutations. Everything here is asynchronous; apart from
/// variant creation the controller does not surface failures.
#[async_trait]
pub trait RemoteProductService: Send + Sync {
    async fn create_variant(&self, product_id: &ProductId) -> Result<(), RemoteCallError>;
    async fn update_product_field(
        &self,
        variant_id: &VariantId,
        field: &str,
        value: serde_json::Value,
    ) -> Result<(), RemoteCallError>;
    async fn update_variants_position(
        &self,
        ordered_ids: Vec<VariantId>,
        shop_id: &ShopId,
    ) -> Result<(), RemoteCallError>;
}

pub struct MissingRemoteProductService;

#[async_trait]
impl RemoteProductService for MissingRemoteProductService {
    async fn create_variant(&self, _product_id: &ProductId) -> Result<(), RemoteCallError> {
        Err(RemoteCallError::unavailable("remote product service"))
    }

    async fn update_product_field(
        &self,
        _variant_id: &VariantId,
        _field: &str,
        _value: serde_json::Value,
    ) -> Result<(), RemoteCallError> {
        Err(RemoteCallError::unavailable("remote product service"))
    }

    async fn update_variants_position(
        &self,
        _ordered_ids: Vec<VariantId>,
        _shop_id: &ShopId,
    ) -> Result<(), RemoteCallError> {
        Err(RemoteCallError::unavailable("remote product service"))
    }
}

/// The auxiliary side panel that can independently reference a variant.
pub trait PanelState: Send + Sync {
    fn active_panel_variant(&self) -> Option<Variant>;
    fn is_panel_open(&self) -> bool;
}

pub struct MissingPanelState;

impl PanelState for MissingPanelState {
    fn active_panel_variant(&self) -> Option<Variant> {
        None
    }

    fn is_panel_open(&self) -> bool {
        false
    }
}

pub trait AlertPresenter: Send + Sync {
    fn show(&self, message: &str, confirm_label: &str);
}

pub struct MissingAlertPresenter;

impl AlertPresenter for MissingAlertPresenter {
    fn show(&self, message: &str, _confirm_label: &str) {
        warn!("alert presenter unavailable, dropping alert: {message}");
    }
}

/// Transient per-view UI markers owned by the embedding layer: the edit
/// focus marker and the per-variant form visibility flags.
pub trait SessionState: Send + Sync {
    fn set_edit_focus(&self, marker: &str);
    fn set_form_visibility(&self, variant_id: &VariantId, visible: bool);
}

pub struct MissingSessionState;

impl SessionState for MissingSessionState {
    fn set_edit_focus(&self, _marker: &str) {}

    fn set_form_visibility(&self, _variant_id: &VariantId, _visible: bool) {}
}

pub trait MediaStore: Send + Sync {
    fn media_for_variants(&self, variant_ids: &[VariantId]) -> Vec<MediaRecord>;
}

pub struct MissingMediaStore;

impl MediaStore for MissingMediaStore {
    fn media_for_variants(&self, _variant_ids: &[VariantId]) -> Vec<MediaRecord> {
        Vec::new()
    }
}

/// What the rendering layer should do with the input event that triggered
/// an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Propagate,
    SuppressDefault,
}

/// Where the controller's sibling view currently comes from.
///
/// A `LocalOverride` is installed by an optimistic reorder and wins over
/// external snapshots until its persistence is confirmed or the sibling set
/// changes identity.
#[derive(Debug, Clone)]
enum SiblingSource {
    External(Vec<Variant>),
    LocalOverride(Vec<Variant>),
}

impl SiblingSource {
    fn variants(&self) -> &[Variant] {
        match self {
            SiblingSource::External(variants) | SiblingSource::LocalOverride(variants) => variants,
        }
    }
}

struct ControllerState {
    selection: Option<Variant>,
    siblings: SiblingSource,
    /// Bumped on every local reorder; `confirmed_generation` trails it until
    /// the matching persistence call resolves. Last writer wins.
    order_generation: u64,
    confirmed_generation: u64,
}

/// Presentation-state controller for one variant list view.
///
/// Owns the transient selection and the optimistic sibling order; everything
/// durable lives behind the injected collaborator traits. All operations run
/// without blocking; deferred persistence is spawned onto the runtime after
/// the local mutation is applied.
pub struct VariantListController {
    store: Arc<dyn ProductStore>,
    authorization: Arc<dyn AuthorizationService>,
    remote: Arc<dyn RemoteProductService>,
    panel: Arc<dyn PanelState>,
    alerts: Arc<dyn AlertPresenter>,
    session: Arc<dyn SessionState>,
    media: Arc<dyn MediaStore>,
    config: ControllerConfig,
    inner: Mutex<ControllerState>,
}

impl VariantListController {
    pub fn new(
        store: Arc<dyn ProductStore>,
        authorization: Arc<dyn AuthorizationService>,
    ) -> Arc<Self> {
        Self::new_with_dependencies(
            store,
            authorization,
            Arc::new(MissingRemoteProductService),
            Arc::new(MissingPanelState),
            Arc::new(MissingAlertPresenter),
            Arc::new(MissingSessionState),
            Arc::new(MissingMediaStore),
            ControllerConfig::default(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new_with_dependencies(
        store: Arc<dyn ProductStore>,
        authorization: Arc<dyn AuthorizationService>,
        remote: Arc<dyn RemoteProductService>,
        panel: Arc<dyn PanelState>,
        alerts: Arc<dyn AlertPresenter>,
        session: Arc<dyn SessionState>,
        media: Arc<dyn MediaStore>,
        config: ControllerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            authorization,
            remote,
            panel,
            alerts,
            session,
            media,
            config,
            inner: Mutex::new(ControllerState {
                selection: None,
                siblings: SiblingSource::External(Vec::new()),
                order_generation: 0,
                confirmed_generation: 0,
            }),
        })
    }

    /// Begins editing a variant, or one of its ancestors when
    /// `ancestor_depth` points into the ancestor chain (`None` edits the
    /// clicked variant itself).
    ///
    /// The resolved target receives the edit focus, becomes current in the
    /// store, and gets the visible form. Local selection tracks the clicked
    /// variant and only moves when the caller may create products. The
    /// returned disposition always suppresses the view's default click
    /// handling.
    pub async fn select_for_edit(
        &self,
        variant: &Variant,
        ancestor_depth: Option<usize>,
    ) -> EventDisposition {
        let target = match ancestor_depth {
            Some(depth) => self.resolve_ancestor_target(variant, depth),
            None => variant.clone(),
        };

        self.session
            .set_edit_focus(&format!("{EDIT_FOCUS_PREFIX}{}", target.id));
        self.store.set_current_variant(&target.id);
        self.session.set_form_visibility(&target.id, true);

        if self.authorization.has_permission(&[Capability::CreateProduct]) {
            self.inner.lock().await.selection = Some(variant.clone());
        }

        EventDisposition::SuppressDefault
    }

    fn resolve_ancestor_target(&self, variant: &Variant, depth: usize) -> Variant {
        let Some(ancestor_id) = variant.ancestors.get(depth) else {
            warn!(
                "ancestor depth {depth} out of range for variant {}, editing the variant itself",
                variant.id
            );
            return variant.clone();
        };
        match self.store.variant_by_id(ancestor_id) {
            Some(ancestor) => ancestor,
            None => {
                warn!(
                    "ancestor {ancestor_id} of variant {} missing from the catalog",
                    variant.id
                );
                variant.clone()
            }
        }
    }

    /// Fire-and-forget visibility toggle. The result is dropped; local state
    /// never changes and a failure leaves only a log line.
    pub fn toggle_visibility(&self, variant: &Variant, visible: bool) {
        let remote = Arc::clone(&self.remote);
        let variant_id = variant.id.clone();
        tokio::spawn(async move {
            if let Err(err) = remote
                .update_product_field(&variant_id, VISIBILITY_FIELD, serde_json::Value::Bool(visible))
                .await
            {
                warn!("visibility update dropped for variant {variant_id}: {err}");
            }
        });
    }

    /// Requests a new variant for the currently selected product. The one
    /// user-visible failure path: a rejected creation raises an alert naming
    /// the product.
    pub async fn create_variant(&self) {
        let Some(product) = self.store.selected_product() else {
            info!("variant creation requested without a selected product");
            return;
        };
        if let Err(err) = self.remote.create_variant(&product.id).await {
            warn!("variant creation failed for product {}: {err}", product.id);
            self.alerts.show(
                &self.config.create_variant_failure_message(&product.title),
                &self.config.close_label,
            );
        }
    }

    /// Optimistically moves a sibling from `from` to `to`.
    ///
    /// The reordered list becomes the controller's authoritative view before
    /// this method returns; persistence of the new identifier order is
    /// spawned afterwards and never rolls the view back on failure.
    pub async fn move_variant(self: &Arc<Self>, from: usize, to: usize) -> Result<(), OrderError> {
        let (ordered_ids, shop_id, generation) = {
            let mut guard = self.inner.lock().await;
            let reordered = ordering::reorder(guard.siblings.variants().to_vec(), from, to)?;
            let shop_id = reordered[to].shop_id.clone();
            let ordered_ids = ordering::variant_ids(&reordered);
            guard.siblings = SiblingSource::LocalOverride(reordered);
            guard.order_generation += 1;
            (ordered_ids, shop_id, guard.order_generation)
        };

        info!(
            "sibling moved {from} -> {to}, persisting order of {} variants",
            ordered_ids.len()
        );
        let client = Arc::clone(self);
        tokio::spawn(async move {
            match client
                .remote
                .update_variants_position(ordered_ids, &shop_id)
                .await
            {
                Ok(()) => {
                    let mut guard = client.inner.lock().await;
                    if generation > guard.confirmed_generation {
                        guard.confirmed_generation = generation;
                    }
                }
                Err(err) => {
                    warn!("position update dropped for shop {shop_id}: {err}");
                }
            }
        });
        Ok(())
    }

    pub async fn complete_edit(&self) {
        self.inner.lock().await.selection = None;
    }

    /// Feeds an external sibling snapshot into the controller.
    ///
    /// A live local override is kept unless the snapshot's id set differs
    /// (the sibling group changed identity) or the override's persistence
    /// has been confirmed with no later reorder outstanding.
    pub async fn sync_external(&self, mut snapshot: Vec<Variant>) {
        snapshot.sort_by_key(|variant| variant.index);
        let mut guard = self.inner.lock().await;
        let release = match &guard.siblings {
            SiblingSource::External(_) => true,
            SiblingSource::LocalOverride(local) => {
                !same_membership(local, &snapshot)
                    || guard.confirmed_generation == guard.order_generation
            }
        };
        if release {
            guard.siblings = SiblingSource::External(snapshot);
        }
    }

    /// Fetches the top-level variants from the store, annotated and sorted.
    /// An empty store yields an empty list.
    pub fn top_variants(&self) -> Vec<AnnotatedVariant> {
        inventory::annotate(self.store.top_variants())
    }

    /// The controller's current sibling view, annotated fresh per call. A
    /// local override keeps its optimistic order; external snapshots are
    /// index-sorted.
    pub async fn variants(&self) -> Vec<AnnotatedVariant> {
        let guard = self.inner.lock().await;
        inventory::annotate_preserving_order(guard.siblings.variants().to_vec())
    }

    pub async fn selected_variant(&self) -> Option<Variant> {
        self.inner.lock().await.selection.clone()
    }

    pub fn is_selected(&self, candidate: &VariantId) -> bool {
        selection::is_selected(candidate, self.store.selected_variant().as_ref())
    }

    pub fn is_active_in_panel(&self, candidate: &VariantId) -> bool {
        selection::is_active_in_panel(
            candidate,
            self.store.selected_variant().as_ref(),
            self.panel.active_panel_variant().as_ref(),
            self.panel.is_panel_open(),
        )
    }

    pub fn editable(&self) -> bool {
        self.authorization.has_permission(&[Capability::CreateProduct])
    }

    /// Handle of the selected product, preferring the published revision.
    pub fn product_handle(&self) -> Option<String> {
        self.store
            .selected_product()
            .map(|product| product.display_handle().to_string())
    }

    pub fn child_variants(&self) -> Vec<Variant> {
        self.store.child_variants()
    }

    /// Storefront price text for a variant, spanning its options. Unknown
    /// variants and unpriced catalogs yield `None`.
    pub fn display_price(&self, id: &VariantId) -> Option<String> {
        self.store
            .variant_price_range(id)
            .map(|range| range.display())
    }

    /// Media attached to the child variants, ascending by priority.
    pub fn child_variant_media(&self) -> Vec<MediaRecord> {
        let child_ids = ordering::variant_ids(&self.store.child_variants());
        let mut media = self.media.media_for_variants(&child_ids);
        media.sort_by_key(|record| record.priority);
        media
    }
}

fn same_membership(a: &[Variant], b: &[Variant]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a_ids = ordering::variant_ids(a);
    let mut b_ids = ordering::variant_ids(b);
    a_ids.sort();
    b_ids.sort();
    a_ids == b_ids
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
