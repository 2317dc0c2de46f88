//! In-memory commerce backend for unit tests.
//!
//! [`MemoryBackend`] keeps orders, line items, addresses and gift cards in a
//! mutex-guarded store, records every call with the tier that made it, and
//! enforces the same privilege split as the real backend: activating a gift
//! card or deleting an order needs elevated credentials.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;

use checkout_fixtures_core::{
    AddressId, AddressInput, CurrencyCode, GiftCardId, ItemCode, LineItemId, OrderAttributes,
    OrderId, SkuId,
};

use crate::clients::{ClientSource, ElevatedClient, StandardClient};
use crate::commerce::{
    Address, CommerceApi, CommerceError, CredentialTier, GiftCard, GiftCardAction, GiftCardCreate,
    LineItem, LineItemCreate, LineItemTarget, Order, OrderUpdate, Sku, SkuQuery,
};
use crate::error::FixtureError;
use crate::fixture::{CheckoutPage, CheckoutTarget, PageAttributes};

pub const STANDARD_TOKEN: &str = "standard-token";

/// Remote operations, for call recording and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    CreateOrder,
    UpdateOrder,
    DeleteOrder,
    CreateLineItem,
    CreateAddress,
    CreateGiftCard,
    PurchaseGiftCard,
    ActivateGiftCard,
    ListSkus,
}

#[derive(Debug, Clone, Default)]
pub struct OrderRecord {
    pub attributes: OrderAttributes,
    pub gift_card_code: Option<String>,
    pub coupon_code: Option<String>,
    pub billing_address: Option<AddressId>,
    pub shipping_address: Option<AddressId>,
    pub same_as_billing: Option<bool>,
    /// Number of updates that set `same_as_billing`.
    pub same_as_billing_updates: usize,
}

#[derive(Debug, Clone)]
pub struct LineItemRecord {
    pub order_id: OrderId,
    pub quantity: u32,
    pub code: Option<ItemCode>,
    pub gift_card: Option<GiftCardId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStatus {
    Draft,
    Purchased,
    Active,
}

#[derive(Debug, Clone)]
pub struct GiftCardRecord {
    pub code: String,
    pub status: CardStatus,
    pub currency_code: CurrencyCode,
    pub balance_cents: u64,
    pub recipient_email: String,
}

#[derive(Debug, Default)]
pub struct State {
    next_id: u64,
    pub orders: BTreeMap<OrderId, OrderRecord>,
    pub line_items: Vec<LineItemRecord>,
    pub addresses: BTreeMap<AddressId, AddressInput>,
    pub gift_cards: BTreeMap<GiftCardId, GiftCardRecord>,
    pub skus: Vec<String>,
    pub calls: Vec<(CredentialTier, Op)>,
    failures: Vec<(Op, Option<String>)>,
    hang: Option<Op>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    pub fn line_items_of(&self, order_id: &OrderId) -> Vec<&LineItemRecord> {
        self.line_items
            .iter()
            .filter(|li| &li.order_id == order_id)
            .collect()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls.iter().filter(|(_, o)| *o == op).count()
    }
}

/// Shared in-memory store.
#[derive(Debug)]
pub struct MemoryBackend {
    state: Mutex<State>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemoryBackend {
    /// A backend whose catalog holds `skus`.
    pub fn with_skus(skus: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                skus: skus.iter().map(ToString::to_string).collect(),
                ..State::default()
            }),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn new() -> Arc<Self> {
        Self::with_skus(&["TSHIRTMM000000FFFFFFXL", "TESLA5", "NFTEBOOK"])
    }

    #[allow(clippy::unwrap_used)]
    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Make every `op` fail; with `code`, only line items for that code.
    pub fn fail(&self, op: Op, code: Option<&str>) {
        self.state().failures.push((op, code.map(ToString::to_string)));
    }

    /// Make `op` never complete.
    pub fn hang(&self, op: Op) {
        self.state().hang = Some(op);
    }

    /// Highest number of line item creates seen in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// A scoped API handle for `tier`.
    pub fn api(self: &Arc<Self>, tier: CredentialTier) -> Arc<dyn CommerceApi> {
        Arc::new(ScopedApi {
            backend: Arc::clone(self),
            tier,
        })
    }

    pub fn standard(self: &Arc<Self>) -> StandardClient {
        StandardClient::new(
            self.api(CredentialTier::Standard),
            SecretString::from(STANDARD_TOKEN),
        )
    }

    pub fn elevated(self: &Arc<Self>) -> ElevatedClient {
        ElevatedClient::new(self.api(CredentialTier::Elevated))
    }

    /// Record the call, then fail or hang it if configured.
    async fn enter(&self, tier: CredentialTier, op: Op, code: Option<&str>) -> Result<(), CommerceError> {
        let (fails, hangs) = {
            let mut state = self.state();
            state.calls.push((tier, op));
            let fails = state
                .failures
                .iter()
                .any(|(o, c)| *o == op && (c.is_none() || c.as_deref() == code));
            (fails, state.hang == Some(op))
        };

        if hangs {
            std::future::pending::<()>().await;
        }
        if fails {
            return Err(CommerceError::Api {
                status: 422,
                message: format!("injected failure for {op:?}"),
            });
        }
        Ok(())
    }
}

/// [`CommerceApi`] over a [`MemoryBackend`] with one tier's privileges.
#[derive(Debug)]
pub struct ScopedApi {
    backend: Arc<MemoryBackend>,
    tier: CredentialTier,
}

impl ScopedApi {
    fn require_elevated(&self, what: &str) -> Result<(), CommerceError> {
        if self.tier == CredentialTier::Elevated {
            Ok(())
        } else {
            Err(CommerceError::Forbidden(format!("{what} requires an integration token")))
        }
    }
}

fn order_view(id: &OrderId, record: &OrderRecord) -> Order {
    Order {
        id: id.clone(),
        status: Some("draft".into()),
        customer_email: record.attributes.customer_email.clone(),
        gift_card_code: record.gift_card_code.clone(),
        coupon_code: record.coupon_code.clone(),
    }
}

fn card_view(id: &GiftCardId, record: &GiftCardRecord) -> GiftCard {
    let status = match record.status {
        CardStatus::Draft => "draft",
        CardStatus::Purchased => "inactive",
        CardStatus::Active => "active",
    };
    GiftCard {
        id: id.clone(),
        code: Some(record.code.clone()),
        status: Some(status.into()),
        currency_code: Some(record.currency_code.as_str().into()),
        balance_cents: Some(record.balance_cents),
    }
}

#[async_trait]
impl CommerceApi for ScopedApi {
    async fn create_order(&self, attributes: &OrderAttributes) -> Result<Order, CommerceError> {
        self.backend.enter(self.tier, Op::CreateOrder, None).await?;
        let mut state = self.backend.state();
        let id = OrderId::new(state.next_id("ord_"));
        let record = OrderRecord {
            attributes: attributes.clone(),
            ..OrderRecord::default()
        };
        let order = order_view(&id, &record);
        state.orders.insert(id, record);
        Ok(order)
    }

    async fn update_order(
        &self,
        id: &OrderId,
        update: &OrderUpdate,
    ) -> Result<Order, CommerceError> {
        self.backend.enter(self.tier, Op::UpdateOrder, None).await?;
        let mut state = self.backend.state();

        if let Some(code) = &update.gift_card_code {
            let active = state
                .gift_cards
                .values()
                .any(|card| &card.code == code && card.status == CardStatus::Active);
            if !active {
                return Err(CommerceError::Api {
                    status: 422,
                    message: format!("gift_card_code - {code} is not active"),
                });
            }
        }

        let record = state
            .orders
            .get_mut(id)
            .ok_or_else(|| CommerceError::NotFound(format!("orders/{id}")))?;

        if let Some(code) = &update.gift_card_code {
            record.gift_card_code = Some(code.clone());
        }
        if let Some(code) = &update.coupon_code {
            record.coupon_code = Some(code.clone());
        }
        if let Some(address) = &update.billing_address {
            record.billing_address = Some(address.clone());
        }
        if let Some(address) = &update.shipping_address {
            record.shipping_address = Some(address.clone());
        }
        if let Some(same) = update.shipping_address_same_as_billing {
            record.same_as_billing = Some(same);
            record.same_as_billing_updates += 1;
        }

        Ok(order_view(id, record))
    }

    async fn delete_order(&self, id: &OrderId) -> Result<(), CommerceError> {
        self.backend.enter(self.tier, Op::DeleteOrder, None).await?;
        self.require_elevated("deleting orders")?;
        let mut state = self.backend.state();
        state
            .orders
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CommerceError::NotFound(format!("orders/{id}")))
    }

    async fn create_line_item(&self, input: &LineItemCreate) -> Result<LineItem, CommerceError> {
        let code = match &input.target {
            LineItemTarget::Code(code) => Some(code.as_str()),
            LineItemTarget::GiftCard(_) => None,
        };

        let now = self.backend.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.backend.max_in_flight.fetch_max(now, Ordering::SeqCst);
        // Let sibling creates start before this one finishes
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        let entered = self.backend.enter(self.tier, Op::CreateLineItem, code).await;
        self.backend.in_flight.fetch_sub(1, Ordering::SeqCst);
        entered?;

        let mut state = self.backend.state();
        if !state.orders.contains_key(&input.order) {
            return Err(CommerceError::NotFound(format!("orders/{}", input.order)));
        }

        let (item_code, gift_card) = match &input.target {
            LineItemTarget::Code(code) => (Some(code.clone()), None),
            LineItemTarget::GiftCard(id) => {
                let card = state
                    .gift_cards
                    .get(id)
                    .ok_or_else(|| CommerceError::NotFound(format!("gift_cards/{id}")))?;
                if card.status == CardStatus::Draft {
                    return Err(CommerceError::Api {
                        status: 422,
                        message: "gift card must be purchased before it is sold".into(),
                    });
                }
                (None, Some(id.clone()))
            }
        };

        let id = LineItemId::new(state.next_id("li_"));
        let record = LineItemRecord {
            order_id: input.order.clone(),
            quantity: input.quantity.get(),
            code: item_code.clone(),
            gift_card,
        };
        state.line_items.push(record);

        Ok(LineItem {
            id,
            quantity: input.quantity.get(),
            sku_code: item_code
                .as_ref()
                .filter(|c| !c.is_bundle())
                .map(|c| c.as_str().to_owned()),
            bundle_code: item_code
                .as_ref()
                .filter(|c| c.is_bundle())
                .map(|c| c.as_str().to_owned()),
            item_type: None,
        })
    }

    async fn create_address(&self, input: &AddressInput) -> Result<Address, CommerceError> {
        self.backend.enter(self.tier, Op::CreateAddress, None).await?;
        let mut state = self.backend.state();
        let id = AddressId::new(state.next_id("addr_"));
        state.addresses.insert(id.clone(), input.clone());
        Ok(Address {
            id,
            city: input.city.clone(),
            country_code: input.country_code.clone(),
        })
    }

    async fn create_gift_card(&self, input: &GiftCardCreate) -> Result<GiftCard, CommerceError> {
        self.backend.enter(self.tier, Op::CreateGiftCard, None).await?;
        let mut state = self.backend.state();
        let id = GiftCardId::new(state.next_id("gc_"));
        let record = GiftCardRecord {
            code: format!("code-{id}"),
            status: CardStatus::Draft,
            currency_code: input.currency_code,
            balance_cents: input.balance_cents,
            recipient_email: input.recipient_email.clone(),
        };
        let card = card_view(&id, &record);
        state.gift_cards.insert(id, record);
        Ok(card)
    }

    async fn update_gift_card(
        &self,
        id: &GiftCardId,
        action: GiftCardAction,
    ) -> Result<GiftCard, CommerceError> {
        let op = match action {
            GiftCardAction::Purchase => Op::PurchaseGiftCard,
            GiftCardAction::Activate => Op::ActivateGiftCard,
        };
        self.backend.enter(self.tier, op, None).await?;
        if action == GiftCardAction::Activate {
            self.require_elevated("activating gift cards")?;
        }

        let mut state = self.backend.state();
        let record = state
            .gift_cards
            .get_mut(id)
            .ok_or_else(|| CommerceError::NotFound(format!("gift_cards/{id}")))?;

        record.status = match (action, record.status) {
            (GiftCardAction::Purchase, CardStatus::Draft) => CardStatus::Purchased,
            (GiftCardAction::Activate, CardStatus::Purchased | CardStatus::Active) => {
                CardStatus::Active
            }
            (action, status) => {
                return Err(CommerceError::Api {
                    status: 422,
                    message: format!("cannot {action:?} a {status:?} gift card"),
                });
            }
        };

        Ok(card_view(id, record))
    }

    async fn list_skus(&self, query: &SkuQuery) -> Result<Vec<Sku>, CommerceError> {
        self.backend.enter(self.tier, Op::ListSkus, None).await?;
        let state = self.backend.state();
        Ok(state
            .skus
            .iter()
            .take(usize::from(query.page_size))
            .enumerate()
            .map(|(i, code)| Sku {
                id: SkuId::new(format!("sku_{i}")),
                code: code.clone(),
                name: None,
            })
            .collect())
    }
}

/// [`ClientSource`] over a [`MemoryBackend`].
#[derive(Debug)]
pub struct MemorySource {
    pub backend: Arc<MemoryBackend>,
    elevated_requests: AtomicUsize,
    deny_elevated: bool,
    standard_delay: Option<Duration>,
}

impl MemorySource {
    pub fn new(backend: Arc<MemoryBackend>) -> Self {
        Self {
            backend,
            elevated_requests: AtomicUsize::new(0),
            deny_elevated: false,
            standard_delay: None,
        }
    }

    /// A source whose standard token takes `delay` to arrive.
    pub fn with_standard_delay(backend: Arc<MemoryBackend>, delay: Duration) -> Self {
        Self {
            standard_delay: Some(delay),
            ..Self::new(backend)
        }
    }

    /// A source whose integration credentials are rejected.
    pub fn without_elevated(backend: Arc<MemoryBackend>) -> Self {
        Self {
            deny_elevated: true,
            ..Self::new(backend)
        }
    }

    pub fn elevated_requests(&self) -> usize {
        self.elevated_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientSource for MemorySource {
    async fn standard(&self) -> Result<StandardClient, CommerceError> {
        if let Some(delay) = self.standard_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.backend.standard())
    }

    async fn elevated(&self) -> Result<ElevatedClient, CommerceError> {
        self.elevated_requests.fetch_add(1, Ordering::SeqCst);
        if self.deny_elevated {
            return Err(CommerceError::AuthenticationFailed(
                "HTTP 401 Unauthorized: invalid client".into(),
            ));
        }
        Ok(self.backend.elevated())
    }
}

/// A [`CheckoutPage`] that records every navigation.
#[derive(Debug, Default)]
pub struct RecordingPage {
    pub attributes: PageAttributes,
    pub visits: Vec<(OrderId, String)>,
    pub fail: bool,
}

impl RecordingPage {
    pub fn new(attributes: PageAttributes) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }
}

#[async_trait]
impl CheckoutPage for RecordingPage {
    async fn goto(&mut self, target: &CheckoutTarget) -> Result<(), FixtureError> {
        use secrecy::ExposeSecret;

        if self.fail {
            return Err(FixtureError::Page("navigation failed".into()));
        }
        self.visits.push((
            target.order_id.clone(),
            target.token.expose_secret().to_owned(),
        ));
        Ok(())
    }
}
