//! Per-test checkout fixtures.
//!
//! A [`FixtureProvider`] builds one order per test case and hands the test a
//! page that has already navigated to that order's checkout. Orders are not
//! deleted at teardown.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::time::{Instant, timeout_at};
use tracing::instrument;
use url::Url;

use checkout_fixtures_core::{BuildResult, FixtureParams, OrderId, OrderSpec};

use crate::clients::{ClientProvider, ClientSource, StandardClient};
use crate::composer::{ComposeOptions, OrderComposer};
use crate::config::FixtureConfig;
use crate::error::{BuildStep, FixtureError};

/// What the page object is built with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageAttributes {
    /// Activated gift card code the test is expected to redeem.
    pub gift_card_code: Option<String>,
}

/// Where the page navigates: an order and the token to open it with.
#[derive(Clone)]
pub struct CheckoutTarget {
    pub order_id: OrderId,
    pub token: SecretString,
}

impl std::fmt::Debug for CheckoutTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutTarget")
            .field("order_id", &self.order_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Page abstraction that consumes a built order.
#[async_trait]
pub trait CheckoutPage: Send {
    /// Navigate to the checkout for `target`.
    ///
    /// Called exactly once per fixture.
    async fn goto(&mut self, target: &CheckoutTarget) -> Result<(), FixtureError>;
}

/// A [`CheckoutPage`] that records the checkout URL instead of driving a
/// browser.
///
/// The URL has the form `{base_url}/{order_id}?accessToken={token}`.
#[derive(Debug, Clone)]
pub struct LinkPage {
    base_url: Url,
    attributes: PageAttributes,
    url: Option<Url>,
}

impl LinkPage {
    #[must_use]
    pub const fn new(base_url: Url, attributes: PageAttributes) -> Self {
        Self {
            base_url,
            attributes,
            url: None,
        }
    }

    #[must_use]
    pub const fn attributes(&self) -> &PageAttributes {
        &self.attributes
    }

    /// The checkout URL, once navigated.
    #[must_use]
    pub const fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Build the checkout URL for `target` under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Page` if `base_url` cannot carry a path.
    pub fn checkout_url(base_url: &Url, target: &CheckoutTarget) -> Result<Url, FixtureError> {
        let mut url = base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FixtureError::Page(format!("{base_url} cannot be a base URL")))?
            .pop_if_empty()
            .push(target.order_id.as_str());
        url.query_pairs_mut()
            .append_pair("accessToken", target.token.expose_secret());
        Ok(url)
    }
}

#[async_trait]
impl CheckoutPage for LinkPage {
    async fn goto(&mut self, target: &CheckoutTarget) -> Result<(), FixtureError> {
        self.url = Some(Self::checkout_url(&self.base_url, target)?);
        Ok(())
    }
}

/// A ready checkout context for one test case.
#[derive(Debug)]
pub struct CheckoutFixture<P> {
    /// The page, already navigated.
    pub page: P,
    /// Where the page was sent.
    pub target: CheckoutTarget,
    /// The freshly built order, even when `target` overrides it.
    pub build: BuildResult,
}

/// Builds one checkout fixture per call.
#[derive(Clone)]
pub struct FixtureProvider {
    source: Arc<dyn ClientSource>,
    options: ComposeOptions,
}

impl FixtureProvider {
    #[must_use]
    pub fn new(source: Arc<dyn ClientSource>, options: ComposeOptions) -> Self {
        Self { source, options }
    }

    /// Provider backed by the configured commerce credentials.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &FixtureConfig) -> Result<Self, FixtureError> {
        let provider = ClientProvider::new(config.commerce.clone())?;
        Ok(Self::new(
            Arc::new(provider),
            ComposeOptions {
                line_item_errors: config.line_item_errors,
                cleanup: config.cleanup,
                timeout: Some(config.build_timeout),
            },
        ))
    }

    #[must_use]
    pub const fn options(&self) -> &ComposeOptions {
        &self.options
    }

    /// The client source fixtures are built through.
    #[must_use]
    pub fn source(&self) -> &dyn ClientSource {
        self.source.as_ref()
    }

    /// Build a fixture from flat params.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Spec` for params the variant cannot use, or any
    /// error from [`FixtureProvider::checkout_spec`].
    pub async fn checkout<P, F>(
        &self,
        params: FixtureParams,
        make_page: F,
    ) -> Result<CheckoutFixture<P>, FixtureError>
    where
        P: CheckoutPage,
        F: FnOnce(PageAttributes) -> P + Send,
    {
        let spec = OrderSpec::try_from(params)?;
        self.checkout_spec(&spec, make_page).await
    }

    /// Build the order for `spec`, construct the page and navigate it.
    ///
    /// Explicit `order_id` / `token` overrides on the spec win over the built
    /// order and the fixture's own token; the order is built regardless.
    ///
    /// # Errors
    ///
    /// Returns the first fatal build error, or the page's navigation error.
    #[instrument(skip(self, spec, make_page), fields(variant = %spec.variant()))]
    pub async fn checkout_spec<P, F>(
        &self,
        spec: &OrderSpec,
        make_page: F,
    ) -> Result<CheckoutFixture<P>, FixtureError>
    where
        P: CheckoutPage,
        F: FnOnce(PageAttributes) -> P + Send,
    {
        let deadline = self.options.timeout.map(|limit| Instant::now() + limit);
        let standard = self.standard(deadline).await?;

        let build = OrderComposer::new(&standard, self.source.as_ref(), self.options)
            .compose_until(spec, deadline)
            .await?;

        let mut page = make_page(PageAttributes {
            gift_card_code: build.gift_card_code.clone(),
        });

        let target = CheckoutTarget {
            order_id: spec
                .order_id
                .clone()
                .unwrap_or_else(|| build.order_id.clone()),
            token: spec
                .token
                .clone()
                .map_or_else(|| standard.access_token().clone(), SecretString::from),
        };

        page.goto(&target).await?;
        tracing::info!(order_id = %target.order_id, "Checkout fixture ready");

        Ok(CheckoutFixture {
            page,
            target,
            build,
        })
    }

    async fn standard(&self, deadline: Option<Instant>) -> Result<StandardClient, FixtureError> {
        let acquire = self.source.standard();
        let standard = match (deadline, self.options.timeout) {
            (Some(at), Some(limit)) => timeout_at(at, acquire)
                .await
                .map_err(|_| FixtureError::Timeout(limit))?,
            _ => acquire.await,
        };
        standard.map_err(FixtureError::at(BuildStep::AcquireToken))
    }
}

impl std::fmt::Debug for FixtureProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureProvider")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
