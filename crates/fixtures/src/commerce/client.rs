//! HTTP implementation of [`CommerceApi`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use checkout_fixtures_core::{AddressInput, GiftCardId, OrderAttributes, OrderId};

use super::types::{
    Address, Document, GiftCard, GiftCardAction, GiftCardCreate, LineItem, LineItemCreate,
    ListDocument, Order, OrderUpdate, ResourceBody, ResourceType, Sku, SkuQuery,
};
use super::{CommerceApi, CommerceError, ErrorDocument};

/// JSON:API media type, used for both `Accept` and `Content-Type`.
const JSON_API: &str = "application/vnd.api+json";

/// Commerce backend REST client bound to one access token.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl CommerceClient {
    /// Create a client for `{endpoint}/api` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(
        endpoint: &Url,
        token: &SecretString,
        timeout: Duration,
    ) -> Result<Self, CommerceError> {
        let mut headers = HeaderMap::new();

        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| CommerceError::Parse(format!("Invalid access token format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(CommerceClientInner {
                client,
                base_url: format!("{}/api", endpoint.as_str().trim_end_matches('/')),
            }),
        })
    }

    /// Base URL of the resource API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, resource: ResourceType, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/{}/{id}", self.inner.base_url, resource.as_str()),
            None => format!("{}/{}", self.inner.base_url, resource.as_str()),
        }
    }

    /// SKU listing URL with the page size in `page[size]`.
    fn skus_url(&self, query: &SkuQuery) -> Result<Url, CommerceError> {
        let mut url = Url::parse(&self.url(ResourceType::Skus, None))
            .map_err(|e| CommerceError::Parse(format!("Invalid SKU URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("page[size]", &query.page_size.to_string());
        Ok(url)
    }

    /// Execute a GET request.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, CommerceError> {
        let response = self.inner.client.get(url).send().await?;
        self.handle_response(response).await
    }

    /// Execute a POST request.
    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, CommerceError> {
        let response = self
            .inner
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON_API)
            .body(encode(body)?)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Execute a PATCH request.
    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, CommerceError> {
        let response = self
            .inner
            .client
            .patch(url)
            .header(CONTENT_TYPE, JSON_API)
            .body(encode(body)?)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Execute a DELETE request.
    async fn delete(&self, url: &str) -> Result<(), CommerceError> {
        let response = self.inner.client.delete(url).send().await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(self.parse_error(response).await)
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CommerceError> {
        if response.status().is_success() {
            let bytes = response.bytes().await?;
            return serde_json::from_slice(&bytes)
                .map_err(|e| CommerceError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(self.parse_error(response).await)
    }

    /// Parse an error response from the API.
    async fn parse_error(&self, response: reqwest::Response) -> CommerceError {
        let status = response.status().as_u16();
        let path = response.url().path().to_owned();

        // Check for rate limiting
        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return CommerceError::RateLimited(retry_after);
        }

        if status == 401 {
            return CommerceError::Unauthorized;
        }

        if status == 404 {
            return CommerceError::NotFound(path);
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let message = serde_json::from_str::<ErrorDocument>(&text)
            .ok()
            .and_then(|doc| doc.summary())
            .unwrap_or(text);

        if status == 403 {
            return CommerceError::Forbidden(message);
        }

        CommerceError::Api { status, message }
    }
}

fn encode<B: Serialize>(body: &B) -> Result<Vec<u8>, CommerceError> {
    serde_json::to_vec(body).map_err(|e| CommerceError::Parse(format!("Failed to encode body: {e}")))
}

#[async_trait]
impl CommerceApi for CommerceClient {
    #[instrument(skip(self, attributes))]
    async fn create_order(&self, attributes: &OrderAttributes) -> Result<Order, CommerceError> {
        let body = ResourceBody::create(ResourceType::Orders, attributes);
        let doc: Document<Order> = self.post(&self.url(ResourceType::Orders, None), &body).await?;
        tracing::debug!(order_id = %doc.data.id, "Order created");
        Ok(doc.data)
    }

    #[instrument(skip(self, update), fields(order_id = %id))]
    async fn update_order(
        &self,
        id: &OrderId,
        update: &OrderUpdate,
    ) -> Result<Order, CommerceError> {
        let body = ResourceBody::update(ResourceType::Orders, id.as_str(), update.attributes())
            .with_relationships(update.relationships());
        let doc: Document<Order> = self
            .patch(&self.url(ResourceType::Orders, Some(id.as_str())), &body)
            .await?;
        Ok(doc.data)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn delete_order(&self, id: &OrderId) -> Result<(), CommerceError> {
        self.delete(&self.url(ResourceType::Orders, Some(id.as_str())))
            .await
    }

    #[instrument(skip(self, input), fields(order_id = %input.order, quantity = input.quantity.get()))]
    async fn create_line_item(&self, input: &LineItemCreate) -> Result<LineItem, CommerceError> {
        let body = ResourceBody::create(ResourceType::LineItems, input.attributes())
            .with_relationships(input.relationships());
        let doc: Document<LineItem> = self
            .post(&self.url(ResourceType::LineItems, None), &body)
            .await?;
        Ok(doc.data)
    }

    #[instrument(skip(self, input))]
    async fn create_address(&self, input: &AddressInput) -> Result<Address, CommerceError> {
        let body = ResourceBody::create(ResourceType::Addresses, input);
        let doc: Document<Address> = self
            .post(&self.url(ResourceType::Addresses, None), &body)
            .await?;
        Ok(doc.data)
    }

    #[instrument(skip(self, input), fields(currency = %input.currency_code, balance_cents = input.balance_cents))]
    async fn create_gift_card(&self, input: &GiftCardCreate) -> Result<GiftCard, CommerceError> {
        let body = ResourceBody::create(ResourceType::GiftCards, input);
        let doc: Document<GiftCard> = self
            .post(&self.url(ResourceType::GiftCards, None), &body)
            .await?;
        Ok(doc.data)
    }

    #[instrument(skip(self), fields(gift_card_id = %id))]
    async fn update_gift_card(
        &self,
        id: &GiftCardId,
        action: GiftCardAction,
    ) -> Result<GiftCard, CommerceError> {
        let body = ResourceBody::update(ResourceType::GiftCards, id.as_str(), action.attributes());
        let doc: Document<GiftCard> = self
            .patch(&self.url(ResourceType::GiftCards, Some(id.as_str())), &body)
            .await?;
        Ok(doc.data)
    }

    #[instrument(skip(self))]
    async fn list_skus(&self, query: &SkuQuery) -> Result<Vec<Sku>, CommerceError> {
        let doc: ListDocument<Sku> = self.get(self.skus_url(query)?).await?;
        if let Some(meta) = &doc.meta {
            tracing::debug!(record_count = meta.record_count, "SKUs listed");
        }
        Ok(doc.data)
    }
}

impl std::fmt::Debug for CommerceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> CommerceClient {
        CommerceClient::new(
            &Url::parse("https://demo.commercelayer.io/").unwrap(),
            &SecretString::from("tok_secret_value"),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_resource_urls() {
        let client = client();
        assert_eq!(client.base_url(), "https://demo.commercelayer.io/api");
        assert_eq!(
            client.url(ResourceType::LineItems, None),
            "https://demo.commercelayer.io/api/line_items"
        );
        assert_eq!(
            client.url(ResourceType::Orders, Some("ord1")),
            "https://demo.commercelayer.io/api/orders/ord1"
        );
    }

    #[test]
    fn test_skus_url_carries_page_size() {
        let url = client().skus_url(&SkuQuery::first(10)).unwrap();
        assert_eq!(url.path(), "/api/skus");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, [("page[size]".to_string(), "10".to_string())]);
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("demo.commercelayer.io"));
        assert!(!debug.contains("tok_secret_value"));
    }

    #[test]
    fn test_invalid_token_rejected() {
        let result = CommerceClient::new(
            &Url::parse("https://demo.commercelayer.io").unwrap(),
            &SecretString::from("bad\ntoken"),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(CommerceError::Parse(_))));
    }
}
