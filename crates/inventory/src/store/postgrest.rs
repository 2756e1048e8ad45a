//! Hosted store client speaking PostgREST (as fronted by Supabase).
//!
//! # API Reference
//!
//! - Base URL: `{SUPABASE_URL}/rest/v1/{table}`
//! - Authentication: `apikey: <key>` and `Authorization: Bearer <key>`
//! - Filters: query parameters such as `rack_id=eq.R1-A` or
//!   `product_name=ilike.*mouse*`
//! - Writes send `Prefer: return=representation` and get the affected rows back

use std::sync::Arc;

use reqwest::RequestBuilder;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{ProductFilter, ProductOrder, RackFilter, Store, StoreError, StoreResult};
use crate::config::RemoteStoreConfig;
use crate::models::{NewProduct, NewRack, Product, ProductPatch, Rack, RackPatch};

/// Path of the REST endpoint below the project URL.
const REST_PATH: &str = "rest/v1/";

/// Ask PostgREST to echo affected rows on writes.
const RETURN_REPRESENTATION: &str = "return=representation";

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

type Params = Vec<(&'static str, String)>;

/// PostgREST client for the `racks` and `products` tables.
#[derive(Clone)]
pub struct PostgRestStore {
    inner: Arc<PostgRestInner>,
}

struct PostgRestInner {
    client: reqwest::Client,
    racks_url: Url,
    products_url: Url,
}

impl std::fmt::Debug for PostgRestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgRestStore")
            .field("racks_url", &self.inner.racks_url.as_str())
            .field("products_url", &self.inner.products_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl PostgRestStore {
    /// Create a new client for the project at `config.url`.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &RemoteStoreConfig) -> StoreResult<Self> {
        let key = config.api_key.expose_secret();
        let mut headers = HeaderMap::new();

        let mut apikey = HeaderValue::from_str(key)
            .map_err(|e| StoreError::Parse(format!("Invalid API key format: {e}")))?;
        apikey.set_sensitive(true);
        headers.insert("apikey", apikey);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| StoreError::Parse(format!("Invalid API key format: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let base = rest_base(&config.url)?;
        Ok(Self {
            inner: Arc::new(PostgRestInner {
                client,
                racks_url: table_url(&base, "racks")?,
                products_url: table_url(&base, "products")?,
            }),
        })
    }

    fn get(&self, url: &Url, params: &Params) -> RequestBuilder {
        self.inner
            .client
            .get(url.clone())
            .query(&[("select", "*")])
            .query(params)
    }

    fn write(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Prefer", RETURN_REPRESENTATION)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<T> {
        let response = request.send().await?;
        handle_response(response).await
    }

    async fn probe(&self, url: &Url) -> StoreResult<()> {
        let request = self
            .inner
            .client
            .get(url.clone())
            .query(&[("select", "id"), ("limit", "1")]);
        let _: Vec<serde_json::Value> = self.fetch(request).await?;
        Ok(())
    }
}

impl Store for PostgRestStore {
    fn backend_name(&self) -> &'static str {
        "postgrest"
    }

    #[instrument(level = "debug", skip(self))]
    async fn select_racks(&self, filter: &RackFilter) -> StoreResult<Vec<Rack>> {
        let request = self.get(&self.inner.racks_url, &rack_params(filter));
        self.fetch(request).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn insert_rack(&self, rack: &NewRack) -> StoreResult<Rack> {
        let request = self.write(self.inner.client.post(self.inner.racks_url.clone()).json(rack));
        let rows: Vec<Rack> = self.fetch(request).await?;
        first_row(rows, "racks")
    }

    #[instrument(level = "debug", skip(self))]
    async fn update_racks(&self, filter: &RackFilter, patch: &RackPatch) -> StoreResult<Vec<Rack>> {
        let request = self.write(
            self.inner
                .client
                .patch(self.inner.racks_url.clone())
                .query(&rack_params(filter))
                .json(patch),
        );
        self.fetch(request).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_racks(&self, filter: &RackFilter) -> StoreResult<Vec<Rack>> {
        let request = self.write(
            self.inner
                .client
                .delete(self.inner.racks_url.clone())
                .query(&rack_params(filter)),
        );
        self.fetch(request).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn select_products(
        &self,
        filter: &ProductFilter,
        order: ProductOrder,
    ) -> StoreResult<Vec<Product>> {
        let mut params = product_params(filter);
        if order == ProductOrder::NameAsc {
            params.push(("order", "product_name.asc".to_string()));
        }
        let request = self.get(&self.inner.products_url, &params);
        self.fetch(request).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn insert_product(&self, product: &NewProduct) -> StoreResult<Product> {
        let request = self.write(
            self.inner
                .client
                .post(self.inner.products_url.clone())
                .json(product),
        );
        let rows: Vec<Product> = self.fetch(request).await?;
        first_row(rows, "products")
    }

    #[instrument(level = "debug", skip(self))]
    async fn update_products(
        &self,
        filter: &ProductFilter,
        patch: &ProductPatch,
    ) -> StoreResult<Vec<Product>> {
        let request = self.write(
            self.inner
                .client
                .patch(self.inner.products_url.clone())
                .query(&product_params(filter))
                .json(patch),
        );
        self.fetch(request).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let request = self.write(
            self.inner
                .client
                .delete(self.inner.products_url.clone())
                .query(&product_params(filter)),
        );
        self.fetch(request).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn ping(&self) -> StoreResult<()> {
        self.probe(&self.inner.racks_url).await?;
        self.probe(&self.inner.products_url).await?;
        debug!("Both tables reachable");
        Ok(())
    }
}

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
struct PostgRestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// Handle API response and parse JSON.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> StoreResult<T> {
    let status = response.status();

    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| StoreError::Parse(format!("Failed to parse response: {e}")));
    }

    let body = response.text().await.unwrap_or_default();
    let err = classify_error(status.as_u16(), &body);
    warn!(status = status.as_u16(), error = %err, "PostgREST request failed");
    Err(err)
}

/// Map a non-success status and body to a [`StoreError`].
fn classify_error(status: u16, body: &str) -> StoreError {
    let parsed: Option<PostgRestErrorBody> = serde_json::from_str(body).ok();

    let code = parsed.as_ref().and_then(|b| b.code.as_deref());
    if code == Some(UNIQUE_VIOLATION) {
        let detail = parsed
            .as_ref()
            .and_then(|b| b.details.clone().or_else(|| b.message.clone()))
            .unwrap_or_default();
        return StoreError::UniqueViolation(detail);
    }

    if matches!(status, 401 | 403) {
        return StoreError::Unauthorized;
    }

    let message = parsed
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().to_string());
    StoreError::Api { status, message }
}

fn rack_params(filter: &RackFilter) -> Params {
    match filter {
        RackFilter::All => Vec::new(),
        RackFilter::RackIdEq(id) => vec![("rack_id", eq(id.as_str()))],
        RackFilter::RackIdContains(q) => vec![("rack_id", ilike(q))],
    }
}

fn product_params(filter: &ProductFilter) -> Params {
    match filter {
        ProductFilter::All => Vec::new(),
        ProductFilter::IdEq(id) => vec![("id", eq(&id.to_string()))],
        ProductFilter::NameContains(q) => vec![("product_name", ilike(q))],
        ProductFilter::RackIdEq(id) => vec![("rack_id", eq(id.as_str()))],
        ProductFilter::BarcodeEq(code) => vec![("barcode", eq(code))],
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// Substring pattern; `\`, `%` and `_` in `value` match literally.
fn ilike(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("ilike.*{escaped}*")
}

fn first_row<T>(rows: Vec<T>, table: &str) -> StoreResult<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::Parse(format!("insert into {table} returned no rows")))
}

/// `{project}/rest/v1/`, keeping any path prefix on the project URL.
fn rest_base(project: &Url) -> StoreResult<Url> {
    let mut base = project.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(REST_PATH)
        .map_err(|e| StoreError::Parse(format!("Invalid store URL: {e}")))
}

fn table_url(base: &Url, table: &str) -> StoreResult<Url> {
    base.join(table)
        .map_err(|e| StoreError::Parse(format!("Invalid store URL: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use rackstock_core::{ProductId, RackId};
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_rest_base() {
        let url = Url::parse("https://abc.supabase.co").unwrap();
        assert_eq!(
            rest_base(&url).unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/"
        );

        let prefixed = Url::parse("https://gateway.local/tenant").unwrap();
        assert_eq!(
            rest_base(&prefixed).unwrap().as_str(),
            "https://gateway.local/tenant/rest/v1/"
        );
    }

    #[test]
    fn test_rack_params() {
        let id = RackId::parse("R1-A").unwrap();
        assert!(rack_params(&RackFilter::All).is_empty());
        assert_eq!(
            rack_params(&RackFilter::RackIdEq(id)),
            vec![("rack_id", "eq.R1-A".to_string())]
        );
        assert_eq!(
            rack_params(&RackFilter::RackIdContains("r1".to_string())),
            vec![("rack_id", "ilike.*r1*".to_string())]
        );
    }

    #[test]
    fn test_product_params() {
        assert_eq!(
            product_params(&ProductFilter::IdEq(ProductId::new(9))),
            vec![("id", "eq.9".to_string())]
        );
        assert_eq!(
            product_params(&ProductFilter::NameContains("mouse".to_string())),
            vec![("product_name", "ilike.*mouse*".to_string())]
        );
        assert_eq!(
            product_params(&ProductFilter::BarcodeEq("123".to_string())),
            vec![("barcode", "eq.123".to_string())]
        );
    }

    #[test]
    fn test_contains_escapes_like_wildcards() {
        assert_eq!(
            product_params(&ProductFilter::NameContains("50_m".to_string())),
            vec![("product_name", r"ilike.*50\_m*".to_string())]
        );
        assert_eq!(
            product_params(&ProductFilter::NameContains("100%".to_string())),
            vec![("product_name", r"ilike.*100\%*".to_string())]
        );
        assert_eq!(
            rack_params(&RackFilter::RackIdContains(r"a\b".to_string())),
            vec![("rack_id", r"ilike.*a\\b*".to_string())]
        );
    }

    #[test]
    fn test_classify_unique_violation() {
        let body = r#"{"code":"23505","details":"Key (rack_id)=(R1-A) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"racks_rack_id_key\""}"#;
        let err = classify_error(409, body);
        assert!(
            matches!(err, StoreError::UniqueViolation(ref d) if d.contains("R1-A")),
            "{err:?}"
        );
    }

    #[test]
    fn test_classify_unauthorized() {
        let body = r#"{"code":"42501","message":"permission denied for table racks"}"#;
        assert!(matches!(classify_error(401, body), StoreError::Unauthorized));
        assert!(matches!(classify_error(403, ""), StoreError::Unauthorized));
    }

    #[test]
    fn test_classify_other_errors() {
        let body = r#"{"code":"PGRST205","message":"Could not find the table 'public.racks'"}"#;
        match classify_error(404, body) {
            StoreError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("public.racks"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match classify_error(502, "Bad Gateway\n") {
            StoreError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let store = PostgRestStore::new(&RemoteStoreConfig {
            url: Url::parse("https://abc.supabase.co").unwrap(),
            api_key: SecretString::from("sb_publishable_k3y"),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("k3y"));
        assert!(debug.contains("https://abc.supabase.co/rest/v1/racks"));
    }
}
