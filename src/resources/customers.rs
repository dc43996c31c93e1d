//! Customer records.

use serde::{Deserialize, Serialize};

use crate::SdkResult;
use crate::client::MerchantClient;
use crate::time::{Clock, Sleeper};
use crate::transport::{HttpClient, QueryParams, path_segment};

const CUSTOMERS_PATH: &str = "/api/v1/merchant/customers";

/// A customer as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer identifier
    pub id: String,
    /// Contact email
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Phone number in international format
    #[serde(default)]
    pub phone: Option<String>,
    /// Free-form merchant data
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    /// Creation timestamp (RFC 3339)
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of a create call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateCustomer {
    /// Contact email (required)
    pub email: String,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Phone number in international format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Free-form merchant data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl CreateCustomer {
    /// Creates a request with only the required email.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateCustomer {
    /// New contact email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Replacement merchant data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Filters for [`Customers::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCustomers {
    /// Page size; the server default applies when absent
    pub limit: Option<u32>,
    /// `next_cursor` of the previous page
    pub cursor: Option<String>,
    /// Exact email match
    pub email: Option<String>,
}

impl ListCustomers {
    fn query(&self) -> QueryParams {
        QueryParams::new()
            .push("limit", self.limit)
            .push("cursor", self.cursor.as_deref())
            .push("email", self.email.as_deref())
    }
}

/// One page of customers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerList {
    /// Customers on this page
    pub data: Vec<Customer>,
    /// Whether another page follows
    #[serde(default)]
    pub has_more: bool,
    /// Cursor to pass as [`ListCustomers::cursor`] for the next page
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Customer operations, obtained from [`MerchantClient::customers`].
#[derive(Debug)]
pub struct Customers<'a, H, S, C> {
    client: &'a MerchantClient<H, S, C>,
}

impl<'a, H, S, C> Customers<'a, H, S, C> {
    pub(crate) const fn new(client: &'a MerchantClient<H, S, C>) -> Self {
        Self { client }
    }
}

impl<H: HttpClient, S: Sleeper, C: Clock> Customers<'_, H, S, C> {
    /// Lists customers matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns token or transport errors.
    pub async fn list(&self, filter: &ListCustomers) -> SdkResult<CustomerList> {
        let url = self.client.endpoint(CUSTOMERS_PATH, &filter.query())?;
        let config = self.client.authorized().await?;
        self.client.transport().get(url, &config).await
    }

    /// Fetches one customer.
    ///
    /// # Errors
    ///
    /// Returns token or transport errors; an unknown id is an API 404.
    pub async fn get(&self, id: &str) -> SdkResult<Customer> {
        let url = self.client.endpoint(&item_path(id), &QueryParams::new())?;
        let config = self.client.authorized().await?;
        self.client.transport().get(url, &config).await
    }

    /// Creates a customer.
    ///
    /// # Errors
    ///
    /// Returns token or transport errors.
    pub async fn create(&self, request: &CreateCustomer) -> SdkResult<Customer> {
        let url = self.client.endpoint(CUSTOMERS_PATH, &QueryParams::new())?;
        let config = self.client.authorized().await?;
        self.client.transport().post(url, request, &config).await
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns token or transport errors.
    pub async fn update(&self, id: &str, request: &UpdateCustomer) -> SdkResult<Customer> {
        let url = self.client.endpoint(&item_path(id), &QueryParams::new())?;
        let config = self.client.authorized().await?;
        self.client
            .transport()
            .patch(url, Some(request), &config)
            .await
    }

    /// Deletes a customer.
    ///
    /// # Errors
    ///
    /// Returns token or transport errors.
    pub async fn delete(&self, id: &str) -> SdkResult<()> {
        let url = self.client.endpoint(&item_path(id), &QueryParams::new())?;
        let config = self.client.authorized().await?;
        let _: serde_json::Value = self.client.transport().delete(url, &config).await?;
        Ok(())
    }
}

fn item_path(id: &str) -> String {
    format!("{CUSTOMERS_PATH}/{}", path_segment(id))
}
