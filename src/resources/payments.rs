//! Payments across card, bank transfer and mobile money providers.

use serde::{Deserialize, Serialize};

use crate::client::MerchantClient;
use crate::environment::sandbox_only;
use crate::time::{Clock, Sleeper};
use crate::transport::{HttpClient, QueryParams, path_segment};
use crate::{SdkError, SdkResult};

const PAYMENTS_PATH: &str = "/api/v1/merchant/payments";

/// Amount and currency shared by every payment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    /// Amount in minor units
    pub amount: u64,
    /// ISO 4217 code
    pub currency: String,
    /// Paying customer, if known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub customer_id: Option<String>,
    /// Free text shown on statements and in the dashboard
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

impl Charge {
    /// Creates a charge without customer or description.
    #[must_use]
    pub fn new(amount: u64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            customer_id: None,
            description: None,
        }
    }

    /// Attaches the paying customer.
    #[must_use]
    pub fn for_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }
}

/// Card payment using a token from the hosted card form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPayment {
    /// Amount, currency and payer
    #[serde(flatten)]
    pub charge: Charge,
    /// Single-use token issued by the hosted card form
    pub card_token: String,
}

/// Direct debit from a bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransferPayment {
    /// Amount, currency and payer
    #[serde(flatten)]
    pub charge: Charge,
    /// Code of the debited bank
    pub bank_code: String,
    /// Debited account at that bank
    pub account_number: String,
}

/// Mobile wallet collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileMoneyPayment {
    /// Amount, currency and payer
    #[serde(flatten)]
    pub charge: Charge,
    /// Wallet number in international format
    pub phone_number: String,
    /// Operator code, e.g. `mtn`
    pub operator: String,
}

/// Payment request, tagged on the wire by `provider`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum PaymentRequest {
    /// `provider = "card"`
    Card(CardPayment),
    /// `provider = "bank_transfer"`
    BankTransfer(BankTransferPayment),
    /// `provider = "mobile_money"`
    MobileMoney(MobileMoneyPayment),
}

impl PaymentRequest {
    /// Wire name of the provider.
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        match self {
            Self::Card(_) => "card",
            Self::BankTransfer(_) => "bank_transfer",
            Self::MobileMoney(_) => "mobile_money",
        }
    }

    /// Returns the common charge fields.
    #[must_use]
    pub const fn charge(&self) -> &Charge {
        match self {
            Self::Card(p) => &p.charge,
            Self::BankTransfer(p) => &p.charge,
            Self::MobileMoney(p) => &p.charge,
        }
    }

    /// Rejects requests missing provider-specific fields.
    ///
    /// # Errors
    ///
    /// Returns a status 400 error naming the first empty field.
    pub fn validate(&self) -> SdkResult<()> {
        if self.charge().amount == 0 {
            return Err(invalid("amount must be greater than zero"));
        }
        if self.charge().currency.trim().is_empty() {
            return Err(invalid("currency is required"));
        }

        let missing = self
            .required_fields()
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());
        if let Some((field, _)) = missing {
            let provider = self.provider();
            return Err(invalid(&format!("{field} is required for {provider} payments")));
        }
        Ok(())
    }

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Card(p) => vec![("card_token", p.card_token.as_str())],
            Self::BankTransfer(p) => vec![
                ("bank_code", p.bank_code.as_str()),
                ("account_number", p.account_number.as_str()),
            ],
            Self::MobileMoney(p) => vec![
                ("phone_number", p.phone_number.as_str()),
                ("operator", p.operator.as_str()),
            ],
        }
    }
}

fn invalid(message: &str) -> SdkError {
    SdkError::with_status(format!("Invalid payment request: {message}"), 400)
}

/// Lifecycle state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created, not yet submitted to the provider
    Pending,
    /// Awaiting the provider's decision
    Processing,
    /// Funds captured
    Succeeded,
    /// Declined or errored at the provider
    Failed,
    /// Cancelled before completion
    Cancelled,
    /// A state this client does not know yet.
    #[serde(other)]
    Unknown,
}

/// A payment as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Payment {
    /// Payment identifier, e.g. `pay_123`
    pub id: String,
    /// Current lifecycle state
    pub status: PaymentStatus,
    /// Amount in minor units
    pub amount: u64,
    /// ISO 4217 code
    pub currency: String,
    /// Wire name of the provider
    pub provider: String,
    /// Paying customer, if known
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Creation timestamp as sent by the server
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Outcome forced by [`Payments::simulate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulatedOutcome {
    /// Settle as [`PaymentStatus::Succeeded`]
    Succeeded,
    /// Settle as [`PaymentStatus::Failed`]
    Failed,
}

#[derive(Serialize)]
struct SimulateBody {
    outcome: SimulatedOutcome,
}

/// Payment operations, obtained from [`MerchantClient::payments`].
#[derive(Debug)]
pub struct Payments<'a, H, S, C> {
    client: &'a MerchantClient<H, S, C>,
}

impl<'a, H, S, C> Payments<'a, H, S, C> {
    pub(crate) const fn new(client: &'a MerchantClient<H, S, C>) -> Self {
        Self { client }
    }
}

impl<H: HttpClient, S: Sleeper, C: Clock> Payments<'_, H, S, C> {
    /// Creates a payment after local validation.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request is sent, otherwise
    /// token or transport errors.
    pub async fn create(&self, request: &PaymentRequest) -> SdkResult<Payment> {
        request.validate()?;
        let url = self.client.endpoint(PAYMENTS_PATH, &QueryParams::new())?;
        let config = self.client.authorized().await?;

        tracing::debug!(
            provider = request.provider(),
            amount = request.charge().amount,
            "Creating payment"
        );
        self.client.transport().post(url, request, &config).await
    }

    /// Fetches one payment.
    ///
    /// # Errors
    ///
    /// Returns token or transport errors.
    pub async fn get(&self, id: &str) -> SdkResult<Payment> {
        let url = self.client.endpoint(&item_path(id), &QueryParams::new())?;
        let config = self.client.authorized().await?;
        self.client.transport().get(url, &config).await
    }

    /// Forces a sandbox payment into a final state.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Environment`] in production without sending
    /// anything, otherwise token or transport errors.
    pub async fn simulate(&self, id: &str, outcome: SimulatedOutcome) -> SdkResult<Payment> {
        sandbox_only(self.client, "payments.simulate", || async {
            let url = self
                .client
                .endpoint(&format!("{}/simulate", item_path(id)), &QueryParams::new())?;
            let config = self.client.authorized().await?;
            self.client
                .transport()
                .post(url, &SimulateBody { outcome }, &config)
                .await
        })
        .await
    }
}

fn item_path(id: &str) -> String {
    format!("{PAYMENTS_PATH}/{}", path_segment(id))
}
