use crate::domain::ports::{
    CardGateway, ChargeGateway, CustomerGateway, PlanGateway, SubscriptionGateway,
};
use crate::domain::remote::{
    NewCharge, NewCustomer, NewPlan, NewSubscription, PlanUpdate, RemoteCard, RemoteCharge,
    RemoteCustomer, RemoteId, RemotePlan, RemoteSubscription, SubscriptionUpdate,
};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Connection settings for the gateway's REST API.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// E.g. `https://sandbox-api.openpay.mx`.
    pub base_url: String,
    pub merchant_id: String,
    pub api_key: String,
}

/// Error body returned by the gateway on non-2xx responses.
#[derive(Debug, serde::Deserialize)]
struct ErrorPayload {
    description: Option<String>,
    error_code: Option<u32>,
}

#[derive(Serialize)]
struct TokenizedCard<'a> {
    token_id: &'a str,
    device_session_id: &'a str,
}

#[derive(Serialize)]
struct RefundRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// Remote gateway client over HTTP. Authentication is HTTP basic with the
/// API key as the user name and an empty password.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    config: HttpGatewayConfig,
}

impl HttpGateway {
    pub fn new(config: HttpGatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/v1/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.merchant_id,
            path
        )
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response
            .json::<ErrorPayload>()
            .await
            .ok()
            .map(|payload| {
                format!(
                    "{} (code {})",
                    payload.description.unwrap_or_default(),
                    payload.error_code.unwrap_or_default()
                )
            })
            .unwrap_or_default();
        Err(SyncError::Gateway(format!("{status} {detail}")))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .basic_auth(&self.config.api_key, Some(""))
            .send()
            .await?;
        debug!(status = %response.status(), "gateway response");
        Ok(Self::check(response).await?.json().await?)
    }

    async fn send_no_body(&self, request: RequestBuilder) -> Result<()> {
        let response = request
            .basic_auth(&self.config.api_key, Some(""))
            .send()
            .await?;
        debug!(status = %response.status(), "gateway response");
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl CustomerGateway for HttpGateway {
    async fn create_customer(&self, payload: &NewCustomer) -> Result<RemoteCustomer> {
        self.send(self.client.post(self.url("customers")).json(payload))
            .await
    }

    async fn retrieve_customer(&self, id: &RemoteId) -> Result<RemoteCustomer> {
        self.send(self.client.get(self.url(&format!("customers/{id}"))))
            .await
    }

    async fn update_customer(
        &self,
        id: &RemoteId,
        payload: &NewCustomer,
    ) -> Result<RemoteCustomer> {
        self.send(
            self.client
                .put(self.url(&format!("customers/{id}")))
                .json(payload),
        )
        .await
    }

    async fn delete_customer(&self, id: &RemoteId) -> Result<()> {
        self.send_no_body(self.client.delete(self.url(&format!("customers/{id}"))))
            .await
    }
}

#[async_trait]
impl CardGateway for HttpGateway {
    async fn create_card_from_token(
        &self,
        customer: &RemoteId,
        token_id: &str,
        device_session_id: &str,
    ) -> Result<RemoteCard> {
        let body = TokenizedCard {
            token_id,
            device_session_id,
        };
        self.send(
            self.client
                .post(self.url(&format!("customers/{customer}/cards")))
                .json(&body),
        )
        .await
    }

    async fn retrieve_card(&self, customer: &RemoteId, id: &RemoteId) -> Result<RemoteCard> {
        self.send(
            self.client
                .get(self.url(&format!("customers/{customer}/cards/{id}"))),
        )
        .await
    }

    async fn delete_card(&self, customer: &RemoteId, id: &RemoteId) -> Result<()> {
        self.send_no_body(
            self.client
                .delete(self.url(&format!("customers/{customer}/cards/{id}"))),
        )
        .await
    }
}

#[async_trait]
impl PlanGateway for HttpGateway {
    async fn create_plan(&self, payload: &NewPlan) -> Result<RemotePlan> {
        self.send(self.client.post(self.url("plans")).json(payload))
            .await
    }

    async fn retrieve_plan(&self, id: &RemoteId) -> Result<RemotePlan> {
        self.send(self.client.get(self.url(&format!("plans/{id}"))))
            .await
    }

    async fn update_plan(&self, id: &RemoteId, payload: &PlanUpdate) -> Result<RemotePlan> {
        self.send(
            self.client
                .put(self.url(&format!("plans/{id}")))
                .json(payload),
        )
        .await
    }

    async fn delete_plan(&self, id: &RemoteId) -> Result<()> {
        self.send_no_body(self.client.delete(self.url(&format!("plans/{id}"))))
            .await
    }
}

#[async_trait]
impl SubscriptionGateway for HttpGateway {
    async fn create_subscription(
        &self,
        customer: &RemoteId,
        payload: &NewSubscription,
    ) -> Result<RemoteSubscription> {
        self.send(
            self.client
                .post(self.url(&format!("customers/{customer}/subscriptions")))
                .json(payload),
        )
        .await
    }

    async fn retrieve_subscription(
        &self,
        customer: &RemoteId,
        id: &RemoteId,
    ) -> Result<RemoteSubscription> {
        self.send(
            self.client
                .get(self.url(&format!("customers/{customer}/subscriptions/{id}"))),
        )
        .await
    }

    async fn update_subscription(
        &self,
        customer: &RemoteId,
        id: &RemoteId,
        payload: &SubscriptionUpdate,
    ) -> Result<RemoteSubscription> {
        self.send(
            self.client
                .put(self.url(&format!("customers/{customer}/subscriptions/{id}")))
                .json(payload),
        )
        .await
    }

    async fn delete_subscription(&self, customer: &RemoteId, id: &RemoteId) -> Result<()> {
        self.send_no_body(
            self.client
                .delete(self.url(&format!("customers/{customer}/subscriptions/{id}"))),
        )
        .await
    }
}

#[async_trait]
impl ChargeGateway for HttpGateway {
    async fn create_charge(
        &self,
        customer: &RemoteId,
        payload: &NewCharge,
    ) -> Result<RemoteCharge> {
        self.send(
            self.client
                .post(self.url(&format!("customers/{customer}/charges")))
                .json(payload),
        )
        .await
    }

    async fn retrieve_charge(&self, customer: &RemoteId, id: &RemoteId) -> Result<RemoteCharge> {
        self.send(
            self.client
                .get(self.url(&format!("customers/{customer}/charges/{id}"))),
        )
        .await
    }

    async fn capture_charge(&self, customer: &RemoteId, id: &RemoteId) -> Result<RemoteCharge> {
        self.send(
            self.client
                .post(self.url(&format!("customers/{customer}/charges/{id}/capture"))),
        )
        .await
    }

    async fn refund_charge(
        &self,
        customer: &RemoteId,
        id: &RemoteId,
        description: Option<&str>,
    ) -> Result<RemoteCharge> {
        let body = RefundRequest { description };
        self.send(
            self.client
                .post(self.url(&format!("customers/{customer}/charges/{id}/refund")))
                .json(&body),
        )
        .await
    }
}
