use super::UpaDataSource;
use crate::api::payload::{
    AppointmentPayload, ServicePayload, TicketPayload, UnitPayload,
};
use crate::api::ApiClient;
use crate::auth::PasswordGrantTokenProvider;
use crate::config::Config;
use crate::domain::{AppointmentRecord, CalledTicket, Service, ServiceId, Unit, UnitId};
use crate::error::Result;
use crate::stats::StatisticsQuery;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Status code the backend uses for waiting appointments
const WAITING_STATUS_CODE: &str = "1";

/// Live data source backed by the REST API
pub struct HttpDataSource {
    api: ApiClient,
    request_limit: u32,
}

impl HttpDataSource {
    pub fn new(api: ApiClient, request_limit: u32) -> Self {
        Self { api, request_limit }
    }

    /// Wire up the HTTP client and password-grant authentication from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let api_url = config.api_url()?;
        let client = ApiClient::http_client(config.request_timeout)?;
        let tokens = Arc::new(PasswordGrantTokenProvider::new(
            client.clone(),
            &api_url,
            config.oauth.clone(),
        ));
        Ok(Self::new(
            ApiClient::new(client, &api_url, tokens),
            config.request_limit,
        ))
    }

    async fn fetch_appointments(&self, query: &[(&str, String)]) -> Result<Vec<AppointmentRecord>> {
        let values: Vec<Value> = self.api.get_json("/atendimentos", query).await?;
        let fetched = values.len();
        let records: Vec<AppointmentRecord> = values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<AppointmentPayload>(value) {
                Ok(payload) => Some(payload.into()),
                Err(e) => {
                    warn!("Skipping undecodable appointment: {}", e);
                    None
                }
            })
            .collect();
        debug!("Fetched {} appointments, {} decoded", fetched, records.len());
        Ok(records)
    }
}

#[async_trait]
impl UpaDataSource for HttpDataSource {
    async fn list_units(&self) -> Result<Vec<Unit>> {
        let payloads: Vec<UnitPayload> = self.api.get_json("/unidades", &[]).await?;
        Ok(payloads.into_iter().map(Unit::from).collect())
    }

    async fn get_unit(&self, unit_id: UnitId) -> Result<Unit> {
        let payload: UnitPayload = self
            .api
            .get_json(&format!("/unidades/{unit_id}"), &[])
            .await?;
        Ok(payload.into())
    }

    async fn list_services(&self) -> Result<Vec<Service>> {
        let payloads: Vec<ServicePayload> = self.api.get_json("/servicos", &[]).await?;
        Ok(payloads.into_iter().map(Service::from).collect())
    }

    async fn services_by_unit(&self, unit_id: UnitId) -> Result<Vec<Service>> {
        let payloads: Vec<ServicePayload> = self
            .api
            .get_json("/servicos", &[("unidade", unit_id.to_string())])
            .await?;
        Ok(payloads.into_iter().map(Service::from).collect())
    }

    async fn queue_by_unit(&self, unit_id: UnitId) -> Result<Vec<AppointmentRecord>> {
        self.fetch_appointments(&[
            ("unidade", unit_id.to_string()),
            ("status", WAITING_STATUS_CODE.to_string()),
            ("limit", self.request_limit.to_string()),
        ])
        .await
    }

    async fn queue_by_service(&self, service_id: ServiceId) -> Result<Vec<AppointmentRecord>> {
        self.fetch_appointments(&[
            ("servico", service_id.to_string()),
            ("status", WAITING_STATUS_CODE.to_string()),
            ("limit", self.request_limit.to_string()),
        ])
        .await
    }

    async fn appointments(&self, query: &StatisticsQuery) -> Result<Vec<AppointmentRecord>> {
        // No status filter: the backend does not apply it reliably
        let mut params = Vec::with_capacity(3);
        if let Some(unit_id) = query.unit_id {
            params.push(("unidade", unit_id.to_string()));
        }
        if let Some(service_id) = query.service_id {
            params.push(("servico", service_id.to_string()));
        }
        params.push(("limit", self.request_limit.to_string()));

        self.fetch_appointments(&params).await
    }

    async fn called_tickets(&self, unit_id: UnitId) -> Result<Vec<CalledTicket>> {
        let payloads: Vec<TicketPayload> = self
            .api
            .get_json(&format!("/painel/{unit_id}"), &[])
            .await?;
        Ok(payloads.into_iter().map(CalledTicket::from).collect())
    }
}
