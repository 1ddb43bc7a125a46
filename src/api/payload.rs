//! Wire shapes returned by the backend and their conversion into domain types.
//!
//! The backend is loose about types (ids and coordinates may arrive as
//! numbers or strings, status as a label or a code), so decoding here is
//! deliberately tolerant and conversion never fails.

use crate::domain::{
    AppointmentRecord, AppointmentStatus, CalledTicket, Service, Timestamp, Unit,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl NumberOrText {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Text(value) => value.trim().parse().ok(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Float(value) if value.fract() == 0.0 => Some(*value as i64),
            Self::Float(_) => None,
            Self::Text(value) => value.trim().parse().ok(),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value,
        }
    }
}

/// Reference to a related entity, e.g. `"servico": {"id": 3, "nome": "Pediatria"}`
#[derive(Debug, Clone, Deserialize)]
pub struct EntityRef {
    #[serde(default)]
    pub id: Option<NumberOrText>,
    #[serde(default)]
    pub nome: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitPayload {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub endereco: Option<String>,
    #[serde(default)]
    pub latitude: Option<NumberOrText>,
    #[serde(default)]
    pub longitude: Option<NumberOrText>,
}

impl From<UnitPayload> for Unit {
    fn from(payload: UnitPayload) -> Self {
        Unit {
            id: payload.id,
            name: payload.nome,
            address: payload.endereco.unwrap_or_default(),
            latitude: payload.latitude.as_ref().and_then(NumberOrText::as_f64),
            longitude: payload.longitude.as_ref().and_then(NumberOrText::as_f64),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServicePayload {
    pub id: i64,
    pub nome: String,
    #[serde(default, rename = "unidadeId", alias = "unidade_id")]
    pub unidade_id: Option<i64>,
    #[serde(default)]
    pub unidade: Option<EntityRef>,
}

impl From<ServicePayload> for Service {
    fn from(payload: ServicePayload) -> Self {
        let unit_id = payload.unidade_id.or_else(|| {
            payload
                .unidade
                .as_ref()
                .and_then(|unit| unit.id.as_ref())
                .and_then(NumberOrText::as_i64)
        });
        Service {
            id: payload.id,
            name: payload.nome,
            unit_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatusPayload {
    Code(i64),
    Label(String),
    Unknown(Value),
}

impl From<StatusPayload> for AppointmentStatus {
    fn from(payload: StatusPayload) -> Self {
        match payload {
            StatusPayload::Code(code) => AppointmentStatus::from_code(code),
            StatusPayload::Label(label) => AppointmentStatus::from_label(&label),
            StatusPayload::Unknown(value) => AppointmentStatus::Other(value.to_string()),
        }
    }
}

/// Strings are kept verbatim; any other non-null value becomes a stamp that
/// is present but never parses.
fn loose_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(Timestamp::new(text)),
        Some(other) => Some(Timestamp::new(other.to_string())),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentPayload {
    #[serde(default)]
    pub id: Option<NumberOrText>,
    #[serde(default)]
    pub status: Option<StatusPayload>,
    #[serde(
        default,
        rename = "dataInicio",
        alias = "dt_inicio",
        deserialize_with = "loose_timestamp"
    )]
    pub data_inicio: Option<Timestamp>,
    #[serde(default, rename = "dataFim", deserialize_with = "loose_timestamp")]
    pub data_fim: Option<Timestamp>,
    #[serde(default, deserialize_with = "loose_timestamp")]
    pub dt_fim: Option<Timestamp>,
    #[serde(default)]
    pub servico: Option<ServiceLabel>,
}

impl From<AppointmentPayload> for AppointmentRecord {
    fn from(payload: AppointmentPayload) -> Self {
        let service_id = match &payload.servico {
            Some(ServiceLabel::Ref(entity)) => entity.id.as_ref().and_then(NumberOrText::as_i64),
            _ => None,
        };

        AppointmentRecord {
            id: payload.id.map(NumberOrText::into_text).unwrap_or_default(),
            status: payload
                .status
                .map(AppointmentStatus::from)
                .unwrap_or_else(|| AppointmentStatus::Other(String::new())),
            started_at: payload.data_inicio,
            finished_at: payload.data_fim,
            // dt_fim only marks completion; durations come from dataFim alone
            closed_at: payload.dt_fim,
            service_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServiceLabel {
    Name(String),
    Ref(EntityRef),
    Unknown(Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketPayload {
    #[serde(alias = "numero", alias = "codigo")]
    pub senha: NumberOrText,
    #[serde(default)]
    pub servico: Option<ServiceLabel>,
    #[serde(default)]
    pub guiche: Option<NumberOrText>,
    #[serde(default, rename = "dataChamada", alias = "data_chamada")]
    pub data_chamada: Option<String>,
}

impl From<TicketPayload> for CalledTicket {
    fn from(payload: TicketPayload) -> Self {
        let service = payload.servico.and_then(|label| match label {
            ServiceLabel::Name(name) => Some(name),
            ServiceLabel::Ref(entity) => entity.nome,
            ServiceLabel::Unknown(_) => None,
        });
        CalledTicket {
            ticket: payload.senha.into_text(),
            service,
            counter: payload.guiche.map(NumberOrText::into_text),
            called_at: payload.data_chamada.map(Timestamp::new),
        }
    }
}
