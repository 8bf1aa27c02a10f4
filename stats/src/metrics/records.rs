use super::measure;
use serde::{
    Deserialize,
    Serialize,
};

/// Stable identity of a collaborator. The code keys every feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollaboratorIdentity {
    #[serde(rename = "codigo", deserialize_with = "measure::code")]
    pub code: String,
    #[serde(rename = "nome", default)]
    pub name: String,
}

impl CollaboratorIdentity {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Per-collaborator performance over a period (today or the current month).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceRecord {
    #[serde(rename = "codigo", deserialize_with = "measure::code")]
    pub code: String,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(rename = "ligacoesOferecidas", default, deserialize_with = "measure::count")]
    pub offered: u32,
    #[serde(rename = "ligacoesOferecidasAtendidas", default, deserialize_with = "measure::count")]
    pub answered: u32,
    #[serde(rename = "percentualOferecidasAtendidas", default, deserialize_with = "measure::rate")]
    pub answer_rate: f64,
    /// Average handle time in seconds.
    #[serde(rename = "TMA", alias = "tma", default, deserialize_with = "measure::seconds")]
    pub handle_time: f64,
    #[serde(rename = "tempoAtendimento", default, deserialize_with = "measure::seconds")]
    pub talk_time: f64,
    #[serde(rename = "ligacoesRealizadas", default, deserialize_with = "measure::count")]
    pub outbound_calls: u32,
    #[serde(rename = "tempoLogin", default, deserialize_with = "measure::seconds")]
    pub login_time: f64,
    #[serde(rename = "tempoPausa", default, deserialize_with = "measure::seconds")]
    pub pause_time: f64,
    #[serde(rename = "chamadasPorHora", default, deserialize_with = "measure::decimal")]
    pub calls_per_hour: f64,
}

impl PerformanceRecord {
    /// Zero-valued record for a collaborator without measurements.
    pub fn empty(identity: &CollaboratorIdentity) -> Self {
        Self {
            code: identity.code.clone(),
            name: identity.name.clone(),
            ..Default::default()
        }
    }

    pub fn identity(&self) -> CollaboratorIdentity {
        CollaboratorIdentity::new(&self.code, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceTotals {
    #[serde(rename = "ligacoesOferecidas", default, deserialize_with = "measure::count")]
    pub offered: u32,
    #[serde(rename = "ligacoesOferecidasAtendidas", default, deserialize_with = "measure::count")]
    pub answered: u32,
    #[serde(rename = "percentualOferecidasAtendidas", default, deserialize_with = "measure::rate")]
    pub answer_rate: f64,
}

/// Cache metadata the upstream attaches to each payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CacheInfo {
    #[serde(default)]
    pub cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
    #[serde(default)]
    pub fallback: bool,
}

/// Daily or monthly performance feed payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceReport {
    #[serde(rename = "data", default, deserialize_with = "measure::or_default")]
    pub records: Vec<PerformanceRecord>,
    #[serde(rename = "totais", default, deserialize_with = "measure::or_default")]
    pub totals: PerformanceTotals,
    #[serde(rename = "atualizado_em", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "setor", default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_info: Option<CacheInfo>,
}

impl PerformanceReport {
    pub fn record(&self, code: &str) -> Option<&PerformanceRecord> {
        self.records.iter().find(|record| record.code == code)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActiveCallsRecord {
    #[serde(rename = "codigo", deserialize_with = "measure::code")]
    pub code: String,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(rename = "ligacoesAtivasMes", default, deserialize_with = "measure::count")]
    pub active_calls_this_month: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActiveCallsTotals {
    #[serde(rename = "ligacoesAtivasMes", default, deserialize_with = "measure::count")]
    pub active_calls_this_month: u32,
}

/// Outbound calls placed this month, per collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActiveCallsReport {
    #[serde(rename = "data", default, deserialize_with = "measure::or_default")]
    pub records: Vec<ActiveCallsRecord>,
    #[serde(rename = "totais", default, deserialize_with = "measure::or_default")]
    pub totals: ActiveCallsTotals,
    #[serde(rename = "atualizado_em", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "setor", default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_info: Option<CacheInfo>,
}

impl ActiveCallsReport {
    pub fn record(&self, code: &str) -> Option<&ActiveCallsRecord> {
        self.records.iter().find(|record| record.code == code)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecoveredTodayRecord {
    #[serde(rename = "codigo", deserialize_with = "measure::code")]
    pub code: String,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(rename = "ligacoesRecuperadasDia", default, deserialize_with = "measure::count")]
    pub recovered_today: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecoveredThisMonthRecord {
    #[serde(rename = "codigo", deserialize_with = "measure::code")]
    pub code: String,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(rename = "ligacoesRecuperadasMes", default, deserialize_with = "measure::count")]
    pub recovered_this_month: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecoveredCallsTotals {
    #[serde(rename = "ligacoesRecuperadasDia", default, deserialize_with = "measure::count")]
    pub recovered_today: u32,
    #[serde(rename = "ligacoesRecuperadasMes", default, deserialize_with = "measure::count")]
    pub recovered_this_month: u32,
}

/// Missed calls that a collaborator called back, today and this month.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecoveredCallsReport {
    #[serde(rename = "dia", default, deserialize_with = "measure::or_default")]
    pub daily: Vec<RecoveredTodayRecord>,
    #[serde(rename = "mes", default, deserialize_with = "measure::or_default")]
    pub monthly: Vec<RecoveredThisMonthRecord>,
    #[serde(rename = "totais", default, deserialize_with = "measure::or_default")]
    pub totals: RecoveredCallsTotals,
    #[serde(rename = "atualizado_em", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "setor", default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_info: Option<CacheInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_daily_payload() {
        let report: PerformanceReport = serde_json::from_value(serde_json::json!({
            "data": [{
                "nome": "Pedro Henrique",
                "codigo": "4002",
                "ligacoesOferecidas": 20,
                "ligacoesOferecidasAtendidas": 19,
                "percentualOferecidasAtendidas": 95.0,
                "TMA": "03:10",
                "tempoAtendimento": 3600,
                "ligacoesRealizadas": 4,
                "tempoLogin": 28800,
                "tempoPausa": 1200,
                "chamadasPorHora": "2,5"
            }],
            "totais": {
                "ligacoesOferecidas": 20,
                "ligacoesOferecidasAtendidas": 19,
                "percentualOferecidasAtendidas": 95.0
            },
            "atualizado_em": "2026-10-19 08:00:00",
            "cache_info": { "cached": true, "cache_key": "suporte_hoje_20261019" },
            "setor": "suporte"
        }))
        .unwrap();

        let record = report.record("4002").unwrap();
        assert_eq!(record.handle_time, 190.0);
        assert_eq!(record.calls_per_hour, 2.5);
        assert_eq!(record.outbound_calls, 4);
        assert_eq!(report.sector.as_deref(), Some("suporte"));
        assert_eq!(
            report.cache_info,
            Some(CacheInfo {
                cached: true,
                cache_key: Some("suporte_hoje_20261019".to_string()),
                fallback: false,
            })
        );
    }

    #[test]
    fn decodes_recovered_payload() {
        let report: RecoveredCallsReport = serde_json::from_value(serde_json::json!({
            "dia": [{ "nome": "Pedro Henrique", "codigo": "4002", "ligacoesRecuperadasDia": 3 }],
            "mes": [{ "nome": "Pedro Henrique", "codigo": "4002", "ligacoesRecuperadasMes": 11 }],
            "totais": { "ligacoesRecuperadasDia": 3, "ligacoesRecuperadasMes": 11 },
            "debug_info": { "total_registros": 40 }
        }))
        .unwrap();

        assert_eq!(report.daily[0].recovered_today, 3);
        assert_eq!(report.monthly[0].recovered_this_month, 11);
        assert_eq!(report.totals.recovered_this_month, 11);
    }

    #[test]
    fn null_lists_decode_as_empty_feeds() {
        let report: PerformanceReport =
            serde_json::from_value(serde_json::json!({ "data": null, "totais": null, "setor": "suporte" })).unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.totals, PerformanceTotals::default());
        assert_eq!(report.sector.as_deref(), Some("suporte"));

        let report: ActiveCallsReport = serde_json::from_value(serde_json::json!({ "data": null })).unwrap();
        assert!(report.records.is_empty());

        let report: RecoveredCallsReport =
            serde_json::from_value(serde_json::json!({ "dia": null, "mes": null })).unwrap();
        assert!(report.daily.is_empty());
        assert!(report.monthly.is_empty());
    }

    #[test]
    fn null_handle_time_is_zero() {
        let record: PerformanceRecord =
            serde_json::from_value(serde_json::json!({ "codigo": "4002", "TMA": null, "tempoLogin": null })).unwrap();
        assert_eq!(record.handle_time, 0.0);
        assert_eq!(record.login_time, 0.0);
    }

    #[test]
    fn lowercase_handle_time_key_is_accepted() {
        let record: PerformanceRecord =
            serde_json::from_value(serde_json::json!({ "codigo": "1201", "tma": "1:00:00" })).unwrap();
        assert_eq!(record.handle_time, 3600.0);
        assert_eq!(record.offered, 0);
    }
}
