use crate::metrics::{
    ActiveCallsRecord,
    ActiveCallsReport,
    CacheInfo,
    CollaboratorIdentity,
    PerformanceRecord,
    PerformanceReport,
    RecoveredCallsReport,
    RecoveredThisMonthRecord,
    RecoveredTodayRecord,
};
use callcenter_dashboard_config::Sector;

const SUPPORT_ROSTER: &[(&str, &str)] = &[
    ("4002", "Pedro Henrique"),
    ("4004", "João Miyake"),
    ("4006", "Gabriel Rosa"),
    ("4008", "Gabriel Brambila (Estagiário)"),
    ("4009", "Marcos Moraes (Estagiário)"),
    ("4021", "Rodrigo Akira"),
    ("4025", "Alison da Silva"),
    ("4027", "Pedro Chaves (Estagiário)"),
    ("4028", "Ryan da Silva (Estagiário)"),
    ("4029", "Samuel Mendes (Estagiário)"),
    ("4030", "Pedro Boni"),
    ("4031", "Rafael Guedes"),
    ("4032", "Ricardo Correa"),
    ("4033", "João Silva (Estagiario)"),
];

const COMMERCIAL_ROSTER: &[(&str, &str)] = &[
    ("1201", "Gustavo Leônidas"),
    ("1204", "Tamires Cavalcante"),
    ("1205", "Miguel Roveda"),
    ("1208", "Rennan Taioqui"),
    ("1210", "Rodrigo Boani"),
    ("4016", "Henrique Alves"),
];

/// Produces deterministic zero-valued feed payloads from a static per-sector roster.
///
/// Every payload carries `cache_info.fallback = true` and the requested sector.
pub struct FallbackSynthesizer;

impl FallbackSynthesizer {
    pub fn roster(sector: Sector) -> Vec<CollaboratorIdentity> {
        let roster = match sector {
            Sector::Support => SUPPORT_ROSTER,
            Sector::Commercial => COMMERCIAL_ROSTER,
        };
        roster
            .iter()
            .map(|(code, name)| CollaboratorIdentity::new(*code, *name))
            .collect()
    }

    pub fn daily(sector: Sector) -> PerformanceReport {
        Self::performance(sector)
    }

    pub fn monthly(sector: Sector) -> PerformanceReport {
        Self::performance(sector)
    }

    pub fn active_calls(sector: Sector) -> ActiveCallsReport {
        ActiveCallsReport {
            records: Self::roster(sector)
                .into_iter()
                .map(|identity| ActiveCallsRecord {
                    code: identity.code,
                    name: identity.name,
                    active_calls_this_month: 0,
                })
                .collect(),
            totals: Default::default(),
            updated_at: None,
            sector: Some(sector.as_wire_str().to_string()),
            cache_info: Some(marker()),
        }
    }

    pub fn recovered_calls(sector: Sector) -> RecoveredCallsReport {
        let roster = Self::roster(sector);
        RecoveredCallsReport {
            daily: roster
                .iter()
                .map(|identity| RecoveredTodayRecord {
                    code: identity.code.clone(),
                    name: identity.name.clone(),
                    recovered_today: 0,
                })
                .collect(),
            monthly: roster
                .into_iter()
                .map(|identity| RecoveredThisMonthRecord {
                    code: identity.code,
                    name: identity.name,
                    recovered_this_month: 0,
                })
                .collect(),
            totals: Default::default(),
            updated_at: None,
            sector: Some(sector.as_wire_str().to_string()),
            cache_info: Some(marker()),
        }
    }

    fn performance(sector: Sector) -> PerformanceReport {
        PerformanceReport {
            records: Self::roster(sector).iter().map(PerformanceRecord::empty).collect(),
            totals: Default::default(),
            updated_at: None,
            sector: Some(sector.as_wire_str().to_string()),
            cache_info: Some(marker()),
        }
    }
}

fn marker() -> CacheInfo {
    CacheInfo {
        cached: false,
        cache_key: None,
        fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn roster_sizes() {
        assert_eq!(FallbackSynthesizer::roster(Sector::Support).len(), 14);
        assert_eq!(FallbackSynthesizer::roster(Sector::Commercial).len(), 6);
    }

    #[test]
    fn daily_is_zero_valued_and_marked() {
        let report = FallbackSynthesizer::daily(Sector::Commercial);
        let codes = report.records.iter().map(|r| r.code.as_str()).collect::<Vec<_>>();
        assert_eq!(codes, vec!["1201", "1204", "1205", "1208", "1210", "4016"]);
        assert!(report
            .records
            .iter()
            .all(|r| r.offered == 0 && r.answered == 0 && r.answer_rate == 0.0 && r.handle_time == 0.0));
        assert_eq!(report.totals.offered, 0);
        assert_eq!(report.sector.as_deref(), Some("comercial"));
        assert!(report.cache_info.unwrap().fallback);
    }

    #[test]
    fn every_feed_shares_the_roster() {
        let roster = FallbackSynthesizer::roster(Sector::Support);
        let codes = roster.iter().map(|i| i.code.clone()).collect::<Vec<_>>();

        let monthly = FallbackSynthesizer::monthly(Sector::Support);
        let active = FallbackSynthesizer::active_calls(Sector::Support);
        let recovered = FallbackSynthesizer::recovered_calls(Sector::Support);

        assert_eq!(monthly.records.iter().map(|r| r.code.clone()).collect::<Vec<_>>(), codes);
        assert_eq!(active.records.iter().map(|r| r.code.clone()).collect::<Vec<_>>(), codes);
        assert_eq!(recovered.daily.iter().map(|r| r.code.clone()).collect::<Vec<_>>(), codes);
        assert_eq!(recovered.monthly.iter().map(|r| r.code.clone()).collect::<Vec<_>>(), codes);
        assert!(active.records.iter().all(|r| r.active_calls_this_month == 0));
        assert_eq!(recovered.totals.recovered_this_month, 0);
    }

    #[test]
    fn output_is_deterministic() {
        assert_eq!(
            FallbackSynthesizer::recovered_calls(Sector::Commercial),
            FallbackSynthesizer::recovered_calls(Sector::Commercial)
        );
    }
}
