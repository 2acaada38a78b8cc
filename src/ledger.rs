//! Cost Ledger (§4.1): an in-memory append-only record of every billable
//! call, with range/slice aggregation queries.
//!
//! Grounded on the teacher's `audit::logger::AuditLogger`, which likewise
//! treats "append, then answer queries over the append log" as the whole
//! contract; the durable side of that contract (writing to disk) lives in
//! `store.rs`, not here — the ledger itself is a pure in-memory structure
//! guarded by a lock so the Orchestrator and control surface can share it.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::domain::CostRecord;

/// Open question #2: daily/weekly windows use **UTC midnight**, not local
/// time. Applied consistently to `dailyCost` and `providerDailyCost`.
fn utc_midnight_today() -> DateTime<Utc> {
    Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}

pub struct CostLedger {
    records: Mutex<Vec<CostRecord>>,
}

impl Default for CostLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl CostLedger {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Append; no deduplication, no ordering requirement.
    pub fn record(&self, rec: CostRecord) {
        self.records.lock().expect("ledger lock poisoned").push(rec);
    }

    pub fn total(&self) -> f64 {
        self.records
            .lock()
            .expect("ledger lock poisoned")
            .iter()
            .map(|r| r.cost_usd)
            .sum()
    }

    pub fn cost_since(&self, since: DateTime<Utc>) -> f64 {
        self.records
            .lock()
            .expect("ledger lock poisoned")
            .iter()
            .filter(|r| r.timestamp >= since)
            .map(|r| r.cost_usd)
            .sum()
    }

    /// Records without a `taskId` are excluded (§4.1 guarantee).
    pub fn cost_for_task(&self, task_id: &str) -> f64 {
        self.records
            .lock()
            .expect("ledger lock poisoned")
            .iter()
            .filter(|r| r.task_id.as_deref() == Some(task_id))
            .map(|r| r.cost_usd)
            .sum()
    }

    pub fn cost_for_phase(&self, phase: &str) -> f64 {
        self.records
            .lock()
            .expect("ledger lock poisoned")
            .iter()
            .filter(|r| r.phase == phase)
            .map(|r| r.cost_usd)
            .sum()
    }

    pub fn cost_for_provider(&self, provider: &str, since: DateTime<Utc>) -> f64 {
        self.records
            .lock()
            .expect("ledger lock poisoned")
            .iter()
            .filter(|r| r.provider == provider && r.timestamp >= since)
            .map(|r| r.cost_usd)
            .sum()
    }

    pub fn daily_cost(&self) -> f64 {
        self.cost_since(utc_midnight_today())
    }

    pub fn weekly_cost(&self) -> f64 {
        self.cost_since(Utc::now() - Duration::days(7))
    }

    pub fn provider_daily_cost(&self, provider: &str) -> f64 {
        self.cost_for_provider(provider, utc_midnight_today())
    }

    /// Defensive copy; never exposes the internal container by reference.
    pub fn get_records(&self) -> Vec<CostRecord> {
        self.records.lock().expect("ledger lock poisoned").clone()
    }

    /// Replaces internal state, for durable restore.
    pub fn load_records(&self, records: Vec<CostRecord>) {
        *self.records.lock().expect("ledger lock poisoned") = records;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(provider: &str, phase: &str, task_id: Option<&str>, cost: f64) -> CostRecord {
        CostRecord {
            timestamp: Utc::now(),
            phase: phase.to_string(),
            task_id: task_id.map(|s| s.to_string()),
            provider: provider.to_string(),
            model: "m".to_string(),
            input_tokens: 0,
            output_tokens: 0,
            cost_usd: cost,
            latency_ms: 0,
        }
    }

    #[test]
    fn empty_ledger_queries_return_zero() {
        let ledger = CostLedger::new();
        assert_eq!(ledger.total(), 0.0);
        assert_eq!(ledger.cost_for_task("nope"), 0.0);
        assert_eq!(ledger.daily_cost(), 0.0);
    }

    #[test]
    fn cost_for_task_excludes_taskless_records() {
        let ledger = CostLedger::new();
        ledger.record(rec("openai", "scan", None, 5.0));
        ledger.record(rec("openai", "build", Some("t1"), 3.0));
        assert_eq!(ledger.cost_for_task("t1"), 3.0);
        assert_eq!(ledger.total(), 8.0);
    }

    #[test]
    fn task_isolation_property() {
        let ledger = CostLedger::new();
        ledger.record(rec("openai", "build", Some("a"), 1.0));
        ledger.record(rec("openai", "build", Some("b"), 2.0));
        ledger.record(rec("openai", "build", None, 100.0));
        assert!(ledger.cost_for_task("a") + ledger.cost_for_task("b") <= ledger.total());
    }

    #[test]
    fn cost_since_never_exceeds_total() {
        let ledger = CostLedger::new();
        for i in 0..5 {
            ledger.record(rec("claude", "build", Some(&format!("t{i}")), 1.0));
        }
        let since = Utc::now() - Duration::hours(1);
        assert!(ledger.cost_since(since) <= ledger.total());
    }

    #[test]
    fn get_records_is_a_defensive_copy() {
        let ledger = CostLedger::new();
        ledger.record(rec("claude", "build", Some("t1"), 1.0));
        let mut copy = ledger.get_records();
        copy.push(rec("claude", "build", Some("t2"), 99.0));
        assert_eq!(ledger.get_records().len(), 1);
    }

    #[test]
    fn load_records_round_trips() {
        let ledger = CostLedger::new();
        ledger.record(rec("gemini", "scan", None, 2.5));
        let snapshot = ledger.get_records();
        let restored = CostLedger::new();
        restored.load_records(snapshot.clone());
        assert_eq!(restored.get_records().len(), snapshot.len());
        assert_eq!(restored.total(), ledger.total());
    }

    #[test]
    fn provider_daily_cost_only_counts_matching_provider() {
        let ledger = CostLedger::new();
        ledger.record(rec("openai", "plan", None, 4.0));
        ledger.record(rec("claude", "plan", None, 10.0));
        assert_eq!(ledger.provider_daily_cost("openai"), 4.0);
    }
}
