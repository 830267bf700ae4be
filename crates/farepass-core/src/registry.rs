//! Pass registry

use farepass_api::{ConsumeResult, PassInfo, PassSpec, PassStatus};
use farepass_store::{AuditEvent, AuditEventType, PassRecord, Store};
use farepass_util::{Clock, IdGenerator, PassError, PassId, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{PassEvent, TravelPass};

/// Result of a consumption request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumeOutcome {
    pub pass_id: PassId,
    pub result: ConsumeResult,
    pub events: Vec<PassEvent>,
}

/// Owns every issued pass and serializes access to them
///
/// Mutating operations take `&mut self`, so each pass's check-then-update
/// runs without interleaving. Callers sharing a registry across threads
/// wrap it in a single lock.
pub struct PassRegistry {
    passes: BTreeMap<PassId, TravelPass>,
    ids: IdGenerator,
    clock: Arc<dyn Clock>,
    store: Arc<dyn Store>,
}

impl PassRegistry {
    /// Create an empty registry
    pub fn new(clock: Arc<dyn Clock>, store: Arc<dyn Store>) -> Self {
        info!("Pass registry initialized");

        Self {
            passes: BTreeMap::new(),
            ids: IdGenerator::new(),
            clock,
            store,
        }
    }

    /// Rebuild a registry from the passes saved in `store`
    pub fn restore(clock: Arc<dyn Clock>, store: Arc<dyn Store>) -> Result<Self> {
        let records = store
            .load_passes()
            .map_err(|e| PassError::store(e.to_string()))?;

        let mut passes = BTreeMap::new();
        for record in records {
            let pass = TravelPass::from_record(record)?;
            passes.insert(pass.id(), pass);
        }

        let last_id = passes.keys().next_back().copied();
        let registry = Self {
            ids: IdGenerator::resume_after(last_id),
            passes,
            clock,
            store,
        };

        info!(
            pass_count = registry.passes.len(),
            next_id = %registry.ids.peek(),
            "Pass registry restored"
        );

        Ok(registry)
    }

    /// Issue a new pass
    ///
    /// The request is validated before an id is assigned, so a rejected
    /// request does not consume an id.
    pub fn issue(&mut self, spec: &PassSpec) -> Result<PassId> {
        let pass = TravelPass::from_spec(self.ids.peek(), spec)?;
        let pass_id = self.ids.next_id();

        self.persist(pass.to_record());
        self.audit(AuditEventType::PassIssued {
            pass_id,
            owner: pass.owner().to_string(),
            kind: pass.kind_tag(),
        });

        info!(
            pass_id = %pass_id,
            owner = %pass.owner(),
            kind = %pass.kind_tag(),
            "Pass issued"
        );

        self.passes.insert(pass_id, pass);

        Ok(pass_id)
    }

    /// Issue every pass in a catalog, in order
    pub fn issue_all(&mut self, specs: &[PassSpec]) -> Result<Vec<PassId>> {
        let mut ids = Vec::with_capacity(specs.len());
        for spec in specs {
            ids.push(self.issue(spec)?);
        }

        self.audit(AuditEventType::CatalogLoaded {
            pass_count: ids.len(),
        });
        info!(pass_count = ids.len(), "Catalog issued");

        Ok(ids)
    }

    /// Attempt to use one trip on a pass
    ///
    /// Only an unknown id is an error; refusals come back in the outcome.
    pub fn consume(&mut self, pass_id: PassId) -> Result<ConsumeOutcome> {
        let now = self.clock.now();
        let pass = self
            .passes
            .get_mut(&pass_id)
            .ok_or(PassError::PassNotFound(pass_id))?;

        let result = pass.consume_trip_at(now);
        let remaining = pass.remaining_trips();
        let expires_at = pass.expires_at();
        let record = pass.to_record();

        let mut events = Vec::new();
        match result.denial_reason() {
            None => {
                self.audit(AuditEventType::TripConsumed { pass_id, remaining });
                info!(pass_id = %pass_id, remaining = %remaining, "Trip consumed");
                events.push(PassEvent::TripConsumed { pass_id, remaining });
            }
            Some(reason) => {
                if let (ConsumeResult::DeniedExpired, Some(expired_at)) = (result, expires_at) {
                    self.audit(AuditEventType::PassExpired {
                        pass_id,
                        expired_at,
                    });
                    info!(pass_id = %pass_id, expired_at = %expired_at, "Pass expired");
                    events.push(PassEvent::Expired {
                        pass_id,
                        expired_at,
                    });
                }

                self.audit(AuditEventType::TripDenied { pass_id, reason });
                info!(pass_id = %pass_id, reason = ?reason, "Trip denied");
                events.push(PassEvent::TripDenied { pass_id, reason });
            }
        }

        self.persist(record);

        Ok(ConsumeOutcome {
            pass_id,
            result,
            events,
        })
    }

    /// Mark a pass active. Idempotent.
    pub fn activate(&mut self, pass_id: PassId) -> Result<PassEvent> {
        self.set_status(pass_id, PassStatus::Active)
    }

    /// Mark a pass inactive. Idempotent.
    pub fn deactivate(&mut self, pass_id: PassId) -> Result<PassEvent> {
        self.set_status(pass_id, PassStatus::Inactive)
    }

    fn set_status(&mut self, pass_id: PassId, status: PassStatus) -> Result<PassEvent> {
        let pass = self
            .passes
            .get_mut(&pass_id)
            .ok_or(PassError::PassNotFound(pass_id))?;

        let changed = pass.status() != status;
        match status {
            PassStatus::Active => pass.activate(),
            PassStatus::Inactive => pass.deactivate(),
        }
        let record = pass.to_record();

        if changed {
            self.persist(record);
        }

        self.audit(match status {
            PassStatus::Active => AuditEventType::PassActivated { pass_id, changed },
            PassStatus::Inactive => AuditEventType::PassDeactivated { pass_id, changed },
        });

        info!(pass_id = %pass_id, status = %status, changed, "Pass status set");

        Ok(PassEvent::StatusChanged {
            pass_id,
            status,
            changed,
        })
    }

    /// Get a pass by id
    pub fn get(&self, pass_id: PassId) -> Option<&TravelPass> {
        self.passes.get(&pass_id)
    }

    /// Get the display view of a pass
    pub fn info(&self, pass_id: PassId) -> Result<PassInfo> {
        self.get(pass_id)
            .map(TravelPass::info)
            .ok_or(PassError::PassNotFound(pass_id))
    }

    /// Views of every pass, ordered by id
    pub fn list(&self) -> Vec<PassInfo> {
        self.passes.values().map(TravelPass::info).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// The clock expiry decisions are made against
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Most recent audit events, newest first
    pub fn recent_audits(&self, limit: usize) -> Result<Vec<AuditEvent>> {
        self.store
            .get_recent_audits(limit)
            .map_err(|e| PassError::store(e.to_string()))
    }

    /// Audit events for one pass, newest first
    pub fn pass_audits(&self, pass_id: PassId, limit: usize) -> Result<Vec<AuditEvent>> {
        self.store
            .get_pass_audits(pass_id, limit)
            .map_err(|e| PassError::store(e.to_string()))
    }

    // Store writes are best-effort: a failing store never changes a decision.

    fn audit(&self, event: AuditEventType) {
        let event = AuditEvent::new(self.clock.now(), event);
        if let Err(e) = self.store.append_audit(event) {
            warn!(error = %e, "Failed to append audit event");
        }
    }

    fn persist(&self, record: PassRecord) {
        if let Err(e) = self.store.save_pass(&record) {
            warn!(pass_id = %record.pass_id, error = %e, "Failed to save pass snapshot");
        }
    }
}
