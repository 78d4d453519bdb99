//! Session implementation

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::PositionDirective;
use crate::registry::ItemRegistry;
use crate::scheduler::{Credential, ScheduleRequest, SchedulerClient, SchedulerError, SheetSource};
use crate::store::{ConstraintStore, MoveOutcome};
use crate::wire::{self, ConstraintSpecification, ScheduleResult};

use super::error::SessionError;

// Id of the ticket holding the submission slot; 0 when the slot is free
const SLOT_FREE: u64 = 0;

/// An outstanding submission
///
/// Not `Clone`: each ticket is finished at most once. Dropping an
/// unfinished ticket (a cancelled `submit` future, for instance) frees the
/// submission slot, unless a newer ticket already holds it.
#[derive(Debug)]
pub struct SubmissionTicket {
    id: u64,
    generation: u64,
    request: ScheduleRequest,
    submitted_at: DateTime<Utc>,
    slot: Arc<AtomicU64>,
}

impl SubmissionTicket {
    /// Free the slot if this ticket still holds it; true when it did
    fn release(&self) -> bool {
        self.slot
            .compare_exchange(self.id, SLOT_FREE, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn request(&self) -> &ScheduleRequest {
        &self.request
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        if self.release() {
            warn!(ticket = self.id, generation = self.generation, "Submission abandoned before a response arrived");
        }
    }
}

/// What became of a finished submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Results replaced the displayed ones
    Applied { count: usize },
    /// The session moved on before the response arrived
    Discarded,
}

/// One user's editing session over one item source
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    generation: u64,
    registry: ItemRegistry,
    store: ConstraintStore,
    source: SheetSource,
    credential: Option<Credential>,
    slot: Arc<AtomicU64>,
    last_ticket: u64,
    results: Vec<ScheduleResult>,
    results_received_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Start a session with every item Unassigned
    pub fn new(registry: ItemRegistry, source: SheetSource) -> Self {
        let id = Uuid::now_v7();
        info!(%id, items = registry.len(), sheet = %source.sheet_name, "Session started");
        Self {
            id,
            generation: 0,
            store: ConstraintStore::new(&registry),
            registry,
            source,
            credential: None,
            slot: Arc::new(AtomicU64::new(SLOT_FREE)),
            last_ticket: 0,
            results: Vec::new(),
            results_received_at: None,
        }
    }

    /// Attach the credential handed out by the identity provider
    pub fn sign_in(&mut self, credential: Credential) {
        debug!(id = %self.id, "sign_in: called");
        self.credential = Some(credential);
    }

    /// Drop the credential and abandon any outstanding submission
    pub fn sign_out(&mut self) {
        debug!(id = %self.id, "sign_out: called");
        self.credential = None;
        self.advance_generation();
    }

    /// Replace the item source; the store is rebuilt from scratch
    pub fn reset(&mut self, registry: ItemRegistry, source: SheetSource) {
        info!(id = %self.id, items = registry.len(), sheet = %source.sheet_name, "Session reset");
        self.store = ConstraintStore::new(&registry);
        self.registry = registry;
        self.source = source;
        self.results.clear();
        self.results_received_at = None;
        self.advance_generation();
    }

    fn advance_generation(&mut self) {
        self.generation += 1;
        if self.slot.swap(SLOT_FREE, Ordering::SeqCst) != SLOT_FREE {
            debug!(generation = self.generation, "advance_generation: abandoning outstanding submission");
        }
    }

    /// Move an item; see [`ConstraintStore::move_item`]
    pub fn move_item(
        &mut self,
        item: &str,
        source_bucket: &str,
        source_index: usize,
        dest_bucket: &str,
        dest_index: usize,
    ) -> Result<MoveOutcome, SessionError> {
        Ok(self
            .store
            .move_item(item, source_bucket, source_index, dest_bucket, dest_index)?)
    }

    /// Set a position directive; see [`ConstraintStore::set_position_directive`]
    pub fn set_position_directive(&mut self, item: &str, directive: PositionDirective) -> Result<(), SessionError> {
        Ok(self.store.set_position_directive(item, directive)?)
    }

    /// Place items according to a saved specification
    pub fn apply_specification(&mut self, spec: &ConstraintSpecification) -> Result<(), SessionError> {
        debug!(id = %self.id, "apply_specification: called");
        Ok(self.store.apply_specification(spec)?)
    }

    /// Reserve the single submission slot and build the request
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, SessionError> {
        debug!(id = %self.id, generation = self.generation, "begin_submission: called");
        if self.is_submitting() {
            debug!("begin_submission: already in flight");
            return Err(SessionError::SubmissionInProgress);
        }
        let token = self.credential.clone().ok_or(SessionError::NoCredential)?;

        let request = ScheduleRequest {
            token,
            source: self.source.clone(),
            preferences: wire::serialize(&self.store),
        };
        self.last_ticket += 1;
        self.slot.store(self.last_ticket, Ordering::SeqCst);

        info!(id = %self.id, generation = self.generation, revision = self.store.revision(), "Submission started");
        Ok(SubmissionTicket {
            id: self.last_ticket,
            generation: self.generation,
            request,
            submitted_at: Utc::now(),
            slot: Arc::clone(&self.slot),
        })
    }

    /// Settle a submission with the scheduler's response
    ///
    /// A ticket from an earlier generation is discarded without touching
    /// anything. Otherwise the slot is released; on a parse or transport
    /// failure the previously displayed results stay as they were.
    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        response: Result<String, SchedulerError>,
    ) -> Result<SubmissionOutcome, SessionError> {
        debug!(id = %self.id, ticket_generation = ticket.generation, "finish_submission: called");
        if ticket.generation != self.generation {
            warn!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "Discarding response for a stale session"
            );
            return Ok(SubmissionOutcome::Discarded);
        }
        ticket.release();

        let body = response.map_err(|e| {
            warn!(error = %e, "Submission failed");
            SessionError::from(e)
        })?;
        let results = wire::parse_results(&body)?;

        let count = results.len();
        self.results = results;
        self.results_received_at = Some(Utc::now());
        info!(
            count,
            elapsed_ms = (Utc::now() - ticket.submitted_at).num_milliseconds(),
            "Submission results applied"
        );
        Ok(SubmissionOutcome::Applied { count })
    }

    /// Submit and wait for the scheduler in one step
    pub async fn submit(&mut self, client: &dyn SchedulerClient) -> Result<SubmissionOutcome, SessionError> {
        let ticket = self.begin_submission()?;
        let response = client.schedule(ticket.request()).await;
        self.finish_submission(ticket, response)
    }

    /// The specification a submission would send right now
    pub fn specification(&self) -> ConstraintSpecification {
        wire::serialize(&self.store)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ConstraintStore {
        &self.store
    }

    pub fn source(&self) -> &SheetSource {
        &self.source
    }

    pub fn is_signed_in(&self) -> bool {
        self.credential.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.slot.load(Ordering::SeqCst) != SLOT_FREE
    }

    /// Results of the last successful submission
    pub fn results(&self) -> &[ScheduleResult] {
        &self.results
    }

    pub fn results_received_at(&self) -> Option<DateTime<Utc>> {
        self.results_received_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::client::mock::{MockReply, MockSchedulerClient};

    const RESPONSE: &str = r#"{"results":[{"schedule":["Tango","Waltz","Foxtrot"],"cost":1,
        "collisions":[{"member":"Alice","previousItem":"Tango","currentItem":"Waltz"}]}]}"#;

    fn session() -> Session {
        let registry = ItemRegistry::new(["Waltz", "Tango", "Foxtrot"]).unwrap();
        let mut session = Session::new(registry, SheetSource::new("sheet-1", "Spring"));
        session.sign_in(Credential::new("tok"));
        session
    }

    #[tokio::test]
    async fn test_submit_applies_results() {
        let mut session = session();
        session.move_item("Tango", "Unassigned", 1, "Start", 0).unwrap();
        let client = MockSchedulerClient::new(vec![MockReply::Body(RESPONSE.to_string())]);

        let outcome = session.submit(&client).await.unwrap();

        assert_eq!(outcome, SubmissionOutcome::Applied { count: 1 });
        assert_eq!(session.results()[0].cost, 1);
        assert!(session.results_received_at().is_some());
        assert!(!session.is_submitting());

        let sent = client.requests();
        assert_eq!(sent[0].preferences.start, vec!["Tango"]);
        assert_eq!(sent[0].source.spreadsheet_id, "sheet-1");
        assert_eq!(sent[0].token.expose(), "tok");
    }

    #[test]
    fn test_second_submission_rejected_while_pending() {
        let mut session = session();
        let _ticket = session.begin_submission().unwrap();
        let before = session.store().clone();

        assert!(matches!(
            session.begin_submission(),
            Err(SessionError::SubmissionInProgress)
        ));
        assert_eq!(session.store(), &before);
    }

    #[test]
    fn test_store_stays_mutable_while_pending() {
        let mut session = session();
        let ticket = session.begin_submission().unwrap();

        session.move_item("Waltz", "Unassigned", 0, "End", 0).unwrap();
        assert!(ticket.request().preferences.end.is_empty());
        assert_eq!(session.specification().end, vec!["Waltz"]);
    }

    #[test]
    fn test_stale_response_is_discarded_after_reset() {
        let mut session = session();
        let ticket = session.begin_submission().unwrap();

        let registry = ItemRegistry::new(["Salsa", "Rumba"]).unwrap();
        session.reset(registry, SheetSource::new("sheet-2", "Fall"));

        let outcome = session.finish_submission(ticket, Ok(RESPONSE.to_string())).unwrap();
        assert_eq!(outcome, SubmissionOutcome::Discarded);
        assert!(session.results().is_empty());
        assert!(!session.is_submitting());
        assert_eq!(session.store().total_items(), 2);
    }

    #[test]
    fn test_stale_response_is_discarded_after_sign_out() {
        let mut session = session();
        let ticket = session.begin_submission().unwrap();
        session.sign_out();

        let outcome = session.finish_submission(ticket, Ok(RESPONSE.to_string())).unwrap();
        assert_eq!(outcome, SubmissionOutcome::Discarded);
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_stale_ticket_does_not_release_new_slot() {
        let mut session = session();
        let stale = session.begin_submission().unwrap();
        session.reset(
            ItemRegistry::new(["Salsa"]).unwrap(),
            SheetSource::new("sheet-2", "Fall"),
        );
        let _current = session.begin_submission().unwrap();

        session.finish_submission(stale, Ok(RESPONSE.to_string())).unwrap();
        assert!(session.is_submitting());
        assert!(matches!(
            session.begin_submission(),
            Err(SessionError::SubmissionInProgress)
        ));
    }

    /// Scheduler that never answers
    struct SilentScheduler;

    #[async_trait::async_trait]
    impl SchedulerClient for SilentScheduler {
        async fn schedule(&self, _request: &ScheduleRequest) -> Result<String, SchedulerError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancelled_submit_frees_slot() {
        let mut session = session();

        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(50), session.submit(&SilentScheduler))
            .await
            .is_err();
        assert!(timed_out);
        assert!(!session.is_submitting());

        let client = MockSchedulerClient::new(vec![MockReply::Body(RESPONSE.to_string())]);
        let outcome = session.submit(&client).await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::Applied { count: 1 });
    }

    #[test]
    fn test_dropped_ticket_frees_slot() {
        let mut session = session();
        let ticket = session.begin_submission().unwrap();
        assert!(session.is_submitting());

        drop(ticket);
        assert!(!session.is_submitting());
        assert!(session.begin_submission().is_ok());
    }

    #[test]
    fn test_dropped_stale_ticket_keeps_new_slot() {
        let mut session = session();
        let stale = session.begin_submission().unwrap();
        session.sign_out();
        session.sign_in(Credential::new("tok-2"));
        let _current = session.begin_submission().unwrap();

        drop(stale);
        assert!(session.is_submitting());
        assert!(matches!(
            session.begin_submission(),
            Err(SessionError::SubmissionInProgress)
        ));
    }

    #[test]
    fn test_parse_failure_keeps_previous_results() {
        let mut session = session();
        let ticket = session.begin_submission().unwrap();
        session.finish_submission(ticket, Ok(RESPONSE.to_string())).unwrap();

        let ticket = session.begin_submission().unwrap();
        let broken = r#"{"results":[{"schedule":["Waltz"],"collisions":[]}]}"#;
        let err = session.finish_submission(ticket, Ok(broken.to_string())).unwrap_err();

        assert!(matches!(err, SessionError::Parse(_)));
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.results()[0].schedule[0], "Tango");
        assert!(!session.is_submitting());
    }

    #[tokio::test]
    async fn test_auth_expired_is_distinct() {
        let mut session = session();
        let client = MockSchedulerClient::new(vec![MockReply::Status(403)]);

        let err = session.submit(&client).await.unwrap_err();
        assert!(matches!(err, SessionError::AuthExpired));
        assert!(!session.is_submitting());
        assert_eq!(client.call_count(), 1);
    }

    #[test]
    fn test_submission_requires_credential() {
        let registry = ItemRegistry::new(["Waltz"]).unwrap();
        let mut session = Session::new(registry, SheetSource::new("sheet-1", "Spring"));

        assert!(matches!(session.begin_submission(), Err(SessionError::NoCredential)));
        assert!(!session.is_submitting());
    }

    #[test]
    fn test_reset_rebuilds_store() {
        let mut session = session();
        session.move_item("Waltz", "Unassigned", 0, "Start", 0).unwrap();
        let generation = session.generation();

        session.reset(
            ItemRegistry::new(["Waltz", "Salsa"]).unwrap(),
            SheetSource::new("sheet-2", "Fall"),
        );

        assert_eq!(session.generation(), generation + 1);
        assert!(session.store().bucket(crate::domain::Bucket::Start).is_empty());
        assert_eq!(session.store().names(crate::domain::Bucket::Unassigned).count(), 2);
        assert_eq!(session.source().sheet_name, "Fall");
    }

    #[test]
    fn test_move_errors_pass_through() {
        let mut session = session();
        assert!(matches!(
            session.move_item("Waltz", "Unassigned", 0, "Finale", 0),
            Err(SessionError::Move(_))
        ));
        assert!(matches!(
            session.set_position_directive("Waltz", PositionDirective::Absolute(1)),
            Err(SessionError::Directive(_))
        ));
    }
}
