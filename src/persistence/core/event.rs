use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

// ============================================================================
// Event Envelope - Event Metadata
// ============================================================================
//
// Wraps domain events with the metadata written to the outbox.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventEnvelope<E> {
    // Event Identity
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    pub sequence_number: i64,

    // Event Type Information
    pub event_type: String,
    pub event_version: i32,

    pub event_data: E,

    // Groups events produced by the same request
    pub correlation_id: Uuid,

    // Who triggered this event
    pub user_id: Option<Uuid>,

    pub timestamp: DateTime<Utc>,
}

impl<E: DomainEvent> EventEnvelope<E> {
    pub fn new(aggregate_id: Uuid, sequence_number: i64, event_data: E, correlation_id: Uuid) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            aggregate_id,
            sequence_number,
            event_type: event_data.event_type().to_string(),
            event_version: event_data.event_version(),
            event_data,
            correlation_id,
            user_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_user(mut self, user_id: Option<Uuid>) -> Self {
        self.user_id = user_id;
        self
    }
}

/// Wrap a batch of events emitted by one command, numbering them after
/// `current_version`.
pub fn envelope_events<E: DomainEvent>(
    aggregate_id: Uuid,
    current_version: i64,
    events: Vec<E>,
    correlation_id: Uuid,
    user_id: Option<Uuid>,
) -> Vec<EventEnvelope<E>> {
    events
        .into_iter()
        .enumerate()
        .map(|(offset, event)| {
            EventEnvelope::new(aggregate_id, current_version + offset as i64 + 1, event, correlation_id)
                .with_user(user_id)
        })
        .collect()
}

// ============================================================================
// Domain Event Trait
// ============================================================================

/// All domain events implement this trait to be written to the outbox.
pub trait DomainEvent: Serialize + DeserializeOwned + Clone + Send + Sync {
    fn event_type(&self) -> &'static str;

    fn event_version(&self) -> i32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Clone, Debug)]
    struct TestEvent {
        data: String,
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str {
            "TestEvent"
        }
    }

    #[test]
    fn test_event_envelope_creation() {
        let aggregate_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        let envelope = EventEnvelope::new(
            aggregate_id,
            1,
            TestEvent { data: "test".to_string() },
            correlation_id,
        );

        assert_eq!(envelope.aggregate_id, aggregate_id);
        assert_eq!(envelope.sequence_number, 1);
        assert_eq!(envelope.event_type, "TestEvent");
        assert_eq!(envelope.event_version, 1);
        assert_eq!(envelope.correlation_id, correlation_id);
        assert!(envelope.user_id.is_none());
    }

    #[test]
    fn test_envelope_events_numbers_after_current_version() {
        let aggregate_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let events = vec![
            TestEvent { data: "a".to_string() },
            TestEvent { data: "b".to_string() },
        ];

        let envelopes = envelope_events(aggregate_id, 4, events, Uuid::new_v4(), Some(user_id));

        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0].sequence_number, 5);
        assert_eq!(envelopes[1].sequence_number, 6);
        assert_eq!(envelopes[1].event_data.data, "b");
        assert_eq!(envelopes[0].user_id, Some(user_id));
    }
}
