use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Domain events emitted after a transaction commits. Delivery is
/// best-effort; a dropped event never fails the operation that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    PayslipGenerated {
        payslip_id: Uuid,
        employee_id: Uuid,
        period: String,
    },
    PayslipsBulkGenerated {
        period: String,
        created: u64,
        skipped: u64,
        failed: u64,
    },
    PayslipApproved {
        payslip_id: Uuid,
        approved_by: Uuid,
    },
    PayslipRejected {
        payslip_id: Uuid,
        rejected_by: Uuid,
    },
    PayslipReverted {
        payslip_id: Uuid,
        old_status: String,
        reverted_by: Uuid,
    },
    PayslipEdited {
        payslip_id: Uuid,
        old_status: String,
        new_status: String,
        edited_by: Uuid,
    },
    PayslipsBulkApproved {
        count: u64,
        approved_by: Uuid,
    },
    PayslipDeleted {
        payslip_id: Uuid,
        deleted_by: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates a bounded event channel.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Background processor draining the event channel. Downstream consumers
/// (notifications, reporting) would hook in here; for now every event is
/// logged.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "processing domain event");
    }
    info!("event channel closed, processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_flow_through_the_channel() {
        let (sender, mut rx) = channel(8);
        let payslip_id = Uuid::new_v4();
        sender
            .send(Event::PayslipApproved {
                payslip_id,
                approved_by: Uuid::new_v4(),
            })
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            Event::PayslipApproved { payslip_id: id, .. } => assert_eq!(id, payslip_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
