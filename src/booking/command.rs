//! Commands for station lookups.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::booking::form::FetchRequest;
use crate::booking::message::BookingMsg;
use crate::booking::source::StationSource;
use crate::commands::Command;

/// Ask the station source for availability and report back with the ticket.
pub struct FetchStationsCmd {
    source: Arc<dyn StationSource>,
    request: FetchRequest,
    tx: UnboundedSender<BookingMsg>,
}

impl FetchStationsCmd {
    pub fn new(
        source: Arc<dyn StationSource>,
        request: FetchRequest,
        tx: UnboundedSender<BookingMsg>,
    ) -> Self {
        Self {
            source,
            request,
            tx,
        }
    }
}

#[async_trait]
impl Command for FetchStationsCmd {
    fn name(&self) -> String {
        format!(
            "Checking {} stations for {} ({})",
            self.source.name(),
            self.request.service,
            self.request.ticket
        )
    }

    async fn execute(self: Box<Self>) -> color_eyre::Result<()> {
        let ticket = self.request.ticket;
        let msg = match self
            .source
            .stations(&self.request.car_type, &self.request.service)
            .await
        {
            Ok(response) => BookingMsg::StationsLoaded { ticket, response },
            Err(e) => {
                warn!(%ticket, error = format!("{e:#}"), "Station lookup failed");
                BookingMsg::FetchFailed {
                    ticket,
                    error: e.to_string(),
                }
            }
        };
        let _ = self.tx.send(msg);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;
    use crate::booking::model::{FetchTicket, StationsResponse};
    use crate::booking::source::MockStationSource;

    struct FailingSource;

    #[async_trait]
    impl StationSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn stations(&self, _: &str, _: &str) -> color_eyre::Result<StationsResponse> {
            Err(color_eyre::eyre::eyre!("connection refused"))
        }
    }

    fn request(ticket: u64) -> FetchRequest {
        FetchRequest {
            ticket: FetchTicket(ticket),
            car_type: "Kia Rio".into(),
            service: "Oil Change".into(),
        }
    }

    #[tokio::test]
    async fn test_fetch_sends_loaded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let source = Arc::new(MockStationSource::new(Duration::ZERO).unwrap());

        Box::new(FetchStationsCmd::new(source, request(3), tx))
            .execute()
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            BookingMsg::StationsLoaded { ticket, response } => {
                assert_eq!(ticket, FetchTicket(3));
                assert_eq!(response.stations.len(), 2);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_sends_failure() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        Box::new(FetchStationsCmd::new(Arc::new(FailingSource), request(7), tx))
            .execute()
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            BookingMsg::FetchFailed { ticket, error } => {
                assert_eq!(ticket, FetchTicket(7));
                assert!(error.contains("connection refused"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
