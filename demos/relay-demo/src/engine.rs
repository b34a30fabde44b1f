//! Simulated engine: answers submissions after a delay, failing some of them

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tui_relay::{ActionId, EngineError, EngineInbox};

/// Payloads the engine accepted, by action.
#[derive(Debug, Clone, Default)]
pub struct AcceptedPayloads(Arc<Mutex<HashMap<ActionId, Value>>>);

impl AcceptedPayloads {
    pub fn get(&self, action: &ActionId) -> Option<Value> {
        self.lock().get(action).cloned()
    }

    fn insert(&self, action: ActionId, payload: Value) {
        self.lock().insert(action, payload);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ActionId, Value>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Simulation {
    pub latency: Duration,
    /// Share of submissions rejected, between 0 and 1.
    pub failure_rate: f64,
}

impl Simulation {
    /// Deterministic failure schedule: submission `n` fails whenever the
    /// running count of expected failures crosses a whole number.
    fn fails(&self, n: u64) -> bool {
        let rate = self.failure_rate.clamp(0.0, 1.0);
        ((n + 1) as f64 * rate).floor() > (n as f64 * rate).floor()
    }
}

/// Consume the inbox until the dispatcher goes away.
pub fn spawn(mut inbox: EngineInbox, simulation: Simulation, accepted: AcceptedPayloads) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut count = 0u64;
        while let Some(pending) = inbox.recv().await {
            let fails = simulation.fails(count);
            count += 1;
            let accepted = accepted.clone();
            tokio::spawn(async move {
                tokio::time::sleep(simulation.latency).await;
                if fails {
                    tracing::info!(action = %pending.action(), "Simulated rejection");
                    pending.fail(EngineError::rejected("simulated failure"));
                    return;
                }
                accepted.insert(pending.action().clone(), pending.payload().clone());
                pending.succeed();
            });
        }
        tracing::info!("Engine inbox closed");
    })
}
