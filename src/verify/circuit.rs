use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Failure bookkeeping for one domain
#[derive(Debug, Clone, Default)]
struct DomainCircuit {
    /// Consecutive failures within the current window
    failures: u32,
    /// Time of the most recent failure
    last_failure: Option<Instant>,
    /// While set and in the future, checks for this domain short-circuit
    open_until: Option<Instant>,
}

/// Per-domain circuit breaker shared between the verifier workers and the
/// frontier admission path
///
/// After `threshold` failures within the cooldown window, the domain's
/// circuit opens for the cooldown duration and further checks return a
/// synthetic circuit-open result without touching the network. A success or
/// redirect closes the circuit and resets the counter; failures separated by
/// more than the window restart the count.
#[derive(Debug)]
pub struct CircuitBreaker {
    domains: Mutex<HashMap<String, DomainCircuit>>,
    threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            domains: Mutex::new(HashMap::new()),
            threshold,
            cooldown,
        }
    }

    /// Whether checks against this domain should short-circuit right now
    pub fn is_open(&self, domain: &str) -> bool {
        self.is_open_at(domain, Instant::now())
    }

    /// Records a successful (or redirected) check, closing the circuit
    pub fn record_success(&self, domain: &str) {
        let mut domains = self.lock();
        if let Some(circuit) = domains.get_mut(domain) {
            circuit.failures = 0;
            circuit.last_failure = None;
            circuit.open_until = None;
        }
    }

    /// Records a failed check; opens the circuit once the threshold is hit
    pub fn record_failure(&self, domain: &str) {
        self.record_failure_at(domain, Instant::now());
    }

    pub(crate) fn is_open_at(&self, domain: &str, now: Instant) -> bool {
        let mut domains = self.lock();
        let Some(circuit) = domains.get_mut(domain) else {
            return false;
        };

        match circuit.open_until {
            Some(until) if now < until => true,
            Some(_) => {
                // Cooldown elapsed; revert to normal checking
                circuit.open_until = None;
                circuit.failures = 0;
                circuit.last_failure = None;
                false
            }
            None => false,
        }
    }

    pub(crate) fn record_failure_at(&self, domain: &str, now: Instant) {
        let mut domains = self.lock();
        let circuit = domains.entry(domain.to_string()).or_default();

        // Failures outside the window start a fresh count
        match circuit.last_failure {
            Some(last) if now.duration_since(last) <= self.cooldown => {
                circuit.failures += 1;
            }
            _ => {
                circuit.failures = 1;
            }
        }
        circuit.last_failure = Some(now);

        if circuit.failures >= self.threshold {
            tracing::warn!(
                "Circuit opened for domain {} after {} failures",
                domain,
                circuit.failures
            );
            circuit.open_until = Some(now + self.cooldown);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, DomainCircuit>> {
        self.domains.lock().unwrap_or_else(|e| e.into_inner())
    }
}
