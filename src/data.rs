/// Why the engine halted. Both are normal completions.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    derive_more::Display,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Termination {
    /// No pending events were left on the schedule.
    #[display(fmt = "schedule drained")]
    Drained,
    /// The uniform sequence ran out of values.
    #[display(fmt = "uniform sequence exhausted")]
    Exhausted,
}

/// Final state of the simulation, read out after the engine halts.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Report {
    /// The clock value at the last processed event.
    pub time: f64,
    pub termination: Termination,
    /// Per-queue statistics, in configuration order.
    pub queues: Vec<QueueReport>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QueueReport {
    pub name: String,
    /// The queue's Kendall notation, e.g. `G/G/2/4/∞/FCFS`.
    pub kendall: String,
    /// Cumulative time spent at each occupancy level.
    pub time_at_state: Vec<f64>,
    /// Clients still in the queue when the simulation halted.
    pub clients: usize,
    /// Clients rejected because the queue was at capacity.
    pub losses: u64,
}

impl QueueReport {
    /// The empirical fraction of simulated time spent at each occupancy level.
    pub fn state_probabilities(&self) -> Vec<f64> {
        let total = self.time_at_state.iter().sum::<f64>();
        if total == 0.0 {
            return vec![0.0; self.time_at_state.len()];
        }
        self.time_at_state.iter().map(|t| t / total).collect()
    }
}
