use std::fmt;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

// Routing-table walks tolerate this much floating-point shortfall before the
// total is treated as greater than one.
const PROB_EPSILON: f64 = 1e-9;

/// Stable handle into the simulation's queue arena. Routing tables store these
/// instead of references so the queue graph may contain cycles.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialOrd,
    Ord,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    serde::Serialize,
    serde::Deserialize,
)]
pub(crate) struct QueueId(usize);

impl QueueId {
    pub(crate) const fn new(value: usize) -> Self {
        Self(value)
    }

    pub(crate) fn into_usize(self) -> usize {
        self.0
    }
}

/// An inclusive time range `[min, max]` sampled as `min + (max - min) * r`
/// with `r` in `[0, 1)`.
#[derive(Debug, Copy, Clone, PartialEq, derive_new::new, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    pub min: f64,
    pub max: f64,
}

impl TimeRange {
    pub(crate) fn sample(&self, r: f64) -> f64 {
        self.min + (self.max - self.min) * r
    }

    fn is_inverted(&self) -> bool {
        self.min > self.max
    }

    fn is_deterministic(&self) -> bool {
        self.min == self.max
    }
}

/// One routing-table entry as configured: a destination queue name, or `None`
/// for leaving the system.
#[derive(Debug, Clone, PartialEq, derive_new::new, serde::Serialize, serde::Deserialize)]
pub struct RouteDesc {
    pub to: Option<String>,
    pub prob: f64,
}

/// External description of a queue, resolved into a [`Queue`] by
/// [`build_queues`].
#[derive(Debug, Clone, typed_builder::TypedBuilder, serde::Serialize, serde::Deserialize)]
pub struct QueueDesc {
    #[builder(setter(into))]
    pub name: String,
    pub servers: usize,
    pub service_time: TimeRange,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub arrival_time: Option<TimeRange>,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub capacity: Option<usize>,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub arrival_start: Option<f64>,
    #[builder(default)]
    #[serde(default)]
    pub routes: Vec<RouteDesc>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("queue {0} must have at least one server")]
    NoServers(String),

    #[error("queue {queue} has an inverted arrival time range ({min} > {max})")]
    InvertedArrivalRange { queue: String, min: f64, max: f64 },

    #[error("queue {queue} has an inverted service time range ({min} > {max})")]
    InvertedServiceRange { queue: String, min: f64, max: f64 },

    #[error("queue {queue} has a negative arrival time bound ({min})")]
    NegativeArrivalBound { queue: String, min: f64 },

    #[error("queue {queue} has a negative service time bound ({min})")]
    NegativeServiceBound { queue: String, min: f64 },

    #[error("queue {queue} activates arrivals at {arrival_start}, before the start time {start_time}")]
    ArrivalBeforeStart {
        queue: String,
        arrival_start: f64,
        start_time: f64,
    },

    #[error("queue {0} is configured twice")]
    DuplicateName(String),

    #[error("queue {queue} routes to unknown queue {target}")]
    UnknownRoute { queue: String, target: String },

    #[error("queue {queue} has a negative routing probability ({prob})")]
    NegativeProbability { queue: String, prob: f64 },

    #[error("queue {queue} routing probabilities sum to {total}, expected at most 1")]
    RouteOverflow { queue: String, total: f64 },
}

/// A resolved routing-table entry. `to` is `None` when the client exits the
/// system.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Route {
    pub(crate) to: Option<QueueId>,
    pub(crate) prob: f64,
}

/// Arrival and service pattern classes for the Kendall descriptor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, derive_more::Display)]
pub(crate) enum Pattern {
    #[display(fmt = "D")]
    Deterministic,
    #[display(fmt = "G")]
    General,
}

impl Pattern {
    fn of(range: &TimeRange) -> Self {
        if range.is_deterministic() {
            Self::Deterministic
        } else {
            Self::General
        }
    }
}

/// Six-field Kendall descriptor (`A/B/c/K/N/D`). Population is always
/// unbounded and the discipline is always FCFS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Kendall {
    arrival: Pattern,
    service: Pattern,
    servers: usize,
    capacity: Option<usize>,
}

impl fmt::Display for Kendall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/", self.arrival, self.service, self.servers)?;
        match self.capacity {
            Some(k) => write!(f, "{k}")?,
            None => f.write_str("∞")?,
        }
        f.write_str("/∞/FCFS")
    }
}

/// A service station: static configuration plus the counters the engine
/// mutates while processing events.
#[derive(Debug)]
pub(crate) struct Queue {
    pub(crate) name: String,
    pub(crate) servers: usize,
    pub(crate) capacity: Option<usize>,
    pub(crate) arrival_time: Option<TimeRange>,
    pub(crate) service_time: TimeRange,
    pub(crate) arrival_start: Option<f64>,
    pub(crate) routes: Vec<Route>,
    kendall: Kendall,

    pub(crate) clients: usize,
    pub(crate) losses: u64,
    time_at_state: Vec<f64>,
}

impl Queue {
    fn resolve(desc: QueueDesc, index: &FxHashMap<String, QueueId>) -> Result<Self, ConfigError> {
        if desc.servers == 0 {
            return Err(ConfigError::NoServers(desc.name));
        }
        if let Some(range) = desc.arrival_time {
            if range.is_inverted() {
                return Err(ConfigError::InvertedArrivalRange {
                    queue: desc.name,
                    min: range.min,
                    max: range.max,
                });
            }
            if range.min < 0.0 {
                return Err(ConfigError::NegativeArrivalBound {
                    queue: desc.name,
                    min: range.min,
                });
            }
        }
        if desc.service_time.is_inverted() {
            return Err(ConfigError::InvertedServiceRange {
                queue: desc.name,
                min: desc.service_time.min,
                max: desc.service_time.max,
            });
        }
        if desc.service_time.min < 0.0 {
            return Err(ConfigError::NegativeServiceBound {
                queue: desc.name,
                min: desc.service_time.min,
            });
        }

        let mut routes = Vec::with_capacity(desc.routes.len());
        for route in &desc.routes {
            if route.prob < 0.0 {
                return Err(ConfigError::NegativeProbability {
                    queue: desc.name,
                    prob: route.prob,
                });
            }
            let to = match &route.to {
                Some(target) => {
                    Some(*index.get(target).ok_or_else(|| ConfigError::UnknownRoute {
                        queue: desc.name.clone(),
                        target: target.clone(),
                    })?)
                }
                None => None,
            };
            routes.push(Route {
                to,
                prob: route.prob,
            });
        }
        let total = routes.iter().map(|r| r.prob).sum::<f64>();
        if total > 1.0 + PROB_EPSILON {
            return Err(ConfigError::RouteOverflow {
                queue: desc.name,
                total,
            });
        }
        if !routes.is_empty() && total < 1.0 {
            warn!(
                queue = %desc.name,
                total,
                "routing probabilities sum to less than 1; remainder exits the system"
            );
        }

        let arrival = match (desc.arrival_time, desc.arrival_start) {
            // External arrivals must be activated explicitly; a range alone
            // classifies as "G".
            (Some(range), Some(_)) => Pattern::of(&range),
            _ => Pattern::General,
        };
        let kendall = Kendall {
            arrival,
            service: Pattern::of(&desc.service_time),
            servers: desc.servers,
            capacity: desc.capacity,
        };
        debug!(queue = %desc.name, kendall = %kendall, "queue initialized");

        // Bounded queues get one bucket per occupancy level up front;
        // unbounded queues grow theirs on demand.
        let time_at_state = vec![0.0; desc.capacity.map_or(1, |k| k + 1)];
        Ok(Self {
            name: desc.name,
            servers: desc.servers,
            capacity: desc.capacity,
            arrival_time: desc.arrival_time,
            service_time: desc.service_time,
            arrival_start: desc.arrival_start,
            routes,
            kendall,
            clients: 0,
            losses: 0,
            time_at_state,
        })
    }

    pub(crate) fn has_room(&self) -> bool {
        self.capacity.map_or(true, |k| self.clients < k)
    }

    pub(crate) fn accept(&mut self) {
        self.clients += 1;
    }

    pub(crate) fn release(&mut self) {
        self.clients -= 1;
    }

    pub(crate) fn record_loss(&mut self) {
        self.losses += 1;
    }

    /// Attributes `delta` to the occupancy that held over the elapsed
    /// interval. Must be called before `accept`/`release` for the new event.
    pub(crate) fn accumulate(&mut self, delta: f64) {
        if self.time_at_state.len() <= self.clients {
            self.time_at_state.resize(self.clients + 1, 0.0);
        }
        self.time_at_state[self.clients] += delta;
    }

    /// The arrival range, but only when the external arrival stream is
    /// activated.
    pub(crate) fn external_arrivals(&self) -> Option<TimeRange> {
        self.arrival_start.and(self.arrival_time)
    }

    pub(crate) fn kendall(&self) -> &Kendall {
        &self.kendall
    }

    pub(crate) fn time_at_state(&self) -> &[f64] {
        &self.time_at_state
    }
}

/// Two-phase network build: index every queue by name, then resolve each
/// descriptor's routing table against the index.
pub(crate) fn build_queues(descs: Vec<QueueDesc>) -> Result<Vec<Queue>, ConfigError> {
    let mut index = FxHashMap::default();
    for (i, desc) in descs.iter().enumerate() {
        if index.insert(desc.name.clone(), QueueId::new(i)).is_some() {
            return Err(ConfigError::DuplicateName(desc.name.clone()));
        }
    }
    descs
        .into_iter()
        .map(|desc| Queue::resolve(desc, &index))
        .collect()
}

/// Walks the routing table, returning the first entry whose cumulative
/// probability exceeds `r`. Falls back to exiting the system when the walk
/// runs out, covering both an implicit complement-to-1 remainder and
/// floating-point shortfall.
pub(crate) fn select_route(routes: &[Route], r: f64) -> Option<QueueId> {
    let mut cumulative = 0.0;
    for route in routes {
        cumulative += route.prob;
        if r < cumulative {
            return route.to;
        }
    }
    None
}
