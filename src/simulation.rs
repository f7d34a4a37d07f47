pub(crate) mod event;
mod schedule;

use tracing::{debug, trace, warn};

use crate::{
    data::{QueueReport, Report, Termination},
    queue::{select_route, Queue, QueueId},
    random::{Exhausted, UniformSequence},
};

use self::{
    event::{Event, EventKind, EventList},
    schedule::Schedule,
};

/// The discrete-event engine. Owns the clock, the schedule, the queue arena,
/// and the uniform sequence driving every random decision.
#[derive(Debug, typed_builder::TypedBuilder)]
pub(crate) struct Engine {
    // Run-time
    #[builder(default, setter(skip))]
    schedule: Schedule,
    #[builder(default)]
    clock: f64,

    queues: Vec<Queue>,
    source: UniformSequence,
}

impl Engine {
    pub(crate) fn execute(mut self) -> Report {
        // Kick off the simulation with one arrival per activated queue
        for (i, queue) in self.queues.iter().enumerate() {
            if let (Some(start), Some(_)) = (queue.arrival_start, queue.arrival_time) {
                let ev = Event::new(start, EventKind::new_arrival(), QueueId::new(i));
                self.schedule.push(ev);
            }
        }

        let termination = loop {
            let Some(ev) = self.schedule.pop() else {
                break Termination::Drained;
            };
            self.advance(ev.time);
            trace!(time = self.clock, ?ev.kind, queue = ev.queue.into_usize(), "processing event");
            match self.apply(ev) {
                Ok(events) => {
                    for ev in events {
                        self.schedule.push(ev);
                    }
                }
                // A failed draw aborts the rest of this transition; earlier
                // state changes stand.
                Err(Exhausted) => break Termination::Exhausted,
            }
            if !self.source.has_next() {
                break Termination::Exhausted;
            }
        };

        if termination == Termination::Exhausted {
            warn!("uniform sequence exhausted, stopping simulation");
        }
        if !self.schedule.is_empty() {
            debug!(pending = self.schedule.len(), "unprocessed events remain on the schedule");
        }
        debug!(
            time = self.clock,
            draws = self.source.index(),
            ?termination,
            "simulation halted"
        );
        self.finish(termination)
    }

    /// Attributes the elapsed interval to every queue's current occupancy,
    /// then moves the clock forward.
    fn advance(&mut self, time: f64) {
        // Upheld by construction: ranges and activation times are validated
        // against the start time, and draws never move an event backwards.
        assert!(self.clock <= time);
        let delta = time - self.clock;
        for queue in self.queues.iter_mut() {
            queue.accumulate(delta);
        }
        self.clock = time;
    }

    fn finish(self, termination: Termination) -> Report {
        let queues = self
            .queues
            .into_iter()
            .map(|q| QueueReport {
                name: q.name.clone(),
                kendall: q.kendall().to_string(),
                time_at_state: q.time_at_state().to_vec(),
                clients: q.clients,
                losses: q.losses,
            })
            .collect();
        Report {
            time: self.clock,
            termination,
            queues,
        }
    }
}

// Event handlers
impl Engine {
    fn apply(&mut self, ev: Event) -> Result<EventList, Exhausted> {
        match ev.kind {
            EventKind::Arrival => self.arrival(ev.queue),
            EventKind::Departure => self.departure(ev.queue),
            EventKind::Passage { dest } => self.passage(ev.queue, dest),
        }
    }

    fn arrival(&mut self, qid: QueueId) -> Result<EventList, Exhausted> {
        let mut out = EventList::new();
        let i = qid.into_usize();
        if self.queues[i].has_room() {
            self.queues[i].accept();
            if self.queues[i].clients <= self.queues[i].servers {
                out.push(self.completion(qid)?);
            }
        } else {
            trace!(queue = %self.queues[i].name, "client lost to a full queue");
            self.queues[i].record_loss();
        }
        // The external stream keeps going whether or not this client made it in
        if let Some(range) = self.queues[i].external_arrivals() {
            let r = self.source.next()?;
            let time = self.clock + range.sample(r);
            out.push(Event::new(time, EventKind::new_arrival(), qid));
        }
        Ok(out)
    }

    fn departure(&mut self, qid: QueueId) -> Result<EventList, Exhausted> {
        let mut out = EventList::new();
        let i = qid.into_usize();
        self.queues[i].release();
        if self.queues[i].clients >= self.queues[i].servers {
            // A waiting client takes the freed server
            out.push(self.completion(qid)?);
        }
        Ok(out)
    }

    fn passage(&mut self, qid: QueueId, dest: QueueId) -> Result<EventList, Exhausted> {
        let mut out = EventList::new();
        let i = qid.into_usize();
        self.queues[i].release();
        if self.queues[i].clients >= self.queues[i].servers {
            out.push(self.completion(qid)?);
        }

        let d = dest.into_usize();
        if self.queues[d].has_room() {
            self.queues[d].accept();
            if self.queues[d].clients <= self.queues[d].servers {
                out.push(self.completion(dest)?);
            }
        } else {
            self.queues[d].record_loss();
        }
        Ok(out)
    }

    /// Schedules a service completion at `qid`: pick the next hop first, then
    /// draw the service duration from the origin queue's range.
    fn completion(&mut self, qid: QueueId) -> Result<Event, Exhausted> {
        let hop = self.next_hop(qid)?;
        let r = self.source.next()?;
        let time = self.clock + self.queues[qid.into_usize()].service_time.sample(r);
        Ok(match hop {
            Some(dest) => Event::new(time, EventKind::new_passage(dest), qid),
            None => Event::new(time, EventKind::new_departure(), qid),
        })
    }

    fn next_hop(&mut self, qid: QueueId) -> Result<Option<QueueId>, Exhausted> {
        let routes = &self.queues[qid.into_usize()].routes;
        if routes.is_empty() {
            return Ok(None);
        }
        // A forced route does not spend a draw
        if let [only] = routes.as_slice() {
            if only.prob == 1.0 {
                return Ok(only.to);
            }
        }
        let r = self.source.next()?;
        Ok(select_route(routes, r))
    }
}
