use std::collections::BTreeMap;

use crate::domain::utils::id::SiteName;
use crate::error::ScheduleError;

#[derive(Debug, Clone, PartialEq)]
pub struct Processor {
    pub next_free_time: f64,
}

/// Processor picked by the last probe, consumed by the following commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TentativeProcessor {
    Existing(usize),
    Open,
}

/**
 * Simulated execution site: a pool of at most `processor_count` processors.
 *
 * Scheduling is non-insertion based: a job is always appended after the last job of the chosen
 * processor, idle gaps are never filled. Placing a job is a two-phase protocol, a probe with
 * `available_time` followed by a commit with `schedule_job`.
 */
#[derive(Debug, Clone)]
pub struct Site {
    pub name: SiteName,
    processor_count: usize,
    processors: Vec<Processor>,
    tentative: Option<TentativeProcessor>,
}

impl Site {
    pub fn new(name: SiteName, processor_count: usize) -> Self {
        Site { name, processor_count: processor_count.max(1), processors: Vec::new(), tentative: None }
    }

    /// Processors the site may use in total.
    pub fn available_processors(&self) -> usize {
        self.processor_count
    }

    /// Processors that already got at least one job.
    pub fn open_processors(&self) -> usize {
        self.processors.len()
    }

    /**
     * Returns the earliest time at or after `desired_start` a job can start on this site and
     * remembers the processor that offers it.
     *
     * An idle processor is opened as long as the pool is not exhausted and no open processor is
     * free at `desired_start`. Among open processors ties go to the lowest index.
     */
    pub fn available_time(&mut self, desired_start: f64) -> f64 {
        let mut earliest: Option<(usize, f64)> = None;
        for (index, processor) in self.processors.iter().enumerate() {
            let start = processor.next_free_time.max(desired_start);
            if earliest.is_none_or(|(_, best)| start < best) {
                earliest = Some((index, start));
            }
        }

        match earliest {
            Some((index, start)) if start <= desired_start || self.processors.len() >= self.processor_count => {
                self.tentative = Some(TentativeProcessor::Existing(index));
                start
            }
            _ => {
                self.tentative = Some(TentativeProcessor::Open);
                desired_start
            }
        }
    }

    /// Commits the processor selected by the preceding `available_time` call.
    pub fn schedule_job(&mut self, start: f64, end: f64) -> Result<(), ScheduleError> {
        let tentative = self.tentative.take().ok_or_else(|| ScheduleError::IllegalScheduleState(self.name.clone()))?;

        match tentative {
            TentativeProcessor::Existing(index) => {
                self.processors[index].next_free_time = end;
                log::trace!("Site {}: job [{}, {}] on processor {}", self.name, start, end, index);
            }
            TentativeProcessor::Open => {
                self.processors.push(Processor { next_free_time: end });
                log::trace!("Site {}: job [{}, {}] on new processor {}", self.name, start, end, self.processors.len() - 1);
            }
        }
        Ok(())
    }
}

/// All simulated sites of one scheduling run, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SitePool {
    sites: BTreeMap<SiteName, Site>,
}

impl SitePool {
    pub fn new(sites: impl IntoIterator<Item = Site>) -> Self {
        SitePool { sites: sites.into_iter().map(|site| (site.name.clone(), site)).collect() }
    }

    pub fn site_mut(&mut self, name: &SiteName) -> Result<&mut Site, ScheduleError> {
        self.sites.get_mut(name).ok_or_else(|| ScheduleError::UnknownSite(name.clone()))
    }
}
