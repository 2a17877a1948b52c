use std::collections::{HashMap, HashSet, VecDeque};

use crate::cookie::CookieJar;
use crate::crawl::flags::FlagStore;

/// All mutable state of one crawl.
///
/// Passed explicitly to the login handshake and the scheduler loop.
#[derive(Debug, Clone)]
pub struct CrawlSession {
    pub frontier: VecDeque<String>,
    pub visited: HashSet<String>,
    pub flags: FlagStore,
    pub cookies: CookieJar,
    attempts: HashMap<String, u32>,
}

impl CrawlSession {
    pub fn new(flag_target: usize) -> Self {
        Self {
            frontier: VecDeque::new(),
            visited: HashSet::new(),
            flags: FlagStore::new(flag_target),
            cookies: CookieJar::new(),
            attempts: HashMap::new(),
        }
    }

    /// Queues a path at the back unless it was already visited.
    pub fn enqueue(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.visited.contains(&path) {
            return false;
        }
        self.frontier.push_back(path);
        true
    }

    /// Queues a path ahead of everything else.
    pub fn requeue_front(&mut self, path: impl Into<String>) {
        self.frontier.push_front(path.into());
    }

    /// Records a classified path, returning false if it was already there.
    pub fn mark_visited(&mut self, path: &str) -> bool {
        self.attempts.remove(path);
        self.visited.insert(path.to_string())
    }

    pub fn is_visited(&self, path: &str) -> bool {
        self.visited.contains(path)
    }

    /// Counts a fetch attempt of a not-yet-visited path.
    pub fn record_attempt(&mut self, path: &str) -> u32 {
        let count = self.attempts.entry(path.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// The crawl stops when the frontier empties or enough flags are found.
    pub fn is_finished(&self) -> bool {
        self.frontier.is_empty() || self.flags.is_complete()
    }
}
