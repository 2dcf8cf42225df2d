//! The incident catalog: mock generation, filtering, and pagination.
//!
//! Incidents are generated in-process for each run. A seed makes a run
//! reproducible, which is what lets `list` and `show` agree on IDs.

use std::collections::HashSet;

use jiff::{SignedDuration, Timestamp};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use crate::model::{Incident, IncidentKind, IncidentState, Severity};

pub const SERVICES: [&str; 5] = [
    "User Service",
    "Payment Service",
    "Auth Service",
    "Notification Service",
    "API Gateway",
];

pub const OWNERS: [&str; 5] = [
    "John Doe",
    "Jane Smith",
    "Mike Johnson",
    "Sarah Williams",
    "Alex Brown",
];

/// Every incident known to this run, in generation order.
#[derive(Debug, Clone)]
pub struct Catalog {
    incidents: Vec<Incident>,
}

impl Catalog {
    pub fn new(incidents: Vec<Incident>) -> Self {
        Self { incidents }
    }

    /// Generates `count` incidents created within the 72 hours before `now`.
    ///
    /// IDs are unique. `count` is capped at the 9000 IDs available.
    pub fn generate(count: usize, now: Timestamp, rng: &mut impl Rng) -> Self {
        let count = count.min(9000);
        let mut seen = HashSet::with_capacity(count);
        let mut incidents = Vec::with_capacity(count);

        while incidents.len() < count {
            let number: u16 = rng.random_range(1000..=9999);
            if !seen.insert(number) {
                continue;
            }

            let created_at = now - SignedDuration::from_hours(rng.random_range(1..=72));
            let state = *pick(&IncidentState::ALL, rng);
            let resolved_at = state
                .is_finished()
                .then(|| created_at + SignedDuration::from_hours(rng.random_range(1..=8)));

            incidents.push(Incident {
                kind: *pick(&IncidentKind::ALL, rng),
                id: format!("INC-{number}"),
                severity: *pick(&Severity::ALL, rng),
                state,
                title: format!("Service degradation in {}", pick(&SERVICES, rng)),
                created_at,
                owning_service: (*pick(&SERVICES, rng)).to_string(),
                owner: (*pick(&OWNERS, rng)).to_string(),
                resolved_at,
            });
        }

        Self { incidents }
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    /// Looks up an incident by ID, ignoring case.
    pub fn find(&self, id: &str) -> Option<&Incident> {
        let id = id.trim();
        self.incidents
            .iter()
            .find(|i| i.id.eq_ignore_ascii_case(id))
    }

    /// Incidents matching `filter`, in catalog order.
    pub fn filter(&self, filter: &IncidentFilter) -> Vec<&Incident> {
        self.incidents.iter().filter(|i| filter.matches(i)).collect()
    }
}

fn pick<'a, T>(items: &'a [T], rng: &mut impl Rng) -> &'a T {
    // Callers only pass the non-empty constant tables above.
    items.choose(rng).unwrap_or(&items[0])
}

/// Listing filters. An empty list means "any"; lists combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentFilter {
    pub severities: Vec<Severity>,
    pub states: Vec<IncidentState>,
    pub services: Vec<String>,
    pub kinds: Vec<IncidentKind>,
}

impl IncidentFilter {
    pub fn matches(&self, incident: &Incident) -> bool {
        (self.severities.is_empty() || self.severities.contains(&incident.severity))
            && (self.states.is_empty() || self.states.contains(&incident.state))
            && (self.services.is_empty()
                || self
                    .services
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(&incident.owning_service)))
            && (self.kinds.is_empty() || self.kinds.contains(&incident.kind))
    }

    pub fn is_empty(&self) -> bool {
        self.severities.is_empty()
            && self.states.is_empty()
            && self.services.is_empty()
            && self.kinds.is_empty()
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// 1-based.
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,

    /// 1-based index of the first item, 0 when the listing is empty.
    pub first: usize,

    /// 1-based index of the last item, 0 when the listing is empty.
    pub last: usize,

    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// `"Showing 11-20 of 47 incidents"`.
    pub fn caption(&self) -> String {
        format!(
            "Showing {}-{} of {} incidents",
            self.first, self.last, self.total_items
        )
    }
}

/// Slices `items` into `per_page` pages and returns page `page` (1-based).
///
/// Out-of-range page numbers clamp to the first or last page.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let number = page.clamp(1, total_pages.max(1));

    let start = ((number - 1) * per_page).min(total_items);
    let end = (start + per_page).min(total_items);

    Page {
        number,
        total_pages,
        total_items,
        first: if start < end { start + 1 } else { 0 },
        last: end,
        items: items[start..end].to_vec(),
    }
}
