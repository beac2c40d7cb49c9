//! Entity normalization: many raw collections in, one renderable marker list out
//!
//! Source precedence is `filtered_entities`, then `all_markers`, then the
//! union of the typed collections in [`TYPED_COLLECTION_ORDER`]. Only the
//! chosen source is read. Records without an id or a resolvable position are
//! dropped and counted in the [`NormalizeReport`]. Identical ids across
//! collections are not merged.

use crate::data::entity::{MarkerEntity, MarkerKind, Rejection};
use crate::prelude::HashSet;
use serde::Deserialize;
use serde_json::Value;

/// The typed collections consumed by the console, in concatenation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Workers,
    Clients,
    Competitors,
    Quotations,
    Leads,
    Journals,
    Tasks,
    CheckIns,
    ShiftStarts,
    ShiftEnds,
    BreakStarts,
    BreakEnds,
}

pub const TYPED_COLLECTION_ORDER: [Collection; 12] = [
    Collection::Workers,
    Collection::Clients,
    Collection::Competitors,
    Collection::Quotations,
    Collection::Leads,
    Collection::Journals,
    Collection::Tasks,
    Collection::CheckIns,
    Collection::ShiftStarts,
    Collection::ShiftEnds,
    Collection::BreakStarts,
    Collection::BreakEnds,
];

impl Collection {
    /// `markerType` stamped on records that do not carry one
    pub fn default_marker_type(&self) -> &'static str {
        match self {
            Collection::Workers => "worker",
            Collection::Clients => "client",
            Collection::Competitors => "competitor",
            Collection::Quotations => "quotation",
            Collection::Leads => "lead",
            Collection::Journals => "journal",
            Collection::Tasks => "task",
            Collection::CheckIns => "check-in",
            Collection::ShiftStarts => "shift-start",
            Collection::ShiftEnds => "shift-end",
            Collection::BreakStarts => "break-start",
            Collection::BreakEnds => "break-end",
        }
    }
}

/// All inputs the normalizer can draw from
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntitySources {
    pub filtered_entities: Option<Vec<Value>>,
    pub all_markers: Option<Vec<Value>>,
    pub workers: Vec<Value>,
    pub clients: Vec<Value>,
    pub competitors: Vec<Value>,
    pub quotations: Vec<Value>,
    pub leads: Vec<Value>,
    pub journals: Vec<Value>,
    pub tasks: Vec<Value>,
    pub check_ins: Vec<Value>,
    pub shift_starts: Vec<Value>,
    pub shift_ends: Vec<Value>,
    pub break_starts: Vec<Value>,
    pub break_ends: Vec<Value>,
}

impl EntitySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filtered(mut self, entities: Vec<Value>) -> Self {
        self.filtered_entities = Some(entities);
        self
    }

    pub fn with_all_markers(mut self, markers: Vec<Value>) -> Self {
        self.all_markers = Some(markers);
        self
    }

    pub fn with_collection(mut self, collection: Collection, records: Vec<Value>) -> Self {
        *self.collection_mut(collection) = records;
        self
    }

    pub fn collection(&self, collection: Collection) -> &[Value] {
        match collection {
            Collection::Workers => &self.workers,
            Collection::Clients => &self.clients,
            Collection::Competitors => &self.competitors,
            Collection::Quotations => &self.quotations,
            Collection::Leads => &self.leads,
            Collection::Journals => &self.journals,
            Collection::Tasks => &self.tasks,
            Collection::CheckIns => &self.check_ins,
            Collection::ShiftStarts => &self.shift_starts,
            Collection::ShiftEnds => &self.shift_ends,
            Collection::BreakStarts => &self.break_starts,
            Collection::BreakEnds => &self.break_ends,
        }
    }

    pub fn collection_mut(&mut self, collection: Collection) -> &mut Vec<Value> {
        match collection {
            Collection::Workers => &mut self.workers,
            Collection::Clients => &mut self.clients,
            Collection::Competitors => &mut self.competitors,
            Collection::Quotations => &mut self.quotations,
            Collection::Leads => &mut self.leads,
            Collection::Journals => &mut self.journals,
            Collection::Tasks => &mut self.tasks,
            Collection::CheckIns => &mut self.check_ins,
            Collection::ShiftStarts => &mut self.shift_starts,
            Collection::ShiftEnds => &mut self.shift_ends,
            Collection::BreakStarts => &mut self.break_starts,
            Collection::BreakEnds => &mut self.break_ends,
        }
    }

    /// Which source the precedence rule picks
    pub fn active_source(&self) -> SourceKind {
        if self.filtered_entities.is_some() {
            SourceKind::Filtered
        } else if self.all_markers.is_some() {
            SourceKind::AllMarkers
        } else {
            SourceKind::TypedCollections
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Filtered,
    AllMarkers,
    TypedCollections,
}

/// Diagnostics for one normalization pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeReport {
    pub source: SourceKind,
    pub considered: usize,
    pub missing_id: usize,
    pub unresolved_position: usize,
}

impl NormalizeReport {
    fn new(source: SourceKind) -> Self {
        Self {
            source,
            considered: 0,
            missing_id: 0,
            unresolved_position: 0,
        }
    }

    pub fn dropped(&self) -> usize {
        self.missing_id + self.unresolved_position
    }

    pub fn accepted(&self) -> usize {
        self.considered - self.dropped()
    }

    fn record(&mut self, outcome: &Result<MarkerEntity, Rejection>) {
        self.considered += 1;
        match outcome {
            Ok(_) => {}
            Err(Rejection::MissingId) => self.missing_id += 1,
            Err(Rejection::UnresolvedPosition) => self.unresolved_position += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub markers: Vec<MarkerEntity>,
    pub report: NormalizeReport,
}

/// Pure normalization of the given sources
pub fn normalize(sources: &EntitySources) -> Normalized {
    let source = sources.active_source();
    let mut report = NormalizeReport::new(source);
    let mut markers = Vec::new();

    let mut take = |record: &Value, default_type: Option<&str>| {
        let outcome = MarkerEntity::from_value(record, default_type);
        report.record(&outcome);
        if let Ok(entity) = outcome {
            markers.push(entity);
        }
    };

    match source {
        SourceKind::Filtered => sources
            .filtered_entities
            .iter()
            .flatten()
            .for_each(|r| take(r, None)),
        SourceKind::AllMarkers => sources
            .all_markers
            .iter()
            .flatten()
            .for_each(|r| take(r, None)),
        SourceKind::TypedCollections => {
            for collection in TYPED_COLLECTION_ORDER {
                let default_type = collection.default_marker_type();
                for record in sources.collection(collection) {
                    take(record, Some(default_type));
                }
            }
        }
    }

    #[cfg(feature = "debug")]
    log_dropped(&report);

    Normalized { markers, report }
}

#[cfg(feature = "debug")]
fn log_dropped(report: &NormalizeReport) {
    if report.dropped() > 0 {
        log::debug!(
            "normalized {} of {} entities from {:?} ({} without id, {} without position)",
            report.accepted(),
            report.considered,
            report.source,
            report.missing_id,
            report.unresolved_position
        );
    }
}

/// Keeps the first entity per `(id, markerType)` key.
///
/// Not applied by [`normalize`]; callers that decide cross-source duplicates
/// should collapse can opt in.
pub fn dedup_by_key(markers: Vec<MarkerEntity>) -> Vec<MarkerEntity> {
    let mut seen: HashSet<(String, MarkerKind)> = HashSet::default();
    markers
        .into_iter()
        .filter(|m| seen.insert((m.id.as_str().to_string(), m.kind())))
        .collect()
}

/// Memoizing wrapper that re-derives markers only after the sources change
#[derive(Debug, Default)]
pub struct Normalizer {
    sources: EntitySources,
    revision: u64,
    cached: Option<(u64, Normalized)>,
}

impl Normalizer {
    pub fn new(sources: EntitySources) -> Self {
        Self {
            sources,
            revision: 1,
            cached: None,
        }
    }

    pub fn sources(&self) -> &EntitySources {
        &self.sources
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the sources; unchanged sources keep the cached result
    pub fn set_sources(&mut self, sources: EntitySources) {
        if sources != self.sources {
            self.sources = sources;
            self.revision += 1;
        }
    }

    /// Mutates the sources in place and invalidates the cache
    pub fn update_sources<F>(&mut self, f: F)
    where
        F: FnOnce(&mut EntitySources),
    {
        f(&mut self.sources);
        self.revision += 1;
    }

    pub fn normalized(&mut self) -> &Normalized {
        let revision = self.revision;
        if matches!(&self.cached, Some((r, _)) if *r != revision) {
            self.cached = None;
        }
        let sources = &self.sources;
        let (_, normalized) = self
            .cached
            .get_or_insert_with(|| (revision, normalize(sources)));
        normalized
    }
}
