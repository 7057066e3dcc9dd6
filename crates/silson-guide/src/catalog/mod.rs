//! Reference catalog of policy generations and transition guides.
//!
//! The catalog is loaded once at startup, validated, and then shared read-only
//! (behind an `Arc`) by every request.

mod model;

pub use model::{
    transition_key, CatalogDocument, CoverageItem, CoverageStructure, Exclusions, GenerationId,
    GenerationRecord, JoinPeriod, Premium, TransitionGuide, DATE_FORMAT, GROUPED_EXCLUSIONS_KEY,
};

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read reference catalog '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid reference catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("generation at position {position} must have a positive identifier")]
    InvalidIdentifier { position: usize },
    #[error("generation {0} appears more than once")]
    DuplicateGeneration(GenerationId),
    #[error("generation {generation} is missing required field '{field}'")]
    MissingField {
        generation: GenerationId,
        field: &'static str,
    },
}

/// Validated, immutable set of generation records plus transition guides.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    generations: Vec<GenerationRecord>,
    switch_guide: BTreeMap<String, TransitionGuide>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        validate(&document.generations)?;
        warn_on_interval_issues(&document.generations);

        Ok(Self {
            generations: document.generations,
            switch_guide: document.switch_guide,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(raw)?;
        Self::from_document(document)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Load the catalog, degrading to an empty catalog when the dataset is unusable.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(catalog) => {
                info!(
                    path = %path.display(),
                    generations = catalog.len(),
                    guides = catalog.switch_guide.len(),
                    "reference catalog loaded"
                );
                catalog
            }
            Err(err) => {
                error!(
                    path = %path.display(),
                    error = %err,
                    "reference catalog unavailable; serving empty catalog"
                );
                Self::empty()
            }
        }
    }

    /// Records in stored order; resolution scans them front to back.
    pub fn generations(&self) -> &[GenerationRecord] {
        &self.generations
    }

    pub fn generation(&self, id: GenerationId) -> Option<&GenerationRecord> {
        self.generations.iter().find(|record| record.generation == id)
    }

    /// Newest generation, used as the comparison target for every prompt.
    pub fn terminal(&self) -> Option<&GenerationRecord> {
        self.generations.iter().max_by_key(|record| record.generation)
    }

    pub fn transition_guide(
        &self,
        from: GenerationId,
        to: GenerationId,
    ) -> Option<&TransitionGuide> {
        self.switch_guide.get(&transition_key(from, to))
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }
}

fn validate(generations: &[GenerationRecord]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();

    for (position, record) in generations.iter().enumerate() {
        let id = record.generation;
        if id.0 == 0 {
            return Err(CatalogError::InvalidIdentifier { position });
        }
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateGeneration(id));
        }

        let missing = |field: &'static str| CatalogError::MissingField {
            generation: id,
            field,
        };

        if record.name.trim().is_empty() {
            return Err(missing("name"));
        }
        if record.guarantees.is_empty() {
            return Err(missing("guarantees"));
        }
        if record.exclusions.len() < 2 {
            return Err(missing("exclusions"));
        }
        if record.special_features.is_empty() {
            return Err(missing("special_features"));
        }
        if record.premium.level.trim().is_empty() {
            return Err(missing("premium.level"));
        }
        if record.pros.is_empty() {
            return Err(missing("pros"));
        }
        if record.cons.is_empty() {
            return Err(missing("cons"));
        }
    }

    Ok(())
}

fn warn_on_interval_issues(generations: &[GenerationRecord]) {
    let mut intervals = Vec::with_capacity(generations.len());

    for record in generations {
        match record.join_period.bounds() {
            Some((start, end)) if start <= end => intervals.push((record.generation, start, end)),
            Some(_) => warn!(
                generation = %record.generation,
                "join period ends before it starts; it can never match"
            ),
            None => warn!(
                generation = %record.generation,
                "join period bounds are malformed; record will be skipped during resolution"
            ),
        }
    }

    for (index, (left_id, left_start, left_end)) in intervals.iter().enumerate() {
        for (right_id, right_start, right_end) in intervals.iter().skip(index + 1) {
            if left_start <= right_end && right_start <= left_end {
                warn!(
                    first = %left_id,
                    second = %right_id,
                    "join periods overlap; earlier record wins"
                );
            }
        }
    }
}
