//! Stage identifiers and validated stage sequences.

use crate::errors::DuplicateStageError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifies a single lifecycle stage.
///
/// The numeric value carries no ordering meaning of its own; only the
/// position of an id inside a [`StageSequence`] decides when it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(i64);

impl StageId {
    /// Creates a stage id from its raw value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for StageId {
                fn from(value: $t) -> Self {
                    Self(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_try_from_int {
    ($($t:ty),*) => {
        $(
            impl TryFrom<$t> for StageId {
                type Error = std::num::TryFromIntError;

                fn try_from(value: $t) -> Result<Self, Self::Error> {
                    i64::try_from(value).map(Self)
                }
            }
        )*
    };
}

// Values outside the `i64` range have no stage id. Convert ranges of these types
// with `StageId::try_from` before declaring them.
impl_try_from_int!(u64, usize, i128, u128);

/// An ordered list of stage ids with no duplicates.
///
/// The only way to build one is [`StageSequence::new`], so every instance
/// has already passed duplicate validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StageSequence {
    stages: Vec<StageId>,
}

impl StageSequence {
    /// Validates and builds a sequence.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateStageError`] for the first id that appears twice.
    pub fn new<I, S>(stages: I) -> Result<Self, DuplicateStageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<StageId>,
    {
        let stages: Vec<StageId> = stages.into_iter().map(Into::into).collect();
        let mut seen: HashMap<StageId, usize> = HashMap::with_capacity(stages.len());

        for (position, stage) in stages.iter().enumerate() {
            if let Some(&first) = seen.get(stage) {
                return Err(DuplicateStageError::new(*stage, first, position));
            }
            seen.insert(*stage, position);
        }

        Ok(Self { stages })
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the sequence has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Iterates the stages in declared order.
    pub fn iter(&self) -> impl Iterator<Item = StageId> + '_ {
        self.stages.iter().copied()
    }

    /// Returns true if `stage` is part of the sequence.
    #[must_use]
    pub fn contains(&self, stage: StageId) -> bool {
        self.stages.contains(&stage)
    }

    /// Returns the zero-based position of `stage`, if present.
    #[must_use]
    pub fn position(&self, stage: StageId) -> Option<usize> {
        self.stages.iter().position(|s| *s == stage)
    }

    /// Borrows the stages as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[StageId] {
        &self.stages
    }

    /// Copies the stages into a new vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<StageId> {
        self.stages.clone()
    }
}

impl<'de> Deserialize<'de> for StageSequence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let stages = Vec::<StageId>::deserialize(deserializer)?;
        Self::new(stages).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Vec<StageId>> for StageSequence {
    type Error = DuplicateStageError;

    fn try_from(stages: Vec<StageId>) -> Result<Self, Self::Error> {
        Self::new(stages)
    }
}

impl<'a> IntoIterator for &'a StageSequence {
    type Item = StageId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, StageId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter().copied()
    }
}
