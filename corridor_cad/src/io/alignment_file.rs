//! Versioned JSON persistence for alignments.

use std::io;

use serde::{Deserialize, Serialize};

use crate::alignment::{Alignment, ChangeEvent, IntersectionEquation, PiRecord, Pvi, Stationing};
use crate::config::DiscretizeConfig;
use crate::geometry::Point;

/// Newest file layout this build reads and the one it writes.
pub const ALIGNMENT_FILE_VERSION: u32 = 1;

/// On-disk form of an [`Alignment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentFile {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub datum: Point,
    #[serde(default)]
    pub placement: Point,
    pub pis: Vec<PiRecord>,
    #[serde(default)]
    pub stationing: Stationing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intersection: Option<IntersectionEquation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Vec<Pvi>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<DiscretizeConfig>,
}

impl From<&Alignment> for AlignmentFile {
    fn from(a: &Alignment) -> Self {
        Self {
            version: ALIGNMENT_FILE_VERSION,
            name: a.name.clone(),
            datum: a.datum(),
            placement: a.placement(),
            pis: a.pis().to_vec(),
            stationing: a.stationing().clone(),
            intersection: a.intersection(),
            profile: a.profile().map(<[Pvi]>::to_vec),
            config: Some(a.config().clone()),
        }
    }
}

impl AlignmentFile {
    /// Builds the alignment, using `fallback` when the file carries no
    /// configuration of its own.
    pub fn into_alignment(self, fallback: &DiscretizeConfig) -> Alignment {
        let mut a = Alignment::new(self.name, self.datum, self.pis)
            .with_config(self.config.unwrap_or_else(|| fallback.clone()))
            .with_stationing(self.stationing);
        a.apply(ChangeEvent::PlacementChanged(self.placement));
        if let Some(pvis) = self.profile {
            a = a.with_profile(pvis);
        }
        if let Some(eq) = self.intersection {
            a = a.with_intersection(eq);
        }
        a
    }
}

/// Parses an alignment document, rejecting versions newer than
/// [`ALIGNMENT_FILE_VERSION`].
pub fn parse_alignment_json(contents: &str) -> io::Result<AlignmentFile> {
    #[derive(Deserialize)]
    struct Header {
        version: u32,
    }
    let header: Header = serde_json::from_str(contents)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if header.version == 0 || header.version > ALIGNMENT_FILE_VERSION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "alignment file version {} is not supported (expected 1..={ALIGNMENT_FILE_VERSION})",
                header.version
            ),
        ));
    }
    serde_json::from_str(contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn read_alignment_json(path: &str) -> io::Result<AlignmentFile> {
    let contents = super::read_to_string(path)?;
    parse_alignment_json(&contents)
}

pub fn write_alignment_json(path: &str, file: &AlignmentFile) -> io::Result<()> {
    let json = serde_json::to_string_pretty(file).map_err(io::Error::other)?;
    super::write_string(path, &json)
}
