//! Typed parameter objects, one per wire operation (Redesign Flag #1,
//! `spec.md` §9): each parses and validates its own raw query/body map so
//! `dispatch::handlers` never touches an untyped value. Parse failures
//! become `BadRequest`, matching `spec.md` §7.

use marker_core::MarkerError;
use marker_model::{MarkerId, MarkerType, MediaItemId, SectionId};
use serde::Deserialize;

fn bad_request(msg: impl Into<String>) -> MarkerError {
    MarkerError::BadRequest(msg.into())
}

fn parse_marker_type(raw: &str) -> Result<MarkerType, MarkerError> {
    MarkerType::parse(raw).ok_or_else(|| bad_request(format!("unknown marker type '{raw}'")))
}

fn parse_csv_ids(raw: &str) -> Result<Vec<MarkerId>, MarkerError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map(MarkerId)
                .map_err(|_| bad_request(format!("invalid id in csv list: '{part}'")))
        })
        .collect()
}

/// `GET query?keys=1,2,3`
#[derive(Debug, Deserialize)]
pub struct RawQueryParams {
    pub keys: String,
}

pub struct QueryParams {
    pub parent_ids: Vec<MediaItemId>,
}

impl TryFrom<RawQueryParams> for QueryParams {
    type Error = MarkerError;

    fn try_from(raw: RawQueryParams) -> Result<Self, Self::Error> {
        let parent_ids = raw
            .keys
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|part| part.trim().parse::<i64>().map(MediaItemId).map_err(|_| bad_request(format!("invalid id '{part}'"))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { parent_ids })
    }
}

/// `POST add`
#[derive(Debug, Deserialize)]
pub struct RawAddParams {
    pub metadata_id: i64,
    pub start: i64,
    pub end: i64,
    #[serde(rename = "type")]
    pub marker_type: String,
    #[serde(rename = "final")]
    pub is_final: i32,
}

pub struct AddParams {
    pub parent_id: MediaItemId,
    pub start: i64,
    pub end: i64,
    pub marker_type: MarkerType,
    pub is_final: bool,
}

impl TryFrom<RawAddParams> for AddParams {
    type Error = MarkerError;

    fn try_from(raw: RawAddParams) -> Result<Self, Self::Error> {
        Ok(Self {
            parent_id: MediaItemId(raw.metadata_id),
            start: raw.start,
            end: raw.end,
            marker_type: parse_marker_type(&raw.marker_type)?,
            is_final: raw.is_final != 0,
        })
    }
}

/// `PUT edit/:id`
#[derive(Debug, Deserialize)]
pub struct RawEditParams {
    pub start: i64,
    pub end: i64,
    #[serde(rename = "type")]
    pub marker_type: String,
    #[serde(rename = "final")]
    pub is_final: i32,
    #[serde(rename = "userCreated", default = "default_user_created")]
    pub user_created: i32,
}

fn default_user_created() -> i32 {
    1
}

pub struct EditParams {
    pub marker_id: MarkerId,
    pub start: i64,
    pub end: i64,
    pub marker_type: MarkerType,
    pub is_final: bool,
    pub created_by_user: bool,
}

impl EditParams {
    pub fn try_from_raw(marker_id: i64, raw: RawEditParams) -> Result<Self, MarkerError> {
        Ok(Self {
            marker_id: MarkerId(marker_id),
            start: raw.start,
            end: raw.end,
            marker_type: parse_marker_type(&raw.marker_type)?,
            is_final: raw.is_final != 0,
            created_by_user: raw.user_created != 0,
        })
    }
}

/// `POST shift/:id`
#[derive(Debug, Deserialize)]
pub struct RawShiftParams {
    pub shift: Option<i64>,
    pub start_shift: Option<i64>,
    pub end_shift: Option<i64>,
    #[serde(default)]
    pub force: i32,
    #[serde(default)]
    pub ignored: String,
}

pub struct ShiftParams {
    pub root_id: MediaItemId,
    pub d_start: i64,
    pub d_end: i64,
    pub force: bool,
    pub ignore_ids: Vec<MarkerId>,
}

impl ShiftParams {
    pub fn try_from_raw(root_id: i64, raw: RawShiftParams) -> Result<Self, MarkerError> {
        let (d_start, d_end) = match (raw.shift, raw.start_shift, raw.end_shift) {
            (Some(uniform), None, None) => (uniform, uniform),
            (None, start, end) => (start.unwrap_or(0), end.unwrap_or(0)),
            (Some(_), _, _) => {
                return Err(bad_request("provide either `shift` or `start_shift`/`end_shift`, not both"))
            }
        };
        Ok(Self {
            root_id: MediaItemId(root_id),
            d_start,
            d_end,
            force: raw.force != 0,
            ignore_ids: parse_csv_ids(&raw.ignored)?,
        })
    }
}

/// `POST restore` / `POST ignore_purge`
#[derive(Debug, Deserialize)]
pub struct RawPurgeTarget {
    pub marker_id: i64,
    pub section_id: i64,
}

pub struct PurgeTarget {
    pub marker_id: MarkerId,
    pub section_id: SectionId,
}

impl From<RawPurgeTarget> for PurgeTarget {
    fn from(raw: RawPurgeTarget) -> Self {
        Self { marker_id: MarkerId(raw.marker_id), section_id: SectionId(raw.section_id) }
    }
}
