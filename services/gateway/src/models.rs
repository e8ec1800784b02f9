use serde::Deserialize;
use types::event::TeamSide;
use types::ids::CourtId;

use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourtRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartMatchRequest {
    pub court_id: CourtId,
    pub team_a_name: String,
    pub team_b_name: String,
    /// Optional set format; defaults to best-of-3.
    pub best_of: Option<types::snapshot::BestOf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointEventRequest {
    pub winner: TeamSide,
    pub source_device: String,
    /// Optimistic-concurrency guard; omitted means last writer wins.
    pub expected_seq: Option<u64>,
}

impl PointEventRequest {
    /// Boundary validation: the scorer must identify itself.
    pub fn source_device(&self) -> Result<&str, AppError> {
        let device = self.source_device.trim();
        if device.is_empty() {
            return Err(AppError::BadRequest(
                "source_device must not be empty".to_string(),
            ));
        }
        Ok(device)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreboardQuery {
    /// Comma-separated court ids; absent or empty means all courts.
    pub courts: Option<String>,
}

impl ScoreboardQuery {
    pub fn court_ids(&self) -> Result<Option<Vec<CourtId>>, AppError> {
        let raw = match self.courts.as_deref() {
            None => return Ok(None),
            Some(raw) if raw.trim().is_empty() => return Ok(None),
            Some(raw) => raw,
        };

        let ids = raw
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<CourtId>()
                    .map_err(|_| AppError::BadRequest(format!("invalid court id: {}", part)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(ids))
    }
}
