use anyhow::Result;
use chrono::Datelike;
use rand::Rng;
use rand::seq::SliceRandom;

use super::generator::{GeneratedPlaylist, PlaylistGenerator, TrackAccumulator, resolve_count};
use super::PlaylistKind;
use crate::error::ResolutionError;

pub const EARLIEST_YEAR: u32 = 1950;

/// Ages covered by "your high school years"
const HIGH_SCHOOL_AGES: std::ops::RangeInclusive<u32> = 14..=18;
/// Extra candidates per year so duplicates can be dropped
const YEAR_FETCH_HEADROOM: u32 = 20;

/// Hits from a single year, or from the listener's teenage years
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeMachineRequest {
    pub year: Option<u32>,
    pub birth_year: Option<u32>,
    pub count: Option<u32>,
}

/// Years to visit, clamped to `EARLIEST_YEAR..=current_year`
pub fn resolve_years(
    year: Option<u32>,
    birth_year: Option<u32>,
    current_year: u32,
) -> Result<Vec<u32>, ResolutionError> {
    let requested: Vec<u32> = match (year, birth_year) {
        (Some(year), _) => vec![year],
        (None, Some(birth)) => HIGH_SCHOOL_AGES
            .filter_map(|age| birth.checked_add(age))
            .collect(),
        (None, None) => return Err(ResolutionError::MissingYear),
    };

    let valid: Vec<u32> = requested
        .iter()
        .copied()
        .filter(|year| (EARLIEST_YEAR..=current_year).contains(year))
        .collect();

    if valid.is_empty() {
        return Err(ResolutionError::NoValidYears {
            requested,
            min: EARLIEST_YEAR,
            max: current_year,
        });
    }
    Ok(valid)
}

impl<R: Rng> PlaylistGenerator<'_, R> {
    pub fn time_machine(&mut self, request: &TimeMachineRequest) -> Result<GeneratedPlaylist> {
        let current_year = chrono::Local::now().year().max(0) as u32;
        self.time_machine_at(request, current_year)
    }

    pub fn time_machine_at(
        &mut self,
        request: &TimeMachineRequest,
        current_year: u32,
    ) -> Result<GeneratedPlaylist> {
        let years = resolve_years(request.year, request.birth_year, current_year)?;
        let count = resolve_count(request.count);
        let per_year = count.div_ceil(years.len() as u32);

        let mut chosen = TrackAccumulator::default();
        for &year in &years {
            let mut candidates: Vec<_> = self
                .provider
                .tracks_by_year(year, per_year.saturating_add(YEAR_FETCH_HEADROOM))?
                .into_iter()
                .filter(|track| !chosen.contains(&track.id))
                .collect();
            candidates.sort_by(|a, b| b.popularity.cmp(&a.popularity));
            candidates.truncate(per_year as usize);

            let added = chosen.extend(candidates);
            log::debug!("time machine {year}: {added} tracks");
        }

        // interleave the years instead of presenting them block by block
        let mut tracks = chosen.into_tracks();
        tracks.shuffle(&mut self.rng);
        tracks.truncate(count as usize);

        Ok(GeneratedPlaylist {
            kind: PlaylistKind::TimeMachine {
                first_year: years[0],
                last_year: years[years.len() - 1],
                from_birth_year: request.year.is_none(),
            },
            tracks,
        })
    }
}
