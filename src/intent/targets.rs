use serde::Serialize;

/// Most seeds of one kind the recommendation endpoint accepts
pub const MAX_SEEDS_PER_KIND: usize = 5;
/// Largest page the recommendation endpoint returns
pub const MAX_RECOMMENDATION_LIMIT: u32 = 100;

/// Optional target values for the six tunable audio descriptors.
///
/// Partial targets are stacked as layers: a value set in a later layer replaces
/// the same value from an earlier one, unset values fall through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AudioTargets {
    pub energy: Option<f64>,
    pub valence: Option<f64>,
    pub danceability: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub tempo: Option<f64>,
}

impl AudioTargets {
    pub const NONE: AudioTargets = AudioTargets {
        energy: None,
        valence: None,
        danceability: None,
        acousticness: None,
        instrumentalness: None,
        tempo: None,
    };

    /// Put `overlay` on top of `self`
    pub fn merge(self, overlay: AudioTargets) -> AudioTargets {
        AudioTargets {
            energy: overlay.energy.or(self.energy),
            valence: overlay.valence.or(self.valence),
            danceability: overlay.danceability.or(self.danceability),
            acousticness: overlay.acousticness.or(self.acousticness),
            instrumentalness: overlay.instrumentalness.or(self.instrumentalness),
            tempo: overlay.tempo.or(self.tempo),
        }
    }

    /// Merge layers in order, lowest precedence first
    pub fn layered<I>(layers: I) -> AudioTargets
    where
        I: IntoIterator<Item = AudioTargets>,
    {
        layers.into_iter().fold(AudioTargets::NONE, AudioTargets::merge)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        *self == AudioTargets::NONE
    }
}

/// Working set of parameters for one recommendation query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationParams {
    pub seed_artists: Vec<String>,
    pub seed_tracks: Vec<String>,
    pub seed_genres: Vec<String>,
    pub limit: Option<u32>,
    pub targets: AudioTargets,
    pub min_popularity: Option<u32>,
    pub max_popularity: Option<u32>,
}

impl RecommendationParams {
    pub fn with_targets(targets: AudioTargets) -> Self {
        Self {
            targets,
            ..Self::default()
        }
    }

    pub fn has_seeds(&self) -> bool {
        !self.seed_artists.is_empty() || !self.seed_tracks.is_empty() || !self.seed_genres.is_empty()
    }

    /// Lower the popularity ceiling, never raise it
    pub fn cap_popularity(&mut self, max: u32) {
        self.max_popularity = Some(self.max_popularity.map_or(max, |current| current.min(max)));
    }

    /// Query string pairs as the recommendation endpoint expects them
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        let seeds = [
            ("seed_artists", &self.seed_artists),
            ("seed_tracks", &self.seed_tracks),
            ("seed_genres", &self.seed_genres),
        ];
        for (key, ids) in seeds {
            if !ids.is_empty() {
                let capped: Vec<&str> = ids
                    .iter()
                    .take(MAX_SEEDS_PER_KIND)
                    .map(String::as_str)
                    .collect();
                pairs.push((key, capped.join(",")));
            }
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.clamp(1, MAX_RECOMMENDATION_LIMIT).to_string()));
        }

        let targets = [
            ("target_energy", self.targets.energy),
            ("target_valence", self.targets.valence),
            ("target_danceability", self.targets.danceability),
            ("target_acousticness", self.targets.acousticness),
            ("target_instrumentalness", self.targets.instrumentalness),
            ("target_tempo", self.targets.tempo),
        ];
        for (key, value) in targets {
            if let Some(value) = value {
                pairs.push((key, value.to_string()));
            }
        }

        if let Some(min) = self.min_popularity {
            pairs.push(("min_popularity", min.min(100).to_string()));
        }
        if let Some(max) = self.max_popularity {
            pairs.push(("max_popularity", max.min(100).to_string()));
        }

        pairs
    }
}
