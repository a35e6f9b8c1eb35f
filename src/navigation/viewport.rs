use crate::{config::ViewportConfig, sample::Coordinates};

/// What the map view should do
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ViewportCommand {
    /// Center on this position
    Center(Coordinates),
    /// Show this whole region
    Frame {
        south_west: Coordinates,
        north_east: Coordinates,
    },
}

impl ViewportCommand {
    /// Region covering both points, enlarged by `padding` (fraction
    /// of the span) on every side
    pub fn frame(a: Coordinates, b: Coordinates, padding: f64) -> Self {
        let (south, north) = (a.latitude.min(b.latitude), a.latitude.max(b.latitude));
        let (west, east) = (a.longitude.min(b.longitude), a.longitude.max(b.longitude));
        let dlat = (north - south) * padding;
        let dlon = (east - west) * padding;
        Self::Frame {
            south_west: Coordinates::new((south - dlat).max(-90.0), west - dlon),
            north_east: Coordinates::new((north + dlat).min(90.0), east + dlon),
        }
    }
}

fn moved(last: Option<Coordinates>, now: Option<Coordinates>, min_move: f64) -> bool {
    match (last, now) {
        (Some(last), Some(now)) => last.distance(&now) >= min_move,
        (None, None) => false,
        _ => true,
    }
}

/// [ViewportPolicy] decides when the following viewport needs to move.
/// Following with origin-only tracks the user, following without it
/// frames user and target, and nothing happens when not following.
#[derive(Debug, Clone, Default)]
pub struct ViewportPolicy {
    config: ViewportConfig,
    user: Option<Coordinates>,
    target: Option<Coordinates>,
}

impl ViewportPolicy {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            user: None,
            target: None,
        }
    }
    /// Forgets the last command: next update always issues one
    pub fn reset(&mut self) {
        self.user = None;
        self.target = None;
    }
    /// Returns the command to issue, if user or target moved meaningfully
    /// since the last one.
    pub fn update(
        &mut self,
        following: bool,
        origin_only: bool,
        user: Option<Coordinates>,
        target: Option<Coordinates>,
    ) -> Option<ViewportCommand> {
        if !following {
            self.reset();
            return None;
        }
        let user_pos = user?;
        let target = if origin_only { None } else { target };
        let min_move = self.config.min_move;
        if self.user.is_some()
            && !moved(self.user, user, min_move)
            && !moved(self.target, target, min_move)
        {
            return None;
        }
        self.user = user;
        self.target = target;
        match target {
            Some(target) => Some(ViewportCommand::frame(user_pos, target, self.config.padding)),
            None => Some(ViewportCommand::Center(user_pos)),
        }
    }
}
