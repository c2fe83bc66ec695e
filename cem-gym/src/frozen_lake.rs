use candle_core::{Error, Result};
use cem_core::env::{Env, EnvironmentDescription, SnapShot, Space, StepInfo};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::fmt::Write;
use std::str::FromStr;
use thiserror::Error;

const MAP_4X4: [&str; 4] = ["SFFF", "FHFH", "FFFH", "HFFG"];

const MAP_8X8: [&str; 8] = [
    "SFFFFFFF", "FFFFFFFF", "FFFHFFFF", "FFFFFHFF", "FFFHFFFF", "FHHFFFHF", "FHFFHFHF",
    "FFFHFFFG",
];

pub const LEFT: usize = 0;
pub const DOWN: usize = 1;
pub const RIGHT: usize = 2;
pub const UP: usize = 3;
const N_ACTIONS: usize = 4;

// time limits of the registered gym environments; custom maps get the 4x4 one
const DEFAULT_TIME_LIMIT: usize = 100;
const TIME_LIMIT_8X8: usize = 200;

#[derive(Debug, Error)]
pub enum FrozenLakeError {
    #[error("action {0} is not one of the four FrozenLake moves")]
    InvalidAction(usize),
    #[error("unknown tile {0:?} in lake map")]
    InvalidTile(char),
    #[error("lake map rows must be non-empty and of equal length")]
    RaggedMap,
    #[error("lake map must contain exactly one start tile, found {0}")]
    StartTiles(usize),
    #[error("unknown built-in map {0:?}, expected 4x4 or 8x8")]
    UnknownMap(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Start,
    Frozen,
    Hole,
    Goal,
}

impl Tile {
    fn from_char(c: char) -> std::result::Result<Self, FrozenLakeError> {
        match c {
            'S' => Ok(Self::Start),
            'F' => Ok(Self::Frozen),
            'H' => Ok(Self::Hole),
            'G' => Ok(Self::Goal),
            other => Err(FrozenLakeError::InvalidTile(other)),
        }
    }

    fn as_char(&self) -> char {
        match self {
            Self::Start => 'S',
            Self::Frozen => 'F',
            Self::Hole => 'H',
            Self::Goal => 'G',
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Hole | Self::Goal)
    }
}

/// Row-major grid of tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct LakeMap {
    tiles: Vec<Tile>,
    nrow: usize,
    ncol: usize,
    start: usize,
    time_limit: usize,
}

impl LakeMap {
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> std::result::Result<Self, FrozenLakeError> {
        let ncol = rows.first().map(|row| row.as_ref().len()).unwrap_or(0);
        if ncol == 0 || rows.iter().any(|row| row.as_ref().len() != ncol) {
            return Err(FrozenLakeError::RaggedMap);
        }
        let tiles = rows
            .iter()
            .flat_map(|row| row.as_ref().chars())
            .map(Tile::from_char)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let starts: Vec<usize> = tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| **tile == Tile::Start)
            .map(|(idx, _)| idx)
            .collect();
        let &[start] = starts.as_slice() else {
            return Err(FrozenLakeError::StartTiles(starts.len()));
        };
        Ok(Self {
            tiles,
            nrow: rows.len(),
            ncol,
            start,
            time_limit: DEFAULT_TIME_LIMIT,
        })
    }

    pub fn four_by_four() -> Self {
        Self::from_rows(&MAP_4X4).expect("built-in 4x4 map is valid")
    }

    pub fn eight_by_eight() -> Self {
        let map = Self::from_rows(&MAP_8X8).expect("built-in 8x8 map is valid");
        Self {
            time_limit: TIME_LIMIT_8X8,
            ..map
        }
    }

    /// Steps before an episode on this map is truncated.
    pub fn time_limit(&self) -> usize {
        self.time_limit
    }

    pub fn n_states(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile(&self, state: usize) -> Tile {
        self.tiles[state]
    }

    /// The cell reached by moving once in `action`'s direction; walls keep the agent in place.
    fn neighbour(&self, state: usize, action: usize) -> usize {
        let (mut row, mut col) = (state / self.ncol, state % self.ncol);
        match action {
            LEFT => col = col.saturating_sub(1),
            DOWN => row = (row + 1).min(self.nrow - 1),
            RIGHT => col = (col + 1).min(self.ncol - 1),
            UP => row = row.saturating_sub(1),
            _ => unreachable!("actions are validated before moving"),
        }
        row * self.ncol + col
    }
}

impl FromStr for LakeMap {
    type Err = FrozenLakeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "4x4" => Ok(Self::four_by_four()),
            "8x8" => Ok(Self::eight_by_eight()),
            other => Err(FrozenLakeError::UnknownMap(other.into())),
        }
    }
}

/// The FrozenLake grid world: walk from `S` to `G` across frozen tiles without falling into a
/// hole. On slippery ice the agent moves in the intended direction or in one of the two
/// perpendicular ones, each with probability 1/3.
#[derive(Debug, Clone)]
pub struct FrozenLake {
    map: LakeMap,
    slippery: bool,
    max_episode_steps: usize,
    state: usize,
    elapsed_steps: usize,
    last_action: Option<usize>,
    rng: StdRng,
}

impl FrozenLake {
    pub fn new(map: LakeMap, slippery: bool) -> Self {
        let max_episode_steps = map.time_limit();
        let state = map.start;
        Self {
            map,
            slippery,
            max_episode_steps,
            state,
            elapsed_steps: 0,
            last_action: None,
            rng: StdRng::seed_from_u64(0),
        }
    }

    pub fn with_max_episode_steps(mut self, max_episode_steps: usize) -> Self {
        self.max_episode_steps = max_episode_steps;
        self
    }

    pub fn max_episode_steps(&self) -> usize {
        self.max_episode_steps
    }

    pub fn state(&self) -> usize {
        self.state
    }

    pub fn map(&self) -> &LakeMap {
        &self.map
    }

    pub fn is_slippery(&self) -> bool {
        self.slippery
    }

    /// Text view of the lake with the agent's cell in brackets.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(action) = self.last_action {
            let name = ["Left", "Down", "Right", "Up"][action];
            let _ = writeln!(out, "  ({name})");
        }
        for row in 0..self.map.nrow {
            for col in 0..self.map.ncol {
                let idx = row * self.map.ncol + col;
                let tile = self.map.tile(idx).as_char();
                if idx == self.state {
                    let _ = write!(out, "[{tile}]");
                } else {
                    let _ = write!(out, " {tile} ");
                }
            }
            out.push('\n');
        }
        out
    }

    fn sample_direction(&mut self, action: usize) -> (usize, f32) {
        if !self.slippery {
            return (action, 1.);
        }
        let candidates = [(action + N_ACTIONS - 1) % N_ACTIONS, action, (action + 1) % N_ACTIONS];
        let direction = candidates[self.rng.random_range(0..candidates.len())];
        (direction, 1. / 3.)
    }
}

impl Env for FrozenLake {
    type Observation = usize;
    type Action = usize;

    fn reset(&mut self, seed: u64) -> Result<usize> {
        self.rng = StdRng::seed_from_u64(seed);
        self.state = self.map.start;
        self.elapsed_steps = 0;
        self.last_action = None;
        Ok(self.state)
    }

    fn step(&mut self, action: usize) -> Result<SnapShot<usize>> {
        if action >= N_ACTIONS {
            return Err(Error::wrap(FrozenLakeError::InvalidAction(action)));
        }
        let (reward, prob) = if self.map.tile(self.state).is_terminal() {
            (0., 1.)
        } else {
            let (direction, prob) = self.sample_direction(action);
            self.state = self.map.neighbour(self.state, direction);
            let reward = if self.map.tile(self.state) == Tile::Goal {
                1.
            } else {
                0.
            };
            (reward, prob)
        };
        self.elapsed_steps += 1;
        self.last_action = Some(action);
        let terminated = self.map.tile(self.state).is_terminal();
        let mut info = StepInfo::default();
        info.insert("prob".into(), prob);
        Ok(SnapShot {
            state: self.state,
            reward,
            terminated,
            truncated: !terminated && self.elapsed_steps >= self.max_episode_steps,
            info,
        })
    }

    fn env_description(&self) -> EnvironmentDescription {
        EnvironmentDescription::new(
            Space::Discrete(self.map.n_states()),
            Space::Discrete(N_ACTIONS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deterministic_lake() -> FrozenLake {
        FrozenLake::new(LakeMap::four_by_four(), false)
    }

    #[test]
    fn reaches_the_goal_on_a_safe_path() -> Result<()> {
        let mut env = deterministic_lake();
        assert_eq!(env.reset(7)?, 0);
        let path = [DOWN, DOWN, RIGHT, RIGHT, DOWN, RIGHT];
        let mut last = None;
        for action in path {
            let snapshot = env.step(action)?;
            assert!(last.is_none(), "episode ended before the goal");
            if snapshot.done() {
                last = Some(snapshot);
            }
        }
        let last = last.expect("path should end the episode");
        assert_eq!(last.state, 15);
        assert_eq!(last.reward, 1.);
        assert!(last.terminated);
        assert!(!last.truncated);
        Ok(())
    }

    #[test]
    fn falling_into_a_hole_terminates_without_reward() -> Result<()> {
        let mut env = deterministic_lake();
        env.reset(0)?;
        env.step(RIGHT)?;
        let snapshot = env.step(DOWN)?;
        assert_eq!(snapshot.state, 5);
        assert_eq!(snapshot.reward, 0.);
        assert!(snapshot.terminated);
        Ok(())
    }

    #[test]
    fn walls_keep_the_agent_in_place() -> Result<()> {
        let mut env = deterministic_lake();
        env.reset(0)?;
        assert_eq!(env.step(LEFT)?.state, 0);
        assert_eq!(env.step(UP)?.state, 0);
        Ok(())
    }

    #[test]
    fn time_limit_truncates_the_episode() -> Result<()> {
        let mut env = deterministic_lake().with_max_episode_steps(3);
        env.reset(0)?;
        assert!(!env.step(LEFT)?.done());
        assert!(!env.step(LEFT)?.done());
        let snapshot = env.step(LEFT)?;
        assert!(snapshot.truncated);
        assert!(!snapshot.terminated);
        Ok(())
    }

    #[test]
    fn time_limit_follows_the_chosen_map() -> std::result::Result<(), FrozenLakeError> {
        assert_eq!(FrozenLake::new(LakeMap::four_by_four(), true).max_episode_steps(), 100);
        assert_eq!(FrozenLake::new(LakeMap::eight_by_eight(), true).max_episode_steps(), 200);
        let custom = LakeMap::from_rows(&["SFFFF", "FHFHF", "FFFHF", "HFFFF", "FFFFG"])?;
        assert_eq!(custom.n_states(), 25);
        assert_eq!(FrozenLake::new(custom.clone(), true).max_episode_steps(), 100);
        let limited = FrozenLake::new(custom, true).with_max_episode_steps(40);
        assert_eq!(limited.max_episode_steps(), 40);
        Ok(())
    }

    #[test]
    fn slippery_moves_are_reproducible_for_a_seed() -> Result<()> {
        let run = |seed| -> Result<Vec<usize>> {
            let mut env = FrozenLake::new(LakeMap::eight_by_eight(), true);
            env.reset(seed)?;
            let mut states = vec![];
            for _ in 0..20 {
                let snapshot = env.step(RIGHT)?;
                states.push(snapshot.state);
                assert_eq!(snapshot.info.get("prob"), Some(&(1. / 3.)));
                if snapshot.done() {
                    break;
                }
            }
            Ok(states)
        };
        assert_eq!(run(3)?, run(3)?);
        Ok(())
    }

    #[test]
    fn slippery_moves_never_go_backwards() -> Result<()> {
        let mut env = FrozenLake::new(LakeMap::four_by_four(), true);
        for seed in 0..50 {
            env.reset(seed)?;
            // from the start, RIGHT can only slip UP (stay) or DOWN
            let state = env.step(RIGHT)?.state;
            assert!([0, 1, 4].contains(&state), "unexpected state {state}");
        }
        Ok(())
    }

    #[test]
    fn rejects_invalid_actions_and_maps() {
        let mut env = deterministic_lake();
        assert!(env.step(4).is_err());
        assert!(matches!(
            LakeMap::from_rows(&["SF", "F"]),
            Err(FrozenLakeError::RaggedMap)
        ));
        assert!(matches!(
            LakeMap::from_rows(&["SX"]),
            Err(FrozenLakeError::InvalidTile('X'))
        ));
        assert!(matches!(
            LakeMap::from_rows(&["FF", "FG"]),
            Err(FrozenLakeError::StartTiles(0))
        ));
        assert!("5x5".parse::<LakeMap>().is_err());
    }

    #[test]
    fn render_marks_the_agent() -> Result<()> {
        let mut env = deterministic_lake();
        env.reset(0)?;
        assert!(env.render().starts_with("[S]"));
        env.step(RIGHT)?;
        let rendered = env.render();
        assert!(rendered.contains("(Right)"));
        assert!(rendered.contains(" S [F]"));
        Ok(())
    }
}
