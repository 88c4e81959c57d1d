//! Per-agent glue between a simulation loop and the shared influence grid.
//!
//! The layer owns the grid and one [`InfluenceSection`] per live agent. The host
//! loop calls [`TacticalLayer::tick`] once per agent per tick (or [`TacticalLayer::step`]
//! with the whole batch), then [`TacticalLayer::end_tick`].

use crate::config::{GridConfig, InfluenceConfig};
use crate::curve::ResponseCurve;
use crate::error::{ConfigError, GridError, TacticsError};
use crate::grid::InfluenceGrid;
use crate::mapper::Vec3;
use crate::section::InfluenceSection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A live agent's binding to the grid.
#[derive(Debug)]
pub struct AgentBinding {
    pub radius: u32,
    pub section: InfluenceSection,
    pub last_position: Option<Vec3>,
}

#[derive(Debug)]
pub struct TacticalLayer {
    grid: InfluenceGrid,
    agents: BTreeMap<AgentId, AgentBinding>,
    next_agent_id: u32,
    tick: u64,
    reconcile_interval: u32,
}

impl TacticalLayer {
    pub fn new(config: &InfluenceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let curve = ResponseCurve::from_config(&config.curve)?;
        let grid = InfluenceGrid::new(config.grid.clone(), curve)?;
        Ok(Self::with_grid(grid, config.reconcile_interval))
    }

    pub fn with_grid(grid: InfluenceGrid, reconcile_interval: u32) -> Self {
        Self {
            grid,
            agents: BTreeMap::new(),
            next_agent_id: 0,
            tick: 0,
            reconcile_interval,
        }
    }

    pub fn grid(&self) -> &InfluenceGrid {
        &self.grid
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.keys().copied()
    }

    pub fn agent(&self, id: AgentId) -> Option<&AgentBinding> {
        self.agents.get(&id)
    }

    /// Completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Register a new agent. `None` uses the grid's default stamp radius.
    /// The agent has no presence on the grid until its first [`tick`](Self::tick).
    pub fn spawn(&mut self, radius: Option<u32>) -> Result<AgentId, TacticsError> {
        let radius = radius.unwrap_or(self.grid.config().default_stamp_radius);
        if radius > GridConfig::MAX_STAMP_RADIUS {
            return Err(GridError::RadiusTooLarge {
                max: GridConfig::MAX_STAMP_RADIUS,
                actual: radius,
            }
            .into());
        }
        let id = self.next_agent_id_checked()?;
        self.agents.insert(
            id,
            AgentBinding {
                radius,
                section: InfluenceSection::for_radius(radius),
                last_position: None,
            },
        );
        debug!(agent = %id, radius, "agent spawned");
        Ok(id)
    }

    /// Move the agent's stamp to `position`.
    pub fn tick(&mut self, id: AgentId, position: Vec3) -> Result<(), TacticsError> {
        let agent = self
            .agents
            .get_mut(&id)
            .ok_or(TacticsError::UnknownAgent(id))?;
        if let Err(err) = self
            .grid
            .update_agent_influence(position, &mut agent.section, agent.radius)
        {
            warn!(agent = %id, %err, "influence update rejected");
            return Err(err.into());
        }
        agent.last_position = Some(position);
        Ok(())
    }

    /// Retract the agent's last stamp and forget it.
    pub fn despawn(&mut self, id: AgentId) -> Result<(), TacticsError> {
        let mut agent = self
            .agents
            .remove(&id)
            .ok_or(TacticsError::UnknownAgent(id))?;
        self.grid.retract(&mut agent.section)?;
        debug!(agent = %id, "agent despawned");
        Ok(())
    }

    /// Close the current tick. Every `reconcile_interval` ticks the grid is rebuilt
    /// from the live sections; returns the number of corrected cells when that happens.
    pub fn end_tick(&mut self) -> Option<usize> {
        self.tick += 1;
        if self.reconcile_interval == 0 || self.tick % self.reconcile_interval as u64 != 0 {
            return None;
        }
        let corrected = self
            .grid
            .reconcile(self.agents.values().map(|a| &a.section));
        Some(corrected)
    }

    /// Run one full tick: update every listed agent in order, then close the tick.
    /// All ids are checked first, so an unknown id leaves the grid untouched.
    pub fn step(&mut self, updates: &[(AgentId, Vec3)]) -> Result<Option<usize>, TacticsError> {
        if let Some(&(id, _)) = updates.iter().find(|(id, _)| !self.agents.contains_key(id)) {
            return Err(TacticsError::UnknownAgent(id));
        }
        for &(id, position) in updates {
            self.tick(id, position)?;
        }
        Ok(self.end_tick())
    }

    fn next_agent_id_checked(&mut self) -> Result<AgentId, TacticsError> {
        if self.next_agent_id == u32::MAX {
            return Err(TacticsError::AgentIdsExhausted);
        }
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;
        Ok(id)
    }
}
