//! Per-agent trust ledger.
//!
//! `TrustEngine` implements the `TrustLedger` trait from bastion-core. Each
//! agent's state sits behind its own `Mutex`, reached through a read-locked
//! map, so every penalty or reward is one critical section per agent and
//! unrelated agents never contend.
//!
//! Agents are enrolled by the interceptor at registration and dropped at
//! deregistration. Penalties and rewards for an agent that is not enrolled
//! fail with `UnknownAgent`, so an action that finishes after its agent was
//! deregistered cannot bring the agent's trust state back.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use bastion_contracts::{
    agent::AgentId,
    decision::RiskTier,
    error::{BastionError, BastionResult},
    trust::{TrustScoreChange, TrustSnapshot, TRUST_MAX, TRUST_MIN},
};
use bastion_core::traits::TrustLedger;

use crate::policy::TrustPolicy;

struct TrustState {
    score: f64,
    violation_count: u64,
    success_count: u64,
    last_active: Option<DateTime<Utc>>,
    history: VecDeque<TrustScoreChange>,
}

impl TrustState {
    fn new(initial: f64) -> Self {
        Self {
            score: initial,
            violation_count: 0,
            success_count: 0,
            last_active: None,
            history: VecDeque::new(),
        }
    }

    fn snapshot(&self, agent_id: &AgentId) -> TrustSnapshot {
        TrustSnapshot {
            agent_id: agent_id.clone(),
            score: self.score,
            violation_count: self.violation_count,
            success_count: self.success_count,
            last_active: self.last_active,
        }
    }
}

type SharedState = Arc<Mutex<TrustState>>;

fn poisoned() -> BastionError {
    BastionError::ConfigError {
        reason: "trust ledger lock poisoned".to_string(),
    }
}

fn lock(state: &SharedState) -> BastionResult<MutexGuard<'_, TrustState>> {
    state.lock().map_err(|_| poisoned())
}

fn unknown(agent_id: &AgentId) -> BastionError {
    BastionError::UnknownAgent {
        agent_id: agent_id.0.clone(),
    }
}

#[derive(Clone, Copy)]
enum Adjustment {
    Penalty,
    Reward,
}

pub struct TrustEngine {
    policy: TrustPolicy,
    agents: RwLock<HashMap<AgentId, SharedState>>,
}

impl TrustEngine {
    /// Build an engine after validating `policy`.
    pub fn new(policy: TrustPolicy) -> BastionResult<Self> {
        policy.validate()?;
        Ok(Self {
            policy,
            agents: RwLock::new(HashMap::new()),
        })
    }

    pub fn from_toml_str(s: &str) -> BastionResult<Self> {
        Self::new(TrustPolicy::from_toml_str(s)?)
    }

    pub fn from_file(path: &Path) -> BastionResult<Self> {
        Self::new(TrustPolicy::from_file(path)?)
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    /// Enrolled agents, sorted.
    pub fn agents(&self) -> BastionResult<Vec<AgentId>> {
        let mut ids: Vec<AgentId> =
            self.agents.read().map_err(|_| poisoned())?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// Every recorded score change for `agent_id`, oldest first.
    pub fn history(&self, agent_id: &AgentId) -> BastionResult<Vec<TrustScoreChange>> {
        let state = self.state(agent_id)?.ok_or_else(|| unknown(agent_id))?;
        let guard = lock(&state)?;
        Ok(guard.history.iter().cloned().collect())
    }

    fn state(&self, agent_id: &AgentId) -> BastionResult<Option<SharedState>> {
        Ok(self.agents.read().map_err(|_| poisoned())?.get(agent_id).cloned())
    }

    /// Return the agent's state, creating it at the initial score if absent.
    fn state_or_enroll(&self, agent_id: &AgentId) -> BastionResult<SharedState> {
        if let Some(state) = self.state(agent_id)? {
            return Ok(state);
        }
        let mut agents = self.agents.write().map_err(|_| poisoned())?;
        let state = agents.entry(agent_id.clone()).or_insert_with(|| {
            info!(
                agent_id = %agent_id,
                score = self.policy.initial,
                "agent enrolled for trust scoring"
            );
            Arc::new(Mutex::new(TrustState::new(self.policy.initial)))
        });
        Ok(Arc::clone(state))
    }

    fn adjust(
        &self,
        agent_id: &AgentId,
        tier: RiskTier,
        adjustment: Adjustment,
    ) -> BastionResult<f64> {
        let state = self.state(agent_id)?.ok_or_else(|| unknown(agent_id))?;
        let mut guard = lock(&state)?;

        let (delta, reason) = match adjustment {
            Adjustment::Penalty => {
                guard.violation_count += 1;
                (-self.policy.penalties.for_tier(tier), format!("penalty:{}", tier))
            }
            Adjustment::Reward => {
                guard.success_count += 1;
                (self.policy.rewards.for_tier(tier), format!("reward:{}", tier))
            }
        };

        let now = Utc::now();
        let previous = guard.score;
        let current = (previous + delta).clamp(TRUST_MIN, TRUST_MAX);
        guard.score = current;
        guard.last_active = Some(now);

        guard.history.push_back(TrustScoreChange {
            agent_id: agent_id.clone(),
            previous,
            current,
            reason,
            recorded_at: now,
        });
        while guard.history.len() > self.policy.history_limit {
            guard.history.pop_front();
        }

        debug!(
            agent_id = %agent_id,
            tier = %tier,
            previous,
            current,
            "trust score updated"
        );
        Ok(current)
    }
}

impl Default for TrustEngine {
    fn default() -> Self {
        Self {
            policy: TrustPolicy::default(),
            agents: RwLock::new(HashMap::new()),
        }
    }
}

impl TrustLedger for TrustEngine {
    fn enroll(&self, agent_id: &AgentId) -> BastionResult<f64> {
        let state = self.state_or_enroll(agent_id)?;
        let score = lock(&state)?.score;
        Ok(score)
    }

    fn retire(&self, agent_id: &AgentId) -> Option<TrustSnapshot> {
        let state = self.agents.write().ok()?.remove(agent_id)?;
        let snapshot = state.lock().ok()?.snapshot(agent_id);
        info!(agent_id = %agent_id, score = snapshot.score, "agent retired from trust scoring");
        Some(snapshot)
    }

    fn penalize(&self, agent_id: &AgentId, tier: RiskTier) -> BastionResult<f64> {
        self.adjust(agent_id, tier, Adjustment::Penalty)
    }

    fn reward(&self, agent_id: &AgentId, tier: RiskTier) -> BastionResult<f64> {
        self.adjust(agent_id, tier, Adjustment::Reward)
    }

    fn current(&self, agent_id: &AgentId) -> BastionResult<f64> {
        let state = self.state(agent_id)?.ok_or_else(|| unknown(agent_id))?;
        let score = lock(&state)?.score;
        Ok(score)
    }

    fn snapshot(&self, agent_id: &AgentId) -> BastionResult<TrustSnapshot> {
        let state = self.state(agent_id)?.ok_or_else(|| unknown(agent_id))?;
        let snapshot = lock(&state)?.snapshot(agent_id);
        Ok(snapshot)
    }
}
