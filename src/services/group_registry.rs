//! Per-video session groups and snapshot fan-out
//!
//! Every session registers a bounded outbound queue under its video. A
//! broadcast copies the member list, releases the group entry and then offers
//! the update to each queue with `try_send`, so a slow or dead viewer costs
//! the sender nothing and never delays the rest of the group.

use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::models::LiveUpdate;

/// Sending half of a session's outbound queue
pub type UpdateSender = mpsc::Sender<Arc<LiveUpdate>>;

/// Receiving half of a session's outbound queue
pub type UpdateReceiver = mpsc::Receiver<Arc<LiveUpdate>>;

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Recipients that accepted the update
    pub delivered: usize,
    /// Recipients whose queue was full; the update was dropped for them
    pub dropped: usize,
    /// Recipients whose queue was already closed
    pub closed: usize,
}

/// Member count of one live group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub video_id: String,
    pub sessions: usize,
}

/// Registry of viewer sessions grouped by video
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: DashMap<String, HashMap<Uuid, UpdateSender>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session to a video's group, creating the group if needed
    pub fn join(&self, video_id: &str, session_id: Uuid, sender: UpdateSender) {
        let mut members = self.groups.entry(video_id.to_string()).or_default();
        members.insert(session_id, sender);
        debug!(
            video_id = %video_id,
            session_id = %session_id,
            members = members.len(),
            "Session joined group"
        );
    }

    /// Remove a session from a video's group.
    ///
    /// Leaving twice, or leaving a group that does not exist, is a no-op.
    /// Returns true when the session was a member.
    pub fn leave(&self, video_id: &str, session_id: Uuid) -> bool {
        let removed = match self.groups.get_mut(video_id) {
            Some(mut members) => members.remove(&session_id).is_some(),
            None => false,
        };

        if removed {
            self.groups.remove_if(video_id, |_, members| members.is_empty());
            debug!(video_id = %video_id, session_id = %session_id, "Session left group");
        }
        removed
    }

    /// Offer `update` to every session of `video_id` joined at call time
    pub fn broadcast(&self, video_id: &str, update: Arc<LiveUpdate>) -> DeliveryReport {
        let recipients: Vec<(Uuid, UpdateSender)> = match self.groups.get(video_id) {
            Some(members) => members
                .iter()
                .map(|(session_id, sender)| (*session_id, sender.clone()))
                .collect(),
            None => return DeliveryReport::default(),
        };

        let mut report = DeliveryReport::default();
        for (session_id, sender) in recipients {
            match sender.try_send(update.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    debug!(
                        video_id = %video_id,
                        session_id = %session_id,
                        "Outbound queue full, dropping live update"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    report.closed += 1;
                    trace!(
                        video_id = %video_id,
                        session_id = %session_id,
                        "Outbound queue closed, skipping"
                    );
                }
            }
        }
        report
    }

    /// Number of sessions currently in a video's group
    pub fn session_count(&self, video_id: &str) -> usize {
        self.groups
            .get(video_id)
            .map(|members| members.len())
            .unwrap_or(0)
    }

    /// Number of videos with at least one session
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Point-in-time member counts of all groups, ordered by video id
    pub fn groups(&self) -> Vec<GroupSummary> {
        let mut summaries: Vec<GroupSummary> = self
            .groups
            .iter()
            .map(|entry| GroupSummary {
                video_id: entry.key().clone(),
                sessions: entry.value().len(),
            })
            .collect();
        summaries.sort_by(|a, b| a.video_id.cmp(&b.video_id));
        summaries
    }
}
