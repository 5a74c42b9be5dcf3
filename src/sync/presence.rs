use tokio::sync::mpsc;

use crate::common::{Roster, SessionCommand};
use crate::view::{self, PeerCard};

use super::expansion::ExpansionState;

/// Keeps the last applied roster snapshot and the user's expansion flags.
///
/// Every roster request is tagged with a sequence number from
/// [`begin_cycle`](Self::begin_cycle). A response older than the last applied
/// one is discarded, so a slow earlier request cannot overwrite a newer view.
#[derive(Debug)]
pub struct PresenceReconciler {
    online_sentinel: String,
    expansion: ExpansionState,
    roster: Option<Roster>,
    issued: u64,
    applied: u64,
}

impl PresenceReconciler {
    pub fn new(online_sentinel: impl Into<String>) -> Self {
        Self {
            online_sentinel: online_sentinel.into(),
            expansion: ExpansionState::default(),
            roster: None,
            issued: 0,
            applied: 0,
        }
    }

    pub fn begin_cycle(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Replaces the roster with `roster` unless a newer cycle already landed.
    pub fn apply(&mut self, seq: u64, roster: Roster) -> bool {
        if seq <= self.applied {
            log::debug!(
                "Discarding stale roster from cycle {seq} (already applied {})",
                self.applied
            );
            return false;
        }
        self.applied = seq;
        self.roster = Some(roster);
        true
    }

    pub fn toggle(&mut self, nickname: &str) -> bool {
        self.expansion.toggle(nickname)
    }

    /// Cards for the current roster, or `None` before the first success.
    pub fn render(&self, commands: &mpsc::Sender<SessionCommand>) -> Option<Vec<PeerCard>> {
        self.roster.as_ref().map(|roster| {
            view::render_peer_list(roster, &self.expansion, &self.online_sentinel, commands)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PeerStatus;
    use crate::common::types::PeerInfo;

    fn roster(entries: &[(&str, &str)]) -> Roster {
        entries
            .iter()
            .map(|(nickname, status)| {
                (
                    nickname.to_string(),
                    PeerInfo {
                        ip: "10.0.0.2".into(),
                        port: "5000".into(),
                        status: status.to_string(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn renders_nothing_before_first_roster() {
        let (tx, _rx) = mpsc::channel(1);
        let presence = PresenceReconciler::new("オンライン");
        assert!(presence.render(&tx).is_none());
    }

    #[test]
    fn expansion_survives_refetch() {
        let (tx, _rx) = mpsc::channel(1);
        let mut presence = PresenceReconciler::new("オンライン");

        let seq = presence.begin_cycle();
        presence.apply(seq, roster(&[("bob", "オンライン"), ("carol", "オフライン")]));
        presence.toggle("bob");

        let seq = presence.begin_cycle();
        presence.apply(seq, roster(&[("bob", "オフライン"), ("carol", "オフライン")]));
        let cards = presence.render(&tx).unwrap();
        assert!(cards[0].expanded);
        assert_eq!(cards[0].status, PeerStatus::Offline);
        assert!(!cards[1].expanded);
    }

    #[test]
    fn collapsed_panel_is_not_resurrected() {
        let (tx, _rx) = mpsc::channel(1);
        let mut presence = PresenceReconciler::new("オンライン");
        presence.toggle("bob");
        presence.toggle("bob");

        let seq = presence.begin_cycle();
        presence.apply(seq, roster(&[("bob", "オンライン")]));
        assert!(!presence.render(&tx).unwrap()[0].expanded);
    }

    #[test]
    fn absent_peer_drops_card_but_keeps_flag() {
        let (tx, _rx) = mpsc::channel(1);
        let mut presence = PresenceReconciler::new("オンライン");
        presence.toggle("bob");

        let seq = presence.begin_cycle();
        presence.apply(seq, roster(&[("carol", "オンライン")]));
        let cards = presence.render(&tx).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].nickname, "carol");
        assert!(presence.expansion.is_expanded("bob"));

        let seq = presence.begin_cycle();
        presence.apply(seq, roster(&[("bob", "オンライン")]));
        assert!(presence.render(&tx).unwrap()[0].expanded);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut presence = PresenceReconciler::new("オンライン");
        let first = presence.begin_cycle();
        let second = presence.begin_cycle();

        assert!(presence.apply(second, roster(&[("fresh", "オンライン")])));
        assert!(!presence.apply(first, roster(&[("stale", "オンライン")])));
        let current = presence.roster.as_ref().unwrap();
        assert!(current.contains_key("fresh"));
        assert!(!current.contains_key("stale"));
    }
}
