use std::collections::BTreeMap;

use super::MergeReport;
use crate::models::{Slot, SlotKey};

/// Fold remote slots and proposals into the local map.
///
/// - A slot only known remotely is adopted as is.
/// - The remote `approved` flags (slot and proposal) always win.
/// - Votes are unioned.
/// - Recipe fields are only filled where the local proposal has none yet.
/// - Local proposals missing remotely are kept.
pub fn merge_slots(
    local: &mut BTreeMap<SlotKey, Slot>,
    remote: &BTreeMap<SlotKey, Slot>,
    report: &mut MergeReport,
) {
    for (key, remote_slot) in remote {
        let Some(local_slot) = local.get_mut(key) else {
            local.insert(key.clone(), remote_slot.clone());
            report.slots_added += 1;
            continue;
        };

        if local_slot.approved != remote_slot.approved {
            local_slot.approved = remote_slot.approved;
            report.slots_updated += 1;
        }

        for remote_proposal in &remote_slot.proposals {
            let Some(local_proposal) = local_slot.proposal_mut(remote_proposal.id) else {
                local_slot.proposals.push(remote_proposal.clone());
                report.proposals_added += 1;
                continue;
            };

            let mut changed = false;
            for voter in &remote_proposal.votes {
                changed |= local_proposal.votes.insert(voter.clone());
            }
            changed |= local_proposal.fill_missing_from(remote_proposal);
            if local_proposal.approved != remote_proposal.approved {
                local_proposal.approved = remote_proposal.approved;
                changed = true;
            }
            if changed {
                report.proposals_updated += 1;
            }
        }
    }
}
