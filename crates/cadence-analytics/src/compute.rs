// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure aggregation over event slices.
//!
//! Nothing here touches the store or the clock, so every report is a
//! deterministic function of the events it is given.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use cadence_core::{Direction, MessageEvent, ViewEvent};

use crate::clock::DayClock;
use crate::report::{ConversationActivity, DailySummary, HourlyHistogram, ProfileCount};

/// Summarize one day's views and messages. Messages must be in time order.
pub fn summarize_day<'a>(
    date: NaiveDate,
    views: impl IntoIterator<Item = &'a ViewEvent>,
    messages: impl IntoIterator<Item = &'a MessageEvent>,
) -> DailySummary {
    let mut summary = DailySummary::empty(date);

    let mut profiles = HashSet::new();
    for view in views {
        summary.total_views += 1;
        profiles.insert(view.profile_id.as_str());
    }
    summary.unique_profiles = profiles.len() as u64;

    let messages: Vec<&MessageEvent> = messages.into_iter().collect();
    for msg in &messages {
        match msg.direction {
            Direction::Sent => {
                summary.messages_sent += 1;
                summary.total_characters_sent += u64::from(msg.character_count);
            }
            Direction::Received => summary.messages_received += 1,
        }
    }
    summary.average_response_time_ms = average_response_ms(&messages);
    summary
}

/// Integer mean of received→sent latencies, per conversation.
///
/// A `received` message opens a window when none is open; the next `sent`
/// message in the same conversation closes it. Unanswered messages and sends
/// without a preceding receive contribute nothing.
pub fn average_response_ms(messages: &[&MessageEvent]) -> u64 {
    let mut by_conversation: HashMap<&str, Vec<&MessageEvent>> = HashMap::new();
    for msg in messages {
        by_conversation
            .entry(msg.conversation_id.as_str())
            .or_default()
            .push(msg);
    }

    let mut total: u128 = 0;
    let mut closed: u128 = 0;
    for thread in by_conversation.values() {
        let mut open = None;
        for msg in thread {
            match (msg.direction, open) {
                (Direction::Received, None) => open = Some(msg.occurred_at),
                (Direction::Sent, Some(opened_at)) => {
                    let latency = (msg.occurred_at - opened_at).num_milliseconds().max(0);
                    total += latency as u128;
                    closed += 1;
                    open = None;
                }
                _ => {}
            }
        }
    }

    if closed == 0 {
        0
    } else {
        u64::try_from(total / closed).unwrap_or(u64::MAX)
    }
}

/// Views per profile, count descending then id ascending, at most `limit`.
pub fn rank_profiles<'a>(
    views: impl IntoIterator<Item = &'a ViewEvent>,
    limit: usize,
) -> Vec<ProfileCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for view in views {
        *counts.entry(view.profile_id.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<ProfileCount> = counts
        .into_iter()
        .map(|(profile_id, views)| ProfileCount {
            profile_id: profile_id.to_string(),
            views,
        })
        .collect();
    // Stable sort over the id-ordered map keeps ties in ascending id order.
    ranked.sort_by_key(|p| Reverse(p.views));
    ranked.truncate(limit);
    ranked
}

/// Bucket views by local hour.
pub fn hourly_histogram<'a>(
    views: impl IntoIterator<Item = &'a ViewEvent>,
    clock: &DayClock,
) -> HourlyHistogram {
    let mut histogram = HourlyHistogram::default();
    for view in views {
        let hour = clock.hour_of(view.occurred_at) as usize;
        if let Some(bucket) = histogram.buckets.get_mut(hour) {
            *bucket += 1;
        }
    }
    histogram
}

/// Per-conversation activity, most recently active first.
pub fn conversation_activity<'a>(
    messages: impl IntoIterator<Item = &'a MessageEvent>,
) -> Vec<ConversationActivity> {
    let mut by_conversation: BTreeMap<&str, ConversationActivity> = BTreeMap::new();
    for msg in messages {
        by_conversation
            .entry(msg.conversation_id.as_str())
            .and_modify(|activity| {
                activity.message_count += 1;
                activity.total_characters += u64::from(msg.character_count);
                activity.first_message_at = activity.first_message_at.min(msg.occurred_at);
                activity.last_message_at = activity.last_message_at.max(msg.occurred_at);
            })
            .or_insert_with(|| ConversationActivity {
                conversation_id: msg.conversation_id.clone(),
                message_count: 1,
                first_message_at: msg.occurred_at,
                last_message_at: msg.occurred_at,
                total_characters: u64::from(msg.character_count),
            });
    }

    let mut activity: Vec<ConversationActivity> = by_conversation.into_values().collect();
    activity.sort_by_key(|a| Reverse(a.last_message_at));
    activity
}
