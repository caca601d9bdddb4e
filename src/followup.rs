//! Lead follow-up scheduling: classification against the business calendar,
//! the priority ordering used by the leads list, and its filters.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    clock,
    error::AppResult,
    models::{Lead, LeadStatus, TextEnum},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpStatus {
    Overdue,
    Today,
    Upcoming,
    None,
}

impl FollowUpStatus {
    pub fn priority(self) -> u8 {
        match self {
            FollowUpStatus::Overdue => 0,
            FollowUpStatus::Today => 1,
            FollowUpStatus::Upcoming => 2,
            FollowUpStatus::None => 3,
        }
    }
}

pub fn classify(
    follow_up: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> FollowUpStatus {
    let Some(follow_up) = follow_up else {
        return FollowUpStatus::None;
    };
    let today = clock::local_date(now, offset);
    match clock::local_date(follow_up, offset).cmp(&today) {
        Ordering::Less => FollowUpStatus::Overdue,
        Ordering::Equal => FollowUpStatus::Today,
        Ordering::Greater => FollowUpStatus::Upcoming,
    }
}

/// Stable sort: overdue, today, upcoming, then leads without a follow-up.
/// Within a bucket the earliest follow-up comes first; remaining ties keep
/// their incoming order.
pub fn sort_by_priority(leads: &mut [Lead], now: DateTime<Utc>, offset: FixedOffset) {
    leads.sort_by_cached_key(|lead| {
        let at = lead.follow_up_at();
        (classify(at, now, offset).priority(), at)
    });
}

pub fn quick_follow_up(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now + Duration::days(days)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpFilter {
    #[default]
    All,
    Overdue,
    DueToday,
    Upcoming,
    NoFollowup,
}

impl FollowUpFilter {
    fn matches(self, status: FollowUpStatus) -> bool {
        match self {
            FollowUpFilter::All => true,
            FollowUpFilter::Overdue => status == FollowUpStatus::Overdue,
            FollowUpFilter::DueToday => status == FollowUpStatus::Today,
            FollowUpFilter::Upcoming => status == FollowUpStatus::Upcoming,
            FollowUpFilter::NoFollowup => status == FollowUpStatus::None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LeadFilter {
    #[serde(default)]
    pub search: String,
    pub status: Option<String>,
    #[serde(default)]
    pub follow_up: FollowUpFilter,
}

impl LeadFilter {
    /// The requested lead status. An unknown value is a validation error,
    /// never a silently dropped filter.
    pub fn status(&self) -> AppResult<Option<LeadStatus>> {
        LeadStatus::from_filter("status", self.status.as_deref())
    }

    fn matches_search(&self, lead: &Lead) -> bool {
        let term = self.search.trim();
        if term.is_empty() {
            return true;
        }
        let lowered = term.to_lowercase();
        lead.full_name.to_lowercase().contains(&lowered)
            || lead
                .email
                .as_deref()
                .is_some_and(|email| email.to_lowercase().contains(&lowered))
            || lead.phone.as_deref().is_some_and(|phone| phone.contains(term))
    }

    fn matches(&self, lead: &Lead, wanted: Option<LeadStatus>, status: FollowUpStatus) -> bool {
        self.matches_search(lead)
            && wanted.map_or(true, |wanted| lead.status == wanted)
            && self.follow_up.matches(status)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LeadRow {
    #[serde(flatten)]
    pub lead: Lead,
    pub status_label: &'static str,
    pub follow_up_status: FollowUpStatus,
}

/// Applies the filter and the priority ordering, tagging every lead with its
/// follow-up bucket for row highlighting.
pub fn prepare(
    leads: Vec<Lead>,
    filter: &LeadFilter,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> AppResult<Vec<LeadRow>> {
    let wanted = filter.status()?;
    let mut kept: Vec<Lead> = leads
        .into_iter()
        .filter(|lead| filter.matches(lead, wanted, classify(lead.follow_up_at(), now, offset)))
        .collect();
    sort_by_priority(&mut kept, now, offset);
    Ok(kept
        .into_iter()
        .map(|lead| LeadRow {
            status_label: lead.status.label(),
            follow_up_status: classify(lead.follow_up_at(), now, offset),
            lead,
        })
        .collect())
}
