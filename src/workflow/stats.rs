use crate::{
    domain::{Customer, SlaConfig, Ticket, TicketStatus, User, UserId},
    workflow::sla::is_overdue,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Label used for tickets with no (or an unknown) technician
pub const UNASSIGNED: &str = "Unassigned";

/// A named bucket with its count and share in whole percent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadShare {
    pub name: String,
    pub count: usize,
    pub percent: u32,
}

/// Active tickets held by one technician. The unassigned bucket, which also
/// takes tickets whose assignee is no longer on the team, has no `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicianLoad {
    pub user_id: Option<UserId>,
    pub name: String,
    pub count: usize,
    pub percent: u32,
}

/// Dashboard figures derived from a ticket snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_tickets: usize,
    pub active_count: usize,
    pub overdue_count: usize,
    pub resolved_today: usize,
    pub pending_approval: usize,
    pub total_customers: usize,
    pub per_status: BTreeMap<String, usize>,
    /// Active tickets per store, share of all active tickets
    pub per_store_load: Vec<LoadShare>,
    /// Active tickets per technician, share of all active tickets
    pub per_technician_load: Vec<TechnicianLoad>,
    /// All tickets per device type, share of all tickets
    pub device_type_distribution: Vec<LoadShare>,
}

/// `count / max(total, 1)` as a rounded percentage
pub fn percent_of(count: usize, total: usize) -> u32 {
    ((count as f64 / total.max(1) as f64) * 100.0).round() as u32
}

fn into_shares(counts: HashMap<String, usize>, total: usize) -> Vec<LoadShare> {
    let mut shares: Vec<LoadShare> = counts
        .into_iter()
        .map(|(name, count)| LoadShare {
            percent: percent_of(count, total),
            name,
            count,
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    shares
}

fn into_technician_loads(
    counts: HashMap<Option<&UserId>, usize>,
    names: &HashMap<&UserId, &str>,
    total: usize,
) -> Vec<TechnicianLoad> {
    let mut loads: Vec<TechnicianLoad> = counts
        .into_iter()
        .map(|(id, count)| TechnicianLoad {
            name: id
                .and_then(|id| names.get(id).copied())
                .unwrap_or(UNASSIGNED)
                .to_string(),
            user_id: id.cloned(),
            count,
            percent: percent_of(count, total),
        })
        .collect();
    loads.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    loads
}

pub fn aggregate_stats(
    tickets: &[Ticket],
    customers: &[Customer],
    team: &[User],
    sla: &SlaConfig,
    now: DateTime<Utc>,
) -> DashboardStats {
    let names: HashMap<&UserId, &str> = team.iter().map(|u| (&u.id, u.name.as_str())).collect();
    let today = now.date_naive();

    let mut stats = DashboardStats {
        total_tickets: tickets.len(),
        total_customers: customers.len(),
        ..DashboardStats::default()
    };
    let mut stores: HashMap<String, usize> = HashMap::new();
    let mut technicians: HashMap<Option<&UserId>, usize> = HashMap::new();
    let mut devices: HashMap<String, usize> = HashMap::new();

    for ticket in tickets {
        *stats
            .per_status
            .entry(ticket.status.label().to_string())
            .or_insert(0) += 1;

        let device_type = match ticket.device.device_type.trim() {
            "" => "Other",
            other => other,
        };
        *devices.entry(device_type.to_string()).or_insert(0) += 1;

        match ticket.status {
            TicketStatus::PendingApproval => stats.pending_approval += 1,
            TicketStatus::Resolved => {
                if ticket.resolved_at.map(|r| r.date_naive()) == Some(today) {
                    stats.resolved_today += 1;
                }
            }
            _ => {}
        }

        if !ticket.is_active() {
            continue;
        }

        stats.active_count += 1;
        if is_overdue(ticket, sla, now) {
            stats.overdue_count += 1;
        }

        *stores.entry(ticket.store.clone()).or_insert(0) += 1;

        let technician = ticket
            .assigned_to
            .as_ref()
            .filter(|id| names.contains_key(id));
        *technicians.entry(technician).or_insert(0) += 1;
    }

    stats.per_store_load = into_shares(stores, stats.active_count);
    stats.per_technician_load = into_technician_loads(technicians, &names, stats.active_count);
    stats.device_type_distribution = into_shares(devices, stats.total_tickets);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerId, Device, Priority, Role, TicketId};
    use chrono::Duration;

    fn ticket(n: u32, store: &str, device: &str, status: TicketStatus) -> Ticket {
        let mut t = Ticket::new(
            TicketId::new(n),
            CustomerId::new(),
            "Customer",
            Device::new(device, "Brand", "Model"),
            store,
        );
        t.status = status;
        t
    }

    #[test]
    fn test_empty_input_yields_zeros() {
        let stats = aggregate_stats(&[], &[], &[], &SlaConfig::default(), Utc::now());
        assert_eq!(stats, DashboardStats::default());
        assert_eq!(percent_of(0, 0), 0);
    }

    #[test]
    fn test_counts_and_loads() {
        let now = Utc::now();
        let tech = User::new("tech-1", "Yaw Boateng", Role::Technician);

        let mut overdue = ticket(1, "Osu", "Laptop", TicketStatus::New);
        overdue.priority = Priority::High;
        overdue.created_at = now - Duration::days(3);
        overdue.assigned_to = Some(tech.id.clone());

        let mut ghost = ticket(2, "Osu", "Phone", TicketStatus::InProgress);
        ghost.assigned_to = Some(UserId::new("left-the-company"));

        let active_tema = ticket(3, "Tema", "Laptop", TicketStatus::OnHold);

        let mut resolved = ticket(4, "Tema", "Phone", TicketStatus::Resolved);
        resolved.resolved_at = Some(now);

        let mut resolved_earlier = ticket(5, "Tema", "Phone", TicketStatus::Resolved);
        resolved_earlier.resolved_at = Some(now - Duration::days(2));

        let pending = ticket(6, "Osu", "", TicketStatus::PendingApproval);

        let tickets = vec![
            overdue,
            ghost,
            active_tema,
            resolved,
            resolved_earlier,
            pending,
        ];
        let customers = vec![Customer::new("A", "1"), Customer::new("B", "2")];

        let stats = aggregate_stats(
            &tickets,
            &customers,
            &[tech],
            &SlaConfig::default(),
            now,
        );

        assert_eq!(stats.total_tickets, 6);
        assert_eq!(stats.active_count, 4);
        assert_eq!(stats.overdue_count, 1);
        assert_eq!(stats.resolved_today, 1);
        assert_eq!(stats.pending_approval, 1);
        assert_eq!(stats.total_customers, 2);
        assert_eq!(stats.per_status.get("Resolved"), Some(&2));

        assert_eq!(
            stats.per_store_load[0],
            LoadShare {
                name: "Osu".to_string(),
                count: 3,
                percent: 75
            }
        );
        assert_eq!(stats.per_store_load[1].percent, 25);

        assert_eq!(stats.per_technician_load[0].name, UNASSIGNED);
        assert_eq!(stats.per_technician_load[0].user_id, None);
        assert_eq!(stats.per_technician_load[0].count, 3);
        assert_eq!(stats.per_technician_load[1].name, "Yaw Boateng");
        assert_eq!(stats.per_technician_load[1].user_id, Some(UserId::new("tech-1")));
        assert_eq!(stats.per_technician_load[1].percent, 25);

        assert_eq!(stats.device_type_distribution[0].name, "Phone");
        assert_eq!(stats.device_type_distribution[0].count, 3);
        assert!(stats
            .device_type_distribution
            .iter()
            .any(|d| d.name == "Other" && d.count == 1));
    }

    #[test]
    fn test_technicians_sharing_a_name_keep_separate_loads() {
        let team = vec![
            User::new("tech-1", "Kofi", Role::Technician),
            User::new("tech-2", "Kofi", Role::Technician),
        ];
        let mut tickets = Vec::new();
        for (n, assignee) in [(1, "tech-1"), (2, "tech-1"), (3, "tech-2")] {
            let mut t = ticket(n, "Osu", "Laptop", TicketStatus::New);
            t.assigned_to = Some(UserId::new(assignee));
            tickets.push(t);
        }

        let stats = aggregate_stats(&tickets, &[], &team, &SlaConfig::default(), Utc::now());

        assert_eq!(stats.per_technician_load.len(), 2);
        assert_eq!(
            stats.per_technician_load[0],
            TechnicianLoad {
                user_id: Some(UserId::new("tech-1")),
                name: "Kofi".to_string(),
                count: 2,
                percent: 67,
            }
        );
        assert_eq!(stats.per_technician_load[1].user_id, Some(UserId::new("tech-2")));
        assert_eq!(stats.per_technician_load[1].count, 1);
    }

    #[test]
    fn test_percent_rounds_to_nearest() {
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(2, 3), 67);
        assert_eq!(percent_of(5, 5), 100);
    }
}
