//! Node/link projection of the open debts, for visualization.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{LedgerEntry, MoneyCents, NameDirectory};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: i64,
    pub name: String,
}

/// One unsettled entry: `source` owes `target` `amount`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: i64,
    pub target: i64,
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// Builds the graph from unsettled entries; nodes keep first-seen order.
pub fn project_graph<'a, I>(entries: I, names: &NameDirectory) -> DebtGraph
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let mut graph = DebtGraph::default();
    let mut seen = HashSet::new();
    for entry in entries.into_iter().filter(|entry| !entry.settled) {
        for id in [entry.debtor_id, entry.creditor_id] {
            if seen.insert(id) {
                graph.nodes.push(GraphNode {
                    id,
                    name: names.name(id),
                });
            }
        }
        graph.links.push(GraphLink {
            source: entry.debtor_id,
            target: entry.creditor_id,
            amount: entry.amount,
        });
    }
    graph
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn entry(debtor_id: i64, creditor_id: i64, cents: i64, settled: bool) -> LedgerEntry {
        LedgerEntry {
            id: 0,
            group_id: Some(1),
            expense_id: Some(1),
            settlement_id: None,
            debtor_id,
            creditor_id,
            amount: MoneyCents::new(cents),
            settled,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn graph_has_one_link_per_open_entry_and_unique_nodes() {
        let names: NameDirectory = [(1, "Alice".to_string()), (2, "Bob".to_string())]
            .into_iter()
            .collect();
        let entries = vec![
            entry(2, 1, 10_00, false),
            entry(3, 1, 5_00, false),
            entry(2, 3, 1_00, true),
        ];

        let graph = project_graph(&entries, &names);
        assert_eq!(
            graph.nodes,
            vec![
                GraphNode { id: 2, name: "Bob".to_string() },
                GraphNode { id: 1, name: "Alice".to_string() },
                GraphNode { id: 3, name: "User 3".to_string() },
            ]
        );
        assert_eq!(graph.links.len(), 2);
        assert_eq!(graph.links[1].amount, MoneyCents::new(5_00));
    }

    #[test]
    fn repeated_pairs_keep_one_node_each_and_every_link() {
        let names = NameDirectory::default();
        let entries: Vec<_> = (0..50).map(|i| entry(1 + i % 2, 3, 1_00, false)).collect();

        let graph = project_graph(&entries, &names);
        let ids: Vec<i64> = graph.nodes.iter().map(|node| node.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert_eq!(graph.links.len(), 50);
    }
}
