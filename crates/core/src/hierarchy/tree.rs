//! Arena-backed chart of accounts tree.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::AccountId;

use crate::account::{Account, AccountType};

/// One account in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    /// The account.
    pub account: Account,
    /// Arena index of the parent, `None` for roots.
    pub parent: Option<usize>,
    /// Arena indices of the children, ordered by code.
    pub children: Vec<usize>,
    /// Distance from the root (roots are 0).
    pub depth: usize,
}

/// Nested, owned view of a subtree for display.
#[derive(Debug, Clone, Serialize)]
pub struct AccountNode {
    /// The account.
    pub account: Account,
    /// Distance from the root.
    pub depth: usize,
    /// Children ordered by code.
    pub children: Vec<AccountNode>,
}

/// Active accounts arranged into one forest per account type.
///
/// Nodes live in a flat vector ordered by code; relations are indices.
#[derive(Debug, Clone, Default)]
pub struct ChartTree {
    nodes: Vec<Node>,
    index: HashMap<AccountId, usize>,
    roots: BTreeMap<AccountType, Vec<usize>>,
}

impl ChartTree {
    /// Builds the forest from a set of accounts.
    ///
    /// Inactive accounts are left out. An active account whose parent is
    /// missing, inactive, of another type, or part of a cycle becomes a root
    /// of its own type, so every active account appears exactly once.
    #[must_use]
    pub fn build(accounts: &[Account]) -> Self {
        let mut active: Vec<&Account> = accounts.iter().filter(|a| a.is_active).collect();
        active.sort_by(|a, b| a.code.cmp(&b.code).then(a.id.cmp(&b.id)));

        let index: HashMap<AccountId, usize> =
            active.iter().enumerate().map(|(i, a)| (a.id, i)).collect();

        let mut nodes: Vec<Node> = active
            .iter()
            .map(|account| Node {
                account: (*account).clone(),
                parent: None,
                children: Vec::new(),
                depth: 0,
            })
            .collect();

        // Link in code order so child lists come out sorted.
        for i in 0..nodes.len() {
            let parent = nodes[i]
                .account
                .parent_id
                .and_then(|pid| index.get(&pid).copied())
                .filter(|&p| p != i && nodes[p].account.account_type == nodes[i].account.account_type);
            if let Some(p) = parent {
                nodes[i].parent = Some(p);
                nodes[p].children.push(i);
            }
        }

        let mut tree = Self {
            nodes,
            index,
            roots: BTreeMap::new(),
        };
        tree.assign_roots();
        tree
    }

    /// Walks down from the roots setting depths. Nodes left unvisited hang off
    /// a parent cycle, which is broken by promoting one of its members.
    fn assign_roots(&mut self) {
        let mut visited = vec![false; self.nodes.len()];

        for i in 0..self.nodes.len() {
            if self.nodes[i].parent.is_none() {
                self.mark_subtree(i, &mut visited);
            }
        }
        for i in 0..self.nodes.len() {
            if !visited[i] {
                let on_cycle = self.cycle_member(i);
                if let Some(p) = self.nodes[on_cycle].parent.take() {
                    self.nodes[p].children.retain(|&c| c != on_cycle);
                }
                self.mark_subtree(on_cycle, &mut visited);
            }
        }

        for i in 0..self.nodes.len() {
            if self.nodes[i].parent.is_none() {
                self.roots
                    .entry(self.nodes[i].account.account_type)
                    .or_default()
                    .push(i);
            }
        }
    }

    /// Follows parents from `start` until one repeats; that node is on a cycle.
    fn cycle_member(&self, start: usize) -> usize {
        let mut seen = vec![false; self.nodes.len()];
        let mut cursor = start;
        while !seen[cursor] {
            seen[cursor] = true;
            match self.nodes[cursor].parent {
                Some(p) => cursor = p,
                None => return cursor,
            }
        }
        cursor
    }

    fn mark_subtree(&mut self, root: usize, visited: &mut [bool]) {
        let base = self.nodes[root]
            .parent
            .map_or(0, |p| self.nodes[p].depth + 1);
        let mut stack = vec![(root, base)];
        while let Some((i, depth)) = stack.pop() {
            if visited[i] {
                continue;
            }
            visited[i] = true;
            self.nodes[i].depth = depth;
            stack.extend(self.nodes[i].children.iter().map(|&c| (c, depth + 1)));
        }
    }

    /// Number of nodes (equals the number of active accounts).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node at an arena index.
    #[must_use]
    pub fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    /// Returns the node for an account.
    #[must_use]
    pub fn get(&self, account_id: AccountId) -> Option<&Node> {
        self.index.get(&account_id).map(|&i| &self.nodes[i])
    }

    /// Returns the tree parent of an account.
    #[must_use]
    pub fn parent_of(&self, account_id: AccountId) -> Option<AccountId> {
        let node = self.get(account_id)?;
        node.parent.map(|p| self.nodes[p].account.id)
    }

    /// Root indices of one type, ordered by code.
    #[must_use]
    pub fn roots(&self, account_type: AccountType) -> &[usize] {
        self.roots
            .get(&account_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Depth-first pre-order over one type's forest.
    #[must_use]
    pub fn preorder(&self, account_type: AccountType) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.roots(account_type).iter().rev().copied().collect();
        while let Some(i) = stack.pop() {
            out.push(&self.nodes[i]);
            stack.extend(self.nodes[i].children.iter().rev());
        }
        out
    }

    /// Owned nested view of one type's forest.
    #[must_use]
    pub fn nested(&self, account_type: AccountType) -> Vec<AccountNode> {
        self.roots(account_type)
            .iter()
            .map(|&root| self.nested_from(root))
            .collect()
    }

    /// Nested views for every type, in presentation order.
    #[must_use]
    pub fn forest(&self) -> BTreeMap<AccountType, Vec<AccountNode>> {
        AccountType::ALL
            .iter()
            .map(|&t| (t, self.nested(t)))
            .collect()
    }

    fn nested_from(&self, idx: usize) -> AccountNode {
        let node = &self.nodes[idx];
        AccountNode {
            account: node.account.clone(),
            depth: node.depth,
            children: node.children.iter().map(|&c| self.nested_from(c)).collect(),
        }
    }

    /// Subtree totals: each node's own balance plus all of its descendants'.
    ///
    /// Accounts absent from `balances` count as zero.
    #[must_use]
    pub fn rollup(&self, balances: &HashMap<AccountId, Decimal>) -> HashMap<AccountId, Decimal> {
        let mut totals: Vec<Decimal> = self
            .nodes
            .iter()
            .map(|n| balances.get(&n.account.id).copied().unwrap_or_default())
            .collect();

        // Deepest first, so children are complete before adding into parents.
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(self.nodes[i].depth));
        for i in order {
            if let Some(p) = self.nodes[i].parent {
                let child_total = totals[i];
                totals[p] += child_total;
            }
        }

        self.nodes
            .iter()
            .zip(totals)
            .map(|(n, total)| (n.account.id, total))
            .collect()
    }
}

/// Groups active accounts into one forest per type.
#[must_use]
pub fn build_tree(accounts: &[Account]) -> ChartTree {
    ChartTree::build(accounts)
}
