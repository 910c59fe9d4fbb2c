use std::collections::HashSet;

use crate::models::Reply;

/// Navigable view over the flat reply set of a single question. Collapse
/// state lives here, per reply, defaulting to expanded.
pub struct ReplyThread {
    replies: Vec<Reply>,
    collapsed: HashSet<String>,
}

impl ReplyThread {
    pub fn new(replies: Vec<Reply>) -> Self {
        ReplyThread {
            replies,
            collapsed: HashSet::new(),
        }
    }

    pub fn top_level(&self) -> Vec<&Reply> {
        let mut result: Vec<&Reply> = self
            .replies
            .iter()
            .filter(|reply| reply.parent_reply_id.is_none())
            .collect();
        result.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        result
    }

    pub fn children_of(&self, reply_id: &str) -> Vec<&Reply> {
        let mut result: Vec<&Reply> = self
            .replies
            .iter()
            .filter(|reply| reply.parent_reply_id.as_deref() == Some(reply_id))
            .collect();
        result.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        result
    }

    pub fn is_expanded(&self, reply_id: &str) -> bool {
        !self.collapsed.contains(reply_id)
    }

    /// Flips the targeted node only; descendants keep their own state.
    pub fn toggle(&mut self, reply_id: &str) {
        if !self.collapsed.remove(reply_id) {
            self.collapsed.insert(reply_id.to_string());
        }
    }

    /// Depth-first traversal from the top level, honoring collapse state: a
    /// collapsed node is yielded but its subtree is not. A malformed parent
    /// chain that cycles is cut by the visited set instead of recursing
    /// forever.
    pub fn visible(&self) -> Vec<(usize, &Reply)> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        for reply in self.top_level() {
            self.walk(reply, 0, &mut visited, &mut result);
        }
        result
    }

    fn walk<'a>(
        &'a self,
        reply: &'a Reply,
        depth: usize,
        visited: &mut HashSet<&'a str>,
        result: &mut Vec<(usize, &'a Reply)>,
    ) {
        if !visited.insert(reply.id.as_str()) {
            return;
        }
        result.push((depth, reply));
        if !self.is_expanded(&reply.id) {
            return;
        }
        for child in self.children_of(&reply.id) {
            self.walk(child, depth + 1, visited, result);
        }
    }
}
