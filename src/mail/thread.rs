//! mail::thread
//!
//! Reply-tree reconstruction from mail header references.
//!
//! # Overview
//!
//! [`NodeList`] is an arena of [`Node`]s keyed by Message-ID. A node is
//! created the first time an id is seen, either as a message of its own or
//! as a reference from another message. Ids that are only referenced stay
//! *placeholders* until [`NodeList::normalize`] removes them.
//!
//! # Invariants
//!
//! - every node has at most one parent, and the first assignment wins
//! - the parent relation is acyclic; linking checks ancestors first
//! - `children` of a node and `parent` of each child always agree
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use patchset::mail::message::MailMessage;
//! use patchset::mail::thread::NodeList;
//!
//! let raw = |s: &str| MailMessage::parse(Path::new("x"), 0, s.as_bytes().to_vec()).unwrap();
//!
//! let mut nodes = NodeList::new();
//! nodes.add_message(raw("Message-ID: <a@x>\nSubject: cover\n\n"));
//! nodes.add_message(raw("Message-ID: <b@x>\nIn-Reply-To: <a@x>\nSubject: patch\n\n"));
//! nodes.normalize();
//!
//! let roots = nodes.root_nodes();
//! assert_eq!(roots.len(), 1);
//! assert_eq!(roots[0].id(), "<a@x>");
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;

use super::message::MailMessage;
use super::subject::strip_subject_tag;

static PATCH_LINE_RE: OnceLock<Regex> = OnceLock::new();

fn patch_line_regex() -> &'static Regex {
    PATCH_LINE_RE.get_or_init(|| {
        Regex::new(r"^(diff --git|---|\+\+\+)\s+\S").expect("invalid patch line regex")
    })
}

/// One element of the reply tree.
#[derive(Debug, Clone)]
pub struct Node {
    id: String,
    subject: Option<String>,
    message: Option<MailMessage>,
    parent: Option<String>,
    children: BTreeSet<String>,
}

impl Node {
    fn placeholder(id: String) -> Self {
        Self {
            id,
            subject: None,
            message: None,
            parent: None,
            children: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn message(&self) -> Option<&MailMessage> {
        self.message.as_ref()
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(String::as_str)
    }

    /// Whether no message backs this node.
    pub fn is_placeholder(&self) -> bool {
        self.message.is_none()
    }

    /// Subject if known, id otherwise.
    pub fn label(&self) -> &str {
        self.subject.as_deref().unwrap_or(&self.id)
    }

    /// Whether the backing message carries a diff.
    pub fn is_patch(&self) -> bool {
        self.message
            .as_ref()
            .is_some_and(|m| m.body.lines().any(|line| patch_line_regex().is_match(line)))
    }

    /// Cover letter text: the subject without its tag, a blank line, then
    /// the body up to the first `---` line.
    pub fn cover_text(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();

        if let Some(subject) = &self.subject {
            lines.push(strip_subject_tag(subject));
            lines.push("");
        }

        if let Some(message) = &self.message {
            lines.extend(message.body.lines().take_while(|line| *line != "---"));
        }

        lines.join("\n")
    }

    fn sort_key(&self) -> (&str, &str) {
        (self.subject.as_deref().unwrap_or(""), &self.id)
    }
}

/// Arena of thread nodes keyed by Message-ID.
#[derive(Debug, Clone, Default)]
pub struct NodeList {
    nodes: BTreeMap<String, Node>,
}

impl NodeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn get_or_create(&mut self, id: &str) -> &mut Node {
        self.nodes
            .entry(id.to_string())
            .or_insert_with(|| Node::placeholder(id.to_string()))
    }

    /// Whether `id` is `cursor` or one of its ancestors.
    fn is_loop(&self, cursor: Option<&str>, id: &str) -> bool {
        let mut current = cursor;
        while let Some(node_id) = current {
            if node_id == id {
                return true;
            }
            current = self.nodes.get(node_id).and_then(|n| n.parent.as_deref());
        }
        false
    }

    /// Add a message and link it into the tree through its references.
    ///
    /// Returns `false` if the message was skipped: it has no Message-ID, or
    /// another message with the same id was added first.
    pub fn add_message(&mut self, message: MailMessage) -> bool {
        let Some(id) = message.message_id.clone() else {
            log::warn!(
                "Message-ID not found in message {} of {}, skipping",
                message.index(),
                message.source().display()
            );
            return false;
        };

        if self.nodes.get(&id).is_some_and(|n| n.message.is_some()) {
            log::warn!(
                "duplicate Message-ID {} in message {} of {}, keeping the first",
                id,
                message.index(),
                message.source().display()
            );
            return false;
        }

        let chain = message.reference_chain();

        let node = self.get_or_create(&id);
        node.subject = message.subject.clone();
        node.message = Some(message);

        self.link(&chain);
        true
    }

    /// Attach each id in `chain` under the one before it.
    fn link(&mut self, chain: &[String]) {
        let mut cursor: Option<String> = None;

        for id in chain {
            if self.is_loop(cursor.as_deref(), id) {
                continue;
            }

            let node = self.get_or_create(id);
            if let Some(parent) = &cursor {
                if node.parent.is_none() {
                    node.parent = Some(parent.clone());
                    if let Some(parent_node) = self.nodes.get_mut(parent) {
                        parent_node.children.insert(id.clone());
                    }
                }
            }

            cursor = Some(id.clone());
        }
    }

    /// Remove placeholder nodes.
    ///
    /// Children of a placeholder move to its parent, or become roots when
    /// the placeholder has none. Nodes are visited in ascending id order.
    pub fn normalize(&mut self) {
        let ids: Vec<String> = self.nodes.keys().cloned().collect();

        for id in ids {
            if !self.nodes.get(&id).is_some_and(Node::is_placeholder) {
                continue;
            }
            let Some(node) = self.nodes.remove(&id) else {
                continue;
            };

            if let Some(parent_id) = &node.parent {
                if let Some(parent) = self.nodes.get_mut(parent_id) {
                    parent.children.remove(&id);
                    parent.children.extend(node.children.iter().cloned());
                }
            }

            for child_id in &node.children {
                if let Some(child) = self.nodes.get_mut(child_id) {
                    child.parent = node.parent.clone();
                }
            }

            log::debug!("dropped placeholder {}", id);
        }
    }

    /// Every node without a parent, ordered by subject then id.
    pub fn root_nodes(&self) -> Vec<&Node> {
        let mut roots: Vec<&Node> = self.nodes.values().filter(|n| n.parent.is_none()).collect();
        roots.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        roots
    }

    /// Children of `node`, ordered by subject then id.
    pub fn children_of(&self, node: &Node) -> Vec<&Node> {
        let mut children: Vec<&Node> = node
            .children
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect();
        children.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        children
    }

    /// Depth-first pre-order traversal from `root`.
    pub fn walk<'a>(&'a self, root: &'a Node, visit: &mut impl FnMut(&'a Node)) {
        visit(root);
        for child in self.children_of(root) {
            self.walk(child, visit);
        }
    }

    /// Patch-bearing messages under `root`, in traversal order.
    pub fn patches<'a>(&'a self, root: &'a Node) -> Vec<&'a MailMessage> {
        let mut found = Vec::new();
        self.walk(root, &mut |node| {
            if node.is_patch() {
                if let Some(message) = node.message() {
                    found.push(message);
                }
            }
        });
        found
    }

    /// Text rendering of the whole forest, one node per line.
    ///
    /// ```text
    /// [PATCH 0/2] cover
    /// ├─>[PATCH 1/2] first
    /// └─>[PATCH 2/2] second
    /// ```
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        for root in self.root_nodes() {
            out.push_str(root.label());
            out.push('\n');
            self.render_children(root, &mut Vec::new(), &mut out);
        }
        out
    }

    fn render_children(&self, node: &Node, stack: &mut Vec<&'static str>, out: &mut String) {
        let children = self.children_of(node);
        let last = children.len().saturating_sub(1);

        for (i, child) in children.into_iter().enumerate() {
            let (branch, indent) = if i == last {
                ("\u{2514}\u{2500}>", "  ")
            } else {
                ("\u{251C}\u{2500}>", "\u{2502} ")
            };

            out.push_str(&stack.concat());
            out.push_str(branch);
            out.push_str(child.label());
            out.push('\n');

            stack.push(indent);
            self.render_children(child, stack, out);
            stack.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn message(headers: &str, body: &str) -> MailMessage {
        let raw = format!("{headers}\n\n{body}");
        MailMessage::parse(Path::new("test.mbox"), 0, raw.into_bytes()).unwrap()
    }

    const DIFF: &str = "---\n a.txt | 1 +\n\ndiff --git a/a.txt b/a.txt\n+++ b/a.txt\n";

    #[test]
    fn links_replies_under_parent() {
        let mut nodes = NodeList::new();
        nodes.add_message(message("Message-ID: <r@x>\nSubject: root", ""));
        nodes.add_message(message(
            "Message-ID: <c@x>\nIn-Reply-To: <r@x>\nSubject: child",
            "",
        ));

        let child = nodes.get("<c@x>").unwrap();
        assert_eq!(child.parent(), Some("<r@x>"));
        assert_eq!(
            nodes.get("<r@x>").unwrap().children().collect::<Vec<_>>(),
            vec!["<c@x>"]
        );
    }

    #[test]
    fn reply_before_parent_is_fine() {
        let mut nodes = NodeList::new();
        nodes.add_message(message(
            "Message-ID: <c@x>\nIn-Reply-To: <r@x>\nSubject: child",
            "",
        ));
        assert!(nodes.get("<r@x>").unwrap().is_placeholder());

        nodes.add_message(message("Message-ID: <r@x>\nSubject: root", ""));
        nodes.normalize();

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes.root_nodes()[0].id(), "<r@x>");
    }

    #[test]
    fn self_reference_does_not_loop() {
        let mut nodes = NodeList::new();
        nodes.add_message(message(
            "Message-ID: <a@x>\nReferences: <a@x> <b@x> <a@x>\nSubject: a",
            "",
        ));

        // `a` is first in the chain, so `b` hangs below it and the trailing
        // ids are skipped as ancestors.
        let a = nodes.get("<a@x>").unwrap();
        let b = nodes.get("<b@x>").unwrap();
        assert_eq!(a.parent(), None);
        assert_eq!(b.parent(), Some("<a@x>"));

        nodes.normalize();
        let mut visited = Vec::new();
        for root in nodes.root_nodes() {
            nodes.walk(root, &mut |n| visited.push(n.id().to_string()));
        }
        assert_eq!(visited, vec!["<a@x>"]);
    }

    #[test]
    fn own_id_in_references_stays_under_root() {
        let mut nodes = NodeList::new();
        nodes.add_message(message("Message-ID: <r@x>\nSubject: root", ""));
        nodes.add_message(message(
            "Message-ID: <c@x>\nReferences: <r@x> <c@x>\nSubject: child",
            "",
        ));

        assert_eq!(nodes.get("<c@x>").unwrap().parent(), Some("<r@x>"));
        assert_eq!(nodes.get("<r@x>").unwrap().parent(), None);

        nodes.normalize();
        let roots = nodes.root_nodes();
        assert_eq!(roots.len(), 1);

        let mut visited = Vec::new();
        nodes.walk(roots[0], &mut |n| visited.push(n.id().to_string()));
        assert_eq!(visited, vec!["<r@x>", "<c@x>"]);
    }

    #[test]
    fn first_parent_wins() {
        let mut nodes = NodeList::new();
        nodes.add_message(message("Message-ID: <c@x>\nIn-Reply-To: <p1@x>", ""));
        nodes.add_message(message(
            "Message-ID: <d@x>\nReferences: <p2@x> <c@x>",
            "",
        ));

        assert_eq!(nodes.get("<c@x>").unwrap().parent(), Some("<p1@x>"));
        assert_eq!(nodes.get("<d@x>").unwrap().parent(), Some("<c@x>"));
    }

    #[test]
    fn normalize_reparents_past_missing_middle() {
        let mut nodes = NodeList::new();
        nodes.add_message(message("Message-ID: <r@x>\nSubject: R", ""));
        nodes.add_message(message(
            "Message-ID: <l@x>\nReferences: <r@x> <m@x>\nSubject: L",
            "",
        ));

        assert_eq!(nodes.get("<l@x>").unwrap().parent(), Some("<m@x>"));
        nodes.normalize();

        assert!(nodes.get("<m@x>").is_none());
        assert_eq!(nodes.get("<l@x>").unwrap().parent(), Some("<r@x>"));
        let r = nodes.get("<r@x>").unwrap();
        assert_eq!(r.children().collect::<Vec<_>>(), vec!["<l@x>"]);
        assert_eq!(nodes.root_nodes().len(), 1);
    }

    #[test]
    fn normalize_promotes_orphans_to_roots() {
        let mut nodes = NodeList::new();
        nodes.add_message(message(
            "Message-ID: <a@x>\nIn-Reply-To: <gone@x>\nSubject: a",
            "",
        ));
        nodes.add_message(message(
            "Message-ID: <b@x>\nIn-Reply-To: <gone@x>\nSubject: b",
            "",
        ));
        nodes.normalize();

        let roots: Vec<_> = nodes.root_nodes().into_iter().map(Node::id).collect();
        assert_eq!(roots, vec!["<a@x>", "<b@x>"]);
    }

    #[test]
    fn missing_message_id_is_skipped() {
        let mut nodes = NodeList::new();
        assert!(!nodes.add_message(message("Subject: anonymous", "")));
        assert!(nodes.is_empty());
    }

    #[test]
    fn duplicate_message_id_keeps_first() {
        let mut nodes = NodeList::new();
        assert!(nodes.add_message(message("Message-ID: <a@x>\nSubject: first", "")));
        assert!(!nodes.add_message(message("Message-ID: <a@x>\nSubject: second", "")));
        assert_eq!(nodes.get("<a@x>").unwrap().subject(), Some("first"));
    }

    #[test]
    fn walk_is_depth_first_by_subject() {
        let mut nodes = NodeList::new();
        nodes.add_message(message("Message-ID: <0@x>\nSubject: [PATCH 0/3] c", ""));
        nodes.add_message(message(
            "Message-ID: <2@x>\nIn-Reply-To: <0@x>\nSubject: [PATCH 2/3] b",
            "",
        ));
        nodes.add_message(message(
            "Message-ID: <1@x>\nIn-Reply-To: <0@x>\nSubject: [PATCH 1/3] a",
            "",
        ));
        nodes.add_message(message(
            "Message-ID: <r@x>\nIn-Reply-To: <1@x>\nSubject: Re: [PATCH 1/3] a",
            "",
        ));

        let root = nodes.root_nodes()[0];
        let mut order = Vec::new();
        nodes.walk(root, &mut |n| order.push(n.id().to_string()));
        assert_eq!(order, vec!["<0@x>", "<1@x>", "<r@x>", "<2@x>"]);
    }

    #[test]
    fn patches_in_thread_order() {
        let mut nodes = NodeList::new();
        nodes.add_message(message("Message-ID: <0@x>\nSubject: [PATCH 0/2] c", "cover\n"));
        nodes.add_message(message(
            "Message-ID: <2@x>\nIn-Reply-To: <0@x>\nSubject: [PATCH 2/2] b",
            DIFF,
        ));
        nodes.add_message(message(
            "Message-ID: <1@x>\nIn-Reply-To: <0@x>\nSubject: [PATCH 1/2] a",
            DIFF,
        ));
        nodes.add_message(message(
            "Message-ID: <r@x>\nIn-Reply-To: <1@x>\nSubject: Re: [PATCH 1/2] a",
            "Looks good.\n",
        ));
        nodes.normalize();

        let root = nodes.root_nodes()[0];
        let ids: Vec<_> = nodes
            .patches(root)
            .iter()
            .filter_map(|m| m.message_id.clone())
            .collect();
        assert_eq!(ids, vec!["<1@x>", "<2@x>"]);
    }

    #[test]
    fn is_patch_detection() {
        let mut nodes = NodeList::new();
        nodes.add_message(message("Message-ID: <p@x>", DIFF));
        nodes.add_message(message("Message-ID: <n@x>", "--- not a diff\n"));
        nodes.add_message(message("Message-ID: <q@x>", "just words\n---\n"));

        assert!(nodes.get("<p@x>").unwrap().is_patch());
        assert!(nodes.get("<n@x>").unwrap().is_patch());
        assert!(!nodes.get("<q@x>").unwrap().is_patch());
    }

    #[test]
    fn cover_text_stops_at_separator() {
        let mut nodes = NodeList::new();
        nodes.add_message(message(
            "Message-ID: <0@x>\nSubject: [PATCH v2 0/2] Make things better",
            "This series improves things.\n\nDetails.\n---\n a.txt | 1 +\n",
        ));

        assert_eq!(
            nodes.get("<0@x>").unwrap().cover_text(),
            "Make things better\n\nThis series improves things.\n\nDetails."
        );
    }

    #[test]
    fn renders_tree() {
        let mut nodes = NodeList::new();
        nodes.add_message(message("Message-ID: <0@x>\nSubject: cover", ""));
        nodes.add_message(message(
            "Message-ID: <1@x>\nIn-Reply-To: <0@x>\nSubject: first",
            "",
        ));
        nodes.add_message(message(
            "Message-ID: <r@x>\nIn-Reply-To: <1@x>\nSubject: reply",
            "",
        ));
        nodes.add_message(message(
            "Message-ID: <2@x>\nIn-Reply-To: <0@x>\nSubject: second",
            "",
        ));

        assert_eq!(
            nodes.render_tree(),
            "cover\n\
             ├─>first\n\
             │ └─>reply\n\
             └─>second\n"
        );
    }
}
