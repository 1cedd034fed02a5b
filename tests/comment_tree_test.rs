use std::collections::HashMap;

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use chronicle::handlers::comments::assemble_comment_trees;
use chronicle::models::{AuthorInfo, Comment};

struct Arena {
    post_id: Uuid,
    author_id: Uuid,
    authors: HashMap<Uuid, AuthorInfo>,
    comments: Vec<Comment>,
    tick: i64,
}

impl Arena {
    fn new() -> Self {
        let author_id = Uuid::new_v4();
        let mut authors = HashMap::new();
        authors.insert(
            author_id,
            AuthorInfo {
                id: author_id,
                username: "alice".to_string(),
                avatar_url: None,
            },
        );
        Arena {
            post_id: Uuid::new_v4(),
            author_id,
            authors,
            comments: Vec::new(),
            tick: 0,
        }
    }

    /// Each added comment gets a strictly later timestamp.
    fn add(&mut self, parent: Option<Uuid>, content: &str) -> Uuid {
        let id = Uuid::new_v4();
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let at = base + Duration::seconds(self.tick);
        self.tick += 1;
        self.comments.push(Comment {
            id,
            post_id: self.post_id,
            author_id: self.author_id,
            parent_comment_id: parent,
            content: content.to_string(),
            created_at: at,
            updated_at: at,
        });
        id
    }
}

#[test]
fn test_single_root_no_replies() {
    let mut arena = Arena::new();
    let root = arena.add(None, "hello");

    let trees = assemble_comment_trees(&[root], arena.comments, &arena.authors);
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].content, "hello");
    assert!(trees[0].replies.is_empty());
    assert_eq!(trees[0].author.username, "alice");
}

#[test]
fn test_three_level_nesting() {
    let mut arena = Arena::new();
    let root = arena.add(None, "root");
    let child = arena.add(Some(root), "child");
    let _grandchild = arena.add(Some(child), "grandchild");

    let trees = assemble_comment_trees(&[root], arena.comments, &arena.authors);
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].replies.len(), 1);
    assert_eq!(trees[0].replies[0].content, "child");
    assert_eq!(trees[0].replies[0].replies.len(), 1);
    assert_eq!(trees[0].replies[0].replies[0].content, "grandchild");
}

#[test]
fn test_replies_ordered_oldest_first() {
    let mut arena = Arena::new();
    let root = arena.add(None, "root");
    arena.add(Some(root), "first");
    arena.add(Some(root), "second");
    arena.add(Some(root), "third");

    let trees = assemble_comment_trees(&[root], arena.comments, &arena.authors);
    let contents: Vec<&str> = trees[0].replies.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
}

#[test]
fn test_root_order_follows_input() {
    let mut arena = Arena::new();
    let older = arena.add(None, "older");
    let newer = arena.add(None, "newer");

    // Top-level listings hand roots over newest first.
    let trees = assemble_comment_trees(&[newer, older], arena.comments, &arena.authors);
    assert_eq!(trees[0].content, "newer");
    assert_eq!(trees[1].content, "older");
}

#[test]
fn test_unlisted_root_is_skipped() {
    let mut arena = Arena::new();
    let root = arena.add(None, "present");
    let phantom = Uuid::new_v4();

    let trees = assemble_comment_trees(&[root, phantom], arena.comments, &arena.authors);
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].content, "present");
}

#[test]
fn test_node_without_author_drops_subtree() {
    let mut arena = Arena::new();
    let root = arena.add(None, "root");
    let orphaned = arena.add(Some(root), "reply");
    arena.add(Some(orphaned), "nested");

    // Remove the author entry for the reply's subtree author.
    let ghost = Uuid::new_v4();
    for c in arena.comments.iter_mut() {
        if c.id != root {
            c.author_id = ghost;
        }
    }

    let trees = assemble_comment_trees(&[root], arena.comments, &arena.authors);
    assert_eq!(trees.len(), 1);
    assert!(trees[0].replies.is_empty());
}

#[test]
fn test_sibling_subtrees_stay_separate() {
    let mut arena = Arena::new();
    let a = arena.add(None, "a");
    let b = arena.add(None, "b");
    arena.add(Some(a), "a-1");
    arena.add(Some(b), "b-1");
    arena.add(Some(a), "a-2");

    let trees = assemble_comment_trees(&[b, a], arena.comments, &arena.authors);
    assert_eq!(trees.len(), 2);

    let b_tree = &trees[0];
    assert_eq!(b_tree.replies.len(), 1);
    assert_eq!(b_tree.replies[0].content, "b-1");

    let a_tree = &trees[1];
    let contents: Vec<&str> = a_tree.replies.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(contents, vec!["a-1", "a-2"]);
}

#[test]
fn test_parent_links_preserved_in_output() {
    let mut arena = Arena::new();
    let root = arena.add(None, "root");
    arena.add(Some(root), "reply");

    let trees = assemble_comment_trees(&[root], arena.comments, &arena.authors);
    assert_eq!(trees[0].parent_comment_id, None);
    assert_eq!(trees[0].replies[0].parent_comment_id, Some(root));
}
