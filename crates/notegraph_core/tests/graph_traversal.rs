use notegraph_core::db::open_db_in_memory;
use notegraph_core::{
    GraphError, GraphTraversal, LinkAdmission, LinkRepository, NewNote, Note, NoteGraph, NoteId,
    NoteRepository, SqliteLinkRepository, SqliteNoteRepository, StoreConfig, TraversalLimits,
};

fn titles(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|note| note.title.as_str()).collect()
}

fn diamond(graph: &NoteGraph) -> [NoteId; 4] {
    let top = graph.create_note(NewNote::new("top")).unwrap().id;
    let left = graph.create_note(NewNote::new("left")).unwrap().id;
    let right = graph.create_note(NewNote::new("right")).unwrap().id;
    let bottom = graph.create_note(NewNote::new("bottom")).unwrap().id;
    graph.create_link(top, left).unwrap();
    graph.create_link(top, right).unwrap();
    graph.create_link(left, bottom).unwrap();
    graph.create_link(right, bottom).unwrap();
    [top, left, right, bottom]
}

#[test]
fn diamond_keeps_path_multiplicity_in_preorder() {
    let graph = NoteGraph::open_in_memory().unwrap();
    let [top, _, _, bottom] = diamond(&graph);

    let ancestors = graph.ancestors(bottom).unwrap();
    assert_eq!(titles(&ancestors), vec!["left", "top", "right", "top"]);

    let descendants = graph.descendants(top).unwrap();
    assert_eq!(titles(&descendants), vec!["left", "bottom", "right", "bottom"]);
}

#[test]
fn missing_note_has_no_ancestors_or_descendants() {
    let graph = NoteGraph::open_in_memory().unwrap();
    assert!(graph.ancestors(1).unwrap().is_empty());
    assert!(graph.descendants(1).unwrap().is_empty());
}

#[test]
fn isolated_note_has_empty_closures() {
    let graph = NoteGraph::open_in_memory().unwrap();
    let lonely = graph.create_note(NewNote::new("lonely")).unwrap();
    assert!(graph.ancestors(lonely.id).unwrap().is_empty());
    assert!(graph.descendants(lonely.id).unwrap().is_empty());
}

#[test]
fn deep_chain_does_not_exhaust_the_stack() {
    let graph = NoteGraph::open_in_memory().unwrap();
    let depth = 2_000;
    let mut previous = graph.create_note(NewNote::new("c0")).unwrap().id;
    let first = previous;
    for i in 1..depth {
        let next = graph.create_note(NewNote::new(format!("c{i}"))).unwrap().id;
        graph.create_link(previous, next).unwrap();
        previous = next;
    }

    let descendants = graph.descendants(first).unwrap();
    assert_eq!(descendants.len(), depth - 1);
    assert_eq!(descendants.last().unwrap().id, previous);

    let ancestors = graph.ancestors(previous).unwrap();
    assert_eq!(ancestors.len(), depth - 1);
    assert_eq!(ancestors.last().unwrap().id, first);
}

#[test]
fn traversal_limit_guards_path_explosion() {
    let graph = NoteGraph::open_in_memory()
        .unwrap()
        .with_traversal_limits(TraversalLimits::max_results(3));
    let [top, _, _, bottom] = diamond(&graph);

    let err = graph.descendants(top).unwrap_err();
    assert!(matches!(
        err,
        GraphError::TraversalLimitExceeded { note_id, limit: 3 } if note_id == top
    ));

    // Exactly at the bound is still fine.
    let at_bound = graph
        .with_traversal_limits(TraversalLimits::max_results(4))
        .ancestors(bottom)
        .unwrap();
    assert_eq!(at_bound.len(), 4);
}

#[test]
fn limits_from_store_config_apply() {
    let config = StoreConfig {
        traversal_limits: TraversalLimits::max_results(1),
        ..StoreConfig::in_memory()
    };
    let graph = NoteGraph::open(&config).unwrap();
    let [top, ..] = diamond(&graph);

    assert!(matches!(
        graph.descendants(top).unwrap_err(),
        GraphError::TraversalLimitExceeded { limit: 1, .. }
    ));
    // Admission is unaffected by the output guard.
    assert!(graph.would_create_cycle(top, top).unwrap());
}

#[test]
fn traversal_engine_works_directly_over_repositories() {
    let conn = open_db_in_memory().unwrap();
    let notes = SqliteNoteRepository::try_new(&conn).unwrap();
    let links = SqliteLinkRepository::try_new(&conn).unwrap();

    let a = notes.create_note(&NewNote::new("a")).unwrap();
    let b = notes.create_note(&NewNote::new("b")).unwrap();
    let c = notes.create_note(&NewNote::new("c")).unwrap();
    links.create_link(a.id, b.id).unwrap();
    links.create_link(b.id, c.id).unwrap();

    let traversal = GraphTraversal::new(&notes, &links);
    assert_eq!(traversal.ancestors(c.id).unwrap(), vec![b.clone(), a.clone()]);
    assert!(traversal.would_create_cycle(c.id, a.id).unwrap());
    assert!(!traversal.would_create_cycle(a.id, c.id).unwrap());
    assert_eq!(links.parent_ids(c.id).unwrap(), vec![b.id]);
    assert_eq!(links.child_ids(a.id).unwrap(), vec![b.id]);
}

#[test]
fn link_repository_classifies_constraint_violations() {
    let conn = open_db_in_memory().unwrap();
    let notes = SqliteNoteRepository::try_new(&conn).unwrap();
    let links = SqliteLinkRepository::try_new(&conn).unwrap();
    let a = notes.create_note(&NewNote::new("a")).unwrap();
    let b = notes.create_note(&NewNote::new("b")).unwrap();

    links.create_link(a.id, b.id).unwrap();
    let duplicate: GraphError = links.create_link(a.id, b.id).unwrap_err().into();
    assert!(matches!(
        duplicate,
        GraphError::Conflict { existing_link_id: None, .. }
    ));

    let self_link: GraphError = links.create_link(a.id, a.id).unwrap_err().into();
    assert!(matches!(self_link, GraphError::Cycle { .. }));
}

#[test]
fn convergent_edge_is_admitted_and_back_edge_is_not() {
    let conn = open_db_in_memory().unwrap();
    let notes = SqliteNoteRepository::try_new(&conn).unwrap();
    let links = SqliteLinkRepository::try_new(&conn).unwrap();
    let a = notes.create_note(&NewNote::new("a")).unwrap();
    let b = notes.create_note(&NewNote::new("b")).unwrap();
    let c = notes.create_note(&NewNote::new("c")).unwrap();

    let admission = LinkAdmission::new(&notes, &links);
    admission.admit(a.id, b.id).unwrap();
    admission.admit(c.id, a.id).unwrap();

    // c already reaches b through a; a second route into b is not a cycle.
    let traversal = GraphTraversal::new(&notes, &links);
    assert!(!traversal.would_create_cycle(c.id, b.id).unwrap());
    let shortcut = admission.admit(c.id, b.id).unwrap();
    assert_eq!((shortcut.parent_id, shortcut.child_id), (c.id, b.id));

    // b reaches nothing, but every edge out of b towards its ancestors closes a loop.
    assert!(traversal.would_create_cycle(b.id, a.id).unwrap());
    assert!(traversal.would_create_cycle(b.id, c.id).unwrap());
    assert!(matches!(
        admission.admit(b.id, c.id).unwrap_err(),
        GraphError::Cycle { parent_id, child_id } if parent_id == b.id && child_id == c.id
    ));

    assert_eq!(
        traversal.descendants(c.id).unwrap(),
        vec![a.clone(), b.clone(), b.clone()]
    );
}

#[test]
fn siblings_under_a_shared_parent_may_link_either_way_once() {
    let graph = NoteGraph::open_in_memory().unwrap();
    let root = graph.create_note(NewNote::new("root")).unwrap().id;
    let left = graph.create_note(NewNote::new("left")).unwrap().id;
    let right = graph.create_note(NewNote::new("right")).unwrap().id;
    graph.create_link(root, left).unwrap();
    graph.create_link(root, right).unwrap();

    assert!(!graph.would_create_cycle(left, right).unwrap());
    graph.create_link(left, right).unwrap();
    assert!(matches!(
        graph.create_link(right, left).unwrap_err(),
        GraphError::Cycle { .. }
    ));
    assert!(matches!(
        graph.create_link(right, root).unwrap_err(),
        GraphError::Cycle { .. }
    ));
}
