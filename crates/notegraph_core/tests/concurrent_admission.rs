use notegraph_core::{GraphError, NewNote, NoteGraph, StoreConfig};
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;

fn seeded_store(dir: &tempfile::TempDir) -> (PathBuf, i64, i64) {
    let path = dir.path().join("race.db");
    let graph = NoteGraph::open(&StoreConfig::file(&path)).unwrap();
    let a = graph.create_note(NewNote::new("A")).unwrap().id;
    let b = graph.create_note(NewNote::new("B")).unwrap().id;
    (path, a, b)
}

#[test]
fn opposite_links_raced_from_two_connections_admit_exactly_one() {
    for _ in 0..5 {
        let dir = tempfile::tempdir().unwrap();
        let (path, a, b) = seeded_store(&dir);
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = [(a, b), (b, a)]
            .into_iter()
            .map(|(parent_id, child_id)| {
                let path = path.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let graph = NoteGraph::open(&StoreConfig::file(&path)).unwrap();
                    barrier.wait();
                    graph.create_link(parent_id, child_id)
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        let admitted = results.iter().filter(|result| result.is_ok()).count();
        let cycles = results
            .iter()
            .filter(|result| matches!(result, Err(GraphError::Cycle { .. })))
            .count();
        assert_eq!(admitted, 1, "results: {results:?}");
        assert_eq!(cycles, 1, "results: {results:?}");

        let graph = NoteGraph::open(&StoreConfig::file(&path)).unwrap();
        let total = graph.list_links_by_participant(a).unwrap().len();
        assert_eq!(total, 1);
    }
}

#[test]
fn duplicate_links_raced_from_two_connections_admit_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let (path, a, b) = seeded_store(&dir);
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let graph = NoteGraph::open(&StoreConfig::file(&path)).unwrap();
                barrier.wait();
                graph.create_link(a, b)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|result| matches!(result, Err(GraphError::Conflict { .. }))));
}
